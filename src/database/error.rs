use thiserror::Error;

/// Errors raised by the store client, its engines, and the middleware chain
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Unknown model: {0}")]
    UnknownModel(String),

    #[error("Unknown field '{field}' on model {model}")]
    UnknownField { model: String, field: String },

    #[error("Argument '{field}' is missing for {model}")]
    MissingField { model: String, field: String },

    #[error("Invalid value for {model}.{field}: {reason}")]
    InvalidValue {
        model: String,
        field: String,
        reason: String,
    },

    #[error("Invalid query arguments: {0}")]
    InvalidArgs(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unique constraint failed on {model}.{field}")]
    UniqueViolation { model: String, field: String },

    #[error("Foreign key constraint failed on {model}.{field}")]
    ForeignKeyViolation { model: String, field: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    pub fn unknown_field(model: &str, field: &str) -> Self {
        DatabaseError::UnknownField {
            model: model.to_string(),
            field: field.to_string(),
        }
    }

    pub fn missing_field(model: &str, field: &str) -> Self {
        DatabaseError::MissingField {
            model: model.to_string(),
            field: field.to_string(),
        }
    }

    pub fn invalid_value(model: &str, field: &str, reason: impl Into<String>) -> Self {
        DatabaseError::InvalidValue {
            model: model.to_string(),
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn unique_violation(model: &str, field: &str) -> Self {
        DatabaseError::UniqueViolation {
            model: model.to_string(),
            field: field.to_string(),
        }
    }

    pub fn foreign_key_violation(model: &str, field: &str) -> Self {
        DatabaseError::ForeignKeyViolation {
            model: model.to_string(),
            field: field.to_string(),
        }
    }
}
