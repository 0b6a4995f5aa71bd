// Model registry shared by the Postgres and in-memory engines.
// Every argument is checked here before an engine touches storage, so both
// engines reject the same inputs with the same errors.

use serde_json::{Map, Value};

use crate::database::error::DatabaseError;
use crate::database::params::SortDirection;

pub const TIMESTAMP_FIELDS: [&str; 2] = ["createdAt", "updatedAt"];

/// A `field -> model.references` link; deleting the referenced row cascades
#[derive(Debug)]
pub struct Relation {
    pub field: &'static str,
    pub model: &'static str,
    pub references: &'static str,
}

#[derive(Debug)]
pub struct ModelSchema {
    pub name: &'static str,
    pub table: &'static str,
    pub primary_key: &'static str,
    /// Primary key is assigned by the store (uuid v4) rather than the caller
    pub generated_id: bool,
    pub fields: &'static [&'static str],
    pub required: &'static [&'static str],
    pub unique: &'static [&'static str],
    pub relations: &'static [Relation],
}

pub static USER: ModelSchema = ModelSchema {
    name: "User",
    table: "users",
    primary_key: "id",
    generated_id: true,
    fields: &["id", "email", "passwordHash", "createdAt", "updatedAt"],
    required: &["email", "passwordHash"],
    unique: &["id", "email"],
    relations: &[],
};

pub static NOTE: ModelSchema = ModelSchema {
    name: "Note",
    table: "notes",
    primary_key: "id",
    generated_id: true,
    fields: &["id", "title", "body", "userId", "createdAt", "updatedAt"],
    required: &["title", "body", "userId"],
    unique: &["id"],
    relations: &[Relation {
        field: "userId",
        model: "User",
        references: "id",
    }],
};

pub static POST: ModelSchema = ModelSchema {
    name: "Post",
    table: "posts",
    primary_key: "slug",
    generated_id: false,
    fields: &["slug", "title", "markdown", "createdAt", "updatedAt"],
    required: &["slug", "title", "markdown"],
    unique: &["slug"],
    relations: &[],
};

pub static MODELS: [&ModelSchema; 3] = [&USER, &NOTE, &POST];

/// Look up a model by its name (`User`, `Note`, `Post`)
pub fn model(name: &str) -> Result<&'static ModelSchema, DatabaseError> {
    MODELS
        .iter()
        .copied()
        .find(|m| m.name == name)
        .ok_or_else(|| DatabaseError::UnknownModel(name.to_string()))
}

/// Models holding a relation that points at `target`
pub fn dependents_of(target: &str) -> impl Iterator<Item = (&'static ModelSchema, &'static Relation)> + '_ {
    MODELS.iter().copied().flat_map(move |m| {
        m.relations
            .iter()
            .filter(move |r| r.model == target)
            .map(move |r| (m, r))
    })
}

impl ModelSchema {
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains(&field)
    }

    /// Fields a caller may set through `data`
    pub fn is_writable(&self, field: &str) -> bool {
        if TIMESTAMP_FIELDS.contains(&field) {
            return false;
        }
        !(self.generated_id && field == self.primary_key)
    }

    pub fn check_create(&self, data: &Map<String, Value>) -> Result<(), DatabaseError> {
        self.check_data(data)?;
        for field in self.required {
            if !data.contains_key(*field) {
                return Err(DatabaseError::missing_field(self.name, field));
            }
        }
        Ok(())
    }

    pub fn check_update(&self, data: &Map<String, Value>) -> Result<(), DatabaseError> {
        if data.is_empty() {
            return Err(DatabaseError::InvalidArgs(format!(
                "{}.update requires at least one field in data",
                self.name
            )));
        }
        self.check_data(data)
    }

    fn check_data(&self, data: &Map<String, Value>) -> Result<(), DatabaseError> {
        for (field, value) in data {
            if !self.has_field(field) {
                return Err(DatabaseError::unknown_field(self.name, field));
            }
            if !self.is_writable(field) {
                return Err(DatabaseError::invalid_value(
                    self.name,
                    field,
                    "field is managed by the store",
                ));
            }
            if !value.is_string() {
                return Err(DatabaseError::invalid_value(self.name, field, "expected a string"));
            }
        }
        Ok(())
    }

    pub fn check_where(&self, where_clause: &Map<String, Value>) -> Result<(), DatabaseError> {
        for (field, value) in where_clause {
            if !self.has_field(field) {
                return Err(DatabaseError::unknown_field(self.name, field));
            }
            if !value.is_string() {
                return Err(DatabaseError::invalid_value(
                    self.name,
                    field,
                    "filters only support string equality",
                ));
            }
        }
        Ok(())
    }

    /// Single-row writes (`update`, `delete`, `findUnique`) must name a unique field
    pub fn check_unique_where(&self, where_clause: &Map<String, Value>) -> Result<(), DatabaseError> {
        self.check_where(where_clause)?;
        if self.unique.iter().any(|f| where_clause.contains_key(*f)) {
            Ok(())
        } else {
            Err(DatabaseError::InvalidArgs(format!(
                "{} requires a unique field in where (one of {:?})",
                self.name, self.unique
            )))
        }
    }

    pub fn check_select(&self, select: Option<&Map<String, Value>>) -> Result<(), DatabaseError> {
        if let Some(select) = select {
            for field in select.keys() {
                if !self.has_field(field) {
                    return Err(DatabaseError::unknown_field(self.name, field));
                }
            }
        }
        Ok(())
    }

    pub fn order(
        &self,
        order_by: Option<&Map<String, Value>>,
    ) -> Result<Option<(&'static str, SortDirection)>, DatabaseError> {
        let Some(order_by) = order_by else {
            return Ok(None);
        };
        if order_by.len() > 1 {
            return Err(DatabaseError::InvalidArgs(
                "orderBy supports a single field".to_string(),
            ));
        }
        let Some((field, direction)) = order_by.iter().next() else {
            return Ok(None);
        };
        let field = self
            .fields
            .iter()
            .copied()
            .find(|f| *f == field.as_str())
            .ok_or_else(|| DatabaseError::unknown_field(self.name, field))?;
        let direction = match direction.as_str() {
            Some("asc") => SortDirection::Asc,
            Some("desc") => SortDirection::Desc,
            _ => {
                return Err(DatabaseError::InvalidArgs(format!(
                    "orderBy.{} must be \"asc\" or \"desc\"",
                    field
                )))
            }
        };
        Ok(Some((field, direction)))
    }

    /// Apply a `select` projection; fields set to `false` or absent are dropped
    pub fn project(&self, mut row: Map<String, Value>, select: Option<&Map<String, Value>>) -> Value {
        if let Some(select) = select {
            row.retain(|field, _| matches!(select.get(field), Some(Value::Bool(true))));
        }
        Value::Object(row)
    }
}
