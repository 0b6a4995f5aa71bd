use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::database::error::DatabaseError;
use crate::types::Operation;

/// Descriptor of a single store operation as it travels through the middleware chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryParams {
    pub model: String,
    pub action: Operation,
    pub args: Value,
}

impl QueryParams {
    pub fn new(model: impl Into<String>, action: Operation, args: Value) -> Self {
        Self {
            model: model.into(),
            action,
            args,
        }
    }

    /// `Model.action`, e.g. `Note.create`
    pub fn key(&self) -> String {
        format!("{}.{}", self.model, self.action)
    }
}

/// Sort direction for `orderBy`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Parsed operation arguments shared by every engine
///
/// ```json
/// {
///   "where":   { "id": "…", "userId": "…" },
///   "data":    { "title": "…" },
///   "select":  { "id": true, "title": true },
///   "orderBy": { "updatedAt": "desc" }
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryArgs {
    #[serde(default)]
    pub data: Map<String, Value>,

    #[serde(default, rename = "where")]
    pub where_clause: Map<String, Value>,

    #[serde(default)]
    pub select: Option<Map<String, Value>>,

    #[serde(default, rename = "orderBy")]
    pub order_by: Option<Map<String, Value>>,
}

impl QueryArgs {
    pub fn parse(args: &Value) -> Result<Self, DatabaseError> {
        match args {
            Value::Null => Ok(Self::default()),
            Value::Object(_) => serde_json::from_value(args.clone())
                .map_err(|e| DatabaseError::InvalidArgs(e.to_string())),
            other => Err(DatabaseError::InvalidArgs(format!(
                "expected an object, got {}",
                other
            ))),
        }
    }
}
