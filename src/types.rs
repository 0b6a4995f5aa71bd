/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Store operations supported throughout the system
/// Used by the store client, its middleware chain, and emitted events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    Create,
    FindFirst,
    FindUnique,
    FindMany,
    Update,
    Delete,
    DeleteMany,
}

impl Operation {
    /// Action name as it appears in operation keys, e.g. `Note.create`
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::FindFirst => "findFirst",
            Operation::FindUnique => "findUnique",
            Operation::FindMany => "findMany",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::DeleteMany => "deleteMany",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_action_name() {
        let value = serde_json::to_value(Operation::DeleteMany).unwrap();
        assert_eq!(value, serde_json::json!("deleteMany"));
        assert_eq!(Operation::FindFirst.to_string(), "findFirst");
    }
}
