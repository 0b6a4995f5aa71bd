use serde_json::{Map, Value};

use crate::database::error::DatabaseError;
use crate::database::params::SortDirection;
use crate::database::schema::{ModelSchema, TIMESTAMP_FIELDS};

/// A parameterized SQL statement. Every parameter is bound as text;
/// timestamp columns cast their placeholder to `timestamptz`.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    pub query: String,
    pub params: Vec<String>,
}

/// Builds SQL for one model. Identifiers only ever come from the model
/// registry and are quoted; values are always bound.
pub struct QueryBuilder {
    model: &'static ModelSchema,
    params: Vec<String>,
}

impl QueryBuilder {
    pub fn new(model: &'static ModelSchema) -> Self {
        Self {
            model,
            params: Vec::new(),
        }
    }

    /// `WITH r AS (INSERT … RETURNING *) SELECT row_to_json(r) FROM r`
    pub fn insert(mut self, data: &Map<String, Value>) -> Result<SqlStatement, DatabaseError> {
        let mut columns = Vec::with_capacity(data.len());
        let mut placeholders = Vec::with_capacity(data.len());
        for (field, value) in data {
            columns.push(self.column(field)?);
            placeholders.push(self.bind(field, value)?);
        }

        let query = format!(
            "WITH r AS (INSERT INTO {} ({}) VALUES ({}) RETURNING *) SELECT row_to_json(r) FROM r",
            quote_identifier(self.model.table),
            columns.join(", "),
            placeholders.join(", ")
        );
        Ok(self.finish(query))
    }

    pub fn select(
        mut self,
        where_clause: &Map<String, Value>,
        order: Option<(&str, SortDirection)>,
        limit: Option<u32>,
    ) -> Result<SqlStatement, DatabaseError> {
        let mut inner = format!("SELECT * FROM {}", quote_identifier(self.model.table));
        inner += &self.where_sql(where_clause)?;
        if let Some((field, direction)) = order {
            inner += &format!(" ORDER BY {} {}", self.column(field)?, direction.as_sql());
        }
        if let Some(limit) = limit {
            inner += &format!(" LIMIT {}", limit);
        }

        let query = format!("SELECT row_to_json(r) FROM ({}) r", inner);
        Ok(self.finish(query))
    }

    pub fn update(
        mut self,
        where_clause: &Map<String, Value>,
        data: &Map<String, Value>,
    ) -> Result<SqlStatement, DatabaseError> {
        let mut assignments = Vec::with_capacity(data.len() + 1);
        for (field, value) in data {
            let column = self.column(field)?;
            let placeholder = self.bind(field, value)?;
            assignments.push(format!("{} = {}", column, placeholder));
        }
        assignments.push(format!("{} = now()", quote_identifier("updatedAt")));

        let where_sql = self.where_sql(where_clause)?;
        let query = format!(
            "WITH r AS (UPDATE {} SET {}{} RETURNING *) SELECT row_to_json(r) FROM r",
            quote_identifier(self.model.table),
            assignments.join(", "),
            where_sql
        );
        Ok(self.finish(query))
    }

    /// Delete returning the removed rows as JSON
    pub fn delete(mut self, where_clause: &Map<String, Value>) -> Result<SqlStatement, DatabaseError> {
        let where_sql = self.where_sql(where_clause)?;
        let query = format!(
            "WITH r AS (DELETE FROM {}{} RETURNING *) SELECT row_to_json(r) FROM r",
            quote_identifier(self.model.table),
            where_sql
        );
        Ok(self.finish(query))
    }

    /// Delete without returning rows; callers read `rows_affected`
    pub fn delete_many(mut self, where_clause: &Map<String, Value>) -> Result<SqlStatement, DatabaseError> {
        let where_sql = self.where_sql(where_clause)?;
        let query = format!("DELETE FROM {}{}", quote_identifier(self.model.table), where_sql);
        Ok(self.finish(query))
    }

    fn where_sql(&mut self, where_clause: &Map<String, Value>) -> Result<String, DatabaseError> {
        if where_clause.is_empty() {
            return Ok(String::new());
        }
        let mut conditions = Vec::with_capacity(where_clause.len());
        for (field, value) in where_clause {
            let column = self.column(field)?;
            let placeholder = self.bind(field, value)?;
            conditions.push(format!("{} = {}", column, placeholder));
        }
        Ok(format!(" WHERE {}", conditions.join(" AND ")))
    }

    fn column(&self, field: &str) -> Result<String, DatabaseError> {
        if !self.model.has_field(field) {
            return Err(DatabaseError::unknown_field(self.model.name, field));
        }
        Ok(quote_identifier(field))
    }

    fn bind(&mut self, field: &str, value: &Value) -> Result<String, DatabaseError> {
        let text = value
            .as_str()
            .ok_or_else(|| DatabaseError::invalid_value(self.model.name, field, "expected a string"))?;
        self.params.push(text.to_string());
        let placeholder = format!("${}", self.params.len());
        if TIMESTAMP_FIELDS.contains(&field) {
            Ok(format!("{}::timestamptz", placeholder))
        } else {
            Ok(placeholder)
        }
    }

    fn finish(self, query: String) -> SqlStatement {
        SqlStatement {
            query,
            params: self.params,
        }
    }
}

/// Quote SQL identifier to prevent injection
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
