use thiserror::Error;
use tokio_postgres::types::ToSql;

/// Postgres rejects statements with more bind parameters than this.
pub const MAX_PARAMETERS: usize = u16::MAX as usize;

pub type SqlArgument = Box<dyn ToSql + Send + Sync>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SqlGenerationError {
    #[error("statement needs {0} bind parameters but Postgres allows at most {MAX_PARAMETERS}")]
    TooManyParameters(usize),
    #[error("SqlBuilder requires both fields and table_name to be set to generate an INSERT")]
    IncompleteConfiguration,
    #[error("row has {actual} values but the statement has {expected} columns")]
    RowWidth { expected: usize, actual: usize },
    #[error("INSERT has no rows")]
    NoRows,
}

pub enum SqlExpr {
    Sql(String),
    Argument(SqlArgument),
}

/// Accumulates statement text and bind arguments side by side; `$n` placeholders
/// are only numbered when the statement is built.
pub struct SqlBuilder {
    expressions: Vec<SqlExpr>,
    fields: Vec<String>,
    table_name: Option<String>,
    rows: usize,
}

impl Default for SqlBuilder {
    fn default() -> Self { Self::new() }
}

impl SqlBuilder {
    pub fn new() -> Self { Self { expressions: Vec::new(), fields: Vec::new(), table_name: None, rows: 0 } }

    pub fn with_fields<T: Into<String>>(fields: Vec<T>) -> Self {
        Self { expressions: Vec::new(), fields: fields.into_iter().map(|f| f.into()).collect(), table_name: None, rows: 0 }
    }

    pub fn table_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.table_name = Some(name.into());
        self
    }

    pub fn push(&mut self, expr: SqlExpr) { self.expressions.push(expr); }

    pub fn sql(&mut self, s: impl AsRef<str>) { self.push(SqlExpr::Sql(s.as_ref().to_owned())); }

    pub fn rows(&self) -> usize { self.rows }

    pub fn argument_count(&self) -> usize { self.expressions.iter().filter(|expr| matches!(expr, SqlExpr::Argument(_))).count() }

    /// Appends one `( $a, $b, ... )` tuple to the VALUES list.
    pub fn values_row(&mut self, values: Vec<SqlArgument>) -> Result<(), SqlGenerationError> {
        if values.len() != self.fields.len() {
            return Err(SqlGenerationError::RowWidth { expected: self.fields.len(), actual: values.len() });
        }

        if self.rows > 0 {
            self.sql(", ");
        }
        self.sql("(");
        for (i, value) in values.into_iter().enumerate() {
            if i > 0 {
                self.sql(", ");
            }
            self.push(SqlExpr::Argument(value));
        }
        self.sql(")");
        self.rows += 1;
        Ok(())
    }

    pub fn build_insert(self) -> Result<(String, Vec<SqlArgument>), SqlGenerationError> {
        if self.fields.is_empty() || self.table_name.is_none() {
            return Err(SqlGenerationError::IncompleteConfiguration);
        }
        if self.rows == 0 {
            return Err(SqlGenerationError::NoRows);
        }

        let fields_clause = self.fields.iter().map(|field| quote_identifier(field)).collect::<Vec<_>>().join(", ");
        let table = quote_identifier(self.table_name.as_deref().unwrap_or_default());
        let (values_clause, args) = collapse(self.expressions);
        if args.len() > MAX_PARAMETERS {
            return Err(SqlGenerationError::TooManyParameters(args.len()));
        }

        Ok((format!("INSERT INTO {}({}) VALUES {}", table, fields_clause, values_clause), args))
    }
}

fn collapse(expressions: Vec<SqlExpr>) -> (String, Vec<SqlArgument>) {
    let mut counter = 1;
    let mut text = String::new();
    let mut args = Vec::new();

    for expr in expressions {
        match expr {
            SqlExpr::Argument(arg) => {
                text += &format!("${}", counter);
                args.push(arg);
                counter += 1;
            }
            SqlExpr::Sql(s) => {
                text += &s;
            }
        }
    }

    (text, args)
}

fn quote_identifier(name: &str) -> String { format!(r#""{}""#, name.replace('"', "\"\"")) }
