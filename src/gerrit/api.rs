//! Query API boundary for Gerrit.

use std::fmt;

use serde_json::Value;

use crate::error::BartError;
use crate::Result;

/// Rows returned by a Gerrit command together with its reported row count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiResult {
    /// Row count reported by Gerrit's stats line.
    pub row_count: u64,
    /// Returned records, in output order.
    pub records: Vec<Value>,
}

impl ApiResult {
    /// Create a result from a row count and records.
    pub fn new(row_count: u64, records: Vec<Value>) -> Self {
        Self { row_count, records }
    }

    /// First record, if any.
    pub fn first(&self) -> Option<&Value> {
        self.records.first()
    }

    /// Decode JSON-lines output from a Gerrit SSH command.
    ///
    /// Lines typed `stats`, `query-stats` or `update-stats` supply the row
    /// count. `row` lines from gsql contribute their `columns` object; any
    /// other object is a record as-is. Without a stats line, the row count
    /// is the number of records.
    pub fn from_json_lines<S: AsRef<str>>(lines: &[S]) -> Result<Self> {
        let mut records = Vec::new();
        let mut row_count = None;

        for line in lines {
            let line: &str = line.as_ref();
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let value: Value = serde_json::from_str(line)
                .map_err(|e| BartError::GerritParse(format!("{e}: {line}")))?;

            match value.get("type").and_then(Value::as_str) {
                Some("stats" | "query-stats" | "update-stats") => {
                    row_count = value.get("rowCount").and_then(Value::as_u64);
                }
                Some("error") => {
                    let message = value
                        .get("message")
                        .and_then(Value::as_str)
                        .unwrap_or("unknown error");
                    return Err(BartError::GerritParse(message.to_string()));
                }
                Some("row") => {
                    records.push(value.get("columns").cloned().unwrap_or(Value::Null));
                }
                _ => records.push(value),
            }
        }

        let row_count = row_count.unwrap_or(records.len() as u64);
        Ok(Self { row_count, records })
    }
}

/// A parameter bound to a `?` placeholder in a gsql statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GsqlValue {
    /// Rendered as a bare number.
    Int(i64),
    /// Rendered as a single-quoted literal with `'` doubled.
    Text(String),
}

impl fmt::Display for GsqlValue {
    /// Render as a SQL literal.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
        }
    }
}

impl From<i64> for GsqlValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<u32> for GsqlValue {
    fn from(n: u32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<&str> for GsqlValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for GsqlValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Replace each `?` outside a quoted literal with the next parameter.
pub fn bind_gsql(sql: &str, params: &[GsqlValue]) -> Result<String> {
    let mut out = String::with_capacity(sql.len() + params.len() * 8);
    let mut params_iter = params.iter();
    let mut in_literal = false;
    let mut used = 0;

    for ch in sql.chars() {
        match ch {
            '\'' => {
                in_literal = !in_literal;
                out.push(ch);
            }
            '?' if !in_literal => {
                let param = params_iter.next().ok_or_else(|| {
                    BartError::Gsql(format!(
                        "statement has more placeholders than the {} parameters given",
                        params.len()
                    ))
                })?;
                out.push_str(&param.to_string());
                used += 1;
            }
            _ => out.push(ch),
        }
    }

    if used != params.len() {
        return Err(BartError::Gsql(format!(
            "statement has {used} placeholders but {} parameters were given",
            params.len()
        )));
    }

    Ok(out)
}

/// Access to a Gerrit server.
pub trait Api {
    /// Run `gerrit query` with a printf-style query template.
    fn query(&self, template: &str, args: &[String]) -> Result<ApiResult>;

    /// Run a gsql statement with `?` placeholders bound to `params`.
    fn gsql(&self, sql: &str, params: &[GsqlValue]) -> Result<ApiResult>;

    /// Post a review on `change_and_patch_set` (`"<change>,<patch set>"`).
    fn review(
        &self,
        change_and_patch_set: &str,
        score: Option<i32>,
        message: &str,
        extra: &[&str],
    ) -> Result<ApiResult>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_query_output() {
        let lines = [
            r#"{"project":"bart","number":"2583","currentPatchSet":{"number":"1"}}"#,
            r#"{"type":"stats","rowCount":1,"runTimeMilliseconds":4}"#,
        ];
        let result = ApiResult::from_json_lines(&lines).unwrap();

        assert_eq!(result.row_count, 1);
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.first().unwrap()["number"], json!("2583"));
    }

    #[test]
    fn test_parse_gsql_rows() {
        let lines = [
            r#"{"type":"row","columns":{"change_id":"2583"}}"#,
            "",
            r#"{"type":"query-stats","rowCount":1,"runTimeMilliseconds":1}"#,
        ];
        let result = ApiResult::from_json_lines(&lines).unwrap();

        assert_eq!(result.row_count, 1);
        assert_eq!(result.records, vec![json!({"change_id": "2583"})]);
    }

    #[test]
    fn test_parse_update_stats() {
        let lines = [r#"{"type":"update-stats","rowCount":3}"#];
        let result = ApiResult::from_json_lines(&lines).unwrap();
        assert_eq!(result.row_count, 3);
        assert!(result.records.is_empty());
    }

    #[test]
    fn test_parse_without_stats_counts_records() {
        let lines = [r#"{"a":1}"#, r#"{"a":2}"#];
        let result = ApiResult::from_json_lines(&lines).unwrap();
        assert_eq!(result.row_count, 2);
    }

    #[test]
    fn test_parse_empty_output() {
        let result = ApiResult::from_json_lines::<&str>(&[]).unwrap();
        assert_eq!(result, ApiResult::default());
    }

    #[test]
    fn test_parse_malformed_line() {
        let err = ApiResult::from_json_lines(&["not json"]).unwrap_err();
        assert!(matches!(err, BartError::GerritParse(_)));
    }

    #[test]
    fn test_parse_error_line() {
        let err = ApiResult::from_json_lines(&[r#"{"type":"error","message":"no such table"}"#])
            .unwrap_err();
        assert!(err.to_string().contains("no such table"));
    }

    #[test]
    fn test_gsql_value_literals() {
        assert_eq!(GsqlValue::from(2i64).to_string(), "2");
        assert_eq!(GsqlValue::from("abc").to_string(), "'abc'");
        assert_eq!(GsqlValue::from("O'Brien").to_string(), "'O''Brien'");
    }

    #[test]
    fn test_bind_gsql() {
        let sql = bind_gsql(
            "UPDATE changes SET status = 'M?', current_patch_set_id = ? WHERE change_key = ?",
            &[2u32.into(), "Iabc123".into()],
        )
        .unwrap();
        assert_eq!(
            sql,
            "UPDATE changes SET status = 'M?', current_patch_set_id = 2 WHERE change_key = 'Iabc123'"
        );
    }

    #[test]
    fn test_bind_gsql_count_mismatch() {
        assert!(matches!(
            bind_gsql("SELECT ?", &[]),
            Err(BartError::Gsql(_))
        ));
        assert!(matches!(
            bind_gsql("SELECT 1", &[1i64.into()]),
            Err(BartError::Gsql(_))
        ));
    }
}
