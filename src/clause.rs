//! Rendering of `where` clauses into the API's filter expression language.
//!
//! The remote API reads `=` for boolean literals and `==` for numbers and
//! quoted strings. Both operators are emitted exactly as the API expects them;
//! do not normalise one into the other.

use std::sync::LazyLock;

use regex::Regex;

static BOOL_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)^('|")?(true|false)("|')?$"#).expect("valid regex"));

static SELF_ID_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^([a-z]+)\.([a-z]+)ID$").expect("valid regex"));

static GUID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-([0-9a-f]{4}-){3}[0-9a-f]{12}$").expect("valid regex")
});

/// Right-hand side of a `where_equals` clause.
///
/// The variant decides the rendering: `5` and `"5"` produce different clauses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WhereValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl From<bool> for WhereValue {
    fn from(value: bool) -> Self {
        WhereValue::Bool(value)
    }
}

impl From<i64> for WhereValue {
    fn from(value: i64) -> Self {
        WhereValue::Int(value)
    }
}

impl From<i32> for WhereValue {
    fn from(value: i32) -> Self {
        WhereValue::Int(i64::from(value))
    }
}

impl From<u32> for WhereValue {
    fn from(value: u32) -> Self {
        WhereValue::Int(i64::from(value))
    }
}

impl From<&str> for WhereValue {
    fn from(value: &str) -> Self {
        WhereValue::Str(value.to_string())
    }
}

impl From<String> for WhereValue {
    fn from(value: String) -> Self {
        WhereValue::Str(value)
    }
}

impl From<&String> for WhereValue {
    fn from(value: &String) -> Self {
        WhereValue::Str(value.clone())
    }
}

/// Render one `field <op> value` clause. First matching rule wins:
/// bool, integer, boolean-looking string, self-referencing ID with a GUID,
/// then the quoted-string fallback.
pub fn render(field: &str, value: &WhereValue) -> String {
    match value {
        WhereValue::Bool(b) => format!("{field}={b}"),
        WhereValue::Int(n) => format!("{field}=={n}"),
        WhereValue::Str(s) if BOOL_LITERAL.is_match(s) => format!("{field}={s}"),
        WhereValue::Str(s) if is_self_id_field(field) && GUID.is_match(s) => {
            format!("{field}=Guid(\"{s}\")")
        }
        WhereValue::Str(s) => format!("{field}==\"{s}\""),
    }
}

/// `Contact.ContactID` style: the owner name repeated before `ID`, any case.
fn is_self_id_field(field: &str) -> bool {
    SELF_ID_FIELD
        .captures(field)
        .is_some_and(|caps| caps[1].eq_ignore_ascii_case(&caps[2]))
}

/// Join clauses into the conjunctive expression sent as `where`.
pub fn conjunction(clauses: &[String]) -> String {
    clauses.join(" AND ")
}
