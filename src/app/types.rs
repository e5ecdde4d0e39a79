use serde::{Deserialize, Serialize};
use std::fmt;

/// A date-like value as handed over by a page: epoch milliseconds or any
/// string the browser's date parser understands.
#[derive(Clone, Debug, PartialEq)]
pub enum Timestamp {
    Millis(f64),
    Text(String),
}

impl Timestamp {
    /// Mirrors JavaScript falsiness: `0`, `NaN` and `""` carry no date.
    pub fn is_blank(&self) -> bool {
        match self {
            Timestamp::Millis(ms) => *ms == 0.0 || ms.is_nan(),
            Timestamp::Text(s) => s.is_empty(),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::Millis(ms) => write!(f, "{}", ms),
            Timestamp::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Timestamp {
    fn from(ms: f64) -> Self {
        Timestamp::Millis(ms)
    }
}

impl From<&str> for Timestamp {
    fn from(s: &str) -> Self {
        Timestamp::Text(s.to_string())
    }
}

/// Toast severity. The named levels are the Bootstrap contextual colors; any
/// other string is passed through untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Severity {
    #[default]
    Info,
    Danger,
    Success,
    Warning,
    Primary,
    Secondary,
    Light,
    Dark,
    Custom(String),
}

impl Severity {
    pub fn as_str(&self) -> &str {
        match self {
            Severity::Info => "info",
            Severity::Danger => "danger",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Primary => "primary",
            Severity::Secondary => "secondary",
            Severity::Light => "light",
            Severity::Dark => "dark",
            Severity::Custom(s) => s,
        }
    }

    pub fn parse(s: &str) -> Severity {
        match s {
            "info" => Severity::Info,
            "danger" => Severity::Danger,
            "success" => Severity::Success,
            "warning" => Severity::Warning,
            "primary" => Severity::Primary,
            "secondary" => Severity::Secondary,
            "light" => Severity::Light,
            "dark" => Severity::Dark,
            other => Severity::Custom(other.to_string()),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body the backend's exception handlers send with every non-2xx response.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub error_type: Option<String>,
}

impl ErrorBody {
    /// Field by field, so one odd sibling (`"status_code": "400"`) cannot
    /// cost us the detail.
    pub fn from_value(data: &serde_json::Value) -> Option<ErrorBody> {
        if !data.is_object() {
            return None;
        }
        Some(ErrorBody {
            detail: data.get("detail").filter(|d| is_truthy(d)).cloned(),
            status_code: data
                .get("status_code")
                .and_then(|s| s.as_u64())
                .and_then(|s| u16::try_from(s).ok()),
            error_type: data.get("error_type").and_then(|t| t.as_str()).map(str::to_string),
        })
    }

    /// `detail` as display text. Validation errors carry a list here, which is
    /// rendered as JSON rather than dropped.
    pub fn detail_text(&self) -> Option<String> {
        match self.detail.as_ref().filter(|d| is_truthy(d))? {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// JavaScript truthiness over JSON: `null`, `false`, `0` and `""` are falsy.
pub fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    pub fn parse(s: &str) -> Option<Method> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Some(Method::Get),
            "POST" => Some(Method::Post),
            "PUT" => Some(Method::Put),
            "PATCH" => Some(Method::Patch),
            "DELETE" => Some(Method::Delete),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blank_timestamps_follow_js_falsiness() {
        assert!(Timestamp::Millis(0.0).is_blank());
        assert!(Timestamp::Millis(f64::NAN).is_blank());
        assert!(Timestamp::from("").is_blank());
        assert!(!Timestamp::Millis(1_700_000_000_000.0).is_blank());
        assert!(!Timestamp::from("2024-01-01T00:00:00Z").is_blank());
    }

    #[test]
    fn severity_round_trips_known_and_custom_levels() {
        assert_eq!(Severity::parse("danger"), Severity::Danger);
        assert_eq!(Severity::default().as_str(), "info");
        let custom = Severity::parse("purple");
        assert_eq!(custom, Severity::Custom("purple".to_string()));
        assert_eq!(custom.to_string(), "purple");
    }

    #[test]
    fn error_body_detail_text_handles_strings_and_lists() {
        let body: ErrorBody = serde_json::from_value(json!({
            "detail": "Model not found",
            "status_code": 404,
            "error_type": "ModelNotFoundError"
        }))
        .unwrap();
        assert_eq!(body.detail_text().as_deref(), Some("Model not found"));
        assert_eq!(body.status_code, Some(404));

        let list: ErrorBody = serde_json::from_value(json!({"detail": [{"msg": "field required"}]})).unwrap();
        assert_eq!(list.detail_text().as_deref(), Some(r#"[{"msg":"field required"}]"#));

        let empty: ErrorBody = serde_json::from_value(json!({"detail": ""})).unwrap();
        assert_eq!(empty.detail_text(), None);
    }

    #[test]
    fn error_body_from_value_keeps_detail_beside_odd_fields() {
        let body = ErrorBody::from_value(&json!({
            "detail": "bad input",
            "status_code": "400",
            "error_type": 7
        }))
        .unwrap();
        assert_eq!(body.detail_text().as_deref(), Some("bad input"));
        assert_eq!(body.status_code, None);
        assert_eq!(body.error_type, None);

        assert!(ErrorBody::from_value(&json!("plain text")).is_none());
    }

    #[test]
    fn falsy_details_are_skipped() {
        for detail in [json!(0), json!(false), json!(""), json!(null)] {
            let body = ErrorBody::from_value(&json!({ "detail": detail.clone() })).unwrap();
            assert_eq!(body.detail_text(), None, "detail {}", detail);
        }
        let kept = ErrorBody::from_value(&json!({"detail": 42})).unwrap();
        assert_eq!(kept.detail_text().as_deref(), Some("42"));
    }

    #[test]
    fn method_parse_is_case_insensitive() {
        assert_eq!(Method::parse("post"), Some(Method::Post));
        assert_eq!(Method::parse("TRACE"), None);
        assert_eq!(Method::Delete.as_str(), "DELETE");
    }
}
