use crate::app::toast::Notifier;
use crate::app::types::{ErrorBody, Severity};
use thiserror::Error;

pub const DEFAULT_ERROR_MESSAGE: &str = "An error occurred";

#[derive(Clone, Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Response { status: u16, message: String, body: Option<ErrorBody> },
    #[error("{0}")]
    Network(String),
    #[error("{0}")]
    Decode(String),
}

impl ApiError {
    pub fn detail(&self) -> Option<String> {
        match self {
            ApiError::Response { body: Some(body), .. } => body.detail_text(),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Response { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Reads an axios/fetch style error object:
    /// `{ message, response: { status, data: { detail, ... } } }`.
    pub fn from_json(value: &serde_json::Value) -> ApiError {
        let message = value
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or_default()
            .to_string();
        match value.get("response").filter(|r| r.is_object()) {
            Some(response) => {
                let status = response
                    .get("status")
                    .and_then(|s| s.as_u64())
                    .and_then(|s| u16::try_from(s).ok())
                    .unwrap_or_default();
                let body = response.get("data").and_then(ErrorBody::from_value);
                ApiError::Response { status, message, body }
            }
            None => ApiError::Network(message),
        }
    }
}

/// Detail from the response body, then the error's own message, then
/// `default_message`.
pub fn error_message(error: &ApiError, default_message: &str) -> String {
    if let Some(detail) = error.detail() {
        return detail;
    }
    let own = error.to_string();
    if own.is_empty() {
        default_message.to_string()
    } else {
        own
    }
}

pub fn handle_api_error(notifier: &dyn Notifier, error: &ApiError, default_message: Option<&str>) -> String {
    log::error!("API Error: {:?}", error);
    let message = error_message(error, default_message.unwrap_or(DEFAULT_ERROR_MESSAGE));
    notifier.show(&message, Severity::Danger);
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder(RefCell<Vec<(String, Severity)>>);

    impl Notifier for Recorder {
        fn show(&self, message: &str, severity: Severity) {
            self.0.borrow_mut().push((message.to_string(), severity));
        }
    }

    #[test]
    fn detail_wins_and_is_toasted_as_danger() {
        let recorder = Recorder::default();
        let err = ApiError::from_json(&json!({"response": {"data": {"detail": "bad input"}}}));
        let out = handle_api_error(&recorder, &err, None);
        assert_eq!(out, "bad input");
        assert_eq!(*recorder.0.borrow(), vec![("bad input".to_string(), Severity::Danger)]);
    }

    #[test]
    fn falls_back_to_own_message() {
        let err = ApiError::from_json(&json!({"message": "Network Error"}));
        assert_eq!(error_message(&err, DEFAULT_ERROR_MESSAGE), "Network Error");

        let err = ApiError::from_json(&json!({
            "message": "Request failed with status code 500",
            "response": {"status": 500, "data": {}}
        }));
        assert_eq!(err.status(), Some(500));
        assert_eq!(error_message(&err, DEFAULT_ERROR_MESSAGE), "Request failed with status code 500");
    }

    #[test]
    fn detail_survives_mistyped_siblings() {
        let err = ApiError::from_json(&json!({
            "message": "Request failed with status code 400",
            "response": {"status": 400, "data": {"detail": "bad input", "status_code": "400"}}
        }));
        assert_eq!(error_message(&err, DEFAULT_ERROR_MESSAGE), "bad input");
    }

    #[test]
    fn falsy_detail_falls_through_to_message() {
        let err = ApiError::from_json(&json!({"message": "boom", "response": {"data": {"detail": 0}}}));
        assert_eq!(error_message(&err, DEFAULT_ERROR_MESSAGE), "boom");

        let err = ApiError::from_json(&json!({"message": "boom", "response": {"data": {"detail": false}}}));
        assert_eq!(error_message(&err, DEFAULT_ERROR_MESSAGE), "boom");
    }

    #[test]
    fn falls_back_to_default() {
        let recorder = Recorder::default();
        let err = ApiError::from_json(&json!({}));
        assert_eq!(handle_api_error(&recorder, &err, None), "An error occurred");
        assert_eq!(handle_api_error(&recorder, &err, Some("Upload failed")), "Upload failed");
        assert_eq!(recorder.0.borrow().len(), 2);
    }

    #[test]
    fn response_variant_uses_error_body() {
        let err = ApiError::Response {
            status: 404,
            message: "Not Found".to_string(),
            body: Some(ErrorBody {
                detail: Some(json!("Model not found: llama3")),
                status_code: Some(404),
                error_type: Some("ModelNotFoundError".to_string()),
            }),
        };
        assert_eq!(error_message(&err, DEFAULT_ERROR_MESSAGE), "Model not found: llama3");

        let bare = ApiError::Response { status: 502, message: "Bad Gateway".to_string(), body: None };
        assert_eq!(error_message(&bare, DEFAULT_ERROR_MESSAGE), "Bad Gateway");
    }

    #[test]
    fn decode_errors_surface_their_text() {
        let err = ApiError::Decode("expected value at line 1".to_string());
        assert_eq!(error_message(&err, DEFAULT_ERROR_MESSAGE), "expected value at line 1");
    }
}
