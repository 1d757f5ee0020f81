use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

/// Success envelope: `{success: true, data, message}`.
pub fn success_body(data: Value, message: &str) -> Value {
    json!({
        "success": true,
        "data": data,
        "message": message,
    })
}

/// Error envelope: `{success: false, data: null, message}`, with an
/// optional machine-readable error code.
pub fn error_body(message: &str, code: Option<&str>) -> Value {
    let mut body = json!({
        "success": false,
        "data": Value::Null,
        "message": message,
    });
    if let Some(code) = code {
        body["error"] = json!({
            "code": code,
            "message": message,
        });
    }
    body
}

pub fn success(status: StatusCode, data: Value, message: &str) -> Response {
    (status, Json(success_body(data, message))).into_response()
}

pub fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(error_body(message, None))).into_response()
}

pub fn error_with_code(status: StatusCode, code: &str, message: &str) -> Response {
    (status, Json(error_body(message, Some(code)))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_carries_data_and_message() {
        let body = success_body(json!({"id": "offer-000001"}), "Offer created successfully");
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["data"]["id"], json!("offer-000001"));
        assert_eq!(body["message"], json!("Offer created successfully"));
    }

    #[test]
    fn error_envelope_nulls_data() {
        let body = error_body("Offer not found", None);
        assert_eq!(body["success"], json!(false));
        assert!(body["data"].is_null());
        assert!(body.get("error").is_none());
    }

    #[test]
    fn error_envelope_embeds_code_when_present() {
        let body = error_body("PDF is being generated", Some("PDF_GENERATING"));
        assert_eq!(body["error"]["code"], json!("PDF_GENERATING"));
        assert_eq!(body["error"]["message"], json!("PDF is being generated"));
    }
}
