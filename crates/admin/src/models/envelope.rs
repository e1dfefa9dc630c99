//! JSON response envelope shared by the admin and public APIs.

use serde::{Deserialize, Serialize};

/// Outcome marker carried in every envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Success,
    Error,
}

/// A validation failure attached to one form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    /// Stable identifier the UI uses to place the message (e.g. `maxChars-2`).
    pub field_id: String,
    /// Human-readable field name.
    pub field: String,
    pub message: String,
}

impl FieldError {
    #[must_use]
    pub fn new(
        field_id: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field_id: field_id.into(),
            field: field.into(),
            message: message.into(),
        }
    }
}

/// `{ok, status, message, errors, data, fromCache}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonEnvelope<T> {
    pub ok: bool,
    pub status: EnvelopeStatus,
    pub message: String,
    pub errors: Vec<FieldError>,
    pub data: Option<T>,
    pub from_cache: bool,
}

impl<T> JsonEnvelope<T> {
    /// Successful response built from fresh data.
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            ok: true,
            status: EnvelopeStatus::Success,
            message: message.into(),
            errors: Vec::new(),
            data: Some(data),
            from_cache: false,
        }
    }

    /// Successful response served from the cache.
    pub fn cached(message: impl Into<String>, data: T) -> Self {
        Self {
            from_cache: true,
            ..Self::success(message, data)
        }
    }

    /// Error response with no data.
    pub fn error(message: impl Into<String>, errors: Vec<FieldError>) -> Self {
        Self {
            ok: false,
            status: EnvelopeStatus::Error,
            message: message.into(),
            errors,
            data: None,
            from_cache: false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_success_envelope_shape() {
        let value = serde_json::to_value(JsonEnvelope::success("Bundle found.", json!({"id": 1})))
            .unwrap();
        assert_eq!(
            value,
            json!({
                "ok": true,
                "status": "success",
                "message": "Bundle found.",
                "errors": [],
                "data": {"id": 1},
                "fromCache": false,
            })
        );
    }

    #[test]
    fn test_cached_envelope_sets_flag() {
        let envelope = JsonEnvelope::cached("hit", 5);
        assert!(envelope.ok);
        assert!(envelope.from_cache);
        assert_eq!(envelope.data, Some(5));
    }

    #[test]
    fn test_error_envelope_shape() {
        let envelope = JsonEnvelope::<()>::error(
            "Validation failed",
            vec![FieldError::new("stepTitle", "Step title", "Step title is required")],
        );
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["ok"], false);
        assert_eq!(value["status"], "error");
        assert_eq!(value["data"], serde_json::Value::Null);
        assert_eq!(value["errors"][0]["fieldId"], "stepTitle");
        assert_eq!(value["errors"][0]["field"], "Step title");
    }
}
