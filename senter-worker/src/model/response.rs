use serde::Serialize;
use serde_json::Value;

/// One protocol reply. Serialises to `{"id", "result"}` or `{"id", "error"}`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Response {
    Success { id: Value, result: Option<Value> },
    Failure { id: Value, error: String },
}

impl Response {
    pub fn success(id: Value, result: Option<Value>) -> Self {
        Response::Success { id, result }
    }

    pub fn failure(id: Value, message: impl Into<String>) -> Self {
        Response::Failure {
            id,
            error: message.into(),
        }
    }

    /// Id reported when the request's own id is unavailable.
    pub fn missing_id() -> Value {
        Value::String(String::new())
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Response::Failure { .. })
    }
}
