use serde_json::{json, Map, Value};

use crate::model::params::SenterParams;
use crate::model::response::Response;
use crate::services::segmenter::Segmenter;

mod error;
mod method;
mod request;

pub use error::RequestError;
pub use method::{Method, UnknownMethodPolicy};
use method::SENTER;
pub use request::{Rejected, Request};

/// Turns request lines into responses using a loaded segmenter.
pub struct Dispatcher<S> {
    segmenter: S,
    unknown_methods: UnknownMethodPolicy,
}

impl<S: Segmenter> Dispatcher<S> {
    pub fn new(segmenter: S, unknown_methods: UnknownMethodPolicy) -> Self {
        Self {
            segmenter,
            unknown_methods,
        }
    }

    /// Handles one non-blank request line.
    pub fn handle(&self, line: &str) -> Response {
        let request = match Request::parse(line) {
            Ok(request) => request,
            Err(Rejected { id, error }) => {
                tracing::warn!(%id, %error, "rejected request");
                return Response::failure(id, error.to_string());
            }
        };

        let Request {
            id,
            method,
            method_name,
            data,
        } = request;

        tracing::debug!(%id, method = %method_name, "dispatching request");

        match self.dispatch(method, &method_name, data) {
            Ok(result) => Response::success(id, result),
            Err(error) => {
                tracing::warn!(%id, method = %method_name, %error, "request failed");
                Response::failure(id, error.to_string())
            }
        }
    }

    fn dispatch(
        &self,
        method: Method,
        method_name: &str,
        data: Value,
    ) -> Result<Option<Value>, RequestError> {
        match method {
            Method::Senter => self.senter(data).map(Some),
            Method::Unknown => match self.unknown_methods {
                UnknownMethodPolicy::Null => {
                    tracing::warn!(method = %method_name, "unknown method, replying with null result");
                    Ok(None)
                }
                UnknownMethodPolicy::Error => {
                    Err(RequestError::UnknownMethod(method_name.to_string()))
                }
            },
        }
    }

    fn senter(&self, data: Value) -> Result<Value, RequestError> {
        let data = match data {
            Value::Null => Value::Object(Map::new()),
            data @ Value::Object(_) => data,
            _ => return Err(RequestError::InvalidData),
        };

        let params: SenterParams = serde_json::from_value(data).map_err(|source| {
            RequestError::InvalidParams {
                method: SENTER,
                source,
            }
        })?;

        let sentences = self.segmenter.segment(params.text())?;
        Ok(json!({ "sentences": sentences }))
    }
}
