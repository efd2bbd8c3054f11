use serde_json::Value;

use super::error::RequestError;
use super::method::Method;
use crate::model::response::Response;

/// A parsed request envelope.
#[derive(Debug, PartialEq)]
pub struct Request {
    pub id: Value,
    pub method: Method,
    /// Method as sent, for diagnostics.
    pub method_name: String,
    /// As sent; `Null` when absent. Only the handler checks its shape.
    pub data: Value,
}

/// A line that could not be turned into a [`Request`], with whatever id it carried.
#[derive(Debug)]
pub struct Rejected {
    pub id: Value,
    pub error: RequestError,
}

impl Rejected {
    fn anonymous(error: RequestError) -> Self {
        Rejected {
            id: Response::missing_id(),
            error,
        }
    }
}

impl Request {
    pub fn parse(line: &str) -> Result<Self, Rejected> {
        let value: Value = serde_json::from_str(line)
            .map_err(|source| Rejected::anonymous(RequestError::InvalidJson { source }))?;

        let Value::Object(mut fields) = value else {
            return Err(Rejected::anonymous(RequestError::NotAnObject));
        };

        let Some(id) = fields.remove("id") else {
            return Err(Rejected::anonymous(RequestError::MissingField("id")));
        };

        let Some(method_value) = fields.remove("method") else {
            return Err(Rejected {
                id,
                error: RequestError::MissingField("method"),
            });
        };

        let data = fields.remove("data").unwrap_or(Value::Null);

        let method = Method::from(&method_value);
        let method_name = match method_value {
            Value::String(s) => s,
            other => other.to_string(),
        };

        Ok(Request {
            id,
            method,
            method_name,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_full_request() {
        let req =
            Request::parse(r#"{"id": 9, "method": "senter", "data": {"text": "A."}}"#).unwrap();
        assert_eq!(
            req,
            Request {
                id: json!(9),
                method: Method::Senter,
                method_name: "senter".to_string(),
                data: json!({ "text": "A." }),
            }
        );
    }

    #[rstest]
    #[case(r#"{"id": "a", "method": "senter"}"#, json!(null))]
    #[case(r#"{"id": "a", "method": "ping", "data": []}"#, json!([]))]
    #[case(r#"{"id": "a", "method": "senter", "data": "x"}"#, json!("x"))]
    fn data_is_kept_as_sent(#[case] line: &str, #[case] expected: Value) {
        assert_eq!(Request::parse(line).unwrap().data, expected);
    }

    #[test]
    fn large_integer_id_is_kept_exactly() {
        let req = Request::parse(r#"{"id": 123456789012345678901234567890, "method": "x"}"#)
            .unwrap();
        assert_eq!(req.id.to_string(), "123456789012345678901234567890");
    }

    #[test]
    fn null_id_is_echoed_not_missing() {
        assert_eq!(
            Request::parse(r#"{"id": null, "method": "x"}"#).unwrap().id,
            Value::Null
        );
    }

    #[test]
    fn non_string_method_keeps_its_text() {
        let req = Request::parse(r#"{"id": 1, "method": [1, 2]}"#).unwrap();
        assert_eq!(req.method, Method::Unknown);
        assert_eq!(req.method_name, "[1,2]");
    }

    #[rstest]
    #[case("not json", "")]
    #[case("[1, 2]", "")]
    #[case(r#"{"method": "senter"}"#, "")]
    fn rejects_without_id(#[case] line: &str, #[case] expected_id: &str) {
        let rejected = Request::parse(line).unwrap_err();
        assert_eq!(rejected.id, json!(expected_id));
    }

    #[test]
    fn rejects_missing_method_with_id() {
        let rejected = Request::parse(r#"{"id": "7"}"#).unwrap_err();
        assert_eq!(rejected.id, json!("7"));
        assert_eq!(rejected.error.to_string(), "missing field `method`");
    }
}
