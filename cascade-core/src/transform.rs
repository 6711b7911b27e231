use crate::error::TransformError;
use crate::response::RawResponse;
use serde_json::Value;

/// Turns one raw response into a domain value.
///
/// A transform is installed once on an executor and applied to every
/// response of every round. It must not depend on or change pipeline state.
pub trait ResponseTransform: Send + Sync {
    type Output: Send;

    fn transform(&self, raw: RawResponse) -> Result<Self::Output, TransformError>;
}

impl<F, T> ResponseTransform for F
where
    F: Fn(RawResponse) -> Result<T, TransformError> + Send + Sync,
    T: Send,
{
    type Output = T;

    fn transform(&self, raw: RawResponse) -> Result<T, TransformError> {
        self(raw)
    }
}

/// Returns the response body untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTransform;

impl ResponseTransform for IdentityTransform {
    type Output = Value;

    fn transform(&self, raw: RawResponse) -> Result<Value, TransformError> {
        Ok(raw.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(index: usize, body: Value) -> RawResponse {
        RawResponse {
            index,
            status: 200,
            body,
        }
    }

    #[test]
    fn test_identity_returns_body() {
        let out = IdentityTransform.transform(raw(0, json!({"sites": []}))).unwrap();
        assert_eq!(out, json!({"sites": []}));
    }

    #[test]
    fn test_closure_transform() {
        let tag = |r: RawResponse| -> Result<(usize, Value), TransformError> { Ok((r.index, r.body)) };
        let (index, body) = tag.transform(raw(7, json!("x"))).unwrap();
        assert_eq!(index, 7);
        assert_eq!(body, json!("x"));
    }

    #[test]
    fn test_closure_transform_can_reject() {
        let strict = |r: RawResponse| -> Result<String, TransformError> {
            r.body
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| TransformError::shape("expected a string"))
        };
        assert!(strict.transform(raw(0, json!(1))).is_err());
    }
}
