//! Cascade asset model and the response transform that produces it.
//!
//! Read responses wrap the asset as `{"asset": {"<type>": {...}}}`. The
//! transform unwraps that envelope, records `<type>` and replaces every
//! list-valued property by the asset identifiers it contains. Responses
//! without an envelope (`listSites`, `listMessages`, ...) pass through as
//! plain values.

use crate::error::TransformError;
use crate::response::RawResponse;
use crate::transform::ResponseTransform;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Reference to an asset by type and id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CascadeIdentifier {
    pub id: String,
    #[serde(rename = "type")]
    pub asset_type: String,
}

impl CascadeIdentifier {
    pub fn new(asset_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            asset_type: asset_type.into(),
        }
    }

    /// Recognise an identifier object.
    ///
    /// Only objects with exactly `id` (string), `type` (string), `path`
    /// (object) and `recycled` (bool) qualify.
    pub fn from_json(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        if obj.len() != 4 {
            return None;
        }
        let id = obj.get("id")?.as_str()?;
        let asset_type = obj.get("type")?.as_str()?;
        obj.get("path")?.as_object()?;
        obj.get("recycled")?.as_bool()?;
        Some(Self::new(asset_type, id))
    }

    /// Build an identifier from any object carrying string `type` and `id`,
    /// ignoring other keys.
    pub fn from_reference(value: &Value) -> Result<Self, TransformError> {
        let field = |name: &str| {
            value
                .get(name)
                .and_then(Value::as_str)
                .ok_or_else(|| TransformError::shape(format!("reference has no string '{}'", name)))
        };
        Ok(Self::new(field("type")?, field("id")?))
    }
}

impl fmt::Display for CascadeIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.asset_type, self.id)
    }
}

/// A property of a parsed asset
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AssetProperty {
    Identifiers(Vec<CascadeIdentifier>),
    Value(Value),
}

impl AssetProperty {
    pub fn as_identifiers(&self) -> Option<&[CascadeIdentifier]> {
        match self {
            AssetProperty::Identifiers(ids) => Some(ids.as_slice()),
            AssetProperty::Value(_) => None,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            AssetProperty::Value(v) => Some(v),
            AssetProperty::Identifiers(_) => None,
        }
    }
}

/// Parsed response with properties kept in server order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CascadeAsset {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<String>,
    #[serde(flatten)]
    pub properties: IndexMap<String, AssetProperty>,
}

impl CascadeAsset {
    pub fn get(&self, name: &str) -> Option<&AssetProperty> {
        self.properties.get(name)
    }

    pub fn id(&self) -> Option<&str> {
        self.get("id")?.as_value()?.as_str()
    }

    pub fn identifier(&self) -> Option<CascadeIdentifier> {
        Some(CascadeIdentifier::new(self.asset_type.as_deref()?, self.id()?))
    }

    pub fn identifiers(&self, name: &str) -> &[CascadeIdentifier] {
        self.get(name)
            .and_then(AssetProperty::as_identifiers)
            .unwrap_or(&[])
    }

    /// Identifiers for every element of the list property `name`, built from
    /// each element's `type` and `id`. A missing property is an empty list.
    pub fn references(&self, name: &str) -> Result<Vec<CascadeIdentifier>, TransformError> {
        match self.get(name) {
            None | Some(AssetProperty::Value(Value::Null)) => Ok(Vec::new()),
            Some(AssetProperty::Identifiers(ids)) => Ok(ids.clone()),
            Some(AssetProperty::Value(Value::Array(items))) => {
                items.iter().map(CascadeIdentifier::from_reference).collect()
            }
            Some(AssetProperty::Value(_)) => Err(TransformError::shape(format!(
                "property '{}' is not a list",
                name
            ))),
        }
    }
}

/// Unwraps asset envelopes into [`CascadeAsset`] values
#[derive(Debug, Clone, Copy, Default)]
pub struct AssetTransform;

impl AssetTransform {
    fn parse(body: Value) -> Result<CascadeAsset, TransformError> {
        let Value::Object(mut root) = body else {
            return Err(TransformError::shape("response is not a JSON object"));
        };

        // Cascade reports operation failures in a 200 body
        if root.get("success") == Some(&Value::Bool(false)) {
            let message = root
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("no message")
                .to_string();
            return Err(TransformError::remote(message));
        }

        match root.remove("asset") {
            Some(Value::Object(envelope)) => {
                let mut entries = envelope.into_iter();
                let Some((asset_type, inner)) = entries.next() else {
                    return Err(TransformError::shape("asset envelope is empty"));
                };
                let Value::Object(fields) = inner else {
                    return Err(TransformError::shape(format!(
                        "asset '{}' is not an object",
                        asset_type
                    )));
                };
                Ok(CascadeAsset {
                    asset_type: Some(asset_type),
                    properties: Self::convert_properties(fields),
                })
            }
            Some(Value::Null) | None => Ok(CascadeAsset {
                asset_type: None,
                properties: root
                    .into_iter()
                    .map(|(name, value)| (name, AssetProperty::Value(value)))
                    .collect(),
            }),
            Some(_) => Err(TransformError::shape("asset envelope is not an object")),
        }
    }

    fn convert_properties(fields: Map<String, Value>) -> IndexMap<String, AssetProperty> {
        fields
            .into_iter()
            .map(|(name, value)| {
                let property = match value {
                    Value::Array(items) if !items.is_empty() => AssetProperty::Identifiers(
                        items.iter().filter_map(CascadeIdentifier::from_json).collect(),
                    ),
                    other => AssetProperty::Value(other),
                };
                (name, property)
            })
            .collect()
    }
}

impl ResponseTransform for AssetTransform {
    type Output = CascadeAsset;

    fn transform(&self, raw: RawResponse) -> Result<CascadeAsset, TransformError> {
        Self::parse(raw.body)
    }
}
