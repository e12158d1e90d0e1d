//! Typed views of the template parts the engine reads.
//!
//! Only list resources and parameter declarations are parsed. Unknown keys
//! ride along in `extra` and are serialized back untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{EngineError, EngineResult};

/// A single resource declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,

    #[serde(rename = "Metadata", default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,

    #[serde(rename = "Properties", default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Value>,

    /// `DependsOn`, `Condition`, `DeletionPolicy` and friends.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource {
    pub fn from_value(name: &str, value: &Value) -> EngineResult<Self> {
        serde_json::from_value(value.clone())
            .map_err(|e| EngineError::InvalidFragment(format!("resource [{}]: {}", name, e)))
    }

    pub fn to_value(&self) -> EngineResult<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// A parameter declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterDecl {
    #[serde(rename = "Type", default)]
    pub param_type: Option<String>,

    #[serde(rename = "Default", default)]
    pub default: Option<Value>,
}
