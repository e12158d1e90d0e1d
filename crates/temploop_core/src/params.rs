//! Parameter resolution.
//!
//! Merges declared parameter defaults with caller-supplied overrides and
//! exposes the flat name to value map the reference functions resolve against.

use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::debug;

use temploop_expr::Scope;

use crate::error::{EngineError, EngineResult};
use crate::template::ParameterDecl;

/// Parameter type that CloudFormation passes as a comma-separated list.
const COMMA_DELIMITED_LIST: &str = "CommaDelimitedList";

/// A parameter after overrides have been applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParameter {
    /// Override if present, else the declared default, else null.
    pub value: Value,
    /// Declared type, empty when not declared.
    pub param_type: String,
}

/// Resolved template parameters.
#[derive(Debug, Clone, Default)]
pub struct Parameters {
    params: HashMap<String, ResolvedParameter>,
}

impl Parameters {
    /// Resolve declarations against overrides.
    ///
    /// Fails with [`EngineError::UndefinedParameter`] when an override names a
    /// parameter that was never declared.
    pub fn resolve(
        declarations: Option<&Map<String, Value>>,
        overrides: &Map<String, Value>,
    ) -> EngineResult<Self> {
        let mut params = HashMap::new();

        for (name, raw) in declarations.into_iter().flatten() {
            let decl: ParameterDecl = serde_json::from_value(raw.clone()).map_err(|e| {
                EngineError::InvalidFragment(format!("parameter [{}]: {}", name, e))
            })?;
            params.insert(
                name.clone(),
                ResolvedParameter {
                    value: decl.default.unwrap_or(Value::Null),
                    param_type: decl.param_type.unwrap_or_default(),
                },
            );
        }

        for (name, value) in overrides {
            let param = params
                .get_mut(name)
                .ok_or_else(|| EngineError::UndefinedParameter(name.clone()))?;
            param.value = value.clone();
        }

        for param in params.values_mut() {
            if is_list_type(&param.param_type) {
                if let Value::String(s) = &param.value {
                    param.value = split_list(s);
                }
            }
        }

        debug!("Resolved {} parameters", params.len());
        Ok(Self { params })
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedParameter> {
        self.params.get(name)
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.get(name).map(|p| &p.value)
    }

    pub fn param_type(&self, name: &str) -> Option<&str> {
        self.get(name).map(|p| p.param_type.as_str())
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Flatten to name → value.
    pub fn to_key_value(&self) -> Scope {
        self.params
            .iter()
            .map(|(name, param)| (name.clone(), param.value.clone()))
            .collect()
    }
}

fn is_list_type(param_type: &str) -> bool {
    param_type == COMMA_DELIMITED_LIST
        || (param_type.starts_with("List<") && param_type.ends_with('>'))
}

fn split_list(s: &str) -> Value {
    if s.trim().is_empty() {
        return Value::Array(Vec::new());
    }
    Value::Array(
        s.split(',')
            .map(|part| Value::String(part.trim().to_string()))
            .collect(),
    )
}
