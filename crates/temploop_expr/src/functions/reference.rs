//! `Ref` and `Fn::GetAtt` over a flat scope.

use serde_json::Value;

use super::{attribute_target, string_arg};
use crate::error::{ExprError, ExprResult};
use crate::function::{Function, GET_ATT, REF};
use crate::value::{kind, lookup, scalar_text, Scope};

/// Resolves `Ref` to the value bound to a name.
///
/// Undefined names yield `None` so the reference survives for a later pass.
pub struct Ref<'a> {
    scope: &'a Scope,
}

impl<'a> Ref<'a> {
    pub fn new(scope: &'a Scope) -> Self {
        Self { scope }
    }
}

impl Function for Ref<'_> {
    fn name(&self) -> &str {
        REF
    }

    fn short_name(&self) -> &str {
        "Ref"
    }

    fn eval(&self, arg: &Value) -> ExprResult<Option<Value>> {
        let name = string_arg(REF, arg)?;
        Ok(lookup(self.scope, name).cloned())
    }
}

/// Resolves `Fn::GetAtt` by substituting the bound value for the name part.
///
/// With an attribute suffix the result is `"<value>.<attribute>"`, so the bound
/// value must be a scalar identifier.
pub struct GetAtt<'a> {
    scope: &'a Scope,
}

impl<'a> GetAtt<'a> {
    pub fn new(scope: &'a Scope) -> Self {
        Self { scope }
    }
}

impl Function for GetAtt<'_> {
    fn name(&self) -> &str {
        GET_ATT
    }

    fn short_name(&self) -> &str {
        "GetAtt"
    }

    fn eval(&self, arg: &Value) -> ExprResult<Option<Value>> {
        let target = attribute_target(GET_ATT, arg)?;
        let Some(value) = lookup(self.scope, target.name) else {
            return Ok(None);
        };

        let Some(attribute) = target.attribute else {
            return Ok(Some(value.clone()));
        };

        let text = scalar_text(value).ok_or_else(|| {
            ExprError::validation(
                GET_ATT,
                format!(
                    "'{}' is bound to a {}, cannot append attribute '{}'",
                    target.name,
                    kind(value),
                    attribute
                ),
            )
        })?;
        Ok(Some(Value::String(format!("{}.{}", text, attribute))))
    }
}
