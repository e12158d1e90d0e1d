//! Intrinsic function implementations.
//!
//! - [`Ref`], [`GetAtt`], [`Sub`] resolve names against a flat [`Scope`](crate::Scope)
//! - [`Range`] produces integer sequences for iteration directives
//! - [`ListRef`], [`ListGetAtt`] fan references out over an [`ExpansionRecord`]

mod list;
mod range;
mod reference;
mod sub;

pub use list::{ExpansionRecord, ListGetAtt, ListRef};
pub use range::{Range, MAX_RANGE_LEN};
pub use reference::{GetAtt, Ref};
pub use sub::Sub;

use serde_json::Value;

use crate::error::{ExprError, ExprResult};
use crate::value::kind;

/// Parsed argument of an attribute lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AttributeTarget<'v> {
    pub name: &'v str,
    pub attribute: Option<&'v str>,
    /// Whether the argument used the `[Name, Attr]` sequence form.
    pub pair: bool,
}

/// Parse `"Name"`, `"Name.Attr"` or `["Name", "Attr"]`.
pub(crate) fn attribute_target<'v>(
    function: &str,
    arg: &'v Value,
) -> ExprResult<AttributeTarget<'v>> {
    match arg {
        Value::String(s) => {
            let (name, attribute) = match s.split_once('.') {
                Some((name, attribute)) => (name, Some(attribute)),
                None => (s.as_str(), None),
            };
            Ok(AttributeTarget {
                name,
                attribute,
                pair: false,
            })
        }
        Value::Array(items) if items.len() == 2 => match (items[0].as_str(), items[1].as_str()) {
            (Some(name), Some(attribute)) => Ok(AttributeTarget {
                name,
                attribute: Some(attribute),
                pair: true,
            }),
            _ => Err(ExprError::validation(
                function,
                "expected [name, attribute] to hold two strings",
            )),
        },
        other => Err(ExprError::validation(
            function,
            format!("expected a string or [name, attribute], got a {}", kind(other)),
        )),
    }
}

/// Require a string argument.
pub(crate) fn string_arg<'v>(function: &str, arg: &'v Value) -> ExprResult<&'v str> {
    arg.as_str().ok_or_else(|| {
        ExprError::validation(function, format!("expected a string, got a {}", kind(arg)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attribute_target_forms() {
        let dotted = json!("Bucket.Arn");
        let target = attribute_target("Fn::GetAtt", &dotted).unwrap();
        assert_eq!(target.name, "Bucket");
        assert_eq!(target.attribute, Some("Arn"));
        assert!(!target.pair);

        let bare = json!("Bucket");
        let target = attribute_target("Fn::GetAtt", &bare).unwrap();
        assert_eq!(target.attribute, None);

        let nested = json!("Bucket.Endpoint.Address");
        let target = attribute_target("Fn::GetAtt", &nested).unwrap();
        assert_eq!(target.name, "Bucket");
        assert_eq!(target.attribute, Some("Endpoint.Address"));

        let pair = json!(["Bucket", "Arn"]);
        let target = attribute_target("Fn::GetAtt", &pair).unwrap();
        assert_eq!(target.name, "Bucket");
        assert!(target.pair);
    }

    #[test]
    fn test_attribute_target_rejects_other_shapes() {
        assert!(attribute_target("Fn::GetAtt", &json!(1)).is_err());
        assert!(attribute_target("Fn::GetAtt", &json!(["Bucket"])).is_err());
        assert!(attribute_target("Fn::GetAtt", &json!(["Bucket", 1])).is_err());
    }
}
