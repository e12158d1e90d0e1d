//! Generic recursive evaluator over a template tree.

use std::fmt;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::trace;

use crate::error::{ExprError, ExprResult};
use crate::function::Function;
use crate::functions::{ExpansionRecord, GetAtt, ListGetAtt, ListRef, Range, Ref, Sub};
use crate::value::Scope;

struct Registered<'a> {
    function: Box<dyn Function + 'a>,
    short_form: Regex,
}

/// Evaluates intrinsic functions inside a `serde_json::Value` tree.
///
/// Functions are tried in registration order and the first one returning
/// `Some` wins. A function returning `None` leaves the node to the next
/// candidate, and finally to plain recursion.
///
/// ```
/// use std::collections::HashMap;
/// use serde_json::json;
/// use temploop_expr::{Evaluator, Ref};
///
/// let mut params = HashMap::new();
/// params.insert("Effect".to_string(), json!("Allow"));
///
/// let evaluator = Evaluator::new().with_function(Ref::new(&params)).unwrap();
/// let out = evaluator
///     .eval(&json!({"Statement": [{"Effect": "!Ref Effect", "Other": {"Ref": "Nope"}}]}))
///     .unwrap();
/// assert_eq!(out, json!({"Statement": [{"Effect": "Allow", "Other": {"Ref": "Nope"}}]}));
/// ```
#[derive(Default)]
pub struct Evaluator<'a> {
    functions: Vec<Registered<'a>>,
}

impl<'a> Evaluator<'a> {
    /// Create an evaluator with no functions registered.
    pub fn new() -> Self {
        Self {
            functions: Vec::new(),
        }
    }

    /// Register a function after all previously registered ones.
    pub fn with_function<F>(mut self, function: F) -> ExprResult<Self>
    where
        F: Function + 'a,
    {
        let short_form = short_form_pattern(function.short_name()).map_err(|source| {
            ExprError::Pattern {
                function: function.name().to_string(),
                source,
            }
        })?;
        self.functions.push(Registered {
            function: Box::new(function),
            short_form,
        });
        Ok(self)
    }

    /// Evaluator used to resolve iteration directives against parameters.
    ///
    /// `max_range_len` bounds the sequences `Fn::Range` may produce.
    pub fn for_directive(params: &'a Scope, max_range_len: usize) -> ExprResult<Self> {
        Self::new()
            .with_function(Ref::new(params))?
            .with_function(Range::with_max_len(max_range_len))
    }

    /// Evaluator used to resolve one expanded element's properties.
    pub fn for_element(bindings: &'a Scope) -> ExprResult<Self> {
        Self::new()
            .with_function(Ref::new(bindings))?
            .with_function(GetAtt::new(bindings))?
            .with_function(Sub::new(bindings))
    }

    /// Evaluator used by the post-expansion rewrite pass.
    pub fn for_rewrite(record: &'a ExpansionRecord) -> ExprResult<Self> {
        Self::new()
            .with_function(ListRef::new(record))?
            .with_function(ListGetAtt::new(record))
    }

    /// Long-form names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.functions.iter().map(|r| r.function.name()).collect()
    }

    /// Evaluate a tree, returning a new tree.
    pub fn eval(&self, value: &Value) -> ExprResult<Value> {
        match value {
            Value::String(s) => self.eval_str(s),
            Value::Array(items) => items
                .iter()
                .map(|item| self.eval(item))
                .collect::<ExprResult<Vec<_>>>()
                .map(Value::Array),
            Value::Object(map) => self.eval_map(map),
            other => Ok(other.clone()),
        }
    }

    fn eval_str(&self, s: &str) -> ExprResult<Value> {
        for registered in &self.functions {
            let Some(caps) = registered.short_form.captures(s) else {
                continue;
            };
            let arg = Value::String(caps.name("arg").map_or("", |m| m.as_str()).to_string());
            if let Some(result) = registered.function.eval(&arg)? {
                trace!("Short form '{}' resolved by {}", s, registered.function.name());
                return Ok(result);
            }
        }
        Ok(Value::String(s.to_string()))
    }

    fn eval_map(&self, map: &Map<String, Value>) -> ExprResult<Value> {
        if map.len() == 1 {
            if let Some((key, arg)) = map.iter().next() {
                for registered in self.functions.iter().filter(|r| r.function.name() == key) {
                    if let Some(result) = registered.function.eval(arg)? {
                        return Ok(result);
                    }
                }
            }
        }

        map.iter()
            .map(|(key, value)| Ok((key.clone(), self.eval(value)?)))
            .collect::<ExprResult<Map<String, Value>>>()
            .map(Value::Object)
    }
}

impl fmt::Debug for Evaluator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Evaluator")
            .field("functions", &self.names())
            .finish()
    }
}

/// `^\s*!<ShortName>\s*(?P<arg>.*)$`
fn short_form_pattern(short_name: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"^\s*!{}\s*(?P<arg>.*)$",
        regex::escape(short_name)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Answers every call with a fixed result.
    struct Fixed {
        name: &'static str,
        result: Option<Value>,
    }

    impl Function for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        fn short_name(&self) -> &str {
            self.name
        }

        fn eval(&self, _arg: &Value) -> ExprResult<Option<Value>> {
            Ok(self.result.clone())
        }
    }

    fn params() -> Scope {
        let mut params = Scope::new();
        params.insert("RoleName".to_string(), json!("test-role"));
        params.insert("Effect".to_string(), json!("Allow"));
        params
    }

    #[test]
    fn test_eval_nested_properties() {
        let params = params();
        let evaluator = Evaluator::new().with_function(Ref::new(&params)).unwrap();
        let props = json!({
            "RoleName": {"Ref": "RoleName"},
            "AssumeRolePolicyDocument": {
                "Version": "2012-10-17",
                "Statement": [{
                    "Effect": "!Ref Effect",
                    "Principal": {"Service": "lambda.amazonaws.com"},
                    "Action": "sts:AssumeRole"
                }]
            }
        });

        let out = evaluator.eval(&props).unwrap();
        assert_eq!(out["RoleName"], json!("test-role"));
        assert_eq!(out["AssumeRolePolicyDocument"]["Statement"][0]["Effect"], json!("Allow"));
        assert_eq!(out["AssumeRolePolicyDocument"]["Version"], json!("2012-10-17"));
    }

    #[test]
    fn test_short_and_long_form_agree() {
        let params = params();
        let evaluator = Evaluator::new().with_function(Ref::new(&params)).unwrap();
        assert_eq!(
            evaluator.eval(&json!("!Ref RoleName")).unwrap(),
            evaluator.eval(&json!({"Ref": "RoleName"})).unwrap()
        );
    }

    #[test]
    fn test_short_form_whitespace() {
        let params = params();
        let evaluator = Evaluator::new().with_function(Ref::new(&params)).unwrap();
        assert_eq!(evaluator.eval(&json!("  !Ref   Effect")).unwrap(), json!("Allow"));
        assert_eq!(evaluator.eval(&json!("!RefEffect")).unwrap(), json!("Allow"));
        // Trailing text belongs to the argument.
        assert_eq!(evaluator.eval(&json!("!Ref Effect ")).unwrap(), json!("!Ref Effect "));
        assert_eq!(evaluator.eval(&json!("Ref Effect")).unwrap(), json!("Ref Effect"));
    }

    #[test]
    fn test_unresolved_reference_is_kept() {
        let params = params();
        let evaluator = Evaluator::new().with_function(Ref::new(&params)).unwrap();
        let input = json!({"A": {"Ref": "AWS::AccountId"}, "B": "!Ref AWS::Region"});
        assert_eq!(evaluator.eval(&input).unwrap(), input);
    }

    #[test]
    fn test_none_falls_through_to_recursion() {
        let params = params();
        let evaluator = Evaluator::new().with_function(Ref::new(&params)).unwrap();
        // Ref of an undefined name recurses into its argument, which is a plain string.
        let input = json!({"Ref": "Missing"});
        assert_eq!(evaluator.eval(&input).unwrap(), input);
    }

    #[test]
    fn test_multi_key_map_is_not_a_call() {
        let params = params();
        let evaluator = Evaluator::new().with_function(Ref::new(&params)).unwrap();
        let out = evaluator
            .eval(&json!({"Ref": "RoleName", "Other": "!Ref Effect"}))
            .unwrap();
        assert_eq!(out, json!({"Ref": "RoleName", "Other": "Allow"}));
    }

    #[test]
    fn test_scalars_unchanged() {
        let evaluator = Evaluator::new();
        for value in [json!(1), json!(2.5), json!(true), Value::Null] {
            assert_eq!(evaluator.eval(&value).unwrap(), value);
        }
    }

    #[test]
    fn test_first_some_wins() {
        let evaluator = Evaluator::new()
            .with_function(Fixed { name: "Tag", result: None })
            .unwrap()
            .with_function(Fixed { name: "Tag", result: Some(json!("second")) })
            .unwrap()
            .with_function(Fixed { name: "Tag", result: Some(json!("third")) })
            .unwrap();

        assert_eq!(evaluator.eval(&json!({"Tag": 1})).unwrap(), json!("second"));
        assert_eq!(evaluator.eval(&json!("!Tag x")).unwrap(), json!("second"));
        assert_eq!(evaluator.names(), vec!["Tag", "Tag", "Tag"]);
    }

    #[test]
    fn test_function_error_propagates() {
        let params = params();
        let evaluator = Evaluator::new().with_function(Ref::new(&params)).unwrap();
        let err = evaluator.eval(&json!({"Props": [{"Ref": {"Nested": 1}}]})).unwrap_err();
        assert!(matches!(err, ExprError::Validation { .. }));
    }

    #[test]
    fn test_directive_evaluator_range() {
        let params = params();
        let evaluator = Evaluator::for_directive(&params, 5).unwrap();
        assert_eq!(evaluator.eval(&json!("!Range 2")).unwrap(), json!([0, 1]));
        assert_eq!(evaluator.eval(&json!({"Fn::Range": [1, 2]})).unwrap(), json!([1, 2]));
        assert!(evaluator.eval(&json!("!Range 6")).is_err());
    }
}
