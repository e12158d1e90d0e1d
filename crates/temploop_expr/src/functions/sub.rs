//! `Fn::Sub` string interpolation with deferred placeholders.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{json, Value};

use super::string_arg;
use crate::error::{ExprError, ExprResult};
use crate::function::{Function, SUB};
use crate::value::{kind, lookup, scalar_text, Scope};

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Match ${Name} placeholders
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid"))
}

/// Substitutes `${Name}` placeholders that resolve in the bound scope.
///
/// When every placeholder resolves the result is a plain string. Otherwise
/// the partially substituted template is returned still wrapped in
/// `{"Fn::Sub": ...}` so a later consumer can finish the job.
pub struct Sub<'a> {
    scope: &'a Scope,
}

impl<'a> Sub<'a> {
    pub fn new(scope: &'a Scope) -> Self {
        Self { scope }
    }
}

impl Function for Sub<'_> {
    fn name(&self) -> &str {
        SUB
    }

    fn short_name(&self) -> &str {
        "Sub"
    }

    fn eval(&self, arg: &Value) -> ExprResult<Option<Value>> {
        let template = string_arg(SUB, arg)?;

        let mut rendered = String::with_capacity(template.len());
        let mut last = 0;
        let mut deferred = false;

        for caps in placeholder_pattern().captures_iter(template) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            rendered.push_str(&template[last..whole.start()]);

            let name = &caps[1];
            match lookup(self.scope, name) {
                Some(value) => {
                    let text = scalar_text(value).ok_or_else(|| {
                        ExprError::validation(
                            SUB,
                            format!("placeholder '{}' is bound to a {}", name, kind(value)),
                        )
                    })?;
                    rendered.push_str(&text);
                }
                None => {
                    deferred = true;
                    rendered.push_str(whole.as_str());
                }
            }
            last = whole.end();
        }
        rendered.push_str(&template[last..]);

        if deferred {
            Ok(Some(json!({ SUB: rendered })))
        } else {
            Ok(Some(Value::String(rendered)))
        }
    }
}
