//! `ListRef` and `ListGetAtt` for the post-expansion rewrite pass.
//!
//! Both answer to the ordinary `Ref` / `Fn::GetAtt` keys. A reference to a
//! name that was expanded becomes the ordered list of references to its
//! concrete instances; any other reference is left alone.

use std::collections::HashMap;

use serde_json::{json, Value};

use super::{attribute_target, string_arg};
use crate::error::ExprResult;
use crate::function::{Function, GET_ATT, REF};

/// Base resource name to the ordered concrete names it produced.
pub type ExpansionRecord = HashMap<String, Vec<String>>;

/// Rewrites `Ref` to an expanded name into a list of `Ref`s.
pub struct ListRef<'a> {
    record: &'a ExpansionRecord,
}

impl<'a> ListRef<'a> {
    pub fn new(record: &'a ExpansionRecord) -> Self {
        Self { record }
    }
}

impl Function for ListRef<'_> {
    fn name(&self) -> &str {
        REF
    }

    fn short_name(&self) -> &str {
        "Ref"
    }

    fn eval(&self, arg: &Value) -> ExprResult<Option<Value>> {
        let name = string_arg(REF, arg)?;
        Ok(self.record.get(name).map(|concrete| {
            Value::Array(concrete.iter().map(|c| json!({ REF: c })).collect())
        }))
    }
}

/// Rewrites `Fn::GetAtt` on an expanded name into a list of `Fn::GetAtt`s.
pub struct ListGetAtt<'a> {
    record: &'a ExpansionRecord,
}

impl<'a> ListGetAtt<'a> {
    pub fn new(record: &'a ExpansionRecord) -> Self {
        Self { record }
    }
}

impl Function for ListGetAtt<'_> {
    fn name(&self) -> &str {
        GET_ATT
    }

    fn short_name(&self) -> &str {
        "GetAtt"
    }

    fn eval(&self, arg: &Value) -> ExprResult<Option<Value>> {
        let target = attribute_target(GET_ATT, arg)?;
        let Some(concrete) = self.record.get(target.name) else {
            return Ok(None);
        };

        let refs = concrete
            .iter()
            .map(|c| match (target.pair, target.attribute) {
                (true, Some(attribute)) => json!({ GET_ATT: [c, attribute] }),
                (_, Some(attribute)) => json!({ GET_ATT: format!("{}.{}", c, attribute) }),
                (_, None) => json!({ GET_ATT: c }),
            })
            .collect();
        Ok(Some(Value::Array(refs)))
    }
}
