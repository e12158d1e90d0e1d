//! `Fn::Range` for count-based iteration directives.

use serde_json::Value;

use crate::error::{ExprError, ExprResult};
use crate::function::{Function, RANGE};
use crate::value::kind;

/// Default upper bound on the number of elements a range may produce.
pub const MAX_RANGE_LEN: usize = 10_000;

/// Produces a sequence of consecutive integers.
///
/// Accepts `n`, `[start, count]`, or the same as a string (`"n"`,
/// `"start, count"`, `"start count"`), since the short form always
/// captures its argument as text. Counts above the configured maximum are
/// rejected before anything is allocated.
#[derive(Debug, Clone, Copy)]
pub struct Range {
    max_len: usize,
}

impl Default for Range {
    fn default() -> Self {
        Self::with_max_len(MAX_RANGE_LEN)
    }
}

impl Range {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_len(max_len: usize) -> Self {
        Self { max_len }
    }

    fn bounds(arg: &Value) -> ExprResult<(i64, i64)> {
        match arg {
            Value::Number(_) => Ok((0, integer(arg)?)),
            Value::Array(items) if items.len() == 2 => Ok((integer(&items[0])?, integer(&items[1])?)),
            Value::String(s) => {
                let parts: Vec<&str> = s
                    .split(|c: char| c == ',' || c.is_whitespace())
                    .filter(|part| !part.is_empty())
                    .collect();
                match parts.as_slice() {
                    [count] => Ok((0, parse_integer(count)?)),
                    [start, count] => Ok((parse_integer(start)?, parse_integer(count)?)),
                    _ => Err(ExprError::validation(
                        RANGE,
                        format!("expected 'count' or 'start, count', got '{}'", s),
                    )),
                }
            }
            other => Err(ExprError::validation(
                RANGE,
                format!("expected an integer or [start, count], got a {}", kind(other)),
            )),
        }
    }
}

impl Function for Range {
    fn name(&self) -> &str {
        RANGE
    }

    fn short_name(&self) -> &str {
        "Range"
    }

    fn eval(&self, arg: &Value) -> ExprResult<Option<Value>> {
        let (start, count) = Self::bounds(arg)?;
        if count < 0 {
            return Err(ExprError::validation(
                RANGE,
                format!("count must not be negative, got {}", count),
            ));
        }
        if count as u64 > self.max_len as u64 {
            return Err(ExprError::validation(
                RANGE,
                format!("count {} exceeds the maximum of {}", count, self.max_len),
            ));
        }
        let end = start
            .checked_add(count)
            .ok_or_else(|| ExprError::validation(RANGE, "range end overflows"))?;

        Ok(Some(Value::Array((start..end).map(Value::from).collect())))
    }
}

fn integer(value: &Value) -> ExprResult<i64> {
    value.as_i64().ok_or_else(|| {
        ExprError::validation(RANGE, format!("expected an integer, got {}", value))
    })
}

fn parse_integer(text: &str) -> ExprResult<i64> {
    text.parse::<i64>().map_err(|_| {
        ExprError::validation(RANGE, format!("expected an integer, got '{}'", text))
    })
}
