//! The `Function` trait implemented by every intrinsic.

use serde_json::Value;

use crate::error::ExprResult;

/// Long-form key of the reference intrinsic.
pub const REF: &str = "Ref";
/// Long-form key of the attribute intrinsic.
pub const GET_ATT: &str = "Fn::GetAtt";
/// Long-form key of the substitution intrinsic.
pub const SUB: &str = "Fn::Sub";
/// Long-form key of the range intrinsic.
pub const RANGE: &str = "Fn::Range";

/// A single intrinsic function that an [`Evaluator`](crate::Evaluator) can dispatch to.
///
/// Functions are recognized in two notations:
///
/// - long form, a mapping with exactly one key equal to [`Function::name`]
/// - short form, a string of the shape `!<short_name> <argument>`
///
/// `eval` returns `Ok(None)` when the function has nothing to say about the
/// argument in the current pass, which lets the evaluator try the next
/// registered function or fall back to generic recursion.
pub trait Function {
    /// Long-form key, e.g. `Fn::GetAtt`.
    fn name(&self) -> &str;

    /// Short-form tag without the leading `!`, e.g. `GetAtt`.
    fn short_name(&self) -> &str;

    /// Evaluate the function over its (unevaluated) argument.
    fn eval(&self, arg: &Value) -> ExprResult<Option<Value>>;
}
