//! # temploop_expr
//!
//! Intrinsic-function expression evaluation for TempLoop.
//!
//! Templates are plain `serde_json::Value` trees. An [`Evaluator`] walks a tree
//! and replaces function invocations, written either in long form
//! (`{"Ref": "Name"}`) or short form (`"!Ref Name"`), by their results.
//!
//! The evaluator is parametrized by the functions registered on it, so the
//! same walker serves three passes:
//!
//! - directive resolution: [`Ref`] and [`Range`] over template parameters
//! - per-element resolution: [`Ref`], [`GetAtt`], [`Sub`] over the item binding
//! - reference rewrite: [`ListRef`], [`ListGetAtt`] over the expansion record

pub mod error;
pub mod evaluator;
pub mod function;
pub mod functions;
pub mod value;

pub use error::{ExprError, ExprResult};
pub use evaluator::Evaluator;
pub use function::{Function, GET_ATT, RANGE, REF, SUB};
pub use functions::{ExpansionRecord, GetAtt, ListGetAtt, ListRef, Range, Ref, Sub, MAX_RANGE_LEN};
pub use value::{kind, lookup, scalar_text, Scope};
