//! # temploop_core
//!
//! List expansion for CloudFormation-style template fragments.
//!
//! A resource declared with `Type: List<ElementType>` and an iteration
//! directive in its metadata is expanded into one concrete resource per
//! element:
//!
//! ```json
//! "Queue": {
//!   "Type": "List<AWS::SQS::Queue>",
//!   "Metadata": {"TempLoop::Iteration": {"Ref": "Names"}},
//!   "Properties": {"QueueName": {"Fn::Sub": "jobs-${TempLoop::Item}"}}
//! }
//! ```
//!
//! References to `Queue` elsewhere in the fragment are rewritten into lists of
//! references to the concrete queues.
//!
//! # Architecture
//!
//! - **Parameters**: merges declared defaults with caller overrides
//! - **Processor**: expands list resources and rewrites references, once
//! - **Handler**: request/response envelope around the processor
//!
//! ## Example
//!
//! ```rust
//! use serde_json::{json, Map};
//! use temploop_core::{ExpansionConfig, Processor};
//!
//! let fragment = json!({
//!     "Resources": {
//!         "Queue": {
//!             "Type": "List<AWS::SQS::Queue>",
//!             "Metadata": {"TempLoop::Iteration": ["a", "b"]},
//!             "Properties": {"QueueName": "!Sub jobs-${TempLoop::Item}"}
//!         }
//!     }
//! });
//!
//! let processor = Processor::new(&fragment, &Map::new(), ExpansionConfig::default()).unwrap();
//! let expanded = processor.process().unwrap();
//! assert_eq!(expanded["Resources"].as_object().unwrap().len(), 2);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod handler;
pub mod params;
pub mod template;

pub use config::{ExpansionConfig, ITEM_NAME, ITERATION_KEY, NAME_DIGEST_LEN};
pub use engine::{concrete_name, element_type, Processor};
pub use error::{EngineError, EngineResult};
pub use handler::{handle, handle_value, TransformRequest, TransformResponse, TransformStatus};
pub use params::{Parameters, ResolvedParameter};
pub use template::{ParameterDecl, Resource};
