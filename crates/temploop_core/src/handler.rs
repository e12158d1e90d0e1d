//! Request boundary.
//!
//! Wraps the [`Processor`] in the macro request/response envelope. Failures
//! never escape: they are logged and answered with `status: "fail"` and the
//! fragment exactly as it was received.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{error, info, info_span, Span};

use crate::config::ExpansionConfig;
use crate::engine::Processor;
use crate::error::EngineResult;

/// Incoming transform request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformRequest {
    #[serde(default)]
    pub request_id: String,

    #[serde(default)]
    pub fragment: Value,

    #[serde(default)]
    pub template_parameter_values: Map<String, Value>,

    /// `region`, `accountId`, `transformId`, `params` and the like.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Outcome reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformStatus {
    Success,
    Fail,
}

/// Transform response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformResponse {
    pub request_id: String,
    pub status: TransformStatus,
    pub fragment: Value,
}

impl TransformResponse {
    pub fn success(request_id: impl Into<String>, fragment: Value) -> Self {
        Self {
            request_id: request_id.into(),
            status: TransformStatus::Success,
            fragment,
        }
    }

    pub fn fail(request_id: impl Into<String>, fragment: Value) -> Self {
        Self {
            request_id: request_id.into(),
            status: TransformStatus::Fail,
            fragment,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == TransformStatus::Success
    }
}

/// Handle a typed request.
pub fn handle(request: &TransformRequest, config: &ExpansionConfig) -> TransformResponse {
    let span = info_span!("transform", request_id = %request.request_id);

    match transform(request, config, span.clone()) {
        Ok(fragment) => {
            span.in_scope(|| info!("Transformation succeeded"));
            TransformResponse::success(request.request_id.clone(), fragment)
        }
        Err(e) => {
            span.in_scope(|| error!("Transformation failed: {}", e));
            TransformResponse::fail(request.request_id.clone(), request.fragment.clone())
        }
    }
}

/// Handle a raw request envelope.
///
/// An envelope that does not even parse still gets a `fail` response echoing
/// whatever `requestId` and `fragment` it carried.
pub fn handle_value(request: &Value, config: &ExpansionConfig) -> TransformResponse {
    match serde_json::from_value::<TransformRequest>(request.clone()) {
        Ok(request) => handle(&request, config),
        Err(e) => {
            let request_id = request
                .get("requestId")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            error!(request_id = %request_id, "Malformed request: {}", e);
            let fragment = request.get("fragment").cloned().unwrap_or(Value::Null);
            TransformResponse::fail(request_id, fragment)
        }
    }
}

fn transform(request: &TransformRequest, config: &ExpansionConfig, span: Span) -> EngineResult<Value> {
    let processor = Processor::new(
        &request.fragment,
        &request.template_parameter_values,
        config.clone(),
    )?
    .with_span(span);
    processor.process().cloned()
}
