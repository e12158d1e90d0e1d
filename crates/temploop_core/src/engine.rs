//! List expansion engine.
//!
//! A resource whose `Type` is `List<ElementType>` is replaced by one concrete
//! resource of type `ElementType` per element of its iteration directive.
//! Afterwards every `Ref` / `Fn::GetAtt` to the expanded name, in resource
//! properties and output values, becomes the ordered list of references to
//! the concrete resources.

use std::collections::HashSet;
use std::sync::OnceLock;

use once_cell::unsync::OnceCell;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, info, Span};

use temploop_expr::{kind, Evaluator, ExpansionRecord, Scope};

use crate::config::ExpansionConfig;
use crate::error::{EngineError, EngineResult};
use crate::params::Parameters;
use crate::template::Resource;

const PARAMETERS: &str = "Parameters";
const RESOURCES: &str = "Resources";
const OUTPUTS: &str = "Outputs";

fn list_type_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^List<(?P<name>.+)>$").expect("list type pattern is valid"))
}

/// Element type of a `List<ElementType>` resource type, if it is one.
pub fn element_type(resource_type: &str) -> Option<&str> {
    list_type_pattern()
        .captures(resource_type)
        .and_then(|caps| caps.name("name"))
        .map(|m| m.as_str())
}

/// Deterministic name of the `index`-th resource expanded from `base`.
///
/// The suffix is the upper-case MD5 hex digest of `base` followed by the
/// decimal index, truncated to `digest_len` digits.
pub fn concrete_name(base: &str, index: usize, digest_len: usize) -> String {
    let digest = format!("{:x}", md5::compute(format!("{}{}", base, index))).to_uppercase();
    let len = digest_len.min(digest.len());
    format!("{}{}", base, &digest[..len])
}

/// Top-level mapping `key` of a fragment; absent and null are the same.
fn section<'v>(fragment: &'v Value, key: &str) -> EngineResult<Option<&'v Map<String, Value>>> {
    match fragment.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(other) => Err(EngineError::InvalidFragment(format!(
            "'{}' must be a mapping, got a {}",
            key,
            kind(other)
        ))),
    }
}

/// Evaluate `body[key]` in place when the key is present.
fn rewrite_field(evaluator: &Evaluator<'_>, body: &mut Value, key: &str) -> EngineResult<()> {
    if let Some(field) = body.get_mut(key) {
        *field = evaluator.eval(field)?;
    }
    Ok(())
}

/// Runs the expansion for one fragment.
///
/// The fragment is copied on construction and the result is computed once;
/// later calls to [`Processor::process`] return the cached fragment. Only
/// `List<...>` resources are parsed; everything else is carried through as
/// the raw tree.
pub struct Processor {
    fragment: Value,
    scope: Scope,
    config: ExpansionConfig,
    span: Span,
    processed: OnceCell<Value>,
}

impl Processor {
    /// Prepare a transformation of `fragment` with caller parameter overrides.
    pub fn new(
        fragment: &Value,
        overrides: &Map<String, Value>,
        config: ExpansionConfig,
    ) -> EngineResult<Self> {
        config.validate()?;
        if !fragment.is_object() {
            return Err(EngineError::InvalidFragment(format!(
                "expected a mapping, got a {}",
                kind(fragment)
            )));
        }
        section(fragment, RESOURCES)?;
        section(fragment, OUTPUTS)?;

        let params = Parameters::resolve(section(fragment, PARAMETERS)?, overrides)?;
        let scope = params.to_key_value();

        Ok(Self {
            fragment: fragment.clone(),
            scope,
            config,
            span: Span::current(),
            processed: OnceCell::new(),
        })
    }

    /// Run all work of this processor inside `span`.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Whether [`Processor::process`] has already produced a result.
    pub fn is_processed(&self) -> bool {
        self.processed.get().is_some()
    }

    /// Expand the fragment, or return the result of an earlier run.
    pub fn process(&self) -> EngineResult<&Value> {
        self.processed.get_or_try_init(|| self.run())
    }

    fn run(&self) -> EngineResult<Value> {
        let _entered = self.span.enter();
        let mut fragment = self.fragment.clone();
        let mut record = ExpansionRecord::new();

        let mut expanded = Vec::new();
        let mut seen = HashSet::new();
        for (name, body) in section(&self.fragment, RESOURCES)?.into_iter().flatten() {
            for (concrete, body) in self.expand(name, body, &mut record)? {
                if !seen.insert(concrete.clone()) {
                    return Err(EngineError::DuplicateResource(concrete));
                }
                expanded.push((concrete, body));
            }
        }

        let rewrite = Evaluator::for_rewrite(&record)?;

        if let Some(Value::Object(resources)) = fragment.get_mut(RESOURCES) {
            resources.clear();
            for (name, mut body) in expanded {
                rewrite_field(&rewrite, &mut body, "Properties")?;
                resources.insert(name, body);
            }
        }

        if let Some(Value::Object(outputs)) = fragment.get_mut(OUTPUTS) {
            for body in outputs.values_mut() {
                rewrite_field(&rewrite, body, "Value")?;
            }
        }

        info!(
            "Expanded {} list resources into {} resources",
            record.len(),
            record.values().map(Vec::len).sum::<usize>()
        );
        Ok(fragment)
    }

    /// Expand one resource, recording the concrete names it produced.
    fn expand(
        &self,
        name: &str,
        body: &Value,
        record: &mut ExpansionRecord,
    ) -> EngineResult<Vec<(String, Value)>> {
        let Some(element_type) = body
            .get("Type")
            .and_then(Value::as_str)
            .and_then(element_type)
        else {
            return Ok(vec![(name.to_string(), body.clone())]);
        };

        let resource = Resource::from_value(name, body)?;
        let elements = self.resolve_directive(name, &resource)?;
        info!("Expanding [{}] into {} x {}", name, elements.len(), element_type);

        let concrete = elements
            .iter()
            .enumerate()
            .map(|(index, element)| {
                Ok((
                    concrete_name(name, index, self.config.name_digest_len),
                    self.materialize(&resource, element_type, element)?.to_value()?,
                ))
            })
            .collect::<EngineResult<Vec<_>>>()?;

        record.insert(
            name.to_string(),
            concrete.iter().map(|(n, _)| n.clone()).collect(),
        );
        Ok(concrete)
    }

    /// Resolve the iteration directive of a list resource to its elements.
    fn resolve_directive(&self, name: &str, resource: &Resource) -> EngineResult<Vec<Value>> {
        let key = &self.config.iteration_key;
        let directive = resource
            .metadata
            .as_ref()
            .and_then(|metadata| metadata.get(key))
            .filter(|directive| !directive.is_null())
            .ok_or_else(|| EngineError::MissingDirective {
                resource: name.to_string(),
                key: key.clone(),
            })?;

        match directive {
            Value::Array(items) => Ok(items.clone()),
            Value::String(_) | Value::Object(_) => {
                let evaluator = Evaluator::for_directive(&self.scope, self.config.max_range_len)?;
                match evaluator.eval(directive)? {
                    Value::Array(items) => {
                        debug!("Directive of [{}] resolved to {} elements", name, items.len());
                        Ok(items)
                    }
                    other => Err(EngineError::NonSequenceDirective {
                        resource: name.to_string(),
                        found: kind(&other).to_string(),
                    }),
                }
            }
            other => Err(EngineError::InvalidDirectiveType {
                resource: name.to_string(),
                key: key.clone(),
                found: kind(other).to_string(),
            }),
        }
    }

    /// Build the concrete resource for one element.
    fn materialize(
        &self,
        resource: &Resource,
        element_type: &str,
        element: &Value,
    ) -> EngineResult<Resource> {
        let mut bindings = Scope::new();
        bindings.insert(self.config.item_name.clone(), element.clone());
        let evaluator = Evaluator::for_element(&bindings)?;

        let mut concrete = resource.clone();
        concrete.properties = resource
            .properties
            .as_ref()
            .map(|properties| evaluator.eval(properties))
            .transpose()?;
        concrete.resource_type = Some(element_type.to_string());

        if let Some(metadata) = concrete.metadata.as_mut() {
            metadata.retain(|key, _| key != &self.config.iteration_key);
        }
        if concrete.metadata.as_ref().is_some_and(Map::is_empty) {
            concrete.metadata = None;
        }
        Ok(concrete)
    }
}
