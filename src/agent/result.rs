use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::ProducerError;

/// Raw result of one agent invocation, reduced to a closed set of shapes.
#[derive(Debug, Clone)]
pub enum AgentResult {
    /// The agent returned bare text.
    PlainText(String),
    /// An object exposing named fields, an attribute map, task outputs and producer methods.
    FieldBag(FieldBag),
    /// An ordered list of task outputs with nothing else around it.
    NestedList(Vec<AgentResult>),
    /// A value that can only be asked to produce a mapping.
    Producer(Producer),
}

/// Object-shaped agent result.
///
/// `fields` are the attributes the object declares; `attributes` is the
/// separate key/value view of its instance state. JSON `null` counts as absent
/// in both.
#[derive(Debug, Clone, Default)]
pub struct FieldBag {
    fields: BTreeMap<String, Value>,
    attributes: BTreeMap<String, Value>,
    tasks_output: Option<Vec<AgentResult>>,
    producers: Vec<Producer>,
    display: Option<String>,
}

impl FieldBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn with_attribute(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    pub fn with_tasks_output(mut self, tasks: Vec<AgentResult>) -> Self {
        self.tasks_output = Some(tasks);
        self
    }

    pub fn with_producer(mut self, producer: Producer) -> Self {
        self.producers.push(producer);
        self
    }

    /// The object's own string form, used by text coercion.
    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).filter(|v| !v.is_null())
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name).filter(|v| !v.is_null())
    }

    pub fn has_attributes(&self) -> bool {
        !self.attributes.is_empty()
    }

    pub fn tasks_output(&self) -> Option<&[AgentResult]> {
        self.tasks_output.as_deref()
    }

    /// Producer registered under `method`, if any.
    pub fn producer(&self, method: &str) -> Option<&Producer> {
        self.producers.iter().find(|p| p.method() == method)
    }

    pub fn display(&self) -> Option<&str> {
        self.display.as_deref()
    }
}

type ProduceFn = dyn Fn() -> Result<Value, ProducerError> + Send + Sync;

/// A named zero-argument method returning a mapping (e.g. `to_dict`).
#[derive(Clone)]
pub struct Producer {
    method: String,
    produce: Arc<ProduceFn>,
}

impl Producer {
    pub fn new<F>(method: &str, produce: F) -> Self
    where
        F: Fn() -> Result<Value, ProducerError> + Send + Sync + 'static,
    {
        Self {
            method: method.to_string(),
            produce: Arc::new(produce),
        }
    }

    /// Producer that always yields a clone of `value`.
    pub fn returning(method: &str, value: Value) -> Self {
        Self::new(method, move || Ok(value.clone()))
    }

    /// Producer that always fails with `reason`.
    pub fn failing(method: &str, reason: &str) -> Self {
        let error = ProducerError {
            method: method.to_string(),
            reason: reason.to_string(),
        };
        Self::new(method, move || Err(error.clone()))
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn produce(&self) -> Result<Value, ProducerError> {
        (self.produce)()
    }
}

impl fmt::Debug for Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer")
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

/// Keys of a JSON object that hold the attribute-map view instead of a field.
const ATTRIBUTE_MAP_KEYS: &[&str] = &["__dict__", "attributes"];

impl AgentResult {
    /// Adapt an agent payload that arrived as JSON.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::String(text) => AgentResult::PlainText(text),
            Value::Array(items) => {
                AgentResult::NestedList(items.into_iter().map(AgentResult::from_json).collect())
            }
            Value::Object(map) => AgentResult::FieldBag(FieldBag::from_json_object(map)),
            other => AgentResult::PlainText(other.to_string()),
        }
    }

    /// Named field of an object-shaped result.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            AgentResult::FieldBag(bag) => bag.field(name),
            _ => None,
        }
    }

    /// Task outputs, if this result exposes any.
    pub fn tasks_output(&self) -> Option<&[AgentResult]> {
        match self {
            AgentResult::FieldBag(bag) => bag.tasks_output(),
            AgentResult::NestedList(items) => Some(items),
            _ => None,
        }
    }
}

impl FieldBag {
    fn from_json_object(map: Map<String, Value>) -> Self {
        let mut bag = FieldBag::new();
        for (key, value) in map {
            match value {
                Value::Array(items) if key == "tasks_output" => {
                    bag.tasks_output =
                        Some(items.into_iter().map(AgentResult::from_json).collect());
                }
                Value::Object(attrs) if ATTRIBUTE_MAP_KEYS.contains(&key.as_str()) => {
                    bag.attributes.extend(attrs);
                }
                value => {
                    bag.fields.insert(key, value);
                }
            }
        }
        if let Some(Value::String(raw)) = bag.fields.get("raw") {
            bag.display = Some(raw.clone());
        }
        bag
    }
}

impl From<&str> for AgentResult {
    fn from(text: &str) -> Self {
        AgentResult::PlainText(text.to_string())
    }
}

impl From<String> for AgentResult {
    fn from(text: String) -> Self {
        AgentResult::PlainText(text)
    }
}

impl From<FieldBag> for AgentResult {
    fn from(bag: FieldBag) -> Self {
        AgentResult::FieldBag(bag)
    }
}
