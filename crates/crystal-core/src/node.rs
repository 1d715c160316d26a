use std::collections::HashMap;
use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;
use crate::tensor::ImageBatch;

/// Value kinds understood by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IoType {
    Image,
    Int,
    String,
}

impl IoType {
    /// Type tag as the host spells it
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Image => "IMAGE",
            Self::Int => "INT",
            Self::String => "STRING",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Int(i64),
    String(&'static str),
}

impl DefaultValue {
    fn to_json(&self) -> Value {
        match self {
            Self::Int(v) => json!(v),
            Self::String(v) => json!(v),
        }
    }

    fn to_input(&self) -> InputValue {
        match self {
            Self::Int(v) => InputValue::Int(*v),
            Self::String(v) => InputValue::String(v.to_string()),
        }
    }
}

/// One input widget declared to the host
#[derive(Debug, Clone, PartialEq)]
pub struct InputSpec {
    pub name: &'static str,
    pub kind: IoType,
    pub required: bool,
    pub default: Option<DefaultValue>,
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl InputSpec {
    pub fn required(name: &'static str, kind: IoType) -> Self {
        Self { name, kind, required: true, default: None, min: None, max: None }
    }

    pub fn optional(name: &'static str, kind: IoType) -> Self {
        Self { required: false, ..Self::required(name, kind) }
    }

    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_range(mut self, min: i64, max: i64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// `["INT", {"default": 2, "min": 1, "max": 200}]`, or just `["IMAGE"]`
    /// when the widget carries no options.
    fn to_json(&self) -> Value {
        let mut options = Map::new();
        if let Some(default) = &self.default {
            options.insert("default".into(), default.to_json());
        }
        if let Some(min) = self.min {
            options.insert("min".into(), json!(min));
        }
        if let Some(max) = self.max {
            options.insert("max".into(), json!(max));
        }

        if options.is_empty() {
            json!([self.kind.tag()])
        } else {
            json!([self.kind.tag(), options])
        }
    }
}

/// Static description of a node: everything the host needs before invoking it
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDescriptor {
    pub class_name: &'static str,
    pub display_name: &'static str,
    pub category: &'static str,
    pub function: &'static str,
    pub inputs: Vec<InputSpec>,
    pub outputs: Vec<IoType>,
}

impl NodeDescriptor {
    pub fn input(&self, name: &str) -> Option<&InputSpec> {
        self.inputs.iter().find(|spec| spec.name == name)
    }

    /// Input declarations grouped into `required` and `optional`
    pub fn input_types(&self) -> Value {
        let mut required = Map::new();
        let mut optional = Map::new();
        for spec in &self.inputs {
            let group = if spec.required { &mut required } else { &mut optional };
            group.insert(spec.name.to_string(), spec.to_json());
        }

        let mut types = Map::new();
        types.insert("required".into(), Value::Object(required));
        if !optional.is_empty() {
            types.insert("optional".into(), Value::Object(optional));
        }
        Value::Object(types)
    }

    pub fn manifest(&self) -> Value {
        json!({
            "display_name": self.display_name,
            "category": self.category,
            "function": self.function,
            "input_types": self.input_types(),
            "return_types": self.outputs,
        })
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NodeInputError {
    #[error("Missing required input '{0}'")]
    Missing(String),
    #[error("Input '{name}' expected {expected}, got {actual}")]
    WrongType {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputValue {
    Image(ImageBatch),
    Int(i64),
    String(String),
}

impl InputValue {
    pub fn kind(&self) -> IoType {
        match self {
            Self::Image(_) => IoType::Image,
            Self::Int(_) => IoType::Int,
            Self::String(_) => IoType::String,
        }
    }
}

/// Values the host passes to an invocation, keyed by input name
#[derive(Debug, Clone, Default)]
pub struct NodeInputs {
    values: HashMap<String, InputValue>,
}

impl NodeInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: InputValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: InputValue) {
        self.values.insert(name.into(), value);
    }

    /// Look up `name`, falling back to the descriptor default when the host
    /// left it out.
    fn resolve(&self, descriptor: &NodeDescriptor, name: &str) -> Result<InputValue, NodeInputError> {
        if let Some(value) = self.values.get(name) {
            return Ok(value.clone());
        }
        descriptor
            .input(name)
            .and_then(|spec| spec.default.as_ref())
            .map(DefaultValue::to_input)
            .ok_or_else(|| NodeInputError::Missing(name.to_string()))
    }

    pub fn image(&self, descriptor: &NodeDescriptor, name: &str) -> Result<ImageBatch, NodeInputError> {
        match self.resolve(descriptor, name)? {
            InputValue::Image(batch) => Ok(batch),
            other => Err(wrong_type(name, IoType::Image, other.kind())),
        }
    }

    pub fn int(&self, descriptor: &NodeDescriptor, name: &str) -> Result<i64, NodeInputError> {
        match self.resolve(descriptor, name)? {
            InputValue::Int(v) => Ok(v),
            other => Err(wrong_type(name, IoType::Int, other.kind())),
        }
    }

    pub fn string(&self, descriptor: &NodeDescriptor, name: &str) -> Result<String, NodeInputError> {
        match self.resolve(descriptor, name)? {
            InputValue::String(v) => Ok(v),
            other => Err(wrong_type(name, IoType::String, other.kind())),
        }
    }
}

fn wrong_type(name: &str, expected: IoType, actual: IoType) -> NodeInputError {
    NodeInputError::WrongType {
        name: name.to_string(),
        expected: expected.tag(),
        actual: actual.tag(),
    }
}

/// Values returned to the host, in the order of `NodeDescriptor::outputs`
#[derive(Debug, Clone, PartialEq)]
pub struct NodeOutputs(pub Vec<InputValue>);

impl NodeOutputs {
    pub fn image(&self, index: usize) -> Option<&ImageBatch> {
        match self.0.get(index) {
            Some(InputValue::Image(batch)) => Some(batch),
            _ => None,
        }
    }
}

/// A node the host can load: a fixed descriptor plus one entry point.
pub trait Node: Send + Sync {
    fn descriptor(&self) -> NodeDescriptor;

    fn invoke(&self, inputs: NodeInputs) -> anyhow::Result<NodeOutputs>;
}
