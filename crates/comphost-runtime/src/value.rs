//! Runtime values exchanged with component instances
//!
//! Inputs arrive as plain JSON-like values; component state is a set of
//! [`Output`] handles that may resolve after construction returns.

use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;

/// Ordered property bag (inputs, instance properties, harvested state)
pub type PropertyMap = IndexMap<String, Value>;

/// A dynamically typed runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(PropertyMap),
    /// An eventually-available value
    Output(Output),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_output(&self) -> Option<&Output> {
        match self {
            Value::Output(output) => Some(output),
            _ => None,
        }
    }

    pub fn is_output(&self) -> bool {
        matches!(self, Value::Output(_))
    }

    /// JSON form of the value. Pending outputs and non-finite numbers
    /// become `null`; resolved outputs are replaced by their value.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Value::Object(props) => serde_json::Value::Object(
                props
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Value::Output(output) => output
                .value()
                .map(Value::to_json)
                .unwrap_or(serde_json::Value::Null),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(props) => {
                Value::Object(props.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Output> for Value {
    fn from(output: Output) -> Self {
        Value::Output(output)
    }
}

struct OutputState {
    value: OnceCell<Value>,
    secret: bool,
    dependencies: Vec<String>,
}

/// Shared handle to a value that resolves at most once.
///
/// Clones share the same cell; equality is identity.
#[derive(Clone)]
pub struct Output(Arc<OutputState>);

impl Output {
    fn with_state(value: OnceCell<Value>, secret: bool, dependencies: Vec<String>) -> Self {
        Output(Arc::new(OutputState {
            value,
            secret,
            dependencies,
        }))
    }

    /// An output that has not resolved yet
    pub fn pending() -> Self {
        Self::with_state(OnceCell::new(), false, Vec::new())
    }

    /// A pending output that depends on the resources with these URNs
    pub fn depending_on(dependencies: Vec<String>) -> Self {
        Self::with_state(OnceCell::new(), false, dependencies)
    }

    pub fn resolved(value: impl Into<Value>) -> Self {
        Self::with_state(OnceCell::with_value(value.into()), false, Vec::new())
    }

    pub fn secret(value: impl Into<Value>) -> Self {
        Self::with_state(OnceCell::with_value(value.into()), true, Vec::new())
    }

    /// Resolve the output. Returns false if it was already resolved, or if
    /// `value` is this output itself.
    pub fn resolve(&self, value: impl Into<Value>) -> bool {
        let value = value.into();
        if let Value::Output(inner) = &value {
            if inner.ptr_eq(self) {
                return false;
            }
        }
        self.0.value.set(value).is_ok()
    }

    pub fn value(&self) -> Option<&Value> {
        self.0.value.get()
    }

    pub fn is_resolved(&self) -> bool {
        self.0.value.get().is_some()
    }

    pub fn is_secret(&self) -> bool {
        self.0.secret
    }

    pub fn dependencies(&self) -> &[String] {
        &self.0.dependencies
    }

    /// Whether both handles share one cell
    pub fn ptr_eq(&self, other: &Output) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Output {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("Output");
        match self.value() {
            Some(_) if self.is_secret() => {
                out.field("value", &"[secret]");
            }
            Some(value) => {
                out.field("value", value);
            }
            None => {
                out.field("value", &"<pending>");
            }
        }
        if !self.0.dependencies.is_empty() {
            out.field("dependencies", &self.0.dependencies);
        }
        out.finish()
    }
}
