//! Inbound tool calls and argument decoding.
//!
//! The runtime hands us a `required_action` object; these types mirror its
//! JSON shape so the gateway can deserialize request bodies directly, and
//! [`decode_arguments`] is the one place raw argument strings are parsed.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Identifier of the run a batch of outputs is submitted to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredAction {
    pub submit_tool_outputs: SubmitToolOutputs,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitToolOutputs {
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub function: FunctionCall,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded argument object, exactly as the model produced it.
    pub arguments: String,
}

impl RequiredAction {
    pub fn new(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            submit_tool_outputs: SubmitToolOutputs { tool_calls },
        }
    }

    pub fn tool_calls(&self) -> &[ToolCall] {
        &self.submit_tool_outputs.tool_calls
    }
}

impl ToolCall {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }

    pub fn call_id(&self) -> &str {
        &self.id
    }

    pub fn function_name(&self) -> &str {
        &self.function.name
    }
}

/// One entry of a submission batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub tool_call_id: String,
    pub output: String,
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("arguments are not valid JSON: {source}")]
    Malformed {
        #[source]
        source: serde_json::Error,
    },
    #[error("arguments must be a JSON object, got {kind}")]
    NotAnObject { kind: &'static str },
}

/// Decoded argument object of a single tool call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(Map<String, Value>);

impl Arguments {
    /// The `Name` argument. Missing or non-string values read as `""`,
    /// which never matches a catalog entry.
    pub fn name(&self) -> &str {
        self.0.get("Name").and_then(Value::as_str).unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

impl From<Map<String, Value>> for Arguments {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

pub fn decode_arguments(raw: &str) -> Result<Arguments, DecodeError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|source| DecodeError::Malformed { source })?;

    match value {
        Value::Object(map) => Ok(Arguments(map)),
        Value::Null => Err(DecodeError::NotAnObject { kind: "null" }),
        Value::Bool(_) => Err(DecodeError::NotAnObject { kind: "a boolean" }),
        Value::Number(_) => Err(DecodeError::NotAnObject { kind: "a number" }),
        Value::String(_) => Err(DecodeError::NotAnObject { kind: "a string" }),
        Value::Array(_) => Err(DecodeError::NotAnObject { kind: "an array" }),
    }
}
