// src/envelope.rs
//! The two-shape output contract: `{command, result}` or `{command, error}`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::DispatchError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Result(Value),
    Error(Map<String, Value>),
}

/// One response to one request. Exactly one of `result` or `error` is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub command: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl Envelope {
    pub fn success(command: impl Into<String>, result: Value) -> Self {
        Self {
            command: command.into(),
            outcome: Outcome::Result(result),
        }
    }

    pub fn failure(command: impl Into<String>, error: Map<String, Value>) -> Self {
        Self {
            command: command.into(),
            outcome: Outcome::Error(error),
        }
    }

    pub fn from_error(command: impl Into<String>, err: &DispatchError) -> Self {
        Self::failure(command, err.to_error_body())
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Result(_))
    }

    pub fn result(&self) -> Option<&Value> {
        match &self.outcome {
            Outcome::Result(value) => Some(value),
            Outcome::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&Map<String, Value>> {
        match &self.outcome {
            Outcome::Error(body) => Some(body),
            Outcome::Result(_) => None,
        }
    }

    pub fn to_value(&self) -> Value {
        let key = match self.outcome {
            Outcome::Result(_) => "result",
            Outcome::Error(_) => "error",
        };
        let payload = match &self.outcome {
            Outcome::Result(value) => value.clone(),
            Outcome::Error(body) => Value::Object(body.clone()),
        };
        let mut map = Map::with_capacity(2);
        map.insert("command".to_string(), Value::String(self.command.clone()));
        map.insert(key.to_string(), payload);
        Value::Object(map)
    }
}
