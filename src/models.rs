// src/models.rs
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

use crate::errors::DispatchError;

pub const SUBMISSION_CONTEXT_KEY: &str = "submission_context";
pub const SUBMISSION_COUNT_KEY: &str = "submissions_per_student_per_response_area";

/// The four fixed behaviours a request can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Command {
    #[default]
    Eval,
    Healthcheck,
    DocsUser,
    DocsDev,
}

impl Command {
    pub fn all() -> &'static [Command] {
        &[
            Command::Eval,
            Command::Healthcheck,
            Command::DocsUser,
            Command::DocsDev,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Eval => "eval",
            Command::Healthcheck => "healthcheck",
            Command::DocsUser => "docs-user",
            Command::DocsDev => "docs-dev",
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Command {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::all()
            .iter()
            .find(|c| c.as_str() == s)
            .copied()
            .ok_or_else(|| DispatchError::UnknownCommand(s.to_string()))
    }
}

/// An inbound request after schema validation.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub command: Option<String>,

    #[serde(default)]
    pub response: Value,

    #[serde(default)]
    pub answer: Value,

    #[serde(default)]
    pub params: Map<String, Value>,

    /// Prior submissions for the same response area by the same submitter.
    #[serde(default)]
    pub submission_count: u64,
}

impl Request {
    /// Returns `params` with `submission_context.submissions_per_student_per_response_area`
    /// set to the request's submission count. Every other caller key is kept.
    pub fn augmented_params(&self) -> Map<String, Value> {
        let mut params = self.params.clone();
        let context = params
            .entry(SUBMISSION_CONTEXT_KEY)
            .or_insert_with(|| Value::Object(Map::new()));
        if !context.is_object() {
            *context = Value::Object(Map::new());
        }
        if let Value::Object(context) = context {
            context.insert(
                SUBMISSION_COUNT_KEY.to_string(),
                Value::from(self.submission_count),
            );
        }
        params
    }
}

/// Previous submission count as seen by a comparison routine.
pub fn submission_count(params: &Map<String, Value>) -> u64 {
    params
        .get(SUBMISSION_CONTEXT_KEY)
        .and_then(|c| c.get(SUBMISSION_COUNT_KEY))
        .and_then(Value::as_u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_command_parsing() {
        assert_eq!("eval".parse::<Command>().unwrap(), Command::Eval);
        assert_eq!("docs-dev".parse::<Command>().unwrap(), Command::DocsDev);
        assert!(matches!(
            "evaluate".parse::<Command>(),
            Err(DispatchError::UnknownCommand(c)) if c == "evaluate"
        ));
    }

    #[test]
    fn test_default_command_is_eval() {
        assert_eq!(Command::default(), Command::Eval);
    }

    #[test]
    fn test_submission_context_added_when_absent() {
        let req: Request = serde_json::from_value(json!({
            "response": "a",
            "answer": "a",
            "params": {"strict": true},
            "submission_count": 3
        }))
        .unwrap();
        let params = req.augmented_params();
        assert_eq!(params["strict"], true);
        assert_eq!(
            params[SUBMISSION_CONTEXT_KEY],
            json!({SUBMISSION_COUNT_KEY: 3})
        );
        assert_eq!(submission_count(&params), 3);
    }

    #[test]
    fn test_non_object_submission_context_is_replaced() {
        let req: Request = serde_json::from_value(json!({
            "response": 1,
            "answer": 1,
            "params": {"submission_context": 3, "atol": 0.5},
            "submission_count": 2
        }))
        .unwrap();
        let params = req.augmented_params();
        assert_eq!(params["atol"], 0.5);
        assert_eq!(
            params[SUBMISSION_CONTEXT_KEY],
            json!({SUBMISSION_COUNT_KEY: 2})
        );
    }

    #[test]
    fn test_submission_context_keeps_caller_keys() {
        let req: Request = serde_json::from_value(json!({
            "response": 1,
            "answer": 1,
            "params": {"submission_context": {"attempt_label": "b", SUBMISSION_COUNT_KEY: 99}}
        }))
        .unwrap();
        let params = req.augmented_params();
        assert_eq!(
            params[SUBMISSION_CONTEXT_KEY],
            json!({"attempt_label": "b", SUBMISSION_COUNT_KEY: 0})
        );
    }
}
