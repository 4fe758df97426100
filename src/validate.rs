// src/validate.rs
//! Shape checks for inbound requests and outbound envelopes.
//!
//! Problems are collected rather than reported first-only, so a caller sees
//! everything wrong with a payload in one round trip.

use serde_json::Value;

use crate::errors::{DispatchError, Result};
use crate::models::Command;

/// JSON type name used in problem messages.
pub fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Validates a request body for the given command.
pub fn validate_request(command: Command, body: &Value) -> Result<()> {
    let Some(map) = body.as_object() else {
        return Err(DispatchError::Validation(vec![format!(
            "request must be an object, got {}",
            kind(body)
        )]));
    };

    let mut problems = Vec::new();

    if let Some(cmd) = map.get("command") {
        if !cmd.is_string() {
            problems.push(format!("'command' must be a string, got {}", kind(cmd)));
        }
    }

    if let Some(params) = map.get("params") {
        if !params.is_object() {
            problems.push(format!("'params' must be an object, got {}", kind(params)));
        }
    }

    if let Some(count) = map.get("submission_count") {
        if count.as_u64().is_none() {
            problems.push("'submission_count' must be a non-negative integer".to_string());
        }
    }

    if command == Command::Eval {
        for field in ["response", "answer"] {
            if !map.contains_key(field) {
                problems.push(format!("'{}' is a required property", field));
            }
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(DispatchError::Validation(problems))
    }
}

/// Validates a serialized envelope.
pub fn validate_response(envelope: &Value) -> Result<()> {
    let Some(map) = envelope.as_object() else {
        return Err(DispatchError::Validation(vec![format!(
            "response must be an object, got {}",
            kind(envelope)
        )]));
    };

    let mut problems = Vec::new();

    let command = match map.get("command") {
        Some(Value::String(c)) => Some(c.as_str()),
        Some(other) => {
            problems.push(format!("'command' must be a string, got {}", kind(other)));
            None
        }
        None => {
            problems.push("'command' is a required property".to_string());
            None
        }
    };

    for key in map.keys() {
        if !matches!(key.as_str(), "command" | "result" | "error") {
            problems.push(format!("unexpected top-level property '{}'", key));
        }
    }

    match (map.get("result"), map.get("error")) {
        (Some(_), Some(_)) => {
            problems.push("'result' and 'error' are mutually exclusive".to_string());
        }
        (None, None) => {
            problems.push("one of 'result' or 'error' is required".to_string());
        }
        (Some(result), None) => {
            if command == Some(Command::Eval.as_str()) {
                check_eval_result(result, &mut problems);
            }
        }
        (None, Some(error)) => match error.as_object() {
            Some(error) => match error.get("message") {
                Some(Value::String(_)) => {}
                Some(other) => problems.push(format!(
                    "'error.message' must be a string, got {}",
                    kind(other)
                )),
                None => problems.push("'error.message' is a required property".to_string()),
            },
            None => problems.push(format!("'error' must be an object, got {}", kind(error))),
        },
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(DispatchError::Validation(problems))
    }
}

fn check_eval_result(result: &Value, problems: &mut Vec<String>) {
    let Some(result) = result.as_object() else {
        problems.push(format!("'result' must be an object, got {}", kind(result)));
        return;
    };
    if let Some(v) = result.get("is_correct").filter(|v| !v.is_boolean()) {
        problems.push(format!("'result.is_correct' must be a boolean, got {}", kind(v)));
    }
    if let Some(v) = result.get("feedback").filter(|v| !v.is_string()) {
        problems.push(format!("'result.feedback' must be a string, got {}", kind(v)));
    }
    if let Some(v) = result.get("warnings").filter(|v| !v.is_array()) {
        problems.push(format!("'result.warnings' must be an array, got {}", kind(v)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn problems(res: Result<()>) -> Vec<String> {
        match res {
            Err(DispatchError::Validation(p)) => p,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_null_response_counts_as_present() {
        assert!(validate_request(Command::Eval, &json!({"response": null, "answer": 1})).is_ok());
    }

    #[test]
    fn test_all_request_problems_reported() {
        let found = problems(validate_request(
            Command::Eval,
            &json!({"command": 5, "params": []}),
        ));
        assert_eq!(found.len(), 4);
    }

    #[test]
    fn test_healthcheck_needs_no_response() {
        assert!(validate_request(Command::Healthcheck, &json!({})).is_ok());
    }

    #[test]
    fn test_response_with_both_keys_rejected() {
        let found = problems(validate_response(&json!({
            "command": "eval", "result": {}, "error": {"message": "x"}
        })));
        assert_eq!(found, vec!["'result' and 'error' are mutually exclusive"]);
    }

    #[test]
    fn test_docs_result_may_be_a_string() {
        assert!(validate_response(&json!({"command": "docs-dev", "result": "aGk="})).is_ok());
    }
}
