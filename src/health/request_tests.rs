// src/health/request_tests.rs
use serde_json::{Value, json};

use super::{TestCase, check};
use crate::errors::DispatchError;
use crate::models::{Command, Request};
use crate::validate::validate_request;

fn rejected(command: Command, body: Value, needle: &'static str) -> Result<(), String> {
    match validate_request(command, &body) {
        Err(DispatchError::Validation(problems)) => check(
            problems.iter().any(|p| p.contains(needle)),
            format!("no problem mentioning '{}' in {:?}", needle, problems),
        ),
        Err(other) => Err(format!("unexpected error: {}", other)),
        Ok(()) => Err(format!("request was accepted: {}", body)),
    }
}

/// Checks that request validation accepts well-formed bodies and rejects the rest.
pub fn request_tests() -> Vec<TestCase> {
    vec![
        TestCase::new("minimal eval request is valid", || {
            validate_request(Command::Eval, &json!({"response": "a", "answer": "a"}))
                .map_err(|e| e.to_string())
        }),
        TestCase::new("full eval request is valid", || {
            validate_request(
                Command::Eval,
                &json!({
                    "command": "eval",
                    "response": [1, 2],
                    "answer": {"x": 1},
                    "params": {"strict": true},
                    "submission_count": 2
                }),
            )
            .map_err(|e| e.to_string())
        }),
        TestCase::new("missing response is rejected", || {
            rejected(Command::Eval, json!({"answer": 1}), "'response'")
        }),
        TestCase::new("missing answer is rejected", || {
            rejected(Command::Eval, json!({"response": 1}), "'answer'")
        }),
        TestCase::new("non-object params are rejected", || {
            rejected(
                Command::Eval,
                json!({"response": 1, "answer": 1, "params": "strict"}),
                "'params'",
            )
        }),
        TestCase::new("negative submission count is rejected", || {
            rejected(
                Command::Eval,
                json!({"response": 1, "answer": 1, "submission_count": -1}),
                "'submission_count'",
            )
        }),
        TestCase::new("non-object body is rejected", || {
            rejected(Command::Eval, json!([1, 2]), "must be an object")
        }),
        TestCase::new("healthcheck needs no response or answer", || {
            validate_request(Command::Healthcheck, &json!({"command": "healthcheck"}))
                .map_err(|e| e.to_string())
        }),
        TestCase::new("valid body decodes with submission context", || {
            let req: Request = serde_json::from_value(json!({
                "response": "a", "answer": "b", "submission_count": 5
            }))
            .map_err(|e| e.to_string())?;
            check(
                crate::models::submission_count(&req.augmented_params()) == 5,
                "submission count not carried into params",
            )
        }),
    ]
}
