// src/dispatch.rs
use serde_json::Value;
use std::sync::Arc;

use crate::docs::{DocKind, DocsSource};
use crate::envelope::Envelope;
use crate::errors::{DispatchError, EvalFailure, Result};
use crate::function::EvaluationFunction;
use crate::health::{self, HealthcheckSummary};
use crate::models::{Command, Request};
use crate::runner;
use crate::validate::validate_request;

/// Routes a request to one of the four fixed behaviours.
///
/// Holds the single comparison routine and the documentation source a
/// deployment is built with.
#[derive(Clone)]
pub struct Dispatcher {
    function: Arc<dyn EvaluationFunction>,
    docs: DocsSource,
}

impl Dispatcher {
    pub fn new(function: Arc<dyn EvaluationFunction>, docs: DocsSource) -> Self {
        Self { function, docs }
    }

    pub fn function_name(&self) -> &str {
        self.function.name()
    }

    /// Resolves the selector: body `command`, then `fallback` (e.g. a header), then `eval`.
    ///
    /// Returns the raw selector alongside the parse so an unknown value can still be
    /// echoed back in the envelope. A body `command` that is not a string is a routing
    /// failure; the fallback is not consulted.
    pub fn resolve_command(body: &Value, fallback: Option<&str>) -> (String, Result<Command>) {
        let raw = match body.get("command") {
            Some(Value::String(c)) => Some(c.clone()),
            Some(other) => {
                let raw = other.to_string();
                return (raw.clone(), Err(DispatchError::UnknownCommand(raw)));
            }
            None => fallback.map(str::to_string),
        };
        match raw {
            Some(raw) => {
                let parsed = raw.parse::<Command>();
                (raw, parsed)
            }
            None => (Command::default().to_string(), Ok(Command::default())),
        }
    }

    /// Handles one request body. Always yields exactly one envelope.
    pub fn dispatch(&self, body: &Value, fallback_command: Option<&str>) -> Envelope {
        let (raw, command) = Self::resolve_command(body, fallback_command);
        let command = match command {
            Ok(command) => command,
            Err(err) => {
                log::warn!("rejecting request: {}", err);
                return Envelope::from_error(raw, &err);
            }
        };

        log::debug!("dispatching '{}'", command);

        match command {
            Command::Eval => self.eval(body),
            Command::Healthcheck => self.healthcheck(),
            Command::DocsUser | Command::DocsDev => self.docs(command),
        }
    }

    fn eval(&self, body: &Value) -> Envelope {
        let command = Command::Eval.as_str();
        if let Err(err) = validate_request(Command::Eval, body) {
            log::info!("eval request failed validation: {:?}", err);
            return Envelope::from_error(command, &err);
        }
        match serde_json::from_value::<Request>(body.clone()) {
            Ok(request) => runner::run_eval(self.function.as_ref(), &request),
            Err(err) => Envelope::from_error(command, &DispatchError::Validation(vec![err.to_string()])),
        }
    }

    /// Runs the three test groups. Group failures live inside the summary; only a
    /// break in the orchestration itself becomes an error envelope.
    fn healthcheck(&self) -> Envelope {
        let command = Command::Healthcheck.as_str();
        let function = Arc::clone(&self.function);
        let summary = runner::guard(|| {
            let summary: HealthcheckSummary = health::run_healthcheck(
                health::request_tests,
                health::response_tests,
                move || function.tests(),
            );
            serde_json::to_value(summary).map_err(EvalFailure::from)
        });
        match summary {
            Ok(summary) => Envelope::success(command, summary),
            Err(err) => {
                log::error!("healthcheck could not complete: {}", err);
                Envelope::from_error(command, &err)
            }
        }
    }

    fn docs(&self, command: Command) -> Envelope {
        let result = DocKind::for_command(command)
            .ok_or_else(|| DispatchError::UnknownCommand(command.to_string()))
            .and_then(|kind| self.docs.fetch_base64(kind));
        match result {
            Ok(encoded) => Envelope::success(command.as_str(), Value::String(encoded)),
            Err(err) => {
                log::error!("{} failed: {}", command, err);
                Envelope::from_error(command.as_str(), &err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EvaluationError;
    use crate::function::ExactMatch;
    use crate::models::{SUBMISSION_CONTEXT_KEY, SUBMISSION_COUNT_KEY};
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde_json::{Map, json};

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(Arc::new(ExactMatch), DocsSource::Embedded)
    }

    #[test]
    fn test_missing_command_resolves_to_eval() {
        let env = dispatcher().dispatch(&json!({"response": "a", "answer": "a"}), None);
        assert_eq!(env.command, "eval");
        assert_eq!(env.result().unwrap()["is_correct"], true);
    }

    #[test]
    fn test_header_command_used_when_body_has_none() {
        let env = dispatcher().dispatch(&json!({}), Some("docs-dev"));
        assert_eq!(env.command, "docs-dev");
        assert!(env.is_success());
    }

    #[test]
    fn test_body_command_wins_over_header() {
        let env = dispatcher().dispatch(&json!({"command": "docs-user"}), Some("docs-dev"));
        assert_eq!(env.command, "docs-user");
    }

    #[test]
    fn test_unknown_command_is_error_envelope() {
        let env = dispatcher().dispatch(&json!({"command": "grade"}), None);
        assert_eq!(
            env.to_value(),
            json!({"command": "grade", "error": {"message": "Unknown command 'grade'"}})
        );
    }

    #[test]
    fn test_non_string_command_does_not_fall_back_to_header() {
        let env = dispatcher().dispatch(&json!({"command": 5}), Some("docs-user"));
        assert_eq!(
            env.to_value(),
            json!({"command": "5", "error": {"message": "Unknown command '5'"}})
        );

        let env = dispatcher().dispatch(&json!({"command": {"x": 1}}), Some("healthcheck"));
        assert!(!env.is_success());
        assert_eq!(env.command, r#"{"x":1}"#);
    }

    #[test]
    fn test_invalid_eval_request_reports_every_problem() {
        let env = dispatcher().dispatch(&json!({"params": 3}), None);
        let error = env.error().unwrap();
        assert_eq!(error["message"], "Schema validation failed");
        assert_eq!(error["serialization_errors"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_params_receive_submission_context() {
        let echo = |_: &Value, _: &Value, params: &Map<String, Value>| -> std::result::Result<Value, EvalFailure> {
            Ok(Value::Object(params.clone()))
        };
        let d = Dispatcher::new(Arc::new(echo), DocsSource::Embedded);
        let env = d.dispatch(
            &json!({"response": 1, "answer": 1, "params": {"atol": 0.1}, "submission_count": 2}),
            None,
        );
        assert_eq!(
            env.result().unwrap(),
            &json!({"atol": 0.1, SUBMISSION_CONTEXT_KEY: {SUBMISSION_COUNT_KEY: 2}})
        );
    }

    #[test]
    fn test_structured_error_from_routine() {
        let failing = |_: &Value, _: &Value, _: &Map<String, Value>| -> std::result::Result<Value, EvalFailure> {
            Err(EvaluationError::new("Some important message")
                .with_field("other", "details")
                .into())
        };
        let d = Dispatcher::new(Arc::new(failing), DocsSource::Embedded);
        let env = d.dispatch(&json!({"response": 1, "answer": 2}), None);
        assert_eq!(
            env.to_value(),
            json!({"command": "eval", "error": {"message": "Some important message", "other": "details"}})
        );
    }

    #[test]
    fn test_healthcheck_reports_all_groups() {
        let env = dispatcher().dispatch(&json!({"command": "healthcheck"}), None);
        let result = env.result().unwrap();
        assert_eq!(result["tests_passed"], true);
        for group in ["request", "response", "evaluation"] {
            assert_eq!(result[group]["passed"], true, "group {} failed: {}", group, result[group]);
        }
    }

    #[test]
    fn test_broken_evaluation_tests_leave_other_groups_reported() {
        struct Broken;
        impl EvaluationFunction for Broken {
            fn evaluate(
                &self,
                _: &Value,
                _: &Value,
                _: &Map<String, Value>,
            ) -> std::result::Result<Value, EvalFailure> {
                Ok(json!({"is_correct": true}))
            }
            fn tests(&self) -> Vec<health::TestCase> {
                vec![health::TestCase::new("always wrong", || Err("wrong".to_string()))]
            }
        }

        let d = Dispatcher::new(Arc::new(Broken), DocsSource::Embedded);
        let env = d.dispatch(&json!({"command": "healthcheck"}), None);
        assert!(env.is_success());
        let result = env.result().unwrap();
        assert_eq!(result["tests_passed"], false);
        assert_eq!(result["request"]["passed"], true);
        assert_eq!(result["response"]["passed"], true);
        assert_eq!(result["evaluation"]["failures"][0]["name"], "always wrong");
    }

    #[test]
    fn test_docs_are_base64_of_artifact() {
        let env = dispatcher().dispatch(&json!({"command": "docs-user"}), None);
        let encoded = env.result().unwrap().as_str().unwrap();
        assert_eq!(
            STANDARD.decode(encoded).unwrap(),
            include_bytes!("../docs/user.md")
        );
    }

    #[test]
    fn test_missing_docs_directory_is_error_envelope() {
        let d = Dispatcher::new(
            Arc::new(ExactMatch),
            DocsSource::Directory("/nonexistent/evalfn-docs".into()),
        );
        let env = d.dispatch(&json!({"command": "docs-dev"}), None);
        assert_eq!(env.error().unwrap()["message"], "Documentation not found");
    }
}
