// src/function/mod.rs
use serde_json::{Map, Value};

use crate::errors::EvalFailure;
use crate::health::TestCase;

pub mod exact_match;

pub use exact_match::ExactMatch;

/// The comparison routine a deployment wires in.
///
/// Correctness is reported through the returned object (conventionally
/// `is_correct`, `feedback`, `warnings`). Failures are reported by returning
/// [`EvalFailure`] or by panicking; the invocation wrapper classifies both.
pub trait EvaluationFunction: Send + Sync {
    fn name(&self) -> &str {
        "evaluation_function"
    }

    /// Compares `response` with `answer`. `params` already carries
    /// `submission_context`.
    fn evaluate(
        &self,
        response: &Value,
        answer: &Value,
        params: &Map<String, Value>,
    ) -> Result<Value, EvalFailure>;

    /// Evaluation-logic tests run by the `healthcheck` command.
    fn tests(&self) -> Vec<TestCase> {
        Vec::new()
    }
}

impl<F> EvaluationFunction for F
where
    F: Fn(&Value, &Value, &Map<String, Value>) -> Result<Value, EvalFailure> + Send + Sync,
{
    fn evaluate(
        &self,
        response: &Value,
        answer: &Value,
        params: &Map<String, Value>,
    ) -> Result<Value, EvalFailure> {
        self(response, answer, params)
    }
}
