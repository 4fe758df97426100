// src/runner.rs
use serde_json::Value;
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Instant;

use crate::envelope::Envelope;
use crate::errors::{DispatchError, EvalFailure, Result};
use crate::function::EvaluationFunction;
use crate::models::{Command, Request};

/// Extracts a readable message from a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Runs `f` under a failure boundary.
///
/// Structured errors pass through untouched. Other errors and panics become
/// [`DispatchError::Unstructured`] carrying their rendering as `detail`.
pub fn guard<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> std::result::Result<T, EvalFailure>,
{
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(failure)) => Err(failure.into()),
        Err(payload) => Err(DispatchError::unstructured(panic_message(payload.as_ref()))),
    }
}

/// Calls the comparison routine exactly once and wraps whatever happens in an envelope.
///
/// A returned object is passed through verbatim, whatever keys it holds. No retries.
pub fn run_eval(function: &dyn EvaluationFunction, request: &Request) -> Envelope {
    let command = Command::Eval.as_str();
    let params = request.augmented_params();
    let start = Instant::now();

    let outcome = guard(|| function.evaluate(&request.response, &request.answer, &params))
        .and_then(|value| match value {
            Value::Object(_) => Ok(value),
            other => Err(DispatchError::unstructured(format!(
                "evaluation function returned {}, expected a JSON object",
                other
            ))),
        });

    let elapsed_ms = start.elapsed().as_millis() as u64;

    match outcome {
        Ok(result) => {
            log::debug!("{} completed in {}ms", function.name(), elapsed_ms);
            Envelope::success(command, result)
        }
        Err(err) => {
            match &err {
                DispatchError::Structured(e) => {
                    log::info!("{} raised a structured error: {}", function.name(), e)
                }
                DispatchError::Unstructured { detail } => {
                    log::error!("{} failed after {}ms: {}", function.name(), elapsed_ms, detail)
                }
                other => log::warn!("{} failed: {}", function.name(), other),
            }
            Envelope::from_error(command, &err)
        }
    }
}
