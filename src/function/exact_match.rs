// src/function/exact_match.rs
use serde_json::{Map, Value, json};

use crate::errors::{EvalFailure, EvaluationError};
use crate::function::EvaluationFunction;
use crate::health::TestCase;
use crate::models::submission_count;
use crate::validate::kind;

/// Submissions after which a hint is attached to incorrect answers.
const HINT_AFTER_SUBMISSIONS: u64 = 3;

/// Compares a response with an answer for equality.
///
/// Params:
/// * `case_sensitive` (bool, default `false`) - string comparison honours case.
/// * `strip_whitespace` (bool, default `true`) - trim strings before comparing.
/// * `atol` (number, default `0`) - absolute tolerance for numeric answers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatch;

#[derive(Debug, Clone, Copy)]
struct Options {
    case_sensitive: bool,
    strip_whitespace: bool,
    atol: f64,
}

impl Options {
    fn from_params(params: &Map<String, Value>) -> Result<Self, EvaluationError> {
        let flag = |key: &str, default: bool| match params.get(key) {
            None => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(EvaluationError::new(format!("Parameter '{}' must be a boolean", key))
                .with_field("culprit", "params")
                .with_field("detail", other.clone())),
        };
        let atol = match params.get("atol") {
            None => 0.0,
            Some(v) => v.as_f64().filter(|t| *t >= 0.0).ok_or_else(|| {
                EvaluationError::new("Parameter 'atol' must be a non-negative number")
                    .with_field("culprit", "params")
                    .with_field("detail", v.clone())
            })?,
        };
        Ok(Self {
            case_sensitive: flag("case_sensitive", false)?,
            strip_whitespace: flag("strip_whitespace", true)?,
            atol,
        })
    }
}

fn compare(response: &Value, answer: &Value, opts: &Options) -> Result<bool, EvaluationError> {
    match (response, answer) {
        (Value::String(r), Value::String(a)) => {
            let (r, a) = if opts.strip_whitespace {
                (r.trim(), a.trim())
            } else {
                (r.as_str(), a.as_str())
            };
            Ok(if opts.case_sensitive {
                r == a
            } else {
                r.to_lowercase() == a.to_lowercase()
            })
        }
        (Value::Number(r), Value::Number(a)) => match (r.as_f64(), a.as_f64()) {
            (Some(r), Some(a)) => Ok((r - a).abs() <= opts.atol),
            _ => Ok(r == a),
        },
        // A numeric answer submitted as text, e.g. "2.5".
        (Value::String(r), Value::Number(a)) => {
            let parsed: f64 = r.trim().parse().map_err(|_| {
                EvaluationError::new("Response could not be read as a number")
                    .with_field("culprit", "response")
                    .with_field("detail", r.clone())
            })?;
            Ok(a.as_f64().is_some_and(|a| (parsed - a).abs() <= opts.atol))
        }
        (r, a) if kind(r) == kind(a) => Ok(r == a),
        (r, a) => Err(EvaluationError::new("Response and answer have incompatible types")
            .with_field("culprit", "response")
            .with_field(
                "detail",
                format!("response is {}, answer is {}", kind(r), kind(a)),
            )),
    }
}

impl EvaluationFunction for ExactMatch {
    fn name(&self) -> &str {
        "exact_match"
    }

    fn evaluate(
        &self,
        response: &Value,
        answer: &Value,
        params: &Map<String, Value>,
    ) -> Result<Value, EvalFailure> {
        let opts = Options::from_params(params)?;
        let is_correct = compare(response, answer, &opts)?;

        let feedback = if is_correct { "Correct." } else { "Incorrect." };
        let mut result = json!({
            "is_correct": is_correct,
            "feedback": feedback,
        });

        if !is_correct && submission_count(params) >= HINT_AFTER_SUBMISSIONS {
            result["warnings"] = json!([
                "Several attempts made: check spelling and units against the question."
            ]);
        }

        Ok(result)
    }

    fn tests(&self) -> Vec<TestCase> {
        fn run(response: Value, answer: Value, params: Value) -> Result<Value, String> {
            let params = params.as_object().cloned().unwrap_or_default();
            ExactMatch
                .evaluate(&response, &answer, &params)
                .map_err(|e| e.to_string())
        }

        fn expect_correct(result: Result<Value, String>, expected: bool) -> Result<(), String> {
            let result = result?;
            match result.get("is_correct").and_then(Value::as_bool) {
                Some(got) if got == expected => Ok(()),
                other => Err(format!("expected is_correct={}, got {:?}", expected, other)),
            }
        }

        vec![
            TestCase::new("matching strings are correct", || {
                expect_correct(run(json!("Paris"), json!("Paris"), json!({})), true)
            }),
            TestCase::new("case is ignored by default", || {
                expect_correct(run(json!("paris "), json!("Paris"), json!({})), true)
            }),
            TestCase::new("case_sensitive param is honoured", || {
                expect_correct(
                    run(json!("paris"), json!("Paris"), json!({"case_sensitive": true})),
                    false,
                )
            }),
            TestCase::new("numbers within tolerance are correct", || {
                expect_correct(run(json!(1.234), json!(1.2345), json!({"atol": 0.01})), true)
            }),
            TestCase::new("numeric text is parsed", || {
                expect_correct(run(json!("2.5"), json!(2.5), json!({})), true)
            }),
            TestCase::new("incompatible types raise a structured error", || {
                match ExactMatch.evaluate(&json!([1]), &json!("a"), &Map::new()) {
                    Err(EvalFailure::Structured(e)) if e.fields().contains_key("culprit") => Ok(()),
                    other => Err(format!("expected structured error, got {:?}", other)),
                }
            }),
        ]
    }
}
