// src/health/mod.rs
//! Healthcheck orchestration.
//!
//! Three groups run in sequence: request-shape tests, response-shape tests and the
//! wired comparison routine's own tests. Every case runs under its own panic
//! boundary and every group is guarded as a whole, so one broken group cannot
//! blank out the reports of the others.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Instant;

use crate::runner::panic_message;

mod request_tests;

pub use request_tests::request_tests;
pub use response_tests::response_tests;

type TestFn = Box<dyn Fn() -> Result<(), String> + Send + Sync>;

/// One named check. `Err` is a failure; a panic is recorded as an error.
pub struct TestCase {
    pub name: String,
    run: TestFn,
}

impl TestCase {
    pub fn new<F>(name: impl Into<String>, run: F) -> Self
    where
        F: Fn() -> Result<(), String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            run: Box::new(run),
        }
    }

    pub fn run(&self) -> Result<(), String> {
        (self.run)()
    }
}

impl std::fmt::Debug for TestCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestCase").field("name", &self.name).finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestOutcome {
    pub name: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupReport {
    pub name: String,
    pub passed: bool,
    pub tests_run: usize,
    pub successes: Vec<String>,
    pub failures: Vec<TestOutcome>,
    pub errors: Vec<TestOutcome>,
    pub time_taken_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthcheckSummary {
    pub tests_passed: bool,
    pub timestamp: String,
    pub request: GroupReport,
    pub response: GroupReport,
    pub evaluation: GroupReport,
}

/// Runs every case of one group and reports on it.
pub fn run_group(name: &str, cases: &[TestCase]) -> GroupReport {
    let start = Instant::now();
    let mut successes = Vec::new();
    let mut failures = Vec::new();
    let mut errors = Vec::new();

    for case in cases {
        match catch_unwind(AssertUnwindSafe(|| case.run())) {
            Ok(Ok(())) => successes.push(case.name.clone()),
            Ok(Err(message)) => failures.push(TestOutcome {
                name: case.name.clone(),
                message,
            }),
            Err(payload) => errors.push(TestOutcome {
                name: case.name.clone(),
                message: panic_message(payload.as_ref()),
            }),
        }
    }

    let report = GroupReport {
        name: name.to_string(),
        passed: failures.is_empty() && errors.is_empty(),
        tests_run: cases.len(),
        successes,
        failures,
        errors,
        time_taken_ms: start.elapsed().as_millis() as u64,
    };

    if report.passed {
        log::info!("{} tests: {} passed", name, report.tests_run);
    } else {
        log::warn!(
            "{} tests: {} failures, {} errors out of {}",
            name,
            report.failures.len(),
            report.errors.len(),
            report.tests_run
        );
    }
    report
}

/// Builds a group's cases and runs them; a panic while building is reported as a
/// group-level error instead of escaping.
fn guarded_group<B>(name: &str, build: B) -> GroupReport
where
    B: FnOnce() -> Vec<TestCase>,
{
    match catch_unwind(AssertUnwindSafe(|| run_group(name, &build()))) {
        Ok(report) => report,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            log::error!("{} test group could not run: {}", name, message);
            GroupReport {
                name: name.to_string(),
                passed: false,
                tests_run: 0,
                successes: Vec::new(),
                failures: Vec::new(),
                errors: vec![TestOutcome {
                    name: name.to_string(),
                    message,
                }],
                time_taken_ms: 0,
            }
        }
    }
}

/// Runs the three groups and combines their reports.
pub fn run_healthcheck<R, S, E>(request: R, response: S, evaluation: E) -> HealthcheckSummary
where
    R: FnOnce() -> Vec<TestCase>,
    S: FnOnce() -> Vec<TestCase>,
    E: FnOnce() -> Vec<TestCase>,
{
    let request = guarded_group("request", request);
    let response = guarded_group("response", response);
    let evaluation = guarded_group("evaluation", evaluation);

    HealthcheckSummary {
        tests_passed: request.passed && response.passed && evaluation.passed,
        timestamp: Utc::now().to_rfc3339(),
        request,
        response,
        evaluation,
    }
}

/// `Err(message)` unless `cond` holds.
pub fn check(cond: bool, message: impl Into<String>) -> Result<(), String> {
    if cond { Ok(()) } else { Err(message.into()) }
}
