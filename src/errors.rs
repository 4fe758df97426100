// src/errors.rs
use serde_json::{Map, Value};
use thiserror::Error;

/// Message reported for every failure that was not raised as an [`EvaluationError`].
pub const UNSTRUCTURED_ERROR_MESSAGE: &str =
    "An exception was raised while executing the evaluation function.";

/// The structured error a comparison routine raises to report a controlled failure.
///
/// Carries a mandatory `message` plus any number of named fields. Every field is
/// copied verbatim into the `error` object of the outgoing envelope.
///
/// ```
/// use evalfn::errors::EvaluationError;
///
/// let err = EvaluationError::new("Could not parse response")
///     .with_field("culprit", "response")
///     .with_field("position", 4);
/// assert_eq!(err.fields()["culprit"], "response");
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct EvaluationError {
    message: String,
    fields: Map<String, Value>,
}

impl EvaluationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            fields: Map::new(),
        }
    }

    /// Adds a named field.
    ///
    /// `message` is reserved: the message given to [`EvaluationError::new`] wins and a
    /// field of that name is dropped (logged at `debug`).
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        let value: Value = value.into();
        if key == "message" {
            log::debug!(
                "dropping 'message' field on structured error '{}': {}",
                self.message,
                value
            );
        } else {
            self.fields.insert(key, value);
        }
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// The full field set, `message` included, as it appears in an `error` object.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::with_capacity(self.fields.len() + 1);
        map.insert("message".to_string(), Value::String(self.message.clone()));
        for (key, value) in &self.fields {
            map.insert(key.clone(), value.clone());
        }
        map
    }
}

/// What a comparison routine may fail with.
#[derive(Error, Debug)]
pub enum EvalFailure {
    #[error(transparent)]
    Structured(#[from] EvaluationError),

    #[error("{0}")]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl EvalFailure {
    /// Wraps any other error as an unstructured failure.
    pub fn other<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        EvalFailure::Other(err.into())
    }
}

impl From<serde_json::Error> for EvalFailure {
    fn from(err: serde_json::Error) -> Self {
        EvalFailure::other(err)
    }
}

impl From<std::io::Error> for EvalFailure {
    fn from(err: std::io::Error) -> Self {
        EvalFailure::other(err)
    }
}

/// Failures raised by the dispatch layer itself.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Unknown command '{0}'")]
    UnknownCommand(String),

    #[error("Schema validation failed")]
    Validation(Vec<String>),

    #[error("Request body is not valid JSON")]
    MalformedBody(#[source] serde_json::Error),

    #[error("Documentation not found")]
    DocsNotFound(String),

    #[error("Failed to read documentation: {0}")]
    DocsRead(#[from] std::io::Error),

    #[error(transparent)]
    Structured(#[from] EvaluationError),

    #[error("{}", UNSTRUCTURED_ERROR_MESSAGE)]
    Unstructured { detail: String },
}

impl DispatchError {
    pub fn unstructured(detail: impl Into<String>) -> Self {
        DispatchError::Unstructured {
            detail: detail.into(),
        }
    }

    /// Renders the error as the `error` object of a failure envelope.
    pub fn to_error_body(&self) -> Map<String, Value> {
        let mut body = Map::new();
        match self {
            DispatchError::Structured(err) => return err.to_map(),
            DispatchError::Validation(problems) => {
                body.insert("message".into(), self.to_string().into());
                body.insert(
                    "serialization_errors".into(),
                    Value::Array(problems.iter().cloned().map(Value::String).collect()),
                );
            }
            DispatchError::MalformedBody(err) => {
                body.insert("message".into(), self.to_string().into());
                body.insert("detail".into(), err.to_string().into());
            }
            DispatchError::DocsNotFound(name) => {
                body.insert("message".into(), self.to_string().into());
                body.insert("detail".into(), format!("no artifact named '{}'", name).into());
            }
            DispatchError::DocsRead(err) => {
                body.insert("message".into(), "Documentation could not be read".into());
                body.insert("detail".into(), err.to_string().into());
            }
            DispatchError::Unstructured { detail } => {
                body.insert("message".into(), UNSTRUCTURED_ERROR_MESSAGE.into());
                body.insert("detail".into(), detail.clone().into());
            }
            DispatchError::UnknownCommand(_) => {
                body.insert("message".into(), self.to_string().into());
            }
        }
        body
    }
}

impl From<EvalFailure> for DispatchError {
    fn from(failure: EvalFailure) -> Self {
        match failure {
            EvalFailure::Structured(err) => DispatchError::Structured(err),
            EvalFailure::Other(err) => DispatchError::unstructured(err.to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

pub type Result<T> = std::result::Result<T, DispatchError>;
