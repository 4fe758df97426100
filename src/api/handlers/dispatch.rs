// src/api/handlers/dispatch.rs
use actix_web::{web, HttpRequest, HttpResponse, Result};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::AppState;
use crate::dispatch::Dispatcher;
use crate::envelope::Envelope;
use crate::errors::DispatchError;

/// Header consulted for the command when the body carries none.
pub const COMMAND_HEADER: &str = "command";

/// `POST /` - runs one command and answers with its envelope.
///
/// Every outcome the core produces, failures included, is a 200 with an envelope
/// body; callers tell success from failure by `result` vs `error`.
pub async fn dispatch(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse> {
    let request_id = Uuid::new_v4();
    let header_command = req
        .headers()
        .get(COMMAND_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let parsed: Value = if body.is_empty() {
        json!({})
    } else {
        match serde_json::from_slice(&body) {
            Ok(value) => value,
            Err(e) => {
                // Only the header can name the command; an unknown one is reported first.
                let (command, parsed) =
                    Dispatcher::resolve_command(&json!({}), header_command.as_deref());
                let err = match parsed {
                    Ok(_) => DispatchError::MalformedBody(e),
                    Err(unknown) => unknown,
                };
                log::warn!("[{}] rejecting body for '{}': {}", request_id, command, err);
                return Ok(HttpResponse::Ok().json(Envelope::from_error(command, &err)));
            }
        }
    };

    let (command, _) = Dispatcher::resolve_command(&parsed, header_command.as_deref());
    log::info!("[{}] {} via {}", request_id, command, state.dispatcher.function_name());

    let dispatcher = state.dispatcher.clone();
    let work = web::block(move || dispatcher.dispatch(&parsed, header_command.as_deref()));

    let outcome = match state.config.eval_timeout {
        Some(limit) => tokio::time::timeout(limit, work).await.map_err(|_| {
            DispatchError::unstructured(format!(
                "evaluation timed out after {}ms",
                limit.as_millis()
            ))
        }),
        None => Ok(work.await),
    };

    let envelope = match outcome {
        Ok(Ok(envelope)) => envelope,
        Ok(Err(blocking)) => {
            log::error!("[{}] worker failed: {}", request_id, blocking);
            Envelope::from_error(command, &DispatchError::unstructured(blocking.to_string()))
        }
        Err(err) => {
            log::error!("[{}] {:?}", request_id, err);
            Envelope::from_error(command, &err)
        }
    };

    Ok(HttpResponse::Ok().json(envelope))
}
