//! Route handlers.
//!
//! Handlers run after every gate has passed. They fill in the tool name and
//! outcome of the log entry opened by the tracking layer.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use bridge_monitor::{LogId, MetricsSnapshot};
use bridge_registry::{BatchItemResult, BatchRequest, DispatchError, ExecutionResult};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

use crate::context::GatewayContext;
use crate::error::{BridgeError, Result};
use crate::gateway::LogHandle;

type Ctx = State<Arc<GatewayContext>>;

/// `GET /health`, unauthenticated liveness.
pub(crate) async fn health(State(ctx): Ctx) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "tools": ctx.registry.len(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// `GET /tools`
pub(crate) async fn list_tools(State(ctx): Ctx) -> Json<Value> {
    let tools: Vec<Value> = ctx
        .registry
        .descriptors()
        .iter()
        .map(|tool| {
            json!({
                "name": tool.name,
                "description": tool.description,
                "inputSchema": tool.input_schema,
            })
        })
        .collect();
    Json(json!({ "tools": tools }))
}

/// `POST /execute`
pub(crate) async fn execute(
    State(ctx): Ctx,
    handle: Option<Extension<LogHandle>>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>> {
    let log = handle.map(|Extension(LogHandle(id))| id);
    let body = parse_body(&ctx, body)?;

    let name = match body.get("tool").and_then(Value::as_str) {
        Some(name) if !name.is_empty() => name,
        _ => return Err(BridgeError::BadRequest("Missing or invalid tool name".to_string())),
    };
    if let Some(id) = log {
        ctx.log.set_tool(id, name);
    }
    ctx.metrics.record_tool_executions(1);

    let args = body.get("args").cloned().unwrap_or(Value::Null);
    match ctx.registry.dispatch(name, &args).await {
        Ok(result) => {
            record_outcome(&ctx, log, result.success);
            Ok(Json(envelope(Value::String(name.to_string()), &result)))
        }
        Err(err) => {
            if !matches!(err, DispatchError::NotFound { .. }) {
                record_outcome(&ctx, log, false);
            }
            if let DispatchError::Handler(message) = &err {
                ctx.metrics.set_last_error(format!("{name}: {message}"));
            }
            Err(err.into())
        }
    }
}

/// `POST /batch`
pub(crate) async fn batch(
    State(ctx): Ctx,
    handle: Option<Extension<LogHandle>>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>> {
    let log = handle.map(|Extension(LogHandle(id))| id);
    let body = parse_body(&ctx, body)?;

    let Some(items) = body.get("tools").and_then(Value::as_array) else {
        return Err(BridgeError::BadRequest("Expected array of tools".to_string()));
    };
    let requests: Vec<BatchRequest> = items.iter().map(BatchRequest::from_value).collect();

    let results = ctx.registry.dispatch_batch(&requests).await?;
    ctx.metrics.record_tool_executions(results.len() as u64);

    for item in &results {
        if let Err(DispatchError::Handler(message)) = &item.outcome {
            let tool = item.tool.as_deref().unwrap_or_default();
            ctx.metrics.set_last_error(format!("{tool}: {message}"));
        }
    }
    record_outcome(&ctx, log, results.iter().all(BatchItemResult::succeeded));

    let results: Vec<Value> = results.iter().map(batch_item).collect();
    Ok(Json(json!({ "results": results })))
}

/// `GET /logs`
pub(crate) async fn logs(State(ctx): Ctx) -> Json<Value> {
    Json(json!({ "logs": ctx.log.entries() }))
}

/// `GET /metrics`
pub(crate) async fn metrics(State(ctx): Ctx) -> Json<MetricsSnapshot> {
    Json(ctx.metrics.snapshot())
}

/// Anything unrouted.
pub(crate) async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}

fn parse_body(
    ctx: &GatewayContext,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Value> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            Err(BridgeError::PayloadTooLarge)
        }
        Err(rejection) => {
            ctx.metrics
                .set_last_error(format!("Invalid JSON: {}", rejection.body_text()));
            Err(BridgeError::InvalidJson)
        }
    }
}

fn record_outcome(ctx: &GatewayContext, log: Option<LogId>, success: bool) {
    if let Some(id) = log {
        ctx.log.set_success(id, success);
    }
}

fn envelope(tool: Value, result: &ExecutionResult) -> Value {
    let mut body = json!({
        "success": result.success,
        "tool": tool,
        "result": result.summary(),
    });
    if let Some(image) = result.image() {
        body["image"] = json!({ "data": image.data, "mimeType": image.mime_type });
    }
    body
}

fn batch_item(item: &BatchItemResult) -> Value {
    let tool = item.tool.clone().map_or(Value::Null, Value::String);
    match &item.outcome {
        Ok(result) => envelope(tool, result),
        Err(DispatchError::Validation(details)) => json!({
            "tool": tool,
            "success": false,
            "error": "Validation error",
            "details": details,
        }),
        Err(err) => json!({
            "tool": tool,
            "success": false,
            "error": err.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_registry::{ImagePayload, ResultContent};

    #[test]
    fn test_text_envelope() {
        let result = ExecutionResult::failure("nope");
        assert_eq!(
            envelope(json!("run_command"), &result),
            json!({ "success": false, "tool": "run_command", "result": "nope" })
        );
    }

    #[test]
    fn test_image_envelope() {
        let result = ExecutionResult {
            success: true,
            content: ResultContent::Image(ImagePayload {
                data: "aGk=".to_string(),
                mime_type: "image/jpeg".to_string(),
            }),
        };
        let body = envelope(json!("screenshot"), &result);
        assert_eq!(body["result"], "Screenshot captured");
        assert_eq!(body["image"], json!({ "data": "aGk=", "mimeType": "image/jpeg" }));
    }

    #[test]
    fn test_batch_item_not_found() {
        let item = BatchItemResult {
            tool: Some("ghost".to_string()),
            outcome: Err(DispatchError::NotFound {
                tool: "ghost".to_string(),
                available: vec![],
            }),
        };
        assert_eq!(
            batch_item(&item),
            json!({ "tool": "ghost", "success": false, "error": "Tool not found" })
        );
    }

    #[test]
    fn test_batch_item_missing_name_is_null() {
        let item = BatchItemResult {
            tool: None,
            outcome: Err(DispatchError::Handler("boom".to_string())),
        };
        assert_eq!(batch_item(&item)["tool"], Value::Null);
    }
}
