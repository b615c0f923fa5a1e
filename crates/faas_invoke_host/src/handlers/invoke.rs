use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use faas_invoke_core::context::{Context, LogSink};
use faas_invoke_core::output::{Output, OutputBody};
use faas_invoke_core::request::{Headers, Request, RequestBody};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Raw invocation event a fronting host hands over.
///
/// `body` may be a JSON string (used verbatim), an inline JSON object or
/// array (re-encoded as compact JSON text), or null (empty body).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvocationEvent {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub headers: Headers,
    #[serde(default)]
    pub body: Value,
}

/// Wire envelope handed back to the fronting host. Binary bodies are
/// base64-encoded so the envelope stays textual.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HostResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Headers,
    pub body: String,
    #[serde(rename = "bodyEncoding")]
    pub body_encoding: BodyEncoding,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BodyEncoding {
    Plain,
    Base64,
}

/// Drives one invocation end to end: normalizes the event, builds the
/// request, runs the user function with a fresh context, and wraps its
/// output into a wire envelope. Validation failures become 400 envelopes
/// without invoking the function.
pub fn handle_invocation<F>(event: Value, function: F, sink: Arc<dyn LogSink>) -> HostResponse
where
    F: Fn(&Context) -> Output,
{
    let event = match normalize_event(event) {
        Ok(value) => value,
        Err(message) => return validation_error_response(&message),
    };

    let body = match event_body(&event.body) {
        Ok(value) => value,
        Err(message) => return validation_error_response(&message),
    };

    let request = match Request::from_url(event.method, event.url, event.headers, body) {
        Ok(value) => value,
        Err(error) => return validation_error_response(error.message()),
    };

    let context = Context::new(request, sink);
    host_response_from_output(function(&context))
}

fn normalize_event(event: Value) -> Result<InvocationEvent, String> {
    if !event.is_object() {
        return Err("Invocation event must be a JSON object".to_string());
    }
    serde_json::from_value(event).map_err(|error| format!("Malformed invocation event: {error}"))
}

fn event_body(body: &Value) -> Result<RequestBody, String> {
    match body {
        Value::Null => Ok(RequestBody::empty()),
        Value::String(text) => Ok(RequestBody::from_text(text.clone())),
        Value::Object(_) | Value::Array(_) => {
            let text = serde_json::to_string(body)
                .map_err(|error| format!("Malformed event body: {error}"))?;
            Ok(RequestBody::from_text(text))
        }
        other => Ok(RequestBody::from_text(other.to_string())),
    }
}

fn host_response_from_output(output: Output) -> HostResponse {
    let mut headers = default_headers(&output.body);
    headers.extend(output.headers);

    let (body, body_encoding) = match output.body {
        OutputBody::Empty => (String::new(), BodyEncoding::Plain),
        OutputBody::Text(text) => (text, BodyEncoding::Plain),
        OutputBody::Binary(bytes) => (BASE64.encode(bytes), BodyEncoding::Base64),
    };

    HostResponse {
        status_code: output.status_code,
        headers,
        body,
        body_encoding,
    }
}

fn default_headers(body: &OutputBody) -> Headers {
    let mut headers = Headers::new();
    match body {
        OutputBody::Empty => {}
        OutputBody::Text(_) => {
            headers.insert("content-type".to_string(), "text/plain".to_string());
        }
        OutputBody::Binary(_) => {
            headers.insert(
                "content-type".to_string(),
                "application/octet-stream".to_string(),
            );
        }
    }
    headers
}

fn validation_error_response(message: &str) -> HostResponse {
    HostResponse {
        status_code: 400,
        headers: Headers::from([(
            "content-type".to_string(),
            "application/json".to_string(),
        )]),
        body: json!({
            "error": "validation_error",
            "message": message,
        })
        .to_string(),
        body_encoding: BodyEncoding::Plain,
    }
}
