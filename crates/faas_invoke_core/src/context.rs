use std::sync::Arc;

use serde_json::Value;

use crate::request::Request;
use crate::response::{stable_output_json, Response};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    Log,
    Error,
}

impl LogKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Error => "error",
        }
    }
}

/// Destination for messages recorded during an invocation.
///
/// The method is infallible by signature: the contract guarantees that
/// logging never raises, regardless of input.
pub trait LogSink: Send + Sync {
    fn append(&self, kind: LogKind, message: &str);
}

/// One log argument coerced to its textual form.
///
/// Strings pass through as-is; other values are recorded as compact JSON
/// text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogValue(String);

impl LogValue {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for LogValue {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for LogValue {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<bool> for LogValue {
    fn from(value: bool) -> Self {
        Self(value.to_string())
    }
}

impl From<i64> for LogValue {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl From<u64> for LogValue {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<usize> for LogValue {
    fn from(value: usize) -> Self {
        Self(value.to_string())
    }
}

impl From<f64> for LogValue {
    fn from(value: f64) -> Self {
        Self(value.to_string())
    }
}

impl From<Value> for LogValue {
    fn from(value: Value) -> Self {
        Self::from(&value)
    }
}

impl From<&Value> for LogValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::String(text) => Self(text.clone()),
            other => Self(stable_output_json(other)),
        }
    }
}

/// The bundle handed to user function code, scoped to exactly one
/// invocation and discarded afterwards.
pub struct Context {
    pub req: Request,
    pub res: Response,
    sink: Arc<dyn LogSink>,
}

impl Context {
    pub fn new(req: Request, sink: Arc<dyn LogSink>) -> Self {
        Self {
            req,
            res: Response,
            sink,
        }
    }

    /// Records messages in call order. Fire-and-forget; never fails.
    pub fn log<I>(&self, messages: I)
    where
        I: IntoIterator,
        I::Item: Into<LogValue>,
    {
        self.record(LogKind::Log, messages);
    }

    /// Records error messages in call order. Fire-and-forget; never fails.
    pub fn error<I>(&self, messages: I)
    where
        I: IntoIterator,
        I::Item: Into<LogValue>,
    {
        self.record(LogKind::Error, messages);
    }

    fn record<I>(&self, kind: LogKind, messages: I)
    where
        I: IntoIterator,
        I::Item: Into<LogValue>,
    {
        let line = messages
            .into_iter()
            .map(|message| message.into().into_inner())
            .collect::<Vec<_>>()
            .join(" ");
        self.sink.append(kind, &line);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use crate::request::{Headers, Request, RequestBody};

    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        entries: Mutex<Vec<(LogKind, String)>>,
    }

    impl RecordingSink {
        fn entries(&self) -> Vec<(LogKind, String)> {
            self.entries.lock().expect("poisoned mutex").clone()
        }
    }

    impl LogSink for RecordingSink {
        fn append(&self, kind: LogKind, message: &str) {
            self.entries
                .lock()
                .expect("poisoned mutex")
                .push((kind, message.to_string()));
        }
    }

    fn sample_context(sink: Arc<dyn LogSink>) -> Context {
        let request = Request::from_url(
            "GET",
            "https://api.example.com/foo",
            Headers::new(),
            RequestBody::empty(),
        )
        .expect("request should build");
        Context::new(request, sink)
    }

    #[test]
    fn messages_arrive_in_call_order() {
        let sink = Arc::new(RecordingSink::default());
        let context = sample_context(sink.clone());

        context.log(["first"]);
        context.error(["second"]);
        context.log(["third"]);

        assert_eq!(
            sink.entries(),
            vec![
                (LogKind::Log, "first".to_string()),
                (LogKind::Error, "second".to_string()),
                (LogKind::Log, "third".to_string()),
            ]
        );
    }

    #[test]
    fn heterogeneous_arguments_join_with_spaces() {
        let sink = Arc::new(RecordingSink::default());
        let context = sample_context(sink.clone());

        context.log(vec![
            LogValue::from("processed"),
            LogValue::from(42u64),
            LogValue::from(json!({"ok": true})),
        ]);

        assert_eq!(
            sink.entries(),
            vec![(LogKind::Log, "processed 42 {\"ok\":true}".to_string())]
        );
    }

    #[test]
    fn json_string_values_pass_through_unquoted() {
        assert_eq!(LogValue::from(json!("plain")).as_str(), "plain");
        assert_eq!(LogValue::from(json!(7)).as_str(), "7");
    }

    #[test]
    fn context_exposes_request_and_response_factory() {
        let sink = Arc::new(RecordingSink::default());
        let context = sample_context(sink);

        assert_eq!(context.req.method, "GET");
        let output = context.res.text("done", None, None);
        assert_eq!(output.status_code, 200);
    }
}
