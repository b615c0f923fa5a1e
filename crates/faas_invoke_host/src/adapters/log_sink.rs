use std::sync::Mutex;

use chrono::Utc;
use faas_invoke_core::context::{LogKind, LogSink};
use serde_json::json;

/// Emits one structured JSON line per recorded message on stderr.
pub struct StderrJsonSink {
    component: String,
}

impl StderrJsonSink {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
        }
    }
}

impl LogSink for StderrJsonSink {
    fn append(&self, kind: LogKind, message: &str) {
        eprintln!(
            "{}",
            json!({
                "component": self.component,
                "kind": kind.as_str(),
                "timestamp": Utc::now().to_rfc3339(),
                "message": message,
            })
        );
    }
}

/// Collects recorded messages in memory, in call order.
///
/// Used by tests and by hosts that gather logs per invocation before
/// forwarding them to a persistent sink.
#[derive(Default)]
pub struct MemorySink {
    entries: Mutex<Vec<(LogKind, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(LogKind, String)> {
        self.guard().clone()
    }

    pub fn drain(&self) -> Vec<(LogKind, String)> {
        std::mem::take(&mut *self.guard())
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, Vec<(LogKind, String)>> {
        // Logging must never fail; recover the entries from a poisoned lock.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl LogSink for MemorySink {
    fn append(&self, kind: LogKind, message: &str) {
        self.guard().push((kind, message.to_string()));
    }
}
