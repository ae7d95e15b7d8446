//! Stub collaborators for controller tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::audit::{AuditEntry, AuditResult, AuditSink};
use crate::auth::MemorySessionStore;
use crate::commands::{Command, ExecutionContext};
use crate::error::DispatchError;
use crate::protocol::{HttpResponse, Outcome};
use crate::templates::ViewRenderer;

use super::ControllerEnv;

/// Renders `view:<name>` for every view.
pub(crate) struct StubViews;

impl ViewRenderer for StubViews {
    fn render(&self, view: &str, _model: &serde_json::Value) -> Result<String, DispatchError> {
        Ok(format!("view:{}", view))
    }
}

/// Keeps every audit entry in memory.
#[derive(Default)]
pub(crate) struct RecordingAudit {
    entries: Mutex<Vec<AuditEntry>>,
    fail: bool,
}

impl RecordingAudit {
    /// A sink whose writes always fail.
    pub fn failing() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().unwrap().clone()
    }

    pub fn results(&self) -> Vec<AuditResult> {
        self.entries().into_iter().map(|entry| entry.result).collect()
    }
}

impl AuditSink for RecordingAudit {
    fn log(&self, entry: &AuditEntry) -> Result<(), DispatchError> {
        if self.fail {
            return Err(DispatchError::execution_failed("audit disk full"));
        }
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }
}

/// Environment with in-memory sessions, stub views and a recording sink.
pub(crate) fn test_env() -> (Arc<ControllerEnv>, Arc<RecordingAudit>) {
    let audit = Arc::new(RecordingAudit::default());
    let env = ControllerEnv {
        sessions: Arc::new(MemorySessionStore::new(Duration::from_secs(60))),
        views: Arc::new(StubViews),
        audit: audit.clone(),
        login_path: "/user/login".to_string(),
        cookie_name: "SESSIONID".to_string(),
    };
    (Arc::new(env), audit)
}

/// Always returns the same outcome.
pub(crate) struct FixedCommand {
    name: &'static str,
    outcome: Outcome,
    audited: bool,
}

impl FixedCommand {
    pub fn new(name: &'static str, outcome: Outcome) -> Self {
        Self {
            name,
            outcome,
            audited: true,
        }
    }

    pub fn without_audit(mut self) -> Self {
        self.audited = false;
        self
    }
}

impl Command for FixedCommand {
    fn name(&self) -> &'static str {
        self.name
    }

    fn execute(
        &self,
        _ctx: &mut ExecutionContext,
        _response: &mut HttpResponse,
    ) -> Result<Outcome, DispatchError> {
        Ok(self.outcome.clone())
    }

    fn requires_audit(&self) -> bool {
        self.audited
    }
}

/// Writes partial output, then fails.
pub(crate) struct FailingCommand {
    name: &'static str,
}

impl FailingCommand {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl Command for FailingCommand {
    fn name(&self) -> &'static str {
        self.name
    }

    fn execute(
        &self,
        _ctx: &mut ExecutionContext,
        response: &mut HttpResponse,
    ) -> Result<Outcome, DispatchError> {
        response.set_header("x-partial", "1");
        response.write(b"half a page");
        Err(DispatchError::execution_failed("store unavailable"))
    }
}

type Script =
    dyn Fn(&mut ExecutionContext, &mut HttpResponse) -> Result<Outcome, DispatchError> + Send + Sync;

/// Runs a closure and counts invocations.
pub(crate) struct ScriptedCommand {
    name: &'static str,
    script: Box<Script>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedCommand {
    pub fn new<F>(name: &'static str, script: F) -> Self
    where
        F: Fn(&mut ExecutionContext, &mut HttpResponse) -> Result<Outcome, DispatchError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name,
            script: Box::new(script),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl Command for ScriptedCommand {
    fn name(&self) -> &'static str {
        self.name
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext,
        response: &mut HttpResponse,
    ) -> Result<Outcome, DispatchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.script)(ctx, response)
    }
}
