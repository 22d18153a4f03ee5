//! Shared utilities for integration tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use unit_sentry::provider::{ProviderError, UnitConnection, UnitStatusProvider};

/// One scripted reply from the mock provider.
pub enum QueryStep {
    /// Return this unit state.
    State(&'static str),
    /// Fail the query at the transport level.
    ConnectionError,
    /// Answer with a malformed reply.
    BadShape,
}

struct ScriptInner {
    /// Scripted connect outcomes; `false` = fail. Empty queue = succeed.
    connects: Mutex<VecDeque<bool>>,
    /// Scripted query outcomes. Empty queue = fallback state.
    queries: Mutex<VecDeque<QueryStep>>,
    fallback_state: Mutex<&'static str>,
    fail_all_connects: AtomicBool,
    connect_attempts: AtomicUsize,
}

/// Provider whose connects and queries follow a prearranged script,
/// falling back to a steady state once the script runs out.
#[derive(Clone)]
pub struct ScriptedProvider {
    inner: Arc<ScriptInner>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ScriptInner {
                connects: Mutex::new(VecDeque::new()),
                queries: Mutex::new(VecDeque::new()),
                fallback_state: Mutex::new("active"),
                fail_all_connects: AtomicBool::new(false),
                connect_attempts: AtomicUsize::new(0),
            }),
        }
    }

    pub fn push_connect_ok(&self) {
        self.inner.connects.lock().unwrap().push_back(true);
    }

    pub fn push_connect_failure(&self) {
        self.inner.connects.lock().unwrap().push_back(false);
    }

    pub fn push_query(&self, step: QueryStep) {
        self.inner.queries.lock().unwrap().push_back(step);
    }

    pub fn set_fallback_state(&self, state: &'static str) {
        *self.inner.fallback_state.lock().unwrap() = state;
    }

    /// Make every future connect attempt fail.
    pub fn fail_all_connects(&self) {
        self.inner.fail_all_connects.store(true, Ordering::SeqCst);
    }

    pub fn connect_attempts(&self) -> usize {
        self.inner.connect_attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UnitStatusProvider for ScriptedProvider {
    async fn connect(&self) -> Result<Box<dyn UnitConnection>, ProviderError> {
        self.inner.connect_attempts.fetch_add(1, Ordering::SeqCst);

        if self.inner.fail_all_connects.load(Ordering::SeqCst) {
            return Err(ProviderError::Connection("scripted connect failure".into()));
        }

        let scripted = self.inner.connects.lock().unwrap().pop_front();
        match scripted {
            Some(false) => Err(ProviderError::Connection("scripted connect failure".into())),
            _ => Ok(Box::new(ScriptedConnection {
                inner: self.inner.clone(),
            })),
        }
    }
}

struct ScriptedConnection {
    inner: Arc<ScriptInner>,
}

#[async_trait]
impl UnitConnection for ScriptedConnection {
    async fn get_state(&self, _unit: &str) -> Result<String, ProviderError> {
        let step = self.inner.queries.lock().unwrap().pop_front();
        match step {
            Some(QueryStep::State(state)) => Ok(state.to_string()),
            Some(QueryStep::ConnectionError) => {
                Err(ProviderError::Connection("scripted query failure".into()))
            }
            Some(QueryStep::BadShape) => {
                Err(ProviderError::UnexpectedShape("scripted shape error".into()))
            }
            None => Ok(self.inner.fallback_state.lock().unwrap().to_string()),
        }
    }
}
