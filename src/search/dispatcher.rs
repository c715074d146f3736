//! Search dispatcher
//!
//! The only stage that talks to the engine. One session per dispatch, released
//! on every exit path, including a dropped future or a panic. Engine failures
//! are reported as-is, never retried.

use std::time::Instant;

use crate::engine::{EngineBatch, EngineError, EngineQuery, EngineSession, SearchEngine};
use crate::error::SearchError;
use crate::events::{SearchEvent, EVENT_TARGET};
use crate::query::SearchDescriptor;

/// Sends descriptors to an injected engine
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'a> {
    engine: &'a dyn SearchEngine,
}

impl<'a> Dispatcher<'a> {
    pub fn new(engine: &'a dyn SearchEngine) -> Self {
        Self { engine }
    }

    /// Fetch the total match count and one ranked page
    pub async fn dispatch(
        &self,
        descriptor: &SearchDescriptor,
        skip: u64,
        limit: u64,
    ) -> Result<EngineBatch, SearchError> {
        let started = Instant::now();
        let mut session = SessionGuard::new(self.engine.connect().await?);

        let outcome = session
            .execute(EngineQuery {
                descriptor,
                skip,
                limit,
            })
            .await;
        session.close().await;

        let batch = outcome?;
        tracing::debug!(
            target: EVENT_TARGET,
            event = SearchEvent::EngineDispatched.name(),
            mode = %descriptor.mode(),
            index = descriptor.index(),
            skip,
            limit,
            total = batch.total,
            returned = batch.records.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "engine dispatch completed"
        );
        Ok(batch)
    }
}

/// Owns a session until it is closed; releases it on drop otherwise
struct SessionGuard {
    session: Option<Box<dyn EngineSession>>,
}

impl SessionGuard {
    fn new(session: Box<dyn EngineSession>) -> Self {
        Self {
            session: Some(session),
        }
    }

    async fn execute(&mut self, query: EngineQuery<'_>) -> Result<EngineBatch, EngineError> {
        match self.session.as_mut() {
            Some(session) => session.execute(query).await,
            None => Err(EngineError::Unavailable("session already closed".to_string())),
        }
    }

    async fn close(mut self) {
        if let Some(mut session) = self.session.take() {
            session.close().await;
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if let Some(mut session) = self.session.take() {
            tracing::debug!("Releasing engine session after an interrupted dispatch");
            session.release();
        }
    }
}
