//! Repository trait for live sessions.
//!
//! The registry owns every session; a session owns all of its state. Use cases
//! depend on this trait, and the in-memory implementation lives in the
//! infrastructure layer.

use std::sync::Arc;

use async_trait::async_trait;

use super::{
    error::{CreateSessionError, RepositoryError},
    session::Session,
    value_object::SessionCode,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Create a session under a fresh code that no live session uses.
    ///
    /// # Errors
    ///
    /// `CreateSessionError` when the registry is full or no free code was found
    async fn create_session(&self) -> Result<Arc<Session>, CreateSessionError>;

    /// Look up a live session.
    ///
    /// # Errors
    ///
    /// `RepositoryError::SessionNotFound` if no live session has this code
    async fn find_session(&self, code: &SessionCode) -> Result<Arc<Session>, RepositoryError>;

    /// Destroy the session if its roster is empty. Returns whether it was destroyed.
    ///
    /// Called after every player removal; sessions nobody joins are also reaped
    /// by the implementation after a grace period.
    async fn remove_if_empty(&self, code: &SessionCode) -> bool;

    /// All live sessions, ordered by code
    async fn list_sessions(&self) -> Vec<Arc<Session>>;

    async fn count_sessions(&self) -> usize;
}
