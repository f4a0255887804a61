//! Crate-wide error type.
//!
//! Construction and structural mutation are fallible and return
//! [`PhysicsError`], while the per-step solver never panics on bad
//! simulation state — a body that diverges is logged and disabled rather
//! than propagated as an error (see [`PhysicsError::Diverged`] and
//! `World::step`).

use thiserror::Error;

use crate::handle::BodyHandle;

/// Errors surfaced by the core simulation API.
#[derive(Debug, Error, PartialEq)]
pub enum PhysicsError {
    /// A caller-supplied argument violated a documented invariant.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A structural mutation (add/remove body or joint) was attempted while
    /// a step was in progress.
    #[error("world is mid-step: structural mutations must happen between steps")]
    InvalidState,

    /// A body's state became non-finite during integration.
    ///
    /// The body named here has already been disabled by the time this is
    /// observed through [`crate::listener::StepListener`]; the world itself
    /// is not rolled back.
    #[error("body {0:?} diverged (NaN/Inf in position or velocity)")]
    Diverged(BodyHandle),
}

impl PhysicsError {
    /// Build an [`PhysicsError::InvalidArgument`] from a message.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

/// Convenience alias used throughout the crate.
pub type PhysicsResult<T> = Result<T, PhysicsError>;
