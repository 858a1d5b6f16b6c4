//! Error types for the Temporal client.
//!
//! This module defines all error types that can occur when working with
//! Temporal workflows, in particular the replay-time errors raised by the
//! decision engine.

use thiserror::Error;

/// Error type for non-deterministic workflow execution.
///
/// Raised when replayed history cannot be reconciled with the decisions the
/// currently running workflow code produces. Fatal to the current workflow
/// task attempt: local state can no longer be trusted to match server
/// history, so the attempt must be failed rather than completed.
#[derive(Debug, Clone, Error)]
#[error("NonDeterministicError: {message}")]
pub struct NonDeterministicError {
    pub message: String,
    pub decision_text: Option<String>,
    pub history_event_text: Option<String>,
}

impl NonDeterministicError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            decision_text: None,
            history_event_text: None,
        }
    }

    pub fn with_history_event_text(mut self, text: impl Into<String>) -> Self {
        self.history_event_text = Some(text.into());
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Error type for a replayed history event that lacks the attributes its
/// declared event type requires.
///
/// Indicates a server/client protocol mismatch and is never recoverable
/// locally.
#[derive(Debug, Clone, Error)]
#[error("CorruptedEventError: event_id={event_id}, event_type={event_type}, missing {missing}")]
pub struct CorruptedEventError {
    pub event_id: i64,
    pub event_type: String,
    pub missing: String,
}

impl CorruptedEventError {
    pub fn new(
        event_id: i64,
        event_type: impl Into<String>,
        missing: impl Into<String>,
    ) -> Self {
        Self {
            event_id,
            event_type: event_type.into(),
            missing: missing.into(),
        }
    }
}

/// Server error types
#[derive(Debug, Clone, Error)]
pub enum ServerError {
    #[error("EntityNotExistsError: {message}")]
    EntityNotExists { message: String },

    #[error("BadRequestError: {message}")]
    BadRequest { message: String },

    #[error("WorkflowExecutionAlreadyStartedError: {message}")]
    WorkflowExecutionAlreadyStarted { message: String },

    #[error("ServiceBusyError: {message}")]
    ServiceBusy { message: String },

    #[error("InternalServiceError: {message}")]
    InternalService { message: String },

    #[error("QueryFailedError: {message}")]
    QueryFailed { message: String },

    #[error("ClientVersionNotSupportedError: {message}")]
    ClientVersionNotSupported { message: String },

    #[error("CancellationAlreadyRequestedError: {message}")]
    CancellationAlreadyRequested { message: String },
}

/// Main Temporal error type that encompasses all errors
#[derive(Debug, Error)]
pub enum TemporalError {
    #[error(transparent)]
    NonDeterministic(#[from] NonDeterministicError),

    #[error(transparent)]
    CorruptedEvent(#[from] CorruptedEventError),

    #[error(transparent)]
    Server(#[from] ServerError),

    #[error("Illegal state: {0}")]
    IllegalState(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Deadline exceeded: {0}")]
    DeadlineExceeded(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

pub type TemporalResult<T> = Result<T, TemporalError>;

/// Helper functions to check error types
pub fn is_non_deterministic_error(err: &TemporalError) -> bool {
    matches!(err, TemporalError::NonDeterministic(_))
}

pub fn is_corrupted_event_error(err: &TemporalError) -> bool {
    matches!(err, TemporalError::CorruptedEvent(_))
}

pub fn is_deadline_exceeded_error(err: &TemporalError) -> bool {
    matches!(err, TemporalError::DeadlineExceeded(_))
}

pub fn is_entity_not_exists_error(err: &TemporalError) -> bool {
    matches!(err, TemporalError::Server(ServerError::EntityNotExists { .. }))
}

pub fn is_service_busy_error(err: &TemporalError) -> bool {
    matches!(err, TemporalError::Server(ServerError::ServiceBusy { .. }))
}
