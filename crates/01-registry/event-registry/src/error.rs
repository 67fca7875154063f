//! Status codes and error surface for the handler registry.
//!
//! Registration and dispatch never unwind: every outcome is a value. The
//! registry itself only produces [`Status::Success`], [`Status::OutOfScope`]
//! and [`Status::UnknownEvent`]; any other status comes from an executor and
//! is passed through untouched.

use thiserror::Error;

/// Convenience result alias for fallible registry operations.
pub type RegistryResult<T, E = RegistryError> = Result<T, E>;

/// Outcome reported by dispatch and by executors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Status {
    /// The event was handled (or an untouched marker fired).
    Success,
    /// The handler accepted the event and expects further events.
    Continue,
    /// No registered interest matched the event.
    UnknownEvent,
    /// Every slot is occupied; the registration was refused.
    OutOfScope,
    /// Executor-defined failure code.
    Failed(u32),
}

impl Status {
    pub fn is_success(self) -> bool {
        self == Status::Success
    }

    /// True while the surrounding procedure is still waiting on more events.
    pub fn is_working(self) -> bool {
        self == Status::Continue
    }

    pub fn is_failure(self) -> bool {
        matches!(self, Status::OutOfScope | Status::Failed(_))
    }
}

/// Errors surfaced by registration and dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// All slots are occupied.
    #[error("no free handler slot (capacity {capacity})")]
    OutOfScope { capacity: usize },

    /// No occupied slot matches the dispatched event.
    #[error("no registered handler matches the event")]
    UnknownEvent,
}

impl From<RegistryError> for Status {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::OutOfScope { .. } => Status::OutOfScope,
            RegistryError::UnknownEvent => Status::UnknownEvent,
        }
    }
}

impl<T> From<RegistryResult<T>> for Status {
    fn from(result: RegistryResult<T>) -> Self {
        match result {
            Ok(_) => Status::Success,
            Err(err) => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_results_fold_into_status() {
        let ok: RegistryResult<u8> = Ok(3);
        assert_eq!(Status::from(ok), Status::Success);

        let full: RegistryResult<u8> = Err(RegistryError::OutOfScope { capacity: 4 });
        assert_eq!(Status::from(full), Status::OutOfScope);
        assert!(Status::from(full).is_failure());
    }

    #[test]
    fn unknown_event_is_informational() {
        let status = Status::from(RegistryError::UnknownEvent);
        assert_eq!(status, Status::UnknownEvent);
        assert!(!status.is_failure());
        assert!(!status.is_success());
    }

    #[test]
    fn error_messages_name_the_capacity() {
        let err = RegistryError::OutOfScope { capacity: 8 };
        assert_eq!(err.to_string(), "no free handler slot (capacity 8)");
    }
}
