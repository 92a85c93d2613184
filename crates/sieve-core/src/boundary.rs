//! Panic recovery at the public entry points.
//!
//! Builders return `Result` throughout; this boundary only exists so that a
//! bug (or a panicking user `FieldValue` impl) surfaces as an `Error` instead
//! of unwinding through the caller.

use crate::{
    error::Error,
    obs::sink::{self, MetricsEvent},
};
use std::{
    any::Any,
    panic::{AssertUnwindSafe, catch_unwind},
};

/// Run `f`, converting any panic into an `Error`.
pub fn guard<T>(f: impl FnOnce() -> Result<T, Error>) -> Result<T, Error> {
    catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        let err = recover(payload);
        sink::record(MetricsEvent::PanicRecovered);
        tracing::debug!(error = %err, "recovered panic at entry point");

        Err(err)
    })
}

/// Normalize a panic payload into an `Error`.
///
/// An `Error` payload passes through untouched; string payloads become
/// `Error::Panicked` carrying the message.
#[must_use]
pub fn recover(payload: Box<dyn Any + Send>) -> Error {
    let payload = match payload.downcast::<Error>() {
        Ok(err) => return *err,
        Err(other) => other,
    };
    let payload = match payload.downcast::<String>() {
        Ok(message) => return Error::Panicked { message: *message },
        Err(other) => other,
    };

    match payload.downcast::<&'static str>() {
        Ok(message) => Error::Panicked {
            message: (*message).to_string(),
        },
        Err(_) => Error::Panicked {
            message: "unknown panic payload".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InputKind;
    use std::panic::{panic_any, resume_unwind};

    #[test]
    fn error_payload_passes_through() {
        let err = Error::InvalidInputKind {
            kind: InputKind::Null,
        };

        assert_eq!(recover(Box::new(err.clone())), err);
    }

    #[test]
    fn string_payloads_become_panicked() {
        assert_eq!(
            recover(Box::new("boom")),
            Error::Panicked {
                message: "boom".into()
            }
        );
        assert_eq!(
            recover(Box::new(String::from("bang"))),
            Error::Panicked {
                message: "bang".into()
            }
        );
    }

    #[test]
    fn unknown_payloads_get_a_generic_message() {
        let err = recover(Box::new(42_u8));

        assert!(matches!(err, Error::Panicked { .. }));
    }

    #[test]
    fn guard_returns_ok_untouched() {
        let out = guard(|| Ok::<_, Error>(7));

        assert_eq!(out, Ok(7));
    }

    #[test]
    fn guard_recovers_formatted_panics() {
        let field = "age";
        let out: Result<(), Error> = guard(|| panic!("field {field} broke"));

        assert_eq!(
            out,
            Err(Error::Panicked {
                message: "field age broke".into()
            })
        );
    }

    #[test]
    fn guard_recovers_error_payloads() {
        let err = Error::ProjectionFailure { kind: "int" };
        let raised = err.clone();
        let out: Result<(), Error> = guard(move || panic_any(raised));

        assert_eq!(out, Err(err));
    }

    #[test]
    fn guard_recovers_resumed_unwinds() {
        let out: Result<(), Error> = guard(|| resume_unwind(Box::new("resumed")));

        assert_eq!(
            out,
            Err(Error::Panicked {
                message: "resumed".into()
            })
        );
    }
}
