//! Cross-crate integration test host for the Credence Stack.
//!
//! The suite lives in `tests/`; this library target is intentionally
//! empty.
