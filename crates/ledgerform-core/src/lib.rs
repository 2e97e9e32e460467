//! ledgerform-core: schema, formatting and form-state contracts for the
//! ledgerform field rendering engine.
//!
//! This crate holds everything the renderers need that is not presentation:
//! the declarative field schema delivered by the backend, locale-aware number
//! and date round-tripping, the path-addressed form-state contract (plus an
//! in-memory implementation), validation rules, configuration and errors.

pub mod config;
pub mod date;
pub mod error;
pub mod form_state;
pub mod numeric;
pub mod path;
pub mod schema;
pub mod validation;
pub mod value;

/// Crate identity label used for parity verification.
pub fn crate_label() -> &'static str {
    "ledgerform-core"
}
