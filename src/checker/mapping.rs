//! ActiveState to HTTP status code mapping.
//!
//! Kept as a lookup table so a new unit state is a data change, not a
//! control-flow change. The table must not drift:
//! `active → 200`; `inactive, failed, activating, deactivating, reloading
//! → 503`; anything else → 500.

/// Known unit states and the status code each maps to.
const STATE_CODES: &[(&str, u16)] = &[
    ("active", 200),
    ("inactive", 503),
    ("failed", 503),
    ("activating", 503),
    ("deactivating", 503),
    ("reloading", 503),
];

/// Status code for a recognized unit state, if any.
pub fn status_code_for(state: &str) -> Option<u16> {
    STATE_CODES
        .iter()
        .find(|(s, _)| *s == state)
        .map(|(_, code)| *code)
}

/// Fallback for unrecognized states. An unknown state must never be
/// reported as healthy.
pub const UNKNOWN_STATE_CODE: u16 = 500;
