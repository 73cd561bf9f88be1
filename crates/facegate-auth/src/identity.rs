//! Identity number normalization, display formatting, and directory resolution.

use crate::session::AuthenticationSession;
use facegate_core::directory::IDENTITY_NUMBER_LEN;
use facegate_core::RegisteredIdentity;
use std::sync::Arc;

const GROUP_LEN: usize = 4;

/// Effect of one identity input event on the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputChange {
    /// Input rejected (non-digits or too long); session unchanged.
    Ignored,
    /// Input accepted; `id_valid` reflects the new value.
    Updated,
    /// Twelve digits that are not in the directory.
    NotFound(String),
}

/// Strip whitespace and accept only up to twelve ASCII digits.
pub fn normalize_input(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.len() > IDENTITY_NUMBER_LEN || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(digits)
}

/// Group digits in runs of four separated by single spaces.
pub fn format_display(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / GROUP_LEN);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && i % GROUP_LEN == 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

/// Apply a raw input event to the session.
pub(crate) fn apply_input(
    session: &mut AuthenticationSession,
    directory: &[Arc<RegisteredIdentity>],
    raw: &str,
) -> InputChange {
    let Some(digits) = normalize_input(raw) else {
        return InputChange::Ignored;
    };

    session.id_input_formatted = format_display(&digits);
    session.id_input_raw = digits;

    if resolve(session, directory) || session.id_input_raw.len() != IDENTITY_NUMBER_LEN {
        InputChange::Updated
    } else {
        InputChange::NotFound(session.id_input_raw.clone())
    }
}

/// Re-resolve the current digits against `directory`. Returns whether an
/// identity was linked.
pub(crate) fn resolve(
    session: &mut AuthenticationSession,
    directory: &[Arc<RegisteredIdentity>],
) -> bool {
    let linked = if session.id_input_raw.len() == IDENTITY_NUMBER_LEN {
        directory
            .iter()
            .find(|i| i.identity_number == session.id_input_raw)
            .cloned()
    } else {
        None
    };

    session.id_valid = linked.is_some();
    session.linked_identity = linked;
    session.id_valid
}
