//! Placeholder substitution against resolved template parameters
//!
//! Descriptor name/namespace strings may carry `${name}` placeholders
//! referring to the instance's resolved parameters. Resolution is a
//! single pass: the first parameter (in declaration order) whose token
//! appears in the string has all of its occurrences replaced, and the
//! result is returned as-is. Remaining placeholders are not resolved
//! re-entrantly.
//!
//! A string in which no parameter token matches resolves to the EMPTY
//! string: an unresolved placeholder must not pass through as a literal
//! object name and send a lookup at a nonsense identity.

use crate::types::Parameter;

/// Marker character that gates substitution; callers only invoke the
/// substitutor when the string contains it.
pub const PLACEHOLDER_MARKER: char = '{';

/// Resolve `s` against `params`, first token match wins.
///
/// Pure function: scans `params` in order, replaces every occurrence of
/// the first matching `${name}` token with its value and returns
/// immediately. Returns `""` when no token matches.
pub fn substitute(params: &[Parameter], s: &str) -> String {
    for param in params {
        let token = param.token();
        if s.contains(&token) {
            return s.replace(&token, &param.value);
        }
    }
    String::new()
}

/// Whether `s` should be run through the substitutor at all
pub fn has_placeholder(s: &str) -> bool {
    s.contains(PLACEHOLDER_MARKER)
}
