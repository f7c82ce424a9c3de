//! Credential validation against the process environment
//!
//! Two provider keys are required before a run may start: one for the LLM
//! provider and one for the search tool provider. Checking is a pure
//! function of an environment snapshot so it can be tested without
//! mutating the real environment.

/// Environment variables that must be present before a run can start,
/// in reporting order
pub const REQUIRED_KEYS: [&str; 2] = ["GEMINI_API_KEY", "SERPER_API_KEY"];

/// Outcome of a credential check
#[derive(Debug, Clone, PartialEq)]
pub struct CredentialCheck {
    pub valid: bool,
    /// Names of absent variables, in [`REQUIRED_KEYS`] order
    pub missing: Vec<String>,
}

impl CredentialCheck {
    /// Human-readable summary for the blocked-run message
    pub fn missing_summary(&self) -> String {
        self.missing.join(", ")
    }
}

/// Check the real process environment
pub fn check_credentials() -> CredentialCheck {
    check_credentials_with(|key| std::env::var(key).ok())
}

/// Check an arbitrary environment lookup
///
/// A variable set to an empty or whitespace-only value counts as missing.
pub fn check_credentials_with<F>(lookup: F) -> CredentialCheck
where
    F: Fn(&str) -> Option<String>,
{
    let missing: Vec<String> = REQUIRED_KEYS
        .iter()
        .filter(|key| lookup(key).map_or(true, |v| v.trim().is_empty()))
        .map(|key| key.to_string())
        .collect();

    CredentialCheck {
        valid: missing.is_empty(),
        missing,
    }
}
