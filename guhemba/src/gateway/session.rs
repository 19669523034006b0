use std::collections::HashMap;

use parking_lot::Mutex;
use rand::distributions::{Alphanumeric, DistString};

use crate::error::GatewayError;

/// Session key under which the one-time redirect state token is stored.
pub const STATE_KEY: &str = "guhemba_state";

/// Length of the generated state token.
pub const STATE_LEN: usize = 40;

/// String-keyed session storage supplied by the hosting application.
///
/// `pull` has read-and-clear semantics; the handshake relies on it so a
/// stored state can be consumed at most once.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&self, key: &str, value: String);
    fn pull(&self, key: &str) -> Option<String>;
}

/// In-memory [`SessionStore`] for demos and tests. Real deployments adapt
/// their framework's per-user session instead.
#[derive(Debug, Default)]
pub struct MemorySession {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySession {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    fn put(&self, key: &str, value: String) {
        self.values.lock().insert(key.to_string(), value);
    }

    fn pull(&self, key: &str) -> Option<String> {
        self.values.lock().remove(key)
    }
}

/// Samples a fresh 40-character alphanumeric state token.
pub(crate) fn new_state_token() -> String {
    Alphanumeric.sample_string(&mut rand::thread_rng(), STATE_LEN)
}

/// Validates the callback state handshake. Rules are checked in order and
/// the first failure wins:
///
/// 1. no state on the inbound request,
/// 2. no state left in the session (never set, or already consumed),
/// 3. the two values differ.
pub fn check_session_state(
    stored: Option<String>,
    inbound: Option<&str>,
) -> Result<(), GatewayError> {
    let Some(inbound) = inbound else {
        return Err(GatewayError::Rejected {
            message: "Request state not available",
            hint: "Please make sure you are coming from guhemba",
        });
    };

    let Some(stored) = stored else {
        return Err(GatewayError::Rejected {
            message: "Session state was not set",
            hint: "Please make sure you have been using the same browser when completing payment on guhemba",
        });
    };

    if stored != inbound {
        return Err(GatewayError::Rejected {
            message: "Request state don't match",
            hint: "Please make sure you are not using the callback url twice",
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejection_message(result: Result<(), GatewayError>) -> &'static str {
        match result.unwrap_err() {
            GatewayError::Rejected { message, .. } => message,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_inbound_state_wins_over_everything() {
        let result = check_session_state(None, None);
        assert_eq!(rejection_message(result), "Request state not available");

        // Even with a stored state waiting, the inbound check runs first.
        let result = check_session_state(Some("abc".into()), None);
        assert_eq!(rejection_message(result), "Request state not available");
    }

    #[test]
    fn missing_stored_state_is_rejected() {
        let result = check_session_state(None, Some("abc"));
        assert_eq!(rejection_message(result), "Session state was not set");
    }

    #[test]
    fn mismatched_state_is_rejected() {
        let result = check_session_state(Some("abc".into()), Some("xyz"));
        assert_eq!(rejection_message(result), "Request state don't match");
    }

    #[test]
    fn matching_state_is_accepted() {
        assert!(check_session_state(Some("abc".into()), Some("abc")).is_ok());
    }

    #[test]
    fn pull_consumes_the_stored_state() {
        let session = MemorySession::new();
        session.put(STATE_KEY, "abc".into());
        assert_eq!(session.get(STATE_KEY).as_deref(), Some("abc"));

        assert!(check_session_state(session.pull(STATE_KEY), Some("abc")).is_ok());

        // Second consumption always lands on the missing-stored branch.
        let result = check_session_state(session.pull(STATE_KEY), Some("abc"));
        assert_eq!(rejection_message(result), "Session state was not set");
    }

    #[test]
    fn state_tokens_are_40_alphanumeric_chars() {
        let token = new_state_token();
        assert_eq!(token.len(), STATE_LEN);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(token, new_state_token());
    }
}
