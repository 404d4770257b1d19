//! `SecurityHelper`: session timers, payload encryption, input validation.
//!
//! ## Session timers
//!
//! ```text
//! start_session_timeout(id)  → expiry = now + session_timeout (resets if present)
//! check_session_timeout(id)  → true if no timer, or now > expiry (read-only)
//! clear_session_timeout(id)  → timer removed (no-op if absent)
//! sweep_expired_sessions()   → expired timers removed
//! ```
//!
//! An unknown session and an expired session are indistinguishable to
//! callers. Checking never evicts; reclaiming memory is the job of
//! `sweep_expired_sessions` or the tracked-session bound.
//!
//! ## Encryption
//!
//! The key is generated when the helper is constructed and is never persisted.
//! Ciphertext from a previous process (or another helper) will not decrypt.

pub mod cipher;
pub mod validate;

pub use cipher::SessionCipher;
pub use validate::{validate_data, validate_text};

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::error::Result;

const SECURITY_HEADERS: [(&str, &str); 4] = [
    ("Content-Security-Policy", "default-src 'self'"),
    ("X-Content-Type-Options", "nosniff"),
    ("X-Frame-Options", "DENY"),
    ("X-XSS-Protection", "1; mode=block"),
];

pub struct SecurityHelper {
    config: SecurityConfig,
    session_timers: RwLock<HashMap<String, DateTime<Utc>>>,
    cipher: SessionCipher,
}

impl SecurityHelper {
    pub fn new(config: SecurityConfig) -> Self {
        let cipher = SessionCipher::generate();
        info!(
            key_id = cipher.key_id(),
            session_timeout_secs = config.session_timeout_secs,
            "security helper ready"
        );
        Self {
            config,
            session_timers: RwLock::new(HashMap::new()),
            cipher,
        }
    }

    /// Random UUID v4 string.
    pub fn generate_session_id(&self) -> String {
        Uuid::new_v4().to_string()
    }

    /// (Re)start the timer for `session_id`.
    pub fn start_session_timeout(&self, session_id: &str) {
        self.start_session_timeout_at(session_id, Utc::now());
    }

    pub fn start_session_timeout_at(&self, session_id: &str, now: DateTime<Utc>) {
        let expiry = now
            .checked_add_signed(self.config.session_timeout())
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let mut timers = self.session_timers.write();

        if !timers.contains_key(session_id) && timers.len() >= self.config.max_tracked_sessions {
            let before = timers.len();
            timers.retain(|_, expires_at| now <= *expires_at);
            debug!(removed = before - timers.len(), "expired timers swept at capacity");

            if timers.len() >= self.config.max_tracked_sessions {
                let soonest = timers
                    .iter()
                    .min_by_key(|(_, expires_at)| **expires_at)
                    .map(|(id, _)| id.clone());
                if let Some(soonest) = soonest {
                    timers.remove(&soonest);
                    warn!(
                        capacity = self.config.max_tracked_sessions,
                        "session timer table full, evicted soonest-expiring session"
                    );
                }
            }
        }

        timers.insert(session_id.to_string(), expiry);
    }

    /// Remove the timer for `session_id`. No-op if absent.
    pub fn clear_session_timeout(&self, session_id: &str) {
        self.session_timers.write().remove(session_id);
    }

    /// Clear everything the helper holds for `session_id` (its timer).
    pub fn clear_session_data(&self, session_id: &str) {
        self.clear_session_timeout(session_id);
        debug!("session data cleared");
    }

    /// `true` when the session has no timer or its expiry has passed.
    pub fn check_session_timeout(&self, session_id: &str) -> bool {
        self.check_session_timeout_at(session_id, Utc::now())
    }

    pub fn check_session_timeout_at(&self, session_id: &str, now: DateTime<Utc>) -> bool {
        match self.session_timers.read().get(session_id) {
            Some(expires_at) => now > *expires_at,
            None => true,
        }
    }

    /// Drop every expired timer. Returns the count removed.
    pub fn sweep_expired_sessions(&self) -> usize {
        self.sweep_expired_sessions_at(Utc::now())
    }

    pub fn sweep_expired_sessions_at(&self, now: DateTime<Utc>) -> usize {
        let mut timers = self.session_timers.write();
        let before = timers.len();
        timers.retain(|_, expires_at| now <= *expires_at);
        before - timers.len()
    }

    /// Number of timers currently tracked, expired or not.
    pub fn active_sessions(&self) -> usize {
        self.session_timers.read().len()
    }

    pub fn encrypt_data(&self, data: &str) -> Result<String> {
        self.cipher.encrypt(data)
    }

    /// # Errors
    /// `MedBridgeError::Decryption` for malformed input or ciphertext produced
    /// under a different key.
    pub fn decrypt_data(&self, encrypted: &str) -> Result<String> {
        self.cipher.decrypt(encrypted)
    }

    pub fn validate_data(&self, data: &Value) -> bool {
        validate_data(data)
    }

    pub fn validate_text(&self, text: &str) -> bool {
        validate_text(text)
    }

    /// The backend is assumed to sit behind TLS termination.
    pub fn is_secure_context(&self) -> bool {
        true
    }

    /// Restrictive response headers for the calling web layer to attach.
    pub fn security_headers(&self) -> BTreeMap<&'static str, &'static str> {
        SECURITY_HEADERS.into_iter().collect()
    }
}

impl Default for SecurityHelper {
    fn default() -> Self {
        Self::new(SecurityConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    #[test]
    fn session_ids_are_unique_uuids() {
        let helper = SecurityHelper::default();
        let a = helper.generate_session_id();
        let b = helper.generate_session_id();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a).is_ok());
    }

    #[test]
    fn unknown_session_reports_timed_out() {
        let helper = SecurityHelper::default();
        assert!(helper.check_session_timeout("never-started"));
    }

    #[test]
    fn start_check_clear_cycle() {
        let helper = SecurityHelper::default();
        helper.start_session_timeout("s1");
        assert!(!helper.check_session_timeout("s1"));
        helper.clear_session_timeout("s1");
        assert!(helper.check_session_timeout("s1"));
        helper.clear_session_timeout("s1");
        helper.clear_session_data("s1");
    }

    #[test]
    fn session_expires_after_timeout() {
        let helper = SecurityHelper::default();
        let start = Utc::now();
        helper.start_session_timeout_at("s1", start);
        assert!(!helper.check_session_timeout_at("s1", start + Duration::minutes(15)));
        assert!(helper.check_session_timeout_at("s1", start + Duration::minutes(16)));
        // Checking does not evict.
        assert_eq!(helper.active_sessions(), 1);
    }

    #[test]
    fn restarting_resets_the_timer() {
        let helper = SecurityHelper::default();
        let start = Utc::now();
        helper.start_session_timeout_at("s1", start);
        helper.start_session_timeout_at("s1", start + Duration::minutes(10));
        assert!(!helper.check_session_timeout_at("s1", start + Duration::minutes(20)));
        assert_eq!(helper.active_sessions(), 1);
    }

    #[test]
    fn sweep_removes_expired_timers_only() {
        let helper = SecurityHelper::default();
        let start = Utc::now();
        helper.start_session_timeout_at("old", start);
        helper.start_session_timeout_at("new", start + Duration::minutes(10));
        let removed = helper.sweep_expired_sessions_at(start + Duration::minutes(20));
        assert_eq!(removed, 1);
        assert_eq!(helper.active_sessions(), 1);
        assert!(helper.check_session_timeout_at("old", start + Duration::minutes(20)));
    }

    #[test]
    fn bounded_table_evicts_soonest_expiring() {
        let helper = SecurityHelper::new(SecurityConfig {
            session_timeout_secs: 60,
            max_tracked_sessions: 2,
        });
        let start = Utc::now();
        helper.start_session_timeout_at("a", start);
        helper.start_session_timeout_at("b", start + Duration::seconds(10));
        helper.start_session_timeout_at("c", start + Duration::seconds(20));

        assert_eq!(helper.active_sessions(), 2);
        let check_at = start + Duration::seconds(30);
        assert!(helper.check_session_timeout_at("a", check_at));
        assert!(!helper.check_session_timeout_at("b", check_at));
        assert!(!helper.check_session_timeout_at("c", check_at));
    }

    #[test]
    fn oversized_timeout_saturates_instead_of_panicking() {
        let helper = SecurityHelper::new(SecurityConfig {
            session_timeout_secs: 10_000_000_000_000_000,
            max_tracked_sessions: 10,
        });
        let start = Utc::now();
        helper.start_session_timeout_at("s1", start);
        assert!(!helper.check_session_timeout_at("s1", start + Duration::hours(24)));
        assert!(helper.check_session_timeout_at("s1", start + Duration::hours(25)));

        helper.start_session_timeout("s2");
        assert!(!helper.check_session_timeout("s2"));
    }

    #[test]
    fn expiry_near_the_end_of_time_does_not_overflow() {
        let helper = SecurityHelper::default();
        helper.start_session_timeout_at("late", DateTime::<Utc>::MAX_UTC);
        assert!(!helper.check_session_timeout_at("late", DateTime::<Utc>::MAX_UTC));
    }

    #[test]
    fn encryption_round_trips_any_string() {
        let helper = SecurityHelper::default();
        for plain in ["", "hypertension", "高血压 / ارتفاع ضغط الدم", "a\nb\t\"c\""] {
            let token = helper.encrypt_data(plain).expect("encrypt");
            assert_ne!(token, plain);
            assert_eq!(helper.decrypt_data(&token).expect("decrypt"), plain);
        }
    }

    #[test]
    fn ciphertext_from_another_helper_fails() {
        let first = SecurityHelper::default();
        let second = SecurityHelper::default();
        let token = first.encrypt_data("patient notes").expect("encrypt");
        assert!(matches!(
            second.decrypt_data(&token),
            Err(crate::error::MedBridgeError::Decryption(_))
        ));
        let empty = first.encrypt_data("").expect("encrypt empty");
        assert!(second.decrypt_data(&empty).is_err());
    }

    #[test]
    fn validation_delegates_by_value_type() {
        let helper = SecurityHelper::default();
        assert!(!helper.validate_data(&json!("<b>x</b>")));
        assert!(helper.validate_data(&json!("plain")));
        assert!(helper.validate_data(&json!(3.5)));
        assert!(helper.is_secure_context());
    }

    #[test]
    fn security_headers_are_fixed() {
        let headers = SecurityHelper::default().security_headers();
        assert_eq!(headers.len(), 4);
        assert_eq!(headers["Content-Security-Policy"], "default-src 'self'");
        assert_eq!(headers["X-Content-Type-Options"], "nosniff");
        assert_eq!(headers["X-Frame-Options"], "DENY");
        assert_eq!(headers["X-XSS-Protection"], "1; mode=block");
    }
}
