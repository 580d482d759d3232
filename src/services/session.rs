use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

use crate::models::{MealDraft, Profile};
use crate::services::meal_log::MealLog;

type HmacSha256 = Hmac<Sha256>;

/// Everything one browser session owns: its meal log, profile and the meal
/// currently being analysed
#[derive(Debug, Clone)]
pub struct AppSession {
    pub meal_log: MealLog,
    pub profile: Profile,
    pub draft: MealDraft,
    /// Bumped every time `draft` is swapped out for another meal
    pub draft_generation: u64,
    pub last_seen: DateTime<Utc>,
}

impl AppSession {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            meal_log: MealLog::new(),
            profile: Profile::default(),
            draft: MealDraft::default(),
            draft_generation: 0,
            last_seen: now,
        }
    }

    /// Starts a new meal, returning the one it replaces
    pub fn replace_draft(&mut self, draft: MealDraft) -> MealDraft {
        self.draft_generation += 1;
        std::mem::replace(&mut self.draft, draft)
    }
}

/// Issues and checks `<id>.<hmac>` session tokens
pub struct SessionSigner {
    keyed_mac: HmacSha256,
    counter: AtomicU64,
}

impl SessionSigner {
    pub fn new(secret: &str) -> Result<Self> {
        let keyed_mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| anyhow::anyhow!("Invalid session secret: {}", e))?;
        Ok(Self {
            keyed_mac,
            counter: AtomicU64::new(0),
        })
    }

    fn mac(&self) -> HmacSha256 {
        self.keyed_mac.clone()
    }

    /// Returns `(session_id, token)`
    pub fn issue(&self) -> (String, String) {
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let seq = self.counter.fetch_add(1, Ordering::Relaxed);
        let id = format!("{:x}{:04x}", nanos, seq);

        let mut mac = self.mac();
        mac.update(id.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        let token = format!("{}.{}", id, signature);
        (id, token)
    }

    /// Returns the session id when the token's signature checks out
    pub fn verify(&self, token: &str) -> Option<String> {
        let (id, signature) = token.split_once('.')?;
        let signature = hex::decode(signature).ok()?;

        let mut mac = self.mac();
        mac.update(id.as_bytes());
        mac.verify_slice(&signature).ok()?;

        Some(id.to_string())
    }
}

pub struct SessionStore {
    signer: SessionSigner,
    sessions: Mutex<HashMap<String, AppSession>>,
}

impl SessionStore {
    pub fn new(secret: &str) -> Result<Self> {
        Ok(Self {
            signer: SessionSigner::new(secret)?,
            sessions: Mutex::new(HashMap::new()),
        })
    }

    /// Starts a fresh session and returns its token
    pub async fn create(&self) -> String {
        let (id, token) = self.signer.issue();
        let mut sessions = self.sessions.lock().await;
        sessions.insert(id.clone(), AppSession::new(Utc::now()));
        log::info!("🆕 Session created: {} ({} active)", id, sessions.len());
        token
    }

    /// Runs `f` against the session behind `token`.
    ///
    /// Returns `None` for forged, malformed or expired tokens. The lock is held
    /// only for the duration of `f`, so `f` must not block.
    pub async fn with_session<T>(
        &self,
        token: &str,
        f: impl FnOnce(&mut AppSession) -> T,
    ) -> Option<T> {
        let Some(id) = self.signer.verify(token) else {
            log::warn!("⚠️ Rejected session token with bad signature");
            return None;
        };

        let mut sessions = self.sessions.lock().await;
        let session = sessions.get_mut(&id)?;
        session.last_seen = Utc::now();
        Some(f(session))
    }

    /// Drops sessions idle for longer than `ttl`, returning how many went
    pub async fn purge_idle(&self, ttl: Duration) -> usize {
        let cutoff = Utc::now() - ttl;
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.last_seen >= cutoff);
        before - sessions.len()
    }

    pub async fn active_count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signer_round_trip_and_forgery() {
        let signer = SessionSigner::new("secret").unwrap();
        let (id, token) = signer.issue();

        assert_eq!(signer.verify(&token), Some(id.clone()));
        assert_eq!(signer.verify(&format!("{}.{}", id, "00".repeat(32))), None);
        assert_eq!(signer.verify("no-dot-here"), None);
        assert_eq!(SessionSigner::new("other").unwrap().verify(&token), None);
    }

    #[test]
    fn test_signer_issues_distinct_ids() {
        let signer = SessionSigner::new("secret").unwrap();
        let (a, _) = signer.issue();
        let (b, _) = signer.issue();
        assert_ne!(a, b);
    }

    #[test]
    fn test_replace_draft_bumps_generation() {
        let mut session = AppSession::new(Utc::now());
        session.draft.detected_items = "• Soup".to_string();

        let old = session.replace_draft(MealDraft::default());
        assert_eq!(old.detected_items, "• Soup");
        assert!(session.draft.detected_items.is_empty());
        assert_eq!(session.draft_generation, 1);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = SessionStore::new("secret").unwrap();
        let first = store.create().await;
        let second = store.create().await;

        store
            .with_session(&first, |s| s.profile.dietary_preference = "Halal".to_string())
            .await
            .unwrap();

        let pref = store
            .with_session(&second, |s| s.profile.dietary_preference.clone())
            .await
            .unwrap();
        assert_eq!(pref, "Vegetarian");
        assert!(store.with_session("bogus.token", |_| ()).await.is_none());
    }

    #[tokio::test]
    async fn test_purge_idle() {
        let store = SessionStore::new("secret").unwrap();
        let stale = store.create().await;
        let fresh = store.create().await;

        store
            .with_session(&stale, |s| s.last_seen = Utc::now() - Duration::hours(5))
            .await
            .unwrap();

        assert_eq!(store.purge_idle(Duration::hours(2)).await, 1);
        assert_eq!(store.active_count().await, 1);
        assert!(store.with_session(&stale, |_| ()).await.is_none());
        assert!(store.with_session(&fresh, |_| ()).await.is_some());
    }
}
