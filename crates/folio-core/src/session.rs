//! Session gate: a shared-secret speed bump in front of every mutation.
//!
//! This is not a security boundary. The secret is compared in plain text and
//! the session flag is an ordinary store entry; the gate only keeps casual
//! visitors from editing. A successful [`SessionGate::authenticate`] writes
//! a [`SessionFlag`] that stays valid for a fixed window (24h by default)
//! and is never renewed; validity is re-derived from the store on every
//! check, so there is no background timer to keep in sync.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::error::{FolioError, Result};
use crate::store::keys::{SECRET_OVERRIDE_KEY, SESSION_KEY};
use crate::store::KeyedStore;

/// Default session window in hours.
pub const DEFAULT_TTL_HOURS: i64 = 24;

/// Secret used when neither the config resource nor an override supplies one.
pub const DEFAULT_SECRET: &str = "change-me";

static ASSIGNMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^\s*(?:(?:const|let|var)\s+)?[A-Za-z_][A-Za-z0-9_]*\s*=\s*(?:"([^"]+)"|'([^']+)')"#)
        .expect("secret assignment pattern is valid")
});

/// Persisted marker of a successful login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFlag {
    pub authenticated: bool,
    /// Login instant in epoch milliseconds.
    pub timestamp: i64,
}

impl SessionFlag {
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }
}

/// Where the shared secret can come from, highest trust first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretTier {
    ConfigResource,
    LocalOverride,
    BuiltIn,
}

/// External provider of the shared secret.
pub trait SecretSource {
    /// Fetch the secret.
    ///
    /// `Ok(None)` means the source is reachable but defines no secret.
    /// Errors are treated as "unavailable" by the gate.
    fn fetch(&self) -> Result<Option<String>>;
}

/// A text file exposing one assignment such as `const WEBSITE_PASSWORD = "..."`.
#[derive(Debug, Clone)]
pub struct ConfigResource {
    path: PathBuf,
}

impl ConfigResource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SecretSource for ConfigResource {
    fn fetch(&self) -> Result<Option<String>> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            FolioError::Storage(format!(
                "Failed to read secret resource {}: {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(parse_secret_assignment(&contents))
    }
}

/// Extract the string literal of the first `NAME = "value"` assignment.
pub fn parse_secret_assignment(text: &str) -> Option<String> {
    let captures = ASSIGNMENT.captures(text)?;
    captures
        .get(1)
        .or_else(|| captures.get(2))
        .map(|m| m.as_str().to_string())
}

/// Side effect fired when a gated action finds no valid session.
pub trait CredentialPrompt {
    fn request_credentials(&self);
}

/// Prompt that does nothing; callers inspect the returned boolean instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentPrompt;

impl CredentialPrompt for SilentPrompt {
    fn request_credentials(&self) {}
}

/// Tunables for the gate.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub ttl: Duration,
    pub default_secret: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::hours(DEFAULT_TTL_HOURS),
            default_secret: DEFAULT_SECRET.to_string(),
        }
    }
}

/// Shared-secret session gate.
pub struct SessionGate {
    settings: SessionSettings,
    resource: Option<Box<dyn SecretSource>>,
    prompt: Box<dyn CredentialPrompt>,
    clock: Rc<dyn Clock>,
}

impl SessionGate {
    pub fn new(settings: SessionSettings, clock: Rc<dyn Clock>) -> Self {
        Self {
            settings,
            resource: None,
            prompt: Box::new(SilentPrompt),
            clock,
        }
    }

    /// Attach the external config resource (highest trust tier).
    pub fn with_resource(mut self, source: impl SecretSource + 'static) -> Self {
        self.resource = Some(Box::new(source));
        self
    }

    /// Replace the credential prompt side effect.
    pub fn with_prompt(mut self, prompt: impl CredentialPrompt + 'static) -> Self {
        self.prompt = Box::new(prompt);
        self
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Resolve the active secret and the tier it came from.
    ///
    /// A failing config resource is not an error; resolution falls through
    /// to the next tier.
    pub fn resolve_secret<S: KeyedStore + ?Sized>(&self, store: &S) -> (String, SecretTier) {
        if let Some(resource) = self.resource.as_ref() {
            match resource.fetch() {
                Ok(Some(secret)) if !secret.is_empty() => {
                    return (secret, SecretTier::ConfigResource);
                }
                Ok(_) => debug!("config resource defines no secret"),
                Err(err) => debug!(error = %err, "config resource unavailable"),
            }
        }
        match store.get(SECRET_OVERRIDE_KEY) {
            Ok(Some(secret)) if !secret.is_empty() => {
                return (secret, SecretTier::LocalOverride);
            }
            Ok(_) => {}
            Err(err) => debug!(error = %err, "secret override unreadable"),
        }
        (self.settings.default_secret.clone(), SecretTier::BuiltIn)
    }

    /// Compare `candidate` with the secret and open a session on match.
    ///
    /// Returns `Ok(false)` on mismatch; there is no lockout.
    ///
    /// # Errors
    ///
    /// Returns `FolioError::Storage` if the session flag cannot be written.
    pub fn authenticate<S: KeyedStore + ?Sized>(
        &self,
        store: &mut S,
        candidate: &str,
    ) -> Result<bool> {
        let (secret, tier) = self.resolve_secret(store);
        if candidate.is_empty() || candidate != secret {
            info!(?tier, "authentication rejected");
            return Ok(false);
        }
        let flag = SessionFlag {
            authenticated: true,
            timestamp: self.clock.now().timestamp_millis(),
        };
        store.set(SESSION_KEY, &serde_json::to_string(&flag)?)?;
        info!(?tier, "session opened");
        Ok(true)
    }

    /// Current persisted flag, if readable.
    pub fn flag<S: KeyedStore + ?Sized>(&self, store: &S) -> Option<SessionFlag> {
        let raw = match store.get(SESSION_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!(error = %err, "session flag unreadable");
                return None;
            }
        };
        match serde_json::from_str::<SessionFlag>(&raw) {
            Ok(flag) => Some(flag),
            Err(err) => {
                debug!(error = %err, "ignoring malformed session flag");
                None
            }
        }
    }

    /// Expiry instant of the current session, when one is valid.
    pub fn expires_at<S: KeyedStore + ?Sized>(&self, store: &S) -> Option<DateTime<Utc>> {
        let flag = self.flag(store)?;
        if !flag.authenticated {
            return None;
        }
        let expires = flag.issued_at()?.checked_add_signed(self.settings.ttl)?;
        if self.clock.now() < expires {
            Some(expires)
        } else {
            None
        }
    }

    /// Whether a valid session exists right now.
    pub fn is_valid<S: KeyedStore + ?Sized>(&self, store: &S) -> bool {
        self.expires_at(store).is_some()
    }

    /// Gate check before a mutation.
    ///
    /// Fires the credential prompt and returns `false` when no valid session
    /// exists. Never errors.
    pub fn guard<S: KeyedStore + ?Sized>(&self, store: &S) -> bool {
        if self.is_valid(store) {
            return true;
        }
        debug!("guard blocked action; requesting credentials");
        self.prompt.request_credentials();
        false
    }

    /// Close the session immediately.
    pub fn logout<S: KeyedStore + ?Sized>(&self, store: &mut S) -> Result<()> {
        store.remove(SESSION_KEY)?;
        info!("session closed");
        Ok(())
    }

    /// Persist the local override secret (second trust tier).
    pub fn set_secret_override<S: KeyedStore + ?Sized>(
        &self,
        store: &mut S,
        secret: &str,
    ) -> Result<()> {
        if secret.is_empty() {
            return Err(FolioError::InvalidInput(
                "Secret cannot be empty".to_string(),
            ));
        }
        store.set(SECRET_OVERRIDE_KEY, secret)
    }
}
