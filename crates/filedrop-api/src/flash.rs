//! One-shot status messages carried across the post/redirect/get cycle.
//!
//! The message itself stays on the server; the browser only holds an opaque
//! key in an HttpOnly cookie. Reading a message removes it.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use cookie::time::Duration as CookieDuration;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use uuid::Uuid;

pub const FLASH_COOKIE: &str = "filedrop_flash";

const DEFAULT_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }
}

#[derive(Clone)]
pub struct FlashStore {
    inner: Arc<Mutex<HashMap<Uuid, (Flash, Instant)>>>,
    ttl: Duration,
}

impl Default for FlashStore {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl FlashStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Store a message and return the key to hand to the client.
    pub async fn put(&self, flash: Flash) -> Uuid {
        let key = Uuid::new_v4();
        let now = Instant::now();

        let mut guard = self.inner.lock().await;
        // Messages whose redirect was never followed
        guard.retain(|_, (_, expires_at)| *expires_at > now);
        guard.insert(key, (flash, now + self.ttl));

        key
    }

    /// Remove and return the message for `key`, if it has not expired.
    pub async fn take(&self, key: Uuid) -> Option<Flash> {
        let mut guard = self.inner.lock().await;
        let (flash, expires_at) = guard.remove(&key)?;
        (expires_at > Instant::now()).then_some(flash)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// Cookie handing `key` to the browser for the lifetime of the message.
pub fn flash_cookie(key: Uuid, ttl: Duration) -> Cookie<'static> {
    Cookie::build((FLASH_COOKIE, key.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(ttl.as_secs() as i64))
        .build()
}

/// Cookie passed to `CookieJar::remove` once the message has been shown.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(FLASH_COOKIE).path("/").build()
}

/// Flash key carried by the request, if present and well-formed.
pub fn key_from_jar(jar: &CookieJar) -> Option<Uuid> {
    jar.get(FLASH_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value_trimmed()).ok())
}
