//! One-shot messages carried across a redirect in a signed cookie.

use axum_extra::extract::{
    cookie::{Cookie, SameSite},
    SignedCookieJar,
};
use serde::{Deserialize, Serialize};

pub const FLASH_COOKIE: &str = "_flash";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub message: String,
}

impl FlashMessage {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }
}

/// Stores `messages` for the next request, replacing any pending ones.
///
/// # Errors
/// When the messages cannot be serialized.
pub fn push(jar: SignedCookieJar, messages: &[FlashMessage]) -> crate::Result<SignedCookieJar> {
    let value = serde_json::to_string(messages)?;
    let cookie = Cookie::build((FLASH_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    Ok(jar.add(cookie))
}

/// Removes and returns the pending messages.
///
/// A cookie that fails verification or parsing yields no messages.
#[must_use]
pub fn take(jar: SignedCookieJar) -> (SignedCookieJar, Vec<FlashMessage>) {
    let Some(cookie) = jar.get(FLASH_COOKIE) else {
        return (jar, vec![]);
    };
    let messages = serde_json::from_str(cookie.value()).unwrap_or_else(|err| {
        tracing::debug!(err.msg = %err, "discarding unreadable flash cookie");
        vec![]
    });
    (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), messages)
}

#[cfg(test)]
mod tests {
    use axum_extra::extract::cookie::Key;

    use super::*;

    #[test]
    fn pushed_messages_are_taken_once() {
        let jar = SignedCookieJar::new(Key::generate());
        let jar = push(
            jar,
            &[
                FlashMessage::success("added"),
                FlashMessage::warning("already there; \"quoted\""),
            ],
        )
        .expect("pushed");

        let (jar, messages) = take(jar);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].level, FlashLevel::Warning);
        assert_eq!(messages[1].message, "already there; \"quoted\"");

        let (_, again) = take(jar);
        assert!(again.is_empty());
    }
}
