//! Generation of invite tokens and display slugs.
//!
//! Tokens are the redemption secret; slugs are short non-secret identifiers
//! for sharing and display. Both are unique across all links, enforced by a
//! store probe with a bounded regenerate-on-collision loop before persisting.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::Rng;
use sea_orm::ConnectionTrait;

use crate::config::CONFIG;
use crate::error::{AppError, Result};
use crate::store::invite_links;

const SLUG_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const SLUG_RANDOM_LEN: usize = 8;
const SLUG_HINT_MAX_LEN: usize = 24;

/// Generate a redemption token: 32 random bytes (256 bits of entropy),
/// URL-safe base64 without padding.
pub fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Generate a display slug, optionally prefixed with a sanitized human hint.
pub fn generate_slug(seed_hint: Option<&str>) -> String {
    let mut rng = rand::rng();
    let random: String = (0..SLUG_RANDOM_LEN)
        .map(|_| {
            let idx = rng.random_range(0..SLUG_CHARSET.len());
            SLUG_CHARSET[idx] as char
        })
        .collect();

    match seed_hint.map(sanitize_hint).filter(|hint| !hint.is_empty()) {
        Some(hint) => format!("{}-{}", hint, random),
        None => random,
    }
}

/// Lowercase, keep alphanumerics, squash everything else into single dashes.
fn sanitize_hint(hint: &str) -> String {
    let mut out = String::with_capacity(hint.len().min(SLUG_HINT_MAX_LEN));
    let mut last_dash = true; // suppress a leading dash

    for c in hint.chars().flat_map(char::to_lowercase) {
        if out.len() >= SLUG_HINT_MAX_LEN {
            break;
        }
        if c.is_ascii_alphanumeric() {
            out.push(c);
            last_dash = false;
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }

    out.trim_matches('-').to_string()
}

/// Produce a token not yet present in the store.
///
/// The generator is injectable so collision handling is testable; production
/// callers pass [`generate_token`]. Collisions are practically impossible at
/// 256 bits, so exhausting the retry budget indicates a broken generator.
pub async fn unique_token<C, F>(conn: &C, mut generate: F) -> Result<String>
where
    C: ConnectionTrait,
    F: FnMut() -> String,
{
    for _ in 0..CONFIG.codec_retry_limit {
        let token = generate();
        if !invite_links::token_exists(conn, &token).await? {
            return Ok(token);
        }
        tracing::warn!("invite token collision, regenerating");
    }

    Err(AppError::Internal(
        "Could not generate a unique invite token".to_string(),
    ))
}

/// Produce a slug not yet present in the store, same retry contract as
/// [`unique_token`].
pub async fn unique_slug<C, F>(conn: &C, mut generate: F) -> Result<String>
where
    C: ConnectionTrait,
    F: FnMut() -> String,
{
    for _ in 0..CONFIG.codec_retry_limit {
        let slug = generate();
        if !invite_links::slug_exists(conn, &slug).await? {
            return Ok(slug);
        }
        tracing::debug!(slug = %slug, "invite slug collision, regenerating");
    }

    Err(AppError::Internal(
        "Could not generate a unique invite slug".to_string(),
    ))
}
