//! Session identifier generation.

use std::fmt;
use std::sync::Arc;

use rand::TryRngCore;
use rand::rngs::OsRng;
use tracing::trace;

/// Number of characters in a session identifier.
pub const SESSION_ID_LENGTH: usize = 32;

/// Characters a session identifier may contain.
///
/// Cookie-safe: no delimiters, whitespace or non-printable bytes.
pub const ALPHABET: &[u8; 62] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Identifier generator callback handed to the session framework.
pub type IdGenerator = Arc<dyn Fn() -> SessionId + Send + Sync>;

/// An opaque session identifier.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Identifiers are bearer credentials; keep them out of debug output.
impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({}…)", &self.0[..4.min(self.0.len())])
    }
}

/// Generate a new session identifier.
///
/// Draws [`SESSION_ID_LENGTH`] bytes from the operating system's secure
/// random source and maps each onto [`ALPHABET`].
///
/// # Panics
///
/// Panics if the operating system cannot supply entropy. There is no
/// weaker fallback source.
pub fn generate_session_id() -> SessionId {
    let mut bytes = [0u8; SESSION_ID_LENGTH];
    OsRng
        .try_fill_bytes(&mut bytes)
        .unwrap_or_else(|err| panic!("secure random source unavailable: {}", err));

    let id = from_random_bytes(bytes);
    trace!("Generated session identifier");
    id
}

/// The default [`IdGenerator`].
pub fn default_generator() -> IdGenerator {
    Arc::new(generate_session_id)
}

/// Map random bytes onto the alphabet.
///
/// `byte % 62` is slightly biased towards the first eight characters
/// since 62 does not divide 256.
fn from_random_bytes(mut bytes: [u8; SESSION_ID_LENGTH]) -> SessionId {
    for b in bytes.iter_mut() {
        *b = ALPHABET[*b as usize % ALPHABET.len()];
    }
    SessionId(bytes.iter().map(|&b| char::from(b)).collect())
}
