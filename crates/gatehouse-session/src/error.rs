//! Error types for session payload serialization and TLS trust anchors.

/// Error type for encoding and decoding session payloads.
#[derive(Debug, thiserror::Error)]
pub enum SerializerError {
    /// Payload could not be turned into bytes.
    #[error("failed to serialize session payload: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Decrypted bytes are not a valid payload.
    #[error("failed to deserialize session payload: {0}")]
    Deserialize(#[source] serde_json::Error),

    /// The cipher refused to encrypt the payload.
    #[error("failed to encrypt session payload")]
    Encrypt,

    /// Authentication failed: wrong secret or tampered data.
    #[error("failed to decrypt session payload")]
    Decrypt,

    /// Stored value is shorter than the nonce that must prefix it.
    #[error("session payload truncated: {len} bytes")]
    Truncated { len: usize },
}

/// Result type for session payload serialization.
pub type Result<T> = std::result::Result<T, SerializerError>;

/// Error type for loading trust anchors into a [`CertificatePool`].
///
/// [`CertificatePool`]: crate::tls::CertificatePool
#[derive(Debug, thiserror::Error)]
pub enum CertificateError {
    /// A PEM block could not be read.
    #[error("failed to read PEM certificate: {0}")]
    Pem(#[source] std::io::Error),

    /// Input contained no certificates.
    #[error("no certificates found")]
    Empty,

    /// Bytes are not a usable X.509 trust anchor.
    #[error("invalid certificate: {0}")]
    Invalid(#[source] rustls::Error),
}
