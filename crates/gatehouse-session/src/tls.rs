//! TLS context for the Redis connection.
//!
//! This is a description handed to the Redis client, which owns the
//! handshake. Trust anchors are parsed on the way in so an unusable
//! certificate is rejected here rather than at connect time.

use std::sync::Arc;

use gatehouse_config::{TlsConfig, TlsVersion};
use rustls::RootCertStore;
use rustls::pki_types::CertificateDer;
use tracing::{debug, warn};

use crate::error::CertificateError;

/// Lowest TLS version the Redis connection may negotiate.
pub const TLS_MINIMUM_VERSION_FLOOR: TlsVersion = TlsVersion::Tls12;

const PEM_MARKER: &[u8] = b"-----BEGIN";

/// Trust anchors used to verify the Redis server.
///
/// Every certificate has been parsed as an X.509 trust anchor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertificatePool {
    certificates: Vec<CertificateDer<'static>>,
}

impl CertificatePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single DER-encoded certificate.
    pub fn add_der(&mut self, der: impl Into<Vec<u8>>) -> Result<(), CertificateError> {
        let certificate = CertificateDer::from(der.into());
        check_anchors(std::slice::from_ref(&certificate))?;
        self.certificates.push(certificate);
        Ok(())
    }

    /// Add every certificate in a PEM bundle, returning how many were added.
    ///
    /// Nothing is added unless the whole bundle parses.
    pub fn add_pem(&mut self, mut pem: &[u8]) -> Result<usize, CertificateError> {
        let certificates = rustls_pemfile::certs(&mut pem)
            .collect::<Result<Vec<_>, _>>()
            .map_err(CertificateError::Pem)?;
        if certificates.is_empty() {
            return Err(CertificateError::Empty);
        }

        check_anchors(&certificates)?;
        let count = certificates.len();
        self.certificates.extend(certificates);
        Ok(count)
    }

    /// Add the contents of a certificate file: PEM when it carries a
    /// `-----BEGIN` marker, DER otherwise.
    pub fn add_encoded(&mut self, bytes: &[u8]) -> Result<usize, CertificateError> {
        if bytes.trim_ascii_start().starts_with(PEM_MARKER) {
            self.add_pem(bytes)
        } else {
            self.add_der(bytes)?;
            Ok(1)
        }
    }

    /// A rustls root store holding the pool's certificates.
    pub fn root_store(&self) -> RootCertStore {
        let mut store = RootCertStore::empty();
        let (added, ignored) = store.add_parsable_certificates(self.certificates.iter().cloned());
        debug!(added, ignored, "Built root certificate store");
        store
    }

    pub fn iter(&self) -> impl Iterator<Item = &CertificateDer<'static>> {
        self.certificates.iter()
    }

    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }
}

fn check_anchors(certificates: &[CertificateDer<'static>]) -> Result<(), CertificateError> {
    let mut store = RootCertStore::empty();
    for certificate in certificates {
        store
            .add(certificate.clone())
            .map_err(CertificateError::Invalid)?;
    }
    Ok(())
}

/// TLS settings for a Redis connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsContext {
    /// Name to verify; `None` means the connection host.
    pub server_name: Option<String>,
    pub skip_verify: bool,
    pub minimum_version: TlsVersion,
    /// Trust anchors; `None` means the system roots.
    pub root_certificates: Option<Arc<CertificatePool>>,
}

impl TlsContext {
    /// Build a context from configuration.
    ///
    /// A configured minimum below `floor` is raised to `floor`.
    pub fn new(
        config: &TlsConfig,
        floor: TlsVersion,
        root_certificates: Option<Arc<CertificatePool>>,
    ) -> Self {
        let minimum_version = match config.minimum_version {
            Some(version) if version < floor => {
                warn!(
                    configured = %version,
                    floor = %floor,
                    "TLS minimum version below floor, raising"
                );
                floor
            }
            Some(version) => version,
            None => floor,
        };

        if config.skip_verify {
            warn!("TLS certificate verification disabled for Redis connection");
        }

        let server_name = if config.server_name.is_empty() {
            None
        } else {
            Some(config.server_name.clone())
        };

        Self {
            server_name,
            skip_verify: config.skip_verify,
            minimum_version,
            root_certificates,
        }
    }
}
