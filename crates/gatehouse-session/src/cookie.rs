//! Session cookie policy.

use std::fmt;
use std::time::Duration;

use gatehouse_config::SessionConfiguration;
use serde::Serialize;
use tracing::warn;

/// SameSite cookie attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl SameSite {
    /// Map a configured mode onto the attribute.
    ///
    /// Matching is case-sensitive. Anything other than `strict`, `none` or
    /// `lax` falls back to [`SameSite::Lax`].
    pub fn parse(mode: &str) -> Self {
        match mode {
            "strict" => SameSite::Strict,
            "none" => SameSite::None,
            "lax" => SameSite::Lax,
            _ => SameSite::Lax,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attributes of the session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookiePolicy {
    pub name: String,
    pub domain: String,
    pub same_site: SameSite,
    /// Always `true`: the cookie is only ever sent over HTTPS.
    pub secure: bool,
    pub http_only: bool,
    pub expiration: Duration,
}

impl CookiePolicy {
    /// Derive the cookie policy from configuration.
    ///
    /// Name, domain and expiration are copied as-is.
    pub fn from_config(config: &SessionConfiguration) -> Self {
        let same_site = SameSite::parse(&config.same_site);

        if !matches!(config.same_site.as_str(), "strict" | "none" | "lax") {
            warn!(
                same_site = %config.same_site,
                "Unrecognized SameSite mode, using Lax"
            );
        } else if same_site == SameSite::None {
            warn!(cookie = %config.name, "Session cookie will be sent on cross-site requests");
        }

        Self {
            name: config.name.clone(),
            domain: config.domain.clone(),
            same_site,
            secure: true,
            http_only: true,
            expiration: config.expiration(),
        }
    }

    /// Render a `Set-Cookie` header value for `value`.
    pub fn header_value(&self, value: &str) -> String {
        let mut header = format!("{}={}; Path=/", self.name, value);
        if !self.domain.is_empty() {
            header.push_str(&format!("; Domain={}", self.domain));
        }
        if !self.expiration.is_zero() {
            header.push_str(&format!("; Max-Age={}", self.expiration.as_secs()));
        }
        if self.http_only {
            header.push_str("; HttpOnly");
        }
        if self.secure {
            header.push_str("; Secure");
        }
        header.push_str(&format!("; SameSite={}", self.same_site));
        header
    }
}
