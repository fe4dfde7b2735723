use base64::{engine::general_purpose, Engine as _};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::value::RawValue;

use crate::types::Credentials;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Error deserializing JSON: {0}")]
    Deserializing(#[from] serde_json::Error),

    #[error("Error decoding base64 field inside docker config auth section: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    #[error("Error decoding content of base64 field inside docker config auth section: {0}")]
    FromUtf8(#[from] std::string::FromUtf8Error),

    #[error("Empty auth field")]
    EmptyToken,

    #[error("Docker config has no registry entries")]
    NoRegistryEntries,

    #[error("Registry entry {0} has neither username/password nor auth")]
    NoUsableCredentials(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Registry credentials as stored in a kubernetes.io/dockercfg or
/// kubernetes.io/dockerconfigjson secret.
///
/// Both the legacy layout (registry hosts at the top level) and the
/// config.json layout (registry hosts under `auths`) are accepted.
/// Registries keep the order in which they appear in the document.
#[derive(Clone)]
pub struct DockerConfig {
    auths: IndexMap<String, AuthEntry>,
}

#[derive(Clone, Deserialize)]
struct AuthEntry {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    auth: Option<String>,
}

/// Decodes a dockercfg payload and returns the credentials of its first registry.
pub fn decode(payload: &[u8]) -> Result<Credentials> {
    let config = DockerConfig::from_slice(payload)?;
    let (registry, entry) = config.auths.first().ok_or(Error::NoRegistryEntries)?;
    entry.unpack(registry)
}

/// Decodes a base64 `username:password` token.
///
/// The value is split on the first colon. A token without a colon decodes to
/// a username with an empty password.
pub fn decode_base64_secret(token: &str) -> Result<(String, String)> {
    if token.is_empty() {
        return Err(Error::EmptyToken);
    }
    let decoded = String::from_utf8(general_purpose::STANDARD.decode(token)?)?;
    Ok(match decoded.split_once(':') {
        Some((username, password)) => (username.to_string(), password.to_string()),
        None => (decoded, String::new()),
    })
}

impl DockerConfig {
    /// Parse a DockerConfig from a string.
    pub fn from_str(str: &str) -> Result<Self> {
        Self::from_slice(str.as_bytes())
    }

    /// Parse a DockerConfig from slice of bytes.
    pub fn from_slice(data: &[u8]) -> Result<Self> {
        let document: IndexMap<String, Box<RawValue>> = serde_json::from_slice(data)?;
        let auths = match document.get("auths") {
            Some(auths) => serde_json::from_str(auths.get())?,
            None => serde_json::from_slice(data)?,
        };
        Ok(Self { auths })
    }

    /// Returns the [`Credentials`] to use for `registry`.
    ///
    /// The entry whose key names the same host as `registry` wins; keys may carry a
    /// scheme and path (`https://index.docker.io/v1/`). Without a matching key the
    /// first entry of the document is used.
    pub fn credentials(&self, registry: &str) -> Result<Credentials> {
        let wanted = normalize_host(registry);
        let (key, entry) = self
            .auths
            .iter()
            .find(|(key, _)| normalize_host(key) == wanted)
            .or_else(|| self.auths.first())
            .ok_or(Error::NoRegistryEntries)?;
        entry.unpack(key)
    }
}

impl AuthEntry {
    fn unpack(&self, registry: &str) -> Result<Credentials> {
        match (&self.username, &self.password, &self.auth) {
            (Some(username), Some(password), _) if !username.is_empty() && !password.is_empty() => {
                Ok(Credentials::new(username, password))
            }
            (_, _, Some(auth)) => {
                let (username, password) = decode_base64_secret(auth)?;
                Ok(Credentials { username, password })
            }
            _ => Err(Error::NoUsableCredentials(registry.to_string())),
        }
    }
}

fn normalize_host(key: &str) -> &str {
    let host = key
        .strip_prefix("https://")
        .or_else(|| key.strip_prefix("http://"))
        .unwrap_or(key);
    let host = host.split('/').next().unwrap_or(host);
    match host {
        "index.docker.io" | "registry-1.docker.io" => "docker.io",
        _ => host,
    }
}

impl std::fmt::Debug for DockerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DockerConfig")
            .field("auths", &"<redacted>")
            .finish()
    }
}
