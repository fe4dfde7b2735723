use oci_distribution::{secrets::RegistryAuth, Reference};

use crate::Result;

/// An image some workload in `namespace` runs, together with the pull secrets
/// declared for it.
#[derive(Clone, Debug)]
pub struct TrackedImage {
    pub image: Reference,
    pub namespace: String,
    pub secrets: Vec<String>,
}

impl TrackedImage {
    pub fn parse(image: &str, namespace: &str, secrets: Vec<String>) -> Result<Self> {
        Ok(Self {
            image: image.parse()?,
            namespace: namespace.to_string(),
            secrets,
        })
    }
}

/// Registry credentials. Both fields empty means anonymous access.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.username.is_empty() && self.password.is_empty()
    }
}

impl From<Credentials> for RegistryAuth {
    fn from(credentials: Credentials) -> Self {
        if credentials.is_anonymous() {
            RegistryAuth::Anonymous
        } else {
            RegistryAuth::Basic(credentials.username, credentials.password)
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
