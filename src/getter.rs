use std::collections::HashSet;

use k8s_openapi::api::core::v1::Secret;
#[allow(unused_imports)]
use tracing::{debug, error, info, warn};

use crate::{
    discovery,
    docker_config::DockerConfig,
    kubernetes::{PodLister, SecretFetcher},
    types::{Credentials, TrackedImage},
    Error, Result,
};

const DOCKERCFG_TYPE: &str = "kubernetes.io/dockercfg";
const DOCKERCONFIGJSON_TYPE: &str = "kubernetes.io/dockerconfigjson";

const DOCKERCONFIGJSON_KEY: &str = ".dockerconfigjson";
const DOCKERCFG_KEY: &str = ".dockercfg";

/// Where candidate secret names come from, in the order they are tried.
#[derive(Debug, Clone, Copy)]
enum Source {
    /// Secrets declared on the tracked image.
    Declared,
    /// Pull secrets of pods already running the image.
    Pods,
}

const SOURCES: [Source; 2] = [Source::Declared, Source::Pods];

/// Resolves registry credentials for tracked images.
///
/// Every lookup goes to the cluster; nothing is cached between calls.
pub struct Getter<K> {
    kube: K,
}

impl<K> Getter<K>
where
    K: SecretFetcher + PodLister,
{
    pub fn new(kube: K) -> Self {
        Self { kube }
    }

    /// Returns the first usable credentials found for `tracked`.
    ///
    /// Declared secrets are tried first, in order. Pull secrets of pods running the
    /// same image are only discovered when none of them yields credentials.
    /// Missing secrets, undecodable payloads and pod listing failures are logged and
    /// skipped; when nothing is found the result is anonymous [`Credentials`].
    pub async fn get(&self, tracked: &TrackedImage) -> Result<Credentials> {
        let namespace = tracked.namespace.as_str();
        let mut tried = HashSet::new();

        for source in SOURCES {
            let names = match self.candidates(source, tracked).await {
                Ok(names) => names,
                Err(error) => {
                    warn!(namespace, ?source, %error, "cannot collect candidate secrets");
                    continue;
                }
            };

            for name in names {
                if !tried.insert(name.clone()) {
                    continue;
                }
                match self.lookup(tracked, &name).await {
                    Ok(credentials) if !credentials.is_anonymous() => {
                        info!(
                            namespace,
                            secret = %name,
                            image = %tracked.image,
                            username = %credentials.username,
                            "found registry credentials"
                        );
                        return Ok(credentials);
                    }
                    Ok(_) => debug!(namespace, secret = %name, "secret holds empty credentials"),
                    Err(error) => warn!(namespace, secret = %name, %error, "skipping secret"),
                }
            }
        }

        debug!(namespace, image = %tracked.image, "no credentials found, using anonymous access");
        Ok(Credentials::default())
    }

    async fn candidates(&self, source: Source, tracked: &TrackedImage) -> Result<Vec<String>> {
        match source {
            Source::Declared => Ok(tracked.secrets.clone()),
            Source::Pods => {
                discovery::discover(&self.kube, &tracked.namespace, &tracked.image).await
            }
        }
    }

    async fn lookup(&self, tracked: &TrackedImage, name: &str) -> Result<Credentials> {
        debug!(namespace = %tracked.namespace, secret = name, "fetching secret");
        let secret = self
            .kube
            .get_secret(&tracked.namespace, name)
            .await
            .map_err(|source| Error::Fetch {
                name: name.to_string(),
                source,
            })?;
        credentials_from_secret(&secret, tracked.image.registry())
    }
}

/// Extracts the credentials for `registry` from an image pull secret.
pub fn credentials_from_secret(secret: &Secret, registry: &str) -> Result<Credentials> {
    match secret.type_.as_deref() {
        Some(DOCKERCFG_TYPE | DOCKERCONFIGJSON_TYPE) => {}
        _ => return Err(Error::BadImagePullSecretType(secret.type_.clone())),
    }

    let docker_config = secret
        .data
        .as_ref()
        .and_then(|data| {
            data.get(DOCKERCONFIGJSON_KEY)
                .or_else(|| data.get(DOCKERCFG_KEY))
        })
        .ok_or(Error::NoDockerConfigInImagePullSecret)?;

    let docker_config = DockerConfig::from_slice(&docker_config.0)?;
    Ok(docker_config.credentials(registry)?)
}
