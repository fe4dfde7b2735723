#![deny(rustdoc::broken_intra_doc_links, rustdoc::bare_urls, rust_2018_idioms)]

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Error fetching secret {name}: {source}")]
    Fetch {
        name: String,
        #[source]
        source: kube::Error,
    },

    #[error("Error listing pods: {0}")]
    Discovery(#[source] kube::Error),

    #[error("OCI error: {0}")]
    OCIParseError(#[from] oci_distribution::ParseError),

    #[error("Image pull secret doesn't contain .dockerconfigjson or .dockercfg")]
    NoDockerConfigInImagePullSecret,

    #[error("Error decoding docker config: {0}")]
    DecodeDockerConfig(#[from] docker_config::Error),

    #[error("Unsupported image pull secret type: {0:?}, should be kubernetes.io/dockerconfigjson or kubernetes.io/dockercfg")]
    BadImagePullSecretType(Option<String>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Credential lookup for tracked images.
pub mod getter;

/// Input and output types of a lookup.
pub mod types;

pub mod discovery;
pub mod docker_config;
pub mod kubernetes;

#[cfg(test)]
mod fake;

pub use getter::Getter;
pub use types::{Credentials, TrackedImage};
