//! In-memory cluster for tests.

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

use base64::{engine::general_purpose, Engine as _};
use k8s_openapi::{
    api::core::v1::{Container, LocalObjectReference, Pod, PodSpec, Secret},
    ByteString,
};
use kube::{core::ObjectMeta, error::ErrorResponse};

use crate::kubernetes::{PodLister, SecretFetcher};

pub const LEGACY_PAYLOAD: &str = r#"{"https://index.docker.io/v1/":{"username":"user-x","password":"pass-x","email":"karolis.rusenas@gmail.com","auth":"somethinghere"}}"#;

pub fn encode(data: &str) -> String {
    general_purpose::STANDARD.encode(data)
}

pub fn auth_payload(user_pass: &str) -> String {
    format!(
        r#"{{"https://index.docker.io/v1/":{{"auth": "{}"}}}}"#,
        encode(user_pass)
    )
}

pub fn secret(type_: &str, key: &str, payload: &str) -> Secret {
    Secret {
        type_: Some(type_.to_string()),
        data: Some(BTreeMap::from([(
            key.to_string(),
            ByteString(payload.as_bytes().to_vec()),
        )])),
        ..Default::default()
    }
}

pub fn dockercfg_secret(payload: &str) -> Secret {
    secret("kubernetes.io/dockercfg", ".dockerconfigjson", payload)
}

pub fn pod(image: &str, pull_secrets: &[&str]) -> Pod {
    Pod {
        metadata: ObjectMeta::default(),
        spec: Some(PodSpec {
            containers: vec![Container {
                name: "main".to_string(),
                image: Some(image.to_string()),
                ..Default::default()
            }],
            image_pull_secrets: Some(
                pull_secrets
                    .iter()
                    .map(|name| LocalObjectReference {
                        name: Some(name.to_string()),
                    })
                    .collect(),
            ),
            ..Default::default()
        }),
        status: None,
    }
}

fn not_found(what: &str) -> kube::Error {
    kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message: format!("{what} not found"),
        reason: "NotFound".to_string(),
        code: 404,
    })
}

/// Secrets keyed by name and a pod list; the namespace is ignored.
///
/// Every secret fetch and pod listing is recorded.
#[derive(Default)]
pub struct FakeCluster {
    secrets: BTreeMap<String, Secret>,
    pods: Vec<Pod>,
    pod_list_error: bool,
    fetched: Mutex<Vec<String>>,
    pod_lists: AtomicUsize,
}

impl FakeCluster {
    pub fn with_secret(mut self, name: &str, secret: Secret) -> Self {
        self.secrets.insert(name.to_string(), secret);
        self
    }

    pub fn with_pod(mut self, pod: Pod) -> Self {
        self.pods.push(pod);
        self
    }

    pub fn with_pod_list_error(mut self) -> Self {
        self.pod_list_error = true;
        self
    }

    /// Secret names requested so far, in call order.
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    pub fn pod_lists(&self) -> usize {
        self.pod_lists.load(Ordering::SeqCst)
    }
}

impl SecretFetcher for FakeCluster {
    async fn get_secret(&self, _namespace: &str, name: &str) -> kube::Result<Secret> {
        self.fetched.lock().unwrap().push(name.to_string());
        self.secrets
            .get(name)
            .cloned()
            .ok_or_else(|| not_found(&format!("secrets \"{name}\"")))
    }
}

impl PodLister for FakeCluster {
    async fn list_pods(&self, _namespace: &str) -> kube::Result<Vec<Pod>> {
        self.pod_lists.fetch_add(1, Ordering::SeqCst);
        if self.pod_list_error {
            return Err(not_found("namespace"));
        }
        Ok(self.pods.clone())
    }
}
