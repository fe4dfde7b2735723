//! Cluster reads the credential lookup depends on.

use std::future::Future;

use k8s_openapi::api::core::v1::{Pod, Secret};
use kube::{api::ListParams, Api, Client};

/// Fetches a secret by name.
pub trait SecretFetcher {
    fn get_secret(
        &self,
        namespace: &str,
        name: &str,
    ) -> impl Future<Output = kube::Result<Secret>> + Send;
}

/// Lists the pods of a namespace.
pub trait PodLister {
    fn list_pods(&self, namespace: &str) -> impl Future<Output = kube::Result<Vec<Pod>>> + Send;
}

impl<T> SecretFetcher for &T
where
    T: SecretFetcher + Sync,
{
    fn get_secret(
        &self,
        namespace: &str,
        name: &str,
    ) -> impl Future<Output = kube::Result<Secret>> + Send {
        (**self).get_secret(namespace, name)
    }
}

impl<T> PodLister for &T
where
    T: PodLister + Sync,
{
    fn list_pods(&self, namespace: &str) -> impl Future<Output = kube::Result<Vec<Pod>>> + Send {
        (**self).list_pods(namespace)
    }
}

impl SecretFetcher for Client {
    async fn get_secret(&self, namespace: &str, name: &str) -> kube::Result<Secret> {
        let secrets: Api<Secret> = Api::namespaced(self.clone(), namespace);
        secrets.get(name).await
    }
}

impl PodLister for Client {
    async fn list_pods(&self, namespace: &str) -> kube::Result<Vec<Pod>> {
        let pods: Api<Pod> = Api::namespaced(self.clone(), namespace);
        Ok(pods.list(&ListParams::default()).await?.items)
    }
}
