use k8s_openapi::api::core::v1::Pod;
use oci_distribution::Reference;
use tracing::debug;

use crate::{kubernetes::PodLister, Error, Result};

/// Returns the image pull secret names of every pod in `namespace` that runs `image`.
///
/// Names are returned in pod order, then in the order each pod lists them.
/// Duplicates are kept.
pub async fn discover<K>(kube: &K, namespace: &str, image: &Reference) -> Result<Vec<String>>
where
    K: PodLister,
{
    let pods = kube.list_pods(namespace).await.map_err(Error::Discovery)?;

    let names: Vec<String> = pods
        .iter()
        .filter(|pod| runs_image(pod, image))
        .filter_map(|pod| pod.spec.as_ref()?.image_pull_secrets.as_ref())
        .flatten()
        .filter_map(|secret| secret.name.clone())
        .collect();

    debug!(namespace, image = %image, ?names, "discovered pull secrets");
    Ok(names)
}

fn runs_image(pod: &Pod, image: &Reference) -> bool {
    let Some(spec) = &pod.spec else {
        return false;
    };
    let wanted = image.whole();
    spec.containers
        .iter()
        .chain(spec.init_containers.iter().flatten())
        .filter_map(|container| container.image.as_deref())
        .filter_map(|image| image.parse::<Reference>().ok())
        .any(|candidate| candidate.whole() == wanted)
}
