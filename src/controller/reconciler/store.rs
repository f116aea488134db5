//! # Store
//!
//! Read and write access to CertChecks and the secrets they select.

use crate::crd::{CertCheck, CertCheckStatus};
use anyhow::Result;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::api::{Api, ListParams, Patch, PatchParams};
use kube::core::Selector;
use kube::Client;
use serde_json::json;
use std::collections::BTreeMap;

/// Cluster state seen by the reconciliation engine
#[async_trait]
pub trait CertCheckStore: Send + Sync {
    /// `Ok(None)` when the CertCheck does not exist
    async fn get_cert_check(&self, namespace: &str, name: &str) -> Result<Option<CertCheck>>;

    /// Secrets in `namespace` matching `selector`, in listing order
    async fn list_secrets(&self, namespace: &str, selector: &Selector) -> Result<Vec<Secret>>;

    /// Merge `annotations` into the secret's metadata
    async fn annotate_secret(
        &self,
        namespace: &str,
        name: &str,
        annotations: &BTreeMap<String, String>,
    ) -> Result<()>;

    /// Overwrite the CertCheck status in a single write
    async fn replace_status(
        &self,
        namespace: &str,
        name: &str,
        status: &CertCheckStatus,
    ) -> Result<()>;
}

/// [`CertCheckStore`] on top of the Kubernetes API
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl std::fmt::Debug for KubeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeStore").finish_non_exhaustive()
    }
}

impl KubeStore {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CertCheckStore for KubeStore {
    async fn get_cert_check(&self, namespace: &str, name: &str) -> Result<Option<CertCheck>> {
        let api: Api<CertCheck> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.get_opt(name).await?)
    }

    async fn list_secrets(&self, namespace: &str, selector: &Selector) -> Result<Vec<Secret>> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        let mut params = ListParams::default();
        let rendered = selector.to_string();
        if !rendered.is_empty() {
            params = params.labels(&rendered);
        }
        Ok(api.list(&params).await?.items)
    }

    async fn annotate_secret(
        &self,
        namespace: &str,
        name: &str,
        annotations: &BTreeMap<String, String>,
    ) -> Result<()> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        let patch = json!({
            "metadata": {
                "annotations": annotations
            }
        });
        api.patch(name, &PatchParams::default(), &Patch::Merge(patch))
            .await?;
        Ok(())
    }

    async fn replace_status(
        &self,
        namespace: &str,
        name: &str,
        status: &CertCheckStatus,
    ) -> Result<()> {
        let api: Api<CertCheck> = Api::namespaced(self.client.clone(), namespace);
        let patch = json!({ "status": status });
        api.patch_status(name, &PatchParams::default(), &Patch::Merge(patch))
            .await?;
        Ok(())
    }
}
