//! Patch capability against the object store

use crate::models::{ConfigData, ObjectRef};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::api::{Patch, PatchParams};
use kube::{Api, Client};

/// Result of one patch attempt against a single target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    /// Target updated
    Success,
    /// Target ConfigMap does not exist; expected and recoverable
    NotFound,
    /// Any other failure from the patch request
    RequestFailed(String),
}

/// Replaces the whole data field of one named ConfigMap, leaving every
/// other field on the object untouched.
#[async_trait]
pub trait ConfigMapPatcher: Send + Sync {
    async fn replace_data(&self, target: &ObjectRef, data: &ConfigData) -> PatchOutcome;
}

/// Kubernetes-backed patcher
#[derive(Clone)]
pub struct KubePatcher {
    client: Client,
}

impl KubePatcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ConfigMapPatcher for KubePatcher {
    async fn replace_data(&self, target: &ObjectRef, data: &ConfigData) -> PatchOutcome {
        let api: Api<ConfigMap> = Api::namespaced(self.client.clone(), &target.namespace);

        // A JSON Patch `add` on /data replaces the whole field; a merge
        // patch would keep target keys missing from the snapshot.
        let ops = serde_json::json!([
            { "op": "add", "path": "/data", "value": data }
        ]);
        let patch: json_patch::Patch = match serde_json::from_value(ops) {
            Ok(patch) => patch,
            Err(e) => return PatchOutcome::RequestFailed(e.to_string()),
        };

        match api
            .patch(&target.name, &PatchParams::default(), &Patch::Json::<()>(patch))
            .await
        {
            Ok(_) => PatchOutcome::Success,
            Err(kube::Error::Api(resp)) if resp.code == 404 => PatchOutcome::NotFound,
            Err(e) => PatchOutcome::RequestFailed(e.to_string()),
        }
    }
}
