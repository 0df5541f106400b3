//! Core data models for the configmap syncer

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Plain string key/value payload of a ConfigMap data field
pub type ConfigData = BTreeMap<String, String>;

/// Name/namespace pair identifying a ConfigMap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    pub name: String,
    pub namespace: String,
}

impl ObjectRef {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Immutable replication parameters: one source, an ordered target list.
///
/// Built once at startup and passed explicitly into the control loop and
/// the sync engine. The target list is fixed for the process lifetime;
/// duplicates are harmless and kept as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicationConfig {
    pub source: ObjectRef,
    pub targets: Vec<ObjectRef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_ref_display() {
        let target = ObjectRef::new("config-1", "dev");
        assert_eq!(target.to_string(), "dev/config-1");
    }

    #[test]
    fn test_object_ref_deserialize() {
        let target: ObjectRef =
            serde_json::from_str(r#"{"name":"config-2","namespace":"stage"}"#).unwrap();
        assert_eq!(target, ObjectRef::new("config-2", "stage"));
    }
}
