use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::mutation::artifacts::{ContainerSpec, VolumeSpec};

/// Pod spec arrays the injector writes to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Collection {
    Volumes,
    InitContainers,
    Containers,
}

impl Collection {
    pub fn path(&self) -> &'static str {
        match self {
            Collection::Volumes => "/spec/volumes",
            Collection::InitContainers => "/spec/initContainers",
            Collection::Containers => "/spec/containers",
        }
    }

    /// JSON Pointer addressing the end of the array
    pub fn append_path(&self) -> String {
        format!("{}/-", self.path())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PatchValue {
    Volume(VolumeSpec),
    InitContainer(ContainerSpec),
    Sidecar(ContainerSpec),
}

impl PatchValue {
    pub fn name(&self) -> &str {
        match self {
            PatchValue::Volume(v) => v.name,
            PatchValue::InitContainer(c) | PatchValue::Sidecar(c) => c.name,
        }
    }
}

/// A single RFC 6902 "add" operation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatchOperation {
    /// Creates the array when the pod spec does not declare it
    AddCollection { collection: Collection },
    /// Appends one item at the end of the array
    AppendItem {
        collection: Collection,
        value: PatchValue,
    },
}

impl Serialize for PatchOperation {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("op", "add")?;
        match self {
            PatchOperation::AddCollection { collection } => {
                map.serialize_entry("path", collection.path())?;
                map.serialize_entry("value", &[] as &[PatchValue])?;
            }
            PatchOperation::AppendItem { collection, value } => {
                map.serialize_entry("path", &collection.append_path())?;
                map.serialize_entry("value", value)?;
            }
        }
        map.end()
    }
}
