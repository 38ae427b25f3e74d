use crate::mutation::{
    artifacts::{init_container, required_volumes, sidecar_container},
    patch::{Collection, PatchOperation, PatchValue},
    pod_view::PodSpecView,
};

/// Computes the JSON-Patch operations that bring the pod to the desired
/// state. Items are matched by name only: anything already present is left
/// untouched, so planning against an already mutated pod yields no
/// operations.
///
/// Operations are ordered: volumes first, then the init container and
/// finally the sidecar.
pub(crate) fn plan(pod: &PodSpecView) -> Vec<PatchOperation> {
    let mut operations = plan_collection(
        Collection::Volumes,
        pod.volumes.as_deref(),
        required_volumes().into_iter().map(PatchValue::Volume),
    );
    operations.extend(plan_collection(
        Collection::InitContainers,
        pod.init_containers.as_deref(),
        [PatchValue::InitContainer(init_container())],
    ));
    // spec.containers is mandatory, it never has to be created
    operations.extend(plan_collection(
        Collection::Containers,
        Some(pod.containers.as_slice()),
        [PatchValue::Sidecar(sidecar_container())],
    ));

    operations
}

fn plan_collection(
    collection: Collection,
    existing: Option<&[String]>,
    required: impl IntoIterator<Item = PatchValue>,
) -> Vec<PatchOperation> {
    let present = existing.unwrap_or_default();
    let missing: Vec<PatchValue> = required
        .into_iter()
        .filter(|value| !present.iter().any(|name| name == value.name()))
        .collect();

    if missing.is_empty() {
        return vec![];
    }

    let mut operations = Vec::with_capacity(missing.len() + 1);
    // appending to `/-` requires the parent array to exist
    if existing.is_none() {
        operations.push(PatchOperation::AddCollection { collection });
    }
    operations.extend(
        missing
            .into_iter()
            .map(|value| PatchOperation::AppendItem { collection, value }),
    );
    operations
}
