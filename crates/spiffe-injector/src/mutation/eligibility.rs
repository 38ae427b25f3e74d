use crate::constants::{IDENTITY_LABEL, IDENTITY_LABEL_ENABLED};
use crate::mutation::pod_view::PodSpecView;

/// A pod opts in by carrying the identity label set exactly to `"true"`.
/// Any other value is treated as an opt out.
pub(crate) fn is_eligible(pod: &PodSpecView) -> bool {
    pod.labels
        .get(IDENTITY_LABEL)
        .is_some_and(|value| value == IDENTITY_LABEL_ENABLED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use std::collections::BTreeMap;

    fn pod_with_labels(labels: &[(&str, &str)]) -> PodSpecView {
        PodSpecView {
            labels: labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
            ..Default::default()
        }
    }

    #[rstest]
    #[case::enabled(&[(IDENTITY_LABEL, "true")], true)]
    #[case::enabled_among_others(&[("app", "nginx"), (IDENTITY_LABEL, "true")], true)]
    #[case::no_labels(&[], false)]
    #[case::other_labels(&[("app", "nginx")], false)]
    #[case::disabled(&[(IDENTITY_LABEL, "false")], false)]
    #[case::capitalized(&[(IDENTITY_LABEL, "True")], false)]
    #[case::yes(&[(IDENTITY_LABEL, "yes")], false)]
    #[case::empty(&[(IDENTITY_LABEL, "")], false)]
    #[case::padded(&[(IDENTITY_LABEL, " true")], false)]
    #[case::similar_key(&[("spiffe.io/spire-managed", "true")], false)]
    fn eligibility(#[case] labels: &[(&str, &str)], #[case] expected: bool) {
        assert_eq!(expected, is_eligible(&pod_with_labels(labels)));
    }
}
