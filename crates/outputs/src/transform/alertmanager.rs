//! Alertmanager 레이블/어노테이션 형식

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sidekick_core::FalcoEvent;

use crate::kind::OutputKind;
use crate::output::OutputSettings;
use crate::payload::Payload;
use crate::transform::Transformer;

/// Alertmanager `/api/v1/alerts`에 보내는 알림 한 건
///
/// 레이블 이름에는 `.`이 올 수 없으므로 필드 키의 `.`은 `_`로 바뀝니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertmanagerAlert {
    /// 필드 레이블과 `source`, `rule`
    pub labels: BTreeMap<String, String>,
    /// `info`(출력 메시지)와 `summary`(룰 이름)
    pub annotations: BTreeMap<String, String>,
}

/// Alertmanager 변환기
#[derive(Debug, Clone, Copy, Default)]
pub struct AlertmanagerTransformer;

impl Transformer for AlertmanagerTransformer {
    fn kind(&self) -> OutputKind {
        OutputKind::Alertmanager
    }

    fn transform(&self, event: &FalcoEvent, _settings: &OutputSettings) -> Payload {
        Payload::Alertmanager(vec![new_alert(event)])
    }
}

/// 이벤트에서 알림 한 건을 만듭니다.
pub fn new_alert(event: &FalcoEvent) -> AlertmanagerAlert {
    let mut labels = BTreeMap::new();
    event.output_field_strings(|key, value| {
        labels.insert(key.replace('.', "_"), value.to_owned());
    });
    // 고정 레이블이 같은 이름의 필드보다 우선
    labels.insert("source".to_owned(), "falco".to_owned());
    labels.insert("rule".to_owned(), event.rule.clone());

    let annotations = BTreeMap::from([
        ("info".to_owned(), event.output.clone()),
        ("summary".to_owned(), event.rule.clone()),
    ]);

    AlertmanagerAlert {
        labels,
        annotations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use sidekick_core::Priority;

    fn sample_event() -> FalcoEvent {
        FalcoEvent::new(
            "This is a test from falcosidekick",
            Priority::Debug,
            "Test rule",
            Utc.with_ymd_and_hms(2001, 1, 1, 1, 10, 0).unwrap(),
        )
        .with_field("proc.name", "falcosidekick")
        .with_field("proc.tty", 1234_i64)
    }

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn labels_and_annotations_match_event() {
        let alert = new_alert(&sample_event());
        assert_eq!(
            alert.labels,
            map(&[
                ("source", "falco"),
                ("rule", "Test rule"),
                ("proc_name", "falcosidekick"),
                ("proc_tty", "1234"),
            ])
        );
        assert_eq!(
            alert.annotations,
            map(&[
                ("info", "This is a test from falcosidekick"),
                ("summary", "Test rule"),
            ])
        );
    }

    #[test]
    fn payload_is_single_element_array() {
        let payload =
            AlertmanagerTransformer.transform(&sample_event(), &OutputSettings::default());
        let body = payload.encode().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let alerts = value.as_array().unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0]["labels"]["proc_tty"], "1234");
        assert_eq!(alerts[0]["annotations"]["summary"], "Test rule");
    }

    #[test]
    fn event_without_fields_has_only_fixed_labels() {
        let event = FalcoEvent::new("m", Priority::Error, "r", Utc::now());
        let alert = new_alert(&event);
        assert_eq!(alert.labels, map(&[("source", "falco"), ("rule", "r")]));
    }

    #[test]
    fn every_dot_in_key_is_replaced() {
        let event = FalcoEvent::new("m", Priority::Error, "r", Utc::now())
            .with_field("k8s.pod.name", "web-1");
        let alert = new_alert(&event);
        assert_eq!(alert.labels.get("k8s_pod_name").map(String::as_str), Some("web-1"));
        assert!(alert.labels.keys().all(|k| !k.contains('.')));
    }

    #[test]
    fn fixed_labels_override_same_named_fields() {
        let event = FalcoEvent::new("m", Priority::Error, "real rule", Utc::now())
            .with_field("rule", "field rule")
            .with_field("source", "elsewhere");
        let alert = new_alert(&event);
        assert_eq!(alert.labels["rule"], "real rule");
        assert_eq!(alert.labels["source"], "falco");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn field_key_dots_become_underscores(key in "[a-z._]{1,20}", value in "[ -~]{0,20}") {
                let label = key.replace('.', "_");
                prop_assume!(label != "source" && label != "rule");

                let event = FalcoEvent::new("m", Priority::Error, "r", Utc::now())
                    .with_field(key.as_str(), value.as_str());
                let alert = new_alert(&event);

                prop_assert_eq!(alert.labels.get(&label), Some(&value));
                prop_assert_eq!(alert.labels.len(), 3);
            }

            #[test]
            fn labels_never_contain_dots(
                fields in prop::collection::btree_map("[a-z._]{1,12}", "[ -~]{0,12}", 0..8)
            ) {
                let event = fields.iter().fold(
                    FalcoEvent::new("m", Priority::Error, "r", Utc::now()),
                    |event, (k, v)| event.with_field(k.as_str(), v.as_str()),
                );
                let alert = new_alert(&event);

                prop_assert!(alert.labels.keys().all(|k| !k.contains('.')));
                prop_assert_eq!(alert.labels.get("source").map(String::as_str), Some("falco"));
                prop_assert_eq!(alert.labels.get("rule").map(String::as_str), Some("r"));
            }
        }
    }
}
