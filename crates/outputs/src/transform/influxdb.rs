//! InfluxDB line protocol 형식
//!
//! `events,rule=<rule>,priority=<priority>[,<key>=<value>...] value="<output>"`
//!
//! 태그 값의 공백은 `_`로 바뀌고 키는 그대로 사용됩니다.
//! 출력 메시지는 따옴표 안에 그대로 들어갑니다. 메시지에 `"`가 있으면
//! 유효하지 않은 line protocol이 되지만 기존 수신 측과의 호환을 위해 유지합니다.

use std::fmt::Write as _;

use sidekick_core::FalcoEvent;

use crate::kind::OutputKind;
use crate::output::OutputSettings;
use crate::payload::Payload;
use crate::transform::Transformer;

/// 측정(measurement) 이름
pub const MEASUREMENT: &str = "events";

/// InfluxDB 변환기
#[derive(Debug, Clone, Copy, Default)]
pub struct InfluxdbTransformer;

impl Transformer for InfluxdbTransformer {
    fn kind(&self) -> OutputKind {
        OutputKind::Influxdb
    }

    fn transform(&self, event: &FalcoEvent, _settings: &OutputSettings) -> Payload {
        Payload::Influxdb(new_line(event))
    }
}

/// 이벤트를 line protocol 한 줄로 만듭니다.
pub fn new_line(event: &FalcoEvent) -> String {
    let mut line = format!(
        "{MEASUREMENT},rule={},priority={}",
        underscore_spaces(&event.rule),
        underscore_spaces(event.priority.as_str()),
    );
    event.output_field_strings(|key, value| {
        let _ = write!(line, ",{key}={}", underscore_spaces(value));
    });
    let _ = write!(line, " value=\"{}\"", event.output);
    line
}

fn underscore_spaces(s: &str) -> String {
    s.replace(' ', "_")
}
