//! Wire codes and command decoding.
//!
//! Commands arrive as a JSON array of objects, each with a numeric `kind`.
//! The leading hex group names the category: `0x1xxxx` form, `0x2xxxx`
//! control, `0x3xxxx` command-bar buttons.

use crate::error::{ProtocolError, ProtocolResult};
use dataform_forms::{FormDef, Row};
use serde::Deserialize;
use serde_json::Value;

/// Inbound command codes.
pub mod command {
    pub const HOLD: u32 = 0;
    pub const CLOSE: u32 = 1;
    pub const FORM_DRAW: u32 = 0x10000;
    pub const FORM_VALUES: u32 = 0x10001;
    pub const CONTROL_VISIBLE: u32 = 0x20000;
    pub const CONTROL_ENABLED: u32 = 0x20001;
    pub const CONTROL_ERROR: u32 = 0x20002;
    pub const CB_OPTIONS: u32 = 0x20100;
    pub const LV_DELETE: u32 = 0x20200;
    pub const LV_CLEAR: u32 = 0x20201;
    pub const LV_INSERT: u32 = 0x20202;
    pub const LV_GET_SELECTED: u32 = 0x20203;
    pub const LV_SET_SELECTED: u32 = 0x20204;
    pub const LV_BUTTON_ENABLED: u32 = 0x20205;
    pub const TIMER_START: u32 = 0x20300;
    pub const TIMER_STOP: u32 = 0x20301;
    pub const PROGRESS_SET_STATUS: u32 = 0x20400;
    pub const PROGRESS_SET_PERCENT: u32 = 0x20401;
    pub const BUTTON_ENABLED: u32 = 0x30000;
}

/// Outbound event codes.
pub mod event {
    pub const HOLD: u32 = 0;
    pub const FORM_SHOW: u32 = 0x10000;
    pub const FORM_VALUES: u32 = 0x10001;
    pub const BUTTON_CLICK: u32 = 0x20000;
    pub const LV_CLICK: u32 = 0x30100;
    pub const LV_CHECK: u32 = 0x30101;
    pub const LV_SELECTED: u32 = 0x30102;
    pub const TIMER_TICK: u32 = 0x30200;
    pub const CHB_CHECK: u32 = 0x30300;
    pub const CB_SELECT: u32 = 0x30400;
    pub const CB_CLICK: u32 = 0x30401;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Hold,
    Close { error: Option<String>, success: Option<String> },
    FormDraw(Box<FormDef>),
    FormValues { controls: Vec<String> },
    ControlVisible { name: String, visible: bool },
    ControlEnabled { name: String, enabled: bool },
    ControlError { name: String, error: Option<String> },
    ComboOptions { name: String, options: Vec<String> },
    ListDelete { name: String, index: i64 },
    ListClear { name: String },
    ListInsert { name: String, items: Vec<Row> },
    ListGetSelected { name: String },
    /// A negative index clears the selection.
    ListSetSelected { name: String, index: i64 },
    ListButtonEnabled { name: String, button: String, enabled: bool },
    TimerStart { name: String },
    TimerStop { name: String },
    /// `None` when the server sent a falsy status, which is ignored.
    ProgressStatus { name: String, status: Option<String> },
    /// `None` when the server sent a falsy percent, which is ignored.
    ProgressPercent { name: String, percent: Option<f64> },
    ButtonEnabled { name: String, enabled: bool },
}

impl Command {
    pub fn code(&self) -> u32 {
        match self {
            Command::Hold => command::HOLD,
            Command::Close { .. } => command::CLOSE,
            Command::FormDraw(_) => command::FORM_DRAW,
            Command::FormValues { .. } => command::FORM_VALUES,
            Command::ControlVisible { .. } => command::CONTROL_VISIBLE,
            Command::ControlEnabled { .. } => command::CONTROL_ENABLED,
            Command::ControlError { .. } => command::CONTROL_ERROR,
            Command::ComboOptions { .. } => command::CB_OPTIONS,
            Command::ListDelete { .. } => command::LV_DELETE,
            Command::ListClear { .. } => command::LV_CLEAR,
            Command::ListInsert { .. } => command::LV_INSERT,
            Command::ListGetSelected { .. } => command::LV_GET_SELECTED,
            Command::ListSetSelected { .. } => command::LV_SET_SELECTED,
            Command::ListButtonEnabled { .. } => command::LV_BUTTON_ENABLED,
            Command::TimerStart { .. } => command::TIMER_START,
            Command::TimerStop { .. } => command::TIMER_STOP,
            Command::ProgressStatus { .. } => command::PROGRESS_SET_STATUS,
            Command::ProgressPercent { .. } => command::PROGRESS_SET_PERCENT,
            Command::ButtonEnabled { .. } => command::BUTTON_ENABLED,
        }
    }
}

/// Every field any command may carry; which ones are required depends on
/// the kind.
#[derive(Debug, Deserialize)]
struct RawCommand {
    kind: Value,
    name: Option<String>,
    visible: Option<bool>,
    enabled: Option<bool>,
    error: Option<Value>,
    success: Option<Value>,
    #[serde(rename = "struct")]
    structure: Option<FormDef>,
    controls: Option<Vec<String>>,
    options: Option<Vec<String>>,
    index: Option<i64>,
    items: Option<Vec<Row>>,
    button: Option<String>,
    status: Option<Value>,
    percent: Option<Value>,
}

/// Splits a batch into its commands. The batch fails as a whole only when
/// it is not a JSON array; each element decodes independently.
pub fn decode_batch(text: &str) -> ProtocolResult<Vec<ProtocolResult<Command>>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let value: Value = serde_json::from_str(text).map_err(ProtocolError::Batch)?;
    match value {
        Value::Array(items) => Ok(items.into_iter().map(decode_command).collect()),
        Value::Null => Ok(Vec::new()),
        _ => Err(ProtocolError::NotArray),
    }
}

pub fn decode_command(value: Value) -> ProtocolResult<Command> {
    let raw: RawCommand = serde_json::from_value(value).map_err(ProtocolError::Command)?;
    let kind = parse_kind(&raw.kind).ok_or_else(|| ProtocolError::UnknownKind(raw.kind.to_string()))?;
    let missing = |field: &'static str| ProtocolError::MissingField { kind, field };
    let name = || raw.name.clone().ok_or_else(|| missing("name"));

    let command = match kind {
        command::HOLD => Command::Hold,
        command::CLOSE => Command::Close {
            error: raw.error.as_ref().and_then(text_of),
            success: raw.success.as_ref().and_then(text_of),
        },
        command::FORM_DRAW => {
            Command::FormDraw(Box::new(raw.structure.clone().ok_or_else(|| missing("struct"))?))
        }
        command::FORM_VALUES => Command::FormValues {
            controls: raw.controls.clone().ok_or_else(|| missing("controls"))?,
        },
        command::CONTROL_VISIBLE => Command::ControlVisible {
            name: name()?,
            visible: raw.visible.ok_or_else(|| missing("visible"))?,
        },
        command::CONTROL_ENABLED => Command::ControlEnabled {
            name: name()?,
            enabled: raw.enabled.ok_or_else(|| missing("enabled"))?,
        },
        command::CONTROL_ERROR => Command::ControlError {
            name: name()?,
            error: raw.error.as_ref().and_then(text_of),
        },
        command::CB_OPTIONS => Command::ComboOptions {
            name: name()?,
            options: raw.options.clone().unwrap_or_default(),
        },
        command::LV_DELETE => Command::ListDelete {
            name: name()?,
            index: raw.index.ok_or_else(|| missing("index"))?,
        },
        command::LV_CLEAR => Command::ListClear { name: name()? },
        command::LV_INSERT => Command::ListInsert {
            name: name()?,
            items: raw.items.clone().unwrap_or_default(),
        },
        command::LV_GET_SELECTED => Command::ListGetSelected { name: name()? },
        command::LV_SET_SELECTED => Command::ListSetSelected {
            name: name()?,
            index: raw.index.unwrap_or(-1),
        },
        command::LV_BUTTON_ENABLED => Command::ListButtonEnabled {
            name: name()?,
            button: raw.button.clone().ok_or_else(|| missing("button"))?,
            enabled: raw.enabled.ok_or_else(|| missing("enabled"))?,
        },
        command::TIMER_START => Command::TimerStart { name: name()? },
        command::TIMER_STOP => Command::TimerStop { name: name()? },
        command::PROGRESS_SET_STATUS => Command::ProgressStatus {
            name: name()?,
            status: raw.status.as_ref().filter(|v| truthy(v)).and_then(text_of),
        },
        command::PROGRESS_SET_PERCENT => Command::ProgressPercent {
            name: name()?,
            percent: raw.percent.as_ref().filter(|v| truthy(v)).and_then(number_of),
        },
        command::BUTTON_ENABLED => Command::ButtonEnabled {
            name: name()?,
            enabled: raw.enabled.ok_or_else(|| missing("enabled"))?,
        },
        other => return Err(ProtocolError::UnknownKind(format!("{:#x}", other))),
    };
    Ok(command)
}

/// Accepts a number or a decimal / `0x` hex string.
fn parse_kind(kind: &Value) -> Option<u32> {
    match kind {
        Value::Number(n) => n.as_u64().and_then(|k| u32::try_from(k).ok()),
        Value::String(s) => {
            let s = s.trim();
            match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => s.parse().ok(),
            }
        }
        _ => None,
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_accepts_numbers_and_strings() {
        assert_eq!(parse_kind(&json!(65536)), Some(command::FORM_DRAW));
        assert_eq!(parse_kind(&json!("0x20001")), Some(command::CONTROL_ENABLED));
        assert_eq!(parse_kind(&json!("1")), Some(command::CLOSE));
        assert_eq!(parse_kind(&json!(-1)), None);
    }

    #[test]
    fn falsy_progress_values_decode_to_none() {
        let cmd = decode_command(json!({"kind": 0x20401, "name": "p", "percent": 0})).unwrap();
        assert_eq!(cmd, Command::ProgressPercent { name: "p".into(), percent: None });
        let cmd = decode_command(json!({"kind": 0x20400, "name": "p", "status": ""})).unwrap();
        assert_eq!(cmd, Command::ProgressStatus { name: "p".into(), status: None });
        let cmd = decode_command(json!({"kind": 0x20401, "name": "p", "percent": 42.5})).unwrap();
        assert_eq!(cmd, Command::ProgressPercent { name: "p".into(), percent: Some(42.5) });
    }

    #[test]
    fn batch_elements_fail_individually() {
        let batch = decode_batch(r#"[{"kind":0},{"kind":12345},{"kind":131073},{"nokind":true}]"#).unwrap();
        assert_eq!(batch.len(), 4);
        assert!(matches!(batch[0], Ok(Command::Hold)));
        assert!(matches!(batch[1], Err(ProtocolError::UnknownKind(_))));
        assert!(matches!(batch[2], Err(ProtocolError::MissingField { field: "name", .. })));
        assert!(matches!(batch[3], Err(ProtocolError::Command(_))));
    }

    #[test]
    fn form_values_requires_control_names() {
        let missing = decode_command(json!({"kind": 0x10001}));
        assert!(matches!(missing, Err(ProtocolError::MissingField { field: "controls", .. })));
        let cmd = decode_command(json!({"kind": "0x10001", "controls": []})).unwrap();
        assert_eq!(cmd, Command::FormValues { controls: Vec::new() });
    }

    #[test]
    fn unparsable_batches_are_rejected_whole() {
        assert!(matches!(decode_batch("[{"), Err(ProtocolError::Batch(_))));
        assert!(matches!(decode_batch(r#"{"kind":0}"#), Err(ProtocolError::NotArray)));
        assert!(decode_batch("  ").unwrap().is_empty());
    }

    #[test]
    fn form_draw_carries_the_structure() {
        let cmd = decode_command(json!({
            "kind": 0x10000,
            "struct": {"name": "f1", "title": "T", "controls": [{"kind": "label", "name": "l"}]}
        }))
        .unwrap();
        match cmd {
            Command::FormDraw(def) => {
                assert_eq!(def.name.as_deref(), Some("f1"));
                assert_eq!(def.controls.len(), 1);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
