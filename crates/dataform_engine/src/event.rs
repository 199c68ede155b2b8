use crate::protocol::event as code;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value, json};

/// Value of one control as reported by FORM.VALUES.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlValue {
    pub name: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventBody {
    Hold,
    FormShow,
    FormValues { controls: Vec<ControlValue> },
    ButtonClick { name: String },
    CheckBoxCheck { name: String, checked: bool },
    ComboSelect { name: String, index: i64 },
    ComboClick { name: String },
    ListCheck { name: String, index: usize, checked: bool },
    ListSelected { name: String, index: Option<usize> },
    ListClick { name: String, button: String },
    TimerTick { name: String },
}

impl EventBody {
    pub fn code(&self) -> u32 {
        match self {
            EventBody::Hold => code::HOLD,
            EventBody::FormShow => code::FORM_SHOW,
            EventBody::FormValues { .. } => code::FORM_VALUES,
            EventBody::ButtonClick { .. } => code::BUTTON_CLICK,
            EventBody::CheckBoxCheck { .. } => code::CHB_CHECK,
            EventBody::ComboSelect { .. } => code::CB_SELECT,
            EventBody::ComboClick { .. } => code::CB_CLICK,
            EventBody::ListCheck { .. } => code::LV_CHECK,
            EventBody::ListSelected { .. } => code::LV_SELECTED,
            EventBody::ListClick { .. } => code::LV_CLICK,
            EventBody::TimerTick { .. } => code::TIMER_TICK,
        }
    }

    fn fields(&self) -> Value {
        match self {
            EventBody::Hold | EventBody::FormShow => json!({}),
            EventBody::FormValues { controls } => json!({ "controls": controls }),
            EventBody::ButtonClick { name }
            | EventBody::ComboClick { name }
            | EventBody::TimerTick { name } => json!({ "name": name }),
            EventBody::CheckBoxCheck { name, checked } => json!({ "name": name, "checked": checked }),
            EventBody::ComboSelect { name, index } => json!({ "name": name, "index": index }),
            EventBody::ListCheck { name, index, checked } => {
                json!({ "name": name, "index": index, "checked": checked })
            }
            EventBody::ListSelected { name, index } => json!({ "name": name, "index": index }),
            EventBody::ListClick { name, button } => json!({ "name": name, "button": button }),
        }
    }
}

/// Outbound event: `{form?, kind, ...fields}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub form: Option<String>,
    pub body: EventBody,
}

impl Event {
    pub fn code(&self) -> u32 {
        self.body.code()
    }

    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        if let Some(form) = &self.form {
            object.insert("form".to_string(), Value::String(form.clone()));
        }
        object.insert("kind".to_string(), Value::from(self.code()));
        if let Value::Object(fields) = self.body.fields() {
            object.extend(fields);
        }
        Value::Object(object)
    }
}

impl Serialize for Event {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}
