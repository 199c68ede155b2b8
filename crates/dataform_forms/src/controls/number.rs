use crate::control::{
    AuxButton, Control, ControlBase, HasButton, HasInput, input_error, input_set_enabled,
    number_value,
};
use crate::error::FormResult;
use crate::registry::BuildContext;
use crate::structure::ControlDef;
use crate::surface::Part;
use serde_json::{Value, json};

/// Numeric input whose value is kept inside `[minimum, maximum]`.
///
/// The field holds whatever the user typed; the value is only parsed and
/// corrected when it is read.
#[derive(Debug)]
pub struct NumberBox {
    base: ControlBase,
    text: String,
    minimum: f64,
    maximum: f64,
    button: AuxButton,
}

impl NumberBox {
    pub fn new(ctx: &mut BuildContext<'_>, def: &ControlDef) -> FormResult<Self> {
        let bound = |v: &Option<Value>| v.as_ref().and_then(Value::as_f64);
        Ok(Self {
            base: ControlBase::new(ctx.scope(), def)?,
            text: format_number(def.value_f64().unwrap_or(0.0)),
            minimum: bound(&def.minimum).unwrap_or(f64::NEG_INFINITY),
            maximum: bound(&def.maximum).unwrap_or(f64::INFINITY),
            button: AuxButton::new(def.button.as_ref()),
        })
    }

    pub fn minimum(&self) -> f64 {
        self.minimum
    }

    pub fn maximum(&self) -> f64 {
        self.maximum
    }

    /// Parses the displayed text and clamps it, without touching the display.
    pub fn read_value(&self) -> f64 {
        let trimmed = self.text.trim();
        let parsed = if trimmed.is_empty() {
            Some(0.0)
        } else {
            trimmed.parse::<f64>().ok().filter(|v| !v.is_nan())
        };
        match parsed {
            None => self.minimum,
            Some(v) => self.clamp(v),
        }
    }

    /// Reads the value and writes the corrected number back to the display.
    pub fn value(&mut self) -> f64 {
        let value = self.read_value();
        self.show(value);
        value
    }

    pub fn set_value(&mut self, value: f64) {
        let value = if value.is_nan() { self.minimum } else { self.clamp(value) };
        self.show(value);
    }

    pub fn click_button(&self) {
        self.button.click(&self.base);
    }

    fn clamp(&self, value: f64) -> f64 {
        if value < self.minimum {
            self.minimum
        } else if value > self.maximum {
            self.maximum
        } else {
            value
        }
    }

    fn show(&mut self, value: f64) {
        let text = format_number(value);
        if text != self.text {
            self.text = text;
            self.base.render(Part::Input, Value::String(self.text.clone()));
        }
    }
}

fn format_number(value: f64) -> String {
    format!("{}", value)
}

impl Control for NumberBox {
    fn base(&self) -> &ControlBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ControlBase {
        &mut self.base
    }

    fn set_enabled(&mut self, enabled: bool) {
        input_set_enabled(&mut self.base, enabled);
    }

    fn error(&mut self, message: Option<&str>) {
        input_error(&self.base, message);
    }

    fn json(&self) -> Value {
        json!({ "value": number_value(self.read_value()) })
    }

    fn button_host(&mut self) -> Option<&mut dyn HasButton> {
        Some(self)
    }
}

impl HasButton for NumberBox {
    fn button_enabled(&self) -> bool {
        self.button.enabled()
    }

    fn set_button_enabled(&mut self, enabled: bool) {
        self.button.set_enabled(&self.base, enabled);
    }
}

impl HasInput for NumberBox {
    fn input_text(&self) -> String {
        self.text.clone()
    }

    fn type_text(&mut self, text: &str) {
        if self.base.enabled() {
            self.text = text.to_string();
        }
    }
}
