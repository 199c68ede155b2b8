use crate::control::{AuxButton, Control, ControlBase, HasButton, input_set_enabled};
use crate::error::FormResult;
use crate::events::EventKind;
use crate::registry::BuildContext;
use crate::structure::ControlDef;
use crate::surface::Part;
use serde_json::{Value, json};

/// Selected index of a ComboBox with nothing selected.
pub const NO_SELECTION: i64 = -1;

/// Drop-down list of options.
#[derive(Debug)]
pub struct ComboBox {
    base: ControlBase,
    options: Vec<String>,
    selected: i64,
    button: AuxButton,
}

impl ComboBox {
    pub fn new(ctx: &mut BuildContext<'_>, def: &ControlDef) -> FormResult<Self> {
        let options = def.values.clone();
        let selected = match def.value.as_ref().and_then(Value::as_i64) {
            Some(i) if i >= 0 && (i as usize) < options.len() => i,
            Some(_) => NO_SELECTION,
            None if options.is_empty() => NO_SELECTION,
            None => 0,
        };
        Ok(Self {
            base: ControlBase::new(ctx.scope(), def)?,
            options,
            selected,
            button: AuxButton::new(def.button.as_ref()),
        })
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn selected(&self) -> i64 {
        self.selected
    }

    pub fn selected_text(&self) -> Option<&str> {
        usize::try_from(self.selected)
            .ok()
            .and_then(|i| self.options.get(i))
            .map(String::as_str)
    }

    /// Programmatic selection. Every accepted set is reported as a
    /// change, even when the index stays the same. Returns false for an
    /// index outside the option list.
    pub fn set_value(&mut self, index: i64) -> bool {
        if !self.accepts(index) {
            return false;
        }
        self.selected = index;
        self.base.render(Part::Input, Value::from(index));
        self.base.raise(EventKind::SelectionChanged { index });
        true
    }

    /// User click on an option, including the one already selected.
    pub fn select(&mut self, index: i64) {
        if !self.base.enabled() || index == NO_SELECTION {
            return;
        }
        self.set_value(index);
    }

    /// Replaces the option list and selects its first entry, or nothing
    /// when the list is empty. The new selection is reported as a change.
    pub fn set_options(&mut self, options: Vec<String>) {
        self.options = options;
        self.selected = if self.options.is_empty() { NO_SELECTION } else { 0 };
        self.base.render(
            Part::Input,
            json!({ "options": self.options, "index": self.selected }),
        );
        self.base.raise(EventKind::SelectionChanged { index: self.selected });
    }

    pub fn button(&self) -> &AuxButton {
        &self.button
    }

    pub fn click_button(&self) {
        self.button.click(&self.base);
    }

    fn accepts(&self, index: i64) -> bool {
        index == NO_SELECTION || (index >= 0 && (index as usize) < self.options.len())
    }
}

impl Control for ComboBox {
    fn base(&self) -> &ControlBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ControlBase {
        &mut self.base
    }

    fn set_enabled(&mut self, enabled: bool) {
        input_set_enabled(&mut self.base, enabled);
    }

    fn json(&self) -> Value {
        json!({ "index": self.selected })
    }

    fn button_host(&mut self) -> Option<&mut dyn HasButton> {
        Some(self)
    }
}

impl HasButton for ComboBox {
    fn button_enabled(&self) -> bool {
        self.button.enabled()
    }

    fn set_button_enabled(&mut self, enabled: bool) {
        self.button.set_enabled(&self.base, enabled);
    }
}

#[derive(Debug)]
pub struct CheckBox {
    base: ControlBase,
    checked: bool,
}

impl CheckBox {
    pub fn new(ctx: &mut BuildContext<'_>, def: &ControlDef) -> FormResult<Self> {
        Ok(Self {
            base: ControlBase::new(ctx.scope(), def)?,
            checked: def.checked.unwrap_or(false),
        })
    }

    pub fn checked(&self) -> bool {
        self.checked
    }

    /// Sets the flag; a change is reported like a user toggle.
    pub fn set_checked(&mut self, checked: bool) {
        if checked == self.checked {
            return;
        }
        self.checked = checked;
        self.base.render(Part::Input, Value::Bool(checked));
        self.base.raise(EventKind::CheckChanged { checked });
    }

    /// User click on the box. Ignored while disabled.
    pub fn toggle(&mut self) {
        if self.base.enabled() {
            self.set_checked(!self.checked);
        }
    }
}

impl Control for CheckBox {
    fn base(&self) -> &ControlBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ControlBase {
        &mut self.base
    }

    fn set_enabled(&mut self, enabled: bool) {
        input_set_enabled(&mut self.base, enabled);
    }

    fn json(&self) -> Value {
        json!({ "checked": self.checked })
    }
}
