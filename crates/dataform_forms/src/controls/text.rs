use crate::control::{
    AuxButton, Control, ControlBase, HasButton, HasInput, input_error, input_set_enabled,
};
use crate::error::FormResult;
use crate::registry::BuildContext;
use crate::structure::ControlDef;
use crate::surface::Part;
use serde_json::{Value, json};

/// Most memory entries offered at once by a SmartTextBox.
pub const SUGGESTION_LIMIT: usize = 5;

/// Single-line text input.
#[derive(Debug)]
pub struct TextBox {
    base: ControlBase,
    text: String,
    maxlen: Option<usize>,
    button: AuxButton,
}

impl TextBox {
    pub fn new(ctx: &mut BuildContext<'_>, def: &ControlDef) -> FormResult<Self> {
        Ok(Self {
            base: ControlBase::new(ctx.scope(), def)?,
            text: def.text.clone().unwrap_or_default(),
            maxlen: def.maxlen.map(|n| n as usize),
            button: AuxButton::new(def.button.as_ref()),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.base.render(Part::Input, Value::String(self.text.clone()));
    }

    pub fn button(&self) -> &AuxButton {
        &self.button
    }

    /// User click on the auxiliary button.
    pub fn click_button(&self) {
        self.button.click(&self.base);
    }
}

impl Control for TextBox {
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
        json!({ "text": self.text })
    }

    fn button_host(&mut self) -> Option<&mut dyn HasButton> {
        Some(self)
    }
}

impl HasButton for TextBox {
    fn button_enabled(&self) -> bool {
        self.button.enabled()
    }

    fn set_button_enabled(&mut self, enabled: bool) {
        self.button.set_enabled(&self.base, enabled);
    }
}

impl HasInput for TextBox {
    fn input_text(&self) -> String {
        self.text.clone()
    }

    fn type_text(&mut self, text: &str) {
        if !self.base.enabled() {
            return;
        }
        let text: String = match self.maxlen {
            Some(max) => text.chars().take(max).collect(),
            None => text.to_string(),
        };
        self.set_text(text);
    }
}

/// Text input that remembers earlier entries and offers the matching ones
/// while the user types.
#[derive(Debug)]
pub struct SmartTextBox {
    input: TextBox,
    memory: Vec<String>,
    suggestions: Vec<usize>,
    highlighted: Option<usize>,
}

impl SmartTextBox {
    pub fn new(ctx: &mut BuildContext<'_>, def: &ControlDef) -> FormResult<Self> {
        Ok(Self {
            input: TextBox::new(ctx, def)?,
            memory: def.memory.clone(),
            suggestions: Vec::new(),
            highlighted: None,
        })
    }

    pub fn text(&self) -> &str {
        self.input.text()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.input.set_text(text);
    }

    pub fn memory(&self) -> &[String] {
        &self.memory
    }

    pub fn click_button(&self) {
        self.input.click_button();
    }

    /// Memory entries currently offered, in memory order.
    pub fn suggestions(&self) -> Vec<&str> {
        self.suggestions
            .iter()
            .map(|&i| self.memory[i].as_str())
            .collect()
    }

    pub fn highlighted(&self) -> Option<&str> {
        self.highlighted
            .map(|h| self.memory[self.suggestions[h]].as_str())
    }

    pub fn highlight_next(&mut self) {
        self.expand_if_collapsed();
        let len = self.suggestions.len();
        if len == 0 {
            return;
        }
        self.highlighted = Some(match self.highlighted {
            None => 0,
            Some(h) => (h + 1) % len,
        });
    }

    pub fn highlight_previous(&mut self) {
        self.expand_if_collapsed();
        let len = self.suggestions.len();
        if len == 0 {
            return;
        }
        self.highlighted = Some(match self.highlighted {
            None | Some(0) => len - 1,
            Some(h) => h - 1,
        });
    }

    /// Copies the highlighted suggestion into the input. Returns false when
    /// nothing was highlighted.
    pub fn accept(&mut self) -> bool {
        let Some(text) = self.highlighted().map(str::to_string) else {
            return false;
        };
        self.input.set_text(text);
        self.collapse();
        true
    }

    /// Clears the input and hides the suggestions.
    pub fn escape(&mut self) {
        self.input.set_text(String::new());
        self.collapse();
    }

    fn expand_if_collapsed(&mut self) {
        if self.suggestions.is_empty() {
            self.filter();
        }
    }

    fn filter(&mut self) {
        let needle = self.input.text().to_lowercase();
        self.suggestions = self
            .memory
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.to_lowercase().contains(&needle))
            .map(|(i, _)| i)
            .take(SUGGESTION_LIMIT)
            .collect();
        self.highlighted = None;
    }

    fn collapse(&mut self) {
        self.suggestions.clear();
        self.highlighted = None;
    }
}

impl Control for SmartTextBox {
    fn base(&self) -> &ControlBase {
        self.input.base()
    }

    fn base_mut(&mut self) -> &mut ControlBase {
        self.input.base_mut()
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.input.set_enabled(enabled);
    }

    fn error(&mut self, message: Option<&str>) {
        self.input.error(message);
    }

    fn json(&self) -> Value {
        self.input.json()
    }

    fn button_host(&mut self) -> Option<&mut dyn HasButton> {
        Some(&mut self.input)
    }
}

impl HasInput for SmartTextBox {
    fn input_text(&self) -> String {
        self.input.input_text()
    }

    fn type_text(&mut self, text: &str) {
        if !self.input.enabled() {
            return;
        }
        self.input.type_text(text);
        self.filter();
    }
}
