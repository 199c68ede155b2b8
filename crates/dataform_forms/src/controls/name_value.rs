use crate::control::{Control, ControlBase};
use crate::error::FormResult;
use crate::registry::BuildContext;
use crate::structure::{ControlDef, NameValueItem};
use crate::surface::Part;
use serde_json::json;

/// Read-only list of name/value pairs whose values can be replaced by position.
#[derive(Debug)]
pub struct NameValue {
    base: ControlBase,
    items: Vec<NameValueItem>,
}

impl NameValue {
    pub fn new(ctx: &mut BuildContext<'_>, def: &ControlDef) -> FormResult<Self> {
        Ok(Self {
            base: ControlBase::new(ctx.scope(), def)?,
            items: def.items.clone(),
        })
    }

    pub fn items(&self) -> &[NameValueItem] {
        &self.items
    }

    pub fn value(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(|item| item.value.as_str())
    }

    pub fn set_value(&mut self, index: usize, value: impl Into<String>) -> bool {
        let Some(item) = self.items.get_mut(index) else {
            return false;
        };
        item.value = value.into();
        self.base
            .render(Part::Input, json!({ "index": index, "value": item.value }));
        true
    }
}

impl Control for NameValue {
    fn base(&self) -> &ControlBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ControlBase {
        &mut self.base
    }
}
