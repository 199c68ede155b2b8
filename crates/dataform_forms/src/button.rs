use crate::control::FormScope;
use crate::error::FormResult;
use crate::events::EventKind;
use crate::structure::ButtonDef;
use crate::surface::{ElementId, Part};
use std::rc::Rc;

/// Button of the form's command bar.
#[derive(Debug)]
pub struct Button {
    name: String,
    caption: Option<String>,
    hint: Option<String>,
    width: Option<u32>,
    enabled: bool,
    id: ElementId,
    scope: Rc<FormScope>,
}

impl Button {
    pub fn new(scope: &Rc<FormScope>, def: &ButtonDef) -> FormResult<Self> {
        let name = def.require_name()?.to_string();
        Ok(Self {
            id: ElementId::button(scope.form_name(), &name),
            name,
            caption: def.caption.clone(),
            hint: def.hint.clone(),
            width: def.width,
            enabled: true,
            scope: scope.clone(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn width(&self) -> Option<u32> {
        self.width
    }

    pub fn id(&self) -> &ElementId {
        &self.id
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled == self.enabled {
            return;
        }
        self.enabled = enabled;
        self.scope
            .surface()
            .set_disabled(&self.id, Part::Frame, !enabled);
    }

    /// User click. A disabled button does nothing.
    pub fn click(&self) {
        if self.enabled {
            self.scope.raise(&self.name, EventKind::ButtonClick);
        }
    }
}
