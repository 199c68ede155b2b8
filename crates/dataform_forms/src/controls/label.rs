use crate::control::{Control, ControlBase};
use crate::error::FormResult;
use crate::registry::BuildContext;
use crate::structure::ControlDef;
use crate::surface::Part;
use serde_json::Value;

/// Display-only caption.
#[derive(Debug)]
pub struct Label {
    base: ControlBase,
    caption: String,
}

impl Label {
    pub fn new(ctx: &mut BuildContext<'_>, def: &ControlDef) -> FormResult<Self> {
        Ok(Self {
            base: ControlBase::new(ctx.scope(), def)?,
            caption: def.caption.clone().unwrap_or_default(),
        })
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn set_caption(&mut self, caption: impl Into<String>) {
        self.caption = caption.into();
        self.base.render(Part::Frame, Value::String(self.caption.clone()));
    }
}

impl Control for Label {
    fn base(&self) -> &ControlBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ControlBase {
        &mut self.base
    }
}

/// Horizontal separator.
#[derive(Debug)]
pub struct Line {
    base: ControlBase,
}

impl Line {
    pub fn new(ctx: &mut BuildContext<'_>, def: &ControlDef) -> FormResult<Self> {
        Ok(Self {
            base: ControlBase::new(ctx.scope(), def)?,
        })
    }
}

impl Control for Line {
    fn base(&self) -> &ControlBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ControlBase {
        &mut self.base
    }
}
