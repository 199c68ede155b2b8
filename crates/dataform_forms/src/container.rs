use crate::control::{Control, ControlBase};
use crate::error::FormResult;
use crate::registry::BuildContext;
use crate::structure::ControlDef;
use crate::widget::Widget;

/// GroupBox or Panel: a control owning an ordered list of children.
#[derive(Debug)]
pub struct Container {
    base: ControlBase,
    caption: Option<String>,
    children: Vec<Widget>,
}

impl Container {
    pub fn new(ctx: &mut BuildContext<'_>, def: &ControlDef) -> FormResult<Self> {
        let base = ControlBase::new(ctx.scope(), def)?;
        let children = ctx.build_all(&def.controls)?;
        Ok(Self {
            base,
            caption: def.caption.clone(),
            children,
        })
    }

    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    pub fn children(&self) -> &[Widget] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [Widget] {
        &mut self.children
    }

    /// Depth-first search of the children, descending into nested containers.
    pub fn find(&self, name: &str) -> Option<&Widget> {
        find_in(&self.children, name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Widget> {
        find_in_mut(&mut self.children, name)
    }
}

impl Control for Container {
    fn base(&self) -> &ControlBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ControlBase {
        &mut self.base
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.base.set_enabled(enabled);
        cascade_enabled(&mut self.children, enabled);
    }
}

/// Applies a container's availability to its children.
///
/// Each child's own state is overwritten, not remembered: re-enabling the
/// container also re-enables a child that was disabled on its own.
pub fn cascade_enabled(children: &mut [Widget], enabled: bool) {
    for child in children {
        child.set_enabled(enabled);
        if let Some(host) = child.control_mut().button_host() {
            host.set_button_enabled(enabled);
        }
    }
}

pub fn find_in<'a>(widgets: &'a [Widget], name: &str) -> Option<&'a Widget> {
    for widget in widgets {
        if widget.name() == name {
            return Some(widget);
        }
        if let Some(found) = widget.as_container().and_then(|c| c.find(name)) {
            return Some(found);
        }
    }
    None
}

pub fn find_in_mut<'a>(widgets: &'a mut [Widget], name: &str) -> Option<&'a mut Widget> {
    // Locate first, then borrow mutably along the found path.
    let index = widgets
        .iter()
        .position(|w| w.name() == name || w.as_container().is_some_and(|c| c.find(name).is_some()))?;
    let widget = &mut widgets[index];
    if widget.name() == name {
        return Some(widget);
    }
    widget.as_container_mut()?.find_mut(name)
}
