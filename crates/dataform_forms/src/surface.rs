//! The rendering surface a form is mounted on.
//!
//! Markup generation and DOM handling live outside this crate; controls
//! only tell the surface what changed. Every method has a no-op default so
//! a headless surface implements nothing.

use crate::localization::Localization;
use crate::structure::FormDef;
use serde_json::Value;
use std::cell::RefCell;
use std::fmt;

/// Rendered identity of an element, derived from the form and element names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementId(String);

impl ElementId {
    pub fn control(form: &str, control: &str) -> Self {
        ElementId(format!("df_control_id__{}__{}", form, control))
    }

    pub fn button(form: &str, button: &str) -> Self {
        ElementId(format!("df_button_id__{}__{}", form, button))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Eased,
    Instant,
}

/// Part of a rendered control an update refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Frame,
    Input,
    AuxButton,
    /// ListView action button, by its rendered id.
    ListButton(String),
    Status,
    Percent,
}

pub trait Surface {
    fn mount(&self, _form: &FormDef, _localization: &Localization) {}
    fn clear(&self) {}
    fn set_display(&self, _element: &ElementId, _visible: bool, _transition: Transition) {}
    fn set_error_display(&self, _element: &ElementId, _visible: bool) {}
    fn show_error(&self, _element: &ElementId, _message: &str) {}
    fn clear_errors(&self, _form: &str) {}
    fn set_disabled(&self, _element: &ElementId, _part: Part, _disabled: bool) {}
    fn focus(&self, _element: &ElementId) {}
    fn update(&self, _element: &ElementId, _part: Part, _value: &Value) {}
}

/// Surface that renders nothing.
#[derive(Debug, Default)]
pub struct NullSurface;

impl Surface for NullSurface {}

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    Mount(String),
    Clear,
    Display(ElementId, bool, Transition),
    ErrorDisplay(ElementId, bool),
    ShowError(ElementId, String),
    ClearErrors(String),
    Disabled(ElementId, Part, bool),
    Focus(ElementId),
    Update(ElementId, Part, Value),
}

/// Surface that keeps a log of every operation, for assertions.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    ops: RefCell<Vec<SurfaceOp>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> Vec<SurfaceOp> {
        self.ops.borrow().clone()
    }

    pub fn take(&self) -> Vec<SurfaceOp> {
        std::mem::take(&mut *self.ops.borrow_mut())
    }

    pub fn count(&self, pred: impl Fn(&SurfaceOp) -> bool) -> usize {
        self.ops.borrow().iter().filter(|op| pred(op)).count()
    }

    fn push(&self, op: SurfaceOp) {
        self.ops.borrow_mut().push(op);
    }
}

impl Surface for RecordingSurface {
    fn mount(&self, form: &FormDef, _localization: &Localization) {
        self.push(SurfaceOp::Mount(form.name.clone().unwrap_or_default()));
    }

    fn clear(&self) {
        self.push(SurfaceOp::Clear);
    }

    fn set_display(&self, element: &ElementId, visible: bool, transition: Transition) {
        self.push(SurfaceOp::Display(element.clone(), visible, transition));
    }

    fn set_error_display(&self, element: &ElementId, visible: bool) {
        self.push(SurfaceOp::ErrorDisplay(element.clone(), visible));
    }

    fn show_error(&self, element: &ElementId, message: &str) {
        self.push(SurfaceOp::ShowError(element.clone(), message.to_string()));
    }

    fn clear_errors(&self, form: &str) {
        self.push(SurfaceOp::ClearErrors(form.to_string()));
    }

    fn set_disabled(&self, element: &ElementId, part: Part, disabled: bool) {
        self.push(SurfaceOp::Disabled(element.clone(), part, disabled));
    }

    fn focus(&self, element: &ElementId) {
        self.push(SurfaceOp::Focus(element.clone()));
    }

    fn update(&self, element: &ElementId, part: Part, value: &Value) {
        self.push(SurfaceOp::Update(element.clone(), part, value.clone()));
    }
}
