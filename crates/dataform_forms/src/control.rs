use crate::error::FormResult;
use crate::events::{EventKind, FormEvent};
use crate::kind::ControlKind;
use crate::localization::Localization;
use crate::scheduler::Scheduler;
use crate::structure::{AuxButtonDef, ControlDef};
use crate::surface::{ElementId, Part, Surface, Transition};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// State shared by a form and every control it owns.
pub struct FormScope {
    form_name: String,
    surface: Rc<dyn Surface>,
    localization: &'static Localization,
    scheduler: Scheduler,
    events: RefCell<VecDeque<FormEvent>>,
    // Name of the control currently carrying the form's error annotation
    error_owner: RefCell<Option<String>>,
}

impl FormScope {
    pub fn new(
        form_name: impl Into<String>,
        surface: Rc<dyn Surface>,
        localization: &'static Localization,
        scheduler: Scheduler,
    ) -> Rc<Self> {
        Rc::new(Self {
            form_name: form_name.into(),
            surface,
            localization,
            scheduler,
            events: RefCell::new(VecDeque::new()),
            error_owner: RefCell::new(None),
        })
    }

    pub fn form_name(&self) -> &str {
        &self.form_name
    }

    pub fn surface(&self) -> &dyn Surface {
        self.surface.as_ref()
    }

    pub fn localization(&self) -> &'static Localization {
        self.localization
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn raise(&self, target: &str, kind: EventKind) {
        self.events.borrow_mut().push_back(FormEvent {
            target: target.to_string(),
            kind,
        });
    }

    pub fn take_events(&self) -> Vec<FormEvent> {
        self.events.borrow_mut().drain(..).collect()
    }

    pub fn error_owner(&self) -> Option<String> {
        self.error_owner.borrow().clone()
    }
}

impl std::fmt::Debug for FormScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormScope")
            .field("form_name", &self.form_name)
            .finish_non_exhaustive()
    }
}

/// Identity, visibility and availability common to every control.
#[derive(Debug)]
pub struct ControlBase {
    name: String,
    kind: ControlKind,
    id: ElementId,
    visible: bool,
    enabled: bool,
    scope: Rc<FormScope>,
}

impl ControlBase {
    pub fn new(scope: &Rc<FormScope>, def: &ControlDef) -> FormResult<Self> {
        let name = def.require_name()?.to_string();
        let id = ElementId::control(scope.form_name(), &name);
        let visible = def.visible != Some(false);
        if !visible {
            scope.surface().set_display(&id, false, Transition::Instant);
        }
        Ok(Self {
            name,
            kind: def.kind.clone(),
            id,
            visible,
            enabled: true,
            scope: scope.clone(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ControlKind {
        &self.kind
    }

    pub fn id(&self) -> &ElementId {
        &self.id
    }

    pub fn scope(&self) -> &Rc<FormScope> {
        &self.scope
    }

    pub fn surface(&self) -> &dyn Surface {
        self.scope.surface()
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        if visible == self.visible {
            return;
        }
        self.visible = visible;
        let transition = if self.kind.animates_visibility() {
            Transition::Eased
        } else {
            Transition::Instant
        };
        self.surface().set_display(&self.id, visible, transition);
        if self.has_error() {
            self.surface().set_error_display(&self.id, visible);
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Toggles the disabled marker. Returns whether the state changed.
    pub fn set_enabled(&mut self, enabled: bool) -> bool {
        if enabled == self.enabled {
            return false;
        }
        self.enabled = enabled;
        self.surface().set_disabled(&self.id, Part::Frame, !enabled);
        true
    }

    /// Replaces the form's error annotation. Only one control carries it at a time.
    pub fn show_error(&self, message: Option<&str>) {
        self.surface().clear_errors(self.scope.form_name());
        let mut owner = self.scope.error_owner.borrow_mut();
        *owner = None;
        if let Some(message) = message {
            self.surface().show_error(&self.id, message);
            *owner = Some(self.name.clone());
        }
    }

    pub fn has_error(&self) -> bool {
        self.scope.error_owner.borrow().as_deref() == Some(self.name.as_str())
    }

    pub fn raise(&self, kind: EventKind) {
        self.scope.raise(&self.name, kind);
    }

    pub fn render(&self, part: Part, value: Value) {
        self.surface().update(&self.id, part, &value);
    }
}

/// Capability contract every form control offers.
pub trait Control {
    fn base(&self) -> &ControlBase;
    fn base_mut(&mut self) -> &mut ControlBase;

    fn name(&self) -> &str {
        self.base().name()
    }

    fn kind(&self) -> &ControlKind {
        self.base().kind()
    }

    fn visible(&self) -> bool {
        self.base().visible()
    }

    fn set_visible(&mut self, visible: bool) {
        self.base_mut().set_visible(visible);
    }

    fn enabled(&self) -> bool {
        self.base().enabled()
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.base_mut().set_enabled(enabled);
    }

    fn error(&mut self, message: Option<&str>) {
        self.base().show_error(message);
    }

    /// Current value as a plain object; display-only kinds report `{}`.
    fn json(&self) -> Value {
        Value::Object(Map::new())
    }

    fn button_host(&mut self) -> Option<&mut dyn HasButton> {
        None
    }
}

/// Controls with an auxiliary button next to the field.
pub trait HasButton {
    fn button_enabled(&self) -> bool;
    fn set_button_enabled(&mut self, enabled: bool);
}

/// Controls whose value is typed into a text input.
pub trait HasInput: Control {
    fn input_text(&self) -> String;

    /// Replaces the input's text as if the user typed it.
    fn type_text(&mut self, text: &str);
}

/// Input semantics shared by text-like fields: the inner input follows the
/// control's availability and takes focus back after an error is shown.
pub(crate) fn input_set_enabled(base: &mut ControlBase, enabled: bool) {
    if base.set_enabled(enabled) {
        base.surface().set_disabled(base.id(), Part::Input, !enabled);
    }
}

pub(crate) fn input_error(base: &ControlBase, message: Option<&str>) {
    base.show_error(message);
    if base.enabled() {
        base.surface().focus(base.id());
    }
}

#[derive(Debug, Clone)]
pub struct AuxButton {
    present: bool,
    enabled: bool,
    caption: Option<String>,
}

impl AuxButton {
    pub fn new(def: Option<&AuxButtonDef>) -> Self {
        match def {
            Some(def) => Self {
                present: true,
                enabled: def.enabled.unwrap_or(true),
                caption: def.caption.clone(),
            },
            None => Self {
                present: false,
                enabled: false,
                caption: None,
            },
        }
    }

    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    pub fn enabled(&self) -> bool {
        self.present && self.enabled
    }

    pub fn set_enabled(&mut self, base: &ControlBase, enabled: bool) {
        if !self.present {
            return;
        }
        self.enabled = enabled;
        base.surface().set_disabled(base.id(), Part::AuxButton, !enabled);
    }

    /// User click; a disabled or absent button does nothing.
    pub fn click(&self, base: &ControlBase) {
        if self.enabled() {
            base.raise(EventKind::AuxButtonClick);
        }
    }
}

/// JSON number that keeps integral values integral.
pub(crate) fn number_value(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Value::from(value as i64)
    } else {
        serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}
