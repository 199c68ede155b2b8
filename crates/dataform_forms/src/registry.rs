//! Kind registry: maps a kind name to the constructor of its control.
//!
//! The registry is passed to the form builder instead of living in a global,
//! so separate forms can run with different sets of extension kinds.

use crate::container::Container;
use crate::control::FormScope;
use crate::controls::{
    CheckBox, ComboBox, DateField, FileLoad, Label, Line, ListView, NameValue, NumberBox, Progress,
    SmartTextBox, TextBox, TimeField,
};
use crate::error::FormResult;
use crate::events::Handlers;
use crate::kind::ControlKind;
use crate::structure::ControlDef;
use crate::timer::{Timer, TimerHandle};
use crate::widget::Widget;
use std::collections::HashMap;
use std::rc::Rc;

pub type Constructor = Rc<dyn Fn(&mut BuildContext<'_>, &ControlDef) -> FormResult<Widget>>;

/// Everything a constructor needs while a form is being built.
pub struct BuildContext<'a> {
    scope: Rc<FormScope>,
    registry: &'a KindRegistry,
    handlers: &'a Handlers,
    timers: Vec<TimerHandle>,
}

impl<'a> BuildContext<'a> {
    pub fn new(scope: Rc<FormScope>, registry: &'a KindRegistry, handlers: &'a Handlers) -> Self {
        Self {
            scope,
            registry,
            handlers,
            timers: Vec::new(),
        }
    }

    pub fn scope(&self) -> &Rc<FormScope> {
        &self.scope
    }

    pub fn handlers(&self) -> &Handlers {
        self.handlers
    }

    /// Registers a timer the form must stop when it is destroyed.
    pub fn register_timer(&mut self, timer: TimerHandle) {
        self.timers.push(timer);
    }

    pub fn into_timers(self) -> Vec<TimerHandle> {
        self.timers
    }

    /// Builds one control. Kinds without a registered constructor yield `None`.
    pub fn build(&mut self, def: &ControlDef) -> FormResult<Option<Widget>> {
        let Some(constructor) = self.registry.get(&def.kind) else {
            tracing::warn!(kind = def.kind.as_str(), name = ?def.name, "skipping control of unregistered kind");
            return Ok(None);
        };
        constructor(self, def).map(Some)
    }

    pub fn build_all(&mut self, defs: &[ControlDef]) -> FormResult<Vec<Widget>> {
        let mut widgets = Vec::with_capacity(defs.len());
        for def in defs {
            if let Some(widget) = self.build(def)? {
                widgets.push(widget);
            }
        }
        Ok(widgets)
    }
}

#[derive(Clone, Default)]
pub struct KindRegistry {
    constructors: HashMap<String, Constructor>,
}

impl KindRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The kinds every form understands.
    pub fn core() -> Self {
        let mut registry = Self::empty();
        registry.install(ControlKind::Label, |ctx, def| Ok(Widget::Label(Label::new(ctx, def)?)));
        registry.install(ControlKind::Line, |ctx, def| Ok(Widget::Line(Line::new(ctx, def)?)));
        registry.install(ControlKind::TextBox, |ctx, def| Ok(Widget::TextBox(TextBox::new(ctx, def)?)));
        registry.install(ControlKind::SmartTextBox, |ctx, def| {
            Ok(Widget::SmartTextBox(SmartTextBox::new(ctx, def)?))
        });
        registry.install(ControlKind::Number, |ctx, def| Ok(Widget::Number(NumberBox::new(ctx, def)?)));
        registry.install(ControlKind::ComboBox, |ctx, def| Ok(Widget::ComboBox(ComboBox::new(ctx, def)?)));
        registry.install(ControlKind::CheckBox, |ctx, def| Ok(Widget::CheckBox(CheckBox::new(ctx, def)?)));
        registry.install(ControlKind::NameValue, |ctx, def| {
            Ok(Widget::NameValue(NameValue::new(ctx, def)?))
        });
        registry.install(ControlKind::ListView, |ctx, def| Ok(Widget::ListView(ListView::new(ctx, def)?)));
        registry.install(ControlKind::Progress, |ctx, def| Ok(Widget::Progress(Progress::new(ctx, def)?)));
        registry.install(ControlKind::Timer, |ctx, def| Ok(Widget::Timer(Timer::new(ctx, def)?)));
        registry.install(ControlKind::GroupBox, |ctx, def| Ok(Widget::GroupBox(Container::new(ctx, def)?)));
        registry.install(ControlKind::Panel, |ctx, def| Ok(Widget::Panel(Container::new(ctx, def)?)));
        registry
    }

    /// Core kinds plus the date, time and file upload extensions.
    pub fn standard() -> Self {
        let mut registry = Self::core();
        registry.install_extended();
        registry
    }

    pub fn install_extended(&mut self) {
        self.install(ControlKind::Date, |ctx, def| Ok(Widget::Date(DateField::new(ctx, def)?)));
        self.install(ControlKind::Time, |ctx, def| Ok(Widget::Time(TimeField::new(ctx, def)?)));
        self.install(ControlKind::FileLoad, |ctx, def| Ok(Widget::FileLoad(FileLoad::new(ctx, def)?)));
    }

    pub fn install(
        &mut self,
        kind: ControlKind,
        constructor: impl Fn(&mut BuildContext<'_>, &ControlDef) -> FormResult<Widget> + 'static,
    ) {
        self.constructors
            .insert(kind.as_str().to_lowercase(), Rc::new(constructor));
    }

    pub fn contains(&self, kind: &ControlKind) -> bool {
        self.constructors.contains_key(&kind.as_str().to_lowercase())
    }

    pub fn get(&self, kind: &ControlKind) -> Option<Constructor> {
        self.constructors.get(&kind.as_str().to_lowercase()).cloned()
    }
}

impl std::fmt::Debug for KindRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.constructors.keys().collect();
        kinds.sort();
        f.debug_struct("KindRegistry").field("kinds", &kinds).finish()
    }
}
