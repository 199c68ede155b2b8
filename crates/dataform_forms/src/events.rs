use crate::form::FormContext;
use crate::timer::TimerHandle;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::rc::Rc;

/// What happened to a control (or command-bar button) during an interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// Command-bar button pressed; the target is the button name.
    ButtonClick,
    /// Auxiliary button next to a field pressed.
    AuxButtonClick,
    CheckChanged { checked: bool },
    SelectionChanged { index: i64 },
    DateChanged { date: Option<NaiveDate> },
    TimeChanged { hours: u32, minutes: u32 },
    RowSelected { index: usize },
    RowChecked { index: usize, checked: bool },
    ListButtonClick { button: String },
}

impl EventKind {
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::ButtonClick => "ButtonClick",
            EventKind::AuxButtonClick => "AuxButtonClick",
            EventKind::CheckChanged { .. } => "CheckChanged",
            EventKind::SelectionChanged { .. } => "SelectionChanged",
            EventKind::DateChanged { .. } => "DateChanged",
            EventKind::TimeChanged { .. } => "TimeChanged",
            EventKind::RowSelected { .. } => "RowSelected",
            EventKind::RowChecked { .. } => "RowChecked",
            EventKind::ListButtonClick { .. } => "ListButtonClick",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormEvent {
    pub target: String,
    pub kind: EventKind,
}

impl FormEvent {
    pub fn is_button_click(&self) -> bool {
        self.kind == EventKind::ButtonClick
    }
}

pub type EventHandler = Rc<dyn Fn(&FormContext, &FormEvent)>;
pub type TickHandler = Rc<dyn Fn(&TimerHandle, &FormContext)>;

/// User callbacks attached to a form by control or button name.
#[derive(Clone, Default)]
pub struct Handlers {
    controls: HashMap<String, EventHandler>,
    buttons: HashMap<String, EventHandler>,
    ticks: HashMap<String, TickHandler>,
}

impl Handlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_control(
        mut self,
        name: impl Into<String>,
        handler: impl Fn(&FormContext, &FormEvent) + 'static,
    ) -> Self {
        self.controls.insert(name.into(), Rc::new(handler));
        self
    }

    pub fn on_button(
        mut self,
        name: impl Into<String>,
        handler: impl Fn(&FormContext, &FormEvent) + 'static,
    ) -> Self {
        self.buttons.insert(name.into(), Rc::new(handler));
        self
    }

    pub fn on_tick(
        mut self,
        name: impl Into<String>,
        handler: impl Fn(&TimerHandle, &FormContext) + 'static,
    ) -> Self {
        self.ticks.insert(name.into(), Rc::new(handler));
        self
    }

    pub fn tick(&self, name: &str) -> Option<TickHandler> {
        self.ticks.get(name).cloned()
    }

    /// Handler an event is delivered to, looked up by its target name.
    pub fn for_event(&self, event: &FormEvent) -> Option<EventHandler> {
        let table = if event.is_button_click() {
            &self.buttons
        } else {
            &self.controls
        };
        table.get(&event.target).cloned()
    }
}

impl std::fmt::Debug for Handlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handlers")
            .field("controls", &self.controls.keys().collect::<Vec<_>>())
            .field("buttons", &self.buttons.keys().collect::<Vec<_>>())
            .field("ticks", &self.ticks.keys().collect::<Vec<_>>())
            .finish()
    }
}
