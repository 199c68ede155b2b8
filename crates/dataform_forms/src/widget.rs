use crate::container::Container;
use crate::control::Control;
use crate::controls::{
    CheckBox, ComboBox, DateField, FileLoad, Label, Line, ListView, NameValue, NumberBox, Progress,
    SmartTextBox, TextBox, TimeField,
};
use crate::kind::ControlKind;
use crate::timer::Timer;
use serde_json::Value;

/// A control of the form tree, tagged by its concrete kind.
#[derive(Debug)]
pub enum Widget {
    Label(Label),
    Line(Line),
    TextBox(TextBox),
    SmartTextBox(SmartTextBox),
    Number(NumberBox),
    ComboBox(ComboBox),
    CheckBox(CheckBox),
    NameValue(NameValue),
    ListView(ListView),
    Progress(Progress),
    Timer(Timer),
    Date(DateField),
    Time(TimeField),
    FileLoad(FileLoad),
    GroupBox(Container),
    Panel(Container),
    Extension(Box<dyn ExtensionControl>),
}

/// Control provided by an extension kind.
pub trait ExtensionControl: Control + std::fmt::Debug {
    fn as_control(&self) -> &dyn Control;
    fn as_control_mut(&mut self) -> &mut dyn Control;
}

impl<T: Control + std::fmt::Debug> ExtensionControl for T {
    fn as_control(&self) -> &dyn Control {
        self
    }

    fn as_control_mut(&mut self) -> &mut dyn Control {
        self
    }
}

impl Widget {
    pub fn control(&self) -> &dyn Control {
        match self {
            Widget::Label(c) => c,
            Widget::Line(c) => c,
            Widget::TextBox(c) => c,
            Widget::SmartTextBox(c) => c,
            Widget::Number(c) => c,
            Widget::ComboBox(c) => c,
            Widget::CheckBox(c) => c,
            Widget::NameValue(c) => c,
            Widget::ListView(c) => c,
            Widget::Progress(c) => c,
            Widget::Timer(c) => c,
            Widget::Date(c) => c,
            Widget::Time(c) => c,
            Widget::FileLoad(c) => c,
            Widget::GroupBox(c) | Widget::Panel(c) => c,
            Widget::Extension(c) => c.as_control(),
        }
    }

    pub fn control_mut(&mut self) -> &mut dyn Control {
        match self {
            Widget::Label(c) => c,
            Widget::Line(c) => c,
            Widget::TextBox(c) => c,
            Widget::SmartTextBox(c) => c,
            Widget::Number(c) => c,
            Widget::ComboBox(c) => c,
            Widget::CheckBox(c) => c,
            Widget::NameValue(c) => c,
            Widget::ListView(c) => c,
            Widget::Progress(c) => c,
            Widget::Timer(c) => c,
            Widget::Date(c) => c,
            Widget::Time(c) => c,
            Widget::FileLoad(c) => c,
            Widget::GroupBox(c) | Widget::Panel(c) => c,
            Widget::Extension(c) => c.as_control_mut(),
        }
    }

    pub fn name(&self) -> &str {
        self.control().name()
    }

    pub fn kind(&self) -> &ControlKind {
        self.control().kind()
    }

    pub fn visible(&self) -> bool {
        self.control().visible()
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.control_mut().set_visible(visible);
    }

    pub fn enabled(&self) -> bool {
        self.control().enabled()
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.control_mut().set_enabled(enabled);
    }

    pub fn error(&mut self, message: Option<&str>) {
        self.control_mut().error(message);
    }

    pub fn json(&self) -> Value {
        self.control().json()
    }

    pub fn as_container(&self) -> Option<&Container> {
        match self {
            Widget::GroupBox(c) | Widget::Panel(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_container_mut(&mut self) -> Option<&mut Container> {
        match self {
            Widget::GroupBox(c) | Widget::Panel(c) => Some(c),
            _ => None,
        }
    }
}
