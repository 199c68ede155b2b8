use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Kind selector of a control, as written in the `kind` field of a structure.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ControlKind {
    Label,
    TextBox,
    SmartTextBox,
    Number,
    ComboBox,
    CheckBox,
    GroupBox,
    Panel,
    NameValue,
    ListView,
    Progress,
    Line,
    Timer,
    Date,
    Time,
    FileLoad,
    // Kind supplied by a registered extension
    Custom(String),
}

impl ControlKind {
    /// Parse a kind name (case-insensitive) into a ControlKind variant.
    pub fn from_name(name: &str) -> ControlKind {
        match name.to_lowercase().as_str() {
            "label" => ControlKind::Label,
            "textbox" => ControlKind::TextBox,
            "stextbox" => ControlKind::SmartTextBox,
            "number" => ControlKind::Number,
            "combobox" => ControlKind::ComboBox,
            "checkbox" => ControlKind::CheckBox,
            "groupbox" => ControlKind::GroupBox,
            "panel" => ControlKind::Panel,
            "namevalue" => ControlKind::NameValue,
            "listview" => ControlKind::ListView,
            "progress" => ControlKind::Progress,
            "line" => ControlKind::Line,
            "timer" => ControlKind::Timer,
            "date" => ControlKind::Date,
            "time" => ControlKind::Time,
            "fileload" => ControlKind::FileLoad,
            _ => ControlKind::Custom(name.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ControlKind::Label => "label",
            ControlKind::TextBox => "textbox",
            ControlKind::SmartTextBox => "stextbox",
            ControlKind::Number => "number",
            ControlKind::ComboBox => "combobox",
            ControlKind::CheckBox => "checkbox",
            ControlKind::GroupBox => "groupbox",
            ControlKind::Panel => "panel",
            ControlKind::NameValue => "namevalue",
            ControlKind::ListView => "listview",
            ControlKind::Progress => "progress",
            ControlKind::Line => "line",
            ControlKind::Timer => "timer",
            ControlKind::Date => "date",
            ControlKind::Time => "time",
            ControlKind::FileLoad => "fileload",
            ControlKind::Custom(s) => s.as_str(),
        }
    }

    /// Containers own child controls and cascade their enabled state.
    pub fn is_container(&self) -> bool {
        matches!(self, ControlKind::GroupBox | ControlKind::Panel)
    }

    /// List- and line-like controls are shown and hidden without the eased transition.
    pub fn animates_visibility(&self) -> bool {
        !matches!(self, ControlKind::ListView | ControlKind::Line)
    }
}

impl Serialize for ControlKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ControlKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(ControlKind::from_name(&name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_the_enum() {
        assert_eq!(ControlKind::from_name("STextBox"), ControlKind::SmartTextBox);
        assert_eq!(ControlKind::from_name("groupbox").as_str(), "groupbox");
        assert_eq!(
            ControlKind::from_name("rating"),
            ControlKind::Custom("rating".to_string())
        );
    }

    #[test]
    fn only_list_and_line_skip_the_transition() {
        assert!(!ControlKind::ListView.animates_visibility());
        assert!(!ControlKind::Line.animates_visibility());
        assert!(ControlKind::TextBox.animates_visibility());
    }
}
