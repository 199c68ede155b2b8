//! Declarative description of a form, as supplied by the embedding
//! application or drawn by a remote server.

use crate::error::{FormError, FormResult};
use crate::kind::ControlKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormDef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub controls: Vec<ControlDef>,
    #[serde(default)]
    pub buttons: Vec<ButtonDef>,
}

impl FormDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            title: None,
            controls: Vec::new(),
            buttons: Vec::new(),
        }
    }

    pub fn with_control(mut self, control: ControlDef) -> Self {
        self.controls.push(control);
        self
    }

    pub fn with_button(mut self, button: ButtonDef) -> Self {
        self.buttons.push(button);
        self
    }

    pub fn from_json(json: &str) -> FormResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Checks every required field of the whole tree, so that a broken
    /// structure is rejected before anything is mounted.
    pub fn validate(&self) -> FormResult<()> {
        if self.name.as_deref().is_none_or(str::is_empty) {
            return Err(FormError::InvalidStructure("form name is null".to_string()));
        }
        validate_controls(&self.controls)?;
        for button in &self.buttons {
            button.require_name()?;
        }
        Ok(())
    }

    pub fn require_name(&self) -> FormResult<&str> {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| FormError::InvalidStructure("form name is null".to_string()))
    }

    /// Visits every control definition depth-first, parents before children.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a ControlDef)) {
        fn walk_list<'a>(list: &'a [ControlDef], visit: &mut impl FnMut(&'a ControlDef)) {
            for def in list {
                visit(def);
                walk_list(&def.controls, visit);
            }
        }
        walk_list(&self.controls, visit);
    }
}

fn validate_controls(controls: &[ControlDef]) -> FormResult<()> {
    for control in controls {
        control.require_name()?;
        validate_controls(&control.controls)?;
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlDef {
    pub kind: ControlKind,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
    #[serde(default)]
    pub visible: Option<bool>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,

    // Input fields
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub maxlen: Option<u32>,
    #[serde(default)]
    pub memory: Vec<String>,
    #[serde(default)]
    pub label: Option<FieldLabel>,
    #[serde(default)]
    pub button: Option<AuxButtonDef>,

    // Value fields; their shape depends on the kind
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub minimum: Option<Value>,
    #[serde(default)]
    pub maximum: Option<Value>,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub checked: Option<bool>,
    #[serde(default)]
    pub hours: Option<i64>,
    #[serde(default)]
    pub minutes: Option<i64>,

    // NameValue
    #[serde(default)]
    pub items: Vec<NameValueItem>,

    // ListView
    #[serde(default)]
    pub checkable: Option<bool>,
    #[serde(default)]
    pub columns: Vec<ColumnDef>,
    #[serde(default)]
    pub rows: Vec<RowDef>,
    #[serde(default)]
    pub buttons: Vec<ListButtonDef>,

    // Timer
    #[serde(default)]
    pub interval: Option<u64>,

    // FileLoad
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub field: Option<String>,

    // GroupBox / Panel
    #[serde(default)]
    pub controls: Vec<ControlDef>,

    /// Fields not known here, kept for extension kinds.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ControlDef {
    pub fn new(kind: ControlKind, name: impl Into<String>) -> Self {
        let mut def = Self::unnamed(kind);
        def.name = Some(name.into());
        def
    }

    pub fn unnamed(kind: ControlKind) -> Self {
        Self {
            kind,
            name: None,
            caption: None,
            hint: None,
            visible: None,
            enabled: None,
            width: None,
            height: None,
            text: None,
            maxlen: None,
            memory: Vec::new(),
            label: None,
            button: None,
            value: None,
            minimum: None,
            maximum: None,
            values: Vec::new(),
            checked: None,
            hours: None,
            minutes: None,
            items: Vec::new(),
            checkable: None,
            columns: Vec::new(),
            rows: Vec::new(),
            buttons: Vec::new(),
            interval: None,
            action: None,
            field: None,
            controls: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn require_name(&self) -> FormResult<&str> {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| FormError::missing_name(self.kind.as_str()))
    }

    pub fn with_child(mut self, child: ControlDef) -> Self {
        self.controls.push(child);
        self
    }

    pub fn value_f64(&self) -> Option<f64> {
        self.value.as_ref().and_then(Value::as_f64)
    }
}

/// Caption shown to the left of an input field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldLabel {
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
}

/// Auxiliary button to the right of an input field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuxButtonDef {
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub width: Option<u32>,
}

/// Command-bar button of a form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ButtonDef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

impl ButtonDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn require_name(&self) -> FormResult<&str> {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| FormError::missing_name("button"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameValueItem {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowDef {
    #[serde(default)]
    pub checked: Option<bool>,
    #[serde(default)]
    pub data: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListButtonDef {
    pub name: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
}
