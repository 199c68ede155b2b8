use crate::control::{Control, ControlBase, input_set_enabled};
use crate::error::FormResult;
use crate::events::EventKind;
use crate::registry::BuildContext;
use crate::structure::{ColumnDef, ControlDef, ListButtonDef, RowDef};
use crate::surface::Part;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    #[serde(default)]
    pub checked: Option<bool>,
    #[serde(default)]
    pub data: Vec<String>,
}

impl From<&RowDef> for Row {
    fn from(def: &RowDef) -> Self {
        Row {
            checked: def.checked,
            data: def.data.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListButton {
    pub name: String,
    pub caption: Option<String>,
    pub hint: Option<String>,
    pub enabled: bool,
}

impl From<&ListButtonDef> for ListButton {
    fn from(def: &ListButtonDef) -> Self {
        ListButton {
            name: def.name.clone(),
            caption: def.caption.clone(),
            hint: def.hint.clone(),
            enabled: def.enabled.unwrap_or(true),
        }
    }
}

/// Table of rows with optional per-row check boxes and a bar of named
/// action buttons.
#[derive(Debug)]
pub struct ListView {
    base: ControlBase,
    columns: Vec<ColumnDef>,
    checkable: bool,
    rows: Vec<Row>,
    selected: Option<usize>,
    buttons: Vec<ListButton>,
}

impl ListView {
    pub fn new(ctx: &mut BuildContext<'_>, def: &ControlDef) -> FormResult<Self> {
        Ok(Self {
            base: ControlBase::new(ctx.scope(), def)?,
            columns: def.columns.clone(),
            checkable: def.checkable.unwrap_or(false),
            rows: def.rows.iter().map(Row::from).collect(),
            selected: None,
            buttons: def.buttons.iter().map(ListButton::from).collect(),
        })
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn is_checkable(&self) -> bool {
        self.checkable
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn buttons(&self) -> &[ListButton] {
        &self.buttons
    }

    /// Rendered id of one of the action buttons.
    pub fn button_id(&self, button: &str) -> String {
        format!("{}_{}", self.base.name(), button)
    }

    /// Appends rows at the end of the table.
    pub fn insert(&mut self, rows: impl IntoIterator<Item = Row>) {
        self.rows.extend(rows);
        self.render_rows();
    }

    /// Removes the row at `index`; the selection follows the remaining rows.
    pub fn delete(&mut self, index: usize) -> Option<Row> {
        if index >= self.rows.len() {
            return None;
        }
        let row = self.rows.remove(index);
        self.selected = match self.selected {
            Some(s) if s == index => None,
            Some(s) if s > index => Some(s - 1),
            other => other,
        };
        self.render_rows();
        Some(row)
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.selected = None;
        self.render_rows();
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Moves the selection. Returns false when `index` names no row.
    pub fn set_selected(&mut self, index: Option<usize>) -> bool {
        if index.is_some_and(|i| i >= self.rows.len()) {
            return false;
        }
        if index != self.selected {
            self.selected = index;
            self.base.render(Part::Input, json!({ "selected": index }));
        }
        true
    }

    /// Availability of an action button; `None` when there is no such button.
    pub fn button_enabled(&self, name: &str) -> Option<bool> {
        self.buttons.iter().find(|b| b.name == name).map(|b| b.enabled)
    }

    pub fn set_button_enabled(&mut self, name: &str, enabled: bool) -> bool {
        let Some(button) = self.buttons.iter_mut().find(|b| b.name == name) else {
            return false;
        };
        button.enabled = enabled;
        self.base.surface().set_disabled(
            self.base.id(),
            Part::ListButton(self.button_id(name)),
            !enabled,
        );
        true
    }

    /// User click on a row. Clicking the selected row again does nothing.
    pub fn click_row(&mut self, index: usize) {
        if !self.base.enabled() || index >= self.rows.len() || self.selected == Some(index) {
            return;
        }
        self.set_selected(Some(index));
        self.base.raise(EventKind::RowSelected { index });
    }

    /// User click on a row's check box.
    pub fn check_row(&mut self, index: usize, checked: bool) {
        if !self.base.enabled() || !self.checkable {
            return;
        }
        let Some(row) = self.rows.get_mut(index) else {
            return;
        };
        row.checked = Some(checked);
        self.base.raise(EventKind::RowChecked { index, checked });
    }

    /// User click on an action button.
    pub fn click_button(&mut self, name: &str) {
        if !self.base.enabled() || self.button_enabled(name) != Some(true) {
            return;
        }
        self.base.raise(EventKind::ListButtonClick {
            button: name.to_string(),
        });
    }

    fn render_rows(&self) {
        let rows = serde_json::to_value(&self.rows).unwrap_or(Value::Null);
        self.base
            .render(Part::Input, json!({ "rows": rows, "selected": self.selected }));
    }
}

impl Control for ListView {
    fn base(&self) -> &ControlBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ControlBase {
        &mut self.base
    }

    fn set_enabled(&mut self, enabled: bool) {
        // Row check boxes follow the table
        input_set_enabled(&mut self.base, enabled);
    }
}
