use dataform_forms::{ElementId, FormDef, Localization, Part, Surface, Transition};
use serde_json::Value;
use tracing::debug;

/// Surface that only logs what a renderer would have been asked to do.
#[derive(Debug, Default)]
pub struct TracingSurface;

impl Surface for TracingSurface {
    fn mount(&self, form: &FormDef, localization: &Localization) {
        debug!(form = ?form.name, language = ?localization.language, controls = form.controls.len(), "mount");
    }

    fn clear(&self) {
        debug!("clear");
    }

    fn set_display(&self, element: &ElementId, visible: bool, transition: Transition) {
        debug!(%element, visible, ?transition, "display");
    }

    fn set_error_display(&self, element: &ElementId, visible: bool) {
        debug!(%element, visible, "error display");
    }

    fn show_error(&self, element: &ElementId, message: &str) {
        debug!(%element, text = message, "error");
    }

    fn clear_errors(&self, form: &str) {
        debug!(form, "clear errors");
    }

    fn set_disabled(&self, element: &ElementId, part: Part, disabled: bool) {
        debug!(%element, ?part, disabled, "disabled");
    }

    fn focus(&self, element: &ElementId) {
        debug!(%element, "focus");
    }

    fn update(&self, element: &ElementId, part: Part, value: &Value) {
        debug!(%element, ?part, %value, "update");
    }
}
