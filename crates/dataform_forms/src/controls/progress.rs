use crate::control::{Control, ControlBase, number_value};
use crate::error::FormResult;
use crate::registry::BuildContext;
use crate::structure::ControlDef;
use crate::surface::Part;
use serde_json::Value;

/// Progress bar with a status line.
#[derive(Debug)]
pub struct Progress {
    base: ControlBase,
    percent: f64,
    status: String,
}

impl Progress {
    pub fn new(ctx: &mut BuildContext<'_>, def: &ControlDef) -> FormResult<Self> {
        let base = ControlBase::new(ctx.scope(), def)?;
        let mut progress = Self {
            status: base.scope().localization().progress_wait.to_string(),
            base,
            percent: 0.0,
        };
        progress.set_percent(def.value_f64().unwrap_or(0.0));
        let status = progress.status.clone();
        progress.set_status(status);
        Ok(progress)
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }

    /// Sets the completed share, clamped to `[0, 100]`.
    pub fn set_percent(&mut self, percent: f64) {
        self.percent = if percent.is_nan() { 0.0 } else { percent.clamp(0.0, 100.0) };
        self.base.render(Part::Percent, number_value(self.percent));
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
        self.base.render(Part::Status, Value::String(self.status.clone()));
    }
}

impl Control for Progress {
    fn base(&self) -> &ControlBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ControlBase {
        &mut self.base
    }
}
