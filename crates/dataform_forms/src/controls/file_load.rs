//! File upload field with a simulated progress indicator.
//!
//! The transfer itself belongs to the embedding application. While it runs
//! the indicator creeps towards 100% with an ever smaller step, and the
//! application reports the server answer through `finish_upload`.

use crate::control::{Control, ControlBase, FormScope, HasButton, input_set_enabled, number_value};
use crate::error::FormResult;
use crate::events::EventKind;
use crate::registry::BuildContext;
use crate::structure::ControlDef;
use crate::surface::{ElementId, Part};
use crate::timer::{Repeat, TimerHandle};
use serde_json::{Value, json};
use std::cell::Cell;
use std::rc::{Rc, Weak};
use std::time::Duration;

pub const TICK_INTERVAL: Duration = Duration::from_millis(10);
const INITIAL_STEP: f64 = 0.4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Answer `1-<message>`.
    Accepted(String),
    /// Answer `0-<message>`.
    Rejected(String),
    /// Any other answer, or a failed transfer.
    Failed,
}

impl UploadOutcome {
    pub fn from_answer(answer: &str) -> Self {
        if let Some(message) = answer.strip_prefix("1-") {
            UploadOutcome::Accepted(message.to_string())
        } else if let Some(message) = answer.strip_prefix("0-") {
            UploadOutcome::Rejected(message.to_string())
        } else {
            UploadOutcome::Failed
        }
    }
}

#[derive(Debug, Default)]
struct Indicator {
    percent: Cell<f64>,
    step: Cell<f64>,
}

impl Indicator {
    fn reset(&self) {
        self.percent.set(0.0);
        self.step.set(INITIAL_STEP);
    }

    fn advance(&self) -> f64 {
        let percent = self.percent.get();
        let mut step = self.step.get();
        if step / 0.8 >= (100.0 - percent) / 100.0 {
            step /= 2.0;
            self.step.set(step);
        }
        self.percent.set(percent + step);
        percent + step
    }
}

#[derive(Debug)]
pub struct FileLoad {
    base: ControlBase,
    action: Option<String>,
    field: Option<String>,
    file: Option<String>,
    button_enabled: bool,
    status: String,
    status_error: bool,
    indicator: Rc<Indicator>,
    ticker: TimerHandle,
}

impl FileLoad {
    pub fn new(ctx: &mut BuildContext<'_>, def: &ControlDef) -> FormResult<Self> {
        let base = ControlBase::new(ctx.scope(), def)?;
        let ticker = TimerHandle::new(
            format!("{}.upload", base.name()),
            ctx.scope().scheduler(),
            TICK_INTERVAL,
            Repeat::AfterCallback,
        );
        ctx.register_timer(ticker.clone());
        let mut control = Self {
            base,
            action: def.action.clone(),
            field: def.field.clone(),
            file: None,
            button_enabled: true,
            status: String::new(),
            status_error: false,
            indicator: Rc::new(Indicator::default()),
            ticker,
        };
        control.set_button_enabled(false);
        Ok(control)
    }

    /// Upload target of the transfer.
    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    pub fn percent(&self) -> f64 {
        self.indicator.percent.get()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn status_is_error(&self) -> bool {
        self.status_error
    }

    pub fn is_uploading(&self) -> bool {
        self.ticker.is_running()
    }

    /// User choice in the file dialog; an empty name clears the choice.
    pub fn choose_file(&mut self, name: &str) {
        if !self.base.enabled() {
            return;
        }
        self.file = Some(name.to_string()).filter(|n| !n.is_empty());
        self.set_button_enabled(self.file.is_some());
    }

    /// User click on the upload button: starts the progress indicator and
    /// reports the click so the application can send the file.
    pub fn begin_upload(&mut self) -> bool {
        if !self.base.enabled() || !self.button_enabled || self.file.is_none() {
            return false;
        }
        self.indicator.reset();
        self.set_status(String::new(), false);
        self.render_percent(0.0);

        let indicator = self.indicator.clone();
        let scope: Weak<FormScope> = Rc::downgrade(self.base.scope());
        let id = self.base.id().clone();
        self.ticker.start(move |_| {
            let percent = indicator.advance();
            if let Some(scope) = scope.upgrade() {
                render_percent(&scope, &id, percent);
            }
        });
        self.base.raise(EventKind::AuxButtonClick);
        true
    }

    /// Stops the indicator and shows the server answer.
    pub fn finish_upload(&mut self, answer: &str) -> UploadOutcome {
        self.ticker.stop();
        let outcome = UploadOutcome::from_answer(answer);
        let fatal = self.base.scope().localization().file_fatal_error;
        match &outcome {
            UploadOutcome::Accepted(message) => {
                self.set_status(message.clone(), false);
                self.set_percent(100.0);
            }
            UploadOutcome::Rejected(message) => {
                self.set_status(message.clone(), true);
                self.set_percent(0.0);
            }
            UploadOutcome::Failed => {
                self.set_status(fatal.to_string(), true);
                self.set_percent(0.0);
            }
        }
        outcome
    }

    /// The transfer itself failed.
    pub fn fail_upload(&mut self) {
        self.ticker.stop();
        let fatal = self.base.scope().localization().file_fatal_error;
        self.set_percent(0.0);
        self.set_status(fatal.to_string(), true);
    }

    fn set_percent(&mut self, percent: f64) {
        self.indicator.percent.set(percent);
        self.render_percent(percent);
    }

    fn render_percent(&self, percent: f64) {
        render_percent(self.base.scope(), self.base.id(), percent);
    }

    fn set_status(&mut self, status: String, error: bool) {
        self.status = status;
        self.status_error = error;
        self.base
            .render(Part::Status, json!({ "text": self.status, "error": error }));
    }
}

fn render_percent(scope: &FormScope, id: &ElementId, percent: f64) {
    scope.surface().update(id, Part::Percent, &number_value(percent));
}

impl Control for FileLoad {
    fn base(&self) -> &ControlBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ControlBase {
        &mut self.base
    }

    fn set_enabled(&mut self, enabled: bool) {
        input_set_enabled(&mut self.base, enabled);
        if self.file.is_some() {
            self.set_button_enabled(enabled);
        }
    }

    fn json(&self) -> Value {
        json!({ "file": self.file })
    }

    fn button_host(&mut self) -> Option<&mut dyn HasButton> {
        Some(self)
    }
}

impl HasButton for FileLoad {
    fn button_enabled(&self) -> bool {
        self.button_enabled
    }

    fn set_button_enabled(&mut self, enabled: bool) {
        if enabled == self.button_enabled {
            return;
        }
        self.button_enabled = enabled;
        self.base
            .surface()
            .set_disabled(self.base.id(), Part::AuxButton, !enabled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answers_are_classified_by_prefix() {
        assert_eq!(
            UploadOutcome::from_answer("1-stored"),
            UploadOutcome::Accepted("stored".to_string())
        );
        assert_eq!(
            UploadOutcome::from_answer("0-too large"),
            UploadOutcome::Rejected("too large".to_string())
        );
        assert_eq!(UploadOutcome::from_answer("<html>"), UploadOutcome::Failed);
    }

    #[test]
    fn indicator_never_reaches_full() {
        let indicator = Indicator::default();
        indicator.reset();
        let mut last = 0.0;
        for _ in 0..1_000 {
            let percent = indicator.advance();
            assert!(percent > last);
            last = percent;
        }
        assert!(last < 100.0);
    }
}
