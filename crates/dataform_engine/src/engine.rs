//! Session engine: applies server commands to the current form and posts
//! user interactions back, while a heartbeat watches the server.
//!
//! The engine never holds a borrow of its session or form while calling
//! into the host, so a host may answer a posted event by executing the
//! next batch right away.

use crate::config::EngineConfig;
use crate::error::{CommandError, CommandResult};
use crate::event::{ControlValue, Event, EventBody};
use crate::protocol::{Command, decode_batch};
use dataform_forms::{
    ControlKind, EventKind, Form, FormBuilder, FormDef, FormEvent, FormHandle, Handlers,
    KindRegistry, ListView, Localization, NullSurface, Repeat, Scheduler, Surface, TaskId,
    TimerHandle, Widget,
};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// The embedding application's side of a session.
pub trait EngineHost {
    /// Delivers one event to the server.
    fn post(&self, event: &Event);

    /// The session was closed by the server or by the hold watchdog.
    fn session_ended(&self, _error: Option<&str>, _success: Option<&str>) {}

    /// A new form was drawn; `title` comes from its structure.
    fn form_drawn(&self, _title: Option<&str>) {}
}

struct Session {
    closed: bool,
    form: Option<FormHandle>,
    form_name: Option<String>,
    last_hold: Duration,
    hold_reply: Option<TaskId>,
}

struct Shared {
    id: Uuid,
    config: EngineConfig,
    scheduler: Scheduler,
    surface: Rc<dyn Surface>,
    registry: KindRegistry,
    host: Rc<dyn EngineHost>,
    watchdog: TimerHandle,
    session: RefCell<Session>,
}

pub struct EngineBuilder {
    host: Rc<dyn EngineHost>,
    config: EngineConfig,
    scheduler: Scheduler,
    surface: Rc<dyn Surface>,
    registry: KindRegistry,
}

impl EngineBuilder {
    pub fn new(host: Rc<dyn EngineHost>) -> Self {
        Self {
            host,
            config: EngineConfig::default(),
            scheduler: Scheduler::new(),
            surface: Rc::new(NullSurface),
            registry: KindRegistry::standard(),
        }
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn scheduler(mut self, scheduler: Scheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn surface(mut self, surface: Rc<dyn Surface>) -> Self {
        self.surface = surface;
        self
    }

    pub fn registry(mut self, registry: KindRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Opens the session: runs the initial batch, greets the server with a
    /// HOLD and starts watching for its heartbeat.
    pub fn start(self, initial: &str) -> Engine {
        let watchdog = TimerHandle::new(
            "hold-watchdog",
            &self.scheduler,
            self.config.hold_check_interval(),
            Repeat::FixedRate,
        );
        let shared = Rc::new(Shared {
            id: Uuid::new_v4(),
            session: RefCell::new(Session {
                closed: false,
                form: None,
                form_name: None,
                last_hold: self.scheduler.now(),
                hold_reply: None,
            }),
            config: self.config,
            scheduler: self.scheduler,
            surface: self.surface,
            registry: self.registry,
            host: self.host,
            watchdog,
        });
        info!(session = %shared.id, "session opened");

        let engine = Engine { shared };
        engine.execute(initial);
        engine.shared.emit(EventBody::Hold);

        let shared = &engine.shared;
        let closed = {
            let mut session = shared.session.borrow_mut();
            session.last_hold = shared.scheduler.now();
            session.closed
        };
        if !closed {
            let weak = Rc::downgrade(shared);
            shared.watchdog.start(move |_| {
                if let Some(shared) = weak.upgrade() {
                    shared.check_hold();
                }
            });
        }
        engine
    }
}

/// Handle of one protocol session.
#[derive(Clone)]
pub struct Engine {
    shared: Rc<Shared>,
}

impl Engine {
    pub fn builder(host: Rc<dyn EngineHost>) -> EngineBuilder {
        EngineBuilder::new(host)
    }

    pub fn session_id(&self) -> Uuid {
        self.shared.id
    }

    pub fn config(&self) -> &EngineConfig {
        &self.shared.config
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.shared.scheduler
    }

    pub fn is_closed(&self) -> bool {
        self.shared.session.borrow().closed
    }

    /// The form currently drawn, for driving user interaction.
    pub fn form(&self) -> Option<FormHandle> {
        self.shared.session.borrow().form.clone()
    }

    /// Runs a JSON batch of commands in order. Commands that cannot be
    /// decoded or applied are logged and skipped.
    pub fn execute(&self, batch: &str) {
        let commands = match decode_batch(batch) {
            Ok(commands) => commands,
            Err(err) => {
                warn!(session = %self.shared.id, error = %err, "dropping command batch");
                return;
            }
        };
        for command in commands {
            match command {
                Ok(command) => self.run(command),
                Err(err) => {
                    warn!(session = %self.shared.id, error = %err, "skipping undecodable command")
                }
            }
        }
    }

    /// Applies one decoded command, swallowing its failure.
    pub fn run(&self, command: Command) {
        let code = command.code();
        debug!(session = %self.shared.id, code, "applying command");
        if let Err(err) = self.shared.apply(command) {
            warn!(session = %self.shared.id, code, error = %err, "command failed");
        }
    }

    /// Applies one decoded command and reports its failure.
    pub fn apply(&self, command: Command) -> CommandResult<()> {
        self.shared.apply(command)
    }

    /// Stops both heartbeat timers and the current form's timers, and closes
    /// the session without notifying the host.
    pub fn destroy(&self) {
        let shared = &self.shared;
        let (form, hold_reply) = {
            let mut session = shared.session.borrow_mut();
            session.closed = true;
            (session.form.take(), session.hold_reply.take())
        };
        shared.watchdog.stop();
        if let Some(id) = hold_reply {
            shared.scheduler.cancel(id);
        }
        if let Some(form) = form {
            form.destroy();
        }
        info!(session = %shared.id, "session destroyed");
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.shared.session.borrow();
        f.debug_struct("Engine")
            .field("session", &self.shared.id)
            .field("closed", &session.closed)
            .field("form", &session.form_name)
            .finish()
    }
}

impl Shared {
    fn localization(&self) -> &'static Localization {
        Localization::for_language(self.config.language)
    }

    fn apply(self: &Rc<Self>, command: Command) -> CommandResult<()> {
        match command {
            Command::Hold => {
                self.schedule_hold_reply();
                Ok(())
            }
            Command::Close { error, success } => {
                self.close(error, success);
                Ok(())
            }
            Command::FormDraw(def) => self.draw(*def),
            Command::FormValues { controls } => {
                let form = self.current_form()?;
                let values = {
                    let form = form.borrow();
                    controls
                        .iter()
                        .filter_map(|name| {
                            form.control(name).map(|widget| ControlValue {
                                name: name.clone(),
                                value: widget.json(),
                            })
                        })
                        .collect()
                };
                self.emit(EventBody::FormValues { controls: values });
                Ok(())
            }
            Command::ControlVisible { name, visible } => self.with_control(&name, |widget| {
                widget.set_visible(visible);
                Ok(())
            }),
            Command::ControlEnabled { name, enabled } => self.with_control(&name, |widget| {
                widget.set_enabled(enabled);
                Ok(())
            }),
            Command::ControlError { name, error } => self.with_control(&name, |widget| {
                widget.error(error.as_deref());
                Ok(())
            }),
            Command::ComboOptions { name, options } => self.with_control(&name, |widget| match widget {
                Widget::ComboBox(combo) => {
                    combo.set_options(options);
                    Ok(())
                }
                _ => Err(wrong_kind(&name, "combobox")),
            }),
            Command::ListDelete { name, index } => self.with_list(&name, |list| {
                usize::try_from(index)
                    .ok()
                    .and_then(|i| list.delete(i))
                    .map(|_| ())
                    .ok_or_else(|| CommandError::IndexOutOfRange { name: name.clone(), index })
            }),
            Command::ListClear { name } => self.with_list(&name, |list| {
                list.clear();
                Ok(())
            }),
            Command::ListInsert { name, items } => self.with_list(&name, |list| {
                list.insert(items);
                Ok(())
            }),
            Command::ListGetSelected { name } => {
                let index = self.with_list(&name, |list| Ok(list.selected()))?;
                self.emit(EventBody::ListSelected { name, index });
                Ok(())
            }
            Command::ListSetSelected { name, index } => self.with_list(&name, |list| {
                let target = usize::try_from(index).ok();
                if list.set_selected(target) {
                    Ok(())
                } else {
                    Err(CommandError::IndexOutOfRange { name: name.clone(), index })
                }
            }),
            Command::ListButtonEnabled { name, button, enabled } => self.with_list(&name, |list| {
                if list.set_button_enabled(&button, enabled) {
                    Ok(())
                } else {
                    Err(CommandError::ButtonNotFound(format!("{}.{}", name, button)))
                }
            }),
            Command::TimerStart { name } => {
                let form = self.current_form()?;
                form.interact(|form| {
                    if form.start_timer(&name) {
                        Ok(())
                    } else {
                        Err(lookup_miss(form, &name, "timer"))
                    }
                })
            }
            Command::TimerStop { name } => {
                let form = self.current_form()?;
                form.interact(|form| {
                    if form.stop_timer(&name) {
                        Ok(())
                    } else {
                        Err(lookup_miss(form, &name, "timer"))
                    }
                })
            }
            Command::ProgressStatus { name, status } => self.with_control(&name, |widget| match widget {
                Widget::Progress(progress) => {
                    if let Some(status) = status {
                        progress.set_status(status);
                    }
                    Ok(())
                }
                _ => Err(wrong_kind(&name, "progress")),
            }),
            Command::ProgressPercent { name, percent } => self.with_control(&name, |widget| match widget {
                Widget::Progress(progress) => {
                    if let Some(percent) = percent {
                        progress.set_percent(percent);
                    }
                    Ok(())
                }
                _ => Err(wrong_kind(&name, "progress")),
            }),
            Command::ButtonEnabled { name, enabled } => {
                let form = self.current_form()?;
                form.interact(|form| match form.button_mut(&name) {
                    Some(button) => {
                        button.set_enabled(enabled);
                        Ok(())
                    }
                    None => Err(CommandError::ButtonNotFound(name.clone())),
                })
            }
        }
    }

    fn current_form(&self) -> CommandResult<FormHandle> {
        self.session.borrow().form.clone().ok_or(CommandError::NoForm)
    }

    fn with_control<R>(
        &self,
        name: &str,
        action: impl FnOnce(&mut Widget) -> CommandResult<R>,
    ) -> CommandResult<R> {
        let form = self.current_form()?;
        form.interact(|form| match form.control_mut(name) {
            Some(widget) => action(widget),
            None => Err(CommandError::ControlNotFound(name.to_string())),
        })
    }

    fn with_list<R>(
        &self,
        name: &str,
        action: impl FnOnce(&mut ListView) -> CommandResult<R>,
    ) -> CommandResult<R> {
        self.with_control(name, |widget| match widget {
            Widget::ListView(list) => action(list),
            _ => Err(wrong_kind(name, "listview")),
        })
    }

    fn draw(self: &Rc<Self>, def: FormDef) -> CommandResult<()> {
        let previous = {
            let mut session = self.session.borrow_mut();
            session.form_name = None;
            session.form.take()
        };
        if let Some(previous) = previous {
            previous.destroy();
        }

        let form = FormBuilder::new(&def)
            .surface(self.surface.clone())
            .language(self.config.language)
            .scheduler(self.scheduler.clone())
            .registry(&self.registry)
            .handlers(self.handlers_for(&def))
            .build()?;
        let name = form.borrow().name().to_string();
        {
            let mut session = self.session.borrow_mut();
            session.form = Some(form);
            session.form_name = Some(name.clone());
        }
        info!(session = %self.id, form = %name, "form drawn");
        self.host.form_drawn(def.title.as_deref());
        self.emit(EventBody::FormShow);
        Ok(())
    }

    /// Wires every control and button the protocol reports on to `emit`.
    fn handlers_for(self: &Rc<Self>, def: &FormDef) -> Handlers {
        let mut handlers = Handlers::new();
        for button in def.buttons.iter().filter_map(|b| b.name.clone()) {
            let weak = Rc::downgrade(self);
            handlers = handlers.on_button(button, move |_, event| {
                if let Some(shared) = weak.upgrade() {
                    shared.emit(EventBody::ButtonClick {
                        name: event.target.clone(),
                    });
                }
            });
        }

        let mut wired = Vec::new();
        def.walk(&mut |control| {
            if let Some(name) = &control.name {
                wired.push((name.clone(), control.kind.clone()));
            }
        });
        for (name, kind) in wired {
            let weak: Weak<Shared> = Rc::downgrade(self);
            handlers = match kind {
                ControlKind::Timer => handlers.on_tick(name, move |timer, _| match weak.upgrade() {
                    Some(shared) => shared.tick(timer),
                    None => timer.stop(),
                }),
                ControlKind::CheckBox | ControlKind::ComboBox | ControlKind::ListView => {
                    handlers.on_control(name, move |_, event| {
                        let Some(shared) = weak.upgrade() else {
                            return;
                        };
                        if let Some(body) = protocol_event(&kind, event) {
                            shared.emit(body);
                        }
                    })
                }
                _ => handlers,
            };
        }
        handlers
    }

    fn tick(&self, timer: &TimerHandle) {
        if self.session.borrow().closed {
            debug!(session = %self.id, timer = %timer.name(), "stopping timer of closed session");
            timer.stop();
            return;
        }
        self.emit(EventBody::TimerTick { name: timer.name() });
    }

    /// Posts an event unless the session is closed.
    fn emit(&self, body: EventBody) {
        let form = {
            let session = self.session.borrow();
            if session.closed {
                debug!(session = %self.id, code = body.code(), "discarding event of closed session");
                return;
            }
            session.form_name.clone()
        };
        let event = Event { form, body };
        debug!(session = %self.id, code = event.code(), "posting event");
        self.host.post(&event);
    }

    fn close(&self, error: Option<String>, success: Option<String>) {
        let hold_reply = {
            let mut session = self.session.borrow_mut();
            if session.closed {
                debug!(session = %self.id, "session already closed");
                return;
            }
            session.closed = true;
            session.hold_reply.take()
        };
        if let Some(id) = hold_reply {
            self.scheduler.cancel(id);
        }
        self.watchdog.stop();
        self.surface.clear();
        info!(session = %self.id, error = ?error, success = ?success, "session closed");
        self.host.session_ended(error.as_deref(), success.as_deref());
    }

    fn schedule_hold_reply(self: &Rc<Self>) {
        let weak = Rc::downgrade(self);
        let id = self.scheduler.schedule(self.config.hold_reply_delay(), move || {
            if let Some(shared) = weak.upgrade() {
                shared.answer_hold();
            }
        });
        let previous = self.session.borrow_mut().hold_reply.replace(id);
        if let Some(previous) = previous {
            self.scheduler.cancel(previous);
        }
    }

    fn answer_hold(&self) {
        let closed = {
            let mut session = self.session.borrow_mut();
            session.hold_reply = None;
            session.last_hold = self.scheduler.now();
            session.closed
        };
        if !closed {
            self.emit(EventBody::Hold);
        }
    }

    fn check_hold(&self) {
        let silence = {
            let session = self.session.borrow();
            self.scheduler.now().saturating_sub(session.last_hold)
        };
        if silence > self.config.hold_timeout() {
            info!(session = %self.id, silence_ms = silence.as_millis() as u64, "server stopped holding the session");
            self.close(Some(self.localization().hold_error.to_string()), None);
        }
    }
}

/// Protocol event a control interaction maps to, if any.
fn protocol_event(kind: &ControlKind, event: &FormEvent) -> Option<EventBody> {
    let name = event.target.clone();
    let body = match (kind, &event.kind) {
        (ControlKind::CheckBox, EventKind::CheckChanged { checked }) => {
            EventBody::CheckBoxCheck { name, checked: *checked }
        }
        (ControlKind::ComboBox, EventKind::SelectionChanged { index }) => {
            EventBody::ComboSelect { name, index: *index }
        }
        (ControlKind::ComboBox, EventKind::AuxButtonClick) => EventBody::ComboClick { name },
        (ControlKind::ListView, EventKind::RowSelected { index }) => EventBody::ListSelected {
            name,
            index: Some(*index),
        },
        (ControlKind::ListView, EventKind::RowChecked { index, checked }) => EventBody::ListCheck {
            name,
            index: *index,
            checked: *checked,
        },
        (ControlKind::ListView, EventKind::ListButtonClick { button }) => EventBody::ListClick {
            name,
            button: button.clone(),
        },
        _ => return None,
    };
    Some(body)
}

fn wrong_kind(name: &str, expected: &'static str) -> CommandError {
    CommandError::WrongKind {
        name: name.to_string(),
        expected,
    }
}

fn lookup_miss(form: &Form, name: &str, expected: &'static str) -> CommandError {
    if form.control(name).is_some() {
        wrong_kind(name, expected)
    } else {
        CommandError::ControlNotFound(name.to_string())
    }
}
