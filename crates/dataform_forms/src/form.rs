//! Form lifecycle: building the control tree from a structure, lookup by
//! name, the interaction loop and teardown.

use crate::button::Button;
use crate::container::{find_in, find_in_mut};
use crate::control::FormScope;
use crate::error::FormResult;
use crate::events::Handlers;
use crate::localization::{Language, Localization};
use crate::registry::{BuildContext, KindRegistry};
use crate::scheduler::Scheduler;
use crate::structure::FormDef;
use crate::surface::{NullSurface, Surface};
use crate::timer::TimerHandle;
use crate::widget::Widget;
use std::cell::{Ref, RefCell, RefMut};
use std::rc::{Rc, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Ready,
    Destroyed,
}

/// A named tree of controls plus its command bar.
#[derive(Debug)]
pub struct Form {
    name: String,
    title: Option<String>,
    scope: Rc<FormScope>,
    controls: Vec<Widget>,
    buttons: Vec<Button>,
    timers: Vec<TimerHandle>,
    handlers: Handlers,
    state: FormState,
    this: Weak<RefCell<Form>>,
}

impl Form {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn is_destroyed(&self) -> bool {
        self.state == FormState::Destroyed
    }

    pub fn localization(&self) -> &'static Localization {
        self.scope.localization()
    }

    pub fn scheduler(&self) -> &Scheduler {
        self.scope.scheduler()
    }

    pub fn controls(&self) -> &[Widget] {
        &self.controls
    }

    /// Looks a control up by name anywhere in the tree, first match wins.
    pub fn control(&self, name: &str) -> Option<&Widget> {
        find_in(&self.controls, name)
    }

    pub fn control_mut(&mut self, name: &str) -> Option<&mut Widget> {
        find_in_mut(&mut self.controls, name)
    }

    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    pub fn button(&self, name: &str) -> Option<&Button> {
        self.buttons.iter().find(|b| b.name() == name)
    }

    pub fn button_mut(&mut self, name: &str) -> Option<&mut Button> {
        self.buttons.iter_mut().find(|b| b.name() == name)
    }

    pub fn context(&self) -> FormContext {
        FormContext {
            form: self.this.clone(),
        }
    }

    /// Starts the named Timer control. Returns false if there is none.
    pub fn start_timer(&mut self, name: &str) -> bool {
        let context = self.context();
        match self.control_mut(name) {
            Some(Widget::Timer(timer)) => {
                timer.start(context);
                true
            }
            _ => false,
        }
    }

    pub fn stop_timer(&mut self, name: &str) -> bool {
        match self.control_mut(name) {
            Some(Widget::Timer(timer)) => {
                timer.stop();
                true
            }
            _ => false,
        }
    }

    /// Stops every timer the form owns. Safe to call more than once.
    pub fn destroy(&mut self) {
        if self.state == FormState::Destroyed {
            return;
        }
        for timer in &self.timers {
            timer.stop();
        }
        self.scope.take_events();
        self.state = FormState::Destroyed;
        tracing::debug!(form = %self.name, timers = self.timers.len(), "form destroyed");
    }
}

/// Collaborators a form is built with.
pub struct FormBuilder<'a> {
    def: &'a FormDef,
    surface: Rc<dyn Surface>,
    language: Language,
    scheduler: Scheduler,
    registry: Option<&'a KindRegistry>,
    handlers: Handlers,
}

impl<'a> FormBuilder<'a> {
    pub fn new(def: &'a FormDef) -> Self {
        Self {
            def,
            surface: Rc::new(NullSurface),
            language: Language::default(),
            scheduler: Scheduler::new(),
            registry: None,
            handlers: Handlers::new(),
        }
    }

    pub fn surface(mut self, surface: Rc<dyn Surface>) -> Self {
        self.surface = surface;
        self
    }

    pub fn language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn scheduler(mut self, scheduler: Scheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn registry(mut self, registry: &'a KindRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn handlers(mut self, handlers: Handlers) -> Self {
        self.handlers = handlers;
        self
    }

    /// Validates the structure, mounts it and instantiates every control.
    /// On error nothing stays mounted.
    pub fn build(self) -> FormResult<FormHandle> {
        let def = self.def;
        def.validate()?;
        let name = def.require_name()?.to_string();
        let localization = Localization::for_language(self.language);
        let standard;
        let registry = match self.registry {
            Some(registry) => registry,
            None => {
                standard = KindRegistry::standard();
                &standard
            }
        };

        let scope = FormScope::new(&name, self.surface.clone(), localization, self.scheduler);
        self.surface.mount(def, localization);
        let built = build_parts(&scope, def, registry, &self.handlers);
        let (controls, buttons, timers) = match built {
            Ok(parts) => parts,
            Err(err) => {
                self.surface.clear();
                return Err(err);
            }
        };
        // Nothing is listening yet
        scope.take_events();

        tracing::debug!(form = %name, controls = controls.len(), buttons = buttons.len(), "form built");
        let handlers = self.handlers;
        let inner = Rc::new_cyclic(|this| {
            RefCell::new(Form {
                name,
                title: def.title.clone(),
                scope,
                controls,
                buttons,
                timers,
                handlers,
                state: FormState::Ready,
                this: this.clone(),
            })
        });
        Ok(FormHandle { inner })
    }
}

type Parts = (Vec<Widget>, Vec<Button>, Vec<TimerHandle>);

fn build_parts(
    scope: &Rc<FormScope>,
    def: &FormDef,
    registry: &KindRegistry,
    handlers: &Handlers,
) -> FormResult<Parts> {
    let mut ctx = BuildContext::new(scope.clone(), registry, handlers);
    let mut controls = ctx.build_all(&def.controls)?;

    let mut buttons = Vec::with_capacity(def.buttons.len());
    for button_def in &def.buttons {
        let mut button = Button::new(scope, button_def)?;
        if button_def.enabled == Some(false) {
            button.set_enabled(false);
        }
        buttons.push(button);
    }

    // Disabling a container needs its children built, hence a second pass.
    let mut disabled = Vec::new();
    def.walk(&mut |control| {
        if control.enabled == Some(false) {
            if let Some(name) = control.name.as_deref() {
                disabled.push(name);
            }
        }
    });
    for name in disabled {
        if let Some(widget) = find_in_mut(&mut controls, name) {
            widget.set_enabled(false);
        }
    }

    Ok((controls, buttons, ctx.into_timers()))
}

/// Owning handle of a built form.
#[derive(Debug, Clone)]
pub struct FormHandle {
    inner: Rc<RefCell<Form>>,
}

impl FormHandle {
    pub fn borrow(&self) -> Ref<'_, Form> {
        self.inner.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, Form> {
        self.inner.borrow_mut()
    }

    pub fn context(&self) -> FormContext {
        FormContext {
            form: Rc::downgrade(&self.inner),
        }
    }

    /// Runs a user interaction against the form, then delivers the events
    /// it raised.
    pub fn interact<R>(&self, action: impl FnOnce(&mut Form) -> R) -> R {
        let result = action(&mut self.inner.borrow_mut());
        self.dispatch_pending();
        result
    }

    /// Delivers queued events to their handlers until the queue is empty.
    pub fn dispatch_pending(&self) {
        loop {
            let (events, handlers) = {
                let form = self.inner.borrow();
                if form.is_destroyed() {
                    form.scope.take_events();
                    return;
                }
                (form.scope.take_events(), form.handlers.clone())
            };
            if events.is_empty() {
                return;
            }
            let context = self.context();
            for event in &events {
                tracing::trace!(target_name = %event.target, kind = event.kind.as_str(), "dispatching form event");
                if let Some(handler) = handlers.for_event(event) {
                    handler(&context, event);
                }
            }
        }
    }

    pub fn destroy(&self) {
        self.inner.borrow_mut().destroy();
    }
}

/// Weak reference to a form handed to handlers and timers. Once the form is
/// dropped every call on it is a no-op.
#[derive(Debug, Clone)]
pub struct FormContext {
    form: Weak<RefCell<Form>>,
}

impl FormContext {
    pub fn upgrade(&self) -> Option<FormHandle> {
        self.form.upgrade().map(|inner| FormHandle { inner })
    }

    pub fn is_alive(&self) -> bool {
        self.form.strong_count() > 0
    }

    /// Runs `action` on the form unless it is gone or already borrowed.
    pub fn with<R>(&self, action: impl FnOnce(&mut Form) -> R) -> Option<R> {
        let inner = self.form.upgrade()?;
        let mut form = inner.try_borrow_mut().ok()?;
        Some(action(&mut form))
    }

    pub fn dispatch_pending(&self) {
        if let Some(handle) = self.upgrade() {
            handle.dispatch_pending();
        }
    }
}
