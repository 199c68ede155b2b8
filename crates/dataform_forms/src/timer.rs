//! Repeating timers and the Timer control.
//!
//! A running timer only keeps a weak reference to its own state inside the
//! scheduler, and its callback only reaches the form through a weak
//! `FormContext`. Dropping or destroying the form therefore ends the ticks.

use crate::control::{Control, ControlBase};
use crate::error::FormResult;
use crate::events::TickHandler;
use crate::form::FormContext;
use crate::registry::BuildContext;
use crate::scheduler::{Scheduler, TaskId};
use crate::structure::ControlDef;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    /// Next tick is armed before the callback runs: drift-free period.
    FixedRate,
    /// Next tick is armed once the callback returns: slow callbacks delay it.
    AfterCallback,
}

type TickFn = Rc<dyn Fn(&TimerHandle)>;

#[derive(Debug)]
struct TimerCore {
    name: String,
    interval: Duration,
    repeat: Repeat,
    scheduler: Scheduler,
    pending: Option<TaskId>,
    // Bumped on every start/stop so a tick can tell it was superseded
    generation: u64,
    ticks: u64,
}

#[derive(Debug, Clone)]
pub struct TimerHandle {
    core: Rc<RefCell<TimerCore>>,
}

impl TimerHandle {
    pub fn new(name: impl Into<String>, scheduler: &Scheduler, interval: Duration, repeat: Repeat) -> Self {
        Self {
            core: Rc::new(RefCell::new(TimerCore {
                name: name.into(),
                interval,
                repeat,
                scheduler: scheduler.clone(),
                pending: None,
                generation: 0,
                ticks: 0,
            })),
        }
    }

    pub fn name(&self) -> String {
        self.core.borrow().name.clone()
    }

    pub fn interval(&self) -> Duration {
        self.core.borrow().interval
    }

    pub fn is_running(&self) -> bool {
        self.core.borrow().pending.is_some()
    }

    pub fn ticks(&self) -> u64 {
        self.core.borrow().ticks
    }

    /// Cancels any pending tick, then arms the first one an interval from now.
    pub fn start(&self, on_tick: impl Fn(&TimerHandle) + 'static) {
        self.stop();
        let interval = self.interval();
        self.arm(Rc::new(on_tick), interval);
    }

    /// Cancels the pending tick. Safe to call on a stopped timer.
    pub fn stop(&self) {
        let mut core = self.core.borrow_mut();
        core.generation += 1;
        if let Some(id) = core.pending.take() {
            core.scheduler.cancel(id);
        }
    }

    fn arm(&self, on_tick: TickFn, delay: Duration) {
        let weak: Weak<RefCell<TimerCore>> = Rc::downgrade(&self.core);
        let scheduler = self.core.borrow().scheduler.clone();
        let id = scheduler.schedule(delay, move || {
            if let Some(core) = weak.upgrade() {
                TimerHandle { core }.fire(on_tick);
            }
        });
        self.core.borrow_mut().pending = Some(id);
    }

    fn fire(&self, on_tick: TickFn) {
        let (repeat, interval, generation) = {
            let mut core = self.core.borrow_mut();
            core.pending = None;
            core.ticks += 1;
            (core.repeat, core.interval, core.generation)
        };
        match repeat {
            Repeat::FixedRate => {
                self.arm(on_tick.clone(), interval);
                on_tick(self);
            }
            Repeat::AfterCallback => {
                on_tick(self);
                let superseded = {
                    let core = self.core.borrow();
                    core.generation != generation || core.pending.is_some()
                };
                if !superseded {
                    self.arm(on_tick, interval);
                }
            }
        }
    }
}

/// Control that ticks a user handler while running.
pub struct Timer {
    base: ControlBase,
    handle: TimerHandle,
    on_tick: Option<TickHandler>,
}

impl Timer {
    pub fn new(ctx: &mut BuildContext<'_>, def: &ControlDef) -> FormResult<Self> {
        let base = ControlBase::new(ctx.scope(), def)?;
        let interval = match def.interval {
            Some(ms) if ms > 0 => Duration::from_millis(ms),
            _ => DEFAULT_INTERVAL,
        };
        let handle = TimerHandle::new(base.name(), ctx.scope().scheduler(), interval, Repeat::FixedRate);
        ctx.register_timer(handle.clone());
        let on_tick = ctx.handlers().tick(base.name());
        Ok(Self { base, handle, on_tick })
    }

    /// Starts ticking against `form`. Without a tick handler this does nothing.
    pub fn start(&mut self, form: FormContext) {
        let Some(handler) = self.on_tick.clone() else {
            return;
        };
        self.handle.start(move |timer| {
            handler(timer, &form);
            form.dispatch_pending();
        });
    }

    pub fn stop(&mut self) {
        self.handle.stop();
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_running()
    }

    pub fn handle(&self) -> &TimerHandle {
        &self.handle
    }
}

impl std::fmt::Debug for Timer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timer")
            .field("base", &self.base)
            .field("handle", &self.handle)
            .field("has_handler", &self.on_tick.is_some())
            .finish()
    }
}

impl Control for Timer {
    fn base(&self) -> &ControlBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ControlBase {
        &mut self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counter() -> (Rc<Cell<u32>>, impl Fn(&TimerHandle) + 'static) {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        (count, move |_: &TimerHandle| c.set(c.get() + 1))
    }

    #[test]
    fn fixed_rate_ticks_every_interval() {
        let scheduler = Scheduler::new();
        let timer = TimerHandle::new("t", &scheduler, Duration::from_millis(100), Repeat::FixedRate);
        let (count, tick) = counter();
        timer.start(tick);
        scheduler.advance(Duration::from_millis(350));
        assert_eq!(count.get(), 3);
        assert!(timer.is_running());
    }

    #[test]
    fn restart_does_not_overlap_ticks() {
        let scheduler = Scheduler::new();
        let timer = TimerHandle::new("t", &scheduler, Duration::from_millis(100), Repeat::FixedRate);
        let (count, tick) = counter();
        timer.start(tick);
        scheduler.advance(Duration::from_millis(50));
        let (_, other) = counter();
        timer.start(other);
        scheduler.advance(Duration::from_millis(60));
        assert_eq!(count.get(), 0);
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn after_callback_timer_stops_from_inside_its_callback() {
        let scheduler = Scheduler::new();
        let timer = TimerHandle::new("t", &scheduler, Duration::from_millis(10), Repeat::AfterCallback);
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        timer.start(move |t| {
            c.set(c.get() + 1);
            if c.get() == 2 {
                t.stop();
            }
        });
        scheduler.advance(Duration::from_millis(100));
        assert_eq!(count.get(), 2);
        assert!(!timer.is_running());
    }

    #[test]
    fn dropped_timer_never_ticks() {
        let scheduler = Scheduler::new();
        let (count, tick) = counter();
        {
            let timer = TimerHandle::new("t", &scheduler, Duration::from_millis(10), Repeat::FixedRate);
            timer.start(tick);
        }
        scheduler.advance(Duration::from_millis(100));
        assert_eq!(count.get(), 0);
    }
}
