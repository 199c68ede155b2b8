use dataform_forms::{
    ControlDef, ControlKind, FormBuilder, FormDef, FormHandle, Handlers, Scheduler, Widget,
};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

fn timer_form(scheduler: &Scheduler, interval: Option<u64>) -> (FormHandle, Rc<Cell<u32>>) {
    let mut timer = ControlDef::new(ControlKind::Timer, "clock");
    timer.interval = interval;
    let def = FormDef::new("f").with_control(timer);
    let ticks = Rc::new(Cell::new(0));
    let counter = ticks.clone();
    let handlers = Handlers::new().on_tick("clock", move |_, _| counter.set(counter.get() + 1));
    let form = FormBuilder::new(&def)
        .scheduler(scheduler.clone())
        .handlers(handlers)
        .build()
        .unwrap();
    (form, ticks)
}

#[test]
fn timer_ticks_at_default_interval() {
    let scheduler = Scheduler::new();
    let (form, ticks) = timer_form(&scheduler, None);
    assert!(form.borrow_mut().start_timer("clock"));
    scheduler.advance(Duration::from_millis(3500));
    assert_eq!(ticks.get(), 3);
}

#[test]
fn no_ticks_after_stop() {
    let scheduler = Scheduler::new();
    let (form, ticks) = timer_form(&scheduler, Some(100));
    form.borrow_mut().start_timer("clock");
    scheduler.advance(Duration::from_millis(150));
    assert_eq!(ticks.get(), 1);
    assert!(form.borrow_mut().stop_timer("clock"));
    scheduler.advance(Duration::from_millis(200));
    assert_eq!(ticks.get(), 1);
    assert_eq!(scheduler.pending(), 0);
}

#[test]
fn restart_keeps_a_single_schedule() {
    let scheduler = Scheduler::new();
    let (form, ticks) = timer_form(&scheduler, Some(100));
    form.borrow_mut().start_timer("clock");
    form.borrow_mut().start_timer("clock");
    scheduler.advance(Duration::from_millis(100));
    assert_eq!(ticks.get(), 1);
}

#[test]
fn destroy_stops_running_timers() {
    let scheduler = Scheduler::new();
    let (form, ticks) = timer_form(&scheduler, Some(100));
    form.borrow_mut().start_timer("clock");
    form.destroy();
    scheduler.advance(Duration::from_millis(1000));
    assert_eq!(ticks.get(), 0);
    form.destroy();
}

#[test]
fn dropped_form_releases_its_timers() {
    let scheduler = Scheduler::new();
    let (form, ticks) = timer_form(&scheduler, Some(100));
    let context = form.borrow().context();
    form.borrow_mut().start_timer("clock");
    drop(form);
    assert!(!context.is_alive());
    scheduler.advance(Duration::from_millis(1000));
    assert_eq!(ticks.get(), 0);
}

#[test]
fn timer_without_handler_does_not_start() {
    let scheduler = Scheduler::new();
    let def = FormDef::new("f").with_control(ControlDef::new(ControlKind::Timer, "idle"));
    let form = FormBuilder::new(&def).scheduler(scheduler.clone()).build().unwrap();
    form.borrow_mut().start_timer("idle");
    assert_eq!(scheduler.pending(), 0);
    let form = form.borrow();
    let Some(Widget::Timer(timer)) = form.control("idle") else { panic!() };
    assert!(!timer.is_running());
}

#[test]
fn tick_handler_can_reach_the_form() {
    let scheduler = Scheduler::new();
    let timer = ControlDef::new(ControlKind::Timer, "clock");
    let def = FormDef::new("f")
        .with_control(timer)
        .with_control(ControlDef::new(ControlKind::Progress, "p"));
    let handlers = Handlers::new().on_tick("clock", |timer, form| {
        form.with(|f| {
            if let Some(Widget::Progress(p)) = f.control_mut("p") {
                let next = p.percent() + 25.0;
                p.set_percent(next);
            }
        });
        if timer.ticks() == 2 {
            timer.stop();
        }
    });
    let form = FormBuilder::new(&def)
        .scheduler(scheduler.clone())
        .handlers(handlers)
        .build()
        .unwrap();
    form.borrow_mut().start_timer("clock");
    scheduler.advance(Duration::from_secs(10));
    let form = form.borrow();
    let Some(Widget::Progress(p)) = form.control("p") else { panic!() };
    assert_eq!(p.percent(), 50.0);
}
