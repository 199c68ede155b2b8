use dataform_engine::{Engine, EngineConfig, EngineHost, Event};
use dataform_forms::{Language, Scheduler, Widget};
use serde_json::{Value, json};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

#[derive(Default)]
struct Recorder {
    events: RefCell<Vec<Value>>,
    ended: RefCell<Vec<(Option<String>, Option<String>)>>,
    titles: RefCell<Vec<Option<String>>>,
}

impl Recorder {
    fn events(&self) -> Vec<Value> {
        self.events.borrow().clone()
    }

    fn take(&self) -> Vec<Value> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    fn of_kind(&self, kind: u32) -> Vec<Value> {
        self.events()
            .into_iter()
            .filter(|e| e["kind"] == json!(kind))
            .collect()
    }
}

impl EngineHost for Recorder {
    fn post(&self, event: &Event) {
        self.events.borrow_mut().push(event.to_value());
    }

    fn session_ended(&self, error: Option<&str>, success: Option<&str>) {
        self.ended
            .borrow_mut()
            .push((error.map(str::to_string), success.map(str::to_string)));
    }

    fn form_drawn(&self, title: Option<&str>) {
        self.titles.borrow_mut().push(title.map(str::to_string));
    }
}

fn start(initial: &str) -> (Engine, Rc<Recorder>, Scheduler) {
    let recorder = Rc::new(Recorder::default());
    let scheduler = Scheduler::new();
    let config = EngineConfig {
        language: Language::English,
        ..EngineConfig::default()
    };
    let engine = Engine::builder(recorder.clone())
        .config(config)
        .scheduler(scheduler.clone())
        .start(initial);
    (engine, recorder, scheduler)
}

fn draw(structure: Value) -> String {
    json!([{ "kind": 0x10000, "struct": structure }]).to_string()
}

fn sample_form() -> Value {
    json!({
        "name": "f",
        "title": "Sample",
        "controls": [
            { "kind": "textbox", "name": "who", "text": "hi" },
            { "kind": "checkbox", "name": "agree" },
            { "kind": "combobox", "name": "color", "values": ["red", "green"] },
            { "kind": "listview", "name": "lv", "columns": [{ "name": "c" }],
              "buttons": [{ "name": "add" }] },
            { "kind": "progress", "name": "bar" },
            { "kind": "timer", "name": "clock", "interval": 100 }
        ],
        "buttons": [{ "name": "ok", "caption": "OK" }]
    })
}

#[test]
fn greets_with_hold_after_initial_batch() {
    let (_engine, recorder, _) = start(&draw(sample_form()));
    assert_eq!(
        recorder.events(),
        vec![json!({"form": "f", "kind": 0x10000}), json!({"form": "f", "kind": 0})]
    );
    assert_eq!(*recorder.titles.borrow(), vec![Some("Sample".to_string())]);
}

#[test]
fn hold_without_form_carries_no_form_name() {
    let (_engine, recorder, _) = start("[]");
    assert_eq!(recorder.events(), vec![json!({"kind": 0})]);
}

#[test]
fn silent_server_ends_session_once() {
    let (engine, recorder, scheduler) = start("[]");
    scheduler.advance(Duration::from_millis(10_000));
    assert!(!engine.is_closed());
    scheduler.advance(Duration::from_millis(1_000));
    assert!(engine.is_closed());

    scheduler.advance(Duration::from_millis(20_000));
    assert_eq!(
        *recorder.ended.borrow(),
        vec![(Some("Connection with the server is lost".to_string()), None)]
    );
    assert_eq!(recorder.events().len(), 1);
    assert_eq!(scheduler.pending(), 0);
}

#[test]
fn server_hold_is_answered_after_delay() {
    let (engine, recorder, scheduler) = start("[]");
    recorder.take();
    engine.execute(r#"[{"kind":0}]"#);
    scheduler.advance(Duration::from_millis(999));
    assert!(recorder.events().is_empty());
    scheduler.advance(Duration::from_millis(1));
    assert_eq!(recorder.events(), vec![json!({"kind": 0})]);
}

#[test]
fn regular_holds_keep_session_open() {
    let (engine, recorder, scheduler) = start("[]");
    for _ in 0..6 {
        engine.execute(r#"[{"kind":0}]"#);
        scheduler.advance(Duration::from_millis(5_000));
    }
    assert!(!engine.is_closed());
    assert!(recorder.ended.borrow().is_empty());
}

#[test]
fn failing_command_does_not_stop_the_batch() {
    let batch = json!([
        { "kind": "0x20001", "name": "agree", "enabled": false },
        { "kind": 999 },
        { "kind": 0x10000, "struct": sample_form() },
        { "kind": "0x20001", "name": "ghost", "enabled": false },
        { "kind": "0x20001", "name": "agree", "enabled": false }
    ]);
    let (engine, recorder, _) = start(&batch.to_string());
    assert_eq!(recorder.of_kind(0x10000).len(), 1);
    let form = engine.form().unwrap();
    assert!(!form.borrow().control("agree").unwrap().enabled());
}

#[test]
fn malformed_batch_is_dropped() {
    let (engine, recorder, _) = start("{not json");
    assert!(engine.form().is_none());
    assert_eq!(recorder.events(), vec![json!({"kind": 0})]);
}

#[test]
fn checkbox_toggle_posts_one_event() {
    let (engine, recorder, _) = start(&draw(sample_form()));
    recorder.take();
    let form = engine.form().unwrap();
    form.interact(|f| {
        if let Some(Widget::CheckBox(check)) = f.control_mut("agree") {
            check.toggle();
        }
    });
    assert_eq!(
        recorder.events(),
        vec![json!({"form": "f", "kind": 0x30300, "name": "agree", "checked": true})]
    );
}

#[test]
fn button_and_combo_interactions_are_posted() {
    let (engine, recorder, _) = start(&draw(sample_form()));
    recorder.take();
    let form = engine.form().unwrap();
    form.interact(|f| {
        if let Some(Widget::ComboBox(combo)) = f.control_mut("color") {
            combo.select(1);
        }
        f.button("ok").unwrap().click();
    });
    assert_eq!(
        recorder.events(),
        vec![
            json!({"form": "f", "kind": 0x30400, "name": "color", "index": 1}),
            json!({"form": "f", "kind": 0x20000, "name": "ok"}),
        ]
    );
}

#[test]
fn disabled_button_posts_nothing() {
    let (engine, recorder, _) = start(&draw(sample_form()));
    engine.execute(r#"[{"kind":"0x30000","name":"ok","enabled":false}]"#);
    recorder.take();
    engine.form().unwrap().interact(|f| f.button("ok").unwrap().click());
    assert!(recorder.events().is_empty());
}

#[test]
fn form_values_reports_named_controls() {
    let (engine, recorder, _) = start(&draw(sample_form()));
    recorder.take();
    engine.execute(r#"[{"kind":65537,"controls":["who","agree","ghost"]}]"#);
    assert_eq!(
        recorder.events(),
        vec![json!({
            "form": "f",
            "kind": 0x10001,
            "controls": [
                {"name": "who", "value": {"text": "hi"}},
                {"name": "agree", "value": {"checked": false}}
            ]
        })]
    );
}

#[test]
fn list_commands_drive_rows_and_selection() {
    let (engine, recorder, _) = start(&draw(sample_form()));
    recorder.take();
    let batch = json!([
        { "kind": 0x20202, "name": "lv", "items": [{ "data": ["a"] }, { "data": ["b"] }, { "data": ["c"] }] },
        { "kind": 0x20204, "name": "lv", "index": 2 },
        { "kind": 0x20200, "name": "lv", "index": 0 },
        { "kind": 0x20200, "name": "lv", "index": 7 },
        { "kind": 0x20203, "name": "lv" },
        { "kind": 0x20205, "name": "lv", "button": "add", "enabled": false }
    ]);
    engine.execute(&batch.to_string());
    assert_eq!(
        recorder.events(),
        vec![json!({"form": "f", "kind": 0x30102, "name": "lv", "index": 1})]
    );

    let form = engine.form().unwrap();
    {
        let form = form.borrow();
        let Some(Widget::ListView(list)) = form.control("lv") else {
            panic!("lv is not a list view");
        };
        assert_eq!(list.rows().len(), 2);
        assert_eq!(list.button_enabled("add"), Some(false));
    }

    engine.execute(r#"[{"kind":"0x20204","name":"lv","index":-1},{"kind":"0x20203","name":"lv"}]"#);
    assert_eq!(
        recorder.events().last(),
        Some(&json!({"form": "f", "kind": 0x30102, "name": "lv", "index": null}))
    );
}

#[test]
fn list_row_interactions_are_posted() {
    let (engine, recorder, _) = start(&draw(sample_form()));
    engine.execute(r#"[{"kind":"0x20202","name":"lv","items":[{"data":["a"]}]}]"#);
    recorder.take();
    engine.form().unwrap().interact(|f| {
        if let Some(Widget::ListView(list)) = f.control_mut("lv") {
            list.click_row(0);
            list.click_button("add");
        }
    });
    assert_eq!(
        recorder.events(),
        vec![
            json!({"form": "f", "kind": 0x30102, "name": "lv", "index": 0}),
            json!({"form": "f", "kind": 0x30100, "name": "lv", "button": "add"}),
        ]
    );
}

#[test]
fn progress_commands_ignore_falsy_values() {
    let (engine, _recorder, _) = start(&draw(sample_form()));
    engine.execute(
        r#"[{"kind":"0x20401","name":"bar","percent":150},
            {"kind":"0x20400","name":"bar","status":""}]"#,
    );
    let form = engine.form().unwrap();
    let form = form.borrow();
    let Some(Widget::Progress(bar)) = form.control("bar") else {
        panic!("bar is not a progress");
    };
    assert_eq!(bar.percent(), 100.0);
    assert_eq!(bar.status(), "Wait");
}

#[test]
fn timer_ticks_are_posted_until_stopped() {
    let (engine, recorder, scheduler) = start(&draw(sample_form()));
    recorder.take();
    engine.execute(r#"[{"kind":"0x20300","name":"clock"}]"#);
    scheduler.advance(Duration::from_millis(250));
    assert_eq!(recorder.of_kind(0x30200).len(), 2);
    engine.execute(r#"[{"kind":"0x20301","name":"clock"}]"#);
    scheduler.advance(Duration::from_millis(500));
    assert_eq!(recorder.of_kind(0x30200).len(), 2);
}

#[test]
fn close_ends_session_and_silences_timers() {
    let (engine, recorder, scheduler) = start(&draw(sample_form()));
    engine.execute(r#"[{"kind":"0x20300","name":"clock"}]"#);
    recorder.take();
    engine.execute(r#"[{"kind":1,"success":"saved"},{"kind":1,"error":"again"}]"#);
    assert_eq!(
        *recorder.ended.borrow(),
        vec![(None, Some("saved".to_string()))]
    );

    scheduler.advance(Duration::from_millis(30_000));
    assert!(recorder.events().is_empty());
    assert_eq!(scheduler.pending(), 0);
}

#[test]
fn broken_structure_draws_nothing() {
    let structure = json!({
        "name": "f",
        "controls": [{ "kind": "panel", "name": "p", "controls": [{ "kind": "label" }] }]
    });
    let (engine, recorder, _) = start(&draw(structure));
    assert!(engine.form().is_none());
    assert!(recorder.titles.borrow().is_empty());
    assert_eq!(recorder.events(), vec![json!({"kind": 0})]);
}

#[test]
fn redraw_replaces_the_form() {
    let (engine, recorder, scheduler) = start(&draw(sample_form()));
    engine.execute(r#"[{"kind":"0x20300","name":"clock"}]"#);
    recorder.take();
    engine.execute(&draw(json!({ "name": "g", "controls": [] })));
    scheduler.advance(Duration::from_millis(500));
    assert_eq!(recorder.events(), vec![json!({"form": "g", "kind": 0x10000})]);
    assert_eq!(engine.form().unwrap().borrow().name(), "g");
}

#[test]
fn destroy_stops_everything() {
    let (engine, recorder, scheduler) = start(&draw(sample_form()));
    engine.execute(r#"[{"kind":0},{"kind":"0x20300","name":"clock"}]"#);
    engine.destroy();
    recorder.take();
    scheduler.advance(Duration::from_millis(30_000));
    assert!(recorder.events().is_empty());
    assert!(recorder.ended.borrow().is_empty());
    assert_eq!(scheduler.pending(), 0);
    assert!(engine.form().is_none());
}

#[test]
fn commands_for_wrong_kinds_are_rejected() {
    let (engine, _recorder, _) = start(&draw(sample_form()));
    let commands = dataform_engine::decode_batch(
        r#"[{"kind":"0x20100","name":"agree","options":[]},{"kind":"0x20300","name":"who"}]"#,
    )
    .unwrap();
    for command in commands {
        assert!(engine.apply(command.unwrap()).is_err());
    }
}

#[test]
fn new_combo_options_select_first_and_report_it() {
    let structure = json!({
        "name": "f",
        "controls": [{ "kind": "combobox", "name": "cb", "values": ["a", "b", "c"], "value": 2 }]
    });
    let (engine, recorder, _) = start(&draw(structure));
    recorder.take();
    engine.execute(r#"[{"kind":"0x20100","name":"cb","options":["x","y","z","w"]}]"#);
    assert_eq!(
        recorder.events(),
        vec![json!({"form": "f", "kind": 0x30400, "name": "cb", "index": 0})]
    );

    let form = engine.form().unwrap();
    let form = form.borrow();
    let Some(Widget::ComboBox(combo)) = form.control("cb") else {
        panic!("cb is not a combobox");
    };
    assert_eq!(combo.options(), ["x", "y", "z", "w"]);
    assert_eq!(combo.selected(), 0);
}

#[test]
fn form_values_without_controls_is_skipped() {
    let (engine, recorder, _) = start(&draw(sample_form()));
    recorder.take();
    engine.execute(r#"[{"kind":65537},{"kind":65537,"controls":["agree"]}]"#);
    assert_eq!(
        recorder.events(),
        vec![json!({
            "form": "f",
            "kind": 0x10001,
            "controls": [{"name": "agree", "value": {"checked": false}}]
        })]
    );
}
