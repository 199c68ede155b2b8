use dataform_forms::{
    Control, ControlDef, ControlKind, EventKind, FileLoad, FormBuilder, FormDef, FormHandle, HasButton,
    Handlers, Language, RecordingSurface, Scheduler, UploadOutcome, Widget,
};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

fn upload_form(scheduler: &Scheduler, clicks: Rc<Cell<u32>>) -> FormHandle {
    let def = FormDef::new("f").with_control(ControlDef::new(ControlKind::FileLoad, "doc"));
    let handlers = Handlers::new().on_control("doc", move |_, event| {
        if event.kind == EventKind::AuxButtonClick {
            clicks.set(clicks.get() + 1);
        }
    });
    FormBuilder::new(&def)
        .scheduler(scheduler.clone())
        .language(Language::English)
        .surface(Rc::new(RecordingSurface::new()))
        .handlers(handlers)
        .build()
        .unwrap()
}

fn with_upload<R>(form: &FormHandle, action: impl FnOnce(&mut FileLoad) -> R) -> R {
    form.interact(|f| match f.control_mut("doc") {
        Some(Widget::FileLoad(upload)) => action(upload),
        _ => panic!("no upload control"),
    })
}

#[test]
fn upload_button_follows_the_chosen_file() {
    let scheduler = Scheduler::new();
    let form = upload_form(&scheduler, Rc::new(Cell::new(0)));
    with_upload(&form, |u| {
        assert!(!u.button_enabled());
        assert!(!u.begin_upload());
        u.choose_file("report.pdf");
        assert!(u.button_enabled());
        assert_eq!(u.json(), serde_json::json!({"file": "report.pdf"}));
        u.choose_file("");
        assert!(!u.button_enabled());
    });
}

#[test]
fn progress_creeps_until_the_answer_arrives() {
    let scheduler = Scheduler::new();
    let clicks = Rc::new(Cell::new(0));
    let form = upload_form(&scheduler, clicks.clone());
    with_upload(&form, |u| {
        u.choose_file("report.pdf");
        assert!(u.begin_upload());
    });
    assert_eq!(clicks.get(), 1);

    scheduler.advance(Duration::from_millis(100));
    let percent = with_upload(&form, |u| u.percent());
    assert!((percent - 4.0).abs() < 1e-9, "{}", percent);

    scheduler.advance(Duration::from_secs(60));
    let percent = with_upload(&form, |u| u.percent());
    assert!(percent > 90.0 && percent < 100.0);

    let outcome = with_upload(&form, |u| u.finish_upload("1-stored"));
    assert_eq!(outcome, UploadOutcome::Accepted("stored".into()));
    with_upload(&form, |u| {
        assert_eq!(u.percent(), 100.0);
        assert_eq!(u.status(), "stored");
        assert!(!u.is_uploading());
    });
    assert_eq!(scheduler.pending(), 0);
}

#[test]
fn failed_upload_shows_localized_error() {
    let scheduler = Scheduler::new();
    let form = upload_form(&scheduler, Rc::new(Cell::new(0)));
    with_upload(&form, |u| {
        u.choose_file("a.txt");
        u.begin_upload();
        u.finish_upload("garbage");
        assert_eq!(u.status(), "Fatal error");
        assert!(u.status_is_error());
        assert_eq!(u.percent(), 0.0);

        u.begin_upload();
        u.finish_upload("0-too large");
        assert_eq!(u.status(), "too large");
    });
}

#[test]
fn destroy_stops_the_upload_ticker() {
    let scheduler = Scheduler::new();
    let form = upload_form(&scheduler, Rc::new(Cell::new(0)));
    with_upload(&form, |u| {
        u.choose_file("a.txt");
        u.begin_upload();
    });
    form.destroy();
    assert_eq!(scheduler.pending(), 0);
    scheduler.advance(Duration::from_millis(500));
    assert_eq!(with_upload(&form, |u| u.percent()), 0.0);
}
