use dataform_forms::{ControlDef, ControlKind, FormBuilder, FormDef, Widget};
use proptest::prelude::*;
use serde_json::json;

proptest! {
    #[test]
    fn set_then_read_is_clamped(x in -1.0e6f64..1.0e6, lo in -1000i32..0, span in 0i32..2000) {
        let hi = lo + span;
        let mut def = ControlDef::new(ControlKind::Number, "n");
        def.minimum = Some(json!(lo));
        def.maximum = Some(json!(hi));
        let form = FormBuilder::new(&FormDef::new("f").with_control(def)).build().unwrap();
        let mut form = form.borrow_mut();
        let Some(Widget::Number(n)) = form.control_mut("n") else { panic!() };
        n.set_value(x);
        prop_assert_eq!(n.value(), x.clamp(lo as f64, hi as f64));
    }

    #[test]
    fn typed_text_never_escapes_bounds(text in "\\PC{0,12}") {
        let mut def = ControlDef::new(ControlKind::Number, "n");
        def.minimum = Some(json!(-5));
        def.maximum = Some(json!(5));
        let form = FormBuilder::new(&FormDef::new("f").with_control(def)).build().unwrap();
        let mut form = form.borrow_mut();
        let Some(Widget::Number(n)) = form.control_mut("n") else { panic!() };
        dataform_forms::HasInput::type_text(n, &text);
        let value = n.value();
        prop_assert!((-5.0..=5.0).contains(&value));
    }
}
