//! Property-based tests for field bindings.
//!
//! - Any valid name yields exactly one hidden input carrying that name
//! - After every reported change, the hidden input holds the latest value
//! - Reattaching across anchors never loses the value or duplicates the input

use formbridge_dom::{Document, Element};
use formbridge_field::{FieldAdapter, FieldBindingEngine, FieldOptions, LifecyclePort};
use proptest::prelude::*;

fn widget_in_form() -> (Document, Element, Element) {
	let document = Document::new();
	let form = document.create_element("form");
	let widget = document.create_element("div");
	document.body().unwrap().append_child(&form).unwrap();
	form.append_child(&widget).unwrap();
	(document, form, widget)
}

fn field_name() -> impl Strategy<Value = String> {
	"[a-zA-Z_][a-zA-Z0-9_.\\-\\[\\]]{0,24}"
}

proptest! {
	#![proptest_config(ProptestConfig::with_cases(128))]

	#[test]
	fn prop_exactly_one_hidden_input_per_name(name in field_name()) {
		let (document, form, widget) = widget_in_form();
		let field = FieldBindingEngine::bind(&name, FieldOptions::default()).unwrap();

		field.attach(&widget);
		field.attach(&widget);

		let matching: Vec<Element> = form
			.elements()
			.unwrap()
			.into_iter()
			.filter(|control| control.get_attribute("name").as_deref() == Some(name.as_str()))
			.collect();
		prop_assert_eq!(matching.len(), 1);
		prop_assert_eq!(Some(matching[0].clone()), field.hidden_input());
		prop_assert_eq!(document.form_data(&form).unwrap().get_all(&name).len(), 1);
	}

	#[test]
	fn prop_hidden_value_tracks_latest_report(values in prop::collection::vec(".*", 1..12)) {
		let (_document, _form, widget) = widget_in_form();
		let field = FieldBindingEngine::bind("test", FieldOptions::default()).unwrap();
		field.attach(&widget);
		let input = field.hidden_input().unwrap();

		for value in &values {
			field.report_change(value);
			prop_assert_eq!(input.value(), value.clone());
			prop_assert_eq!(field.value(), value.clone());
		}
	}

	#[test]
	fn prop_reattach_preserves_value(
		value in "[ -~]{0,32}",
		hops in prop::collection::vec(0usize..3, 1..8),
	) {
		let (document, form, first) = widget_in_form();
		let mut anchors = vec![first];
		for _ in 0..2 {
			let anchor = document.create_element("div");
			form.append_child(&anchor).unwrap();
			anchors.push(anchor);
		}
		let field = FieldBindingEngine::bind("test", FieldOptions::default()).unwrap();
		field.attach(&anchors[0]);
		field.report_change(&value);

		for hop in hops {
			field.attach(&anchors[hop]);
			let input = field.hidden_input().unwrap();
			prop_assert_eq!(anchors[hop].next_element_sibling(), Some(input.clone()));
			prop_assert_eq!(input.value(), value.clone());
			prop_assert_eq!(document.query_selector_all("[name=\"test\"]").unwrap().len(), 1);
		}
	}
}
