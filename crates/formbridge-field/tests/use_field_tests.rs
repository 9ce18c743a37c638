//! use_field Integration Tests
//!
//! Drives a content-editable widget through the host renderer and checks what
//! the enclosing form observes.
//!
//! Test Categories:
//! - Category 1: Mount and unmount
//! - Category 2: Value mirroring and event forwarding
//! - Category 3: Remounting and deferred anchors
//! - Category 4: Native form semantics

use formbridge_dom::{Document, Element, ListenerOptions};
use formbridge_field::{
	BindingError, BindingState, FieldAdapter, FieldOptions, InputKind, MountedComponent, UseField, host,
};
use rstest::{fixture, rstest};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

struct Page {
	document: Document,
	form: Element,
}

#[fixture]
fn page() -> Page {
	let document = Document::new();
	let form = document.create_element("form");
	document.body().unwrap().append_child(&form).unwrap();
	Page { document, form }
}

/// Mounts a content-editable widget bound to `name`.
fn mount_editor(page: &Page, name: &'static str, options: FieldOptions) -> (MountedComponent, UseField) {
	let document = page.document.clone();
	let hook = Rc::new(RefCell::new(None));
	let mounted = host::mount(&page.form, {
		let hook = Rc::clone(&hook);
		move |ctx| {
			let field = ctx.use_field(name, options.clone())?;
			let editor = document.create_element("div");
			editor.set_attribute("contenteditable", "true");
			ctx.bind_ref(&field.field, &editor);
			*hook.borrow_mut() = Some(field);
			Ok(editor)
		}
	})
	.unwrap();
	let hook = hook.borrow().clone().unwrap();
	(mounted, hook)
}

fn query_test_input(document: &Document) -> Option<Element> {
	document.query_selector("[name=\"test\"]").unwrap()
}

fn event_log(target: &Element, types: &[&str]) -> Rc<RefCell<Vec<String>>> {
	let log = Rc::new(RefCell::new(Vec::new()));
	for event_type in types {
		target.add_event_listener(event_type, ListenerOptions::default(), {
			let log = Rc::clone(&log);
			move |event| {
				let value = event.target().map(Element::value).unwrap_or_default();
				log.borrow_mut()
					.push(format!("{}:{}", event.event_type(), value));
			}
		});
	}
	log
}

// ============================================================================
// Category 1: Mount and unmount
// ============================================================================

#[rstest]
fn test_hidden_input_exists_after_mount(page: Page) {
	let (_mounted, hook) = mount_editor(&page, "test", FieldOptions::default());

	let input = query_test_input(&page.document);

	assert!(input.is_some());
	assert_eq!(input, hook.handle.hidden_input());
	assert_eq!(page.document.query_selector_all("[name=\"test\"]").unwrap().len(), 1);
}

#[rstest]
fn test_on_change_sets_hidden_input_value(page: Page) {
	let (_mounted, hook) = mount_editor(&page, "test", FieldOptions::default());

	hook.on_change.call("hello".to_string());

	assert_eq!(query_test_input(&page.document).unwrap().value(), "hello");
}

#[rstest]
fn test_hidden_input_removed_after_unmount(page: Page) {
	let (mut mounted, _hook) = mount_editor(&page, "test", FieldOptions::default());

	mounted.unmount();

	assert_eq!(query_test_input(&page.document), None);
	assert!(page.form.children().is_empty());
}

#[rstest]
fn test_stale_adapters_after_unmount_are_ignored(page: Page) {
	let (mut mounted, hook) = mount_editor(&page, "test", FieldOptions::default());
	let log = event_log(&page.form, &["input", "change", "focusout"]);
	mounted.unmount();

	hook.on_change.call("late".to_string());
	hook.on_blur.call(());
	hook.field.set(Some(&page.form));

	assert_eq!(query_test_input(&page.document), None);
	assert!(log.borrow().is_empty());
	assert!(hook.handle.is_torn_down());
}

#[rstest]
fn test_rerender_does_not_duplicate_hidden_input(page: Page) {
	let (mut mounted, hook) = mount_editor(&page, "test", FieldOptions::default());
	hook.on_change.call("draft".to_string());

	mounted.rerender().unwrap();
	mounted.rerender().unwrap();

	let inputs = page.document.query_selector_all("[name=\"test\"]").unwrap();
	assert_eq!(inputs.len(), 1);
	assert_eq!(inputs[0].value(), "draft");
	assert_eq!(mounted.scope().fields().len(), 1);
}

// ============================================================================
// Category 2: Value mirroring and event forwarding
// ============================================================================

#[rstest]
fn test_form_observes_input_then_change_after_value_write(page: Page) {
	let (_mounted, hook) = mount_editor(&page, "test", FieldOptions::default());
	let log = event_log(&page.form, &["input", "change"]);

	hook.on_change.call("a".to_string());
	hook.on_change.call("ab".to_string());

	assert_eq!(*log.borrow(), vec!["input:a", "change:a", "input:ab", "change:ab"]);
}

#[rstest]
fn test_repeated_identical_values_still_dispatch(page: Page) {
	let (_mounted, hook) = mount_editor(&page, "test", FieldOptions::default());
	let changes = Rc::new(Cell::new(0));
	page.form.add_event_listener("change", ListenerOptions::default(), {
		let changes = Rc::clone(&changes);
		move |_| changes.set(changes.get() + 1)
	});

	for _ in 0..3 {
		hook.on_change.call("same".to_string());
	}

	assert_eq!(changes.get(), 3);
}

#[rstest]
fn test_forwarded_events_are_not_cancelable(page: Page) {
	let (_mounted, hook) = mount_editor(&page, "test", FieldOptions::default());
	let flags = Rc::new(RefCell::new(Vec::new()));
	page.form.add_event_listener("change", ListenerOptions::default(), {
		let flags = Rc::clone(&flags);
		move |event| {
			event.prevent_default();
			flags
				.borrow_mut()
				.push((event.is_bubbling(), event.is_cancelable(), event.default_prevented()));
		}
	});

	hook.on_change.call("x".to_string());

	assert_eq!(*flags.borrow(), vec![(true, false, false)]);
	assert_eq!(hook.handle.value(), "x");
}

#[rstest]
fn test_on_blur_fires_blur_without_touching_value(page: Page) {
	let (_mounted, hook) = mount_editor(&page, "test", FieldOptions::default());
	hook.on_change.call("kept".to_string());
	let input = hook.handle.hidden_input().unwrap();
	let at_input = event_log(&input, &["blur"]);
	let at_form = event_log(&page.form, &["blur", "focusout"]);

	hook.on_blur.call(());

	assert_eq!(*at_input.borrow(), vec!["blur:kept"]);
	assert_eq!(*at_form.borrow(), vec!["focusout:kept"]);
	assert_eq!(input.value(), "kept");
}

#[rstest]
fn test_listener_can_read_binding_during_change(page: Page) {
	let (_mounted, hook) = mount_editor(&page, "test", FieldOptions::default());
	let seen = Rc::new(RefCell::new(Vec::new()));
	page.form.add_event_listener("change", ListenerOptions::default(), {
		let seen = Rc::clone(&seen);
		let handle = hook.handle.clone();
		move |_| seen.borrow_mut().push(handle.value())
	});

	hook.handle.report_change("via adapter");

	assert_eq!(*seen.borrow(), vec!["via adapter"]);
}

#[rstest]
fn test_listener_reporting_again_is_not_lost(page: Page) {
	let (_mounted, hook) = mount_editor(&page, "test", FieldOptions::default());
	page.form.add_event_listener("change", ListenerOptions::once(), {
		let on_change = hook.on_change.clone();
		move |_| on_change.call("normalized".to_string())
	});

	hook.on_change.call("raw".to_string());

	assert_eq!(hook.handle.value(), "normalized");
	assert_eq!(query_test_input(&page.document).unwrap().value(), "normalized");
}

// ============================================================================
// Category 3: Remounting and deferred anchors
// ============================================================================

#[rstest]
fn test_value_survives_root_swap(page: Page) {
	let document = page.document.clone();
	let generation = Rc::new(Cell::new(0));
	let mut mounted = host::mount(&page.form, {
		let generation = Rc::clone(&generation);
		move |ctx| {
			let field = ctx.use_field("test", FieldOptions::default())?;
			let tag = if generation.get() == 0 { "div" } else { "section" };
			let editor = document.create_element(tag);
			ctx.bind_ref(&field.field, &editor);
			Ok(editor)
		}
	})
	.unwrap();
	let field = mounted.scope().field("test").unwrap();
	field.report_change("carried over");
	let first_input = field.hidden_input().unwrap();

	generation.set(1);
	mounted.rerender().unwrap();

	let input = query_test_input(&page.document).unwrap();
	assert_ne!(input, first_input);
	assert_eq!(input.value(), "carried over");
	assert_eq!(input.previous_element_sibling().unwrap().tag_name(), "section");
	assert_eq!(page.document.query_selector_all("[name=\"test\"]").unwrap().len(), 1);
}

#[rstest]
fn test_fields_sharing_a_root_keep_their_inputs_across_rerenders(page: Page) {
	let root = page.document.create_element("div");
	let mut mounted = host::mount(&page.form, move |ctx| {
		let start = ctx.use_field("start", FieldOptions::default())?;
		let end = ctx.use_field("end", FieldOptions::default())?;
		ctx.bind_ref(&start.field, &root);
		ctx.bind_ref(&end.field, &root);
		Ok(root.clone())
	})
	.unwrap();
	let start = mounted.scope().field("start").unwrap();
	let end = mounted.scope().field("end").unwrap();
	let start_input = start.hidden_input().unwrap();
	let end_input = end.hidden_input().unwrap();
	let nodes = page.document.node_count();

	mounted.rerender().unwrap();
	mounted.rerender().unwrap();

	assert_eq!(page.document.node_count(), nodes);
	assert_eq!(start.hidden_input(), Some(start_input.clone()));
	assert_eq!(end.hidden_input(), Some(end_input.clone()));
	assert!(start_input.is_connected());
	assert!(end_input.is_connected());
	assert_eq!(page.document.query_selector_all("[data-formbridge-field]").unwrap().len(), 2);
}

#[rstest]
fn test_nested_widget_defers_until_commit(page: Page) {
	let document = page.document.clone();
	let mounted = host::mount(&page.form, move |ctx| {
		let field = ctx.use_field("test", FieldOptions::default())?;
		let wrapper = document.create_element("label");
		let editor = document.create_element("div");
		wrapper.append_child(&editor)?;
		// Attached while the wrapper is still detached from the document.
		field.field.set(Some(&editor));
		field.on_change.call("typed early".to_string());
		Ok(wrapper)
	})
	.unwrap();

	let field = mounted.scope().field("test").unwrap();
	assert_eq!(field.state(), BindingState::Bound);
	let input = query_test_input(&page.document).unwrap();
	assert_eq!(input.value(), "typed early");
	assert_eq!(input.parent_element().unwrap().tag_name(), "label");
}

// ============================================================================
// Category 4: Native form semantics
// ============================================================================

#[rstest]
fn test_form_data_snapshot_is_synchronous(page: Page) {
	let (_mounted, hook) = mount_editor(&page, "test", FieldOptions::default());

	hook.on_change.call("first".to_string());
	let first = page.document.form_data(&page.form).unwrap();
	hook.on_change.call("second".to_string());
	let second = page.document.form_data(&page.form).unwrap();

	assert_eq!(first.get("test"), Some("first"));
	assert_eq!(second.get("test"), Some("second"));
}

#[rstest]
fn test_duplicate_names_submit_every_value(page: Page) {
	let (_first, first) = mount_editor(&page, "test", FieldOptions::default());
	let (_second, second) = mount_editor(&page, "test", FieldOptions::default());

	first.on_change.call("one".to_string());
	second.on_change.call("two".to_string());

	let data = page.document.form_data(&page.form).unwrap();
	assert_eq!(data.get_all("test"), vec!["one", "two"]);
	assert!(!first.handle.ptr_eq(&second.handle));
}

#[rstest]
fn test_required_field_blocks_submission_until_filled(page: Page) {
	let (_mounted, hook) = mount_editor(&page, "test", FieldOptions::new().required().with_min_length(3));
	let invalid = event_log(&hook.handle.hidden_input().unwrap(), &["invalid"]);

	assert_eq!(page.form.request_submit().unwrap(), None);
	hook.on_change.call("ab".to_string());
	assert_eq!(page.form.request_submit().unwrap(), None);
	assert!(page.document.query_selector("input:invalid").unwrap().is_some());

	hook.on_change.call("abc".to_string());
	let submitted = page.form.request_submit().unwrap().unwrap();

	assert_eq!(submitted.get("test"), Some("abc"));
	assert_eq!(*invalid.borrow(), vec!["invalid:", "invalid:ab"]);
}

#[rstest]
#[case(InputKind::Typed("email".to_string()), "not an email", false)]
#[case(InputKind::Typed("email".to_string()), "ada@example.com", true)]
#[case(InputKind::Hidden, "", true)]
fn test_input_kind_controls_validation(
	page: Page,
	#[case] kind: InputKind,
	#[case] value: &str,
	#[case] expected_valid: bool,
) {
	let (_mounted, hook) = mount_editor(&page, "test", FieldOptions::new().required().with_kind(kind));

	hook.on_change.call(value.to_string());

	assert_eq!(page.form.check_validity(), expected_valid);
}

#[rstest]
#[case("checkbox")]
#[case("radio")]
#[case("file")]
#[case("submit")]
fn test_input_kinds_that_drop_the_value_are_rejected(page: Page, #[case] kind: &str) {
	let options = FieldOptions::new().with_kind(InputKind::Typed(kind.to_string()));

	let document = page.document.clone();
	let result = host::mount(&page.form, move |ctx| {
		ctx.use_field("test", options.clone())?;
		Ok(document.create_element("div"))
	});

	assert_eq!(
		result.err(),
		Some(BindingError::UnsupportedInputType(kind.to_string()))
	);
	assert_eq!(query_test_input(&page.document), None);
	assert!(page.form.children().is_empty());
}

#[rstest]
fn test_disabled_field_is_not_submitted(page: Page) {
	let (_mounted, hook) = mount_editor(&page, "test", FieldOptions::new().disabled());

	hook.on_change.call("ignored".to_string());

	let data = page.document.form_data(&page.form).unwrap();
	assert!(!data.has("test"));
	assert_eq!(hook.handle.value(), "ignored");
}

#[rstest]
fn test_options_loaded_from_json(page: Page) {
	let options: FieldOptions = serde_json::from_value(serde_json::json!({
		"initial_value": "#ff0000",
		"pattern": "#[0-9a-f]{6}",
		"attributes": { "autocomplete": "off" }
	}))
	.unwrap();

	let (_mounted, hook) = mount_editor(&page, "test", options);
	let input = hook.handle.hidden_input().unwrap();

	assert_eq!(input.value(), "#ff0000");
	assert_eq!(input.get_attribute("autocomplete").as_deref(), Some("off"));
	assert!(input.check_validity());
	hook.on_change.call("red".to_string());
	assert!(input.validity().pattern_mismatch);
}
