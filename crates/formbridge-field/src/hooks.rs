//! The `use_field` hook and the component scope it stores bindings in.
//!
//! A [`Scope`] belongs to one mounted component. Hooks called during a render
//! pass look up their slot in the scope, so calling `use_field` with the same
//! name on every render returns the same binding instead of creating another
//! hidden input.
//!
//! ## Example
//!
//! ```
//! use formbridge_dom::Document;
//! use formbridge_field::{use_field, FieldOptions, Scope};
//!
//! let document = Document::new();
//! let form = document.create_element("form");
//! document.body().unwrap().append_child(&form).unwrap();
//! let widget = document.create_element("div");
//! widget.set_attribute("contenteditable", "true");
//! form.append_child(&widget).unwrap();
//!
//! let scope = Scope::new();
//! let field = use_field(&scope, "bio", FieldOptions::default()).unwrap();
//! field.field.set(Some(&widget));
//! field.on_change.call("Hello".to_string());
//!
//! let data = document.form_data(&form).unwrap();
//! assert_eq!(data.get("bio"), Some("Hello"));
//!
//! scope.teardown();
//! assert!(document.query_selector("[name=\"bio\"]").unwrap().is_none());
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::callback::{Callback, NodeRef};
use crate::engine::{FieldBindingEngine, FieldHandle};
use crate::error::BindingResult;
use crate::options::FieldOptions;
use crate::ports::LifecyclePort;

/// What [`use_field`] hands back to a widget.
#[derive(Debug, Clone)]
pub struct UseField {
	/// Ref callback for the widget's root element.
	pub field: NodeRef,
	/// Call with the widget's new value.
	pub on_change: Callback<String>,
	/// Call when the widget loses focus.
	pub on_blur: Callback<()>,
	/// The underlying binding, for introspection.
	pub handle: FieldHandle,
}

struct Slot {
	name: String,
	hook: UseField,
}

/// Hook storage for one mounted component.
#[derive(Clone, Default)]
pub struct Scope {
	slots: Rc<RefCell<Vec<Slot>>>,
}

impl Scope {
	/// Creates an empty scope.
	pub fn new() -> Self {
		Self::default()
	}

	/// Bindings in the order they were first requested.
	pub fn fields(&self) -> Vec<FieldHandle> {
		self.slots
			.borrow()
			.iter()
			.map(|slot| slot.hook.handle.clone())
			.collect()
	}

	/// Looks up the binding for `name`.
	pub fn field(&self, name: &str) -> Option<FieldHandle> {
		self.slots
			.borrow()
			.iter()
			.find(|slot| slot.name == name)
			.map(|slot| slot.hook.handle.clone())
	}

	/// Retries pending anchors of every binding. Called after each commit.
	pub fn flush(&self) {
		for field in self.fields() {
			field.flush();
		}
	}

	/// Tears down every binding and empties the scope.
	pub fn teardown(&self) {
		let slots = std::mem::take(&mut *self.slots.borrow_mut());
		if !slots.is_empty() {
			debug!(fields = slots.len(), "tearing down component scope");
		}
		for slot in slots {
			slot.hook.handle.teardown();
		}
	}
}

impl fmt::Debug for Scope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let names: Vec<String> = self
			.slots
			.borrow()
			.iter()
			.map(|slot| slot.name.clone())
			.collect();
		f.debug_struct("Scope").field("fields", &names).finish()
	}
}

/// Binds a custom widget to a hidden native input named `name`.
///
/// The first call for `name` in `scope` creates the binding; later calls
/// return the same one and ignore `options`. Attach the returned
/// [`field`](UseField::field) ref to the widget's root element and call
/// [`on_change`](UseField::on_change) / [`on_blur`](UseField::on_blur) from
/// the widget's own handlers.
///
/// Two bindings with the same name in one form are allowed; the form then
/// submits one value per binding.
///
/// # Errors
///
/// Returns [`BindingError::InvalidFieldName`](crate::BindingError::InvalidFieldName)
/// when `name` is blank, and
/// [`BindingError::UnsupportedInputType`](crate::BindingError::UnsupportedInputType)
/// when `options.kind` could not submit the value.
pub fn use_field(scope: &Scope, name: &str, options: FieldOptions) -> BindingResult<UseField> {
	if let Some(slot) = scope.slots.borrow().iter().find(|slot| slot.name == name) {
		trace!(field = name, "reusing field binding");
		return Ok(slot.hook.clone());
	}

	let handle = FieldBindingEngine::bind(name, options)?;
	let hook = UseField {
		field: handle.node_ref(),
		on_change: handle.on_change(),
		on_blur: handle.on_blur(),
		handle,
	};
	scope.slots.borrow_mut().push(Slot {
		name: name.to_string(),
		hook: hook.clone(),
	});
	Ok(hook)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::engine::BindingState;
	use formbridge_dom::Document;
	use rstest::rstest;

	#[rstest]
	fn test_same_name_returns_same_binding() {
		let scope = Scope::new();

		let first = use_field(&scope, "test", FieldOptions::default()).unwrap();
		let second = use_field(&scope, "test", FieldOptions::new().required()).unwrap();

		assert!(first.handle.ptr_eq(&second.handle));
		assert_eq!(first.field, second.field);
		assert!(first.on_change.ptr_eq(&second.on_change));
		assert!(!second.handle.options().required);
		assert_eq!(scope.fields().len(), 1);
	}

	#[rstest]
	fn test_distinct_names_get_distinct_bindings() {
		let scope = Scope::new();

		use_field(&scope, "first", FieldOptions::default()).unwrap();
		use_field(&scope, "second", FieldOptions::default()).unwrap();

		let names: Vec<String> = scope.fields().iter().map(FieldHandle::name).collect();
		assert_eq!(names, vec!["first", "second"]);
		assert!(scope.field("second").is_some());
		assert!(scope.field("third").is_none());
	}

	#[rstest]
	fn test_teardown_removes_inputs_and_slots() {
		let document = Document::new();
		let widget = document.create_element("div");
		document.body().unwrap().append_child(&widget).unwrap();
		let scope = Scope::new();
		let hook = use_field(&scope, "test", FieldOptions::default()).unwrap();
		hook.field.set(Some(&widget));
		assert_eq!(hook.handle.state(), BindingState::Bound);

		scope.teardown();

		assert!(hook.handle.is_torn_down());
		assert!(scope.fields().is_empty());
		assert!(document.query_selector("[name=\"test\"]").unwrap().is_none());
	}

	#[rstest]
	fn test_invalid_name_leaves_scope_empty() {
		let scope = Scope::new();

		assert!(use_field(&scope, "", FieldOptions::default()).is_err());
		assert!(scope.fields().is_empty());
	}
}
