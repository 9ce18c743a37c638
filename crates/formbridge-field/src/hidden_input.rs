//! Creation, placement and removal of the hidden native input.

use formbridge_dom::{Element, InsertPosition};
use tracing::{debug, warn};

use crate::error::BindingResult;
use crate::options::FieldOptions;
use crate::resolver::RefResolver;

/// Attribute identifying inputs created by a field binding.
pub const FIELD_MARKER_ATTRIBUTE: &str = "data-formbridge-field";

/// Inline style that keeps an input focusable by script but out of layout.
pub const VISUALLY_HIDDEN_STYLE: &str = "position:absolute;width:1px;height:1px;padding:0;margin:-1px;\
	overflow:hidden;clip:rect(0,0,0,0);white-space:nowrap;border:0";

const RESERVED_ATTRIBUTES: [&str; 3] = ["name", "type", "value"];

/// Owns the hidden input of a single binding.
///
/// At most one input is alive at a time. Mounting again first removes the
/// previous one, so a binding can never leave two inputs behind.
#[derive(Debug, Default)]
pub struct HiddenInputManager {
	node: Option<Element>,
}

impl HiddenInputManager {
	/// Creates a manager with no input mounted.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates an input named `name` holding `value` and inserts it directly
	/// after `anchor`.
	///
	/// Fails without touching the document when `anchor` is not connected.
	pub fn mount(&mut self, anchor: &Element, name: &str, value: &str, options: &FieldOptions) -> BindingResult<Element> {
		let anchor = RefResolver::require(anchor)?;
		self.unmount();

		let document = anchor.owner_document();
		let input = document.create_element("input");
		input.set_attribute("type", options.kind.input_type());
		input.set_attribute("name", name);
		input.set_attribute(FIELD_MARKER_ATTRIBUTE, name);
		if options.kind.needs_clipping() {
			input.set_attribute("aria-hidden", "true");
			input.set_attribute("tabindex", "-1");
			input.set_attribute("style", VISUALLY_HIDDEN_STYLE);
		}
		for (attr, attr_value) in options.constraint_attributes() {
			input.set_attribute(attr, &attr_value);
		}
		for (attr, attr_value) in &options.attributes {
			if RESERVED_ATTRIBUTES.contains(&attr.to_ascii_lowercase().as_str()) {
				warn!(field = name, attribute = %attr, "ignoring reserved attribute in field options");
				continue;
			}
			input.set_attribute(attr, attr_value);
		}
		input.set_value(value);

		anchor.insert_adjacent_element(InsertPosition::AfterEnd, &input)?;
		let duplicated = input.form_owner().is_some_and(|form| {
			form.elements().is_ok_and(|controls| {
				controls
					.iter()
					.any(|control| control != &input && control.get_attribute("name").as_deref() == Some(name))
			})
		});
		if duplicated {
			debug!(field = name, "another control in this form already uses this name; FormData will report several values");
		}
		debug!(field = name, anchor = %anchor.tag_name(), "hidden input mounted");
		self.node = Some(input.clone());
		Ok(input)
	}

	/// Writes `value` into the input's `value` property.
	///
	/// A programmatic write: no `input` or `change` event is fired. Returns
	/// `false` when nothing is mounted.
	pub fn update_value(&self, value: &str) -> bool {
		match &self.node {
			Some(node) => {
				node.set_value(value);
				true
			}
			None => false,
		}
	}

	/// Removes the input from the document. Idempotent.
	///
	/// Returns whether an input was released.
	pub fn unmount(&mut self) -> bool {
		match self.node.take() {
			Some(node) => {
				node.remove();
				debug!(field = %node.get_attribute("name").unwrap_or_default(), "hidden input removed");
				true
			}
			None => false,
		}
	}

	/// The mounted input, if any.
	pub fn node(&self) -> Option<&Element> {
		self.node.as_ref()
	}

	/// Whether the input is mounted within the run of field inputs that
	/// directly follows `anchor`.
	///
	/// Several bindings may share one anchor. Each mount inserts right after
	/// the anchor, so only the newest input is its immediate sibling and the
	/// older ones follow it.
	pub fn is_placed_after(&self, anchor: &Element) -> bool {
		let Some(node) = self.node.as_ref() else {
			return false;
		};
		if !node.is_connected() || node.parent_element() != anchor.parent_element() {
			return false;
		}
		let mut sibling = anchor.next_element_sibling();
		while let Some(current) = sibling {
			if &current == node {
				return true;
			}
			if !current.has_attribute(FIELD_MARKER_ATTRIBUTE) {
				return false;
			}
			sibling = current.next_element_sibling();
		}
		false
	}
}

impl Drop for HiddenInputManager {
	fn drop(&mut self) {
		self.unmount();
	}
}
