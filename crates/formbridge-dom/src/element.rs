//! Element handles.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::document::Document;
use crate::error::{DomError, DomResult};
use crate::event::{self, Event, EventHandle, ListenerOptions};
use crate::form::{self, FormData, ValidityState};
use crate::node::{InsertPosition, NodeId, NodeKind, Tree};
use crate::selector::SelectorList;

const VOID_ELEMENTS: [&str; 6] = ["input", "br", "img", "meta", "link", "hr"];

/// A cheap, cloneable handle to an element of a [`Document`].
///
/// Handles compare equal when they point at the same node of the same
/// document. A handle stays usable after its element is removed from the
/// tree; the element then reports `is_connected() == false`.
#[derive(Clone)]
pub struct Element {
	tree: Rc<RefCell<Tree>>,
	id: NodeId,
}

impl Element {
	pub(crate) fn from_parts(tree: Rc<RefCell<Tree>>, id: NodeId) -> Self {
		Self { tree, id }
	}

	fn wrap(&self, id: NodeId) -> Element {
		Element::from_parts(Rc::clone(&self.tree), id)
	}

	fn same_document(&self, other: &Element) -> DomResult<()> {
		if Rc::ptr_eq(&self.tree, &other.tree) {
			Ok(())
		} else {
			Err(DomError::WrongDocument)
		}
	}

	/// Arena id of this element.
	pub fn node_id(&self) -> NodeId {
		self.id
	}

	/// The document this element belongs to.
	pub fn owner_document(&self) -> Document {
		Document::from_tree(Rc::clone(&self.tree))
	}

	/// Lower-case tag name.
	pub fn tag_name(&self) -> String {
		self.tree
			.borrow()
			.element(self.id)
			.map(|element| element.tag_name.clone())
			.unwrap_or_default()
	}

	/// Reads a content attribute.
	pub fn get_attribute(&self, name: &str) -> Option<String> {
		self.tree
			.borrow()
			.element(self.id)
			.and_then(|element| element.attr(name).map(str::to_string))
	}

	/// Sets a content attribute, replacing any previous value.
	pub fn set_attribute(&self, name: &str, value: &str) {
		if let Some(element) = self.tree.borrow_mut().element_mut(self.id) {
			element.set_attr(name, value);
		}
	}

	/// Removes a content attribute. Returns whether it was present.
	pub fn remove_attribute(&self, name: &str) -> bool {
		self.tree
			.borrow_mut()
			.element_mut(self.id)
			.is_some_and(|element| element.remove_attr(name))
	}

	/// Whether the attribute is present.
	pub fn has_attribute(&self, name: &str) -> bool {
		self.get_attribute(name).is_some()
	}

	/// All attributes in insertion order.
	pub fn attributes(&self) -> Vec<(String, String)> {
		self.tree
			.borrow()
			.element(self.id)
			.map(|element| element.attrs.clone())
			.unwrap_or_default()
	}

	/// The control's current value (the `value` property).
	pub fn value(&self) -> String {
		form::control_value(&self.tree.borrow(), self.id)
	}

	/// Sets the `value` property.
	///
	/// This is a programmatic write: no `input` or `change` event fires.
	pub fn set_value(&self, value: &str) {
		if let Some(element) = self.tree.borrow_mut().element_mut(self.id) {
			element.value = Some(value.to_string());
		}
	}

	/// Checkedness of a checkbox or radio input.
	pub fn checked(&self) -> bool {
		form::checkedness(&self.tree.borrow(), self.id)
	}

	/// Sets checkedness without firing events.
	pub fn set_checked(&self, checked: bool) {
		if let Some(element) = self.tree.borrow_mut().element_mut(self.id) {
			element.checked = Some(checked);
		}
	}

	/// Concatenated text of all descendant text nodes.
	pub fn text_content(&self) -> String {
		self.tree.borrow().text_content(self.id)
	}

	/// Replaces all children with a single text node.
	pub fn set_text_content(&self, text: &str) -> DomResult<()> {
		self.tree.borrow_mut().set_text_content(self.id, text)
	}

	/// Appends `child` as the last child, moving it if already in the tree.
	pub fn append_child(&self, child: &Element) -> DomResult<()> {
		self.same_document(child)?;
		self.tree.borrow_mut().append_child(self.id, child.id)
	}

	/// Inserts `element` relative to this element.
	pub fn insert_adjacent_element(&self, position: InsertPosition, element: &Element) -> DomResult<()> {
		self.same_document(element)?;
		self.tree
			.borrow_mut()
			.insert_adjacent(self.id, position, element.id)
	}

	/// Detaches this element from its parent. A no-op when already detached.
	pub fn remove(&self) {
		// Element handles never point at the document node, so this cannot fail.
		let _ = self.tree.borrow_mut().remove(self.id);
	}

	/// Parent element, if any.
	pub fn parent_element(&self) -> Option<Element> {
		let parent = self.tree.borrow().parent_element(self.id);
		parent.map(|id| self.wrap(id))
	}

	/// Next sibling that is an element.
	pub fn next_element_sibling(&self) -> Option<Element> {
		let sibling = self.tree.borrow().next_element_sibling(self.id);
		sibling.map(|id| self.wrap(id))
	}

	/// Previous sibling that is an element.
	pub fn previous_element_sibling(&self) -> Option<Element> {
		let sibling = self.tree.borrow().previous_element_sibling(self.id);
		sibling.map(|id| self.wrap(id))
	}

	/// Element children in order.
	pub fn children(&self) -> Vec<Element> {
		let ids: Vec<NodeId> = {
			let tree = self.tree.borrow();
			tree.nodes[self.id.0]
				.children
				.iter()
				.copied()
				.filter(|child| tree.element(*child).is_some())
				.collect()
		};
		ids.into_iter().map(|id| self.wrap(id)).collect()
	}

	/// Whether the element is attached to its document.
	pub fn is_connected(&self) -> bool {
		self.tree.borrow().is_connected(self.id)
	}

	/// Whether `other` is this element or one of its descendants.
	pub fn contains(&self, other: &Element) -> bool {
		Rc::ptr_eq(&self.tree, &other.tree)
			&& self.tree.borrow().is_inclusive_ancestor(self.id, other.id)
	}

	/// Whether the element matches `selector`.
	pub fn matches(&self, selector: &str) -> DomResult<bool> {
		let list = SelectorList::parse(selector)?;
		Ok(list.matches(&self.tree.borrow(), self.id))
	}

	/// Nearest inclusive ancestor matching `selector`.
	pub fn closest(&self, selector: &str) -> DomResult<Option<Element>> {
		let list = SelectorList::parse(selector)?;
		let found = {
			let tree = self.tree.borrow();
			let mut cursor = Some(self.id);
			let mut found = None;
			while let Some(node) = cursor {
				if list.matches(&tree, node) {
					found = Some(node);
					break;
				}
				cursor = tree.parent_element(node);
			}
			found
		};
		Ok(found.map(|id| self.wrap(id)))
	}

	/// First descendant matching `selector`.
	pub fn query_selector(&self, selector: &str) -> DomResult<Option<Element>> {
		Ok(self.query_selector_all(selector)?.into_iter().next())
	}

	/// All descendants matching `selector`, in tree order.
	pub fn query_selector_all(&self, selector: &str) -> DomResult<Vec<Element>> {
		query_all(&self.tree, self.id, selector)
	}

	/// The form this control is associated with.
	pub fn form_owner(&self) -> Option<Element> {
		let owner = form::form_owner(&self.tree.borrow(), self.id);
		owner.map(|id| self.wrap(id))
	}

	/// Registers an event listener.
	pub fn add_event_listener<F>(&self, event_type: &str, options: ListenerOptions, handler: F) -> EventHandle
	where
		F: Fn(&mut Event) + 'static,
	{
		let id = self
			.tree
			.borrow_mut()
			.listeners
			.add(self.id, event_type, options, Rc::new(handler));
		EventHandle::new(&self.tree, self.id, id)
	}

	/// Number of listeners registered on this element.
	pub fn listener_count(&self) -> usize {
		self.tree.borrow().listeners.count(self.id)
	}

	/// Dispatches `event` with this element as target.
	///
	/// Returns `false` if a listener cancelled the event.
	pub fn dispatch_event(&self, event: Event) -> bool {
		!event::dispatch(&self.tree, self.id, event).default_prevented()
	}

	/// Focuses the element, blurring the previously focused one.
	///
	/// Fires `focus` (non-bubbling) and `focusin` (bubbling). Disabled or
	/// disconnected elements cannot receive focus.
	pub fn focus(&self) {
		let previous = {
			let tree = self.tree.borrow();
			if !tree.is_connected(self.id) || form::is_disabled(&tree, self.id) {
				return;
			}
			if tree.active_element == Some(self.id) {
				return;
			}
			tree.active_element
		};
		if let Some(previous) = previous {
			self.wrap(previous).blur();
		}
		self.tree.borrow_mut().active_element = Some(self.id);
		self.dispatch_event(Event::new("focus"));
		self.dispatch_event(Event::new("focusin").bubbles(true));
	}

	/// Blurs the element if it is focused, firing `blur` then `focusout`.
	pub fn blur(&self) {
		{
			let mut tree = self.tree.borrow_mut();
			if tree.active_element != Some(self.id) {
				return;
			}
			tree.active_element = None;
		}
		self.dispatch_event(Event::new("blur"));
		self.dispatch_event(Event::new("focusout").bubbles(true));
	}

	/// Whether the control takes part in constraint validation.
	pub fn will_validate(&self) -> bool {
		form::will_validate(&self.tree.borrow(), self.id)
	}

	/// Current validity flags. Controls barred from validation are always valid.
	pub fn validity(&self) -> ValidityState {
		form::validity(&self.tree.borrow(), self.id)
	}

	/// Runs constraint validation.
	///
	/// On a form, every owned control is checked. Each invalid control
	/// receives a cancelable, non-bubbling `invalid` event.
	pub fn check_validity(&self) -> bool {
		let candidates = {
			let tree = self.tree.borrow();
			if tree.element(self.id).is_some_and(|element| element.tag_name == "form") {
				form::form_controls(&tree, self.id)
			} else {
				vec![self.id]
			}
		};

		let mut all_valid = true;
		for candidate in candidates {
			let valid = form::validity(&self.tree.borrow(), candidate).valid();
			if !valid {
				all_valid = false;
				self.wrap(candidate)
					.dispatch_event(Event::new("invalid").cancelable(true));
			}
		}
		all_valid
	}

	/// Controls owned by this form, in tree order.
	pub fn elements(&self) -> DomResult<Vec<Element>> {
		self.require_form()?;
		let ids = form::form_controls(&self.tree.borrow(), self.id);
		Ok(ids.into_iter().map(|id| self.wrap(id)).collect())
	}

	/// Validates and submits this form.
	///
	/// Returns the submitted entries, or `None` when validation failed or a
	/// `submit` listener cancelled the submission. `novalidate` skips
	/// validation.
	pub fn request_submit(&self) -> DomResult<Option<FormData>> {
		self.require_form()?;
		if !self.has_attribute("novalidate") && !self.check_validity() {
			tracing::debug!(form = self.id.0, "form submission blocked by validation");
			return Ok(None);
		}
		if !self.dispatch_event(Event::new("submit").bubbles(true).cancelable(true)) {
			return Ok(None);
		}
		Ok(Some(form::form_data(&self.tree.borrow(), self.id)))
	}

	pub(crate) fn require_form(&self) -> DomResult<()> {
		let tag = self.tag_name();
		if tag == "form" {
			Ok(())
		} else {
			Err(DomError::NotAForm(tag))
		}
	}

	/// Serializes the element and its subtree to HTML.
	pub fn outer_html(&self) -> String {
		let mut out = String::new();
		serialize(&self.tree.borrow(), self.id, &mut out);
		out
	}
}

impl PartialEq for Element {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.tree, &other.tree) && self.id == other.id
	}
}

impl Eq for Element {}

impl fmt::Debug for Element {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Element")
			.field("id", &self.id.0)
			.field("tag_name", &self.tag_name())
			.finish()
	}
}

pub(crate) fn query_all(tree: &Rc<RefCell<Tree>>, root: NodeId, selector: &str) -> DomResult<Vec<Element>> {
	let list = SelectorList::parse(selector)?;
	let matches: Vec<NodeId> = {
		let tree_ref = tree.borrow();
		let mut descendants = Vec::new();
		tree_ref.descendant_elements(root, &mut descendants);
		descendants
			.into_iter()
			.filter(|node| list.matches(&tree_ref, *node))
			.collect()
	};
	Ok(matches
		.into_iter()
		.map(|id| Element::from_parts(Rc::clone(tree), id))
		.collect())
}

fn serialize(tree: &Tree, id: NodeId, out: &mut String) {
	match &tree.nodes[id.0].kind {
		NodeKind::Text(text) => out.push_str(&escape(text, false)),
		NodeKind::Document => {
			for child in &tree.nodes[id.0].children {
				serialize(tree, *child, out);
			}
		}
		NodeKind::Element(element) => {
			out.push('<');
			out.push_str(&element.tag_name);
			for (name, value) in &element.attrs {
				out.push(' ');
				out.push_str(name);
				out.push_str("=\"");
				out.push_str(&escape(value, true));
				out.push('"');
			}
			out.push('>');
			if VOID_ELEMENTS.contains(&element.tag_name.as_str()) {
				return;
			}
			for child in &tree.nodes[id.0].children {
				serialize(tree, *child, out);
			}
			out.push_str("</");
			out.push_str(&element.tag_name);
			out.push('>');
		}
	}
}

fn escape(value: &str, attribute: bool) -> String {
	let mut out = String::with_capacity(value.len());
	for c in value.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' if !attribute => out.push_str("&lt;"),
			'>' if !attribute => out.push_str("&gt;"),
			'"' if attribute => out.push_str("&quot;"),
			_ => out.push(c),
		}
	}
	out
}
