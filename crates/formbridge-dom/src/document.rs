//! Document handle.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::element::{self, Element};
use crate::error::DomResult;
use crate::event::{Event, EventHandle, ListenerOptions};
use crate::form::{self, FormData};
use crate::node::Tree;

/// A cheap, cloneable handle to an in-memory HTML document.
///
/// A new document contains `<html><head></head><body></body></html>`.
///
/// The node arena only grows. Removing an element detaches it but keeps its
/// slot and its listeners, since a removed element may be inserted again
/// and must still have its listeners then. Memory is released when the last
/// handle to the document is dropped.
#[derive(Clone)]
pub struct Document {
	tree: Rc<RefCell<Tree>>,
}

impl Default for Document {
	fn default() -> Self {
		Self::new()
	}
}

impl Document {
	/// Creates an empty HTML document.
	pub fn new() -> Self {
		let mut tree = Tree::new();
		let html = tree.create_element("html");
		let head = tree.create_element("head");
		let body = tree.create_element("body");
		let root = tree.root;
		// A fresh arena has no cycles, so none of these can fail.
		let _ = tree.append_child(root, html);
		let _ = tree.append_child(html, head);
		let _ = tree.append_child(html, body);
		Self {
			tree: Rc::new(RefCell::new(tree)),
		}
	}

	pub(crate) fn from_tree(tree: Rc<RefCell<Tree>>) -> Self {
		Self { tree }
	}

	/// The `<html>` element.
	pub fn document_element(&self) -> Option<Element> {
		self.query_selector("html").ok().flatten()
	}

	/// The `<body>` element.
	pub fn body(&self) -> Option<Element> {
		self.query_selector("body").ok().flatten()
	}

	/// Creates a detached element.
	pub fn create_element(&self, tag_name: &str) -> Element {
		let id = self.tree.borrow_mut().create_element(tag_name);
		Element::from_parts(Rc::clone(&self.tree), id)
	}

	/// Number of nodes ever created in this document, connected or not.
	pub fn node_count(&self) -> usize {
		self.tree.borrow().nodes.len()
	}

	/// First connected element matching `selector`.
	pub fn query_selector(&self, selector: &str) -> DomResult<Option<Element>> {
		Ok(self.query_selector_all(selector)?.into_iter().next())
	}

	/// All connected elements matching `selector`, in tree order.
	pub fn query_selector_all(&self, selector: &str) -> DomResult<Vec<Element>> {
		let root = self.tree.borrow().root;
		element::query_all(&self.tree, root, selector)
	}

	/// Connected element with the given `id` attribute.
	pub fn get_element_by_id(&self, id: &str) -> Option<Element> {
		let found = {
			let tree = self.tree.borrow();
			tree.element_by_id(tree.root, id)
		};
		found.map(|node| Element::from_parts(Rc::clone(&self.tree), node))
	}

	/// Collects the entries `form` would submit, like `new FormData(form)`.
	pub fn form_data(&self, form: &Element) -> DomResult<FormData> {
		form.require_form()?;
		Ok(form::form_data(&self.tree.borrow(), form.node_id()))
	}

	/// The focused element, if any.
	pub fn active_element(&self) -> Option<Element> {
		let active = self.tree.borrow().active_element;
		active.map(|node| Element::from_parts(Rc::clone(&self.tree), node))
	}

	/// Registers a listener on the document node itself.
	///
	/// Bubbling events reach it last; capture listeners run first.
	pub fn add_event_listener<F>(&self, event_type: &str, options: ListenerOptions, handler: F) -> EventHandle
	where
		F: Fn(&mut Event) + 'static,
	{
		let root = self.tree.borrow().root;
		let id = self
			.tree
			.borrow_mut()
			.listeners
			.add(root, event_type, options, Rc::new(handler));
		EventHandle::new(&self.tree, root, id)
	}

	/// Serializes the whole document.
	pub fn to_html(&self) -> String {
		self.document_element()
			.map(|html| html.outer_html())
			.unwrap_or_default()
	}
}

impl PartialEq for Document {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.tree, &other.tree)
	}
}

impl fmt::Debug for Document {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Document")
			.field("nodes", &self.tree.borrow().nodes.len())
			.finish()
	}
}
