//! A minimal rendering host.
//!
//! Real applications get their mount, ref and unmount notifications from a
//! component framework. This host provides the same sequence for a plain
//! render closure so bindings can be driven end to end against a
//! [`Document`](formbridge_dom::Document):
//!
//! 1. render: run the component, collecting the refs it registers
//! 2. insert the returned root into the container (or swap it in place)
//! 3. commit: attach collected refs, detach refs that were not registered
//!    again, then flush pending bindings
//!
//! Unmounting detaches every ref, removes the root and tears the scope down.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use formbridge_dom::{Element, InsertPosition};
use tracing::debug;

use crate::callback::NodeRef;
use crate::error::BindingResult;
use crate::hooks::{Scope, UseField, use_field};
use crate::options::FieldOptions;

/// A component: renders its root element for the current pass.
pub type Component = Rc<dyn Fn(&RenderContext) -> BindingResult<Element>>;

/// Per-render access to the component scope and ref registration.
pub struct RenderContext {
	scope: Scope,
	refs: RefCell<Vec<(NodeRef, Element)>>,
}

impl RenderContext {
	fn new(scope: Scope) -> Self {
		Self {
			scope,
			refs: RefCell::new(Vec::new()),
		}
	}

	/// The component's hook storage.
	pub fn scope(&self) -> &Scope {
		&self.scope
	}

	/// Shorthand for [`use_field`] on this component's scope.
	pub fn use_field(&self, name: &str, options: FieldOptions) -> BindingResult<UseField> {
		use_field(&self.scope, name, options)
	}

	/// Attaches `node_ref` to `element` once this pass is committed.
	pub fn bind_ref(&self, node_ref: &NodeRef, element: &Element) {
		self.refs
			.borrow_mut()
			.push((node_ref.clone(), element.clone()));
	}

	fn into_refs(self) -> Vec<(NodeRef, Element)> {
		self.refs.into_inner()
	}
}

/// A component rendered into a container element.
pub struct MountedComponent {
	container: Element,
	component: Component,
	scope: Scope,
	root: Option<Element>,
	refs: Vec<(NodeRef, Element)>,
}

/// Renders `component` and appends its root to `container`.
///
/// Refs registered during the render are attached after the root is in the
/// tree.
pub fn mount<F>(container: &Element, component: F) -> BindingResult<MountedComponent>
where
	F: Fn(&RenderContext) -> BindingResult<Element> + 'static,
{
	let scope = Scope::new();
	let component: Component = Rc::new(component);
	let context = RenderContext::new(scope.clone());
	let root = match component(&context) {
		Ok(root) => root,
		Err(error) => {
			scope.teardown();
			return Err(error);
		}
	};
	if let Err(error) = container.append_child(&root) {
		scope.teardown();
		return Err(error.into());
	}
	debug!(root = %root.tag_name(), "component mounted");

	let mut mounted = MountedComponent {
		container: container.clone(),
		component,
		scope,
		root: Some(root),
		refs: Vec::new(),
	};
	mounted.commit(context.into_refs());
	Ok(mounted)
}

impl MountedComponent {
	/// Runs the component again and commits the result.
	///
	/// A different root element replaces the old one in place. Does nothing
	/// after [`unmount`](Self::unmount).
	pub fn rerender(&mut self) -> BindingResult<()> {
		let Some(old_root) = self.root.clone() else {
			return Ok(());
		};
		let context = RenderContext::new(self.scope.clone());
		let root = (self.component)(&context)?;
		if root != old_root {
			if old_root.is_connected() {
				old_root.insert_adjacent_element(InsertPosition::BeforeBegin, &root)?;
				old_root.remove();
			} else {
				self.container.append_child(&root)?;
			}
			debug!(root = %root.tag_name(), "component root replaced");
			self.root = Some(root);
		}
		self.commit(context.into_refs());
		Ok(())
	}

	/// Detaches refs, removes the root and tears the scope down. Idempotent.
	pub fn unmount(&mut self) {
		let Some(root) = self.root.take() else {
			return;
		};
		for (node_ref, _) in self.refs.drain(..) {
			node_ref.set(None);
		}
		root.remove();
		self.scope.teardown();
		debug!("component unmounted");
	}

	/// Whether the component is still mounted.
	pub fn is_mounted(&self) -> bool {
		self.root.is_some()
	}

	/// The current root element.
	pub fn root(&self) -> Option<&Element> {
		self.root.as_ref()
	}

	/// The component's hook storage.
	pub fn scope(&self) -> &Scope {
		&self.scope
	}

	fn commit(&mut self, refs: Vec<(NodeRef, Element)>) {
		for (previous, _) in &self.refs {
			if !refs.iter().any(|(node_ref, _)| node_ref == previous) {
				previous.set(None);
			}
		}
		for (node_ref, element) in &refs {
			node_ref.set(Some(element));
		}
		self.refs = refs;
		self.scope.flush();
	}
}

impl Drop for MountedComponent {
	fn drop(&mut self) {
		self.unmount();
	}
}

impl fmt::Debug for MountedComponent {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MountedComponent")
			.field("root", &self.root)
			.field("scope", &self.scope)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::engine::BindingState;
	use formbridge_dom::Document;
	use rstest::{fixture, rstest};
	use std::cell::Cell;

	#[fixture]
	fn form() -> Element {
		let document = Document::new();
		let form = document.create_element("form");
		document.body().unwrap().append_child(&form).unwrap();
		form
	}

	#[rstest]
	fn test_mount_attaches_refs_after_insertion(form: Element) {
		let document = form.owner_document();

		let mounted = mount(&form, move |ctx| {
			let field = ctx.use_field("test", FieldOptions::default())?;
			let widget = document.create_element("div");
			ctx.bind_ref(&field.field, &widget);
			Ok(widget)
		})
		.unwrap();

		let field = mounted.scope().field("test").unwrap();
		assert_eq!(field.state(), BindingState::Bound);
		assert_eq!(mounted.root().and_then(Element::next_element_sibling), field.hidden_input());
	}

	#[rstest]
	fn test_render_error_tears_scope_down(form: Element) {
		let document = form.owner_document();

		let result = mount(&form, move |ctx| {
			ctx.use_field("test", FieldOptions::default())?;
			ctx.use_field(" ", FieldOptions::default())?;
			Ok(document.create_element("div"))
		});

		assert!(result.is_err());
		assert!(form.children().is_empty());
	}

	#[rstest]
	fn test_rerender_with_same_root_keeps_it(form: Element) {
		let root = form.owner_document().create_element("div");
		let renders = Rc::new(Cell::new(0));
		let mut mounted = mount(&form, {
			let root = root.clone();
			let renders = Rc::clone(&renders);
			move |_ctx| {
				renders.set(renders.get() + 1);
				Ok(root.clone())
			}
		})
		.unwrap();

		mounted.rerender().unwrap();

		assert_eq!(renders.get(), 2);
		assert_eq!(mounted.root(), Some(&root));
		assert_eq!(form.children(), vec![root]);
	}

	#[rstest]
	fn test_dropped_ref_is_detached_on_rerender(form: Element) {
		let document = form.owner_document();
		let show = Rc::new(Cell::new(true));
		let mut mounted = mount(&form, {
			let show = Rc::clone(&show);
			move |ctx| {
				let field = ctx.use_field("optional", FieldOptions::default())?;
				let widget = document.create_element("div");
				if show.get() {
					ctx.bind_ref(&field.field, &widget);
				}
				Ok(widget)
			}
		})
		.unwrap();
		let field = mounted.scope().field("optional").unwrap();
		assert!(field.is_bound());

		show.set(false);
		mounted.rerender().unwrap();

		assert_eq!(field.state(), BindingState::Unbound);
		assert!(!field.is_torn_down());
	}

	#[rstest]
	fn test_unmount_is_idempotent(form: Element) {
		let document = form.owner_document();
		let mut mounted = mount(&form, move |_ctx| Ok(document.create_element("div"))).unwrap();

		mounted.unmount();
		mounted.unmount();

		assert!(!mounted.is_mounted());
		assert!(form.children().is_empty());
		assert!(mounted.rerender().is_ok());
	}
}
