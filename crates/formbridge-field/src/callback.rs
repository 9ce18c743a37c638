//! Callback wrappers handed to widget authors.
//!
//! - **Callback<Args, Ret>**: a cloneable handler, used for `on_change` and
//!   `on_blur`
//! - **NodeRef**: a ref callback the host calls with the widget's root element
//!   on attach and with `None` on detach
//!
//! Both are `Rc` based. Field bindings live on the UI thread and never cross
//! threads, so no `Send`/`Sync` bounds are imposed on the closures.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use formbridge_dom::Element;

/// A cloneable callback wrapper.
///
/// Clones share the same closure, so a callback handed out on every render
/// pass keeps a stable identity.
///
/// # Example
///
/// ```
/// use formbridge_field::Callback;
///
/// let double = Callback::new(|n: i32| n * 2);
/// assert_eq!(double.call(21), 42);
/// ```
pub struct Callback<Args, Ret = ()> {
	inner: Rc<dyn Fn(Args) -> Ret + 'static>,
}

impl<Args, Ret> Callback<Args, Ret> {
	/// Wraps a function or closure.
	pub fn new<F>(f: F) -> Self
	where
		F: Fn(Args) -> Ret + 'static,
	{
		Self { inner: Rc::new(f) }
	}

	/// Invokes the callback.
	pub fn call(&self, args: Args) -> Ret {
		(self.inner)(args)
	}

	/// Whether both callbacks share the same closure.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}
}

impl<Args, Ret> Clone for Callback<Args, Ret> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<Args, Ret> fmt::Debug for Callback<Args, Ret> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Callback")
			.field("inner", &"<function>")
			.finish()
	}
}

impl<F, Args, Ret> From<F> for Callback<Args, Ret>
where
	F: Fn(Args) -> Ret + 'static,
{
	fn from(f: F) -> Self {
		Self::new(f)
	}
}

type RefHandler = Rc<dyn Fn(Option<&Element>)>;

/// A ref callback attached to a widget's root element.
///
/// The host calls [`set`](Self::set) with the element after it is in the
/// document and with `None` when it goes away. The last value is kept and can
/// be read back with [`get`](Self::get).
#[derive(Clone)]
pub struct NodeRef {
	handler: RefHandler,
	current: Rc<RefCell<Option<Element>>>,
}

impl NodeRef {
	/// Creates a ref that runs `handler` on every attach and detach.
	pub fn new<F>(handler: F) -> Self
	where
		F: Fn(Option<&Element>) + 'static,
	{
		Self {
			handler: Rc::new(handler),
			current: Rc::new(RefCell::new(None)),
		}
	}

	/// Records `node` and notifies the handler.
	pub fn set(&self, node: Option<&Element>) {
		*self.current.borrow_mut() = node.cloned();
		(self.handler)(node);
	}

	/// The element the ref is currently attached to.
	pub fn get(&self) -> Option<Element> {
		self.current.borrow().clone()
	}
}

impl PartialEq for NodeRef {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.current, &other.current)
	}
}

impl fmt::Debug for NodeRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("NodeRef")
			.field("current", &self.current.borrow())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use formbridge_dom::Document;
	use rstest::rstest;

	#[rstest]
	fn test_callback_clone_shares_closure() {
		let calls = Rc::new(RefCell::new(Vec::new()));
		let callback = Callback::new({
			let calls = Rc::clone(&calls);
			move |value: String| calls.borrow_mut().push(value)
		});
		let cloned = callback.clone();

		callback.call("a".to_string());
		cloned.call("b".to_string());

		assert!(callback.ptr_eq(&cloned));
		assert_eq!(*calls.borrow(), vec!["a", "b"]);
	}

	#[rstest]
	fn test_callback_from_closure() {
		let callback: Callback<(), &'static str> = (|()| "done").into();

		assert_eq!(callback.call(()), "done");
	}

	#[rstest]
	fn test_node_ref_tracks_current_element() {
		let seen = Rc::new(RefCell::new(Vec::new()));
		let node_ref = NodeRef::new({
			let seen = Rc::clone(&seen);
			move |node| seen.borrow_mut().push(node.map(Element::tag_name))
		});
		let element = Document::new().create_element("div");

		node_ref.set(Some(&element));
		assert_eq!(node_ref.get(), Some(element));
		node_ref.set(None);

		assert_eq!(node_ref.get(), None);
		assert_eq!(*seen.borrow(), vec![Some("div".to_string()), None]);
		assert_eq!(node_ref, node_ref.clone());
	}
}
