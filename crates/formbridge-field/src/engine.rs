//! The field binding state machine.
//!
//! A binding moves between three states:
//!
//! ```text
//!            attach(connected)              detach / teardown
//! Unbound ───────────────────────► Bound ──────────────────────► Unbound
//!    │                              ▲
//!    │ attach(disconnected)         │ flush, once the anchor is connected
//!    ▼                              │
//! Pending ──────────────────────────┘
//! ```
//!
//! While bound, the binding's single hidden input follows the anchor, either
//! directly or behind the inputs of other bindings sharing that anchor.
//! Attaching to a different anchor, or finding the input out of place,
//! removes it and mounts a fresh one seeded with the last reported value.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use formbridge_dom::Element;
use tracing::{debug, warn};

use crate::callback::{Callback, NodeRef};
use crate::error::{BindingError, BindingResult};
use crate::forwarder::EventForwarder;
use crate::hidden_input::HiddenInputManager;
use crate::options::FieldOptions;
use crate::ports::{FieldAdapter, LifecyclePort};
use crate::resolver::{Anchor, RefResolver};
use crate::value::ValueBridge;

/// Lifecycle state of a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
	/// No anchor, no hidden input.
	Unbound,
	/// An anchor was attached before it was connected; waiting for a flush.
	Pending,
	/// The hidden input is mounted next to the anchor.
	Bound,
}

pub(crate) struct Binding {
	pub(crate) name: String,
	pub(crate) options: FieldOptions,
	pub(crate) state: BindingState,
	pub(crate) anchor: Option<Element>,
	pub(crate) inputs: HiddenInputManager,
	pub(crate) value: ValueBridge,
	pub(crate) torn_down: bool,
}

impl Binding {
	fn bind(&mut self, anchor: Element) -> BindingResult<()> {
		if self.state == BindingState::Bound
			&& self.anchor.as_ref() == Some(&anchor)
			&& self.inputs.is_placed_after(&anchor)
		{
			return Ok(());
		}
		let remounting = self.inputs.node().is_some();
		self.anchor = Some(anchor.clone());
		match self
			.inputs
			.mount(&anchor, &self.name, self.value.current(), &self.options)
		{
			Ok(_) => {
				self.state = BindingState::Bound;
				debug!(field = %self.name, remounting, "field bound");
				Ok(())
			}
			Err(error) => {
				self.inputs.unmount();
				self.anchor = None;
				self.state = BindingState::Unbound;
				Err(error)
			}
		}
	}

	fn defer(&mut self, anchor: Element) {
		self.inputs.unmount();
		debug!(field = %self.name, anchor = %anchor.tag_name(), "anchor not connected; deferring mount");
		self.anchor = Some(anchor);
		self.state = BindingState::Pending;
	}

	fn unbind(&mut self) {
		let removed = self.inputs.unmount();
		if removed || self.state != BindingState::Unbound {
			debug!(field = %self.name, "field unbound");
		}
		self.anchor = None;
		self.state = BindingState::Unbound;
	}
}

/// Composition root of a field binding.
///
/// Creates [`FieldHandle`]s, the object a widget's ref, `on_change` and
/// `on_blur` all point at.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldBindingEngine;

impl FieldBindingEngine {
	/// Creates an unbound field named `name`.
	///
	/// The name is kept as given, but it must not be blank. Input kinds whose
	/// value never reaches `FormData`, such as `checkbox` or `file`, are
	/// rejected.
	pub fn bind(name: &str, options: FieldOptions) -> BindingResult<FieldHandle> {
		if name.trim().is_empty() {
			return Err(BindingError::InvalidFieldName(name.to_string()));
		}
		if !options.kind.mirrors_value() {
			return Err(BindingError::UnsupportedInputType(options.kind.input_type().to_string()));
		}
		let value = ValueBridge::new(options.initial_value.clone());
		let binding = Binding {
			name: name.to_string(),
			options,
			state: BindingState::Unbound,
			anchor: None,
			inputs: HiddenInputManager::new(),
			value,
			torn_down: false,
		};
		debug!(field = name, "field binding created");
		Ok(FieldHandle {
			inner: Rc::new(RefCell::new(binding)),
		})
	}
}

/// Shared handle to one field binding.
///
/// Cloning is cheap and every clone drives the same binding. The hidden input
/// is removed on [`teardown`](LifecyclePort::teardown), or when the last
/// handle is dropped.
#[derive(Clone)]
pub struct FieldHandle {
	inner: Rc<RefCell<Binding>>,
}

impl FieldHandle {
	/// The field name.
	pub fn name(&self) -> String {
		self.inner.borrow().name.clone()
	}

	/// The last reported value, or the initial value.
	pub fn value(&self) -> String {
		self.inner.borrow().value.current().to_string()
	}

	/// Current lifecycle state.
	pub fn state(&self) -> BindingState {
		self.inner.borrow().state
	}

	/// Whether a hidden input is mounted.
	pub fn is_bound(&self) -> bool {
		self.state() == BindingState::Bound
	}

	/// Whether [`teardown`](LifecyclePort::teardown) has run.
	pub fn is_torn_down(&self) -> bool {
		self.inner.borrow().torn_down
	}

	/// The hidden input, while bound.
	pub fn hidden_input(&self) -> Option<Element> {
		self.inner.borrow().inputs.node().cloned()
	}

	/// The element the widget's ref currently points at.
	pub fn anchor(&self) -> Option<Element> {
		self.inner.borrow().anchor.clone()
	}

	/// Options the binding was created with.
	pub fn options(&self) -> FieldOptions {
		self.inner.borrow().options.clone()
	}

	/// Attaches to `node`, returning why the hidden input could not be mounted.
	///
	/// A disconnected node is not an error: the binding becomes
	/// [`Pending`](BindingState::Pending) and the mount is retried by
	/// [`flush`](Self::flush).
	pub fn try_attach(&self, node: &Element) -> BindingResult<()> {
		let mut binding = self.inner.borrow_mut();
		if binding.torn_down {
			return Err(BindingError::TornDown(binding.name.clone()));
		}
		match RefResolver::resolve(Some(node)) {
			Anchor::Ready(anchor) => binding.bind(anchor),
			Anchor::Deferred(anchor) => {
				binding.defer(anchor);
				Ok(())
			}
			Anchor::Absent => {
				binding.unbind();
				Ok(())
			}
		}
	}

	/// Re-checks the anchor after the host committed a render.
	///
	/// A pending anchor that is now connected gets its hidden input. A bound
	/// anchor that left the document loses its input and goes back to
	/// pending. A bound input that was moved away from its anchor is put back.
	pub fn flush(&self) {
		let mut binding = self.inner.borrow_mut();
		if binding.torn_down {
			return;
		}
		let Some(anchor) = binding.anchor.clone() else {
			return;
		};
		match (binding.state, RefResolver::resolve(Some(&anchor))) {
			(BindingState::Pending | BindingState::Bound, Anchor::Ready(anchor)) => {
				if let Err(error) = binding.bind(anchor) {
					warn!(field = %binding.name, %error, "could not mount hidden input");
				}
			}
			(BindingState::Bound, Anchor::Deferred(anchor)) => binding.defer(anchor),
			_ => {}
		}
	}

	/// The forwarder behind `on_change` and `on_blur`.
	pub fn forwarder(&self) -> EventForwarder {
		EventForwarder::new(&self.inner)
	}

	/// A ref callback that attaches and detaches this binding.
	///
	/// The callback holds the binding weakly.
	pub fn node_ref(&self) -> NodeRef {
		let weak = Rc::downgrade(&self.inner);
		NodeRef::new(move |node| {
			if let Some(inner) = weak.upgrade() {
				let handle = FieldHandle { inner };
				match node {
					Some(node) => handle.attach(node),
					None => handle.detach(),
				}
			}
		})
	}

	/// `on_change` adapter for the widget.
	pub fn on_change(&self) -> Callback<String> {
		let forwarder = self.forwarder();
		Callback::new(move |value: String| forwarder.on_change(&value))
	}

	/// `on_blur` adapter for the widget.
	pub fn on_blur(&self) -> Callback<()> {
		let forwarder = self.forwarder();
		Callback::new(move |()| forwarder.on_blur())
	}

	/// Whether both handles drive the same binding.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}
}

impl LifecyclePort for FieldHandle {
	fn attach(&self, node: &Element) {
		if let Err(error) = self.try_attach(node) {
			warn!(field = %self.name(), %error, "could not attach field");
		}
	}

	fn detach(&self) {
		self.inner.borrow_mut().unbind();
	}

	fn teardown(&self) {
		let mut binding = self.inner.borrow_mut();
		if binding.torn_down {
			return;
		}
		binding.unbind();
		binding.torn_down = true;
		debug!(field = %binding.name, "field torn down");
	}
}

impl FieldAdapter for FieldHandle {
	fn report_change(&self, value: &str) {
		self.forwarder().on_change(value);
	}

	fn report_blur(&self) {
		self.forwarder().on_blur();
	}
}

impl fmt::Debug for FieldHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let binding = self.inner.borrow();
		f.debug_struct("FieldHandle")
			.field("name", &binding.name)
			.field("state", &binding.state)
			.field("value", &binding.value.current())
			.finish()
	}
}
