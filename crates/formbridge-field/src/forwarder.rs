//! Forwarding widget interactions as native events.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use formbridge_dom::{Element, Event};
use tracing::{debug, trace, warn};

use crate::engine::Binding;

/// Turns widget-level `change`/`blur` reports into events on the hidden
/// input.
///
/// A forwarder only holds a weak reference to its binding. Calls that arrive
/// after the binding is gone, torn down, or unmounted are dropped without an
/// error, so stale closures held by a widget are harmless.
#[derive(Debug, Clone)]
pub struct EventForwarder {
	binding: Weak<RefCell<Binding>>,
}

impl EventForwarder {
	pub(crate) fn new(binding: &Rc<RefCell<Binding>>) -> Self {
		Self {
			binding: Rc::downgrade(binding),
		}
	}

	/// Mirrors `value`, then fires `input` and `change` on the hidden input.
	///
	/// Both events bubble and are not cancelable. They fire on every call,
	/// even when `value` equals the current value.
	pub fn on_change(&self, value: &str) {
		let Some(binding) = self.binding.upgrade() else {
			trace!("change reported to a dropped binding");
			return;
		};
		let target = {
			let Ok(mut binding) = binding.try_borrow_mut() else {
				warn!("change reported while the binding is busy; ignoring");
				return;
			};
			if binding.torn_down {
				debug!(field = %binding.name, "change reported after teardown; ignoring");
				return;
			}
			let binding = &mut *binding;
			binding.value.report(value, &binding.inputs);
			binding.inputs.node().cloned()
		};
		if let Some(input) = target {
			dispatch(&input, Event::new("input").bubbles(true));
			dispatch(&input, Event::new("change").bubbles(true));
		}
	}

	/// Fires `blur` then `focusout` on the hidden input. The value is not
	/// touched.
	pub fn on_blur(&self) {
		let Some(binding) = self.binding.upgrade() else {
			trace!("blur reported to a dropped binding");
			return;
		};
		let target = {
			let Ok(binding) = binding.try_borrow() else {
				warn!("blur reported while the binding is busy; ignoring");
				return;
			};
			if binding.torn_down {
				debug!(field = %binding.name, "blur reported after teardown; ignoring");
				return;
			}
			binding.inputs.node().cloned()
		};
		if let Some(input) = target {
			dispatch(&input, Event::new("blur"));
			dispatch(&input, Event::new("focusout").bubbles(true));
		}
	}
}

fn dispatch(input: &Element, event: Event) {
	let event_type = event.event_type().to_string();
	input.dispatch_event(event);
	trace!(field = %input.get_attribute("name").unwrap_or_default(), event = %event_type, "forwarded event");
}
