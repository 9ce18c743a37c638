//! Events and listener dispatch.
//!
//! Dispatch follows the DOM model: listeners registered with `capture` run on
//! the way down from the document to the target's parent, then the target's
//! own listeners (capture first, then bubble), then, for bubbling events, the
//! bubble listeners from the parent back up to the document.
//!
//! Listeners are cloned out of the store before they run, so a handler may
//! freely read or mutate the document (including adding and removing
//! listeners) while an event is in flight.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::element::Element;
use crate::node::{NodeId, Tree};

/// Shared listener callback.
pub type EventListener = Rc<dyn Fn(&mut Event)>;

/// The phase an event is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventPhase {
	/// Not being dispatched.
	None,
	/// Travelling from the document towards the target.
	Capturing,
	/// At the target node.
	AtTarget,
	/// Travelling from the target back to the document.
	Bubbling,
}

/// A DOM event.
#[derive(Clone)]
pub struct Event {
	event_type: String,
	bubbles: bool,
	cancelable: bool,
	phase: EventPhase,
	target: Option<Element>,
	current_target: Option<Element>,
	default_prevented: bool,
	propagation_stopped: bool,
	immediate_propagation_stopped: bool,
}

impl Event {
	/// Creates a non-bubbling, non-cancelable event of the given type.
	pub fn new(event_type: impl Into<String>) -> Self {
		Self {
			event_type: event_type.into(),
			bubbles: false,
			cancelable: false,
			phase: EventPhase::None,
			target: None,
			current_target: None,
			default_prevented: false,
			propagation_stopped: false,
			immediate_propagation_stopped: false,
		}
	}

	/// Sets whether the event bubbles.
	pub fn bubbles(mut self, bubbles: bool) -> Self {
		self.bubbles = bubbles;
		self
	}

	/// Sets whether the event can be cancelled with [`Event::prevent_default`].
	pub fn cancelable(mut self, cancelable: bool) -> Self {
		self.cancelable = cancelable;
		self
	}

	/// The event type, e.g. `"change"`.
	pub fn event_type(&self) -> &str {
		&self.event_type
	}

	/// Whether the event bubbles.
	pub fn is_bubbling(&self) -> bool {
		self.bubbles
	}

	/// Whether the event is cancelable.
	pub fn is_cancelable(&self) -> bool {
		self.cancelable
	}

	/// Current dispatch phase.
	pub fn phase(&self) -> EventPhase {
		self.phase
	}

	/// The element the event was dispatched on.
	pub fn target(&self) -> Option<&Element> {
		self.target.as_ref()
	}

	/// The element whose listener is currently running.
	///
	/// `None` for listeners registered on the document itself.
	pub fn current_target(&self) -> Option<&Element> {
		self.current_target.as_ref()
	}

	/// Cancels the event's default action. Ignored for non-cancelable events.
	pub fn prevent_default(&mut self) {
		if self.cancelable {
			self.default_prevented = true;
		}
	}

	/// Whether [`Event::prevent_default`] took effect.
	pub fn default_prevented(&self) -> bool {
		self.default_prevented
	}

	/// Stops the event from reaching further nodes.
	pub fn stop_propagation(&mut self) {
		self.propagation_stopped = true;
	}

	/// Stops the event, including the remaining listeners on the current node.
	pub fn stop_immediate_propagation(&mut self) {
		self.propagation_stopped = true;
		self.immediate_propagation_stopped = true;
	}
}

impl fmt::Debug for Event {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Event")
			.field("event_type", &self.event_type)
			.field("bubbles", &self.bubbles)
			.field("cancelable", &self.cancelable)
			.field("phase", &self.phase)
			.field("default_prevented", &self.default_prevented)
			.finish()
	}
}

/// Options for [`Element::add_event_listener`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerOptions {
	/// Run during the capture phase instead of the bubble phase.
	pub capture: bool,
	/// Remove the listener after its first invocation.
	pub once: bool,
}

impl ListenerOptions {
	/// Options for a capture-phase listener.
	pub fn capture() -> Self {
		Self {
			capture: true,
			once: false,
		}
	}

	/// Options for a listener that fires at most once.
	pub fn once() -> Self {
		Self {
			capture: false,
			once: true,
		}
	}
}

struct ListenerEntry {
	id: u64,
	event_type: String,
	options: ListenerOptions,
	handler: EventListener,
}

#[derive(Default)]
pub(crate) struct ListenerStore {
	next_id: u64,
	map: HashMap<NodeId, Vec<ListenerEntry>>,
}

impl ListenerStore {
	pub(crate) fn add(
		&mut self,
		node: NodeId,
		event_type: &str,
		options: ListenerOptions,
		handler: EventListener,
	) -> u64 {
		self.next_id += 1;
		let id = self.next_id;
		self.map.entry(node).or_default().push(ListenerEntry {
			id,
			event_type: event_type.to_string(),
			options,
			handler,
		});
		id
	}

	pub(crate) fn remove(&mut self, node: NodeId, id: u64) -> bool {
		let Some(entries) = self.map.get_mut(&node) else {
			return false;
		};
		let before = entries.len();
		entries.retain(|entry| entry.id != id);
		let removed = before != entries.len();
		if entries.is_empty() {
			self.map.remove(&node);
		}
		removed
	}

	pub(crate) fn contains(&self, node: NodeId, id: u64) -> bool {
		self.map
			.get(&node)
			.is_some_and(|entries| entries.iter().any(|entry| entry.id == id))
	}

	fn matching(&self, node: NodeId, event_type: &str, capture: bool) -> Vec<(u64, bool, EventListener)> {
		self.map
			.get(&node)
			.map(|entries| {
				entries
					.iter()
					.filter(|entry| entry.options.capture == capture && entry.event_type == event_type)
					.map(|entry| (entry.id, entry.options.once, Rc::clone(&entry.handler)))
					.collect()
			})
			.unwrap_or_default()
	}

	pub(crate) fn count(&self, node: NodeId) -> usize {
		self.map.get(&node).map_or(0, Vec::len)
	}
}

impl fmt::Debug for ListenerStore {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ListenerStore")
			.field("nodes", &self.map.len())
			.finish()
	}
}

/// Handle to a registered listener.
///
/// Dropping the handle leaves the listener registered; call
/// [`EventHandle::remove`] to unregister it.
#[derive(Debug, Clone)]
pub struct EventHandle {
	tree: Weak<RefCell<Tree>>,
	node: NodeId,
	id: u64,
}

impl EventHandle {
	pub(crate) fn new(tree: &Rc<RefCell<Tree>>, node: NodeId, id: u64) -> Self {
		Self {
			tree: Rc::downgrade(tree),
			node,
			id,
		}
	}

	/// Unregisters the listener. Returns `false` if it was already gone.
	pub fn remove(&self) -> bool {
		match self.tree.upgrade() {
			Some(tree) => tree.borrow_mut().listeners.remove(self.node, self.id),
			None => false,
		}
	}

	/// Whether the listener is still registered.
	pub fn is_active(&self) -> bool {
		self.tree
			.upgrade()
			.is_some_and(|tree| tree.borrow().listeners.contains(self.node, self.id))
	}
}

/// Dispatches `event` at `target` and returns it after all phases ran.
pub(crate) fn dispatch(tree: &Rc<RefCell<Tree>>, target: NodeId, mut event: Event) -> Event {
	tracing::trace!(event = %event.event_type, target = target.0, "dispatching event");

	let (path, root) = {
		let tree_ref = tree.borrow();
		let mut path = Vec::new();
		let mut cursor = tree_ref.parent(target);
		while let Some(node) = cursor {
			path.push(node);
			cursor = tree_ref.parent(node);
		}
		path.reverse();
		(path, tree_ref.root)
	};

	event.target = Some(Element::from_parts(Rc::clone(tree), target));
	event.default_prevented = false;
	event.propagation_stopped = false;
	event.immediate_propagation_stopped = false;

	let handle_for = |node: NodeId| (node != root).then(|| Element::from_parts(Rc::clone(tree), node));

	event.phase = EventPhase::Capturing;
	for node in &path {
		event.current_target = handle_for(*node);
		invoke_listeners(tree, *node, &mut event, true);
		if event.propagation_stopped {
			return finish(event);
		}
	}

	event.phase = EventPhase::AtTarget;
	event.current_target = handle_for(target);
	invoke_listeners(tree, target, &mut event, true);
	if !event.propagation_stopped {
		invoke_listeners(tree, target, &mut event, false);
	}
	if event.propagation_stopped || !event.bubbles {
		return finish(event);
	}

	event.phase = EventPhase::Bubbling;
	for node in path.iter().rev() {
		event.current_target = handle_for(*node);
		invoke_listeners(tree, *node, &mut event, false);
		if event.propagation_stopped {
			break;
		}
	}
	finish(event)
}

fn finish(mut event: Event) -> Event {
	event.phase = EventPhase::None;
	event.current_target = None;
	event
}

fn invoke_listeners(tree: &Rc<RefCell<Tree>>, node: NodeId, event: &mut Event, capture: bool) {
	let listeners = tree
		.borrow()
		.listeners
		.matching(node, &event.event_type, capture);
	for (id, once, handler) in listeners {
		// Skip listeners removed by an earlier handler of this dispatch.
		if !tree.borrow().listeners.contains(node, id) {
			continue;
		}
		if once {
			tree.borrow_mut().listeners.remove(node, id);
		}
		handler(event);
		if event.immediate_propagation_stopped {
			break;
		}
	}
}
