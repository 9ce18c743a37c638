//! Node arena backing a [`Document`](crate::Document).
//!
//! Nodes live in a single `Vec` and are addressed by [`NodeId`]. Removed nodes
//! stay in the arena detached from the tree, so stale handles keep resolving
//! to a node that simply reports itself as disconnected. Slots are never
//! reused; the arena is freed with its document.

use crate::error::{DomError, DomResult};
use crate::event::ListenerStore;

/// Index of a node inside its document's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
	/// Returns the raw arena index.
	pub fn index(self) -> usize {
		self.0
	}
}

#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
	Document,
	Element(ElementData),
	Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct ElementData {
	pub(crate) tag_name: String,
	pub(crate) attrs: Vec<(String, String)>,
	/// Dirty value set through the `value` property. `None` falls back to
	/// the content attribute (or text content for `<textarea>`).
	pub(crate) value: Option<String>,
	pub(crate) checked: Option<bool>,
}

impl ElementData {
	fn new(tag_name: &str) -> Self {
		Self {
			tag_name: tag_name.to_ascii_lowercase(),
			attrs: Vec::new(),
			value: None,
			checked: None,
		}
	}

	pub(crate) fn attr(&self, name: &str) -> Option<&str> {
		self.attrs
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}

	pub(crate) fn set_attr(&mut self, name: &str, value: &str) {
		let name = name.to_ascii_lowercase();
		match self.attrs.iter_mut().find(|(key, _)| *key == name) {
			Some(slot) => slot.1 = value.to_string(),
			None => self.attrs.push((name, value.to_string())),
		}
	}

	pub(crate) fn remove_attr(&mut self, name: &str) -> bool {
		let before = self.attrs.len();
		self.attrs.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
		before != self.attrs.len()
	}

	pub(crate) fn input_type(&self) -> String {
		self.attr("type")
			.map(|kind| kind.trim().to_ascii_lowercase())
			.filter(|kind| !kind.is_empty())
			.unwrap_or_else(|| "text".to_string())
	}
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
	pub(crate) parent: Option<NodeId>,
	pub(crate) children: Vec<NodeId>,
	pub(crate) kind: NodeKind,
}

/// Where to insert a node relative to a reference element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
	/// Immediately before the reference, as a sibling.
	BeforeBegin,
	/// As the reference's first child.
	AfterBegin,
	/// As the reference's last child.
	BeforeEnd,
	/// Immediately after the reference, as a sibling.
	AfterEnd,
}

#[derive(Debug)]
pub(crate) struct Tree {
	pub(crate) nodes: Vec<NodeData>,
	pub(crate) root: NodeId,
	pub(crate) listeners: ListenerStore,
	pub(crate) active_element: Option<NodeId>,
}

impl Tree {
	pub(crate) fn new() -> Self {
		Self {
			nodes: vec![NodeData {
				parent: None,
				children: Vec::new(),
				kind: NodeKind::Document,
			}],
			root: NodeId(0),
			listeners: ListenerStore::default(),
			active_element: None,
		}
	}

	pub(crate) fn create_element(&mut self, tag_name: &str) -> NodeId {
		self.push(NodeKind::Element(ElementData::new(tag_name)))
	}

	pub(crate) fn create_text(&mut self, text: &str) -> NodeId {
		self.push(NodeKind::Text(text.to_string()))
	}

	fn push(&mut self, kind: NodeKind) -> NodeId {
		let id = NodeId(self.nodes.len());
		self.nodes.push(NodeData {
			parent: None,
			children: Vec::new(),
			kind,
		});
		id
	}

	pub(crate) fn is_valid(&self, id: NodeId) -> bool {
		id.0 < self.nodes.len()
	}

	pub(crate) fn element(&self, id: NodeId) -> Option<&ElementData> {
		match self.nodes.get(id.0).map(|node| &node.kind) {
			Some(NodeKind::Element(element)) => Some(element),
			_ => None,
		}
	}

	pub(crate) fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
		match self.nodes.get_mut(id.0).map(|node| &mut node.kind) {
			Some(NodeKind::Element(element)) => Some(element),
			_ => None,
		}
	}

	pub(crate) fn parent(&self, id: NodeId) -> Option<NodeId> {
		self.nodes.get(id.0).and_then(|node| node.parent)
	}

	pub(crate) fn parent_element(&self, id: NodeId) -> Option<NodeId> {
		self.parent(id).filter(|parent| self.element(*parent).is_some())
	}

	pub(crate) fn is_connected(&self, id: NodeId) -> bool {
		let mut cursor = Some(id);
		while let Some(node) = cursor {
			if node == self.root {
				return true;
			}
			cursor = self.parent(node);
		}
		false
	}

	/// Returns the topmost ancestor of `id` (the document for connected nodes).
	pub(crate) fn tree_root(&self, id: NodeId) -> NodeId {
		let mut current = id;
		while let Some(parent) = self.parent(current) {
			current = parent;
		}
		current
	}

	pub(crate) fn is_inclusive_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
		let mut cursor = Some(id);
		while let Some(node) = cursor {
			if node == ancestor {
				return true;
			}
			cursor = self.parent(node);
		}
		false
	}

	fn can_have_children(&self, id: NodeId) -> bool {
		matches!(
			self.nodes.get(id.0).map(|node| &node.kind),
			Some(NodeKind::Document | NodeKind::Element(_))
		)
	}

	fn check_insertion(&self, parent: NodeId, child: NodeId) -> DomResult<()> {
		if !self.is_valid(parent) || !self.is_valid(child) {
			return Err(DomError::HierarchyRequest("node is not part of this document".into()));
		}
		if !self.can_have_children(parent) {
			return Err(DomError::HierarchyRequest("parent cannot have children".into()));
		}
		if child == self.root {
			return Err(DomError::HierarchyRequest("cannot insert the document node".into()));
		}
		// Parent must not be inside child's subtree.
		if self.is_inclusive_ancestor(child, parent) {
			return Err(DomError::HierarchyRequest("insertion would create a cycle".into()));
		}
		Ok(())
	}

	fn detach(&mut self, child: NodeId) {
		if let Some(old_parent) = self.parent(child) {
			self.nodes[old_parent.0].children.retain(|id| *id != child);
		}
		self.nodes[child.0].parent = None;
	}

	pub(crate) fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
		self.check_insertion(parent, child)?;
		self.detach(child);
		self.nodes[child.0].parent = Some(parent);
		self.nodes[parent.0].children.push(child);
		self.release_focus_if_disconnected();
		Ok(())
	}

	pub(crate) fn insert_before(
		&mut self,
		parent: NodeId,
		child: NodeId,
		reference: NodeId,
	) -> DomResult<()> {
		if child == reference {
			return Ok(());
		}
		self.check_insertion(parent, child)?;
		if self.parent(reference) != Some(parent) {
			return Err(DomError::HierarchyRequest(
				"reference node is not a child of the parent".into(),
			));
		}
		self.detach(child);
		let Some(index) = self.nodes[parent.0]
			.children
			.iter()
			.position(|id| *id == reference)
		else {
			return Err(DomError::HierarchyRequest("reference node is missing".into()));
		};
		self.nodes[child.0].parent = Some(parent);
		self.nodes[parent.0].children.insert(index, child);
		self.release_focus_if_disconnected();
		Ok(())
	}

	pub(crate) fn insert_adjacent(
		&mut self,
		target: NodeId,
		position: InsertPosition,
		node: NodeId,
	) -> DomResult<()> {
		match position {
			InsertPosition::BeforeBegin => {
				let parent = self.parent(target).ok_or_else(|| {
					DomError::HierarchyRequest("beforebegin target has no parent".into())
				})?;
				self.insert_before(parent, node, target)
			}
			InsertPosition::AfterBegin => match self.nodes[target.0].children.first().copied() {
				Some(first) => self.insert_before(target, node, first),
				None => self.append_child(target, node),
			},
			InsertPosition::BeforeEnd => self.append_child(target, node),
			InsertPosition::AfterEnd => {
				let parent = self.parent(target).ok_or_else(|| {
					DomError::HierarchyRequest("afterend target has no parent".into())
				})?;
				if target == node {
					return Ok(());
				}
				// Resolve the next sibling after detaching `node`, since it may
				// currently be that sibling.
				self.check_insertion(parent, node)?;
				self.detach(node);
				let siblings = &self.nodes[parent.0].children;
				let index = siblings
					.iter()
					.position(|id| *id == target)
					.map(|pos| pos + 1)
					.unwrap_or(siblings.len());
				self.nodes[node.0].parent = Some(parent);
				self.nodes[parent.0].children.insert(index, node);
				self.release_focus_if_disconnected();
				Ok(())
			}
		}
	}

	/// Detaches `id` from its parent. Removing a detached node is a no-op.
	pub(crate) fn remove(&mut self, id: NodeId) -> DomResult<()> {
		if id == self.root {
			return Err(DomError::HierarchyRequest("cannot remove the document node".into()));
		}
		if self.is_valid(id) {
			self.detach(id);
			self.release_focus_if_disconnected();
		}
		Ok(())
	}

	fn release_focus_if_disconnected(&mut self) {
		if let Some(active) = self.active_element
			&& !self.is_connected(active)
		{
			self.active_element = None;
		}
	}

	pub(crate) fn text_content(&self, id: NodeId) -> String {
		match &self.nodes[id.0].kind {
			NodeKind::Text(text) => text.clone(),
			_ => {
				let mut out = String::new();
				for child in &self.nodes[id.0].children {
					out.push_str(&self.text_content(*child));
				}
				out
			}
		}
	}

	pub(crate) fn set_text_content(&mut self, id: NodeId, text: &str) -> DomResult<()> {
		if let NodeKind::Text(existing) = &mut self.nodes[id.0].kind {
			*existing = text.to_string();
			return Ok(());
		}
		let children = std::mem::take(&mut self.nodes[id.0].children);
		for child in children {
			self.nodes[child.0].parent = None;
		}
		if !text.is_empty() {
			let text_node = self.create_text(text);
			self.append_child(id, text_node)?;
		}
		self.release_focus_if_disconnected();
		Ok(())
	}

	/// Collects element descendants of `id` (excluding `id`) in tree order.
	pub(crate) fn descendant_elements(&self, id: NodeId, out: &mut Vec<NodeId>) {
		for child in &self.nodes[id.0].children {
			if self.element(*child).is_some() {
				out.push(*child);
			}
			self.descendant_elements(*child, out);
		}
	}

	pub(crate) fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
		let parent = self.parent(id)?;
		let siblings = &self.nodes[parent.0].children;
		let pos = siblings.iter().position(|node| *node == id)?;
		siblings[pos + 1..]
			.iter()
			.copied()
			.find(|node| self.element(*node).is_some())
	}

	pub(crate) fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
		let parent = self.parent(id)?;
		let siblings = &self.nodes[parent.0].children;
		let pos = siblings.iter().position(|node| *node == id)?;
		siblings[..pos]
			.iter()
			.rev()
			.copied()
			.find(|node| self.element(*node).is_some())
	}

	pub(crate) fn find_ancestor_by_tag(&self, id: NodeId, tag: &str) -> Option<NodeId> {
		let mut cursor = self.parent(id);
		while let Some(node) = cursor {
			if self
				.element(node)
				.is_some_and(|element| element.tag_name == tag)
			{
				return Some(node);
			}
			cursor = self.parent(node);
		}
		None
	}

	pub(crate) fn element_by_id(&self, root: NodeId, id_value: &str) -> Option<NodeId> {
		let mut elements = Vec::new();
		self.descendant_elements(root, &mut elements);
		elements
			.into_iter()
			.find(|node| self.element(*node).and_then(|element| element.attr("id")) == Some(id_value))
	}
}
