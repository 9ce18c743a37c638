//! Anchor resolution for ref attachments.

use formbridge_dom::Element;

use crate::error::{BindingError, BindingResult};

/// Outcome of resolving the node a widget's ref was attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anchor {
	/// Connected element; the hidden input can be placed right after it.
	Ready(Element),
	/// The element exists but is not in a document yet. Resolution is retried
	/// on the next flush.
	Deferred(Element),
	/// The ref was detached.
	Absent,
}

impl Anchor {
	/// The element behind a ready or deferred anchor.
	pub fn element(&self) -> Option<&Element> {
		match self {
			Self::Ready(element) | Self::Deferred(element) => Some(element),
			Self::Absent => None,
		}
	}
}

/// Maps ref attachments to insertion anchors.
#[derive(Debug, Clone, Copy, Default)]
pub struct RefResolver;

impl RefResolver {
	/// Classifies the node a ref callback received.
	pub fn resolve(node: Option<&Element>) -> Anchor {
		match node {
			None => Anchor::Absent,
			Some(element) if element.is_connected() && element.parent_element().is_some() => {
				Anchor::Ready(element.clone())
			}
			Some(element) => Anchor::Deferred(element.clone()),
		}
	}

	/// Like [`resolve`](Self::resolve), but only accepts a ready anchor.
	pub fn require(node: &Element) -> BindingResult<Element> {
		match Self::resolve(Some(node)) {
			Anchor::Ready(element) => Ok(element),
			_ => Err(BindingError::UnresolvableAnchor(node.tag_name())),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use formbridge_dom::Document;
	use rstest::rstest;

	#[rstest]
	fn test_absent_when_detached() {
		assert_eq!(RefResolver::resolve(None), Anchor::Absent);
		assert_eq!(Anchor::Absent.element(), None);
	}

	#[rstest]
	fn test_connected_element_is_ready() {
		let document = Document::new();
		let widget = document.create_element("div");
		document.body().unwrap().append_child(&widget).unwrap();

		assert_eq!(RefResolver::resolve(Some(&widget)), Anchor::Ready(widget.clone()));
		assert_eq!(RefResolver::require(&widget), Ok(widget));
	}

	#[rstest]
	fn test_disconnected_element_is_deferred() {
		let document = Document::new();
		let detached_parent = document.create_element("div");
		let widget = document.create_element("span");
		detached_parent.append_child(&widget).unwrap();

		assert_eq!(RefResolver::resolve(Some(&widget)), Anchor::Deferred(widget.clone()));
		assert_eq!(
			RefResolver::require(&widget),
			Err(BindingError::UnresolvableAnchor("span".to_string()))
		);
	}
}
