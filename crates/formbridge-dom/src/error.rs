//! Error types for DOM operations.

/// Errors raised by tree mutation, selector parsing and form operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
	/// The requested mutation would produce an invalid tree
	/// (a cycle, a second document root, or a sibling of a parentless node).
	#[error("Hierarchy request error: {0}")]
	HierarchyRequest(String),
	/// The selector could not be parsed or uses unsupported syntax.
	#[error("Invalid selector: {0}")]
	InvalidSelector(String),
	/// The operation requires a `<form>` element.
	#[error("Element <{0}> is not a form")]
	NotAForm(String),
	/// Handles from two different documents were mixed in one operation.
	#[error("Node belongs to a different document")]
	WrongDocument,
}

/// Result type for DOM operations.
pub type DomResult<T> = Result<T, DomError>;
