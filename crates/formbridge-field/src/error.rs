//! Error types for field bindings.
//!
//! These errors never cross the widget-facing adapters: `on_change`, `on_blur`
//! and the ref callback log and swallow them. They are returned from the
//! building blocks so the engine and its tests can tell why a mount failed.

use formbridge_dom::DomError;

/// Errors raised while resolving anchors or mounting hidden inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
	/// Field names must contain at least one non-whitespace character.
	#[error("Invalid field name: {0:?}")]
	InvalidFieldName(String),
	/// The configured input type never submits the mirrored value.
	#[error("Input type {0:?} cannot carry a field value")]
	UnsupportedInputType(String),
	/// The anchor is not attached to a document, so no sibling can be placed
	/// where the enclosing form would find it.
	#[error("Anchor <{0}> is not connected to a document")]
	UnresolvableAnchor(String),
	/// The binding was torn down and cannot be attached again.
	#[error("Field '{0}' has been torn down")]
	TornDown(String),
	/// A DOM operation failed.
	#[error(transparent)]
	Dom(#[from] DomError),
}

/// Result type for binding operations.
pub type BindingResult<T> = Result<T, BindingError>;

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_dom_errors_convert_transparently() {
		let error: BindingError = DomError::WrongDocument.into();

		assert_eq!(error, BindingError::Dom(DomError::WrongDocument));
		assert_eq!(error.to_string(), DomError::WrongDocument.to_string());
	}

	#[rstest]
	fn test_display_names_the_field() {
		let error = BindingError::TornDown("email".to_string());

		assert_eq!(error.to_string(), "Field 'email' has been torn down");
	}
}
