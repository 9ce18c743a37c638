//! Field configuration.
//!
//! [`FieldOptions`] decides what the hidden input looks like: its type, its
//! starting value and the validation attributes the native form engine should
//! enforce. The binding only copies these onto the input; it never validates
//! anything itself.
//!
//! Options deserialize from the same shape they serialize to, so field
//! definitions can live in JSON metadata:
//!
//! ```
//! use formbridge_field::{FieldOptions, InputKind};
//!
//! let options: FieldOptions = serde_json::from_str(
//! 	r#"{ "kind": "hidden", "initial_value": "draft", "required": true }"#,
//! ).unwrap();
//!
//! assert_eq!(options.kind, InputKind::Hidden);
//! assert_eq!(options.initial_value, "draft");
//! assert!(options.required);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

const UNMIRRORED_INPUT_TYPES: [&str; 7] = ["checkbox", "radio", "file", "submit", "reset", "button", "image"];

/// How the hidden native input is rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
	/// A `type="text"` input removed from layout and from the accessibility
	/// tree. Native constraint validation still applies to it.
	#[default]
	VisuallyHidden,
	/// A `type="hidden"` input. Submitted, but barred from validation.
	Hidden,
	/// A visually hidden input of the given type, e.g. `email` or `number`,
	/// so type-based validation applies.
	Typed(String),
}

impl InputKind {
	/// The `type` attribute written onto the hidden input.
	pub fn input_type(&self) -> &str {
		match self {
			Self::VisuallyHidden => "text",
			Self::Hidden => "hidden",
			Self::Typed(kind) => kind,
		}
	}

	/// Whether a value written into an input of this type reaches `FormData`.
	///
	/// Checkable inputs only submit while checked, buttons only as the
	/// submitter and files not as their value, so none of them can mirror a
	/// widget's value.
	pub fn mirrors_value(&self) -> bool {
		let kind = self.input_type().to_ascii_lowercase();
		!UNMIRRORED_INPUT_TYPES.contains(&kind.as_str())
	}

	/// Whether the input needs styling to stay out of sight.
	pub fn needs_clipping(&self) -> bool {
		!matches!(self, Self::Hidden)
	}
}

/// Configuration for one field binding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldOptions {
	/// Value the hidden input starts with before the widget reports anything.
	pub initial_value: String,
	/// Rendering of the hidden input.
	pub kind: InputKind,
	/// Emits the `required` attribute.
	pub required: bool,
	/// Emits `minlength`.
	pub min_length: Option<usize>,
	/// Emits `maxlength`.
	pub max_length: Option<usize>,
	/// Emits `pattern`.
	pub pattern: Option<String>,
	/// Emits `disabled`, which also drops the field from submission.
	pub disabled: bool,
	/// Extra attributes copied verbatim. `name`, `type` and `value` are owned
	/// by the binding and ignored here.
	pub attributes: BTreeMap<String, String>,
}

impl FieldOptions {
	/// Creates default options: an empty, visually hidden text input.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the initial value.
	pub fn with_initial_value(mut self, value: impl Into<String>) -> Self {
		self.initial_value = value.into();
		self
	}

	/// Sets the input kind.
	pub fn with_kind(mut self, kind: InputKind) -> Self {
		self.kind = kind;
		self
	}

	/// Marks the field as required.
	pub fn required(mut self) -> Self {
		self.required = true;
		self
	}

	/// Sets the minimum value length.
	pub fn with_min_length(mut self, length: usize) -> Self {
		self.min_length = Some(length);
		self
	}

	/// Sets the maximum value length.
	pub fn with_max_length(mut self, length: usize) -> Self {
		self.max_length = Some(length);
		self
	}

	/// Sets a `pattern` the whole value must match.
	pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
		self.pattern = Some(pattern.into());
		self
	}

	/// Disables the field.
	pub fn disabled(mut self) -> Self {
		self.disabled = true;
		self
	}

	/// Adds an extra attribute.
	pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.attributes.insert(name.into(), value.into());
		self
	}

	/// Validation attributes in the order they are written.
	pub(crate) fn constraint_attributes(&self) -> Vec<(&'static str, String)> {
		let mut attrs = Vec::new();
		if self.required {
			attrs.push(("required", String::new()));
		}
		if let Some(min) = self.min_length {
			attrs.push(("minlength", min.to_string()));
		}
		if let Some(max) = self.max_length {
			attrs.push(("maxlength", max.to_string()));
		}
		if let Some(pattern) = &self.pattern {
			attrs.push(("pattern", pattern.clone()));
		}
		if self.disabled {
			attrs.push(("disabled", String::new()));
		}
		attrs
	}
}
