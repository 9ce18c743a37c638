//! The mirrored field value.

use tracing::trace;

use crate::hidden_input::HiddenInputManager;

/// Holds the last value a widget reported and mirrors it into the hidden
/// input.
///
/// The value outlives any particular input: when the input is recreated at a
/// new anchor, [`current`](Self::current) seeds it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueBridge {
	current: String,
}

impl ValueBridge {
	/// Creates a bridge holding `initial`.
	pub fn new(initial: impl Into<String>) -> Self {
		Self {
			current: initial.into(),
		}
	}

	/// Stores `value` and writes it into the mounted input, if any.
	///
	/// Both happen before this returns, so a `FormData` built right after
	/// sees the new value.
	pub fn report(&mut self, value: impl Into<String>, inputs: &HiddenInputManager) {
		self.current = value.into();
		let mirrored = inputs.update_value(&self.current);
		trace!(mirrored, "field value reported");
	}

	/// The last reported value.
	pub fn current(&self) -> &str {
		&self.current
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::options::FieldOptions;
	use formbridge_dom::Document;
	use rstest::rstest;

	#[rstest]
	fn test_report_without_input_keeps_value() {
		let mut bridge = ValueBridge::new("initial");

		bridge.report("next", &HiddenInputManager::new());

		assert_eq!(bridge.current(), "next");
	}

	#[rstest]
	fn test_report_mirrors_into_mounted_input() {
		let document = Document::new();
		let widget = document.create_element("div");
		document.body().unwrap().append_child(&widget).unwrap();
		let mut inputs = HiddenInputManager::new();
		let input = inputs
			.mount(&widget, "test", "", &FieldOptions::default())
			.unwrap();
		let mut bridge = ValueBridge::default();

		for value in ["a", "ab", "ab", ""] {
			bridge.report(value, &inputs);
			assert_eq!(input.value(), value);
			assert_eq!(bridge.current(), value);
		}
	}
}
