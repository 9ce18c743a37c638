//! Seams between a field binding, the host renderer and the widget.

use formbridge_dom::Element;

/// Lifecycle notifications delivered by the rendering host.
///
/// `attach` happens before any change is reported; `teardown` happens after
/// the last one. Implementations must tolerate repeated `attach` calls with
/// the same node and `detach` calls while already detached.
pub trait LifecyclePort {
	/// The widget's root element was attached to the ref.
	fn attach(&self, node: &Element);

	/// The ref was cleared.
	fn detach(&self);

	/// The owning widget is gone for good.
	fn teardown(&self);
}

/// The two interactions a widget reports.
///
/// Neither call fails: a binding that cannot act on it ignores it.
pub trait FieldAdapter {
	/// The widget's value changed to `value`.
	fn report_change(&self, value: &str);

	/// The widget lost focus.
	fn report_blur(&self);
}
