//! # formbridge
//!
//! Native form participation for custom widgets.
//!
//! A rich text editor, a color picker or a tag list renders to elements the
//! form engine knows nothing about. formbridge binds such a widget to a
//! hidden native `<input>` placed next to it. The input carries the field
//! name and mirrors the value the widget reports. It also re-fires the
//! widget's changes and blurs as native events, so submission, `FormData`,
//! constraint validation and form-level listeners work unchanged.
//!
//! ## Feature Flags
//!
//! - `dom` - The in-memory document and native form engine ([`dom`])
//! - `field` - The binding engine and the `use_field` hook ([`field`])
//! - `full` (default) - Everything
//!
//! ## Quick Example
//!
//! ```rust
//! use formbridge::prelude::*;
//!
//! let document = Document::new();
//! let form = document.create_element("form");
//! document.body().unwrap().append_child(&form).unwrap();
//!
//! let editor_document = document.clone();
//! let mut editor = mount(&form, move |ctx| {
//!     let field = ctx.use_field("bio", FieldOptions::new().with_max_length(140))?;
//!     let root = editor_document.create_element("div");
//!     root.set_attribute("contenteditable", "true");
//!     ctx.bind_ref(&field.field, &root);
//!     Ok(root)
//! })
//! .unwrap();
//!
//! let bio = editor.scope().field("bio").unwrap();
//! bio.report_change("Rustacean");
//! assert_eq!(form.request_submit().unwrap().unwrap().get("bio"), Some("Rustacean"));
//!
//! editor.unmount();
//! assert!(document.query_selector("[name=\"bio\"]").unwrap().is_none());
//! ```

#[cfg(feature = "dom")]
pub mod dom;
#[cfg(feature = "field")]
pub mod field;

/// Prelude module for convenient imports
///
/// ```rust
/// use formbridge::prelude::*;
/// ```
pub mod prelude {
	#[cfg(feature = "dom")]
	pub use crate::dom::{
		Document, DomError, DomResult, Element, Event, EventPhase, FormData, InsertPosition,
		ListenerOptions, ValidityState,
	};

	#[cfg(feature = "field")]
	pub use crate::field::{
		BindingError, BindingResult, BindingState, Callback, FieldAdapter, FieldHandle,
		FieldOptions, InputKind, LifecyclePort, NodeRef, RenderContext, Scope, UseField,
		host::mount, use_field,
	};
}
