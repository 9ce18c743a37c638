//! formbridge-field - Native form participation for custom widgets
//!
//! A custom widget (a content-editable region, a canvas color picker, a
//! tag list) is invisible to the browser's form engine. This crate binds such
//! a widget to a hidden native `<input>` that sits right next to it, carries
//! the field name, mirrors the widget's value and re-fires its interactions as
//! native events. The enclosing `<form>` then submits, validates and notifies
//! listeners as if a real input were there.
//!
//! ## Architecture
//!
//! ```text
//! use_field(scope, name) ──► FieldBindingEngine ──► FieldHandle
//!                                                     │
//!        ref attach/detach ──► RefResolver ──► HiddenInputManager
//!        on_change(value)  ──► EventForwarder ──► ValueBridge ──► input.value
//!                                            └──► input/change events
//!        on_blur()         ──► EventForwarder ──► blur/focusout events
//! ```
//!
//! ## Guarantees
//!
//! - One hidden input per bound field, named after the field and placed
//!   directly after the widget's root element
//! - After `on_change(v)` returns, the input's value is `v`; the `input` and
//!   `change` events fire only after the write
//! - Calls on a detached, torn-down or dropped binding are ignored; the
//!   widget-facing adapters never fail
//! - Re-attaching to a different element moves the input and keeps the value
//!
//! ## Example
//!
//! ```
//! use formbridge_dom::{Document, ListenerOptions};
//! use formbridge_field::{FieldOptions, host};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let document = Document::new();
//! let form = document.create_element("form");
//! document.body().unwrap().append_child(&form).unwrap();
//!
//! let changes = Rc::new(RefCell::new(Vec::new()));
//! form.add_event_listener("change", ListenerOptions::default(), {
//!     let changes = Rc::clone(&changes);
//!     move |event| changes.borrow_mut().push(event.target().unwrap().value())
//! });
//!
//! let widget_document = document.clone();
//! let mut widget = host::mount(&form, move |ctx| {
//!     let field = ctx.use_field("test", FieldOptions::default())?;
//!     let editor = widget_document.create_element("div");
//!     editor.set_attribute("contenteditable", "true");
//!     ctx.bind_ref(&field.field, &editor);
//!     Ok(editor)
//! })
//! .unwrap();
//!
//! assert!(document.query_selector("[name=\"test\"]").unwrap().is_some());
//!
//! let field = widget.scope().field("test").unwrap();
//! field.on_change().call("hello".to_string());
//! assert_eq!(document.form_data(&form).unwrap().get("test"), Some("hello"));
//! assert_eq!(*changes.borrow(), vec!["hello"]);
//!
//! widget.unmount();
//! assert!(document.query_selector("[name=\"test\"]").unwrap().is_none());
//! ```

#![warn(missing_docs)]

pub mod callback;
pub mod engine;
pub mod error;
pub mod forwarder;
pub mod hidden_input;
pub mod hooks;
pub mod host;
pub mod options;
pub mod ports;
pub mod resolver;
pub mod value;

pub use callback::{Callback, NodeRef};
pub use engine::{BindingState, FieldBindingEngine, FieldHandle};
pub use error::{BindingError, BindingResult};
pub use forwarder::EventForwarder;
pub use hidden_input::{FIELD_MARKER_ATTRIBUTE, HiddenInputManager, VISUALLY_HIDDEN_STYLE};
pub use hooks::{Scope, UseField, use_field};
pub use host::{Component, MountedComponent, RenderContext};
pub use options::{FieldOptions, InputKind};
pub use ports::{FieldAdapter, LifecyclePort};
pub use resolver::{Anchor, RefResolver};
pub use value::ValueBridge;
