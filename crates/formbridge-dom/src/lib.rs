//! formbridge-dom - In-memory DOM with native form semantics
//!
//! A small, deterministic document model that behaves like the parts of a
//! browser a form cares about. It stands in for the native form engine when
//! field bindings are mounted outside a browser, and is what the binding
//! engine in `formbridge-field` mutates and what its tests observe.
//!
//! ## Features
//!
//! - **Handles, not references**: [`Document`] and [`Element`] are cheap,
//!   cloneable handles over a shared node arena
//! - **Events**: capture, target and bubble phases, `once` listeners,
//!   cancellation and propagation control
//! - **Forms**: form-associated controls, [`FormData`] enumeration,
//!   constraint validation ([`ValidityState`]) and `request_submit`
//! - **Selectors**: the subset needed by tests, e.g. `[name="test"]`
//!
//! ## Example
//!
//! ```
//! use formbridge_dom::{Document, Event, InsertPosition, ListenerOptions};
//!
//! let document = Document::new();
//! let form = document.create_element("form");
//! document.body().unwrap().append_child(&form).unwrap();
//!
//! let input = document.create_element("input");
//! input.set_attribute("name", "email");
//! form.append_child(&input).unwrap();
//! input.set_value("user@example.com");
//!
//! let data = document.form_data(&form).unwrap();
//! assert_eq!(data.get("email"), Some("user@example.com"));
//!
//! let label = document.create_element("label");
//! input.insert_adjacent_element(InsertPosition::BeforeBegin, &label).unwrap();
//! assert_eq!(input.previous_element_sibling(), Some(label));
//!
//! form.add_event_listener("change", ListenerOptions::default(), |event| {
//!     assert_eq!(event.event_type(), "change");
//! });
//! input.dispatch_event(Event::new("change").bubbles(true));
//! ```

#![warn(missing_docs)]

pub mod document;
pub mod element;
pub mod error;
pub mod event;
pub mod form;
pub mod node;
mod selector;

pub use document::Document;
pub use element::Element;
pub use error::{DomError, DomResult};
pub use event::{Event, EventHandle, EventListener, EventPhase, ListenerOptions};
pub use form::{FormData, ValidityState};
pub use node::{InsertPosition, NodeId};
