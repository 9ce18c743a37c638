//! In-memory DOM with native form semantics
//!
//! This module provides access to formbridge-dom: documents, elements,
//! selector queries, event dispatch, `FormData` and constraint validation.
//!
//! ## Example
//!
//! ```rust
//! use formbridge::dom::{Document, InsertPosition};
//!
//! let document = Document::new();
//! let form = document.create_element("form");
//! document.body().unwrap().append_child(&form).unwrap();
//!
//! let widget = document.create_element("div");
//! form.append_child(&widget).unwrap();
//! let input = document.create_element("input");
//! input.set_attribute("name", "color");
//! widget.insert_adjacent_element(InsertPosition::AfterEnd, &input).unwrap();
//!
//! assert!(document.query_selector("form > [name=\"color\"]").unwrap().is_some());
//! ```

// Re-export all formbridge-dom functionality
pub use formbridge_dom::*;
