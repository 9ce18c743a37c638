//! Field bindings for custom widgets
//!
//! This module provides access to formbridge-field: the `use_field` hook,
//! the binding engine behind it and the host renderer that drives the
//! attach, detach and teardown lifecycle.
//!
//! ## Example
//!
//! ```rust
//! use formbridge::dom::Document;
//! use formbridge::field::{FieldOptions, Scope, use_field};
//!
//! let document = Document::new();
//! let form = document.create_element("form");
//! document.body().unwrap().append_child(&form).unwrap();
//! let picker = document.create_element("div");
//! form.append_child(&picker).unwrap();
//!
//! let scope = Scope::new();
//! let color = use_field(&scope, "color", FieldOptions::new().required()).unwrap();
//! color.field.set(Some(&picker));
//! assert!(!form.check_validity());
//!
//! color.on_change.call("#336699".to_string());
//! assert!(form.check_validity());
//! ```

// Re-export all formbridge-field functionality
pub use formbridge_field::*;
