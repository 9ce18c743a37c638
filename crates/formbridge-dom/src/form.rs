//! Form-associated controls, `FormData` and constraint validation.
//!
//! This is the part of the document that plays the native form engine: it
//! decides which controls belong to a form, which of them are submitted, and
//! whether each one satisfies its validation attributes.

use regex::Regex;

use crate::node::{ElementData, NodeId, Tree};

const CONTROL_TAGS: [&str; 4] = ["input", "select", "textarea", "button"];

/// Input types that never take part in submission.
const NON_SUBMITTABLE_TYPES: [&str; 5] = ["button", "submit", "reset", "image", "file"];

/// Input types barred from constraint validation.
const BARRED_TYPES: [&str; 5] = ["hidden", "button", "submit", "reset", "image"];

/// Ordered name/value pairs collected from a form, like the browser's
/// `FormData`.
///
/// Several controls may share a name; every one contributes an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
	entries: Vec<(String, String)>,
}

impl FormData {
	/// Creates an empty `FormData`.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends an entry.
	pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
		self.entries.push((name.into(), value.into()));
	}

	/// First value submitted under `name`.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.entries
			.iter()
			.find(|(key, _)| key == name)
			.map(|(_, value)| value.as_str())
	}

	/// All values submitted under `name`, in tree order.
	pub fn get_all(&self, name: &str) -> Vec<&str> {
		self.entries
			.iter()
			.filter(|(key, _)| key == name)
			.map(|(_, value)| value.as_str())
			.collect()
	}

	/// Whether any entry uses `name`.
	pub fn has(&self, name: &str) -> bool {
		self.entries.iter().any(|(key, _)| key == name)
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether there are no entries.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Iterates over `(name, value)` pairs.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.entries
			.iter()
			.map(|(key, value)| (key.as_str(), value.as_str()))
	}
}

/// Validity flags of a form control, mirroring the browser's `ValidityState`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidityState {
	/// `required` is set and the control has no value.
	pub value_missing: bool,
	/// The value does not match the input type (`email`, `number`).
	pub type_mismatch: bool,
	/// The value does not match the `pattern` attribute.
	pub pattern_mismatch: bool,
	/// The value is longer than `maxlength`.
	pub too_long: bool,
	/// The value is shorter than `minlength`.
	pub too_short: bool,
	/// The numeric value is below `min`.
	pub range_underflow: bool,
	/// The numeric value is above `max`.
	pub range_overflow: bool,
}

impl ValidityState {
	/// Whether no constraint is violated.
	pub fn valid(&self) -> bool {
		!(self.value_missing
			|| self.type_mismatch
			|| self.pattern_mismatch
			|| self.too_long
			|| self.too_short
			|| self.range_underflow
			|| self.range_overflow)
	}
}

pub(crate) fn is_control(element: &ElementData) -> bool {
	CONTROL_TAGS.contains(&element.tag_name.as_str())
}

fn is_checkable(element: &ElementData) -> bool {
	element.tag_name == "input" && matches!(element.input_type().as_str(), "checkbox" | "radio")
}

pub(crate) fn checkedness(tree: &Tree, node: NodeId) -> bool {
	tree.element(node)
		.filter(|element| is_checkable(element))
		.is_some_and(|element| element.checked.unwrap_or(element.attr("checked").is_some()))
}

/// Disabled directly or through an ancestor `<fieldset disabled>`.
pub(crate) fn is_disabled(tree: &Tree, node: NodeId) -> bool {
	if tree
		.element(node)
		.is_some_and(|element| element.attr("disabled").is_some())
	{
		return true;
	}
	let mut cursor = tree.parent_element(node);
	while let Some(ancestor) = cursor {
		if tree.element(ancestor).is_some_and(|element| {
			element.tag_name == "fieldset" && element.attr("disabled").is_some()
		}) {
			return true;
		}
		cursor = tree.parent_element(ancestor);
	}
	false
}

pub(crate) fn control_value(tree: &Tree, node: NodeId) -> String {
	let Some(element) = tree.element(node) else {
		return String::new();
	};
	match element.tag_name.as_str() {
		"textarea" => element
			.value
			.clone()
			.unwrap_or_else(|| tree.text_content(node)),
		"select" => select_value(tree, node),
		_ => match &element.value {
			Some(value) => value.clone(),
			None => match element.attr("value") {
				Some(value) => value.to_string(),
				None if is_checkable(element) => "on".to_string(),
				None => String::new(),
			},
		},
	}
}

fn option_value(tree: &Tree, option: NodeId) -> String {
	tree.element(option)
		.and_then(|element| element.attr("value"))
		.map(str::to_string)
		.unwrap_or_else(|| tree.text_content(option).trim().to_string())
}

fn select_value(tree: &Tree, select: NodeId) -> String {
	let mut descendants = Vec::new();
	tree.descendant_elements(select, &mut descendants);
	let options: Vec<NodeId> = descendants
		.into_iter()
		.filter(|node| tree.element(*node).is_some_and(|element| element.tag_name == "option"))
		.collect();

	if let Some(requested) = tree.element(select).and_then(|element| element.value.as_ref())
		&& options
			.iter()
			.any(|option| option_value(tree, *option) == *requested)
	{
		return requested.clone();
	}

	options
		.iter()
		.find(|option| {
			tree.element(**option)
				.is_some_and(|element| element.attr("selected").is_some())
		})
		.or_else(|| options.first())
		.map(|option| option_value(tree, *option))
		.unwrap_or_default()
}

/// The form a control belongs to: the element named by its `form` attribute,
/// or else its nearest ancestor `<form>`.
pub(crate) fn form_owner(tree: &Tree, node: NodeId) -> Option<NodeId> {
	let element = tree.element(node)?;
	if let Some(form_id) = element.attr("form") {
		let root = tree.tree_root(node);
		return tree
			.element_by_id(root, form_id)
			.filter(|candidate| tree.element(*candidate).is_some_and(|el| el.tag_name == "form"));
	}
	tree.find_ancestor_by_tag(node, "form")
}

/// Controls owned by `form`, in tree order.
pub(crate) fn form_controls(tree: &Tree, form: NodeId) -> Vec<NodeId> {
	let root = tree.tree_root(form);
	let mut elements = Vec::new();
	tree.descendant_elements(root, &mut elements);
	elements
		.into_iter()
		.filter(|node| tree.element(*node).is_some_and(is_control))
		.filter(|node| form_owner(tree, *node) == Some(form))
		.collect()
}

pub(crate) fn form_data(tree: &Tree, form: NodeId) -> FormData {
	let mut data = FormData::new();
	for control in form_controls(tree, form) {
		let Some(element) = tree.element(control) else {
			continue;
		};
		let name = element.attr("name").unwrap_or_default();
		if name.is_empty() || element.tag_name == "button" || is_disabled(tree, control) {
			continue;
		}
		if element.tag_name == "input" {
			let kind = element.input_type();
			if NON_SUBMITTABLE_TYPES.contains(&kind.as_str()) {
				continue;
			}
			if is_checkable(element) && !checkedness(tree, control) {
				continue;
			}
		}
		data.append(name, control_value(tree, control));
	}
	data
}

/// Whether the control is a candidate for constraint validation.
pub(crate) fn will_validate(tree: &Tree, node: NodeId) -> bool {
	let Some(element) = tree.element(node) else {
		return false;
	};
	if !is_control(element) || element.tag_name == "button" || is_disabled(tree, node) {
		return false;
	}
	if element.tag_name == "input" && BARRED_TYPES.contains(&element.input_type().as_str()) {
		return false;
	}
	if matches!(element.tag_name.as_str(), "input" | "textarea") && element.attr("readonly").is_some() {
		return false;
	}
	true
}

pub(crate) fn validity(tree: &Tree, node: NodeId) -> ValidityState {
	let mut state = ValidityState::default();
	if !will_validate(tree, node) {
		return state;
	}
	let Some(element) = tree.element(node) else {
		return state;
	};

	let value = control_value(tree, node);
	let required = element.attr("required").is_some();

	if is_checkable(element) {
		state.value_missing = required && !checkedness(tree, node);
		return state;
	}
	if value.is_empty() {
		state.value_missing = required;
		return state;
	}
	if element.tag_name == "select" {
		return state;
	}

	let length = value.chars().count();
	if let Some(max) = parse_length(element.attr("maxlength")) {
		state.too_long = length > max;
	}
	if let Some(min) = parse_length(element.attr("minlength")) {
		state.too_short = length < min;
	}
	if let Some(pattern) = element.attr("pattern")
		&& element.tag_name == "input"
	{
		// An unparsable pattern is ignored, as browsers do.
		if let Ok(regex) = Regex::new(&format!("^(?:{pattern})$")) {
			state.pattern_mismatch = !regex.is_match(&value);
		}
	}

	match element.input_type().as_str() {
		"email" if element.tag_name == "input" => {
			state.type_mismatch = !is_valid_email(&value);
		}
		"number" if element.tag_name == "input" => match value.trim().parse::<f64>() {
			Ok(number) => {
				if let Some(min) = element.attr("min").and_then(|raw| raw.trim().parse::<f64>().ok()) {
					state.range_underflow = number < min;
				}
				if let Some(max) = element.attr("max").and_then(|raw| raw.trim().parse::<f64>().ok()) {
					state.range_overflow = number > max;
				}
			}
			Err(_) => state.type_mismatch = true,
		},
		_ => {}
	}

	state
}

fn parse_length(raw: Option<&str>) -> Option<usize> {
	raw.and_then(|value| value.trim().parse::<usize>().ok())
}

fn is_valid_email(value: &str) -> bool {
	let mut parts = value.split('@');
	let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
		return false;
	};
	!local.is_empty()
		&& !domain.is_empty()
		&& !domain.starts_with('.')
		&& !domain.ends_with('.')
		&& !value.chars().any(char::is_whitespace)
}
