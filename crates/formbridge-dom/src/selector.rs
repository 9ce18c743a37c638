//! CSS selector subset used by `query_selector`, `matches` and `closest`.
//!
//! Supported: type and universal selectors, `#id`, `.class`, `[attr]`,
//! `[attr=value]` / `[attr="value"]`, the pseudo-classes `:checked`,
//! `:disabled`, `:enabled`, `:required`, `:optional`, `:focus`, `:valid` and
//! `:invalid`, descendant and child (`>`) combinators, and comma-separated
//! selector lists.

use std::iter::Peekable;
use std::str::Chars;

use crate::error::{DomError, DomResult};
use crate::form;
use crate::node::{NodeId, Tree};

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrCondition {
	Exists { name: String },
	Equals { name: String, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PseudoClass {
	Checked,
	Disabled,
	Enabled,
	Required,
	Optional,
	Focus,
	Valid,
	Invalid,
}

impl PseudoClass {
	fn parse(name: &str) -> Option<Self> {
		Some(match name {
			"checked" => Self::Checked,
			"disabled" => Self::Disabled,
			"enabled" => Self::Enabled,
			"required" => Self::Required,
			"optional" => Self::Optional,
			"focus" => Self::Focus,
			"valid" => Self::Valid,
			"invalid" => Self::Invalid,
			_ => return None,
		})
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
	tag: Option<String>,
	id: Option<String>,
	classes: Vec<String>,
	attrs: Vec<AttrCondition>,
	pseudo_classes: Vec<PseudoClass>,
}

impl Compound {
	fn is_empty(&self) -> bool {
		self.tag.is_none()
			&& self.id.is_none()
			&& self.classes.is_empty()
			&& self.attrs.is_empty()
			&& self.pseudo_classes.is_empty()
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
	Descendant,
	Child,
}

/// One complex selector: compounds joined by combinators. The combinator
/// stored with a compound links it to the compound before it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ComplexSelector {
	parts: Vec<(Combinator, Compound)>,
}

/// A parsed, comma-separated selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SelectorList {
	selectors: Vec<ComplexSelector>,
}

impl SelectorList {
	pub(crate) fn parse(source: &str) -> DomResult<Self> {
		let invalid = || DomError::InvalidSelector(source.to_string());
		let mut chars = source.chars().peekable();
		let mut selectors = Vec::new();

		loop {
			skip_whitespace(&mut chars);
			let complex = parse_complex(&mut chars).ok_or_else(invalid)?;
			selectors.push(complex);
			skip_whitespace(&mut chars);
			match chars.next() {
				None => break,
				Some(',') => continue,
				Some(_) => return Err(invalid()),
			}
		}

		Ok(Self { selectors })
	}

	pub(crate) fn matches(&self, tree: &Tree, node: NodeId) -> bool {
		tree.element(node).is_some()
			&& self
				.selectors
				.iter()
				.any(|selector| matches_complex(tree, node, &selector.parts))
	}
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) -> bool {
	let mut skipped = false;
	while chars.peek().is_some_and(|c| c.is_whitespace()) {
		chars.next();
		skipped = true;
	}
	skipped
}

fn parse_complex(chars: &mut Peekable<Chars<'_>>) -> Option<ComplexSelector> {
	let mut parts = vec![(Combinator::Descendant, parse_compound(chars)?)];

	loop {
		let had_space = skip_whitespace(chars);
		let combinator = match chars.peek() {
			None | Some(',') => break,
			Some('>') => {
				chars.next();
				skip_whitespace(chars);
				Combinator::Child
			}
			Some(_) if had_space => Combinator::Descendant,
			Some(_) => return None,
		};
		parts.push((combinator, parse_compound(chars)?));
	}

	Some(ComplexSelector { parts })
}

fn parse_compound(chars: &mut Peekable<Chars<'_>>) -> Option<Compound> {
	let mut compound = Compound::default();
	let mut universal = false;

	if chars.peek() == Some(&'*') {
		chars.next();
		universal = true;
	} else if chars.peek().is_some_and(|c| is_ident_char(*c)) {
		compound.tag = Some(parse_ident(chars)?.to_ascii_lowercase());
	}

	loop {
		match chars.peek() {
			Some('#') => {
				chars.next();
				compound.id = Some(parse_ident(chars)?);
			}
			Some('.') => {
				chars.next();
				compound.classes.push(parse_ident(chars)?);
			}
			Some('[') => {
				chars.next();
				compound.attrs.push(parse_attr_condition(chars)?);
			}
			Some(':') => {
				chars.next();
				let name = parse_ident(chars)?.to_ascii_lowercase();
				compound.pseudo_classes.push(PseudoClass::parse(&name)?);
			}
			_ => break,
		}
	}

	if compound.is_empty() && !universal {
		return None;
	}
	Some(compound)
}

fn parse_attr_condition(chars: &mut Peekable<Chars<'_>>) -> Option<AttrCondition> {
	skip_whitespace(chars);
	let name = parse_ident(chars)?.to_ascii_lowercase();
	skip_whitespace(chars);

	match chars.next()? {
		']' => Some(AttrCondition::Exists { name }),
		'=' => {
			skip_whitespace(chars);
			let value = match chars.peek()? {
				'"' | '\'' => parse_quoted(chars)?,
				_ => parse_ident(chars)?,
			};
			skip_whitespace(chars);
			(chars.next()? == ']').then_some(AttrCondition::Equals { name, value })
		}
		_ => None,
	}
}

fn parse_quoted(chars: &mut Peekable<Chars<'_>>) -> Option<String> {
	let quote = chars.next()?;
	let mut out = String::new();
	loop {
		match chars.next()? {
			'\\' => out.push(chars.next()?),
			c if c == quote => return Some(out),
			c => out.push(c),
		}
	}
}

fn parse_ident(chars: &mut Peekable<Chars<'_>>) -> Option<String> {
	let mut out = String::new();
	while let Some(c) = chars.peek().copied() {
		if c == '\\' {
			chars.next();
			out.push(chars.next()?);
		} else if is_ident_char(c) {
			out.push(c);
			chars.next();
		} else {
			break;
		}
	}
	(!out.is_empty()).then_some(out)
}

fn is_ident_char(c: char) -> bool {
	c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

fn matches_complex(tree: &Tree, node: NodeId, parts: &[(Combinator, Compound)]) -> bool {
	let Some(((combinator, compound), rest)) = parts.split_last() else {
		return false;
	};
	if !matches_compound(tree, node, compound) {
		return false;
	}
	if rest.is_empty() {
		return true;
	}

	match combinator {
		Combinator::Child => tree
			.parent_element(node)
			.is_some_and(|parent| matches_complex(tree, parent, rest)),
		Combinator::Descendant => {
			let mut cursor = tree.parent_element(node);
			while let Some(ancestor) = cursor {
				if matches_complex(tree, ancestor, rest) {
					return true;
				}
				cursor = tree.parent_element(ancestor);
			}
			false
		}
	}
}

fn matches_compound(tree: &Tree, node: NodeId, compound: &Compound) -> bool {
	let Some(element) = tree.element(node) else {
		return false;
	};

	if let Some(tag) = &compound.tag
		&& element.tag_name != *tag
	{
		return false;
	}
	if let Some(id) = &compound.id
		&& element.attr("id") != Some(id.as_str())
	{
		return false;
	}
	if !compound.classes.is_empty() {
		let classes: Vec<&str> = element
			.attr("class")
			.map(|value| value.split_whitespace().collect())
			.unwrap_or_default();
		if !compound
			.classes
			.iter()
			.all(|class| classes.contains(&class.as_str()))
		{
			return false;
		}
	}

	let attrs_match = compound.attrs.iter().all(|condition| match condition {
		AttrCondition::Exists { name } => element.attr(name).is_some(),
		AttrCondition::Equals { name, value } => element.attr(name) == Some(value.as_str()),
	});
	if !attrs_match {
		return false;
	}

	compound
		.pseudo_classes
		.iter()
		.all(|pseudo| match pseudo {
			PseudoClass::Checked => form::checkedness(tree, node),
			PseudoClass::Disabled => form::is_control(element) && form::is_disabled(tree, node),
			PseudoClass::Enabled => form::is_control(element) && !form::is_disabled(tree, node),
			PseudoClass::Required => form::is_control(element) && element.attr("required").is_some(),
			PseudoClass::Optional => form::is_control(element) && element.attr("required").is_none(),
			PseudoClass::Focus => tree.active_element == Some(node),
			PseudoClass::Valid => form::will_validate(tree, node) && form::validity(tree, node).valid(),
			PseudoClass::Invalid => form::will_validate(tree, node) && !form::validity(tree, node).valid(),
		})
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("div")]
	#[case("*")]
	#[case("[name=\"test\"]")]
	#[case("[name='test']")]
	#[case("[name=test]")]
	#[case("form > input[type=hidden]")]
	#[case("form input.visually-hidden, #main")]
	#[case("input:invalid")]
	fn test_parse_supported_selectors(#[case] selector: &str) {
		assert!(SelectorList::parse(selector).is_ok(), "{selector}");
	}

	#[rstest]
	#[case("")]
	#[case("[name=")]
	#[case("div >")]
	#[case("input:hover")]
	#[case("a,,b")]
	#[case("[name=\"unterminated]")]
	fn test_parse_rejects_invalid_selectors(#[case] selector: &str) {
		assert!(
			matches!(SelectorList::parse(selector), Err(DomError::InvalidSelector(_))),
			"{selector}"
		);
	}

	#[rstest]
	fn test_parse_attribute_selector_with_quoted_value() {
		let list = SelectorList::parse("input[name=\"first name\"]").unwrap();

		assert_eq!(
			list.selectors[0].parts[0].1.attrs,
			vec![AttrCondition::Equals {
				name: "name".to_string(),
				value: "first name".to_string(),
			}]
		);
	}
}
