//! Anchor selector parsing and matching
//!
//! Supports the subset of CSS selectors the anchors are written in: type
//! selectors, `*`, `.class`, `#id`, `[attr]`, `[attr="value"]`, and the
//! descendant (whitespace) and child (`>`) combinators.

use std::fmt;

use super::error::SelectorError;

/// An element the selector can be evaluated against.
pub trait SelectorTarget: Sized {
    fn local_name(&self) -> &str;
    fn has_class(&self, class: &str) -> bool;
    fn attribute(&self, name: &str) -> Option<&str>;
    fn parent_element(&self) -> Option<Self>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeMatch {
    Exists(String),
    Equals(String, String),
}

/// A compound selector such as `div.sticky` or `header[role="banner"]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Compound {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: Vec<AttributeMatch>,
}

impl Compound {
    pub fn matches<T: SelectorTarget>(&self, element: &T) -> bool {
        if let Some(tag) = &self.tag
            && !tag.eq_ignore_ascii_case(element.local_name())
        {
            return false;
        }
        if let Some(id) = &self.id
            && element.attribute("id") != Some(id.as_str())
        {
            return false;
        }
        self.classes.iter().all(|c| element.has_class(c))
            && self.attributes.iter().all(|a| match a {
                AttributeMatch::Exists(name) => element.attribute(name).is_some(),
                AttributeMatch::Equals(name, value) => {
                    element.attribute(name) == Some(value.as_str())
                }
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
}

/// A complex selector: compounds joined by combinators, left to right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    /// Subject is last. `combinators[i]` joins `compounds[i]` and `compounds[i + 1]`.
    compounds: Vec<Compound>,
    combinators: Vec<Combinator>,
    source: String,
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let mut parser = Parser {
            chars: input.char_indices().peekable(),
        };
        let mut compounds = Vec::new();
        let mut combinators = Vec::new();
        let mut pending: Option<Combinator> = None;

        loop {
            let saw_space = parser.skip_whitespace();
            match parser.peek() {
                None => break,
                Some('>') => {
                    parser.next();
                    if compounds.is_empty() {
                        return Err(SelectorError::DanglingCombinator { side: "left" });
                    }
                    pending = Some(Combinator::Child);
                    continue;
                }
                Some(_) => {}
            }
            if !compounds.is_empty() {
                let combinator = match pending.take() {
                    Some(c) => c,
                    None if saw_space => Combinator::Descendant,
                    None => {
                        let (offset, found) = parser.peek_indexed().unwrap_or((input.len(), ' '));
                        return Err(SelectorError::Unexpected { found, offset });
                    }
                };
                combinators.push(combinator);
            }
            compounds.push(parser.compound()?);
        }

        if pending.is_some() {
            return Err(SelectorError::DanglingCombinator { side: "right" });
        }
        if compounds.is_empty() {
            return Err(SelectorError::Empty);
        }
        Ok(Self {
            compounds,
            combinators,
            source: input.trim().to_string(),
        })
    }

    /// Parse a single compound (no combinators)
    pub fn parse_compound(input: &str) -> Result<Compound, SelectorError> {
        let selector = Self::parse(input)?;
        match selector.compounds.len() {
            1 => Ok(selector.compounds.into_iter().next().unwrap_or_default()),
            _ => Err(SelectorError::Unexpected {
                found: ' ',
                offset: input.trim_start().find(char::is_whitespace).unwrap_or(0),
            }),
        }
    }

    /// Whether `element` is the subject of this selector
    pub fn matches<T: SelectorTarget>(&self, element: &T) -> bool {
        self.matches_from(element, self.compounds.len() - 1)
    }

    fn matches_from<T: SelectorTarget>(&self, element: &T, index: usize) -> bool {
        if !self.compounds[index].matches(element) {
            return false;
        }
        if index == 0 {
            return true;
        }
        match self.combinators[index - 1] {
            Combinator::Child => element
                .parent_element()
                .is_some_and(|parent| self.matches_from(&parent, index - 1)),
            Combinator::Descendant => {
                let mut ancestor = element.parent_element();
                while let Some(node) = ancestor {
                    if self.matches_from(&node, index - 1) {
                        return true;
                    }
                    ancestor = node.parent_element();
                }
                false
            }
        }
    }
}

struct Parser<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl Parser<'_> {
    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn peek_indexed(&mut self) -> Option<(usize, char)> {
        self.chars.peek().copied()
    }

    fn next(&mut self) -> Option<(usize, char)> {
        self.chars.next()
    }

    fn offset(&mut self) -> usize {
        self.chars.peek().map(|&(i, _)| i).unwrap_or(usize::MAX)
    }

    fn skip_whitespace(&mut self) -> bool {
        let mut skipped = false;
        while self.peek().is_some_and(char::is_whitespace) {
            self.chars.next();
            skipped = true;
        }
        skipped
    }

    fn name(&mut self) -> Result<String, SelectorError> {
        let offset = self.offset();
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                name.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        if name.is_empty() {
            Err(SelectorError::ExpectedName { offset })
        } else {
            Ok(name)
        }
    }

    fn compound(&mut self) -> Result<Compound, SelectorError> {
        let mut compound = Compound::default();
        match self.peek() {
            Some('*') => {
                self.chars.next();
            }
            Some(c) if c.is_alphabetic() => compound.tag = Some(self.name()?.to_ascii_lowercase()),
            _ => {}
        }
        loop {
            match self.peek() {
                Some('.') => {
                    self.chars.next();
                    compound.classes.push(self.name()?);
                }
                Some('#') => {
                    self.chars.next();
                    compound.id = Some(self.name()?);
                }
                Some('[') => {
                    self.chars.next();
                    compound.attributes.push(self.attribute()?);
                }
                Some(c) if c.is_whitespace() || c == '>' => break,
                None => break,
                Some(found) => {
                    let offset = self.offset();
                    return Err(SelectorError::Unexpected { found, offset });
                }
            }
        }
        Ok(compound)
    }

    fn attribute(&mut self) -> Result<AttributeMatch, SelectorError> {
        self.skip_whitespace();
        let name = self.name()?;
        self.skip_whitespace();
        match self.next() {
            Some((_, ']')) => Ok(AttributeMatch::Exists(name)),
            Some((_, '=')) => {
                self.skip_whitespace();
                let value = match self.peek() {
                    Some(quote @ ('"' | '\'')) => {
                        self.chars.next();
                        let mut value = String::new();
                        loop {
                            match self.next() {
                                Some((_, c)) if c == quote => break,
                                Some((_, c)) => value.push(c),
                                None => return Err(SelectorError::UnterminatedAttribute),
                            }
                        }
                        value
                    }
                    _ => self.name()?,
                };
                self.skip_whitespace();
                match self.next() {
                    Some((_, ']')) => Ok(AttributeMatch::Equals(name, value)),
                    Some((offset, found)) => Err(SelectorError::Unexpected { found, offset }),
                    None => Err(SelectorError::UnterminatedAttribute),
                }
            }
            Some((offset, found)) => Err(SelectorError::Unexpected { found, offset }),
            None => Err(SelectorError::UnterminatedAttribute),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_default_anchor() {
        let anchors = gallery_wall_types::AnchorSelectors::default();
        for (name, selector) in anchors.entries() {
            assert!(Selector::parse(selector).is_ok(), "anchor {name} failed to parse");
        }
    }

    #[test]
    fn parses_compound_parts() {
        let compound = Selector::parse_compound(r#"header[role="banner"]"#).unwrap();
        assert_eq!(compound.tag.as_deref(), Some("header"));
        assert_eq!(
            compound.attributes,
            vec![AttributeMatch::Equals("role".into(), "banner".into())]
        );

        let compound = Selector::parse_compound(".grid.w-full.gap-4").unwrap();
        assert_eq!(compound.tag, None);
        assert_eq!(compound.classes, vec!["grid", "w-full", "gap-4"]);
    }

    #[test]
    fn parses_combinators() {
        let selector = Selector::parse("ul > li article div.absolute").unwrap();
        assert_eq!(selector.compounds.len(), 4);
        assert_eq!(
            selector.combinators,
            vec![Combinator::Child, Combinator::Descendant, Combinator::Descendant]
        );

        let tight = Selector::parse("a>span>img").unwrap();
        assert_eq!(tight.combinators, vec![Combinator::Child, Combinator::Child]);
    }

    #[test]
    fn rejects_malformed_selectors() {
        assert_eq!(Selector::parse("   "), Err(SelectorError::Empty));
        assert_eq!(
            Selector::parse("> a"),
            Err(SelectorError::DanglingCombinator { side: "left" })
        );
        assert_eq!(
            Selector::parse("a >"),
            Err(SelectorError::DanglingCombinator { side: "right" })
        );
        assert_eq!(
            Selector::parse("div[role"),
            Err(SelectorError::UnterminatedAttribute)
        );
        assert!(Selector::parse("div..x").is_err());
        assert!(Selector::parse("div:hover").is_err());
        assert!(Selector::parse_compound("div span").is_err());
    }
}
