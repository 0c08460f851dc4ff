//! Inline style declarations
//!
//! The decorator merges its declarations into whatever the host already put in
//! a node's `style` attribute. Setting a property replaces any existing
//! declaration of the same name in place, so repeated passes converge on the
//! same string.

use std::fmt;

/// One `property: value [!important]` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub important: bool,
}

impl Declaration {
    pub fn new(property: &str, value: impl Into<String>) -> Self {
        Self {
            property: property.to_ascii_lowercase(),
            value: value.into(),
            important: false,
        }
    }

    pub fn important(property: &str, value: impl Into<String>) -> Self {
        Self {
            important: true,
            ..Self::new(property, value)
        }
    }

    fn parse(text: &str) -> Option<Self> {
        let (property, value) = text.split_once(':')?;
        let property = property.trim();
        if property.is_empty() {
            return None;
        }
        let value = value.trim();
        let (value, important) = match value.strip_suffix("!important") {
            Some(v) => (v.trim_end(), true),
            None => (value, false),
        };
        Some(Self {
            // custom properties are case-sensitive
            property: if property.starts_with("--") {
                property.to_string()
            } else {
                property.to_ascii_lowercase()
            },
            value: value.to_string(),
            important,
        })
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.property, self.value)?;
        if self.important {
            f.write_str(" !important")?;
        }
        Ok(())
    }
}

/// An ordered inline style.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InlineStyle {
    declarations: Vec<Declaration>,
}

impl InlineStyle {
    /// Parse a `style` attribute. Unparseable fragments are dropped.
    pub fn parse(text: &str) -> Self {
        Self {
            declarations: split_declarations(text)
                .filter_map(Declaration::parse)
                .collect(),
        }
    }

    pub fn get(&self, property: &str) -> Option<&Declaration> {
        self.declarations
            .iter()
            .find(|d| d.property.eq_ignore_ascii_case(property))
    }

    /// Replace the declaration for this property, or append it
    pub fn set(&mut self, declaration: Declaration) {
        match self
            .declarations
            .iter_mut()
            .find(|d| d.property.eq_ignore_ascii_case(&declaration.property))
        {
            Some(existing) => *existing = declaration,
            None => self.declarations.push(declaration),
        }
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

impl fmt::Display for InlineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, declaration) in self.declarations.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{declaration};")?;
        }
        Ok(())
    }
}

/// Merge declarations into an existing `style` attribute value.
pub fn merge(existing: Option<&str>, declarations: &[Declaration]) -> String {
    let mut style = existing.map(InlineStyle::parse).unwrap_or_default();
    for declaration in declarations {
        style.set(declaration.clone());
    }
    style.to_string()
}

/// Split on `;` outside parentheses and quotes (`url(data:...;base64,...)`).
fn split_declarations(text: &str) -> impl Iterator<Item = &str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ';') if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts.into_iter().filter(|p| !p.trim().is_empty())
}
