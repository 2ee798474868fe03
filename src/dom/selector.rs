//! Compound attribute selectors and the single-step XPath form that maps
//! onto them.
//!
//! CSS: `tag? ( #id | [attr] | [attr op value] )*`, op one of `=`, `*=`,
//! `^=`, `$=`. Combinators and selector lists are rejected.
//!
//! XPath: `//tag-or-*` optionally followed by `[@attr="value"]`.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot parse '{expression}': {reason}")]
pub struct ParseError {
    pub expression: String,
    pub reason: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrOp {
    Equals,
    Contains,
    Prefix,
    Suffix,
}

impl AttrOp {
    fn matches(self, actual: &str, expected: &str) -> bool {
        match self {
            Self::Equals => actual == expected,
            // Empty operands never match for substring operators.
            Self::Contains => !expected.is_empty() && actual.contains(expected),
            Self::Prefix => !expected.is_empty() && actual.starts_with(expected),
            Self::Suffix => !expected.is_empty() && actual.ends_with(expected),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrMatcher {
    pub name: String,
    pub test: Option<(AttrOp, String)>,
}

/// A parsed element predicate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selector {
    /// Lowercased tag name; `None` matches any element.
    pub tag: Option<String>,
    pub attrs: Vec<AttrMatcher>,
}

impl Selector {
    /// Parses the supported CSS subset.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] for empty input, combinators, selector lists,
    /// or unsupported operators.
    pub fn parse_css(expression: &str) -> Result<Self, ParseError> {
        let mut cursor = Cursor::new(expression);
        cursor.skip_ws();
        if cursor.at_end() {
            return Err(cursor.error("empty selector"));
        }

        let mut selector = Selector::default();
        if !cursor.eat('*') {
            selector.tag = cursor.ident().map(str::to_ascii_lowercase);
        }

        while !cursor.at_end() {
            match cursor.peek() {
                Some('#') => {
                    cursor.bump();
                    let id = cursor.ident().ok_or_else(|| cursor.error("expected id after '#'"))?;
                    selector.attrs.push(AttrMatcher {
                        name: "id".into(),
                        test: Some((AttrOp::Equals, id.to_owned())),
                    });
                }
                Some('[') => {
                    cursor.bump();
                    selector.attrs.push(cursor.attribute(false)?);
                }
                Some(c) if c.is_whitespace() => {
                    cursor.skip_ws();
                    if !cursor.at_end() {
                        return Err(cursor.error("combinators are not supported"));
                    }
                }
                Some(',') => return Err(cursor.error("selector lists are not supported")),
                _ => return Err(cursor.error("unexpected character")),
            }
        }

        Ok(selector)
    }

    /// Parses a `//tag[@attr="value"]` location path.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] for anything beyond a single descendant step
    /// with at most one attribute predicate.
    pub fn parse_xpath(expression: &str) -> Result<Self, ParseError> {
        let mut cursor = Cursor::new(expression.trim());
        if !(cursor.eat('/') && cursor.eat('/')) {
            return Err(cursor.error("expected '//' at start"));
        }

        let mut selector = Selector::default();
        if !cursor.eat('*') {
            let tag = cursor.ident().ok_or_else(|| cursor.error("expected node test"))?;
            selector.tag = Some(tag.to_ascii_lowercase());
        }

        if cursor.eat('[') {
            if !cursor.eat('@') {
                return Err(cursor.error("only attribute predicates are supported"));
            }
            let matcher = cursor.attribute(true)?;
            if !matches!(matcher.test, None | Some((AttrOp::Equals, _))) {
                return Err(cursor.error("only '=' is supported in predicates"));
            }
            selector.attrs.push(matcher);
        }

        if !cursor.at_end() {
            return Err(cursor.error("trailing input after location step"));
        }
        Ok(selector)
    }

    /// Tests an element given its tag and an attribute lookup.
    pub fn matches<'a>(&self, tag: &str, attr: impl Fn(&str) -> Option<&'a str>) -> bool {
        if let Some(want) = &self.tag {
            if !want.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        self.attrs.iter().all(|m| match (attr(&m.name), &m.test) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(actual), Some((op, expected))) => op.matches(actual, expected),
        })
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag.as_deref().unwrap_or("*"))?;
        for m in &self.attrs {
            match &m.test {
                None => write!(f, "[{}]", m.name)?,
                Some((op, value)) => {
                    let op = match op {
                        AttrOp::Equals => "=",
                        AttrOp::Contains => "*=",
                        AttrOp::Prefix => "^=",
                        AttrOp::Suffix => "$=",
                    };
                    write!(f, "[{}{op}\"{value}\"]", m.name)?;
                }
            }
        }
        Ok(())
    }
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn eat(&mut self, want: char) -> bool {
        if self.peek() == Some(want) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn ident(&mut self) -> Option<&'a str> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            self.bump();
        }
        let src = self.src;
        (self.pos > start).then(|| &src[start..self.pos])
    }

    /// Parses the body of `[...]` after the opening bracket.
    fn attribute(&mut self, xpath: bool) -> Result<AttrMatcher, ParseError> {
        self.skip_ws();
        let name = self
            .ident()
            .ok_or_else(|| self.error("expected attribute name"))?
            .to_ascii_lowercase();
        self.skip_ws();

        if self.eat(']') {
            return Ok(AttrMatcher { name, test: None });
        }

        let op = if self.eat('=') {
            AttrOp::Equals
        } else {
            let op = match self.peek() {
                Some('*') if !xpath => AttrOp::Contains,
                Some('^') if !xpath => AttrOp::Prefix,
                Some('$') if !xpath => AttrOp::Suffix,
                _ => return Err(self.error("unsupported attribute operator")),
            };
            self.bump();
            if !self.eat('=') {
                return Err(self.error("unsupported attribute operator"));
            }
            op
        };

        self.skip_ws();
        let value = match self.peek() {
            Some(q @ ('"' | '\'')) => {
                self.bump();
                let end = self
                    .rest()
                    .find(q)
                    .ok_or_else(|| self.error("unterminated string"))?;
                let value = &self.rest()[..end];
                self.pos += end + q.len_utf8();
                value
            }
            _ if xpath => return Err(self.error("predicate value must be quoted")),
            _ => self.ident().ok_or_else(|| self.error("expected attribute value"))?,
        };

        self.skip_ws();
        if !self.eat(']') {
            return Err(self.error("expected ']'"));
        }
        Ok(AttrMatcher {
            name,
            test: Some((op, value.to_owned())),
        })
    }

    fn error(&self, reason: &'static str) -> ParseError {
        ParseError {
            expression: self.src.to_owned(),
            reason,
        }
    }
}
