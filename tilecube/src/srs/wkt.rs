//! Minimal WKT tree parser.
//!
//! Parses both WKT1 (`AUTHORITY["EPSG","4326"]`) and WKT2 (`ID["EPSG",4326]`)
//! into a keyword tree. Only structure is recovered; no CRS semantics.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WktError {
    #[error("WKT is empty")]
    Empty,

    #[error("Unexpected character '{found}' at offset {offset}")]
    Unexpected { found: char, offset: usize },

    #[error("Unexpected end of WKT")]
    UnexpectedEnd,
}

/// A value inside a WKT node.
#[derive(Debug, Clone, PartialEq)]
pub enum WktValue {
    /// Quoted string
    Text(String),
    /// Unquoted token (numbers, enumerations like `north`)
    Token(String),
    /// Nested node
    Node(WktNode),
}

/// A `KEYWORD[...]` element.
#[derive(Debug, Clone, PartialEq)]
pub struct WktNode {
    pub keyword: String,
    pub values: Vec<WktValue>,
}

impl WktNode {
    pub fn parse(input: &str) -> Result<Self, WktError> {
        let mut parser = Parser {
            chars: input.char_indices().collect(),
            pos: 0,
        };
        parser.skip_ws();
        if parser.peek().is_none() {
            return Err(WktError::Empty);
        }
        let node = parser.node()?;
        parser.skip_ws();
        match parser.peek() {
            None => Ok(node),
            Some((offset, found)) => Err(WktError::Unexpected { found, offset }),
        }
    }

    /// Direct child nodes.
    pub fn children(&self) -> impl Iterator<Item = &WktNode> {
        self.values.iter().filter_map(|v| match v {
            WktValue::Node(n) => Some(n),
            _ => None,
        })
    }

    /// First direct child whose keyword is one of `keywords`.
    pub fn child_any(&self, keywords: &[&str]) -> Option<&WktNode> {
        self.children()
            .find(|n| keywords.contains(&n.keyword.as_str()))
    }

    /// EPSG code declared directly on this node.
    pub fn epsg_code(&self) -> Option<u32> {
        let id = self.child_any(&["AUTHORITY", "ID"])?;
        let mut values = id.values.iter();
        let authority = match values.next()? {
            WktValue::Text(s) | WktValue::Token(s) => s,
            WktValue::Node(_) => return None,
        };
        if !authority.eq_ignore_ascii_case("EPSG") {
            return None;
        }
        match values.next()? {
            WktValue::Text(s) | WktValue::Token(s) => s.trim().parse().ok(),
            WktValue::Node(_) => None,
        }
    }
}

struct Parser {
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<(usize, char)> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<(usize, char)> {
        let c = self.peek();
        self.pos += 1;
        c
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some((_, c)) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, want: char) -> Result<(), WktError> {
        match self.bump() {
            Some((_, c)) if c == want => Ok(()),
            Some((offset, found)) => Err(WktError::Unexpected { found, offset }),
            None => Err(WktError::UnexpectedEnd),
        }
    }

    fn token(&mut self) -> String {
        let mut out = String::new();
        while let Some((_, c)) = self.peek() {
            if c == '[' || c == ']' || c == '(' || c == ')' || c == ',' || c.is_whitespace() {
                break;
            }
            out.push(c);
            self.pos += 1;
        }
        out
    }

    fn node(&mut self) -> Result<WktNode, WktError> {
        let keyword = self.token();
        if keyword.is_empty() {
            return match self.peek() {
                Some((offset, found)) => Err(WktError::Unexpected { found, offset }),
                None => Err(WktError::UnexpectedEnd),
            };
        }
        self.skip_ws();
        let close = match self.bump() {
            Some((_, '[')) => ']',
            Some((_, '(')) => ')',
            Some((offset, found)) => return Err(WktError::Unexpected { found, offset }),
            None => return Err(WktError::UnexpectedEnd),
        };

        let mut values = Vec::new();
        loop {
            self.skip_ws();
            match self.peek() {
                Some((_, c)) if c == close => {
                    self.pos += 1;
                    break;
                }
                Some((_, '"')) => values.push(WktValue::Text(self.quoted()?)),
                Some(_) => {
                    let start = self.pos;
                    let tok = self.token();
                    self.skip_ws();
                    if matches!(self.peek(), Some((_, '[')) | Some((_, '('))) {
                        self.pos = start;
                        values.push(WktValue::Node(self.node()?));
                    } else if tok.is_empty() {
                        let (offset, found) = self.peek().ok_or(WktError::UnexpectedEnd)?;
                        return Err(WktError::Unexpected { found, offset });
                    } else {
                        values.push(WktValue::Token(tok));
                    }
                }
                None => return Err(WktError::UnexpectedEnd),
            }
            self.skip_ws();
            match self.peek() {
                Some((_, ',')) => self.pos += 1,
                Some((_, c)) if c == close => {}
                Some((offset, found)) => return Err(WktError::Unexpected { found, offset }),
                None => return Err(WktError::UnexpectedEnd),
            }
        }
        Ok(WktNode { keyword, values })
    }

    fn quoted(&mut self) -> Result<String, WktError> {
        self.expect('"')?;
        let mut out = String::new();
        loop {
            match self.bump() {
                // WKT escapes a quote by doubling it
                Some((_, '"')) if matches!(self.peek(), Some((_, '"'))) => {
                    self.pos += 1;
                    out.push('"');
                }
                Some((_, '"')) => return Ok(out),
                Some((_, c)) => out.push(c),
                None => return Err(WktError::UnexpectedEnd),
            }
        }
    }
}
