//! Safe reader for dictionary-literal records.
//!
//! Records look like `{'type': 'ORDER', 'tags': [{'k': 'v'}], 'n': 3}`. Only
//! plain data is accepted: mappings, lists, tuples, quoted strings, numbers,
//! `True`, `False` and `None`. Nothing is ever evaluated.

use ltv_core::{Attributes, CoreError};
use serde_json::{Number, Value};

/// Parse one record whose top level must be a mapping.
pub fn parse_mapping(text: &str) -> Result<Attributes, CoreError> {
    let mut parser = Parser::new(text);
    parser.skip_ws();
    if parser.peek() != Some('{') {
        return Err(parser.error("expected `{` at start of record"));
    }
    let value = parser.value()?;
    parser.skip_ws();
    if parser.pos < text.len() {
        return Err(parser.error("unexpected trailing content"));
    }
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(parser.error("record is not a mapping")),
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn error(&self, what: &str) -> CoreError {
        CoreError::malformed(format!("{what} at offset {}", self.pos))
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn value(&mut self) -> Result<Value, CoreError> {
        self.skip_ws();
        match self.peek() {
            Some('{') => self.mapping(),
            Some('[') => self.sequence('[', ']'),
            Some('(') => self.sequence('(', ')'),
            Some(c) if is_quote(c) || self.at_prefixed_string() => self.strings().map(Value::String),
            Some(c) if c == '-' || c == '+' || c == '.' || c.is_ascii_digit() => self.number(),
            Some(c) if c.is_ascii_alphabetic() => self.constant(),
            Some(_) => Err(self.error("unexpected character")),
            None => Err(self.error("unexpected end of record")),
        }
    }

    fn mapping(&mut self) -> Result<Value, CoreError> {
        self.eat('{');
        let mut map = Attributes::new();
        loop {
            self.skip_ws();
            if self.eat('}') {
                return Ok(Value::Object(map));
            }
            let key = match self.value()? {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                _ => return Err(self.error("mapping keys must be strings or numbers")),
            };
            self.skip_ws();
            if !self.eat(':') {
                return Err(self.error("expected `:` after key"));
            }
            let value = self.value()?;
            map.insert(key, value);
            self.skip_ws();
            if self.eat(',') {
                continue;
            }
            if self.eat('}') {
                return Ok(Value::Object(map));
            }
            return Err(self.error("expected `,` or `}` in mapping"));
        }
    }

    fn sequence(&mut self, open: char, close: char) -> Result<Value, CoreError> {
        self.eat(open);
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.eat(close) {
                return Ok(Value::Array(items));
            }
            items.push(self.value()?);
            self.skip_ws();
            if self.eat(',') {
                continue;
            }
            if self.eat(close) {
                return Ok(Value::Array(items));
            }
            return Err(self.error("expected `,` or closing bracket"));
        }
    }

    fn at_prefixed_string(&self) -> bool {
        let mut chars = self.src[self.pos..].chars();
        matches!(
            (chars.next(), chars.next()),
            (Some('u' | 'U' | 'r' | 'R'), Some(q)) if is_quote(q)
        )
    }

    /// Adjacent literals concatenate, as in `'ab' 'cd'`.
    fn strings(&mut self) -> Result<String, CoreError> {
        let mut out = self.string()?;
        loop {
            let mark = self.pos;
            self.skip_ws();
            match self.peek() {
                Some(c) if is_quote(c) || self.at_prefixed_string() => {
                    out.push_str(&self.string()?);
                }
                _ => {
                    self.pos = mark;
                    return Ok(out);
                }
            }
        }
    }

    fn string(&mut self) -> Result<String, CoreError> {
        let mut raw = false;
        if let Some(prefix @ ('u' | 'U' | 'r' | 'R')) = self.peek() {
            raw = matches!(prefix, 'r' | 'R');
            self.bump();
        }
        let quote = match self.bump() {
            Some(q) if is_quote(q) => q,
            _ => return Err(self.error("expected string")),
        };

        let mut out = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => return Err(self.error("unterminated string")),
                Some(c) if c == quote => return Ok(out),
                Some('\\') if raw => {
                    out.push('\\');
                    if let Some(next) = self.bump() {
                        out.push(next);
                    }
                }
                Some('\\') => self.escape(&mut out)?,
                Some(c) => out.push(c),
            }
        }
    }

    fn escape(&mut self, out: &mut String) -> Result<(), CoreError> {
        match self.bump() {
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('0') => out.push('\0'),
            Some('x') => out.push(self.code_point(2)?),
            Some('u') => out.push(self.code_point(4)?),
            Some('U') => out.push(self.code_point(8)?),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => return Err(self.error("unterminated escape")),
        }
        Ok(())
    }

    fn code_point(&mut self, digits: usize) -> Result<char, CoreError> {
        let end = self.pos + digits;
        let hex = self
            .src
            .get(self.pos..end)
            .ok_or_else(|| self.error("truncated escape"))?;
        let code = u32::from_str_radix(hex, 16).map_err(|_| self.error("invalid hex escape"))?;
        let c = char::from_u32(code).ok_or_else(|| self.error("invalid code point"))?;
        self.pos = end;
        Ok(c)
    }

    fn number(&mut self) -> Result<Value, CoreError> {
        let start = self.pos;
        if matches!(self.peek(), Some('-' | '+')) {
            self.bump();
        }
        let mut is_float = false;
        while let Some(c) = self.peek() {
            match c {
                '0'..='9' => {}
                '.' => is_float = true,
                'e' | 'E' => {
                    is_float = true;
                    self.bump();
                    if matches!(self.peek(), Some('-' | '+')) {
                        self.bump();
                    }
                    continue;
                }
                _ => break,
            }
            self.bump();
        }

        let text = self.src[start..self.pos].trim_start_matches('+');
        if !is_float {
            if let Ok(n) = text.parse::<i64>() {
                return Ok(Value::Number(n.into()));
            }
        }
        text.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| CoreError::malformed(format!("invalid number `{text}` at offset {start}")))
    }

    fn constant(&mut self) -> Result<Value, CoreError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.bump();
        }
        match &self.src[start..self.pos] {
            "True" => Ok(Value::Bool(true)),
            "False" => Ok(Value::Bool(false)),
            "None" => Ok(Value::Null),
            name => Err(CoreError::malformed(format!(
                "unsupported name `{name}` at offset {start}"
            ))),
        }
    }
}

fn is_quote(c: char) -> bool {
    c == '\'' || c == '"'
}
