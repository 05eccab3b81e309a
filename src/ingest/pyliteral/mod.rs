// Parser for the Python-literal subset found in exported list-of-dict columns.
// Accepts lists, tuples, dicts, quoted strings, numbers, True, False and None.


use serde_json::{Map, Number, Value};
use std::iter::Peekable;
use std::str::CharIndices;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PyLiteralError {
    #[error("Unexpected end of input")]
    UnexpectedEnd,
    #[error("Unexpected character '{found}' at offset {offset}")]
    UnexpectedChar { found: char, offset: usize },
    #[error("Invalid number '{0}'")]
    InvalidNumber(String),
    #[error("Invalid escape sequence at offset {0}")]
    InvalidEscape(usize),
    #[error("Dictionary keys must be strings (offset {0})")]
    NonStringKey(usize),
    #[error("Trailing input at offset {0}")]
    TrailingInput(usize),
}

/// Parse a Python literal into JSON. JSON input is accepted as well.
#[inline]
pub fn parse(input: &str) -> Result<Value, PyLiteralError> {
    let mut parser = Parser {
        chars: input.char_indices().peekable(),
    };
    let value = parser.value()?;
    parser.skip_whitespace();
    match parser.chars.peek() {
        Some(&(offset, _)) => Err(PyLiteralError::TrailingInput(offset)),
        None => Ok(value),
    }
}

struct Parser<'a> {
    chars: Peekable<CharIndices<'a>>,
}

impl Parser<'_> {
    fn value(&mut self) -> Result<Value, PyLiteralError> {
        self.skip_whitespace();
        let &(offset, c) = self.chars.peek().ok_or(PyLiteralError::UnexpectedEnd)?;
        match c {
            '[' => self.sequence(']'),
            '(' => self.sequence(')'),
            '{' => self.dict(),
            '\'' | '"' => self.string().map(Value::String),
            '-' | '+' | '.' | '0'..='9' => self.number(),
            c if c.is_alphabetic() => self.keyword(),
            found => Err(PyLiteralError::UnexpectedChar { found, offset }),
        }
    }

    fn sequence(&mut self, close: char) -> Result<Value, PyLiteralError> {
        self.chars.next();
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            if self.eat(close) {
                return Ok(Value::Array(items));
            }
            items.push(self.value()?);
            self.skip_whitespace();
            if !self.eat(',') {
                self.expect(close)?;
                return Ok(Value::Array(items));
            }
        }
    }

    fn dict(&mut self) -> Result<Value, PyLiteralError> {
        self.chars.next();
        let mut map = Map::new();
        loop {
            self.skip_whitespace();
            if self.eat('}') {
                return Ok(Value::Object(map));
            }
            let offset = self.offset();
            let Value::String(key) = self.value()? else {
                return Err(PyLiteralError::NonStringKey(offset));
            };
            self.skip_whitespace();
            self.expect(':')?;
            let value = self.value()?;
            map.insert(key, value);
            self.skip_whitespace();
            if !self.eat(',') {
                self.expect('}')?;
                return Ok(Value::Object(map));
            }
        }
    }

    fn string(&mut self) -> Result<String, PyLiteralError> {
        let (_, quote) = self.chars.next().ok_or(PyLiteralError::UnexpectedEnd)?;
        let mut out = String::new();
        loop {
            let (offset, c) = self.chars.next().ok_or(PyLiteralError::UnexpectedEnd)?;
            match c {
                c if c == quote => return Ok(out),
                '\\' => out.push(self.escape(offset)?),
                c => out.push(c),
            }
        }
    }

    fn escape(&mut self, offset: usize) -> Result<char, PyLiteralError> {
        let (_, c) = self.chars.next().ok_or(PyLiteralError::UnexpectedEnd)?;
        let escaped = match c {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            '\\' | '\'' | '"' | '/' => c,
            'x' => self.hex_escape(2, offset)?,
            'u' => self.hex_escape(4, offset)?,
            'U' => self.hex_escape(8, offset)?,
            _ => return Err(PyLiteralError::InvalidEscape(offset)),
        };
        Ok(escaped)
    }

    fn hex_escape(&mut self, digits: usize, offset: usize) -> Result<char, PyLiteralError> {
        let mut code = 0u32;
        for _ in 0..digits {
            let (_, c) = self.chars.next().ok_or(PyLiteralError::UnexpectedEnd)?;
            let digit = c.to_digit(16).ok_or(PyLiteralError::InvalidEscape(offset))?;
            code = code * 16 + digit;
        }
        char::from_u32(code).ok_or(PyLiteralError::InvalidEscape(offset))
    }

    fn number(&mut self) -> Result<Value, PyLiteralError> {
        let mut raw = String::new();
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E' | '_') {
                if c != '_' {
                    raw.push(c);
                }
                self.chars.next();
            } else {
                break;
            }
        }

        if let Ok(int) = raw.parse::<i64>() {
            return Ok(Value::Number(int.into()));
        }
        raw.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or(PyLiteralError::InvalidNumber(raw))
    }

    fn keyword(&mut self) -> Result<Value, PyLiteralError> {
        let offset = self.offset();
        let mut word = String::new();
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                word.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        match word.as_str() {
            "None" | "null" => Ok(Value::Null),
            "True" | "true" => Ok(Value::Bool(true)),
            "False" | "false" => Ok(Value::Bool(false)),
            _ => Err(PyLiteralError::UnexpectedChar {
                found: word.chars().next().unwrap_or_default(),
                offset,
            }),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|&(_, c)| c.is_whitespace()).is_some() {}
    }

    fn eat(&mut self, expected: char) -> bool {
        self.chars.next_if(|&(_, c)| c == expected).is_some()
    }

    fn expect(&mut self, expected: char) -> Result<(), PyLiteralError> {
        match self.chars.next() {
            Some((_, c)) if c == expected => Ok(()),
            Some((offset, found)) => Err(PyLiteralError::UnexpectedChar { found, offset }),
            None => Err(PyLiteralError::UnexpectedEnd),
        }
    }

    fn offset(&mut self) -> usize {
        self.chars.peek().map_or(usize::MAX, |&(offset, _)| offset)
    }
}
