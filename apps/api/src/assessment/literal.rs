//! Strict parser for the mapping literal returned by the refinement pass.
//!
//! Accepts `{ key: [str, ...], ... }` in JSON or Python-literal syntax:
//! single- or double-quoted strings with the usual escapes (octal included),
//! `u` and `r` string prefixes, adjacent string concatenation, list or tuple
//! sequences, and trailing commas. Anything else is rejected with the byte
//! offset where parsing stopped.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid mapping literal at byte {offset}: {reason}")]
pub struct LiteralError {
    pub offset: usize,
    pub reason: String,
}

/// Parses `text` as a mapping from string keys to sequences of strings.
///
/// Entries are returned in source order. A repeated key keeps only its last
/// value, in the position of its first occurrence.
pub fn parse_mapping_literal(text: &str) -> Result<Vec<(String, Vec<String>)>, LiteralError> {
    let mut cursor = Cursor { src: text, pos: 0 };
    let entries = cursor.mapping()?;
    cursor.skip_ws();
    if let Some(c) = cursor.peek() {
        return Err(cursor.error(format!("unexpected '{c}' after closing brace")));
    }
    Ok(entries)
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl Cursor<'_> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn error(&self, reason: impl Into<String>) -> LiteralError {
        LiteralError {
            offset: self.pos,
            reason: reason.into(),
        }
    }

    fn expect(&mut self, want: char) -> Result<(), LiteralError> {
        self.skip_ws();
        match self.peek() {
            Some(c) if c == want => {
                self.bump();
                Ok(())
            }
            Some(c) => Err(self.error(format!("expected '{want}', found '{c}'"))),
            None => Err(self.error(format!("expected '{want}', found end of input"))),
        }
    }

    fn mapping(&mut self) -> Result<Vec<(String, Vec<String>)>, LiteralError> {
        self.expect('{')?;
        let mut entries: Vec<(String, Vec<String>)> = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some('}') {
                self.bump();
                return Ok(entries);
            }
            let key = self.string()?;
            self.expect(':')?;
            let values = self.sequence()?;
            match entries.iter_mut().find(|entry| entry.0 == key) {
                Some(existing) => existing.1 = values,
                None => entries.push((key, values)),
            }

            self.skip_ws();
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some('}') => {
                    self.bump();
                    return Ok(entries);
                }
                Some(c) => return Err(self.error(format!("expected ',' or '}}', found '{c}'"))),
                None => return Err(self.error("unterminated mapping")),
            }
        }
    }

    fn sequence(&mut self) -> Result<Vec<String>, LiteralError> {
        self.skip_ws();
        let close = match self.peek() {
            Some('[') => ']',
            Some('(') => ')',
            Some(c) => return Err(self.error(format!("expected a list, found '{c}'"))),
            None => return Err(self.error("expected a list, found end of input")),
        };
        self.bump();

        let mut items = Vec::new();
        let mut trailing_comma = false;
        loop {
            self.skip_ws();
            if self.peek() == Some(close) {
                self.bump();
                break;
            }
            items.push(self.string()?);
            trailing_comma = false;

            self.skip_ws();
            match self.peek() {
                Some(',') => {
                    self.bump();
                    trailing_comma = true;
                }
                Some(c) if c == close => {
                    self.bump();
                    break;
                }
                Some(c) => return Err(self.error(format!("expected ',' or '{close}', found '{c}'"))),
                None => return Err(self.error("unterminated list")),
            }
        }

        // `('x')` is a parenthesized string in Python, not a one-element tuple.
        if close == ')' && items.len() == 1 && !trailing_comma {
            return Err(self.error("parenthesized string is not a tuple"));
        }
        Ok(items)
    }

    /// One string literal, or several adjacent ones concatenated.
    fn string(&mut self) -> Result<String, LiteralError> {
        let mut out = self.single_string()?;
        loop {
            let save = self.pos;
            self.skip_ws();
            if self.at_string_start() {
                out.push_str(&self.single_string()?);
            } else {
                self.pos = save;
                return Ok(out);
            }
        }
    }

    fn at_string_start(&self) -> bool {
        match self.peek() {
            Some('\'' | '"') => true,
            Some('u' | 'U' | 'r' | 'R') => self.quote_follows(),
            _ => false,
        }
    }

    fn quote_follows(&self) -> bool {
        matches!(self.src[self.pos..].chars().nth(1), Some('\'' | '"'))
    }

    fn single_string(&mut self) -> Result<String, LiteralError> {
        self.skip_ws();
        let raw = match self.peek() {
            Some('u' | 'U') if self.quote_follows() => {
                self.bump();
                false
            }
            Some('r' | 'R') if self.quote_follows() => {
                self.bump();
                true
            }
            _ => false,
        };
        let quote = match self.peek() {
            Some(q @ ('\'' | '"')) => q,
            Some(c) => return Err(self.error(format!("expected a string, found '{c}'"))),
            None => return Err(self.error("expected a string, found end of input")),
        };
        self.bump();

        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string")),
                Some('\n') => return Err(self.error("newline inside string")),
                Some(c) if c == quote => return Ok(out),
                // Raw strings keep the backslash and never end on an escaped quote.
                Some('\\') if raw => {
                    out.push('\\');
                    match self.bump() {
                        None => return Err(self.error("unterminated string")),
                        Some(c) => out.push(c),
                    }
                }
                Some('\\') => self.escape(&mut out)?,
                Some(c) => out.push(c),
            }
        }
    }

    fn escape(&mut self, out: &mut String) -> Result<(), LiteralError> {
        let c = match self.bump() {
            None => return Err(self.error("unterminated escape")),
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some('b') => '\u{8}',
            Some('f') => '\u{c}',
            Some(c @ ('\\' | '\'' | '"' | '/')) => c,
            // Backslash-newline continues the string on the next line.
            Some('\n') => return Ok(()),
            Some(first @ '0'..='7') => {
                let code = self.octal(first);
                return self.push_code(out, code);
            }
            Some('x') => {
                let code = self.hex(2)?;
                return self.push_code(out, code);
            }
            Some('u') => {
                let code = self.hex(4)?;
                if (0xD800..0xDC00).contains(&code) {
                    return self.low_surrogate(out, code);
                }
                return self.push_code(out, code);
            }
            Some('U') => {
                let code = self.hex(8)?;
                return self.push_code(out, code);
            }
            // Unknown escapes are kept verbatim, as Python does.
            Some(c) => {
                out.push('\\');
                c
            }
        };
        out.push(c);
        Ok(())
    }

    fn low_surrogate(&mut self, out: &mut String, high: u32) -> Result<(), LiteralError> {
        if self.bump() != Some('\\') || self.bump() != Some('u') {
            return Err(self.error("unpaired surrogate in \\u escape"));
        }
        let low = self.hex(4)?;
        if !(0xDC00..0xE000).contains(&low) {
            return Err(self.error("unpaired surrogate in \\u escape"));
        }
        self.push_code(out, 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00))
    }

    fn hex(&mut self, digits: usize) -> Result<u32, LiteralError> {
        let start = self.pos;
        let end = start + digits;
        let code = self
            .src
            .get(start..end)
            .filter(|s| s.chars().all(|c| c.is_ascii_hexdigit()))
            .and_then(|s| u32::from_str_radix(s, 16).ok())
            .ok_or_else(|| self.error(format!("expected {digits} hex digits")))?;
        self.pos = end;
        Ok(code)
    }

    /// Up to three octal digits, the first already consumed.
    fn octal(&mut self, first: char) -> u32 {
        let mut code = first.to_digit(8).unwrap_or(0);
        for _ in 0..2 {
            match self.peek().and_then(|c| c.to_digit(8)) {
                Some(d) => {
                    code = code * 8 + d;
                    self.bump();
                }
                None => break,
            }
        }
        code
    }

    fn push_code(&self, out: &mut String, code: u32) -> Result<(), LiteralError> {
        let c = char::from_u32(code)
            .ok_or_else(|| self.error(format!("invalid code point U+{code:04X}")))?;
        out.push(c);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str, values: &[&str]) -> (String, Vec<String>) {
        (
            key.to_string(),
            values.iter().map(|v| v.to_string()).collect(),
        )
    }

    #[test]
    fn test_python_dict_with_single_quotes() {
        let parsed =
            parse_mapping_literal("{'Awards': ['Fellowship', \"Best Paper, ICML\"], 'Press': []}")
                .unwrap();
        assert_eq!(
            parsed,
            vec![
                entry("Awards", &["Fellowship", "Best Paper, ICML"]),
                entry("Press", &[])
            ]
        );
    }

    #[test]
    fn test_json_object_with_whitespace_and_trailing_commas() {
        let text = "{\n  \"Judging\": [\n    \"Reviewer\",\n  ],\n  \"Membership\": [],\n}\n";
        let parsed = parse_mapping_literal(text).unwrap();
        assert_eq!(
            parsed,
            vec![entry("Judging", &["Reviewer"]), entry("Membership", &[])]
        );
    }

    #[test]
    fn test_escapes() {
        let parsed = parse_mapping_literal(r#"{'Press': ['O\'Reilly', "say \"hi\"", 'café', 'tab\there', '\U0001F600', '😀']}"#)
            .unwrap();
        assert_eq!(
            parsed[0].1,
            vec!["O'Reilly", "say \"hi\"", "café", "tab\there", "😀", "😀"]
        );
    }

    #[test]
    fn test_octal_escapes() {
        let parsed = parse_mapping_literal(r"{'Awards': ['a\012b', 'nul\0', '\101\1010', '\8']}").unwrap();
        assert_eq!(parsed[0].1, vec!["a\nb", "nul\0", "AA0", "\\8"]);
    }

    #[test]
    fn test_unicode_and_raw_prefixes() {
        let parsed =
            parse_mapping_literal(r#"{u'Awards': [U"Fellowship", r'C:\new', R"say \"hi\"", u'a' r'\n']}"#)
                .unwrap();
        assert_eq!(parsed[0].0, "Awards");
        assert_eq!(
            parsed[0].1,
            vec!["Fellowship", r"C:\new", r#"say \"hi\""#, r"a\n"]
        );
    }

    #[test]
    fn test_unsupported_prefixes_are_rejected() {
        assert!(parse_mapping_literal("{b'Awards': []}").is_err());
        assert!(parse_mapping_literal("{f'Awards': []}").is_err());
        assert!(parse_mapping_literal("{'Awards': [u]}").is_err());
    }

    #[test]
    fn test_adjacent_strings_concatenate() {
        let parsed = parse_mapping_literal("{'Awards': ['Best ' 'Paper']}").unwrap();
        assert_eq!(parsed[0].1, vec!["Best Paper"]);
    }

    #[test]
    fn test_tuples_are_sequences() {
        let parsed = parse_mapping_literal("{'Awards': ('A', 'B'), 'Press': ('C',), 'Judging': ()}")
            .unwrap();
        assert_eq!(parsed[0].1, vec!["A", "B"]);
        assert_eq!(parsed[1].1, vec!["C"]);
        assert!(parsed[2].1.is_empty());
    }

    #[test]
    fn test_parenthesized_string_is_rejected() {
        assert!(parse_mapping_literal("{'Awards': ('A')}").is_err());
    }

    #[test]
    fn test_repeated_key_keeps_last_value() {
        let parsed = parse_mapping_literal("{'Awards': ['A'], 'Press': [], 'Awards': ['B']}").unwrap();
        assert_eq!(parsed, vec![entry("Awards", &["B"]), entry("Press", &[])]);
    }

    #[test]
    fn test_commentary_around_literal_is_rejected() {
        let err = parse_mapping_literal("Here is the dictionary: {'Awards': []}").unwrap_err();
        assert_eq!(err.offset, 0);

        let err = parse_mapping_literal("{'Awards': []} Hope this helps!").unwrap_err();
        assert!(err.reason.contains("after closing brace"), "{err}");
    }

    #[test]
    fn test_non_string_values_are_rejected() {
        assert!(parse_mapping_literal("{'Awards': [None]}").is_err());
        assert!(parse_mapping_literal("{'Awards': 3}").is_err());
        assert!(parse_mapping_literal("{'Awards': 'Fellowship'}").is_err());
        assert!(parse_mapping_literal("{Awards: []}").is_err());
    }

    #[test]
    fn test_truncated_input_is_rejected() {
        for text in ["", "{", "{'Awards'", "{'Awards': [", "{'Awards': ['x", "{'Awards': ['x']"] {
            assert!(parse_mapping_literal(text).is_err(), "accepted {text:?}");
        }
    }

    #[test]
    fn test_raw_newline_in_string_is_rejected() {
        assert!(parse_mapping_literal("{'Awards': ['line one\nline two']}").is_err());
    }

    #[test]
    fn test_empty_mapping() {
        assert_eq!(parse_mapping_literal("  {}  ").unwrap(), vec![]);
    }
}
