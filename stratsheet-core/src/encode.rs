//! Structured text encoder with two output modes.
//!
//! `Loose` is the human-readable form: bare keys, single-quoted strings,
//! spaces after separators, blank array slots elided. `Strict` is plain
//! JSON. Both write the same line structure: one line per top-level block
//! entry, each entry compacted onto its line.

use thiserror::Error;

use crate::numfmt;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("non-finite number {value} cannot be encoded")]
    NonFinite { value: f64 },

    #[error("string escape failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Loose,
    Strict,
}

/// A value in the encoder's tree.
#[derive(Debug, Clone, PartialEq)]
pub enum DocValue {
    Number(f64),
    Str(String),
    /// A string that loose mode pads so that following columns line up.
    Label(String),
    /// An empty slot that keeps its array position.
    Blank,
    List(Vec<DocValue>),
    Map(Vec<(String, DocValue)>),
}

/// Body of one top-level field.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// `key: value` on one line.
    Scalar(DocValue),
    /// A map written one entry per line.
    Entries(Vec<(String, DocValue)>),
    /// A list written one element per line.
    Rows(Vec<DocValue>),
    /// A list written on a single indented line.
    Line(Vec<DocValue>),
}

const INDENT: &str = "  ";
const LABEL_WIDTH: usize = 6;
const ENTRY_KEY_WIDTH: usize = 4;

pub struct Encoder {
    encoding: Encoding,
}

impl Encoder {
    pub fn new(encoding: Encoding) -> Self {
        Self { encoding }
    }

    fn loose(&self) -> bool {
        self.encoding == Encoding::Loose
    }

    /// Encode a whole document: `{`, the blocks joined by `,\n`, `}`.
    pub fn document(&self, blocks: &[(&str, Block)]) -> Result<String, EncodeError> {
        let mut parts = Vec::with_capacity(blocks.len());
        for (key, block) in blocks {
            parts.push(self.block(key, block)?);
        }
        Ok(format!("{{\n{}\n}}", parts.join(",\n")))
    }

    fn block(&self, key: &str, block: &Block) -> Result<String, EncodeError> {
        let head = format!("{}{}", self.key(key)?, self.colon());
        let body = match block {
            Block::Scalar(value) => self.inline(value)?,
            Block::Entries(entries) => {
                let mut lines = Vec::with_capacity(entries.len());
                for (k, v) in entries {
                    let k = self.key(k)?;
                    let k = if self.loose() {
                        format!("{k:<width$}", width = ENTRY_KEY_WIDTH)
                    } else {
                        k
                    };
                    lines.push(format!("{INDENT}{k}{}{}", self.colon(), self.inline(v)?));
                }
                wrap('{', '}', lines)
            }
            Block::Rows(rows) => {
                let mut lines = Vec::with_capacity(rows.len());
                for row in rows {
                    lines.push(format!("{INDENT}{}", self.inline(row)?));
                }
                wrap('[', ']', lines)
            }
            Block::Line(items) if items.is_empty() => "[]".to_string(),
            Block::Line(items) => format!("[\n{INDENT}{}\n]", self.elements(items)?),
        };
        Ok(head + &body)
    }

    /// Encode one value on a single line.
    pub fn inline(&self, value: &DocValue) -> Result<String, EncodeError> {
        Ok(match value {
            DocValue::Number(n) => number(*n)?,
            DocValue::Str(s) => self.string(s)?,
            DocValue::Label(s) if self.loose() => {
                format!("{:<width$}", self.string(s)?, width = LABEL_WIDTH)
            }
            DocValue::Label(s) => self.string(s)?,
            DocValue::Blank if self.loose() => String::new(),
            DocValue::Blank => "\"\"".to_string(),
            DocValue::List(items) => format!("[{}]", self.elements(items)?),
            DocValue::Map(entries) => {
                let mut parts = Vec::with_capacity(entries.len());
                for (k, v) in entries {
                    parts.push(format!("{}:{}", self.key(k)?, self.inline(v)?));
                }
                format!("{{{}}}", parts.join(self.separator()))
            }
        })
    }

    /// Array elements without brackets.
    fn elements(&self, items: &[DocValue]) -> Result<String, EncodeError> {
        if !self.loose() {
            let mut parts = Vec::with_capacity(items.len());
            for item in items {
                parts.push(self.inline(item)?);
            }
            return Ok(parts.join(","));
        }

        // Loose: `1,, 2` for an inner blank, `1, ''` for a trailing one.
        let mut out = String::new();
        let last = items.len().saturating_sub(1);
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            let text = match item {
                DocValue::Blank if i == last => "''".to_string(),
                DocValue::Blank => continue,
                other => self.inline(other)?,
            };
            if i > 0 {
                out.push(' ');
            }
            out.push_str(&text);
        }
        Ok(out)
    }

    fn key(&self, key: &str) -> Result<String, EncodeError> {
        if self.loose() && is_identifier(key) {
            Ok(key.to_string())
        } else {
            self.string(key)
        }
    }

    fn string(&self, s: &str) -> Result<String, EncodeError> {
        if self.loose() {
            Ok(single_quoted(s))
        } else {
            Ok(serde_json::to_string(s)?)
        }
    }

    fn colon(&self) -> &'static str {
        if self.loose() {
            ": "
        } else {
            ":"
        }
    }

    fn separator(&self) -> &'static str {
        if self.loose() {
            ", "
        } else {
            ","
        }
    }
}

fn wrap(open: char, close: char, lines: Vec<String>) -> String {
    if lines.is_empty() {
        format!("{open}{close}")
    } else {
        format!("{open}\n{}\n{close}", lines.join(",\n"))
    }
}

fn number(n: f64) -> Result<String, EncodeError> {
    if n.is_finite() {
        Ok(numfmt::shortest(n))
    } else {
        Err(EncodeError::NonFinite { value: n })
    }
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn single_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loose() -> Encoder {
        Encoder::new(Encoding::Loose)
    }

    fn strict() -> Encoder {
        Encoder::new(Encoding::Strict)
    }

    fn summary() -> DocValue {
        DocValue::Map(vec![
            ("id".into(), DocValue::Str("STRAT_BTC_USD_H_5".into())),
            ("dd".into(), DocValue::Number(0.8)),
            ("y1".into(), DocValue::Number(1.42)),
        ])
    }

    #[test]
    fn maps_inline_in_both_modes() {
        assert_eq!(
            loose().inline(&summary()).unwrap(),
            "{id:'STRAT_BTC_USD_H_5', dd:0.8, y1:1.42}"
        );
        assert_eq!(
            strict().inline(&summary()).unwrap(),
            r#"{"id":"STRAT_BTC_USD_H_5","dd":0.8,"y1":1.42}"#
        );
    }

    #[test]
    fn loose_blanks_are_elided_but_keep_length() {
        let items = DocValue::List(vec![
            DocValue::Number(1.0),
            DocValue::Blank,
            DocValue::Number(2.0),
            DocValue::Blank,
        ]);
        assert_eq!(loose().inline(&items).unwrap(), "[1,, 2, '']");
        assert_eq!(strict().inline(&items).unwrap(), r#"[1,"",2,""]"#);
    }

    #[test]
    fn keys_are_quoted_only_when_needed() {
        let map = DocValue::Map(vec![
            ("ym2103".into(), DocValue::Number(1.0)),
            ("210101".into(), DocValue::Number(2.0)),
        ]);
        assert_eq!(loose().inline(&map).unwrap(), "{ym2103:1, '210101':2}");
    }

    #[test]
    fn loose_strings_escape_quotes() {
        assert_eq!(single_quoted("it's"), r"'it\'s'");
        assert_eq!(
            strict().inline(&DocValue::Str("a\"b".into())).unwrap(),
            r#""a\"b""#
        );
    }

    #[test]
    fn labels_pad_in_loose_mode_only() {
        let row = DocValue::List(vec![
            DocValue::Str("210320-233004o".into()),
            DocValue::Label("cat".into()),
            DocValue::Str("BTC".into()),
            DocValue::Number(1.0),
        ]);
        assert_eq!(
            loose().inline(&row).unwrap(),
            "['210320-233004o', 'cat' , 'BTC', 1]"
        );
        assert_eq!(
            strict().inline(&row).unwrap(),
            r#"["210320-233004o","cat","BTC",1]"#
        );
    }

    #[test]
    fn document_layout() {
        let blocks = [
            ("v", Block::Scalar(DocValue::Str("210816-0130z".into()))),
            ("bots", Block::Entries(vec![("cat".into(), summary())])),
            (
                "days",
                Block::Line(vec![DocValue::Number(210101.0), DocValue::Number(210102.0)]),
            ),
            ("trades", Block::Rows(vec![])),
        ];
        assert_eq!(
            loose().document(&blocks).unwrap(),
            "{\n\
             v: '210816-0130z',\n\
             bots: {\n  cat : {id:'STRAT_BTC_USD_H_5', dd:0.8, y1:1.42}\n},\n\
             days: [\n  210101, 210102\n],\n\
             trades: []\n\
             }"
        );
        assert_eq!(
            strict().document(&blocks).unwrap(),
            "{\n\
             \"v\":\"210816-0130z\",\n\
             \"bots\":{\n  \"cat\":{\"id\":\"STRAT_BTC_USD_H_5\",\"dd\":0.8,\"y1\":1.42}\n},\n\
             \"days\":[\n  210101,210102\n],\n\
             \"trades\":[]\n\
             }"
        );
    }

    #[test]
    fn strict_output_parses_as_json() {
        let blocks = [
            ("v", Block::Scalar(DocValue::Str("x".into()))),
            (
                "quotes",
                Block::Entries(vec![(
                    "cat".into(),
                    DocValue::List(vec![DocValue::Number(1.5), DocValue::Blank]),
                )]),
            ),
        ];
        let text = strict().document(&blocks).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["quotes"]["cat"][1], "");
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        assert!(matches!(
            strict().inline(&DocValue::Number(f64::NAN)),
            Err(EncodeError::NonFinite { .. })
        ));
    }
}
