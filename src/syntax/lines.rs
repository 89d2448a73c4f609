//! Logical-line splitting.
//!
//! Python statements are line oriented, but a single statement may span
//! several physical lines inside brackets or after a trailing backslash. This
//! pass folds each statement onto one logical line and measures its
//! indentation, leaving the statement grammar free of layout concerns.
//!
//! Comments and joined line breaks are overwritten with spaces byte for byte,
//! so an offset into a logical line plus the line's `offset` is always an
//! offset into the original source.

use super::error::SyntaxError;
use crate::ast::Span;

const TAB_WIDTH: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    /// Indentation column, tabs expanded to the next multiple of eight.
    pub indent: usize,
    /// Statement text, starting at the first non-blank character.
    pub text: String,
    /// Byte offset of `text` in the source.
    pub offset: usize,
}

impl LogicalLine {
    pub fn span(&self) -> Span {
        Span {
            start: self.offset,
            end: self.offset + self.text.len(),
        }
    }
}

struct OpenString {
    quote: u8,
    triple: bool,
    start: usize,
}

pub fn split_lines(source: &str) -> Result<Vec<LogicalLine>, SyntaxError> {
    let mut buf = source.as_bytes().to_vec();
    let mut bounds = Vec::new();
    let mut line_start = 0;
    let mut depth = 0usize;
    let mut string: Option<OpenString> = None;
    let mut i = 0;

    while i < buf.len() {
        let c = buf[i];
        if let Some(open) = &string {
            if c == b'\\' {
                i += 2;
                continue;
            }
            if c == b'\n' && !open.triple {
                return Err(SyntaxError::UnterminatedString {
                    span: Span::new(open.start, i).into(),
                });
            }
            if c == open.quote {
                if !open.triple {
                    string = None;
                } else if buf.get(i + 1) == Some(&c) && buf.get(i + 2) == Some(&c) {
                    string = None;
                    i += 2;
                }
            }
            i += 1;
            continue;
        }

        match c {
            b'#' => {
                while i < buf.len() && buf[i] != b'\n' {
                    buf[i] = b' ';
                    i += 1;
                }
                continue;
            }
            b'\'' | b'"' => {
                let triple = buf.get(i + 1) == Some(&c) && buf.get(i + 2) == Some(&c);
                string = Some(OpenString {
                    quote: c,
                    triple,
                    start: i,
                });
                if triple {
                    i += 2;
                }
            }
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            b'\\' => {
                let newline = match (buf.get(i + 1), buf.get(i + 2)) {
                    (Some(b'\n'), _) => Some(1),
                    (Some(b'\r'), Some(b'\n')) => Some(2),
                    _ => None,
                };
                if let Some(len) = newline {
                    buf[i..=i + len].fill(b' ');
                    i += len + 1;
                    continue;
                }
            }
            b'\n' if depth > 0 => buf[i] = b' ',
            b'\n' => {
                bounds.push((line_start, i));
                line_start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    if let Some(open) = string {
        return Err(SyntaxError::UnterminatedString {
            span: Span::new(open.start, source.len()).into(),
        });
    }
    bounds.push((line_start, buf.len()));

    let text = String::from_utf8(buf)
        .map_err(|_| SyntaxError::invalid("source is not valid UTF-8", Span::default()))?;
    Ok(bounds
        .into_iter()
        .filter_map(|(start, end)| logical_line(&text, start, end))
        .collect())
}

/// Measures one physical line; blank and comment-only lines yield nothing.
fn logical_line(text: &str, start: usize, end: usize) -> Option<LogicalLine> {
    let raw = &text[start..end];
    let mut indent = 0;
    let mut lead = 0;
    for b in raw.bytes() {
        match b {
            b' ' => indent += 1,
            b'\t' => indent = (indent / TAB_WIDTH + 1) * TAB_WIDTH,
            b'\x0c' => {}
            _ => break,
        }
        lead += 1;
    }
    let body = raw[lead..].trim_end();
    if body.is_empty() {
        return None;
    }
    Some(LogicalLine {
        indent,
        text: body.to_string(),
        offset: start + lead,
    })
}
