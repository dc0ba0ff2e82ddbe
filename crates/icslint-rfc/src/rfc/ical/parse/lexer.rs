//! Content line lexer for iCalendar (RFC 5545 §3.1).
//!
//! Handles line unfolding and tokenization of content lines.

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::rfc::ical::core::{ContentLine, Parameter};

/// Splits input into content lines, merging folded continuations.
///
/// Handles both CRLF and bare LF line endings. Lines starting with SP/HTAB
/// are continuations of the previous line; per RFC 5545 §3.1, unfolding
/// removes the line break and the single whitespace character (no space is
/// inserted). Lines containing no colon at all are also treated as
/// continuations, which tolerates folds whose leading whitespace was lost.
///
/// Returns `(line_number, logical_line)` pairs; line numbers are 1-based
/// and refer to the first physical line of each logical line.
#[must_use]
pub fn split_lines(input: &str) -> Vec<(usize, String)> {
    let mut lines: Vec<(usize, String)> = Vec::new();

    for (i, raw_line) in input.lines().enumerate() {
        let line = raw_line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }

        if line.starts_with([' ', '\t']) {
            let continuation = &line[1..];
            if let Some((_, prev)) = lines.last_mut() {
                prev.push_str(continuation);
            } else {
                lines.push((i + 1, continuation.to_string()));
            }
        } else if !line.contains(':') {
            // Lenient: a line without a colon cannot start a property.
            if let Some((_, prev)) = lines.last_mut() {
                prev.push_str(line);
            } else {
                lines.push((i + 1, line.to_string()));
            }
        } else {
            lines.push((i + 1, line.to_string()));
        }
    }

    lines
}

/// What a parameter's terminating character announced.
enum ParamEnd {
    /// `;` - another parameter follows.
    More,
    /// `:` - the property value starts at the contained byte offset.
    Value(usize),
}

/// Parses a single content line.
///
/// Format: `name *(";" param) ":" value`
///
/// ## Errors
/// Returns an error if the line is malformed or contains invalid characters.
pub fn parse_content_line(line: &str, line_num: usize) -> ParseResult<ContentLine> {
    let mut chars = line.char_indices().peekable();

    // Property name runs until ';' (parameters follow) or ':' (value follows).
    let mut name_end = 0;
    let mut has_params = false;
    let mut value_start = None;
    while let Some(&(i, c)) = chars.peek() {
        match c {
            ':' => {
                name_end = i;
                value_start = Some(i + 1);
                chars.next();
                break;
            }
            ';' => {
                name_end = i;
                has_params = true;
                chars.next();
                break;
            }
            _ if c.is_ascii_alphanumeric() || c == '-' => {
                chars.next();
            }
            _ => {
                return Err(ParseError::new(
                    ParseErrorKind::InvalidPropertyName,
                    line_num,
                    i + 1,
                ));
            }
        }
    }

    if name_end == 0 {
        return Err(ParseError::new(
            ParseErrorKind::MissingPropertyName,
            line_num,
            1,
        ));
    }

    let name = line[..name_end].to_ascii_uppercase();

    let mut params = Vec::new();
    if has_params {
        loop {
            let (param, end) = parse_parameter(&mut chars, line, line_num)?;
            params.push(param);
            match end {
                ParamEnd::More => {}
                ParamEnd::Value(start) => {
                    value_start = Some(start);
                    break;
                }
            }
        }
    }

    let value_start = value_start
        .ok_or_else(|| ParseError::new(ParseErrorKind::MissingColon, line_num, line.len()))?;

    Ok(ContentLine {
        name,
        params,
        raw_value: line[value_start..].to_string(),
    })
}

/// Parses one `name=value[,value...]` parameter and its terminator.
fn parse_parameter(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    line: &str,
    line_num: usize,
) -> ParseResult<(Parameter, ParamEnd)> {
    let start = chars.peek().map_or(line.len(), |&(i, _)| i);

    // Parameter name runs up to '='.
    let mut name_end = start;
    while let Some(&(i, c)) = chars.peek() {
        if c == '=' {
            name_end = i;
            chars.next();
            break;
        }
        if !c.is_ascii_alphanumeric() && c != '-' {
            return Err(ParseError::new(
                ParseErrorKind::InvalidParameter,
                line_num,
                i + 1,
            ));
        }
        chars.next();
    }

    if name_end == start {
        return Err(ParseError::new(
            ParseErrorKind::InvalidParameter,
            line_num,
            start + 1,
        ));
    }

    let name = line[start..name_end].to_ascii_uppercase();

    // Comma-separated values, possibly quoted.
    let mut values = Vec::new();
    loop {
        values.push(parse_param_value(chars, line, line_num)?);

        match chars.next() {
            Some((_, ',')) => {}
            Some((_, ';')) => return Ok((Parameter::with_values(name, values), ParamEnd::More)),
            Some((i, ':')) => {
                return Ok((Parameter::with_values(name, values), ParamEnd::Value(i + 1)));
            }
            Some((i, c)) => {
                return Err(
                    ParseError::new(ParseErrorKind::InvalidParameter, line_num, i + 1)
                        .with_context(format!("unexpected character '{c}'")),
                );
            }
            None => {
                return Err(ParseError::new(
                    ParseErrorKind::MissingColon,
                    line_num,
                    line.len(),
                ));
            }
        }
    }
}

/// Parses a parameter value (possibly quoted, with RFC 6868 caret decoding).
fn parse_param_value(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    line: &str,
    line_num: usize,
) -> ParseResult<String> {
    let Some(&(start, first)) = chars.peek() else {
        return Err(ParseError::new(
            ParseErrorKind::InvalidParameter,
            line_num,
            line.len(),
        ));
    };

    if first == '"' {
        chars.next();
        let mut value = String::new();
        let mut closed = false;

        while let Some((_, c)) = chars.next() {
            if c == '"' {
                closed = true;
                break;
            }
            if c == '^' {
                // RFC 6868 caret encoding
                match chars.peek().map(|&(_, next)| next) {
                    Some('^') => {
                        value.push('^');
                        chars.next();
                    }
                    Some('n') => {
                        value.push('\n');
                        chars.next();
                    }
                    Some('\'') => {
                        value.push('"');
                        chars.next();
                    }
                    _ => {
                        // Invalid caret escape, preserve as-is
                        value.push('^');
                    }
                }
            } else {
                value.push(c);
            }
        }

        if !closed {
            return Err(ParseError::new(
                ParseErrorKind::UnclosedQuote,
                line_num,
                start + 1,
            ));
        }

        Ok(value)
    } else {
        // Unquoted value ends at ',' ';' or ':' (left unconsumed).
        let mut end = start;
        while let Some(&(i, c)) = chars.peek() {
            if matches!(c, ',' | ';' | ':') {
                break;
            }
            end = i + c.len_utf8();
            chars.next();
        }
        Ok(line[start..end].to_string())
    }
}
