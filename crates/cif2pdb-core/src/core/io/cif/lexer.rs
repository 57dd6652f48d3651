use super::document::CifValue;
use super::{CifError, CifSyntaxErrorKind};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    DataBlock(String),
    Loop,
    Save(String),
    Global,
    Stop,
    Tag(String),
    Value(CifValue),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

fn is_whitespace(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

fn syntax_error(line: usize, kind: CifSyntaxErrorKind) -> CifError {
    CifError::Syntax { line, kind }
}

/// Splits CIF text into tokens, each tagged with its 1-based line number.
pub(crate) fn tokenize(input: &str) -> Result<Vec<Token>, CifError> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut tokens = Vec::new();
    let mut lines = input.lines().enumerate();

    while let Some((idx, line)) = lines.next() {
        let line_num = idx + 1;

        if let Some(first) = line.strip_prefix(';') {
            let mut text = first.to_string();
            loop {
                match lines.next() {
                    Some((_, next)) if next.starts_with(';') => break,
                    Some((_, next)) => {
                        text.push('\n');
                        text.push_str(next);
                    }
                    None => {
                        return Err(syntax_error(
                            line_num,
                            CifSyntaxErrorKind::UnterminatedTextField,
                        ));
                    }
                }
            }
            tokens.push(Token {
                kind: TokenKind::Value(CifValue::Text(text)),
                line: line_num,
            });
            continue;
        }

        tokenize_line(line, line_num, &mut tokens)?;
    }

    Ok(tokens)
}

fn tokenize_line(line: &str, line_num: usize, tokens: &mut Vec<Token>) -> Result<(), CifError> {
    let bytes = line.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        if is_whitespace(bytes[pos]) {
            pos += 1;
            continue;
        }

        match bytes[pos] {
            b'#' => break,
            quote @ (b'\'' | b'"') => {
                let start = pos + 1;
                let end = (start..bytes.len())
                    .find(|&j| {
                        bytes[j] == quote && (j + 1 == bytes.len() || is_whitespace(bytes[j + 1]))
                    })
                    .ok_or_else(|| {
                        syntax_error(line_num, CifSyntaxErrorKind::UnterminatedQuote)
                    })?;
                tokens.push(Token {
                    kind: TokenKind::Value(CifValue::Text(line[start..end].to_string())),
                    line: line_num,
                });
                pos = end + 1;
            }
            _ => {
                let start = pos;
                while pos < bytes.len() && !is_whitespace(bytes[pos]) {
                    pos += 1;
                }
                tokens.push(Token {
                    kind: classify_word(&line[start..pos]),
                    line: line_num,
                });
            }
        }
    }

    Ok(())
}

fn strip_prefix_ignore_case<'a>(word: &'a str, prefix: &str) -> Option<&'a str> {
    let head = word.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &word[prefix.len()..])
}

fn classify_word(word: &str) -> TokenKind {
    if word.starts_with('_') {
        return TokenKind::Tag(word.to_ascii_lowercase());
    }
    if let Some(name) = strip_prefix_ignore_case(word, "data_") {
        return TokenKind::DataBlock(name.to_string());
    }
    if let Some(name) = strip_prefix_ignore_case(word, "save_") {
        return TokenKind::Save(name.to_string());
    }
    if word.eq_ignore_ascii_case("loop_") {
        return TokenKind::Loop;
    }
    if word.eq_ignore_ascii_case("global_") {
        return TokenKind::Global;
    }
    if word.eq_ignore_ascii_case("stop_") {
        return TokenKind::Stop;
    }
    match word {
        "?" => TokenKind::Value(CifValue::Unknown),
        "." => TokenKind::Value(CifValue::Inapplicable),
        _ => TokenKind::Value(CifValue::Text(word.to_string())),
    }
}
