use beam_core::errors::{BeamError, ErrorInfo};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Ident(String),
    Number(f64),
    Str(String),
    Colon,
    Assign,
    DeferredAssign,
    Semicolon,
    Comma,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Arrow,
}

/// A token with the 1-based line it starts on.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Spanned {
    pub token: Token,
    pub line: usize,
}

fn lex_error(line: usize, message: impl Into<String>) -> BeamError {
    BeamError::Parse(ErrorInfo::new("madx-lex", message).with_context("line", line.to_string()))
}

/// Splits MAD-X source into tokens, dropping `!`, `//` and `/* */` comments.
pub(crate) fn tokenize(source: &str) -> Result<Vec<Spanned>, BeamError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match c {
            '\n' => {
                line += 1;
                i += 1;
            }
            c if c.is_whitespace() => i += 1,
            '!' => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if next == Some('/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if next == Some('*') => {
                let start = line;
                i += 2;
                loop {
                    match chars.get(i) {
                        None => return Err(lex_error(start, "unterminated block comment")),
                        Some('*') if chars.get(i + 1) == Some(&'/') => {
                            i += 2;
                            break;
                        }
                        Some('\n') => {
                            line += 1;
                            i += 1;
                        }
                        Some(_) => i += 1,
                    }
                }
            }
            '"' | '\'' => {
                let quote = c;
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && chars[end] != quote {
                    if chars[end] == '\n' {
                        return Err(lex_error(line, "unterminated string"));
                    }
                    end += 1;
                }
                if end == chars.len() {
                    return Err(lex_error(line, "unterminated string"));
                }
                tokens.push(Spanned {
                    token: Token::Str(chars[start..end].iter().collect()),
                    line,
                });
                i = end + 1;
            }
            c if c.is_ascii_digit() || (c == '.' && next.map_or(false, |n| n.is_ascii_digit())) => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                if i < chars.len() && matches!(chars[i], 'e' | 'E' | 'd' | 'D') {
                    let mut j = i + 1;
                    if j < chars.len() && matches!(chars[j], '+' | '-') {
                        j += 1;
                    }
                    if j < chars.len() && chars[j].is_ascii_digit() {
                        i = j;
                        while i < chars.len() && chars[i].is_ascii_digit() {
                            i += 1;
                        }
                    }
                }
                let text: String = chars[start..i]
                    .iter()
                    .map(|c| if matches!(c, 'd' | 'D') { 'e' } else { *c })
                    .collect();
                let value = text
                    .parse::<f64>()
                    .map_err(|_| lex_error(line, format!("invalid number '{text}'")))?;
                tokens.push(Spanned {
                    token: Token::Number(value),
                    line,
                });
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len()
                    && (chars[i].is_alphanumeric() || matches!(chars[i], '_' | '.' | '$'))
                {
                    i += 1;
                }
                let ident: String = chars[start..i].iter().collect();
                tokens.push(Spanned {
                    token: Token::Ident(ident.to_ascii_lowercase()),
                    line,
                });
            }
            _ => {
                let (token, width) = match (c, next) {
                    (':', Some('=')) => (Token::DeferredAssign, 2),
                    ('-', Some('>')) => (Token::Arrow, 2),
                    (':', _) => (Token::Colon, 1),
                    ('=', _) => (Token::Assign, 1),
                    (';', _) => (Token::Semicolon, 1),
                    (',', _) => (Token::Comma, 1),
                    ('(', _) => (Token::LParen, 1),
                    (')', _) => (Token::RParen, 1),
                    ('{', _) => (Token::LBrace, 1),
                    ('}', _) => (Token::RBrace, 1),
                    ('+', _) => (Token::Plus, 1),
                    ('-', _) => (Token::Minus, 1),
                    ('*', _) => (Token::Star, 1),
                    ('/', _) => (Token::Slash, 1),
                    ('^', _) => (Token::Caret, 1),
                    _ => return Err(lex_error(line, format!("unexpected character '{c}'"))),
                };
                tokens.push(Spanned { token, line });
                i += width;
            }
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_all_comment_styles() {
        let tokens = tokenize("a = 1; ! c\n// c\n/* multi\nline */ b := 2.5e-3;").unwrap();
        let kinds: Vec<_> = tokens.into_iter().map(|t| t.token).collect();
        assert_eq!(
            kinds,
            vec![
                Token::Ident("a".into()),
                Token::Assign,
                Token::Number(1.0),
                Token::Semicolon,
                Token::Ident("b".into()),
                Token::DeferredAssign,
                Token::Number(2.5e-3),
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn tracks_lines_and_arrows() {
        let tokens = tokenize("x = 1;\n\ny = SB1->ANGLE;").unwrap();
        let y = &tokens[4];
        assert_eq!(y.line, 3);
        assert_eq!(tokens[6].token, Token::Ident("sb1".into()));
        assert_eq!(tokens[7].token, Token::Arrow);
    }
}
