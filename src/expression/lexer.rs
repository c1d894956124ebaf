//! Tokenizer for condition expressions.

use super::ExpressionError;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Token {
    /// `#name`
    Variable(String),
    Ident(String),
    Int(i64),
    Float(f64),
    Str(String),
    Dot,
    SafeDot,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    AndAnd,
    OrOr,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Spanned {
    pub token: Token,
    pub position: usize,
}

pub(crate) fn tokenize(source: &str) -> Result<Vec<Spanned>, ExpressionError> {
    let chars: Vec<(usize, char)> = source.char_indices().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    let syntax = |position: usize, message: String| ExpressionError::Syntax {
        expression: source.to_string(),
        position,
        message,
    };

    while i < chars.len() {
        let (position, c) = chars[i];
        let next = chars.get(i + 1).map(|&(_, c)| c);

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        let (token, width) = match (c, next) {
            ('&', Some('&')) => (Token::AndAnd, 2),
            ('|', Some('|')) => (Token::OrOr, 2),
            ('=', Some('=')) => (Token::EqEq, 2),
            ('!', Some('=')) => (Token::NotEq, 2),
            ('<', Some('=')) => (Token::Le, 2),
            ('>', Some('=')) => (Token::Ge, 2),
            ('?', Some('.')) => (Token::SafeDot, 2),
            ('<', _) => (Token::Lt, 1),
            ('>', _) => (Token::Gt, 1),
            ('!', _) => (Token::Bang, 1),
            ('.', _) => (Token::Dot, 1),
            ('[', _) => (Token::LBracket, 1),
            (']', _) => (Token::RBracket, 1),
            ('(', _) => (Token::LParen, 1),
            (')', _) => (Token::RParen, 1),
            ('+', _) => (Token::Plus, 1),
            ('-', _) => (Token::Minus, 1),
            ('*', _) => (Token::Star, 1),
            ('/', _) => (Token::Slash, 1),
            ('%', _) => (Token::Percent, 1),
            ('#', _) => {
                let end = scan_while(&chars, i + 1, is_ident_char);
                if end == i + 1 || !is_ident_start(chars[i + 1].1) {
                    return Err(syntax(position, "expected variable name after '#'".into()));
                }
                let name = collect(&chars, i + 1, end);
                (Token::Variable(name), end - i)
            }
            ('\'' | '"', _) => {
                let (text, end) = scan_string(&chars, i, c)
                    .ok_or_else(|| syntax(position, "unterminated string literal".into()))?;
                (Token::Str(text), end - i)
            }
            (c, _) if c.is_ascii_digit() => {
                let int_end = scan_while(&chars, i, |c| c.is_ascii_digit());
                let has_fraction = chars.get(int_end).map(|&(_, c)| c) == Some('.')
                    && chars
                        .get(int_end + 1)
                        .is_some_and(|&(_, c)| c.is_ascii_digit());
                if has_fraction {
                    let end = scan_while(&chars, int_end + 1, |c| c.is_ascii_digit());
                    let text = collect(&chars, i, end);
                    let value = text
                        .parse::<f64>()
                        .ok()
                        .filter(|v| v.is_finite())
                        .ok_or_else(|| syntax(position, format!("invalid number '{text}'")))?;
                    (Token::Float(value), end - i)
                } else {
                    let text = collect(&chars, i, int_end);
                    let value = text
                        .parse::<i64>()
                        .map_err(|_| syntax(position, format!("integer '{text}' out of range")))?;
                    (Token::Int(value), int_end - i)
                }
            }
            (c, _) if is_ident_start(c) => {
                let end = scan_while(&chars, i, is_ident_char);
                (Token::Ident(collect(&chars, i, end)), end - i)
            }
            (c, _) => return Err(syntax(position, format!("unexpected character '{c}'"))),
        };

        tokens.push(Spanned { token, position });
        i += width;
    }

    Ok(tokens)
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn scan_while(chars: &[(usize, char)], start: usize, pred: impl Fn(char) -> bool) -> usize {
    let mut end = start;
    while end < chars.len() && pred(chars[end].1) {
        end += 1;
    }
    end
}

fn collect(chars: &[(usize, char)], start: usize, end: usize) -> String {
    chars[start..end].iter().map(|&(_, c)| c).collect()
}

/// Scans a quoted literal starting at `start`. A doubled quote character
/// inside the literal stands for one quote. Returns the text and the index
/// just past the closing quote.
fn scan_string(chars: &[(usize, char)], start: usize, quote: char) -> Option<(String, usize)> {
    let mut text = String::new();
    let mut i = start + 1;
    while i < chars.len() {
        let c = chars[i].1;
        if c == quote {
            if chars.get(i + 1).map(|&(_, c)| c) == Some(quote) {
                text.push(quote);
                i += 2;
                continue;
            }
            return Some((text, i + 1));
        }
        text.push(c);
        i += 1;
    }
    None
}
