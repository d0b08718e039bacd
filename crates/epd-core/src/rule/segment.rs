//! Flat split of a rule expression on `&&` / `||`.
//!
//! The split does not look at parentheses or quotes: an operator inside a
//! string literal still separates segments.

/// Boolean connective between two segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

impl BoolOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BoolOp::And => "&&",
            BoolOp::Or => "||",
        }
    }
}

/// One element of a split expression. Segments and operators alternate,
/// starting and ending with a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Segment(&'a str),
    Op(BoolOp),
}

/// Split `expression` into segments interleaved with the operators found
/// between them. Segment text is kept verbatim, surrounding whitespace
/// included.
pub fn split_expression(expression: &str) -> Vec<Token<'_>> {
    let bytes = expression.as_bytes();
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i + 1 < bytes.len() {
        let op = match (bytes[i], bytes[i + 1]) {
            (b'&', b'&') => Some(BoolOp::And),
            (b'|', b'|') => Some(BoolOp::Or),
            _ => None,
        };
        match op {
            Some(op) => {
                tokens.push(Token::Segment(&expression[start..i]));
                tokens.push(Token::Op(op));
                i += 2;
                start = i;
            }
            None => i += 1,
        }
    }
    tokens.push(Token::Segment(&expression[start..]));
    tokens
}
