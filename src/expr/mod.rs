//! Submission text validation and arithmetic evaluation.
//!
//! A chat message only counts as a submission when it passes a narrow
//! character filter and evaluates as a plain arithmetic expression. Anything
//! the evaluator cannot make sense of (stray syntax, division by zero) is
//! treated as not-an-attempt rather than a mistake; participants are never
//! penalized for text the game cannot read. That permissiveness is intended
//! behavior, not an oversight.

/// Characters a candidate submission may consist of.
const ALLOWED_CHARACTERS: &str = "0123456789+-*/. ()";

/// Whether the text passes the character filter and contains a digit.
///
/// This is the cheap pre-check used both before full evaluation and by the
/// deleted/edited-message notices, which only care whether the message could
/// have been a submission.
pub fn is_candidate(text: &str) -> bool {
    text.chars().all(|c| ALLOWED_CHARACTERS.contains(c))
        && text.chars().any(|c| c.is_ascii_digit())
}

/// Evaluate submission text to an integer, or `None` when the text is not a
/// readable submission.
///
/// Non-integer results are rounded half to even, so `5/2` reads as 2 and
/// `7/2` as 4.
pub fn evaluate(text: &str) -> Option<i64> {
    if !is_candidate(text) {
        return None;
    }

    let tokens = tokenize(text)?;
    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.expression()?;
    if !parser.at_end() || !value.is_finite() {
        return None;
    }

    let rounded = value.round_ties_even();
    if rounded < i64::MIN as f64 || rounded > i64::MAX as f64 {
        return None;
    }
    Some(rounded as i64)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LeftParen,
    RightParen,
}

fn tokenize(text: &str) -> Option<Vec<Token>> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            ' ' => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LeftParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RightParen);
                i += 1;
            }
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let literal: String = chars[start..i].iter().collect();
                // Rejects malformed literals such as "1.2.3" or a lone "."
                let value = literal.parse::<f64>().ok()?;
                tokens.push(Token::Number(value));
            }
            _ => return None,
        }
    }

    Some(tokens)
}

/// Recursive-descent parser over the token stream.
///
/// Grammar: expression := term (("+" | "-") term)*
///          term       := unary (("*" | "/") unary)*
///          unary      := ("+" | "-")* primary
///          primary    := number | "(" expression ")"
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn at_end(&self) -> bool {
        self.pos == self.tokens.len()
    }

    fn expression(&mut self) -> Option<f64> {
        let mut value = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = match op {
                Token::Plus => value + rhs,
                _ => value - rhs,
            };
        }
        Some(value)
    }

    fn term(&mut self) -> Option<f64> {
        let mut value = self.unary()?;
        while let Some(op @ (Token::Star | Token::Slash)) = self.peek() {
            self.pos += 1;
            let rhs = self.unary()?;
            value = match op {
                Token::Star => value * rhs,
                _ => {
                    if rhs == 0.0 {
                        return None;
                    }
                    value / rhs
                }
            };
        }
        Some(value)
    }

    fn unary(&mut self) -> Option<f64> {
        match self.peek()? {
            Token::Plus => {
                self.pos += 1;
                self.unary()
            }
            Token::Minus => {
                self.pos += 1;
                Some(-self.unary()?)
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Option<f64> {
        match self.advance()? {
            Token::Number(value) => Some(value),
            Token::LeftParen => {
                let value = self.expression()?;
                match self.advance()? {
                    Token::RightParen => Some(value),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}
