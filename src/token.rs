//! Classified lexical units of a DSL line.
//!
//! A [`Token`] is produced from surface text alone: the same text always
//! yields the same variant. Classification tries, in order, register,
//! address, comparator, operator, immediate, label, and falls back to
//! [`Token::Empty`].

use crate::lexer::Lexeme;
use logos::Logos;
use std::fmt;

/// Longest text accepted as a bare label token.
pub const MAX_LABEL_LEN: usize = 16;

/// General purpose register `r0`‥`r31`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Reg(u8);

impl Reg {
    pub const COUNT: usize = 32;

    pub const fn new(index: u8) -> Option<Reg> {
        if (index as usize) < Self::COUNT {
            Some(Reg(index))
        } else {
            None
        }
    }

    /// For register constants known to be in range.
    pub(crate) const fn fixed(index: u8) -> Reg {
        assert!((index as usize) < Self::COUNT, "register index out of range");
        Reg(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// `ldi` and friends only reach the upper half of the register file.
    pub fn accepts_immediate(self) -> bool {
        self.0 >= 16
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// Numeric literal kept in its source spelling (`0x20`, `$20`, `20h`,
/// `0b100000`, `040`, `32`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal(String);

impl Literal {
    pub fn new(text: impl Into<String>) -> Self {
        Literal(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value of the literal, if it fits in 32 bits.
    pub fn value(&self) -> Option<u32> {
        let s = self.0.to_ascii_lowercase();
        if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix('$')) {
            u32::from_str_radix(hex, 16).ok()
        } else if let Some(bin) = s.strip_prefix("0b").filter(|b| !b.ends_with('h')) {
            u32::from_str_radix(bin, 2).ok()
        } else if let Some(hex) = s.strip_suffix('h') {
            u32::from_str_radix(hex, 16).ok()
        } else if s.len() > 1 && s.starts_with('0') {
            u32::from_str_radix(&s[1..], 8).ok()
        } else {
            s.parse().ok()
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    Eq,
    Ne,
    Ge,
    Le,
    Gt,
    Lt,
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Comparator::Eq => "==",
            Comparator::Ne => "!=",
            Comparator::Ge => ">=",
            Comparator::Le => "<=",
            Comparator::Gt => ">",
            Comparator::Lt => "<",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    And,
    Or,
    Xor,
    Div,
    Not,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::And => "&",
            Operator::Or => "|",
            Operator::Xor => "^",
            Operator::Div => "/",
            Operator::Not => "!",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    Register(Reg),
    Immediate(Literal),
    /// Inner literal of `mem[...]`, wrapper stripped.
    Address(Literal),
    Comparator(Comparator),
    Operator(Operator),
    Label(String),
    Empty,
}

/// Discriminant of [`Token`], used for template selection and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Register,
    Immediate,
    Address,
    Comparator,
    Operator,
    Label,
    Empty,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TokenKind::Register => "register",
            TokenKind::Immediate => "immediate",
            TokenKind::Address => "address",
            TokenKind::Comparator => "comparator",
            TokenKind::Operator => "operator",
            TokenKind::Label => "label",
            TokenKind::Empty => "empty",
        })
    }
}

impl Token {
    /// Infer the type of a single token from its text.
    pub fn classify(text: &str) -> Token {
        // ASCII lowercasing keeps byte offsets, so spans index `text` too.
        let lowered = text.to_ascii_lowercase();
        let mut lex = Lexeme::lexer(&lowered);

        // Exactly one lexeme spanning the whole text, no skipped blanks.
        if let Some(Ok(lexeme)) = lex.next() {
            if lex.span() == (0..text.len()) && lex.next().is_none() {
                match lexeme.into_token() {
                    Some(Token::Immediate(_)) => return Token::Immediate(Literal::new(text)),
                    Some(Token::Address(_)) => {
                        return Token::Address(Literal::new(&text[4..text.len() - 1]));
                    }
                    Some(token) => return token,
                    None => {}
                }
            }
        }

        if is_label(text) {
            Token::Label(text.to_string())
        } else {
            Token::Empty
        }
    }

    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Register(_) => TokenKind::Register,
            Token::Immediate(_) => TokenKind::Immediate,
            Token::Address(_) => TokenKind::Address,
            Token::Comparator(_) => TokenKind::Comparator,
            Token::Operator(_) => TokenKind::Operator,
            Token::Label(_) => TokenKind::Label,
            Token::Empty => TokenKind::Empty,
        }
    }

    pub fn as_register(&self) -> Option<Reg> {
        match self {
            Token::Register(r) => Some(*r),
            _ => None,
        }
    }
}

/// The token's value: register name, literal spelling, symbol or label.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Register(r) => r.fmt(f),
            Token::Immediate(lit) | Token::Address(lit) => lit.fmt(f),
            Token::Comparator(c) => c.fmt(f),
            Token::Operator(o) => o.fmt(f),
            Token::Label(name) => f.write_str(name),
            Token::Empty => Ok(()),
        }
    }
}

pub(crate) fn is_label_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '$' | '.')
}

fn is_label(text: &str) -> bool {
    (1..=MAX_LABEL_LEN).contains(&text.len()) && text.chars().all(is_label_char)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn imm(s: &str) -> Token {
        Token::Immediate(Literal::new(s))
    }

    #[test]
    fn registers_cover_r0_to_r31() {
        assert_eq!(Token::classify("r0"), Token::Register(Reg::fixed(0)));
        assert_eq!(Token::classify("r5"), Token::Register(Reg::fixed(5)));
        assert_eq!(Token::classify("R17"), Token::Register(Reg::fixed(17)));
        assert_eq!(Token::classify("r31"), Token::Register(Reg::fixed(31)));
        // Out of range falls through to label.
        assert_eq!(Token::classify("r32"), Token::Label("r32".into()));
    }

    #[test]
    fn address_keeps_inner_literal() {
        assert_eq!(
            Token::classify("mem[0x20]"),
            Token::Address(Literal::new("0x20"))
        );
        // Value keeps its spelling; only the wrapper goes.
        assert_eq!(Token::classify("MEM[$3F]"), Token::Address(Literal::new("$3F")));
        assert_eq!(Token::classify("mem[0X1a]"), Token::Address(Literal::new("0X1a")));
        assert_eq!(Token::classify("mem[]"), Token::Empty);
    }

    #[test]
    fn comparators_and_operators() {
        for (text, cmp) in [
            ("==", Comparator::Eq),
            ("!=", Comparator::Ne),
            (">=", Comparator::Ge),
            ("<=", Comparator::Le),
            ("=<", Comparator::Le),
            (">", Comparator::Gt),
            ("<", Comparator::Lt),
        ] {
            assert_eq!(Token::classify(text), Token::Comparator(cmp), "{text}");
        }
        assert_eq!(Token::classify("+"), Token::Operator(Operator::Add));
        // `-` is also a label character; operator wins.
        assert_eq!(Token::classify("-"), Token::Operator(Operator::Sub));
        assert_eq!(Token::classify("^"), Token::Operator(Operator::Xor));
        assert_eq!(Token::classify("!"), Token::Operator(Operator::Not));
    }

    #[test]
    fn immediate_spellings_share_a_value() {
        for text in ["0x20", "$20", "20h", "0b00100000", "040", "32"] {
            let token = Token::classify(text);
            assert_eq!(token, imm(text), "{text}");
            match token {
                Token::Immediate(lit) => assert_eq!(lit.value(), Some(32), "{text}"),
                _ => unreachable!(),
            }
        }
    }

    #[test]
    fn surrounding_blanks_are_not_skipped() {
        assert_eq!(Token::classify(" r5"), Token::Empty);
        assert_eq!(Token::classify("0x20 "), Token::Empty);
        assert_eq!(Token::classify("\tmem[1]"), Token::Empty);
        assert_eq!(Token::classify("+ "), Token::Empty);
        assert_eq!(Token::classify("0X2F"), imm("0X2F"));
    }

    #[test]
    fn labels_and_empty() {
        assert_eq!(Token::classify("LOOP1"), Token::Label("LOOP1".into()));
        assert_eq!(Token::classify("main_loop.2"), Token::Label("main_loop.2".into()));
        assert_eq!(Token::classify("if"), Token::Label("if".into()));
        assert_eq!(Token::classify("a_label_that_is_too_long"), Token::Empty);
        assert_eq!(Token::classify(""), Token::Empty);
        assert_eq!(Token::classify("->"), Token::Empty);
    }

    #[test]
    fn display_is_token_value() {
        assert_eq!(Token::classify("mem[040]").to_string(), "040");
        assert_eq!(Token::classify("r9").to_string(), "r9");
        assert_eq!(Token::classify("=<").to_string(), "<=");
    }
}
