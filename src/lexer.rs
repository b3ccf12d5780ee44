use crate::token::{Comparator, Literal, Operator, Reg, Token};
use logos::Logos;

/// Lexemes of a lowercased DSL line (everything after the `$` sigil).
///
/// Labels are deliberately absent: label characters include `-` and `$`,
/// which would swallow `->` and literal prefixes under longest-match.
/// The `goto` target is scanned by hand from the lexer remainder.
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(skip r"[ \t]+")]
pub enum Lexeme {
    // ── Keywords ──────────────────────────────
    #[token("if")]   If,
    #[token("goto")] Goto,
    #[token("->")]   Arrow,

    // ── Comparators ───────────────────────────
    #[token("==", |_| Comparator::Eq)]
    #[token("!=", |_| Comparator::Ne)]
    #[token(">=", |_| Comparator::Ge)]
    #[token("<=", |_| Comparator::Le)]
    #[token("=<", |_| Comparator::Le)]
    #[token(">",  |_| Comparator::Gt)]
    #[token("<",  |_| Comparator::Lt)]
    Comparator(Comparator),

    // ── Operators ─────────────────────────────
    #[token("+", |_| Operator::Add)]
    #[token("-", |_| Operator::Sub)]
    #[token("*", |_| Operator::Mul)]
    #[token("&", |_| Operator::And)]
    #[token("|", |_| Operator::Or)]
    #[token("^", |_| Operator::Xor)]
    #[token("/", |_| Operator::Div)]
    #[token("!", |_| Operator::Not)]
    Operator(Operator),

    // ── Registers r0‥r31 ─────────────────────
    #[regex(r"r([0-9]|[12][0-9]|3[01])", |lex| lex.slice()[1..].parse::<u8>().ok().and_then(Reg::new))]
    Register(Reg),

    // ── Numbers: 0x.. | $.. | ..h | 0b.. | 0.. | decimal ──
    #[regex(r"0x[0-9a-f]+|\$[0-9a-f]+|[0-9a-f]+h|0b[01]+|[0-9]+", |lex| Literal::new(lex.slice()))]
    Immediate(Literal),

    // ── mem[<number>] ─────────────────────────
    #[regex(r"mem\[(0x[0-9a-f]+|\$[0-9a-f]+|[0-9a-f]+h|0b[01]+|[0-9]+)\]", |lex| {
        let s = lex.slice();
        Literal::new(&s[4..s.len() - 1])
    })]
    Address(Literal),

    // Trailing `; comment`
    #[regex(r";[^\n]*")]
    Comment,
}

impl Lexeme {
    /// Operand-bearing lexemes as tokens; keywords and comments have none.
    pub fn into_token(self) -> Option<Token> {
        match self {
            Lexeme::Register(r)   => Some(Token::Register(r)),
            Lexeme::Immediate(l)  => Some(Token::Immediate(l)),
            Lexeme::Address(l)    => Some(Token::Address(l)),
            Lexeme::Comparator(c) => Some(Token::Comparator(c)),
            Lexeme::Operator(o)   => Some(Token::Operator(o)),
            Lexeme::If | Lexeme::Goto | Lexeme::Arrow | Lexeme::Comment => None,
        }
    }

    /// Register, immediate or `mem[...]`.
    pub fn is_operand(&self) -> bool {
        matches!(self, Lexeme::Register(_) | Lexeme::Immediate(_) | Lexeme::Address(_))
    }

    /// Register or `mem[...]`.
    pub fn is_destination(&self) -> bool {
        matches!(self, Lexeme::Register(_) | Lexeme::Address(_))
    }
}
