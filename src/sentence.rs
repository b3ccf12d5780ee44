//! Line classification.
//!
//! A line is one of three DSL forms, tried in order:
//!
//! ```text
//! $ <op1> -> <dest>                           unary
//! $ <op1> <operator> <op2> -> <dest>          binary
//! $ if <op1> <comparator> <op2> goto <label>  conditional
//! ```
//!
//! where operands are registers, immediates or `mem[...]` and destinations
//! are registers or `mem[...]`. Anything else passes through as a comment,
//! a native line or a blank line.

use crate::lexer::Lexeme;
use crate::token::{is_label_char, Token};
use logos::Logos;
use std::collections::BTreeMap;
use std::fmt;

/// Longest `goto` target accepted by the conditional form.
pub const MAX_TARGET_LEN: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Unary,
    Binary,
    Conditional,
    Comment,
    Native,
    Blank,
}

impl Kind {
    /// Pass-through kinds are copied to the output untouched.
    pub fn is_native(self) -> bool {
        matches!(self, Kind::Comment | Kind::Native | Kind::Blank)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Kind::Unary => "unary",
            Kind::Binary => "binary",
            Kind::Conditional => "conditional",
            Kind::Comment => "comment",
            Kind::Native => "native",
            Kind::Blank => "blank",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    Op1,
    Operator,
    Op2,
    Dest,
    Action,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Op1 => "op1",
            Role::Operator => "operator",
            Role::Op2 => "op2",
            Role::Dest => "dest",
            Role::Action => "action",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sentence {
    raw: String,
    kind: Kind,
    indent: String,
    roles: BTreeMap<Role, Token>,
    comment: Option<String>,
}

impl Sentence {
    /// Classify one input line. A trailing `\r` is dropped.
    pub fn parse(line: &str) -> Sentence {
        let raw = line.strip_suffix('\r').unwrap_or(line);
        let body = raw.trim_start_matches([' ', '\t']);
        let indent = &raw[..raw.len() - body.len()];

        if let Some(dsl) = body.strip_prefix('$') {
            if let Some((kind, roles, comment)) = scan(&dsl.to_ascii_lowercase()) {
                return Sentence {
                    raw: raw.to_string(),
                    kind,
                    indent: indent.to_string(),
                    roles,
                    comment,
                };
            }
        }

        let kind = if body.starts_with(';') {
            Kind::Comment
        } else if body.trim_end_matches([' ', '\t']).is_empty() {
            Kind::Blank
        } else {
            Kind::Native
        };

        Sentence {
            raw: raw.to_string(),
            kind,
            indent: indent.to_string(),
            roles: BTreeMap::new(),
            comment: (kind == Kind::Comment).then(|| body.to_string()),
        }
    }

    /// The line as read, without line terminator.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn is_native(&self) -> bool {
        self.kind.is_native()
    }

    /// Leading spaces and tabs.
    pub fn indent(&self) -> &str {
        &self.indent
    }

    pub fn role(&self, role: Role) -> Option<&Token> {
        self.roles.get(&role)
    }

    pub fn roles(&self) -> impl Iterator<Item = (Role, &Token)> {
        self.roles.iter().map(|(r, t)| (*r, t))
    }

    /// `; ...` text trailing a DSL sentence, or the whole comment line.
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}

type Scanned = (Kind, BTreeMap<Role, Token>, Option<String>);

/// Match the text after the sigil against the three DSL forms.
fn scan(text: &str) -> Option<Scanned> {
    let mut lex = Lexeme::lexer(text);
    let mut words = Vec::new();
    let mut target = None;
    let mut comment = None;

    while let Some(item) = lex.next() {
        match item.ok()? {
            Lexeme::Comment => {
                comment = Some(lex.slice().to_string());
                break;
            }
            Lexeme::Goto => {
                let (label, rest) = scan_target(lex.remainder())?;
                target = Some(label);
                comment = rest;
                words.push(Lexeme::Goto);
                break;
            }
            other => words.push(other),
        }
    }

    use Lexeme::*;
    let (kind, roles) = match (words.as_slice(), target) {
        ([op1, Arrow, dest], None) if op1.is_operand() && dest.is_destination() => (
            Kind::Unary,
            vec![(Role::Op1, op1), (Role::Dest, dest)],
        ),
        ([op1, op @ Operator(_), op2, Arrow, dest], None)
            if op1.is_operand() && op2.is_operand() && dest.is_destination() =>
        {
            (
                Kind::Binary,
                vec![
                    (Role::Op1, op1),
                    (Role::Operator, op),
                    (Role::Op2, op2),
                    (Role::Dest, dest),
                ],
            )
        }
        ([If, op1, cmp @ Comparator(_), op2, Goto], Some(label))
            if op1.is_operand() && op2.is_operand() =>
        {
            let mut roles = to_roles(vec![
                (Role::Op1, op1),
                (Role::Operator, cmp),
                (Role::Op2, op2),
            ]);
            roles.insert(Role::Action, Token::classify("goto"));
            // Position makes it a label, whatever it looks like.
            roles.insert(Role::Dest, Token::Label(label));
            return Some((Kind::Conditional, roles, comment));
        }
        _ => return None,
    };

    Some((kind, to_roles(roles), comment))
}

fn to_roles(pairs: Vec<(Role, &Lexeme)>) -> BTreeMap<Role, Token> {
    pairs
        .into_iter()
        .filter_map(|(role, lexeme)| Some((role, lexeme.clone().into_token()?)))
        .collect()
}

/// Scan `<label> [; comment]` following `goto`.
fn scan_target(rest: &str) -> Option<(String, Option<String>)> {
    let rest = rest.trim_start_matches([' ', '\t']);
    let end = rest.find(|c: char| !is_label_char(c)).unwrap_or(rest.len());
    if end == 0 || end > MAX_TARGET_LEN {
        return None;
    }

    let (label, tail) = rest.split_at(end);
    let tail = tail.trim_start_matches([' ', '\t']);
    match tail {
        "" => Some((label.to_string(), None)),
        t if t.starts_with(';') => Some((label.to_string(), Some(t.to_string()))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Comparator, Literal, Operator, Reg};

    fn reg(i: u8) -> Token {
        Token::Register(Reg::new(i).unwrap())
    }

    #[test]
    fn unary_register_move() {
        let s = Sentence::parse("    $ r1 -> r2");
        assert_eq!(s.kind(), Kind::Unary);
        assert_eq!(s.indent(), "    ");
        assert_eq!(s.role(Role::Op1), Some(&reg(1)));
        assert_eq!(s.role(Role::Dest), Some(&reg(2)));
        assert_eq!(s.role(Role::Op2), None);
        assert!(!s.is_native());
    }

    #[test]
    fn unary_without_spaces_and_with_comment() {
        let s = Sentence::parse("\t$MEM[0x20]->R3 ; fetch\r");
        assert_eq!(s.kind(), Kind::Unary);
        assert_eq!(s.indent(), "\t");
        assert_eq!(s.role(Role::Op1), Some(&Token::Address(Literal::new("0x20"))));
        assert_eq!(s.role(Role::Dest), Some(&reg(3)));
        assert_eq!(s.comment(), Some("; fetch"));
        assert_eq!(s.raw(), "\t$MEM[0x20]->R3 ; fetch");
    }

    #[test]
    fn immediate_destination_is_not_dsl() {
        let s = Sentence::parse("$ r1 -> 5");
        assert_eq!(s.kind(), Kind::Native);
    }

    #[test]
    fn binary_operation() {
        let s = Sentence::parse("$ $10 - mem[20h] -> mem[0b1]");
        assert_eq!(s.kind(), Kind::Binary);
        assert_eq!(s.role(Role::Op1), Some(&Token::Immediate(Literal::new("$10"))));
        assert_eq!(s.role(Role::Operator), Some(&Token::Operator(Operator::Sub)));
        assert_eq!(s.role(Role::Op2), Some(&Token::Address(Literal::new("20h"))));
        assert_eq!(s.role(Role::Dest), Some(&Token::Address(Literal::new("0b1"))));
    }

    #[test]
    fn conditional_branch() {
        let s = Sentence::parse("  $ if r1 > r2 goto END ; done?");
        assert_eq!(s.kind(), Kind::Conditional);
        assert_eq!(s.role(Role::Operator), Some(&Token::Comparator(Comparator::Gt)));
        assert_eq!(s.role(Role::Dest), Some(&Token::Label("end".into())));
        assert_eq!(s.role(Role::Action), Some(&Token::Label("goto".into())));
        assert_eq!(s.comment(), Some("; done?"));
    }

    #[test]
    fn conditional_target_may_exceed_label_token_length() {
        let target = "a_rather_long_label_name_for_a_loop";
        let s = Sentence::parse(&format!("$ if r1 == 0 goto {target}"));
        assert_eq!(s.kind(), Kind::Conditional);
        assert_eq!(s.role(Role::Dest), Some(&Token::Label(target.into())));
    }

    #[test]
    fn conditional_rejects_junk_after_label() {
        assert_eq!(Sentence::parse("$ if r1 == r2 goto end now").kind(), Kind::Native);
        assert_eq!(Sentence::parse("$ if r1 == r2 goto").kind(), Kind::Native);
    }

    #[test]
    fn pass_through_kinds() {
        let c = Sentence::parse("  ; Setup ports");
        assert_eq!(c.kind(), Kind::Comment);
        assert_eq!(c.comment(), Some("; Setup ports"));

        let n = Sentence::parse("    LDI R16, 0xFF");
        assert_eq!(n.kind(), Kind::Native);
        assert_eq!(n.raw(), "    LDI R16, 0xFF");

        assert_eq!(Sentence::parse(" \t ").kind(), Kind::Blank);
        assert_eq!(Sentence::parse("").kind(), Kind::Blank);
        assert!(Sentence::parse("").is_native());
    }

    #[test]
    fn near_misses_pass_through() {
        for line in ["$ r1 ->", "$ r1 + -> r2", "$ if r1 + r2 goto x", "$ goto x", "$ r1 -> r2 r3"] {
            assert_eq!(Sentence::parse(line).kind(), Kind::Native, "{line}");
        }
    }
}
