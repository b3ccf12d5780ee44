//! Instruction selection for DSL sentences.
//!
//! Every template is keyed by the types of the sentence's operands and
//! written against a [`ScratchSet`], never against literal register names.
//! Registers the expansion repurposes are pushed first and popped in
//! reverse order; [`Expansion`] refuses anything that is not strictly
//! nested.

use crate::error::GenError;
use crate::scratch::{RegSet, ScratchSet};
use crate::sentence::{Kind, Role, Sentence};
use crate::token::{Comparator, Literal, Operator, Reg, Token, TokenKind};
use std::fmt;

/// Something in an expansion that assembles but may not do what was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hazard {
    /// A sentence register is read after the expansion overwrote it, or a
    /// result written to it is undone by a restore.
    ScratchOperand { role: Role, reg: Reg },
    /// `ldi` only reaches r16‥r31.
    LowImmediate(Reg),
}

impl fmt::Display for Hazard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hazard::ScratchOperand { role: Role::Dest, reg } => {
                write!(f, "dest {reg} is restored after the result is written")
            }
            Hazard::ScratchOperand { role, reg } => {
                write!(f, "{role} {reg} is read after the expansion overwrote it")
            }
            Hazard::LowImmediate(reg) => write!(f, "ldi cannot load {reg} (r16..r31 only)"),
        }
    }
}

/// Instruction lines under construction for one sentence.
#[derive(Debug, Default)]
pub struct Expansion {
    lines: Vec<String>,
    saved: Vec<Reg>,
    /// Registers no longer holding the caller's value.
    dirty: RegSet,
    /// Registers the sentence writes its result to.
    results: RegSet,
    hazards: Vec<Hazard>,
}

impl Expansion {
    fn emit(&mut self, line: String) {
        self.lines.push(line);
    }

    fn save(&mut self, reg: Reg) {
        self.emit(format!("push {reg}"));
        self.saved.push(reg);
    }

    fn restore(&mut self, reg: Reg) -> Result<(), GenError> {
        match self.saved.pop() {
            Some(top) if top == reg => {
                self.emit(format!("pop {reg}"));
                if self.results[reg.index()] {
                    self.hazards.push(Hazard::ScratchOperand { role: Role::Dest, reg });
                    self.results.set(reg.index(), false);
                }
                self.dirty.set(reg.index(), false);
                Ok(())
            }
            Some(top) => Err(GenError::UnbalancedRestore { expected: top, found: reg }),
            None => Err(GenError::RestoreWithoutSave(reg)),
        }
    }

    fn write(&mut self, reg: Reg) {
        self.dirty.set(reg.index(), true);
    }

    /// A sentence register about to be read.
    fn read(&mut self, role: Role, reg: Reg) {
        if self.dirty[reg.index()] {
            self.hazards.push(Hazard::ScratchOperand { role, reg });
        }
    }

    /// Mark `reg` as the sentence's destination; it must survive every
    /// restore that follows.
    fn result(&mut self, reg: Reg) {
        self.results.set(reg.index(), true);
    }

    fn mov(&mut self, dest: Reg, src: Reg) {
        self.emit(format!("mov {dest}, {src}"));
        if dest != src {
            self.write(dest);
        }
    }

    fn ldi(&mut self, dest: Reg, value: impl fmt::Display) {
        if !dest.accepts_immediate() {
            self.hazards.push(Hazard::LowImmediate(dest));
        }
        self.emit(format!("ldi {dest}, {value}"));
        self.write(dest);
    }

    fn finish(self) -> Result<Expansion, GenError> {
        match self.saved.last() {
            Some(reg) => Err(GenError::UnclosedSave(*reg)),
            None => Ok(self),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    pub fn hazards(&self) -> &[Hazard] {
        &self.hazards
    }
}

/// Assembly mnemonic for a binary operator; `/` and `!` have none.
pub fn opcode(op: Operator) -> Option<&'static str> {
    match op {
        Operator::Add => Some("add"),
        Operator::Sub => Some("sub"),
        Operator::Mul => Some("mul"),
        Operator::And => Some("and"),
        Operator::Or  => Some("or"),
        Operator::Xor => Some("eor"),
        Operator::Div | Operator::Not => None,
    }
}

/// `cp` only sets carry/zero for a fixed left/right order, so some
/// comparators swap the operands. Returns (swap, branch mnemonic).
pub fn branch(cmp: Comparator) -> (bool, &'static str) {
    match cmp {
        Comparator::Eq => (false, "breq"),
        Comparator::Ne => (false, "brne"),
        Comparator::Ge => (false, "brcc"),
        Comparator::Le => (true,  "brcc"),
        Comparator::Gt => (true,  "brcs"),
        Comparator::Lt => (false, "brcs"),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Generator {
    scratch: ScratchSet,
}

impl Generator {
    pub fn new(scratch: ScratchSet) -> Self {
        Generator { scratch }
    }

    /// Expand a DSL sentence. Pass-through sentences expand to nothing.
    pub fn generate(&self, sentence: &Sentence) -> Result<Expansion, GenError> {
        let mut out = Expansion::default();
        let role = |r: Role| sentence.role(r).ok_or(GenError::MissingRole(r));

        match sentence.kind() {
            Kind::Unary => self.unary(role(Role::Op1)?, role(Role::Dest)?, &mut out)?,
            Kind::Binary => {
                let op = match role(Role::Operator)? {
                    Token::Operator(op) => *op,
                    other => return Err(unsupported("binary", Role::Operator, other)),
                };
                self.binary(role(Role::Op1)?, op, role(Role::Op2)?, role(Role::Dest)?, &mut out)?
            }
            Kind::Conditional => {
                let cmp = match role(Role::Operator)? {
                    Token::Comparator(cmp) => *cmp,
                    other => return Err(unsupported("conditional", Role::Operator, other)),
                };
                self.conditional(role(Role::Op1)?, cmp, role(Role::Op2)?, role(Role::Dest)?, &mut out)?
            }
            Kind::Comment | Kind::Native | Kind::Blank => {}
        }

        out.finish()
    }

    /// `op1 -> dest`
    fn unary(&self, op1: &Token, dest: &Token, out: &mut Expansion) -> Result<(), GenError> {
        let ScratchSet { staging, pointer: ptr, .. } = self.scratch;
        match (op1, dest) {
            (Token::Register(src), Token::Register(d)) => {
                out.read(Role::Op1, *src);
                out.mov(*d, *src);
            }
            (Token::Immediate(k), Token::Register(d)) => out.ldi(*d, k),
            (Token::Address(a), Token::Register(d)) => {
                out.result(*d);
                self.load(a, *d, out)?;
            }
            (Token::Register(src), Token::Address(a)) => self.store(*src, Some(Role::Op1), a, out)?,
            (Token::Immediate(k), Token::Address(a)) => {
                out.save(ptr.low);
                out.save(ptr.high);
                out.save(staging);
                out.ldi(staging, k);
                self.point_at(a, out);
                out.emit(format!("st {ptr}, {staging}"));
                out.restore(staging)?;
                out.restore(ptr.high)?;
                out.restore(ptr.low)?;
            }
            (Token::Address(from), Token::Address(to)) => {
                out.save(ptr.low);
                out.save(ptr.high);
                out.save(staging);
                self.point_at(from, out);
                out.emit(format!("ld {staging}, {ptr}"));
                out.write(staging);
                self.point_at(to, out);
                out.emit(format!("st {ptr}, {staging}"));
                out.restore(staging)?;
                out.restore(ptr.high)?;
                out.restore(ptr.low)?;
            }
            (Token::Register(_) | Token::Immediate(_) | Token::Address(_), other) => {
                return Err(unsupported("unary", Role::Dest, other));
            }
            (other, _) => return Err(unsupported("unary", Role::Op1, other)),
        }
        Ok(())
    }

    /// `op1 <operator> op2 -> dest`
    fn binary(
        &self,
        op1: &Token,
        op: Operator,
        op2: &Token,
        dest: &Token,
        out: &mut Expansion,
    ) -> Result<(), GenError> {
        let ScratchSet { lhs, rhs, product, .. } = self.scratch;
        let mnemonic = opcode(op).ok_or(GenError::UnsupportedOperator(op))?;
        if !matches!(dest.kind(), TokenKind::Register | TokenKind::Address) {
            return Err(unsupported("binary", Role::Dest, dest));
        }

        out.save(lhs);
        out.save(rhs);
        self.stage(op1, Role::Op1, lhs, out)?;
        self.stage(op2, Role::Op2, rhs, out)?;
        out.emit(format!("{mnemonic} {lhs}, {rhs}"));

        let result = if op == Operator::Mul {
            // Product lands in r1:r0 on AVR; neither is saved.
            out.write(product);
            if let Some(high) = Reg::new(product.index() as u8 + 1) {
                out.write(high);
            }
            product
        } else {
            out.write(lhs);
            lhs
        };
        match dest {
            Token::Register(d) => {
                out.result(*d);
                out.mov(*d, result);
            }
            Token::Address(a) => self.store(result, None, a, out)?,
            _ => unreachable!("destination kind checked above"),
        }

        out.restore(rhs)?;
        out.restore(lhs)?;
        Ok(())
    }

    /// `if op1 <comparator> op2 goto dest`
    fn conditional(
        &self,
        op1: &Token,
        cmp: Comparator,
        op2: &Token,
        dest: &Token,
        out: &mut Expansion,
    ) -> Result<(), GenError> {
        let ScratchSet { lhs, rhs, .. } = self.scratch;
        let target = match dest {
            Token::Label(name) => name,
            other => return Err(unsupported("conditional", Role::Dest, other)),
        };

        out.save(lhs);
        self.stage(op1, Role::Op1, lhs, out)?;
        out.save(rhs);
        self.stage(op2, Role::Op2, rhs, out)?;

        let (swap, mnemonic) = branch(cmp);
        let (left, right) = if swap { (rhs, lhs) } else { (lhs, rhs) };
        out.emit(format!("cp {left}, {right}"));

        // pop leaves SREG alone, so the branch can follow the restores.
        out.restore(rhs)?;
        out.restore(lhs)?;
        out.emit(format!("{mnemonic} {target}"));
        Ok(())
    }

    /// Bring an operand of any supported type into `reg`.
    fn stage(&self, operand: &Token, role: Role, reg: Reg, out: &mut Expansion) -> Result<(), GenError> {
        match operand {
            Token::Register(src) => {
                out.read(role, *src);
                out.mov(reg, *src);
            }
            Token::Immediate(k) => out.ldi(reg, k),
            Token::Address(a) => self.load(a, reg, out)?,
            other => return Err(unsupported("operand", role, other)),
        }
        Ok(())
    }

    /// `reg <- mem[addr]` through the pointer pair.
    fn load(&self, addr: &Literal, reg: Reg, out: &mut Expansion) -> Result<(), GenError> {
        let ptr = self.scratch.pointer;
        self.with_pointer(addr, out, |out| {
            out.emit(format!("ld {reg}, {ptr}"));
            out.write(reg);
        })
    }

    /// `mem[addr] <- reg` through the pointer pair. `role` is set when `reg`
    /// is the sentence's own register rather than a scratch one.
    fn store(&self, reg: Reg, role: Option<Role>, addr: &Literal, out: &mut Expansion) -> Result<(), GenError> {
        let ptr = self.scratch.pointer;
        self.with_pointer(addr, out, |out| {
            if let Some(role) = role {
                out.read(role, reg);
            }
            out.emit(format!("st {ptr}, {reg}"));
        })
    }

    fn with_pointer(
        &self,
        addr: &Literal,
        out: &mut Expansion,
        access: impl FnOnce(&mut Expansion),
    ) -> Result<(), GenError> {
        let ptr = self.scratch.pointer;
        out.save(ptr.low);
        out.save(ptr.high);
        self.point_at(addr, out);
        access(out);
        out.restore(ptr.high)?;
        out.restore(ptr.low)
    }

    fn point_at(&self, addr: &Literal, out: &mut Expansion) {
        let ptr = self.scratch.pointer;
        out.ldi(ptr.high, format_args!("high({addr})"));
        out.ldi(ptr.low, format_args!("low({addr})"));
    }
}

fn unsupported(form: &'static str, role: Role, token: &Token) -> GenError {
    GenError::UnsupportedOperand { form, role, kind: token.kind() }
}
