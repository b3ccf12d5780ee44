//! Register convention used by every expansion template.

use crate::token::Reg;
use bitvec::prelude::*;
use std::fmt;

/// One bit per general purpose register.
pub type RegSet = BitArr!(for 32, in u32);

/// Register pair addressing memory indirectly (`X`, `Y` or `Z` on AVR).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerPair {
    pub name: &'static str,
    pub high: Reg,
    pub low: Reg,
}

impl fmt::Display for PointerPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Registers reserved for operand staging and address computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScratchSet {
    /// Holds the left operand of binary and conditional forms; result register.
    pub lhs: Reg,
    /// Holds the right operand of binary and conditional forms.
    pub rhs: Reg,
    /// Carries a value between two memory accesses in unary moves.
    pub staging: Reg,
    pub pointer: PointerPair,
    /// Low byte of the `mul` product.
    pub product: Reg,
}

impl ScratchSet {
    /// ATmega328P convention: r24/r25 operands, r25 staging, X = r27:r26.
    pub const AVR: ScratchSet = ScratchSet {
        lhs: Reg::fixed(24),
        rhs: Reg::fixed(25),
        staging: Reg::fixed(25),
        pointer: PointerPair {
            name: "X",
            high: Reg::fixed(27),
            low: Reg::fixed(26),
        },
        product: Reg::fixed(0),
    };
}

impl Default for ScratchSet {
    fn default() -> Self {
        ScratchSet::AVR
    }
}
