//! avrpp – pseudo-assembly preprocessor for 8-bit AVR sources.
//!
//! Lines starting with the `$` sigil are rewritten into AVR instructions;
//! everything else is copied through untouched.
//!
//! - `lexer` / `token` classify the words of a line.
//! - `sentence` matches whole lines against the unary, binary and
//!   conditional forms.
//! - `codegen` expands a sentence against a `scratch` register set.
//! - `transpile` runs a whole file and `report` formats its statistics.

pub mod codegen;
pub mod error;
pub mod lexer;
pub mod report;
pub mod scratch;
pub mod sentence;
pub mod token;
pub mod transpile;

pub use codegen::{Expansion, Generator, Hazard};
pub use error::{GenError, TranspileError};
pub use report::Report;
pub use scratch::ScratchSet;
pub use sentence::{Kind, Role, Sentence};
pub use token::{Token, TokenKind};
pub use transpile::{transpile, Output, Stats, Transpiler};
