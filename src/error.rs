use crate::sentence::Role;
use crate::token::{Operator, Reg, TokenKind};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenError {
    #[error("{form} form cannot take a {kind} as {role}")]
    UnsupportedOperand {
        form: &'static str,
        role: Role,
        kind: TokenKind,
    },

    #[error("operator `{0}` has no instruction")]
    UnsupportedOperator(Operator),

    #[error("sentence has no `{0}`")]
    MissingRole(Role),

    #[error("restore of {found} while {expected} is still saved")]
    UnbalancedRestore { expected: Reg, found: Reg },

    #[error("restore of {0} without a matching save")]
    RestoreWithoutSave(Reg),

    #[error("{0} saved but never restored")]
    UnclosedSave(Reg),
}

#[derive(Debug, Error)]
pub enum TranspileError {
    #[error("line {line}: {source}")]
    Generate {
        line: usize,
        #[source]
        source: GenError,
    },
}
