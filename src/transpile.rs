//! Whole-file pipeline: split, classify, expand, join.

use crate::codegen::Generator;
use crate::error::TranspileError;
use crate::scratch::ScratchSet;
use crate::sentence::{Kind, Sentence};
use log::{debug, trace, warn};

/// Counters gathered while transpiling. Purely observational.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Input lines, blank and comment included.
    pub lines: usize,
    pub blank: usize,
    pub comment: usize,
    /// Input sentences that are neither blank nor comment.
    pub instructions_in: usize,
    /// Output lines that are neither blank nor comment.
    pub instructions_out: usize,
    /// DSL sentences expanded.
    pub transpiled_in: usize,
    /// Lines those sentences expanded to.
    pub transpiled_out: usize,
    /// Native lines passed through.
    pub native: usize,
    pub hazards: usize,
    /// DSL sentences dropped because they have no expansion.
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub text: String,
    pub stats: Stats,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Transpiler {
    generator: Generator,
    /// Abort on the first sentence that cannot be expanded instead of
    /// dropping it with a warning.
    strict: bool,
}

impl Transpiler {
    pub fn new(scratch: ScratchSet) -> Self {
        Transpiler {
            generator: Generator::new(scratch),
            strict: false,
        }
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn run(&self, source: &str) -> Result<Output, TranspileError> {
        let mut stats = Stats::default();
        let mut collector = Vec::<String>::new();

        for (idx, line) in source.split('\n').enumerate() {
            let line_no = idx + 1;
            let sentence = Sentence::parse(line);
            debug!("{line_no:>5} {:<11} {}", sentence.kind(), sentence.raw());
            stats.lines += 1;

            match sentence.kind() {
                Kind::Blank => stats.blank += 1,
                Kind::Comment => stats.comment += 1,
                Kind::Native => stats.native += 1,
                Kind::Unary | Kind::Binary | Kind::Conditional => stats.transpiled_in += 1,
            }

            if sentence.is_native() {
                collector.push(sentence.raw().to_string());
                continue;
            }

            let expansion = match self.generator.generate(&sentence) {
                Ok(expansion) => expansion,
                Err(source) if self.strict => {
                    return Err(TranspileError::Generate { line: line_no, source });
                }
                Err(err) => {
                    warn!("line {line_no}: {err}, sentence dropped: `{}`", sentence.raw().trim());
                    stats.skipped += 1;
                    continue;
                }
            };

            for hazard in expansion.hazards() {
                warn!("line {line_no}: {hazard}: `{}`", sentence.raw().trim());
            }
            stats.hazards += expansion.hazards().len();

            let indent = sentence.indent();
            for inst in expansion.into_lines() {
                trace!("{line_no:>5}   {inst}");
                collector.push(format!("{indent}{inst}"));
                stats.transpiled_out += 1;
            }
        }

        stats.instructions_in = stats.lines - stats.blank - stats.comment;
        stats.instructions_out = stats.native + stats.transpiled_out;

        Ok(Output {
            text: collector.join("\n"),
            stats,
        })
    }
}

/// Transpile with the default AVR register convention.
pub fn transpile(source: &str) -> Result<Output, TranspileError> {
    Transpiler::default().run(source)
}
