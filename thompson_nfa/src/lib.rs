//! Thompson NFA Compiler
//!
//! This library compiles a regular expression into a Thompson NFA in three
//! stages:
//!
//! 1. [`Tokenizer`] turns the pattern into tokens, expanding character
//!    classes and shorthand escapes and inserting explicit concatenation.
//! 2. [`PostfixConverter`] reorders the infix tokens into postfix order and
//!    rejects malformed syntax.
//! 3. [`NfaBuilder`] evaluates the postfix stream as a stack machine over NFA
//!    fragments, duplicating sub-automata for counted repetition.
//!
//! The model is byte based: ranges and shorthand classes are defined over
//! codes 0-127.
//!
//! ```
//! use thompson_nfa::Matcher;
//!
//! let nfa = thompson_nfa::compile("a{2,3}").unwrap().unwrap();
//! let matcher = Matcher::new(&nfa);
//! assert!(matcher.is_match("aaa"));
//! assert!(!matcher.is_match("a"));
//! ```

#[macro_use]
mod macros;

pub mod builder;
pub mod compiler;
pub mod dot;
pub mod matcher;
pub mod nfa;
pub mod postfix;
pub mod tokenizer;

pub use builder::NfaBuilder;
pub use compiler::{Compiler, Config};
pub use dot::Dot;
pub use matcher::{Captures, Match, Matcher};
pub use nfa::{Exit, Fragment, Slot, State, StateId, NFA};
pub use postfix::PostfixConverter;
pub use tokenizer::{CharClass, CharRange, Token, TokenKind, Tokenizer};

/// The result of compiling a pattern.
pub type CompileResult<T> = Result<T, CompileError>;

/// Compile `pattern` with the default configuration.
///
/// Returns `Ok(None)` for the empty pattern, which has no automaton.
pub fn compile(pattern: &str) -> CompileResult<Option<NFA>> {
    Compiler::new().compile(pattern)
}

/// An error that occurred while compiling a pattern.
///
/// Every error carries the byte offset in the pattern at which it was
/// detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    kind: ErrorKind,
    position: usize,
}

impl CompileError {
    pub(crate) fn new(kind: ErrorKind, position: usize) -> CompileError {
        CompileError { kind, position }
    }

    /// The category of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Byte offset in the pattern where the error was detected.
    pub fn position(&self) -> usize {
        self.position
    }
}

/// The kinds of errors that can occur during compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A `)` without a matching `(`.
    UnmatchedCloseParen,
    /// A `(` that is never closed.
    UnmatchedOpenParen,
    /// A `\` at the end of the pattern or class.
    DanglingEscape,
    /// A `[` without a closing `]`.
    UnterminatedClass,
    /// A character class with no members, e.g. `[]`.
    EmptyClass,
    /// A class range whose start is greater than its end.
    InvalidClassRange,
    /// A shorthand class such as `\d` used as a range endpoint.
    ShorthandRangeEndpoint,
    /// A `{` not followed by a repetition count.
    MissingQuantifierNumber,
    /// A counted repetition with bad syntax, e.g. a missing `}`.
    InvalidQuantifier,
    /// A counted repetition `{m,n}` with `n < m`.
    InvalidQuantifierRange,
    /// A repetition count that does not fit in 32 bits.
    QuantifierTooLarge,
    /// An empty group `()`.
    EmptyGroup,
    /// An alternation with a missing operand.
    EmptyAlternation,
    /// A quantifier that does not follow an atom or group.
    InvalidQuantifierTarget,
    /// A binary operator at the end of the pattern.
    TrailingOperator,
    /// The automaton would exceed the configured state limit.
    TooComplex,
    /// A postfix stream that breaks the converter's guarantees.
    Internal(String),
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::UnmatchedCloseParen => write!(f, "mismatched ')'"),
            ErrorKind::UnmatchedOpenParen => write!(f, "mismatched '('"),
            ErrorKind::DanglingEscape => write!(f, "dangling escape"),
            ErrorKind::UnterminatedClass => write!(f, "unterminated character class"),
            ErrorKind::EmptyClass => write!(f, "empty character class"),
            ErrorKind::InvalidClassRange => write!(f, "invalid character range"),
            ErrorKind::ShorthandRangeEndpoint => {
                write!(f, "cannot create a range with shorthand escape sequences")
            }
            ErrorKind::MissingQuantifierNumber => write!(f, "expected number in quantifier"),
            ErrorKind::InvalidQuantifier => write!(f, "invalid quantifier"),
            ErrorKind::InvalidQuantifierRange => write!(f, "invalid range in quantifier"),
            ErrorKind::QuantifierTooLarge => write!(f, "repetition count is too large"),
            ErrorKind::EmptyGroup => write!(f, "empty parentheses ()"),
            ErrorKind::EmptyAlternation => write!(f, "empty side in alternation |"),
            ErrorKind::InvalidQuantifierTarget => write!(f, "quantifier follows invalid token"),
            ErrorKind::TrailingOperator => write!(f, "trailing binary operator"),
            ErrorKind::TooComplex => write!(f, "regex pattern is too complex"),
            ErrorKind::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at position {}", self.kind, self.position)
    }
}

impl std::error::Error for CompileError {}
