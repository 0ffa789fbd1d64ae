use crate::{
    builder::NfaBuilder, nfa::NFA, postfix::PostfixConverter, tokenizer::Tokenizer,
    CompileResult,
};

/// The configuration used for compiling a pattern.
#[derive(Clone, Debug, Default)]
pub struct Config {
    size_limit: Option<usize>,
}

impl Config {
    /// Return a new default configuration.
    pub fn new() -> Config {
        Config::default()
    }

    /// Sets an upper bound on the number of states the builder may allocate.
    ///
    /// Counted repetition copies its operand, so a pattern such as
    /// `(a{100}){100}` allocates ten thousand states. When the limit is
    /// exceeded, compilation fails with [`ErrorKind::TooComplex`].
    ///
    /// There is no limit by default.
    ///
    /// [`ErrorKind::TooComplex`]: crate::ErrorKind::TooComplex
    pub fn size_limit(mut self, limit: Option<usize>) -> Config {
        self.size_limit = limit;
        self
    }

    /// Returns the state limit, if any.
    pub fn get_size_limit(&self) -> Option<usize> {
        self.size_limit
    }
}

/// Compiler that runs a pattern through the tokenizer, the postfix converter
/// and the NFA builder.
#[derive(Clone, Debug, Default)]
pub struct Compiler {
    config: Config,
}

impl Compiler {
    /// Create a new compiler with the default configuration.
    pub fn new() -> Self {
        Self { config: Config::default() }
    }

    /// Apply the given configuration.
    pub fn configure(&mut self, config: Config) -> &mut Compiler {
        self.config = config;
        self
    }

    /// Compile `pattern` to a Thompson NFA.
    ///
    /// Returns `Ok(None)` when the pattern is empty: there is no automaton,
    /// and it is up to the caller whether that means "matches only the empty
    /// string" or is rejected.
    pub fn compile(&self, pattern: &str) -> CompileResult<Option<NFA>> {
        let infix = Tokenizer::new(pattern).tokenize()?;
        debug!("tokenized {:?} into {} tokens", pattern, infix.len());
        let postfix = PostfixConverter::convert(&infix)?;
        NfaBuilder::with_config(self.config.clone()).build(&postfix)
    }
}
