use std::fmt;

use crate::{CompileError, CompileResult, ErrorKind};

/// The highest code covered by the shorthand classes and their complements.
const MAX_ASCII: u8 = 0x7F;

/// A closed interval `[lo, hi]` of byte values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CharRange {
    lo: u8,
    hi: u8,
}

impl CharRange {
    /// Create a new range.
    ///
    /// The bounds are normalized so that `lo <= hi` always holds: if
    /// `lo > hi` they are swapped. The tokenizer reports an inverted range
    /// in a pattern as [`ErrorKind::InvalidClassRange`] before it gets here.
    pub fn new(lo: u8, hi: u8) -> CharRange {
        if lo <= hi {
            CharRange { lo, hi }
        } else {
            CharRange { lo: hi, hi: lo }
        }
    }

    const fn raw(lo: u8, hi: u8) -> CharRange {
        CharRange { lo, hi }
    }

    /// The inclusive lower bound.
    pub fn lo(&self) -> u8 {
        self.lo
    }

    /// The inclusive upper bound.
    pub fn hi(&self) -> u8 {
        self.hi
    }

    /// Whether `byte` falls in this range.
    pub fn contains(&self, byte: u8) -> bool {
        self.lo <= byte && byte <= self.hi
    }
}

const DIGIT: &[CharRange] = &[CharRange::raw(b'0', b'9')];

const NOT_DIGIT: &[CharRange] = &[
    CharRange::raw(0, b'/'),
    CharRange::raw(b':', MAX_ASCII),
];

const WORD: &[CharRange] = &[
    CharRange::raw(b'a', b'z'),
    CharRange::raw(b'A', b'Z'),
    CharRange::raw(b'0', b'9'),
    CharRange::raw(b'_', b'_'),
];

const NOT_WORD: &[CharRange] = &[
    CharRange::raw(0, b'/'),
    CharRange::raw(b':', b'@'),
    CharRange::raw(b'[', b'^'),
    CharRange::raw(b'`', b'`'),
    CharRange::raw(b'{', MAX_ASCII),
];

const SPACE: &[CharRange] = &[
    CharRange::raw(b' ', b' '),
    CharRange::raw(b'\t', b'\t'),
    CharRange::raw(b'\n', b'\n'),
    CharRange::raw(b'\r', b'\r'),
    CharRange::raw(0x0C, 0x0C),
    CharRange::raw(0x0B, 0x0B),
];

const NOT_SPACE: &[CharRange] = &[
    CharRange::raw(0, 0x08),
    CharRange::raw(0x0E, 0x1F),
    CharRange::raw(b'!', MAX_ASCII),
];

/// Returns the ranges of a shorthand class escape (`\d`, `\W`, ...).
fn shorthand(c: u8) -> Option<&'static [CharRange]> {
    match c {
        b'd' => Some(DIGIT),
        b'D' => Some(NOT_DIGIT),
        b'w' => Some(WORD),
        b'W' => Some(NOT_WORD),
        b's' => Some(SPACE),
        b'S' => Some(NOT_SPACE),
        _ => None,
    }
}

/// Maps the byte after a `\` to the literal it denotes.
fn unescape(c: u8) -> u8 {
    match c {
        b'n' => b'\n',
        b't' => b'\t',
        b'r' => b'\r',
        b'f' => 0x0C,
        b'v' => 0x0B,
        c => c,
    }
}

fn is_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | b'\r' | 0x0B | 0x0C)
}

/// A set of bytes described by sorted, disjoint, non-adjacent ranges plus a
/// negation flag.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CharClass {
    ranges: Vec<CharRange>,
    negated: bool,
}

impl CharClass {
    /// Create a class from arbitrary ranges. The ranges are sorted and
    /// overlapping or adjacent ranges are merged.
    pub fn new<I>(ranges: I, negated: bool) -> CharClass
    where
        I: IntoIterator<Item = CharRange>,
    {
        let mut ranges: Vec<CharRange> = ranges.into_iter().collect();
        canonicalize(&mut ranges);
        CharClass { ranges, negated }
    }

    /// The canonical ranges of this class, ignoring negation.
    pub fn ranges(&self) -> &[CharRange] {
        &self.ranges
    }

    /// Whether this class matches bytes *outside* its ranges.
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// Whether `byte` is a member of this class.
    pub fn matches(&self, byte: u8) -> bool {
        let found = self
            .ranges
            .binary_search_by(|r| {
                if r.hi < byte {
                    std::cmp::Ordering::Less
                } else if r.lo > byte {
                    std::cmp::Ordering::Greater
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .is_ok();
        found != self.negated
    }
}

/// Sorts `ranges` by `(lo, hi)` and merges overlapping or adjacent ranges in
/// place.
fn canonicalize(ranges: &mut Vec<CharRange>) {
    if ranges.is_empty() {
        return;
    }
    ranges.sort();
    let mut write = 0;
    for read in 1..ranges.len() {
        let cur = ranges[read];
        let last = &mut ranges[write];
        if u16::from(cur.lo) <= u16::from(last.hi) + 1 {
            last.hi = last.hi.max(cur.hi);
        } else {
            write += 1;
            ranges[write] = cur;
        }
    }
    ranges.truncate(write + 1);
}

impl fmt::Display for CharClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        if self.negated {
            write!(f, "^")?;
        }
        for r in &self.ranges {
            write!(f, "{}", r.lo.escape_ascii())?;
            if r.lo != r.hi {
                write!(f, "-{}", r.hi.escape_ascii())?;
            }
        }
        write!(f, "]")
    }
}

/// The kind of a token, together with its payload.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A single literal byte.
    Literal(u8),
    /// `.`, any byte.
    Dot,
    /// A bracketed class or a shorthand escape.
    Class(CharClass),
    /// `^`
    Caret,
    /// `$`
    Dollar,
    /// `(` carrying its group id.
    LParen(u32),
    /// `)` carrying the id of the group it closes.
    RParen(u32),
    /// `*`
    Star,
    /// `+`
    Plus,
    /// `?`
    Question,
    /// `|`
    Alternation,
    /// Explicit concatenation, never written in a pattern.
    Concat,
    /// `{m}`, `{m,}` or `{m,n}`. A `max` of `None` is unbounded.
    Repeat { min: u32, max: Option<u32> },
    /// Terminates every token stream.
    End,
}

impl TokenKind {
    /// Whether a matchable unit can end with this token.
    fn can_end_unit(&self) -> bool {
        matches!(
            self,
            TokenKind::Literal(_)
                | TokenKind::Dot
                | TokenKind::Class(_)
                | TokenKind::RParen(_)
                | TokenKind::Star
                | TokenKind::Plus
                | TokenKind::Question
                | TokenKind::Repeat { .. }
                | TokenKind::Caret
        )
    }

    /// Whether a matchable unit can begin with this token.
    fn can_begin_unit(&self) -> bool {
        matches!(
            self,
            TokenKind::Literal(_)
                | TokenKind::Dot
                | TokenKind::LParen(_)
                | TokenKind::Class(_)
                | TokenKind::Dollar
        )
    }

    /// Whether this is a postfix repetition operator.
    pub fn is_quantifier(&self) -> bool {
        matches!(
            self,
            TokenKind::Star | TokenKind::Plus | TokenKind::Question | TokenKind::Repeat { .. }
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Literal(b) => write!(f, "LITERAL({})", b.escape_ascii()),
            TokenKind::Dot => write!(f, "DOT"),
            TokenKind::Class(class) => write!(f, "CHAR_CLASS{}", class),
            TokenKind::Caret => write!(f, "CARET"),
            TokenKind::Dollar => write!(f, "DOLLAR"),
            TokenKind::LParen(id) => write!(f, "LPAREN({})", id),
            TokenKind::RParen(id) => write!(f, "RPAREN({})", id),
            TokenKind::Star => write!(f, "STAR"),
            TokenKind::Plus => write!(f, "PLUS"),
            TokenKind::Question => write!(f, "QUESTION"),
            TokenKind::Alternation => write!(f, "ALTERNATION"),
            TokenKind::Concat => write!(f, "CONCAT"),
            TokenKind::Repeat { min, max: Some(max) } => {
                write!(f, "QUANTIFIER_RANGE(m={}, n={})", min, max)
            }
            TokenKind::Repeat { min, max: None } => {
                write!(f, "QUANTIFIER_RANGE(m={}, n=inf)", min)
            }
            TokenKind::End => write!(f, "END"),
        }
    }
}

/// A token and the byte offset in the pattern where it starts.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: usize,
}

impl Token {
    pub fn new(kind: TokenKind, pos: usize) -> Token {
        Token { kind, pos }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

/// Splits a pattern into tokens.
///
/// A tokenizer is used for exactly one pattern. Group ids are handed out in
/// the order their `(` appears, starting at 0, and closing parentheses are
/// paired with an explicit stack.
#[derive(Debug)]
pub struct Tokenizer<'p> {
    pattern: &'p [u8],
    pos: usize,
    group_counter: u32,
    /// Open groups as `(id, offset of the '(')`.
    group_stack: Vec<(u32, usize)>,
}

impl<'p> Tokenizer<'p> {
    pub fn new(pattern: &'p str) -> Tokenizer<'p> {
        Tokenizer::from_bytes(pattern.as_bytes())
    }

    pub fn from_bytes(pattern: &'p [u8]) -> Tokenizer<'p> {
        Tokenizer {
            pattern,
            pos: 0,
            group_counter: 0,
            group_stack: Vec::new(),
        }
    }

    /// Tokenize the whole pattern.
    ///
    /// The returned stream has explicit [`TokenKind::Concat`] tokens and is
    /// always terminated by [`TokenKind::End`].
    pub fn tokenize(mut self) -> CompileResult<Vec<Token>> {
        let mut tokens = Vec::new();
        while !self.eof() {
            tokens.push(self.next_token()?);
        }
        if let Some(&(_, open)) = self.group_stack.last() {
            return Err(CompileError::new(ErrorKind::UnmatchedOpenParen, open));
        }
        tokens.push(Token::new(TokenKind::End, self.pos));
        Ok(insert_concat(tokens))
    }

    fn eof(&self) -> bool {
        self.pos >= self.pattern.len()
    }

    fn peek(&self) -> Option<u8> {
        self.pattern.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn error(&self, kind: ErrorKind) -> CompileError {
        CompileError::new(kind, self.pos)
    }

    fn next_token(&mut self) -> CompileResult<Token> {
        let start = self.pos;
        let c = match self.bump() {
            Some(c) => c,
            None => return Ok(Token::new(TokenKind::End, start)),
        };
        let kind = match c {
            b'.' => TokenKind::Dot,
            b'*' => TokenKind::Star,
            b'+' => TokenKind::Plus,
            b'?' => TokenKind::Question,
            b'|' => TokenKind::Alternation,
            b'^' => TokenKind::Caret,
            b'$' => TokenKind::Dollar,
            b'(' => {
                let id = self.group_counter;
                self.group_counter += 1;
                self.group_stack.push((id, start));
                TokenKind::LParen(id)
            }
            b')' => match self.group_stack.pop() {
                Some((id, _)) => TokenKind::RParen(id),
                None => return Err(CompileError::new(ErrorKind::UnmatchedCloseParen, start)),
            },
            b'\\' => self.read_escape(start)?,
            b'[' => self.read_class(start)?,
            b'{' => self.read_quantifier(start)?,
            c => TokenKind::Literal(c),
        };
        Ok(Token::new(kind, start))
    }

    fn read_escape(&mut self, start: usize) -> CompileResult<TokenKind> {
        let c = self
            .bump()
            .ok_or_else(|| CompileError::new(ErrorKind::DanglingEscape, start))?;
        if let Some(ranges) = shorthand(c) {
            return Ok(TokenKind::Class(CharClass::new(ranges.iter().copied(), false)));
        }
        Ok(TokenKind::Literal(unescape(c)))
    }

    /// Reads a bracketed class. The opening `[` has been consumed.
    ///
    /// The first `]` always closes the class, so `[]]` is an empty class
    /// followed by a literal `]`. Use `\]` for a literal inside a class.
    fn read_class(&mut self, start: usize) -> CompileResult<TokenKind> {
        let negated = if self.peek() == Some(b'^') {
            self.pos += 1;
            true
        } else {
            false
        };

        let mut ranges = Vec::new();
        // A literal that may still become the start of a range.
        let mut pending: Option<u8> = None;
        let mut last_was_shorthand = false;
        loop {
            let c = match self.peek() {
                None => return Err(CompileError::new(ErrorKind::UnterminatedClass, start)),
                Some(b']') => break,
                Some(c) => c,
            };
            let at = self.pos;
            self.pos += 1;

            if c == b'\\' {
                let escaped = self
                    .bump()
                    .ok_or_else(|| CompileError::new(ErrorKind::DanglingEscape, at))?;
                if let Some(lo) = pending.take() {
                    ranges.push(CharRange::new(lo, lo));
                }
                match shorthand(escaped) {
                    Some(set) => {
                        ranges.extend_from_slice(set);
                        last_was_shorthand = true;
                    }
                    None => {
                        pending = Some(unescape(escaped));
                        last_was_shorthand = false;
                    }
                }
                continue;
            }

            if c == b'-' && self.peek() != Some(b']') {
                if let Some(lo) = pending.take() {
                    let hi = self.read_range_end(start)?;
                    if lo > hi {
                        return Err(CompileError::new(ErrorKind::InvalidClassRange, at));
                    }
                    ranges.push(CharRange::new(lo, hi));
                    continue;
                }
                if last_was_shorthand {
                    return Err(CompileError::new(ErrorKind::ShorthandRangeEndpoint, at));
                }
            }

            if let Some(lo) = pending.replace(c) {
                ranges.push(CharRange::new(lo, lo));
            }
            last_was_shorthand = false;
        }
        // Consume the ']'.
        self.pos += 1;
        if let Some(lo) = pending {
            ranges.push(CharRange::new(lo, lo));
        }
        if ranges.is_empty() {
            return Err(CompileError::new(ErrorKind::EmptyClass, start));
        }
        Ok(TokenKind::Class(CharClass::new(ranges, negated)))
    }

    /// Reads the upper bound of a class range, after the `-`.
    fn read_range_end(&mut self, class_start: usize) -> CompileResult<u8> {
        let at = self.pos;
        match self.bump() {
            None => Err(CompileError::new(ErrorKind::UnterminatedClass, class_start)),
            Some(b'\\') => {
                let escaped = self
                    .bump()
                    .ok_or_else(|| CompileError::new(ErrorKind::DanglingEscape, at))?;
                if shorthand(escaped).is_some() {
                    return Err(CompileError::new(ErrorKind::ShorthandRangeEndpoint, at));
                }
                Ok(unescape(escaped))
            }
            Some(c) => Ok(c),
        }
    }

    /// Reads a counted repetition. The opening `{` has been consumed.
    fn read_quantifier(&mut self, start: usize) -> CompileResult<TokenKind> {
        let min = self.read_count()?;
        match self.peek() {
            Some(b'}') => {
                self.pos += 1;
                return Ok(TokenKind::Repeat { min, max: Some(min) });
            }
            Some(b',') => self.pos += 1,
            _ => return Err(self.error(ErrorKind::InvalidQuantifier)),
        }

        self.skip_space();
        if self.peek() == Some(b'}') {
            self.pos += 1;
            return Ok(TokenKind::Repeat { min, max: None });
        }

        let max = self.read_count()?;
        if self.peek() != Some(b'}') {
            return Err(self.error(ErrorKind::InvalidQuantifier));
        }
        self.pos += 1;
        if max < min {
            return Err(CompileError::new(ErrorKind::InvalidQuantifierRange, start));
        }
        Ok(TokenKind::Repeat { min, max: Some(max) })
    }

    /// Reads a decimal count surrounded by optional whitespace. A missing
    /// number reads as 0 when a `,` follows, so `{,n}` means `{0,n}`.
    fn read_count(&mut self) -> CompileResult<u32> {
        self.skip_space();
        let mut value: u32 = 0;
        let mut found = false;
        while let Some(c) = self.peek().filter(u8::is_ascii_digit) {
            found = true;
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(u32::from(c - b'0')))
                .ok_or_else(|| self.error(ErrorKind::QuantifierTooLarge))?;
            self.pos += 1;
        }
        if !found && self.peek() != Some(b',') {
            return Err(self.error(ErrorKind::MissingQuantifierNumber));
        }
        self.skip_space();
        Ok(value)
    }

    fn skip_space(&mut self) {
        while self.peek().map_or(false, is_space) {
            self.pos += 1;
        }
    }
}

/// Inserts a [`TokenKind::Concat`] between every pair of adjacent tokens
/// where the left one can end a unit and the right one can begin one.
fn insert_concat(tokens: Vec<Token>) -> Vec<Token> {
    let mut normalized = Vec::with_capacity(tokens.len() * 2);
    let mut iter = tokens.into_iter().peekable();
    while let Some(token) = iter.next() {
        let concat = iter.peek().map_or(false, |next| {
            token.kind.can_end_unit() && next.kind.can_begin_unit()
        });
        let pos = token.pos;
        normalized.push(token);
        if concat {
            normalized.push(Token::new(TokenKind::Concat, pos));
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(pattern: &str) -> Vec<TokenKind> {
        Tokenizer::new(pattern)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn err(pattern: &str) -> ErrorKind {
        Tokenizer::new(pattern).tokenize().unwrap_err().kind().clone()
    }

    fn class(pattern: &str) -> CharClass {
        match &kinds(pattern)[0] {
            TokenKind::Class(class) => class.clone(),
            other => panic!("expected class, got {:?}", other),
        }
    }

    fn pairs(class: &CharClass) -> Vec<(u8, u8)> {
        class.ranges().iter().map(|r| (r.lo(), r.hi())).collect()
    }

    #[test]
    fn test_range_bounds_are_normalized() {
        let range = CharRange::new(b'z', b'a');
        assert_eq!((range.lo(), range.hi()), (b'a', b'z'));
        assert!(range.contains(b'm'));
        assert_eq!(err("[z-a]"), ErrorKind::InvalidClassRange);
    }

    #[test]
    fn test_literals_get_concat() {
        use TokenKind::*;
        assert_eq!(
            kinds("abc"),
            vec![Literal(b'a'), Concat, Literal(b'b'), Concat, Literal(b'c'), End]
        );
    }

    #[test]
    fn test_single_token() {
        assert_eq!(kinds("a"), vec![TokenKind::Literal(b'a'), TokenKind::End]);
        assert_eq!(kinds(""), vec![TokenKind::End]);
    }

    #[test]
    fn test_no_concat_around_operators() {
        use TokenKind::*;
        assert_eq!(
            kinds("a|b"),
            vec![Literal(b'a'), Alternation, Literal(b'b'), End]
        );
        assert_eq!(
            kinds("a*b+c?"),
            vec![
                Literal(b'a'),
                Star,
                Concat,
                Literal(b'b'),
                Plus,
                Concat,
                Literal(b'c'),
                Question,
                End,
            ]
        );
    }

    #[test]
    fn test_anchors_concat() {
        use TokenKind::*;
        assert_eq!(
            kinds("^ab$"),
            vec![
                Caret,
                Concat,
                Literal(b'a'),
                Concat,
                Literal(b'b'),
                Concat,
                Dollar,
                End,
            ]
        );
    }

    #[test]
    fn test_group_ids() {
        use TokenKind::*;
        assert_eq!(
            kinds("(a(b))(c)"),
            vec![
                LParen(0),
                Literal(b'a'),
                Concat,
                LParen(1),
                Literal(b'b'),
                RParen(1),
                RParen(0),
                Concat,
                LParen(2),
                Literal(b'c'),
                RParen(2),
                End,
            ]
        );
    }

    #[test]
    fn test_unbalanced_parens() {
        assert_eq!(err("a)"), ErrorKind::UnmatchedCloseParen);
        assert_eq!(err("(a"), ErrorKind::UnmatchedOpenParen);
        let e = Tokenizer::new("x(y").tokenize().unwrap_err();
        assert_eq!(e.position(), 1);
    }

    #[test]
    fn test_escapes() {
        use TokenKind::*;
        assert_eq!(kinds(r"\n"), vec![Literal(b'\n'), End]);
        assert_eq!(kinds(r"\t"), vec![Literal(b'\t'), End]);
        assert_eq!(kinds(r"\f"), vec![Literal(0x0C), End]);
        assert_eq!(kinds(r"\v"), vec![Literal(0x0B), End]);
        assert_eq!(
            kinds(r"a\.b"),
            vec![Literal(b'a'), Concat, Literal(b'.'), Concat, Literal(b'b'), End]
        );
        assert_eq!(kinds(r"\*"), vec![Literal(b'*'), End]);
        assert_eq!(err("ab\\"), ErrorKind::DanglingEscape);
    }

    #[test]
    fn test_shorthand_classes() {
        assert_eq!(pairs(&class(r"\d")), vec![(b'0', b'9')]);
        assert_eq!(
            pairs(&class(r"\w")),
            vec![(b'0', b'9'), (b'A', b'Z'), (b'_', b'_'), (b'a', b'z')]
        );
        assert_eq!(pairs(&class(r"\s")), vec![(b'\t', 0x0D), (b' ', b' ')]);
        assert_eq!(pairs(&class(r"\D")), vec![(0, b'/'), (b':', 0x7F)]);
        assert_eq!(pairs(&class(r"\S")), vec![(0, 0x08), (0x0E, 0x1F), (b'!', 0x7F)]);
    }

    #[test]
    fn test_shorthand_complements_partition_ascii() {
        for (lower, upper) in [(r"\d", r"\D"), (r"\w", r"\W"), (r"\s", r"\S")] {
            let lower = class(lower);
            let upper = class(upper);
            for b in 0..=0x7Fu8 {
                assert_ne!(lower.matches(b), upper.matches(b), "byte {}", b);
            }
        }
    }

    #[test]
    fn test_class_ranges() {
        let c = class("[a-z]");
        assert_eq!(pairs(&c), vec![(b'a', b'z')]);
        assert!(!c.is_negated());

        let c = class("[^0-9a-fA-F]");
        assert!(c.is_negated());
        assert_eq!(pairs(&c), vec![(b'0', b'9'), (b'A', b'F'), (b'a', b'f')]);
        assert!(!c.matches(b'b'));
        assert!(c.matches(b'g'));
    }

    #[test]
    fn test_class_merges_overlap_and_adjacency() {
        assert_eq!(pairs(&class("[a-cb-fg]")), vec![(b'a', b'g')]);
        assert_eq!(pairs(&class("[zyxa]")), vec![(b'a', b'a'), (b'x', b'z')]);
        assert_eq!(pairs(&class(r"[\da-z5]")), vec![(b'0', b'9'), (b'a', b'z')]);
    }

    #[test]
    fn test_class_dash_literals() {
        assert_eq!(pairs(&class("[a-]")), vec![(b'-', b'-'), (b'a', b'a')]);
        assert_eq!(pairs(&class("[-a]")), vec![(b'-', b'-'), (b'a', b'a')]);
        assert_eq!(pairs(&class(r"[\d-]")), vec![(b'-', b'-'), (b'0', b'9')]);
    }

    #[test]
    fn test_class_escapes() {
        assert_eq!(pairs(&class(r"[\]]")), vec![(b']', b']')]);
        assert_eq!(pairs(&class(r"[\t-\r]")), vec![(b'\t', b'\r')]);
        assert_eq!(pairs(&class(r"[\n]")), vec![(b'\n', b'\n')]);
    }

    #[test]
    fn test_class_errors() {
        assert_eq!(err("[abc"), ErrorKind::UnterminatedClass);
        assert_eq!(err("[a-"), ErrorKind::UnterminatedClass);
        assert_eq!(err("[]"), ErrorKind::EmptyClass);
        assert_eq!(err("[^]"), ErrorKind::EmptyClass);
        assert_eq!(err("[z-a]"), ErrorKind::InvalidClassRange);
        assert_eq!(err(r"[a-\d]"), ErrorKind::ShorthandRangeEndpoint);
        assert_eq!(err(r"[\d-z]"), ErrorKind::ShorthandRangeEndpoint);
        assert_eq!(err("[a\\"), ErrorKind::DanglingEscape);
    }

    #[test]
    fn test_close_bracket_first_is_empty_class() {
        assert_eq!(err("[]]"), ErrorKind::EmptyClass);
    }

    #[test]
    fn test_quantifier_forms() {
        let forms = [
            ("a{5}", 5, Some(5)),
            ("a{    5  }", 5, Some(5)),
            ("a{2,4}", 2, Some(4)),
            ("a{ 2 , 4  }", 2, Some(4)),
            ("a{ 10  , }", 10, None),
            ("a{\n 2 \t , \r 3 }", 2, Some(3)),
            ("a{,3}", 0, Some(3)),
            ("a{0,}", 0, None),
        ];
        for (pattern, min, max) in forms {
            assert_eq!(
                kinds(pattern),
                vec![
                    TokenKind::Literal(b'a'),
                    TokenKind::Repeat { min, max },
                    TokenKind::End,
                ],
                "pattern {:?}",
                pattern
            );
        }
    }

    #[test]
    fn test_quantifier_errors() {
        assert_eq!(err("a{}"), ErrorKind::MissingQuantifierNumber);
        assert_eq!(err("a{x}"), ErrorKind::MissingQuantifierNumber);
        assert_eq!(err("a{2,x}"), ErrorKind::MissingQuantifierNumber);
        assert_eq!(err("a{2"), ErrorKind::InvalidQuantifier);
        assert_eq!(err("a{2,3"), ErrorKind::InvalidQuantifier);
        assert_eq!(err("a{2;3}"), ErrorKind::InvalidQuantifier);
        assert_eq!(err("a{3,2}"), ErrorKind::InvalidQuantifierRange);
        assert_eq!(err("a{99999999999}"), ErrorKind::QuantifierTooLarge);
    }

    #[test]
    fn test_quantifier_concat_with_next_atom() {
        use TokenKind::*;
        assert_eq!(
            kinds("a{2,3}b"),
            vec![
                Literal(b'a'),
                Repeat { min: 2, max: Some(3) },
                Concat,
                Literal(b'b'),
                End,
            ]
        );
    }

    #[test]
    fn test_positions() {
        let tokens = Tokenizer::new("a[bc]d").tokenize().unwrap();
        let positions: Vec<usize> = tokens.iter().map(|t| t.pos).collect();
        // a CONCAT [bc] CONCAT d END
        assert_eq!(positions, vec![0, 0, 1, 1, 5, 6]);
    }

    #[test]
    fn test_display() {
        let rendered: Vec<String> = Tokenizer::new("(a)[^x-z]{2,}")
            .tokenize()
            .unwrap()
            .iter()
            .map(|t| t.to_string())
            .collect();
        assert_eq!(
            rendered,
            vec![
                "LPAREN(0)",
                "LITERAL(a)",
                "RPAREN(0)",
                "CONCAT",
                "CHAR_CLASS[^x-z]",
                "QUANTIFIER_RANGE(m=2, n=inf)",
                "END",
            ]
        );
    }
}
