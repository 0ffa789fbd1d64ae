use quickcheck::{Arbitrary, Gen, QuickCheck, TestResult};
use thompson_nfa::{Matcher, PostfixConverter, State, TokenKind, Tokenizer};

/// A small regex AST over the alphabet `{a, b}` that always renders to a
/// syntactically valid pattern.
#[derive(Clone, Debug)]
enum Expr {
    Lit(u8),
    Dot,
    Class(&'static str),
    Concat(Box<Expr>, Box<Expr>),
    Alt(Box<Expr>, Box<Expr>),
    Star(Box<Expr>),
    Plus(Box<Expr>),
    Question(Box<Expr>),
    Repeat(Box<Expr>, u32, Option<u32>),
    Group(Box<Expr>),
}

impl Expr {
    fn generate(g: &mut Gen, depth: usize) -> Expr {
        let leaf = depth == 0 || bool::arbitrary(g);
        if leaf {
            return match u8::arbitrary(g) % 3 {
                0 => Expr::Lit(*g.choose(&[b'a', b'b']).unwrap()),
                1 => Expr::Dot,
                _ => Expr::Class(*g.choose(&["[ab]", "[^a]", "[a-b]", "[b]"]).unwrap()),
            };
        }
        let sub = |g: &mut Gen| Box::new(Expr::generate(g, depth - 1));
        match u8::arbitrary(g) % 7 {
            0 => Expr::Concat(sub(g), sub(g)),
            1 => Expr::Alt(sub(g), sub(g)),
            2 => Expr::Star(sub(g)),
            3 => Expr::Plus(sub(g)),
            4 => Expr::Question(sub(g)),
            5 => {
                let min = u32::from(u8::arbitrary(g) % 3);
                let max = if bool::arbitrary(g) {
                    None
                } else {
                    Some(min + u32::from(u8::arbitrary(g) % 2))
                };
                Expr::Repeat(sub(g), min, max)
            }
            _ => Expr::Group(sub(g)),
        }
    }

    fn is_atom(&self) -> bool {
        matches!(self, Expr::Lit(_) | Expr::Dot | Expr::Class(_) | Expr::Group(_))
    }

    fn render(&self) -> String {
        match self {
            Expr::Lit(c) => (*c as char).to_string(),
            Expr::Dot => ".".to_string(),
            Expr::Class(class) => class.to_string(),
            Expr::Concat(a, b) => format!("{}{}", a.render_in_concat(), b.render_in_concat()),
            Expr::Alt(a, b) => format!("{}|{}", a.render(), b.render()),
            Expr::Star(e) => format!("{}*", e.render_operand()),
            Expr::Plus(e) => format!("{}+", e.render_operand()),
            Expr::Question(e) => format!("{}?", e.render_operand()),
            Expr::Repeat(e, min, max) => match max {
                None => format!("{}{{{},}}", e.render_operand(), min),
                Some(max) if max == min => format!("{}{{{}}}", e.render_operand(), min),
                Some(max) => format!("{}{{{},{}}}", e.render_operand(), min, max),
            },
            Expr::Group(e) => format!("({})", e.render()),
        }
    }

    fn render_operand(&self) -> String {
        if self.is_atom() {
            self.render()
        } else {
            format!("({})", self.render())
        }
    }

    fn render_in_concat(&self) -> String {
        match self {
            Expr::Alt(..) => format!("({})", self.render()),
            _ => self.render(),
        }
    }
}

impl Arbitrary for Expr {
    fn arbitrary(g: &mut Gen) -> Expr {
        Expr::generate(g, 4)
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Expr>> {
        let children = match self {
            Expr::Lit(_) | Expr::Dot | Expr::Class(_) => vec![],
            Expr::Concat(a, b) | Expr::Alt(a, b) => vec![(**a).clone(), (**b).clone()],
            Expr::Star(e)
            | Expr::Plus(e)
            | Expr::Question(e)
            | Expr::Repeat(e, ..)
            | Expr::Group(e) => vec![(**e).clone()],
        };
        Box::new(children.into_iter())
    }
}

/// Every string over `{a, b}` of length at most `len`.
fn haystacks(len: usize) -> Vec<String> {
    let mut all = vec![String::new()];
    let mut frontier = vec![String::new()];
    for _ in 0..len {
        let mut next = Vec::new();
        for s in &frontier {
            for c in ['a', 'b'] {
                let mut t = s.clone();
                t.push(c);
                next.push(t);
            }
        }
        all.extend(next.iter().cloned());
        frontier = next;
    }
    all
}

fn check(prop: fn(Expr) -> TestResult) {
    crate::init_logger();
    QuickCheck::new().tests(300).quickcheck(prop);
}

#[test]
fn generated_patterns_compile_completely() {
    fn prop(expr: Expr) -> TestResult {
        let pattern = expr.render();
        let nfa = match thompson_nfa::compile(&pattern) {
            Ok(Some(nfa)) => nfa,
            other => return TestResult::error(format!("{:?}: {:?}", pattern, other)),
        };
        for id in nfa.reachable() {
            let state = nfa.state(id);
            let dangling = match state {
                State::Match => false,
                State::Split { out, out1 } => out.is_none() || out1.is_none(),
                _ => state.out().is_none(),
            };
            if dangling {
                return TestResult::error(format!("{:?}: unset transition on {}", pattern, state));
            }
        }
        TestResult::passed()
    }
    check(prop);
}

#[test]
fn concat_between_adjacent_units_only() {
    fn ends_unit(kind: &TokenKind) -> bool {
        matches!(
            kind,
            TokenKind::Literal(_)
                | TokenKind::Dot
                | TokenKind::Class(_)
                | TokenKind::RParen(_)
                | TokenKind::Caret
        ) || kind.is_quantifier()
    }

    fn begins_unit(kind: &TokenKind) -> bool {
        matches!(
            kind,
            TokenKind::Literal(_)
                | TokenKind::Dot
                | TokenKind::Class(_)
                | TokenKind::LParen(_)
                | TokenKind::Dollar
        )
    }

    fn prop(expr: Expr) -> TestResult {
        let pattern = expr.render();
        let tokens = match Tokenizer::new(&pattern).tokenize() {
            Ok(tokens) => tokens,
            Err(err) => return TestResult::error(format!("{:?}: {}", pattern, err)),
        };
        let stripped: Vec<&TokenKind> = tokens
            .iter()
            .map(|t| &t.kind)
            .filter(|k| !matches!(k, TokenKind::Concat))
            .collect();
        let concat = TokenKind::Concat;
        let mut expected = Vec::new();
        for pair in stripped.windows(2) {
            expected.push(pair[0]);
            if ends_unit(pair[0]) && begins_unit(pair[1]) {
                expected.push(&concat);
            }
        }
        expected.extend(stripped.last().copied());

        let actual: Vec<&TokenKind> = tokens.iter().map(|t| &t.kind).collect();
        TestResult::from_bool(actual == expected)
    }
    check(prop);
}

#[test]
fn conversion_is_deterministic() {
    fn prop(expr: Expr) -> TestResult {
        let pattern = expr.render();
        let infix = match Tokenizer::new(&pattern).tokenize() {
            Ok(infix) => infix,
            Err(err) => return TestResult::error(format!("{:?}: {}", pattern, err)),
        };
        let first = PostfixConverter::convert(&infix);
        let second = PostfixConverter::convert(&infix);
        TestResult::from_bool(first.is_ok() && first == second)
    }
    check(prop);
}

#[test]
fn agrees_with_regex_crate() {
    fn prop(expr: Expr) -> TestResult {
        let pattern = expr.render();
        let nfa = match thompson_nfa::compile(&pattern) {
            Ok(Some(nfa)) => nfa,
            other => return TestResult::error(format!("{:?}: {:?}", pattern, other)),
        };
        let full = regex::Regex::new(&format!("^(?:{})$", pattern)).unwrap();
        let partial = regex::Regex::new(&pattern).unwrap();
        let matcher = Matcher::new(&nfa);

        for haystack in haystacks(5) {
            if matcher.is_match(&haystack) != full.is_match(&haystack) {
                return TestResult::error(format!(
                    "{:?} on {:?}: expected is_match = {}",
                    pattern,
                    haystack,
                    full.is_match(&haystack)
                ));
            }
            let found = matcher.find(&haystack);
            if found.is_some() != partial.is_match(&haystack) {
                return TestResult::error(format!("{:?} on {:?}: find disagrees", pattern, haystack));
            }
            if let Some(m) = found {
                if !full.is_match(&haystack[m.range()]) {
                    return TestResult::error(format!(
                        "{:?} on {:?}: {:?} is not a match",
                        pattern, haystack, m
                    ));
                }
            }
        }
        TestResult::passed()
    }
    check(prop);
}
