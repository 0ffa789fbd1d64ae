use std::collections::HashMap;

use crate::{
    compiler::Config,
    nfa::{self, Exit, Fragment, Slot, State, StateId, NFA},
    tokenizer::{Token, TokenKind},
    CompileError, CompileResult, ErrorKind,
};

/// Builds a Thompson NFA from a postfix token stream.
///
/// The builder evaluates the postfix stream as a stack machine: operands push
/// a fragment, operators pop their operands and push the combined fragment.
/// Every state lives in the builder's arena and is handed over to the
/// finished [`NFA`].
#[derive(Debug)]
pub struct NfaBuilder {
    states: Vec<State>,
    config: Config,
    /// Pattern offset of the token being processed, for error reporting.
    pos: usize,
}

impl NfaBuilder {
    /// Create a new builder with the default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a new builder that allocates states under `config`.
    pub fn with_config(config: Config) -> Self {
        Self {
            states: Vec::new(),
            config,
            pos: 0,
        }
    }

    /// Build an NFA from postfix tokens and return it, or `None` if the
    /// stream is empty.
    ///
    /// The stream must have been accepted by the
    /// [`PostfixConverter`](crate::PostfixConverter). A stream that breaks
    /// its guarantees yields an [`ErrorKind::Internal`] error; a state limit
    /// in the configuration may yield [`ErrorKind::TooComplex`].
    pub fn build(mut self, postfix: &[Token]) -> CompileResult<Option<NFA>> {
        let mut stack: Vec<Fragment> = Vec::new();
        // Stack index of the opening SAVE fragment of each unclosed group.
        let mut groups: Vec<usize> = Vec::new();

        for token in postfix {
            self.pos = token.pos;
            // Operators inside a group must not consume the group's opening
            // SAVE fragment.
            let floor = groups.last().map_or(0, |&open| open + 1);
            let frag = match &token.kind {
                TokenKind::Literal(byte) => self.atom(State::Char { byte: *byte, out: None })?,
                TokenKind::Dot => self.atom(State::Dot { out: None })?,
                TokenKind::Class(class) => self.atom(State::Class {
                    class: class.clone(),
                    out: None,
                })?,
                TokenKind::Caret => self.atom(State::AnchorStart { out: None })?,
                TokenKind::Dollar => self.atom(State::AnchorEnd { out: None })?,
                TokenKind::LParen(group) => {
                    groups.push(stack.len());
                    self.atom(State::Save {
                        slot: *group as usize * 2,
                        out: None,
                    })?
                }
                TokenKind::RParen(group) => {
                    let open_at = groups.pop().ok_or_else(|| self.malformed())?;
                    let inner = stack.split_off(open_at + 1);
                    let open = stack.pop().ok_or_else(|| self.malformed())?;
                    let inner = self.concat_all(inner);
                    let close = self.atom(State::Save {
                        slot: *group as usize * 2 + 1,
                        out: None,
                    })?;
                    self.group(open, inner, close)
                }
                TokenKind::Concat => {
                    let e2 = self.pop(&mut stack, floor)?;
                    let e1 = self.pop(&mut stack, floor)?;
                    self.concat(e1, e2)
                }
                TokenKind::Alternation => {
                    let e2 = self.pop(&mut stack, floor)?;
                    let e1 = self.pop(&mut stack, floor)?;
                    self.alternate(e1, e2)?
                }
                TokenKind::Star => {
                    let e = self.pop(&mut stack, floor)?;
                    self.star(e)?
                }
                TokenKind::Plus => {
                    let e = self.pop(&mut stack, floor)?;
                    self.plus(e)?
                }
                TokenKind::Question => {
                    let e = self.pop(&mut stack, floor)?;
                    self.question(e)?
                }
                TokenKind::Repeat { min, max } => {
                    let e = self.pop(&mut stack, floor)?;
                    self.repeat(e, *min, *max)?
                }
                TokenKind::End => continue,
            };
            stack.push(frag);
        }
        if !groups.is_empty() {
            return Err(self.malformed());
        }

        // Anything left over is implicitly concatenated.
        let frag = match self.concat_all(stack) {
            Some(frag) => frag,
            None => return Ok(None),
        };
        let match_state = self.add_state(State::Match)?;
        self.patch(&frag, match_state);
        debug!(
            "built NFA with {} states, {} reachable",
            self.states.len(),
            nfa::reachable(&self.states, frag.start).len()
        );
        Ok(Some(NFA::new(self.states, frag.start, match_state)))
    }

    /// Add a new state and return its ID
    pub fn add_state(&mut self, state: State) -> CompileResult<StateId> {
        if let Some(limit) = self.config.get_size_limit() {
            if self.states.len() >= limit {
                return Err(CompileError::new(ErrorKind::TooComplex, self.pos));
            }
        }
        let id = self.states.len();
        self.states.push(state);
        Ok(id)
    }

    /// Returns the state with the given ID.
    pub fn state(&self, id: StateId) -> &State {
        &self.states[id]
    }

    /// Point every still-unset exit of `frag` at `target`. Exits that have
    /// been set in the meantime are left alone.
    pub fn patch(&mut self, frag: &Fragment, target: StateId) {
        self.patch_exits(&frag.exits, target);
    }

    fn patch_exits(&mut self, exits: &[Exit], target: StateId) {
        for exit in exits {
            if let Some(slot) = self.states[exit.state].slot_mut(exit.slot) {
                if slot.is_none() {
                    *slot = Some(target);
                }
            }
        }
    }

    /// Deep copy the sub-automaton of `frag`.
    ///
    /// Every state reachable from `frag.start` is copied exactly once, so
    /// loops and shared successors inside the fragment are reproduced rather
    /// than aliased. `Match` states are not copied. The exits of the copy are
    /// found by scanning it for unset transitions.
    pub fn copy_fragment(&mut self, frag: &Fragment) -> CompileResult<Fragment> {
        let mut old_to_new: HashMap<StateId, StateId> = HashMap::new();
        let mut order = Vec::new();
        let mut stack = vec![frag.start];
        while let Some(old) = stack.pop() {
            if old_to_new.contains_key(&old) || matches!(self.states[old], State::Match) {
                continue;
            }
            let copy = self.states[old].unlinked();
            let new = self.add_state(copy)?;
            old_to_new.insert(old, new);
            order.push(old);
            let state = &self.states[old];
            stack.extend(state.out1());
            stack.extend(state.out());
        }

        let remap = |id: StateId| old_to_new.get(&id).copied().unwrap_or(id);
        for &old in &order {
            let out = self.states[old].out().map(remap);
            let out1 = self.states[old].out1().map(remap);
            let new = remap(old);
            if let Some(slot) = self.states[new].slot_mut(Slot::Primary) {
                *slot = out;
            }
            if let Some(slot) = self.states[new].slot_mut(Slot::Secondary) {
                *slot = out1;
            }
        }

        let start = remap(frag.start);
        let exits = self.unset_exits(start);
        Ok(Fragment::new(start, exits))
    }

    /// Every unset transition reachable from `start`.
    fn unset_exits(&self, start: StateId) -> Vec<Exit> {
        let mut exits = Vec::new();
        for id in nfa::reachable(&self.states, start) {
            match self.states[id] {
                State::Match => {}
                State::Split { out, out1 } => {
                    if out.is_none() {
                        exits.push(Exit::primary(id));
                    }
                    if out1.is_none() {
                        exits.push(Exit::secondary(id));
                    }
                }
                ref state => {
                    if state.out().is_none() {
                        exits.push(Exit::primary(id));
                    }
                }
            }
        }
        exits
    }

    fn malformed(&self) -> CompileError {
        CompileError::new(
            ErrorKind::Internal("malformed postfix stream".to_string()),
            self.pos,
        )
    }

    fn pop(&self, stack: &mut Vec<Fragment>, floor: usize) -> CompileResult<Fragment> {
        if stack.len() <= floor {
            return Err(self.malformed());
        }
        stack.pop().ok_or_else(|| self.malformed())
    }

    /// A single-state fragment.
    fn atom(&mut self, state: State) -> CompileResult<Fragment> {
        Ok(Fragment::single(self.add_state(state)?))
    }

    /// A fragment that matches the empty string: a split whose two
    /// transitions are both exits.
    fn empty(&mut self) -> CompileResult<Fragment> {
        let s = self.add_state(State::Split { out: None, out1: None })?;
        Ok(Fragment::new(s, vec![Exit::primary(s), Exit::secondary(s)]))
    }

    fn concat(&mut self, e1: Fragment, e2: Fragment) -> Fragment {
        self.patch(&e1, e2.start);
        Fragment::new(e1.start, e2.exits)
    }

    /// Chain `frags` left to right. Returns `None` if there are none.
    fn concat_all(&mut self, frags: Vec<Fragment>) -> Option<Fragment> {
        let mut frags = frags.into_iter();
        let first = frags.next()?;
        Some(frags.fold(first, |acc, next| self.concat(acc, next)))
    }

    fn alternate(&mut self, e1: Fragment, e2: Fragment) -> CompileResult<Fragment> {
        let s = self.add_state(State::Split {
            out: Some(e1.start),
            out1: Some(e2.start),
        })?;
        let mut exits = e1.exits;
        exits.extend(e2.exits);
        Ok(Fragment::new(s, exits))
    }

    fn star(&mut self, e: Fragment) -> CompileResult<Fragment> {
        let s = self.add_state(State::Split {
            out: Some(e.start),
            out1: None,
        })?;
        self.patch(&e, s);
        Ok(Fragment::new(s, vec![Exit::secondary(s)]))
    }

    fn plus(&mut self, e: Fragment) -> CompileResult<Fragment> {
        let s = self.add_state(State::Split {
            out: Some(e.start),
            out1: None,
        })?;
        self.patch(&e, s);
        Ok(Fragment::new(e.start, vec![Exit::secondary(s)]))
    }

    fn question(&mut self, e: Fragment) -> CompileResult<Fragment> {
        let s = self.add_state(State::Split {
            out: Some(e.start),
            out1: None,
        })?;
        let mut exits = e.exits;
        exits.push(Exit::secondary(s));
        Ok(Fragment::new(s, exits))
    }

    /// Wrap a group body between its opening and closing SAVE states.
    fn group(&mut self, open: Fragment, inner: Option<Fragment>, close: Fragment) -> Fragment {
        match inner {
            Some(inner) => {
                self.patch(&open, inner.start);
                self.patch(&inner, close.start);
            }
            None => self.patch(&open, close.start),
        }
        Fragment::new(open.start, close.exits)
    }

    /// Expand `e{min,max}` into `min` chained instances of `e` followed by
    /// either a looping instance (unbounded) or `max - min` optional ones.
    fn repeat(&mut self, e: Fragment, min: u32, max: Option<u32>) -> CompileResult<Fragment> {
        let optional = match max {
            None => 1,
            Some(max) => max.saturating_sub(min) as usize,
        };
        let total = (min as usize).saturating_add(optional);
        trace!("expanding {{{},{:?}}} into {} instances", min, max, total);
        if total == 0 {
            return self.empty();
        }

        if let Some(limit) = self.config.get_size_limit() {
            // Every copy duplicates all of the operand's states, and every
            // optional or looping instance adds a SPLIT.
            let operand = nfa::reachable(&self.states, e.start).len();
            let needed = operand
                .saturating_mul(total - 1)
                .saturating_add(optional)
                .saturating_add(self.states.len());
            if needed > limit {
                return Err(CompileError::new(ErrorKind::TooComplex, self.pos));
            }
        }

        // Copies are made before `e` is patched, so each one duplicates the
        // operand and nothing else.
        let mut instances = vec![e];
        for _ in 1..total {
            let copy = self.copy_fragment(&instances[0])?;
            instances.push(copy);
        }
        let tail = instances.split_off(min as usize);

        let mandatory = match self.concat_all(instances) {
            Some(frag) => frag,
            None => self.empty()?,
        };

        if max.is_none() {
            let mut frag = mandatory;
            for body in tail {
                let s = self.add_state(State::Split {
                    out: Some(body.start),
                    out1: None,
                })?;
                self.patch(&body, s);
                self.patch(&frag, s);
                frag = Fragment::new(frag.start, vec![Exit::secondary(s)]);
            }
            return Ok(frag);
        }

        let mut exits = Vec::new();
        let mut running = mandatory.exits;
        for body in tail {
            let s = self.add_state(State::Split {
                out: Some(body.start),
                out1: None,
            })?;
            self.patch_exits(&running, s);
            exits.push(Exit::secondary(s));
            running = body.exits;
        }
        exits.extend(running);
        Ok(Fragment::new(mandatory.start, exits))
    }
}

impl Default for NfaBuilder {
    fn default() -> Self {
        Self::new()
    }
}
