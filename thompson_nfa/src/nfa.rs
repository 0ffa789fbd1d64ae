use std::fmt;

use crate::tokenizer::CharClass;

/// A state ID in the NFA
pub type StateId = usize;

/// A Thompson NFA state.
///
/// Transitions are `None` while the automaton is under construction and are
/// patched as fragments get connected. In a finished [`NFA`] every
/// transition reachable from the start state is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    /// Consumes exactly `byte`.
    Char { byte: u8, out: Option<StateId> },
    /// Consumes any byte.
    Dot { out: Option<StateId> },
    /// Consumes one byte matched by `class`.
    Class { class: CharClass, out: Option<StateId> },
    /// Zero-width assertion that the position is the start of the input.
    AnchorStart { out: Option<StateId> },
    /// Zero-width assertion that the position is the end of the input.
    AnchorEnd { out: Option<StateId> },
    /// Records the current position in capture slot `slot`. Even slots open
    /// group `slot / 2`, odd slots close it.
    Save { slot: usize, out: Option<StateId> },
    /// Epsilon transition to both `out` and `out1`. `out` has priority.
    Split {
        out: Option<StateId>,
        out1: Option<StateId>,
    },
    /// Match state (accepting)
    Match,
}

impl State {
    /// The primary transition, if this state has one and it is set.
    pub fn out(&self) -> Option<StateId> {
        match *self {
            State::Char { out, .. }
            | State::Dot { out }
            | State::Class { out, .. }
            | State::AnchorStart { out }
            | State::AnchorEnd { out }
            | State::Save { out, .. }
            | State::Split { out, .. } => out,
            State::Match => None,
        }
    }

    /// The secondary transition. Only `Split` states have one.
    pub fn out1(&self) -> Option<StateId> {
        match *self {
            State::Split { out1, .. } => out1,
            _ => None,
        }
    }

    /// Whether following this state consumes no input.
    pub fn is_epsilon(&self) -> bool {
        matches!(
            self,
            State::Split { .. } | State::Save { .. } | State::AnchorStart { .. } | State::AnchorEnd { .. }
        )
    }

    /// Returns the transition field named by `slot`, or `None` if this state
    /// has no such transition.
    pub(crate) fn slot_mut(&mut self, slot: Slot) -> Option<&mut Option<StateId>> {
        match (self, slot) {
            (
                State::Char { out, .. }
                | State::Dot { out }
                | State::Class { out, .. }
                | State::AnchorStart { out }
                | State::AnchorEnd { out }
                | State::Save { out, .. }
                | State::Split { out, .. },
                Slot::Primary,
            ) => Some(out),
            (State::Split { out1, .. }, Slot::Secondary) => Some(out1),
            _ => None,
        }
    }

    /// A copy of this state with the same payload and no transitions.
    pub(crate) fn unlinked(&self) -> State {
        match self {
            State::Char { byte, .. } => State::Char { byte: *byte, out: None },
            State::Dot { .. } => State::Dot { out: None },
            State::Class { class, .. } => State::Class { class: class.clone(), out: None },
            State::AnchorStart { .. } => State::AnchorStart { out: None },
            State::AnchorEnd { .. } => State::AnchorEnd { out: None },
            State::Save { slot, .. } => State::Save { slot: *slot, out: None },
            State::Split { .. } => State::Split { out: None, out1: None },
            State::Match => State::Match,
        }
    }
}

struct Target(Option<StateId>);

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(id) => write!(f, "{}", id),
            None => write!(f, "?"),
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Char { byte, out } => {
                write!(f, "char('{}') => {}", byte.escape_ascii(), Target(*out))
            }
            State::Dot { out } => write!(f, "dot => {}", Target(*out)),
            State::Class { class, out } => write!(f, "class({}) => {}", class, Target(*out)),
            State::AnchorStart { out } => write!(f, "anchor(^) => {}", Target(*out)),
            State::AnchorEnd { out } => write!(f, "anchor($) => {}", Target(*out)),
            State::Save { slot, out } => write!(f, "save({}) => {}", slot, Target(*out)),
            State::Split { out, out1 } => {
                write!(f, "split({}, {})", Target(*out), Target(*out1))
            }
            State::Match => write!(f, "MATCH"),
        }
    }
}

/// Which transition of a state an [`Exit`] refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    /// `out`
    Primary,
    /// `out1`, only present on `Split` states.
    Secondary,
}

/// A dangling transition of a fragment: the location of a transition that
/// still has to be patched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Exit {
    pub state: StateId,
    pub slot: Slot,
}

impl Exit {
    pub fn primary(state: StateId) -> Exit {
        Exit { state, slot: Slot::Primary }
    }

    pub fn secondary(state: StateId) -> Exit {
        Exit { state, slot: Slot::Secondary }
    }
}

/// Fragment of an NFA: an entry state and its unpatched exits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub start: StateId,
    pub exits: Vec<Exit>,
}

impl Fragment {
    pub fn new(start: StateId, exits: Vec<Exit>) -> Fragment {
        Fragment { start, exits }
    }

    /// A fragment made of one state whose only exit is its `out`.
    pub fn single(start: StateId) -> Fragment {
        Fragment::new(start, vec![Exit::primary(start)])
    }
}

/// Depth-first traversal from `start` that visits every reachable state once,
/// following `out` before `out1`. Returns state IDs in visit order.
pub(crate) fn reachable(states: &[State], start: StateId) -> Vec<StateId> {
    let mut seen = vec![false; states.len()];
    let mut order = Vec::new();
    let mut stack = vec![start];
    while let Some(id) = stack.pop() {
        if seen[id] {
            continue;
        }
        seen[id] = true;
        order.push(id);
        let state = &states[id];
        if let Some(next) = state.out1() {
            stack.push(next);
        }
        if let Some(next) = state.out() {
            stack.push(next);
        }
    }
    order
}

/// A Thompson NFA.
///
/// The NFA owns every state allocated while it was built. States are
/// addressed by [`StateId`], an index into [`NFA::states`]. The graph may
/// contain cycles, introduced by `*`, `+` and `{m,}`.
#[derive(Clone)]
pub struct NFA {
    states: Vec<State>,
    start: StateId,
    match_state: StateId,
}

impl NFA {
    pub(crate) fn new(states: Vec<State>, start: StateId, match_state: StateId) -> NFA {
        NFA { states, start, match_state }
    }

    /// The start state.
    pub fn start(&self) -> StateId {
        self.start
    }

    /// The single accepting state.
    pub fn match_state(&self) -> StateId {
        self.match_state
    }

    /// Returns the state with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a state of this NFA.
    pub fn state(&self, id: StateId) -> &State {
        &self.states[id]
    }

    /// All states, including any that construction left unreachable.
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// The total number of states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Always false: a finished NFA has at least its match state.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// IDs of the states reachable from the start state, in depth-first
    /// order.
    pub fn reachable(&self) -> Vec<StateId> {
        reachable(&self.states, self.start)
    }

    /// The number of capture groups, derived from the highest group index of
    /// any `Save` state.
    pub fn group_count(&self) -> usize {
        self.states
            .iter()
            .filter_map(|s| match *s {
                State::Save { slot, .. } => Some(slot / 2 + 1),
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }
}

impl fmt::Debug for NFA {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "thompson_nfa::NFA(")?;
        for (id, state) in self.states.iter().enumerate() {
            let marker = if id == self.start {
                '>'
            } else if id == self.match_state {
                '^'
            } else {
                ' '
            };
            writeln!(f, "{}{:06}: {}", marker, id, state)?;
        }
        write!(f, ")")
    }
}
