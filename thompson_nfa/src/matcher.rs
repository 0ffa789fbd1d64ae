use std::ops::Range;

use crate::nfa::{State, StateId, NFA};

/// A matcher that simulates a Thompson NFA against input.
///
/// This is a Pike VM: it advances every live thread in lock step, one byte
/// at a time, so its running time is linear in the input for a fixed NFA.
/// Threads are kept in priority order, which gives leftmost-first semantics
/// with greedy quantifiers.
#[derive(Clone, Debug)]
pub struct Matcher<'a> {
    nfa: &'a NFA,
    /// Two slots for the whole match followed by two per capture group.
    slot_len: usize,
}

/// The span of a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Match {
    pub start: usize,
    pub end: usize,
}

impl Match {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// The overall match and the span of every capture group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Captures {
    whole: Match,
    slots: Vec<Option<usize>>,
}

impl Captures {
    /// The span of the overall match.
    pub fn get_match(&self) -> Match {
        self.whole
    }

    /// The span of capture group `index`, or `None` if the group did not
    /// participate in the match.
    pub fn group(&self, index: usize) -> Option<Match> {
        let start = (*self.slots.get(index * 2)?)?;
        let end = (*self.slots.get(index * 2 + 1)?)?;
        Some(Match { start, end })
    }

    /// The number of capture groups in the pattern.
    pub fn group_len(&self) -> usize {
        self.slots.len() / 2
    }
}

#[derive(Debug)]
struct Thread {
    state: StateId,
    slots: Vec<Option<usize>>,
}

/// The threads of one simulation step.
///
/// A state is added at most once per step. `seen` stamps each state with the
/// generation in which it was last visited, so clearing the list is O(1).
#[derive(Debug)]
struct ThreadList {
    threads: Vec<Thread>,
    seen: Vec<usize>,
    generation: usize,
}

impl ThreadList {
    fn new(states: usize) -> ThreadList {
        ThreadList {
            threads: Vec::new(),
            seen: vec![0; states],
            generation: 1,
        }
    }

    fn clear(&mut self) {
        self.threads.clear();
        self.generation += 1;
    }

    /// Marks `id` as visited. Returns false if it already was in this step.
    fn visit(&mut self, id: StateId) -> bool {
        if self.seen[id] == self.generation {
            return false;
        }
        self.seen[id] = self.generation;
        true
    }
}

impl<'a> Matcher<'a> {
    /// Create a new matcher for the given NFA
    pub fn new(nfa: &'a NFA) -> Self {
        Self {
            nfa,
            slot_len: 2 + nfa.group_count() * 2,
        }
    }

    /// Check if the entire input matches
    pub fn is_match<H: AsRef<[u8]>>(&self, haystack: H) -> bool {
        self.search(haystack.as_ref(), 0, true).is_some()
    }

    /// Find the leftmost match in the input
    pub fn find<H: AsRef<[u8]>>(&self, haystack: H) -> Option<Match> {
        self.search(haystack.as_ref(), 0, false)
            .map(|caps| caps.get_match())
    }

    /// Find the leftmost match and the spans of its capture groups.
    pub fn captures<H: AsRef<[u8]>>(&self, haystack: H) -> Option<Captures> {
        self.search(haystack.as_ref(), 0, false)
    }

    /// Find all non-overlapping matches, left to right. After an empty match
    /// the search resumes one byte further.
    pub fn find_all<H: AsRef<[u8]>>(&self, haystack: H) -> Vec<Match> {
        let haystack = haystack.as_ref();
        let mut matches = Vec::new();
        let mut start = 0;

        while start <= haystack.len() {
            let m = match self.search(haystack, start, false) {
                Some(caps) => caps.get_match(),
                None => break,
            };
            matches.push(m);
            start = if m.is_empty() { m.end + 1 } else { m.end };
        }

        matches
    }

    /// Runs the simulation from offset `from`.
    ///
    /// When `full` is set, only a thread that starts at `from` and reaches
    /// `Match` at the end of the haystack counts. Otherwise a new thread is
    /// started at every offset until some thread matches, and the search
    /// keeps going only as long as higher priority threads are alive.
    fn search(&self, haystack: &[u8], from: usize, full: bool) -> Option<Captures> {
        let mut clist = ThreadList::new(self.nfa.len());
        let mut nlist = ThreadList::new(self.nfa.len());
        let mut matched: Option<(Match, Vec<Option<usize>>)> = None;

        for at in from..=haystack.len() {
            if matched.is_none() && (!full || at == from) {
                let mut slots = vec![None; self.slot_len];
                slots[0] = Some(at);
                self.add_thread(&mut clist, self.nfa.start(), slots, haystack, at);
            }
            if clist.threads.is_empty() && (matched.is_some() || full) {
                break;
            }

            let byte = haystack.get(at).copied();
            nlist.clear();
            for thread in clist.threads.drain(..) {
                let next = match *self.nfa.state(thread.state) {
                    State::Match => {
                        if full && at != haystack.len() {
                            continue;
                        }
                        let start = thread.slots[0].unwrap_or(at);
                        matched = Some((Match { start, end: at }, thread.slots));
                        // Lower priority threads are cut off.
                        break;
                    }
                    State::Char { byte: b, out } if byte == Some(b) => out,
                    State::Dot { out } if byte.is_some() => out,
                    State::Class { ref class, out } if byte.map_or(false, |b| class.matches(b)) => {
                        out
                    }
                    _ => None,
                };
                if let Some(next) = next {
                    self.add_thread(&mut nlist, next, thread.slots, haystack, at + 1);
                }
            }
            std::mem::swap(&mut clist, &mut nlist);
        }

        matched.map(|(whole, slots)| Captures {
            whole,
            slots: slots[2..].to_vec(),
        })
    }

    /// Adds the thread at `start` to `list`, following epsilon transitions.
    ///
    /// `out` is explored before `out1`, so threads land in the list in
    /// priority order. Anchors are checked against `at` and consume nothing.
    fn add_thread(
        &self,
        list: &mut ThreadList,
        start: StateId,
        slots: Vec<Option<usize>>,
        haystack: &[u8],
        at: usize,
    ) {
        let mut stack = vec![(start, slots)];
        while let Some((id, mut slots)) = stack.pop() {
            if !list.visit(id) {
                continue;
            }
            match *self.nfa.state(id) {
                State::Split { out, out1 } => {
                    if let Some(next) = out1 {
                        stack.push((next, slots.clone()));
                    }
                    if let Some(next) = out {
                        stack.push((next, slots));
                    }
                }
                State::Save { slot, out } => {
                    if let Some(s) = slots.get_mut(slot + 2) {
                        *s = Some(at);
                    }
                    stack.extend(out.map(|next| (next, slots)));
                }
                State::AnchorStart { out } => {
                    if at == 0 {
                        stack.extend(out.map(|next| (next, slots)));
                    }
                }
                State::AnchorEnd { out } => {
                    if at == haystack.len() {
                        stack.extend(out.map(|next| (next, slots)));
                    }
                }
                _ => list.threads.push(Thread { state: id, slots }),
            }
        }
    }
}
