use std::fmt;

use crate::nfa::{State, NFA};
use crate::tokenizer::CharClass;

/// Renders an [`NFA`] in Graphviz DOT format.
///
/// Only states reachable from the start state are emitted, each exactly once,
/// so cyclic automata are fine.
///
/// ```
/// use thompson_nfa::{compile, Dot};
///
/// let nfa = compile("ab*").unwrap().unwrap();
/// let dot = Dot::new(&nfa).to_string();
/// assert!(dot.starts_with("digraph NFA {"));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Dot<'a> {
    nfa: &'a NFA,
}

impl<'a> Dot<'a> {
    pub fn new(nfa: &'a NFA) -> Dot<'a> {
        Dot { nfa }
    }
}

impl fmt::Display for Dot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "digraph NFA {{")?;
        writeln!(f, "  rankdir=LR;")?;
        writeln!(f, "  fontname=\"monospace\";")?;
        writeln!(f, "  node [fontname=\"monospace\"];")?;
        writeln!(f, "  edge [fontname=\"monospace\"];")?;

        for id in self.nfa.reachable() {
            let state = self.nfa.state(id);
            let is_start = id == self.nfa.start();
            let prefix = if is_start { "(START)\\n" } else { "" };
            let shape = match state {
                State::Match => "doublecircle color=green",
                _ if is_start => "doublecircle",
                _ => "circle",
            };
            writeln!(
                f,
                "  s{} [label=\"{}{}\" shape={}];",
                id,
                prefix,
                node_label(state),
                shape
            )?;

            if let Some(next) = state.out() {
                match edge_label(state) {
                    Some(label) => writeln!(f, "  s{} -> s{} [label=\"{}\"];", id, next, label)?,
                    None => writeln!(f, "  s{} -> s{};", id, next)?,
                }
            }
            if let Some(next) = state.out1() {
                writeln!(f, "  s{} -> s{} [label=\"ε\"];", id, next)?;
            }
        }

        writeln!(f, "}}")
    }
}

fn node_label(state: &State) -> String {
    match state {
        State::Char { byte, .. } => format!("CHAR {}", escape_byte(*byte)),
        State::Dot { .. } => "DOT (.)".to_string(),
        State::Class { class, .. } => format!("CHAR_CLASS {}", class_label(class)),
        State::AnchorStart { .. } => "ANCHOR ^".to_string(),
        State::AnchorEnd { .. } => "ANCHOR $".to_string(),
        State::Save { slot, .. } => {
            let side = if slot % 2 == 0 { "start" } else { "end" };
            format!("SAVE {} ({})", slot, side)
        }
        State::Split { .. } => "SPLIT".to_string(),
        State::Match => "MATCH".to_string(),
    }
}

/// Label of the `out` edge. `Dot` edges are unlabeled.
fn edge_label(state: &State) -> Option<String> {
    match state {
        State::Char { byte, .. } => Some(escape_byte(*byte)),
        State::Class { class, .. } => Some(class_label(class)),
        State::Dot { .. } | State::Match => None,
        State::Split { .. }
        | State::Save { .. }
        | State::AnchorStart { .. }
        | State::AnchorEnd { .. } => Some("ε".to_string()),
    }
}

fn class_label(class: &CharClass) -> String {
    let mut label = String::from("[");
    if class.is_negated() {
        label.push('^');
    }
    for range in class.ranges() {
        label.push_str(&escape_byte(range.lo()));
        if range.hi() != range.lo() {
            label.push('-');
            label.push_str(&escape_byte(range.hi()));
        }
    }
    label.push(']');
    label
}

/// Escapes a byte for use inside a double-quoted DOT label. Control and
/// non-ASCII bytes are shown as escapes rather than emitted raw.
fn escape_byte(byte: u8) -> String {
    match byte {
        b'\n' => "\\\\n".to_string(),
        b'\t' => "\\\\t".to_string(),
        b'\r' => "\\\\r".to_string(),
        0x0C => "\\\\f".to_string(),
        0x0B => "\\\\v".to_string(),
        b'\\' => "\\\\".to_string(),
        b'"' => "\\\"".to_string(),
        0x20..=0x7E => (byte as char).to_string(),
        _ => format!("\\\\x{:02X}", byte),
    }
}
