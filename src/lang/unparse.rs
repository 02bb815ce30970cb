//! Render an AST back to Alda source text.
//!
//! Used by the MIDI import path; output favors readability over byte
//! fidelity with whatever source the tree came from.

use super::ast::Node;

/// Render a full score (or any subtree) as Alda source.
pub fn to_alda(node: &Node) -> String {
    let mut out = String::new();
    render(node, &mut out);
    // Drop leading/trailing blank lines introduced by part breaks
    let lines: Vec<&str> = out.lines().map(str::trim_end).collect();
    let mut cleaned: Vec<&str> = Vec::new();
    for line in lines {
        if line.is_empty() && cleaned.last().is_none_or(|l| l.is_empty()) {
            continue;
        }
        cleaned.push(line);
    }
    while cleaned.last().is_some_and(|l| l.is_empty()) {
        cleaned.pop();
    }
    cleaned.join("\n")
}

fn render(node: &Node, out: &mut String) {
    match node {
        Node::Root { children, .. } => {
            for child in children {
                render(child, out);
            }
        }
        Node::PartDecl { names, alias, .. } => {
            out.push('\n');
            out.push_str(&names.join("/"));
            if let Some(alias) = alias {
                out.push_str(&format!(" \"{alias}\""));
            }
            out.push_str(":\n");
        }
        Node::EventSeq { events, .. } => {
            push_events(events, out);
            out.push('\n');
        }
        Node::Note {
            letter,
            accidentals,
            duration,
            slurred,
            ..
        } => {
            out.push(*letter);
            out.push_str(accidentals);
            if let Some(d) = duration {
                render(d, out);
            }
            if *slurred {
                out.push('~');
            }
        }
        Node::Rest { duration, .. } => {
            out.push('r');
            if let Some(d) = duration {
                render(d, out);
            }
        }
        Node::Chord { notes, .. } => {
            for (i, n) in notes.iter().enumerate() {
                if i > 0 {
                    out.push('/');
                }
                render(n, out);
            }
        }
        Node::Barline { .. } => out.push('|'),
        Node::Duration { components, .. } => {
            for (i, c) in components.iter().enumerate() {
                if i > 0 {
                    out.push('~');
                }
                render(c, out);
            }
        }
        Node::NoteLength {
            denominator, dots, ..
        } => {
            out.push_str(&denominator.to_string());
            for _ in 0..*dots {
                out.push('.');
            }
        }
        Node::NoteLengthMs { ms, .. } => out.push_str(&format!("{ms}ms")),
        Node::NoteLengthS { seconds, .. } => {
            if seconds.fract() == 0.0 {
                out.push_str(&format!("{}s", *seconds as u64));
            } else {
                out.push_str(&format!("{seconds}s"));
            }
        }
        Node::OctaveSet { octave, .. } => out.push_str(&format!("o{octave}")),
        Node::OctaveUp { .. } => out.push('>'),
        Node::OctaveDown { .. } => out.push('<'),
        Node::LispList { elements, .. } => {
            out.push('(');
            for (i, e) in elements.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                render(e, out);
            }
            out.push(')');
        }
        Node::LispSymbol { name, .. } => out.push_str(name),
        Node::LispNumber { value, .. } => {
            if value.fract() == 0.0 {
                out.push_str(&format!("{}", *value as i64));
            } else {
                out.push_str(&format!("{value}"));
            }
        }
        Node::LispString { value, .. } => {
            out.push('"');
            for ch in value.chars() {
                if ch == '"' || ch == '\\' {
                    out.push('\\');
                }
                out.push(ch);
            }
            out.push('"');
        }
        Node::VarDef { name, events, .. } => {
            out.push_str(name);
            out.push_str(" = ");
            push_events(events, out);
            out.push('\n');
        }
        Node::VarRef { name, .. } => out.push_str(name),
        Node::Marker { name, .. } => out.push_str(&format!("%{name}")),
        Node::AtMarker { name, .. } => out.push_str(&format!("@{name}")),
        Node::VoiceGroup { voices, .. } => {
            for v in voices {
                render(v, out);
            }
            out.push_str("V0:");
        }
        Node::Voice { number, events, .. } => {
            out.push_str(&format!("V{number}: "));
            push_events(events, out);
            out.push(' ');
        }
        Node::Cram {
            events, duration, ..
        } => {
            out.push('{');
            push_events(events, out);
            out.push('}');
            if let Some(d) = duration {
                render(d, out);
            }
        }
        Node::BracketSeq { events, .. } => {
            out.push('[');
            push_events(events, out);
            out.push(']');
        }
        Node::Repeat { event, count, .. } => {
            render(event, out);
            out.push_str(&format!("*{count}"));
        }
        Node::OnReps { event, reps, .. } => {
            render(event, out);
            out.push('\'');
            for (i, r) in reps.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                match r.last {
                    Some(last) => out.push_str(&format!("{}-{last}", r.first)),
                    None => out.push_str(&r.first.to_string()),
                }
            }
        }
    }
}

fn push_events(events: &[Node], out: &mut String) {
    for (i, e) in events.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        render(e, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang;

    fn roundtrip(source: &str) -> String {
        to_alda(&lang::parse(source, None).unwrap())
    }

    #[test]
    fn render_simple_part() {
        assert_eq!(roundtrip("piano: c d e"), "piano:\nc d e");
    }

    #[test]
    fn render_note_with_accidental_and_dots() {
        assert_eq!(roundtrip("piano: c+4."), "piano:\nc+4.");
    }

    #[test]
    fn render_chord_and_octaves() {
        assert_eq!(roundtrip("piano: o5 c/e/g > c"), "piano:\no5 c/e/g > c");
    }

    #[test]
    fn render_tempo_attribute() {
        assert_eq!(roundtrip("piano: (tempo 90) c"), "piano:\n(tempo 90) c");
    }

    #[test]
    fn render_tied_duration_and_slur() {
        assert_eq!(roundtrip("piano: c1~1 d2~"), "piano:\nc1~1 d2~");
    }

    #[test]
    fn render_cram_and_repeat() {
        assert_eq!(roundtrip("piano: {c d e}4 [c d]*3"), "piano:\n{c d e}4 [c d]*3");
    }

    #[test]
    fn render_on_reps() {
        assert_eq!(roundtrip("piano: [c'1,3-4 d]*4"), "piano:\n[c'1,3-4 d]*4");
    }

    #[test]
    fn render_ms_duration() {
        assert_eq!(roundtrip("piano: c500ms r2s"), "piano:\nc500ms r2s");
    }

    #[test]
    fn rendered_output_reparses() {
        let source = "piano: (tempo 120) o4 c8 d e4. c/e/g r4 {c d e}2";
        let text = roundtrip(source);
        let again = to_alda(&lang::parse(&text, None).unwrap());
        assert_eq!(text, again);
    }
}
