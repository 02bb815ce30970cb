//! General MIDI instrument table.
//!
//! Maps lowercase hyphenated instrument names to GM program numbers
//! (0-127) and back. Channel 10 percussion is a pseudo-instrument with no
//! program number of its own.

/// GM programs in order; index = program number.
const GM_PROGRAMS: [&str; 128] = [
    "acoustic-grand-piano",
    "bright-acoustic-piano",
    "electric-grand-piano",
    "honky-tonk-piano",
    "electric-piano-1",
    "electric-piano-2",
    "harpsichord",
    "clavinet",
    "celesta",
    "glockenspiel",
    "music-box",
    "vibraphone",
    "marimba",
    "xylophone",
    "tubular-bells",
    "dulcimer",
    "drawbar-organ",
    "percussive-organ",
    "rock-organ",
    "church-organ",
    "reed-organ",
    "accordion",
    "harmonica",
    "tango-accordion",
    "acoustic-guitar-nylon",
    "acoustic-guitar-steel",
    "electric-guitar-jazz",
    "electric-guitar-clean",
    "electric-guitar-muted",
    "overdriven-guitar",
    "distortion-guitar",
    "guitar-harmonics",
    "acoustic-bass",
    "electric-bass-finger",
    "electric-bass-pick",
    "fretless-bass",
    "slap-bass-1",
    "slap-bass-2",
    "synth-bass-1",
    "synth-bass-2",
    "violin",
    "viola",
    "cello",
    "contrabass",
    "tremolo-strings",
    "pizzicato-strings",
    "orchestral-harp",
    "timpani",
    "string-ensemble-1",
    "string-ensemble-2",
    "synth-strings-1",
    "synth-strings-2",
    "choir-aahs",
    "voice-oohs",
    "synth-voice",
    "orchestra-hit",
    "trumpet",
    "trombone",
    "tuba",
    "muted-trumpet",
    "french-horn",
    "brass-section",
    "synth-brass-1",
    "synth-brass-2",
    "soprano-sax",
    "alto-sax",
    "tenor-sax",
    "baritone-sax",
    "oboe",
    "english-horn",
    "bassoon",
    "clarinet",
    "piccolo",
    "flute",
    "recorder",
    "pan-flute",
    "blown-bottle",
    "shakuhachi",
    "whistle",
    "ocarina",
    "lead-1-square",
    "lead-2-sawtooth",
    "lead-3-calliope",
    "lead-4-chiff",
    "lead-5-charang",
    "lead-6-voice",
    "lead-7-fifths",
    "lead-8-bass-and-lead",
    "pad-1-new-age",
    "pad-2-warm",
    "pad-3-polysynth",
    "pad-4-choir",
    "pad-5-bowed",
    "pad-6-metallic",
    "pad-7-halo",
    "pad-8-sweep",
    "fx-1-rain",
    "fx-2-soundtrack",
    "fx-3-crystal",
    "fx-4-atmosphere",
    "fx-5-brightness",
    "fx-6-goblins",
    "fx-7-echoes",
    "fx-8-sci-fi",
    "sitar",
    "banjo",
    "shamisen",
    "koto",
    "kalimba",
    "bagpipes",
    "fiddle",
    "shanai",
    "tinkle-bell",
    "agogo",
    "steel-drums",
    "woodblock",
    "taiko-drum",
    "melodic-tom",
    "synth-drum",
    "reverse-cymbal",
    "guitar-fret-noise",
    "breath-noise",
    "seashore",
    "bird-tweet",
    "telephone-ring",
    "helicopter",
    "applause",
    "gunshot",
];

/// Shorthand names accepted in scores.
const ALIASES: [(&str, u8); 9] = [
    ("piano", 0),
    ("organ", 19),
    ("guitar", 24),
    ("electric-guitar", 27),
    ("upright-bass", 32),
    ("electric-bass", 33),
    ("bass", 32),
    ("strings", 48),
    ("sax", 65),
];

/// Channel-10 percussion pseudo-instruments.
const PERCUSSION_NAMES: [&str; 2] = ["midi-percussion", "percussion"];

fn normalize(name: &str) -> String {
    name.to_lowercase().replace('_', "-")
}

/// Look up a GM program number by instrument name.
pub fn program_for(name: &str) -> Option<u8> {
    let normalized = normalize(name);
    if let Some(i) = GM_PROGRAMS.iter().position(|&n| n == normalized) {
        return Some(i as u8);
    }
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == normalized)
        .map(|&(_, program)| program)
}

/// True if the name addresses the channel-10 percussion kit.
pub fn is_percussion(name: &str) -> bool {
    PERCUSSION_NAMES.contains(&normalize(name).as_str())
}

/// Canonical name for a GM program number, for MIDI import.
pub fn instrument_for(program: u8) -> &'static str {
    GM_PROGRAMS[(program & 0x7F) as usize]
}
