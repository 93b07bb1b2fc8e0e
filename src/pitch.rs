/*
Pitch Conversions
=================

Equal temperament, A4 (MIDI 69) tuned to 440 Hz:

    freq = 440 * 2^((note - 69) / 12)
    note = 69 + 12 * log2(freq / 440)

Names use sharps and scientific octave numbering, so middle C (MIDI 60) is
C4 and MIDI 0 is C-1.
*/

/// Tuning reference (A4)
pub const A4_FREQ: f64 = 440.0;
pub const A4_MIDI: u8 = 69;

const PITCH_CLASSES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

pub fn midi_note_to_freq(note: u8) -> f64 {
    A4_FREQ * 2.0_f64.powf((note as f64 - A4_MIDI as f64) / 12.0)
}

/// Fractional MIDI number for a frequency, `None` unless `freq` is a positive
/// finite number.
pub fn freq_to_midi(freq: f64) -> Option<f64> {
    if !(freq.is_finite() && freq > 0.0) {
        return None;
    }
    Some(A4_MIDI as f64 + 12.0 * (freq / A4_FREQ).log2())
}

pub fn note_name(note: u8) -> String {
    let octave = (note / 12) as i32 - 1;
    format!("{}{}", PITCH_CLASSES[(note % 12) as usize], octave)
}
