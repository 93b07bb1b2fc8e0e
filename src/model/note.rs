use serde::{Deserialize, Serialize};

use crate::pitch;

/// The musical event a unit sings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// MIDI note number (0-127)
    pub midi: u8,
    /// Length in tatums (smallest rhythmic subdivision)
    pub num_tatums: u32,
    /// Tempo in beats per minute
    pub tempo: f64,
    /// Onset intensity
    pub velocity: f64,
}

impl Note {
    pub fn new(midi: u8, num_tatums: u32, tempo: f64, velocity: f64) -> Self {
        Self {
            midi,
            num_tatums,
            tempo,
            velocity,
        }
    }

    /// Equal-tempered frequency in Hz (A4 = 440)
    pub fn frequency(&self) -> f64 {
        pitch::midi_note_to_freq(self.midi)
    }

    /// Scientific pitch name, e.g. "A3"
    pub fn name(&self) -> String {
        pitch::note_name(self.midi)
    }

    /// Seconds per beat, or `None` if the tempo is not a positive finite number.
    pub fn beat_secs(&self) -> Option<f64> {
        if self.tempo.is_finite() && self.tempo > 0.0 {
            Some(60.0 / self.tempo)
        } else {
            None
        }
    }

    /// Note length in seconds.
    ///
    /// The data only carries a tatum count, so the caller decides how many
    /// tatums make up one beat.
    pub fn duration_secs(&self, tatums_per_beat: u32) -> Option<f64> {
        if tatums_per_beat == 0 {
            return None;
        }
        let beat = self.beat_secs()?;
        Some(self.num_tatums as f64 * beat / tatums_per_beat as f64)
    }
}
