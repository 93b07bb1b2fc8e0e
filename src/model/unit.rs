use serde::{Deserialize, Serialize};

use super::note::Note;
use super::segment::{F0Segment, LoudnessSegment, Timed};

/// Pitch track of a unit (`f0.segments`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct F0Contour {
    pub segments: Vec<F0Segment>,
}

/// Loudness track of a unit (`loudness.segments`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoudnessContour {
    pub segments: Vec<LoudnessSegment>,
}

/// Smallest synthesizable element: a vowel sung on a note, shaped by a pitch
/// contour and a loudness contour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    /// Phonetic label
    pub vowel: String,
    pub f0: F0Contour,
    pub loudness: LoudnessContour,
    pub note: Note,
}

impl Unit {
    /// Start a unit builder for the given vowel
    pub fn builder(vowel: impl Into<String>) -> UnitBuilder {
        UnitBuilder::new(vowel.into())
    }

    /// Earliest start and latest end over both tracks.
    /// `None` when the unit has no segments at all.
    pub fn span(&self) -> Option<(f64, f64)> {
        let f0 = self.f0.segments.iter().map(|s| (s.start_time(), s.end_time()));
        let loudness = self
            .loudness
            .segments
            .iter()
            .map(|s| (s.start_time(), s.end_time()));
        merge_spans(f0.chain(loudness))
    }

    /// Total number of segments across both tracks
    pub fn segment_count(&self) -> usize {
        self.f0.segments.len() + self.loudness.segments.len()
    }
}

/// Fold `(start, end)` pairs into one covering interval.
pub(crate) fn merge_spans(spans: impl Iterator<Item = (f64, f64)>) -> Option<(f64, f64)> {
    spans.fold(None, |acc, (start, end)| match acc {
        None => Some((start, end)),
        Some((lo, hi)) => Some((f64::min(lo, start), f64::max(hi, end))),
    })
}

/// Builder for constructing units with a fluent API
pub struct UnitBuilder {
    vowel: String,
    f0: Vec<F0Segment>,
    loudness: Vec<LoudnessSegment>,
    note: Option<Note>,
}

impl UnitBuilder {
    fn new(vowel: String) -> Self {
        Self {
            vowel,
            f0: Vec::new(),
            loudness: Vec::new(),
            note: None,
        }
    }

    /// Append a pitch segment (kept in call order)
    pub fn f0(mut self, segment: F0Segment) -> Self {
        self.f0.push(segment);
        self
    }

    /// Append a loudness segment (kept in call order)
    pub fn loudness(mut self, segment: LoudnessSegment) -> Self {
        self.loudness.push(segment);
        self
    }

    /// Set the note, replacing any earlier one
    pub fn note(mut self, note: Note) -> Self {
        self.note = Some(note);
        self
    }

    /// Build the final unit
    /// Fails if no note was given; empty tracks are allowed
    pub fn build(self) -> Result<Unit, BuildError> {
        let note = self.note.ok_or(BuildError::MissingNote)?;
        Ok(Unit {
            vowel: self.vowel,
            f0: F0Contour { segments: self.f0 },
            loudness: LoudnessContour {
                segments: self.loudness,
            },
            note,
        })
    }
}

/// Errors that can occur when building a unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// `build()` was called before `note()`
    MissingNote,
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::MissingNote => write!(f, "Unit has no note (call .note() before .build())"),
        }
    }
}

impl std::error::Error for BuildError {}
