//! Records for synthesized vocal units.
//!
//! A document ([`Data`]) is an ordered list of [`Unit`]s. Each unit pairs a
//! [`Note`] with a pitch track and a loudness track, both ordered lists of
//! segments. The records only describe shape: nothing here decides how a
//! segment list is rendered or whether its timing makes sense.

/// Root document and its builder.
pub mod data;
/// MIDI note descriptor.
pub mod note;
/// Timed segments for the pitch and loudness tracks.
pub mod segment;
/// Units, their tracks and the unit builder.
pub mod unit;

pub use data::{Data, DataBuilder};
pub use note::Note;
pub use segment::{F0Segment, LoudnessSegment, Segment, Timed};
pub use unit::{BuildError, F0Contour, LoudnessContour, Unit, UnitBuilder};
