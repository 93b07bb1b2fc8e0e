pub mod codec; // JSON in/out
pub mod lint; // Advisory timing checks
pub mod model; // Units, notes and segments
pub mod pitch;
pub mod validate; // Structural shape checks

pub use codec::CodecError;
pub use model::{
    BuildError, Data, DataBuilder, F0Contour, F0Segment, LoudnessContour, LoudnessSegment, Note,
    Segment, Timed, Unit, UnitBuilder,
};
pub use validate::{Issue, IssueKind, ValidationReport};
