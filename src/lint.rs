//! Advisory consistency checks.
//!
//! Nothing here makes a document invalid. Producers are free to emit segments
//! in any order or with any timing; these checks only point at values that
//! are likely to be mistakes, or that cannot be written back as JSON.

use tracing::debug;

use crate::model::{Data, Timed};

/// Which rule produced a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Check {
    /// NaN or infinity; serializes as `null`
    NonFinite,
    /// `end_time` before `start_time`
    Reversed,
    /// Start times going backwards within a track
    Order,
    /// A segment starting before the previous one ends
    Overlap,
    /// Tempo that is not positive
    Tempo,
    /// MIDI note above 127
    Midi,
    /// An extra field named like a declared one
    ReservedKey,
}

impl Check {
    pub fn as_str(&self) -> &'static str {
        match self {
            Check::NonFinite => "non-finite",
            Check::Reversed => "reversed",
            Check::Order => "order",
            Check::Overlap => "overlap",
            Check::Tempo => "tempo",
            Check::Midi => "midi",
            Check::ReservedKey => "reserved-key",
        }
    }
}

impl std::fmt::Display for Check {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub path: String,
    pub check: Check,
    pub message: String,
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} [{}]", self.path, self.message, self.check)
    }
}

/// Which checks to run and how strict the time comparisons are
#[derive(Debug, Clone, PartialEq)]
pub struct LintConfig {
    /// Slack in seconds for reversed/order/overlap comparisons
    pub tolerance: f64,
    pub non_finite: bool,
    pub reversed: bool,
    pub order: bool,
    pub overlap: bool,
    pub tempo: bool,
    pub midi: bool,
    pub reserved: bool,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-9,
            non_finite: true,
            reversed: true,
            order: true,
            overlap: true,
            tempo: true,
            midi: true,
            reserved: true,
        }
    }
}

impl LintConfig {
    /// Only the checks for values that have no valid JSON form. A document
    /// with findings under this config cannot be written and read back.
    pub fn encodable() -> Self {
        Self {
            tolerance: 0.0,
            non_finite: true,
            reversed: false,
            order: false,
            overlap: false,
            tempo: false,
            midi: true,
            reserved: true,
        }
    }

    pub fn tolerance(mut self, seconds: f64) -> Self {
        self.tolerance = seconds;
        self
    }

    pub fn check_non_finite(mut self, enabled: bool) -> Self {
        self.non_finite = enabled;
        self
    }

    pub fn check_reversed(mut self, enabled: bool) -> Self {
        self.reversed = enabled;
        self
    }

    pub fn check_order(mut self, enabled: bool) -> Self {
        self.order = enabled;
        self
    }

    pub fn check_overlap(mut self, enabled: bool) -> Self {
        self.overlap = enabled;
        self
    }

    pub fn check_tempo(mut self, enabled: bool) -> Self {
        self.tempo = enabled;
        self
    }

    pub fn check_midi(mut self, enabled: bool) -> Self {
        self.midi = enabled;
        self
    }

    pub fn check_reserved(mut self, enabled: bool) -> Self {
        self.reserved = enabled;
        self
    }
}

/// Run the enabled checks over every unit, in document order
pub fn lint(data: &Data, config: &LintConfig) -> Vec<Finding> {
    let mut linter = Linter {
        config,
        findings: Vec::new(),
    };

    for (i, unit) in data.iter().enumerate() {
        let path = format!("units[{}]", i);
        linter.track(&format!("{}.f0.segments", path), &unit.f0.segments);
        linter.track(&format!("{}.loudness.segments", path), &unit.loudness.segments);

        let note = &unit.note;
        if config.non_finite {
            linter.finite(&format!("{}.note.tempo", path), note.tempo);
            linter.finite(&format!("{}.note.velocity", path), note.velocity);
        }
        if config.tempo && note.tempo.is_finite() && note.tempo <= 0.0 {
            linter.push(
                format!("{}.note.tempo", path),
                Check::Tempo,
                format!("tempo {} is not positive", note.tempo),
            );
        }
        if config.midi && note.midi > 127 {
            linter.push(
                format!("{}.note.midi", path),
                Check::Midi,
                format!("MIDI note {} is above 127", note.midi),
            );
        }
    }

    debug!(findings = linter.findings.len(), "lint finished");
    linter.findings
}

struct Linter<'c> {
    config: &'c LintConfig,
    findings: Vec<Finding>,
}

impl Linter<'_> {
    fn push(&mut self, path: String, check: Check, message: String) {
        self.findings.push(Finding {
            path,
            check,
            message,
        });
    }

    fn finite(&mut self, path: &str, value: f64) {
        if !value.is_finite() {
            self.push(
                path.to_owned(),
                Check::NonFinite,
                format!("{} cannot be written as JSON", value),
            );
        }
    }

    fn track<S: Timed>(&mut self, path: &str, segments: &[S]) {
        let tolerance = self.config.tolerance;
        let mut previous: Option<&S> = None;

        for (i, segment) in segments.iter().enumerate() {
            let here = format!("{}[{}]", path, i);
            let (start, end) = (segment.start_time(), segment.end_time());

            if self.config.non_finite {
                self.finite(&format!("{}.start_time", here), start);
                self.finite(&format!("{}.end_time", here), end);
                for (name, value) in segment.fields() {
                    self.finite(&format!("{}.{}", here, name), value);
                }
            }

            if self.config.reserved {
                for key in segment.clashing_extras() {
                    self.push(
                        format!("{}.{}", here, key),
                        Check::ReservedKey,
                        format!("extra field '{}' shadows a declared field", key),
                    );
                }
            }

            if self.config.reversed && end < start - tolerance {
                self.push(
                    here.clone(),
                    Check::Reversed,
                    format!("'{}' ends at {} before it starts at {}", segment.kind(), end, start),
                );
            }

            if let Some(prev) = previous {
                if self.config.order && start < prev.start_time() - tolerance {
                    self.push(
                        here.clone(),
                        Check::Order,
                        format!(
                            "starts at {} before the previous segment's start {}",
                            start,
                            prev.start_time()
                        ),
                    );
                } else if self.config.overlap && start < prev.end_time() - tolerance {
                    self.push(
                        here.clone(),
                        Check::Overlap,
                        format!(
                            "starts at {} before the previous segment ends at {}",
                            start,
                            prev.end_time()
                        ),
                    );
                }
            }

            previous = Some(segment);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{F0Segment, LoudnessSegment, Note, Unit};

    fn data(f0: Vec<F0Segment>, loudness: Vec<LoudnessSegment>, note: Note) -> Data {
        let mut builder = Unit::builder("a").note(note);
        for seg in f0 {
            builder = builder.f0(seg);
        }
        for seg in loudness {
            builder = builder.loudness(seg);
        }
        Data::new(vec![builder.build().unwrap()])
    }

    fn note() -> Note {
        Note::new(57, 4, 120.0, 90.0)
    }

    fn checks(findings: &[Finding]) -> Vec<Check> {
        findings.iter().map(|f| f.check).collect()
    }

    #[test]
    fn clean_document_has_no_findings() {
        let d = data(
            vec![
                F0Segment::new("f0_static", 0.0, 0.5).frequency(220.0),
                F0Segment::new("f0_static", 0.5, 1.0).frequency(247.0),
            ],
            vec![LoudnessSegment::new("loudness_attack", 0.0, 0.1)],
            note(),
        );
        assert!(lint(&d, &LintConfig::default()).is_empty());
    }

    #[test]
    fn flags_reversed_segment() {
        let d = data(vec![F0Segment::new("f0_static", 0.5, 0.2)], vec![], note());
        let findings = lint(&d, &LintConfig::default());

        assert_eq!(checks(&findings), [Check::Reversed]);
        assert_eq!(findings[0].path, "units[0].f0.segments[0]");
    }

    #[test]
    fn flags_out_of_order_and_overlap_separately() {
        let d = data(
            vec![],
            vec![
                LoudnessSegment::new("a", 1.0, 2.0),
                LoudnessSegment::new("b", 0.5, 0.8), // goes backwards
                LoudnessSegment::new("c", 0.7, 1.0), // overlaps "b"
            ],
            note(),
        );
        let findings = lint(&d, &LintConfig::default());

        assert_eq!(checks(&findings), [Check::Order, Check::Overlap]);
        assert_eq!(findings[0].path, "units[0].loudness.segments[1]");
        assert_eq!(findings[1].path, "units[0].loudness.segments[2]");
    }

    #[test]
    fn tolerance_absorbs_rounding() {
        let d = data(
            vec![
                F0Segment::new("f0_static", 0.0, 0.1 + 0.2),
                F0Segment::new("f0_static", 0.3, 0.5),
            ],
            vec![],
            note(),
        );
        assert!(lint(&d, &LintConfig::default()).is_empty());
        assert_eq!(
            checks(&lint(&d, &LintConfig::default().tolerance(0.0))),
            [Check::Overlap]
        );
    }

    #[test]
    fn flags_non_finite_fields() {
        let d = data(
            vec![F0Segment::new("f0_vibrato", 0.0, 1.0).vib_amplitude(f64::NAN)],
            vec![],
            Note::new(57, 4, f64::INFINITY, 90.0),
        );
        let findings = lint(&d, &LintConfig::default());
        let paths: Vec<_> = findings.iter().map(|f| f.path.as_str()).collect();

        assert_eq!(
            paths,
            ["units[0].f0.segments[0].vib_amplitude", "units[0].note.tempo"]
        );
        assert!(findings.iter().all(|f| f.check == Check::NonFinite));
    }

    #[test]
    fn flags_non_positive_tempo() {
        let d = data(vec![], vec![], Note::new(57, 4, 0.0, 90.0));
        assert_eq!(checks(&lint(&d, &LintConfig::default())), [Check::Tempo]);
    }

    #[test]
    fn disabled_checks_stay_quiet() {
        let d = data(
            vec![
                F0Segment::new("f0_static", 0.5, 0.2),
                F0Segment::new("f0_static", 0.0, 0.1),
            ],
            vec![],
            Note::new(57, 4, -1.0, 90.0),
        );
        let config = LintConfig::default()
            .check_reversed(false)
            .check_order(false)
            .check_overlap(false)
            .check_tempo(false)
            .check_non_finite(false);

        assert!(lint(&d, &config).is_empty());
    }

    #[test]
    fn flags_midi_above_127() {
        let d = data(vec![], vec![], Note::new(200, 4, 120.0, 90.0));
        let findings = lint(&d, &LintConfig::default());

        assert_eq!(checks(&findings), [Check::Midi]);
        assert_eq!(findings[0].path, "units[0].note.midi");

        let d = data(vec![], vec![], Note::new(127, 4, 120.0, 90.0));
        assert!(lint(&d, &LintConfig::default()).is_empty());
    }

    #[test]
    fn flags_extras_shadowing_declared_fields() {
        let d = data(
            vec![F0Segment::new("f0_static", 0.0, 0.5)
                .frequency(220.0)
                .with_extra("frequency", "x")],
            vec![],
            note(),
        );
        let findings = lint(&d, &LintConfig::default());

        assert_eq!(checks(&findings), [Check::ReservedKey]);
        assert_eq!(findings[0].path, "units[0].f0.segments[0].frequency");
    }

    #[test]
    fn encodable_config_ignores_timing() {
        let d = data(
            vec![
                F0Segment::new("f0_static", 0.5, 0.2),
                F0Segment::new("f0_static", 0.0, 0.1).frequency(f64::NAN),
            ],
            vec![],
            Note::new(130, 4, -1.0, 90.0),
        );

        assert_eq!(
            checks(&lint(&d, &LintConfig::encodable())),
            [Check::NonFinite, Check::Midi]
        );
    }

    #[test]
    fn finding_display() {
        let d = data(vec![F0Segment::new("f0_static", 0.5, 0.25)], vec![], note());
        let findings = lint(&d, &LintConfig::default());
        assert_eq!(
            findings[0].to_string(),
            "units[0].f0.segments[0]: 'f0_static' ends at 0.25 before it starts at 0.5 [reversed]"
        );
    }
}
