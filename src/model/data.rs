use serde::{Deserialize, Serialize};

use super::unit::{merge_spans, Unit};

/// Root document: an ordered list of units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Data {
    pub units: Vec<Unit>,
}

impl Data {
    pub fn new(units: Vec<Unit>) -> Self {
        Self { units }
    }

    pub fn builder() -> DataBuilder {
        DataBuilder { units: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Unit> {
        self.units.iter()
    }

    /// Earliest start and latest end over every unit that has segments
    pub fn span(&self) -> Option<(f64, f64)> {
        merge_spans(self.units.iter().filter_map(Unit::span))
    }
}

impl<'a> IntoIterator for &'a Data {
    type Item = &'a Unit;
    type IntoIter = std::slice::Iter<'a, Unit>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.iter()
    }
}

impl FromIterator<Unit> for Data {
    fn from_iter<I: IntoIterator<Item = Unit>>(iter: I) -> Self {
        Self {
            units: iter.into_iter().collect(),
        }
    }
}

/// Collects units in order
pub struct DataBuilder {
    units: Vec<Unit>,
}

impl DataBuilder {
    pub fn unit(mut self, unit: Unit) -> Self {
        self.units.push(unit);
        self
    }

    pub fn build(self) -> Data {
        Data { units: self.units }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{F0Segment, LoudnessSegment, Note};

    fn unit(vowel: &str, start: f64, end: f64) -> Unit {
        Unit::builder(vowel)
            .f0(F0Segment::new("f0_static", start, end).frequency(220.0))
            .note(Note::new(57, 4, 120.0, 90.0))
            .build()
            .unwrap()
    }

    #[test]
    fn builder_keeps_unit_order() {
        let data = Data::builder()
            .unit(unit("a", 0.0, 0.5))
            .unit(unit("o", 0.5, 1.0))
            .build();

        let vowels: Vec<_> = data.iter().map(|u| u.vowel.as_str()).collect();
        assert_eq!(vowels, ["a", "o"]);
        assert_eq!(data.len(), 2);
    }

    #[test]
    fn span_skips_units_without_segments() {
        let silent = Unit::builder("-")
            .note(Note::new(60, 1, 120.0, 0.0))
            .build()
            .unwrap();
        let data: Data = vec![unit("a", 0.25, 0.5), silent, unit("o", 0.5, 2.0)]
            .into_iter()
            .collect();

        assert_eq!(data.span(), Some((0.25, 2.0)));
    }

    #[test]
    fn empty_document() {
        let data = Data::default();
        assert!(data.is_empty());
        assert_eq!(data.span(), None);
        assert_eq!(serde_json::to_string(&data).unwrap(), r#"{"units":[]}"#);
    }

    #[test]
    fn span_includes_loudness_track() {
        let u = Unit::builder("a")
            .loudness(LoudnessSegment::new("loudness_release", 3.0, 4.0))
            .note(Note::new(57, 4, 120.0, 90.0))
            .build()
            .unwrap();
        let data = Data::new(vec![unit("a", 0.0, 1.0), u]);

        assert_eq!(data.span(), Some((0.0, 4.0)));
    }
}
