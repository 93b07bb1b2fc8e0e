use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/*
Segments
========

A segment describes how one synthesis parameter behaves over a time interval.
Every segment has three mandatory fields:

  kind        Free-form tag naming the variant ("f0_static", "loudness_attack",
              ...). The set of kinds is owned by whoever produces the data, so
              it stays a string here rather than a closed enum.

  start_time  Interval start.
  end_time    Interval end.

Anything else is variant-specific. The pitch and loudness tracks declare a few
well-known optional fields; every other field is kept verbatim in `extra` so a
decode/encode round trip never drops data.

  Segment           kind + times + extra
  F0Segment         kind + times + pitch/vibrato fields + extra
  LoudnessSegment   kind + times + envelope fields + extra

None of the optional fields is tied to a particular kind.
*/

/// Shared view over every segment flavour.
pub trait Timed {
    fn kind(&self) -> &str;
    fn start_time(&self) -> f64;
    fn end_time(&self) -> f64;

    /// `end_time - start_time`. Negative for reversed intervals.
    fn duration(&self) -> f64 {
        self.end_time() - self.start_time()
    }

    /// Declared numeric fields that are present, in declaration order.
    fn fields(&self) -> Vec<(&'static str, f64)> {
        Vec::new()
    }

    /// Names of the declared optional fields
    fn declared(&self) -> &'static [&'static str] {
        &[]
    }

    fn extra(&self) -> &Map<String, Value>;

    /// Keys in `extra` that collide with a declared field. Encoding such a
    /// segment would write the key twice.
    fn clashing_extras(&self) -> Vec<&str> {
        self.extra()
            .keys()
            .map(String::as_str)
            .filter(|key| REQUIRED.contains(key) || self.declared().contains(key))
            .collect()
    }
}

/// Fields every segment carries
pub const REQUIRED: &[&str] = &["kind", "start_time", "end_time"];

/// Generic timed interval with an open set of extra fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub kind: String,
    pub start_time: f64,
    pub end_time: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Segment {
    pub fn new(kind: impl Into<String>, start_time: f64, end_time: f64) -> Self {
        Self {
            kind: kind.into(),
            start_time,
            end_time,
            extra: Map::new(),
        }
    }

    /// Attach a variant-specific field.
    /// `kind`, `start_time` and `end_time` are not extras; encoding a segment
    /// that carries them here fails.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

impl Timed for Segment {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn start_time(&self) -> f64 {
        self.start_time
    }

    fn end_time(&self) -> f64 {
        self.end_time
    }

    fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}

/// Generates a chained setter per optional field: `.frequency(220.0)`.
macro_rules! optional_setters {
    ($ty:ident { $($field:ident),* $(,)? }) => {
        impl $ty {
            $(
                pub fn $field(mut self, value: f64) -> Self {
                    self.$field = Some(value);
                    self
                }
            )*

            /// Attach a field outside the declared set. Declared names belong
            /// in their typed setters; encoding fails if they show up here.
            pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
                self.extra.insert(key.into(), value.into());
                self
            }
        }

        impl Timed for $ty {
            fn kind(&self) -> &str {
                &self.kind
            }

            fn start_time(&self) -> f64 {
                self.start_time
            }

            fn end_time(&self) -> f64 {
                self.end_time
            }

            fn fields(&self) -> Vec<(&'static str, f64)> {
                [$((stringify!($field), self.$field)),*]
                    .into_iter()
                    .filter_map(|(name, value)| value.map(|v| (name, v)))
                    .collect()
            }

            fn declared(&self) -> &'static [&'static str] {
                $ty::FIELDS
            }

            fn extra(&self) -> &Map<String, Value> {
                &self.extra
            }
        }
    };
}

/// Pitch contour segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct F0Segment {
    pub kind: String,
    pub start_time: f64,
    pub end_time: f64,

    // Glide / static pitch (Hz)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_frequency: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_frequency: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<f64>,

    // Vibrato
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vib_attack_duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vib_release_duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vib_frequency: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vib_amplitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vib_offset: Option<f64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl F0Segment {
    /// Names of the declared optional fields.
    pub const FIELDS: &'static [&'static str] = &[
        "start_frequency",
        "end_frequency",
        "frequency",
        "vib_attack_duration",
        "vib_release_duration",
        "vib_frequency",
        "vib_amplitude",
        "vib_offset",
    ];

    pub fn new(kind: impl Into<String>, start_time: f64, end_time: f64) -> Self {
        Self {
            kind: kind.into(),
            start_time,
            end_time,
            start_frequency: None,
            end_frequency: None,
            frequency: None,
            vib_attack_duration: None,
            vib_release_duration: None,
            vib_frequency: None,
            vib_amplitude: None,
            vib_offset: None,
            extra: Map::new(),
        }
    }

    /// Forget the pitch-specific typing. Present optional fields move into
    /// `extra` under their declared names.
    pub fn into_segment(self) -> Segment {
        let fields = self.fields();
        lower(self.kind, self.start_time, self.end_time, fields, self.extra)
    }
}

optional_setters!(F0Segment {
    start_frequency,
    end_frequency,
    frequency,
    vib_attack_duration,
    vib_release_duration,
    vib_frequency,
    vib_amplitude,
    vib_offset,
});

/// Loudness envelope segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoudnessSegment {
    pub kind: String,
    pub start_time: f64,
    pub end_time: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attack_duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent_factor: Option<f64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LoudnessSegment {
    /// Names of the declared optional fields.
    pub const FIELDS: &'static [&'static str] = &[
        "attack_duration",
        "release_duration",
        "scale_factor",
        "accent_factor",
    ];

    pub fn new(kind: impl Into<String>, start_time: f64, end_time: f64) -> Self {
        Self {
            kind: kind.into(),
            start_time,
            end_time,
            attack_duration: None,
            release_duration: None,
            scale_factor: None,
            accent_factor: None,
            extra: Map::new(),
        }
    }

    /// Forget the envelope-specific typing. Present optional fields move into
    /// `extra` under their declared names.
    pub fn into_segment(self) -> Segment {
        let fields = self.fields();
        lower(self.kind, self.start_time, self.end_time, fields, self.extra)
    }
}

optional_setters!(LoudnessSegment {
    attack_duration,
    release_duration,
    scale_factor,
    accent_factor,
});

fn lower(
    kind: String,
    start_time: f64,
    end_time: f64,
    fields: Vec<(&'static str, f64)>,
    mut extra: Map<String, Value>,
) -> Segment {
    for (name, value) in fields {
        // NaN and infinities have no JSON number form
        if let Some(number) = Number::from_f64(value) {
            extra.insert(name.to_owned(), Value::Number(number));
        }
    }
    Segment {
        kind,
        start_time,
        end_time,
        extra,
    }
}
