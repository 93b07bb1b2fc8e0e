use std::io::Read;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{bail, Result, WrapErr};
use serde_json::Value;
use tracing::{info, warn};

use saavy_units::{
    codec::{self, CodecError},
    lint::{lint, LintConfig},
    Data, Timed, Unit,
};

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn read_input(path: &Path) -> Result<String> {
    if is_stdin(path) {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .wrap_err("failed to read stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(path).wrap_err_with(|| format!("failed to read {}", path.display()))
    }
}

fn load(path: &Path) -> Result<Data> {
    let text = read_input(path)?;
    codec::from_str(&text).wrap_err_with(|| format!("failed to load {}", path.display()))
}

/// Returns false if any file is unreadable or not a valid document
pub fn check(files: &[PathBuf], with_lint: bool, tolerance: f64) -> Result<bool> {
    let config = LintConfig::default().tolerance(tolerance);
    let mut all_valid = true;

    for path in files {
        let name = path.display();
        let text = match read_input(path) {
            Ok(text) => text,
            Err(err) => {
                println!("{}: cannot read: {:#}", name, err);
                all_valid = false;
                continue;
            }
        };

        let data = match codec::from_str(&text) {
            Ok(data) => data,
            Err(CodecError::Json(err)) => {
                println!("{}: not JSON: {}", name, err);
                all_valid = false;
                continue;
            }
            Err(CodecError::Invalid(report)) => {
                for issue in report.issues() {
                    println!("{}: {}", name, issue);
                }
                all_valid = false;
                continue;
            }
            Err(err) => {
                println!("{}: {}", name, err);
                all_valid = false;
                continue;
            }
        };

        if with_lint {
            for finding in lint(&data, &config) {
                println!("{}: warning: {}", name, finding);
            }
        }
        info!(file = %name, units = data.len(), "document is valid");
        println!("{}: ok ({} units)", name, data.len());
    }

    Ok(all_valid)
}

/// Paths of fields in `original` that are missing from `encoded`.
/// Null values count as absent on both sides.
fn dropped_keys(original: &Value, encoded: &Value, path: &str, out: &mut Vec<String>) {
    match (original, encoded) {
        (Value::Object(before), Value::Object(after)) => {
            for (key, value) in before {
                let here = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };
                match after.get(key) {
                    Some(next) => dropped_keys(value, next, &here, out),
                    None if value.is_null() => {}
                    None => out.push(here),
                }
            }
        }
        (Value::Array(before), Value::Array(after)) => {
            for (i, (a, b)) in before.iter().zip(after).enumerate() {
                dropped_keys(a, b, &format!("{}[{}]", path, i), out);
            }
        }
        _ => {}
    }
}

fn format_span(span: Option<(f64, f64)>) -> String {
    match span {
        Some((start, end)) => format!("{:.3}..{:.3}s", start, end),
        None => "-".to_owned(),
    }
}

fn summary(index: usize, unit: &Unit, tatums_per_beat: u32) -> String {
    let note = &unit.note;
    let duration = match note.duration_secs(tatums_per_beat) {
        Some(secs) => format!("{:.3}s", secs),
        None => "-".to_owned(),
    };
    let kinds: Vec<&str> = unit
        .f0
        .segments
        .iter()
        .map(|s| s.kind())
        .chain(unit.loudness.segments.iter().map(|s| s.kind()))
        .collect();

    format!(
        "{:>4}  {:<4} {:<4} {:>8.2} Hz  {:>6} bpm  vel {:<5}  f0 {:>2}  loud {:>2}  span {}  dur {}  [{}]",
        index,
        unit.vowel,
        note.name(),
        note.frequency(),
        note.tempo,
        note.velocity,
        unit.f0.segments.len(),
        unit.loudness.segments.len(),
        format_span(unit.span()),
        duration,
        kinds.join(", "),
    )
}

pub fn info(path: &Path, tatums_per_beat: u32) -> Result<()> {
    let data = load(path)?;

    println!("{}: {} units, span {}", path.display(), data.len(), format_span(data.span()));
    for (i, unit) in data.iter().enumerate() {
        println!("{}", summary(i, unit, tatums_per_beat));
    }
    Ok(())
}

pub fn fmt(path: &Path, write: bool) -> Result<()> {
    let text = read_input(path)?;
    let original: Value = serde_json::from_str(&text)
        .wrap_err_with(|| format!("failed to parse {}", path.display()))?;
    let data = codec::from_value(original.clone())
        .wrap_err_with(|| format!("failed to load {}", path.display()))?;

    // Only segments keep unknown fields; anything else is lost on rewrite
    let encoded = serde_json::to_value(&data).wrap_err("failed to re-encode document")?;
    let mut dropped = Vec::new();
    dropped_keys(&original, &encoded, "", &mut dropped);
    for key in &dropped {
        warn!(file = %path.display(), field = %key, "field is not kept by the unit model");
    }

    if write {
        if is_stdin(path) {
            bail!("cannot rewrite stdin in place");
        }
        codec::to_path(path, &data).wrap_err_with(|| format!("failed to write {}", path.display()))?;
        info!(file = %path.display(), dropped = dropped.len(), "formatted");
    } else {
        codec::to_writer(std::io::stdout().lock(), &data, true)?;
        println!();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dropped_keys_ignores_segment_extras_and_nulls() {
        let original = json!({
            "version": 2,
            "units": [{
                "vowel": "a",
                "f0": { "segments": [
                    { "kind": "f0_static", "start_time": 0, "end_time": 0.5, "curve": "cosine", "frequency": null }
                ] },
                "loudness": { "segments": [] },
                "note": { "midi": 57, "num_tatums": 4, "tempo": 120, "velocity": 90, "channel": 1 }
            }]
        });
        let data = codec::from_value(original.clone()).unwrap();
        let encoded = serde_json::to_value(&data).unwrap();

        let mut dropped = Vec::new();
        dropped_keys(&original, &encoded, "", &mut dropped);
        assert_eq!(dropped, ["units[0].note.channel", "version"]);
    }

    #[test]
    fn check_continues_past_unreadable_files() {
        let dir = std::env::temp_dir();
        let missing = dir.join(format!("saavy_units_missing_{}.json", std::process::id()));
        let valid = dir.join(format!("saavy_units_check_{}.json", std::process::id()));
        std::fs::write(&valid, r#"{ "units": [] }"#).unwrap();

        let result = check(&[missing, valid.clone()], false, 1e-9);
        std::fs::remove_file(&valid).unwrap();

        assert!(!result.unwrap());
    }
}
