use once_cell::sync::Lazy;
use regex::Regex;

static DECIMAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?$").expect("static regex")
});
static HEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^0[xX]([0-9a-fA-F]+)$").expect("static regex"));

/// Which check rejected the form input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidInput {
    #[error("Inputs have to be valid numbers!")]
    NotFinite,
    #[error("Inputs have to be valid numbers!")]
    NotPositive,
}

pub fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

pub fn all_positive(values: &[f64]) -> bool {
    values.iter().all(|v| *v > 0.0)
}

/// Coerce raw form text to a number the way a browser form's unary plus does.
///
/// Blank text is `0`; anything that isn't a decimal, hex or `Infinity`
/// literal is NaN.
pub fn coerce_number(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }
    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if let Some(caps) = HEX.captures(s) {
        return caps[1]
            .chars()
            .filter_map(|c| c.to_digit(16))
            .fold(0.0_f64, |acc, d| acc.mul_add(16.0, f64::from(d)));
    }
    if DECIMAL.is_match(s) {
        return s.parse::<f64>().unwrap_or(f64::NAN);
    }
    f64::NAN
}

pub fn validate_running(distance: f64, duration: f64, cadence: f64) -> Result<(), InvalidInput> {
    let values = [distance, duration, cadence];
    if !all_finite(&values) {
        return Err(InvalidInput::NotFinite);
    }
    if !all_positive(&values) {
        return Err(InvalidInput::NotPositive);
    }
    Ok(())
}

/// Elevation gain only has to be finite: a downhill ride loses height.
pub fn validate_cycling(
    distance: f64,
    duration: f64,
    elevation_gain: f64,
) -> Result<(), InvalidInput> {
    if !all_finite(&[distance, duration, elevation_gain]) {
        return Err(InvalidInput::NotFinite);
    }
    if !all_positive(&[distance, duration]) {
        return Err(InvalidInput::NotPositive);
    }
    Ok(())
}
