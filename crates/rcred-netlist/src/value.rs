use once_cell::sync::Lazy;
use regex::Regex;

use crate::NetlistError;

/// Scale prefixes accepted after the numeric part of a magnitude token.
///
/// `meg` must be tried before `m` (milli). Anything after a matched prefix is a
/// unit name (`pF`, `kOhm`) and is ignored, as SPICE does.
const SI_PREFIXES: [(&str, f64); 8] = [
    ("meg", 1e6),
    ("f", 1e-15),
    ("p", 1e-12),
    ("n", 1e-9),
    ("u", 1e-6),
    ("m", 1e-3),
    ("k", 1e3),
    ("g", 1e9),
];

/// Number of significant digits used for every emitted value.
const SIGNIFICANT_DIGITS: usize = 6;

static MAGNITUDE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)([A-Za-z]*)$").unwrap()
});

/// Parse a magnitude token such as `10`, `1.5e-12`, `2.2p`, `4.7kOhm` or `1meg`.
///
/// Prefixes are case-insensitive. A suffix that is not a known prefix falls
/// back to a plain float parse of the whole token.
pub fn parse_magnitude(token: &str) -> Result<f64, NetlistError> {
    let token = token.trim();
    let invalid = || NetlistError::InvalidMagnitude {
        input: token.to_string(),
    };

    let Some(caps) = MAGNITUDE.captures(token) else {
        return token.parse::<f64>().map_err(|_| invalid());
    };

    let base: f64 = caps[1].parse().map_err(|_| invalid())?;
    let suffix = caps[2].to_ascii_lowercase();
    if suffix.is_empty() {
        return Ok(base);
    }

    for (prefix, multiplier) in SI_PREFIXES {
        if suffix.starts_with(prefix) {
            return Ok(base * multiplier);
        }
    }

    token.parse::<f64>().map_err(|_| invalid())
}

/// Parse a comma-separated list of magnitudes (`"10,20,30"`, `"1p, 2p"`).
///
/// Empty entries are ignored; an empty string yields an empty list.
pub fn parse_value_list(csv: &str) -> Result<Vec<f64>, NetlistError> {
    csv.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_magnitude)
        .collect()
}

/// Format a value with six significant digits, `%g` style.
///
/// Fixed notation is used for decimal exponents in `-4..6`, scientific
/// notation otherwise. Trailing zeros are dropped in both forms.
pub fn format_sig(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let sci = format!("{:.*e}", SIGNIFICANT_DIGITS - 1, value);
    let Some((mantissa, exponent)) = sci.split_once('e') else {
        return sci;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if (-4..SIGNIFICANT_DIGITS as i32).contains(&exponent) {
        let decimals = (SIGNIFICANT_DIGITS as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(format!("{value:.decimals$}"))
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{sign}{:02}",
            trim_fraction(mantissa.to_string()),
            exponent.abs()
        )
    }
}

fn trim_fraction(s: String) -> String {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}
