use once_cell::sync::Lazy;
use regex::Regex;

static MEASURE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^\s*(t50_golden|t50_reduced)\s*=\s*([-+]?(?:\d+\.?\d*|\.\d+)(?:e[-+]?\d+)?)")
        .unwrap()
});

/// 50%-crossing delays reported by ngspice, in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Measurements {
    pub golden: Option<f64>,
    pub reduced: Option<f64>,
}

impl Measurements {
    /// `|reduced - golden| / |golden|`, when both delays are known and the
    /// golden delay is non-zero.
    pub fn relative_error(&self) -> Option<f64> {
        let (golden, reduced) = (self.golden?, self.reduced?);
        (golden != 0.0).then(|| (reduced - golden).abs() / golden.abs())
    }
}

/// Pull the `t50_golden` / `t50_reduced` results out of ngspice output.
///
/// Measurements that failed (`... failed!`) are left as `None`.
pub fn parse_measurements(output: &str) -> Measurements {
    let mut found = Measurements::default();
    for caps in MEASURE_RE.captures_iter(output) {
        let Ok(value) = caps[2].parse::<f64>() else {
            continue;
        };
        if caps[1].eq_ignore_ascii_case("t50_golden") {
            found.golden = Some(value);
        } else {
            found.reduced = Some(value);
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ngspice_output() {
        let output = "\
Circuit: * golden network vs reduced double-pi

Doing analysis at TEMP = 27.000000 and TNOM = 27.000000

  Measurements for Transient Analysis

t50_golden          =  1.252314e-10 targ=  1.262314e-10 trig=  1.000000e-12
t50_reduced         =  1.240000e-10 targ=  1.250000e-10 trig=  1.000000e-12
";
        let m = parse_measurements(output);
        assert_eq!(m.golden, Some(1.252314e-10));
        assert_eq!(m.reduced, Some(1.24e-10));
        let err = m.relative_error().unwrap();
        assert!((err - 0.012314 / 1.252314).abs() < 1e-9);
    }

    #[test]
    fn test_failed_measurement() {
        let output = "t50_golden          =  1.0e-10 targ= 1e-10 trig= 0\n\
                      t50_reduced failed!\n";
        let m = parse_measurements(output);
        assert_eq!(m.golden, Some(1.0e-10));
        assert_eq!(m.reduced, None);
        assert_eq!(m.relative_error(), None);
    }
}
