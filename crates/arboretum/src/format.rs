/// Renders an aggregate value as tile label text.
pub trait LabelFormatter {
    fn format(&self, value: f64) -> String;
}

impl<F> LabelFormatter for F
where
    F: Fn(f64) -> String,
{
    fn format(&self, value: f64) -> String {
        self(value)
    }
}

/// Thousands-grouped decimal, e.g. `1234567.5` → `1,234,567.5`.
///
/// Non-integers keep up to 12 significant digits with trailing zeros trimmed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupedFormat;

impl LabelFormatter for GroupedFormat {
    fn format(&self, value: f64) -> String {
        if !value.is_finite() {
            return value.to_string();
        }
        let negative = value < 0.0;
        let abs = value.abs();
        let text = if abs.fract() == 0.0 {
            format!("{abs:.0}")
        } else {
            let int_digits = if abs >= 1.0 {
                abs.log10().floor() as i32 + 1
            } else {
                1
            };
            let decimals = (12 - int_digits).max(0) as usize;
            trim_zeros(format!("{abs:.decimals$}"))
        };
        let (int_part, frac_part) = match text.split_once('.') {
            Some((i, f)) => (i.to_string(), Some(f.to_string())),
            None => (text, None),
        };
        let mut out = String::new();
        if negative && (int_part != "0" || frac_part.is_some()) {
            out.push('-');
        }
        out.push_str(&group_thousands(&int_part));
        if let Some(f) = frac_part {
            out.push('.');
            out.push_str(&f);
        }
        out
    }
}

/// Significant-digit SI formatting, e.g. `1_234_000` → `1.23M`.
///
/// With `billions`, the giga suffix is written `B` so currency reads naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiFormat {
    pub precision: usize,
    pub billions: bool,
}

impl Default for SiFormat {
    fn default() -> Self {
        Self {
            precision: 3,
            billions: false,
        }
    }
}

impl SiFormat {
    /// Three significant digits, `G` shown as `B`.
    pub fn currency() -> Self {
        Self {
            precision: 3,
            billions: true,
        }
    }
}

const SI_PREFIXES: [&str; 17] = [
    "y", "z", "a", "f", "p", "n", "µ", "m", "", "k", "M", "G", "T", "P", "E", "Z", "Y",
];

impl LabelFormatter for SiFormat {
    fn format(&self, value: f64) -> String {
        if !value.is_finite() {
            return value.to_string();
        }
        if value == 0.0 {
            return "0".to_string();
        }
        let p = self.precision.max(1);
        // `{:.Ne}` rounds to N+1 significant digits and reports the exponent after rounding.
        let sci = format!("{:.*e}", p - 1, value.abs());
        let Some((mantissa, exp)) = sci.split_once('e') else {
            return sci;
        };
        let exponent: i32 = exp.parse().unwrap_or(0);
        let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();

        let prefix_exp = (exponent.div_euclid(3)).clamp(-8, 8);
        let i = exponent - prefix_exp * 3 + 1;
        let n = digits.len() as i32;
        let body = if i == n {
            digits
        } else if i > n {
            format!("{digits}{}", "0".repeat((i - n) as usize))
        } else if i > 0 {
            format!("{}.{}", &digits[..i as usize], &digits[i as usize..])
        } else {
            format!("0.{}{digits}", "0".repeat((-i) as usize))
        };

        let mut out = String::new();
        if value < 0.0 {
            out.push('-');
        }
        out.push_str(&trim_zeros(body));
        let suffix = SI_PREFIXES[(prefix_exp + 8) as usize];
        if self.billions && suffix == "G" {
            out.push('B');
        } else {
            out.push_str(suffix);
        }
        out
    }
}

fn trim_zeros(text: String) -> String {
    if !text.contains('.') {
        return text;
    }
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
