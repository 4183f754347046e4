//! Number formatting for report display values
//!
//! Two rounding modes are supported: significant figures and fixed decimal
//! places. Both operate on the decimal digits of the input string rather than
//! on binary floats, so half-up rounding is exact (`"2.005"` to two places is
//! `"2.01"`). Input that is blank or not a finite decimal number is returned
//! unchanged by every public function here; formatting never fails.

use serde::{Deserialize, Serialize};

/// Values below `10^-6` are always rendered in scientific notation
const MIN_FIXED_MAGNITUDE: i64 = -6;

/// Inputs whose magnitude would overflow an IEEE double are treated as non-numeric
const MAX_MAGNITUDE: i64 = 309;

/// Largest accepted significant-figure or decimal-place count
pub const MAX_PRECISION: i64 = 100;

const SUPERSCRIPT_DIGITS: [char; 10] = ['⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹'];

/// Which rounding rule applies to a numeric value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundingMode {
    #[default]
    None,
    Standard,
    #[serde(alias = "sigFigs", alias = "sig-figs")]
    Sigfigs,
}

impl RoundingMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Some(RoundingMode::None),
            "standard" | "rounding" => Some(RoundingMode::Standard),
            "sigfigs" | "sig-figs" | "sig_figs" => Some(RoundingMode::Sigfigs),
            _ => None,
        }
    }

    /// Derive a mode for configurations that only carry the two numbers
    ///
    /// Significant figures apply when set to a non-zero value and decimal
    /// places are unset or zero; rounding applies in the reverse case. When
    /// both are non-zero neither applies.
    pub fn infer(sig_figs: Option<i64>, decimal_places: Option<i64>) -> Self {
        let sig_active = matches!(sig_figs, Some(n) if n != 0);
        let places_active = matches!(decimal_places, Some(n) if n != 0);
        match (sig_active, places_active) {
            (true, false) => RoundingMode::Sigfigs,
            (false, true) => RoundingMode::Standard,
            _ => RoundingMode::None,
        }
    }
}

/// Comparison shown in front of a numeric value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InequalityOperator {
    #[default]
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "<")]
    LessThan,
}

impl InequalityOperator {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "=" | "" => Some(InequalityOperator::Equal),
            ">" => Some(InequalityOperator::GreaterThan),
            "<" => Some(InequalityOperator::LessThan),
            _ => None,
        }
    }

    /// Prefix glyph, `None` for equality
    pub fn glyph(&self) -> Option<&'static str> {
        match self {
            InequalityOperator::Equal => None,
            InequalityOperator::GreaterThan => Some(">"),
            InequalityOperator::LessThan => Some("<"),
        }
    }
}

/// A formatting field the UI may flag as ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormatField {
    SigFigs,
    DecimalPlaces,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatOptions {
    pub rounding_mode: RoundingMode,
    pub sig_figs: Option<i64>,
    pub decimal_places: Option<i64>,
}

impl FormatOptions {
    pub fn sig_figs(n: i64) -> Self {
        Self {
            rounding_mode: RoundingMode::Sigfigs,
            sig_figs: Some(n),
            decimal_places: None,
        }
    }

    pub fn decimal_places(n: i64) -> Self {
        Self {
            rounding_mode: RoundingMode::Standard,
            sig_figs: None,
            decimal_places: Some(n),
        }
    }

    /// Options for a configuration without an explicit mode
    pub fn from_legacy(sig_figs: Option<i64>, decimal_places: Option<i64>) -> Self {
        Self {
            rounding_mode: RoundingMode::infer(sig_figs, decimal_places),
            sig_figs,
            decimal_places,
        }
    }

    /// The configured field that the active mode does not use
    ///
    /// Only reported when both fields carry non-zero values.
    pub fn ignored_field(&self) -> Option<FormatField> {
        let both = matches!(self.sig_figs, Some(n) if n != 0)
            && matches!(self.decimal_places, Some(n) if n != 0);
        if !both {
            return None;
        }
        match self.rounding_mode {
            RoundingMode::Sigfigs => Some(FormatField::DecimalPlaces),
            RoundingMode::Standard => Some(FormatField::SigFigs),
            RoundingMode::None => None,
        }
    }
}

/// Everything needed to turn a raw input into its report display string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplayOptions {
    /// Only numeric inputs are rounded or prefixed
    pub numeric: bool,
    pub format: FormatOptions,
    pub allow_inequalities: bool,
    pub operator: InequalityOperator,
}

/// Format `raw` according to the active rounding mode
pub fn format(raw: &str, options: &FormatOptions) -> String {
    if !is_numeric(raw) {
        return raw.to_string();
    }
    match options.rounding_mode {
        RoundingMode::None => raw.to_string(),
        RoundingMode::Sigfigs => match options.sig_figs {
            Some(n) if n >= 1 => format_with_sig_figs(raw, n),
            _ => raw.to_string(),
        },
        RoundingMode::Standard => match options.decimal_places {
            Some(k) if k >= 0 => format_with_rounding(raw, k),
            _ => raw.to_string(),
        },
    }
}

/// Prefix an inequality glyph when inequalities are enabled
pub fn apply_inequality(value: &str, allow: bool, operator: InequalityOperator) -> String {
    match operator.glyph() {
        Some(glyph) if allow && !value.is_empty() => format!("{}{}", glyph, value),
        _ => value.to_string(),
    }
}

/// Full display pipeline: rounding, then the inequality prefix
pub fn display_value(raw: &str, options: &DisplayOptions) -> String {
    if !options.numeric {
        return raw.to_string();
    }
    let formatted = format(raw, &options.format);
    apply_inequality(&formatted, options.allow_inequalities, options.operator)
}

/// Whether `value` parses as a finite decimal number
pub fn is_numeric(value: &str) -> bool {
    Decimal::parse(value).is_some()
}

/// Count significant figures in a numeric string
///
/// Leading zeros never count. Trailing zeros count only when a decimal
/// point is present. The exponent of scientific notation is ignored.
/// Non-numeric input has zero significant figures; a value made only of
/// zeros has one.
pub fn count_sig_figs(value: &str) -> usize {
    if Decimal::parse(value).is_none() {
        return 0;
    }
    let trimmed = value.trim();
    let mantissa = match trimmed.find(['e', 'E']) {
        Some(idx) => &trimmed[..idx],
        None => trimmed,
    };
    let unsigned = mantissa.trim_start_matches(['+', '-']);

    let significant = if unsigned.contains('.') {
        unsigned.replace('.', "").trim_start_matches('0').len()
    } else {
        unsigned.trim_start_matches('0').trim_end_matches('0').len()
    };
    significant.max(1)
}

/// Round to `sig_figs` significant figures
///
/// Fixed notation is used when it states exactly that many figures;
/// otherwise the result is `"<coefficient> × 10<sign><exponent>"` with
/// Unicode superscripts, e.g. `12345` at 3 figures is `"1.23 × 10⁺⁴"`.
pub fn format_with_sig_figs(value: &str, sig_figs: i64) -> String {
    let Some(decimal) = Decimal::parse(value) else {
        return value.to_string();
    };
    if !(1..=MAX_PRECISION).contains(&sig_figs) {
        return value.to_string();
    }
    if decimal.is_zero() {
        return "0".to_string();
    }

    let n = sig_figs as usize;
    let rounded = decimal.round_to(n as i64);
    let integer_digits = rounded.exponent;

    let scientific = rounded.exponent - 1 < MIN_FIXED_MAGNITUDE
        || integer_digits > n as i64
        || (integer_digits == n as i64 && rounded.digit_at(n as i64 - 1) == 0);

    if scientific {
        rounded.to_scientific(n)
    } else {
        let fraction_digits = (n as i64 - integer_digits).max(0) as usize;
        rounded.to_fixed(fraction_digits)
    }
}

/// Round half-up to `decimal_places` fractional digits, padding with zeros
pub fn format_with_rounding(value: &str, decimal_places: i64) -> String {
    let Some(decimal) = Decimal::parse(value) else {
        return value.to_string();
    };
    if !(0..=MAX_PRECISION).contains(&decimal_places) {
        return value.to_string();
    }
    let Some(position) = decimal.exponent.checked_add(decimal_places) else {
        return value.to_string();
    };
    decimal.round_to(position).to_fixed(decimal_places as usize)
}

/// Exact decimal value `0.d1 d2 ... dn × 10^exponent`
#[derive(Debug, Clone, PartialEq, Eq)]
struct Decimal {
    negative: bool,
    /// Significant digits without leading or trailing zeros; empty for zero
    digits: Vec<u8>,
    exponent: i64,
}

impl Decimal {
    fn zero() -> Self {
        Self {
            negative: false,
            digits: Vec::new(),
            exponent: 0,
        }
    }

    fn parse(input: &str) -> Option<Self> {
        let s = input.trim();
        let (negative, rest) = match s.as_bytes().first()? {
            b'-' => (true, &s[1..]),
            b'+' => (false, &s[1..]),
            _ => (false, s),
        };

        let (mantissa, exp_part) = match rest.find(['e', 'E']) {
            Some(idx) => (&rest[..idx], Some(&rest[idx + 1..])),
            None => (rest, None),
        };

        let (int_part, frac_part) = match mantissa.split_once('.') {
            Some((int, frac)) => (int, frac),
            None => (mantissa, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
            return None;
        }

        let exp: i64 = match exp_part {
            Some(e) => {
                let digits = e.trim_start_matches(['+', '-']);
                if digits.is_empty() || digits.len() > 6 || !digits.bytes().all(|b| b.is_ascii_digit())
                {
                    return None;
                }
                // A sign may only appear once
                if e.len() - digits.len() > 1 {
                    return None;
                }
                e.parse().ok()?
            }
            None => 0,
        };

        let all: Vec<u8> = int_part
            .bytes()
            .chain(frac_part.bytes())
            .map(|b| b - b'0')
            .collect();
        let leading = all.iter().take_while(|&&d| d == 0).count();
        if leading == all.len() {
            return Some(Self::zero());
        }

        let mut digits = all[leading..].to_vec();
        while digits.last() == Some(&0) {
            digits.pop();
        }
        let exponent = int_part.len() as i64 - leading as i64 + exp;
        if exponent > MAX_MAGNITUDE {
            return None;
        }

        Some(Self {
            negative,
            digits,
            exponent,
        })
    }

    fn is_zero(&self) -> bool {
        self.digits.is_empty()
    }

    /// Digit at position `pos` counted from the first significant digit
    fn digit_at(&self, pos: i64) -> u8 {
        if pos < 0 {
            return 0;
        }
        self.digits.get(pos as usize).copied().unwrap_or(0)
    }

    /// Keep `keep` leading digits, rounding half away from zero
    fn round_to(&self, keep: i64) -> Self {
        if self.is_zero() || keep >= self.digits.len() as i64 {
            return self.clone();
        }
        if keep < 0 {
            return Self::zero();
        }

        let keep = keep as usize;
        let mut digits = self.digits[..keep].to_vec();
        let mut exponent = self.exponent;

        if self.digits[keep] >= 5 {
            let mut carried = true;
            for d in digits.iter_mut().rev() {
                if *d == 9 {
                    *d = 0;
                } else {
                    *d += 1;
                    carried = false;
                    break;
                }
            }
            if carried {
                digits.insert(0, 1);
                exponent += 1;
            }
        }

        while digits.last() == Some(&0) {
            digits.pop();
        }
        if digits.is_empty() {
            return Self::zero();
        }

        Self {
            negative: self.negative,
            digits,
            exponent,
        }
    }

    fn sign(&self) -> &'static str {
        if self.negative && !self.is_zero() {
            "-"
        } else {
            ""
        }
    }

    fn to_fixed(&self, fraction_digits: usize) -> String {
        let mut out = String::from(self.sign());

        if self.exponent <= 0 || self.is_zero() {
            out.push('0');
        } else {
            for pos in 0..self.exponent {
                out.push(char::from(b'0' + self.digit_at(pos)));
            }
        }

        if fraction_digits > 0 {
            out.push('.');
            let start = if self.is_zero() { 0 } else { self.exponent };
            for offset in 0..fraction_digits as i64 {
                let digit = if self.is_zero() {
                    0
                } else {
                    self.digit_at(start + offset)
                };
                out.push(char::from(b'0' + digit));
            }
        }
        out
    }

    fn to_scientific(&self, sig_figs: usize) -> String {
        let mut out = String::from(self.sign());
        out.push(char::from(b'0' + self.digit_at(0)));
        if sig_figs > 1 {
            out.push('.');
            for pos in 1..sig_figs as i64 {
                out.push(char::from(b'0' + self.digit_at(pos)));
            }
        }

        let magnitude = self.exponent - 1;
        out.push_str(" × 10");
        out.push(if magnitude >= 0 { '⁺' } else { '⁻' });
        for c in magnitude.unsigned_abs().to_string().chars() {
            if let Some(d) = c.to_digit(10) {
                out.push(SUPERSCRIPT_DIGITS[d as usize]);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_sig_figs_integers() {
        assert_eq!(count_sig_figs("100"), 1);
        assert_eq!(count_sig_figs("1000"), 1);
        assert_eq!(count_sig_figs("12010"), 4);
        assert_eq!(count_sig_figs("-450"), 2);
    }

    #[test]
    fn test_count_sig_figs_decimals() {
        assert_eq!(count_sig_figs("100.0"), 4);
        assert_eq!(count_sig_figs("0.0050"), 2);
        assert_eq!(count_sig_figs("0.004560"), 4);
        assert_eq!(count_sig_figs("120.0040"), 7);
    }

    #[test]
    fn test_count_sig_figs_scientific_and_edge_cases() {
        assert_eq!(count_sig_figs("123E5"), 3);
        assert_eq!(count_sig_figs("1.20e-3"), 3);
        assert_eq!(count_sig_figs("0"), 1);
        assert_eq!(count_sig_figs("0.00"), 1);
        assert_eq!(count_sig_figs(""), 0);
        assert_eq!(count_sig_figs("abc"), 0);
    }

    #[test]
    fn test_sig_figs_uses_scientific_for_large_integers() {
        assert_eq!(format_with_sig_figs("12345", 3), "1.23 × 10⁺⁴");
        assert_eq!(format_with_sig_figs("1000", 3), "1.00 × 10⁺³");
        assert_eq!(format_with_sig_figs("1000", 2), "1.0 × 10⁺³");
        assert_eq!(format_with_sig_figs("1000", 1), "1 × 10⁺³");
    }

    #[test]
    fn test_sig_figs_ambiguous_trailing_zeros() {
        assert_eq!(format_with_sig_figs("100.0", 2), "1.0 × 10⁺²");
        assert_eq!(format_with_sig_figs("100.0", 3), "1.00 × 10⁺²");
        assert_eq!(format_with_sig_figs("10.0", 2), "1.0 × 10⁺¹");
        assert_eq!(format_with_sig_figs("9.99", 2), "1.0 × 10⁺¹");
    }

    #[test]
    fn test_sig_figs_fixed_notation() {
        assert_eq!(format_with_sig_figs("1.000", 2), "1.0");
        assert_eq!(format_with_sig_figs("0.004560", 1), "0.005");
        assert_eq!(format_with_sig_figs("105.004560", 3), "105");
        assert_eq!(format_with_sig_figs("105.004560", 5), "105.00");
        assert_eq!(format_with_sig_figs("10.5004560", 5), "10.500");
        assert_eq!(format_with_sig_figs("3.14159", 3), "3.14");
    }

    #[test]
    fn test_sig_figs_half_up() {
        assert_eq!(format_with_sig_figs("0.15", 1), "0.2");
        assert_eq!(format_with_sig_figs("0.25", 1), "0.3");
        assert_eq!(format_with_sig_figs("-0.25", 1), "-0.3");
    }

    #[test]
    fn test_sig_figs_tiny_values_use_negative_exponent() {
        assert_eq!(format_with_sig_figs("0.000000123456", 3), "1.23 × 10⁻⁷");
        assert_eq!(format_with_sig_figs("0.00000123", 2), "0.0000012");
    }

    #[test]
    fn test_sig_figs_passthrough() {
        assert_eq!(format_with_sig_figs("abc", 3), "abc");
        assert_eq!(format_with_sig_figs("12.5", 0), "12.5");
        assert_eq!(format_with_sig_figs("12.5", -2), "12.5");
        assert_eq!(format_with_sig_figs("0", 3), "0");
    }

    #[test]
    fn test_sig_figs_scientific_input() {
        assert_eq!(format_with_sig_figs("1.2345e4", 3), "1.23 × 10⁺⁴");
        assert_eq!(format_with_sig_figs("5e-1", 2), "0.50");
    }

    #[test]
    fn test_rounding_pads_and_rounds() {
        assert_eq!(format_with_rounding("3.14159", 2), "3.14");
        assert_eq!(format_with_rounding("3", 2), "3.00");
        assert_eq!(format_with_rounding("2.5", 0), "3");
        assert_eq!(format_with_rounding("0.004", 2), "0.00");
        assert_eq!(format_with_rounding("0.005", 2), "0.01");
        assert_eq!(format_with_rounding("99.995", 2), "100.00");
    }

    #[test]
    fn test_rounding_is_exact_half_up() {
        // Binary floats would give 2.00 here
        assert_eq!(format_with_rounding("2.005", 2), "2.01");
        assert_eq!(format_with_rounding("-2.005", 2), "-2.01");
        assert_eq!(format_with_rounding("1.0049", 2), "1.00");
    }

    #[test]
    fn test_rounding_negative_zero_has_no_sign() {
        assert_eq!(format_with_rounding("-0.001", 2), "0.00");
        assert_eq!(format_with_rounding("-0", 1), "0.0");
    }

    #[test]
    fn test_rounding_passthrough() {
        assert_eq!(format_with_rounding("n/a", 2), "n/a");
        assert_eq!(format_with_rounding("1.5", -1), "1.5");
    }

    #[test]
    fn test_precision_above_limit_passes_through() {
        assert_eq!(format_with_sig_figs("0.001", i64::MAX), "0.001");
        assert_eq!(format_with_sig_figs("12345", MAX_PRECISION + 1), "12345");
        assert_eq!(format_with_rounding("5", i64::MAX), "5");
        assert_eq!(format_with_rounding("1.25", MAX_PRECISION + 1), "1.25");
        assert_eq!(format("1.5", &FormatOptions::decimal_places(i64::MAX)), "1.5");
    }

    #[test]
    fn test_precision_at_limit_is_formatted() {
        let rounded = format_with_rounding("1.5", MAX_PRECISION);
        assert_eq!(rounded.len(), 2 + MAX_PRECISION as usize);
        assert!(rounded.starts_with("1.50"));

        let fixed = format_with_sig_figs("0.5", MAX_PRECISION);
        assert_eq!(fixed.len(), 2 + MAX_PRECISION as usize);
    }

    #[test]
    fn test_format_respects_mode() {
        let opts = FormatOptions {
            rounding_mode: RoundingMode::None,
            sig_figs: Some(2),
            decimal_places: Some(1),
        };
        assert_eq!(format("3.14159", &opts), "3.14159");

        let opts = FormatOptions {
            rounding_mode: RoundingMode::Sigfigs,
            ..opts
        };
        assert_eq!(format("3.14159", &opts), "3.1");

        let opts = FormatOptions {
            rounding_mode: RoundingMode::Standard,
            ..opts
        };
        assert_eq!(format("3.14159", &opts), "3.1");
        assert_eq!(format("3.15159", &opts), "3.2");
    }

    #[test]
    fn test_format_legacy_both_set_prefers_explicit_mode() {
        let opts = FormatOptions {
            rounding_mode: RoundingMode::Sigfigs,
            sig_figs: Some(3),
            decimal_places: Some(1),
        };
        assert_eq!(format("12.345", &opts), "12.3");
        assert_eq!(opts.ignored_field(), Some(FormatField::DecimalPlaces));

        let opts = FormatOptions {
            rounding_mode: RoundingMode::Standard,
            ..opts
        };
        assert_eq!(format("12.345", &opts), "12.3");
        assert_eq!(opts.ignored_field(), Some(FormatField::SigFigs));
    }

    #[test]
    fn test_format_missing_parameter_passes_through() {
        let opts = FormatOptions {
            rounding_mode: RoundingMode::Sigfigs,
            sig_figs: None,
            decimal_places: Some(2),
        };
        assert_eq!(format("1.2345", &opts), "1.2345");

        let opts = FormatOptions {
            rounding_mode: RoundingMode::Standard,
            sig_figs: Some(2),
            decimal_places: None,
        };
        assert_eq!(format("1.2345", &opts), "1.2345");
    }

    #[test]
    fn test_format_blank_and_non_numeric() {
        let opts = FormatOptions::sig_figs(3);
        assert_eq!(format("", &opts), "");
        assert_eq!(format("   ", &opts), "   ");
        assert_eq!(format("12abc", &opts), "12abc");
        assert_eq!(format("NaN", &opts), "NaN");
        assert_eq!(format("inf", &opts), "inf");
        assert_eq!(format("1e999", &opts), "1e999");
    }

    #[test]
    fn test_infer_mode() {
        assert_eq!(RoundingMode::infer(Some(3), None), RoundingMode::Sigfigs);
        assert_eq!(RoundingMode::infer(Some(3), Some(0)), RoundingMode::Sigfigs);
        assert_eq!(RoundingMode::infer(None, Some(2)), RoundingMode::Standard);
        assert_eq!(RoundingMode::infer(Some(3), Some(2)), RoundingMode::None);
        assert_eq!(RoundingMode::infer(Some(0), Some(0)), RoundingMode::None);
        assert_eq!(
            FormatOptions::from_legacy(Some(2), None).rounding_mode,
            RoundingMode::Sigfigs
        );
    }

    #[test]
    fn test_ignored_field_requires_both_values() {
        assert_eq!(FormatOptions::sig_figs(3).ignored_field(), None);
        let opts = FormatOptions {
            rounding_mode: RoundingMode::None,
            sig_figs: Some(3),
            decimal_places: Some(2),
        };
        assert_eq!(opts.ignored_field(), None);
    }

    #[test]
    fn test_inequality_prefix() {
        assert_eq!(
            apply_inequality("1.23", true, InequalityOperator::GreaterThan),
            ">1.23"
        );
        assert_eq!(apply_inequality("1.23", true, InequalityOperator::LessThan), "<1.23");
        assert_eq!(apply_inequality("1.23", true, InequalityOperator::Equal), "1.23");
        assert_eq!(
            apply_inequality("1.23", false, InequalityOperator::GreaterThan),
            "1.23"
        );
        assert_eq!(apply_inequality("", true, InequalityOperator::LessThan), "");
    }

    #[test]
    fn test_display_value_only_rounds_numeric_inputs() {
        let numeric = DisplayOptions {
            numeric: true,
            format: FormatOptions::decimal_places(1),
            allow_inequalities: true,
            operator: InequalityOperator::LessThan,
        };
        assert_eq!(display_value("0.04", &numeric), "<0.0");

        let text = DisplayOptions {
            numeric: false,
            ..numeric
        };
        assert_eq!(display_value("0.04", &text), "0.04");
    }

    #[test]
    fn test_enum_serde_names() {
        assert_eq!(
            serde_json::to_string(&RoundingMode::Sigfigs).unwrap(),
            "\"sigfigs\""
        );
        assert_eq!(
            serde_json::from_str::<InequalityOperator>("\">\"").unwrap(),
            InequalityOperator::GreaterThan
        );
        assert_eq!(RoundingMode::parse("standard"), Some(RoundingMode::Standard));
        assert_eq!(RoundingMode::parse("bogus"), None);
    }
}
