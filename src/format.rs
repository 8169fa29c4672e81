//! Rendering of real constants into the generated code.
//!
//! The caller configures the constant format with a printf-style spec such as
//! `"%21.14e"`, so the emitted text can be diffed against code produced by
//! C-based tooling. Only the floating-point conversions are meaningful here,
//! so the parser accepts exactly `e`, `E`, `f`, `F`, `g` and `G`, plus the
//! `-`, `+` and `0` flags, a field width and a precision.

use std::fmt::Write;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Conversion {
    /// `%e`: mantissa and exponent, exponent always signed with two digits minimum
    Scientific,
    /// `%f`: fixed number of fraction digits
    Fixed,
    /// `%g`: whichever of the two is shorter, with trailing zeros removed
    Shortest,
}

/// A parsed printf-style conversion spec for one real constant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct NumberFormat {
    left_align: bool,
    force_sign: bool,
    zero_pad: bool,
    width: usize,
    precision: Option<usize>,
    conversion: Conversion,
    uppercase: bool,
}

impl NumberFormat {
    /// Parses a spec of the shape `%[flags][width][.precision]conversion`.
    /// Returns `None` if the spec is malformed or uses an unsupported
    /// conversion.
    pub fn parse(spec: &str) -> Option<Self> {
        let rest = spec.strip_prefix('%')?;
        let mut chars = rest.chars().peekable();

        let mut left_align = false;
        let mut force_sign = false;
        let mut zero_pad = false;
        while let Some(&c) = chars.peek() {
            match c {
                '-' => left_align = true,
                '+' => force_sign = true,
                '0' => zero_pad = true,
                _ => break,
            }
            chars.next();
        }

        let mut width = 0usize;
        while let Some(c) = chars.peek().filter(|c| c.is_ascii_digit()) {
            width = width * 10 + c.to_digit(10).unwrap() as usize;
            chars.next();
        }

        let mut precision = None;
        if chars.peek() == Some(&'.') {
            chars.next();
            let mut digits = 0usize;
            while let Some(c) = chars.peek().filter(|c| c.is_ascii_digit()) {
                digits = digits * 10 + c.to_digit(10).unwrap() as usize;
                chars.next();
            }
            precision = Some(digits);
        }

        let (conversion, uppercase) = match chars.next()? {
            'e' => (Conversion::Scientific, false),
            'E' => (Conversion::Scientific, true),
            'f' => (Conversion::Fixed, false),
            'F' => (Conversion::Fixed, true),
            'g' => (Conversion::Shortest, false),
            'G' => (Conversion::Shortest, true),
            _ => return None,
        };
        if chars.next().is_some() {
            return None;
        }

        Some(NumberFormat {
            left_align,
            force_sign,
            zero_pad,
            width,
            precision,
            conversion,
            uppercase,
        })
    }

    /// Renders `value` the way C's `printf` would for the parsed spec.
    pub fn format(&self, value: f64) -> String {
        let precision = self.precision.unwrap_or(6);
        let mut body = match self.conversion {
            Conversion::Scientific => format_scientific(value, precision, self.uppercase),
            Conversion::Fixed => format!("{:.*}", precision, value),
            Conversion::Shortest => format_shortest(value, precision, self.uppercase),
        };

        if self.force_sign && !body.starts_with('-') {
            body.insert(0, '+');
        }
        if body.len() >= self.width {
            return body;
        }

        let pad = self.width - body.len();
        if self.left_align {
            body.push_str(&" ".repeat(pad));
            body
        } else if self.zero_pad {
            let digits_at = body.starts_with('-') || body.starts_with('+');
            body.insert_str(digits_at as usize, &"0".repeat(pad));
            body
        } else {
            let mut padded = " ".repeat(pad);
            padded.push_str(&body);
            padded
        }
    }
}

/// `%e` rendering. Rust's `{:e}` writes exponents like `e-1`, C writes
/// `e-01`, so the exponent is re-rendered with a sign and two digits minimum.
fn format_scientific(value: f64, precision: usize, uppercase: bool) -> String {
    let rendered = format!("{:.*e}", precision, value);
    let (mantissa, exponent) = rendered
        .rsplit_once('e')
        .expect("float exponent formatting always yields an exponent");
    let exponent: i32 = exponent
        .parse()
        .expect("float exponent formatting always yields an integer exponent");

    let mut result = String::with_capacity(mantissa.len() + 4);
    result.push_str(mantissa);
    result.push(if uppercase { 'E' } else { 'e' });
    result.push(if exponent < 0 { '-' } else { '+' });
    write!(result, "{:02}", exponent.abs()).unwrap();
    result
}

/// `%g` rendering: pick `%e` when the decimal exponent falls outside
/// `[-4, precision)`, else `%f` scaled to the same number of significant
/// digits, and strip trailing fraction zeros either way.
fn format_shortest(value: f64, precision: usize, uppercase: bool) -> String {
    let significant = precision.max(1);
    let rendered = format!("{:.*e}", significant - 1, value);
    let (_, exponent) = rendered.rsplit_once('e').unwrap();
    let exponent: i32 = exponent.parse().unwrap();

    if exponent < -4 || exponent >= significant as i32 {
        let scientific = format_scientific(value, significant - 1, uppercase);
        let (mantissa, suffix) = scientific.split_at(scientific.find(['e', 'E']).unwrap());
        let mut result = trim_fraction_zeros(mantissa).to_owned();
        result.push_str(suffix);
        result
    } else {
        let fraction_digits = (significant as i32 - 1 - exponent).max(0) as usize;
        trim_fraction_zeros(&format!("{:.*}", fraction_digits, value)).to_owned()
    }
}

fn trim_fraction_zeros(rendered: &str) -> &str {
    if rendered.contains('.') {
        rendered.trim_end_matches('0').trim_end_matches('.')
    } else {
        rendered
    }
}
