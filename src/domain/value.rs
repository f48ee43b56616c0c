//! Built-in literal coercions.
//!
//! Every type that can be declared on a parameter without a factory implements
//! [`ArgValue`]. Integers, floats, decimals, booleans, date-times, durations and
//! strings are covered here; enumerations get an implementation through
//! [`arg_enum!`](crate::arg_enum).

use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use rust_decimal::Decimal;

use crate::domain::error::ValueError;

/// A value that can be coerced from one raw command-line token.
pub trait ArgValue: Sized + Clone + Send + Sync + 'static {
    /// Label used in usage text and error messages.
    const TYPE_NAME: &'static str;

    fn parse_arg(raw: &str) -> Result<Self, ValueError>;

    /// Rendering of a default value in usage text.
    fn label(&self) -> String;
}

macro_rules! number_values {
    ($($t:ty),* $(,)?) => {
        $(
            impl ArgValue for $t {
                const TYPE_NAME: &'static str = stringify!($t);

                fn parse_arg(raw: &str) -> Result<Self, ValueError> {
                    raw.trim()
                        .parse::<$t>()
                        .map_err(|e| ValueError::invalid(Self::TYPE_NAME, raw, e))
                }

                fn label(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

number_values!(i8, u8, i16, u16, i32, u32, i64, u64, i128, u128, isize, usize, f32, f64);

impl ArgValue for Decimal {
    const TYPE_NAME: &'static str = "decimal";

    fn parse_arg(raw: &str) -> Result<Self, ValueError> {
        let s = raw.trim();
        Decimal::from_str(s)
            .or_else(|_| Decimal::from_scientific(s))
            .map_err(|e| ValueError::invalid(Self::TYPE_NAME, raw, e))
    }

    fn label(&self) -> String {
        self.to_string()
    }
}

impl ArgValue for bool {
    const TYPE_NAME: &'static str = "bool";

    fn parse_arg(raw: &str) -> Result<Self, ValueError> {
        match raw.trim().to_lowercase().as_str() {
            "yes" | "y" | "true" | "t" | "1" => Ok(true),
            "no" | "n" | "false" | "f" | "0" => Ok(false),
            _ => Err(ValueError::Bool(raw.to_string())),
        }
    }

    fn label(&self) -> String {
        self.to_string()
    }
}

impl ArgValue for String {
    const TYPE_NAME: &'static str = "string";

    fn parse_arg(raw: &str) -> Result<Self, ValueError> {
        Ok(raw.to_string())
    }

    fn label(&self) -> String {
        self.clone()
    }
}

impl ArgValue for PathBuf {
    const TYPE_NAME: &'static str = "path";

    fn parse_arg(raw: &str) -> Result<Self, ValueError> {
        Ok(PathBuf::from(raw))
    }

    fn label(&self) -> String {
        self.display().to_string()
    }
}

const DATE_FORMAT: &str = "%Y-%m-%d";

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

impl ArgValue for NaiveDateTime {
    const TYPE_NAME: &'static str = "date-time";

    fn parse_arg(raw: &str) -> Result<Self, ValueError> {
        let s = raw.trim();
        if let Some(dt) = DATE_TIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        {
            return Ok(dt);
        }
        if let Ok(date) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
            return Ok(date.and_time(NaiveTime::default()));
        }
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.naive_local())
            .map_err(|e| ValueError::invalid(Self::TYPE_NAME, raw, e))
    }

    fn label(&self) -> String {
        self.to_string()
    }
}

impl ArgValue for NaiveDate {
    const TYPE_NAME: &'static str = "date";

    fn parse_arg(raw: &str) -> Result<Self, ValueError> {
        NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
            .map_err(|e| ValueError::invalid(Self::TYPE_NAME, raw, e))
    }

    fn label(&self) -> String {
        self.to_string()
    }
}

impl ArgValue for DateTime<FixedOffset> {
    const TYPE_NAME: &'static str = "date-time-offset";

    /// RFC 3339 with offset; literals without an offset are taken as UTC.
    fn parse_arg(raw: &str) -> Result<Self, ValueError> {
        match DateTime::parse_from_rfc3339(raw.trim()) {
            Ok(dt) => Ok(dt),
            Err(_) => NaiveDateTime::parse_arg(raw).map(|naive| naive.and_utc().fixed_offset()),
        }
    }

    fn label(&self) -> String {
        self.to_rfc3339()
    }
}

impl ArgValue for TimeDelta {
    const TYPE_NAME: &'static str = "duration";

    fn parse_arg(raw: &str) -> Result<Self, ValueError> {
        parse_time_span(raw)
    }

    fn label(&self) -> String {
        self.to_string()
    }
}

/// Parse a time span of the shape `[-][d.]hh:mm[:ss[.fffffff]]`, or a bare
/// day count.
pub fn parse_time_span(raw: &str) -> Result<TimeDelta, ValueError> {
    let kind = TimeDelta::TYPE_NAME;
    let s = raw.trim();
    let (negative, body) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    if body.is_empty() {
        return Err(ValueError::invalid(kind, raw, "empty duration"));
    }

    let (days, clock) = match body.find(':') {
        None => (body, None),
        Some(colon) => match body[..colon].split_once('.') {
            Some((days, hours)) => (days, Some((hours, &body[colon + 1..]))),
            None => ("0", Some((&body[..colon], &body[colon + 1..]))),
        },
    };

    let days = parse_component(days, u32::MAX, raw, "days")?;
    let mut seconds = i64::from(days) * 86_400;
    let mut nanos = 0u32;

    if let Some((hours, rest)) = clock {
        let hours = parse_component(hours, 23, raw, "hours")?;
        let (minutes, secs) = match rest.split_once(':') {
            Some((m, s)) => (m, Some(s)),
            None => (rest, None),
        };
        let minutes = parse_component(minutes, 59, raw, "minutes")?;
        seconds += i64::from(hours) * 3_600 + i64::from(minutes) * 60;

        if let Some(secs) = secs {
            let (whole, fraction) = match secs.split_once('.') {
                Some((w, f)) => (w, Some(f)),
                None => (secs, None),
            };
            seconds += i64::from(parse_component(whole, 59, raw, "seconds")?);
            if let Some(fraction) = fraction {
                nanos = parse_fraction(fraction, raw)?;
            }
        }
    }

    let delta = TimeDelta::new(seconds, nanos)
        .ok_or_else(|| ValueError::invalid(kind, raw, "duration out of range"))?;
    Ok(if negative { -delta } else { delta })
}

fn parse_component(s: &str, max: u32, raw: &str, what: &str) -> Result<u32, ValueError> {
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValueError::invalid(
            TimeDelta::TYPE_NAME,
            raw,
            format!("{what} must be digits"),
        ));
    }
    let value: u32 = s
        .parse()
        .map_err(|e| ValueError::invalid(TimeDelta::TYPE_NAME, raw, e))?;
    if value > max {
        return Err(ValueError::invalid(
            TimeDelta::TYPE_NAME,
            raw,
            format!("{what} out of range (max {max})"),
        ));
    }
    Ok(value)
}

fn parse_fraction(s: &str, raw: &str) -> Result<u32, ValueError> {
    if s.is_empty() || s.len() > 9 || !s.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValueError::invalid(
            TimeDelta::TYPE_NAME,
            raw,
            "fraction must be 1 to 9 digits",
        ));
    }
    let padded = format!("{s:0<9}");
    padded
        .parse()
        .map_err(|e| ValueError::invalid(TimeDelta::TYPE_NAME, raw, e))
}

/// Declare an enumeration whose members are parsed by exact, case-sensitive
/// name.
///
/// ```
/// rsargs::arg_enum! {
///     pub enum Color { Red, Green, Blue }
/// }
/// use rsargs::ArgValue;
/// assert_eq!(Color::parse_arg("Green").unwrap(), Color::Green);
/// assert!(Color::parse_arg("green").is_err());
/// ```
#[macro_export]
macro_rules! arg_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Member names in declaration order.
            pub const VARIANTS: &'static [&'static str] = &[$(stringify!($variant)),+];
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                let name = match self {
                    $(Self::$variant => stringify!($variant)),+
                };
                f.write_str(name)
            }
        }

        impl $crate::ArgValue for $name {
            const TYPE_NAME: &'static str = stringify!($name);

            fn parse_arg(raw: &str) -> ::std::result::Result<Self, $crate::ValueError> {
                match raw {
                    $(stringify!($variant) => Ok(Self::$variant),)+
                    _ => Err($crate::ValueError::Enum {
                        literal: raw.to_string(),
                        type_name: stringify!($name),
                        expected: Self::VARIANTS.join(", "),
                    }),
                }
            }

            fn label(&self) -> ::std::string::String {
                ::std::string::ToString::to_string(self)
            }
        }
    };
}
