//! Textual encodings for every supported parameter type.
//!
//! Each type has two decoders. The environment decoder is strict base-10
//! (or the type's plain textual form); the command-line decoder follows the
//! looser conventions users expect from flags. The two differ for integers,
//! which accept `0x`/`0o`/`0b` prefixes on the command line only, and for
//! [`Duration`], which is a raw nanosecond count in the environment but a
//! human-readable duration (`5s`, `1h 30m`) on the command line.

use std::time::Duration;

/// A scalar type that can back a [`Param`](crate::Param)
pub trait ParamValue: Clone + Send + Sync + 'static {
    /// Name used in diagnostics, e.g. `'PORT' environment variable should be 'int'`
    const TYPE_NAME: &'static str;

    /// Placeholder shown after the flag name in usage output; empty for bool
    const USAGE_LABEL: &'static str;

    /// Whether a bare `-name` sets the flag (bool only)
    const IS_BOOL_FLAG: bool = false;

    /// Decode an environment variable value
    fn from_env(text: &str) -> Result<Self, String>;

    /// Decode a command-line value
    fn from_flag(text: &str) -> Result<Self, String> {
        Self::from_env(text)
    }

    /// Render the value the way usage output and docs show it
    fn to_text(&self) -> String;

    /// Zero values are left out of the `(default ...)` usage note
    fn is_zero(&self) -> bool;

    /// Default value as written in usage output
    fn usage_default(&self) -> String {
        self.to_text()
    }
}

/// Parse the boolean spellings accepted everywhere: `1 t T TRUE true True` and
/// `0 f F FALSE false False`
pub fn parse_bool(text: &str) -> Result<bool, String> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err("invalid boolean syntax".to_string()),
    }
}

impl ParamValue for bool {
    const TYPE_NAME: &'static str = "bool";
    const USAGE_LABEL: &'static str = "";
    const IS_BOOL_FLAG: bool = true;

    fn from_env(text: &str) -> Result<Self, String> {
        parse_bool(text)
    }

    fn to_text(&self) -> String {
        self.to_string()
    }

    fn is_zero(&self) -> bool {
        !*self
    }
}

/// Environment: non-negative base-10 `i64` count of nanoseconds (`5000000000`
/// is five seconds, `5s` is rejected). Command line: human-readable via
/// `humantime`.
impl ParamValue for Duration {
    const TYPE_NAME: &'static str = "duration";
    const USAGE_LABEL: &'static str = "duration";

    fn from_env(text: &str) -> Result<Self, String> {
        let nanos = text.parse::<i64>().map_err(|e| e.to_string())?;
        u64::try_from(nanos)
            .map(Duration::from_nanos)
            .map_err(|_| "negative duration".to_string())
    }

    fn from_flag(text: &str) -> Result<Self, String> {
        humantime::parse_duration(text).map_err(|e| e.to_string())
    }

    fn to_text(&self) -> String {
        humantime::format_duration(*self).to_string()
    }

    fn is_zero(&self) -> bool {
        *self == Duration::ZERO
    }
}

const INVALID_DIGIT: &str = "invalid digit found in string";

/// Split a command-line integer literal into sign, radix and digits.
///
/// `0x`, `0o` and `0b` select the radix, a leading `0` means octal, and
/// underscores are only permitted once a prefix has been seen. At most one
/// sign may lead the literal, and none at all for unsigned types.
fn split_int_literal(text: &str, signed: bool) -> Result<(bool, u32, String), String> {
    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    if !signed && rest.len() != text.len() {
        return Err(INVALID_DIGIT.to_string());
    }

    let prefix = rest.get(..2).map(|p| p.to_ascii_lowercase());
    let (radix, digits) = match prefix.as_deref() {
        Some("0x") => (16, rest[2..].replace('_', "")),
        Some("0o") => (8, rest[2..].replace('_', "")),
        Some("0b") => (2, rest[2..].replace('_', "")),
        _ if rest.len() > 1 && rest.starts_with('0') => (8, rest[1..].replace('_', "")),
        _ => (10, rest.to_string()),
    };

    if digits.starts_with(['+', '-']) {
        return Err(INVALID_DIGIT.to_string());
    }
    Ok((negative, radix, digits))
}

macro_rules! int_param {
    ($ty:ty, $type_name:literal, $label:literal, $signed:literal) => {
        impl ParamValue for $ty {
            const TYPE_NAME: &'static str = $type_name;
            const USAGE_LABEL: &'static str = $label;

            fn from_env(text: &str) -> Result<Self, String> {
                if !$signed && text.starts_with('+') {
                    return Err(INVALID_DIGIT.to_string());
                }
                text.parse::<$ty>().map_err(|e| e.to_string())
            }

            fn from_flag(text: &str) -> Result<Self, String> {
                let (negative, radix, digits) = split_int_literal(text, $signed)?;
                let literal = if negative { format!("-{}", digits) } else { digits };
                <$ty>::from_str_radix(&literal, radix).map_err(|e| e.to_string())
            }

            fn to_text(&self) -> String {
                self.to_string()
            }

            fn is_zero(&self) -> bool {
                *self == 0
            }
        }
    };
}

int_param!(isize, "int", "int", true);
int_param!(i64, "int64", "int", true);
int_param!(usize, "uint", "uint", false);
int_param!(u64, "uint64", "uint", false);

impl ParamValue for f64 {
    const TYPE_NAME: &'static str = "float64";
    const USAGE_LABEL: &'static str = "float";

    fn from_env(text: &str) -> Result<Self, String> {
        text.parse::<f64>().map_err(|e| e.to_string())
    }

    fn to_text(&self) -> String {
        self.to_string()
    }

    fn is_zero(&self) -> bool {
        *self == 0.0
    }
}

/// Strings are taken verbatim; an empty value is still a value.
impl ParamValue for String {
    const TYPE_NAME: &'static str = "string";
    const USAGE_LABEL: &'static str = "string";

    fn from_env(text: &str) -> Result<Self, String> {
        Ok(text.to_string())
    }

    fn to_text(&self) -> String {
        self.clone()
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn usage_default(&self) -> String {
        format!("{:?}", self)
    }
}
