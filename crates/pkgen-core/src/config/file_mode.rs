//! Permission bits of generated files.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::PkgenError;

/// Unix permission bits, always interpreted as octal when parsed from text.
///
/// `0o644`, `0O644` and `644` all parse to `0o644`. Zero means unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FileMode(u32);

impl FileMode {
    /// Highest accepted value: permission plus setuid/setgid/sticky bits.
    pub const MAX: u32 = 0o7777;

    pub const fn new(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    fn from_bits_checked(bits: u32, literal: &str) -> Result<Self, PkgenError> {
        if bits > Self::MAX {
            return Err(PkgenError::InvalidFileMode(literal.to_string()));
        }
        Ok(Self(bits))
    }
}

impl FromStr for FileMode {
    type Err = PkgenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0o")
            .or_else(|| s.strip_prefix("0O"))
            .unwrap_or(s);

        if digits.is_empty() || !digits.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
            return Err(PkgenError::InvalidFileMode(s.to_string()));
        }

        let bits = u32::from_str_radix(digits, 8)
            .map_err(|_| PkgenError::InvalidFileMode(s.to_string()))?;
        Self::from_bits_checked(bits, s)
    }
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0o{:o}", self.0)
    }
}

/// Permission bits an integer `mod` value may carry.
const PERMISSION_BITS: u32 = 0o777;

impl Serialize for FileMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FileMode {
    /// Strings follow the `-mod` literal rules. Integers are raw bits, so a
    /// YAML `0o644` literal works. An integer outside the `0o777` permission
    /// range is rejected: a bare `644` is decimal and would set the sticky bit.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Bits(u32),
            Literal(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Bits(bits) if bits & !PERMISSION_BITS != 0 => Err(de::Error::custom(format!(
                "file mode {bits} is not a permission value; write it as an octal string, e.g. \"0o{bits}\""
            ))),
            Raw::Bits(bits) => Ok(FileMode(bits)),
            Raw::Literal(s) => s.parse().map_err(de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prefixed() {
        assert_eq!("0o755".parse::<FileMode>().unwrap(), FileMode::new(0o755));
        assert_eq!("0O644".parse::<FileMode>().unwrap(), FileMode::new(0o644));
    }

    #[test]
    fn test_parse_bare_digits_are_octal() {
        assert_eq!("600".parse::<FileMode>().unwrap(), FileMode::new(0o600));
        assert_eq!("0644".parse::<FileMode>().unwrap(), FileMode::new(0o644));
    }

    #[test]
    fn test_parse_invalid() {
        for bad in ["", "0o", "0x644", "abc", "789", "+644", "0o17777", "-1"] {
            let err = bad.parse::<FileMode>().unwrap_err();
            assert!(matches!(err, PkgenError::InvalidFileMode(_)), "{bad}");
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(FileMode::new(0o644).to_string(), "0o644");
    }

    #[test]
    fn test_deserialize_string_and_int() {
        let m: FileMode = serde_yaml::from_str("\"600\"").unwrap();
        assert_eq!(m, FileMode::new(0o600));
        let m: FileMode = serde_yaml::from_str("420").unwrap();
        assert_eq!(m, FileMode::new(0o644));
        assert!(serde_yaml::from_str::<FileMode>("\"0o9\"").is_err());
        assert!(serde_yaml::from_str::<FileMode>("true").is_err());
    }

    #[test]
    fn test_deserialize_decimal_looking_octal_is_rejected() {
        let err = serde_yaml::from_str::<FileMode>("644").unwrap_err();
        assert!(err.to_string().contains("\"0o644\""), "{err}");
        assert!(serde_yaml::from_str::<FileMode>("4096").is_err());

        let m: FileMode = serde_yaml::from_str("0o644").unwrap();
        assert_eq!(m, FileMode::new(0o644));
        let m: FileMode = serde_yaml::from_str("\"644\"").unwrap();
        assert_eq!(m, FileMode::new(0o644));
        let m: FileMode = serde_yaml::from_str("\"0o4755\"").unwrap();
        assert_eq!(m, FileMode::new(0o4755));
    }
}
