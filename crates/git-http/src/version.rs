//! Parsing, ordering and printing of `vN[.M[.P]][-dev]` version tokens.

use std::cmp::Ordering;
use std::fmt;

/// A parsed `vN[.M[.P]][-dev]` token. Missing components are `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Version {
    pub major: i32,
    pub minor: i32,
    pub patch: i32,
    pub dev: bool,
}

impl Version {
    /// The sentinel returned by [`Version::parse`] on any unparseable input.
    pub const INVALID: Version = Version { major: -1, minor: -1, patch: -1, dev: false };

    pub fn is_invalid(&self) -> bool {
        *self == Self::INVALID
    }

    /// Parses a token of the form `v1`, `v1.2`, `v1.2.3`, optionally suffixed with `-dev`.
    ///
    /// Any `-suffix` other than `-dev` yields [`Version::INVALID`]; the caller is
    /// expected to fall back to exact ref-name matching in that case.
    pub fn parse(s: &str) -> Version {
        if s.is_empty() || !s.starts_with('v') {
            return Self::INVALID;
        }
        let rest = &s[1..];

        let (body, dev) = match rest.rfind('-') {
            Some(idx) => {
                let marker = &rest[idx + 1..];
                if marker != "dev" {
                    return Self::INVALID;
                }
                (&rest[..idx], true)
            }
            None => (rest, false),
        };

        if body.is_empty() {
            return Self::INVALID;
        }

        let parts: Vec<&str> = body.split('.').collect();
        if parts.is_empty() || parts.len() > 3 {
            return Self::INVALID;
        }

        let mut nums = [-1i32; 3];
        for (i, part) in parts.iter().enumerate() {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Self::INVALID;
            }
            match part.parse::<i32>() {
                Ok(n) => nums[i] = n,
                Err(_) => return Self::INVALID,
            }
        }

        Version { major: nums[0], minor: nums[1], patch: nums[2], dev }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let base = if self.major > 0 && self.minor > 0 && self.patch > 0 {
            format!("v{}.{}.{}", self.major, self.minor, self.patch)
        } else if self.major > 0 && self.minor > 0 {
            format!("v{}.{}", self.major, self.minor)
        } else if self.major > 0 {
            format!("v{}", self.major)
        } else {
            return write!(
                f,
                "Version {{ major: {}, minor: {}, patch: {}, dev: {} }}",
                self.major, self.minor, self.patch, self.dev
            );
        };
        if self.dev {
            write!(f, "{base}-dev")
        } else {
            write!(f, "{base}")
        }
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        // A dev version is always below any non-dev version, regardless of numbers.
        match (self.dev, other.dev) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch)),
        }
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
