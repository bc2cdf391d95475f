//! Port types with validation and parsing.
//!
//! The `Port` newtype ensures values are always valid port numbers (1-65535).
//! `PortSpec` parses the request grammar: `all`, `a-b` or a single port.

use std::fmt;
use std::str::FromStr;

/// A validated network port number (1-65535).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Port(u16);

impl Port {
    /// Minimum valid port number.
    pub const MIN: u16 = 1;
    /// Maximum valid port number.
    pub const MAX: u16 = 65535;

    /// Create a new Port from a u16, returning None if invalid.
    #[inline]
    pub const fn new(port: u16) -> Option<Self> {
        if port >= Self::MIN {
            Some(Self(port))
        } else {
            None
        }
    }

    /// Get the raw port number.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for Port {
    type Error = PortError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(PortError::OutOfRange(i64::from(value)))
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

/// Error type for port parsing and validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("port {0} is out of valid range (1-65535)")]
    OutOfRange(i64),
    #[error("invalid port number: {0}")]
    InvalidFormat(String),
    #[error("invalid port range: start ({0}) > end ({1})")]
    InvalidRange(i64, i64),
    #[error("empty port specification")]
    Empty,
}

/// A range of ports (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    start: Port,
    end: Port,
}

impl PortRange {
    /// Create a new port range.
    pub fn new(start: Port, end: Port) -> Result<Self, PortError> {
        if start.0 > end.0 {
            Err(PortError::InvalidRange(start.0.into(), end.0.into()))
        } else {
            Ok(Self { start, end })
        }
    }

    /// Create a range containing a single port.
    pub const fn single(port: Port) -> Self {
        Self {
            start: port,
            end: port,
        }
    }

    /// Iterate over all ports in this range.
    pub fn iter(&self) -> impl Iterator<Item = Port> {
        (self.start.0..=self.end.0).map(Port)
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// A resolved port specification.
///
/// Supports:
/// - Every port: "all"
/// - Range: "1-1024" (bounds are clamped to 1-65535)
/// - Single port: "80"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortSpec {
    range: PortRange,
}

impl PortSpec {
    /// Full port range (1-65535).
    pub const fn full() -> Self {
        Self {
            range: PortRange {
                start: Port(Port::MIN),
                end: Port(Port::MAX),
            },
        }
    }

    /// Get all ports in ascending order.
    pub fn to_ports(&self) -> Vec<Port> {
        self.range.iter().collect()
    }
}

impl Default for PortSpec {
    fn default() -> Self {
        Self {
            range: PortRange {
                start: Port(1),
                end: Port(1024),
            },
        }
    }
}

fn parse_bound(s: &str) -> Result<i64, PortError> {
    let s = s.trim();
    s.parse()
        .map_err(|_| PortError::InvalidFormat(s.to_string()))
}

impl FromStr for PortSpec {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PortError::Empty);
        }

        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::full());
        }

        if s.contains('-') {
            let bounds: Vec<&str> = s.split('-').collect();
            if bounds.len() != 2 {
                return Err(PortError::InvalidFormat(s.to_string()));
            }

            let (lo, hi) = (parse_bound(bounds[0])?, parse_bound(bounds[1])?);
            if lo > hi {
                return Err(PortError::InvalidRange(lo, hi));
            }

            let start = lo.max(i64::from(Port::MIN));
            let end = hi.min(i64::from(Port::MAX));
            if start > end {
                // the whole range lies outside 1-65535
                let outside = if lo > i64::from(Port::MAX) { lo } else { hi };
                return Err(PortError::OutOfRange(outside));
            }

            // both bounds are inside 1..=65535 here
            let range = PortRange::new(Port(start as u16), Port(end as u16))?;
            return Ok(Self { range });
        }

        let port = parse_bound(s)?;
        if !(i64::from(Port::MIN)..=i64::from(Port::MAX)).contains(&port) {
            return Err(PortError::OutOfRange(port));
        }
        Ok(Self {
            range: PortRange::single(Port(port as u16)),
        })
    }
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::full() {
            write!(f, "all")
        } else {
            write!(f, "{}", self.range)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(spec: &str) -> Vec<u16> {
        spec.parse::<PortSpec>()
            .unwrap()
            .to_ports()
            .into_iter()
            .map(u16::from)
            .collect()
    }

    #[test]
    fn test_port_validation() {
        assert!(Port::new(0).is_none());
        assert!(Port::new(1).is_some());
        assert!(Port::new(65535).is_some());
    }

    #[test]
    fn test_single_port() {
        assert_eq!(raw("80"), vec![80]);
        assert_eq!(raw(" 443 "), vec![443]);
    }

    #[test]
    fn test_range_is_exact_and_ascending() {
        assert_eq!(raw("1-5"), vec![1, 2, 3, 4, 5]);
        assert_eq!(raw("22-23"), vec![22, 23]);
        assert_eq!(raw("100-100"), vec![100]);

        for (a, b) in [(1u16, 1u16), (1, 1024), (1000, 1010), (65530, 65535)] {
            let expected: Vec<u16> = (a..=b).collect();
            assert_eq!(raw(&format!("{a}-{b}")), expected);
        }
    }

    #[test]
    fn test_range_bounds_are_clamped() {
        assert_eq!(raw("0-3"), vec![1, 2, 3]);
        assert_eq!(raw("65534-70000"), vec![65534, 65535]);
    }

    #[test]
    fn test_all_ports() {
        let ports = raw("all");
        assert_eq!(ports.len(), 65535);
        assert_eq!(ports.first(), Some(&1));
        assert_eq!(ports.last(), Some(&65535));
        assert!(ports.windows(2).all(|w| w[0] + 1 == w[1]));
    }

    #[test]
    fn test_invalid_specs() {
        assert_eq!("".parse::<PortSpec>(), Err(PortError::Empty));
        assert_eq!("5-2".parse::<PortSpec>(), Err(PortError::InvalidRange(5, 2)));
        assert!(matches!(
            "abc".parse::<PortSpec>(),
            Err(PortError::InvalidFormat(_))
        ));
        assert_eq!("70000".parse::<PortSpec>(), Err(PortError::OutOfRange(70000)));
        assert_eq!("0".parse::<PortSpec>(), Err(PortError::OutOfRange(0)));
        assert!("1-2-3".parse::<PortSpec>().is_err());
        assert!("80,443".parse::<PortSpec>().is_err());
    }

    #[test]
    fn test_range_errors_report_given_bounds() {
        let err = "80000-70000".parse::<PortSpec>().unwrap_err();
        assert_eq!(err, PortError::InvalidRange(80000, 70000));
        assert_eq!(
            err.to_string(),
            "invalid port range: start (80000) > end (70000)"
        );

        assert_eq!(
            "70000-80000".parse::<PortSpec>(),
            Err(PortError::OutOfRange(70000))
        );
        assert_eq!("0-0".parse::<PortSpec>(), Err(PortError::OutOfRange(0)));
    }

    #[test]
    fn test_display() {
        assert_eq!("all".parse::<PortSpec>().unwrap().to_string(), "all");
        assert_eq!("22-23".parse::<PortSpec>().unwrap().to_string(), "22-23");
        assert_eq!(PortSpec::default().to_string(), "1-1024");
    }
}
