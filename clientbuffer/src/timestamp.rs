use chrono::{DateTime, Utc};
use std::{fmt, str::FromStr};
use thiserror::Error;

const MICROS_PER_SEC: i64 = 1_000_000;

/// A point in time with microsecond resolution, as carried by buffered lines
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    secs: i64,
    micros: u32,
}

impl Timestamp {
    /// Construct from a seconds count and a sub-second microsecond count.
    /// Microseconds beyond one second carry into `secs`.
    pub fn new(secs: i64, micros: u32) -> Self {
        let carry = i64::from(micros) / MICROS_PER_SEC;
        Self {
            secs: secs + carry,
            micros: (i64::from(micros) % MICROS_PER_SEC) as u32,
        }
    }

    pub fn from_secs(secs: i64) -> Self {
        Self { secs, micros: 0 }
    }

    pub fn from_micros(micros: i64) -> Self {
        Self {
            secs: micros.div_euclid(MICROS_PER_SEC),
            micros: micros.rem_euclid(MICROS_PER_SEC) as u32,
        }
    }

    pub fn secs(&self) -> i64 {
        self.secs
    }

    pub fn subsec_micros(&self) -> u32 {
        self.micros
    }

    /// Total microseconds since the epoch, or `None` on overflow
    pub fn as_micros(&self) -> Option<i64> {
        self.secs
            .checked_mul(MICROS_PER_SEC)?
            .checked_add(i64::from(self.micros))
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.secs, self.micros * 1000)
    }

    fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let micros = (value * MICROS_PER_SEC as f64).round();
        if micros < i64::MIN as f64 || micros > i64::MAX as f64 {
            return None;
        }
        Some(Self::from_micros(micros as i64))
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::new(dt.timestamp(), dt.timestamp_subsec_micros())
    }
}

/// Decimal seconds with exactly six fractional digits, e.g. `1700000000.000250`
impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.secs < 0 && self.micros > 0 {
            // -5.25s is stored as secs = -6, micros = 750000
            write!(
                f,
                "-{}.{:06}",
                -(self.secs + 1),
                MICROS_PER_SEC as u32 - self.micros
            )
        } else {
            write!(f, "{}.{:06}", self.secs, self.micros)
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid timestamp {0:?}")]
pub struct TimestampParseError(pub String);

impl FromStr for Timestamp {
    type Err = TimestampParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        parse_decimal(s)
            .or_else(|| s.parse::<f64>().ok().and_then(Self::from_f64))
            .ok_or_else(|| TimestampParseError(s.to_string()))
    }
}

/// Parse `[-]digits[.digits]` exactly, truncating the fraction to microseconds
fn parse_decimal(s: &str) -> Option<Timestamp> {
    let (negative, unsigned) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));

    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit()) || !frac_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let secs: i64 = if int_part.is_empty() { 0 } else { int_part.parse().ok()? };
    let micros: i64 = frac_part
        .bytes()
        .chain(std::iter::repeat(b'0'))
        .take(6)
        .fold(0, |acc, b| acc * 10 + i64::from(b - b'0'));

    let total = secs.checked_mul(MICROS_PER_SEC)?.checked_add(micros)?;
    Some(Timestamp::from_micros(if negative { -total } else { total }))
}

/// The newest point a client is known to have seen for some target.
///
/// A missing watermark compares below every timestamp, so a client with no
/// record has seen nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Watermark(Option<Timestamp>);

impl Watermark {
    pub const NEVER: Watermark = Watermark(None);

    pub fn at(ts: Timestamp) -> Self {
        Self(Some(ts))
    }

    pub fn timestamp(&self) -> Option<Timestamp> {
        self.0
    }

    /// Something strictly newer than `ts` has been seen
    pub fn has_seen(&self, ts: Timestamp) -> bool {
        self.0.map_or(false, |seen| seen > ts)
    }

    /// `ts` itself, or something newer, has been seen
    pub fn covers(&self, ts: Timestamp) -> bool {
        self.0.map_or(false, |seen| seen >= ts)
    }

    /// Decode a stored value. An empty string is a registration with no
    /// recorded time.
    pub fn decode(value: &str) -> Result<Self, TimestampParseError> {
        if value.trim().is_empty() {
            Ok(Self::NEVER)
        } else {
            value.parse().map(Self::at)
        }
    }

    pub fn encode(&self) -> String {
        self.0.map(|ts| ts.to_string()).unwrap_or_default()
    }
}

/// Source of "now" for live traffic
pub trait Clock {
    fn now(&self) -> Timestamp;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_pads_micros() {
        assert_eq!(Timestamp::new(1700000000, 250).to_string(), "1700000000.000250");
        assert_eq!(Timestamp::from_secs(100).to_string(), "100.000000");
        assert_eq!(Timestamp::from_micros(-5_250_000).to_string(), "-5.250000");
    }

    #[test]
    fn carry_into_secs() {
        assert_eq!(Timestamp::new(1, 1_500_000), Timestamp::new(2, 500_000));
    }

    #[test]
    fn decode_forms() {
        let ts = |s: &str| s.parse::<Timestamp>().unwrap();

        assert_eq!(ts("1700000000.000250"), Timestamp::new(1700000000, 250));
        assert_eq!(ts("1700000000.5"), Timestamp::new(1700000000, 500_000));
        assert_eq!(ts("1700000000"), Timestamp::from_secs(1700000000));
        assert_eq!(ts("12.1234567"), Timestamp::new(12, 123_456));
        assert_eq!(ts("-5.25"), Timestamp::from_micros(-5_250_000));
        assert_eq!(ts(" 42.000001 "), Timestamp::new(42, 1));
        assert_eq!(ts("1.7e9"), Timestamp::from_secs(1_700_000_000));

        assert!("".parse::<Timestamp>().is_err());
        assert!("soon".parse::<Timestamp>().is_err());
        assert!("NaN".parse::<Timestamp>().is_err());
        assert!("inf".parse::<Timestamp>().is_err());
    }

    #[test]
    fn ordering() {
        assert!(Timestamp::new(5, 1) > Timestamp::from_secs(5));
        assert!(Timestamp::from_micros(-1) < Timestamp::from_secs(0));
    }

    #[test]
    fn watermark_comparisons() {
        let t100 = Timestamp::from_secs(100);
        let t200 = Timestamp::from_secs(200);

        assert!(!Watermark::NEVER.has_seen(t100));
        assert!(!Watermark::NEVER.covers(t100));
        assert!(Watermark::NEVER < Watermark::at(Timestamp::from_secs(i64::MIN / 2)));

        let mark = Watermark::at(t200);
        assert!(mark.has_seen(t100));
        assert!(!mark.has_seen(t200));
        assert!(mark.covers(t200));
    }

    #[test]
    fn watermark_storage_form() {
        assert_eq!(Watermark::decode("").unwrap(), Watermark::NEVER);
        assert_eq!(Watermark::NEVER.encode(), "");

        let mark = Watermark::at(Timestamp::new(1, 2));
        assert_eq!(Watermark::decode(&mark.encode()).unwrap(), mark);
        assert!(Watermark::decode("garbage").is_err());
    }

    #[test]
    fn system_clock_is_recent() {
        // 2020-01-01
        assert!(SystemClock.now() > Timestamp::from_secs(1_577_836_800));
    }
}
