//! Key Encoder - hierarchical integer keys for timestamps
//!
//! Every instant maps to six keys sharing one flat key space. Each key is the
//! 14-digit number `YYYY MM DD HH mm SS` truncated to its granularity and
//! padded with zeros:
//!
//! ```text
//! 2015-08-01 00:03:43
//!   year    20150000000000
//!   month   20150800000000
//!   day     20150801000000
//!   hour    20150801010000   (hour + 1)
//!   minute  20150801010400   (minute + 1)
//!   second  20150801010444   (second + 1)
//! ```
//!
//! Clock fields are stored with a +1 offset so that hour 00 never encodes to
//! the same digits as "no hour". Months and days are already 1-based. Numeric
//! order of keys of one granularity equals chronological order.

use crate::index::{IndexError, IndexResult};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// Precision level of a temporal key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

impl Granularity {
    /// Coarsest first
    pub const ALL: [Granularity; 6] = [
        Granularity::Year,
        Granularity::Month,
        Granularity::Day,
        Granularity::Hour,
        Granularity::Minute,
        Granularity::Second,
    ];

    /// Multiplier applied to the truncated digit string
    pub fn scale(self) -> i64 {
        match self {
            Granularity::Year => 10_000_000_000,
            Granularity::Month => 100_000_000,
            Granularity::Day => 1_000_000,
            Granularity::Hour => 10_000,
            Granularity::Minute => 100,
            Granularity::Second => 1,
        }
    }

    /// Recover the granularity a key was encoded at
    ///
    /// Every encoded sub-field is at least 01, so the number of trailing zero
    /// digit pairs identifies the granularity.
    pub fn of_key(key: i64) -> Option<Granularity> {
        if key < 0 {
            return None;
        }
        Self::ALL.into_iter().find(|g| key % g.scale() == 0)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Granularity::Year => "year",
            Granularity::Month => "month",
            Granularity::Day => "day",
            Granularity::Hour => "hour",
            Granularity::Minute => "minute",
            Granularity::Second => "second",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The six keys of one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexKeys {
    pub year: i64,
    pub month: i64,
    pub day: i64,
    pub hour: i64,
    pub minute: i64,
    pub second: i64,
}

impl IndexKeys {
    /// Derive all six keys for a timestamp
    pub fn derive(timestamp: Option<&NaiveDateTime>) -> IndexResult<Self> {
        let timestamp = timestamp.ok_or_else(|| {
            IndexError::MissingInput("no timestamp to derive index keys from".to_string())
        })?;
        let parts = DateParts::from_timestamp(timestamp)?;

        Ok(Self {
            year: parts.key(Granularity::Year)?,
            month: parts.key(Granularity::Month)?,
            day: parts.key(Granularity::Day)?,
            hour: parts.key(Granularity::Hour)?,
            minute: parts.key(Granularity::Minute)?,
            second: parts.key(Granularity::Second)?,
        })
    }

    pub fn get(&self, granularity: Granularity) -> i64 {
        match granularity {
            Granularity::Year => self.year,
            Granularity::Month => self.month,
            Granularity::Day => self.day,
            Granularity::Hour => self.hour,
            Granularity::Minute => self.minute,
            Granularity::Second => self.second,
        }
    }

    /// Keys coarsest first
    pub fn iter(&self) -> impl Iterator<Item = (Granularity, i64)> + '_ {
        Granularity::ALL.into_iter().map(|g| (g, self.get(g)))
    }
}

/// Encode a timestamp at one granularity
pub fn encode(timestamp: &NaiveDateTime, granularity: Granularity) -> IndexResult<i64> {
    DateParts::from_timestamp(timestamp)?.key(granularity)
}

/// Encode a `YYYY[-MM[-DD[ HH[:MM[:SS]]]]]` prefix at one granularity
pub fn encode_prefix(prefix: &str, granularity: Granularity) -> IndexResult<i64> {
    DateParts::parse(prefix)?.key(granularity)
}

/// Calendar and clock fields, clock fields without the +1 offset
#[derive(Debug, Default)]
struct DateParts {
    year: i64,
    month: Option<i64>,
    day: Option<i64>,
    hour: Option<i64>,
    minute: Option<i64>,
    second: Option<i64>,
}

impl DateParts {
    fn from_timestamp(timestamp: &NaiveDateTime) -> IndexResult<Self> {
        let year = i64::from(timestamp.year());
        if !(0..=9999).contains(&year) {
            return Err(IndexError::decode(year.to_string()));
        }

        Ok(Self {
            year,
            month: Some(i64::from(timestamp.month())),
            day: Some(i64::from(timestamp.day())),
            hour: Some(i64::from(timestamp.hour())),
            minute: Some(i64::from(timestamp.minute())),
            second: Some(i64::from(timestamp.second())),
        })
    }

    fn parse(prefix: &str) -> IndexResult<Self> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Err(IndexError::MissingInput("empty date prefix".to_string()));
        }

        let (date, time) = match prefix.split_once(' ') {
            Some((date, time)) => (date, Some(time)),
            None => (prefix, None),
        };

        let mut parts = DateParts::default();

        let mut fields = date.split('-');
        parts.year = number(fields.next().unwrap_or_default(), 0..=9999)?;
        parts.month = fields.next().map(|f| number(f, 1..=12)).transpose()?;
        if let Some(fragment) = fields.next() {
            let day = number(fragment, 1..=31)?;
            let valid = i32::try_from(parts.year).ok().and_then(|year| {
                NaiveDate::from_ymd_opt(year, parts.month.unwrap_or(1) as u32, day as u32)
            });
            if valid.is_none() {
                return Err(IndexError::decode(fragment));
            }
            parts.day = Some(day);
        }
        if let Some(extra) = fields.next() {
            return Err(IndexError::decode(extra));
        }

        if let Some(time) = time {
            if parts.day.is_none() {
                return Err(IndexError::decode(time));
            }
            let mut fields = time.split(':');
            parts.hour = fields.next().map(|f| number(f, 0..=23)).transpose()?;
            parts.minute = fields.next().map(|f| number(f, 0..=59)).transpose()?;
            parts.second = fields.next().map(|f| number(f, 0..=59)).transpose()?;
            if let Some(extra) = fields.next() {
                return Err(IndexError::decode(extra));
            }
        }

        Ok(parts)
    }

    fn key(&self, granularity: Granularity) -> IndexResult<i64> {
        let mut key = self.year * Granularity::Year.scale();

        let fields = [
            (Granularity::Month, self.month, 0),
            (Granularity::Day, self.day, 0),
            (Granularity::Hour, self.hour, 1),
            (Granularity::Minute, self.minute, 1),
            (Granularity::Second, self.second, 1),
        ];

        for (field, value, offset) in fields {
            if field > granularity {
                break;
            }
            let value = value.ok_or_else(|| {
                IndexError::MissingInput(format!("{} key needs a {} component", granularity, field))
            })?;
            key += (value + offset) * field.scale();
        }

        Ok(key)
    }
}

fn number(fragment: &str, range: RangeInclusive<i64>) -> IndexResult<i64> {
    if fragment.is_empty() || fragment.len() > 4 || !fragment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(IndexError::decode(fragment));
    }
    match fragment.parse::<i64>() {
        Ok(value) if range.contains(&value) => Ok(value),
        _ => Err(IndexError::decode(fragment)),
    }
}
