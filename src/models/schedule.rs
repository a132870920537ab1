//! Recurrence building blocks: minute-granular time of day and weekday sets.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::enums::Weekday;

/// Local wall-clock time, minute granularity, written `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    /// Truncates seconds and below.
    pub fn from_time(time: NaiveTime) -> Self {
        Self(NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time))
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid time of day '{0}', expected HH:MM")]
pub struct InvalidTime(pub String);

impl FromStr for TimeOfDay {
    type Err = InvalidTime;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (h, m) = trimmed
            .split_once(':')
            .ok_or_else(|| InvalidTime(s.to_string()))?;
        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return Err(InvalidTime(s.to_string()));
        }
        let hour: u32 = h.parse().map_err(|_| InvalidTime(s.to_string()))?;
        let minute: u32 = m.parse().map_err(|_| InvalidTime(s.to_string()))?;
        Self::new(hour, minute).ok_or_else(|| InvalidTime(s.to_string()))
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Set of active weekdays.
///
/// Persisted as a map of every weekday code to a bool
/// (`{"lu":true,"ma":false,...}`); missing codes read as inactive.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn all() -> Self {
        Self(0b0111_1111)
    }

    /// Monday through Friday.
    pub const fn workdays() -> Self {
        Self(0b0001_1111)
    }

    pub fn only(day: Weekday) -> Self {
        Self(Self::bit(day))
    }

    fn bit(day: Weekday) -> u8 {
        1 << day.index()
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & Self::bit(day) != 0
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= Self::bit(day);
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        Weekday::ALL.into_iter().filter(move |d| self.contains(*d))
    }
}

impl Default for WeekdaySet {
    fn default() -> Self {
        Self::all()
    }
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut set = Self::empty();
        for day in iter {
            set.insert(day);
        }
        set
    }
}

impl fmt::Debug for WeekdaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(|d| d.as_str())).finish()
    }
}

impl fmt::Display for WeekdaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::all() {
            return f.write_str("Todos los días");
        }
        if self.is_empty() {
            return f.write_str("Ningún día");
        }
        let labels: Vec<&str> = self.iter().map(|d| d.label()).collect();
        f.write_str(&labels.join(", "))
    }
}

/// Parses a comma or `+` separated list of weekday codes (`lu,mi,vi`).
/// `all`/`todos` selects every day and `lu-vi` the workdays.
impl FromStr for WeekdaySet {
    type Err = crate::db::DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "todos" => return Ok(Self::all()),
            "lu-vi" => return Ok(Self::workdays()),
            "" | "none" => return Ok(Self::empty()),
            _ => {}
        }
        s.split([',', '+'])
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| p.to_lowercase().parse::<Weekday>())
            .collect()
    }
}

impl Serialize for WeekdaySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Weekday::ALL.len()))?;
        for day in Weekday::ALL {
            map.serialize_entry(day.as_str(), &self.contains(day))?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for WeekdaySet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(WeekdaySetVisitor)
    }
}

struct WeekdaySetVisitor;

impl<'de> Visitor<'de> for WeekdaySetVisitor {
    type Value = WeekdaySet;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of weekday codes to booleans or a list of weekday codes")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut set = WeekdaySet::empty();
        while let Some((code, active)) = access.next_entry::<String, bool>()? {
            // Unknown codes are ignored rather than rejected.
            if let Ok(day) = code.parse::<Weekday>() {
                if active {
                    set.insert(day);
                }
            }
        }
        Ok(set)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut set = WeekdaySet::empty();
        while let Some(day) = access.next_element::<Weekday>()? {
            set.insert(day);
        }
        Ok(set)
    }
}
