use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Record-level validation errors
// ---------------------------------------------------------------------------

/// A cell that cannot be turned into a valid [`Record`] field.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    #[error("unknown weekday '{0}'")]
    InvalidWeekday(String),
    #[error("severity must be 'Yes' or 'No', got '{0}'")]
    InvalidSeverity(String),
    #[error("severity is missing")]
    MissingSeverity,
    #[error("month {0} is outside 1-12")]
    MonthOutOfRange(i64),
    #[error("hour {0} is outside 0-23")]
    HourOutOfRange(i64),
    #[error("year {0} does not fit in a 32-bit integer")]
    YearOutOfRange(i64),
}

// ---------------------------------------------------------------------------
// Weekday
// ---------------------------------------------------------------------------

/// Day of the week. `Ord` follows the calendar order Monday → Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// Canonical display order.
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }
}

impl FromStr for Weekday {
    type Err = RecordError;

    /// Case-sensitive: only the full English name is accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Weekday::ALL
            .into_iter()
            .find(|d| d.name() == s)
            .ok_or_else(|| RecordError::InvalidWeekday(s.to_string()))
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Binary injury severity: `Yes` means somebody was injured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Yes,
    No,
}

impl Severity {
    pub const ALL: [Severity; 2] = [Severity::Yes, Severity::No];

    pub fn name(self) -> &'static str {
        match self {
            Severity::Yes => "Yes",
            Severity::No => "No",
        }
    }

    pub fn is_injury(self) -> bool {
        self == Severity::Yes
    }
}

impl FromStr for Severity {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Yes" => Ok(Severity::Yes),
            "No" => Ok(Severity::No),
            other => Err(RecordError::InvalidSeverity(other.to_string())),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Dimension – one filterable / aggregatable attribute
// ---------------------------------------------------------------------------

/// Returned when a dimension key does not name any known dimension.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unknown dimension '{0}'")]
pub struct UnknownDimension(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dimension {
    Year,
    Month,
    Hour,
    Weekday,
    WeatherGroup,
    LightingGroup,
    RoadSurfaceGroup,
    Severity,
}

impl Dimension {
    /// Every dimension, in sidebar order.
    pub const ALL: [Dimension; 8] = [
        Dimension::Year,
        Dimension::Month,
        Dimension::Hour,
        Dimension::Weekday,
        Dimension::WeatherGroup,
        Dimension::LightingGroup,
        Dimension::RoadSurfaceGroup,
        Dimension::Severity,
    ];

    /// Stable machine name.
    pub fn key(self) -> &'static str {
        match self {
            Dimension::Year => "year",
            Dimension::Month => "month",
            Dimension::Hour => "hour",
            Dimension::Weekday => "weekday",
            Dimension::WeatherGroup => "weather_group",
            Dimension::LightingGroup => "lighting_group",
            Dimension::RoadSurfaceGroup => "road_surface_group",
            Dimension::Severity => "severity",
        }
    }

    /// Human-readable label for selection controls and chart titles.
    pub fn label(self) -> &'static str {
        match self {
            Dimension::Year => "Year",
            Dimension::Month => "Month",
            Dimension::Hour => "Hour",
            Dimension::Weekday => "Day of Week",
            Dimension::WeatherGroup => "Weather",
            Dimension::LightingGroup => "Lighting",
            Dimension::RoadSurfaceGroup => "Road Surface",
            Dimension::Severity => "Injury Severity (Binary)",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Dimension::Year | Dimension::Month | Dimension::Hour)
    }
}

impl FromStr for Dimension {
    type Err = UnknownDimension;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dimension::ALL
            .into_iter()
            .find(|d| d.key() == s)
            .ok_or_else(|| UnknownDimension(s.to_string()))
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ---------------------------------------------------------------------------
// DimensionValue – a single value of one dimension
// ---------------------------------------------------------------------------

/// Value of a dimension as seen by the catalog, filters and frequency tables.
///
/// Weekday and severity values are carried as `Text` holding their canonical
/// names. An `Integer` never equals a `Text`, even if the digits match.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DimensionValue {
    Integer(i64),
    Text(String),
}

impl fmt::Display for DimensionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimensionValue::Integer(i) => write!(f, "{i}"),
            DimensionValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for DimensionValue {
    fn from(v: i64) -> Self {
        DimensionValue::Integer(v)
    }
}

impl From<i32> for DimensionValue {
    fn from(v: i32) -> Self {
        DimensionValue::Integer(v.into())
    }
}

impl From<&str> for DimensionValue {
    fn from(s: &str) -> Self {
        DimensionValue::Text(s.to_string())
    }
}

impl From<Weekday> for DimensionValue {
    fn from(d: Weekday) -> Self {
        DimensionValue::Text(d.name().to_string())
    }
}

impl From<Severity> for DimensionValue {
    fn from(s: Severity) -> Self {
        DimensionValue::Text(s.name().to_string())
    }
}

// ---------------------------------------------------------------------------
// Record – one collision
// ---------------------------------------------------------------------------

/// One collision event. Missing cells are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub hour: Option<u32>,
    pub weekday: Option<Weekday>,
    pub weather_group: Option<String>,
    pub lighting_group: Option<String>,
    pub road_surface_group: Option<String>,
    pub severity: Severity,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Record {
    /// A record with the given severity and every other field missing.
    pub fn new(severity: Severity) -> Self {
        Record {
            year: None,
            month: None,
            hour: None,
            weekday: None,
            weather_group: None,
            lighting_group: None,
            road_surface_group: None,
            severity,
            latitude: None,
            longitude: None,
        }
    }

    /// The record's value for `dim`, or `None` when the cell is missing.
    pub fn value(&self, dim: Dimension) -> Option<DimensionValue> {
        match dim {
            Dimension::Year => self.year.map(|v| DimensionValue::Integer(v.into())),
            Dimension::Month => self.month.map(|v| DimensionValue::Integer(v.into())),
            Dimension::Hour => self.hour.map(|v| DimensionValue::Integer(v.into())),
            Dimension::Weekday => self.weekday.map(DimensionValue::from),
            Dimension::WeatherGroup => self.weather_group.as_deref().map(DimensionValue::from),
            Dimension::LightingGroup => self.lighting_group.as_deref().map(DimensionValue::from),
            Dimension::RoadSurfaceGroup => {
                self.road_surface_group.as_deref().map(DimensionValue::from)
            }
            Dimension::Severity => Some(self.severity.into()),
        }
    }

    /// Exact, type-sensitive equality of the `dim` cell against `expected`.
    /// Missing cells never match.
    pub fn matches(&self, dim: Dimension, expected: &DimensionValue) -> bool {
        use DimensionValue::{Integer, Text};
        match (dim, expected) {
            (Dimension::Year, Integer(v)) => self.year.map(i64::from) == Some(*v),
            (Dimension::Month, Integer(v)) => self.month.map(i64::from) == Some(*v),
            (Dimension::Hour, Integer(v)) => self.hour.map(i64::from) == Some(*v),
            (Dimension::Weekday, Text(s)) => self.weekday.is_some_and(|d| d.name() == s),
            (Dimension::WeatherGroup, Text(s)) => {
                self.weather_group.as_deref() == Some(s.as_str())
            }
            (Dimension::LightingGroup, Text(s)) => {
                self.lighting_group.as_deref() == Some(s.as_str())
            }
            (Dimension::RoadSurfaceGroup, Text(s)) => {
                self.road_surface_group.as_deref() == Some(s.as_str())
            }
            (Dimension::Severity, Text(s)) => self.severity.name() == s,
            _ => false,
        }
    }

    /// `(latitude, longitude)` when both are present.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

/// Range-checked conversions used by the loaders.
pub fn checked_year(v: i64) -> Result<i32, RecordError> {
    i32::try_from(v).map_err(|_| RecordError::YearOutOfRange(v))
}

pub fn checked_month(v: i64) -> Result<u32, RecordError> {
    match v {
        1..=12 => Ok(v as u32),
        _ => Err(RecordError::MonthOutOfRange(v)),
    }
}

pub fn checked_hour(v: i64) -> Result<u32, RecordError> {
    match v {
        0..=23 => Ok(v as u32),
        _ => Err(RecordError::HourOutOfRange(v)),
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full immutable table of collisions. Never mutated after load; share
/// it behind an `Arc`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn from_records(records: Vec<Record>) -> Self {
        Dataset { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    /// Number of collisions.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
