
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

///
/// DateParts
///
/// Storage-native decomposition of a calendar date.
///
/// Invariant:
/// - produced by dump, consumed by load
/// - carries no validity guarantee; load re-validates the calendar
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct DateParts {
    pub year: i32,
    pub month: u8,
    pub day: u8,
}

impl DateParts {
    /// Reassemble the calendar date; `None` if the parts name an
    /// impossible date (month 13, day 32, ...).
    #[must_use]
    pub fn to_date(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, u32::from(self.month), u32::from(self.day))
    }
}

impl From<NaiveDate> for DateParts {
    // month/day are 1-based and bounded; the casts cannot truncate.
    #[expect(clippy::cast_possible_truncation)]
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month() as u8,
            day: date.day() as u8,
        }
    }
}

///
/// TimeParts
///
/// Storage-native decomposition of a wall-clock time.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TimeParts {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub microsecond: u32,
}

impl TimeParts {
    /// Reassemble the wall-clock time; `None` if the parts are out of range.
    #[must_use]
    pub fn to_time(self) -> Option<NaiveTime> {
        NaiveTime::from_hms_micro_opt(
            u32::from(self.hour),
            u32::from(self.minute),
            u32::from(self.second),
            self.microsecond,
        )
    }
}

impl From<NaiveTime> for TimeParts {
    // chrono bounds hour/minute/second; leap seconds fold into microseconds.
    #[expect(clippy::cast_possible_truncation)]
    fn from(time: NaiveTime) -> Self {
        Self {
            hour: time.hour() as u8,
            minute: time.minute() as u8,
            second: time.second() as u8,
            microsecond: time.nanosecond() / 1_000,
        }
    }
}

///
/// DateTimeParts
///
/// Storage-native decomposition of a calendar date plus wall-clock time.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct DateTimeParts {
    pub date: DateParts,
    pub time: TimeParts,
}

impl DateTimeParts {
    /// Reassemble the full timestamp; `None` if either half is invalid.
    #[must_use]
    pub fn to_datetime(self) -> Option<NaiveDateTime> {
        let date = self.date.to_date()?;
        let time = self.time.to_time()?;

        Some(NaiveDateTime::new(date, time))
    }
}

impl From<NaiveDateTime> for DateTimeParts {
    fn from(datetime: NaiveDateTime) -> Self {
        Self {
            date: DateParts::from(datetime.date()),
            time: TimeParts::from(datetime.time()),
        }
    }
}

///
/// Value
///
/// Runtime value crossing the boundary between the host program and the
/// data store.
///
/// Null     → explicit absence (SQL NULL); a universal success value.
/// *Parts   → storage-native tuple forms; produced by dump, consumed by load.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum Value {
    Blob(Vec<u8>),
    Bool(bool),
    Date(NaiveDate),
    DateParts(DateParts),
    DateTime(NaiveDateTime),
    DateTimeParts(DateTimeParts),
    Decimal(Decimal),
    Float(f64),
    Int(i64),
    /// Ordered list of values; order is preserved through coercion.
    List(Vec<Self>),
    Null,
    Text(String),
    Time(NaiveTime),
    TimeParts(TimeParts),
}

impl Value {
    ///
    /// CONSTRUCTION
    ///

    /// Build a `Value::List` from owned items.
    pub fn from_list<T>(items: Vec<T>) -> Self
    where
        T: Into<Self>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Build a `Value::List` from a slice literal.
    ///
    /// Intended for tests and inline construction.
    pub fn from_slice<T>(items: &[T]) -> Self
    where
        T: Into<Self> + Clone,
    {
        Self::List(items.iter().cloned().map(Into::into).collect())
    }

    ///
    /// TYPES
    ///

    /// Returns true if the value is the explicit absence marker.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true if the value is Text.
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    ///
    /// CONVERSION
    ///

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let Self::Text(s) = self {
            Some(s.as_str())
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        if let Self::List(items) = self {
            Some(items.as_slice())
        } else {
            None
        }
    }

    ///
    /// EMPTY
    ///

    /// Emptiness for sequence-shaped values; `None` where undefined.
    #[must_use]
    pub fn is_empty(&self) -> Option<bool> {
        match self {
            Self::Blob(bytes) => Some(bytes.is_empty()),
            Self::List(items) => Some(items.is_empty()),
            Self::Text(s) => Some(s.is_empty()),

            // fields represented as Value::Null:
            Self::Null => Some(true),

            _ => None,
        }
    }
}

#[macro_export]
macro_rules! impl_value_from {
    ( $( $type:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl From<$type> for Value {
                fn from(v: $type) -> Self {
                    Self::$variant(v.into())
                }
            }
        )*
    };
}

impl_value_from! {
    bool          => Bool,
    i8            => Int,
    i16           => Int,
    i32           => Int,
    i64           => Int,
    u8            => Int,
    u16           => Int,
    u32           => Int,
    f32           => Float,
    f64           => Float,
    &str          => Text,
    String        => Text,
    Vec<u8>       => Blob,
    Decimal       => Decimal,
    NaiveDate     => Date,
    NaiveTime     => Time,
    NaiveDateTime => DateTime,
}

impl From<Vec<Self>> for Value {
    fn from(items: Vec<Self>) -> Self {
        Self::List(items)
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Self::Null
    }
}
