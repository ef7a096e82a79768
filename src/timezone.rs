use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, SubsecRound, TimeZone, Utc,
};
use std::str::FromStr;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// The single fixed offset in which wall-clock input is interpreted and
/// stored instants are rendered back to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayTimezone(FixedOffset);

impl DisplayTimezone {
    pub fn new(offset: FixedOffset) -> Self {
        Self(offset)
    }

    pub fn offset(&self) -> FixedOffset {
        self.0
    }

    /// Parses a client-supplied time. Strings carrying their own offset keep it,
    /// naive wall-clock strings are read in the display offset.
    ///
    /// Fractional seconds are dropped here, so the instant that gets validated
    /// is the one that gets stored.
    pub fn parse_wall_clock(&self, text: &str) -> Option<DateTime<Utc>> {
        let text = text.trim();
        if let Ok(with_offset) = DateTime::parse_from_rfc3339(text) {
            return Some(with_offset.with_timezone(&Utc).trunc_subsecs(0));
        }

        let naive = NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(text, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })?;

        self.0
            .from_local_datetime(&naive)
            .single()
            .map(|local| local.with_timezone(&Utc).trunc_subsecs(0))
    }

    pub fn display(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        instant.with_timezone(&self.0)
    }
}

impl Default for DisplayTimezone {
    fn default() -> Self {
        // UTC+05:30
        Self(FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap_or_else(|| Utc.fix()))
    }
}

impl FromStr for DisplayTimezone {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FixedOffset::from_str(s.trim()).map(Self)
    }
}
