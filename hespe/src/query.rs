//! Event filter URLs
//!
//! HESPE exposes a filter endpoint whose parameters are positional path
//! segments. Unset numeric parameters are sent as `-1`, unset GOES classes as
//! `null`; callers never see those placeholders and use `Option` instead.

use std::fmt;

/// Sort direction for event listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter criteria for the HESPE event list.
///
/// Dates are Unix milliseconds, durations are seconds. No range checking is
/// done; whatever is set ends up verbatim in the URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilter {
    pub min_date: Option<i64>,
    pub max_date: Option<i64>,
    pub min_duration: Option<i64>,
    pub max_duration: Option<i64>,
    /// Lower GOES class bound, e.g. "M1.0"
    pub min_goes: Option<String>,
    pub max_goes: Option<String>,
    pub flare_id: Option<u64>,
    /// Index of the first event returned
    pub start: u32,
    /// Number of events returned, 0 means all
    pub count: u32,
    pub sort_by: String,
    pub sort_direction: SortDirection,
}

impl Default for EventFilter {
    fn default() -> Self {
        Self {
            min_date: None,
            max_date: None,
            min_duration: None,
            max_duration: None,
            min_goes: None,
            max_goes: None,
            flare_id: None,
            start: 0,
            count: 0,
            sort_by: "startTime".to_string(),
            sort_direction: SortDirection::Descending,
        }
    }
}

fn number_segment<T: fmt::Display>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-1".to_string())
}

fn goes_segment(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("null")
}

impl EventFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to events between two Unix-millisecond timestamps
    pub fn date_range(mut self, min_millis: i64, max_millis: i64) -> Self {
        self.min_date = Some(min_millis);
        self.max_date = Some(max_millis);
        self
    }

    /// Restrict to events whose duration in seconds lies in the range
    pub fn duration_range(mut self, min_seconds: i64, max_seconds: i64) -> Self {
        self.min_duration = Some(min_seconds);
        self.max_duration = Some(max_seconds);
        self
    }

    pub fn goes_range(mut self, min_class: impl Into<String>, max_class: impl Into<String>) -> Self {
        self.min_goes = Some(min_class.into());
        self.max_goes = Some(max_class.into());
        self
    }

    pub fn flare_id(mut self, flare_id: u64) -> Self {
        self.flare_id = Some(flare_id);
        self
    }

    pub fn page(mut self, start: u32, count: u32) -> Self {
        self.start = start;
        self.count = count;
        self
    }

    pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort_by = field.into();
        self.sort_direction = direction;
        self
    }

    /// Build the filter URL below `base_url`.
    ///
    /// Segment order: min date, max date, min duration, max duration, min
    /// GOES, max GOES, flare id, start, count, sort field, sort direction.
    pub fn to_url(&self, base_url: &str) -> String {
        format!(
            "{}{}/{}/{}/{}/{}/{}/{}/{}/{}/{}/{}",
            base_url,
            number_segment(&self.min_date),
            number_segment(&self.max_date),
            number_segment(&self.min_duration),
            number_segment(&self.max_duration),
            goes_segment(&self.min_goes),
            goes_segment(&self.max_goes),
            number_segment(&self.flare_id),
            self.start,
            self.count,
            self.sort_by,
            self.sort_direction,
        )
    }
}
