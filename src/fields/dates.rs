//! Simulation dates: lenient parsing and the start ≤ spin-up ≤ end rule.

use chrono::NaiveDate;

use super::DateFields;

/// Format used when writing dates back into settings text.
pub const DEFAULT_OUTPUT_FORMAT: &str = "%d/%m/%Y";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Order {
    DayMonthYear,
    YearMonthDay,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Width {
    /// Exactly two digits (`dd`, `MM`).
    Padded,
    /// One or two digits (`d`, `M`).
    Loose,
}

impl Width {
    fn accepts(self, field: &str) -> bool {
        let digits = field.bytes().all(|b| b.is_ascii_digit());
        match self {
            Self::Padded => digits && field.len() == 2,
            Self::Loose => digits && (1..=2).contains(&field.len()),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct DateFormat {
    order: Order,
    separator: char,
    day: Width,
    month: Width,
}

impl DateFormat {
    const fn dmy(day: Width, month: Width) -> Self {
        Self {
            order: Order::DayMonthYear,
            separator: '/',
            day,
            month,
        }
    }

    const fn ymd(month: Width, day: Width) -> Self {
        Self {
            order: Order::YearMonthDay,
            separator: '-',
            day,
            month,
        }
    }

    fn parse(&self, input: &str) -> Option<NaiveDate> {
        let mut parts = input.split(self.separator);
        let (first, second, third) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() {
            return None;
        }
        let (year, month, day) = match self.order {
            Order::DayMonthYear => (third, second, first),
            Order::YearMonthDay => (first, second, third),
        };
        if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if !self.day.accepts(day) || !self.month.accepts(month) {
            return None;
        }
        NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
    }
}

/// Accepted formats in priority order: `dd/MM/yyyy`, `d/MM/yyyy`,
/// `dd/M/yyyy`, `d/M/yyyy`, `yyyy-MM-dd`, `yyyy-M-dd`, `yyyy-MM-d`,
/// `yyyy-M-d`.
const FORMATS: [DateFormat; 8] = [
    DateFormat::dmy(Width::Padded, Width::Padded),
    DateFormat::dmy(Width::Loose, Width::Padded),
    DateFormat::dmy(Width::Padded, Width::Loose),
    DateFormat::dmy(Width::Loose, Width::Loose),
    DateFormat::ymd(Width::Padded, Width::Padded),
    DateFormat::ymd(Width::Loose, Width::Padded),
    DateFormat::ymd(Width::Padded, Width::Loose),
    DateFormat::ymd(Width::Loose, Width::Loose),
];

/// Parse a settings date. The first accepted format wins; anything that does
/// not name a real calendar day yields `None`.
#[must_use]
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    FORMATS.iter().find_map(|format| format.parse(input))
}

/// Format a date with a `chrono` strftime pattern.
#[must_use]
pub fn format_date(date: NaiveDate, pattern: &str) -> String {
    date.format(pattern).to_string()
}

/// Dates as read from settings text; unparseable values are blank.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimulationDates {
    pub start: Option<NaiveDate>,
    pub spin: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl SimulationDates {
    /// Parse extracted fields. A spin-up value that is present but not a date
    /// falls back to the start date.
    #[must_use]
    pub fn from_fields(fields: &DateFields) -> Self {
        let start = fields.stepstart.as_deref().and_then(parse_date);
        let spin = fields
            .spinup
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .and_then(|s| parse_date(s).or(start));
        let end = fields.stepend.as_deref().and_then(parse_date);
        Self { start, spin, end }
    }

    /// Fill blanks with `default` and enforce the ordering rule.
    #[must_use]
    pub fn normalized(&self, default: NaiveDate) -> DateRange {
        DateRange::new(
            self.start.unwrap_or(default),
            self.spin.unwrap_or(default),
            self.end.unwrap_or(default),
        )
    }
}

/// Complete date triple with `start <= spin <= end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    spin: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Build a range, raising spin-up to the start date and then the end date
    /// to spin-up when they are out of order.
    #[must_use]
    pub fn new(start: NaiveDate, spin: NaiveDate, end: NaiveDate) -> Self {
        let spin = spin.max(start);
        let end = end.max(spin);
        Self { start, spin, end }
    }

    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    #[must_use]
    pub const fn spin(&self) -> NaiveDate {
        self.spin
    }

    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn set_start(&mut self, start: NaiveDate) {
        *self = Self::new(start, self.spin, self.end);
    }

    pub fn set_spin(&mut self, spin: NaiveDate) {
        *self = Self::new(self.start, spin, self.end);
    }

    pub fn set_end(&mut self, end: NaiveDate) {
        *self = Self::new(self.start, self.spin, end);
    }

    /// `(stepstart, spinup, stepend)` formatted with `pattern`.
    #[must_use]
    pub fn formatted(&self, pattern: &str) -> [(&'static str, String); 3] {
        [
            ("stepstart", format_date(self.start, pattern)),
            ("spinup", format_date(self.spin, pattern)),
            ("stepend", format_date(self.end, pattern)),
        ]
    }

    /// Whether writing this range would change the literal values in `fields`.
    #[must_use]
    pub fn differs_from(&self, fields: &DateFields, pattern: &str) -> bool {
        let [start, spin, end] = self.formatted(pattern);
        fields.stepstart.as_deref() != Some(start.1.as_str())
            || fields.spinup.as_deref() != Some(spin.1.as_str())
            || fields.stepend.as_deref() != Some(end.1.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_day_month_year_variants() {
        assert_eq!(parse_date("01/01/2000"), Some(ymd(2000, 1, 1)));
        assert_eq!(parse_date("1/01/2000"), Some(ymd(2000, 1, 1)));
        assert_eq!(parse_date("01/1/2000"), Some(ymd(2000, 1, 1)));
        assert_eq!(parse_date("1/1/2000"), Some(ymd(2000, 1, 1)));
        assert_eq!(parse_date(" 31/12/1990 "), Some(ymd(1990, 12, 31)));
    }

    #[test]
    fn parses_iso_like_variants() {
        assert_eq!(parse_date("2000-01-02"), Some(ymd(2000, 1, 2)));
        assert_eq!(parse_date("2000-1-02"), Some(ymd(2000, 1, 2)));
        assert_eq!(parse_date("2000-01-2"), Some(ymd(2000, 1, 2)));
        assert_eq!(parse_date("2000-1-2"), Some(ymd(2000, 1, 2)));
    }

    #[test]
    fn rejects_non_dates() {
        for bad in ["", "None", "31/02/2000", "001/01/2000", "01/01/00", "2000/01/01", "1-1-2000", "01/01/2000/1"] {
            assert_eq!(parse_date(bad), None, "{bad}");
        }
    }

    #[test]
    fn spin_falls_back_to_start() {
        let fields = DateFields {
            stepstart: Some("01/01/2000".into()),
            spinup: Some("None".into()),
            stepend: Some("garbage".into()),
        };
        let dates = SimulationDates::from_fields(&fields);
        assert_eq!(dates.start, Some(ymd(2000, 1, 1)));
        assert_eq!(dates.spin, Some(ymd(2000, 1, 1)));
        assert_eq!(dates.end, None);

        let absent = SimulationDates::from_fields(&DateFields::default());
        assert_eq!(absent, SimulationDates::default());
    }

    #[test]
    fn earlier_spin_is_reported_literally_but_raised_in_range() {
        let fields = DateFields {
            stepstart: Some("01/01/2000".into()),
            spinup: Some("01/01/1999".into()),
            stepend: Some("31/12/2010".into()),
        };
        let dates = SimulationDates::from_fields(&fields);
        assert_eq!(dates.spin, Some(ymd(1999, 1, 1)));

        let range = dates.normalized(ymd(2020, 1, 1));
        assert_eq!(range.spin(), ymd(2000, 1, 1));
        assert_eq!(range.end(), ymd(2010, 12, 31));
        assert!(range.differs_from(&fields, DEFAULT_OUTPUT_FORMAT));
    }

    #[test]
    fn setters_keep_order() {
        let mut range = DateRange::new(ymd(2000, 1, 1), ymd(2001, 1, 1), ymd(2002, 1, 1));
        range.set_start(ymd(2005, 1, 1));
        assert_eq!(range.spin(), ymd(2005, 1, 1));
        assert_eq!(range.end(), ymd(2005, 1, 1));
        range.set_end(ymd(2004, 1, 1));
        assert_eq!(range.end(), ymd(2005, 1, 1));
    }

    #[test]
    fn formatted_uses_padded_day_month_year() {
        let range = DateRange::new(ymd(2000, 1, 2), ymd(2000, 1, 2), ymd(2000, 1, 2));
        let [start, ..] = range.formatted(DEFAULT_OUTPUT_FORMAT);
        assert_eq!(start, ("stepstart", "02/01/2000".to_string()));
        let fields = DateFields {
            stepstart: Some("02/01/2000".into()),
            spinup: Some("02/01/2000".into()),
            stepend: Some("02/01/2000".into()),
        };
        assert!(!range.differs_from(&fields, DEFAULT_OUTPUT_FORMAT));
    }
}
