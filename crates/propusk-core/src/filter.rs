//! Listing filters and the date-literal parser used at the API boundary.
//!
//! A date literal is the first ten characters of the input, read as
//! `YYYY-MM-DD` or, failing that, as `DD.MM.YYYY`. Anything shorter than ten
//! characters is malformed. Dates are calendar days in UTC.

use chrono::{DateTime, NaiveDate, Utc};

use crate::{Error, Result, pass::PassStatus};

/// Parameters for [`crate::store::PassRepository::list_all`] and
/// [`crate::store::PassRepository::list_for_creator`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassFilter {
  /// Exact status match. `None` means [`PassStatus::LISTED_BY_DEFAULT`].
  pub status: Option<PassStatus>,
  /// Inclusive lower bound on `visit_date`.
  pub from:   Option<DateTime<Utc>>,
  /// Inclusive upper bound on `visit_date`.
  pub to:     Option<DateTime<Utc>>,
}

impl PassFilter {
  /// Build a filter from raw boundary input.
  pub fn parse(
    status: Option<PassStatus>,
    from: Option<&str>,
    to: Option<&str>,
  ) -> Result<Self> {
    Ok(Self {
      status,
      from: from.map(parse_begin_date).transpose()?,
      to: to.map(parse_end_date).transpose()?,
    })
  }

  /// The statuses a row must have to match.
  pub fn statuses(&self) -> Vec<PassStatus> {
    match self.status {
      Some(s) => vec![s],
      None => PassStatus::LISTED_BY_DEFAULT.to_vec(),
    }
  }
}

/// `00:00:00` on the given day.
pub fn parse_begin_date(raw: &str) -> Result<DateTime<Utc>> {
  let day = parse_day(raw)?;
  Ok(day.and_time(chrono::NaiveTime::MIN).and_utc())
}

/// The last nanosecond of the given day.
pub fn parse_end_date(raw: &str) -> Result<DateTime<Utc>> {
  let day = parse_day(raw)?;
  day
    .and_hms_nano_opt(23, 59, 59, 999_999_999)
    .map(|dt| dt.and_utc())
    .ok_or_else(|| Error::MalformedDate(raw.to_owned()))
}

fn parse_day(raw: &str) -> Result<NaiveDate> {
  let head = raw
    .get(..10)
    .ok_or_else(|| Error::MalformedDate(raw.to_owned()))?;

  NaiveDate::parse_from_str(head, "%Y-%m-%d")
    .or_else(|_| NaiveDate::parse_from_str(head, "%d.%m.%Y"))
    .map_err(|_| Error::MalformedDate(raw.to_owned()))
}
