use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// A UK tax year, identified by the calendar year in which it starts.
///
/// Tax years run from 6 April to 5 April and are labelled `"YYYY/YY"`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaxYear {
    start: i32,
}

impl TaxYear {
    pub const fn starting(start: i32) -> Self {
        Self { start }
    }

    pub fn start_year(self) -> i32 {
        self.start
    }

    pub fn from_date(date: NaiveDate) -> Self {
        let year = date.year();
        let before_start = date.month() < 4 || (date.month() == 4 && date.day() < 6);
        if before_start {
            Self::starting(year - 1)
        } else {
            Self::starting(year)
        }
    }

    pub fn current() -> Self {
        Self::from_date(Local::now().date_naive())
    }

    pub fn next(self) -> Self {
        Self::starting(self.start + 1)
    }

    /// `n` consecutive tax years beginning with `self`.
    pub fn next_n(self, n: usize) -> Vec<TaxYear> {
        std::iter::successors(Some(self), |year| Some(year.next()))
            .take(n)
            .collect()
    }
}

impl fmt::Display for TaxYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{:02}", self.start, (self.start + 1).rem_euclid(100))
    }
}

impl FromStr for TaxYear {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, suffix) = s
            .split_once('/')
            .ok_or_else(|| format!("tax year '{s}' must look like YYYY/YY"))?;
        let start = start
            .parse::<i32>()
            .map_err(|_| format!("tax year '{s}' has an invalid start year"))?;
        let suffix = suffix
            .parse::<i32>()
            .map_err(|_| format!("tax year '{s}' has an invalid end year"))?;
        if suffix != (start + 1).rem_euclid(100) {
            return Err(format!("tax year '{s}' does not span consecutive years"));
        }
        Ok(Self::starting(start))
    }
}

impl TryFrom<String> for TaxYear {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TaxYear> for String {
    fn from(value: TaxYear) -> Self {
        value.to_string()
    }
}

pub fn current_tax_year() -> TaxYear {
    TaxYear::current()
}

pub fn next_tax_years(n: usize) -> Vec<TaxYear> {
    TaxYear::current().next_n(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn january_to_march_belongs_to_previous_start_year() {
        assert_eq!(TaxYear::from_date(date(2025, 1, 1)).to_string(), "2024/25");
        assert_eq!(TaxYear::from_date(date(2025, 3, 31)).to_string(), "2024/25");
    }

    #[test]
    fn sixth_of_april_starts_new_tax_year() {
        assert_eq!(TaxYear::from_date(date(2025, 4, 5)).to_string(), "2024/25");
        assert_eq!(TaxYear::from_date(date(2025, 4, 6)).to_string(), "2025/26");
        assert_eq!(TaxYear::from_date(date(2025, 12, 31)).to_string(), "2025/26");
    }

    #[test]
    fn label_suffix_is_zero_padded_across_centuries() {
        assert_eq!(TaxYear::starting(2009).to_string(), "2009/10");
        assert_eq!(TaxYear::starting(1999).to_string(), "1999/00");
        assert_eq!(TaxYear::starting(2000).to_string(), "2000/01");
    }

    #[test]
    fn next_n_yields_consecutive_labels() {
        let labels: Vec<String> = TaxYear::starting(2024)
            .next_n(4)
            .into_iter()
            .map(|y| y.to_string())
            .collect();
        assert_eq!(labels, ["2024/25", "2025/26", "2026/27", "2027/28"]);
        assert!(TaxYear::starting(2024).next_n(0).is_empty());
    }

    #[test]
    fn parse_round_trips_and_rejects_gaps() {
        assert_eq!("2026/27".parse::<TaxYear>(), Ok(TaxYear::starting(2026)));
        assert_eq!("1999/00".parse::<TaxYear>(), Ok(TaxYear::starting(1999)));
        assert!("2026/28".parse::<TaxYear>().is_err());
        assert!("2026".parse::<TaxYear>().is_err());
        assert!("abcd/ef".parse::<TaxYear>().is_err());
    }

    #[test]
    fn next_tax_years_starts_at_current() {
        let years = next_tax_years(4);
        assert_eq!(years.len(), 4);
        assert_eq!(years[0], current_tax_year());
        assert_eq!(years[3].start_year(), years[0].start_year() + 3);
    }
}
