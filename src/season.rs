use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};

/// An NHL season identified by its start year and rendered in the upstream
/// API's juxtaposed form, e.g. the 2023-24 season is `"20232024"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeasonId {
    start: i32,
}

impl SeasonId {
    /// First season the league played; anything earlier is a typo.
    const MIN_START_YEAR: i32 = 1917;
    const MAX_START_YEAR: i32 = 2100;

    pub fn new(start_year: i32) -> Result<Self> {
        if !(Self::MIN_START_YEAR..=Self::MAX_START_YEAR).contains(&start_year) {
            return Err(anyhow!(
                "season start year {start_year} outside {}..={}",
                Self::MIN_START_YEAR,
                Self::MAX_START_YEAR
            ));
        }
        Ok(Self { start: start_year })
    }

    /// Parse the packed 8-digit form (`20232024`) the API reports in payloads.
    /// The end half must be start + 1.
    pub fn from_packed(packed: i64) -> Option<Self> {
        let start = i32::try_from(packed / 10000).ok()?;
        let end = i32::try_from(packed % 10000).ok()?;
        if end != start + 1 {
            return None;
        }
        Self::new(start).ok()
    }

    pub fn start_year(self) -> i32 {
        self.start
    }

    /// Packed numeric form used as the season's primary key.
    pub fn packed(self) -> i64 {
        i64::from(self.start) * 10000 + i64::from(self.start + 1)
    }
}

impl fmt::Display for SeasonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.start, self.start + 1)
    }
}

impl FromStr for SeasonId {
    type Err = anyhow::Error;

    /// Accepts either a start year (`"2023"`) or the packed form (`"20232024"`).
    fn from_str(s: &str) -> Result<Self> {
        match s.len() {
            4 => Self::new(s.parse()?),
            8 => {
                let packed: i64 = s.parse()?;
                Self::from_packed(packed)
                    .ok_or_else(|| anyhow!("{s} is not a consecutive-year season pair"))
            }
            _ => Err(anyhow!("season must be a start year or an 8-digit pair")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_juxtaposed_year_pair() {
        let season = SeasonId::new(2023).unwrap();
        assert_eq!(season.to_string(), "20232024");
        assert_eq!(season.packed(), 20232024);
    }

    #[test]
    fn rejects_out_of_range_start_years() {
        assert!(SeasonId::new(1900).is_err());
        assert!(SeasonId::new(2500).is_err());
        assert!(SeasonId::new(1917).is_ok());
    }

    #[test]
    fn packed_form_must_be_consecutive() {
        assert_eq!(
            SeasonId::from_packed(20232024),
            Some(SeasonId::new(2023).unwrap())
        );
        assert_eq!(SeasonId::from_packed(20232025), None);
        assert_eq!(SeasonId::from_packed(1234), None);
    }

    #[test]
    fn parses_both_string_forms() {
        assert_eq!(
            "2023".parse::<SeasonId>().unwrap(),
            SeasonId::new(2023).unwrap()
        );
        assert_eq!(
            "20232024".parse::<SeasonId>().unwrap(),
            SeasonId::new(2023).unwrap()
        );
        assert!("202320".parse::<SeasonId>().is_err());
    }
}
