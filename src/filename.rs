//! Filename parsing for monthly equity layers.
//!
//! Input files follow `equity_monthly_{season}_{MM}_{YYYY}.shp`. Any name
//! that does not match is rejected so that rows are never tagged with the
//! wrong reporting period.

use crate::constants::FILENAME_PATTERN;
use crate::error::{EquityError, Result};
use crate::models::{FilenameToken, Season};
use chrono::Month;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static FILENAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(FILENAME_PATTERN).expect("filename pattern is a valid regex"));

/// Parse season, month and year from an input file name
pub fn parse_filename(filename: &str) -> Result<FilenameToken> {
    let captures =
        FILENAME_REGEX
            .captures(filename)
            .ok_or_else(|| EquityError::FilenamePattern {
                filename: filename.to_string(),
            })?;

    let season =
        Season::from_token(&captures[1]).ok_or_else(|| EquityError::FilenamePattern {
            filename: filename.to_string(),
        })?;
    let month = captures[2].to_string();
    let year: i32 = captures[3]
        .parse()
        .map_err(|_| EquityError::FilenamePattern {
            filename: filename.to_string(),
        })?;

    let month_name = month_abbreviation(&month).ok_or_else(|| EquityError::InvalidMonth {
        filename: filename.to_string(),
        month: month.clone(),
    })?;

    debug!(
        "Parsed {}: season={}, month={}, year={}",
        filename, season, month, year
    );

    Ok(FilenameToken {
        season,
        month,
        year,
        month_name,
    })
}

/// Three-letter month name for a zero-padded month number ("01" -> "Jan")
pub fn month_abbreviation(month: &str) -> Option<String> {
    let number: u8 = month.parse().ok()?;
    let month = Month::try_from(number).ok()?;
    Some(month.name()[..3].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_filename() {
        let token = parse_filename("equity_monthly_dry_01_2014.shp").unwrap();
        assert_eq!(token.season, Season::Dry);
        assert_eq!(token.month, "01");
        assert_eq!(token.month_number(), 1);
        assert_eq!(token.year, 2014);
        assert_eq!(token.month_name, "Jan");
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let token = parse_filename("EQUITY_MONTHLY_Transition_10_2020.SHP").unwrap();
        assert_eq!(token.season, Season::Transition);
        assert_eq!(token.season.to_string(), "Transition");
        assert_eq!(token.month_name, "Oct");
        assert_eq!(token.year, 2020);

        let token = parse_filename("equity_monthly_WET_07_2015.shp").unwrap();
        assert_eq!(token.season, Season::Wet);
        assert_eq!(token.month_name, "Jul");
    }

    #[test]
    fn test_every_month_has_a_name() {
        let expected = [
            "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
        ];
        for (i, name) in expected.iter().enumerate() {
            let filename = format!("equity_monthly_wet_{:02}_2016.shp", i + 1);
            let token = parse_filename(&filename).unwrap();
            assert_eq!(&token.month_name, name);
            assert_eq!(token.month_number(), i as i32 + 1);
        }
    }

    #[test]
    fn test_rejects_non_matching_names() {
        let bad = [
            "equity_monthly_spring_01_2014.shp",
            "equity_monthly_dry_1_2014.shp",
            "equity_monthly_dry_01_14.shp",
            "equity_monthly_dry_01_2014.dbf",
            "equity_monthly_dry_01_2014_v2.shp",
            "prefix_equity_monthly_dry_01_2014.shp",
            "equity.shp",
            "",
        ];
        for name in bad {
            match parse_filename(name) {
                Err(EquityError::FilenamePattern { filename }) => assert_eq!(filename, name),
                other => panic!("Expected FilenamePattern error for {name:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_rejects_out_of_range_month() {
        for month in ["00", "13", "99"] {
            let name = format!("equity_monthly_dry_{month}_2014.shp");
            match parse_filename(&name) {
                Err(EquityError::InvalidMonth { filename, month: m }) => {
                    assert_eq!(filename, name);
                    assert_eq!(m, month);
                }
                other => panic!("Expected InvalidMonth error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_error_message_names_the_file() {
        let err = parse_filename("monthly_rain.shp").unwrap_err();
        assert!(err.to_string().contains("monthly_rain.shp"));
    }
}
