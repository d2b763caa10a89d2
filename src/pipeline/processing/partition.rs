//! Decoding of the composite `"<year> <team>"` column.
//!
//! Runs before any numeric normalization: whether a row is a career aggregate
//! is decided on the untouched remainder text.

use crate::error::{CleanError, Result};

/// The two logical values carried by a composite Team field, still as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Composite<'a> {
    Yearly { year: &'a str, team: &'a str },
    /// The leading token counts years played, not a calendar year
    Career { total_years: &'a str },
}

/// Split on the first whitespace only. The team name may itself contain
/// spaces and is returned trimmed.
pub fn split_year_team(raw: &str) -> Option<(&str, &str)> {
    let (year, remainder) = raw.split_once(char::is_whitespace)?;
    let team = remainder.trim();
    if year.is_empty() || team.is_empty() {
        return None;
    }
    Some((year, team))
}

/// `marker` is the remainder that flags a career row. Tables that never
/// carry aggregates use [`split_year_team`] instead.
pub fn decode<'a>(raw: &'a str, marker: &str) -> Option<Composite<'a>> {
    let (year, team) = split_year_team(raw)?;
    if team == marker {
        Some(Composite::Career { total_years: year })
    } else {
        Some(Composite::Yearly { year, team })
    }
}

/// As [`decode`], for a value that already passed validation.
pub fn decode_validated<'a>(
    raw: &'a str,
    marker: &str,
    row: usize,
    column: &str,
) -> Result<Composite<'a>> {
    decode(raw, marker).ok_or_else(|| undecodable(raw, row, column))
}

/// As [`split_year_team`], for a value that already passed validation.
pub fn split_validated<'a>(raw: &'a str, row: usize, column: &str) -> Result<(&'a str, &'a str)> {
    split_year_team(raw).ok_or_else(|| undecodable(raw, row, column))
}

fn undecodable(raw: &str, row: usize, column: &str) -> CleanError {
    CleanError::Normalization {
        row,
        column: column.to_string(),
        value: raw.to_string(),
        reason: "expected '<year> <team>'".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::CAREER_MARKER;

    #[test]
    fn test_team_name_keeps_inner_spaces() {
        assert_eq!(
            decode("1985 St. Louis Cardinals", CAREER_MARKER),
            Some(Composite::Yearly {
                year: "1985",
                team: "St. Louis Cardinals"
            })
        );
    }

    #[test]
    fn test_remainder_is_trimmed() {
        assert_eq!(
            decode("1990   Miami  ", CAREER_MARKER),
            Some(Composite::Yearly {
                year: "1990",
                team: "Miami"
            })
        );
    }

    #[test]
    fn test_marker_routes_to_career() {
        assert_eq!(
            decode("15 Years", CAREER_MARKER),
            Some(Composite::Career { total_years: "15" })
        );
    }

    #[test]
    fn test_plain_split_has_no_career_marker() {
        assert_eq!(split_validated("15 Years", 1, "Team").unwrap(), ("15", "Years"));
    }

    #[test]
    fn test_marker_must_be_the_whole_remainder() {
        assert_eq!(
            decode("3 Years Later", CAREER_MARKER),
            Some(Composite::Yearly {
                year: "3",
                team: "Years Later"
            })
        );
    }

    #[test]
    fn test_unsplittable_values() {
        assert_eq!(decode("1990", CAREER_MARKER), None);
        assert_eq!(decode("1990 ", CAREER_MARKER), None);
        assert!(split_validated("Miami", 3, "Team").is_err());
        assert!(split_validated("1990", 3, "Team").is_err());
    }

    #[test]
    fn test_rejoin_matches_composite_shape() {
        let shape = regex::Regex::new(r"^[0-9]+\s+\S.*$").unwrap();
        for raw in ["1990 Miami", "2001  New York Yankees ", "7\tBoston"] {
            if let Some(Composite::Yearly { year, team }) = decode(raw, CAREER_MARKER) {
                assert!(shape.is_match(&format!("{} {}", year, team)));
            } else {
                panic!("expected a yearly decode for {raw:?}");
            }
        }
    }
}
