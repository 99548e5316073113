use anyhow::{anyhow, Context, Result};
use jiff::{SignedDuration, Timestamp};
use std::str::FromStr;

/// Longest accepted lookback (a century)
pub const MAX_LOOKBACK_DAYS: u32 = 36_500;

/// How far back issue searches reach, in whole days.
///
/// Parsed from `"365"`, `"365d"` or `"52w"` (case-insensitive suffix).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lookback {
    days: u32,
}

impl Lookback {
    pub fn from_days(days: u32) -> Self {
        Lookback { days }
    }

    pub fn as_days(&self) -> u32 {
        self.days
    }

    /// The instant `self` days before `run_start`
    pub fn since(&self, run_start: Timestamp) -> Result<Timestamp> {
        let window = SignedDuration::from_hours(i64::from(self.days) * 24);
        run_start
            .checked_sub(window)
            .with_context(|| format!("Lookback of {} days is out of range", self.days))
    }
}

impl FromStr for Lookback {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(anyhow!("Lookback cannot be empty"));
        }

        let (number_part, multiplier) = match s.char_indices().last() {
            Some((idx, c)) if c.is_ascii_alphabetic() => match c.to_ascii_lowercase() {
                'd' => (&s[..idx], 1),
                'w' => (&s[..idx], 7),
                other => {
                    return Err(anyhow!(
                        "Invalid lookback suffix '{}'. Use 'd' for days or 'w' for weeks",
                        other
                    ))
                }
            },
            _ => (s, 1),
        };

        let number: u32 = number_part
            .parse()
            .map_err(|_| anyhow!("Invalid number in lookback: '{}'", number_part))?;

        if number == 0 {
            return Err(anyhow!("Lookback must be greater than 0"));
        }

        let days = number
            .checked_mul(multiplier)
            .ok_or_else(|| anyhow!("Lookback is too large: '{}'", s))?;

        if days > MAX_LOOKBACK_DAYS {
            return Err(anyhow!(
                "Lookback of {} days exceeds the maximum of {} days",
                days,
                MAX_LOOKBACK_DAYS
            ));
        }

        Ok(Lookback { days })
    }
}

impl std::fmt::Display for Lookback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} days", self.days)
    }
}
