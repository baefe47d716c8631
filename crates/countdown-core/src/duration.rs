//! Duration input and `HH:MM:SS` formatting.

use serde::{Deserialize, Serialize};

pub const MAX_HOURS: u64 = 99;
pub const MAX_MINUTES: u64 = 59;
pub const MAX_SECONDS: u64 = 59;

/// Largest duration the input fields can express (99:59:59).
pub const MAX_TOTAL_SECS: u64 = MAX_HOURS * 3600 + MAX_MINUTES * 60 + MAX_SECONDS;

/// The hours/minutes/seconds fields a user types a duration into.
///
/// Each field is clamped independently on construction and on
/// deserialization, so the total is always `hours * 3600 + minutes * 60 +
/// seconds` and never exceeds [`MAX_TOTAL_SECS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "RawDurationInput")]
pub struct DurationInput {
    hours: u64,
    minutes: u64,
    seconds: u64,
}

/// Field values as stored, before clamping.
#[derive(Deserialize)]
struct RawDurationInput {
    #[serde(default)]
    hours: u64,
    #[serde(default)]
    minutes: u64,
    #[serde(default)]
    seconds: u64,
}

impl From<RawDurationInput> for DurationInput {
    fn from(raw: RawDurationInput) -> Self {
        Self::new(raw.hours, raw.minutes, raw.seconds)
    }
}

impl DurationInput {
    pub fn new(hours: u64, minutes: u64, seconds: u64) -> Self {
        Self {
            hours: hours.min(MAX_HOURS),
            minutes: minutes.min(MAX_MINUTES),
            seconds: seconds.min(MAX_SECONDS),
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Decompose a total number of seconds, saturating at 99:59:59.
    pub fn from_total_secs(total: u64) -> Self {
        let total = total.min(MAX_TOTAL_SECS);
        Self {
            hours: total / 3600,
            minutes: (total % 3600) / 60,
            seconds: total % 60,
        }
    }

    pub fn hours(&self) -> u64 {
        self.hours
    }

    pub fn minutes(&self) -> u64 {
        self.minutes
    }

    pub fn seconds(&self) -> u64 {
        self.seconds
    }

    pub fn total_secs(&self) -> u64 {
        self.hours * 3600 + self.minutes * 60 + self.seconds
    }

    pub fn is_zero(&self) -> bool {
        self.total_secs() == 0
    }
}

/// Format seconds as zero-padded `HH:MM:SS`.
pub fn format_hms(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_clamp_independently() {
        let input = DurationInput::new(120, 75, 61);
        assert_eq!(input.hours(), 99);
        assert_eq!(input.minutes(), 59);
        assert_eq!(input.seconds(), 59);
        assert_eq!(input.total_secs(), MAX_TOTAL_SECS);
    }

    #[test]
    fn total_matches_fields() {
        let input = DurationInput::new(1, 2, 3);
        assert_eq!(input.total_secs(), 3723);
        assert_eq!(DurationInput::from_total_secs(3723), input);
    }

    #[test]
    fn from_total_saturates() {
        let input = DurationInput::from_total_secs(u64::MAX);
        assert_eq!(input, DurationInput::new(99, 59, 59));
    }

    #[test]
    fn format_pads_each_field() {
        assert_eq!(format_hms(0), "00:00:00");
        assert_eq!(format_hms(5), "00:00:05");
        assert_eq!(format_hms(3723), "01:02:03");
        assert_eq!(format_hms(MAX_TOTAL_SECS), "99:59:59");
    }

    #[test]
    fn deserialization_clamps_fields() {
        let input: DurationInput =
            serde_json::from_str(r#"{"hours":3,"minutes":90,"seconds":0}"#).unwrap();
        assert_eq!(input, DurationInput::new(3, 59, 0));

        // Large enough to overflow `total_secs` if left unclamped.
        let huge: DurationInput =
            serde_json::from_str(r#"{"hours":5000000000000000}"#).unwrap();
        assert_eq!(huge.hours(), 99);
        assert_eq!(huge.total_secs(), 99 * 3600);

        let partial: DurationInput = serde_json::from_str(r#"{"minutes":1}"#).unwrap();
        assert_eq!(partial.total_secs(), 60);
    }
}
