//! Named reminder presets.
//!
//! Timed events offer fixed "minutes before" presets. All-day events offer
//! presets anchored at a local hour (9:00 by default) on the event day or a
//! number of days before it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Presets for events with a start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimedPreset {
    #[serde(rename = "at_start")]
    AtStart,
    #[serde(rename = "min_5")]
    Min5,
    #[serde(rename = "min_10")]
    Min10,
    #[serde(rename = "min_15")]
    Min15,
    #[serde(rename = "min_30")]
    Min30,
    #[serde(rename = "hr_1")]
    Hr1,
}

impl TimedPreset {
    /// All timed presets, in table order.
    pub const ALL: [TimedPreset; 6] = [
        Self::AtStart,
        Self::Min5,
        Self::Min10,
        Self::Min15,
        Self::Min30,
        Self::Hr1,
    ];

    /// Minutes before the event start.
    pub fn minutes_before(&self) -> u32 {
        match self {
            Self::AtStart => 0,
            Self::Min5 => 5,
            Self::Min10 => 10,
            Self::Min15 => 15,
            Self::Min30 => 30,
            Self::Hr1 => 60,
        }
    }

    /// Exact reverse lookup of the table.
    pub fn from_minutes(minutes: u32) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.minutes_before() == minutes)
    }

    /// Stable identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AtStart => "at_start",
            Self::Min5 => "min_5",
            Self::Min10 => "min_10",
            Self::Min15 => "min_15",
            Self::Min30 => "min_30",
            Self::Hr1 => "hr_1",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::AtStart => "At start of event",
            Self::Min5 => "5 minutes before",
            Self::Min10 => "10 minutes before",
            Self::Min15 => "15 minutes before",
            Self::Min30 => "30 minutes before",
            Self::Hr1 => "1 hour before",
        }
    }
}

/// Presets for all-day events, anchored at the configured local hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AllDayPreset {
    #[serde(rename = "same_day_9am")]
    SameDay9am,
    #[serde(rename = "day_1_before_9am")]
    Day1Before9am,
    #[serde(rename = "day_2_before_9am")]
    Day2Before9am,
    #[serde(rename = "week_1_before_9am")]
    Week1Before9am,
}

impl AllDayPreset {
    /// All all-day presets, in table order.
    pub const ALL: [AllDayPreset; 4] = [
        Self::SameDay9am,
        Self::Day1Before9am,
        Self::Day2Before9am,
        Self::Week1Before9am,
    ];

    /// Number of local days between the reminder and the event day.
    pub fn days_before(&self) -> u32 {
        match self {
            Self::SameDay9am => 0,
            Self::Day1Before9am => 1,
            Self::Day2Before9am => 2,
            Self::Week1Before9am => 7,
        }
    }

    /// Reverse lookup by whole-day difference.
    pub fn from_days_before(days: i64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|preset| i64::from(preset.days_before()) == days)
    }

    /// Whether the preset fires on the event day itself, after its start.
    ///
    /// Such a preset is always stored as an absolute time.
    pub fn is_same_day(&self) -> bool {
        self.days_before() == 0
    }

    /// Stable identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SameDay9am => "same_day_9am",
            Self::Day1Before9am => "day_1_before_9am",
            Self::Day2Before9am => "day_2_before_9am",
            Self::Week1Before9am => "week_1_before_9am",
        }
    }

    /// Human-readable label for a given anchor hour.
    pub fn label(&self, hour: u32) -> String {
        let at = format!("{:02}:00", hour);
        match self {
            Self::SameDay9am => format!("On the day at {}", at),
            Self::Day1Before9am => format!("1 day before at {}", at),
            Self::Day2Before9am => format!("2 days before at {}", at),
            Self::Week1Before9am => format!("1 week before at {}", at),
        }
    }
}

/// A preset of either kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Preset {
    Timed(TimedPreset),
    AllDay(AllDayPreset),
}

impl Preset {
    /// Stable identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timed(preset) => preset.as_str(),
            Self::AllDay(preset) => preset.as_str(),
        }
    }
}

impl From<TimedPreset> for Preset {
    fn from(preset: TimedPreset) -> Self {
        Self::Timed(preset)
    }
}

impl From<AllDayPreset> for Preset {
    fn from(preset: AllDayPreset) -> Self {
        Self::AllDay(preset)
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
