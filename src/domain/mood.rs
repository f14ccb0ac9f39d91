//! Mood dimensions and the sparse score vector attached to every entry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::MoodlogError;

/// One of the five scored emotions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodDimension {
    Happiness,
    Fear,
    Anger,
    Sadness,
    Excitement,
}

impl MoodDimension {
    /// All dimensions in display order.
    pub const ALL: [Self; 5] = [
        Self::Happiness,
        Self::Fear,
        Self::Anger,
        Self::Sadness,
        Self::Excitement,
    ];

    /// Lowercase key used in JSON and on the command line.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Happiness => "happiness",
            Self::Fear => "fear",
            Self::Anger => "anger",
            Self::Sadness => "sadness",
            Self::Excitement => "excitement",
        }
    }

    /// Capitalized label for display.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Happiness => "Happiness",
            Self::Fear => "Fear",
            Self::Anger => "Anger",
            Self::Sadness => "Sadness",
            Self::Excitement => "Excitement",
        }
    }
}

impl fmt::Display for MoodDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for MoodDimension {
    type Err = MoodlogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|d| d.key() == needle)
            .ok_or_else(|| MoodlogError::Validation(format!("unknown mood dimension: {s}")))
    }
}

/// Sparse five-dimensional mood score.
///
/// Each dimension is conventionally in `[0, 10]` but the range is not enforced.
/// Dimensions the scorer did not report stay `None`, are omitted from JSON, and
/// read as `0` through [`MoodVector::score`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodVector {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub happiness: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fear: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anger: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sadness: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excitement: Option<i32>,
}

impl MoodVector {
    /// Raw value of one dimension, `None` when absent.
    #[must_use]
    pub const fn get(&self, dimension: MoodDimension) -> Option<i32> {
        match dimension {
            MoodDimension::Happiness => self.happiness,
            MoodDimension::Fear => self.fear,
            MoodDimension::Anger => self.anger,
            MoodDimension::Sadness => self.sadness,
            MoodDimension::Excitement => self.excitement,
        }
    }

    /// Score of one dimension with absence read as zero.
    #[must_use]
    pub fn score(&self, dimension: MoodDimension) -> i32 {
        self.get(dimension).unwrap_or(0)
    }

    /// Builder-style setter.
    #[must_use]
    pub fn with(mut self, dimension: MoodDimension, value: i32) -> Self {
        match dimension {
            MoodDimension::Happiness => self.happiness = Some(value),
            MoodDimension::Fear => self.fear = Some(value),
            MoodDimension::Anger => self.anger = Some(value),
            MoodDimension::Sadness => self.sadness = Some(value),
            MoodDimension::Excitement => self.excitement = Some(value),
        }
        self
    }

    /// Present dimensions with their values, in display order.
    pub fn iter(&self) -> impl Iterator<Item = (MoodDimension, i32)> + '_ {
        MoodDimension::ALL
            .into_iter()
            .filter_map(|d| self.get(d).map(|v| (d, v)))
    }

    /// Dimension with the highest positive score. Earlier dimensions win ties.
    #[must_use]
    pub fn strongest(&self) -> Option<(MoodDimension, i32)> {
        self.iter()
            .filter(|(_, v)| *v > 0)
            .fold(None, |best, (d, v)| match best {
                Some((_, bv)) if bv >= v => best,
                _ => Some((d, v)),
            })
    }
}
