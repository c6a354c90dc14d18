use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flow {
    Light,
    Medium,
    Heavy,
}

impl Flow {
    pub fn as_str(&self) -> &'static str {
        match self {
            Flow::Light => "light",
            Flow::Medium => "medium",
            Flow::Heavy => "heavy",
        }
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Flow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Flow::Light),
            "medium" => Ok(Flow::Medium),
            "heavy" => Ok(Flow::Heavy),
            _ => Err(format!("Unknown flow: {}", s)),
        }
    }
}

/// Fixed symptom vocabulary. Declaration order is the tie-break order
/// when two symptoms are equally frequent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Symptom {
    Cramps,
    Headache,
    Bloating,
    Fatigue,
    MoodSwings,
    Acne,
    BackPain,
    BreastTenderness,
    Nausea,
    Cravings,
    Insomnia,
}

impl Symptom {
    pub const ALL: [Symptom; 11] = [
        Symptom::Cramps,
        Symptom::Headache,
        Symptom::Bloating,
        Symptom::Fatigue,
        Symptom::MoodSwings,
        Symptom::Acne,
        Symptom::BackPain,
        Symptom::BreastTenderness,
        Symptom::Nausea,
        Symptom::Cravings,
        Symptom::Insomnia,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Symptom::Cramps => "cramps",
            Symptom::Headache => "headache",
            Symptom::Bloating => "bloating",
            Symptom::Fatigue => "fatigue",
            Symptom::MoodSwings => "mood_swings",
            Symptom::Acne => "acne",
            Symptom::BackPain => "back_pain",
            Symptom::BreastTenderness => "breast_tenderness",
            Symptom::Nausea => "nausea",
            Symptom::Cravings => "cravings",
            Symptom::Insomnia => "insomnia",
        }
    }

    /// Human-readable wording used in tips.
    pub fn label(&self) -> &'static str {
        match self {
            Symptom::Cramps => "cramps",
            Symptom::Headache => "headaches",
            Symptom::Bloating => "bloating",
            Symptom::Fatigue => "fatigue",
            Symptom::MoodSwings => "mood swings",
            Symptom::Acne => "acne",
            Symptom::BackPain => "back pain",
            Symptom::BreastTenderness => "breast tenderness",
            Symptom::Nausea => "nausea",
            Symptom::Cravings => "cravings",
            Symptom::Insomnia => "trouble sleeping",
        }
    }
}

impl fmt::Display for Symptom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Symptom {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Symptom::ALL
            .iter()
            .copied()
            .find(|symptom| symptom.as_str() == s)
            .ok_or_else(|| format!("Unknown symptom: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodEntry {
    pub id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub flow: Flow,
    #[serde(default)]
    pub symptoms: BTreeSet<Symptom>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl PeriodEntry {
    /// Inclusive length in days, or `None` while ongoing or when the end
    /// date precedes the start date.
    pub fn period_length(&self) -> Option<i64> {
        let end = self.end_date?;
        let days = (end - self.start_date).num_days();
        (days >= 0).then_some(days + 1)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPeriodEntry {
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub flow: Flow,
    #[serde(default)]
    pub symptoms: BTreeSet<Symptom>,
    pub notes: Option<String>,
}

/// Derived statistics for one user. Numeric fields are `None` when there is
/// not enough data; that is serialized as `null`, never as `0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    pub average_cycle_length: Option<f64>,
    pub average_period_length: Option<f64>,
    pub total_cycles: usize,
    pub next_predicted_date: Option<NaiveDate>,
    pub tips: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleStat {
    pub cycle_number: usize,
    pub start_date: NaiveDate,
    pub period_length: Option<i64>,
    pub cycle_length: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleStatsResponse {
    pub average_period_length: Option<f64>,
    pub average_cycle_length: Option<f64>,
    pub shortest_cycle: Option<i64>,
    pub longest_cycle: Option<i64>,
    pub cycle_stats: Vec<CycleStat>,
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symptom_tags_round_trip_through_vocabulary() {
        for symptom in Symptom::ALL {
            assert_eq!(symptom.as_str().parse::<Symptom>(), Ok(symptom));
        }
        assert!("glitter".parse::<Symptom>().is_err());
        assert_eq!(
            serde_json::to_value(Symptom::MoodSwings).unwrap(),
            serde_json::json!("mood_swings")
        );
    }

    #[test]
    fn period_length_is_inclusive_and_never_negative() {
        let mut entry = PeriodEntry {
            id: Uuid::nil(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: None,
            flow: Flow::Heavy,
            symptoms: BTreeSet::new(),
            notes: None,
        };
        assert_eq!(entry.period_length(), None);

        entry.end_date = NaiveDate::from_ymd_opt(2024, 1, 1);
        assert_eq!(entry.period_length(), Some(1));

        entry.end_date = NaiveDate::from_ymd_opt(2023, 12, 30);
        assert_eq!(entry.period_length(), None);
    }
}
