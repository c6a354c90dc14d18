//! Cycle insight engine.
//!
//! Pure functions over one user's period history. Nothing here touches the
//! store or the clock, so identical input always gives identical output.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, NaiveDate};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::InsightError;
use crate::models::{CycleStat, CycleStatsResponse, Flow, Insights, PeriodEntry, Symptom};

pub const TYPICAL_CYCLE_MIN: f64 = 21.0;
pub const TYPICAL_CYCLE_MAX: f64 = 35.0;
const SYMPTOM_WINDOW: usize = 3;

pub const ONBOARDING_TIP: &str = "Log at least two periods to unlock cycle predictions.";

pub fn compute_insights(entries: &[PeriodEntry]) -> Insights {
    let sorted = chronological(entries);

    let cycle_lengths = cycle_lengths(&sorted);
    let avg_cycle = mean(&cycle_lengths);
    let avg_period = mean(&period_lengths(&sorted));

    let next_predicted_date = match (avg_cycle, sorted.last()) {
        // Past the end of the calendar there is nothing to predict.
        (Some(avg), Some(last)) => last
            .start_date
            .checked_add_signed(Duration::days(avg.round() as i64)),
        _ => None,
    };

    Insights {
        average_cycle_length: avg_cycle.map(f64::round),
        average_period_length: avg_period.map(f64::round),
        total_cycles: cycle_lengths.len(),
        next_predicted_date,
        tips: tips(&sorted, avg_cycle),
    }
}

/// Same as [`compute_insights`] but over raw JSON records, as posted by a
/// client. Only a non-array container or a non-object element is an error;
/// records with bad fields are skipped.
pub fn compute_insights_from_value(value: &Value) -> Result<Insights, InsightError> {
    let entries = decode_entries(value)?;
    Ok(compute_insights(&entries))
}

/// One row per valid entry, oldest first. The latest cycle is still running,
/// so its `cycle_length` is `None` rather than zero.
pub fn cycle_history(entries: &[PeriodEntry]) -> Vec<CycleStat> {
    let sorted = chronological(entries);

    sorted
        .iter()
        .enumerate()
        .map(|(i, entry)| CycleStat {
            cycle_number: i + 1,
            start_date: entry.start_date,
            period_length: entry.period_length(),
            cycle_length: sorted
                .get(i + 1)
                .map(|next| (next.start_date - entry.start_date).num_days()),
        })
        .collect()
}

pub fn cycle_stats(entries: &[PeriodEntry]) -> CycleStatsResponse {
    let insights = compute_insights(entries);
    let history = cycle_history(entries);
    let lengths = history.iter().filter_map(|stat| stat.cycle_length);

    CycleStatsResponse {
        average_period_length: insights.average_period_length,
        average_cycle_length: insights.average_cycle_length,
        shortest_cycle: lengths.clone().min(),
        longest_cycle: lengths.max(),
        cycle_stats: history,
    }
}

pub fn decode_entries(value: &Value) -> Result<Vec<PeriodEntry>, InsightError> {
    let records = value
        .as_array()
        .ok_or_else(|| InsightError::InvalidInput("expected an array of period entries".into()))?;

    let mut entries = Vec::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        let fields = record.as_object().ok_or_else(|| {
            InsightError::InvalidInput(format!("element {} is not an entry object", i))
        })?;

        match decode_entry(fields) {
            Some(entry) => entries.push(entry),
            None => tracing::debug!("skipping malformed period entry at index {}", i),
        }
    }

    Ok(entries)
}

fn decode_entry(fields: &Map<String, Value>) -> Option<PeriodEntry> {
    let start_date = fields.get("startDate").and_then(parse_date)?;
    let flow = fields
        .get("flow")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<Flow>().ok())?;

    let id = fields
        .get("id")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or(Uuid::nil());

    let symptoms: BTreeSet<Symptom> = fields
        .get("symptoms")
        .and_then(Value::as_array)
        .map(|tags| {
            tags.iter()
                .filter_map(Value::as_str)
                .filter_map(|tag| tag.parse::<Symptom>().ok())
                .collect()
        })
        .unwrap_or_default();

    Some(PeriodEntry {
        id,
        start_date,
        end_date: fields.get("endDate").and_then(parse_date),
        flow,
        symptoms,
        notes: fields.get("notes").and_then(Value::as_str).map(str::to_owned),
    })
}

fn parse_date(value: &Value) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.as_str()?, "%Y-%m-%d").ok()
}

/// Sorted by start date with same-day duplicates collapsed, so the result
/// does not depend on input order.
fn chronological(entries: &[PeriodEntry]) -> Vec<&PeriodEntry> {
    let mut sorted: Vec<&PeriodEntry> = entries.iter().collect();
    sorted.sort_by_key(|e| (e.start_date, e.id));
    sorted.dedup_by_key(|e| e.start_date);
    sorted
}

fn cycle_lengths(sorted: &[&PeriodEntry]) -> Vec<f64> {
    sorted
        .windows(2)
        .map(|w| (w[1].start_date - w[0].start_date).num_days() as f64)
        .collect()
}

fn period_lengths(sorted: &[&PeriodEntry]) -> Vec<f64> {
    sorted
        .iter()
        .filter_map(|e| e.period_length())
        .map(|days| days as f64)
        .collect()
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

// Onboarding, then cycle range, then symptoms. At most one of each.
fn tips(sorted: &[&PeriodEntry], avg_cycle: Option<f64>) -> Vec<String> {
    let mut tips = Vec::new();

    if sorted.len() < 2 {
        tips.push(ONBOARDING_TIP.to_string());
    }
    if let Some(tip) = avg_cycle.and_then(range_tip) {
        tips.push(tip);
    }
    if let Some(tip) = symptom_tip(sorted) {
        tips.push(tip);
    }

    tips
}

// Compared on the rounded value so the tip agrees with `averageCycleLength`.
fn range_tip(avg_cycle: f64) -> Option<String> {
    let days = avg_cycle.round();
    if days < TYPICAL_CYCLE_MIN {
        Some(format!(
            "Your average cycle of {} days is shorter than the typical 21-35 day range. \
             Cycles vary from person to person; consider mentioning it to a healthcare provider if it concerns you.",
            days
        ))
    } else if days > TYPICAL_CYCLE_MAX {
        Some(format!(
            "Your average cycle of {} days is longer than the typical 21-35 day range. \
             Cycles vary from person to person; consider mentioning it to a healthcare provider if it concerns you.",
            days
        ))
    } else {
        None
    }
}

fn symptom_tip(sorted: &[&PeriodEntry]) -> Option<String> {
    let recent = &sorted[sorted.len().saturating_sub(SYMPTOM_WINDOW)..];
    if recent.is_empty() {
        return None;
    }

    let mut counts = BTreeMap::<Symptom, usize>::new();
    for entry in recent {
        for symptom in &entry.symptoms {
            *counts.entry(*symptom).or_default() += 1;
        }
    }

    // BTreeMap iterates in vocabulary order; a later symptom only wins with a higher count.
    let (symptom, count) = counts
        .into_iter()
        .fold(None, |best: Option<(Symptom, usize)>, (symptom, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((symptom, count)),
        })?;

    if count * 2 < recent.len() {
        return None;
    }

    Some(format!(
        "You logged {} in {} of your last {} periods. Tracking when it starts can help you plan ahead.",
        symptom.label(),
        count,
        recent.len()
    ))
}
