//! Hour-of-day and day-of-week quality patterns: when does this person do
//! their best work, and when do things go wrong.

use chrono::{Datelike, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use super::{mean, mean_cycle_time};
use crate::metrics::ItemRecord;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct TimingResult {
    pub hourly: Vec<HourBucket>,
    pub peak: Option<PeakWindow>,
    pub danger: Option<DangerZone>,
    pub weekdays: Vec<WeekdayPattern>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct HourBucket {
    pub hour: u32,
    pub volume: usize,
    pub quality: f64,
}

/// Smallest contiguous hour range covering the top-quality eligible hours.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PeakWindow {
    pub start_hour: u32,
    pub end_hour: u32,
    pub quality_multiplier: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct DangerZone {
    pub start_hour: u32,
    pub end_hour: u32,
    pub quality: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct WeekdayPattern {
    pub weekday: String,
    pub quality: f64,
    /// 1 / mean cycle time, or 0 when no cycle times exist for the day.
    pub speed: f64,
    pub volume: usize,
}

const TOP_PEAK_HOURS: usize = 3;
const BOTTOM_DANGER_HOURS: usize = 2;
const DANGER_QUALITY_RATIO: f64 = 0.8;

pub fn analyze(records: &[ItemRecord], min_hour_samples: usize) -> TimingResult {
    let mut scores: Vec<Vec<f64>> = vec![Vec::new(); 24];
    for record in records {
        let quality = record.metrics.quality_score();
        scores[record.item.updated.hour() as usize].push(quality);
        if let Some(resolved) = record.item.resolved {
            scores[resolved.hour() as usize].push(quality);
        }
    }

    let hourly: Vec<HourBucket> = scores
        .iter()
        .enumerate()
        .map(|(hour, s)| HourBucket {
            hour: hour as u32,
            volume: s.len(),
            quality: mean(s),
        })
        .collect();

    let overall: Vec<f64> = hourly
        .iter()
        .filter(|b| b.volume > 0)
        .map(|b| b.quality)
        .collect();
    let overall_mean = mean(&overall);

    // One lucky ticket must not declare a peak hour.
    let eligible: Vec<&HourBucket> = hourly
        .iter()
        .filter(|b| b.volume >= min_hour_samples)
        .collect();

    let peak = peak_window(&eligible, overall_mean);
    let danger = danger_zone(&eligible, overall_mean);
    let weekdays = weekday_patterns(records);

    TimingResult {
        hourly,
        peak,
        danger,
        weekdays,
    }
}

fn peak_window(eligible: &[&HourBucket], overall_mean: f64) -> Option<PeakWindow> {
    if eligible.len() < TOP_PEAK_HOURS || overall_mean <= 0.0 {
        return None;
    }

    let mut by_quality = eligible.to_vec();
    by_quality.sort_by(|a, b| b.quality.total_cmp(&a.quality));
    let top = &by_quality[..TOP_PEAK_HOURS];

    // Window by hour index, not score rank, so it stays contiguous.
    let start_hour = top.iter().map(|b| b.hour).min().unwrap_or(0);
    let end_hour = top.iter().map(|b| b.hour).max().unwrap_or(0);
    let peak_mean = mean(&top.iter().map(|b| b.quality).collect::<Vec<_>>());

    Some(PeakWindow {
        start_hour,
        end_hour,
        quality_multiplier: peak_mean / overall_mean,
    })
}

fn danger_zone(eligible: &[&HourBucket], overall_mean: f64) -> Option<DangerZone> {
    if eligible.len() < BOTTOM_DANGER_HOURS {
        return None;
    }

    let mut by_quality = eligible.to_vec();
    by_quality.sort_by(|a, b| a.quality.total_cmp(&b.quality));
    let bottom = &by_quality[..BOTTOM_DANGER_HOURS];
    let bottom_mean = mean(&bottom.iter().map(|b| b.quality).collect::<Vec<_>>());

    // A false danger signal is worse than none.
    if bottom_mean >= DANGER_QUALITY_RATIO * overall_mean {
        return None;
    }

    Some(DangerZone {
        start_hour: bottom.iter().map(|b| b.hour).min().unwrap_or(0),
        end_hour: bottom.iter().map(|b| b.hour).max().unwrap_or(0),
        quality: bottom_mean,
    })
}

fn weekday_patterns(records: &[ItemRecord]) -> Vec<WeekdayPattern> {
    const DAYS: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    DAYS.iter()
        .map(|day| {
            let on_day: Vec<&ItemRecord> = records
                .iter()
                .filter(|r| {
                    r.item
                        .resolved
                        .map(|at| at.weekday() == *day)
                        .unwrap_or(false)
                })
                .collect();
            let qualities: Vec<f64> = on_day.iter().map(|r| r.metrics.quality_score()).collect();
            let speed = mean_cycle_time(&on_day).map(|c| 1.0 / c).unwrap_or(0.0);
            WeekdayPattern {
                weekday: format!("{day}"),
                quality: mean(&qualities),
                speed,
                volume: on_day.len(),
            }
        })
        .collect()
}

/// True when `hour` falls inside the danger zone.
pub fn in_danger_zone(danger: &DangerZone, hour: u32) -> bool {
    hour >= danger.start_hour && hour <= danger.end_hour
}

pub fn recommendations(result: &TimingResult) -> Vec<String> {
    let mut recs = Vec::new();
    if let Some(peak) = &result.peak {
        recs.push(format!(
            "Schedule demanding work between {:02}:00 and {:02}:00; quality there runs {:.0}% above your average.",
            peak.start_hour,
            peak.end_hour + 1,
            (peak.quality_multiplier - 1.0) * 100.0
        ));
    }
    if let Some(danger) = &result.danger {
        recs.push(format!(
            "Avoid risky changes between {:02}:00 and {:02}:00; historical quality drops to {:.1}/10 there.",
            danger.start_hour,
            danger.end_hour + 1,
            danger.quality
        ));
    }
    if let Some(best_day) = result
        .weekdays
        .iter()
        .filter(|d| d.volume > 0)
        .max_by(|a, b| a.quality.total_cmp(&b.quality))
    {
        recs.push(format!(
            "{} is your strongest day for quality; line up reviews and releases there.",
            best_day.weekday
        ));
    }
    recs
}
