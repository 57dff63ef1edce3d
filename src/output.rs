use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;
use serde::Serialize;

use crate::analyzers::burnout::RiskLevel;
use crate::analyzers::collaboration::Rating;
use crate::analyzers::load::LoadStatus;
use crate::types::Confidence;

/// Global output format setting
static OUTPUT_JSON: AtomicBool = AtomicBool::new(false);

pub fn set_json_output(json: bool) {
    OUTPUT_JSON.store(json, Ordering::Relaxed);
}

pub fn is_json_output() -> bool {
    OUTPUT_JSON.load(Ordering::Relaxed)
}

/// Print a single item or JSON depending on output mode
pub fn print_item<T: Serialize>(item: &T, display: impl FnOnce(&T)) {
    if is_json_output() {
        println!("{}", serde_json::to_string_pretty(item).unwrap_or_default());
    } else {
        display(item);
    }
}

/// Print a message (skipped in JSON mode, or prints simple object)
pub fn print_message(message: &str) {
    if is_json_output() {
        println!(r#"{{"message": "{}"}}"#, message.replace('"', "\\\""));
    } else {
        println!("{message}");
    }
}

pub fn confidence_colored(confidence: Confidence) -> String {
    match confidence {
        Confidence::High => confidence.label().green().to_string(),
        Confidence::Medium => confidence.label().yellow().to_string(),
        Confidence::Low => confidence.label().bright_black().to_string(),
    }
}

pub fn risk_colored(level: RiskLevel) -> String {
    match level {
        RiskLevel::Healthy => level.label().green().to_string(),
        RiskLevel::Warning => level.label().yellow().to_string(),
        RiskLevel::High => level.label().red().to_string(),
        RiskLevel::Critical => level.label().red().bold().to_string(),
    }
}

pub fn load_status_colored(status: LoadStatus) -> String {
    match status {
        LoadStatus::Under => status.label().blue().to_string(),
        LoadStatus::Optimal => status.label().green().to_string(),
        LoadStatus::Over => status.label().yellow().to_string(),
        LoadStatus::Critical => status.label().red().bold().to_string(),
    }
}

pub fn rating_colored(rating: Rating) -> String {
    match rating {
        Rating::Excellent => rating.label().green().bold().to_string(),
        Rating::Good => rating.label().green().to_string(),
        Rating::Neutral => rating.label().yellow().to_string(),
        Rating::NeedsWork => rating.label().red().to_string(),
    }
}

/// Header line shared by the analyzer commands.
pub fn print_envelope_header(title: &str, confidence: Confidence, data_points: usize) {
    println!(
        "{} {} ({} items, {} confidence)",
        "●".cyan(),
        title.bold(),
        data_points,
        confidence_colored(confidence)
    );
}

pub fn print_recommendations(recommendations: &[String]) {
    if recommendations.is_empty() {
        return;
    }
    println!("\n{}", "Recommendations".bold());
    for rec in recommendations {
        println!("  {} {rec}", "→".cyan());
    }
}
