use colored::Colorize;
use tabled::Tabled;

use crate::engine::{AnalyzeOpts, Engine};
use crate::error::Result;
use crate::output;
use crate::types::Outcome;

#[derive(Tabled)]
struct WeekdayRow {
    #[tabled(rename = "Day")]
    day: String,
    #[tabled(rename = "Quality")]
    quality: String,
    #[tabled(rename = "Speed")]
    speed: String,
    #[tabled(rename = "Items")]
    volume: usize,
}

pub async fn run(engine: &Engine, subject: &str, opts: &AnalyzeOpts) -> Result<()> {
    let analysis = engine.timing(subject, opts).await?;

    output::print_item(&analysis, |a| {
        output::print_envelope_header("Timing analysis", a.confidence, a.data_points);

        match &a.outcome {
            Outcome::Ready(result) => {
                if let Some(peak) = &result.peak {
                    println!(
                        "\n  Peak window   {} ({:.2}x your average quality)",
                        format!("{:02}:00-{:02}:00", peak.start_hour, peak.end_hour + 1).green(),
                        peak.quality_multiplier
                    );
                }
                if let Some(danger) = &result.danger {
                    println!(
                        "  Danger zone   {} (quality {:.1}/10)",
                        format!("{:02}:00-{:02}:00", danger.start_hour, danger.end_hour + 1).red(),
                        danger.quality
                    );
                }
                if result.peak.is_none() && result.danger.is_none() {
                    println!("\n  No hour-of-day pattern clears the sample threshold yet.");
                }

                let rows: Vec<WeekdayRow> = result
                    .weekdays
                    .iter()
                    .filter(|d| d.volume > 0)
                    .map(|d| WeekdayRow {
                        day: d.weekday.clone(),
                        quality: format!("{:.1}", d.quality),
                        speed: if d.speed > 0.0 {
                            format!("{:.2} items/day", d.speed)
                        } else {
                            "-".to_string()
                        },
                        volume: d.volume,
                    })
                    .collect();
                if !rows.is_empty() {
                    println!();
                    let table = tabled::Table::new(rows)
                        .with(tabled::settings::Style::rounded())
                        .to_string();
                    println!("{table}");
                }
            }
            Outcome::InsufficientData { reason } => {
                println!("  {}", reason.yellow());
            }
        }

        output::print_recommendations(&a.recommendations);
    });

    Ok(())
}
