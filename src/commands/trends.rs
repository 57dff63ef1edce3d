use colored::Colorize;
use tabled::Tabled;

use crate::analyzers::trend::TrendDirection;
use crate::engine::{AnalyzeOpts, Engine};
use crate::error::Result;
use crate::output;
use crate::types::Outcome;

#[derive(Tabled)]
struct MonthRow {
    #[tabled(rename = "Month")]
    month: String,
    #[tabled(rename = "Completed")]
    completed: String,
    #[tabled(rename = "Quality")]
    quality: String,
}

fn direction_colored(direction: TrendDirection) -> String {
    match direction {
        TrendDirection::Up => "up".green().to_string(),
        TrendDirection::Down => "down".red().to_string(),
        TrendDirection::Stable => "stable".to_string(),
    }
}

pub async fn run(engine: &Engine, subject: &str, opts: &AnalyzeOpts) -> Result<()> {
    let analysis = engine.trend(subject, opts).await?;

    output::print_item(&analysis, |a| {
        output::print_envelope_header("Trend analysis", a.confidence, a.data_points);

        match &a.outcome {
            Outcome::Ready(result) => {
                println!(
                    "\n  Velocity {}   Quality {}",
                    direction_colored(result.velocity_trend),
                    direction_colored(result.quality_trend)
                );

                let rows: Vec<MonthRow> = result
                    .velocity
                    .iter()
                    .map(|point| {
                        let quality = result
                            .quality
                            .iter()
                            .find(|q| q.month == point.month)
                            .map(|q| format!("{:.1}", q.value))
                            .unwrap_or_else(|| "-".to_string());
                        MonthRow {
                            month: point.month.clone(),
                            completed: format!("{:.0}", point.value),
                            quality,
                        }
                    })
                    .collect();
                if !rows.is_empty() {
                    println!();
                    let table = tabled::Table::new(rows)
                        .with(tabled::settings::Style::rounded())
                        .to_string();
                    println!("{table}");
                }

                for shift in &result.skills {
                    if shift.direction != TrendDirection::Stable {
                        println!(
                            "  {} work: {} → {} items ({})",
                            shift.item_type,
                            shift.first_half,
                            shift.second_half,
                            direction_colored(shift.direction)
                        );
                    }
                }

                println!(
                    "\n  Period comparison: {} → {} completed ({:+.0}%), cycle {:+.0}%, quality {:+.0}%",
                    result.periods.first.completed,
                    result.periods.second.completed,
                    result.periods.completed_delta_pct,
                    result.periods.cycle_delta_pct,
                    result.periods.quality_delta_pct
                );
            }
            Outcome::InsufficientData { reason } => {
                println!("  {}", reason.yellow());
            }
        }

        output::print_recommendations(&a.recommendations);
    });

    Ok(())
}
