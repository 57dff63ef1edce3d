use colored::Colorize;
use tabled::Tabled;

use crate::cli::PredictArgs;
use crate::engine::{AnalyzeOpts, Engine};
use crate::error::Result;
use crate::output;
use crate::types::Outcome;

#[derive(Tabled)]
struct ScenarioRow {
    #[tabled(rename = "Scope change")]
    delta: String,
    #[tabled(rename = "P(all done)")]
    probability: String,
    #[tabled(rename = "Expected done")]
    expected: String,
}

pub async fn run(
    engine: &Engine,
    subject: &str,
    args: &PredictArgs,
    opts: &AnalyzeOpts,
) -> Result<()> {
    let analysis = engine.predict(subject, args.days, opts).await?;

    output::print_item(&analysis, |a| {
        output::print_envelope_header("Sprint forecast", a.confidence, a.data_points);

        match &a.outcome {
            Outcome::Ready(result) => {
                let probability = format!("{:.0}%", result.completion_probability * 100.0);
                let colored_probability = if result.completion_probability >= 0.8 {
                    probability.green().to_string()
                } else if result.completion_probability >= 0.5 {
                    probability.yellow().to_string()
                } else {
                    probability.red().to_string()
                };
                println!(
                    "\n  {} chance of finishing {} items in {:.0} days",
                    colored_probability, result.active_items, result.budget_days
                );
                println!(
                    "  Expected {:.1} done, 80% interval {}-{} ({} trials)",
                    result.expected_completed, result.ci_low, result.ci_high, result.trials
                );

                for item in &result.at_risk {
                    println!(
                        "  At risk: {} (queue position {}, est. {:.1}d, {:?})",
                        item.key.yellow(),
                        item.queue_position,
                        item.estimated_days,
                        item.severity
                    );
                }

                if !result.scenarios.is_empty() {
                    let rows: Vec<ScenarioRow> = result
                        .scenarios
                        .iter()
                        .map(|s| ScenarioRow {
                            delta: format!("{:+} items", s.item_delta),
                            probability: format!("{:.0}%", s.completion_probability * 100.0),
                            expected: format!("{:.1}", s.expected_completed),
                        })
                        .collect();
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
