use colored::Colorize;
use tabled::Tabled;

use crate::engine::{AnalyzeOpts, Engine};
use crate::error::Result;
use crate::output;
use crate::types::Outcome;

#[derive(Tabled)]
struct PartnerRow {
    #[tabled(rename = "Collaborator")]
    collaborator: String,
    #[tabled(rename = "Shared")]
    shared: usize,
    #[tabled(rename = "Avg cycle")]
    cycle: String,
    #[tabled(rename = "Speed")]
    speed: String,
    #[tabled(rename = "Score")]
    score: u32,
    #[tabled(rename = "Rating")]
    rating: String,
}

pub async fn run(engine: &Engine, subject: &str, opts: &AnalyzeOpts) -> Result<()> {
    let analysis = engine.collaboration(subject, opts).await?;

    output::print_item(&analysis, |a| {
        output::print_envelope_header("Collaboration chemistry", a.confidence, a.data_points);

        match &a.outcome {
            Outcome::Ready(result) => {
                println!(
                    "\n  Solo baseline  {:.1}d avg cycle over {} items",
                    result.solo_avg_cycle, result.solo_items
                );

                if result.partners.is_empty() {
                    println!("  No shared items detected in the window.");
                } else {
                    let rows: Vec<PartnerRow> = result
                        .partners
                        .iter()
                        .map(|p| PartnerRow {
                            collaborator: p.collaborator.clone(),
                            shared: p.shared_items,
                            cycle: format!("{:.1}d", p.avg_cycle_days),
                            speed: format!("{:.2}x", p.speed_multiplier),
                            score: p.score,
                            rating: output::rating_colored(p.rating),
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
