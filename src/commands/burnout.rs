use colored::Colorize;

use crate::engine::{AnalyzeOpts, Engine};
use crate::error::Result;
use crate::output;
use crate::types::Outcome;

pub async fn run(engine: &Engine, subject: &str, opts: &AnalyzeOpts) -> Result<()> {
    let analysis = engine.burnout(subject, opts).await?;

    output::print_item(&analysis, |a| {
        output::print_envelope_header("Burnout risk", a.confidence, a.data_points);

        match &a.outcome {
            Outcome::Ready(result) => {
                println!(
                    "\n  Score  {} / 100 ({})",
                    result.score,
                    output::risk_colored(result.level)
                );
                if result.factors.is_empty() {
                    println!("  No risk factors firing.");
                } else {
                    println!("\n  Contributing factors:");
                    for factor in &result.factors {
                        println!(
                            "    {:>3} pts  {}: {}",
                            factor.points,
                            factor.name.bold(),
                            factor.detail
                        );
                    }
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
