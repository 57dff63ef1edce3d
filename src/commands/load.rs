use colored::Colorize;
use tabled::Tabled;

use crate::engine::{AnalyzeOpts, Engine};
use crate::error::Result;
use crate::output;
use crate::types::Outcome;

#[derive(Tabled)]
struct CurveRow {
    #[tabled(rename = "Concurrent")]
    concurrent: usize,
    #[tabled(rename = "Items")]
    items: usize,
    #[tabled(rename = "Avg cycle")]
    cycle: String,
    #[tabled(rename = "Defect rate")]
    defects: String,
    #[tabled(rename = "Completion")]
    completion: String,
}

pub async fn run(engine: &Engine, subject: &str, opts: &AnalyzeOpts) -> Result<()> {
    let analysis = engine.load(subject, opts).await?;

    output::print_item(&analysis, |a| {
        output::print_envelope_header("Workload analysis", a.confidence, a.data_points);

        match &a.outcome {
            Outcome::Ready(result) => {
                println!(
                    "\n  Current load  {} items ({})",
                    result.current_load,
                    output::load_status_colored(result.status)
                );
                println!(
                    "  Optimal band  {}-{} concurrent items",
                    result.optimal_min, result.optimal_max
                );

                let rows: Vec<CurveRow> = result
                    .curve
                    .levels
                    .iter()
                    .map(|level| CurveRow {
                        concurrent: level.concurrent,
                        items: level.items,
                        cycle: if level.avg_cycle_days > 0.0 {
                            format!("{:.1}d", level.avg_cycle_days)
                        } else {
                            "-".to_string()
                        },
                        defects: format!("{:.0}%", level.defect_rate * 100.0),
                        completion: format!("{:.0}%", level.completion_rate * 100.0),
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
