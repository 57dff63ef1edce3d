use colored::Colorize;
use tabled::Tabled;

use crate::engine::{AnalyzeOpts, Engine};
use crate::error::Result;
use crate::output;
use crate::types::Outcome;

#[derive(Tabled)]
struct TypeRow {
    #[tabled(rename = "Type")]
    item_type: String,
    #[tabled(rename = "Items")]
    items: usize,
    #[tabled(rename = "Your avg")]
    user: String,
    #[tabled(rename = "Team avg")]
    team: String,
    #[tabled(rename = "Delta")]
    delta: String,
}

#[derive(Tabled)]
struct ComponentRow {
    #[tabled(rename = "Component")]
    component: String,
    #[tabled(rename = "Items")]
    items: usize,
    #[tabled(rename = "Quality")]
    quality: String,
    #[tabled(rename = "Tier")]
    tier: String,
}

pub async fn run(engine: &Engine, subject: &str, opts: &AnalyzeOpts) -> Result<()> {
    let analysis = engine.strength(subject, opts).await?;

    output::print_item(&analysis, |a| {
        output::print_envelope_header("Strength analysis", a.confidence, a.data_points);

        match &a.outcome {
            Outcome::Ready(result) => {
                if !result.by_type.is_empty() {
                    let rows: Vec<TypeRow> = result
                        .by_type
                        .iter()
                        .map(|d| TypeRow {
                            item_type: d.item_type.clone(),
                            items: d.items,
                            user: format!("{:.1}d", d.user_avg_cycle),
                            team: format!("{:.1}d", d.team_avg_cycle),
                            delta: if d.delta_pct < 0.0 {
                                format!("{:.0}% faster", -d.delta_pct).green().to_string()
                            } else if d.delta_pct > 0.0 {
                                format!("{:.0}% slower", d.delta_pct).red().to_string()
                            } else {
                                "even".to_string()
                            },
                        })
                        .collect();
                    println!();
                    let table = tabled::Table::new(rows)
                        .with(tabled::settings::Style::rounded())
                        .to_string();
                    println!("{table}");
                }

                if !result.by_component.is_empty() {
                    let rows: Vec<ComponentRow> = result
                        .by_component
                        .iter()
                        .map(|c| ComponentRow {
                            component: c.component.clone(),
                            items: c.items,
                            quality: format!("{:.1}/10", c.avg_quality),
                            tier: c.tier.label().to_string(),
                        })
                        .collect();
                    println!();
                    let table = tabled::Table::new(rows)
                        .with(tabled::settings::Style::rounded())
                        .to_string();
                    println!("{table}");
                }

                if result.by_type.is_empty() && result.by_component.is_empty() {
                    println!("\n  No type or component has enough items to compare yet.");
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
