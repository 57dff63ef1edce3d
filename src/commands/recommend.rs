use colored::Colorize;

use crate::engine::{AnalyzeOpts, Engine};
use crate::error::Result;
use crate::output;
use crate::recommend::{self, classify};

pub async fn run(engine: &Engine, subject: &str, context: &str, opts: &AnalyzeOpts) -> Result<()> {
    let recommendations = recommend::recommend(engine, subject, context, opts).await?;

    if output::is_json_output() {
        println!(
            "{}",
            serde_json::to_string_pretty(&recommendations).unwrap_or_default()
        );
        return Ok(());
    }

    let intent = classify(context);
    println!(
        "{} Recommendations for {} ({})",
        "●".cyan(),
        subject.bold(),
        intent.label()
    );

    if recommendations.is_empty() {
        println!("  Nothing actionable yet; check back once more items resolve.");
        return Ok(());
    }

    let mut current_category = String::new();
    for rec in &recommendations {
        if rec.category != current_category {
            println!("\n  {}", rec.category.bold());
            current_category = rec.category.clone();
        }
        println!("    {} {}", "→".cyan(), rec.text);
    }

    Ok(())
}
