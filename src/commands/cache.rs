use crate::engine::Engine;
use crate::error::Result;
use crate::output;

pub fn clear(engine: &Engine, subject: &str) -> Result<()> {
    engine.invalidate(subject)?;
    output::print_message(&format!("Cleared cached analyses for {subject}"));
    Ok(())
}
