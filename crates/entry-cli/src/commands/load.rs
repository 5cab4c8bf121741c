//! `entries load`

use colored::Colorize;

use crate::context::CliContext;
use crate::error::Result;

/// Run the load command
///
/// Unknown and non-loadable entry points surface as registry errors.
pub fn run_load(ctx: &CliContext, group: &str, name: &str) -> Result<()> {
    let loaded = ctx.registry.load(group, name)?;
    println!(
        "{} {}:{} -> {}",
        "=>".blue().bold(),
        loaded.group,
        loaded.name.cyan(),
        loaded.target
    );
    println!("   {} {}", "Package:".dimmed(), loaded.package);
    if !loaded.target.extras.is_empty() {
        println!("   {} {}", "Extras:".dimmed(), loaded.target.extras.join(", "));
    }
    Ok(())
}
