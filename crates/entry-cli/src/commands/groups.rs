//! `entries groups`

use colored::Colorize;

use crate::context::CliContext;
use crate::error::Result;

/// Run the groups command
pub fn run_groups(ctx: &CliContext) -> Result<()> {
    let groups = ctx.environment.groups()?;
    if groups.is_empty() {
        println!("No entry points declared.");
        return Ok(());
    }

    println!("{}", "Entry Point Groups".bold());
    println!();
    for group in &groups {
        let entries = ctx.registry.map(group)?;
        let blocked = entries.not_loadable().count();
        let status = if blocked == 0 {
            "all loadable".green()
        } else {
            format!("{blocked} not loadable").yellow()
        };
        println!("  {:<20} {:>3} entries  ({})", group.cyan(), entries.len(), status);
    }
    println!();
    println!(
        "{} {} groups. Use {} to inspect one.",
        "Total:".dimmed(),
        groups.len(),
        "entries show <group>".cyan()
    );
    Ok(())
}
