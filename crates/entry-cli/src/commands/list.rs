//! `entries list` and `entries show`

use colored::Colorize;
use serde_json::json;

use crate::context::CliContext;
use crate::error::Result;

/// Run the list command
pub fn run_list(ctx: &CliContext, group: &str) -> Result<()> {
    let entries = ctx.registry.map(group)?;
    for record in entries.iter() {
        let mark = if record.is_loadable() {
            "ok".green()
        } else {
            "not loadable".red()
        };
        println!("{:<30} {}", record.name(), mark);
    }
    Ok(())
}

/// Run the show command
pub fn run_show(ctx: &CliContext, group: &str, json: bool) -> Result<()> {
    let entries = ctx.registry.map(group)?;

    if json {
        let records: Vec<_> = entries
            .iter()
            .map(|record| {
                let handle = record.handle();
                json!({
                    "name": record.name(),
                    "package": handle.package,
                    "target": handle.target,
                    "loadable": record.is_loadable(),
                    "conflicts": record
                        .conflicts()
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>(),
                })
            })
            .collect();
        let output = json!({ "group": group, "entry_points": records });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{} {}", "Group".bold(), group.cyan().bold());
    if entries.is_empty() {
        println!("  {}", "(no entry points)".dimmed());
        return Ok(());
    }
    for record in entries.iter() {
        let handle = record.handle();
        println!();
        println!("  {} {}", record.name().green(), format!("({})", handle.package).dimmed());
        println!("    {} {}", "Target:".dimmed(), handle.target);
        if record.is_loadable() {
            println!("    {} {}", "Status:".dimmed(), "loadable".green());
        } else {
            println!("    {} {}", "Status:".dimmed(), "not loadable".red());
            for conflict in record.conflicts() {
                println!("      - {conflict}");
            }
        }
    }
    Ok(())
}
