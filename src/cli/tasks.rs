//! `tasks` command.

use console::style;

use crate::config::Settings;
use crate::models::TaskType;
use crate::scrapers::task_spec;

/// List task types with their effective default URL and storage layout.
pub fn cmd_tasks(settings: &Settings) -> anyhow::Result<()> {
    println!("{}", style("Task types").bold());
    for task_type in TaskType::ALL {
        let spec = task_spec(task_type);
        let url = settings
            .urls
            .default_for(task_type)
            .unwrap_or("(no default URL)");
        println!(
            "  {:<8} {}  table={} fields={}",
            style(task_type.as_str()).cyan(),
            url,
            spec.table(),
            spec.schema().join(",")
        );
    }
    println!();
    println!(
        "Exports go to {} and {}",
        style(settings.output.dir.display()).dim(),
        style(settings.output.database.display()).dim()
    );
    Ok(())
}
