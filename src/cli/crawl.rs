//! `crawl` and `crawl-all` commands.

use console::style;

use crate::config::Settings;
use crate::models::{Task, TaskType};
use crate::pipeline::{CrawlError, Crawler, Criterion, RecordFilter, RunOutcome};
use crate::scrapers::task_spec;

/// Crawl a single task type.
pub async fn cmd_crawl(
    settings: &Settings,
    task_type: TaskType,
    url: Option<String>,
    depth: u32,
    max_retries: Option<u32>,
    filters: Vec<Criterion>,
) -> anyhow::Result<()> {
    let schema = task_spec(task_type).schema();
    if let Some(unknown) = filters.iter().find(|c| !schema.contains(&c.field.as_str())) {
        anyhow::bail!(
            "{} records have no field '{}' (fields: {})",
            task_type,
            unknown.field,
            schema.join(", ")
        );
    }

    let crawler = build_crawler(settings, max_retries)?;
    let task = Task::new(task_type)
        .with_url(url)
        .with_depth(depth)
        .with_filter(RecordFilter::new(filters));

    let result = tokio::select! {
        result = crawler.run(&task) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted; aborting {} crawl", task_type);
            anyhow::bail!("interrupted");
        }
    };

    if !print_result(task_type, &result) {
        anyhow::bail!("{} crawl failed", task_type);
    }
    Ok(())
}

/// Crawl every task type concurrently.
pub async fn cmd_crawl_all(settings: &Settings, max_retries: Option<u32>) -> anyhow::Result<()> {
    let crawler = build_crawler(settings, max_retries)?;
    let tasks: Vec<Task> = TaskType::ALL.into_iter().map(Task::new).collect();

    println!(
        "{} Crawling {} task types concurrently",
        style("→").cyan(),
        tasks.len()
    );

    let results = tokio::select! {
        results = crawler.run_all(&tasks) => results,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted; aborting all crawls");
            anyhow::bail!("interrupted");
        }
    };

    let mut failed = 0;
    for (task_type, result) in &results {
        if !print_result(*task_type, result) {
            failed += 1;
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} crawls failed", failed, results.len());
    }
    Ok(())
}

fn build_crawler(settings: &Settings, max_retries: Option<u32>) -> anyhow::Result<Crawler> {
    let crawler = Crawler::from_settings(settings)?;
    Ok(match max_retries {
        Some(n) => crawler.with_max_retries(n),
        None => crawler,
    })
}

/// Print a run summary. Returns false when the run failed.
fn print_result(task_type: TaskType, result: &Result<RunOutcome, CrawlError>) -> bool {
    match result {
        Ok(RunOutcome::Completed {
            url,
            records,
            report,
        }) => {
            println!(
                "{} {}: {} unique record(s) from {}",
                style("✓").green(),
                task_type,
                records.len(),
                url
            );
            for outcome in report.outcomes() {
                match &outcome.result {
                    Ok(destination) => println!(
                        "    {} {}: {}",
                        style("✓").green(),
                        outcome.sink,
                        destination
                    ),
                    Err(e) => println!("    {} {}: {}", style("✗").red(), outcome.sink, e),
                }
            }
            true
        }
        Ok(RunOutcome::NoData { url }) => {
            println!(
                "{} {}: no data found at {}",
                style("!").yellow(),
                task_type,
                url
            );
            true
        }
        Err(e) => {
            println!("{} {}: {}", style("✗").red(), task_type, e);
            false
        }
    }
}
