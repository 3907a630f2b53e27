/*
[INPUT]:  BundleClient
[OUTPUT]: Task list, deletion result, service catalog and health printed to stdout
[POS]:    CLI one-shot service queries
[UPDATE]: When adding read-only service commands
*/

use anyhow::{Context, Result};
use console::style;

use pkgbundle_adapter::{BundleClient, SystemType};
use pkgbundle_client::catalog::Catalog;
use pkgbundle_client::render::{format_task_list, render_task_list, sanitize_display};

pub async fn run_tasks(client: &BundleClient) -> Result<()> {
    let tasks = client.list_tasks().await.context("fetch task list")?;
    for line in format_task_list(&render_task_list(&tasks)) {
        println!("{line}");
    }
    Ok(())
}

pub async fn run_delete(client: &BundleClient, task_id: &str) -> Result<()> {
    let response = client
        .delete_task(task_id)
        .await
        .with_context(|| format!("delete task {task_id}"))?;
    let message = if response.message.is_empty() {
        format!("task {} deleted", sanitize_display(task_id))
    } else {
        sanitize_display(&response.message)
    };
    println!("{}", style(message).green());
    Ok(())
}

pub async fn run_systems(client: &BundleClient) -> Result<()> {
    let systems = client.list_systems().await.context("fetch supported systems")?;
    let catalog = Catalog::from_systems(&systems);
    for system_type in SystemType::ALL {
        println!("{}", style(system_type).bold());
        for option in catalog.distributions(system_type) {
            let arches = catalog.arches(system_type, &option.id).join(", ");
            let arches = sanitize_display(&arches);
            println!(
                "  {:<12} {:<20} {}",
                sanitize_display(&option.id),
                sanitize_display(&option.name),
                style(arches).dim()
            );
        }
    }
    Ok(())
}

pub async fn run_health(client: &BundleClient) -> Result<()> {
    let health = client.health().await.context("query service health")?;
    println!(
        "{} {}  active downloads: {}  total tasks: {}",
        style("service").bold(),
        style(sanitize_display(&health.status)).green(),
        health.active_downloads,
        health.total_tasks
    );
    Ok(())
}
