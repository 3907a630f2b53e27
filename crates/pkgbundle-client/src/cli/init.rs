/*
[INPUT]:  Interactive user input via CLI
[OUTPUT]: Generated YAML configuration file
[POS]:    CLI initialization layer
[UPDATE]: When ClientSettings schema changes
*/

use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};
use std::path::PathBuf;

use pkgbundle_adapter::SystemType;
use pkgbundle_adapter::http::client::DEFAULT_BASE_URL;
use pkgbundle_client::ClientSettings;
use pkgbundle_client::catalog::Catalog;
use pkgbundle_client::config::SubmitDefaults;

pub fn run_init(output: PathBuf) -> Result<()> {
    println!("{}", style("Welcome to pkgbundle init").bold().cyan());
    println!(
        "{}",
        style("This will guide you through creating a client configuration.").dim()
    );

    let theme = ColorfulTheme::default();

    let base_url: String = Input::with_theme(&theme)
        .with_prompt("Service URL")
        .default(DEFAULT_BASE_URL.to_string())
        .interact_text()?;

    let poll_interval_ms: u64 = Input::with_theme(&theme)
        .with_prompt("Poll interval (ms)")
        .default(2000)
        .interact_text()?;

    let download_dir: String = Input::with_theme(&theme)
        .with_prompt("Download directory (empty for the default)")
        .allow_empty(true)
        .interact_text()?;

    println!("\n{}", style("--- Default target ---").bold());
    let catalog = Catalog::builtin();
    let type_names: Vec<&str> = SystemType::ALL.iter().map(|t| t.as_str()).collect();
    let type_selection = Select::with_theme(&theme)
        .with_prompt("System type")
        .items(&type_names)
        .default(0)
        .interact()?;
    let system_type = SystemType::ALL[type_selection];

    let distributions = catalog.distributions(system_type);
    let distribution_labels: Vec<String> = distributions
        .iter()
        .map(|option| format!("{} ({})", option.name, option.id))
        .collect();
    let distribution_selection = Select::with_theme(&theme)
        .with_prompt("Distribution")
        .items(&distribution_labels)
        .default(0)
        .interact()?;
    let distribution = distributions
        .get(distribution_selection)
        .map(|option| option.id.clone())
        .context("no distribution selected")?;

    let arches = catalog.arches(system_type, &distribution);
    let arch_selection = Select::with_theme(&theme)
        .with_prompt("Architecture")
        .items(&arches)
        .default(0)
        .interact()?;

    let deep_download = Confirm::with_theme(&theme)
        .with_prompt("Bundle transitive dependencies by default?")
        .default(false)
        .interact()?;

    let settings = ClientSettings {
        base_url,
        poll_interval_ms,
        download_dir: (!download_dir.trim().is_empty()).then(|| PathBuf::from(download_dir.trim())),
        defaults: SubmitDefaults {
            system_type,
            distribution,
            arch: arches[arch_selection].clone(),
            deep_download,
        },
        ..ClientSettings::default()
    };
    settings.validate()?;

    let yaml = settings.to_yaml_string()?;

    std::fs::write(&output, yaml)
        .with_context(|| format!("failed to write config to {}", output.display()))?;

    println!("\n{}", style("SUCCESS!").bold().green());
    println!("Configuration written to: {}", style(output.display()).cyan());

    Ok(())
}
