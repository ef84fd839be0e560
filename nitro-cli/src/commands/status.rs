//! `nitro status`: managed containers and what `apply` would do with them.

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use nitro_core::{config, ContainerRecord, ContainerRole};
use nitro_engine::docker::{self, declared_names, DockerEngine};
use nitro_engine::ContainerEngine;

/// Arguments for `nitro status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub async fn run(self) -> Result<()> {
        let home = config::home().context("could not determine home directory")?;
        let config = config::load_at(&home)
            .context("failed to load nitro.yaml, run `nitro init` first")?;

        let engine = DockerEngine::new(docker::connect().context("unable to connect to docker")?);
        let containers = engine
            .list_managed()
            .await
            .context("unable to list containers")?;

        let rows = classify(containers, &declared_names(&config));
        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&rows).context("failed to serialize status JSON")?
            );
            return Ok(());
        }

        print_table(rows);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum Disposition {
    /// Declared by the configuration.
    Keep,
    /// The proxy; never removed.
    Proxy,
    Remove,
    /// Orphaned database: dumped, then removed.
    BackupAndRemove,
}

#[derive(Debug, Serialize)]
struct ContainerStatus {
    name: String,
    role: String,
    state: String,
    action: Disposition,
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "container")]
    name: String,
    #[tabled(rename = "role")]
    role: String,
    #[tabled(rename = "state")]
    state: String,
    #[tabled(rename = "on apply")]
    action: String,
}

fn classify(containers: Vec<ContainerRecord>, declared: &BTreeSet<String>) -> Vec<ContainerStatus> {
    let mut rows: Vec<ContainerStatus> = containers
        .into_iter()
        .map(|c| {
            let action = match &c.role {
                ContainerRole::Proxy => Disposition::Proxy,
                _ if declared.contains(&c.name) => Disposition::Keep,
                ContainerRole::Database { .. } => Disposition::BackupAndRemove,
                _ => Disposition::Remove,
            };
            ContainerStatus {
                role: c.role.to_string(),
                name: c.name,
                state: c.state,
                action,
            }
        })
        .collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name));
    rows
}

fn print_table(rows: Vec<ContainerStatus>) {
    let orphans = rows
        .iter()
        .filter(|r| matches!(r.action, Disposition::Remove | Disposition::BackupAndRemove))
        .count();
    println!(
        "Nitro v{} | {} containers | {} orphaned",
        env!("CARGO_PKG_VERSION"),
        rows.len(),
        orphans
    );
    if rows.is_empty() {
        println!("No managed containers. Run 'nitro apply' to create them.");
        return;
    }

    let table_rows: Vec<StatusTableRow> = rows
        .into_iter()
        .map(|r| StatusTableRow {
            name: r.name,
            role: r.role,
            state: state_label(&r.state),
            action: action_label(r.action),
        })
        .collect();
    let mut table = Table::new(table_rows);
    table.with(Style::rounded());
    println!("{table}");

    if orphans > 0 {
        println!("Run 'nitro apply' to remove orphaned containers.");
    }
}

fn state_label(state: &str) -> String {
    match state {
        "running" => state.green().to_string(),
        "exited" | "dead" => state.red().to_string(),
        _ => state.yellow().to_string(),
    }
}

fn action_label(action: Disposition) -> String {
    match action {
        Disposition::Keep => "keep".to_string(),
        Disposition::Proxy => "keep (proxy)".bright_black().to_string(),
        Disposition::Remove => "remove".yellow().bold().to_string(),
        Disposition::BackupAndRemove => "backup + remove".magenta().bold().to_string(),
    }
}
