//! Subcommand implementations

use std::io::Write;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{Duration, Utc};
use crewconnect_core::{
    CrewConnectIntegration, EntryContext, EntryStorage, FlowResult, ServiceRegistry,
};
use crewconnect_domain::constants::{
    ATTR_ACFT_TYPE, ATTR_END_DATE, ATTR_ROLE, ATTR_START_DATE, DOMAIN,
    SERVICE_FIND_UNSTAFFED_FLIGHTS, STEP_AUTHORIZE, STEP_USER,
};
use crewconnect_domain::Config;
use crewconnect_infra::{
    HttpClientConnector, JsonFileEntryStorage, UpdateScheduler, UpdateSchedulerConfig,
};
use serde_json::{Map, Value};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::info;

type Input = Lines<BufReader<Stdin>>;

/// Raw `find-unstaffed-flights` arguments, validated by the service schema
pub struct SearchParams {
    pub start_date: String,
    pub end_date: Option<String>,
    pub aircraft_type: Option<String>,
    pub role: Option<String>,
}

impl SearchParams {
    fn into_service_data(self) -> Map<String, Value> {
        let mut data = Map::new();
        data.insert(ATTR_START_DATE.to_string(), Value::String(self.start_date));
        let optional = [
            (ATTR_END_DATE, self.end_date),
            (ATTR_ACFT_TYPE, self.aircraft_type),
            (ATTR_ROLE, self.role),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                data.insert(key.to_string(), Value::String(value));
            }
        }
        data
    }
}

pub fn build_integration(config: &Config) -> Result<CrewConnectIntegration> {
    let storage = JsonFileEntryStorage::open(&config.storage.entries_path)
        .with_context(|| format!("opening {}", config.storage.entries_path))?;
    let connector =
        HttpClientConnector::new(config.client.clone()).context("building HTTP client")?;

    Ok(CrewConnectIntegration::new(
        Arc::new(storage),
        Arc::new(connector),
        Arc::new(ServiceRegistry::new()),
        &config.polling,
    ))
}

async fn prompt(input: &mut Input, label: &str) -> Result<String> {
    print!("{label}");
    std::io::stdout().flush()?;
    match input.next_line().await? {
        Some(line) => Ok(line.trim().to_string()),
        None => bail!("input closed before setup finished"),
    }
}

fn describe_form_error(code: &str) -> &str {
    match code {
        "cannot_connect" => "cannot connect to that host",
        "invalid_auth_redirect" => "the redirect URL was invalid or expired, try again",
        other => other,
    }
}

pub async fn setup(integration: &CrewConnectIntegration, mut host: Option<String>) -> Result<()> {
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut flow = integration.start_flow();
    let mut result = flow.start();

    loop {
        let form = match result {
            FlowResult::ShowForm(form) => form,
            created @ FlowResult::CreateEntry { .. } => {
                let entry = integration.create_entry(created)?;
                println!("Added account {} (entry {})", entry.title, entry.entry_id);
                return Ok(());
            }
        };

        if let Some(code) = form.base_error() {
            eprintln!("Error: {}", describe_form_error(code));
        }

        result = match form.step_id {
            STEP_USER => {
                let value = match host.take() {
                    Some(value) => value,
                    None => prompt(&mut input, "CrewConnect host: ").await?,
                };
                flow.submit_host(&value).await?
            }
            STEP_AUTHORIZE => {
                let url = form.auth_url().context("authorize step without a URL")?;
                println!("\nOpen this URL and sign in:\n\n  {url}\n");
                let redirect = prompt(&mut input, "Paste the URL you were redirected to: ").await?;
                flow.submit_redirect(&redirect).await?
            }
            other => bail!("unexpected setup step '{other}'"),
        };
    }
}

pub fn list_entries(integration: &CrewConnectIntegration) -> Result<()> {
    let entries = integration.storage().entries()?;
    if entries.is_empty() {
        println!("No accounts configured; run `crewconnect setup`.");
        return Ok(());
    }
    for entry in entries {
        println!("{}  {}  {}", entry.entry_id, entry.title, entry.data.host().unwrap_or("-"));
    }
    Ok(())
}

async fn setup_selected(
    integration: &CrewConnectIntegration,
    entry_id: Option<&str>,
) -> Result<Vec<Arc<EntryContext>>> {
    let contexts = match entry_id {
        Some(entry_id) => {
            let entry = integration
                .storage()
                .entry(entry_id)?
                .with_context(|| format!("no config entry '{entry_id}'"))?;
            vec![integration.setup_entry(entry).await?]
        }
        None => integration.setup_all().await?,
    };

    if contexts.is_empty() {
        bail!("no account could be set up; run `crewconnect setup` first");
    }
    Ok(contexts)
}

pub async fn refresh(integration: &CrewConnectIntegration, entry_id: Option<&str>) -> Result<()> {
    for context in setup_selected(integration, entry_id).await? {
        println!(
            "{}  {}  user {}",
            context.entry_id(),
            context.client().host(),
            context.client().user_id().as_deref().unwrap_or("unknown")
        );
    }
    Ok(())
}

pub async fn find_unstaffed_flights(
    integration: &CrewConnectIntegration,
    params: SearchParams,
    entry_id: Option<&str>,
) -> Result<()> {
    setup_selected(integration, entry_id).await?;

    let response = integration
        .services()
        .call(DOMAIN, SERVICE_FIND_UNSTAFFED_FLIGHTS, &params.into_service_data())
        .await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

pub async fn calendar(
    integration: &CrewConnectIntegration,
    days: i64,
    entry_id: Option<&str>,
) -> Result<()> {
    if days <= 0 {
        bail!("--days must be positive");
    }

    let now = Utc::now();
    for context in setup_selected(integration, entry_id).await? {
        let events = context.calendar().events(now, now + Duration::days(days)).await?;
        println!("{} ({} flights)", context.entry().title, events.len());
        for event in events {
            println!(
                "  {} - {}  {}  {}",
                event.start.format("%Y-%m-%d %H:%M"),
                event.end.format("%H:%M"),
                event.summary,
                event.description.as_deref().unwrap_or("")
            );
        }
    }
    Ok(())
}

pub async fn watch(integration: &CrewConnectIntegration, config: &Config) -> Result<()> {
    let contexts = setup_selected(integration, None).await?;
    let clients = contexts.iter().map(|context| Arc::clone(context.client())).collect();

    let mut scheduler = UpdateScheduler::new(clients, UpdateSchedulerConfig::from(&config.polling));
    scheduler.start().await?;
    info!(accounts = contexts.len(), "Watching; press Ctrl-C to stop");

    tokio::signal::ctrl_c().await.context("waiting for Ctrl-C")?;
    scheduler.stop().await?;
    Ok(())
}

pub fn remove(integration: &CrewConnectIntegration, entry_id: &str) -> Result<()> {
    if integration.remove_entry(entry_id)? {
        println!("Removed entry {entry_id}");
        Ok(())
    } else {
        bail!("no config entry '{entry_id}'")
    }
}
