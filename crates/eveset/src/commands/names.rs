//! Names command

use anyhow::{Context, Result};
use camino::Utf8Path;
use dialoguer::Confirm;
use eveset_core::config::HierarchicalConfigLoader;
use eveset_names::{character_ids, scan_profile, CacheStore, CharacterId, EsiClient, NameCache};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tabled::{settings::Style, Table, Tabled};

use crate::cli::{NamesClearArgs, NamesCommands, NamesResolveArgs, NamesShowArgs};
use crate::commands::load_runtime_config;
use crate::output;

pub async fn run(cmd: NamesCommands, config_path: Option<&Utf8Path>) -> Result<()> {
    match cmd {
        NamesCommands::Resolve(args) => resolve(args, config_path).await,
        NamesCommands::Show(args) => show(args),
        NamesCommands::Clear(args) => clear(args),
    }
}

fn cache_store(path: Option<&Utf8Path>) -> Result<CacheStore> {
    match path {
        Some(path) => Ok(CacheStore::new(path.as_std_path())),
        None => {
            let loader =
                HierarchicalConfigLoader::new().context("Failed to locate config directory")?;
            Ok(CacheStore::in_dir(loader.config_dir()))
        }
    }
}

fn load_cache(store: &CacheStore) -> Result<NameCache> {
    store
        .load()
        .with_context(|| format!("Failed to read name cache {}", store.path().display()))
}

#[derive(Tabled, Serialize)]
struct NameRow {
    id: CharacterId,
    name: String,
    status: String,
}

fn status_of(cache: &NameCache, id: CharacterId) -> &'static str {
    if cache.lookup(id).is_some() {
        "valid"
    } else if cache.is_invalid(id) {
        "invalid"
    } else {
        "unresolved"
    }
}

// ============================================================================
// Resolve Command
// ============================================================================

async fn resolve(args: NamesResolveArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let config = load_runtime_config(config_path)?;
    let store = cache_store(args.cache.as_deref())?;

    let mut ids = args.ids.clone();
    if let Some(profile) = &args.profile {
        let files = scan_profile(profile.as_std_path())
            .with_context(|| format!("Failed to scan profile folder {}", profile))?;
        let found = character_ids(&files);
        tracing::info!("Found {} characters in {}", found.len(), profile);
        ids.extend(found);
    }

    let mut seen = HashSet::new();
    ids.retain(|id| seen.insert(*id));
    if ids.is_empty() {
        output::warning("No character ids to resolve");
        return Ok(());
    }

    let mut cache = load_cache(&store)?.with_max_concurrent(config.esi.max_concurrent);
    let client = EsiClient::from_runtime_config(&config).context("Failed to build HTTP client")?;

    let spinner = output::spinner(&format!("Resolving {} characters...", ids.len()));
    let resolution = cache.resolve_bulk(&client, &ids).await;
    spinner.finish_and_clear();

    store
        .save(&cache)
        .with_context(|| format!("Failed to write name cache {}", store.path().display()))?;

    let rows: Vec<NameRow> = ids
        .iter()
        .map(|&id| NameRow {
            id,
            name: resolution.names.get(&id).cloned().unwrap_or_default(),
            status: status_of(&cache, id).to_string(),
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let mut table = Table::new(rows);
    table.with(Style::sharp());
    println!("{}", table);

    let report = resolution.report;
    if report.failed > 0 {
        output::warning(&format!(
            "{} lookups failed and were marked invalid; run `eveset names clear` to retry them",
            report.failed
        ));
    }
    output::info(&report.to_string());

    Ok(())
}

// ============================================================================
// Show Command
// ============================================================================

#[derive(Serialize)]
struct CacheJson {
    characters: BTreeMap<CharacterId, String>,
    invalid_ids: BTreeSet<CharacterId>,
}

fn show(args: NamesShowArgs) -> Result<()> {
    let store = cache_store(args.cache.as_deref())?;
    let cache = load_cache(&store)?;

    let snapshot = CacheJson {
        characters: cache
            .names()
            .iter()
            .map(|(id, name)| (*id, name.clone()))
            .collect(),
        invalid_ids: cache.invalid_ids().iter().copied().collect(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    if snapshot.characters.is_empty() && snapshot.invalid_ids.is_empty() {
        output::info(&format!("Name cache is empty ({})", store.path().display()));
        return Ok(());
    }

    output::header("Cached character names");
    let rows: Vec<NameRow> = snapshot
        .characters
        .into_iter()
        .map(|(id, name)| NameRow {
            id,
            name,
            status: "valid".to_string(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::sharp());
    println!("{}", table);

    output::kv("Cache file", &store.path().display().to_string());
    output::kv("Invalid ids", &snapshot.invalid_ids.len().to_string());

    Ok(())
}

// ============================================================================
// Clear Command
// ============================================================================

fn clear(args: NamesClearArgs) -> Result<()> {
    let store = cache_store(args.cache.as_deref())?;
    let mut cache = load_cache(&store)?;

    if cache.is_empty() {
        output::info("Name cache is already empty");
        return Ok(());
    }

    if !args.yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Forget {} names and {} invalid ids?",
                cache.len(),
                cache.invalid_ids().len()
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            output::info("Cancelled");
            return Ok(());
        }
    }

    cache.clear();
    store
        .save(&cache)
        .with_context(|| format!("Failed to write name cache {}", store.path().display()))?;
    output::success("Name cache cleared");

    Ok(())
}
