//! Backup command

use anyhow::{bail, Context, Result};
use camino::Utf8Path;
use dialoguer::Confirm;
use eveset_backup::{
    discover_all_backup_directories, filter_backups, filter_options, group_backups_by_profile,
    list_all_backups_from_directories, overwrite_target, validate_backup_integrity, BackupFilter,
    BackupManager, BackupMetadata, ALL_CHOICE,
};
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

use crate::cli::{
    BackupCommands, BackupCreateArgs, BackupDeleteArgs, BackupListArgs, BackupRestoreArgs,
    BackupStatsArgs, BackupVerifyArgs,
};
use crate::commands::load_runtime_config;
use crate::output;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub async fn run(cmd: BackupCommands, config_path: Option<&Utf8Path>) -> Result<()> {
    match cmd {
        BackupCommands::Create(args) => create(args).await,
        BackupCommands::Restore(args) => restore(args).await,
        BackupCommands::List(args) => list(args, config_path).await,
        BackupCommands::Verify(args) => verify(args).await,
        BackupCommands::Delete(args) => delete(args),
        BackupCommands::Stats(args) => stats(args),
    }
}

/// Parent of `path`, or `.` for a bare relative name
fn parent_or_current(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Base path for restoring `archive` when none is given: the folder holding its `backups` folder
fn default_restore_base(archive: &Path) -> PathBuf {
    parent_or_current(&parent_or_current(archive))
}

// ============================================================================
// Create Command
// ============================================================================

async fn create(args: BackupCreateArgs) -> Result<()> {
    let profile = args.profile_dir.into_std_path_buf();
    let base = args
        .base
        .map(|b| b.into_std_path_buf())
        .unwrap_or_else(|| parent_or_current(&profile));

    let manager = BackupManager::new(base);
    output::header("Backup Profile");
    output::kv("Profile", &profile.display().to_string());
    if let Some(dir) = manager.backup_directory() {
        output::kv("Backups", &dir.display().to_string());
    }

    let spinner = output::spinner("Creating backup...");
    let outcome = tokio::task::spawn_blocking(move || manager.create(&profile))
        .await
        .context("Backup task panicked")?;
    spinner.finish_and_clear();

    if !outcome.success {
        bail!("Backup failed: {}", outcome.message);
    }

    output::success(&format!("Backup created: {}", outcome.message));
    if let Some(path) = outcome.archive_path {
        output::kv("Archive", &path.display().to_string());
    }
    Ok(())
}

// ============================================================================
// Restore Command
// ============================================================================

async fn restore(args: BackupRestoreArgs) -> Result<()> {
    let archive = args.archive.into_std_path_buf();
    let base = args
        .base
        .map(|b| b.into_std_path_buf())
        .unwrap_or_else(|| default_restore_base(&archive));
    let target = args.to.map(|t| t.into_std_path_buf());

    output::header("Restore Backup");
    output::kv("Archive", &archive.display().to_string());
    match &target {
        Some(target) => output::kv("Replace", &target.display().to_string()),
        None => output::kv("Into", &base.display().to_string()),
    }

    if let Some(target) = &target {
        if target.exists() && !args.yes {
            output::warning(&format!(
                "Everything currently in {} will be deleted",
                target.display()
            ));
            let confirmed = Confirm::new()
                .with_prompt("Proceed with restore?")
                .default(false)
                .interact()?;
            if !confirmed {
                output::info("Restore cancelled");
                return Ok(());
            }
        }
    }

    let manager = BackupManager::new(base);
    let spinner = output::spinner("Restoring backup...");
    let outcome =
        tokio::task::spawn_blocking(move || manager.restore(&archive, target.as_deref()))
            .await
            .context("Restore task panicked")?;
    spinner.finish_and_clear();

    if !outcome.success {
        bail!("Restore failed: {}", outcome.message);
    }
    output::success(&outcome.message);
    Ok(())
}

// ============================================================================
// List Command
// ============================================================================

#[derive(Tabled)]
struct BackupRow {
    created: String,
    server: String,
    files: usize,
    size: String,
    valid: String,
    archive: String,
}

impl From<&BackupMetadata> for BackupRow {
    fn from(record: &BackupMetadata) -> Self {
        Self {
            created: record
                .created_at
                .map(|t| t.format(DATE_FORMAT).to_string())
                .unwrap_or_else(|| "-".to_string()),
            server: record.server_name.clone(),
            files: record.file_count,
            size: format!("{:.1} MB", record.size_mb),
            valid: if record.is_valid { "✓" } else { "✗" }.to_string(),
            archive: record.filename.clone(),
        }
    }
}

async fn list(args: BackupListArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let config = load_runtime_config(config_path)?;
    let roots: Vec<PathBuf> = args
        .roots
        .iter()
        .map(|r| r.as_std_path().to_path_buf())
        .collect();

    let spinner = output::spinner("Searching for backups...");
    let backup_config = config.backup.clone();
    let records = tokio::task::spawn_blocking(move || {
        let directories = discover_all_backup_directories(&roots, &backup_config);
        list_all_backups_from_directories(&directories)
    })
    .await
    .context("Backup search task panicked")?;
    spinner.finish_and_clear();

    let filter = BackupFilter::from_choices(
        args.server.as_deref().unwrap_or(ALL_CHOICE),
        args.profile.as_deref().unwrap_or(ALL_CHOICE),
        args.installation.as_deref().unwrap_or(ALL_CHOICE),
    );
    let filtered = filter_backups(&records, &filter);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&filtered)?);
        return Ok(());
    }

    if filtered.is_empty() {
        output::warning("No backups found");
        if !records.is_empty() {
            let options = filter_options(&records);
            output::kv("Servers", &options.servers.join(", "));
            output::kv("Profiles", &options.profiles.join(", "));
            let installations: Vec<String> = options
                .installations
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            output::kv("Installations", &installations.join(", "));
        }
        return Ok(());
    }

    for (profile, group) in group_backups_by_profile(&filtered) {
        output::header(&profile);
        if let Some(target) = group.first().and_then(overwrite_target) {
            output::kv("Profile folder", &target.display().to_string());
        }
        let rows: Vec<BackupRow> = group.iter().map(BackupRow::from).collect();
        let mut table = Table::new(rows);
        table.with(Style::sharp());
        println!("{}", table);
    }

    output::info(&format!(
        "{} of {} backups shown",
        filtered.len(),
        records.len()
    ));
    Ok(())
}

// ============================================================================
// Verify Command
// ============================================================================

async fn verify(args: BackupVerifyArgs) -> Result<()> {
    let archive = args.archive.into_std_path_buf();

    let spinner = output::spinner("Verifying backup...");
    let (ok, message) = tokio::task::spawn_blocking(move || validate_backup_integrity(&archive))
        .await
        .context("Verify task panicked")?;
    spinner.finish_and_clear();

    if !ok {
        bail!("{}", message);
    }
    output::success(&message);
    Ok(())
}

// ============================================================================
// Delete Command
// ============================================================================

fn delete(args: BackupDeleteArgs) -> Result<()> {
    let archive = args.archive.as_std_path();

    if !args.yes && archive.exists() {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete {}?", args.archive))
            .default(false)
            .interact()?;
        if !confirmed {
            output::info("Delete cancelled");
            return Ok(());
        }
    }

    let outcome = BackupManager::unconfigured().delete_backup(archive);
    if !outcome.success {
        bail!("{}", outcome.message);
    }
    output::success(&outcome.message);
    Ok(())
}

// ============================================================================
// Stats Command
// ============================================================================

fn stats(args: BackupStatsArgs) -> Result<()> {
    let manager = BackupManager::new(args.base.as_std_path());
    let stats = manager.backup_stats();

    output::header("Backup Statistics");
    if let Some(dir) = manager.backup_directory() {
        output::kv("Folder", &dir.display().to_string());
    }
    output::kv("Backups", &stats.count.to_string());
    output::kv("Total size", &format!("{:.1} MB", stats.total_size_mb()));

    let format_time = |t: Option<chrono::DateTime<chrono::Local>>| {
        t.map(|t| t.format(DATE_FORMAT).to_string())
            .unwrap_or_else(|| "-".to_string())
    };
    output::kv("Oldest", &format_time(stats.oldest));
    output::kv("Newest", &format_time(stats.newest));

    Ok(())
}
