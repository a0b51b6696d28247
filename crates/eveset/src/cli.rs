//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// eveset - EVE Online settings profile utility
#[derive(Parser, Debug)]
#[command(name = "eveset")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to an alternate eveset-runtime.yaml
    #[arg(short, long, global = true)]
    pub config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show version information
    Version(VersionArgs),

    /// Runtime configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Character name lookups and the local name cache
    #[command(subcommand)]
    Names(NamesCommands),

    /// Settings profile backups
    #[command(subcommand)]
    Backup(BackupCommands),
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// Config commands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the resolved runtime configuration
    Show(ConfigShowArgs),
}

#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// Names commands
#[derive(Subcommand, Debug)]
pub enum NamesCommands {
    /// Resolve character ids to names, fetching unknown ones from ESI
    Resolve(NamesResolveArgs),

    /// List cached names
    Show(NamesShowArgs),

    /// Forget every cached name and invalid id
    Clear(NamesClearArgs),
}

#[derive(Args, Debug)]
pub struct NamesResolveArgs {
    /// Character ids to resolve
    pub ids: Vec<u64>,

    /// Also resolve every character found in this profile folder
    #[arg(short, long)]
    pub profile: Option<Utf8PathBuf>,

    /// Cache file (default: ~/.eveset/character-names.json)
    #[arg(long)]
    pub cache: Option<Utf8PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct NamesShowArgs {
    /// Cache file (default: ~/.eveset/character-names.json)
    #[arg(long)]
    pub cache: Option<Utf8PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct NamesClearArgs {
    /// Cache file (default: ~/.eveset/character-names.json)
    #[arg(long)]
    pub cache: Option<Utf8PathBuf>,

    /// Skip confirmation
    #[arg(short, long)]
    pub yes: bool,
}

// Backup commands
#[derive(Subcommand, Debug)]
pub enum BackupCommands {
    /// Archive a settings profile folder
    Create(BackupCreateArgs),

    /// Restore an archive into a new folder or over an existing profile
    Restore(BackupRestoreArgs),

    /// List archives found below one or more installation roots
    List(BackupListArgs),

    /// Check that every file in an archive decompresses cleanly
    Verify(BackupVerifyArgs),

    /// Delete an archive
    Delete(BackupDeleteArgs),

    /// Summarise the archives in a backup folder
    Stats(BackupStatsArgs),
}

#[derive(Args, Debug)]
pub struct BackupCreateArgs {
    /// Profile folder to back up (e.g. settings_Default)
    pub profile_dir: Utf8PathBuf,

    /// Folder holding `backups/` (default: the profile's parent)
    #[arg(short, long)]
    pub base: Option<Utf8PathBuf>,
}

#[derive(Args, Debug)]
pub struct BackupRestoreArgs {
    /// Archive to restore
    pub archive: Utf8PathBuf,

    /// Folder new restores are created in (default: the archive's backup folder parent)
    #[arg(short, long)]
    pub base: Option<Utf8PathBuf>,

    /// Replace this profile folder instead of creating a new one
    #[arg(long)]
    pub to: Option<Utf8PathBuf>,

    /// Skip confirmation when replacing a folder
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct BackupListArgs {
    /// Folders to search for `backups` folders
    #[arg(required = true)]
    pub roots: Vec<Utf8PathBuf>,

    /// Only archives from this server (e.g. Tranquility)
    #[arg(long)]
    pub server: Option<String>,

    /// Only archives of this profile (e.g. settings_Default)
    #[arg(long)]
    pub profile: Option<String>,

    /// Only archives from this installation folder
    #[arg(long)]
    pub installation: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct BackupVerifyArgs {
    /// Archive to check
    pub archive: Utf8PathBuf,
}

#[derive(Args, Debug)]
pub struct BackupDeleteArgs {
    /// Archive to delete
    pub archive: Utf8PathBuf,

    /// Skip confirmation
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct BackupStatsArgs {
    /// Folder holding `backups/`
    #[arg(short, long)]
    pub base: Utf8PathBuf,
}
