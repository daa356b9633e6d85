//! FolderVault CLI - Command line interface for vault folders.
//!
//! This tool creates, finds, inspects, and deletes vault folders spread over
//! the storage roots listed in the disk map.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use foldervault_common::{Category, VaultId};
use foldervault_storage::RootRegistry;
use foldervault_vault::{config_dir, DiskMap, VaultManager, VaultSession};

#[derive(Parser)]
#[command(name = "foldervault")]
#[command(about = "FolderVault - Vault folders across categorized storage roots")]
#[command(version)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Configuration directory (default: $FOLDERVAULTDIR or ~/.foldervault).
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the disk map of storage roots.
    Init {
        /// Root used when no preferred category is configured.
        #[arg(long = "default")]
        default_root: PathBuf,

        /// Additional root as CATEGORY=PATH (repeatable).
        #[arg(short, long = "root", value_parser = parse_root)]
        roots: Vec<(Category, PathBuf)>,

        /// Overwrite an existing disk map.
        #[arg(long)]
        force: bool,
    },

    /// List configured roots in scan order.
    Roots,

    /// Create a new vault folder.
    Create(CreateArgs),

    /// Print the path of a vault folder.
    Locate {
        /// Vault identifier.
        id: VaultId,
    },

    /// Show the records stored in a vault folder.
    Show {
        /// Vault identifier.
        id: VaultId,
    },

    /// Renew the lease of a vault folder.
    Lease {
        /// Vault identifier.
        id: VaultId,

        #[command(flatten)]
        duration: LeaseDuration,
    },

    /// Permanently delete a vault folder.
    Delete {
        /// Vault identifier.
        id: VaultId,
    },
}

#[derive(Args)]
struct CreateArgs {
    /// Title for the description record.
    #[arg(short, long, default_value = "")]
    title: String,

    /// Free-text description.
    #[arg(short, long, default_value = "")]
    description: String,

    /// Tag (repeatable).
    #[arg(long = "tag")]
    tags: Vec<String>,

    /// Preferred root category, most preferred first (repeatable).
    #[arg(short, long = "priority")]
    priority: Vec<Category>,

    #[command(flatten)]
    lease: LeaseDuration,

    /// Forward record as a JSON value.
    #[arg(long)]
    forward: Option<String>,
}

#[derive(Args)]
#[group(multiple = false)]
struct LeaseDuration {
    /// Lease length in seconds.
    #[arg(long)]
    seconds: Option<u64>,

    /// Never expire (the default).
    #[arg(long)]
    never: bool,
}

impl LeaseDuration {
    fn duration(&self) -> Option<u64> {
        if self.never {
            None
        } else {
            self.seconds
        }
    }
}

fn parse_root(raw: &str) -> std::result::Result<(Category, PathBuf), String> {
    let (name, path) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected CATEGORY=PATH, got '{}'", raw))?;
    let category = name.parse::<Category>().map_err(|e| e.to_string())?;
    Ok((category, PathBuf::from(path)))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match cli.config_dir {
        Some(dir) => dir,
        None => config_dir().context("Failed to resolve configuration directory")?,
    };

    match cli.command {
        Commands::Init {
            default_root,
            roots,
            force,
        } => cmd_init(&config, default_root, roots, force),

        Commands::Roots => cmd_roots(&config),

        Commands::Create(args) => cmd_create(&config, args),

        Commands::Locate { id } => cmd_locate(&config, id),

        Commands::Show { id } => cmd_show(&config, id),

        Commands::Lease { id, duration } => cmd_lease(&config, id, duration.duration()),

        Commands::Delete { id } => cmd_delete(&config, id),
    }
}

fn load_manager(config: &Path) -> Result<VaultManager> {
    VaultManager::from_config_dir(config).with_context(|| {
        format!(
            "Failed to load roots from {} (run `foldervault init` first)",
            config.display()
        )
    })
}

/// Open a session positioned on an existing vault folder.
fn open_vault(manager: &VaultManager, id: VaultId) -> Result<VaultSession> {
    let mut session = manager.session();
    session.set_identifier(id);
    if session.locate()?.is_none() {
        anyhow::bail!("Vault {} not found under any root", id);
    }
    Ok(session)
}

/// Run `f` while holding the vault lock, releasing it afterwards.
fn with_lock<T>(
    session: &mut VaultSession,
    f: impl FnOnce(&mut VaultSession) -> Result<T>,
) -> Result<T> {
    if session.lock()?.is_none() {
        anyhow::bail!("Vault is in use by another process");
    }
    let result = f(session);
    session.unlock()?;
    result
}

/// Write the disk map.
fn cmd_init(
    config: &Path,
    default_root: PathBuf,
    roots: Vec<(Category, PathBuf)>,
    force: bool,
) -> Result<()> {
    let disk_map = DiskMap::in_dir(config);
    if disk_map.exists() && !force {
        anyhow::bail!(
            "Disk map already exists at {} (use --force to replace it)",
            disk_map.path().display()
        );
    }

    let mut mapping = vec![(Category::Default, default_root)];
    mapping.extend(roots);
    for (category, root) in &mapping {
        if !root.is_absolute() {
            anyhow::bail!("{} root must be an absolute path: {}", category, root.display());
        }
        fs::create_dir_all(root)
            .with_context(|| format!("Failed to create {} root {}", category, root.display()))?;
    }

    let registry = RootRegistry::from_roots(mapping).context("Invalid root configuration")?;
    disk_map.save(&registry).context("Failed to write disk map")?;

    info!("Wrote {}", disk_map.path().display());
    println!("Configured {} roots.", registry.len());
    Ok(())
}

/// List configured roots.
fn cmd_roots(config: &Path) -> Result<()> {
    let manager = load_manager(config)?;
    for (category, root) in manager.registry().iter() {
        println!("  {:<12} {}", category.as_str(), root.display());
    }
    Ok(())
}

/// Create a new vault folder.
fn cmd_create(config: &Path, args: CreateArgs) -> Result<()> {
    let manager = load_manager(config)?;
    let mut session = manager.session();

    let forward = args
        .forward
        .as_deref()
        .map(serde_json::from_str)
        .transpose()
        .context("Forward record is not valid JSON")?;

    let id = session.new_identifier();
    if let Some(desc) = session.description_mut() {
        desc.title = args.title;
        desc.description = args.description;
        desc.tags = args.tags;
        desc.storage_priority = args.priority;
    }
    session.set_lease(args.lease.duration());
    session.set_forward(forward);

    let path = session
        .create_path()
        .context("Failed to create vault folder")?;
    with_lock(&mut session, |session| {
        session.save().context("Failed to save records")
    })?;

    println!("Vault created successfully!");
    println!("  ID: {}", id);
    println!("  Location: {}", path.display());

    Ok(())
}

/// Print the path of a vault folder.
fn cmd_locate(config: &Path, id: VaultId) -> Result<()> {
    let manager = load_manager(config)?;
    let session = open_vault(&manager, id)?;
    if let Some(path) = session.path() {
        println!("{}", path.display());
    }
    Ok(())
}

/// Show the records of a vault folder.
fn cmd_show(config: &Path, id: VaultId) -> Result<()> {
    let manager = load_manager(config)?;
    let mut session = open_vault(&manager, id)?;
    session.load().context("Failed to load records")?;

    println!("Vault Information:");
    println!("  ID: {}", id);
    if let Some(path) = session.path() {
        println!("  Location: {}", path.display());
    }
    println!("  In use: {}", if session.in_use() { "yes" } else { "no" });

    match session.lease() {
        Some(lease) => {
            println!("  Lease updated: {}", format_time(lease.last_updated));
            match lease.expires {
                Some(expires) => println!("  Lease expires: {}", format_time(expires)),
                None => println!("  Lease expires: never"),
            }
        }
        None => println!("  Lease: none"),
    }

    match session.description() {
        Some(desc) => println!(
            "  Description:\n{}",
            serde_json::to_string_pretty(desc)?
        ),
        None => println!("  Description: none"),
    }

    match session.forward() {
        Some(forward) => println!("  Forward:\n{}", serde_json::to_string_pretty(forward)?),
        None => println!("  Forward: none"),
    }

    Ok(())
}

fn format_time(secs: f64) -> String {
    chrono::DateTime::from_timestamp_millis((secs * 1000.0) as i64)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| secs.to_string())
}

/// Renew the lease of a vault folder.
fn cmd_lease(config: &Path, id: VaultId, duration: Option<u64>) -> Result<()> {
    let manager = load_manager(config)?;
    let mut session = open_vault(&manager, id)?;

    with_lock(&mut session, |session| {
        session.load().context("Failed to load records")?;
        session.set_lease(duration);
        session.save().context("Failed to save records")
    })?;

    match duration {
        Some(secs) => println!("Lease renewed for {} seconds.", secs),
        None => println!("Lease set to never expire."),
    }
    Ok(())
}

/// Permanently delete a vault folder.
fn cmd_delete(config: &Path, id: VaultId) -> Result<()> {
    let manager = load_manager(config)?;
    let mut session = open_vault(&manager, id)?;

    with_lock(&mut session, |session| {
        session.delete().context("Failed to delete vault folder")
    })?;

    println!("Vault deleted: {}", id);
    Ok(())
}
