use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use quickmark::config::{default_config_dir, load_or_create_config};
use quickmark::store::ProfileStore;
use quickmark::{
    save_bookmark, ActiveTab, FolderCache, FolderResolver, QuickmarkConfig, SaveRequest, Server,
    SharedStore,
};

#[derive(Parser)]
#[command(name = "quickmark")]
#[command(about = "Save the current tab into a bookmark folder, found or created by path")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding quickmark.json
    #[arg(long, env = "QUICKMARK_CONFIG_DIR", global = true)]
    config_dir: Option<PathBuf>,

    /// Chromium profile Bookmarks file, overriding the config
    #[arg(long, global = true)]
    bookmarks: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the popup API and the extension bridge
    Serve,
    /// List folders matching a path query
    Folders {
        /// Path query, e.g. "work/proj"
        #[arg(default_value = "")]
        query: String,
    },
    /// Save a bookmark into the profile file
    Save {
        #[arg(long)]
        title: String,
        #[arg(long)]
        url: String,
        /// Existing folder id
        #[arg(long, conflicts_with = "path")]
        folder_id: Option<String>,
        /// Folder path, created when missing
        #[arg(long)]
        path: Option<String>,
    },
    /// Create a folder path in the profile file and print its id
    Mkdir { path: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quickmark=info")),
        )
        .init();

    let cli = Cli::parse();
    let config_dir = match cli.config_dir {
        Some(dir) => dir,
        None => default_config_dir()?,
    };
    let mut config = load_or_create_config(&config_dir)
        .with_context(|| format!("loading config from {}", config_dir.display()))?;
    if let Some(file) = cli.bookmarks {
        config.bookmarks_file = Some(file);
    }

    match cli.command {
        Commands::Serve => serve(config).await,
        Commands::Folders { query } => list_folders(&config, &query).await,
        Commands::Save {
            title,
            url,
            folder_id,
            path,
        } => {
            let tab = ActiveTab {
                title: title.clone(),
                url,
            };
            let store = profile_store(&config, Some(tab))?;
            let resolver = resolver(&config, store.clone());
            let request = SaveRequest {
                title,
                folder_id,
                folder_path: path,
            };
            let saved = save_bookmark(&store, &resolver, &request).await?;
            println!("{}", saved.id);
            Ok(())
        }
        Commands::Mkdir { path } => {
            let store = profile_store(&config, None)?;
            let id = resolver(&config, store).resolve(&path).await?;
            println!("{id}");
            Ok(())
        }
    }
}

async fn serve(config: QuickmarkConfig) -> Result<()> {
    let mut server = Server::new(config).await?;
    println!("listening on http://{}", server.addr());
    tokio::signal::ctrl_c()
        .await
        .context("waiting for Ctrl-C")?;
    server.shutdown().map_err(anyhow::Error::msg)?;
    Ok(())
}

async fn list_folders(config: &QuickmarkConfig, query: &str) -> Result<()> {
    let store = profile_store(config, None)?;
    let index = FolderCache::new(store).refresh().await?;
    for record in index.search(query) {
        println!("{}\t{}", record.id, record.path);
    }
    Ok(())
}

fn profile_store(config: &QuickmarkConfig, tab: Option<ActiveTab>) -> Result<SharedStore> {
    let Some(path) = config.bookmarks_file.clone() else {
        bail!("no bookmarks file configured; pass --bookmarks or set bookmarks_file");
    };
    if !path.is_file() {
        bail!("bookmarks file {} does not exist", path.display());
    }
    Ok(Arc::new(ProfileStore::new(path).with_active_tab(tab)))
}

fn resolver(config: &QuickmarkConfig, store: SharedStore) -> FolderResolver {
    let cache = FolderCache::new(store.clone());
    FolderResolver::new(store, cache, config.root_folder_id.as_str())
}
