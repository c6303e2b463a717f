//! Vaultlink CLI — Markdown vault link maintenance with MCP server.
//!
//! Usage:
//!   vaultlink mcp [--transport stdio] [--vault path | --api-url url] [--git]
//!   vaultlink links <note> [--vault path]
//!   vaultlink backlinks <note> [--vault path]
//!   vaultlink sync [--message msg] [--vault path]

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use vaultlink::mcp::{run_mcp_server, BackendConfig};
use vaultlink::{FsVault, LinkEngine};

#[derive(Parser)]
#[command(
    name = "vaultlink",
    version,
    about = "Link-consistency engine for Markdown note vaults"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the MCP (Model Context Protocol) server
    Mcp {
        /// Transport type (currently only stdio)
        #[arg(long, default_value = "stdio")]
        transport: String,
        /// Path to the vault directory (falls back to $VAULT_PATH)
        #[arg(long)]
        vault: Option<PathBuf>,
        /// Treat the vault as a git clone: pull on start, enable git_sync
        #[arg(long)]
        git: bool,
        /// Base URL of a REST vault endpoint (falls back to $VAULT_API_URL;
        /// the API key comes from $VAULT_API_KEY)
        #[arg(long)]
        api_url: Option<String>,
    },
    /// Print the links found in a note
    Links {
        /// Vault-relative path of the note
        note: String,
        /// Path to the vault directory (falls back to $VAULT_PATH)
        #[arg(long)]
        vault: Option<PathBuf>,
    },
    /// Print the notes that link to a note
    Backlinks {
        /// Vault-relative path of the note
        note: String,
        /// Path to the vault directory (falls back to $VAULT_PATH)
        #[arg(long)]
        vault: Option<PathBuf>,
    },
    /// Commit and push local vault changes to the git remote
    Sync {
        /// Commit message
        #[arg(long, default_value = "Update vault via vaultlink")]
        message: String,
        /// Path to the vault directory (falls back to $VAULT_PATH)
        #[arg(long)]
        vault: Option<PathBuf>,
    },
}

fn vault_root(vault: Option<PathBuf>) -> Result<PathBuf, String> {
    vault
        .or_else(|| std::env::var("VAULT_PATH").ok().map(PathBuf::from))
        .ok_or_else(|| "no vault given: pass --vault or set VAULT_PATH".to_string())
}

fn open_engine(vault: Option<PathBuf>) -> Result<LinkEngine, String> {
    let root = vault_root(vault)?;
    let store = FsVault::open(&root).map_err(|e| format!("Failed to open vault: {}", e))?;
    Ok(LinkEngine::new(Arc::new(store)))
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Runtime::new()
        .expect("failed to create tokio runtime")
        .block_on(future)
}

fn cmd_links(engine: &LinkEngine, note: &str) -> i32 {
    match block_on(engine.extract_links(note)) {
        Ok(report) => {
            for link in &report.wiki_links {
                println!("[[{}]]", link);
            }
            for link in &report.markdown_links {
                println!("{}", link);
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_backlinks(engine: &LinkEngine, note: &str) -> i32 {
    match block_on(engine.backlinks(note)) {
        Ok(backlinks) => {
            if backlinks.is_empty() {
                println!("No backlinks found.");
            }
            for path in backlinks {
                println!("{}", path);
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_sync(vault: Option<PathBuf>, message: &str) -> i32 {
    let root = match vault_root(vault) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    block_on(async {
        let store = match FsVault::open_git(&root).await {
            Ok(v) => v,
            Err(e) => {
                eprintln!("Error: {}", e);
                return 1;
            }
        };
        match vaultlink::VaultStore::sync(&store, message).await {
            Ok(summary) => {
                println!("{}", summary);
                0
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        }
    })
}

fn main() {
    // Logs go to stderr; stdout belongs to the MCP transport.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Mcp {
            transport,
            vault,
            git,
            api_url,
        } => {
            if transport != "stdio" {
                eprintln!("error: only 'stdio' transport is currently supported");
                std::process::exit(1);
            }
            let api_url = api_url.or_else(|| std::env::var("VAULT_API_URL").ok());
            let config = match api_url {
                Some(url) => {
                    let key = match std::env::var("VAULT_API_KEY") {
                        Ok(k) => k,
                        Err(_) => {
                            eprintln!("error: VAULT_API_KEY must be set for an API vault");
                            std::process::exit(1);
                        }
                    };
                    BackendConfig::Api { url, key }
                }
                None => {
                    let root = match vault_root(vault) {
                        Ok(r) => r,
                        Err(e) => {
                            eprintln!("error: {}", e);
                            std::process::exit(1);
                        }
                    };
                    BackendConfig::Fs { root, git }
                }
            };
            std::process::exit(run_mcp_server(config));
        }
        Commands::Links { note, vault } => {
            let engine = match open_engine(vault) {
                Ok(e) => e,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };
            std::process::exit(cmd_links(&engine, &note));
        }
        Commands::Backlinks { note, vault } => {
            let engine = match open_engine(vault) {
                Ok(e) => e,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };
            std::process::exit(cmd_backlinks(&engine, &note));
        }
        Commands::Sync { message, vault } => {
            std::process::exit(cmd_sync(vault, &message));
        }
    }
}
