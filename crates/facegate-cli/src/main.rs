use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use facegate_auth::identity::{format_display, normalize_input};
use facegate_auth::lifecycle::gallery_for;
use facegate_auth::{AuthConfig, Notice};
use facegate_core::directory::{self, find_by_number, is_identity_number};
use facegate_core::{Descriptor, EuclideanMatchIndex, MatchIndex, RegisteredIdentity};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "facegate", about = "Facegate identity directory tooling")]
struct Cli {
    /// Identity directory file, JSON or TOML (default: $FACEGATE_DIRECTORY)
    #[arg(short, long, global = true)]
    directory: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize an identity number and show its display form
    Format {
        /// Identity number as typed (spaces allowed)
        input: String,
    },
    /// Look up an identity number in the directory
    Lookup {
        /// Identity number (spaces allowed)
        number: String,
    },
    /// Validate the directory and build its match index
    Check {
        /// Probe descriptor as a JSON array, e.g. "[0.1, 0.2, ...]"
        #[arg(long)]
        probe: Option<String>,
    },
}

fn directory_path(cli_path: Option<PathBuf>) -> Result<PathBuf> {
    cli_path
        .or_else(|| std::env::var_os("FACEGATE_DIRECTORY").map(PathBuf::from))
        .context("no directory given: pass --directory or set FACEGATE_DIRECTORY")
}

fn load(cli_path: Option<PathBuf>) -> Result<Vec<RegisteredIdentity>> {
    let path = directory_path(cli_path)?;
    directory::load_directory(&path).with_context(|| format!("loading {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Format { input } => {
            let Some(digits) = normalize_input(&input) else {
                bail!("rejected: identity numbers are at most 12 digits");
            };
            println!("{}", format_display(&digits));
        }
        Commands::Lookup { number } => {
            let digits = normalize_input(&number).unwrap_or_default();
            if !is_identity_number(&digits) {
                bail!("{number:?} is not a 12-digit identity number");
            }
            let identities = load(cli.directory)?;
            match find_by_number(&identities, &digits) {
                Some(identity) => {
                    println!(
                        "{}",
                        serde_json::json!({
                            "identity_number": format_display(&identity.identity_number),
                            "display_name": identity.display_name,
                            "photo_ref": identity.photo_ref,
                            "descriptor_len": identity.descriptor.len(),
                        })
                    );
                }
                None => {
                    let notice = Notice::IdentityNotFound {
                        identity_number: digits,
                    };
                    bail!("{notice}");
                }
            }
        }
        Commands::Check { probe } => {
            let config = AuthConfig::from_env();
            let identities = load(cli.directory)?;
            let shared: Vec<Arc<RegisteredIdentity>> =
                identities.into_iter().map(Arc::new).collect();
            let gallery = gallery_for(&shared);
            tracing::debug!(labels = gallery.len(), "gallery assembled");

            let index = EuclideanMatchIndex::build(gallery, config.match_threshold)
                .context("building match index")?;

            let best = match probe {
                Some(text) => {
                    let values: Vec<f32> =
                        serde_json::from_str(&text).context("probe must be a JSON array of numbers")?;
                    let best = index.best_match(&Descriptor::new(values));
                    Some(serde_json::json!({
                        "label": best.label,
                        "distance": best.distance,
                        "matched": best.matched,
                    }))
                }
                None => None,
            };

            println!(
                "{}",
                serde_json::json!({
                    "identities": shared.len(),
                    "labels": index.labels(),
                    "dimension": index.dimension(),
                    "threshold": index.threshold(),
                    "best_match": best,
                })
            );
        }
    }

    Ok(())
}
