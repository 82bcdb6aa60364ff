//! cueplay - command-line driver for the playback session
//!
//! Loads a sound manifest, opens the default audio output, and plays one
//! cue. Meant for auditioning manifests and assets from the shell.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use cueplay_common::config::RegistryManifest;
use cueplay_common::Category;
use cueplay_session::audio::{FsAssetStore, RodioBackend};
use cueplay_session::{PlayOptions, PlaybackSession, UnlockGate};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for cueplay
#[derive(Parser, Debug)]
#[command(name = "cueplay")]
#[command(about = "Sound-effects session driver")]
#[command(version)]
struct Args {
    /// Path to the sound manifest (TOML)
    #[arg(short, long, default_value = "sounds.toml", env = "CUEPLAY_MANIFEST")]
    manifest: PathBuf,

    /// Root folder of the sound asset collection (defaults to the
    /// manifest's asset_root, then the current directory)
    #[arg(short, long, env = "CUEPLAY_ASSET_ROOT")]
    asset_root: Option<PathBuf>,

    /// Sound category (ambience, attacks, freeze, kernel, lockdown, pain)
    category: Category,

    /// Sound key within the category
    key: String,

    /// Master volume (0.0 - 1.0)
    #[arg(short, long, default_value_t = 1.0)]
    volume: f32,

    /// Echo playback events as JSON lines on stdout
    #[arg(long)]
    events: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cueplay=info,cueplay_session=info,cueplay_common=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let manifest = RegistryManifest::load(&args.manifest)
        .with_context(|| format!("failed to load manifest {}", args.manifest.display()))?;
    let registry = Arc::new(manifest.build_registry().context("invalid sound manifest")?);

    let asset_root = args
        .asset_root
        .or_else(|| manifest.asset_root.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    info!(root = %asset_root.display(), "using asset root");

    let store = Arc::new(FsAssetStore::new(asset_root));
    let backend = Arc::new(RodioBackend::new());
    let session = PlaybackSession::new(registry, store, backend, UnlockGate::new());
    session.start().await;

    if args.events {
        let mut events = session.subscribe_events();
        tokio::spawn(async move {
            while let Ok(event) = events.recv().await {
                match serde_json::to_string(&event) {
                    Ok(line) => println!("{line}"),
                    Err(e) => tracing::warn!(error = %e, "event serialization failed"),
                }
            }
        });
    }

    session.set_master_volume(args.volume).await;

    // A shell invocation is its own user gesture.
    session
        .unlock()
        .await
        .context("failed to open audio output")?;

    let handle = session
        .play(args.category, &args.key, PlayOptions::default())
        .await
        .context("playback failed")?;
    info!(%handle, "playing; ctrl-c stops");

    tokio::select! {
        _ = session.wait_stopped(handle) => {
            info!("sound finished");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted, stopping");
            session.stop(handle).await;
            session.wait_stopped(handle).await;
        }
    }

    session.shutdown().await;
    Ok(())
}
