//! Story Sync Client
//!
//! Thin CLI around the sync engine for smoke use against a real endpoint:
//! enter a chapter, stream a short position walk, or watch a battle room
//! until it completes.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use ledger_bridge::{HttpRelayer, KeypairSigner, RelayerApi, SolanaLedger, WalletSigner};
use solana_sdk::signature::read_keypair_file;
use sync_engine::{
    BattleStateSynchronizer, ClientEvent, EventBus, FeePayerResolver, Operation,
    OperationRegistry, PollOutcome, PositionSyncQueue, SyncConfig, TransactionExecutor,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Story adventure ledger sync client
#[derive(Parser, Debug)]
#[command(name = "story-sync")]
#[command(about = "Client-side ledger sync for the story adventure", long_about = None)]
struct Args {
    /// Ledger RPC URL
    #[arg(long, default_value = "https://api.devnet.solana.com")]
    rpc_url: String,

    /// Fee relayer base URL (direct self-payment when omitted)
    #[arg(long)]
    relayer_url: Option<String>,

    /// Path to the signing keypair
    #[arg(long)]
    keypair: PathBuf,

    /// Chapter to enter on startup
    #[arg(long)]
    start_chapter: Option<u8>,

    /// Comma-separated rounded positions to stream through the sync queue
    #[arg(long)]
    walk: Option<String>,

    /// Battle room id to watch until completion
    #[arg(long)]
    watch_room: Option<u64>,

    /// Local warrior label shown on battle completion
    #[arg(long, default_value = "Scout")]
    my_label: String,

    /// Opponent warrior label shown on battle completion
    #[arg(long, default_value = "Rival")]
    opponent_label: String,

    /// Battle poll interval in milliseconds
    #[arg(long, default_value = "1500")]
    poll_interval_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let keypair = read_keypair_file(&args.keypair)
        .map_err(|e| anyhow::anyhow!("failed to read keypair {:?}: {e}", args.keypair))?;
    let wallet = Arc::new(KeypairSigner::new(keypair));
    let actor = wallet.pubkey();

    tracing::info!("Starting story-sync");
    tracing::info!("  RPC: {}", args.rpc_url);
    tracing::info!("  Actor: {}", actor);
    tracing::info!("  Relayer: {}", args.relayer_url.as_deref().unwrap_or("(direct payment)"));

    let ledger = Arc::new(SolanaLedger::new(&args.rpc_url));
    let relayer: Option<Arc<dyn RelayerApi>> = args
        .relayer_url
        .as_deref()
        .map(|url| Arc::new(HttpRelayer::new(url)) as Arc<dyn RelayerApi>);

    let config = SyncConfig {
        prefer_relayer: relayer.is_some(),
        ..SyncConfig::default()
    };

    let events = EventBus::default();
    spawn_event_logger(&events);

    let executor = Arc::new(TransactionExecutor::new(
        ledger.clone(),
        wallet,
        FeePayerResolver::new(relayer),
        Arc::new(OperationRegistry::new()),
        events.clone(),
        config.clone(),
    ));

    if let Some(chapter) = args.start_chapter {
        let result = executor.submit(Operation::start_chapter(actor, chapter)).await;
        if !result.success {
            tracing::error!(
                chapter,
                kind = ?result.error_kind,
                message = result.error_message.as_deref().unwrap_or(""),
                "failed to enter chapter"
            );
        }
    }

    if let Some(walk) = &args.walk {
        let positions: Vec<i64> = walk
            .split(',')
            .map(|p| p.trim().parse())
            .collect::<Result<_, _>>()
            .map_err(|e| anyhow::anyhow!("invalid --walk value: {e}"))?;

        let queue = PositionSyncQueue::new(executor.clone(), events.clone(), &config);
        for position in positions {
            queue.enqueue(position);
        }
        while queue.worker_active() || queue.pending() > 0 {
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
    }

    if let Some(room_id) = args.watch_room {
        let sync = BattleStateSynchronizer::new(
            ledger,
            events,
            actor,
            args.my_label,
            args.opponent_label,
            room_id,
        );

        let mut ticker = tokio::time::interval(Duration::from_millis(args.poll_interval_ms));
        tracing::info!(room_id, "watching battle room (Ctrl+C to stop)");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match sync.poll().await {
                        Ok(PollOutcome::Completed(state)) => {
                            tracing::info!(
                                winner = state.winner_label.as_deref().unwrap_or("(draw)"),
                                my_score = state.my_score,
                                opponent_score = state.opponent_score,
                                "battle over"
                            );
                            break;
                        }
                        Ok(_) => {}
                        Err(e) => tracing::warn!(error = %e, "poll failed, retrying next tick"),
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("stopping battle watch");
                    break;
                }
            }
        }
    }

    tracing::info!("story-sync done");
    Ok(())
}

/// Log every engine event; the real UI subscribes the same way
fn spawn_event_logger(events: &EventBus) {
    let mut updates = events.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = updates.recv().await {
            match event {
                ClientEvent::OperationSettled { key, result } => {
                    if result.success {
                        tracing::info!(key, signature = ?result.signature, "operation settled");
                    } else {
                        tracing::warn!(key, kind = ?result.error_kind, "operation failed");
                    }
                }
                ClientEvent::PositionSynced { position_x, signature } => {
                    tracing::info!(position_x, %signature, "position synced");
                }
                ClientEvent::BattlePhaseChanged { state } => {
                    tracing::info!(phase = ?state.phase, question = state.current_question, "battle phase changed");
                }
                ClientEvent::BattleCompleted { state } => {
                    tracing::info!(winner = ?state.winner_label, "battle completed");
                }
            }
        }
    });
}
