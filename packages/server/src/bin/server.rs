//! Ephemeral room chat server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hanare-server
//! cargo run --bin hanare-server -- --host 0.0.0.0 --port 3000
//! ```

use std::{sync::Arc, time::Duration};

use clap::Parser;
use hanare_server::{
    config::{PumpConfig, RoomConfig, ServerConfig},
    domain::MessageCodec,
    infrastructure::codec::XorCodec,
    room::RoomRegistry,
    ui::{Server, state::AppState},
    usecase::{
        CreateRoomUseCase, GetRoomDetailUseCase, GetRoomsUseCase, JoinRoomUseCase,
        SweepExpiredRoomsUseCase, TranscodeMessageUseCase,
    },
};
use hanare_shared::{
    logger::setup_logger,
    time::{Clock, SystemClock},
};
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(name = "hanare-server")]
#[command(about = "Ephemeral room chat server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Lifetime of a room from its creation, in seconds
    #[arg(long, default_value = "1800")]
    room_lifetime_secs: u64,

    /// Maximum age of a message kept in room history, in seconds
    #[arg(long, default_value = "86400")]
    history_retention_secs: u64,

    /// Period of the expired room sweep, in seconds
    #[arg(long, default_value = "300")]
    sweep_interval_secs: u64,

    /// Read deadline of a connection, in seconds (pings go out at 9/10 of it)
    #[arg(long, default_value = "60")]
    pong_wait_secs: u64,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            room: RoomConfig {
                lifetime: Duration::from_secs(args.room_lifetime_secs),
                history_retention: Duration::from_secs(args.history_retention_secs),
                ..RoomConfig::default()
            },
            pump: PumpConfig::with_pong_wait(Duration::from_secs(args.pong_wait_secs.max(1))),
            registry_sweep_interval: Duration::from_secs(args.sweep_interval_secs.max(1)),
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let config = ServerConfig::from(Args::parse());

    // Initialize dependencies in order:
    // 1. Clock, Codec and the process cancellation scope
    // 2. Room registry
    // 3. UseCases
    // 4. Background room sweeper
    // 5. Server
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let codec: Arc<dyn MessageCodec> = Arc::new(XorCodec::new());
    let root = CancellationToken::new();

    let registry = Arc::new(RoomRegistry::new());

    let create_room_usecase = Arc::new(CreateRoomUseCase::new(
        registry.clone(),
        codec.clone(),
        clock.clone(),
        config.room.clone(),
        root.clone(),
    ));
    let join_room_usecase = Arc::new(JoinRoomUseCase::new(registry.clone(), clock.clone()));
    let transcode_message_usecase = Arc::new(TranscodeMessageUseCase::new(codec.clone()));
    let get_rooms_usecase = Arc::new(GetRoomsUseCase::new(registry.clone(), clock.clone()));
    let get_room_detail_usecase =
        Arc::new(GetRoomDetailUseCase::new(registry.clone(), clock.clone()));
    let sweep_usecase = SweepExpiredRoomsUseCase::new(registry.clone(), clock.clone());

    let sweeper = {
        let interval = config.registry_sweep_interval;
        let cancel = root.clone();
        tokio::spawn(async move { sweep_usecase.run(interval, cancel).await })
    };

    let server = Server::new(AppState {
        create_room_usecase,
        join_room_usecase,
        transcode_message_usecase,
        get_rooms_usecase,
        get_room_detail_usecase,
        outbox_capacity: config.room.outbox_capacity,
        pump_config: config.pump.clone(),
    });
    let result = server.run(config.host, config.port).await;

    // HTTP は停止済み。残っているルームとセッションをすべて閉じる
    root.cancel();
    let _ = sweeper.await;

    if let Err(e) = result {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
