use orbrowse::{
    MediaId, MediaItem, MediaPresenter, MediaPresenterListener, MediaTree, PlaybackSession,
    PlaybackState, Player, PlayerEvent, SleepTimer, TreeConnection,
};
use orconfig::get_config;
use orradio::{ApiServiceProvider, RadioStation};
use orstorage::StationStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Player without audio output: reports every stream as ready
struct NullPlayer {
    events: mpsc::UnboundedSender<PlayerEvent>,
}

impl Player for NullPlayer {
    fn prepare(&self, url: &str) {
        info!("🔗 Stream: {}", url);
        let _ = self.events.send(PlayerEvent::Buffering);
    }

    fn play(&self) {
        let _ = self.events.send(PlayerEvent::Ready);
    }

    fn pause(&self) {
        info!("⏸️  Paused");
    }

    fn stop(&self) {
        tracing::debug!("Player stopped");
    }

    fn set_volume(&self, volume: f32) {
        tracing::debug!(volume, "Volume changed");
    }
}

/// Prints the lists and the playback state on the console
struct ConsoleListener;

impl MediaPresenterListener for ConsoleListener {
    fn on_children(&self, parent_id: &str, page: usize, items: &[MediaItem]) {
        println!("── {} (page {}) ──", parent_id, page);
        for item in items {
            match &item.subtitle {
                Some(subtitle) => println!("  {:<40} {:<30} [{}]", item.title, subtitle, item.id),
                None => println!("  {:<40} {:<30} [{}]", item.title, "", item.id),
            }
        }
    }

    fn on_play_request(&self, item: &MediaItem) {
        info!("▶️  Play request for {}", item.title);
    }

    fn on_playback_state(&self, state: PlaybackState, error: Option<&str>) {
        match error {
            Some(error) => tracing::warn!("⚠️ Playback {:?}: {}", state, error),
            None => info!("📻 Playback {:?}", state),
        }
    }

    fn on_metadata(&self, station: Option<&RadioStation>) {
        if let Some(station) = station {
            info!("🎵 Now playing: {} {}", station.name, station.media_subtitle());
        }
    }
}

#[derive(Default)]
struct Args {
    browse: Option<String>,
    search: Option<String>,
    play: Option<String>,
    sleep: bool,
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--search" => args.search = it.next(),
            "--play" => args.play = it.next(),
            "--sleep" => args.sleep = true,
            _ => args.browse = Some(arg),
        }
    }
    args
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = get_config();

    // ========== PHASE 1 : Logging ==========
    if config.get_log_enable_console()? {
        let filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(config.get_log_min_level()?)?,
        };
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    let args = parse_args();

    // ========== PHASE 2 : Catalogue et stockage ==========
    info!("📡 Connecting to the station directory...");
    let directory = Arc::new(ApiServiceProvider::from_config(&config).await?);
    let store = Arc::new(StationStore::from_config(&config)?);
    let tree = Arc::new(
        MediaTree::new(directory.clone(), store.clone())
            .with_country_code(config.get_country_code()?),
    );
    info!("✅ Station directory ready at {}", directory.client().base_url());

    // ========== PHASE 3 : Session de lecture ==========
    let (player_tx, mut player_rx) = mpsc::unbounded_channel();
    let session = Arc::new(PlaybackSession::new(
        Arc::new(NullPlayer { events: player_tx }),
        tree.clone(),
    ));
    let mut session_events = session.subscribe();

    let timer_session = session.clone();
    let sleep_timer = SleepTimer::new(move || timer_session.on_sleep_timer_expired());
    if args.sleep {
        let minutes = config.get_sleep_timer_minutes()?;
        sleep_timer.start(Duration::from_secs(minutes as u64 * 60));
    }

    // ========== PHASE 4 : Navigation ==========
    let (connection, mut children_rx) = TreeConnection::new(tree.clone());
    let mut presenter = MediaPresenter::new(Arc::new(connection), Arc::new(ConsoleListener));
    presenter.start();
    if let Some(id) = &args.browse {
        let parsed = MediaId::parse(id);
        presenter.handle_item_click(&MediaItem::folder(&parsed, id.as_str()), 0);
    }
    if let Some(query) = &args.search {
        presenter.open_search(query, 0);
    }

    if let Some(id) = &args.play {
        if let Err(e) = session.play_from_media_id(id).await {
            tracing::warn!("⚠️ Cannot play {}: {}", id, e);
        }
    } else if config.get_last_known_autoplay()? {
        match session.play_last_known().await {
            Ok(true) => {}
            Ok(false) => info!("No station played yet"),
            Err(e) => tracing::warn!("⚠️ Cannot replay last station: {}", e),
        }
    }

    info!("✅ OpenRadio is ready!");
    info!("Press Ctrl+C to stop...");
    loop {
        tokio::select! {
            Some(loaded) = children_rx.recv() => {
                presenter.on_children_loaded(&loaded.parent_id, loaded.page, loaded.items);
            }
            Some(event) = player_rx.recv() => session.on_player_event(event),
            Ok(event) = session_events.recv() => presenter.on_session_event(&event),
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    sleep_timer.cancel();
    session.stop();
    presenter.stop();
    info!("👋 OpenRadio stopped");
    Ok(())
}
