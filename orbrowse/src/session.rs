//! Playback session state
//!
//! [`PlaybackSession`] owns the play queue and the playback state machine,
//! drives a [`Player`] and publishes [`SessionEvent`]s on a broadcast
//! channel.
//!
//! ```text
//! play_from_media_id ──► Connecting ──Buffering──► Buffering ──Ready──► Playing
//!                            │                         │                  │
//!                            └────────── Error ────────┴──────────────────┘
//! Connecting/Playing ──pause(reason)──► Paused ──play / focus gain (AudioFocusLoss)──► Playing
//! ```
//!
//! Starting a station records it in the recent list and as the last known
//! station, and reports the click to the directory.

use crate::error::{Error, Result};
use crate::tree::{MediaItem, MediaTree};
use orradio::RadioStation;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// Playback states exposed to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    None,
    Connecting,
    Buffering,
    Playing,
    Paused,
    Stopped,
    SkippingToNext,
    SkippingToPrevious,
    Error,
}

impl PlaybackState {
    /// Playback is running or about to
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            PlaybackState::Connecting
                | PlaybackState::Buffering
                | PlaybackState::Playing
                | PlaybackState::SkippingToNext
                | PlaybackState::SkippingToPrevious
        )
    }
}

/// Why playback was paused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PauseReason {
    User,
    AudioFocusLoss,
    BecomingNoisy,
    SleepTimer,
}

/// Commands accepted from media clients
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    Play,
    Pause,
    Stop,
    SkipToNext,
    SkipToPrevious,
    PlayFromMediaId(String),
    ToggleFavorite,
}

/// Events reported by the audio player
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerEvent {
    Buffering,
    Ready,
    Ended,
    Error(String),
}

/// Audio output
///
/// Implementations report progress back through
/// [`PlaybackSession::on_player_event`].
pub trait Player: Send + Sync {
    fn prepare(&self, url: &str);
    fn play(&self);
    fn pause(&self);
    fn stop(&self);
    fn set_volume(&self, volume: f32);
}

/// Session changes broadcast to subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    StateChanged {
        state: PlaybackState,
        error: Option<String>,
    },
    MetadataChanged(Option<RadioStation>),
    QueueChanged {
        len: usize,
        index: Option<usize>,
    },
}

/// Volume applied while ducked
const DUCK_VOLUME: f32 = 0.2;

#[derive(Debug)]
struct SessionState {
    playback: PlaybackState,
    pause_reason: Option<PauseReason>,
    error: Option<String>,
    queue: Vec<RadioStation>,
    index: Option<usize>,
    /// Bumped on every start, pause and stop; a late resolution of an older
    /// start is dropped
    generation: u64,
    /// The player holds the stream of the current start
    prepared: bool,
}

/// Queue and playback state of the running service
pub struct PlaybackSession {
    player: Arc<dyn Player>,
    tree: Arc<MediaTree>,
    state: Mutex<SessionState>,
    events: broadcast::Sender<SessionEvent>,
}

impl std::fmt::Debug for PlaybackSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackSession")
            .field("state", &self.state.lock().unwrap())
            .finish()
    }
}

impl PlaybackSession {
    pub fn new(player: Arc<dyn Player>, tree: Arc<MediaTree>) -> Self {
        Self {
            player,
            tree,
            state: Mutex::new(SessionState {
                playback: PlaybackState::None,
                pause_reason: None,
                error: None,
                queue: Vec::new(),
                index: None,
                generation: 0,
                prepared: false,
            }),
            events: broadcast::channel(64).0,
        }
    }

    /// Receive session events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.state.lock().unwrap().playback
    }

    pub fn pause_reason(&self) -> Option<PauseReason> {
        self.state.lock().unwrap().pause_reason
    }

    pub fn error_message(&self) -> Option<String> {
        self.state.lock().unwrap().error.clone()
    }

    pub fn current_station(&self) -> Option<RadioStation> {
        let state = self.state.lock().unwrap();
        state.index.and_then(|i| state.queue.get(i).cloned())
    }

    pub fn queue(&self) -> Vec<RadioStation> {
        self.state.lock().unwrap().queue.clone()
    }

    pub fn queue_index(&self) -> Option<usize> {
        self.state.lock().unwrap().index
    }

    fn emit(&self, event: SessionEvent) {
        // No subscriber is not an error
        let _ = self.events.send(event);
    }

    fn set_state(&self, playback: PlaybackState, error: Option<String>) {
        {
            let mut state = self.state.lock().unwrap();
            if state.playback == playback && state.error == error {
                return;
            }
            state.playback = playback;
            state.error = error.clone();
            if playback != PlaybackState::Paused {
                state.pause_reason = None;
            }
        }
        tracing::debug!(?playback, ?error, "Playback state changed");
        self.emit(SessionEvent::StateChanged {
            state: playback,
            error,
        });
    }

    /// Replace the queue, `index` selects the current station
    pub fn set_queue(&self, queue: Vec<RadioStation>, index: Option<usize>) {
        let (len, index) = {
            let mut state = self.state.lock().unwrap();
            state.index = index.filter(|i| *i < queue.len());
            state.queue = queue;
            (state.queue.len(), state.index)
        };
        self.emit(SessionEvent::QueueChanged { len, index });
    }

    /// Use the playable items of a browse list as queue
    pub fn set_queue_from_items(&self, items: &[MediaItem], current_id: Option<&str>) {
        let queue = MediaTree::queue_from(items);
        let index = current_id.and_then(|id| queue.iter().position(|s| s.id == id));
        self.set_queue(queue, index);
    }

    /// Dispatch a client command
    pub async fn handle_action(&self, action: UserAction) -> Result<()> {
        tracing::debug!(?action, "User action");
        match action {
            UserAction::Play => self.play().await,
            UserAction::Pause => {
                self.pause(PauseReason::User);
                Ok(())
            }
            UserAction::Stop => {
                self.stop();
                Ok(())
            }
            UserAction::SkipToNext => self.skip_to_next().await,
            UserAction::SkipToPrevious => self.skip_to_previous().await,
            UserAction::PlayFromMediaId(id) => self.play_from_media_id(&id).await,
            UserAction::ToggleFavorite => self.toggle_favorite().map(|_| ()),
        }
    }

    /// Play the station `media_id`
    ///
    /// A station of the current queue becomes the current entry; any other
    /// station is looked up and replaces the queue.
    pub async fn play_from_media_id(&self, media_id: &str) -> Result<()> {
        let position = {
            let state = self.state.lock().unwrap();
            state.queue.iter().position(|s| s.id == media_id)
        };

        match position {
            Some(index) => {
                self.state.lock().unwrap().index = Some(index);
                let len = self.state.lock().unwrap().queue.len();
                self.emit(SessionEvent::QueueChanged {
                    len,
                    index: Some(index),
                });
            }
            None => {
                let station = self
                    .tree
                    .station(media_id)
                    .await?
                    .ok_or_else(|| Error::StationNotFound(media_id.to_string()))?;
                self.set_queue(vec![station], Some(0));
            }
        }
        self.start_current().await
    }

    /// Replay the last known station, if any
    pub async fn play_last_known(&self) -> Result<bool> {
        let Some(station) = self.tree.store().last_known()? else {
            return Ok(false);
        };
        let id = station.id.clone();
        if self.queue().iter().all(|s| s.id != id) {
            self.set_queue(vec![station], Some(0));
        }
        self.play_from_media_id(&id).await?;
        Ok(true)
    }

    async fn start_current(&self) -> Result<()> {
        let (station, generation) = {
            let mut state = self.state.lock().unwrap();
            let station = state
                .index
                .and_then(|i| state.queue.get(i).cloned())
                .ok_or(Error::EmptyQueue)?;
            state.generation += 1;
            state.prepared = false;
            (station, state.generation)
        };

        self.player.stop();
        self.set_state(PlaybackState::Connecting, None);
        self.emit(SessionEvent::MetadataChanged(Some(station.clone())));
        tracing::info!(station = %station.name, "Starting playback");

        let url = match self.tree.directory().resolve_stream_url(&station).await {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(station = %station.name, error = %e, "Cannot resolve stream");
                if self.is_current_generation(generation) {
                    self.set_state(PlaybackState::Error, Some(e.to_string()));
                }
                return Err(e.into());
            }
        };

        {
            let mut state = self.state.lock().unwrap();
            if state.generation != generation {
                tracing::debug!(station = %station.name, "Start superseded");
                return Ok(());
            }
            state.prepared = true;
        }

        self.player.prepare(&url);
        self.player.play();
        self.record_played(&station).await;
        Ok(())
    }

    fn is_current_generation(&self, generation: u64) -> bool {
        self.state.lock().unwrap().generation == generation
    }

    async fn record_played(&self, station: &RadioStation) {
        let store = self.tree.store();
        if let Err(e) = store.add_recent(station) {
            tracing::warn!(error = %e, "Failed to record recent station");
        }
        if let Err(e) = store.set_last_known(station) {
            tracing::warn!(error = %e, "Failed to record last known station");
        }
        if !station.is_local {
            if let Err(e) = self.tree.directory().register_click(&station.id).await {
                tracing::debug!(error = %e, "Click not registered");
            }
        }
    }

    /// Feed a player event into the state machine
    pub fn on_player_event(&self, event: PlayerEvent) {
        let current = self.playback_state();
        match event {
            PlayerEvent::Buffering if current.is_active() => {
                self.set_state(PlaybackState::Buffering, None)
            }
            PlayerEvent::Ready if current.is_active() => {
                self.set_state(PlaybackState::Playing, None)
            }
            PlayerEvent::Ended if current.is_active() => {
                self.set_state(PlaybackState::Stopped, None)
            }
            PlayerEvent::Error(message) => {
                tracing::warn!(error = %message, "Player error");
                self.set_state(PlaybackState::Error, Some(message));
            }
            other => tracing::trace!(?other, ?current, "Ignored player event"),
        }
    }

    /// Resume, or start the current station
    ///
    /// A pause that interrupted a start restarts the station.
    pub async fn play(&self) -> Result<()> {
        let prepared = self.state.lock().unwrap().prepared;
        match self.playback_state() {
            PlaybackState::Paused if prepared => {
                self.player.play();
                self.set_state(PlaybackState::Playing, None);
                Ok(())
            }
            state if state.is_active() => Ok(()),
            _ => self.start_current().await,
        }
    }

    /// Pause an active playback
    ///
    /// A pending start is abandoned. When already paused, any reason but
    /// `AudioFocusLoss` replaces the current one.
    pub fn pause(&self, reason: PauseReason) {
        match self.playback_state() {
            PlaybackState::Paused => {
                if reason != PauseReason::AudioFocusLoss {
                    self.state.lock().unwrap().pause_reason = Some(reason);
                    tracing::debug!(?reason, "Pause reason replaced");
                }
                return;
            }
            state if !state.is_active() => return,
            _ => {}
        }
        self.player.pause();
        {
            let mut state = self.state.lock().unwrap();
            state.generation += 1;
            state.pause_reason = Some(reason);
        }
        self.set_state(PlaybackState::Paused, None);
        tracing::debug!(?reason, "Paused");
    }

    pub fn stop(&self) {
        if self.playback_state() == PlaybackState::Stopped {
            return;
        }
        {
            let mut state = self.state.lock().unwrap();
            state.generation += 1;
            state.prepared = false;
        }
        self.player.stop();
        self.set_state(PlaybackState::Stopped, None);
    }

    pub async fn skip_to_next(&self) -> Result<()> {
        self.skip(1, PlaybackState::SkippingToNext).await
    }

    pub async fn skip_to_previous(&self) -> Result<()> {
        self.skip(-1, PlaybackState::SkippingToPrevious).await
    }

    async fn skip(&self, step: isize, transition: PlaybackState) -> Result<()> {
        let (len, index) = {
            let mut state = self.state.lock().unwrap();
            let len = state.queue.len();
            if len == 0 {
                return Err(Error::EmptyQueue);
            }
            let current = state.index.unwrap_or(0) as isize;
            let index = (current + step).rem_euclid(len as isize) as usize;
            state.index = Some(index);
            (len, index)
        };
        self.set_state(transition, None);
        self.emit(SessionEvent::QueueChanged {
            len,
            index: Some(index),
        });
        self.start_current().await
    }

    /// Audio focus lost: pause, remembering to resume on focus gain
    pub fn on_audio_focus_lost(&self) {
        self.pause(PauseReason::AudioFocusLoss);
    }

    /// Another app plays briefly: lower the volume
    pub fn on_audio_focus_duck(&self) {
        if self.playback_state() == PlaybackState::Playing {
            self.player.set_volume(DUCK_VOLUME);
        }
    }

    /// Audio focus back: resume only a pause caused by focus loss
    pub async fn on_audio_focus_gained(&self) -> Result<()> {
        self.player.set_volume(1.0);
        let resume = self.playback_state() == PlaybackState::Paused
            && self.pause_reason() == Some(PauseReason::AudioFocusLoss);
        if resume {
            self.play().await?;
        }
        Ok(())
    }

    /// Headphones unplugged
    pub fn on_becoming_noisy(&self) {
        self.pause(PauseReason::BecomingNoisy);
    }

    /// Sleep timer expired
    pub fn on_sleep_timer_expired(&self) {
        tracing::info!("Sleep timer expired");
        self.pause(PauseReason::SleepTimer);
    }

    /// Toggle the favorite state of the current station
    ///
    /// Returns the new state.
    pub fn toggle_favorite(&self) -> Result<bool> {
        let station = self.current_station().ok_or(Error::EmptyQueue)?;
        let favorite = self.tree.store().toggle_favorite(&station)?;

        let updated = {
            let mut state = self.state.lock().unwrap();
            for queued in state.queue.iter_mut().filter(|s| s.id == station.id) {
                queued.is_favorite = favorite;
            }
            state.index.and_then(|i| state.queue.get(i).cloned())
        };
        self.emit(SessionEvent::MetadataChanged(updated));
        Ok(favorite)
    }
}
