//! # orbrowse - Browse tree and playback session for OpenRadio
//!
//! This crate exposes the station catalog and the user's stations as a
//! tree of media items, and keeps the playback state of the service.
//!
//! - [`MediaTree`] builds the children of every node (favorites, local and
//!   recent stations, directory lists, search)
//! - [`MediaPresenter`] mirrors the navigation of a browsing client
//! - [`PlaybackSession`] owns the play queue and drives a [`Player`]
//! - [`SleepTimer`] pauses playback after a delay
//! - [`EqualizerState`] holds the equalizer settings
//!
//! ## Example
//!
//! ```no_run
//! use orbrowse::{MediaTree, media_id};
//! use orcache::InMemoryApiCache;
//! use orradio::{ApiServiceProvider, ModelLayer, RadioBrowserClient};
//! use orstorage::StationStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = ApiServiceProvider::new(
//!         RadioBrowserClient::new().await?,
//!         ModelLayer::default(),
//!         Arc::new(InMemoryApiCache::new()),
//!     );
//!     let store = Arc::new(StationStore::open_in_memory()?);
//!     let tree = MediaTree::new(Arc::new(provider), store);
//!
//!     for item in tree.children(media_id::ROOT, 0).await? {
//!         println!("{} ({})", item.title, item.id);
//!     }
//!     Ok(())
//! }
//! ```

pub mod equalizer;
pub mod error;
pub mod media_id;
pub mod presenter;
pub mod session;
pub mod sleep_timer;
pub mod tree;

pub use equalizer::{EqualizerPreset, EqualizerState};
#[cfg(feature = "orconfig")]
pub use equalizer::EqualizerConfigExt;
pub use error::{Error, Result};
pub use media_id::MediaId;
pub use presenter::{
    BrowserConnection, ChildrenLoaded, ClickOutcome, MediaPresenter, MediaPresenterListener,
    TreeConnection,
};
pub use session::{
    PauseReason, PlaybackSession, PlaybackState, Player, PlayerEvent, SessionEvent, UserAction,
};
pub use sleep_timer::SleepTimer;
pub use tree::{MediaItem, MediaItemKind, MediaTree};
