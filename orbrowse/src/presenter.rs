//! Navigation state of a browsing client
//!
//! [`MediaPresenter`] keeps a stack of the node ids the client went through.
//! The top of the stack is the only node subscribed on the
//! [`BrowserConnection`]; loads that arrive for any other node are stale and
//! dropped. Scroll positions are saved when entering a child node and
//! restored on back navigation.
//!
//! [`TreeConnection`] is a [`BrowserConnection`] that loads children from a
//! [`MediaTree`] on the tokio runtime and posts them on a channel, to be fed
//! back into [`MediaPresenter::on_children_loaded`].

use crate::media_id::{self, MediaId};
use crate::session::{PlaybackState, SessionEvent};
use crate::tree::{MediaItem, MediaTree};
use orradio::RadioStation;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Transport towards the browse service
pub trait BrowserConnection: Send + Sync {
    /// Start receiving the children of `parent_id` (first page)
    fn subscribe(&self, parent_id: &str);

    /// Stop receiving the children of `parent_id`
    fn unsubscribe(&self, parent_id: &str);

    /// Ask for another page of `parent_id`
    fn request_page(&self, parent_id: &str, page: usize);
}

/// Receives what the presenter wants displayed
pub trait MediaPresenterListener: Send + Sync {
    /// Children of the current node; `page` 0 replaces the list, other
    /// pages are appended
    fn on_children(&self, parent_id: &str, page: usize, items: &[MediaItem]);

    /// A playable item was chosen
    fn on_play_request(&self, item: &MediaItem);

    fn on_playback_state(&self, _state: PlaybackState, _error: Option<&str>) {}

    fn on_metadata(&self, _station: Option<&RadioStation>) {}
}

/// What a click did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Entered a child node
    Navigated(String),
    /// Forwarded a play request
    PlayRequested(String),
    /// Marker or unknown item
    Ignored,
}

/// Navigation stack mirrored on a browser connection
pub struct MediaPresenter {
    connection: Arc<dyn BrowserConnection>,
    listener: Arc<dyn MediaPresenterListener>,
    stack: Vec<String>,
    scroll_positions: HashMap<String, usize>,
    loaded_pages: HashMap<String, usize>,
    pending_page: Option<usize>,
    ended: HashSet<String>,
}

impl MediaPresenter {
    pub fn new(
        connection: Arc<dyn BrowserConnection>,
        listener: Arc<dyn MediaPresenterListener>,
    ) -> Self {
        Self {
            connection,
            listener,
            stack: Vec::new(),
            scroll_positions: HashMap::new(),
            loaded_pages: HashMap::new(),
            pending_page: None,
            ended: HashSet::new(),
        }
    }

    /// Subscribe the root node; no-op when already started
    pub fn start(&mut self) {
        if self.stack.is_empty() {
            self.stack.push(media_id::ROOT.to_string());
            self.connection.subscribe(media_id::ROOT);
        }
    }

    /// Unsubscribe the current node and forget the navigation
    pub fn stop(&mut self) {
        if let Some(top) = self.stack.last() {
            self.connection.unsubscribe(top);
        }
        self.stack.clear();
        self.scroll_positions.clear();
        self.loaded_pages.clear();
        self.ended.clear();
        self.pending_page = None;
    }

    pub fn current_parent_id(&self) -> Option<&str> {
        self.stack.last().map(String::as_str)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn is_at_root(&self) -> bool {
        self.stack.len() <= 1
    }

    /// Handle a click on `item`, with the list scrolled to `scroll_position`
    pub fn handle_item_click(&mut self, item: &MediaItem, scroll_position: usize) -> ClickOutcome {
        if item.is_list_ended() {
            return ClickOutcome::Ignored;
        }
        if item.is_playable() {
            self.listener.on_play_request(item);
            return ClickOutcome::PlayRequested(item.id.clone());
        }
        if !item.media_id().is_browsable() {
            return ClickOutcome::Ignored;
        }
        self.enter(&item.id, scroll_position);
        ClickOutcome::Navigated(item.id.clone())
    }

    /// Open the search results for `query` on top of the current node
    pub fn open_search(&mut self, query: &str, scroll_position: usize) {
        let id = MediaId::Search(query.trim().to_string()).to_string();
        if self.current_parent_id() == Some(id.as_str()) {
            return;
        }
        self.enter(&id, scroll_position);
    }

    fn enter(&mut self, id: &str, scroll_position: usize) {
        if let Some(top) = self.stack.last().cloned() {
            self.scroll_positions.insert(top.clone(), scroll_position);
            self.connection.unsubscribe(&top);
        }
        self.stack.push(id.to_string());
        self.reset_paging(id);
        self.connection.subscribe(id);
        tracing::debug!(node = id, depth = self.stack.len(), "Entered node");
    }

    /// Go up one level
    ///
    /// Returns the scroll position to restore for the new current node, or
    /// `None` when already at the root.
    pub fn handle_back(&mut self) -> Option<usize> {
        if self.stack.len() <= 1 {
            return None;
        }
        if let Some(left) = self.stack.pop() {
            self.connection.unsubscribe(&left);
            self.loaded_pages.remove(&left);
            self.ended.remove(&left);
        }

        let top = self.stack.last()?.clone();
        self.reset_paging(&top);
        self.connection.subscribe(&top);
        Some(self.scroll_positions.remove(&top).unwrap_or(0))
    }

    fn reset_paging(&mut self, id: &str) {
        self.loaded_pages.remove(id);
        self.ended.remove(id);
        self.pending_page = None;
    }

    /// Deliver children loaded for `parent_id`
    ///
    /// Returns `false` when the load is stale: not for the current node, or
    /// a further page that was not requested since the node was entered.
    pub fn on_children_loaded(&mut self, parent_id: &str, page: usize, items: Vec<MediaItem>) -> bool {
        if self.current_parent_id() != Some(parent_id) {
            tracing::debug!(parent = parent_id, page, "Ignoring stale children");
            return false;
        }
        if page > 0 {
            if self.pending_page != Some(page) {
                tracing::debug!(parent = parent_id, page, "Ignoring unrequested page");
                return false;
            }
            self.pending_page = None;
        }

        let (markers, items): (Vec<MediaItem>, Vec<MediaItem>) =
            items.into_iter().partition(MediaItem::is_list_ended);
        if !markers.is_empty() {
            self.ended.insert(parent_id.to_string());
        }
        if !items.is_empty() || page == 0 {
            self.loaded_pages.insert(parent_id.to_string(), page);
            self.listener.on_children(parent_id, page, &items);
        }
        true
    }

    /// Ask for the next page of the current node
    ///
    /// Returns `false` when the node is not paginated, the list already
    /// ended, or a page is still loading.
    pub fn load_more(&mut self) -> bool {
        let Some(top) = self.stack.last().cloned() else {
            return false;
        };
        if !MediaId::parse(&top).is_paginated() || self.ended.contains(&top) {
            return false;
        }
        if self.pending_page.is_some() {
            return false;
        }
        let Some(loaded) = self.loaded_pages.get(&top).copied() else {
            return false;
        };

        let next = loaded + 1;
        self.pending_page = Some(next);
        self.connection.request_page(&top, next);
        true
    }

    /// Whether the current list reached its end
    pub fn is_list_ended(&self) -> bool {
        self.current_parent_id()
            .is_some_and(|top| self.ended.contains(top))
    }

    /// Forward a session event to the listener
    pub fn on_session_event(&self, event: &SessionEvent) {
        match event {
            SessionEvent::StateChanged { state, error } => {
                self.listener.on_playback_state(*state, error.as_deref())
            }
            SessionEvent::MetadataChanged(station) => self.listener.on_metadata(station.as_ref()),
            SessionEvent::QueueChanged { .. } => {}
        }
    }
}

/// Children delivered by a [`TreeConnection`]
#[derive(Debug)]
pub struct ChildrenLoaded {
    pub parent_id: String,
    pub page: usize,
    pub items: Vec<MediaItem>,
}

/// [`BrowserConnection`] loading from a [`MediaTree`] in background tasks
///
/// Must be used from within a tokio runtime. Failed loads are logged and
/// delivered as an empty first page.
pub struct TreeConnection {
    tree: Arc<MediaTree>,
    tx: mpsc::UnboundedSender<ChildrenLoaded>,
}

impl TreeConnection {
    /// Create the connection and the receiver of loaded children
    pub fn new(tree: Arc<MediaTree>) -> (Self, mpsc::UnboundedReceiver<ChildrenLoaded>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tree, tx }, rx)
    }

    fn load(&self, parent_id: &str, page: usize) {
        let tree = self.tree.clone();
        let tx = self.tx.clone();
        let parent_id = parent_id.to_string();
        tokio::spawn(async move {
            let items = match tree.children(&parent_id, page).await {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!(parent = %parent_id, page, error = %e, "Failed to load children");
                    if page == 0 {
                        Vec::new()
                    } else {
                        vec![MediaItem::list_ended()]
                    }
                }
            };
            // The receiver is gone when the client shut down
            let _ = tx.send(ChildrenLoaded {
                parent_id,
                page,
                items,
            });
        });
    }
}

impl BrowserConnection for TreeConnection {
    fn subscribe(&self, parent_id: &str) {
        self.load(parent_id, 0);
    }

    fn unsubscribe(&self, parent_id: &str) {
        tracing::trace!(parent = parent_id, "Unsubscribed");
    }

    fn request_page(&self, parent_id: &str, page: usize) {
        self.load(parent_id, page);
    }
}
