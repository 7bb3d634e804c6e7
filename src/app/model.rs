//! The `App` model used by the TUI and the runtime loop.

use crate::engine::{EngineEvent, Notice, PlaybackState};
use crate::track::Track;

/// The main application model.
pub struct App {
    /// Latest published engine snapshot.
    pub state: PlaybackState,
    /// Selected row in the queue list.
    pub selected: usize,
    /// Keep the selection on the queue cursor.
    pub follow_playback: bool,
    pub notice: Option<Notice>,
    pub current_dir: Option<String>,
    pub metadata_window: bool,
}

impl App {
    /// Create a new `App` seeded with the engine's current snapshot.
    pub fn new(state: PlaybackState) -> Self {
        let mut app = Self {
            state,
            selected: 0,
            follow_playback: true,
            notice: None,
            current_dir: None,
            metadata_window: false,
        };
        app.sync_selection();
        app
    }

    /// Fold one engine event into the model.
    pub fn apply(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::StateChanged(state) => {
                self.state = state;
                self.sync_selection();
            }
            EngineEvent::Notice(notice) => self.notice = Some(notice),
        }
    }

    fn sync_selection(&mut self) {
        let len = self.state.queue.len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        if self.follow_playback {
            if let Some(c) = self.state.cursor {
                self.selected = c;
            }
        }
        self.selected = self.selected.min(len - 1);
    }

    pub fn has_tracks(&self) -> bool {
        !self.state.queue.is_empty()
    }

    pub fn selected_track(&self) -> Option<&Track> {
        self.state.queue.get(self.selected)
    }

    /// Move the selection down, wrapping at the end.
    pub fn next(&mut self) {
        let len = self.state.queue.len();
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    /// Move the selection up, wrapping at the start.
    pub fn prev(&mut self) {
        let len = self.state.queue.len();
        if len > 0 {
            self.selected = (self.selected + len - 1) % len;
        }
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.state.queue.len().saturating_sub(1);
    }

    /// Enable following playback (selection follows the queue cursor).
    pub fn follow_playback_on(&mut self) {
        self.follow_playback = true;
        self.sync_selection();
    }

    pub fn follow_playback_off(&mut self) {
        self.follow_playback = false;
    }

    pub fn set_current_dir(&mut self, dir: String) {
        self.current_dir = Some(dir);
    }

    pub fn toggle_metadata_window(&mut self) {
        self.metadata_window = !self.metadata_window;
    }

    /// Show a locally produced message (e.g. a rejected command).
    pub fn show_message(&mut self, message: impl Into<String>) {
        self.notice = Some(Notice {
            message: message.into(),
            track_id: None,
        });
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }
}
