//! # Search State
//!
//! Query text and search-bar visibility of a settings screen.
//!
//! Closing the bar does not imply clearing the text: some screens clear it
//! on close and some keep it. The caller decides through
//! [`SearchState::close_bar`].

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Search bar state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SearchState {
    /// Current query text (kept while the bar is hidden unless cleared).
    pub query_text: String,

    /// Whether the search bar is shown.
    pub bar_visible: bool,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows the search bar.
    pub fn open_bar(&mut self) {
        self.bar_visible = true;
    }

    /// Hides the search bar, optionally clearing the query.
    ///
    /// Returns `true` if the query text changed.
    pub fn close_bar(&mut self, clear_text: bool) -> bool {
        self.bar_visible = false;
        if clear_text {
            self.clear_text()
        } else {
            false
        }
    }

    /// Replaces the query text.
    ///
    /// Returns `true` if the text actually changed.
    pub fn set_text(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        if self.query_text == text {
            return false;
        }
        self.query_text = text;
        true
    }

    /// Resets the query text to empty.
    ///
    /// Returns `true` if there was text to clear.
    pub fn clear_text(&mut self) -> bool {
        self.set_text(String::new())
    }

    /// Returns the query the repository should run (trimmed).
    pub fn effective_query(&self) -> &str {
        self.query_text.trim()
    }
}
