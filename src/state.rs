//! Application state, provider channel types, and delta application.

use std::collections::{HashMap, VecDeque};
use std::time::SystemTime;

use crate::handicap::{handicap_options, normalize_to_half_bucket};
use crate::preview_fetch::PreviewData;
use crate::snapshot::{MatchRow, MatchView};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Board,
    Preview { match_id: String },
}

/// Filter settings are kept per view, like the original panel kept separate
/// session keys for the upcoming and finished tabs.
#[derive(Debug, Clone, Default)]
pub struct PanelFilter {
    /// Raw handicap needle as typed; empty means "show all".
    pub handicap_needle: String,
    /// Exact goal-line value, or `None` for all.
    pub goal_line: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub view: MatchView,
    pub selected: usize,
    pub upcoming: Vec<MatchRow>,
    pub finished: Vec<MatchRow>,
    pub upcoming_filter: PanelFilter,
    pub finished_filter: PanelFilter,
    pub filter_input: String,
    pub filter_input_active: bool,
    pub previews: HashMap<String, PreviewData>,
    pub preview_pending: Option<String>,
    pub snapshot_loaded_at: Option<SystemTime>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Board,
            view: MatchView::Upcoming,
            selected: 0,
            upcoming: Vec::with_capacity(64),
            finished: Vec::with_capacity(64),
            upcoming_filter: PanelFilter::default(),
            finished_filter: PanelFilter::default(),
            filter_input: String::new(),
            filter_input_active: false,
            previews: HashMap::with_capacity(16),
            preview_pending: None,
            snapshot_loaded_at: None,
            logs: VecDeque::with_capacity(200),
            help_overlay: false,
        }
    }

    pub fn rows(&self) -> &[MatchRow] {
        match self.view {
            MatchView::Upcoming => &self.upcoming,
            MatchView::Finished => &self.finished,
        }
    }

    pub fn filter(&self) -> &PanelFilter {
        match self.view {
            MatchView::Upcoming => &self.upcoming_filter,
            MatchView::Finished => &self.finished_filter,
        }
    }

    pub fn filter_mut(&mut self) -> &mut PanelFilter {
        match self.view {
            MatchView::Upcoming => &mut self.upcoming_filter,
            MatchView::Finished => &mut self.finished_filter,
        }
    }

    /// Indices into `rows()` surviving the active filters.
    ///
    /// A handicap needle that does not normalize filters nothing (the warning
    /// was already logged when the filter was applied).
    pub fn filtered_indices(&self) -> Vec<usize> {
        let filter = self.filter();
        let needle = filter.handicap_needle.trim();
        let bucket = if needle.is_empty() {
            None
        } else {
            normalize_to_half_bucket(Some(needle))
        };

        self.rows()
            .iter()
            .enumerate()
            .filter(|(_, row)| {
                if let Some(bucket) = &bucket {
                    if normalize_to_half_bucket(Some(&row.handicap)).as_ref() != Some(bucket) {
                        return false;
                    }
                }
                if let Some(goal_line) = &filter.goal_line {
                    if &row.goal_line != goal_line {
                        return false;
                    }
                }
                true
            })
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn filtered_rows(&self) -> Vec<&MatchRow> {
        self.filtered_indices()
            .into_iter()
            .filter_map(|idx| self.rows().get(idx))
            .collect()
    }

    pub fn selected_row(&self) -> Option<&MatchRow> {
        let indices = self.filtered_indices();
        indices
            .get(self.selected)
            .and_then(|idx| self.rows().get(*idx))
    }

    /// Distinct normalized handicap buckets available in the current view,
    /// sorted ascending by numeric value.
    pub fn handicap_options(&self) -> Vec<String> {
        handicap_options(self.rows().iter().map(|row| Some(row.handicap.as_str())))
    }

    /// Distinct raw goal-line values in the current view, sorted as text.
    pub fn goal_line_options(&self) -> Vec<String> {
        let mut options: Vec<String> = self.rows().iter().map(|row| row.goal_line.clone()).collect();
        options.sort();
        options.dedup();
        options
    }

    /// Applies a handicap needle. An unrecognizable needle is kept verbatim
    /// (it filters nothing) and logged, matching the original panel's
    /// warning-but-show-all behavior.
    pub fn apply_handicap_filter(&mut self, needle: &str) {
        let needle = needle.trim().to_string();
        if !needle.is_empty() && normalize_to_half_bucket(Some(&needle)).is_none() {
            self.push_log(format!("[WARN] Unrecognized handicap '{needle}'"));
        }
        self.filter_mut().handicap_needle = needle;
        self.selected = 0;
    }

    pub fn clear_handicap_filter(&mut self) {
        self.filter_mut().handicap_needle.clear();
        self.selected = 0;
    }

    /// Steps the goal-line filter through `None` and each available value.
    pub fn cycle_goal_line_filter(&mut self) {
        let options = self.goal_line_options();
        let filter = self.filter_mut();
        filter.goal_line = match &filter.goal_line {
            None => options.first().cloned(),
            Some(current) => options
                .iter()
                .position(|opt| opt == current)
                .and_then(|pos| options.get(pos + 1))
                .cloned(),
        };
        self.selected = 0;
    }

    pub fn toggle_view(&mut self) {
        self.view = match self.view {
            MatchView::Upcoming => MatchView::Finished,
            MatchView::Finished => MatchView::Upcoming,
        };
        self.selected = 0;
    }

    pub fn select_next(&mut self) {
        let total = self.filtered_indices().len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1) % total;
    }

    pub fn select_prev(&mut self) {
        let total = self.filtered_indices().len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        if self.selected == 0 {
            self.selected = total - 1;
        } else {
            self.selected -= 1;
        }
    }

    pub fn clamp_selection(&mut self) {
        let total = self.filtered_indices().len();
        if total == 0 {
            self.selected = 0;
        } else if self.selected >= total {
            self.selected = total - 1;
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    SetSnapshot {
        upcoming: Vec<MatchRow>,
        finished: Vec<MatchRow>,
    },
    SetPreview {
        id: String,
        preview: PreviewData,
    },
    PreviewFailed {
        id: String,
    },
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    ReloadSnapshot,
    FetchPreview { match_id: String },
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetSnapshot { upcoming, finished } => {
            state.upcoming = upcoming;
            state.finished = finished;
            state.snapshot_loaded_at = Some(SystemTime::now());
            state.clamp_selection();
            state.push_log(format!(
                "[INFO] Snapshot loaded ({} upcoming, {} finished)",
                state.upcoming.len(),
                state.finished.len()
            ));
        }
        Delta::SetPreview { id, preview } => {
            if state.preview_pending.as_deref() == Some(id.as_str()) {
                state.preview_pending = None;
            }
            state.previews.insert(id, preview);
        }
        Delta::PreviewFailed { id } => {
            if state.preview_pending.as_deref() == Some(id.as_str()) {
                state.preview_pending = None;
            }
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
