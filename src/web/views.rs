// Page templates rendered with Askama

use crate::charts::Chart;
use crate::entry::{ActualForm, GuessForm, GuessRecord};
use askama::Template;

// ============================================================================
// Notices (flash-style messages shown above the page content)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Danger,
}

impl NoticeLevel {
    pub fn css_class(&self) -> &'static str {
        match self {
            NoticeLevel::Success => "notice-success",
            NoticeLevel::Info => "notice-info",
            NoticeLevel::Warning => "notice-warning",
            NoticeLevel::Danger => "notice-danger",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn error(err: impl std::fmt::Display) -> Self {
        Self::new(NoticeLevel::Danger, format!("Error: {}", err))
    }

    /// Notices carried across a redirect as `?notice=<code>`
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "submitted" => Some(Self::new(
                NoticeLevel::Success,
                "Entry submitted successfully!",
            )),
            "deleted" => Some(Self::new(NoticeLevel::Warning, "All entries deleted.")),
            _ => None,
        }
    }
}

// ============================================================================
// Pages
// ============================================================================

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeView {
    pub notice: Option<Notice>,
}

#[derive(Template)]
#[template(path = "new_entry.html")]
pub struct NewEntryView {
    pub notice: Option<Notice>,
    pub form: GuessForm,
}

#[derive(Template)]
#[template(path = "result_form.html")]
pub struct ResultFormView {
    pub notice: Option<Notice>,
    pub form: ActualForm,
}

pub struct RankRow {
    pub rank: usize,
    pub record: GuessRecord,
    pub score: String,
    pub is_winner: bool,
}

pub struct WinnerView {
    pub record: GuessRecord,
    pub score: String,
}

#[derive(Template)]
#[template(path = "result.html")]
pub struct ResultView {
    pub notice: Option<Notice>,
    pub winner: Option<WinnerView>,
    pub rows: Vec<RankRow>,
    pub charts: Vec<Chart>,
}

#[derive(Template)]
#[template(path = "entries.html")]
pub struct EntriesView {
    pub notice: Option<Notice>,
    pub entries: Vec<GuessRecord>,
}

pub fn format_score(score: f64) -> String {
    if score.is_finite() {
        format!("{:.2}", score)
    } else {
        "unscorable".to_string()
    }
}
