use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cell_id::SheetId;
use crate::gantt::Gantt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sheet {
    pub id: SheetId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub gantt: Gantt,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Id and title only, for sheet tabs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetSummary {
    pub id: SheetId,
    pub title: String,
}

impl Sheet {
    /// A sheet with one head row and one body row, one placeholder cell each.
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_gantt(title, Gantt::new())
    }

    pub fn with_gantt(title: impl Into<String>, gantt: Gantt) -> Self {
        let now = Utc::now();
        Self {
            id: SheetId::generate(),
            title: title.into(),
            description: None,
            gantt,
            created_at: now,
            updated_at: now,
        }
    }

    /// Refresh `updated_at` after a mutation.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Deep copy under a new sheet id and new cell ids.
    pub fn duplicate(&self, title: impl Into<String>) -> Self {
        let mut gantt = self.gantt.clone();
        for cell in gantt.cells_mut() {
            *cell = cell.duplicate();
        }
        let mut copy = Self::with_gantt(title, gantt);
        copy.description = self.description.clone();
        copy
    }

    pub fn summary(&self) -> SheetSummary {
        SheetSummary {
            id: self.id.clone(),
            title: self.title.clone(),
        }
    }
}

/// Strip a trailing ` (N)` counter from a title.
pub fn strip_counter_suffix(title: &str) -> &str {
    let Some(inner) = title.strip_suffix(')') else {
        return title;
    };
    match inner.rfind(" (") {
        Some(pos) => {
            let digits = &inner[pos + 2..];
            if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
                &title[..pos]
            } else {
                title
            }
        }
        None => title,
    }
}

/// Title for a new sheet: `title` as-is when no existing title starts with
/// it, otherwise `title (N+1)` where N is the number of titles that do.
pub fn disambiguate_title<'a>(existing: impl IntoIterator<Item = &'a str>, title: &str) -> String {
    let matches = existing.into_iter().filter(|t| t.starts_with(title)).count();
    if matches == 0 {
        title.to_string()
    } else {
        format!("{} ({})", title, matches + 1)
    }
}
