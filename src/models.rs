use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const PREVIEW_LEN: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Personal,
    Work,
    Study,
    Ideas,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Personal,
        Category::Work,
        Category::Study,
        Category::Ideas,
        Category::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Personal => "Personal",
            Category::Work => "Work",
            Category::Study => "Study",
            Category::Ideas => "Ideas",
            Category::Other => "Other",
        }
    }

    fn position(self) -> usize {
        Self::ALL.iter().position(|c| *c == self).unwrap_or(0)
    }

    pub fn next(self) -> Category {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Category {
        Self::ALL[(self.position() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    // Nil for records written before ids existed; the store assigns one.
    #[serde(default)]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub date: DateTime<Utc>,
}

impl Note {
    pub fn preview(&self) -> String {
        let head: String = self.description.chars().take(PREVIEW_LEN).collect();
        format!("{head}...")
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteDraft {
    pub title: String,
    pub description: String,
    pub category: Option<Category>,
}

impl NoteDraft {
    pub fn new(title: &str, description: &str, category: Option<Category>) -> NoteDraft {
        NoteDraft {
            title: title.to_string(),
            description: description.to_string(),
            category,
        }
    }
}

impl From<&Note> for NoteDraft {
    fn from(note: &Note) -> NoteDraft {
        NoteDraft {
            title: note.title.clone(),
            description: note.description.clone(),
            category: Some(note.category),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Description,
    Category,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Title => "title",
            Field::Description => "description",
            Field::Category => "category",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Category(Category),
}

impl Filter {
    pub fn matches(self, note: &Note) -> bool {
        match self {
            Filter::All => true,
            Filter::Category(category) => note.category == category,
        }
    }

    pub fn next(self) -> Filter {
        match self {
            Filter::All => Filter::Category(Category::ALL[0]),
            Filter::Category(c) if c == Category::ALL[Category::ALL.len() - 1] => Filter::All,
            Filter::Category(c) => Filter::Category(c.next()),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Filter::All => "All",
            Filter::Category(c) => c.label(),
        }
    }
}
