use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::filter::{Filterable, SortKey, SortValue};
use crate::models::Note;
use crate::scope::{EntityKind, Ownership, Scoped};
use crate::shape::{Shape, ShapeContext};

impl Scoped for Note {
    const KIND: EntityKind = EntityKind::Notes;

    fn ownership(&self) -> Ownership<'_> {
        Ownership::Personal
    }
}

/// Notes are personal, so every role gets the same summary of its own
/// workspace.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotesSummary {
    pub total: usize,
    pub favorites: usize,
    pub uncategorized: usize,
    pub by_folder: BTreeMap<Uuid, usize>,
    pub by_category: BTreeMap<String, usize>,
}

impl NotesSummary {
    fn of(notes: &[Note]) -> Self {
        let mut summary = NotesSummary {
            total: notes.len(),
            favorites: 0,
            uncategorized: 0,
            by_folder: BTreeMap::new(),
            by_category: BTreeMap::new(),
        };
        for note in notes {
            if note.is_favorite {
                summary.favorites += 1;
            }
            match note.folder_id {
                Some(folder) => *summary.by_folder.entry(folder).or_default() += 1,
                None => summary.uncategorized += 1,
            }
            *summary.by_category.entry(note.category.clone()).or_default() += 1;
        }
        summary
    }
}

impl Shape for Note {
    type Admin = NotesSummary;
    type Member = NotesSummary;

    fn admin_view(items: &[Self], _ctx: &ShapeContext<'_>) -> Self::Admin {
        NotesSummary::of(items)
    }

    fn member_view(items: &[Self], _ctx: &ShapeContext<'_>) -> Self::Member {
        NotesSummary::of(items)
    }
}

impl Filterable for Note {
    const SORT_KEYS: &'static [SortKey] = &[SortKey::Name, SortKey::Recent];

    fn category(&self) -> Option<&str> {
        Some(self.category.as_str())
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str(), self.content.as_str()];
        fields.extend(self.tags.iter().map(String::as_str));
        fields
    }

    fn folder(&self) -> Option<Option<Uuid>> {
        Some(self.folder_id)
    }

    fn favorite(&self) -> Option<bool> {
        Some(self.is_favorite)
    }

    fn date(&self) -> Option<NaiveDate> {
        Some(self.updated_at.date())
    }

    fn sort_value(&self, key: SortKey) -> Option<SortValue<'_>> {
        match key {
            SortKey::Name => Some(SortValue::Text(self.title.as_str())),
            SortKey::Recent => Some(SortValue::Time(Some(self.updated_at))),
            _ => None,
        }
    }
}
