use chrono::Utc;
use log::{info, warn};
use thiserror::Error;
use uuid::Uuid;

use crate::db::KeyValueStore;
use crate::models::{Category, Field, Note, NoteDraft};

pub const NOTES_KEY: &str = "notes";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("the {field} field is required")]
pub struct ValidationError {
    pub field: Field,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("no note with id {0}")]
    NotFound(Uuid),
    #[error("storage failure: {0}")]
    Storage(#[from] rusqlite::Error),
    #[error("could not serialize notes: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

struct Valid {
    title: String,
    description: String,
    category: Category,
}

fn validate(draft: &NoteDraft) -> std::result::Result<Valid, ValidationError> {
    let title = draft.title.trim();
    if title.is_empty() {
        return Err(ValidationError { field: Field::Title });
    }
    let description = draft.description.trim();
    if description.is_empty() {
        return Err(ValidationError {
            field: Field::Description,
        });
    }
    let category = draft.category.ok_or(ValidationError {
        field: Field::Category,
    })?;

    Ok(Valid {
        title: title.to_string(),
        description: description.to_string(),
        category,
    })
}

// The in-memory list only changes once the storage write succeeded.
pub struct NoteStore<S> {
    storage: S,
    notes: Vec<Note>,
}

impl<S: KeyValueStore> NoteStore<S> {
    pub fn load(storage: S) -> NoteStore<S> {
        let (notes, assigned) = read(&storage);
        info!("loaded {} notes", notes.len());
        let store = NoteStore { storage, notes };

        if assigned {
            info!("assigning ids to notes stored without one");
            if let Err(err) = store.save(&store.notes) {
                warn!("could not persist assigned ids: {err}");
            }
        }
        store
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn persisted(&self) -> Vec<Note> {
        read(&self.storage).0
    }

    pub fn save(&self, notes: &[Note]) -> Result<()> {
        let json = serde_json::to_string(notes)?;
        self.storage.set(NOTES_KEY, &json)?;
        Ok(())
    }

    pub fn add(&mut self, draft: &NoteDraft) -> Result<&Note> {
        let valid = validate(draft)?;
        let note = Note {
            id: Uuid::new_v4(),
            title: valid.title,
            description: valid.description,
            category: valid.category,
            date: Utc::now(),
        };
        info!("adding note {}", note.id);

        let mut next = Vec::with_capacity(self.notes.len() + 1);
        next.push(note);
        next.extend(self.notes.iter().cloned());
        self.commit(next)?;

        Ok(&self.notes[0])
    }

    pub fn update(&mut self, id: Uuid, draft: &NoteDraft) -> Result<&Note> {
        let valid = validate(draft)?;
        let index = self.index_of(id)?;
        info!("updating note {id}");

        let mut next = self.notes.clone();
        next[index] = Note {
            id,
            title: valid.title,
            description: valid.description,
            category: valid.category,
            date: Utc::now(),
        };
        self.commit(next)?;

        Ok(&self.notes[index])
    }

    pub fn remove(&mut self, id: Uuid) -> Result<Note> {
        let index = self.index_of(id)?;
        info!("removing note {id}");

        let mut next = self.notes.clone();
        let removed = next.remove(index);
        self.commit(next)?;

        Ok(removed)
    }

    pub fn clear(&mut self) -> Result<()> {
        info!("clearing {} notes", self.notes.len());
        self.commit(Vec::new())
    }

    fn index_of(&self, id: Uuid) -> Result<usize> {
        self.notes
            .iter()
            .position(|n| n.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    fn commit(&mut self, next: Vec<Note>) -> Result<()> {
        self.save(&next)?;
        self.notes = next;
        Ok(())
    }
}

// The flag is set when a note without an id was given one.
fn read(storage: &impl KeyValueStore) -> (Vec<Note>, bool) {
    let raw = match storage.get(NOTES_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return (Vec::new(), false),
        Err(err) => {
            warn!("could not read stored notes, starting empty: {err}");
            return (Vec::new(), false);
        }
    };

    // JSON `null` is treated like a missing key.
    let mut notes = match serde_json::from_str::<Option<Vec<Note>>>(&raw) {
        Ok(notes) => notes.unwrap_or_default(),
        Err(err) => {
            warn!("stored notes are malformed, starting empty: {err}");
            return (Vec::new(), false);
        }
    };

    let mut assigned = false;
    for note in notes.iter_mut().filter(|n| n.id.is_nil()) {
        note.id = Uuid::new_v4();
        assigned = true;
    }
    (notes, assigned)
}
