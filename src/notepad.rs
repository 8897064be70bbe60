use std::fmt::Display;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use log::{info, warn};
use uuid::Uuid;

use crate::db::KeyValueStore;
use crate::export::{self, ExportError};
use crate::models::{Filter, NoteDraft};
use crate::notify::{Notice, Notifier};
use crate::store::{self, NoteStore, StoreError};
use crate::view::{self, ListView, Page};

pub const CLEAR_QUESTION: &str = "This will delete all your notes! Are you sure?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    #[default]
    Idle,
    Editing(Uuid),
}

pub struct Notepad<S> {
    store: NoteStore<S>,
    view: ListView,
    edit: EditMode,
}

impl<S: KeyValueStore> Notepad<S> {
    pub fn new(store: NoteStore<S>, view: ListView) -> Notepad<S> {
        Notepad {
            store,
            view,
            edit: EditMode::Idle,
        }
    }

    pub fn store(&self) -> &NoteStore<S> {
        &self.store
    }

    pub fn view(&self) -> &ListView {
        &self.view
    }

    #[cfg(test)]
    pub fn edit_mode(&self) -> EditMode {
        self.edit
    }

    pub fn submit_label(&self) -> &'static str {
        match self.edit {
            EditMode::Idle => "Add",
            EditMode::Editing(_) => "Update",
        }
    }

    pub fn page(&self) -> Page<'_> {
        self.view.page(self.store.notes())
    }

    pub fn controls_visible(&self) -> bool {
        view::controls_visible(self.store.len())
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.view.set_filter(filter);
    }

    pub fn cycle_filter(&mut self) {
        self.view.cycle_filter();
    }

    pub fn set_page(&mut self, k: usize) -> bool {
        self.view.set_page(self.store.notes(), k)
    }

    pub fn next_page(&mut self) -> bool {
        self.view.next_page(self.store.notes())
    }

    pub fn previous_page(&mut self) -> bool {
        self.view.previous_page(self.store.notes())
    }

    pub fn begin_edit(&mut self, id: Uuid) -> Option<NoteDraft> {
        let draft = self.store.get(id).map(NoteDraft::from)?;
        self.edit = EditMode::Editing(id);
        Some(draft)
    }

    pub fn cancel_edit(&mut self) {
        self.edit = EditMode::Idle;
    }

    pub fn submit(&mut self, draft: &NoteDraft, notifier: &mut impl Notifier) -> store::Result<bool> {
        let result = match self.edit {
            EditMode::Idle => self.store.add(draft).map(|_| "Note added successfully."),
            EditMode::Editing(id) => self.store.update(id, draft).map(|_| "Note updated successfully."),
        };

        match result {
            Ok(message) => {
                self.edit = EditMode::Idle;
                self.view.reset();
                notifier.notify(Notice::Success, message);
                Ok(true)
            }
            Err(StoreError::Validation(err)) => {
                warn!("rejected note: {err}");
                notifier.notify(Notice::Warning, "All fields are required.");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    pub fn delete(&mut self, id: Uuid) -> store::Result<()> {
        self.store.remove(id)?;
        if self.edit == EditMode::Editing(id) {
            self.edit = EditMode::Idle;
        }
        self.view.clamp(self.store.notes());
        Ok(())
    }

    pub fn clear_all(&mut self, notifier: &mut impl Notifier) -> store::Result<bool> {
        if !notifier.ask(CLEAR_QUESTION) {
            info!("clear cancelled");
            return Ok(false);
        }

        self.store.clear()?;
        self.edit = EditMode::Idle;
        self.view.reset();
        notifier.notify(Notice::Success, "All notes have been deleted.");
        Ok(true)
    }

    pub fn export<Tz>(
        &self,
        dir: &Path,
        exported_at: &DateTime<Tz>,
        notifier: &mut impl Notifier,
    ) -> Result<Option<PathBuf>, ExportError>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        match export::render(&self.store.persisted(), exported_at) {
            Ok(text) => export::write(dir, &text).map(Some),
            Err(ExportError::Empty) => {
                notifier.notify(Notice::Info, "Nothing to export.");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::Category;
    use crate::notify::testing::Scripted;
    use chrono::Utc;

    fn notepad() -> Notepad<Database> {
        Notepad::new(
            NoteStore::load(Database::in_memory().unwrap()),
            ListView::default(),
        )
    }

    fn draft(title: &str, category: Category) -> NoteDraft {
        NoteDraft::new(title, "description", Some(category))
    }

    fn filled(n: usize) -> Notepad<Database> {
        let mut pad = notepad();
        let mut dialogs = Scripted::default();
        for i in 0..n {
            pad.submit(&draft(&format!("n{i}"), Category::Work), &mut dialogs)
                .unwrap();
        }
        pad
    }

    #[test]
    fn submit_adds_and_returns_to_first_page() {
        let mut pad = filled(7);
        assert!(pad.set_page(2));

        let mut dialogs = Scripted::default();
        assert!(pad.submit(&draft("new", Category::Ideas), &mut dialogs).unwrap());

        assert_eq!(pad.store().len(), 8);
        assert_eq!(pad.store().notes()[0].title, "new");
        assert_eq!(pad.view().current_page(), 1);
        assert_eq!(dialogs.last(), Some(Notice::Success));
    }

    #[test]
    fn invalid_submit_warns_and_changes_nothing() {
        let mut pad = filled(2);
        let id = pad.store().notes()[1].id;
        pad.begin_edit(id).unwrap();

        let mut dialogs = Scripted::default();
        let bad = NoteDraft::new("title", "   ", Some(Category::Work));
        assert!(!pad.submit(&bad, &mut dialogs).unwrap());

        assert_eq!(dialogs.last(), Some(Notice::Warning));
        assert_eq!(pad.store().notes()[1].title, "n0");
        assert_eq!(pad.edit_mode(), EditMode::Editing(id));
    }

    #[test]
    fn edit_updates_in_place_then_goes_idle() {
        let mut pad = filled(3);
        let id = pad.store().notes()[2].id;

        let form = pad.begin_edit(id).unwrap();
        assert_eq!(form.title, "n0");
        assert_eq!(pad.submit_label(), "Update");

        let mut dialogs = Scripted::default();
        pad.submit(&draft("edited", Category::Study), &mut dialogs).unwrap();

        assert_eq!(pad.store().len(), 3);
        assert_eq!(pad.store().notes()[2].id, id);
        assert_eq!(pad.store().notes()[2].title, "edited");
        assert_eq!(pad.edit_mode(), EditMode::Idle);
        assert_eq!(pad.submit_label(), "Add");
    }

    #[test]
    fn update_returns_to_first_page() {
        let mut pad = filled(7);
        assert!(pad.set_page(2));
        let id = pad.page().rows[0].id;
        pad.begin_edit(id).unwrap();

        let mut dialogs = Scripted::default();
        assert!(pad.submit(&draft("moved", Category::Work), &mut dialogs).unwrap());

        assert_eq!(pad.view().current_page(), 1);
        assert_eq!(pad.store().notes()[5].id, id);
        assert_eq!(pad.store().notes()[5].title, "moved");
    }

    #[test]
    fn new_edit_replaces_previous_target() {
        let mut pad = filled(2);
        let first = pad.store().notes()[0].id;
        let second = pad.store().notes()[1].id;

        pad.begin_edit(first);
        pad.begin_edit(second);
        assert_eq!(pad.edit_mode(), EditMode::Editing(second));
        assert!(pad.begin_edit(Uuid::new_v4()).is_none());
        assert_eq!(pad.edit_mode(), EditMode::Editing(second));
    }

    #[test]
    fn delete_keeps_page_and_leaves_edit_of_deleted_note() {
        let mut pad = filled(12);
        assert!(pad.set_page(2));
        let id = pad.page().rows[0].id;
        pad.begin_edit(id);

        pad.delete(id).unwrap();

        assert_eq!(pad.store().len(), 11);
        assert!(pad.store().get(id).is_none());
        assert_eq!(pad.view().current_page(), 2);
        assert_eq!(pad.edit_mode(), EditMode::Idle);
    }

    #[test]
    fn deleting_last_row_of_last_page_steps_back() {
        let mut pad = filled(6);
        assert!(pad.set_page(2));
        let id = pad.page().rows[0].id;
        pad.delete(id).unwrap();
        assert_eq!(pad.view().current_page(), 1);
    }

    #[test]
    fn clear_requires_confirmation() {
        let mut pad = filled(3);

        let mut declined = Scripted::answering(&[false]);
        assert!(!pad.clear_all(&mut declined).unwrap());
        assert_eq!(pad.store().len(), 3);
        assert_eq!(declined.questions, [CLEAR_QUESTION]);
        assert!(declined.notices.is_empty());

        let mut accepted = Scripted::answering(&[true]);
        assert!(pad.clear_all(&mut accepted).unwrap());
        assert!(pad.store().is_empty());
        assert!(pad.store().persisted().is_empty());
        assert!(!pad.controls_visible());
        assert_eq!(accepted.last(), Some(Notice::Success));
    }

    #[test]
    fn filter_with_no_matches_keeps_controls() {
        let mut pad = filled(3);
        pad.set_filter(Filter::Category(Category::Other));
        assert!(pad.page().rows.is_empty());
        assert!(pad.controls_visible());
    }

    #[test]
    fn export_of_empty_store_writes_nothing() {
        let pad = notepad();
        let dir = tempfile::tempdir().unwrap();
        let mut dialogs = Scripted::default();

        assert!(pad.export(dir.path(), &Utc::now(), &mut dialogs).unwrap().is_none());
        assert_eq!(dialogs.last(), Some(Notice::Info));
        assert!(!dir.path().join(export::EXPORT_FILE_NAME).exists());
    }

    #[test]
    fn export_ignores_filter_and_keeps_order() {
        let mut pad = notepad();
        let mut dialogs = Scripted::default();
        pad.submit(&draft("older", Category::Work), &mut dialogs).unwrap();
        pad.submit(&draft("newer", Category::Ideas), &mut dialogs).unwrap();
        pad.set_filter(Filter::Category(Category::Work));

        let dir = tempfile::tempdir().unwrap();
        let path = pad
            .export(dir.path(), &Utc::now(), &mut dialogs)
            .unwrap()
            .unwrap();

        let text = std::fs::read_to_string(path).unwrap();
        assert_eq!(text.matches("Title: ").count(), 2);
        let newer = text.find("Title: newer").unwrap();
        let older = text.find("Title: older").unwrap();
        assert!(newer < older);
    }
}
