use crate::models::{Filter, Note};

pub const DEFAULT_PAGE_SIZE: usize = 5;

#[derive(Debug)]
pub struct Page<'a> {
    pub rows: Vec<&'a Note>,
    pub number: usize,
    pub total_pages: usize,
    pub filtered: usize,
}

#[derive(Debug, Clone)]
pub struct ListView {
    filter: Filter,
    page: usize,
    page_size: usize,
}

impl Default for ListView {
    fn default() -> Self {
        ListView::new(DEFAULT_PAGE_SIZE)
    }
}

impl ListView {
    pub fn new(page_size: usize) -> ListView {
        ListView {
            filter: Filter::All,
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    #[cfg(test)]
    pub fn current_page(&self) -> usize {
        self.page
    }

    #[cfg(test)]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
        self.page = 1;
    }

    pub fn cycle_filter(&mut self) {
        self.set_filter(self.filter.next());
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }

    pub fn filtered<'a>(&self, notes: &'a [Note]) -> Vec<&'a Note> {
        notes.iter().filter(|n| self.filter.matches(n)).collect()
    }

    pub fn total_pages(&self, notes: &[Note]) -> usize {
        self.filtered(notes).len().div_ceil(self.page_size)
    }

    pub fn set_page(&mut self, notes: &[Note], k: usize) -> bool {
        if k >= 1 && k <= self.total_pages(notes) {
            self.page = k;
            true
        } else {
            false
        }
    }

    pub fn next_page(&mut self, notes: &[Note]) -> bool {
        self.set_page(notes, self.page + 1)
    }

    pub fn previous_page(&mut self, notes: &[Note]) -> bool {
        self.page > 1 && self.set_page(notes, self.page - 1)
    }

    pub fn clamp(&mut self, notes: &[Note]) {
        self.page = self.page.min(self.total_pages(notes)).max(1);
    }

    pub fn page<'a>(&self, notes: &'a [Note]) -> Page<'a> {
        let filtered = self.filtered(notes);
        let total_pages = filtered.len().div_ceil(self.page_size);
        let rows = filtered
            .iter()
            .skip((self.page - 1) * self.page_size)
            .take(self.page_size)
            .copied()
            .collect();

        Page {
            rows,
            number: self.page,
            total_pages,
            filtered: filtered.len(),
        }
    }
}

pub fn controls_visible(total: usize) -> bool {
    total > 0
}
