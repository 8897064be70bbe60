mod config;
mod db;
mod export;
mod logging;
mod models;
mod notepad;
mod notify;
mod store;
mod view;

use std::{collections::HashSet, fmt::Display, fs, path::PathBuf};

use chrono::Local;
use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};
use log::error;
use ratatui::{
    DefaultTerminal, Frame,
    buffer::Buffer,
    layout::{Constraint, Direction, Flex, Layout, Rect},
    style::{Color, Style, Stylize},
    symbols::border,
    text::{Line, Span, ToSpan},
    widgets::{Block, Clear, Paragraph, Row, Table, Wrap},
};
use tui_input::{Input, backend::crossterm::EventHandler};
use uuid::Uuid;

use crate::{
    config::Config,
    db::Database,
    models::{Category, Filter, Note, NoteDraft},
    notepad::Notepad,
    notify::{Notice, Notifier},
    store::NoteStore,
    view::ListView,
};

enum Screen {
    List,
    Form,
}

enum FocusedInput {
    Title,
    Description,
    Category,
}

struct App {
    notepad: Notepad<Database>,
    export_dir: PathBuf,
    current_screen: Screen,
    list_index: usize,
    expanded: HashSet<Uuid>,
    title_input: Input,
    description_input: Input,
    category: Option<Category>,
    focused_input: FocusedInput,
    status: Option<(Notice, String)>,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let config = Config::load()?;
    logging::init(&config.log_file, &config.log_level)?;

    if let Some(parent) = config.database.parent() {
        fs::create_dir_all(parent)?;
    }
    let db = Database::new(&config.database)?;
    let store = NoteStore::load(db);
    let mut app = App {
        notepad: Notepad::new(store, ListView::new(config.page_size)),
        export_dir: config.export_dir,
        current_screen: Screen::List,
        list_index: 0,
        expanded: HashSet::new(),
        title_input: Input::default(),
        description_input: Input::default(),
        category: None,
        focused_input: FocusedInput::Title,
        status: None,
    };
    ratatui::run(|t| app.run(t))?;

    Ok(())
}

struct Dialogs<'a> {
    terminal: &'a mut DefaultTerminal,
    backdrop: &'a Buffer,
    status: &'a mut Option<(Notice, String)>,
}

impl Notifier for Dialogs<'_> {
    fn ask(&mut self, question: &str) -> bool {
        let backdrop = self.backdrop;
        loop {
            if let Err(err) = self.terminal.draw(|f| render_confirm(f, backdrop, question)) {
                error!("could not draw confirmation: {err}");
                return false;
            }
            match crossterm::event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('y') | KeyCode::Char('Y') => return true,
                    KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => return false,
                    _ => {}
                },
                Ok(_) => {}
                Err(err) => {
                    error!("could not read confirmation: {err}");
                    return false;
                }
            }
        }
    }

    fn notify(&mut self, level: Notice, message: &str) {
        *self.status = Some((level, message.to_string()));
    }
}

impl App {
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> std::io::Result<()> {
        loop {
            let backdrop = terminal.draw(|f| self.draw(f))?.buffer.clone();
            let event = crossterm::event::read()?;

            let Event::Key(key) = event else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            self.status = None;

            match self.current_screen {
                Screen::List => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => {
                        return Ok(());
                    }
                    KeyCode::Char('j') | KeyCode::Down => self.select_next(),
                    KeyCode::Char('k') | KeyCode::Up => self.select_previous(),
                    KeyCode::Char('l') | KeyCode::Right => {
                        if self.notepad.next_page() {
                            self.list_index = 0;
                        }
                    }
                    KeyCode::Char('h') | KeyCode::Left => {
                        if self.notepad.previous_page() {
                            self.list_index = 0;
                        }
                    }
                    KeyCode::Char(c @ '1'..='9') => {
                        let page = c.to_digit(10).unwrap_or(1) as usize;
                        if self.notepad.set_page(page) {
                            self.list_index = 0;
                        }
                    }
                    KeyCode::Char('f') if self.notepad.controls_visible() => {
                        self.notepad.cycle_filter();
                        self.list_index = 0;
                    }
                    KeyCode::Char('0') => {
                        self.notepad.set_filter(Filter::All);
                        self.list_index = 0;
                    }
                    KeyCode::Char(' ') => self.toggle_description(),
                    KeyCode::Char('a') => {
                        self.notepad.cancel_edit();
                        self.reset_form();
                        self.current_screen = Screen::Form;
                    }
                    KeyCode::Enter | KeyCode::Char('e') => self.edit_selected(),
                    KeyCode::Char('d') => self.delete_selected(),
                    KeyCode::Char('c') if self.notepad.controls_visible() => {
                        self.clear_notes(terminal, &backdrop);
                    }
                    KeyCode::Char('x') if self.notepad.controls_visible() => {
                        self.export_notes(terminal, &backdrop);
                    }
                    _ => {}
                },
                Screen::Form => match (key.modifiers, key.code) {
                    (KeyModifiers::CONTROL, KeyCode::Char('s')) => {
                        self.save_note(terminal, &backdrop);
                    }
                    (_, KeyCode::Tab) => {
                        self.toggle_input();
                    }
                    (_, KeyCode::Esc) => {
                        self.notepad.cancel_edit();
                        self.current_screen = Screen::List;
                    }
                    _ => match self.focused_input {
                        FocusedInput::Title => {
                            self.title_input.handle_event(&event);
                        }
                        FocusedInput::Description => {
                            self.description_input.handle_event(&event);
                        }
                        FocusedInput::Category => match key.code {
                            KeyCode::Left | KeyCode::Char('h') => self.cycle_category(false),
                            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => {
                                self.cycle_category(true)
                            }
                            _ => {}
                        },
                    },
                },
            }
        }
    }

    fn draw(&self, frame: &mut Frame) {
        match self.current_screen {
            Screen::List => {
                self.render_list(frame);
            }
            Screen::Form => {
                self.render_form(frame);
            }
        }
    }

    fn render_form(&self, frame: &mut Frame) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(frame.area());

        let help_message = Line::from_iter([
            "Esc".bold().yellow(),
            " cancel, ".to_span(),
            "Ctrl+S".bold().yellow(),
            Span::raw(format!(" {}, ", self.notepad.submit_label().to_lowercase())),
            "Tab".bold().yellow(),
            " switch input focus, ".to_span(),
            "←/→".bold().yellow(),
            " pick category.".to_span(),
        ])
        .centered();

        let mut title_input =
            Paragraph::new(self.title_input.value()).style(Style::default().bold());
        let mut description_input = Paragraph::new(self.description_input.value());
        let category_line = Line::from_iter(Category::ALL.iter().flat_map(|c| {
            let label = format!(" {} ", c.label());
            let span = if Some(*c) == self.category {
                label.black().on_yellow()
            } else {
                label.into()
            };
            [span, " ".to_span()]
        }));

        let mut title_block =
            Block::bordered().title(format!("{} note · Title", self.notepad.submit_label()));
        let mut category_block = Block::bordered().title("Category");
        let mut description_block = Block::bordered().title("Description");

        match self.focused_input {
            FocusedInput::Title => {
                title_block = title_block.border_style(Style::new().yellow());
                let width = layout[0].width.max(3) - 3;
                let scroll = self.title_input.visual_scroll(width as usize);
                title_input = title_input.scroll((0, scroll as u16));

                let x = self.title_input.visual_cursor().max(scroll) - scroll + 1;
                frame.set_cursor_position((layout[0].x + x as u16, layout[0].y + 1));
            }
            FocusedInput::Description => {
                description_block = description_block.border_style(Style::new().yellow());
                let width = layout[2].width.max(3) - 3;
                let scroll = self.description_input.visual_scroll(width as usize);
                description_input = description_input.scroll((0, scroll as u16));

                let x = self.description_input.visual_cursor().max(scroll) - scroll + 1;
                frame.set_cursor_position((layout[2].x + x as u16, layout[2].y + 1));
            }
            FocusedInput::Category => {
                category_block = category_block.border_style(Style::new().yellow());
            }
        }

        frame.render_widget(title_input.block(title_block), layout[0]);
        frame.render_widget(Paragraph::new(category_line).block(category_block), layout[1]);
        frame.render_widget(description_input.block(description_block), layout[2]);
        frame.render_widget(self.status_line(), layout[3]);
        frame.render_widget(help_message, layout[4]);
    }

    fn render_list(&self, frame: &mut Frame) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(frame.area());

        frame.render_widget(self.status_line(), layout[3]);
        frame.render_widget(self.help_line(), layout[4]);

        if !self.notepad.controls_visible() {
            let empty = Paragraph::new("No notes yet. Press a to write one.")
                .centered()
                .block(Block::bordered().title("My Notes").border_set(border::THICK));
            frame.render_widget(empty, layout[1]);
            return;
        }

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Percentage(60), Constraint::Min(1)])
            .split(layout[1]);

        let page = self.notepad.page();
        let rows = page.rows.iter().enumerate().map(|(i, note)| {
            let row = Row::new(vec![
                note.date.with_timezone(&Local).format("%d/%m/%Y %H:%M").to_string(),
                note.title.clone(),
                note.preview(),
            ]);

            if i == self.list_index {
                row.black().on_white()
            } else {
                row
            }
        });
        let table = Table::new(
            rows,
            [
                Constraint::Length(16),
                Constraint::Percentage(35),
                Constraint::Fill(1),
            ],
        )
        .header(Row::new(vec!["Date", "Title", "Description"]).bold())
        .column_spacing(2)
        .block(
            Block::bordered()
                .title(format!(
                    "My Notes ({}/{})",
                    page.filtered,
                    self.notepad.store().len()
                ))
                .border_set(border::THICK),
        );

        let note_details = page
            .rows
            .get(self.list_index)
            .map(|note| self.note_details(note));

        frame.render_widget(self.filter_bar(), layout[0]);
        frame.render_widget(table, body[0]);
        frame.render_widget(note_details, body[1]);
        frame.render_widget(
            pagination_line(page.number, page.total_pages),
            layout[2],
        );
    }

    fn note_details(&self, note: &Note) -> Paragraph<'static> {
        let expanded = self.expanded.contains(&note.id);
        let description = if expanded {
            note.description.clone()
        } else {
            note.preview()
        };

        Paragraph::new(vec![
            Line::from(note.title.clone()).bold(),
            Line::from_iter([
                note.category.label().yellow(),
                "  ".to_span(),
                note.date
                    .with_timezone(&Local)
                    .format("%d/%m/%Y %I:%M %p")
                    .to_string()
                    .dim(),
            ]),
            Line::default(),
            Line::from(description),
            Line::default(),
            Line::from(if expanded { "Space: show less" } else { "Space: show more" }).dim(),
        ])
        .wrap(Wrap { trim: false })
        .block(Block::bordered())
    }

    fn filter_bar(&self) -> Line<'static> {
        let active = self.notepad.view().filter();
        let filters = std::iter::once(Filter::All).chain(Category::ALL.map(Filter::Category));
        Line::from_iter(filters.flat_map(|filter| {
            let label = format!(" {} ", filter.label());
            let span = if filter == active {
                label.black().on_cyan()
            } else {
                label.into()
            };
            [span, " ".to_span()]
        }))
    }

    fn status_line(&self) -> Line<'static> {
        let Some((level, message)) = &self.status else {
            return Line::default();
        };
        let color = match level {
            Notice::Info => Color::Cyan,
            Notice::Success => Color::Green,
            Notice::Warning => Color::Yellow,
            Notice::Error => Color::Red,
        };
        Line::from(message.clone()).style(Style::new().fg(color)).centered()
    }

    fn help_line(&self) -> Line<'static> {
        let mut spans = vec![
            "Esc/q".bold().yellow(),
            " exit, ".to_span(),
            "a".bold().yellow(),
            " add".to_span(),
        ];
        if self.notepad.controls_visible() {
            spans.extend([
                ", ".to_span(),
                "e".bold().yellow(),
                " edit, ".to_span(),
                "d".bold().red(),
                " delete, ".to_span(),
                "←/→".bold().yellow(),
                " page, ".to_span(),
                "f".bold().yellow(),
                " filter, ".to_span(),
                "x".bold().yellow(),
                " export, ".to_span(),
                "c".bold().red(),
                " clear all".to_span(),
            ]);
        }
        Line::from(spans).centered()
    }

    fn selected_id(&self) -> Option<Uuid> {
        self.notepad.page().rows.get(self.list_index).map(|n| n.id)
    }

    fn select_next(&mut self) {
        let rows = self.notepad.page().rows.len();
        if rows == 0 {
            return;
        }
        self.list_index = (self.list_index + 1) % rows;
    }

    fn select_previous(&mut self) {
        let rows = self.notepad.page().rows.len();
        if rows == 0 {
            return;
        }
        self.list_index = (self.list_index + rows - 1) % rows;
    }

    fn toggle_description(&mut self) {
        if let Some(id) = self.selected_id() {
            if !self.expanded.remove(&id) {
                self.expanded.insert(id);
            }
        }
    }

    fn edit_selected(&mut self) {
        let Some(draft) = self.selected_id().and_then(|id| self.notepad.begin_edit(id)) else {
            return;
        };
        self.title_input = self.title_input.clone().with_value(draft.title);
        self.description_input = self.description_input.clone().with_value(draft.description);
        self.category = draft.category;
        self.focused_input = FocusedInput::Title;
        self.current_screen = Screen::Form;
    }

    fn delete_selected(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        match self.notepad.delete(id) {
            Ok(()) => {
                self.expanded.remove(&id);
                let rows = self.notepad.page().rows.len();
                self.list_index = self.list_index.min(rows.saturating_sub(1));
            }
            Err(err) => self.report(err),
        }
    }

    fn save_note(&mut self, terminal: &mut DefaultTerminal, backdrop: &Buffer) {
        let draft = NoteDraft::new(
            self.title_input.value(),
            self.description_input.value(),
            self.category,
        );
        let mut dialogs = Dialogs {
            terminal,
            backdrop,
            status: &mut self.status,
        };

        match self.notepad.submit(&draft, &mut dialogs) {
            Ok(true) => {
                self.reset_form();
                self.list_index = 0;
                self.current_screen = Screen::List;
            }
            Ok(false) => {}
            Err(err) => self.report(err),
        }
    }

    fn clear_notes(&mut self, terminal: &mut DefaultTerminal, backdrop: &Buffer) {
        let mut dialogs = Dialogs {
            terminal,
            backdrop,
            status: &mut self.status,
        };

        match self.notepad.clear_all(&mut dialogs) {
            Ok(true) => {
                self.expanded.clear();
                self.list_index = 0;
            }
            Ok(false) => {}
            Err(err) => self.report(err),
        }
    }

    fn export_notes(&mut self, terminal: &mut DefaultTerminal, backdrop: &Buffer) {
        let mut dialogs = Dialogs {
            terminal,
            backdrop,
            status: &mut self.status,
        };

        match self
            .notepad
            .export(&self.export_dir, &Local::now(), &mut dialogs)
        {
            Ok(Some(path)) => {
                self.status = Some((Notice::Success, format!("Saved {}", path.display())));
            }
            Ok(None) => {}
            Err(err) => self.report(err),
        }
    }

    fn report(&mut self, err: impl Display) {
        error!("{err}");
        self.status = Some((Notice::Error, err.to_string()));
    }

    fn reset_form(&mut self) {
        self.title_input.reset();
        self.description_input.reset();
        self.category = None;
        self.focused_input = FocusedInput::Title;
    }

    fn cycle_category(&mut self, forward: bool) {
        self.category = Some(match (self.category, forward) {
            (None, true) => Category::ALL[0],
            (None, false) => Category::ALL[Category::ALL.len() - 1],
            (Some(c), true) => c.next(),
            (Some(c), false) => c.previous(),
        });
    }

    fn toggle_input(&mut self) {
        self.focused_input = match self.focused_input {
            FocusedInput::Title => FocusedInput::Description,
            FocusedInput::Description => FocusedInput::Category,
            FocusedInput::Category => FocusedInput::Title,
        };
    }
}

fn pagination_line(current: usize, total: usize) -> Line<'static> {
    Line::from_iter((1..=total).map(|k| {
        let label = format!(" {k} ");
        if k == current {
            label.bold().black().on_blue()
        } else {
            label.blue()
        }
    }))
    .centered()
}

fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let [area] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(area);
    area
}

fn render_confirm(frame: &mut Frame, backdrop: &Buffer, question: &str) {
    if backdrop.area == frame.area() {
        *frame.buffer_mut() = backdrop.clone();
    }

    let area = popup_area(frame.area(), 50, 7);
    let popup = Paragraph::new(vec![
        Line::from(question.to_string()),
        Line::default(),
        Line::from_iter([
            "y".bold().red(),
            " delete, ".to_span(),
            "n/Esc".bold().yellow(),
            " cancel".to_span(),
        ]),
    ])
    .centered()
    .wrap(Wrap { trim: true })
    .block(
        Block::bordered()
            .title("Are you sure?")
            .border_style(Style::new().red()),
    );

    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);
}
