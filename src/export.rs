use std::fmt::Display;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Timelike};
use log::info;
use thiserror::Error;

use crate::models::Note;

pub const EXPORT_FILE_NAME: &str = "notas.txt";

const DATE_FORMAT: &str = "%d/%m/%Y %I:%M";
const HEADER_RULE: &str = "==============================";
const NOTE_RULE: &str = "-----------------------------";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("nothing to export")]
    Empty,
    #[error("could not write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub fn render<Tz>(notes: &[Note], exported_at: &DateTime<Tz>) -> Result<String, ExportError>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if notes.is_empty() {
        return Err(ExportError::Empty);
    }

    let tz = exported_at.timezone();
    let blocks: Vec<String> = notes
        .iter()
        .map(|note| {
            format!(
                "Title: {}\nContent: {}\nCategory: {}\nDate: {}\n{NOTE_RULE}",
                note.title,
                note.description,
                note.category,
                format_date(&note.date.with_timezone(&tz)),
            )
        })
        .collect();

    Ok(format!(
        "Notes exported on {}\n{HEADER_RULE}\n\n{}",
        format_date(exported_at),
        blocks.join("\n\n")
    ))
}

// 12-hour clock with a lowercase "a.m."/"p.m." suffix.
fn format_date<Tz>(date: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let suffix = if date.hour() < 12 { "a.m." } else { "p.m." };
    format!("{} {suffix}", date.format(DATE_FORMAT))
}

pub fn write(dir: &Path, contents: &str) -> Result<PathBuf, ExportError> {
    let path = dir.join(EXPORT_FILE_NAME);
    fs::create_dir_all(dir)
        .and_then(|_| fs::write(&path, contents))
        .map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;

    info!("exported notes to {}", path.display());
    Ok(path)
}
