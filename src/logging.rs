use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;

use env_logger::{Builder, Target};

pub fn init(path: &Path, filters: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    Builder::new()
        .parse_filters(filters)
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_secs()
        .try_init()
        .ok();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_log_file_and_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("notepad.log");
        init(&path, "debug").unwrap();
        assert!(path.exists());
    }
}
