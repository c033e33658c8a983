use std::{
    fs::{self, File, OpenOptions},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use tracing::info;

use crate::ExportError;

/// A text file opened on first write and flushed after every row.
///
/// Nothing touches the filesystem until [`start`](Self::start) or
/// [`append`](Self::append) is called, so an exporter that is never due
/// leaves no file behind.
#[derive(Debug)]
pub(crate) struct LazySink {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl LazySink {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path, writer: None }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    /// Creates the file (and its folder), replacing any previous contents,
    /// and writes `header`.
    pub(crate) fn start(&mut self, header: &str) -> Result<(), ExportError> {
        let writer = self.writer.insert(BufWriter::new(create(&self.path)?));
        writeln!(writer, "{header}").map_err(|err| ExportError::io(&self.path, err))
    }

    /// Appends one line, opening an existing file for appending if needed.
    pub(crate) fn append(&mut self, line: &str) -> Result<(), ExportError> {
        if self.writer.is_none() {
            self.writer = Some(BufWriter::new(open_append(&self.path)?));
        }

        if let Some(writer) = &mut self.writer {
            writeln!(writer, "{line}")
                .and_then(|()| writer.flush())
                .map_err(|err| ExportError::io(&self.path, err))?;
        }
        Ok(())
    }
}

/// Formats a comma-separated row: `time` as is, then values in scientific
/// notation.
pub(crate) fn row(time: f64, values: impl IntoIterator<Item = f64>) -> String {
    values
        .into_iter()
        .fold(time.to_string(), |mut line, value| {
            line.push_str(&format!(",{value:e}"));
            line
        })
}

/// Writes `contents` to `path` in one go, replacing any previous file.
pub(crate) fn overwrite(path: &Path, contents: &str) -> Result<(), ExportError> {
    let mut writer = BufWriter::new(create(path)?);
    writer
        .write_all(contents.as_bytes())
        .and_then(|()| writer.flush())
        .map_err(|err| ExportError::io(path, err))
}

fn create(path: &Path) -> Result<File, ExportError> {
    create_folder(path)?;
    let file = File::create(path).map_err(|err| ExportError::io(path, err))?;
    info!(path = %path.display(), "created export file");
    Ok(file)
}

fn open_append(path: &Path) -> Result<File, ExportError> {
    create_folder(path)?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|err| ExportError::io(path, err))
}

fn create_folder(path: &Path) -> Result<(), ExportError> {
    if let Some(folder) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(folder).map_err(|err| ExportError::io(folder, err))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::tempdir;

    #[test]
    fn nothing_is_created_before_first_append() {
        let dir = tempdir().unwrap();
        let sink = LazySink::new(dir.path().join("nested/table.csv"));

        assert!(!sink.is_open());
        assert!(!sink.path().exists());
        assert!(!dir.path().join("nested").exists());
    }

    #[test]
    fn start_writes_header_then_rows_append() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/table.csv");
        let mut sink = LazySink::new(path.clone());

        sink.start("t(s),a").unwrap();
        sink.append("1,2").unwrap();
        sink.append("2,3").unwrap();

        assert!(sink.is_open());
        assert_eq!(fs::read_to_string(path).unwrap(), "t(s),a\n1,2\n2,3\n");
    }

    #[test]
    fn start_replaces_a_previous_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("table.csv");
        fs::write(&path, "stale\n").unwrap();

        let mut sink = LazySink::new(path.clone());
        sink.start("t(s),a").unwrap();
        sink.append("1,2").unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), "t(s),a\n1,2\n");
    }

    #[test]
    fn append_without_start_keeps_existing_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("table.csv");
        fs::write(&path, "t(s),a\n1,2\n").unwrap();

        let mut sink = LazySink::new(path.clone());
        sink.append("2,3").unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), "t(s),a\n1,2\n2,3\n");
    }

    #[test]
    fn rows_are_comma_separated() {
        assert_eq!(row(0.5, [1.0, 2.5e20]), "0.5,1e0,2.5e20");
        assert_eq!(row(1.0, []), "1");
    }

    #[test]
    fn overwrite_replaces_contents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("steady.txt");

        overwrite(&path, "first\n").unwrap();
        overwrite(&path, "second\n").unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), "second\n");
    }
}
