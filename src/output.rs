use csv::WriterBuilder;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

// Sibling file the CSV is staged in before being renamed over `path`.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write `headers` followed by `rows`. The header line is written even when
/// there are no rows, and `path` only ever holds a complete file.
pub fn write_csv<T: Serialize>(path: &Path, headers: &[&str], rows: &[T]) -> Result<(), csv::Error> {
    let tmp = staging_path(path);
    let written: Result<(), csv::Error> = (|| {
        let mut wtr = WriterBuilder::new().has_headers(false).from_path(&tmp)?;
        wtr.write_record(headers)?;
        for r in rows {
            wtr.serialize(r)?;
        }
        wtr.flush()?;
        Ok(())
    })();
    let result = written.and_then(|()| Ok(fs::rename(&tmp, path)?));
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> io::Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    fs::write(path, s)
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Pair {
        a: u32,
        b: &'static str,
    }

    #[test]
    fn header_is_written_without_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        write_csv::<Pair>(&path, &["a", "b"], &[]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "a,b\n");
        assert!(!staging_path(&path).exists());
    }

    #[test]
    fn rows_follow_the_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pairs.csv");
        write_csv(&path, &["a", "b"], &[Pair { a: 1, b: "x, y" }]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "a,b\n1,\"x, y\"\n");
    }

    #[test]
    fn failed_write_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        assert!(write_csv::<Pair>(&path, &["a", "b"], &[]).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn failed_rename_removes_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("taken");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();
        assert!(write_csv::<Pair>(&path, &["a", "b"], &[]).is_err());
        assert!(!staging_path(&path).exists());
        assert!(path.join("keep").exists());
    }
}
