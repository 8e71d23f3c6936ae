//! Record stores
//!
//! A store supplies records to hydrate a registry and takes them back for
//! persistence. `load_all` yields records oldest first, ready to be inserted
//! at the head one by one. `persist_all` receives the registry's list order
//! (most recent first) and is responsible for keeping the oldest-first layout.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::csv::{format_line, parse_line, split_records, CsvOptions};
use crate::error::{RegistryError, Result};
use crate::layout::Layout;
use crate::record::Record;

/// Source and sink for registry records
pub trait RecordStore {
    /// Every stored record, oldest first
    fn load_all(&self) -> Result<Vec<Record>>;

    /// Replace the stored records with `records`, given most recent first
    fn persist_all(&mut self, records: &[Record]) -> Result<()>;
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<Record>,
}

impl MemoryStore {
    /// Create a store holding `records`, oldest first
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Stored records, oldest first
    pub fn records(&self) -> &[Record] {
        &self.records
    }
}

impl RecordStore for MemoryStore {
    fn load_all(&self) -> Result<Vec<Record>> {
        Ok(self.records.clone())
    }

    fn persist_all(&mut self, records: &[Record]) -> Result<()> {
        self.records = records.iter().rev().cloned().collect();
        Ok(())
    }
}

/// Flat CSV file with one record per line
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
    layout: Layout,
    options: CsvOptions,
}

impl CsvStore {
    /// Create a store for a file path. The file need not exist yet.
    pub fn new(path: impl AsRef<Path>, layout: Layout) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            layout,
            options: CsvOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CsvOptions) -> Self {
        self.options = options;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    fn parse_record(&self, line_no: usize, line: &str) -> Result<Record> {
        let csv_err = |message: String| RegistryError::Csv {
            line: line_no,
            message,
        };

        let fields = parse_line(line, &self.options)
            .ok_or_else(|| csv_err("malformed quoting".to_string()))?;
        let (id, rest) = fields
            .split_first()
            .ok_or_else(|| csv_err("empty row".to_string()))?;
        let (name, attributes) = rest
            .split_first()
            .ok_or_else(|| csv_err("missing name column".to_string()))?;

        let id = id
            .trim()
            .parse::<i64>()
            .map_err(|_| csv_err(format!("id '{}' is not a number", id.trim())))?;
        let raw: Vec<&str> = attributes.iter().map(String::as_str).collect();
        let attributes = self
            .layout
            .parse_fields(&raw)
            .map_err(|e| csv_err(e.to_string()))?;

        Ok(Record::with_attributes(id, name.trim(), attributes))
    }

    fn render_record(&self, record: &Record) -> String {
        let mut fields = vec![record.id().to_string(), record.name.clone()];
        fields.extend(record.attributes.iter().map(ToString::to_string));
        format_line(&fields, &self.options)
    }
}

impl RecordStore for CsvStore {
    fn load_all(&self) -> Result<Vec<Record>> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "no data file yet, starting empty");
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)?;
        let skip = usize::from(self.options.header);
        let mut records = Vec::new();
        for (line_no, row) in split_records(&content, &self.options).into_iter().skip(skip) {
            if row.trim().is_empty() {
                continue;
            }
            records.push(self.parse_record(line_no, &row)?);
        }

        debug!(path = %self.path.display(), count = records.len(), "loaded records");
        Ok(records)
    }

    fn persist_all(&mut self, records: &[Record]) -> Result<()> {
        let mut out = String::new();
        if self.options.header {
            out.push_str(&format_line(&self.layout.headers(), &self.options));
            out.push('\n');
        }
        for record in records.iter().rev() {
            out.push_str(&self.render_record(record));
            out.push('\n');
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, out)?;
        debug!(path = %self.path.display(), count = records.len(), "persisted records");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Field;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let store = CsvStore::new(dir.path().join("items.csv"), Layout::Item);
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_load_item_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("items.csv");
        fs::write(
            &path,
            "id,name,quantity,registered\n1,Laptop,5,01-05-2025\n\n2,\"Desk, oak\",1,29-02-2024\n",
        )
        .unwrap();

        let records = CsvStore::new(&path, Layout::Item).load_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id(), 1);
        assert_eq!(records[1].name, "Desk, oak");
        assert_eq!(records[1].attribute(0), Some(&Field::Int(1)));
    }

    #[test]
    fn test_bad_row_reports_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("items.csv");
        fs::write(&path, "id,name,quantity,registered\n1,Laptop,5,01-05-2025\nx,Pen,1,01-01-2024\n")
            .unwrap();

        let err = CsvStore::new(&path, Layout::Item).load_all().unwrap_err();
        assert!(matches!(err, RegistryError::Csv { line: 3, .. }));
    }

    #[test]
    fn test_persist_round_trip_keeps_file_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/doctors.csv");
        let mut store = CsvStore::new(&path, Layout::Doctor);

        // Most recent first, as a registry hands them over.
        let records = vec![
            Record::with_attributes(2, "Dr. B", vec![Field::Text("Surgery".into())]),
            Record::with_attributes(1, "Dr. A", vec![Field::Text("Pediatrics".into())]),
        ];
        store.persist_all(&records).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("id,name,specialization\n1,Dr. A,Pediatrics\n"));

        let loaded = store.load_all().unwrap();
        let ids: Vec<i64> = loaded.iter().map(Record::id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_multiline_name_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plain.csv");
        let mut store = CsvStore::new(&path, Layout::Plain);

        let records = vec![Record::new(2, "after"), Record::new(1, "line one\nline two")];
        store.persist_all(&records).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "id,name\n1,\"line one\nline two\"\n2,after\n"
        );

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded, vec![Record::new(1, "line one\nline two"), Record::new(2, "after")]);
    }

    #[test]
    fn test_unterminated_quote_reports_starting_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plain.csv");
        fs::write(&path, "id,name\n1,ok\n2,\"never closed\n3,next\n").unwrap();

        let err = CsvStore::new(&path, Layout::Plain).load_all().unwrap_err();
        assert!(matches!(err, RegistryError::Csv { line: 3, .. }));
    }

    #[test]
    fn test_headerless_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plain.csv");
        fs::write(&path, "7,Grace\n").unwrap();

        let options = CsvOptions {
            header: false,
            ..CsvOptions::default()
        };
        let records = CsvStore::new(&path, Layout::Plain)
            .with_options(options)
            .load_all()
            .unwrap();
        assert_eq!(records, vec![Record::new(7, "Grace")]);
    }
}
