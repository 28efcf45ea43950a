use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::models::{MatchRecord, CSV_HEADER};

/// Destination for exported match rows
pub trait RecordSink {
    fn write_record(&mut self, record: &MatchRecord) -> Result<()>;
}

/// In-memory sink, handy for dry runs and tests
impl RecordSink for Vec<MatchRecord> {
    fn write_record(&mut self, record: &MatchRecord) -> Result<()> {
        self.push(record.clone());
        Ok(())
    }
}

/// Append-only CSV export
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl CsvSink<File> {
    /// Open `path` for appending, writing the header only if the file is new or empty
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .context("Failed to create output directory")?;
            }
        }

        let write_header = std::fs::metadata(path)
            .map(|meta| meta.len() == 0)
            .unwrap_or(true);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open output file {}", path.display()))?;

        let sink = Self::from_writer(file, write_header)?;

        info!(
            "Writing to {} ({})",
            path.display(),
            if write_header { "new file" } else { "appending" }
        );
        Ok(sink)
    }
}

impl<W: Write> CsvSink<W> {
    pub fn from_writer(writer: W, write_header: bool) -> Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);

        if write_header {
            writer
                .write_record(CSV_HEADER)
                .context("Failed to write CSV header")?;
            writer.flush().context("Failed to flush CSV header")?;
        }

        Ok(Self { writer })
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {}", e.error()))
    }
}

impl<W: Write> RecordSink for CsvSink<W> {
    fn write_record(&mut self, record: &MatchRecord) -> Result<()> {
        self.writer
            .write_record(record.to_row())
            .with_context(|| format!("Failed to write match {}", record.match_id))?;
        self.writer.flush().context("Failed to flush CSV output")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use chrono::NaiveDate;

    use super::*;

    fn record(match_id: i64, championship: &str) -> MatchRecord {
        MatchRecord {
            date: NaiveDate::from_ymd_opt(2022, 1, 2).unwrap(),
            championship: championship.to_string(),
            series_id: Some(10),
            map_number: Some(1),
            match_id,
            team1: "Team A".into(),
            team2: "Team B".into(),
            team1_heroes: vec!["Axe".into(); 5],
            team2_heroes: vec!["Io".into(); 5],
            winner: "Team A".into(),
            delta: -1.5,
            favored: "Team B".into(),
            odds: None,
            game_time: None,
        }
    }

    fn temp_path(name: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        std::env::temp_dir()
            .join(format!("hawk-export-{}-{}-{}", std::process::id(), nanos, name))
            .join("out.csv")
    }

    #[test]
    fn test_header_written_once_across_runs() {
        let path = temp_path("append");

        {
            let mut sink = CsvSink::open(&path).unwrap();
            sink.write_record(&record(1, "League")).unwrap();
        }
        {
            let mut sink = CsvSink::open(&path).unwrap();
            sink.write_record(&record(2, "League")).unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("date,championship,series_id"));
        assert!(lines[1].contains(",1,Team A,Team B,"));
        assert!(lines[2].contains(",2,Team A,Team B,"));
        assert_eq!(content.matches("hawk_match_id").count(), 1);

        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn test_fields_are_quoted_when_needed() {
        let mut sink = CsvSink::from_writer(Vec::new(), false).unwrap();
        sink.write_record(&record(7, "Cup, \"Finals\"")).unwrap();

        let out = String::from_utf8(sink.into_inner().unwrap()).unwrap();

        assert!(out.starts_with("2022-01-02,\"Cup, \"\"Finals\"\"\",10,1,7,"));
        assert!(out.contains(",Axe|Axe|Axe|Axe|Axe,"));
        assert!(out.contains(",-1.50,Team B,,,,\n"));
    }

    #[test]
    fn test_vec_sink_collects_records() {
        let mut sink: Vec<MatchRecord> = Vec::new();
        sink.write_record(&record(3, "League")).unwrap();
        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].match_id, 3);
    }
}
