//! Dataset loading and the raw-row → `Record` parsing boundary.
//!
//! Nothing downstream of this module sees raw CSV strings.

use crate::model::Record;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{debug, info, warn};

const COLUMN_NAME: &str = "Country name";
const COLUMN_YEAR: &str = "Year";
const COLUMN_POPULATION: &str = "Population";

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("missing column `{0}` in CSV header")]
    MissingColumn(&'static str),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("dataset parse task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Where the CSV comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Url(String),
}

impl Source {
    pub fn parse(s: &str) -> Self {
        if s.starts_with("http://") || s.starts_with("https://") {
            Source::Url(s.to_string())
        } else {
            Source::File(PathBuf::from(s))
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::File(p) => write!(f, "{}", p.display()),
            Source::Url(u) => f.write_str(u),
        }
    }
}

/// One CSV row as it appears in the file.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRow {
    #[serde(rename = "Country name")]
    pub name: String,
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "Population")]
    pub population: String,
}

/// Write-once collection of records, in source order.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn from_records(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First and last year present, if any.
    pub fn years(&self) -> Option<(i32, i32)> {
        let first = self.records.iter().map(|r| r.year).min()?;
        let last = self.records.iter().map(|r| r.year).max()?;
        Some((first, last))
    }
}

/// Convert a raw row into a typed record. Rows that can never match a year are dropped.
pub fn parse_row(raw: RawRow) -> Option<Record> {
    let name = raw.name.trim();
    if name.is_empty() {
        return None;
    }
    let year = raw.year.trim().parse::<i32>().ok()?;
    Some(Record {
        name: name.to_string(),
        year,
        population: parse_population(&raw.population),
    })
}

/// Leading-integer read: optional whitespace and `+`, then digits. Anything else is 0.
pub fn parse_population(s: &str) -> u64 {
    let s = s.trim_start();
    let s = s.strip_prefix('+').unwrap_or(s);
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s[..end].parse::<u64>().unwrap_or(0)
}

/// Parse CSV bytes with a header row into a dataset.
pub fn parse_csv(bytes: &[u8]) -> Result<Dataset, DatasetError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(bytes);

    let headers = rdr.headers()?.clone();
    for column in [COLUMN_NAME, COLUMN_YEAR, COLUMN_POPULATION] {
        if !headers.iter().any(|h| h == column) {
            return Err(DatasetError::MissingColumn(column));
        }
    }

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for (line, row) in rdr.deserialize::<RawRow>().enumerate() {
        match row {
            Ok(raw) => match parse_row(raw) {
                Some(r) => records.push(r),
                None => skipped += 1,
            },
            Err(e) => {
                warn!(line = line + 2, error = %e, "skipping malformed CSV row");
                skipped += 1;
            }
        }
    }
    if skipped > 0 {
        debug!(skipped, "rows dropped at parse boundary");
    }
    Ok(Dataset::from_records(records))
}

/// Read and parse the dataset from a file or URL.
pub async fn load(source: &Source) -> Result<Dataset, DatasetError> {
    let bytes = match source {
        Source::File(path) => tokio::fs::read(path)
            .await
            .map_err(|source| DatasetError::Read {
                path: path.clone(),
                source,
            })?,
        Source::Url(url) => fetch(url).await?,
    };
    // CSV parsing is CPU-bound; keep it off the async workers.
    let dataset = tokio::task::spawn_blocking(move || parse_csv(&bytes)).await??;
    match dataset.years() {
        Some((first, last)) => {
            info!(%source, records = dataset.len(), first, last, "dataset loaded")
        }
        None => warn!(%source, "dataset has no usable rows"),
    }
    Ok(dataset)
}

async fn fetch(url: &str) -> Result<Vec<u8>, DatasetError> {
    let wrap = |source| DatasetError::Fetch {
        url: url.to_string(),
        source,
    };
    let resp = reqwest::get(url)
        .await
        .and_then(|r| r.error_for_status())
        .map_err(wrap)?;
    let body = resp.bytes().await.map_err(wrap)?;
    Ok(body.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "\
Country name,Year,Population,Population of children under the age of 1
World,1950,2500000000,1
China,1950,550000000,2
India,1950,370000000,3
\"Korea, South\",1950,20000000,4
World,1951,2540000000,5
";

    #[test]
    fn parses_header_and_rows_in_order() {
        let ds = parse_csv(SAMPLE.as_bytes()).unwrap();
        assert_eq!(
            ds.records(),
            &[
                Record::new("World", 1950, 2_500_000_000),
                Record::new("China", 1950, 550_000_000),
                Record::new("India", 1950, 370_000_000),
                Record::new("Korea, South", 1950, 20_000_000),
                Record::new("World", 1951, 2_540_000_000),
            ]
        );
        assert_eq!(ds.years(), Some((1950, 1951)));
    }

    #[test]
    fn missing_column_is_an_error() {
        let err = parse_csv(b"Country name,Year\nWorld,1950\n").unwrap_err();
        assert!(matches!(err, DatasetError::MissingColumn("Population")));
    }

    #[test]
    fn population_uses_leading_integer() {
        assert_eq!(parse_population("550000000"), 550_000_000);
        assert_eq!(parse_population(" 550000000.0"), 550_000_000);
        assert_eq!(parse_population("+12"), 12);
        assert_eq!(parse_population(""), 0);
        assert_eq!(parse_population("n/a"), 0);
        assert_eq!(parse_population("-5"), 0);
    }

    #[test]
    fn rows_without_year_or_name_are_dropped() {
        let raw = |name: &str, year: &str| RawRow {
            name: name.into(),
            year: year.into(),
            population: "1".into(),
        };
        assert_eq!(parse_row(raw("", "1950")), None);
        assert_eq!(parse_row(raw("China", "")), None);
        assert_eq!(parse_row(raw("China", "19x0")), None);
        assert_eq!(
            parse_row(raw(" China ", " 1950")),
            Some(Record::new("China", 1950, 1))
        );
    }

    #[test]
    fn unparsable_population_is_zero_not_dropped() {
        let ds = parse_csv(b"Country name,Year,Population\nChina,1950,unknown\n").unwrap();
        assert_eq!(ds.records(), &[Record::new("China", 1950, 0)]);
    }

    #[test]
    fn short_rows_are_skipped() {
        let ds =
            parse_csv(b"Country name,Year,Population\nChina,1950\nIndia,1950,370000000\n").unwrap();
        assert_eq!(ds.records(), &[Record::new("India", 1950, 370_000_000)]);
    }

    #[test]
    fn rows_with_invalid_utf8_are_skipped() {
        let body: &[u8] =
            b"Country name,Year,Population\nChina,1950,5\nCh\xffna,1950,7\nIndia,1950,3\n";
        let ds = parse_csv(body).unwrap();
        assert_eq!(
            ds.records(),
            &[Record::new("China", 1950, 5), Record::new("India", 1950, 3)]
        );
    }

    #[test]
    fn source_detects_urls() {
        assert_eq!(
            Source::parse("https://example.org/p.csv"),
            Source::Url("https://example.org/p.csv".into())
        );
        assert_eq!(
            Source::parse("data/p.csv"),
            Source::File(PathBuf::from("data/p.csv"))
        );
    }

    #[tokio::test]
    async fn missing_file_reports_path() {
        let src = Source::File(PathBuf::from("/nonexistent/population.csv"));
        let err = load(&src).await.unwrap_err();
        assert!(err.to_string().contains("/nonexistent/population.csv"));
    }
}
