use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::record::{extract_fund_records, FundRecord};
use crate::section::split_sections;

/// The literal prefix of every statement file name
pub const STATEMENT_PREFIX: &str = "portfolio_";
/// The extension of every statement file
pub const STATEMENT_EXTENSION: &str = "csv";

const FILE_DATE_FORMAT: &str = "%Y%m%d";
const DISPLAY_DATE_FORMAT: &str = "%Y/%m/%d";

/// Possible errors to occur while locating or reading statements
#[derive(Debug, thiserror::Error)]
pub enum StatementError {
    #[error("Failed to read `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("The file name of `{}` does not encode a statement date", path.display())]
    InvalidFileName { path: PathBuf },
    #[error("`{value}` in the file name of `{}` is not a valid date", path.display())]
    InvalidDate { path: PathBuf, value: String },
}

/// A dated statement export on disk
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatementFile {
    path: PathBuf,
    date: NaiveDate,
}

impl StatementFile {
    /// Derives the statement date from a `portfolio_YYYYMMDD.csv` file name
    ///
    /// A name that carries the prefix but no valid date is an error, since the
    /// records of the file could not be attributed to any date.
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self, StatementError> {
        let path = path.into();
        let value = match statement_stem(&path) {
            Some(stem) => stem.strip_prefix(STATEMENT_PREFIX).unwrap_or(stem),
            None => return Err(StatementError::InvalidFileName { path }),
        };

        match parse_statement_date(value) {
            Some(date) => Ok(Self { path, date }),
            None => {
                let value = value.to_owned();
                Err(StatementError::InvalidDate { path, value })
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The date encoded in the file name
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Reads the statement and extracts its fund records
    pub fn read_records(&self) -> Result<Vec<FundRecord>, StatementError> {
        let contents = std::fs::read_to_string(&self.path)
            .map_err(|source| StatementError::Io { path: self.path.clone(), source })?;

        let sections = split_sections(&contents);
        Ok(extract_fund_records(&sections, self.date))
    }
}

/// Lists all statements in a directory, ordered by date
///
/// Only files named `portfolio_*.csv` are considered. A directory without
/// statements yields an empty list.
pub fn locate_statements(dir: &Path) -> Result<Vec<StatementFile>, StatementError> {
    let io_error = |source| StatementError::Io { path: dir.to_owned(), source };

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_error)? {
        let entry = entry.map_err(io_error)?;
        let path = entry.path();
        if path.is_file() && statement_stem(&path).is_some() {
            paths.push(path);
        }
    }

    // the date part is zero padded, so the names sort chronologically
    paths.sort();
    paths.into_iter().map(StatementFile::from_path).collect()
}

/// Parses the `YYYYMMDD` date of a statement file name
pub fn parse_statement_date(value: &str) -> Option<NaiveDate> {
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(value, FILE_DATE_FORMAT).ok()
}

/// Formats a date the way it's shown in tables and charts, `YYYY/MM/DD`
pub fn format_date(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

/// The file stem, if the path follows the statement naming convention
fn statement_stem(path: &Path) -> Option<&str> {
    let extension = path.extension()?.to_str()?;
    let stem = path.file_stem()?.to_str()?;
    (extension == STATEMENT_EXTENSION && stem.starts_with(STATEMENT_PREFIX)).then(|| stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn touch(dir: &Path, name: &str, contents: &str) {
        std::fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn parses_dates() {
        assert_eq!(parse_statement_date("20240101"), Some(ymd(2024, 1, 1)));
        assert_eq!(parse_statement_date("19991231"), Some(ymd(1999, 12, 31)));
        assert_eq!(parse_statement_date("20240230"), None);
        assert_eq!(parse_statement_date("2024-1-1"), None);
        assert_eq!(parse_statement_date("+2024010"), None);
        assert_eq!(parse_statement_date("202401011"), None);
        assert_eq!(parse_statement_date(""), None);
    }

    #[test]
    fn formats_dates() {
        assert_eq!(format_date(ymd(2024, 2, 1)), "2024/02/01");
    }

    #[test]
    fn statement_file_from_path() {
        let file = StatementFile::from_path("data/portfolio_20240201.csv").unwrap();
        assert_eq!(file.date(), ymd(2024, 2, 1));
        assert_eq!(file.path(), Path::new("data/portfolio_20240201.csv"));
    }

    #[test]
    fn statement_file_with_invalid_date() {
        let error = StatementFile::from_path("data/portfolio_2024013.csv").unwrap_err();
        assert!(matches!(
            error,
            StatementError::InvalidDate { ref value, .. } if value == "2024013"
        ));
        assert!(error.to_string().contains("portfolio_2024013.csv"));
    }

    #[test]
    fn statement_file_with_foreign_name() {
        let error = StatementFile::from_path("data/summary.csv").unwrap_err();
        assert!(matches!(error, StatementError::InvalidFileName { .. }));
    }

    #[test]
    fn locates_statements_in_date_order() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "portfolio_20240201.csv", "");
        touch(dir.path(), "portfolio_20231231.csv", "");
        touch(dir.path(), "portfolio_20240101.csv", "");
        touch(dir.path(), "notes.txt", "");
        touch(dir.path(), "portfolio_20240301.txt", "");
        std::fs::create_dir(dir.path().join("portfolio_20240401.csv")).unwrap();

        let dates = locate_statements(dir.path())
            .unwrap()
            .iter()
            .map(StatementFile::date)
            .collect::<Vec<_>>();
        assert_eq!(dates, vec![ymd(2023, 12, 31), ymd(2024, 1, 1), ymd(2024, 2, 1)]);
    }

    #[test]
    fn empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(locate_statements(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let error = locate_statements(&missing).unwrap_err();
        assert!(matches!(error, StatementError::Io { ref path, .. } if path == &missing));
    }

    #[test]
    fn invalid_date_fails_the_whole_listing() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "portfolio_20240101.csv", "");
        touch(dir.path(), "portfolio_latest.csv", "");

        let error = locate_statements(dir.path()).unwrap_err();
        assert!(matches!(error, StatementError::InvalidDate { .. }));
    }

    #[test]
    fn reads_records() {
        let dir = tempfile::tempdir().unwrap();
        touch(
            dir.path(),
            "portfolio_20240101.csv",
            "投資信託（金額/特定預り）\nheader\nFund X,a,b,c,d,e,1000\n",
        );

        let file = StatementFile::from_path(dir.path().join("portfolio_20240101.csv")).unwrap();
        let records = file.read_records().unwrap();
        assert_eq!(records, vec![FundRecord::new(ymd(2024, 1, 1), "Fund X", 1000)]);
    }

    #[test]
    fn read_failure_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = StatementFile::from_path(dir.path().join("portfolio_20240101.csv")).unwrap();
        let error = file.read_records().unwrap_err();
        assert!(matches!(error, StatementError::Io { .. }));
        assert!(error.to_string().contains("portfolio_20240101.csv"));
    }
}
