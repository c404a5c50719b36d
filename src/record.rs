use std::io;

use chrono::NaiveDate;

use crate::section::Section;
use crate::statement::format_date;

/// The title prefix of sections listing mutual fund holdings by amount
pub const FUND_SECTION_MARKER: &str = "投資信託（金額/";
/// The title suffix of summary sections
pub const TOTAL_SECTION_MARKER: &str = "合計";

/// The number of title and header lines preceding the rows of a fund section
const HEADER_LINES: usize = 2;
/// The column of a fund row holding the evaluation amount
const EVAL_AMOUNT_COLUMN: usize = 6;

/// The valuation of a single fund on one statement date
#[derive(Clone, Debug, serde::Serialize, PartialEq, Eq)]
pub struct FundRecord {
    #[serde(serialize_with = "serialize_date")]
    date: NaiveDate,
    #[serde(rename = "fund")]
    fund_name: String,
    eval_amount: i64,
}

impl FundRecord {
    pub fn new(date: NaiveDate, fund_name: impl Into<String>, eval_amount: i64) -> Self {
        Self {
            date,
            fund_name: fund_name.into(),
            eval_amount,
        }
    }

    /// The date of the statement this record was taken from
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn fund_name(&self) -> &str {
        &self.fund_name
    }

    /// The evaluation amount in whole currency units
    pub fn eval_amount(&self) -> i64 {
        self.eval_amount
    }
}

fn serialize_date<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where S: serde::Serializer
{
    serializer.serialize_str(&format_date(*date))
}

/// Whether the section lists individual fund holdings
///
/// Summary sections share the fund prefix, but end with the total marker
/// and would otherwise count every holding twice.
pub fn is_fund_section(section: &Section) -> bool {
    let title = section.title();
    title.starts_with(FUND_SECTION_MARKER) && !title.ends_with(TOTAL_SECTION_MARKER)
}

/// Parses one comma separated fund row
///
/// Returns `None` for rows with less than seven columns, or without an
/// integer evaluation amount.
pub fn parse_fund_row(row: &str, date: NaiveDate) -> Option<FundRecord> {
    let columns = row.split(',').collect::<Vec<_>>();
    let eval_amount = parse_amount(columns.get(EVAL_AMOUNT_COLUMN)?)?;

    Some(FundRecord::new(date, columns[0], eval_amount))
}

/// Parses an integer amount the way exports write them
///
/// Besides plain ASCII digits, this accepts full-width digits (`１２００`) and
/// single underscores between digits (`1_200`). Values outside of `i64` are
/// rejected.
pub fn parse_amount(field: &str) -> Option<i64> {
    let field = field.trim();
    let (sign, digits) = match field.strip_prefix('-') {
        Some(digits) => ("-", digits),
        None => ("", field.strip_prefix('+').unwrap_or(field)),
    };
    if digits.is_empty() || digits.starts_with('_') || digits.ends_with('_') || digits.contains("__") {
        return None;
    }

    let mut normalized = String::with_capacity(digits.len() + 1);
    normalized.push_str(sign);
    for c in digits.chars().filter(|c| *c != '_') {
        normalized.push(ascii_digit(c)?);
    }

    normalized.parse().ok()
}

fn ascii_digit(c: char) -> Option<char> {
    match c {
        '0'..='9' => Some(c),
        '０'..='９' => char::from_u32(c as u32 - '０' as u32 + '0' as u32),
        _ => None,
    }
}

/// Writes records as CSV with a `date,fund,eval_amount` header
///
/// The header is written even if there are no records.
pub fn write_records_csv<W: io::Write>(records: &[FundRecord], writer: W) -> csv::Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    writer.write_record(&["date", "fund", "eval_amount"])?;
    for record in records {
        writer.serialize(record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Extracts all fund records of one statement
///
/// Malformed rows are skipped without notice.
pub fn extract_fund_records(sections: &[Section], date: NaiveDate) -> Vec<FundRecord> {
    sections
        .iter()
        .filter(|section| is_fund_section(section))
        .flat_map(|section| section.lines().iter().skip(HEADER_LINES))
        .filter_map(|row| parse_fund_row(row, date))
        .collect()
}
