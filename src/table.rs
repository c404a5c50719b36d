use std::io;

use chrono::NaiveDate;

use crate::statement::format_date;

/// The summed fund valuations, pivoted to one row per date and one column per fund
///
/// Every (date, fund) combination has a value; combinations without any
/// record are zero.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FundTable {
    /// Row keys, ascending
    dates: Vec<NaiveDate>,
    /// Column keys, ascending
    funds: Vec<String>,
    /// `values[row][column]`
    values: Vec<Vec<i64>>,
}

impl FundTable {
    /// Builds a table from sorted, distinct keys and a row-major value matrix
    pub(crate) fn new(dates: Vec<NaiveDate>, funds: Vec<String>, values: Vec<Vec<i64>>) -> Self {
        debug_assert_eq!(dates.len(), values.len());
        debug_assert!(values.iter().all(|row| row.len() == funds.len()));

        Self { dates, funds, values }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn funds(&self) -> &[String] {
        &self.funds
    }

    /// The values of one date, in the order of [`FundTable::funds`]
    pub fn row(&self, index: usize) -> &[i64] {
        &self.values[index]
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// The summed valuation of a fund on a date, zero if there is none
    pub fn get(&self, date: NaiveDate, fund: &str) -> i64 {
        let row = self.dates.binary_search(&date);
        let column = self.funds.binary_search_by(|f| f.as_str().cmp(fund));

        match (row, column) {
            (Ok(row), Ok(column)) => self.values[row][column],
            _ => 0,
        }
    }

    /// The valuation of one fund over all dates
    pub fn column(&self, fund: &str) -> Vec<i64> {
        self.dates.iter().map(|&date| self.get(date, fund)).collect()
    }

    /// The sum over all funds for each date
    ///
    /// Widened, since the sum of several amounts may not fit a single one.
    pub fn totals(&self) -> Vec<i128> {
        self.values
            .iter()
            .map(|row| row.iter().map(|v| i128::from(*v)).sum())
            .collect()
    }

    /// Writes the table as CSV, with a `date` column followed by one column per fund
    pub fn write_csv<W: io::Write>(&self, writer: W) -> csv::Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);

        writer.write_record(std::iter::once("date").chain(self.funds.iter().map(String::as_str)))?;
        for (date, row) in self.dates.iter().zip(&self.values) {
            let mut record = Vec::with_capacity(row.len() + 1);
            record.push(format_date(*date));
            record.extend(row.iter().map(i64::to_string));
            writer.write_record(&record)?;
        }

        writer.flush()?;
        Ok(())
    }
}
