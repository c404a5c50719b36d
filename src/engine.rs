use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::{format_date, FundRecord, FundTable, StatementError, StatementFile};

/// Possible errors to occur while accumulating fund records
#[derive(Debug, thiserror::Error)]
pub enum ValuationError {
    #[error(transparent)]
    Statement(#[from] StatementError),
    #[error("The valuation of `{fund}` on {} exceeds the supported range", format_date(*date))]
    Overflow { date: NaiveDate, fund: String },
    #[error(
        "The valuation of `{fund}` on {} in `{}` exceeds the supported range",
        format_date(*date),
        path.display()
    )]
    StatementOverflow {
        path: PathBuf,
        date: NaiveDate,
        fund: String,
    },
}

/// The central valuation engine used for accumulating fund records
///
/// Records can be fed in any order, the resulting table only depends on the
/// set of records seen.
#[derive(Debug, Default)]
pub struct ValuationEngine {
    /// All records handled so far, in the order they were handled
    records: Vec<FundRecord>,
    /// The running sum of every (date, fund) pair
    totals: BTreeMap<(NaiveDate, String), i64>,
}

impl ValuationEngine {
    /// Creates a new, empty valuation engine
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            totals: BTreeMap::new(),
        }
    }

    /// All records handled so far
    pub fn records(&self) -> &[FundRecord] {
        &self.records
    }

    /// Adds one record to the running sums
    ///
    /// Multiple records for the same fund on the same date are summed up. A
    /// sum leaving the range of `i64` is rejected, and leaves the engine as
    /// it was before.
    pub fn handle_record(&mut self, record: FundRecord) -> Result<(), ValuationError> {
        let total = self.totals
            .entry((record.date(), record.fund_name().to_owned()))
            .or_insert(0);
        *total = total
            .checked_add(record.eval_amount())
            .ok_or_else(|| ValuationError::Overflow {
                date: record.date(),
                fund: record.fund_name().to_owned(),
            })?;

        self.records.push(record);
        Ok(())
    }

    /// Reads a statement file and adds all of its records
    ///
    /// Returns the number of records found in the statement.
    pub fn handle_statement(&mut self, statement: &StatementFile) -> Result<usize, ValuationError> {
        let records = statement.read_records()?;
        let count = records.len();
        log::debug!(
            "{}: {} fund records",
            statement.path().display(),
            count,
        );

        for record in records {
            self.handle_record(record).map_err(|error| match error {
                ValuationError::Overflow { date, fund } => ValuationError::StatementOverflow {
                    path: statement.path().to_owned(),
                    date,
                    fund,
                },
                error => error,
            })?;
        }

        Ok(count)
    }

    /// Pivots the accumulated sums into a date × fund table
    pub fn table(&self) -> FundTable {
        let dates = self.totals
            .keys()
            .map(|(date, _)| *date)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect::<Vec<_>>();
        let funds = self.totals
            .keys()
            .map(|(_, fund)| fund.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect::<Vec<_>>();

        let values = dates
            .iter()
            .map(|&date| {
                funds
                    .iter()
                    .map(|fund| {
                        self.totals
                            .get(&(date, fund.clone()))
                            .copied()
                            .unwrap_or(0)
                    })
                    .collect()
            })
            .collect();

        FundTable::new(dates, funds, values)
    }
}
