pub use self::{
    chart::{export_chart, ChartError, ChartLabels, ChartRenderer, HtmlChart, SvgChart},
    config::Config,
    engine::{ValuationEngine, ValuationError},
    record::{extract_fund_records, write_records_csv, FundRecord},
    section::{split_sections, Section},
    statement::{format_date, locate_statements, StatementError, StatementFile},
    table::FundTable,
};

pub mod chart;
mod config;
mod engine;
pub mod record;
pub mod section;
pub mod statement;
mod table;
