use anyhow::Context;
use clap::Parser;

use fund_valuation::{
    export_chart, locate_statements, write_records_csv, ChartRenderer, Config, HtmlChart, SvgChart,
    ValuationEngine,
};

/// Aggregates dated portfolio statements into a fund valuation time series
///
/// The pivoted table, or with `--records` every single fund record, is
/// written to stdout as CSV.
#[derive(Debug, Parser)]
#[clap(version)]
struct Args {
    /// The directory holding the `portfolio_YYYYMMDD.csv` statements
    #[clap(long, default_value = "data")]
    data_dir: std::path::PathBuf,
    /// The directory the chart is written to
    #[clap(long, default_value = "graphs")]
    graph_dir: std::path::PathBuf,
    /// Print every fund record instead of the pivoted table
    #[clap(long)]
    records: bool,
    /// Don't render a chart
    #[clap(long)]
    no_chart: bool,
    /// Additionally write the chart as an HTML page
    #[clap(long)]
    html: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = Config::new(args.data_dir, args.graph_dir);

    let statements = locate_statements(&config.data_dir)?;
    let mut engine = ValuationEngine::new();

    for statement in &statements {
        engine.handle_statement(statement)?;
    }

    let table = engine.table();
    log::info!(
        "{} statements, {} funds over {} dates",
        statements.len(),
        table.funds().len(),
        table.dates().len(),
    );

    if args.records {
        write_records_csv(engine.records(), std::io::stdout())
            .context("Failed to write the fund records")?;
    } else {
        table
            .write_csv(std::io::stdout())
            .context("Failed to write the valuation table")?;
    }

    if !args.no_chart {
        let mut renderers: Vec<Box<dyn ChartRenderer>> = vec![Box::new(SvgChart::default())];
        if args.html {
            renderers.push(Box::new(HtmlChart::default()));
        }

        for renderer in &renderers {
            let path = export_chart(renderer.as_ref(), &table, &config.graph_dir)?;
            log::info!("chart written to {}", path.display());
        }
    }

    Ok(())
}
