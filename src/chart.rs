use std::path::{Path, PathBuf};

use html_escape::encode_text;

use crate::statement::format_date;
use crate::FundTable;

/// The file name, without extension, of exported charts
pub const CHART_FILE_STEM: &str = "fund_distribution_over_time";

/// Segment colors, cycled through for the funds of a table
const PALETTE: [&str; 10] = [
    "#636efa", "#ef553b", "#00cc96", "#ab63fa", "#ffa15a",
    "#19d3f3", "#ff6692", "#b6e880", "#ff97ff", "#fecb52",
];

const WIDTH: f64 = 960.0;
const HEIGHT: f64 = 540.0;
const MARGIN_TOP: f64 = 60.0;
const MARGIN_RIGHT: f64 = 280.0;
const MARGIN_BOTTOM: f64 = 90.0;
const MARGIN_LEFT: f64 = 100.0;
const Y_TICKS: f64 = 5.0;

/// Possible errors to occur while exporting a chart
#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("Failed to write chart `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Renders a fund table into a document
///
/// Renderers only ever see the finished table, they don't know how it was built.
pub trait ChartRenderer {
    /// Renders the whole document
    fn render(&self, table: &FundTable) -> String;

    /// The file extension of rendered documents
    fn extension(&self) -> &str;
}

/// The labels of a stacked bar chart
#[derive(Clone, Debug)]
pub struct ChartLabels {
    pub title: String,
    pub x_axis: String,
    pub y_axis: String,
}

impl Default for ChartLabels {
    fn default() -> Self {
        Self {
            title: "Trend of Fund Valuation".to_owned(),
            x_axis: "Date".to_owned(),
            y_axis: "Fund Valuation (JPY)".to_owned(),
        }
    }
}

/// A stacked bar chart as a standalone SVG image
///
/// Each date is one bar, and every fund one segment of it. Positive values
/// stack upwards from zero, negative values downwards.
#[derive(Clone, Debug, Default)]
pub struct SvgChart {
    labels: ChartLabels,
}

impl SvgChart {
    pub fn new(labels: ChartLabels) -> Self {
        Self { labels }
    }
}

impl ChartRenderer for SvgChart {
    fn render(&self, table: &FundTable) -> String {
        let plot = Plot::new(table);
        let mut svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" \
             viewBox=\"0 0 {w} {h}\" font-family=\"sans-serif\" font-size=\"12\">\n\
             <rect width=\"{w}\" height=\"{h}\" fill=\"white\"/>\n",
            w = WIDTH,
            h = HEIGHT,
        );

        svg.push_str(&format!(
            "<text x=\"{}\" y=\"{}\" font-size=\"18\">{}</text>\n",
            MARGIN_LEFT,
            MARGIN_TOP / 2.0,
            encode_text(&self.labels.title),
        ));

        plot.grid(&mut svg);
        plot.bars(table, &mut svg);
        plot.x_labels(table, &mut svg);
        legend(table, &mut svg);

        svg.push_str(&format!(
            "<text x=\"{}\" y=\"{}\" text-anchor=\"middle\">{}</text>\n",
            MARGIN_LEFT + plot.width / 2.0,
            HEIGHT - 10.0,
            encode_text(&self.labels.x_axis),
        ));
        svg.push_str(&format!(
            "<text x=\"20\" y=\"{y}\" text-anchor=\"middle\" transform=\"rotate(-90 20 {y})\">{}</text>\n",
            encode_text(&self.labels.y_axis),
            y = MARGIN_TOP + plot.height / 2.0,
        ));

        svg.push_str("</svg>\n");
        svg
    }

    fn extension(&self) -> &str {
        "svg"
    }
}

/// An HTML page embedding the chart of another renderer
#[derive(Clone, Debug, Default)]
pub struct HtmlChart {
    svg: SvgChart,
}

impl HtmlChart {
    pub fn new(svg: SvgChart) -> Self {
        Self { svg }
    }
}

impl ChartRenderer for HtmlChart {
    fn render(&self, table: &FundTable) -> String {
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
             <title>{}</title>\n</head>\n<body>\n{}</body>\n</html>\n",
            encode_text(&self.svg.labels.title),
            self.svg.render(table),
        )
    }

    fn extension(&self) -> &str {
        "html"
    }
}

/// Renders the table and writes it to `<dir>/fund_distribution_over_time.<ext>`
///
/// The directory is created if it doesn't exist yet.
pub fn export_chart(
    renderer: &dyn ChartRenderer,
    table: &FundTable,
    dir: &Path,
) -> Result<PathBuf, ChartError> {
    std::fs::create_dir_all(dir)
        .map_err(|source| ChartError::Io { path: dir.to_owned(), source })?;

    let path = dir.join(format!("{}.{}", CHART_FILE_STEM, renderer.extension()));
    std::fs::write(&path, renderer.render(table))
        .map_err(|source| ChartError::Io { path: path.clone(), source })?;

    Ok(path)
}

/// The geometry of the plot area
struct Plot {
    width: f64,
    height: f64,
    y_min: f64,
    y_max: f64,
    y_step: f64,
}

impl Plot {
    fn new(table: &FundTable) -> Self {
        // sums over several funds may exceed the range of a single amount
        let (mut low, mut high) = (0i128, 0i128);
        for index in 0..table.dates().len() {
            let row = table.row(index).iter().map(|v| i128::from(*v));
            high = high.max(row.clone().filter(|v| *v > 0).sum());
            low = low.min(row.filter(|v| *v < 0).sum());
        }

        // amounts are whole numbers, so are the ticks
        let y_step = tick_step((high - low) as f64 / Y_TICKS).max(1.0);
        Self {
            width: WIDTH - MARGIN_LEFT - MARGIN_RIGHT,
            height: HEIGHT - MARGIN_TOP - MARGIN_BOTTOM,
            y_min: (low as f64 / y_step).floor() * y_step,
            y_max: ((high as f64 / y_step).ceil() * y_step).max(y_step),
            y_step,
        }
    }

    fn y(&self, value: f64) -> f64 {
        MARGIN_TOP + (self.y_max - value) / (self.y_max - self.y_min) * self.height
    }

    fn band(&self, table: &FundTable) -> f64 {
        self.width / table.dates().len().max(1) as f64
    }

    fn grid(&self, svg: &mut String) {
        let mut value = self.y_min;
        while value <= self.y_max + self.y_step / 2.0 {
            let y = self.y(value);
            svg.push_str(&format!(
                "<line x1=\"{x1}\" y1=\"{y:.1}\" x2=\"{x2}\" y2=\"{y:.1}\" stroke=\"{}\"/>\n\
                 <text x=\"{tx}\" y=\"{y:.1}\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
                if value == 0.0 { "#444444" } else { "#e5ecf6" },
                value,
                x1 = MARGIN_LEFT,
                x2 = MARGIN_LEFT + self.width,
                tx = MARGIN_LEFT - 8.0,
                y = y,
            ));
            value += self.y_step;
        }
    }

    fn bars(&self, table: &FundTable, svg: &mut String) {
        let band = self.band(table);
        let bar = band * 0.7;

        for (index, date) in table.dates().iter().enumerate() {
            let x = MARGIN_LEFT + band * index as f64 + (band - bar) / 2.0;
            let (mut up, mut down) = (0i128, 0i128);

            for (fund_index, (fund, &value)) in table.funds().iter().zip(table.row(index)).enumerate() {
                let (from, to) = match i128::from(value) {
                    0 => continue,
                    v if v > 0 => {
                        up += v;
                        (up - v, up)
                    }
                    v => {
                        down += v;
                        (down - v, down)
                    }
                };

                let (top, bottom) = (self.y(from.max(to) as f64), self.y(from.min(to) as f64));
                svg.push_str(&format!(
                    "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\">\
                     <title>{} {}: {}</title></rect>\n",
                    x,
                    top,
                    bar,
                    bottom - top,
                    color(fund_index),
                    format_date(*date),
                    encode_text(fund),
                    value,
                ));
            }
        }
    }

    fn x_labels(&self, table: &FundTable, svg: &mut String) {
        let band = self.band(table);
        let baseline = MARGIN_TOP + self.height + 16.0;

        for (index, date) in table.dates().iter().enumerate() {
            let x = MARGIN_LEFT + band * (index as f64 + 0.5);
            svg.push_str(&format!(
                "<text x=\"{x:.1}\" y=\"{y}\" text-anchor=\"end\" transform=\"rotate(-45 {x:.1} {y})\">{}</text>\n",
                format_date(*date),
                x = x,
                y = baseline,
            ));
        }
    }
}

fn legend(table: &FundTable, svg: &mut String) {
    let x = WIDTH - MARGIN_RIGHT + 20.0;
    for (index, fund) in table.funds().iter().enumerate() {
        let y = MARGIN_TOP + 20.0 * index as f64;
        svg.push_str(&format!(
            "<rect x=\"{}\" y=\"{}\" width=\"12\" height=\"12\" fill=\"{}\"/>\
             <text x=\"{}\" y=\"{}\">{}</text>\n",
            x,
            y,
            color(index),
            x + 18.0,
            y + 10.0,
            encode_text(fund),
        ));
    }
}

fn color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// The smallest of 1, 2 or 5 times a power of ten not below `raw`
fn tick_step(raw: f64) -> f64 {
    if raw <= 0.0 {
        return 1.0;
    }

    let magnitude = 10f64.powf(raw.log10().floor());
    [1.0, 2.0, 5.0, 10.0]
        .iter()
        .map(|factor| factor * magnitude)
        .find(|step| *step >= raw)
        .unwrap_or(10.0 * magnitude)
}
