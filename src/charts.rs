// 📊 Chart Renderer - one bar chart per attribute, winner highlighted
//
// Charts are SVG documents drawn with plotters. The web layer embeds them
// as base64 data URIs; the CLI writes them to disk.

use crate::entry::{days_between, parse_date, parse_number, ActualOutcome, GuessRecord};
use crate::error::{Result, TombolaError};
use base64::Engine;
use plotters::coord::ranged1d::SegmentValue;
use plotters::prelude::*;

const CHART_SIZE: (u32, u32) = (800, 480);

/// Largest magnitude drawn on the y axis. Bigger values are drawn at the
/// limit; near `f64::MAX` plotters never finishes laying out the axis.
const AXIS_LIMIT: f64 = 1e15;

const BAR_COLOR: RGBColor = RGBColor(70, 130, 180);
const WINNER_COLOR: RGBColor = RGBColor(220, 20, 60);
const ACTUAL_COLOR: RGBColor = RGBColor(34, 139, 34);

/// One rendered chart
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub title: String,
    /// File stem used when the chart is written to disk
    pub slug: &'static str,
    pub svg: String,
}

impl Chart {
    /// `data:` URI usable directly as an `<img src>`
    pub fn data_uri(&self) -> String {
        format!(
            "data:image/svg+xml;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(self.svg.as_bytes())
        )
    }
}

struct Bar {
    label: String,
    value: f64,
    highlighted: bool,
}

struct BarChart<'a> {
    title: &'a str,
    y_desc: &'a str,
    bars: Vec<Bar>,
    reference: f64,
}

/// Render the length, weight and date-offset charts, in that order.
///
/// `winner` is the winner's position in `entries`. Entries whose field does
/// not parse are left off that chart only. No entries gives no charts.
pub fn render_charts(
    entries: &[GuessRecord],
    actual: &ActualOutcome,
    winner: Option<usize>,
) -> Result<Vec<Chart>> {
    if entries.is_empty() {
        return Ok(Vec::new());
    }

    let bars = |value_of: &dyn Fn(&GuessRecord) -> Option<f64>| -> Vec<Bar> {
        entries
            .iter()
            .enumerate()
            .filter_map(|(i, entry)| {
                value_of(entry).map(|value| Bar {
                    label: entry.name.clone(),
                    value,
                    highlighted: winner == Some(i),
                })
            })
            .collect()
    };

    let length = BarChart {
        title: "Length (cm)",
        y_desc: "Length (cm)",
        bars: bars(&|e| parse_number("length", &e.length).ok()),
        reference: actual.length,
    };
    let weight = BarChart {
        title: "Weight (g)",
        y_desc: "Weight (g)",
        bars: bars(&|e| parse_number("weight", &e.weight).ok()),
        reference: actual.weight,
    };
    let date_offset = BarChart {
        title: "Date Difference (days)",
        y_desc: "Days from actual",
        bars: bars(&|e| {
            parse_date("date of birth", &e.date_of_birth)
                .ok()
                .map(|d| days_between(d, actual.date_of_birth) as f64)
        }),
        reference: 0.0,
    };

    Ok(vec![
        Chart {
            title: length.title.to_string(),
            slug: "length",
            svg: draw_bar_chart(&length)?,
        },
        Chart {
            title: weight.title.to_string(),
            slug: "weight",
            svg: draw_bar_chart(&weight)?,
        },
        Chart {
            title: date_offset.title.to_string(),
            slug: "date_offset",
            svg: draw_bar_chart(&date_offset)?,
        },
    ])
}

fn on_axis(value: f64) -> f64 {
    value.clamp(-AXIS_LIMIT, AXIS_LIMIT)
}

/// Y range covering zero, every bar and the reference line, with headroom
fn value_range(chart: &BarChart<'_>) -> (f64, f64) {
    let (low, high) = chart
        .bars
        .iter()
        .map(|b| b.value)
        .chain([0.0, chart.reference])
        .map(on_axis)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    let span = (high - low).max(1.0);
    let pad = span * 0.1;
    let low = if low < 0.0 { low - pad } else { low };
    (low, high + pad)
}

fn chart_err<E: std::fmt::Display>(e: E) -> TombolaError {
    TombolaError::Chart(e.to_string())
}

fn draw_bar_chart(data: &BarChart<'_>) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(chart_err)?;

        let (y_min, y_max) = value_range(data);
        // A chart whose bars were all skipped still gets one empty slot
        let slots = data.bars.len().max(1);
        let labels: Vec<&str> = data.bars.iter().map(|b| b.label.as_str()).collect();

        let mut chart = ChartBuilder::on(&root)
            .caption(data.title, ("sans-serif", 24))
            .margin(20)
            .set_label_area_size(LabelAreaPosition::Left, 70)
            .set_label_area_size(LabelAreaPosition::Bottom, 50)
            .build_cartesian_2d((0..slots).into_segmented(), y_min..y_max)
            .map_err(chart_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(slots)
            .x_label_formatter(&|v| match v {
                SegmentValue::CenterOf(i) => labels.get(*i).map(|s| s.to_string()).unwrap_or_default(),
                _ => String::new(),
            })
            .y_desc(data.y_desc)
            .y_label_formatter(&|v| format!("{:.0}", v))
            .draw()
            .map_err(chart_err)?;

        chart
            .draw_series(data.bars.iter().enumerate().map(|(i, bar)| {
                let color = if bar.highlighted { WINNER_COLOR } else { BAR_COLOR };
                let mut rect = Rectangle::new(
                    [
                        (SegmentValue::Exact(i), 0.0),
                        (SegmentValue::Exact(i + 1), on_axis(bar.value)),
                    ],
                    color.filled(),
                );
                rect.set_margin(0, 0, 8, 8);
                rect
            }))
            .map_err(chart_err)?;

        chart
            .draw_series(LineSeries::new(
                vec![
                    (SegmentValue::Exact(0), on_axis(data.reference)),
                    (SegmentValue::Last, on_axis(data.reference)),
                ],
                ACTUAL_COLOR.stroke_width(2),
            ))
            .map_err(chart_err)?
            .label("Actual")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], ACTUAL_COLOR.stroke_width(2)));

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .position(SeriesLabelPosition::UpperRight)
            .draw()
            .map_err(chart_err)?;

        root.present().map_err(chart_err)?;
    }

    Ok(svg)
}
