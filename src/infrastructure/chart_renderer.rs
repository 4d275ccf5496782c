// SVG chart rendering with plotters
use crate::domain::resample::Granularity;
use crate::domain::view::HistogramBin;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use plotters::prelude::*;
use thiserror::Error;

pub const CHART_SIZE: (u32, u32) = (1000, 450);
const BAR_COLOR: RGBColor = RGBColor(99, 110, 250);
const LINE_COLOR: RGBColor = RGBColor(0, 123, 255);

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("chart drawing failed: {0}")]
    Drawing(String),
}

fn drawing<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Drawing(e.to_string())
}

/// Frequency bars over the bins, one rectangle per bin
pub fn histogram_svg(title: &str, parameter: &str, bins: &[HistogramBin]) -> Result<String, RenderError> {
    if bins.is_empty() {
        return empty_svg(title, parameter, "count");
    }

    // a single degenerate bin still needs some width on screen
    let widen = |b: &HistogramBin| {
        if b.lower == b.upper {
            (b.lower - 0.5, b.upper + 0.5)
        } else {
            (b.lower, b.upper)
        }
    };
    let xmin = bins.iter().map(|b| widen(b).0).fold(f64::INFINITY, f64::min);
    let xmax = bins.iter().map(|b| widen(b).1).fold(f64::NEG_INFINITY, f64::max);
    let ymax = bins.iter().map(|b| b.count).max().unwrap_or(1).max(1) as f64 * 1.1;

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(drawing)?;
        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 22))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(xmin..xmax, 0f64..ymax)
            .map_err(drawing)?;
        chart
            .configure_mesh()
            .light_line_style(&TRANSPARENT)
            .x_desc(parameter)
            .y_desc("count")
            .y_label_formatter(&|y: &f64| format!("{:.0}", y))
            .draw()
            .map_err(drawing)?;
        chart
            .draw_series(bins.iter().map(|b| {
                let (lower, upper) = widen(b);
                Rectangle::new([(lower, 0.0), (upper, b.count as f64)], BAR_COLOR.mix(0.8).filled())
            }))
            .map_err(drawing)?;
        root.present().map_err(drawing)?;
    }
    Ok(svg)
}

/// Line chart over bucket labels; the line breaks where a bucket has no mean
pub fn trend_svg(
    title: &str,
    parameter: &str,
    granularity: Granularity,
    points: &[(NaiveDate, Option<f64>)],
) -> Result<String, RenderError> {
    let present: Vec<(DateTime<Utc>, f64)> = points
        .iter()
        .filter_map(|(d, v)| v.map(|v| (at_midnight(*d), v)))
        .collect();
    if present.is_empty() {
        return empty_svg(title, "Timestamp", parameter);
    }

    let (first, last) = match (points.first(), points.last()) {
        (Some(first), Some(last)) => (at_midnight(first.0), at_midnight(last.0)),
        _ => return empty_svg(title, "Timestamp", parameter),
    };
    let xmargin = ((last - first) / 20).max(chrono::Duration::days(1));
    let xmin = first - xmargin;
    let xmax = last + xmargin;

    let ymin = present.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let ymax = present.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
    let yspan = if ymax > ymin { (ymax - ymin) / 10.0 } else { 1.0 };
    let ymin = ymin - yspan;
    let ymax = ymax + yspan;

    let xfmt = match granularity {
        Granularity::Monthly => "%Y-%m",
        Granularity::Daily | Granularity::Weekly => "%Y-%m-%d",
    };

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(drawing)?;
        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 22))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(xmin..xmax, ymin..ymax)
            .map_err(drawing)?;
        chart
            .configure_mesh()
            .light_line_style(&TRANSPARENT)
            .bold_line_style(RGBColor(220, 220, 220).stroke_width(1))
            .x_labels(10)
            .x_label_formatter(&|x: &DateTime<Utc>| x.format(xfmt).to_string())
            .y_label_formatter(&|y: &f64| format!("{:.2}", y))
            .x_desc("Timestamp")
            .y_desc(parameter)
            .draw()
            .map_err(drawing)?;

        for run in points.split(|(_, v)| v.is_none()) {
            if run.is_empty() {
                continue;
            }
            let line = LineSeries::new(
                run.iter()
                    .filter_map(|(d, v)| v.map(|v| (at_midnight(*d), v))),
                LINE_COLOR.stroke_width(2),
            );
            chart.draw_series(line).map_err(drawing)?;
        }
        chart
            .draw_series(
                present
                    .iter()
                    .map(|(x, y)| Circle::new((*x, *y), 3, LINE_COLOR.filled())),
            )
            .map_err(drawing)?;
        root.present().map_err(drawing)?;
    }
    Ok(svg)
}

/// Axes without data, shown when a dataset is absent or has no readings
fn empty_svg(title: &str, x_desc: &str, y_desc: &str) -> Result<String, RenderError> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(drawing)?;
        let mut chart = ChartBuilder::on(&root)
            .caption(format!("{} (no data)", title), ("sans-serif", 22))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(0f64..1f64, 0f64..1f64)
            .map_err(drawing)?;
        chart
            .configure_mesh()
            .light_line_style(&TRANSPARENT)
            .x_desc(x_desc)
            .y_desc(y_desc)
            .draw()
            .map_err(drawing)?;
        root.present().map_err(drawing)?;
    }
    Ok(svg)
}

fn at_midnight(date: NaiveDate) -> DateTime<Utc> {
    TimeZone::from_utc_datetime(&Utc, &date.and_time(NaiveTime::MIN))
}
