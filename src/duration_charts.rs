use crate::style::{draw_legend, draw_mesh, padded_range, spectral_palette, ChartStyle};
use anyhow::Result;
use plotters::prelude::*;
use scenario_analysis::dispatch::DURATION_SERIES;
use scenario_analysis::AnalysisReport;
use std::path::Path;

/// Individually sorted duration curves of the main generation types and
/// cross-border flows.
pub fn draw_duration_curves(report: &AnalysisReport, style: &ChartStyle, path: &Path) -> Result<()> {
    let series = report
        .duration
        .labelled(&DURATION_SERIES, style.language)?;
    let labels = style.labels();

    let root = BitMapBackend::new(path, style.size).into_drawing_area();
    root.fill(&WHITE)?;

    let hours = report.duration.hours();
    let y_range = padded_range(series.iter().flat_map(|s| [s.min(), s.max()]));

    let mut chart = ChartBuilder::on(&root)
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(0.0..hours.max(1) as f64, y_range)?;

    draw_mesh(&mut chart, style, labels.hours_of_year, labels.power_gw, None)?;

    for (curve, color) in series.iter().zip(spectral_palette(series.len())) {
        chart
            .draw_series(LineSeries::new(
                curve
                    .values
                    .iter()
                    .enumerate()
                    .filter(|(_, v)| v.is_finite())
                    .map(|(i, v)| (i as f64, *v)),
                color.stroke_width(style.line_width),
            ))?
            .label(curve.name.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(3)));
    }

    draw_legend(&mut chart, style)?;
    root.present()?;
    Ok(())
}
