use crate::style::{draw_legend, draw_mesh, padded_range, ChartStyle, GGPLOT_CYCLE};
use anyhow::Result;
use plotters::prelude::*;
use scenario_analysis::analysis::PRICE_COLUMNS;
use scenario_analysis::AnalysisReport;
use std::path::Path;

/// Fundamental and regression price over the first `hours` hours, or the
/// whole run when `hours` is `None`.
pub fn draw_price_series(
    report: &AnalysisReport,
    style: &ChartStyle,
    path: &Path,
    hours: Option<usize>,
) -> Result<()> {
    let prices = match hours {
        Some(hours) => report.prices.slice_rows(0..hours),
        None => report.prices.clone(),
    };
    let labels = style.labels();

    let root = BitMapBackend::new(path, style.size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut columns = Vec::with_capacity(PRICE_COLUMNS.len());
    for name in PRICE_COLUMNS {
        columns.push((name, prices.column(name)?));
    }
    let y_range = padded_range(columns.iter().flat_map(|(_, values)| values.iter().copied()));

    let mut chart = ChartBuilder::on(&root)
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(0.0..prices.height().max(1) as f64, y_range)?;

    draw_mesh(&mut chart, style, labels.hours, labels.price, None)?;

    for ((name, values), color) in columns.into_iter().zip(GGPLOT_CYCLE) {
        chart
            .draw_series(LineSeries::new(
                values
                    .iter()
                    .enumerate()
                    .filter(|(_, v)| v.is_finite())
                    .map(|(i, v)| (i as f64, *v)),
                color.stroke_width(style.line_width),
            ))?
            .label(name)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(3)));
    }

    draw_legend(&mut chart, style)?;
    root.present()?;
    Ok(())
}

/// Real price against residual load with the fitted polynomial in red.
pub fn draw_price_fit(report: &AnalysisReport, style: &ChartStyle, path: &Path) -> Result<()> {
    let regression = &report.regression;
    let scatter = regression.scatter();
    let curve = regression.curve();
    let labels = style.labels();

    let root = BitMapBackend::new(path, style.size).into_drawing_area();
    root.fill(&WHITE)?;

    let x_range = padded_range(scatter.iter().map(|(x, _)| *x));
    let y_range = padded_range(
        scatter
            .iter()
            .map(|(_, y)| *y)
            .chain(curve.iter().map(|(_, y)| *y)),
    );

    let mut chart = ChartBuilder::on(&root)
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(x_range, y_range)?;

    draw_mesh(&mut chart, style, labels.residual_load, labels.day_ahead_price, None)?;

    let point_color = GGPLOT_CYCLE[1];
    chart
        .draw_series(
            scatter
                .iter()
                .map(|(x, y)| Circle::new((*x, *y), 2, point_color.mix(0.6).filled())),
        )?
        .label("price_real")
        .legend(move |(x, y)| Circle::new((x + 10, y), 3, point_color.filled()));

    let degree = regression.fit.degree();
    chart
        .draw_series(LineSeries::new(curve, RED.stroke_width(style.line_width)))?
        .label(format!("{} {}", labels.fit, degree))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(3)));

    draw_legend(&mut chart, style)?;
    root.present()?;
    Ok(())
}
