use crate::style::{draw_legend, draw_mesh, spectral_palette, ChartStyle};
use anyhow::{bail, Result};
use chrono::NaiveDateTime;
use plotters::prelude::*;
use scenario_analysis::dispatch::STACKED_SERIES;
use scenario_analysis::{AnalysisConfig, AnalysisReport, DispatchColumn};
use std::path::Path;

/// One layer of a stacked area chart.
#[derive(Debug, Clone)]
pub struct Band {
    pub label: &'static str,
    pub color: RGBColor,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

/// Cumulative layers, first series at the bottom. Missing values stack as zero.
pub fn stack_bands(series: &[(&'static str, &[f64])]) -> Vec<Band> {
    let height = series.first().map(|(_, v)| v.len()).unwrap_or(0);
    let palette = spectral_palette(series.len());
    let mut baseline = vec![0.0; height];

    series
        .iter()
        .zip(palette)
        .map(|((label, values), color)| {
            let lower = baseline.clone();
            for (base, value) in baseline.iter_mut().zip(values.iter()) {
                if value.is_finite() {
                    *base += value;
                }
            }
            Band {
                label: *label,
                color,
                lower,
                upper: baseline.clone(),
            }
        })
        .collect()
}

fn draw_stacked_area(
    path: &Path,
    style: &ChartStyle,
    bands: &[Band],
    x_desc: &str,
    y_max: f64,
    x_formatter: Option<&dyn Fn(&f64) -> String>,
) -> Result<()> {
    let root = BitMapBackend::new(path, style.size).into_drawing_area();
    root.fill(&WHITE)?;

    let height = bands.first().map(|b| b.upper.len()).unwrap_or(0);
    let x_max = height.saturating_sub(1).max(1) as f64;
    let y_max = if y_max > 0.0 { y_max } else { 1.0 };

    let mut chart = ChartBuilder::on(&root)
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(0.0..x_max, 0.0..y_max)?;

    draw_mesh(&mut chart, style, x_desc, style.labels().power_gw, x_formatter)?;

    // Layers do not overlap, so drawing top first only reverses the legend.
    for band in bands.iter().rev() {
        let mut outline: Vec<(f64, f64)> = band
            .upper
            .iter()
            .enumerate()
            .map(|(i, v)| (i as f64, *v))
            .collect();
        outline.extend(band.lower.iter().enumerate().rev().map(|(i, v)| (i as f64, *v)));

        let color = band.color;
        chart
            .draw_series(std::iter::once(Polygon::new(outline, color.filled())))?
            .label(band.label)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    draw_legend(&mut chart, style)?;
    root.present()?;
    Ok(())
}

fn labelled_series<'a, F>(style: &ChartStyle, lookup: F) -> Result<Vec<(&'static str, &'a [f64])>>
where
    F: Fn(DispatchColumn) -> Option<&'a [f64]>,
{
    STACKED_SERIES
        .iter()
        .map(|c| match lookup(*c) {
            Some(values) => Ok((c.label(style.language), values)),
            None => bail!("Dispatch column '{}' missing", c.key()),
        })
        .collect()
}

/// Stacked dispatch of the configured week in GW.
pub fn draw_dispatch_week(
    report: &AnalysisReport,
    config: &AnalysisConfig,
    style: &ChartStyle,
    path: &Path,
) -> Result<()> {
    let week = report
        .dispatch_gw
        .rows_between(config.dispatch_week_start, config.dispatch_week_end);
    if week.height() == 0 {
        bail!(
            "No dispatch hours between {} and {}",
            config.dispatch_week_start,
            config.dispatch_week_end
        );
    }

    let series = labelled_series(style, |c| week.get(c))?;
    let bands = stack_bands(&series);

    let index: &[NaiveDateTime] = &week.index;
    let formatter: &dyn Fn(&f64) -> String = &|x: &f64| {
        index
            .get(x.round() as usize)
            .map(|ts| ts.format("%d.%m.").to_string())
            .unwrap_or_default()
    };

    draw_stacked_area(
        path,
        style,
        &bands,
        style.labels().date,
        report.area_y_max(),
        Some(formatter),
    )
}

/// Stacked hours ordered by descending load.
pub fn draw_stacked_by_load(report: &AnalysisReport, style: &ChartStyle, path: &Path) -> Result<()> {
    let curves = &report.duration_by_load;
    let series = labelled_series(style, |c| curves.get(c))?;
    let bands = stack_bands(&series);

    let top = bands
        .last()
        .map(|b| b.upper.iter().copied().filter(|v| v.is_finite()).fold(0.0, f64::max))
        .unwrap_or(0.0);

    draw_stacked_area(path, style, &bands, style.labels().hours_by_load, top * 1.05, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_bands_accumulate() {
        let biomass = [1.0, 2.0];
        let wind = [3.0, f64::NAN];
        let bands = stack_bands(&[("Biomasse", &biomass[..]), ("Wind", &wind[..])]);

        assert_eq!(bands.len(), 2);
        assert_eq!(bands[0].lower, vec![0.0, 0.0]);
        assert_eq!(bands[0].upper, vec![1.0, 2.0]);
        assert_eq!(bands[1].lower, vec![1.0, 2.0]);
        assert_eq!(bands[1].upper, vec![4.0, 2.0]);
        assert_ne!(bands[0].color, bands[1].color);
    }
}
