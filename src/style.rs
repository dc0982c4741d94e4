use anyhow::Result;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use scenario_analysis::{AnalysisConfig, Language};
use std::ops::Range;

pub type Chart<'a, 'b> = ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

pub const SILVER: RGBColor = RGBColor(192, 192, 192);

/// Default line colours of the ggplot style.
pub const GGPLOT_CYCLE: [RGBColor; 7] = [
    RGBColor(0xe2, 0x4a, 0x33),
    RGBColor(0x34, 0x8a, 0xbd),
    RGBColor(0x98, 0x8e, 0xd5),
    RGBColor(0x77, 0x77, 0x77),
    RGBColor(0xfb, 0xc1, 0x5e),
    RGBColor(0x8e, 0xba, 0x42),
    RGBColor(0xff, 0xb5, 0xb8),
];

/// ColorBrewer "Spectral", dark red to dark blue.
const SPECTRAL: [(u8, u8, u8); 11] = [
    (0x9e, 0x01, 0x42),
    (0xd5, 0x3e, 0x4f),
    (0xf4, 0x6d, 0x43),
    (0xfd, 0xae, 0x61),
    (0xfe, 0xe0, 0x8b),
    (0xff, 0xff, 0xbf),
    (0xe6, 0xf5, 0x98),
    (0xab, 0xdd, 0xa4),
    (0x66, 0xc2, 0xa5),
    (0x32, 0x88, 0xbd),
    (0x5e, 0x4f, 0xa2),
];

/// Spectral colour at `t` in `[0, 1]`, linearly interpolated.
pub fn spectral(t: f64) -> RGBColor {
    let pos = t.clamp(0.0, 1.0) * (SPECTRAL.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = (lower + 1).min(SPECTRAL.len() - 1);
    let frac = pos - lower as f64;

    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    let (r0, g0, b0) = SPECTRAL[lower];
    let (r1, g1, b1) = SPECTRAL[upper];
    RGBColor(mix(r0, r1), mix(g0, g1), mix(b0, b1))
}

/// `n` colours spread evenly over the whole map.
pub fn spectral_palette(n: usize) -> Vec<RGBColor> {
    match n {
        0 => Vec::new(),
        1 => vec![spectral(0.0)],
        _ => (0..n).map(|i| spectral(i as f64 / (n - 1) as f64)).collect(),
    }
}

/// Shared look of every chart: silver plot area, black 10pt text, thick lines.
#[derive(Debug, Clone)]
pub struct ChartStyle {
    pub size: (u32, u32),
    pub font_family: &'static str,
    pub font_size: u32,
    pub line_width: u32,
    pub background: RGBColor,
    pub text: RGBColor,
    pub language: Language,
}

impl ChartStyle {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            size: (config.chart_width, config.chart_height),
            font_family: "sans-serif",
            font_size: 10,
            line_width: 3,
            background: SILVER,
            text: BLACK,
            language: config.language,
        }
    }

    pub fn label_font(&self) -> TextStyle<'static> {
        (self.font_family, self.font_size * 2)
            .into_font()
            .color(&self.text)
    }

    pub fn legend_font(&self) -> TextStyle<'static> {
        (self.font_family, (self.font_size * 3) / 2)
            .into_font()
            .color(&self.text)
    }

    pub fn labels(&self) -> AxisLabels {
        AxisLabels::for_language(self.language)
    }
}

/// Silver plot area with a white grid and black axis text.
pub fn draw_mesh(
    chart: &mut Chart<'_, '_>,
    style: &ChartStyle,
    x_desc: &str,
    y_desc: &str,
    x_formatter: Option<&dyn Fn(&f64) -> String>,
) -> Result<()> {
    chart.plotting_area().fill(&style.background)?;

    let mut mesh = chart.configure_mesh();
    mesh.x_desc(x_desc)
        .y_desc(y_desc)
        .label_style(style.label_font())
        .axis_desc_style(style.label_font())
        .bold_line_style(WHITE.mix(0.9).stroke_width(1))
        .light_line_style(WHITE.mix(0.3).stroke_width(1));
    if let Some(formatter) = x_formatter {
        mesh.x_label_formatter(formatter);
    }
    mesh.draw()?;

    Ok(())
}

pub fn draw_legend<'a, 'b: 'a>(chart: &mut Chart<'a, 'b>, style: &ChartStyle) -> Result<()> {
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font(style.legend_font())
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    Ok(())
}

/// Axis titles in the chart language.
#[derive(Debug, Clone, Copy)]
pub struct AxisLabels {
    pub hours: &'static str,
    pub price: &'static str,
    pub residual_load: &'static str,
    pub day_ahead_price: &'static str,
    pub fit: &'static str,
    pub date: &'static str,
    pub power_gw: &'static str,
    pub hours_of_year: &'static str,
    pub hours_by_load: &'static str,
}

impl AxisLabels {
    pub fn for_language(language: Language) -> Self {
        match language {
            Language::De => Self {
                hours: "Zeit in h",
                price: "Preis in EUR/MWh",
                residual_load: "Residuallast in MW",
                day_ahead_price: "Day-Ahead Preis in EUR/MWh",
                fit: "Polynomfit Grad",
                date: "Datum",
                power_gw: "Leistung in GW",
                hours_of_year: "Stunden des Jahres",
                hours_by_load: "Stunden des Jahres geordnet nach der Last",
            },
            Language::En => Self {
                hours: "Time in h",
                price: "Price in EUR/MWh",
                residual_load: "Residual load in MW",
                day_ahead_price: "Day-ahead price in EUR/MWh",
                fit: "Polynomial fit degree",
                date: "Date",
                power_gw: "Power in GW",
                hours_of_year: "Hours of the year",
                hours_by_load: "Hours of the year ordered by load",
            },
        }
    }
}

/// Axis range covering the finite values with 5% padding on each side.
pub fn padded_range<I>(values: I) -> Range<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));

    if !min.is_finite() {
        return 0.0..1.0;
    }
    if min == max {
        return (min - 1.0)..(max + 1.0);
    }

    let pad = (max - min) * 0.05;
    (min - pad)..(max + pad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spectral_endpoints() {
        assert_eq!(spectral(0.0), RGBColor(0x9e, 0x01, 0x42));
        assert_eq!(spectral(1.0), RGBColor(0x5e, 0x4f, 0xa2));
        assert_eq!(spectral(0.5), RGBColor(0xff, 0xff, 0xbf));
    }

    #[test]
    fn test_palette_size() {
        assert!(spectral_palette(0).is_empty());
        let palette = spectral_palette(9);
        assert_eq!(palette.len(), 9);
        assert_eq!(palette[8], spectral(1.0));
    }

    #[test]
    fn test_padded_range() {
        assert_eq!(padded_range(vec![0.0, 10.0, f64::NAN]), -0.5..10.5);
        assert_eq!(padded_range(vec![3.0, 3.0]), 2.0..4.0);
        assert_eq!(padded_range(Vec::new()), 0.0..1.0);
    }
}
