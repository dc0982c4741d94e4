use crate::error::Result;
use crate::models::{DispatchColumn, DispatchTable, Fuel, ScenarioTable};
use log::{debug, warn};
use regex::Regex;

/// MW to GW.
pub const GIGAWATT: f64 = 1000.0;

/// Columns of the per-country view shown in the charts, in GW.
pub const GIGAWATT_VIEW: [DispatchColumn; 11] = [
    DispatchColumn::Fuel(Fuel::RunOfRiver),
    DispatchColumn::Fuel(Fuel::Biomass),
    DispatchColumn::Fuel(Fuel::Solar),
    DispatchColumn::Fuel(Fuel::Wind),
    DispatchColumn::Fuel(Fuel::Uranium),
    DispatchColumn::Fuel(Fuel::Lignite),
    DispatchColumn::Fuel(Fuel::HardCoal),
    DispatchColumn::Fuel(Fuel::Gas),
    DispatchColumn::PhsOut,
    DispatchColumn::Imports,
    DispatchColumn::Exports,
];

/// Stacking order of the area charts, bottom first.
pub const STACKED_SERIES: [DispatchColumn; 9] = [
    DispatchColumn::Fuel(Fuel::Biomass),
    DispatchColumn::Fuel(Fuel::RunOfRiver),
    DispatchColumn::Fuel(Fuel::Uranium),
    DispatchColumn::Fuel(Fuel::Lignite),
    DispatchColumn::Fuel(Fuel::HardCoal),
    DispatchColumn::Fuel(Fuel::Gas),
    DispatchColumn::Fuel(Fuel::Solar),
    DispatchColumn::Fuel(Fuel::Wind),
    DispatchColumn::Imports,
];

pub const DURATION_SERIES: [DispatchColumn; 8] = [
    DispatchColumn::Fuel(Fuel::Uranium),
    DispatchColumn::Fuel(Fuel::Lignite),
    DispatchColumn::Fuel(Fuel::HardCoal),
    DispatchColumn::Fuel(Fuel::Gas),
    DispatchColumn::Fuel(Fuel::Solar),
    DispatchColumn::Fuel(Fuel::Wind),
    DispatchColumn::Imports,
    DispatchColumn::Exports,
];

/// A transmission column `powerline_<FROM>_<TO>`.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerlineFlow<'a> {
    pub column: &'a str,
    pub from: String,
    pub to: String,
}

pub struct DispatchAggregator {
    country_code: String,
    powerline: Regex,
}

impl DispatchAggregator {
    pub fn new(country_code: &str) -> Result<Self> {
        Ok(Self {
            country_code: country_code.to_string(),
            powerline: Regex::new(r"^powerline_([A-Za-z]+)_([A-Za-z]+)")?,
        })
    }

    /// Columns naming both the fuel and the country code.
    pub fn fuel_columns<'a>(&self, table: &'a ScenarioTable, fuel: Fuel) -> Vec<&'a str> {
        table.columns_matching(|c| c.contains(fuel.key()) && c.contains(&self.country_code))
    }

    pub fn powerline_flows<'a>(&self, table: &'a ScenarioTable) -> Vec<PowerlineFlow<'a>> {
        table
            .columns_matching(|c| c.contains("powerline"))
            .into_iter()
            .filter_map(|column| match self.powerline.captures(column) {
                Some(caps) => Some(PowerlineFlow {
                    column,
                    from: caps[1].to_string(),
                    to: caps[2].to_string(),
                }),
                None => {
                    debug!("Skipping powerline column without endpoints: {}", column);
                    None
                }
            })
            .collect()
    }

    pub fn export_columns<'a>(&self, table: &'a ScenarioTable) -> Vec<&'a str> {
        self.powerline_flows(table)
            .into_iter()
            .filter(|flow| flow.from == self.country_code)
            .map(|flow| flow.column)
            .collect()
    }

    pub fn import_columns<'a>(&self, table: &'a ScenarioTable) -> Vec<&'a str> {
        self.powerline_flows(table)
            .into_iter()
            .filter(|flow| flow.to == self.country_code)
            .map(|flow| flow.column)
            .collect()
    }

    /// Pumped-hydro columns of the country for `PhsIn`, `PhsOut` or `PhsLevel`.
    pub fn phs_columns<'a>(&self, table: &'a ScenarioTable, column: DispatchColumn) -> Vec<&'a str> {
        let key = column.key();
        table.columns_matching(|c| c.contains(key) && c.contains(&self.country_code))
    }

    /// Sum source columns into one column per fuel, then imports, exports
    /// and pumped-hydro in/out/level.
    pub fn aggregate(&self, table: &ScenarioTable) -> Result<DispatchTable> {
        let mut columns = Vec::with_capacity(Fuel::ALL.len() + 5);

        for fuel in Fuel::ALL {
            let sources = self.fuel_columns(table, fuel);
            if sources.is_empty() {
                warn!("No {} columns for {}", fuel.key(), self.country_code);
            }
            columns.push((DispatchColumn::Fuel(fuel), table.sum_columns(&sources)?));
        }

        let imports = self.import_columns(table);
        let exports = self.export_columns(table);
        debug!(
            "{}: {} import and {} export lines",
            self.country_code,
            imports.len(),
            exports.len()
        );
        columns.push((DispatchColumn::Imports, table.sum_columns(&imports)?));
        columns.push((DispatchColumn::Exports, table.sum_columns(&exports)?));

        for phs in [DispatchColumn::PhsIn, DispatchColumn::PhsOut, DispatchColumn::PhsLevel] {
            let sources = self.phs_columns(table, phs);
            columns.push((phs, table.sum_columns(&sources)?));
        }

        Ok(DispatchTable {
            index: table.index.clone(),
            columns,
        })
    }
}

/// The chart view: selected columns converted from MW to GW.
pub fn to_gigawatt(dispatch: &DispatchTable) -> Result<DispatchTable> {
    let mut view = dispatch.select(&GIGAWATT_VIEW)?;
    for (_, values) in view.columns.iter_mut() {
        for value in values.iter_mut() {
            *value /= GIGAWATT;
        }
    }
    Ok(view)
}
