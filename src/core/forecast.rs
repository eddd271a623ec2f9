use log::warn;

use super::bik::bik_band_key;
use super::rates::RateTables;
use super::tax_year::TaxYear;
use super::types::{BikForecast, BikForecastYear, BikInputs};

pub const FORECAST_YEARS: usize = 4;

/// Year-by-year BiK tax for the [`FORECAST_YEARS`] tax years starting at
/// `current`, taxed at `marginal_rate`.
///
/// Returns `None` when the vehicle has no forecast band or the band has no
/// rate for any of the years. Individual years without a rate are skipped.
pub fn bik_forecast(
    tables: &RateTables,
    inputs: &BikInputs,
    marginal_rate: f64,
    current: TaxYear,
) -> Option<BikForecast> {
    let Some(band) = bik_band_key(tables, inputs.fuel_type, inputs.co2_emissions) else {
        warn!(
            "No forecast band for {:?} with CO2 {:?}",
            inputs.fuel_type, inputs.co2_emissions
        );
        return None;
    };
    let Some(rates) = tables.forecast.get(&band) else {
        warn!("No forecast data available for band {band:?}");
        return None;
    };

    let mut forecast = Vec::with_capacity(FORECAST_YEARS);
    for tax_year in current.next_n(FORECAST_YEARS) {
        let Some(&bik_rate) = rates.get(&tax_year) else {
            warn!("No BiK rate for {tax_year} in band {band:?}");
            continue;
        };
        let annual_tax = inputs.car_value * bik_rate * marginal_rate;
        forecast.push(BikForecastYear {
            tax_year,
            bik_rate,
            annual_tax,
            monthly_tax: annual_tax / 12.0,
            is_current_year: tax_year == current,
        });
    }

    if forecast.is_empty() {
        return None;
    }

    let total_annual_tax: f64 = forecast.iter().map(|year| year.annual_tax).sum();
    let total_monthly_average = total_annual_tax / 12.0 / forecast.len() as f64;
    Some(BikForecast {
        forecast,
        total_annual_tax,
        total_monthly_average,
    })
}
