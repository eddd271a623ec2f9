use super::rates::{BikBand, Co2Band, RateTables};
use super::types::FuelType;

/// Current-year BiK rate as a fraction of the car's list price.
///
/// Negative CO2 figures are physically impossible and are sanitised to the
/// electric rate. A petrol or diesel car without a CO2 figure pays the
/// table's `unknown_co2_rate`.
pub fn bik_rate(tables: &RateTables, fuel_type: FuelType, co2_emissions: Option<f64>) -> f64 {
    match fuel_type {
        FuelType::Electric => tables.bik.electric_rate,
        FuelType::Hybrid => tables.bik.hybrid_rate,
        FuelType::Petrol | FuelType::Diesel => match known_co2(co2_emissions) {
            None => tables.bik.unknown_co2_rate,
            Some(g_km) if g_km < 0.0 => tables.bik.electric_rate,
            Some(g_km) => co2_band(tables, g_km)
                .map(|band| band.rate)
                .unwrap_or(tables.bik.unknown_co2_rate),
        },
    }
}

/// Forecast-table band for the same inputs as [`bik_rate`]. `None` means no
/// forecast can be made, never a guessed default.
pub fn bik_band_key(
    tables: &RateTables,
    fuel_type: FuelType,
    co2_emissions: Option<f64>,
) -> Option<BikBand> {
    match fuel_type {
        FuelType::Electric => Some(BikBand::Electric),
        FuelType::Hybrid => Some(BikBand::Hybrid),
        FuelType::Petrol | FuelType::Diesel => match known_co2(co2_emissions)? {
            g_km if g_km < 0.0 => Some(BikBand::Electric),
            g_km => co2_band(tables, g_km).map(|band| band.band),
        },
    }
}

fn known_co2(co2_emissions: Option<f64>) -> Option<f64> {
    co2_emissions.filter(|g_km| !g_km.is_nan())
}

fn co2_band(tables: &RateTables, g_km: f64) -> Option<&Co2Band> {
    tables
        .bik
        .co2_bands
        .iter()
        .find(|band| band.max_g_km.is_none_or(|max| g_km <= max))
}
