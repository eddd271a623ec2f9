use serde::Serialize;

use crate::core::{
    CalculationResult, CalculatorInputs, FuelType, RateTables, StudentLoanPlan,
    calculate_salary_sacrifice,
};
use crate::format::format_currency;

/// Length of a typical salary-sacrifice lease.
pub const LEASE_TERM_MONTHS: f64 = 48.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    pub id: &'static str,
    pub make: &'static str,
    pub model: &'static str,
    pub full_name: &'static str,
    pub list_price: f64,
    #[serde(rename = "range")]
    pub range_miles: u32,
    pub monthly_lease_rate: f64,
    /// Whole-number percentage.
    pub bik_rate: f64,
    pub co2_emissions: f64,
    pub fuel_type: FuelType,
}

static CARS: [Car; 6] = [
    Car {
        id: "tesla-model-3",
        make: "Tesla",
        model: "Model 3",
        full_name: "Tesla Model 3",
        list_price: 39_990.0,
        range_miles: 318,
        monthly_lease_rate: 499.0,
        bik_rate: 3.0,
        co2_emissions: 0.0,
        fuel_type: FuelType::Electric,
    },
    Car {
        id: "tesla-model-y",
        make: "Tesla",
        model: "Model Y",
        full_name: "Tesla Model Y",
        list_price: 44_990.0,
        range_miles: 283,
        monthly_lease_rate: 549.0,
        bik_rate: 3.0,
        co2_emissions: 0.0,
        fuel_type: FuelType::Electric,
    },
    Car {
        id: "nissan-leaf",
        make: "Nissan",
        model: "Leaf",
        full_name: "Nissan Leaf",
        list_price: 28_995.0,
        range_miles: 239,
        monthly_lease_rate: 379.0,
        bik_rate: 3.0,
        co2_emissions: 0.0,
        fuel_type: FuelType::Electric,
    },
    Car {
        id: "nissan-ariya",
        make: "Nissan",
        model: "Ariya",
        full_name: "Nissan Ariya",
        list_price: 43_845.0,
        range_miles: 250,
        monthly_lease_rate: 529.0,
        bik_rate: 3.0,
        co2_emissions: 0.0,
        fuel_type: FuelType::Electric,
    },
    Car {
        id: "mg4",
        make: "MG",
        model: "MG4",
        full_name: "MG MG4",
        list_price: 26_995.0,
        range_miles: 218,
        monthly_lease_rate: 349.0,
        bik_rate: 3.0,
        co2_emissions: 0.0,
        fuel_type: FuelType::Electric,
    },
    Car {
        id: "volkswagen-id3",
        make: "Volkswagen",
        model: "ID.3",
        full_name: "Volkswagen ID.3",
        list_price: 35_880.0,
        range_miles: 263,
        monthly_lease_rate: 449.0,
        bik_rate: 3.0,
        co2_emissions: 0.0,
        fuel_type: FuelType::Electric,
    },
];

pub fn all_cars() -> &'static [Car] {
    &CARS
}

/// Case-insensitive match on full name, make or model. A blank query
/// returns every car.
pub fn search(query: &str) -> Vec<&'static Car> {
    let term = query.trim().to_lowercase();
    all_cars()
        .iter()
        .filter(|car| {
            term.is_empty()
                || car.full_name.to_lowercase().contains(&term)
                || car.make.to_lowercase().contains(&term)
                || car.model.to_lowercase().contains(&term)
        })
        .collect()
}

pub fn by_id(id: &str) -> Option<&'static Car> {
    all_cars().iter().find(|car| car.id == id)
}

pub fn summary(car: &Car) -> String {
    format!(
        "{} • {} miles range • {}/mo",
        format_currency(car.list_price),
        car.range_miles,
        format_currency(car.monthly_lease_rate)
    )
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarQuote {
    pub car: &'static Car,
    pub inputs: CalculatorInputs,
    pub result: CalculationResult,
    pub four_year_savings: f64,
}

/// Salary-sacrifice result for leasing `car`, assuming no student loan and
/// no pension contribution.
pub fn quote(tables: &RateTables, salary: f64, car: &'static Car) -> CarQuote {
    let inputs = CalculatorInputs {
        salary,
        car_value: car.list_price,
        monthly_lease: car.monthly_lease_rate,
        bik_rate: car.bik_rate,
        student_loan_plan: StudentLoanPlan::None,
        pension_contribution: 0.0,
        employer_pension_contribution: 0.0,
    };
    let result = calculate_salary_sacrifice(tables, &inputs);
    CarQuote {
        car,
        inputs,
        result,
        four_year_savings: result.monthly_savings * LEASE_TERM_MONTHS,
    }
}
