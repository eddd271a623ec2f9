use serde::Serialize;

use super::tax_year::TaxYear;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FuelType {
    Electric,
    Hybrid,
    Petrol,
    Diesel,
}

impl FuelType {
    pub fn label(self) -> &'static str {
        match self {
            FuelType::Electric => "Electric",
            FuelType::Hybrid => "Hybrid",
            FuelType::Petrol | FuelType::Diesel => "Petrol/Diesel",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StudentLoanPlan {
    None,
    Plan1,
    Plan2,
    Plan4,
    Plan5,
}

impl StudentLoanPlan {
    pub fn label(self) -> &'static str {
        match self {
            StudentLoanPlan::None => "None",
            StudentLoanPlan::Plan1 => "Plan 1",
            StudentLoanPlan::Plan2 => "Plan 2",
            StudentLoanPlan::Plan4 => "Plan 4",
            StudentLoanPlan::Plan5 => "Plan 5",
        }
    }
}

/// Income-tax bracket of a gross salary. Determines the marginal rate used
/// for BiK tax and the sacrifice savings estimate.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxBracket {
    Basic,
    Higher,
    Additional,
}

impl TaxBracket {
    pub fn name(self) -> &'static str {
        match self {
            TaxBracket::Basic => "Basic",
            TaxBracket::Higher => "Higher",
            TaxBracket::Additional => "Additional",
        }
    }
}

/// Inputs to the salary-sacrifice calculator. Percentages are whole numbers
/// (`bik_rate: 2.0` means 2%).
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorInputs {
    pub salary: f64,
    pub car_value: f64,
    pub monthly_lease: f64,
    pub bik_rate: f64,
    pub student_loan_plan: StudentLoanPlan,
    pub pension_contribution: f64,
    pub employer_pension_contribution: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBreakdown {
    pub gross_monthly: f64,
    pub net_monthly: f64,
    pub lease_cost: f64,
    pub bik_cost: f64,
    pub total_cost: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub gross_salary: f64,
    pub salary_sacrifice_amount: f64,
    pub adjusted_salary: f64,
    pub income_tax: f64,
    pub national_insurance: f64,
    pub student_loan_repayment: f64,
    /// Annual employee contribution in pounds, taken from the adjusted salary.
    pub pension_contribution: f64,
    pub net_salary: f64,
    pub bik_tax: f64,
    pub total_monthly_cost: f64,
    pub monthly_savings: f64,
    pub pension_impact: f64,
    pub breakdown: MonthlyBreakdown,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BikInputs {
    pub salary: f64,
    pub car_value: f64,
    pub fuel_type: FuelType,
    pub co2_emissions: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BikResult {
    pub p11d_value: f64,
    pub bik_rate: f64,
    pub annual_benefit: f64,
    pub tax_bracket: TaxBracket,
    pub marginal_rate: f64,
    pub annual_bik_tax: f64,
    pub monthly_bik_tax: f64,
    pub three_year_bik_tax: f64,
    pub fuel_type_label: &'static str,
    pub forecast: Option<BikForecast>,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BikForecastYear {
    pub tax_year: TaxYear,
    pub bik_rate: f64,
    pub annual_tax: f64,
    pub monthly_tax: f64,
    pub is_current_year: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BikForecast {
    pub forecast: Vec<BikForecastYear>,
    pub total_annual_tax: f64,
    pub total_monthly_average: f64,
}
