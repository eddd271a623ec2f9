mod bik;
mod engine;
mod forecast;
mod rates;
mod tax_year;
mod types;

pub use bik::{bik_band_key, bik_rate};
pub use engine::{
    calculate_bik, calculate_salary_sacrifice, income_tax, marginal_rate, national_insurance,
    ni_marginal_rate, student_loan_repayment, tax_bracket,
};
pub use forecast::{FORECAST_YEARS, bik_forecast};
pub use rates::{
    ADDITIONAL_RATE, BASIC_RATE, BASIC_RATE_THRESHOLD, BikBand, BikTable, Co2Band,
    ELECTRIC_BIK_RATE, HIGHER_RATE, HIGHER_RATE_THRESHOLD, HYBRID_BIK_RATE, IncomeTaxBands,
    LoanRepayment, NI_MAIN_RATE, NI_PRIMARY_THRESHOLD, NI_UPPER_EARNINGS_LIMIT, NI_UPPER_RATE,
    NationalInsuranceBands, PERSONAL_ALLOWANCE, PLAN1_THRESHOLD, PLAN2_THRESHOLD, PLAN4_THRESHOLD,
    PLAN5_THRESHOLD, RateTables, STUDENT_LOAN_RATE, StudentLoanTable, UNKNOWN_CO2_BIK_RATE,
};
pub use tax_year::{TaxYear, current_tax_year, next_tax_years};
pub use types::{
    BikForecast, BikForecastYear, BikInputs, BikResult, CalculationResult, CalculatorInputs,
    FuelType, MonthlyBreakdown, StudentLoanPlan, TaxBracket,
};
