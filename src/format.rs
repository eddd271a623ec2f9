//! Display formatting for calculator output.

use serde::Serialize;

use crate::core::{BikForecast, BikForecastYear, CalculationResult};

/// Whole pounds in en-GB style, e.g. `£12,345` or `-£50`.
pub fn format_currency(amount: f64) -> String {
    format_pounds(amount, 0)
}

/// Pounds and pence in en-GB style, e.g. `£1,234.50`.
pub fn format_monthly_currency(amount: f64) -> String {
    format_pounds(amount, 2)
}

/// A fraction as a percentage with one decimal place: `0.02` -> `2.0%`.
pub fn format_percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

fn format_pounds(amount: f64, decimals: u32) -> String {
    let scale = 10u128.pow(decimals);
    // Half-way cases round away from zero.
    let scaled = (amount.abs() * scale as f64).round() as u128;
    let whole = group_thousands(scaled / scale);
    let sign = if amount < 0.0 && scaled > 0 { "-" } else { "" };
    if decimals == 0 {
        format!("{sign}£{whole}")
    } else {
        let fraction = scaled % scale;
        format!("{sign}£{whole}.{fraction:0width$}", width = decimals as usize)
    }
}

fn group_thousands(n: u128) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Headline figures of a salary-sacrifice result: annual amounts in whole
/// pounds, monthly amounts with pence.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedCalculation {
    pub gross_salary: String,
    pub salary_sacrifice_amount: String,
    pub adjusted_salary: String,
    pub income_tax: String,
    pub national_insurance: String,
    pub student_loan_repayment: String,
    pub pension_contribution: String,
    pub net_salary: String,
    pub bik_tax: String,
    pub pension_impact: String,
    pub total_monthly_cost: String,
    pub monthly_savings: String,
    pub gross_monthly: String,
    pub net_monthly: String,
    pub lease_cost: String,
    pub bik_cost: String,
}

pub fn format_calculation(result: &CalculationResult) -> FormattedCalculation {
    FormattedCalculation {
        gross_salary: format_currency(result.gross_salary),
        salary_sacrifice_amount: format_currency(result.salary_sacrifice_amount),
        adjusted_salary: format_currency(result.adjusted_salary),
        income_tax: format_currency(result.income_tax),
        national_insurance: format_currency(result.national_insurance),
        student_loan_repayment: format_currency(result.student_loan_repayment),
        pension_contribution: format_currency(result.pension_contribution),
        net_salary: format_currency(result.net_salary),
        bik_tax: format_currency(result.bik_tax),
        pension_impact: format_currency(result.pension_impact),
        total_monthly_cost: format_monthly_currency(result.total_monthly_cost),
        monthly_savings: format_monthly_currency(result.monthly_savings),
        gross_monthly: format_monthly_currency(result.breakdown.gross_monthly),
        net_monthly: format_monthly_currency(result.breakdown.net_monthly),
        lease_cost: format_monthly_currency(result.breakdown.lease_cost),
        bik_cost: format_monthly_currency(result.breakdown.bik_cost),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedForecastYear {
    pub tax_year: String,
    pub bik_rate_percent: String,
    pub annual_tax: String,
    pub monthly_tax: String,
    pub is_current_year: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedBikForecast {
    pub forecast: Vec<FormattedForecastYear>,
    pub total_annual_tax: String,
    pub total_monthly_average: String,
}

/// Forecast table strings: annual figures as `£` plus whole pounds, monthly
/// figures with two decimals, rates with one decimal. No digit grouping.
pub fn format_forecast(forecast: &BikForecast) -> FormattedBikForecast {
    FormattedBikForecast {
        forecast: forecast.forecast.iter().map(format_forecast_year).collect(),
        total_annual_tax: forecast_annual(forecast.total_annual_tax),
        total_monthly_average: forecast_monthly(forecast.total_monthly_average),
    }
}

fn format_forecast_year(year: &BikForecastYear) -> FormattedForecastYear {
    FormattedForecastYear {
        tax_year: year.tax_year.to_string(),
        bik_rate_percent: format_percent(year.bik_rate),
        annual_tax: forecast_annual(year.annual_tax),
        monthly_tax: forecast_monthly(year.monthly_tax),
        is_current_year: year.is_current_year,
    }
}

fn forecast_annual(amount: f64) -> String {
    format!("£{:.0}", amount.round())
}

fn forecast_monthly(amount: f64) -> String {
    // Ties round away from zero, not to even.
    format!("£{:.2}", (amount * 100.0).round() / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        CalculatorInputs, RateTables, StudentLoanPlan, TaxYear, calculate_salary_sacrifice,
    };

    #[test]
    fn currency_groups_thousands_and_rounds() {
        assert_eq!(format_currency(0.0), "£0");
        assert_eq!(format_currency(999.4), "£999");
        assert_eq!(format_currency(1_000.0), "£1,000");
        assert_eq!(format_currency(35_000.0), "£35,000");
        assert_eq!(format_currency(1_234_567.5), "£1,234,568");
        assert_eq!(format_currency(-2_200.0), "-£2,200");
        assert_eq!(format_currency(-0.2), "£0");
    }

    #[test]
    fn currency_beyond_u64_is_not_truncated() {
        assert_eq!(format_currency(1e15), "£1,000,000,000,000,000");
        assert_eq!(format_currency(1e20), "£100,000,000,000,000,000,000");
    }

    #[test]
    fn monthly_currency_keeps_pence() {
        assert_eq!(format_monthly_currency(511.666_666), "£511.67");
        assert_eq!(format_monthly_currency(1_234.5), "£1,234.50");
        assert_eq!(format_monthly_currency(0.05), "£0.05");
        assert_eq!(format_monthly_currency(-12.3), "-£12.30");
    }

    #[test]
    fn percent_has_one_decimal() {
        assert_eq!(format_percent(0.02), "2.0%");
        assert_eq!(format_percent(0.37), "37.0%");
        assert_eq!(format_percent(0.125), "12.5%");
    }

    #[test]
    fn forecast_strings_follow_table_format() {
        let forecast = BikForecast {
            forecast: vec![
                BikForecastYear {
                    tax_year: TaxYear::starting(2025),
                    bik_rate: 0.03,
                    annual_tax: 1_240.6,
                    monthly_tax: 1_240.6 / 12.0,
                    is_current_year: true,
                },
                BikForecastYear {
                    tax_year: TaxYear::starting(2026),
                    bik_rate: 0.04,
                    annual_tax: 320.0,
                    monthly_tax: 320.0 / 12.0,
                    is_current_year: false,
                },
            ],
            total_annual_tax: 1_560.6,
            total_monthly_average: 65.031,
        };

        let formatted = format_forecast(&forecast);
        let first = &formatted.forecast[0];
        assert_eq!(first.tax_year, "2025/26");
        assert_eq!(first.bik_rate_percent, "3.0%");
        assert_eq!(first.annual_tax, "£1241");
        assert_eq!(first.monthly_tax, "£103.38");
        assert!(first.is_current_year);
        assert_eq!(formatted.forecast[1].monthly_tax, "£26.67");
        assert_eq!(formatted.total_annual_tax, "£1561");
        assert_eq!(formatted.total_monthly_average, "£65.03");
    }

    #[test]
    fn forecast_monthly_ties_round_up() {
        assert_eq!(forecast_monthly(0.125), "£0.13");
        assert_eq!(forecast_monthly(1.375), "£1.38");
        assert_eq!(forecast_monthly(0.0), "£0.00");
    }

    #[test]
    fn calculation_headlines_use_annual_and_monthly_styles() {
        let inputs = CalculatorInputs {
            salary: 50_000.0,
            car_value: 35_000.0,
            monthly_lease: 500.0,
            bik_rate: 2.0,
            student_loan_plan: StudentLoanPlan::None,
            pension_contribution: 5.0,
            employer_pension_contribution: 3.0,
        };
        let result = calculate_salary_sacrifice(&RateTables::uk_2024_25(), &inputs);
        let formatted = format_calculation(&result);

        assert_eq!(formatted.gross_salary, "£50,000");
        assert_eq!(formatted.adjusted_salary, "£44,000");
        assert_eq!(formatted.income_tax, "£6,286");
        assert_eq!(formatted.bik_tax, "£140");
        assert_eq!(formatted.total_monthly_cost, "£511.67");
        assert_eq!(formatted.monthly_savings, "£160.00");
        assert_eq!(formatted.lease_cost, "£500.00");
    }
}
