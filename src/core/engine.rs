use super::bik::bik_rate;
use super::forecast::bik_forecast;
use super::rates::RateTables;
use super::tax_year::TaxYear;
use super::types::{
    BikInputs, BikResult, CalculationResult, CalculatorInputs, MonthlyBreakdown, StudentLoanPlan,
    TaxBracket,
};

/// Full salary-sacrifice breakdown for one set of inputs.
///
/// Income tax, NI, student loan and pension are charged on the post-sacrifice
/// salary. BiK tax and the savings estimate use the bracket of the
/// pre-sacrifice salary. Degenerate inputs are not rejected: a lease larger
/// than the salary produces a negative adjusted and net salary.
pub fn calculate_salary_sacrifice(
    tables: &RateTables,
    inputs: &CalculatorInputs,
) -> CalculationResult {
    let annual_lease = inputs.monthly_lease * 12.0;
    let adjusted_salary = inputs.salary - annual_lease;

    let income_tax = income_tax(tables, adjusted_salary);
    let national_insurance = national_insurance(tables, adjusted_salary);
    let student_loan_repayment =
        student_loan_repayment(tables, adjusted_salary, inputs.student_loan_plan);
    let pension_contribution = inputs.pension_contribution / 100.0 * adjusted_salary;

    let net_salary = adjusted_salary
        - income_tax
        - national_insurance
        - student_loan_repayment
        - pension_contribution;

    let bracket = tax_bracket(tables, inputs.salary);
    let marginal = marginal_rate(tables, bracket);
    let bik_tax = inputs.car_value * inputs.bik_rate / 100.0 * marginal;

    let total_monthly_cost = inputs.monthly_lease + bik_tax / 12.0;
    let monthly_savings = annual_lease * (marginal + ni_marginal_rate(tables, bracket)) / 12.0;
    let pension_impact = inputs.pension_contribution / 100.0 * annual_lease;

    CalculationResult {
        gross_salary: inputs.salary,
        salary_sacrifice_amount: annual_lease,
        adjusted_salary,
        income_tax,
        national_insurance,
        student_loan_repayment,
        pension_contribution,
        net_salary,
        bik_tax,
        total_monthly_cost,
        monthly_savings,
        pension_impact,
        breakdown: MonthlyBreakdown {
            gross_monthly: inputs.salary / 12.0,
            net_monthly: net_salary / 12.0,
            lease_cost: inputs.monthly_lease,
            bik_cost: bik_tax / 12.0,
            total_cost: total_monthly_cost,
        },
    }
}

/// BiK tax on a company car without any salary sacrifice, plus the
/// multi-year forecast from `current` onwards.
pub fn calculate_bik(tables: &RateTables, inputs: &BikInputs, current: TaxYear) -> BikResult {
    let rate = bik_rate(tables, inputs.fuel_type, inputs.co2_emissions);
    let bracket = tax_bracket(tables, inputs.salary);
    let marginal = marginal_rate(tables, bracket);

    let annual_benefit = inputs.car_value * rate;
    let annual_bik_tax = annual_benefit * marginal;

    BikResult {
        p11d_value: inputs.car_value,
        bik_rate: rate,
        annual_benefit,
        tax_bracket: bracket,
        marginal_rate: marginal,
        annual_bik_tax,
        monthly_bik_tax: annual_bik_tax / 12.0,
        three_year_bik_tax: annual_bik_tax * 3.0,
        fuel_type_label: inputs.fuel_type.label(),
        forecast: bik_forecast(tables, inputs, marginal, current),
    }
}

pub fn tax_bracket(tables: &RateTables, salary: f64) -> TaxBracket {
    let bands = &tables.income_tax;
    if salary <= bands.basic_rate_threshold {
        TaxBracket::Basic
    } else if salary <= bands.higher_rate_threshold {
        TaxBracket::Higher
    } else {
        TaxBracket::Additional
    }
}

pub fn marginal_rate(tables: &RateTables, bracket: TaxBracket) -> f64 {
    match bracket {
        TaxBracket::Basic => tables.income_tax.basic_rate,
        TaxBracket::Higher => tables.income_tax.higher_rate,
        TaxBracket::Additional => tables.income_tax.additional_rate,
    }
}

/// NI rate assumed saved on each sacrificed pound.
pub fn ni_marginal_rate(tables: &RateTables, bracket: TaxBracket) -> f64 {
    match bracket {
        TaxBracket::Basic => tables.national_insurance.main_rate,
        TaxBracket::Higher | TaxBracket::Additional => tables.national_insurance.upper_rate,
    }
}

pub fn income_tax(tables: &RateTables, salary: f64) -> f64 {
    let bands = &tables.income_tax;
    let taxable_income = (salary - bands.personal_allowance).max(0.0);

    let basic_band_width = (bands.basic_rate_threshold - bands.personal_allowance).max(0.0);
    let higher_band_width = (bands.higher_rate_threshold - bands.basic_rate_threshold).max(0.0);

    let basic_taxable = taxable_income.min(basic_band_width);
    let higher_taxable = (taxable_income - basic_taxable)
        .min(higher_band_width)
        .max(0.0);
    let additional_taxable = (taxable_income - basic_taxable - higher_taxable).max(0.0);

    basic_taxable * bands.basic_rate
        + higher_taxable * bands.higher_rate
        + additional_taxable * bands.additional_rate
}

pub fn national_insurance(tables: &RateTables, salary: f64) -> f64 {
    let ni = &tables.national_insurance;
    let main_band = (salary.min(ni.upper_earnings_limit) - ni.primary_threshold).max(0.0);
    let upper_band = (salary - ni.upper_earnings_limit).max(0.0);
    main_band * ni.main_rate + upper_band * ni.upper_rate
}

pub fn student_loan_repayment(tables: &RateTables, salary: f64, plan: StudentLoanPlan) -> f64 {
    match tables.student_loans.repayment(plan) {
        None => 0.0,
        Some(terms) => (salary - terms.threshold).max(0.0) * terms.rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::FuelType;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn tables() -> RateTables {
        RateTables::uk_2024_25()
    }

    fn sample_inputs() -> CalculatorInputs {
        CalculatorInputs {
            salary: 50_000.0,
            car_value: 35_000.0,
            monthly_lease: 500.0,
            bik_rate: 2.0,
            student_loan_plan: StudentLoanPlan::None,
            pension_contribution: 5.0,
            employer_pension_contribution: 3.0,
        }
    }

    #[test]
    fn basic_rate_scenario_matches_hand_calculation() {
        let result = calculate_salary_sacrifice(&tables(), &sample_inputs());

        assert_approx(result.salary_sacrifice_amount, 6_000.0);
        assert_approx(result.adjusted_salary, 44_000.0);
        assert_approx(result.income_tax, (44_000.0 - 12_570.0) * 0.20);
        assert_approx(result.national_insurance, (44_000.0 - 12_570.0) * 0.12);
        assert_approx(result.student_loan_repayment, 0.0);
        assert_approx(result.pension_contribution, 2_200.0);
        assert_approx(result.bik_tax, 140.0);
        assert_approx(result.total_monthly_cost, 500.0 + 140.0 / 12.0);
        assert!((result.total_monthly_cost - 511.67).abs() < 0.01);
        assert_approx(result.monthly_savings, 6_000.0 * 0.32 / 12.0);
        assert_approx(result.pension_impact, 300.0);
    }

    #[test]
    fn result_satisfies_salary_identities() {
        let mut inputs = sample_inputs();
        inputs.student_loan_plan = StudentLoanPlan::Plan2;
        let r = calculate_salary_sacrifice(&tables(), &inputs);

        assert_approx(r.adjusted_salary, r.gross_salary - r.salary_sacrifice_amount);
        assert_approx(
            r.net_salary,
            r.adjusted_salary
                - r.income_tax
                - r.national_insurance
                - r.student_loan_repayment
                - r.pension_contribution,
        );
        assert_approx(r.breakdown.gross_monthly, 50_000.0 / 12.0);
        assert_approx(r.breakdown.net_monthly, r.net_salary / 12.0);
        assert_approx(r.breakdown.lease_cost, 500.0);
        assert_approx(r.breakdown.bik_cost, r.bik_tax / 12.0);
        assert_approx(r.breakdown.total_cost, r.total_monthly_cost);
    }

    #[test]
    fn bik_uses_pre_sacrifice_bracket() {
        // 60k is higher rate; after a 1,000/month sacrifice the adjusted
        // salary of 48k is basic rate, but BiK is still charged at 40%.
        let inputs = CalculatorInputs {
            salary: 60_000.0,
            car_value: 40_000.0,
            monthly_lease: 1_000.0,
            ..sample_inputs()
        };
        let r = calculate_salary_sacrifice(&tables(), &inputs);

        assert_approx(r.adjusted_salary, 48_000.0);
        assert_eq!(tax_bracket(&tables(), r.adjusted_salary), TaxBracket::Basic);
        assert_approx(r.bik_tax, 40_000.0 * 0.02 * 0.40);
        assert_approx(r.monthly_savings, 12_000.0 * 0.42 / 12.0);
    }

    #[test]
    fn lease_above_salary_goes_negative_without_tax() {
        let inputs = CalculatorInputs {
            salary: 5_000.0,
            monthly_lease: 600.0,
            ..sample_inputs()
        };
        let r = calculate_salary_sacrifice(&tables(), &inputs);

        assert_approx(r.adjusted_salary, -2_200.0);
        assert_approx(r.income_tax, 0.0);
        assert_approx(r.national_insurance, 0.0);
        assert!(r.net_salary < 0.0);
    }

    #[test]
    fn zero_salary_has_no_tax_or_ni() {
        let inputs = CalculatorInputs {
            salary: 0.0,
            monthly_lease: 0.0,
            ..sample_inputs()
        };
        let r = calculate_salary_sacrifice(&tables(), &inputs);
        assert_approx(r.income_tax, 0.0);
        assert_approx(r.national_insurance, 0.0);
        assert_approx(r.net_salary, 0.0);
    }

    #[test]
    fn income_tax_spans_all_three_bands() {
        let t = tables();
        assert_approx(income_tax(&t, 12_570.0), 0.0);
        assert_approx(income_tax(&t, 50_270.0), 37_700.0 * 0.20);
        assert_approx(income_tax(&t, 60_000.0), 7_540.0 + 9_730.0 * 0.40);
        assert_approx(
            income_tax(&t, 150_000.0),
            7_540.0 + 74_870.0 * 0.40 + 24_860.0 * 0.45,
        );
    }

    #[test]
    fn national_insurance_bands() {
        let t = tables();
        assert_approx(national_insurance(&t, 12_570.0), 0.0);
        assert_approx(national_insurance(&t, 30_000.0), 17_430.0 * 0.12);
        assert_approx(national_insurance(&t, 60_000.0), 37_700.0 * 0.12 + 9_730.0 * 0.02);
    }

    #[test]
    fn student_loan_plans_use_their_thresholds() {
        let t = tables();
        assert_approx(student_loan_repayment(&t, 30_000.0, StudentLoanPlan::Plan1), 7_985.0 * 0.09);
        assert_approx(student_loan_repayment(&t, 30_000.0, StudentLoanPlan::Plan2), 2_705.0 * 0.09);
        assert_approx(student_loan_repayment(&t, 30_000.0, StudentLoanPlan::Plan4), 2_340.0 * 0.09);
        assert_approx(student_loan_repayment(&t, 30_000.0, StudentLoanPlan::Plan5), 5_000.0 * 0.09);
        assert_approx(student_loan_repayment(&t, 20_000.0, StudentLoanPlan::Plan5), 0.0);
    }

    #[test]
    fn bracket_boundaries_are_inclusive() {
        let t = tables();
        assert_eq!(tax_bracket(&t, 50_270.0), TaxBracket::Basic);
        assert_eq!(tax_bracket(&t, 50_270.01), TaxBracket::Higher);
        assert_eq!(tax_bracket(&t, 125_140.0), TaxBracket::Higher);
        assert_eq!(tax_bracket(&t, 125_140.01), TaxBracket::Additional);
        assert_approx(ni_marginal_rate(&t, TaxBracket::Basic), 0.12);
        assert_approx(ni_marginal_rate(&t, TaxBracket::Additional), 0.02);
    }

    #[test]
    fn bik_only_for_electric_higher_rate() {
        let inputs = BikInputs {
            salary: 80_000.0,
            car_value: 50_000.0,
            fuel_type: FuelType::Electric,
            co2_emissions: None,
        };
        let r = calculate_bik(&tables(), &inputs, TaxYear::starting(2025));

        assert_approx(r.bik_rate, 0.02);
        assert_approx(r.annual_benefit, 1_000.0);
        assert_eq!(r.tax_bracket, TaxBracket::Higher);
        assert_approx(r.annual_bik_tax, 400.0);
        assert_approx(r.monthly_bik_tax, 400.0 / 12.0);
        assert_approx(r.three_year_bik_tax, 1_200.0);
        assert_eq!(r.fuel_type_label, "Electric");
        let forecast = r.forecast.expect("electric forecast");
        assert_eq!(forecast.forecast.len(), 4);
    }

    #[test]
    fn bik_only_petrol_without_co2_defaults_and_has_no_forecast() {
        let inputs = BikInputs {
            salary: 40_000.0,
            car_value: 20_000.0,
            fuel_type: FuelType::Petrol,
            co2_emissions: None,
        };
        let r = calculate_bik(&tables(), &inputs, TaxYear::starting(2025));
        assert_approx(r.bik_rate, 0.25);
        assert_approx(r.annual_bik_tax, 20_000.0 * 0.25 * 0.20);
        assert_eq!(r.fuel_type_label, "Petrol/Diesel");
        assert!(r.forecast.is_none());
    }

    proptest! {
        #[test]
        fn prop_no_income_tax_within_personal_allowance(salary in -50_000.0f64..=12_570.0) {
            prop_assert_eq!(income_tax(&tables(), salary), 0.0);
        }

        #[test]
        fn prop_income_tax_is_monotonic_and_non_negative(
            low in 0.0f64..400_000.0,
            step in 1.0f64..50_000.0
        ) {
            let t = tables();
            let high = low + step;
            let tax_low = income_tax(&t, low);
            let tax_high = income_tax(&t, high);
            prop_assert!(tax_low >= 0.0);
            prop_assert!(tax_high >= tax_low);
            if high > t.income_tax.personal_allowance {
                prop_assert!(tax_high > tax_low);
            }
        }

        #[test]
        fn prop_national_insurance_is_continuous_at_upper_limit(delta in 0.0f64..0.01) {
            let t = tables();
            let limit = t.national_insurance.upper_earnings_limit;
            let below = national_insurance(&t, limit - delta);
            let above = national_insurance(&t, limit + delta);
            prop_assert!((above - below).abs() <= 0.01 * 0.12 * 2.0 + 1e-9);
        }

        #[test]
        fn prop_no_student_loan_without_plan(salary in -100_000.0f64..1_000_000.0) {
            prop_assert_eq!(student_loan_repayment(&tables(), salary, StudentLoanPlan::None), 0.0);
        }

        #[test]
        fn prop_adjusted_salary_identity(
            salary in 0u32..300_000,
            lease in 0u32..3_000,
            pension in 0u32..20
        ) {
            let inputs = CalculatorInputs {
                salary: salary as f64,
                monthly_lease: lease as f64,
                pension_contribution: pension as f64,
                ..sample_inputs()
            };
            let r = calculate_salary_sacrifice(&tables(), &inputs);
            prop_assert!((r.adjusted_salary - (r.gross_salary - r.salary_sacrifice_amount)).abs() < 1e-6);
            prop_assert!(r.income_tax >= 0.0 && r.national_insurance >= 0.0);
            prop_assert!(r.bik_tax >= 0.0 && r.monthly_savings >= 0.0);
        }
    }
}
