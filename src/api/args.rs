use clap::{Args, ValueEnum};

use crate::core::{BikInputs, CalculatorInputs, FuelType, StudentLoanPlan};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliStudentLoanPlan {
    None,
    Plan1,
    Plan2,
    Plan4,
    Plan5,
}

impl From<CliStudentLoanPlan> for StudentLoanPlan {
    fn from(value: CliStudentLoanPlan) -> Self {
        match value {
            CliStudentLoanPlan::None => StudentLoanPlan::None,
            CliStudentLoanPlan::Plan1 => StudentLoanPlan::Plan1,
            CliStudentLoanPlan::Plan2 => StudentLoanPlan::Plan2,
            CliStudentLoanPlan::Plan4 => StudentLoanPlan::Plan4,
            CliStudentLoanPlan::Plan5 => StudentLoanPlan::Plan5,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliFuelType {
    Electric,
    Hybrid,
    Petrol,
    Diesel,
}

impl From<CliFuelType> for FuelType {
    fn from(value: CliFuelType) -> Self {
        match value {
            CliFuelType::Electric => FuelType::Electric,
            CliFuelType::Hybrid => FuelType::Hybrid,
            CliFuelType::Petrol => FuelType::Petrol,
            CliFuelType::Diesel => FuelType::Diesel,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct SacrificeArgs {
    #[arg(long, default_value_t = 50_000.0, help = "Annual gross salary in pounds")]
    pub salary: f64,
    #[arg(
        long,
        default_value_t = 35_000.0,
        help = "Car list price (P11D value) in pounds"
    )]
    pub car_value: f64,
    #[arg(
        long,
        default_value_t = 350.0,
        help = "Gross monthly lease sacrificed from salary"
    )]
    pub monthly_lease: f64,
    #[arg(long, default_value_t = 2.0, help = "BiK rate in percent, e.g. 2")]
    pub bik_rate: f64,
    #[arg(long, value_enum, default_value_t = CliStudentLoanPlan::None)]
    pub student_loan_plan: CliStudentLoanPlan,
    #[arg(
        long,
        default_value_t = 5.0,
        help = "Employee pension contribution in percent of salary"
    )]
    pub pension_contribution: f64,
    #[arg(
        long,
        default_value_t = 3.0,
        help = "Employer pension contribution in percent of salary"
    )]
    pub employer_pension_contribution: f64,
}

impl Default for SacrificeArgs {
    fn default() -> Self {
        Self {
            salary: 50_000.0,
            car_value: 35_000.0,
            monthly_lease: 350.0,
            bik_rate: 2.0,
            student_loan_plan: CliStudentLoanPlan::None,
            pension_contribution: 5.0,
            employer_pension_contribution: 3.0,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct BikArgs {
    #[arg(long, default_value_t = 50_000.0, help = "Annual gross salary in pounds")]
    pub salary: f64,
    #[arg(
        long,
        default_value_t = 35_000.0,
        help = "Car list price (P11D value) in pounds"
    )]
    pub car_value: f64,
    #[arg(long, value_enum, default_value_t = CliFuelType::Electric)]
    pub fuel_type: CliFuelType,
    #[arg(
        long,
        help = "CO2 emissions in g/km; used for petrol and diesel cars"
    )]
    pub co2_emissions: Option<f64>,
}

impl Default for BikArgs {
    fn default() -> Self {
        Self {
            salary: 50_000.0,
            car_value: 35_000.0,
            fuel_type: CliFuelType::Electric,
            co2_emissions: None,
        }
    }
}

/// Largest amount, in pounds or percent, accepted from a caller.
pub const MAX_INPUT_AMOUNT: f64 = 1e12;

fn require_non_negative(name: &str, value: f64) -> Result<(), String> {
    if !value.is_finite() || value < 0.0 {
        return Err(format!("{name} must be a number >= 0"));
    }
    if value > MAX_INPUT_AMOUNT {
        return Err(format!("{name} must be <= {MAX_INPUT_AMOUNT}"));
    }
    Ok(())
}

pub fn build_calculator_inputs(args: SacrificeArgs) -> Result<CalculatorInputs, String> {
    for (name, value) in [
        ("--salary", args.salary),
        ("--car-value", args.car_value),
        ("--monthly-lease", args.monthly_lease),
        ("--bik-rate", args.bik_rate),
        ("--pension-contribution", args.pension_contribution),
        (
            "--employer-pension-contribution",
            args.employer_pension_contribution,
        ),
    ] {
        require_non_negative(name, value)?;
    }

    if args.bik_rate > 100.0 {
        return Err("--bik-rate must be between 0 and 100".to_string());
    }

    if args.pension_contribution > 100.0 || args.employer_pension_contribution > 100.0 {
        return Err("pension contributions must be between 0 and 100 percent".to_string());
    }

    Ok(CalculatorInputs {
        salary: args.salary,
        car_value: args.car_value,
        monthly_lease: args.monthly_lease,
        bik_rate: args.bik_rate,
        student_loan_plan: args.student_loan_plan.into(),
        pension_contribution: args.pension_contribution,
        employer_pension_contribution: args.employer_pension_contribution,
    })
}

/// Negative CO2 figures pass through; the BiK resolver sanitises them.
pub fn build_bik_inputs(args: BikArgs) -> Result<BikInputs, String> {
    require_non_negative("--salary", args.salary)?;
    require_non_negative("--car-value", args.car_value)?;

    if let Some(co2) = args.co2_emissions
        && !co2.is_finite()
    {
        return Err("--co2-emissions must be a finite number".to_string());
    }

    Ok(BikInputs {
        salary: args.salary,
        car_value: args.car_value,
        fuel_type: args.fuel_type.into(),
        co2_emissions: args.co2_emissions,
    })
}

pub fn validate_quote_salary(salary: f64) -> Result<f64, String> {
    require_non_negative("--salary", salary)?;
    Ok(salary)
}
