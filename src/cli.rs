use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use crate::api::{
    BikArgs, SacrificeArgs, build_bik_inputs, build_calculator_inputs, run_http_server,
};
use crate::catalog;
use crate::core::{
    BikInputs, CalculatorInputs, FORECAST_YEARS, RateTables, TaxYear, calculate_bik,
    calculate_salary_sacrifice, current_tax_year, tax_bracket,
};
use crate::format::{
    format_calculation, format_currency, format_forecast, format_monthly_currency, format_percent,
};

#[derive(Parser, Debug)]
#[command(
    name = "ev-sacrifice",
    about = "UK electric-car salary sacrifice and Benefit-in-Kind tax calculator"
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        help = "JSON file replacing the built-in 2024/25 rate tables"
    )]
    pub rates: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the JSON API.
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Salary-sacrifice breakdown for one car lease.
    Sacrifice(SacrificeArgs),
    /// BiK tax on a company car, with the multi-year forecast.
    Bik(BikArgs),
    /// Search the car catalog.
    Cars { query: Option<String> },
    /// Current UK tax year and the forecast window.
    TaxYear,
}

pub async fn run(cli: Cli) -> Result<()> {
    let tables = load_tables(cli.rates.as_deref())?;

    match cli.command {
        Command::Serve { port } => run_http_server(port, Arc::new(tables))
            .await
            .with_context(|| format!("HTTP server on port {port} failed")),
        Command::Sacrifice(args) => {
            let inputs = build_calculator_inputs(args).map_err(anyhow::Error::msg)?;
            println!("{}", render_sacrifice(&tables, &inputs));
            Ok(())
        }
        Command::Bik(args) => {
            let inputs = build_bik_inputs(args).map_err(anyhow::Error::msg)?;
            println!("{}", render_bik(&tables, &inputs, current_tax_year()));
            Ok(())
        }
        Command::Cars { query } => {
            println!("{}", render_cars(query.as_deref().unwrap_or_default()));
            Ok(())
        }
        Command::TaxYear => {
            println!("{}", render_tax_year(current_tax_year()));
            Ok(())
        }
    }
}

fn load_tables(path: Option<&Path>) -> Result<RateTables> {
    let Some(path) = path else {
        return Ok(RateTables::default());
    };
    let tables = RateTables::from_json_file(path)?;
    info!(
        "Loaded {} rate tables from {}",
        tables.tax_year,
        path.display()
    );
    Ok(tables)
}

fn row(label: &str, value: String) -> String {
    format!("  {label:<24}{value}")
}

pub fn render_sacrifice(tables: &RateTables, inputs: &CalculatorInputs) -> String {
    let result = calculate_salary_sacrifice(tables, inputs);
    let formatted = format_calculation(&result);
    let bracket = tax_bracket(tables, inputs.salary);

    [
        format!("Salary sacrifice ({} rate taxpayer)", bracket.name()),
        row("Gross salary", formatted.gross_salary),
        row("Salary sacrifice", formatted.salary_sacrifice_amount),
        row("Adjusted salary", formatted.adjusted_salary),
        row("Income tax", formatted.income_tax),
        row("National Insurance", formatted.national_insurance),
        row(
            &format!("Student loan ({})", inputs.student_loan_plan.label()),
            formatted.student_loan_repayment,
        ),
        row(
            &format!("Pension ({}%)", inputs.pension_contribution),
            formatted.pension_contribution,
        ),
        row("Net salary", formatted.net_salary),
        row("BiK tax", formatted.bik_tax),
        row("Pension impact", formatted.pension_impact),
        "Monthly".to_string(),
        row("Gross", formatted.gross_monthly),
        row("Net", formatted.net_monthly),
        row("Lease", formatted.lease_cost),
        row("BiK", formatted.bik_cost),
        row("Total cost", formatted.total_monthly_cost),
        row("Estimated saving", formatted.monthly_savings),
    ]
    .join("\n")
}

pub fn render_bik(tables: &RateTables, inputs: &BikInputs, current: TaxYear) -> String {
    let result = calculate_bik(tables, inputs, current);

    let mut lines = vec![
        format!("Benefit-in-Kind ({})", result.fuel_type_label),
        row("P11D value", format_currency(result.p11d_value)),
        row("BiK rate", format_percent(result.bik_rate)),
        row("Annual benefit", format_currency(result.annual_benefit)),
        row(
            "Tax bracket",
            format!(
                "{} ({})",
                result.tax_bracket.name(),
                format_percent(result.marginal_rate)
            ),
        ),
        row("Annual BiK tax", format_currency(result.annual_bik_tax)),
        row("Monthly BiK tax", format_monthly_currency(result.monthly_bik_tax)),
        row("Three-year BiK tax", format_currency(result.three_year_bik_tax)),
    ];

    match result.forecast.as_ref().map(format_forecast) {
        Some(forecast) => {
            lines.push("Forecast".to_string());
            for year in forecast.forecast {
                let marker = if year.is_current_year { " *" } else { "" };
                lines.push(format!(
                    "  {:<10}{:>7}{:>10}{:>10}{marker}",
                    year.tax_year, year.bik_rate_percent, year.annual_tax, year.monthly_tax
                ));
            }
            lines.push(row("Total", forecast.total_annual_tax));
            lines.push(row("Monthly average", forecast.total_monthly_average));
        }
        None => lines.push("No forecast available for this vehicle".to_string()),
    }

    lines.join("\n")
}

pub fn render_cars(query: &str) -> String {
    let cars = catalog::search(query);
    if cars.is_empty() {
        return format!("No cars match \"{}\"", query.trim());
    }
    cars.iter()
        .map(|car| format!("{:<16}{:<18}{}", car.id, car.full_name, catalog::summary(car)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_tax_year(current: TaxYear) -> String {
    let years: Vec<String> = current
        .next_n(FORECAST_YEARS)
        .iter()
        .map(TaxYear::to_string)
        .collect();
    format!(
        "Current tax year: {current}\nForecast years: {}",
        years.join(", ")
    )
}
