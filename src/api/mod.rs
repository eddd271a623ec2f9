mod args;

pub use args::{
    BikArgs, CliFuelType, CliStudentLoanPlan, SacrificeArgs, build_bik_inputs,
    build_calculator_inputs, validate_quote_salary,
};

use axum::{
    Router,
    extract::{Json, Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::catalog::{self, Car, CarQuote};
use crate::core::{
    BikInputs, BikResult, CalculationResult, CalculatorInputs, FORECAST_YEARS, RateTables,
    TaxBracket, TaxYear, calculate_bik, calculate_salary_sacrifice, current_tax_year,
    next_tax_years, tax_bracket,
};
use crate::format::{
    FormattedBikForecast, FormattedCalculation, format_calculation, format_currency,
    format_forecast,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ApiStudentLoanPlan {
    None,
    #[serde(alias = "plan-1", alias = "plan_1")]
    Plan1,
    #[serde(alias = "plan-2", alias = "plan_2")]
    Plan2,
    #[serde(alias = "plan-4", alias = "plan_4")]
    Plan4,
    #[serde(alias = "plan-5", alias = "plan_5")]
    Plan5,
}

impl From<ApiStudentLoanPlan> for CliStudentLoanPlan {
    fn from(value: ApiStudentLoanPlan) -> Self {
        match value {
            ApiStudentLoanPlan::None => CliStudentLoanPlan::None,
            ApiStudentLoanPlan::Plan1 => CliStudentLoanPlan::Plan1,
            ApiStudentLoanPlan::Plan2 => CliStudentLoanPlan::Plan2,
            ApiStudentLoanPlan::Plan4 => CliStudentLoanPlan::Plan4,
            ApiStudentLoanPlan::Plan5 => CliStudentLoanPlan::Plan5,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ApiFuelType {
    #[serde(alias = "ev", alias = "bev")]
    Electric,
    #[serde(alias = "phev")]
    Hybrid,
    Petrol,
    Diesel,
}

impl From<ApiFuelType> for CliFuelType {
    fn from(value: ApiFuelType) -> Self {
        match value {
            ApiFuelType::Electric => CliFuelType::Electric,
            ApiFuelType::Hybrid => CliFuelType::Hybrid,
            ApiFuelType::Petrol => CliFuelType::Petrol,
            ApiFuelType::Diesel => CliFuelType::Diesel,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SacrificePayload {
    salary: Option<f64>,
    car_value: Option<f64>,
    monthly_lease: Option<f64>,
    bik_rate: Option<f64>,
    student_loan_plan: Option<ApiStudentLoanPlan>,
    pension_contribution: Option<f64>,
    employer_pension_contribution: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct BikPayload {
    salary: Option<f64>,
    car_value: Option<f64>,
    fuel_type: Option<ApiFuelType>,
    co2_emissions: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CarSearchQuery {
    q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QuoteQuery {
    salary: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SacrificeResponse {
    inputs: CalculatorInputs,
    tax_bracket: TaxBracket,
    result: CalculationResult,
    formatted: FormattedCalculation,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BikResponse {
    inputs: BikInputs,
    result: BikResult,
    formatted_forecast: Option<FormattedBikForecast>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CarListing {
    #[serde(flatten)]
    car: &'static Car,
    summary: String,
}

#[derive(Debug, Serialize)]
struct CarsResponse {
    cars: Vec<CarListing>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QuoteResponse {
    #[serde(flatten)]
    quote: CarQuote,
    formatted: FormattedCalculation,
    formatted_four_year_savings: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TaxYearResponse {
    current: TaxYear,
    forecast_years: Vec<TaxYear>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(tables: Arc<RateTables>) -> Router {
    Router::new()
        .route(
            "/api/salary-sacrifice",
            get(sacrifice_get_handler).post(sacrifice_post_handler),
        )
        .route("/api/bik", get(bik_get_handler).post(bik_post_handler))
        .route("/api/cars", get(cars_handler))
        .route("/api/cars/:id", get(car_handler))
        .route("/api/cars/:id/quote", get(quote_handler))
        .route("/api/tax-year", get(tax_year_handler))
        .fallback(not_found_handler)
        .with_state(tables)
}

pub async fn run_http_server(port: u16, tables: Arc<RateTables>) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router(tables);

    let listener = TcpListener::bind(addr).await?;
    info!("EV salary-sacrifice API listening on http://{addr}");
    info!("Local access: http://127.0.0.1:{port}/api/tax-year");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn sacrifice_get_handler(
    State(tables): State<Arc<RateTables>>,
    Query(payload): Query<SacrificePayload>,
) -> Response {
    sacrifice_handler_impl(&tables, payload)
}

async fn sacrifice_post_handler(
    State(tables): State<Arc<RateTables>>,
    Json(payload): Json<SacrificePayload>,
) -> Response {
    sacrifice_handler_impl(&tables, payload)
}

fn sacrifice_handler_impl(tables: &RateTables, payload: SacrificePayload) -> Response {
    match sacrifice_inputs_from_payload(payload) {
        Ok(inputs) => json_response(StatusCode::OK, build_sacrifice_response(tables, inputs)),
        Err(msg) => {
            debug!("Rejected salary-sacrifice request: {msg}");
            error_response(StatusCode::BAD_REQUEST, &msg)
        }
    }
}

async fn bik_get_handler(
    State(tables): State<Arc<RateTables>>,
    Query(payload): Query<BikPayload>,
) -> Response {
    bik_handler_impl(&tables, payload)
}

async fn bik_post_handler(
    State(tables): State<Arc<RateTables>>,
    Json(payload): Json<BikPayload>,
) -> Response {
    bik_handler_impl(&tables, payload)
}

fn bik_handler_impl(tables: &RateTables, payload: BikPayload) -> Response {
    match bik_inputs_from_payload(payload) {
        Ok(inputs) => json_response(
            StatusCode::OK,
            build_bik_response(tables, inputs, current_tax_year()),
        ),
        Err(msg) => {
            debug!("Rejected BiK request: {msg}");
            error_response(StatusCode::BAD_REQUEST, &msg)
        }
    }
}

async fn cars_handler(Query(query): Query<CarSearchQuery>) -> Response {
    let cars = catalog::search(query.q.as_deref().unwrap_or_default())
        .into_iter()
        .map(car_listing)
        .collect();
    json_response(StatusCode::OK, CarsResponse { cars })
}

async fn car_handler(Path(id): Path<String>) -> Response {
    match catalog::by_id(&id) {
        Some(car) => json_response(StatusCode::OK, car_listing(car)),
        None => error_response(StatusCode::NOT_FOUND, &format!("Unknown car: {id}")),
    }
}

async fn quote_handler(
    State(tables): State<Arc<RateTables>>,
    Path(id): Path<String>,
    Query(query): Query<QuoteQuery>,
) -> Response {
    let Some(car) = catalog::by_id(&id) else {
        return error_response(StatusCode::NOT_FOUND, &format!("Unknown car: {id}"));
    };
    let salary = query.salary.unwrap_or(SacrificeArgs::default().salary);
    let salary = match validate_quote_salary(salary) {
        Ok(salary) => salary,
        Err(msg) => {
            debug!("Rejected quote for {id}: {msg}");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };

    let quote = catalog::quote(&tables, salary, car);
    info!(
        "quote: car={} salary={salary} monthly_savings={:.2} four_year_savings={:.2}",
        car.id, quote.result.monthly_savings, quote.four_year_savings
    );
    json_response(
        StatusCode::OK,
        QuoteResponse {
            formatted: format_calculation(&quote.result),
            formatted_four_year_savings: format_currency(quote.four_year_savings),
            quote,
        },
    )
}

async fn tax_year_handler() -> Response {
    json_response(
        StatusCode::OK,
        TaxYearResponse {
            current: current_tax_year(),
            forecast_years: next_tax_years(FORECAST_YEARS),
        },
    )
}

fn car_listing(car: &'static Car) -> CarListing {
    CarListing {
        car,
        summary: catalog::summary(car),
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

fn sacrifice_inputs_from_payload(payload: SacrificePayload) -> Result<CalculatorInputs, String> {
    let mut args = SacrificeArgs::default();

    if let Some(v) = payload.salary {
        args.salary = v;
    }
    if let Some(v) = payload.car_value {
        args.car_value = v;
    }
    if let Some(v) = payload.monthly_lease {
        args.monthly_lease = v;
    }
    if let Some(v) = payload.bik_rate {
        args.bik_rate = v;
    }
    if let Some(v) = payload.student_loan_plan {
        args.student_loan_plan = v.into();
    }
    if let Some(v) = payload.pension_contribution {
        args.pension_contribution = v;
    }
    if let Some(v) = payload.employer_pension_contribution {
        args.employer_pension_contribution = v;
    }

    build_calculator_inputs(args)
}

fn bik_inputs_from_payload(payload: BikPayload) -> Result<BikInputs, String> {
    let mut args = BikArgs::default();

    if let Some(v) = payload.salary {
        args.salary = v;
    }
    if let Some(v) = payload.car_value {
        args.car_value = v;
    }
    if let Some(v) = payload.fuel_type {
        args.fuel_type = v.into();
    }
    args.co2_emissions = payload.co2_emissions;

    build_bik_inputs(args)
}

fn build_sacrifice_response(tables: &RateTables, inputs: CalculatorInputs) -> SacrificeResponse {
    let result = calculate_salary_sacrifice(tables, &inputs);
    let bracket = tax_bracket(tables, inputs.salary);
    info!(
        "salary-sacrifice: salary={} lease={} bik={}% plan={} -> net={:.2} monthly_savings={:.2}",
        inputs.salary,
        inputs.monthly_lease,
        inputs.bik_rate,
        inputs.student_loan_plan.label(),
        result.net_salary,
        result.monthly_savings
    );
    SacrificeResponse {
        inputs,
        tax_bracket: bracket,
        formatted: format_calculation(&result),
        result,
    }
}

fn build_bik_response(tables: &RateTables, inputs: BikInputs, current: TaxYear) -> BikResponse {
    let result = calculate_bik(tables, &inputs, current);
    info!(
        "bik: fuel={} co2={:?} value={} -> rate={} annual_tax={:.2}",
        result.fuel_type_label,
        inputs.co2_emissions,
        inputs.car_value,
        result.bik_rate,
        result.annual_bik_tax
    );
    BikResponse {
        inputs,
        formatted_forecast: result.forecast.as_ref().map(format_forecast),
        result,
    }
}

#[cfg(test)]
fn sacrifice_inputs_from_json(json: &str) -> Result<CalculatorInputs, String> {
    let payload = serde_json::from_str::<SacrificePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    sacrifice_inputs_from_payload(payload)
}

#[cfg(test)]
fn bik_inputs_from_json(json: &str) -> Result<BikInputs, String> {
    let payload = serde_json::from_str::<BikPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    bik_inputs_from_payload(payload)
}
