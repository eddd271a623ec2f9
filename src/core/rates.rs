//! UK tax and Benefit-in-Kind rate tables.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use super::tax_year::TaxYear;
use super::types::StudentLoanPlan;

pub const PERSONAL_ALLOWANCE: f64 = 12_570.0;
pub const BASIC_RATE_THRESHOLD: f64 = 50_270.0;
pub const HIGHER_RATE_THRESHOLD: f64 = 125_140.0;
pub const BASIC_RATE: f64 = 0.20;
pub const HIGHER_RATE: f64 = 0.40;
pub const ADDITIONAL_RATE: f64 = 0.45;

pub const NI_PRIMARY_THRESHOLD: f64 = 12_570.0;
pub const NI_UPPER_EARNINGS_LIMIT: f64 = 50_270.0;
pub const NI_MAIN_RATE: f64 = 0.12;
pub const NI_UPPER_RATE: f64 = 0.02;

pub const STUDENT_LOAN_RATE: f64 = 0.09;
pub const PLAN1_THRESHOLD: f64 = 22_015.0;
pub const PLAN2_THRESHOLD: f64 = 27_295.0;
pub const PLAN4_THRESHOLD: f64 = 27_660.0;
pub const PLAN5_THRESHOLD: f64 = 25_000.0;

pub const ELECTRIC_BIK_RATE: f64 = 0.02;
pub const HYBRID_BIK_RATE: f64 = 0.08;
/// Petrol or diesel car with no CO2 figure.
pub const UNKNOWN_CO2_BIK_RATE: f64 = 0.25;

/// Upper bound (g/km, inclusive) and BiK percentage for each combustion band.
/// Emissions above the last bound pay [`CO2_CAP_PERCENT`].
const CO2_BAND_PERCENTS: [(f64, u32, BikBand); 8] = [
    (50.0, 15, BikBand::Co2Upto50),
    (75.0, 19, BikBand::Co2Upto75),
    (94.0, 22, BikBand::Co2Upto94),
    (100.0, 24, BikBand::Co2Upto100),
    (110.0, 26, BikBand::Co2Upto110),
    (130.0, 30, BikBand::Co2Upto130),
    (150.0, 34, BikBand::Co2Upto150),
    (170.0, 37, BikBand::Co2Upto170),
];
const CO2_CAP_PERCENT: u32 = 37;

/// Key into the multi-year forecast table.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum BikBand {
    #[serde(rename = "electric")]
    Electric,
    #[serde(rename = "hybrid")]
    Hybrid,
    #[serde(rename = "co2_0_50")]
    Co2Upto50,
    #[serde(rename = "co2_51_75")]
    Co2Upto75,
    #[serde(rename = "co2_76_94")]
    Co2Upto94,
    #[serde(rename = "co2_95_100")]
    Co2Upto100,
    #[serde(rename = "co2_101_110")]
    Co2Upto110,
    #[serde(rename = "co2_111_130")]
    Co2Upto130,
    #[serde(rename = "co2_131_150")]
    Co2Upto150,
    #[serde(rename = "co2_151_170")]
    Co2Upto170,
    #[serde(rename = "co2_171_plus")]
    Co2Above170,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeTaxBands {
    pub personal_allowance: f64,
    pub basic_rate_threshold: f64,
    pub higher_rate_threshold: f64,
    pub basic_rate: f64,
    pub higher_rate: f64,
    pub additional_rate: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NationalInsuranceBands {
    pub primary_threshold: f64,
    pub upper_earnings_limit: f64,
    pub main_rate: f64,
    pub upper_rate: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoanRepayment {
    pub threshold: f64,
    pub rate: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentLoanTable {
    pub plan1: LoanRepayment,
    pub plan2: LoanRepayment,
    pub plan4: LoanRepayment,
    pub plan5: LoanRepayment,
}

impl StudentLoanTable {
    pub fn repayment(&self, plan: StudentLoanPlan) -> Option<LoanRepayment> {
        match plan {
            StudentLoanPlan::None => None,
            StudentLoanPlan::Plan1 => Some(self.plan1),
            StudentLoanPlan::Plan2 => Some(self.plan2),
            StudentLoanPlan::Plan4 => Some(self.plan4),
            StudentLoanPlan::Plan5 => Some(self.plan5),
        }
    }
}

/// One combustion-engine emissions band. `max_g_km: None` is the open top band.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Co2Band {
    pub max_g_km: Option<f64>,
    pub rate: f64,
    pub band: BikBand,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BikTable {
    pub electric_rate: f64,
    pub hybrid_rate: f64,
    pub unknown_co2_rate: f64,
    pub co2_bands: Vec<Co2Band>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateTables {
    pub tax_year: TaxYear,
    pub income_tax: IncomeTaxBands,
    pub national_insurance: NationalInsuranceBands,
    pub student_loans: StudentLoanTable,
    pub bik: BikTable,
    /// Band -> tax year -> BiK rate as a fraction.
    pub forecast: BTreeMap<BikBand, BTreeMap<TaxYear, f64>>,
}

impl Default for RateTables {
    fn default() -> Self {
        Self::uk_2024_25()
    }
}

impl RateTables {
    pub fn uk_2024_25() -> Self {
        let loan = |threshold| LoanRepayment {
            threshold,
            rate: STUDENT_LOAN_RATE,
        };

        let mut co2_bands: Vec<Co2Band> = CO2_BAND_PERCENTS
            .iter()
            .map(|&(max, percent, band)| Co2Band {
                max_g_km: Some(max),
                rate: percent_to_fraction(percent),
                band,
            })
            .collect();
        co2_bands.push(Co2Band {
            max_g_km: None,
            rate: percent_to_fraction(CO2_CAP_PERCENT),
            band: BikBand::Co2Above170,
        });

        let mut forecast = BTreeMap::new();
        forecast.insert(BikBand::Electric, yearly_rates(2024, &[2, 3, 4, 5, 7, 9]));
        forecast.insert(BikBand::Hybrid, yearly_rates(2024, &[8, 9, 10, 11, 18, 19]));
        // Combustion bands rise one point a year to the cap; rates beyond
        // 2027/28 are unpublished.
        let combustion = CO2_BAND_PERCENTS
            .iter()
            .map(|&(_, percent, band)| (band, percent))
            .chain(std::iter::once((BikBand::Co2Above170, CO2_CAP_PERCENT)));
        for (band, percent) in combustion {
            let percents: Vec<u32> = (0..4)
                .map(|step| (percent + step).min(CO2_CAP_PERCENT))
                .collect();
            forecast.insert(band, yearly_rates(2024, &percents));
        }

        Self {
            tax_year: TaxYear::starting(2024),
            income_tax: IncomeTaxBands {
                personal_allowance: PERSONAL_ALLOWANCE,
                basic_rate_threshold: BASIC_RATE_THRESHOLD,
                higher_rate_threshold: HIGHER_RATE_THRESHOLD,
                basic_rate: BASIC_RATE,
                higher_rate: HIGHER_RATE,
                additional_rate: ADDITIONAL_RATE,
            },
            national_insurance: NationalInsuranceBands {
                primary_threshold: NI_PRIMARY_THRESHOLD,
                upper_earnings_limit: NI_UPPER_EARNINGS_LIMIT,
                main_rate: NI_MAIN_RATE,
                upper_rate: NI_UPPER_RATE,
            },
            student_loans: StudentLoanTable {
                plan1: loan(PLAN1_THRESHOLD),
                plan2: loan(PLAN2_THRESHOLD),
                plan4: loan(PLAN4_THRESHOLD),
                plan5: loan(PLAN5_THRESHOLD),
            },
            bik: BikTable {
                electric_rate: ELECTRIC_BIK_RATE,
                hybrid_rate: HYBRID_BIK_RATE,
                unknown_co2_rate: UNKNOWN_CO2_BIK_RATE,
                co2_bands,
            },
            forecast,
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open rate tables {}", path.display()))?;
        let tables: RateTables = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("failed to parse rate tables {}", path.display()))?;
        tables.validate()?;
        Ok(tables)
    }

    pub fn validate(&self) -> Result<()> {
        let it = &self.income_tax;
        if it.personal_allowance < 0.0
            || it.basic_rate_threshold < it.personal_allowance
            || it.higher_rate_threshold < it.basic_rate_threshold
        {
            bail!("income tax thresholds must be non-negative and ascending");
        }
        let ni = &self.national_insurance;
        if ni.primary_threshold < 0.0 || ni.upper_earnings_limit < ni.primary_threshold {
            bail!("national insurance thresholds must be non-negative and ascending");
        }

        let rates = [
            ("basicRate", it.basic_rate),
            ("higherRate", it.higher_rate),
            ("additionalRate", it.additional_rate),
            ("mainRate", ni.main_rate),
            ("upperRate", ni.upper_rate),
            ("electricRate", self.bik.electric_rate),
            ("hybridRate", self.bik.hybrid_rate),
            ("unknownCo2Rate", self.bik.unknown_co2_rate),
        ];
        for (name, rate) in rates {
            check_fraction(name, rate)?;
        }

        let loans = &self.student_loans;
        for (name, terms) in [
            ("plan1", loans.plan1),
            ("plan2", loans.plan2),
            ("plan4", loans.plan4),
            ("plan5", loans.plan5),
        ] {
            if !terms.threshold.is_finite() || terms.threshold < 0.0 {
                bail!("studentLoans.{name}.threshold must be >= 0, got {}", terms.threshold);
            }
            check_fraction(&format!("studentLoans.{name}.rate"), terms.rate)?;
        }

        for (i, band) in self.bik.co2_bands.iter().enumerate() {
            check_fraction(&format!("co2Bands[{i}].rate"), band.rate)?;
        }
        for (band, years) in &self.forecast {
            for (year, rate) in years {
                check_fraction(&format!("forecast {band:?} {year}"), *rate)?;
            }
        }

        let Some((last, bounded)) = self.bik.co2_bands.split_last() else {
            bail!("co2Bands must not be empty");
        };
        if last.max_g_km.is_some() {
            bail!("the last co2 band must be open-ended (maxGKm: null)");
        }
        let mut previous = f64::NEG_INFINITY;
        for band in bounded {
            match band.max_g_km {
                Some(max) if max > previous => previous = max,
                _ => bail!("co2 bands must have strictly ascending upper bounds"),
            }
        }
        Ok(())
    }
}

fn check_fraction(name: &str, rate: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&rate) {
        bail!("{name} must be a fraction between 0 and 1, got {rate}");
    }
    Ok(())
}

fn percent_to_fraction(percent: u32) -> f64 {
    f64::from(percent) / 100.0
}

fn yearly_rates(first_start_year: i32, percents: &[u32]) -> BTreeMap<TaxYear, f64> {
    TaxYear::starting(first_start_year)
        .next_n(percents.len())
        .into_iter()
        .zip(percents.iter().map(|&p| percent_to_fraction(p)))
        .collect()
}
