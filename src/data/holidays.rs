//! Holiday providers.
//!
//! The series core only needs a membership-testable `HolidaySet`. Providers
//! report named holidays per calendar year; `holiday_set_for` stitches the
//! years an interval spans into one set.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::domain::{BoardConfig, Holiday, HolidaySet, HolidaySource};
use crate::error::AppError;
use crate::io::parse_date;

const DEFAULT_BASE_URL: &str = "https://date.nager.at";

/// Supplies the holidays observed in one calendar year.
pub trait HolidayProvider {
    fn holidays_for_year(&self, year: i32) -> Result<Vec<Holiday>, AppError>;

    /// Short label for status lines and logs.
    fn describe(&self) -> String;
}

/// Build a set covering every year in `years`.
pub fn holiday_set_for(provider: &dyn HolidayProvider, years: &[i32]) -> Result<HolidaySet, AppError> {
    let mut set = HolidaySet::new();
    for &year in years {
        let holidays = provider.holidays_for_year(year)?;
        debug!(year, count = holidays.len(), source = %provider.describe(), "holidays resolved");
        set.extend(holidays.into_iter().map(|h| h.date));
    }
    Ok(set)
}

/// Pick the provider named by the config.
pub fn provider_for(config: &BoardConfig) -> Result<Box<dyn HolidayProvider>, AppError> {
    Ok(match &config.holiday_source {
        HolidaySource::Api => Box::new(NagerClient::from_env(&config.region)?),
        HolidaySource::File(path) => Box::new(FileHolidays::new(path.clone())),
        HolidaySource::None => Box::new(NoHolidays),
    })
}

/// No holidays observed.
pub struct NoHolidays;

impl HolidayProvider for NoHolidays {
    fn holidays_for_year(&self, _year: i32) -> Result<Vec<Holiday>, AppError> {
        Ok(Vec::new())
    }

    fn describe(&self) -> String {
        "none".to_string()
    }
}

/// Holidays listed in a CSV file with a `date` column and an optional `name`.
pub struct FileHolidays {
    path: PathBuf,
}

impl FileHolidays {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl HolidayProvider for FileHolidays {
    fn holidays_for_year(&self, year: i32) -> Result<Vec<Holiday>, AppError> {
        let file = std::fs::File::open(&self.path).map_err(|e| {
            AppError::new(2, format!("Failed to open holidays file '{}': {e}", self.path.display()))
        })?;
        let all = read_holiday_csv(file)?;
        Ok(all.into_iter().filter(|h| h.date.year() == year).collect())
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

fn read_holiday_csv<R: std::io::Read>(reader: R) -> Result<Vec<Holiday>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read holidays header: {e}")))?
        .clone();
    let position = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}').eq_ignore_ascii_case(name))
    };
    let date_idx = position("date").ok_or_else(|| AppError::new(2, "Holidays file needs a `date` column."))?;
    let name_idx = position("name");

    let mut out = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| AppError::new(2, format!("Holidays file line {}: {e}", idx + 2)))?;
        let raw = record.get(date_idx).unwrap_or("");
        let date = parse_date(raw)
            .ok_or_else(|| AppError::new(2, format!("Holidays file line {}: invalid date '{raw}'", idx + 2)))?;
        let name = name_idx
            .and_then(|i| record.get(i))
            .unwrap_or("")
            .to_string();
        out.push(Holiday { date, name });
    }
    Ok(out)
}

/// Client for the Nager.Date public holiday API.
///
/// `region` is an ISO country code, optionally with a subdivision
/// (`BR`, `BR-SP`). National holidays always apply; subdivision holidays
/// apply only when the region names that subdivision.
pub struct NagerClient {
    client: Client,
    base_url: String,
    region: String,
}

impl NagerClient {
    pub fn new(base_url: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            region: region.into().to_ascii_uppercase(),
        }
    }

    /// Base URL from `HOLIDAY_API_URL` (environment or `.env`), else the public API.
    pub fn from_env(region: &str) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let base_url = std::env::var("HOLIDAY_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        if country_code(region).is_empty() {
            return Err(AppError::new(2, "Holiday region must start with a country code (e.g. BR or BR-SP)."));
        }
        Ok(Self::new(base_url, region))
    }

    fn fetch_year(&self, year: i32) -> Result<Vec<NagerHoliday>, AppError> {
        let url = format!(
            "{}/api/v3/PublicHolidays/{year}/{}",
            self.base_url,
            country_code(&self.region)
        );
        info!(%url, "fetching public holidays");

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| AppError::new(4, format!("Holiday request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("Holiday request for {} {year} failed with status {}.", self.region, resp.status()),
            ));
        }

        resp.json()
            .map_err(|e| AppError::new(4, format!("Failed to parse holiday response: {e}")))
    }
}

impl HolidayProvider for NagerClient {
    fn holidays_for_year(&self, year: i32) -> Result<Vec<Holiday>, AppError> {
        let raw = self.fetch_year(year)?;
        select_for_region(raw, &self.region)
    }

    fn describe(&self) -> String {
        format!("api {}", self.region)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NagerHoliday {
    date: String,
    local_name: String,
    #[serde(default)]
    global: bool,
    #[serde(default)]
    counties: Option<Vec<String>>,
}

fn country_code(region: &str) -> &str {
    region.split('-').next().unwrap_or("").trim()
}

fn select_for_region(raw: Vec<NagerHoliday>, region: &str) -> Result<Vec<Holiday>, AppError> {
    // Some dates carry more than one entry (e.g. national + regional names).
    let mut by_date: BTreeMap<NaiveDate, String> = BTreeMap::new();
    for h in raw {
        let applies = h.global
            || h
                .counties
                .as_ref()
                .is_some_and(|c| c.iter().any(|sub| sub.eq_ignore_ascii_case(region)));
        if !applies {
            continue;
        }
        let date = NaiveDate::parse_from_str(&h.date, "%Y-%m-%d")
            .map_err(|e| AppError::new(4, format!("Invalid holiday date '{}': {e}", h.date)))?;
        by_date.entry(date).or_insert(h.local_name);
    }
    Ok(by_date
        .into_iter()
        .map(|(date, name)| Holiday { date, name })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {"date":"2025-01-01","localName":"Confraternização Universal","name":"New Year's Day","countryCode":"BR","fixed":false,"global":true,"counties":null,"launchYear":null,"types":["Public"]},
        {"date":"2025-01-25","localName":"Aniversário de São Paulo","name":"São Paulo Anniversary","countryCode":"BR","fixed":false,"global":false,"counties":["BR-SP"],"launchYear":null,"types":["Public"]},
        {"date":"2025-03-19","localName":"São José","name":"Saint Joseph's Day","countryCode":"BR","fixed":false,"global":false,"counties":["BR-CE"],"launchYear":null,"types":["Public"]}
    ]"#;

    fn parsed() -> Vec<NagerHoliday> {
        serde_json::from_str(SAMPLE).unwrap()
    }

    #[test]
    fn national_region_keeps_only_global_holidays() {
        let holidays = select_for_region(parsed(), "BR").unwrap();
        assert_eq!(holidays.len(), 1);
        assert_eq!(holidays[0].date, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    }

    #[test]
    fn subdivision_region_adds_its_own_holidays() {
        let holidays = select_for_region(parsed(), "BR-SP").unwrap();
        let dates: Vec<String> = holidays.iter().map(|h| h.date.to_string()).collect();
        assert_eq!(dates, vec!["2025-01-01", "2025-01-25"]);
    }

    #[test]
    fn holiday_csv_reads_dates_and_names() {
        let csv = "date,name\n2025-04-18,Sexta-feira Santa\n2025-04-21,Tiradentes\n";
        let holidays = read_holiday_csv(csv.as_bytes()).unwrap();
        assert_eq!(holidays.len(), 2);
        assert_eq!(holidays[1].name, "Tiradentes");
    }

    struct Fixed(Vec<Holiday>);

    impl HolidayProvider for Fixed {
        fn holidays_for_year(&self, year: i32) -> Result<Vec<Holiday>, AppError> {
            Ok(self.0.iter().filter(|h| h.date.year() == year).cloned().collect())
        }

        fn describe(&self) -> String {
            "fixed".to_string()
        }
    }

    #[test]
    fn set_spans_requested_years() {
        let provider = Fixed(vec![
            Holiday { date: NaiveDate::from_ymd_opt(2024, 12, 25).unwrap(), name: "Natal".to_string() },
            Holiday { date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), name: "Ano Novo".to_string() },
            Holiday { date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(), name: "Ano Novo".to_string() },
        ]);
        let set = holiday_set_for(&provider, &[2024, 2025]).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains(NaiveDate::from_ymd_opt(2024, 12, 25).unwrap()));
        assert!(!set.contains(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()));
    }
}
