use crate::error::JobError;
use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// Default number of enrichment workers
pub const DEFAULT_WORKERS: usize = 10;

/// Intake/result queue slots per worker
pub const QUEUE_DEPTH_PER_WORKER: usize = 64;

/// Progress update interval (tick every N records)
pub const PROGRESS_INTERVAL: u64 = 1000;

/// Customer ID offset for source tag `D`
pub const DEALER_ID_OFFSET: usize = 100_000;

/// Customer ID offset for source tag `P`
pub const PROSPECT_ID_OFFSET: usize = 500_000;

/// Earth radius in statute miles
pub const EARTH_RADIUS_MILES: f64 = 3959.0;

/// Buffer size for the output CSV writer
pub const OUTPUT_BUFFER_SIZE: usize = 256 * 1024;

/// Suffix appended to an input file stem to name its output
pub const OUTPUT_SUFFIX: &str = "_output.csv";

/// Job configuration file name inside the resource directory
pub const CONFIG_FILE: &str = "config.json";

pub const ZIP_COORDINATES_FILE: &str = "USZIPCoordinates.csv";
pub const SCF_FACILITIES_FILE: &str = "SCFFacilites.csv";
pub const DDU_FACILITIES_FILE: &str = "DDUFacilites.csv";
pub const HISPANIC_SURNAMES_FILE: &str = "HispLNames.csv";
pub const DO_NOT_MAIL_FILE: &str = "DoNotMail.csv";
pub const SUPPRESSION_ADDRESS_FILE: &str = "_GeneralSuppression.csv";
pub const SUPPRESSION_NAMES_FILE: &str = "_GeneralSuppressionNames.csv";

/// Per-job settings, read from `config.json`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase", default)]
pub struct JobConfig {
    /// Reference point for radius calculation
    #[serde(rename = "CentZip", deserialize_with = "zip_from_number_or_string")]
    pub central_zip: String,
    pub max_radius: u32,
    pub max_veh_year: u32,
    pub min_veh_year: u32,
    pub max_year_del_date: u32,
    pub min_year_del_date: u32,
    /// Stamped onto every record
    pub vendor: String,
    /// Customer ID prefix selector (`D`, `P`, or anything else for a plain counter)
    pub source: String,
    #[serde(rename = "DelBlankDATE")]
    pub del_blank_date: bool,
    #[serde(rename = "DelBlankDELDATE")]
    pub del_blank_del_date: bool,
    /// Optional output header; see `Schema::from_headers`
    pub headers: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ZipValue {
    Number(u64),
    Text(String),
}

fn zip_from_number_or_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match ZipValue::deserialize(deserializer)? {
        ZipValue::Number(n) => n.to_string(),
        ZipValue::Text(s) => s.trim().to_string(),
    })
}

impl JobConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open job config: {}", path.display()))?;
        let config: JobConfig = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to decode job config: {}", path.display()))?;
        config.validate()?;

        info!(
            central_zip = %config.central_zip,
            vendor = %config.vendor,
            source = %config.source,
            "Job config loaded"
        );
        Ok(config)
    }

    /// Rejects inverted year ranges. A zero bound means "unset".
    pub fn validate(&self) -> Result<(), JobError> {
        check_range("vehicle year", self.min_veh_year, self.max_veh_year)?;
        check_range(
            "delivery date year",
            self.min_year_del_date,
            self.max_year_del_date,
        )?;
        Ok(())
    }
}

fn check_range(field: &'static str, min: u32, max: u32) -> Result<(), JobError> {
    if min > 0 && max > 0 && min > max {
        return Err(JobError::InvalidRange { field, min, max });
    }
    Ok(())
}
