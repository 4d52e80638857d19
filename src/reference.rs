use crate::config::{
    DDU_FACILITIES_FILE, DO_NOT_MAIL_FILE, HISPANIC_SURNAMES_FILE, SCF_FACILITIES_FILE,
    SUPPRESSION_ADDRESS_FILE, SUPPRESSION_NAMES_FILE, ZIP_COORDINATES_FILE,
};
use crate::geo::Coordinates;
use crate::normalize::title_case;
use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord};
use rustc_hash::FxHashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{info, warn};

/// Read-only lookup tables shared by every worker for the whole job.
#[derive(Debug, Default, Clone)]
pub struct ReferenceData {
    zip_coordinates: FxHashMap<String, Coordinates>,
    scf_facilities: FxHashMap<String, String>,
    ddu_facilities: FxHashMap<String, String>,
    hispanic_surnames: FxHashMap<String, u32>,
    do_not_mail: FxHashMap<String, u32>,
    suppressed_addresses: FxHashMap<String, u32>,
    suppressed_names: FxHashMap<String, u32>,
}

fn pair_key(a: &str, b: &str) -> String {
    let mut key = String::with_capacity(a.len() + b.len() + 1);
    key.push_str(a);
    key.push(' ');
    key.push_str(b);
    key
}

impl ReferenceData {
    /// Loads every table from `dir`. A missing table is fatal.
    pub fn load(dir: &Path) -> Result<Self> {
        let mut data = Self::default();

        for_each_row(&dir.join(ZIP_COORDINATES_FILE), |row| {
            let zip = field(row, 0);
            match (
                field(row, 1).trim().parse::<f64>(),
                field(row, 2).trim().parse::<f64>(),
            ) {
                (Ok(lat), Ok(lon)) => {
                    data.zip_coordinates
                        .insert(zip.to_string(), Coordinates::new(lat, lon));
                }
                _ => warn!(zip, "Skipping zip coordinate row with unparsable lat/lon"),
            }
        })?;
        for_each_row(&dir.join(SCF_FACILITIES_FILE), |row| {
            data.scf_facilities
                .insert(field(row, 0).to_string(), field(row, 1).to_string());
        })?;
        for_each_row(&dir.join(DDU_FACILITIES_FILE), |row| {
            data.ddu_facilities
                .insert(field(row, 0).to_string(), field(row, 1).to_string());
        })?;
        for_each_row(&dir.join(HISPANIC_SURNAMES_FILE), |row| {
            *data.hispanic_surnames.entry(title_case(field(row, 0))).or_default() += 1;
        })?;
        for_each_row(&dir.join(DO_NOT_MAIL_FILE), |row| {
            *data.do_not_mail.entry(title_case(field(row, 0))).or_default() += 1;
        })?;
        for_each_row(&dir.join(SUPPRESSION_ADDRESS_FILE), |row| {
            let key = pair_key(&title_case(field(row, 2)), &title_case(field(row, 5)));
            *data.suppressed_addresses.entry(key).or_default() += 1;
        })?;
        for_each_row(&dir.join(SUPPRESSION_NAMES_FILE), |row| {
            let key = pair_key(&title_case(field(row, 0)), &title_case(field(row, 1)));
            *data.suppressed_names.entry(key).or_default() += 1;
        })?;

        info!(
            zips = data.zip_coordinates.len(),
            scf_facilities = data.scf_facilities.len(),
            ddu_facilities = data.ddu_facilities.len(),
            hispanic_surnames = data.hispanic_surnames.len(),
            do_not_mail = data.do_not_mail.len(),
            suppressed_addresses = data.suppressed_addresses.len(),
            suppressed_names = data.suppressed_names.len(),
            "Reference data loaded"
        );
        Ok(data)
    }

    pub fn coordinates(&self, zip: &str) -> Option<Coordinates> {
        self.zip_coordinates.get(zip).copied()
    }

    pub fn scf_facility(&self, scf: &str) -> Option<&str> {
        self.scf_facilities.get(scf).map(String::as_str)
    }

    pub fn ddu_facility(&self, zip: &str) -> Option<&str> {
        self.ddu_facilities.get(zip).map(String::as_str)
    }

    /// Number of times `surname` appears in the Hispanic surname table.
    pub fn hispanic_surname(&self, surname: &str) -> Option<u32> {
        self.hispanic_surnames.get(surname).copied()
    }

    pub fn is_do_not_mail(&self, name: &str) -> bool {
        self.do_not_mail.contains_key(name)
    }

    pub fn is_suppressed_address(&self, address: &str, zip: &str) -> bool {
        self.suppressed_addresses.contains_key(&pair_key(address, zip))
    }

    pub fn is_suppressed_name(&self, first: &str, last: &str) -> bool {
        self.suppressed_names.contains_key(&pair_key(first, last))
    }

    pub fn with_zip(mut self, zip: &str, lat: f64, lon: f64) -> Self {
        self.zip_coordinates
            .insert(zip.to_string(), Coordinates::new(lat, lon));
        self
    }

    pub fn with_scf_facility(mut self, scf: &str, name: &str) -> Self {
        self.scf_facilities.insert(scf.to_string(), name.to_string());
        self
    }

    pub fn with_ddu_facility(mut self, zip: &str, name: &str) -> Self {
        self.ddu_facilities.insert(zip.to_string(), name.to_string());
        self
    }

    pub fn with_hispanic_surname(mut self, surname: &str) -> Self {
        *self
            .hispanic_surnames
            .entry(title_case(surname))
            .or_default() += 1;
        self
    }

    pub fn with_do_not_mail(mut self, name: &str) -> Self {
        *self.do_not_mail.entry(title_case(name)).or_default() += 1;
        self
    }

    pub fn with_suppressed_address(mut self, address: &str, zip: &str) -> Self {
        let key = pair_key(&title_case(address), &title_case(zip));
        *self.suppressed_addresses.entry(key).or_default() += 1;
        self
    }

    pub fn with_suppressed_name(mut self, first: &str, last: &str) -> Self {
        let key = pair_key(&title_case(first), &title_case(last));
        *self.suppressed_names.entry(key).or_default() += 1;
        self
    }
}

fn field(row: &StringRecord, i: usize) -> &str {
    row.get(i).unwrap_or("")
}

/// Streams a header-less CSV table.
fn for_each_row(path: &Path, mut f: impl FnMut(&StringRecord)) -> Result<()> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open reference table: {}", path.display()))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .from_reader(BufReader::new(file));

    let mut row = StringRecord::new();
    while reader
        .read_record(&mut row)
        .with_context(|| format!("Failed to read reference table: {}", path.display()))?
    {
        f(&row);
    }
    Ok(())
}
