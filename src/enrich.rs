//! Turns one raw input row into one canonical, enriched record.

use crate::columns::ColumnMap;
use crate::config::{JobConfig, DEALER_ID_OFFSET, PROSPECT_ID_OFFSET};
use crate::error::JobError;
use crate::geo::Coordinates;
use crate::models::RawRow;
use crate::names::NameParser;
use crate::normalize::{
    decode_year, derive_scf, expand_state, lower_case, parse_date, reformat_phone,
    standardize_address, title_case, upper_case, validate_zip,
};
use crate::reference::ReferenceData;
use crate::schema::{CanonicalRecord, Field};
use crate::stats::JobStats;
use std::sync::Arc;
use tracing::{debug, warn};

/// Value stamped into `Ethnicity` for surnames in the Hispanic table.
pub const HISPANIC_FLAG: &str = "Hisp";

/// Per-job enrichment context, shared read-only by every worker.
pub struct RecordEnricher {
    columns: ColumnMap,
    reference: Arc<ReferenceData>,
    config: Arc<JobConfig>,
    names: NameParser,
    central: Coordinates,
    stats: Arc<JobStats>,
}

/// Joins the non-empty parts with a single space.
fn join_present(a: &str, b: &str) -> String {
    match (a.is_empty(), b.is_empty()) {
        (false, false) => format!("{a} {b}"),
        (false, true) => a.to_string(),
        (true, false) => b.to_string(),
        (true, true) => String::new(),
    }
}

fn fold_case(field: Field, value: &str) -> String {
    match field {
        Field::State | Field::Vin => upper_case(value),
        Field::Email => lower_case(value),
        Field::Hph | Field::Bph | Field::Cph => reformat_phone(value),
        Field::Address1 | Field::Address2 => standardize_address(value),
        Field::Year => decode_year(&title_case(value)).into_owned(),
        _ => title_case(value),
    }
}

impl RecordEnricher {
    /// Fails when the configured central zip has no coordinates, since no
    /// record could then be given a radius.
    pub fn new(
        columns: ColumnMap,
        reference: Arc<ReferenceData>,
        config: Arc<JobConfig>,
    ) -> Result<Self, JobError> {
        let central = validate_zip(&config.central_zip)
            .and_then(|zip| reference.coordinates(zip))
            .ok_or_else(|| JobError::InvalidCentralZip(config.central_zip.clone()))?;

        Ok(Self {
            columns,
            reference,
            config,
            names: NameParser::default(),
            central,
            stats: Arc::new(JobStats::new()),
        })
    }

    pub fn with_stats(mut self, stats: Arc<JobStats>) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_name_parser(mut self, names: NameParser) -> Self {
        self.names = names;
        self
    }

    pub fn stats(&self) -> &Arc<JobStats> {
        &self.stats
    }

    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    pub fn central(&self) -> Coordinates {
        self.central
    }

    /// Sequential ID derived from the row index and the configured source tag.
    pub fn customer_id(&self, index: usize) -> String {
        let mut buf = itoa::Buffer::new();
        match upper_case(&self.config.source).as_str() {
            "D" => format!("D{}", buf.format(index + DEALER_ID_OFFSET)),
            "P" => format!("P{}", buf.format(index + PROSPECT_ID_OFFSET)),
            _ => format!("{index:06}"),
        }
    }

    pub fn enrich(&self, row: &RawRow) -> CanonicalRecord {
        let mut rec = CanonicalRecord::new();

        // unmapped fields stay empty, so only mapped ones need case folding
        for (field, column) in self.columns.mapped() {
            rec.set(field, fold_case(field, row.cell(column)));
        }

        rec.set(Field::CustomerId, self.customer_id(row.index));

        self.fill_names(&mut rec);

        let address = join_present(rec.get(Field::Address1), rec.get(Field::Address2));
        rec.set(Field::AddressFull, address);

        if let Some(phone) = [Field::Hph, Field::Bph, Field::Cph]
            .into_iter()
            .map(|f| rec.get(f))
            .find(|p| !p.is_empty())
        {
            let phone = phone.to_string();
            rec.set(Field::Phone, phone);
        }

        let vin_len = itoa::Buffer::new().format(rec.get(Field::Vin).len()).to_string();
        rec.set(Field::VinLen, vin_len);

        let zip_crrt = format!("{}{}", rec.get(Field::Zip), rec.get(Field::Crrt));
        rec.set(Field::ZipCrrt, zip_crrt);

        self.fill_geodesy(&mut rec, row.index);

        for (date_field, year, month, day) in [
            (Field::DelDate, Field::DldYear, Field::DldMonth, Field::DldDay),
            (Field::Date, Field::LsdYear, Field::LsdMonth, Field::LsdDay),
        ] {
            match parse_date(rec.get(date_field)) {
                Some(d) => {
                    rec.set(date_field, d.formatted());
                    rec.set(year, d.year());
                    rec.set(month, d.month());
                    rec.set(day, d.day());
                }
                None => {
                    for f in [date_field, year, month, day] {
                        rec.set(f, "");
                    }
                }
            }
        }

        let state = expand_state(rec.get(Field::State));
        rec.set(Field::ExpandedState, state);

        let scf = derive_scf(rec.get(Field::Zip)).to_string();
        if let Some(name) = self.reference.ddu_facility(rec.get(Field::Zip)) {
            rec.set(Field::DduFacility, name);
        }
        if let Some(name) = self.reference.scf_facility(&scf) {
            rec.set(Field::Scf3dFacility, name);
        }
        rec.set(Field::Scf, scf);

        if self
            .reference
            .hispanic_surname(rec.get(Field::LastName))
            .is_some()
        {
            rec.set(Field::Ethnicity, HISPANIC_FLAG);
        }

        rec.set(Field::Vendor, self.config.vendor.as_str());

        rec
    }

    fn fill_names(&self, rec: &mut CanonicalRecord) {
        let full = rec.get(Field::FullName);
        if !full.is_empty() && rec.is_blank(Field::FirstName) && rec.is_blank(Field::LastName) {
            let parsed = self.names.parse(full);
            rec.set(Field::FirstName, parsed.first);
            rec.set(Field::Mi, parsed.middle);
            rec.set(Field::LastName, parsed.last);
            self.stats.inc_names_parsed();
        } else if full.is_empty() {
            let full = join_present(rec.get(Field::FirstName), rec.get(Field::LastName));
            rec.set(Field::FullName, full);
        }
    }

    fn fill_geodesy(&self, rec: &mut CanonicalRecord, index: usize) {
        let raw_zip = rec.take(Field::Zip);
        let zip = validate_zip(&raw_zip).unwrap_or("");
        rec.set(Field::Zip, zip);

        let Some(coords) = self.reference.coordinates(zip) else {
            warn!(
                row = index,
                zip = %raw_zip,
                city = rec.get(Field::City),
                state = rec.get(Field::State),
                "Invalid zip code"
            );
            self.stats.inc_invalid_zips();
            return;
        };

        let miles = self.central.distance_to(&coords);
        rec.set(Field::Radius, format!("{miles:.2}"));
        rec.set(Field::Coordinates, coords.to_string());

        let max = self.config.max_radius;
        if max > 0 && miles > f64::from(max) {
            debug!(row = index, miles, max_radius = max, "Record beyond max radius");
            self.stats.inc_beyond_radius();
        }
    }

    /// False when a blank-date suppression flag applies to `rec`.
    pub fn retains(&self, rec: &CanonicalRecord) -> bool {
        !(self.config.del_blank_date && rec.is_blank(Field::Date)
            || self.config.del_blank_del_date && rec.is_blank(Field::DelDate))
    }

    /// Counts suppression-table hits. Records are never dropped for them.
    pub fn audit_suppression(&self, rec: &CanonicalRecord) {
        if self.reference.is_do_not_mail(rec.get(Field::FullName)) {
            self.stats.inc_do_not_mail();
        }
        if self
            .reference
            .is_suppressed_name(rec.get(Field::FirstName), rec.get(Field::LastName))
        {
            self.stats.inc_suppressed_name();
        }
        if self
            .reference
            .is_suppressed_address(rec.get(Field::Address1), rec.get(Field::Zip))
        {
            self.stats.inc_suppressed_address();
        }
    }
}
