use std::fmt;
use tracing::warn;

/// Number of canonical output slots.
pub const FIELD_COUNT: usize = 51;

/// Canonical output slots, declared in canonical header order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    CustomerId,
    FullName,
    FirstName,
    Mi,
    LastName,
    Address1,
    Address2,
    AddressFull,
    City,
    State,
    Zip,
    Zip4,
    Scf,
    Phone,
    Hph,
    Bph,
    Cph,
    Email,
    Vin,
    Year,
    Make,
    Model,
    DelDate,
    Date,
    Radius,
    Coordinates,
    VinLen,
    DsfWalkSeq,
    Crrt,
    ZipCrrt,
    Kbb,
    BuybackValue,
    WinNum,
    MailDnq,
    BlitzDnq,
    Drop,
    Purl,
    DduFacility,
    Scf3dFacility,
    Vendor,
    ExpandedState,
    Ethnicity,
    DldYear,
    DldMonth,
    DldDay,
    LsdYear,
    LsdMonth,
    LsdDay,
    Misc1,
    Misc2,
    Misc3,
}

impl Field {
    pub const ALL: [Field; FIELD_COUNT] = [
        Field::CustomerId,
        Field::FullName,
        Field::FirstName,
        Field::Mi,
        Field::LastName,
        Field::Address1,
        Field::Address2,
        Field::AddressFull,
        Field::City,
        Field::State,
        Field::Zip,
        Field::Zip4,
        Field::Scf,
        Field::Phone,
        Field::Hph,
        Field::Bph,
        Field::Cph,
        Field::Email,
        Field::Vin,
        Field::Year,
        Field::Make,
        Field::Model,
        Field::DelDate,
        Field::Date,
        Field::Radius,
        Field::Coordinates,
        Field::VinLen,
        Field::DsfWalkSeq,
        Field::Crrt,
        Field::ZipCrrt,
        Field::Kbb,
        Field::BuybackValue,
        Field::WinNum,
        Field::MailDnq,
        Field::BlitzDnq,
        Field::Drop,
        Field::Purl,
        Field::DduFacility,
        Field::Scf3dFacility,
        Field::Vendor,
        Field::ExpandedState,
        Field::Ethnicity,
        Field::DldYear,
        Field::DldMonth,
        Field::DldDay,
        Field::LsdYear,
        Field::LsdMonth,
        Field::LsdDay,
        Field::Misc1,
        Field::Misc2,
        Field::Misc3,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Header spelling used when the job does not configure its own.
    pub fn name(self) -> &'static str {
        match self {
            Field::CustomerId => "CustomerID",
            Field::FullName => "FullName",
            Field::FirstName => "FirstName",
            Field::Mi => "MI",
            Field::LastName => "LastName",
            Field::Address1 => "Address1",
            Field::Address2 => "Address2",
            Field::AddressFull => "AddressFull",
            Field::City => "City",
            Field::State => "State",
            Field::Zip => "Zip",
            Field::Zip4 => "Zip4",
            Field::Scf => "SCF",
            Field::Phone => "Phone",
            Field::Hph => "HPH",
            Field::Bph => "BPH",
            Field::Cph => "CPH",
            Field::Email => "Email",
            Field::Vin => "VIN",
            Field::Year => "Year",
            Field::Make => "Make",
            Field::Model => "Model",
            Field::DelDate => "DelDate",
            Field::Date => "Date",
            Field::Radius => "Radius",
            Field::Coordinates => "Coordinates",
            Field::VinLen => "VINLen",
            Field::DsfWalkSeq => "DSF_WALK_SEQ",
            Field::Crrt => "CRRT",
            Field::ZipCrrt => "ZipCRRT",
            Field::Kbb => "KBB",
            Field::BuybackValue => "BuybackValue",
            Field::WinNum => "WinNum",
            Field::MailDnq => "MailDNQ",
            Field::BlitzDnq => "BlitzDNQ",
            Field::Drop => "Drop",
            Field::Purl => "PURL",
            Field::DduFacility => "DDUFacility",
            Field::Scf3dFacility => "SCF3DFacility",
            Field::Vendor => "Vendor",
            Field::ExpandedState => "ExpandedState",
            Field::Ethnicity => "Ethnicity",
            Field::DldYear => "DLDYear",
            Field::DldMonth => "DLDMonth",
            Field::DldDay => "DLDDay",
            Field::LsdYear => "LSDYear",
            Field::LsdMonth => "LSDMonth",
            Field::LsdDay => "LSDDay",
            Field::Misc1 => "Misc1",
            Field::Misc2 => "Misc2",
            Field::Misc3 => "Misc3",
        }
    }

    /// Resolves a configured header cell, ignoring case and underscores.
    pub fn from_header(cell: &str) -> Option<Field> {
        let wanted = header_key(cell);
        Field::ALL
            .iter()
            .copied()
            .find(|f| header_key(f.name()) == wanted)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn header_key(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// One output row, one value per canonical field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRecord {
    values: Vec<String>,
}

impl Default for CanonicalRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl CanonicalRecord {
    pub fn new() -> Self {
        Self {
            values: vec![String::new(); FIELD_COUNT],
        }
    }

    #[inline]
    pub fn get(&self, field: Field) -> &str {
        &self.values[field.index()]
    }

    #[inline]
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.values[field.index()] = value.into();
    }

    pub fn take(&mut self, field: Field) -> String {
        std::mem::take(&mut self.values[field.index()])
    }

    pub fn is_blank(&self, field: Field) -> bool {
        self.values[field.index()].is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.iter().all(String::is_empty)
    }

    /// Values in canonical order.
    pub fn values(&self) -> &[String] {
        &self.values
    }
}

/// Output header: its spelling and the field order rows are written in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    headers: Vec<String>,
    order: Vec<Field>,
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            headers: Field::ALL.iter().map(|f| f.name().to_string()).collect(),
            order: Field::ALL.to_vec(),
        }
    }
}

impl Schema {
    /// Accepts a configured header only when it names every canonical field
    /// exactly once; anything else falls back to the default header.
    pub fn from_headers(headers: &[String]) -> Self {
        if headers.is_empty() {
            return Self::default();
        }
        if headers.len() != FIELD_COUNT {
            warn!(
                configured = headers.len(),
                expected = FIELD_COUNT,
                "Missing required headers, using default headers"
            );
            return Self::default();
        }

        let mut seen = [false; FIELD_COUNT];
        let mut order = Vec::with_capacity(FIELD_COUNT);
        for cell in headers {
            match Field::from_header(cell) {
                Some(field) if !seen[field.index()] => {
                    seen[field.index()] = true;
                    order.push(field);
                }
                _ => {
                    warn!(header = %cell, "Incompatible headers, using default headers");
                    return Self::default();
                }
            }
        }

        Self {
            headers: headers.to_vec(),
            order,
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn order(&self) -> &[Field] {
        &self.order
    }

    /// Cells of `record` in header order; always `FIELD_COUNT` long.
    pub fn project<'a>(
        &'a self,
        record: &'a CanonicalRecord,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.order.iter().map(move |f| record.get(*f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_indices_follow_declaration_order() {
        for (i, field) in Field::ALL.iter().enumerate() {
            assert_eq!(field.index(), i);
        }
        assert_eq!(Field::Misc3.index(), FIELD_COUNT - 1);
    }

    #[test]
    fn from_header_ignores_case_and_underscores() {
        assert_eq!(Field::from_header("dsfwalkseq"), Some(Field::DsfWalkSeq));
        assert_eq!(Field::from_header("DSF_WALK_SEQ"), Some(Field::DsfWalkSeq));
        assert_eq!(Field::from_header("customerid"), Some(Field::CustomerId));
        assert_eq!(Field::from_header("kbb"), Some(Field::Kbb));
        assert_eq!(Field::from_header("nope"), None);
    }

    #[test]
    fn new_record_has_every_slot_empty() {
        let record = CanonicalRecord::new();
        assert_eq!(record.len(), FIELD_COUNT);
        assert!(record.is_empty());
    }

    #[test]
    fn default_schema_is_canonical() {
        let schema = Schema::default();
        assert_eq!(schema.headers().len(), FIELD_COUNT);
        assert_eq!(schema.headers()[0], "CustomerID");
        assert_eq!(schema.order(), &Field::ALL[..]);
    }

    #[test]
    fn configured_permutation_is_accepted() {
        let mut headers: Vec<String> = Field::ALL.iter().map(|f| f.name().to_lowercase()).collect();
        headers.swap(0, 1);
        let schema = Schema::from_headers(&headers);
        assert_eq!(schema.headers()[0], "fullname");
        assert_eq!(schema.order()[0], Field::FullName);
        assert_eq!(schema.order()[1], Field::CustomerId);
    }

    #[test]
    fn short_header_falls_back() {
        let headers = vec!["zip".to_string(), "city".to_string()];
        assert_eq!(Schema::from_headers(&headers), Schema::default());
    }

    #[test]
    fn duplicate_header_falls_back() {
        let mut headers: Vec<String> = Field::ALL.iter().map(|f| f.name().to_string()).collect();
        headers[1] = "CustomerID".to_string();
        assert_eq!(Schema::from_headers(&headers), Schema::default());
    }

    #[test]
    fn project_follows_schema_order() {
        let mut headers: Vec<String> = Field::ALL.iter().map(|f| f.name().to_string()).collect();
        headers.swap(0, 10);
        let schema = Schema::from_headers(&headers);

        let mut record = CanonicalRecord::new();
        record.set(Field::CustomerId, "000001");
        record.set(Field::Zip, "92882");

        let row: Vec<&str> = schema.project(&record).collect();
        assert_eq!(row.len(), FIELD_COUNT);
        assert_eq!(row[0], "92882");
        assert_eq!(row[10], "000001");
    }
}
