//! Header-driven discovery of which input column feeds each canonical field.

use crate::error::JobError;
use crate::schema::{Field, FIELD_COUNT};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// A case-insensitive header pattern and the field it feeds.
pub struct ColumnRule {
    pub pattern: Regex,
    pub field: Field,
}

fn rule(pattern: &str, field: Field) -> ColumnRule {
    ColumnRule {
        pattern: Regex::new(&format!("(?i){pattern}")).unwrap(),
        field,
    }
}

/// Checked in declaration order; the first match claims the header cell.
pub static COLUMN_RULES: Lazy<Vec<ColumnRule>> = Lazy::new(|| {
    vec![
        rule(r"cust.+id", Field::CustomerId),
        rule(r"ful.+me", Field::FullName),
        rule(r"fir.+me", Field::FirstName),
        rule(r"^mi$", Field::Mi),
        rule(r"las.+me", Field::LastName),
        rule(r"^address$", Field::Address1),
        rule(r"addr.+1", Field::Address1),
        rule(r"addr.+2", Field::Address2),
        rule(r"^city$", Field::City),
        rule(r"^state$", Field::State),
        rule(r"^zip$", Field::Zip),
        rule(r"^4zip$", Field::Zip4),
        rule(r"^zip4$", Field::Zip4),
        rule(r"^hph$", Field::Hph),
        rule(r"^bph$", Field::Bph),
        rule(r"^cph$", Field::Cph),
        rule(r"^email$", Field::Email),
        rule(r"^vin$", Field::Vin),
        rule(r"^year$", Field::Year),
        rule(r"^vyr$", Field::Year),
        rule(r"^make$", Field::Make),
        rule(r"^vmk$", Field::Make),
        rule(r"^model$", Field::Model),
        rule(r"^vmd$", Field::Model),
        rule(r"^deldate$", Field::DelDate),
        rule(r"^date$", Field::Date),
        rule(r"^dsf_walk_seq$", Field::DsfWalkSeq),
        rule(r"^crrt$", Field::Crrt),
        rule(r"^kbb$", Field::Kbb),
    ]
});

/// Canonical field to source column index, built once per input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    sources: [Option<usize>; FIELD_COUNT],
}

impl ColumnMap {
    /// Maps a header row. Fails when no cell names the zip column.
    ///
    /// When two cells claim the same field, the rightmost one wins.
    pub fn from_header<S: AsRef<str>>(header: &[S]) -> Result<Self, JobError> {
        let mut sources = [None; FIELD_COUNT];
        for (column, cell) in header.iter().enumerate() {
            if let Some(field) = match_header(cell.as_ref()) {
                sources[field.index()] = Some(column);
            }
        }

        if sources[Field::Zip.index()].is_none() {
            return Err(JobError::MissingZipColumn(
                header.iter().map(|c| c.as_ref().to_string()).collect(),
            ));
        }
        Ok(Self { sources })
    }

    pub fn source(&self, field: Field) -> Option<usize> {
        self.sources[field.index()]
    }

    /// Mapped fields with their source columns, in canonical order.
    pub fn mapped(&self) -> impl Iterator<Item = (Field, usize)> + '_ {
        Field::ALL
            .iter()
            .filter_map(move |f| self.source(*f).map(|col| (*f, col)))
    }
}

impl fmt::Display for ColumnMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (field, column) in self.mapped() {
            writeln!(f, "{:<14} <- column {}", field.name(), column)?;
        }
        Ok(())
    }
}

/// The field claimed by a header cell, if any rule matches.
pub fn match_header(cell: &str) -> Option<Field> {
    COLUMN_RULES
        .iter()
        .find(|r| r.pattern.is_match(cell))
        .map(|r| r.field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typical_header() {
        let header = [
            "Customer ID",
            "First Name",
            "Last Name",
            "Address 1",
            "City",
            "ST",
            "ZIP",
            "Zip4",
            "VIN",
            "vyr",
        ];
        let map = ColumnMap::from_header(&header).unwrap();
        assert_eq!(map.source(Field::CustomerId), Some(0));
        assert_eq!(map.source(Field::FirstName), Some(1));
        assert_eq!(map.source(Field::LastName), Some(2));
        assert_eq!(map.source(Field::Address1), Some(3));
        assert_eq!(map.source(Field::City), Some(4));
        assert_eq!(map.source(Field::State), None);
        assert_eq!(map.source(Field::Zip), Some(6));
        assert_eq!(map.source(Field::Zip4), Some(7));
        assert_eq!(map.source(Field::Vin), Some(8));
        assert_eq!(map.source(Field::Year), Some(9));
    }

    #[test]
    fn missing_zip_is_fatal() {
        let header = ["Name", "City", "Zip Code"];
        assert!(matches!(
            ColumnMap::from_header(&header),
            Err(JobError::MissingZipColumn(_))
        ));
    }

    #[test]
    fn unmatched_cells_are_ignored() {
        let header = ["zip", "favorite color", ""];
        let map = ColumnMap::from_header(&header).unwrap();
        assert_eq!(map.mapped().count(), 1);
    }

    #[test]
    fn first_rule_wins_per_cell() {
        // "ful.+me" is declared before "las.+me"
        assert_eq!(match_header("CUSTOMER_ID"), Some(Field::CustomerId));
        assert_eq!(match_header("Full Last Name"), Some(Field::FullName));
        assert_eq!(match_header("ADDRESS"), Some(Field::Address1));
        assert_eq!(match_header("Address Line 2"), Some(Field::Address2));
        assert_eq!(match_header("4ZIP"), Some(Field::Zip4));
        assert_eq!(match_header("deldate"), Some(Field::DelDate));
        assert_eq!(match_header("DSF_WALK_SEQ"), Some(Field::DsfWalkSeq));
    }

    #[test]
    fn exact_rules_do_not_trim() {
        assert_eq!(match_header(" zip"), None);
        assert_eq!(match_header("zipcode"), None);
    }

    #[test]
    fn later_column_overwrites_earlier() {
        let header = ["Address", "zip", "Address1"];
        let map = ColumnMap::from_header(&header).unwrap();
        assert_eq!(map.source(Field::Address1), Some(2));
    }

    #[test]
    fn mapping_is_idempotent() {
        let header = vec!["FullName".to_string(), "Zip".to_string(), "HPH".to_string()];
        let a = ColumnMap::from_header(&header).unwrap();
        let b = ColumnMap::from_header(&header).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn display_lists_mapped_fields() {
        let map = ColumnMap::from_header(&["zip", "email"]).unwrap();
        let text = map.to_string();
        assert!(text.contains("Zip"));
        assert!(text.contains("column 0"));
        assert!(text.contains("Email"));
    }
}
