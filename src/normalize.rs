//! Stateless string transforms applied to individual record fields.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use std::borrow::Cow;

static US_STATES: Lazy<FxHashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("AK", "Alaska"),
        ("AL", "Alabama"),
        ("AR", "Arkansas"),
        ("AS", "American Samoa"),
        ("AZ", "Arizona"),
        ("CA", "California"),
        ("CO", "Colorado"),
        ("CT", "Connecticut"),
        ("DC", "District of Columbia"),
        ("DE", "Delaware"),
        ("FL", "Florida"),
        ("GA", "Georgia"),
        ("GU", "Guam"),
        ("HI", "Hawaii"),
        ("IA", "Iowa"),
        ("ID", "Idaho"),
        ("IL", "Illinois"),
        ("IN", "Indiana"),
        ("KS", "Kansas"),
        ("KY", "Kentucky"),
        ("LA", "Louisiana"),
        ("MA", "Massachusetts"),
        ("MD", "Maryland"),
        ("ME", "Maine"),
        ("MI", "Michigan"),
        ("MN", "Minnesota"),
        ("MO", "Missouri"),
        ("MP", "Northern Mariana Islands"),
        ("MS", "Mississippi"),
        ("MT", "Montana"),
        ("NA", "National"),
        ("NC", "North Carolina"),
        ("ND", "North Dakota"),
        ("NE", "Nebraska"),
        ("NH", "New Hampshire"),
        ("NJ", "New Jersey"),
        ("NM", "New Mexico"),
        ("NV", "Nevada"),
        ("NY", "New York"),
        ("OH", "Ohio"),
        ("OK", "Oklahoma"),
        ("OR", "Oregon"),
        ("PA", "Pennsylvania"),
        ("PR", "Puerto Rico"),
        ("RI", "Rhode Island"),
        ("SC", "South Carolina"),
        ("SD", "South Dakota"),
        ("TN", "Tennessee"),
        ("TX", "Texas"),
        ("UT", "Utah"),
        ("VA", "Virginia"),
        ("VI", "Virgin Islands"),
        ("VT", "Vermont"),
        ("WA", "Washington"),
        ("WI", "Wisconsin"),
        ("WV", "West Virginia"),
        ("WY", "Wyoming"),
    ]
    .into_iter()
    .collect()
});

/// Characters removed from phone numbers before counting.
const PHONE_PUNCTUATION: &[char] = &['-', '.', '*', '(', ')', ' '];

/// Word boundary rule for title casing: ASCII punctuation and Unicode
/// whitespace start a new word, so "o'brien" becomes "O'Brien".
fn starts_word(prev: char) -> bool {
    if prev.is_ascii() {
        return !(prev.is_ascii_alphanumeric() || prev == '_');
    }
    if prev.is_alphanumeric() {
        return false;
    }
    prev.is_whitespace()
}

pub fn title_case(s: &str) -> String {
    let lower = s.trim().to_lowercase();
    let mut out = String::with_capacity(lower.len());
    let mut prev = ' ';
    for c in lower.chars() {
        if starts_word(prev) {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        prev = c;
    }
    out
}

pub fn upper_case(s: &str) -> String {
    s.trim().to_uppercase()
}

pub fn lower_case(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Collapses runs of whitespace, then title-cases.
pub fn standardize_address(s: &str) -> String {
    let collapsed = s.split_whitespace().collect::<Vec<_>>().join(" ");
    title_case(&collapsed)
}

/// `(AAA) BBB-CCCC` for ten characters, `BBB-CCCC` for seven, empty otherwise.
pub fn reformat_phone(s: &str) -> String {
    let p: String = s.chars().filter(|c| !PHONE_PUNCTUATION.contains(c)).collect();
    if !p.is_ascii() {
        return String::new();
    }
    match p.len() {
        10 => format!("({}) {}-{}", &p[0..3], &p[3..6], &p[6..10]),
        7 => format!("{}-{}", &p[0..3], &p[3..7]),
        _ => String::new(),
    }
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Normalizes a postal code.
///
/// Four digits pass through, five digits lose a single leading zero, nine
/// digits and `#####-####` keep their first five. Anything else is `None`.
pub fn validate_zip(s: &str) -> Option<&str> {
    match s.len() {
        4 if all_digits(s) => Some(s),
        5 if all_digits(s) => Some(s.strip_prefix('0').unwrap_or(s)),
        9 if all_digits(s) => Some(&s[..5]),
        10 if s.as_bytes()[5] == b'-' && all_digits(&s[..5]) && all_digits(&s[6..]) => {
            Some(&s[..5])
        }
        _ => None,
    }
}

/// Sectional Center Facility code from a zip.
pub fn derive_scf(zip: &str) -> &str {
    match zip.len() {
        5 if zip.starts_with('0') => zip.get(1..3).unwrap_or(""),
        5 => zip.get(..3).unwrap_or(""),
        4 => zip.get(..2).unwrap_or(""),
        _ => "",
    }
}

pub fn state_name(code: &str) -> Option<&'static str> {
    US_STATES.get(code).copied()
}

/// Full state name for a USPS code; unknown codes pass through.
pub fn expand_state(code: &str) -> String {
    state_name(code).map_or_else(|| code.to_string(), str::to_string)
}

/// Expands abbreviated vehicle years: 0-20 are 2000s, 40-99 are 1900s.
pub fn decode_year(y: &str) -> Cow<'_, str> {
    let Ok(n) = y.parse::<u32>() else {
        return Cow::Borrowed(y);
    };
    // only the canonical spelling ("5", not "05") is decoded
    if itoa::Buffer::new().format(n) != y {
        return Cow::Borrowed(y);
    }
    match n {
        0..=20 => Cow::Owned((2000 + n).to_string()),
        40..=99 => Cow::Owned((1900 + n).to_string()),
        _ => Cow::Borrowed(y),
    }
}

#[derive(Debug, Clone, Copy)]
enum DatePart {
    Month,
    Day,
    LongYear,
    ShortYear,
    Sep(u8),
}

use DatePart::{Day, LongYear, Month, Sep, ShortYear};

/// Accepted date layouts, tried in order.
const DATE_LAYOUTS: &[&[DatePart]] = &[
    &[Month, Sep(b'/'), Day, Sep(b'/'), LongYear],
    &[Month, Sep(b'-'), Day, Sep(b'-'), LongYear],
    &[Month, Sep(b'/'), Day, Sep(b'/'), ShortYear],
    &[Month, Sep(b'-'), Day, Sep(b'-'), ShortYear],
    &[LongYear, Sep(b'/'), Month, Sep(b'/'), Day],
    &[LongYear, Sep(b'-'), Month, Sep(b'-'), Day],
];

/// A date recovered from one of the accepted layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedDate(NaiveDate);

impl ParsedDate {
    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// `Y/M/D` without zero padding.
    pub fn formatted(&self) -> String {
        format!("{}/{}/{}", self.0.year(), self.0.month(), self.0.day())
    }

    pub fn year(&self) -> String {
        self.0.year().to_string()
    }

    pub fn month(&self) -> String {
        self.0.month().to_string()
    }

    pub fn day(&self) -> String {
        self.0.day().to_string()
    }
}

pub fn parse_date(s: &str) -> Option<ParsedDate> {
    if s.is_empty() {
        return None;
    }
    DATE_LAYOUTS
        .iter()
        .find_map(|layout| parse_layout(s.as_bytes(), layout))
        .map(ParsedDate)
}

/// One or two leading digits.
fn take_number(b: &[u8]) -> Option<(u32, &[u8])> {
    let first = *b.first()?;
    if !first.is_ascii_digit() {
        return None;
    }
    let first = u32::from(first - b'0');
    match b.get(1) {
        Some(d) if d.is_ascii_digit() => Some((first * 10 + u32::from(d - b'0'), &b[2..])),
        _ => Some((first, &b[1..])),
    }
}

fn take_fixed(b: &[u8], width: usize) -> Option<(i32, &[u8])> {
    let digits = b.get(..width)?;
    if !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let n = digits
        .iter()
        .fold(0i32, |acc, d| acc * 10 + i32::from(d - b'0'));
    Some((n, &b[width..]))
}

fn parse_layout(mut rest: &[u8], layout: &[DatePart]) -> Option<NaiveDate> {
    let (mut year, mut month, mut day) = (0i32, 0u32, 0u32);
    for part in layout {
        match *part {
            Month => (month, rest) = take_number(rest)?,
            Day => (day, rest) = take_number(rest)?,
            LongYear => (year, rest) = take_fixed(rest, 4)?,
            ShortYear => {
                let (yy, r) = take_fixed(rest, 2)?;
                year = if yy >= 69 { 1900 + yy } else { 2000 + yy };
                rest = r;
            }
            Sep(c) => rest = rest.strip_prefix(&[c])?,
        }
    }
    if !rest.is_empty() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_basic() {
        assert_eq!(title_case("  jOHN smith "), "John Smith");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn title_case_capitalizes_after_punctuation() {
        assert_eq!(title_case("o'brien"), "O'Brien");
        assert_eq!(title_case("smith-jones"), "Smith-Jones");
        assert_eq!(title_case("123 1st st"), "123 1st St");
    }

    #[test]
    fn case_folding_trims() {
        assert_eq!(upper_case(" ca "), "CA");
        assert_eq!(lower_case(" John@Example.COM "), "john@example.com");
    }

    #[test]
    fn address_collapses_whitespace() {
        assert_eq!(standardize_address("  123   MAIN\tst  "), "123 Main St");
    }

    #[test]
    fn phone_ten_digits() {
        assert_eq!(reformat_phone("555-123-4567"), "(555) 123-4567");
        assert_eq!(reformat_phone("(555) 123.4567"), "(555) 123-4567");
    }

    #[test]
    fn phone_seven_digits() {
        assert_eq!(reformat_phone("1234567"), "123-4567");
        assert_eq!(reformat_phone("123*4567"), "123-4567");
    }

    #[test]
    fn phone_other_lengths_dropped() {
        assert_eq!(reformat_phone("12345"), "");
        assert_eq!(reformat_phone("1-555-123-4567"), "");
        assert_eq!(reformat_phone(""), "");
    }

    #[test]
    fn zip_shapes() {
        assert_eq!(validate_zip("92882-2341"), Some("92882"));
        assert_eq!(validate_zip("928822341"), Some("92882"));
        assert_eq!(validate_zip("92882"), Some("92882"));
        assert_eq!(validate_zip("06210"), Some("6210"));
        assert_eq!(validate_zip("6210"), Some("6210"));
        assert_eq!(validate_zip("0621"), Some("0621"));
    }

    #[test]
    fn zip_rejects_other_shapes() {
        assert_eq!(validate_zip(""), None);
        assert_eq!(validate_zip("928"), None);
        assert_eq!(validate_zip("9288a"), None);
        assert_eq!(validate_zip("92882 2341"), None);
        assert_eq!(validate_zip("92882-23411"), None);
    }

    #[test]
    fn scf_before_and_after_zip_validation() {
        assert_eq!(derive_scf("92882"), "928");
        // raw five-digit zip with a leading zero
        assert_eq!(derive_scf("06210"), "62");
        // the same zip after validation
        assert_eq!(derive_scf(validate_zip("06210").unwrap()), "62");
        assert_eq!(derive_scf(""), "");
        assert_eq!(derive_scf("928822341"), "");
    }

    #[test]
    fn state_expansion() {
        assert_eq!(expand_state("CA"), "California");
        assert_eq!(expand_state("DC"), "District of Columbia");
        assert_eq!(expand_state("ZZ"), "ZZ");
        assert_eq!(expand_state(""), "");
        assert_eq!(state_name("ca"), None);
    }

    #[test]
    fn year_decoding() {
        assert_eq!(decode_year("98"), "1998");
        assert_eq!(decode_year("5"), "2005");
        assert_eq!(decode_year("0"), "2000");
        assert_eq!(decode_year("05"), "05");
        assert_eq!(decode_year("30"), "30");
        assert_eq!(decode_year("2015"), "2015");
        assert_eq!(decode_year(""), "");
    }

    #[test]
    fn date_month_day_year() {
        let d = parse_date("12/25/2020").unwrap();
        assert_eq!(d.formatted(), "2020/12/25");
        assert_eq!((d.year(), d.month(), d.day()), ("2020".into(), "12".into(), "25".into()));

        assert_eq!(parse_date("1-5-2019").unwrap().formatted(), "2019/1/5");
        assert_eq!(parse_date("01/05/2019").unwrap().formatted(), "2019/1/5");
    }

    #[test]
    fn date_two_digit_year_pivot() {
        assert_eq!(parse_date("3/4/98").unwrap().formatted(), "1998/3/4");
        assert_eq!(parse_date("3-4-68").unwrap().formatted(), "2068/3/4");
        assert_eq!(parse_date("3/4/69").unwrap().formatted(), "1969/3/4");
    }

    #[test]
    fn date_year_first() {
        assert_eq!(parse_date("2020/1/31").unwrap().formatted(), "2020/1/31");
        assert_eq!(parse_date("2020-02-29").unwrap().formatted(), "2020/2/29");
    }

    #[test]
    fn date_rejects_invalid() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("2/30/2020"), None);
        assert_eq!(parse_date("13/1/2020"), None);
        assert_eq!(parse_date("1/1/20201"), None);
        assert_eq!(parse_date("January 1 2020"), None);
        assert_eq!(parse_date("1/1/2020 10:00"), None);
    }
}
