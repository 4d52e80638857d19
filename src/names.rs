//! Best-effort full-name splitting for mail merge.
//!
//! Tokens are classified from the end of the name backward against five
//! closed vocabularies. Titles and credentials are dropped, a trailing
//! generational marker is carried onto the surname, and surname particles
//! ("Van", "De", "Mc", ...) glue the tokens to their right into a compound
//! surname. The remaining token count decides the first/middle/last split.

use crate::normalize::title_case;

pub const SEPARATORS: &[&str] = &["&", "AND", "OR", "/"];

pub const SUFFIXES: &[&str] = &["ESQ", "PHD", "MD", "TRUE"];

pub const SALUTATIONS: &[&str] = &[
    "MR", "MR.", "MS", "MS.", "MRS", "MRS.", "DR", "DR.", "MISS", "CORP", "SGT", "PVT", "CAPT",
    "COL", "MAJ", "LT", "LIEUTENANT", "PRM", "PATROLMAN", "HON", "OFFICER", "REV", "PRES",
    "PRESIDENT", "GOV", "GOVERNOR", "VICE PRESIDENT", "VP", "MAYOR", "SIR", "MADAM", "HONORABLE",
];

pub const GENERATIONS: &[&str] = &[
    "JR", "SR", "I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X", "1ST", "2ND", "3RD",
    "4TH", "5TH", "6TH", "7TH", "8TH", "9TH", "10TH", "FIRST", "SECOND", "THIRD", "FOURTH",
    "FIFTH", "SIXTH", "SEVENTH", "EIGHTH", "NINTH", "TENTH",
];

pub const SURNAME_PREFIXES: &[&str] = &[
    "DE", "DA", "DI", "LA", "LOS", "DU", "DEL", "DEI", "VDA", "DELLO", "DELLA", "DEGLI", "DELLE",
    "VAN", "VON", "DER", "DEN", "MC", "HEER", "TEN", "TER", "VANDE", "VANDEN", "VANDER", "VOOR",
    "VER", "AAN", "SAN", "SAINZ", "BIN", "LI", "LE", "DES", "AM", "AUS'M", "VOM", "ZUM", "ZUR",
    "IBN", "ABU", "BON", "DAL", "ST", "STE", "VEL",
];

/// Word lists the parser classifies tokens against.
#[derive(Debug, Clone, Copy)]
pub struct NameVocabulary {
    pub separators: &'static [&'static str],
    pub suffixes: &'static [&'static str],
    pub salutations: &'static [&'static str],
    pub generations: &'static [&'static str],
    pub surname_prefixes: &'static [&'static str],
}

impl Default for NameVocabulary {
    fn default() -> Self {
        Self {
            separators: SEPARATORS,
            suffixes: SUFFIXES,
            salutations: SALUTATIONS,
            generations: GENERATIONS,
            surname_prefixes: SURNAME_PREFIXES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    Separator,
    Suffix,
    Salutation,
    Generation,
    SurnamePrefix,
    Word,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedName {
    pub first: String,
    pub middle: String,
    pub last: String,
}

impl ParsedName {
    fn new(first: &str, middle: &str, last: &str) -> Self {
        Self {
            first: first.to_string(),
            middle: middle.to_string(),
            last: last.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NameParser {
    vocabulary: NameVocabulary,
}

fn contains(list: &[&str], token: &str) -> bool {
    list.iter().any(|w| w.eq_ignore_ascii_case(token))
}

impl NameParser {
    pub fn new(vocabulary: NameVocabulary) -> Self {
        Self { vocabulary }
    }

    /// Vocabularies are checked in priority order; the first hit wins.
    pub fn classify(&self, token: &str) -> TokenClass {
        let v = &self.vocabulary;
        if contains(v.separators, token) {
            TokenClass::Separator
        } else if contains(v.suffixes, token) {
            TokenClass::Suffix
        } else if contains(v.salutations, token) {
            TokenClass::Salutation
        } else if contains(v.generations, token) {
            TokenClass::Generation
        } else if contains(v.surname_prefixes, token) {
            TokenClass::SurnamePrefix
        } else {
            TokenClass::Word
        }
    }

    /// Title-cased name tokens that survive classification, in name order.
    pub fn significant_tokens(&self, name: &str) -> Vec<String> {
        let tokens: Vec<&str> = name.split_whitespace().collect();
        let mut kept: Vec<String> = Vec::with_capacity(tokens.len());
        let mut generation = None;

        for (pos, raw) in tokens.iter().rev().enumerate() {
            let token = title_case(raw);
            match self.classify(&token) {
                // a trailing "& Jane" is skipped, anything further left ends the name
                TokenClass::Separator if pos < 2 => continue,
                TokenClass::Separator => break,
                TokenClass::Suffix | TokenClass::Salutation => continue,
                TokenClass::Generation => {
                    if pos == 0 {
                        generation = Some(token);
                    }
                    continue;
                }
                TokenClass::SurnamePrefix => {
                    let mut compound = token;
                    for t in kept.drain(..).rev() {
                        compound.push(' ');
                        compound.push_str(&t);
                    }
                    kept.push(compound);
                }
                TokenClass::Word => kept.push(token),
            }
        }

        kept.reverse();
        if let (Some(generation), Some(last)) = (generation, kept.last_mut()) {
            last.push(' ');
            last.push_str(&generation);
        }
        kept
    }

    pub fn parse(&self, name: &str) -> ParsedName {
        let t = self.significant_tokens(name);
        match t.len() {
            1 => ParsedName::new(&t[0], "", ""),
            2 => ParsedName::new(&t[0], "", &t[1]),
            // "John Smith Q": a trailing initial after a real surname is dropped
            3 if t[2].chars().count() == 1 && t[1].chars().count() > 2 => {
                ParsedName::new(&t[0], "", &t[1])
            }
            3 => ParsedName::new(&t[0], &t[1], &t[2]),
            4 | 5 => ParsedName::new(&t[0], "", &t[t.len() - 1]),
            _ => ParsedName::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(name: &str) -> (String, String, String) {
        let p = NameParser::default().parse(name);
        (p.first, p.middle, p.last)
    }

    fn triple(f: &str, m: &str, l: &str) -> (String, String, String) {
        (f.to_string(), m.to_string(), l.to_string())
    }

    #[test]
    fn two_tokens() {
        assert_eq!(parse("John Smith"), triple("John", "", "Smith"));
    }

    #[test]
    fn middle_initial() {
        assert_eq!(parse("John Q Smith"), triple("John", "Q", "Smith"));
    }

    #[test]
    fn generational_suffix_joins_surname() {
        assert_eq!(parse("John Smith Jr"), triple("John", "", "Smith Jr"));
        assert_eq!(parse("JOHN SMITH III"), triple("John", "", "Smith Iii"));
    }

    #[test]
    fn compound_surname() {
        assert_eq!(parse("Mary Van Der Berg"), triple("Mary", "", "Van Der Berg"));
        assert_eq!(parse("Mary Ann De Leon"), triple("Mary", "Ann", "De Leon"));
    }

    #[test]
    fn salutation_dropped() {
        assert_eq!(parse("Dr John Smith"), triple("John", "", "Smith"));
        assert_eq!(parse("mr. john smith"), triple("John", "", "Smith"));
    }

    #[test]
    fn credential_dropped() {
        assert_eq!(parse("John Smith PhD"), triple("John", "", "Smith"));
    }

    #[test]
    fn single_token() {
        assert_eq!(parse("Cher"), triple("Cher", "", ""));
    }

    #[test]
    fn trailing_initial_dropped() {
        assert_eq!(parse("John Smith Q"), triple("John", "", "Smith"));
    }

    #[test]
    fn separator_near_end_is_skipped() {
        // "&" is second from the end: skipped, so Jane stays in the name
        assert_eq!(parse("Smith & Jane"), triple("Smith", "", "Jane"));
        assert_eq!(parse("John Smith & Jane"), triple("John", "Smith", "Jane"));
    }

    #[test]
    fn separator_further_left_ends_name() {
        assert_eq!(parse("John & Jane Smith"), triple("Jane", "", "Smith"));
    }

    #[test]
    fn four_and_five_tokens_keep_ends() {
        assert_eq!(parse("Anna Maria Luisa Garcia"), triple("Anna", "", "Garcia"));
        assert_eq!(parse("Anna Maria Luisa Perez Garcia"), triple("Anna", "", "Garcia"));
    }

    #[test]
    fn too_many_or_no_tokens() {
        assert_eq!(parse("A B C D E F"), triple("", "", ""));
        assert_eq!(parse(""), triple("", "", ""));
        assert_eq!(parse("Jr"), triple("", "", ""));
    }

    #[test]
    fn classify_priority() {
        let parser = NameParser::default();
        assert_eq!(parser.classify("And"), TokenClass::Separator);
        assert_eq!(parser.classify("Md"), TokenClass::Suffix);
        assert_eq!(parser.classify("Rev"), TokenClass::Salutation);
        assert_eq!(parser.classify("2nd"), TokenClass::Generation);
        assert_eq!(parser.classify("Mc"), TokenClass::SurnamePrefix);
        assert_eq!(parser.classify("Smith"), TokenClass::Word);
    }

    #[test]
    fn custom_vocabulary() {
        let parser = NameParser::new(NameVocabulary {
            salutations: &["CAPTAIN"],
            ..Default::default()
        });
        let p = parser.parse("Captain Jack Sparrow");
        assert_eq!(p, ParsedName::new("Jack", "", "Sparrow"));
    }
}
