use csv::StringRecord;

/// One input line as read, before projection onto the canonical schema.
#[derive(Debug, Clone)]
pub struct RawRow {
    /// 0-based line index in the input; the header is line 0
    pub index: usize,
    pub fields: StringRecord,
}

impl RawRow {
    pub fn new(index: usize, fields: StringRecord) -> Self {
        Self { index, fields }
    }

    pub fn from_cells<S: AsRef<str>>(index: usize, cells: &[S]) -> Self {
        Self {
            index,
            fields: cells.iter().map(|c| c.as_ref()).collect(),
        }
    }

    /// Cell at `column`; short rows read as empty.
    pub fn cell(&self, column: usize) -> &str {
        self.fields.get(column).unwrap_or("")
    }
}
