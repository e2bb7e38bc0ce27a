pub const FIELD_SEPARATOR: char = ';';
pub const FIELD_COUNT: usize = 4;

/// One contestant record as submitted by an agency.
///
/// All four fields are kept as text: the record layer only guarantees the
/// `;`-delimited shape, while judging the content (including whether the
/// birthdate is a real `YYYY-MM-DD` date) is left to the winner predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contestant {
    pub first_name: String,
    pub last_name: String,
    pub document: String,
    pub birthdate: String,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("expected {FIELD_COUNT} `;`-separated fields, got {0}")]
pub struct WrongFieldCount(pub usize);

impl Contestant {
    /// Parse a `;`-joined record. Fails only on field arity.
    pub fn from_record(record: &str) -> Result<Self, WrongFieldCount> {
        let fields: Vec<&str> = record.split(FIELD_SEPARATOR).collect();
        let [first_name, last_name, document, birthdate] = fields[..] else {
            return Err(WrongFieldCount(fields.len()));
        };

        Ok(Self {
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
            document: document.to_owned(),
            birthdate: birthdate.to_owned(),
        })
    }

    pub fn to_record(&self) -> String {
        format!(
            "{}{sep}{}{sep}{}{sep}{}",
            self.first_name,
            self.last_name,
            self.document,
            self.birthdate,
            sep = FIELD_SEPARATOR,
        )
    }
}
