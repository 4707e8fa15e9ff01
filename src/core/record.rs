/// One alignment record, reduced to the fields binning looks at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentRecord {
    /// Query (read) name
    pub name: String,

    /// SAM FLAG value
    pub flag: u16,

    /// Reference name; `None` is the unmapped marker (`*`)
    pub reference: Option<String>,

    /// 1-based leftmost position (0 when unavailable)
    pub position: u64,

    /// Mapping quality; a missing value is carried as 255
    pub mapping_quality: u8,

    /// Whether the record carries an alignment (CIGAR other than `*`)
    pub has_cigar: bool,

    /// Length of the stored read sequence
    pub sequence_length: u64,

    /// Observed template length (TLEN), signed
    pub insert_size: i64,
}

impl AlignmentRecord {
    /// End of the read interval, `position + sequence_length`
    #[must_use]
    pub fn end(&self) -> u64 {
        self.position + self.sequence_length
    }

    /// Midpoint of a single read: `position + sequence_length / 2`
    #[must_use]
    pub fn midpoint(&self) -> u64 {
        self.position + self.sequence_length / 2
    }

    #[cfg(test)]
    pub fn mapped(
        name: &str,
        flag: u16,
        reference: &str,
        position: u64,
        sequence_length: u64,
        mapping_quality: u8,
    ) -> Self {
        Self {
            name: name.to_string(),
            flag,
            reference: Some(reference.to_string()),
            position,
            mapping_quality,
            has_cigar: true,
            sequence_length,
            insert_size: 0,
        }
    }

    #[cfg(test)]
    #[must_use]
    pub fn with_insert_size(mut self, insert_size: i64) -> Self {
        self.insert_size = insert_size;
        self
    }

    #[cfg(test)]
    #[must_use]
    pub fn without_cigar(mut self) -> Self {
        self.has_cigar = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midpoint_truncates() {
        let record = AlignmentRecord::mapped("r1", 0, "chr1", 100, 51, 60);
        assert_eq!(record.end(), 151);
        assert_eq!(record.midpoint(), 125);
    }
}
