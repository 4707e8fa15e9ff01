use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use noodles::sam::alignment::RecordBuf;
use noodles::{bam, sam};
use thiserror::Error;

use crate::core::header::SequenceDictionary;
use crate::core::record::AlignmentRecord;
use crate::core::reference::ReferenceSequence;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid SAM header format: {0}")]
    InvalidFormat(String),

    #[error("noodles error: {0}")]
    Noodles(String),

    #[error("No alignment inputs found: {0}")]
    NoInputs(String),
}

/// Container format of an alignment file, detected from its name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentFormat {
    Sam,
    SamGz,
    Bam,
}

/// Detect the container format from the file name
#[must_use]
pub fn detect_format(path: &Path) -> AlignmentFormat {
    let name = path.to_string_lossy().to_lowercase();
    if name.ends_with(".bam") {
        AlignmentFormat::Bam
    } else if name.ends_with(".gz") {
        AlignmentFormat::SamGz
    } else {
        AlignmentFormat::Sam
    }
}

/// Anything that can fill a `RecordBuf` record by record
trait RecordSource {
    fn header(&self) -> &sam::Header;
    fn read_record_buf(&mut self, record: &mut RecordBuf) -> io::Result<usize>;
}

struct SamSource<R> {
    reader: sam::io::Reader<R>,
    header: sam::Header,
}

impl<R: BufRead> RecordSource for SamSource<R> {
    fn header(&self) -> &sam::Header {
        &self.header
    }

    fn read_record_buf(&mut self, record: &mut RecordBuf) -> io::Result<usize> {
        self.reader.read_record_buf(&self.header, record)
    }
}

struct BamSource<R> {
    reader: bam::io::Reader<R>,
    header: sam::Header,
}

impl<R: Read> RecordSource for BamSource<R> {
    fn header(&self) -> &sam::Header {
        &self.header
    }

    fn read_record_buf(&mut self, record: &mut RecordBuf) -> io::Result<usize> {
        self.reader.read_record_buf(&self.header, record)
    }
}

/// An open SAM, gzipped SAM or BAM file, yielding records in file order
pub struct AlignmentFile {
    path: PathBuf,
    dictionary: SequenceDictionary,
    source: Box<dyn RecordSource>,
    buf: RecordBuf,
}

impl AlignmentFile {
    /// Open an alignment file and read its header.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Io` if the file cannot be opened, or
    /// `ParseError::Noodles` if the header cannot be decoded.
    pub fn open(path: &Path) -> Result<Self, ParseError> {
        let (source, dictionary): (Box<dyn RecordSource>, SequenceDictionary) =
            match detect_format(path) {
                AlignmentFormat::Sam => {
                    let inner: Box<dyn BufRead> = Box::new(BufReader::new(File::open(path)?));
                    open_sam(inner)?
                }
                AlignmentFormat::SamGz => {
                    let decoder = MultiGzDecoder::new(File::open(path)?);
                    let inner: Box<dyn BufRead> = Box::new(BufReader::new(decoder));
                    open_sam(inner)?
                }
                AlignmentFormat::Bam => {
                    let mut reader = File::open(path).map(bam::io::Reader::new)?;
                    let header = reader
                        .read_header()
                        .map_err(|e| ParseError::Noodles(e.to_string()))?;
                    let dictionary = header_to_dictionary(&header);
                    (Box::new(BamSource { reader, header }), dictionary)
                }
            };

        let dictionary = dictionary.with_source(path.display().to_string());

        Ok(Self {
            path: path.to_path_buf(),
            dictionary,
            source,
            buf: RecordBuf::default(),
        })
    }

    /// References declared in this file's header
    #[must_use]
    pub fn dictionary(&self) -> &SequenceDictionary {
        &self.dictionary
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Iterator for AlignmentFile {
    type Item = Result<AlignmentRecord, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.source.read_record_buf(&mut self.buf) {
            Ok(0) => None,
            Ok(_) => Some(Ok(to_alignment_record(&self.buf, self.source.header()))),
            Err(e) => Some(Err(ParseError::Noodles(format!(
                "{}: {e}",
                self.path.display()
            )))),
        }
    }
}

/// Read the SAM header as text so that zero-length `@SQ` entries, which
/// noodles rejects, still reach the dictionary. The noodles header is built
/// from the remaining lines and the reader is left at the first record.
fn open_sam(
    mut inner: Box<dyn BufRead>,
) -> Result<(Box<dyn RecordSource>, SequenceDictionary), ParseError> {
    let text = read_header_text(&mut inner)?;
    let dictionary = SequenceDictionary::new(parse_sequence_lines(&text)?);

    let header = without_empty_references(&text)
        .parse::<sam::Header>()
        .map_err(|e| ParseError::Noodles(e.to_string()))?;
    let reader = sam::io::Reader::new(inner);

    Ok((Box::new(SamSource { reader, header }), dictionary))
}

/// Consume the leading `@` lines of a SAM stream
fn read_header_text<R: BufRead>(reader: &mut R) -> io::Result<String> {
    let mut text = String::new();
    while reader.fill_buf()?.first() == Some(&b'@') {
        reader.read_line(&mut text)?;
    }
    Ok(text)
}

/// Header text with every `@SQ` line of length 0 removed
fn without_empty_references(text: &str) -> String {
    text.lines()
        .filter(|line| !(line.starts_with("@SQ") && line.split('\t').any(|f| f == "LN:0")))
        .map(|line| format!("{line}\n"))
        .collect()
}

/// Read only the header of an alignment file
///
/// # Errors
///
/// Returns any error from [`AlignmentFile::open`].
pub fn read_dictionary(path: &Path) -> Result<SequenceDictionary, ParseError> {
    AlignmentFile::open(path).map(|file| file.dictionary)
}

/// Convert noodles header to `SequenceDictionary`
fn header_to_dictionary(header: &sam::Header) -> SequenceDictionary {
    let references = header
        .reference_sequences()
        .iter()
        .map(|(name, map)| ReferenceSequence::new(name.to_string(), map.length().get() as u64))
        .collect();

    SequenceDictionary::new(references)
}

fn to_alignment_record(record: &RecordBuf, header: &sam::Header) -> AlignmentRecord {
    let reference = record
        .reference_sequence_id()
        .and_then(|id| header.reference_sequences().get_index(id))
        .map(|(name, _)| name.to_string());

    AlignmentRecord {
        name: record.name().map(|n| n.to_string()).unwrap_or_default(),
        flag: u16::from(record.flags()),
        reference,
        position: record.alignment_start().map_or(0, |p| usize::from(p) as u64),
        mapping_quality: record.mapping_quality().map_or(255, u8::from),
        has_cigar: !record.cigar().as_ref().is_empty(),
        sequence_length: record.sequence().as_ref().len() as u64,
        insert_size: i64::from(record.template_length()),
    }
}

/// Parse an exclusion list: a SAM header whose `@SQ` lines name references to
/// remove. Reading stops at the first line that is not a header line.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or
/// `ParseError::InvalidFormat` if an `@SQ` line lacks SN or a numeric LN.
pub fn parse_exclusion_file(path: &Path) -> Result<Vec<ReferenceSequence>, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_exclusion_text(&content)
}

/// Parse exclusion list text, see [`parse_exclusion_file`]
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if an `@SQ` line lacks SN or a numeric LN.
pub fn parse_exclusion_text(text: &str) -> Result<Vec<ReferenceSequence>, ParseError> {
    parse_sequence_lines(text)
}

/// `@SQ` entries (SN, LN) of header text, up to the first non-header line
fn parse_sequence_lines(text: &str) -> Result<Vec<ReferenceSequence>, ParseError> {
    let mut references = Vec::new();

    for (i, line) in text.lines().enumerate() {
        if !line.starts_with('@') {
            break;
        }
        if !line.starts_with("@SQ") {
            continue;
        }

        let mut name: Option<&str> = None;
        let mut length: Option<u64> = None;
        for field in line.split('\t').skip(1) {
            if let Some((tag, value)) = field.split_once(':') {
                match tag {
                    "SN" => name = Some(value),
                    "LN" => length = value.trim().parse().ok(),
                    _ => {}
                }
            }
        }

        match (name, length) {
            (Some(name), Some(length)) => references.push(ReferenceSequence::new(name, length)),
            _ => {
                return Err(ParseError::InvalidFormat(format!(
                    "@SQ line {} needs SN and a numeric LN",
                    i + 1
                )))
            }
        }
    }

    Ok(references)
}
