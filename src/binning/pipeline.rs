use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::binning::accumulator::BinAccumulator;
use crate::binning::classifier::{Classifier, MAX_PAIRED_FLAG};
use crate::binning::outliers::remove_outlier_bins;
use crate::binning::BinningError;
use crate::core::config::BinningConfig;
use crate::core::record::AlignmentRecord;
use crate::core::reference::{ReferenceCatalog, ReferenceSequence};
use crate::core::types::{FlagPair, LibraryName};
use crate::parsing::sam::{AlignmentFile, ParseError};
use crate::utils::validation::{find_duplicate_library, is_progress_checkpoint};

/// One input file and the library it feeds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryInput {
    pub name: LibraryName,
    pub path: PathBuf,
}

/// Everything a finished run hands to the writers
#[derive(Debug)]
pub struct BinningRun {
    pub catalog: ReferenceCatalog,
    pub accumulator: BinAccumulator,
    /// Bins deleted by the outlier filter, in catalog order
    pub removed_bins: Vec<(String, u64)>,
    /// Flag pairs accepted during the run (paired modes)
    pub accepted_pairs: Vec<FlagPair>,
}

/// Derive a library name for every input path.
///
/// # Errors
///
/// Returns `BinningError::Config` if two paths derive the same library name.
pub fn plan_libraries(paths: &[PathBuf]) -> Result<Vec<LibraryInput>, BinningError> {
    let inputs: Vec<LibraryInput> = paths
        .iter()
        .map(|path| LibraryInput {
            name: LibraryName::from_path(path),
            path: path.clone(),
        })
        .collect();

    let names: Vec<&LibraryName> = inputs.iter().map(|input| &input.name).collect();
    if let Some(duplicate) = find_duplicate_library(&names) {
        return Err(BinningError::Config(format!(
            "more than one input derives library name '{duplicate}'"
        )));
    }

    Ok(inputs)
}

/// Bin every library, in order, against the catalog built from the first input.
///
/// # Errors
///
/// Returns `BinningError` for an invalid configuration, an unreadable input,
/// FLAGs that contradict the mode, or a desynchronized mate stream. Nothing
/// is returned for a run that fails part way.
pub fn run(
    config: &BinningConfig,
    inputs: &[LibraryInput],
    exclusions: Option<Vec<ReferenceSequence>>,
) -> Result<BinningRun, BinningError> {
    config.validate()?;

    let Some(first_input) = inputs.first() else {
        return Err(BinningError::Config("no input files".to_string()));
    };
    if let Some(control) = &config.control {
        if !inputs.iter().any(|input| &input.name == control) {
            return Err(BinningError::Config(format!(
                "control library '{control}' is not among the inputs"
            )));
        }
    }

    let first_file = AlignmentFile::open(&first_input.path)?;
    let catalog = ReferenceCatalog::from_header(first_file.dictionary(), exclusions);
    if catalog.is_empty() {
        warn!(path = %first_input.path.display(), "No references left to bin against");
    }
    info!(
        references = catalog.len(),
        path = %first_input.path.display(),
        "Built reference catalog"
    );

    let mut accumulator = BinAccumulator::new();
    for input in inputs {
        accumulator.register_library(&input.name);
    }

    let accepted_pairs = {
        let mut classifier = Classifier::new(config, &catalog);
        let mut first_file = Some(first_file);

        for input in inputs {
            let file = match first_file.take() {
                Some(file) => file,
                None => {
                    let file = AlignmentFile::open(&input.path)?;
                    check_references(config, &catalog, &file)?;
                    file
                }
            };

            info!(library = %input.name, path = %input.path.display(), "Binning library");
            let partial = bin_library(&mut classifier, &input.name, &input.path, file)?;
            info!(
                library = %input.name,
                reads = partial.total(&input.name),
                "Finished library"
            );
            accumulator.merge(partial);
        }

        classifier.seen_pairs().iter().copied().collect::<Vec<_>>()
    };

    for (reference, dropped) in accumulator.unknown() {
        warn!(
            reference = %reference,
            dropped,
            "Reference is in the alignments but not in the catalog; its reads were dropped"
        );
    }

    let removed_bins = match config.outlier_sd {
        Some(sd_multiplier) => remove_outlier_bins(&catalog, &mut accumulator, sd_multiplier),
        None => Vec::new(),
    };

    Ok(BinningRun {
        catalog,
        accumulator,
        removed_bins,
        accepted_pairs,
    })
}

/// Later inputs are expected to share the first input's references.
fn check_references(
    config: &BinningConfig,
    catalog: &ReferenceCatalog,
    file: &AlignmentFile,
) -> Result<(), BinningError> {
    let foreign = catalog.foreign_references(file.dictionary());
    let Some(first) = foreign.first() else {
        return Ok(());
    };

    if config.strict_references {
        return Err(BinningError::ForeignReference {
            reference: first.clone(),
            path: file.path().display().to_string(),
        });
    }

    warn!(
        path = %file.path().display(),
        count = foreign.len(),
        first = %first,
        "Input header names references absent from the first input"
    );
    Ok(())
}

/// Classify one library's record stream into a fresh accumulator.
///
/// In paired modes records are consumed two at a time; records with a FLAG
/// above 200 are skipped while looking for either mate.
///
/// # Errors
///
/// Returns any classifier error, any read error from `records`, or
/// `BinningError::UnpairedRecord` if the stream ends between two mates.
pub fn bin_library<I>(
    classifier: &mut Classifier<'_>,
    library: &LibraryName,
    path: &Path,
    records: I,
) -> Result<BinAccumulator, BinningError>
where
    I: Iterator<Item = Result<AlignmentRecord, ParseError>>,
{
    let mut partial = BinAccumulator::new();
    partial.register_library(library);

    let mut records = records.enumerate().map(|(i, record)| {
        if is_progress_checkpoint(i + 1) {
            debug!(library = %library, records = i + 1, "Progress");
        }
        record
    });

    if classifier.mode().is_paired() {
        while let Some(first) = next_mate(&mut records)? {
            let Some(second) = next_mate(&mut records)? else {
                return Err(BinningError::UnpairedRecord {
                    read: first.name,
                    path: path.display().to_string(),
                });
            };
            for placement in classifier.classify_pair(&first, &second)? {
                partial.apply(&placement, library);
            }
        }
    } else {
        for record in records {
            if let Some(placement) = classifier.classify_single(&record?)? {
                partial.apply(&placement, library);
            }
        }
    }

    Ok(partial)
}

/// Next record that can be a primary mate, or None at the end of the stream
fn next_mate<I>(records: &mut I) -> Result<Option<AlignmentRecord>, BinningError>
where
    I: Iterator<Item = Result<AlignmentRecord, ParseError>>,
{
    for record in records.by_ref() {
        let record = record?;
        if record.flag <= MAX_PAIRED_FLAG {
            return Ok(Some(record));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binning::normalize::normalize;
    use crate::core::header::SequenceDictionary;
    use crate::core::types::Mode;

    fn catalog() -> ReferenceCatalog {
        ReferenceCatalog::from_header(
            &SequenceDictionary::new(vec![
                ReferenceSequence::new("chr1", 10_000),
                ReferenceSequence::new("chr2", 4_000),
                ReferenceSequence::new("chrC", 500),
            ]),
            Some(vec![ReferenceSequence::new("chrC", 500)]),
        )
    }

    fn config(mode: Mode) -> BinningConfig {
        let mut config = BinningConfig::new(mode);
        config.bin_size = 1000;
        config
    }

    fn stream(
        records: Vec<AlignmentRecord>,
    ) -> impl Iterator<Item = Result<AlignmentRecord, ParseError>> {
        records.into_iter().map(Ok)
    }

    fn single_end_records() -> Vec<AlignmentRecord> {
        vec![
            AlignmentRecord::mapped("r1", 0, "chr1", 100, 50, 60),
            AlignmentRecord::mapped("r2", 16, "chr1", 1500, 50, 60),
            AlignmentRecord::mapped("r3", 0, "chr1", 1600, 50, 60),
            AlignmentRecord::mapped("r4", 0, "chr2", 3990, 50, 60),
            AlignmentRecord::mapped("r5", 0, "chrC", 10, 50, 60),
            AlignmentRecord::mapped("r6", 4, "chr2", 10, 50, 60),
            AlignmentRecord::mapped("r7", 0, "chr9", 10, 50, 60),
        ]
    }

    #[test]
    fn test_single_end_library() {
        let config = config(Mode::S);
        let catalog = catalog();
        let mut classifier = Classifier::new(&config, &catalog);
        let lib = LibraryName::new("a");

        let acc = bin_library(
            &mut classifier,
            &lib,
            Path::new("a.sam"),
            stream(single_end_records()),
        )
        .unwrap();

        assert_eq!(acc.total(&lib), 4);
        assert_eq!(acc.count("chr1", 0, &lib), 1);
        assert_eq!(acc.count("chr1", 1, &lib), 2);
        assert_eq!(acc.count("chr2", 4, &lib), 1);
        assert_eq!(acc.excluded_count("chrC"), 1);
        assert_eq!(acc.unknown().get("chr9"), Some(&1));

        let binned: u64 = ["chr1", "chr2"]
            .iter()
            .map(|reference| acc.reference_total(reference, &lib))
            .sum();
        assert_eq!(binned, acc.total(&lib));
    }

    #[test]
    fn test_paired_library_skips_secondary_records() {
        let config = config(Mode::Tp);
        let catalog = catalog();
        let mut classifier = Classifier::new(&config, &catalog);
        let lib = LibraryName::new("a");

        let records = vec![
            AlignmentRecord::mapped("p1", 99, "chr1", 100, 100, 60).with_insert_size(400),
            AlignmentRecord::mapped("p1", 355, "chr2", 100, 100, 0),
            AlignmentRecord::mapped("p1", 147, "chr1", 400, 100, 60).with_insert_size(-400),
            AlignmentRecord::mapped("p2", 2145, "chr1", 9000, 40, 60),
            AlignmentRecord::mapped("p2", 83, "chr1", 2600, 100, 60),
            AlignmentRecord::mapped("p2", 163, "chr1", 2300, 100, 60),
        ];

        let acc = bin_library(&mut classifier, &lib, Path::new("a.sam"), stream(records)).unwrap();
        assert_eq!(acc.total(&lib), 2);
        // zone [100, 500] -> 300; zone [2300, 2700] -> 2500
        assert_eq!(acc.count("chr1", 0, &lib), 1);
        assert_eq!(acc.count("chr1", 2, &lib), 1);
        assert_eq!(acc.count("chr2", 0, &lib), 0);
    }

    #[test]
    fn test_trailing_mate_is_fatal() {
        let config = config(Mode::Tp);
        let catalog = catalog();
        let mut classifier = Classifier::new(&config, &catalog);
        let records = vec![
            AlignmentRecord::mapped("p1", 99, "chr1", 100, 100, 60),
            AlignmentRecord::mapped("p1", 147, "chr1", 400, 100, 60),
            AlignmentRecord::mapped("p2", 99, "chr1", 100, 100, 60),
            AlignmentRecord::mapped("p2", 256, "chr1", 100, 100, 60),
        ];

        let err = bin_library(
            &mut classifier,
            &LibraryName::new("a"),
            Path::new("a.sam"),
            stream(records),
        )
        .unwrap_err();
        assert!(matches!(err, BinningError::UnpairedRecord { ref read, .. } if read == "p2"));
    }

    #[test]
    fn test_trailing_secondary_ends_normally() {
        let config = config(Mode::Tp);
        let catalog = catalog();
        let mut classifier = Classifier::new(&config, &catalog);
        let records = vec![
            AlignmentRecord::mapped("p1", 99, "chr1", 100, 100, 60),
            AlignmentRecord::mapped("p1", 147, "chr1", 400, 100, 60),
            AlignmentRecord::mapped("p1", 2147, "chr1", 400, 100, 60),
        ];

        let acc = bin_library(
            &mut classifier,
            &LibraryName::new("a"),
            Path::new("a.sam"),
            stream(records),
        )
        .unwrap();
        assert_eq!(acc.total(&LibraryName::new("a")), 1);
    }

    #[test]
    fn test_desynchronized_mates_abort() {
        let config = config(Mode::Tpa);
        let catalog = catalog();
        let mut classifier = Classifier::new(&config, &catalog);
        let records = vec![
            AlignmentRecord::mapped("p1", 99, "chr1", 100, 100, 60),
            AlignmentRecord::mapped("p2", 147, "chr1", 400, 100, 60),
        ];

        let err = bin_library(
            &mut classifier,
            &LibraryName::new("a"),
            Path::new("a.sam"),
            stream(records),
        )
        .unwrap_err();
        assert_eq!(err.kind(), crate::binning::ErrorKind::StreamIntegrity);
    }

    #[test]
    fn test_binning_is_deterministic() {
        let config = config(Mode::S);
        let catalog = catalog();

        let rows = || {
            let mut classifier = Classifier::new(&config, &catalog);
            let mut acc = BinAccumulator::new();
            for name in ["a", "b"] {
                let lib = LibraryName::new(name);
                let partial = bin_library(
                    &mut classifier,
                    &lib,
                    Path::new("x.sam"),
                    stream(single_end_records()),
                )
                .unwrap();
                acc.merge(partial);
            }
            normalize(&config, &catalog, &acc).unwrap()
        };

        let first: Vec<_> = rows().into_iter().flat_map(|r| r.rows).collect();
        let second: Vec<_> = rows().into_iter().flat_map(|r| r.rows).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn test_plan_libraries_rejects_duplicates() {
        let paths = vec![PathBuf::from("x/s1_aln.sam"), PathBuf::from("y/s1.sam.gz")];
        assert!(matches!(
            plan_libraries(&paths),
            Err(BinningError::Config(_))
        ));

        let paths = vec![PathBuf::from("s1_aln.sam"), PathBuf::from("s2_aln.sam")];
        let inputs = plan_libraries(&paths).unwrap();
        assert_eq!(inputs[1].name, LibraryName::new("s2"));
    }

    #[test]
    fn test_run_requires_inputs() {
        let config = config(Mode::S);
        assert!(matches!(
            run(&config, &[], None),
            Err(BinningError::Config(_))
        ));
    }
}
