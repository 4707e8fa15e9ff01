use crate::binning::BinningError;
use crate::core::types::{LibraryName, Mode};

/// Default bin size in bp
pub const DEFAULT_BIN_SIZE: u64 = 1_000_000;

/// Default ploidy multiplier (diploid)
pub const DEFAULT_PLOIDY: u32 = 2;

/// Immutable settings for one binning run
#[derive(Debug, Clone)]
pub struct BinningConfig {
    /// Which flag combinations are countable
    pub mode: Mode,
    /// Bin width in bp, always > 0
    pub bin_size: u64,
    /// Minimum mapping quality
    pub min_mapq: u8,
    /// Multiplier applied to normalized ratios
    pub ploidy: u32,
    /// Library used as normalization denominator (mean of all libraries when None)
    pub control: Option<LibraryName>,
    /// Emit raw counts only
    pub coverage_only: bool,
    /// Emit blank lines after each reference's rows
    pub insert_breaks: bool,
    /// Delete bins whose percentage lies beyond this many standard deviations
    pub outlier_sd: Option<f64>,
    /// Reject later inputs whose headers name references the first input lacks
    pub strict_references: bool,
}

impl BinningConfig {
    #[must_use]
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            bin_size: DEFAULT_BIN_SIZE,
            min_mapq: 0,
            ploidy: DEFAULT_PLOIDY,
            control: None,
            coverage_only: false,
            insert_breaks: false,
            outlier_sd: None,
            strict_references: false,
        }
    }

    /// Check the combination of settings before any input is opened.
    ///
    /// # Errors
    ///
    /// Returns `BinningError::Config` if the bin size is zero, if a control
    /// library is combined with coverage-only output, or if the outlier
    /// threshold is not a positive finite number.
    pub fn validate(&self) -> Result<(), BinningError> {
        if self.bin_size == 0 {
            return Err(BinningError::Config("bin size must be positive".to_string()));
        }
        if self.control.is_some() && self.coverage_only {
            return Err(BinningError::Config(
                "cannot specify a control and suppress the relative coverage columns".to_string(),
            ));
        }
        if let Some(sd) = self.outlier_sd {
            if !sd.is_finite() || sd <= 0.0 {
                return Err(BinningError::Config(format!(
                    "outlier threshold must be a positive number of standard deviations, got {sd}"
                )));
            }
        }
        Ok(())
    }
}
