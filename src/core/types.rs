use serde::{Deserialize, Serialize};

/// Insert sizes at or above this are treated as implausible for the relaxed pair classes
pub const MAX_RELAXED_INSERT: i64 = 2001;

/// Run-wide policy selecting which flag combinations are countable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum Mode {
    /// Reads mapped single-ended
    #[value(name = "S")]
    #[serde(rename = "S")]
    S,
    /// Reads mapped paired, but each mate counted on its own
    #[value(name = "PS")]
    #[serde(rename = "PS")]
    Ps,
    /// Reads mapped paired, proper forward/reverse pairs only
    #[value(name = "TP")]
    #[serde(rename = "TP")]
    Tp,
    /// As TP, also allowing odd inserts up to 2kb
    #[value(name = "TPI")]
    #[serde(rename = "TPI")]
    Tpi,
    /// As TP, also allowing same-strand pairs (+,+ and -,-)
    #[value(name = "TPM")]
    #[serde(rename = "TPM")]
    Tpm,
    /// As TP, allowing both odd inserts and same-strand pairs
    #[value(name = "TPA")]
    #[serde(rename = "TPA")]
    Tpa,
}

impl Mode {
    /// Whether records are consumed two at a time as mates
    #[must_use]
    pub fn is_paired(self) -> bool {
        !matches!(self, Self::S)
    }

    /// Whether mates are binned independently of each other
    #[must_use]
    pub fn is_independent(self) -> bool {
        matches!(self, Self::Ps)
    }

    /// Correct orientation with an unusual insert size
    #[must_use]
    pub fn allows_odd_insert(self) -> bool {
        matches!(self, Self::Tpi | Self::Tpa | Self::Ps)
    }

    /// Both mates on the same strand
    #[must_use]
    pub fn allows_same_strand(self) -> bool {
        matches!(self, Self::Tpm | Self::Tpa | Self::Ps)
    }

    /// Same strand and an unusual insert size
    #[must_use]
    pub fn allows_same_strand_odd_insert(self) -> bool {
        matches!(self, Self::Tpa | Self::Ps)
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::S => write!(f, "S"),
            Self::Ps => write!(f, "PS"),
            Self::Tp => write!(f, "TP"),
            Self::Tpi => write!(f, "TPI"),
            Self::Tpm => write!(f, "TPM"),
            Self::Tpa => write!(f, "TPA"),
        }
    }
}

/// The FLAG values of two mates, sorted ascending
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FlagPair(pub u16, pub u16);

impl FlagPair {
    #[must_use]
    pub fn new(a: u16, b: u16) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    #[must_use]
    pub fn low(self) -> u16 {
        self.0
    }

    #[must_use]
    pub fn is_one_of(self, pairs: &[(u16, u16)]) -> bool {
        pairs.iter().any(|&(a, b)| self.0 == a && self.1 == b)
    }
}

impl std::fmt::Display for FlagPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.0, self.1)
    }
}

/// Name of a library, derived from its source file
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LibraryName(pub String);

impl LibraryName {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Derive a library name from a file path: the base name up to its first
    /// `.`, with any `_aln` marker removed.
    #[must_use]
    pub fn from_path(path: &std::path::Path) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = file_name.split('.').next().unwrap_or_default();
        Self(stem.replace("_aln", ""))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LibraryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
