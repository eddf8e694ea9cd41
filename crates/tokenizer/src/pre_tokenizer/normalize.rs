//! Unicode normalization for pre-tokenization.
//!
//! This module provides Unicode normalization operations (NFC, NFD, NFKC, NFKD)
//! that are commonly applied before BPE encoding, optionally stripping
//! combining marks (diacritics) on the way.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalization form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalizationForm {
    /// Canonical composition
    #[default]
    NFC,
    /// Canonical decomposition
    NFD,
    /// Compatibility composition
    NFKC,
    /// Compatibility decomposition
    NFKD,
    /// No normalization
    None,
}

/// Unicode normalizer.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    /// Normalization form to apply
    form: NormalizationForm,
    /// Remove combining marks after decomposition
    strip_marks: bool,
}

impl Normalizer {
    /// Create a new normalizer.
    pub fn new(form: NormalizationForm) -> Self {
        Self {
            form,
            strip_marks: false,
        }
    }

    /// Create an NFC normalizer (default).
    pub fn nfc() -> Self {
        Self::new(NormalizationForm::NFC)
    }

    /// Decompose, drop combining marks, recompose: "Crème" -> "Creme".
    pub fn strip_accents() -> Self {
        Self::nfc().with_strip_marks(true)
    }

    /// Toggle combining-mark removal.
    ///
    /// With [`NormalizationForm::None`] the stripped text is recomposed to NFC.
    pub fn with_strip_marks(mut self, strip: bool) -> Self {
        self.strip_marks = strip;
        self
    }

    /// Normalize text.
    pub fn normalize(&self, text: &str) -> String {
        if self.strip_marks {
            return self.normalize_stripped(text);
        }
        match self.form {
            NormalizationForm::NFC => text.nfc().collect(),
            NormalizationForm::NFD => text.nfd().collect(),
            NormalizationForm::NFKC => text.nfkc().collect(),
            NormalizationForm::NFKD => text.nfkd().collect(),
            NormalizationForm::None => text.to_string(),
        }
    }

    fn normalize_stripped(&self, text: &str) -> String {
        let decomposed: String = match self.form {
            NormalizationForm::NFKC | NormalizationForm::NFKD => {
                text.nfkd().filter(|&c| !is_combining_mark(c)).collect()
            }
            _ => text.nfd().filter(|&c| !is_combining_mark(c)).collect(),
        };
        match self.form {
            NormalizationForm::NFD | NormalizationForm::NFKD => decomposed,
            _ => decomposed.nfc().collect(),
        }
    }

    /// Check if normalization is enabled.
    pub fn is_enabled(&self) -> bool {
        self.form != NormalizationForm::None || self.strip_marks
    }

    /// The configured form.
    pub fn form(&self) -> NormalizationForm {
        self.form
    }
}
