//! The preprocessing seam between raw documents and the index.
//!
//! The core consumes already-normalized, whitespace-separated token
//! strings per section. Where those come from is behind the
//! [`Preprocessor`] trait: [`StandardPreprocessor`] normalizes inline,
//! while [`HttpPreprocessor`] (feature `remote-preprocess`) delegates to
//! an external service. A preprocessor failure aborts the ingest before
//! any engine state is mutated.

use crate::data::{ClientDocument, PreprocessedDocument};
use crate::error::Result;

/// Produces the normalized per-section token view of a raw document.
pub trait Preprocessor: Send + Sync {
    /// Preprocessor name, for diagnostics.
    fn name(&self) -> &str;

    /// Normalize the three searchable sections of a document.
    ///
    /// Each returned section is a whitespace-separated token string;
    /// empty sections come back as empty strings.
    fn preprocess(&self, doc: &ClientDocument) -> Result<PreprocessedDocument>;
}

/// Inline preprocessor: lowercase, strip non-alphanumeric characters,
/// collapse whitespace.
#[derive(Debug, Default)]
pub struct StandardPreprocessor;

impl StandardPreprocessor {
    /// Create a new standard preprocessor.
    pub fn new() -> Self {
        Self
    }

    fn normalize(text: &str) -> String {
        let cleaned: String = text
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { ' ' })
            .collect();
        cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

impl Preprocessor for StandardPreprocessor {
    fn name(&self) -> &str {
        "standard"
    }

    fn preprocess(&self, doc: &ClientDocument) -> Result<PreprocessedDocument> {
        Ok(PreprocessedDocument::new(
            Self::normalize(&doc.title),
            Self::normalize(&doc.abstract_text),
            Self::normalize(&doc.keywords),
        ))
    }
}

#[cfg(feature = "remote-preprocess")]
pub use self::remote::HttpPreprocessor;

#[cfg(feature = "remote-preprocess")]
mod remote {
    use serde::Deserialize;

    use super::Preprocessor;
    use crate::data::{ClientDocument, PreprocessedDocument};
    use crate::error::{FolioError, Result};

    #[derive(Debug, Deserialize)]
    struct PreprocessResponse {
        success: bool,
        #[serde(default)]
        message: String,
        #[serde(default)]
        title: String,
        #[serde(default, rename = "abstract")]
        abstract_text: String,
        #[serde(default)]
        keywords: String,
    }

    /// Preprocessor backed by an external HTTP service.
    ///
    /// POSTs the raw document as JSON and expects
    /// `{success, title, abstract, keywords}` back. Transport failures
    /// and explicit `success: false` both surface as
    /// [`FolioError::Preprocess`].
    #[derive(Debug)]
    pub struct HttpPreprocessor {
        url: String,
        client: reqwest::blocking::Client,
    }

    impl HttpPreprocessor {
        /// Create a preprocessor targeting the given service URL.
        pub fn new(url: impl Into<String>) -> Self {
            Self {
                url: url.into(),
                client: reqwest::blocking::Client::new(),
            }
        }
    }

    impl Preprocessor for HttpPreprocessor {
        fn name(&self) -> &str {
            "http"
        }

        fn preprocess(&self, doc: &ClientDocument) -> Result<PreprocessedDocument> {
            let response = self
                .client
                .post(&self.url)
                .json(doc)
                .send()
                .map_err(|e| FolioError::preprocess(format!("request failed: {e}")))?;

            let parsed: PreprocessResponse = response
                .json()
                .map_err(|e| FolioError::preprocess(format!("malformed response: {e}")))?;

            if !parsed.success {
                return Err(FolioError::preprocess(parsed.message));
            }

            Ok(PreprocessedDocument::new(
                parsed.title,
                parsed.abstract_text,
                parsed.keywords,
            ))
        }
    }
}
