use serde::{Deserialize, Serialize};

/// A raw scholarly document submitted for indexing.
///
/// Only `title`, `abstract` and `keywords` participate in ranking; the
/// remaining structured fields are carried through to the document
/// store for presentation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientDocument {
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub keywords: String,
    #[serde(default)]
    pub venue: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub n_citation: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub authors: String,
    #[serde(default)]
    pub doc_type: String,
    #[serde(default)]
    pub references: String,
}

impl ClientDocument {
    /// Create a document from its three searchable sections.
    pub fn new(
        title: impl Into<String>,
        abstract_text: impl Into<String>,
        keywords: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            abstract_text: abstract_text.into(),
            keywords: keywords.into(),
            ..Self::default()
        }
    }

    /// Set the publication venue.
    pub fn venue(mut self, venue: impl Into<String>) -> Self {
        self.venue = venue.into();
        self
    }

    /// Set the publication year.
    pub fn year(mut self, year: impl Into<String>) -> Self {
        self.year = year.into();
        self
    }

    /// Set the citation count.
    pub fn n_citation(mut self, n_citation: impl Into<String>) -> Self {
        self.n_citation = n_citation.into();
        self
    }

    /// Set the source URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the author list.
    pub fn authors(mut self, authors: impl Into<String>) -> Self {
        self.authors = authors.into();
        self
    }

    /// Set the document type.
    pub fn doc_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = doc_type.into();
        self
    }

    /// Set the reference list.
    pub fn references(mut self, references: impl Into<String>) -> Self {
        self.references = references.into();
        self
    }
}

/// Normalized output of the preprocessor.
///
/// Each section is a whitespace-separated string of already-normalized
/// tokens. An empty string means the section has no tokens.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreprocessedDocument {
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub keywords: String,
}

impl PreprocessedDocument {
    /// Create a preprocessed document from its three sections.
    pub fn new(
        title: impl Into<String>,
        abstract_text: impl Into<String>,
        keywords: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            abstract_text: abstract_text.into(),
            keywords: keywords.into(),
        }
    }
}

/// A document record as persisted in the append-only document store.
///
/// Field declaration order is the CSV column order:
/// `doc_id, title, keywords, venue, year, n_citation, url, abstract,
/// authors, doc_type, references`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub doc_id: String,
    pub title: String,
    pub keywords: String,
    pub venue: String,
    pub year: String,
    pub n_citation: String,
    pub url: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub authors: String,
    pub doc_type: String,
    pub references: String,
}

impl StoredDocument {
    /// Build the stored record for a client document and its minted id.
    pub fn from_client(doc_id: impl Into<String>, doc: &ClientDocument) -> Self {
        Self {
            doc_id: doc_id.into(),
            title: doc.title.clone(),
            keywords: doc.keywords.clone(),
            venue: doc.venue.clone(),
            year: doc.year.clone(),
            n_citation: doc.n_citation.clone(),
            url: doc.url.clone(),
            abstract_text: doc.abstract_text.clone(),
            authors: doc.authors.clone(),
            doc_type: doc.doc_type.clone(),
            references: doc.references.clone(),
        }
    }
}
