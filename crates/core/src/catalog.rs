//! Site information taken from the e-paper's application script.
//!
//! The script embeds the imprint as an HTML string and lists every edition as
//! `paper:"<code>",title:"<title>",` object literals.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::{EpaperError, Result};

const IMPRINT_START: &str = "<h1>Impressum</h1>";
const IMPRINT_END: &str = "')";

static EDITION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"paper:"([^"]+)",title:"([^"]+)","#).unwrap());

/// One edition of the publication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edition {
    /// Short code used in API paths, e.g. `az-d`.
    pub code: String,
    /// Human readable name, e.g. `Dürener Zeitung`.
    pub title: String,
}

/// Editions known to the site, addressable by code or by title.
#[derive(Debug, Clone, Default)]
pub struct EditionCatalog {
    by_code: BTreeMap<String, String>,
    by_title: BTreeMap<String, String>,
}

impl EditionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an edition. A later entry for the same code or title replaces the
    /// earlier one.
    pub fn insert(&mut self, code: impl Into<String>, title: impl Into<String>) {
        let (code, title) = (code.into(), title.into());
        self.by_title.insert(title.clone(), code.clone());
        self.by_code.insert(code, title);
    }

    /// Looks up an edition by code first, then by title.
    pub fn resolve(&self, name: &str) -> Result<Edition> {
        if let Some(title) = self.by_code.get(name) {
            return Ok(Edition { code: name.to_string(), title: title.clone() });
        }
        if let Some(code) = self.by_title.get(name) {
            return Ok(Edition { code: code.clone(), title: name.to_string() });
        }
        Err(EpaperError::UnknownEdition(name.to_string()))
    }

    /// All editions, sorted by title.
    pub fn editions(&self) -> Vec<Edition> {
        self.by_title
            .iter()
            .map(|(title, code)| Edition { code: code.clone(), title: title.clone() })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.by_title.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_title.is_empty()
    }
}

/// Imprint and edition catalog of the site.
#[derive(Debug, Clone, Default)]
pub struct SiteInfo {
    /// Imprint markup; empty when the script carried none.
    pub imprint: String,
    pub catalog: EditionCatalog,
}

impl SiteInfo {
    /// Extracts imprint and editions from the application script source.
    pub fn from_script(script: &str) -> Self {
        let imprint = extract_imprint(script).unwrap_or_else(|| {
            tracing::warn!("no imprint found in application script");
            String::new()
        });

        let mut catalog = EditionCatalog::new();
        for captures in EDITION.captures_iter(script) {
            catalog.insert(&captures[1], &captures[2]);
        }
        tracing::debug!(editions = catalog.len(), imprint = imprint.len(), "parsed application script");

        Self { imprint, catalog }
    }
}

/// Imprint markup following the `Impressum` heading, up to the closing `')`
/// of the string literal or the end of the script.
fn extract_imprint(script: &str) -> Option<String> {
    let start = script.find(IMPRINT_START)? + IMPRINT_START.len();
    let rest = &script[start..];
    let end = rest.find(IMPRINT_END).unwrap_or(rest.len());
    Some(rest[..end].replace("<br>", "<br />").replace("\\n", "\n"))
}
