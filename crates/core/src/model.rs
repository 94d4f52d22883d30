//! Content model for an e-paper issue.
//!
//! These records mirror the JSON resources of the e-paper API. Decoding is
//! structural only: missing fields fall back to their defaults and `null`
//! strings decode as empty strings.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer};

use crate::date::IssueDate;
use crate::{EpaperError, Result};

/// Element type tag that carries reading-order semantics.
pub const ARTICLE_TYPE: &str = "article";

fn nullable<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// One dated edition of the publication.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Issue {
    /// Edition code, e.g. `az-d`.
    pub paper: String,
    #[serde(deserialize_with = "nullable")]
    pub title: String,
    /// Publication date as `YYYYMMDD`.
    pub date: u32,
    #[serde(deserialize_with = "nullable")]
    pub brand: String,
    #[serde(rename = "numberOfPages")]
    pub page_count: usize,
    /// Page titles, index-aligned with the pages.
    pub page_titles: Vec<String>,
    pub subscription: bool,
    pub bought: bool,
    pub version: i64,
}

impl Issue {
    /// Whether the account may download this issue.
    pub fn is_accessible(&self) -> bool {
        self.subscription || self.bought
    }

    /// Checks the invariants the pipeline relies on.
    pub fn validate(&self) -> Result<()> {
        if self.page_titles.len() != self.page_count {
            return Err(EpaperError::InconsistentIssue {
                title: self.title.clone(),
                reason: format!("{} page titles for {} pages", self.page_titles.len(), self.page_count),
            });
        }
        Ok(())
    }

    pub fn issue_date(&self) -> Result<IssueDate> {
        IssueDate::from_number(self.date)
    }

    /// Title of the page at `index`, if it exists.
    pub fn page_title(&self, index: usize) -> Option<&str> {
        self.page_titles.get(index).map(String::as_str)
    }
}

/// One physical page of an issue.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Page {
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub title: String,
    /// Printed page number.
    pub number: u32,
    /// 0-based position within the issue.
    pub index: usize,
    pub width: u32,
    pub height: u32,
    pub elements: Vec<Element>,
    pub free: bool,
}

impl Page {
    /// Article elements with a usable id, in delivery order.
    pub fn article_elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(|element| element.is_article() && !element.id.is_empty())
    }
}

/// A region of a page. Only article elements matter downstream.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Element {
    pub id: String,
    pub x_start: i32,
    pub x_end: i32,
    pub y_start: i32,
    pub y_end: i32,
    pub area: i64,
    pub width: u32,
    pub height: u32,
    #[serde(rename = "type", deserialize_with = "nullable")]
    pub kind: String,
    #[serde(deserialize_with = "nullable")]
    pub title: String,
    #[serde(deserialize_with = "nullable")]
    pub author: String,
    #[serde(deserialize_with = "nullable")]
    pub underline: String,
    #[serde(deserialize_with = "nullable")]
    pub headline: String,
    #[serde(deserialize_with = "nullable")]
    pub location: String,
}

impl Element {
    pub fn is_article(&self) -> bool {
        self.kind == ARTICLE_TYPE
    }
}

/// Page reference embedded in article and link records.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PageRef {
    pub id: String,
    pub index: usize,
    pub number: u32,
    #[serde(deserialize_with = "nullable")]
    pub title: String,
}

/// Edition, date and page an article belongs to.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PaperRef {
    pub paper: String,
    /// `YYYYMMDD`
    pub date: String,
    #[serde(deserialize_with = "nullable")]
    pub title: String,
    pub page: PageRef,
}

/// Previous/next pointer between articles.
///
/// An empty id means there is no such neighbor.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Link {
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    pub paper: PaperRef,
}

impl Link {
    pub fn new(id: impl Into<String>, page_index: usize) -> Self {
        let mut link = Self { id: id.into(), ..Default::default() };
        link.paper.page.index = page_index;
        link
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }

    /// Page index the linked article lives on.
    pub fn page_index(&self) -> usize {
        self.paper.page.index
    }
}

/// A picture attached to an article.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Picture {
    pub id: String,
    pub x_start: i32,
    pub x_end: i32,
    pub y_start: i32,
    pub y_end: i32,
    pub area: i64,
    pub width: u32,
    pub height: u32,
    #[serde(rename = "type", deserialize_with = "nullable")]
    pub kind: String,
    #[serde(deserialize_with = "nullable")]
    pub description: String,
    /// Bytes actually retrieved; `0` means the image is unavailable.
    #[serde(skip)]
    pub size: u64,
}

impl Picture {
    pub fn is_available(&self) -> bool {
        self.size > 0
    }
}

/// A newspaper article as delivered by the article endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Article {
    pub id: String,
    pub width: u32,
    pub height: u32,
    #[serde(rename = "type", deserialize_with = "nullable")]
    pub kind: String,
    #[serde(deserialize_with = "nullable")]
    pub title: String,
    #[serde(deserialize_with = "nullable")]
    pub author: String,
    #[serde(deserialize_with = "nullable")]
    pub underline: String,
    #[serde(deserialize_with = "nullable")]
    pub headline: String,
    #[serde(deserialize_with = "nullable")]
    pub location: String,
    pub pictures: Vec<Picture>,
    pub paper: PaperRef,
    /// Body markup. Raw until [`Article::prepare`] has run.
    #[serde(deserialize_with = "nullable")]
    pub text: String,
    #[serde(deserialize_with = "nullable")]
    pub sociallink: String,
    #[serde(deserialize_with = "nullable")]
    pub print: String,
    pub wordcount: u32,
    pub prev: Link,
    pub next: Link,
    /// Title shown in tables of contents, set by [`Article::prepare`].
    #[serde(skip)]
    pub display_title: String,
}

impl Article {
    /// Page index this article lives on.
    pub fn page_index(&self) -> usize {
        self.paper.page.index
    }

    /// Display title, empty before [`Article::prepare`].
    pub fn display_title(&self) -> &str {
        &self.display_title
    }

    /// Derives the display title from the raw body, then sanitizes the body.
    ///
    /// The title must be computed first: it reads the body before cleanup.
    pub fn prepare(&mut self) {
        self.display_title = crate::title::derive_title(self);
        self.text = crate::sanitize::sanitize(&self.text);
    }
}

/// Issue-wide article store keyed by article id.
#[derive(Debug, Default)]
pub struct ArticleRegistry {
    articles: HashMap<String, Article>,
}

impl ArticleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an article. Returns `false` when the id was already present,
    /// in which case the first article is kept.
    pub fn insert(&mut self, article: Article) -> bool {
        if self.articles.contains_key(&article.id) {
            return false;
        }
        self.articles.insert(article.id.clone(), article);
        true
    }

    pub fn get(&self, id: &str) -> Option<&Article> {
        self.articles.get(id)
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}
