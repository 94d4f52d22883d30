//! XHTML and XML documents of the package.
//!
//! Every renderer is a pure function of fully populated records. Plain text
//! is escaped on the way in; article body, underline and author markup are
//! inserted as delivered.

pub mod documents;
pub mod fragments;
pub mod navigation;
pub mod opf;

pub use documents::{article_document, imprint_document, index_document, page_document, title_document};
pub use fragments::{CONTAINER_XML, STYLESHEET_CSS};
pub use navigation::{nav_document, ncx_document};
pub use opf::content_opf;

use crate::config::EpaperConfig;
use crate::date::IssueDate;
use crate::model::Issue;

/// Issue-level values shared by all documents.
#[derive(Debug, Clone, Copy)]
pub struct IssueContext<'a> {
    pub issue: &'a Issue,
    pub date: IssueDate,
    pub config: &'a EpaperConfig,
}

impl<'a> IssueContext<'a> {
    pub fn new(issue: &'a Issue, date: IssueDate, config: &'a EpaperConfig) -> Self {
        Self { issue, date, config }
    }

    /// `Dürener Zeitung - 21. Aug. 2020`
    pub fn book_title(&self) -> String {
        format!("{} - {}", self.issue.title, self.date.long())
    }

    /// Online reader link for the issue or one of its pages.
    pub fn reader_url(&self, page_index: Option<usize>) -> String {
        let date = self.date.compact();
        match page_index {
            Some(index) => self.config.reader_url(&self.issue.paper, &date, index),
            None => format!("{}/#/read/{}/{}", self.config.base_url.trim_end_matches('/'), self.issue.paper, date),
        }
    }
}

/// Escapes XML special characters.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// XML declaration and doctype of every XHTML document. Delivered markup
/// uses `&nbsp;`, which XML only accepts when declared.
pub(crate) const XHTML_PROLOG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html [ <!ENTITY nbsp "&#160;"> ]>
"#;

/// Opening of every XHTML content document, through `<body>`.
pub(crate) fn xhtml_head(title: &str) -> String {
    format!(
        r#"{}<html xmlns="http://www.w3.org/1999/xhtml" xml:lang="de" lang="de">
<head>
  <meta http-equiv="Content-Type" content="text/html; charset=UTF-8"/>
  <title>{}</title>
  <link rel="stylesheet" type="text/css" href="{}"/>
</head>
<body>
"#,
        XHTML_PROLOG,
        escape_xml(title),
        crate::package::STYLESHEET
    )
}

pub(crate) const XHTML_TAIL: &str = "</body>\n</html>\n";
