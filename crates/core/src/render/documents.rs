use super::{IssueContext, XHTML_TAIL, escape_xml, xhtml_head};
use crate::model::{Article, ArticleRegistry, Page};
use crate::package::{COVER_IMAGE, IMPRINT_PAGE, INDEX_PAGE, article_href, page_href, picture_href};
use crate::reading_order::Sequence;

pub const IMAGE_UNAVAILABLE: &str = "Dieses Bild konnte nicht geladen werden";

/// Title page: the front page image, or the issue name when the image is missing.
pub fn title_document(context: &IssueContext<'_>, has_cover_image: bool) -> String {
    let mut doc = xhtml_head("Titelseite");
    doc.push_str("<div id=\"cover\">\n");
    if has_cover_image {
        doc.push_str(&format!("  <img src=\"{}\" alt=\"Titelbild\"/>\n", COVER_IMAGE));
    } else {
        doc.push_str(&format!("  <h1 class=\"title\">{}</h1>\n", escape_xml(&context.issue.title)));
        doc.push_str(&format!("  <p class=\"cover-date\">{}</p>\n", escape_xml(&context.date.long())));
    }
    doc.push_str("</div>\n");
    doc.push_str(XHTML_TAIL);
    doc
}

/// Issue index listing every page.
pub fn index_document(context: &IssueContext<'_>) -> String {
    let title = escape_xml(&context.issue.title);
    let mut doc = xhtml_head(&context.issue.title);
    doc.push_str("<div class=\"ToC\">\n");
    doc.push_str(&format!("  <h1 class=\"title\">{}</h1>\n", title));
    for (index, page_title) in context.issue.page_titles.iter().enumerate() {
        doc.push_str(&format!(
            "  <div class=\"ToCentry\"><a class=\"index-link\" href=\"{}\">{}</a></div>\n",
            page_href(index),
            escape_xml(page_title)
        ));
    }
    doc.push_str(&format!(
        "  <div class=\"source\"><a class=\"external\" href=\"{}\">{} / {}</a></div>\n",
        escape_xml(&context.reader_url(None)),
        context.date.numeric(),
        title
    ));
    doc.push_str("</div>\n");
    doc.push_str(XHTML_TAIL);
    doc
}

fn neighbor(context: &IssueContext<'_>, index: Option<usize>) -> Option<(usize, String)> {
    let index = index?;
    context
        .issue
        .page_title(index)
        .filter(|title| !title.is_empty())
        .map(|title| (index, title.to_string()))
}

/// Table of contents of one page, listing its resolved articles.
///
/// Pages without a reading order only point to the online reader.
pub fn page_document(context: &IssueContext<'_>, page: &Page, sequence: &Sequence, articles: &ArticleRegistry) -> String {
    let reader = escape_xml(&context.reader_url(Some(page.index)));
    let mut doc = xhtml_head(&context.issue.title);
    doc.push_str("<div class=\"ToC\">\n");
    doc.push_str(&format!("  <h1 class=\"title\">{}</h1>\n", escape_xml(&page.title)));

    match neighbor(context, page.index.checked_sub(1)) {
        Some((index, title)) => doc.push_str(&format!(
            "  <a class=\"previous-page\" href=\"{}\">{}</a>\n",
            page_href(index),
            escape_xml(&title)
        )),
        None => doc.push_str(&format!("  <a class=\"previous-page\" href=\"{}\">Inhalt</a>\n", INDEX_PAGE)),
    }
    match neighbor(context, Some(page.index + 1)) {
        Some((index, title)) => doc.push_str(&format!(
            "  <a class=\"next-page\" href=\"{}\">{}</a>\n",
            page_href(index),
            escape_xml(&title)
        )),
        None => doc.push_str(&format!("  <a class=\"next-page\" href=\"{}\">Impressum</a>\n", IMPRINT_PAGE)),
    }

    if sequence.is_empty() {
        doc.push_str("  <div class=\"onlineonly\">\n");
        doc.push_str(&format!(
            "    <p>Diese Seite ist leider nur <a class=\"external\" href=\"{}\">online</a> oder im PDF verfügbar.</p>\n",
            reader
        ));
        doc.push_str("  </div>\n");
    } else {
        for article in sequence.iter().filter_map(|id| articles.get(id)) {
            doc.push_str(&format!(
                "  <div class=\"ToCentry\"><a class=\"index-link\" href=\"{}\">{}</a></div>\n",
                article_href(&article.id),
                escape_xml(article.display_title())
            ));
        }
        doc.push_str(&format!(
            "  <div class=\"source\"><a class=\"external\" href=\"{}\">{} / {} / Seite {}</a></div>\n",
            reader,
            context.date.numeric(),
            escape_xml(&context.issue.title),
            page.number
        ));
    }

    doc.push_str("</div>\n");
    doc.push_str(XHTML_TAIL);
    doc
}

/// Article document with header, pictures, author, body and source link.
pub fn article_document(context: &IssueContext<'_>, article: &Article) -> String {
    let mut doc = xhtml_head(article.display_title());
    doc.push_str("<div class=\"article\">\n");

    if !article.title.is_empty() || !article.underline.is_empty() {
        doc.push_str("  <div class=\"header\">\n");
        if !article.title.is_empty() {
            doc.push_str(&format!("    <h1>{}</h1>\n", escape_xml(&article.title)));
        }
        if !article.underline.is_empty() {
            doc.push_str(&format!("    {}\n", article.underline));
        }
        doc.push_str("  </div>\n");
    }

    for picture in &article.pictures {
        doc.push_str("  <div class=\"image\">\n");
        if picture.is_available() {
            doc.push_str(&format!(
                "    <img src=\"{}\" alt=\"{}\"/>\n",
                escape_xml(&picture_href(&picture.id)),
                escape_xml(&picture.description)
            ));
        } else {
            doc.push_str(&format!("    <p class=\"imgerr\">{}</p>\n", IMAGE_UNAVAILABLE));
        }
        if !picture.description.is_empty() {
            doc.push_str(&format!("    <p class=\"imgdescription\">{}</p>\n", escape_xml(&picture.description)));
        }
        doc.push_str("  </div>\n");
    }

    if !article.author.is_empty() {
        doc.push_str(&format!("  <div class=\"author\">{}</div>\n", article.author));
    }
    if !article.text.is_empty() {
        doc.push_str(&format!("  <div class=\"content\">\n    {}\n  </div>\n", article.text));
    }

    let paper = &article.paper;
    let edition = if paper.paper.is_empty() { context.issue.paper.as_str() } else { paper.paper.as_str() };
    let date = if paper.date.is_empty() { context.date.compact() } else { paper.date.clone() };
    let source_title = if paper.title.is_empty() { context.issue.title.as_str() } else { paper.title.as_str() };
    let link = format!(
        "{}&article={}",
        context.config.reader_url(edition, &date, paper.page.index),
        article.id
    );
    doc.push_str(&format!(
        "  <div class=\"source\"><a class=\"external\" href=\"{}\">{} / {} / Seite {} / {}</a></div>\n",
        escape_xml(&link),
        context.date.numeric(),
        escape_xml(source_title),
        paper.page.number,
        escape_xml(&paper.page.title)
    ));

    doc.push_str("</div>\n");
    doc.push_str(XHTML_TAIL);
    doc
}

/// Imprint page; `imprint` is markup taken from the site.
pub fn imprint_document(imprint: &str) -> String {
    let mut doc = xhtml_head("Impressum");
    doc.push_str("<div class=\"article\">\n");
    doc.push_str("  <div class=\"header\"><h1>Impressum</h1></div>\n");
    doc.push_str(&format!("  <div class=\"content\">\n{}\n  </div>\n", imprint));
    doc.push_str("</div>\n");
    doc.push_str(XHTML_TAIL);
    doc
}
