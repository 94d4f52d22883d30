//! Display titles for articles.
//!
//! Many articles, especially picture-only boxes like the weather map or the
//! puzzle corner, come without a title. [`derive_title`] walks an ordered
//! list of rules and returns the first title one of them produces.

use crate::model::Article;
use crate::sanitize::excerpt;

/// Title used when nothing else is available.
pub const EMPTY_ARTICLE: &str = "Leerer Artikel";

/// Known picture sizes of recurring editorial graphics.
///
/// Checked top to bottom; the first matching size wins.
const PICTURE_NAMES: &[((u32, u32), &str)] = &[
    ((296, 591), "Festgeld"),
    ((1024, 460), "DAX"),
    ((1024, 360), "Rätsel Ecke"),
    ((1024, 361), "Rätsel Ecke"),
    ((1024, 388), "Popel"),
    ((1024, 788), "Wetter"),
    ((361, 818), "Kinder-Sudoku"),
    ((1024, 411), "Finde die Unterschiede"),
];

type TitleRule = fn(&Article) -> Option<String>;

/// Title rules in priority order.
const TITLE_RULES: &[(&str, TitleRule)] = &[
    ("explicit title", explicit_title),
    ("empty article", empty_article),
    ("picture description", picture_description),
    ("picture dimensions", picture_dimensions),
    ("body excerpt", body_excerpt),
];

/// Produces a non-empty display title for `article`.
///
/// Reads the raw body; call it before the body is sanitized.
pub fn derive_title(article: &Article) -> String {
    for (name, rule) in TITLE_RULES {
        if let Some(title) = rule(article) {
            tracing::trace!(article = %article.id, rule = *name, title = %title, "derived title");
            return title;
        }
    }
    EMPTY_ARTICLE.to_string()
}

/// Name for an untitled picture of the given size.
pub fn picture_name(width: u32, height: u32) -> String {
    PICTURE_NAMES
        .iter()
        .find(|(size, _)| *size == (width, height))
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| format!("Bild {} × {}", width, height))
}

fn explicit_title(article: &Article) -> Option<String> {
    (!article.title.is_empty()).then(|| article.title.clone())
}

fn empty_article(article: &Article) -> Option<String> {
    (article.text.is_empty() && article.pictures.is_empty()).then(|| EMPTY_ARTICLE.to_string())
}

fn picture_description(article: &Article) -> Option<String> {
    if !article.text.is_empty() {
        return None;
    }
    let picture = article.pictures.first()?;
    let text = excerpt(&picture.description);
    (!text.is_empty()).then_some(text)
}

fn picture_dimensions(article: &Article) -> Option<String> {
    if !article.text.is_empty() {
        return None;
    }
    article.pictures.first().map(|picture| picture_name(picture.width, picture.height))
}

fn body_excerpt(article: &Article) -> Option<String> {
    let text = excerpt(&article.text);
    (!text.is_empty()).then_some(text)
}
