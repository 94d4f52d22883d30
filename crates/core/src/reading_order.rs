//! Reading-order reconstruction for a single page.
//!
//! Articles only know their previous and next neighbor, and those pointers
//! may be missing, may leave the page or may even loop. The resolver turns
//! them into one linear [`Sequence`] per page using lookup tables built
//! fresh for that page.

use std::collections::{HashMap, HashSet};

use crate::model::Article;

/// Resolved reading order of one page.
///
/// `slots` is the number of distinct articles found on the page. The walk
/// fills slots from the front; slots it never reached stay empty and are
/// only counted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sequence {
    slots: usize,
    order: Vec<String>,
}

impl Sequence {
    /// Article ids in reading order.
    pub fn ids(&self) -> &[String] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Number of distinct articles on the page.
    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Number of resolved entries.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Articles on the page the walk did not reach.
    pub fn unfilled(&self) -> usize {
        self.slots - self.order.len()
    }

    /// The page has articles but no chain head could be found.
    pub fn is_unresolved(&self) -> bool {
        self.slots > 0 && self.order.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.order.iter().any(|entry| entry == id)
    }
}

/// Whether `article` legitimately starts the chain on its page: it has no
/// predecessor, or the predecessor lives on an earlier page.
fn opens_page(article: &Article) -> bool {
    article.prev.is_empty() || article.prev.page_index() < article.page_index()
}

/// Resolves the reading order of one page's articles.
///
/// `articles` must be in delivery order. The head is the first article that
/// opens the page; from there `next` pointers are followed until one is
/// empty, points off the page, or points back to an article already visited.
/// Never fails; the worst case is an empty sequence.
pub fn resolve<'a, I>(articles: I) -> Sequence
where
    I: IntoIterator<Item = &'a Article>,
{
    let entries: Vec<&Article> = articles.into_iter().collect();

    let mut position_of: HashMap<&str, usize> = HashMap::with_capacity(entries.len());
    let mut next_of: Vec<&str> = Vec::with_capacity(entries.len());
    for (position, article) in entries.iter().enumerate() {
        position_of.insert(article.id.as_str(), position);
        next_of.push(article.next.id.as_str());
    }
    let slots = position_of.len();

    let Some(head) = entries.iter().position(|article| opens_page(article)) else {
        return Sequence { slots, order: Vec::new() };
    };

    let mut visited: HashSet<&str> = HashSet::with_capacity(slots);
    let mut order = Vec::with_capacity(slots);
    let mut current = head;
    loop {
        let id = entries[current].id.as_str();
        if !visited.insert(id) {
            tracing::debug!(article = id, "reading order loops back, chain cut");
            break;
        }
        order.push(id.to_string());

        let next = next_of[current];
        if next.is_empty() || entries[current].next.page_index() != entries[current].page_index() {
            break;
        }
        match position_of.get(next) {
            Some(&position) => current = position,
            None => break,
        }
    }

    Sequence { slots, order }
}
