//! Manifest, spine and navigation tree of the EPUB package.
//!
//! The [`PackageAssembler`] is fed one page at a time, in issue order, and
//! records everything that should be reachable from the package documents.
//! Only articles in a page's resolved [`Sequence`] are linked; anything else
//! that was rendered stays in the archive unreferenced.

use std::collections::HashSet;

use crate::model::{ArticleRegistry, Page};
use crate::reading_order::Sequence;
use crate::{EpaperError, Result};

pub const XHTML: &str = "application/xhtml+xml";
pub const JPEG: &str = "image/jpeg";
pub const NCX: &str = "application/x-dtbncx+xml";
pub const CSS: &str = "text/css";

pub const TITLE_PAGE: &str = "title.xhtml";
pub const INDEX_PAGE: &str = "index.xhtml";
pub const IMPRINT_PAGE: &str = "impressum.xhtml";
pub const NAVIGATION_PAGE: &str = "navigation.xhtml";
pub const NCX_FILE: &str = "toc.ncx";
pub const STYLESHEET: &str = "zva.epub.css";
pub const COVER_IMAGE: &str = "images/title.jpg";

/// Document name of a page table of contents.
pub fn page_href(page_index: usize) -> String {
    format!("seite_{}.xhtml", page_index)
}

/// Document name of an article.
pub fn article_href(article_id: &str) -> String {
    format!("article_{}.xhtml", article_id)
}

/// File name of a picture.
pub fn picture_href(picture_id: &str) -> String {
    format!("images/{}.jpg", picture_id)
}

/// One addressable item of the package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestItem {
    pub id: String,
    /// Path relative to the package document.
    pub href: String,
    pub media_type: &'static str,
    pub properties: Option<&'static str>,
}

impl ManifestItem {
    fn new(id: impl Into<String>, href: impl Into<String>, media_type: &'static str) -> Self {
        Self { id: id.into(), href: href.into(), media_type, properties: None }
    }
}

/// Entry of the navigation tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavPoint {
    pub id: String,
    pub label: String,
    pub src: String,
    /// Position marker, unique and contiguous across the whole tree.
    pub play_order: u32,
    pub children: Vec<NavPoint>,
}

/// Counter handing out navigation position markers.
///
/// Starts at 1 and advances once per opened entry; closing an entry does
/// not consume a position.
#[derive(Debug, Default)]
pub struct PlayOrder {
    issued: u32,
}

impl PlayOrder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position for the next entry opened.
    pub fn open(&mut self) -> u32 {
        self.issued += 1;
        self.issued
    }

    /// Number of positions handed out so far.
    pub fn issued(&self) -> u32 {
        self.issued
    }
}

/// Assembled package: manifest, spine and navigation tree.
#[derive(Debug, Clone)]
pub struct Package {
    pub manifest: Vec<ManifestItem>,
    /// Manifest ids in reading order.
    pub spine: Vec<String>,
    pub navigation: Vec<NavPoint>,
    /// Whether the cover image is part of the manifest.
    pub has_cover_image: bool,
}

impl Package {
    pub fn item(&self, id: &str) -> Option<&ManifestItem> {
        self.manifest.iter().find(|item| item.id == id)
    }

    pub fn contains_href(&self, href: &str) -> bool {
        self.manifest.iter().any(|item| item.href == href)
    }

    /// Navigation entries in depth-first order.
    pub fn nav_points(&self) -> Vec<&NavPoint> {
        fn walk<'a>(points: &'a [NavPoint], out: &mut Vec<&'a NavPoint>) {
            for point in points {
                out.push(point);
                walk(&point.children, out);
            }
        }
        let mut out = Vec::new();
        walk(&self.navigation, &mut out);
        out
    }

    /// Checks every cross-reference invariant of the package.
    pub fn verify(&self) -> Result<()> {
        let mut ids = HashSet::new();
        let mut hrefs = HashSet::new();
        for item in &self.manifest {
            if !ids.insert(item.id.as_str()) {
                return Err(EpaperError::Package(format!("duplicate manifest id {}", item.id)));
            }
            if !hrefs.insert(item.href.as_str()) {
                return Err(EpaperError::Package(format!("duplicate manifest href {}", item.href)));
            }
        }

        let mut spine_ids = HashSet::new();
        for idref in &self.spine {
            if !ids.contains(idref.as_str()) {
                return Err(EpaperError::Package(format!("spine entry {} missing from manifest", idref)));
            }
            if !spine_ids.insert(idref.as_str()) {
                return Err(EpaperError::Package(format!("spine entry {} listed twice", idref)));
            }
        }

        let mut nav_ids = HashSet::new();
        for (position, point) in self.nav_points().into_iter().enumerate() {
            if !hrefs.contains(point.src.as_str()) {
                return Err(EpaperError::Package(format!("navigation target {} missing from manifest", point.src)));
            }
            if !nav_ids.insert(point.id.as_str()) {
                return Err(EpaperError::Package(format!("duplicate navigation id {}", point.id)));
            }
            let expected = position as u32 + 1;
            if point.play_order != expected {
                return Err(EpaperError::Package(format!(
                    "navigation entry {} has position {}, expected {}",
                    point.id, point.play_order, expected
                )));
            }
        }
        Ok(())
    }
}

/// Collects manifest, spine and navigation entries across an issue.
#[derive(Debug)]
pub struct PackageAssembler {
    manifest: Vec<ManifestItem>,
    spine: Vec<String>,
    navigation: Vec<NavPoint>,
    play_order: PlayOrder,
    linked_articles: HashSet<String>,
    linked_pictures: HashSet<String>,
}

impl PackageAssembler {
    /// Starts a package with the cover and table of contents entries.
    pub fn new() -> Self {
        let mut assembler = Self {
            manifest: vec![
                ManifestItem::new("ncx", NCX_FILE, NCX),
                ManifestItem::new("title", TITLE_PAGE, XHTML),
                ManifestItem::new("index", INDEX_PAGE, XHTML),
            ],
            spine: vec!["title".to_string(), "index".to_string()],
            navigation: Vec::new(),
            play_order: PlayOrder::new(),
            linked_articles: HashSet::new(),
            linked_pictures: HashSet::new(),
        };
        assembler.push_leaf("startseite", "Startseite", TITLE_PAGE);
        assembler.push_leaf("inhalt", "Inhalt", INDEX_PAGE);
        assembler
    }

    fn push_leaf(&mut self, id: &str, label: &str, src: &str) {
        let play_order = self.play_order.open();
        self.navigation.push(NavPoint {
            id: id.to_string(),
            label: label.to_string(),
            src: src.to_string(),
            play_order,
            children: Vec::new(),
        });
    }

    /// Records a page and the articles of its resolved sequence.
    ///
    /// Pictures are only referenced when they were actually retrieved. An
    /// article linked from an earlier page keeps its first manifest entry
    /// and only gains another navigation entry.
    pub fn add_page(&mut self, page: &Page, sequence: &Sequence, articles: &ArticleRegistry) -> Result<()> {
        let page_id = format!("seite_{}", page.index);
        let href = page_href(page.index);
        self.manifest.push(ManifestItem::new(page_id.clone(), href.clone(), XHTML));
        self.spine.push(page_id.clone());

        let label = if page.title.is_empty() { format!("Seite {}", page.number) } else { page.title.clone() };
        let mut page_point =
            NavPoint { id: page_id, label, src: href, play_order: self.play_order.open(), children: Vec::new() };

        for article_id in sequence.iter() {
            let article = articles.get(article_id).ok_or_else(|| {
                EpaperError::Package(format!("article {} on page {} was never fetched", article_id, page.index))
            })?;
            let item_id = format!("article_{}_{}", page.index, article.id);
            let href = article_href(&article.id);

            if self.linked_articles.insert(article.id.clone()) {
                self.manifest.push(ManifestItem::new(item_id.clone(), href.clone(), XHTML));
                self.spine.push(item_id.clone());

                for picture in article.pictures.iter().filter(|picture| picture.is_available()) {
                    if self.linked_pictures.insert(picture.id.clone()) {
                        self.manifest.push(ManifestItem::new(
                            format!("image_{}", picture.id),
                            picture_href(&picture.id),
                            JPEG,
                        ));
                    }
                }
            }

            page_point.children.push(NavPoint {
                id: item_id,
                label: article.display_title().to_string(),
                src: href,
                play_order: self.play_order.open(),
                children: Vec::new(),
            });
        }

        self.navigation.push(page_point);
        Ok(())
    }

    /// Closes the package with the imprint and the fixed trailing items.
    pub fn finish(mut self, has_cover_image: bool) -> Result<Package> {
        self.push_leaf("impressum", "Impressum", IMPRINT_PAGE);

        self.manifest.push(ManifestItem {
            properties: Some("nav"),
            ..ManifestItem::new("navigation", NAVIGATION_PAGE, XHTML)
        });
        self.manifest.push(ManifestItem::new("imprint", IMPRINT_PAGE, XHTML));
        if has_cover_image {
            self.manifest.push(ManifestItem::new("titleImage", COVER_IMAGE, JPEG));
        }
        self.manifest.push(ManifestItem::new("epub-stylesheet", STYLESHEET, CSS));
        self.spine.push("imprint".to_string());

        tracing::debug!(
            items = self.manifest.len(),
            spine = self.spine.len(),
            positions = self.play_order.issued(),
            "package assembled"
        );

        let package =
            Package { manifest: self.manifest, spine: self.spine, navigation: self.navigation, has_cover_image };
        package.verify()?;
        Ok(package)
    }
}

impl Default for PackageAssembler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Article, Picture};
    use crate::reading_order::resolve;

    fn picture(id: &str, size: u64) -> Picture {
        Picture { id: id.to_string(), size, ..Default::default() }
    }

    fn article(id: &str, page: usize, next: &str, pictures: Vec<Picture>) -> Article {
        let mut article = Article {
            id: id.to_string(),
            title: format!("Titel {}", id),
            pictures,
            next: crate::model::Link::new(next, page),
            ..Default::default()
        };
        article.paper.page.index = page;
        article.prepare();
        article
    }

    fn page(index: usize, title: &str) -> Page {
        Page { index, number: index as u32 + 1, title: title.to_string(), ..Default::default() }
    }

    /// Two pages: page 0 with a chain a -> b plus an unreachable article u
    /// (its predecessor sits on the same page), page 1 with a single c.
    fn sample() -> (Vec<(Page, Sequence)>, ArticleRegistry) {
        let mut registry = ArticleRegistry::new();
        let a = article("a", 0, "b", vec![picture("pa", 1200), picture("pb", 0)]);
        let b = article("b", 0, "", vec![]);
        let mut u = article("u", 0, "", vec![picture("pu", 900)]);
        u.prev = crate::model::Link::new("a", 0);
        let c = article("c", 1, "", vec![picture("pc", 10)]);

        let first = resolve([&a, &b, &u]);
        let second = resolve([&c]);
        for article in [a, b, u, c] {
            registry.insert(article);
        }
        (vec![(page(0, "TITELSEITE"), first), (page(1, "LOKALES"), second)], registry)
    }

    fn assemble() -> Package {
        let (pages, registry) = sample();
        let mut assembler = PackageAssembler::new();
        for (page, sequence) in &pages {
            assembler.add_page(page, sequence, &registry).unwrap();
        }
        assembler.finish(true).unwrap()
    }

    #[test]
    fn test_play_order_counter() {
        let mut counter = PlayOrder::new();
        assert_eq!(counter.open(), 1);
        assert_eq!(counter.open(), 2);
        assert_eq!(counter.issued(), 2);
    }

    #[test]
    fn test_spine_order() {
        let package = assemble();
        assert_eq!(
            package.spine,
            vec!["title", "index", "seite_0", "article_0_a", "article_0_b", "seite_1", "article_1_c", "imprint"]
        );
    }

    #[test]
    fn test_spine_entries_have_manifest_items() {
        let package = assemble();
        for idref in &package.spine {
            assert_eq!(package.manifest.iter().filter(|item| &item.id == idref).count(), 1);
        }
    }

    #[test]
    fn test_picture_gate() {
        let package = assemble();
        assert!(package.item("image_pa").is_some());
        assert!(package.item("image_pc").is_some());
        assert!(package.item("image_pb").is_none());
        assert_eq!(package.item("image_pa").map(|item| item.href.as_str()), Some("images/pa.jpg"));
    }

    #[test]
    fn test_unreachable_article_not_linked() {
        let package = assemble();
        assert!(!package.contains_href("article_u.xhtml"));
        assert!(package.item("image_pu").is_none());
        assert!(package.nav_points().iter().all(|point| point.src != "article_u.xhtml"));
    }

    #[test]
    fn test_navigation_positions() {
        let package = assemble();
        let points = package.nav_points();
        let orders: Vec<u32> = points.iter().map(|point| point.play_order).collect();
        let ids: Vec<&str> = points.iter().map(|point| point.id.as_str()).collect();

        assert_eq!(orders, (1..=8).collect::<Vec<u32>>());
        assert_eq!(
            ids,
            vec!["startseite", "inhalt", "seite_0", "article_0_a", "article_0_b", "seite_1", "article_1_c", "impressum"]
        );
        assert_eq!(package.navigation[2].children.len(), 2);
        assert_eq!(package.navigation[2].children[0].label, "Titel a");
    }

    #[test]
    fn test_navigation_targets_exist() {
        let package = assemble();
        for point in package.nav_points() {
            assert!(package.contains_href(&point.src), "{} not in manifest", point.src);
        }
        assert!(package.verify().is_ok());
    }

    #[test]
    fn test_missing_cover_image_left_out() {
        let package = PackageAssembler::new().finish(false).unwrap();
        assert!(package.item("titleImage").is_none());
        assert!(!package.has_cover_image);
        assert_eq!(package.nav_points().len(), 3);
    }

    #[test]
    fn test_nav_manifest_item_properties() {
        let package = assemble();
        assert_eq!(package.item("navigation").and_then(|item| item.properties), Some("nav"));
    }

    #[test]
    fn test_unresolved_page_has_no_children() {
        let registry = ArticleRegistry::new();
        let mut assembler = PackageAssembler::new();
        assembler.add_page(&page(0, ""), &Sequence::default(), &registry).unwrap();
        let package = assembler.finish(true).unwrap();

        assert_eq!(package.navigation[2].label, "Seite 1");
        assert!(package.navigation[2].children.is_empty());
    }

    #[test]
    fn test_article_repeated_on_later_page() {
        let (pages, registry) = sample();
        let mut assembler = PackageAssembler::new();
        assembler.add_page(&pages[0].0, &pages[0].1, &registry).unwrap();
        assembler.add_page(&page(1, "WIEDERHOLUNG"), &pages[0].1, &registry).unwrap();
        let package = assembler.finish(true).unwrap();

        assert_eq!(package.manifest.iter().filter(|item| item.href == "article_a.xhtml").count(), 1);
        assert_eq!(package.navigation[3].children.len(), 2);
        assert!(package.verify().is_ok());
    }

    #[test]
    fn test_sequence_article_missing_from_registry() {
        let (pages, _) = sample();
        let mut assembler = PackageAssembler::new();
        let result = assembler.add_page(&pages[0].0, &pages[0].1, &ArticleRegistry::new());
        assert!(matches!(result, Err(EpaperError::Package(_))));
    }

    #[test]
    fn test_verify_rejects_gaps() {
        let mut package = assemble();
        package.navigation[1].play_order = 7;
        assert!(matches!(package.verify(), Err(EpaperError::Package(_))));
    }

    #[test]
    fn test_verify_rejects_dangling_spine() {
        let mut package = assemble();
        package.spine.push("article_9_z".to_string());
        assert!(package.verify().is_err());
    }
}
