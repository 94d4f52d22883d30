//! Conversion of one issue into an EPUB package.
//!
//! The [`Converter`] walks the issue strictly in order: pages by index,
//! articles in delivery order, one request at a time. Every file is handed to
//! a [`Sink`] as soon as it is complete; the package documents come last.

use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use time::OffsetDateTime;

use crate::archive::{Sink, ZipSink};
use crate::config::EpaperConfig;
use crate::date::{IssueDate, modified_timestamp};
use crate::fetch::{Fetcher, paths};
use crate::model::{Article, ArticleRegistry, Issue, Page};
use crate::package::{
    COVER_IMAGE, IMPRINT_PAGE, INDEX_PAGE, NAVIGATION_PAGE, NCX_FILE, PackageAssembler, STYLESHEET, TITLE_PAGE,
    article_href, page_href, picture_href,
};
use crate::reading_order::resolve;
use crate::render::{self, IssueContext};
use crate::{EpaperError, Result};

const CONTENT_DIR: &str = "OEBPS";
const CONTAINER_PATH: &str = "META-INF/container.xml";
const OPF_FILE: &str = "content.opf";

fn content_path(href: &str) -> String {
    format!("{}/{}", CONTENT_DIR, href)
}

/// `az-d-2020-08-21.epub`
pub fn output_file_name(edition: &str, date: IssueDate) -> String {
    format!("{}-{}.epub", edition, date.iso())
}

/// Summary of a finished conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionReport {
    pub pages: usize,
    /// Distinct articles written to the archive.
    pub articles_rendered: usize,
    /// Distinct articles reachable from the navigation.
    pub articles_linked: usize,
    /// Pages with articles but no reading order.
    pub unresolved_pages: usize,
    /// Pictures that could not be retrieved.
    pub missing_pictures: usize,
    pub has_cover_image: bool,
}

/// Drives the conversion of issues of one edition.
pub struct Converter<F> {
    fetcher: F,
    config: EpaperConfig,
    imprint: String,
    modified: Option<OffsetDateTime>,
}

impl<F: Fetcher> Converter<F> {
    pub fn new(fetcher: F, config: EpaperConfig, imprint: impl Into<String>) -> Self {
        Self { fetcher, config, imprint: imprint.into(), modified: None }
    }

    /// Uses a fixed modification time instead of the current time.
    pub fn modified_at(mut self, at: OffsetDateTime) -> Self {
        self.modified = Some(at);
        self
    }

    /// Fetches the issue record for `date` (`latest` or `YYYYMMDD`) and checks
    /// that it can be converted.
    pub async fn fetch_issue(&self, date: &str) -> Result<Issue> {
        let issue: Issue = self.fetcher.get_json(&paths::issue(date)).await?;
        if !issue.is_accessible() {
            return Err(EpaperError::NotEntitled { title: issue.title });
        }
        issue.validate()?;
        issue.issue_date()?;
        tracing::info!(title = %issue.title, date = issue.date, pages = issue.page_count, "issue found");
        Ok(issue)
    }

    /// Writes the complete package of `issue` into `sink`.
    pub async fn build<S: Sink>(&self, issue: &Issue, sink: &mut S) -> Result<ConversionReport> {
        let date = issue.issue_date()?;
        let compact = date.compact();
        let context = IssueContext::new(issue, date, &self.config);
        let mut report = ConversionReport { pages: issue.page_count, ..Default::default() };

        sink.put(CONTAINER_PATH, render::CONTAINER_XML.as_bytes())?;

        let cover = self.fetcher.get_bytes(&paths::cover(&compact)).await?;
        report.has_cover_image = !cover.is_empty();
        if report.has_cover_image {
            sink.put(&content_path(COVER_IMAGE), &cover)?;
        } else {
            tracing::warn!(issue = %issue.title, "front page image unavailable");
        }

        sink.put(&content_path(STYLESHEET), render::STYLESHEET_CSS.as_bytes())?;
        sink.put(&content_path(TITLE_PAGE), render::title_document(&context, report.has_cover_image).as_bytes())?;
        sink.put(&content_path(INDEX_PAGE), render::index_document(&context).as_bytes())?;
        sink.put(&content_path(IMPRINT_PAGE), render::imprint_document(&self.imprint).as_bytes())?;

        let mut assembler = PackageAssembler::new();
        let mut registry = ArticleRegistry::new();
        let mut picture_sizes: HashMap<String, u64> = HashMap::new();
        let mut linked: HashSet<String> = HashSet::new();
        // page element id -> article record id
        let mut article_ids: HashMap<String, String> = HashMap::new();

        for index in 0..issue.page_count {
            let mut page: Page = self.fetcher.get_json(&paths::page(&compact, index)).await?;
            if page.index != index {
                tracing::debug!(expected = index, found = page.index, "page index corrected");
                page.index = index;
            }
            if page.title.is_empty() {
                page.title = issue.page_title(index).unwrap_or_default().to_string();
            }
            tracing::info!(page = index, title = %page.title, "processing page");

            let mut page_articles = Vec::new();
            for element in page.article_elements() {
                let article_id = match article_ids.get(&element.id) {
                    Some(id) => {
                        tracing::debug!(article = %id, page = index, "article already rendered");
                        id.clone()
                    }
                    None => {
                        let article = self
                            .fetch_article(&context, index, &element.id, &mut picture_sizes, sink, &mut report)
                            .await?;
                        let id = article.id.clone();
                        article_ids.insert(element.id.clone(), id.clone());
                        registry.insert(article);
                        id
                    }
                };
                page_articles.push(article_id);
            }

            let entries: Vec<&Article> = page_articles.iter().filter_map(|id| registry.get(id)).collect();
            let sequence = resolve(entries);
            if sequence.is_unresolved() {
                report.unresolved_pages += 1;
                tracing::warn!(page = index, articles = sequence.slots(), "no reading order found");
            } else if sequence.unfilled() > 0 {
                tracing::debug!(page = index, unreached = sequence.unfilled(), "reading order incomplete");
            }
            linked.extend(sequence.iter().map(str::to_string));

            let document = render::page_document(&context, &page, &sequence, &registry);
            sink.put(&content_path(&page_href(index)), document.as_bytes())?;
            assembler.add_page(&page, &sequence, &registry)?;
        }

        let package = assembler.finish(report.has_cover_image)?;
        let modified = modified_timestamp(self.modified.unwrap_or_else(OffsetDateTime::now_utc))?;
        sink.put(&content_path(OPF_FILE), render::content_opf(&context, &package, &modified).as_bytes())?;
        sink.put(&content_path(NCX_FILE), render::ncx_document(&context, &package).as_bytes())?;
        sink.put(&content_path(NAVIGATION_PAGE), render::nav_document(&context, &package).as_bytes())?;

        report.articles_rendered = registry.len();
        report.articles_linked = linked.len();
        Ok(report)
    }

    /// Fetches, prepares and renders one article together with its pictures.
    async fn fetch_article<S: Sink>(
        &self,
        context: &IssueContext<'_>,
        page_index: usize,
        element_id: &str,
        picture_sizes: &mut HashMap<String, u64>,
        sink: &mut S,
        report: &mut ConversionReport,
    ) -> Result<Article> {
        let date = context.date.compact();
        let mut article: Article = self.fetcher.get_json(&paths::article(&date, page_index, element_id)).await?;
        if article.id.is_empty() {
            article.id = element_id.to_string();
        }
        article.prepare();
        tracing::debug!(article = %article.id, title = %article.display_title(), "article fetched");

        for picture in &mut article.pictures {
            if let Some(&size) = picture_sizes.get(&picture.id) {
                picture.size = size;
                continue;
            }
            let bytes = self.fetcher.get_bytes(&paths::picture(&date, page_index, &picture.id)).await?;
            picture.size = bytes.len() as u64;
            if bytes.is_empty() {
                report.missing_pictures += 1;
                tracing::warn!(article = %article.id, picture = %picture.id, "picture unavailable");
            } else {
                sink.put(&content_path(&picture_href(&picture.id)), &bytes)?;
            }
            picture_sizes.insert(picture.id.clone(), picture.size);
        }

        let document = render::article_document(context, &article);
        sink.put(&content_path(&article_href(&article.id)), document.as_bytes())?;
        Ok(article)
    }

    /// Converts the issue for `date` into `<edition>-<YYYY-MM-DD>.epub` inside
    /// `output_dir`. A partially written file is removed on failure.
    pub async fn convert_to_file(&self, date: &str, output_dir: &Path) -> Result<(PathBuf, ConversionReport)> {
        let issue = self.fetch_issue(date).await?;
        let path = output_dir.join(output_file_name(&issue.paper, issue.issue_date()?));

        let result = async {
            let mut sink = ZipSink::new(File::create(&path)?)?;
            let report = self.build(&issue, &mut sink).await?;
            sink.finish()?;
            Ok::<_, EpaperError>(report)
        }
        .await;

        match result {
            Ok(report) => {
                tracing::info!(path = %path.display(), "package written");
                Ok((path, report))
            }
            Err(err) => {
                if let Err(cleanup) = fs::remove_file(&path) {
                    tracing::debug!(path = %path.display(), error = %cleanup, "could not remove partial package");
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::MemorySink;
    use serde::de::DeserializeOwned;
    use serde_json::{Value, json};

    /// Serves JSON records and image bytes from maps.
    #[derive(Default)]
    struct MapFetcher {
        json: HashMap<String, Value>,
        bytes: HashMap<String, Vec<u8>>,
    }

    impl Fetcher for MapFetcher {
        async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
            let value = self.json.get(path).cloned().ok_or_else(|| EpaperError::MissingResource(path.to_string()))?;
            serde_json::from_value(value).map_err(|source| EpaperError::Decode { resource: path.to_string(), source })
        }

        async fn get_bytes(&self, path: &str) -> Result<Vec<u8>> {
            Ok(self.bytes.get(path).cloned().unwrap_or_default())
        }
    }

    fn block_on<T>(future: impl std::future::Future<Output = T>) -> T {
        tokio::runtime::Runtime::new().unwrap().block_on(future)
    }

    fn link(id: &str, page: usize) -> Value {
        json!({"id": id, "paper": {"page": {"index": page}}})
    }

    fn fetcher() -> MapFetcher {
        let mut fetcher = MapFetcher::default();
        fetcher.json.insert(
            "latest".to_string(),
            json!({"paper": "az-d", "title": "Dürener Zeitung", "date": 20200821, "numberOfPages": 1,
                   "pageTitles": ["TITELSEITE"], "subscription": true, "bought": false}),
        );
        fetcher.json.insert(
            "20200821/0".to_string(),
            json!({"id": "p0", "title": "TITELSEITE", "number": 1, "index": 0, "elements": [
                {"id": "a", "type": "article"}, {"id": "ad", "type": "advertisement"}, {"id": "b", "type": "article"}
            ]}),
        );
        fetcher.json.insert(
            "20200821/0/a".to_string(),
            json!({"id": "a", "title": "Aufmacher", "text": "<p>Text</p>", "prev": link("", 0), "next": link("b", 0),
                   "pictures": [{"id": "img1", "width": 600, "height": 429}, {"id": "img2", "width": 10, "height": 10}],
                   "paper": {"paper": "az-d", "date": "20200821", "page": {"index": 0, "number": 1}}}),
        );
        fetcher.json.insert(
            "20200821/0/b".to_string(),
            json!({"id": "b", "title": null, "text": "<p>Kurzer Text</p>", "prev": link("a", 0), "next": link("", 0),
                   "paper": {"page": {"index": 0, "number": 1}}}),
        );
        fetcher.bytes.insert("20200821/0/img1/jpg".to_string(), vec![0xff, 0xd8]);
        fetcher
    }

    fn fixed_time() -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(1_598_011_387).unwrap()
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name("az-d", IssueDate::from_number(20200821).unwrap()), "az-d-2020-08-21.epub");
    }

    #[test]
    fn test_build_single_page() {
        let converter = Converter::new(fetcher(), EpaperConfig::default(), "<p>Impressum</p>").modified_at(fixed_time());
        let mut sink = MemorySink::new();
        let report = block_on(async {
            let issue = converter.fetch_issue("latest").await?;
            converter.build(&issue, &mut sink).await
        })
        .unwrap();

        assert_eq!(report.pages, 1);
        assert_eq!(report.articles_rendered, 2);
        assert_eq!(report.articles_linked, 2);
        assert_eq!(report.missing_pictures, 1);
        assert!(!report.has_cover_image);

        assert_eq!(sink.paths().first().map(String::as_str), Some("META-INF/container.xml"));
        assert!(sink.contains("OEBPS/images/img1.jpg"));
        assert!(!sink.contains("OEBPS/images/img2.jpg"));
        assert!(!sink.contains("OEBPS/images/title.jpg"));
        assert!(sink.contains("OEBPS/article_b.xhtml"));

        let opf = sink.text("OEBPS/content.opf").unwrap();
        assert!(opf.contains("image_img1"));
        assert!(!opf.contains("image_img2"));
        assert!(opf.contains("2020-08-21T12:03:07Z"));

        let page = sink.text("OEBPS/seite_0.xhtml").unwrap();
        assert!(page.find("article_a.xhtml").unwrap() < page.find("article_b.xhtml").unwrap());
        assert!(page.contains("Kurzer Text"));
    }

    #[test]
    fn test_article_keyed_by_record_id() {
        let mut fetcher = fetcher();
        let record = fetcher.json.remove("20200821/0/b").unwrap();
        fetcher.json.insert("20200821/0/el-b".to_string(), record);
        fetcher.json.insert(
            "20200821/0".to_string(),
            json!({"id": "p0", "title": "TITELSEITE", "index": 0, "elements": [
                {"id": "a", "type": "article"}, {"id": "el-b", "type": "article"}
            ]}),
        );
        let converter = Converter::new(fetcher, EpaperConfig::default(), "");
        let mut sink = MemorySink::new();
        let report = block_on(async {
            let issue = converter.fetch_issue("latest").await?;
            converter.build(&issue, &mut sink).await
        })
        .unwrap();

        assert_eq!(report.articles_rendered, 2);
        assert_eq!(report.articles_linked, 2);
        assert!(sink.contains("OEBPS/article_b.xhtml"));
        assert!(!sink.contains("OEBPS/article_el-b.xhtml"));
        assert!(sink.text("OEBPS/seite_0.xhtml").unwrap().contains("article_b.xhtml"));
    }

    #[test]
    fn test_not_entitled() {
        let mut fetcher = fetcher();
        fetcher.json.insert(
            "latest".to_string(),
            json!({"title": "Dürener Zeitung", "date": 20200821, "numberOfPages": 0, "pageTitles": []}),
        );
        let converter = Converter::new(fetcher, EpaperConfig::default(), "");
        let result = block_on(converter.fetch_issue("latest"));

        assert!(matches!(result, Err(EpaperError::NotEntitled { title }) if title == "Dürener Zeitung"));
    }

    #[test]
    fn test_missing_article_is_fatal() {
        let mut fetcher = fetcher();
        fetcher.json.remove("20200821/0/b");
        let converter = Converter::new(fetcher, EpaperConfig::default(), "");
        let mut sink = MemorySink::new();
        let result = block_on(async {
            let issue = converter.fetch_issue("latest").await?;
            converter.build(&issue, &mut sink).await
        });

        assert!(matches!(result, Err(EpaperError::MissingResource(path)) if path == "20200821/0/b"));
    }
}
