//! Library API integration tests
use std::io::{Cursor, Read};
use std::path::PathBuf;

use epaper_core::*;
use serde::de::DeserializeOwned;

fn get_fixture_path(name: &str) -> PathBuf {
    PathBuf::from(format!("../../tests/fixtures/epaper/{}", name))
}

/// Serves the e-paper API from the fixture directory.
///
/// JSON resources live in `<path>.json`, binary assets at `<path>`; a missing
/// asset reads as empty.
struct FixtureFetcher;

impl Fetcher for FixtureFetcher {
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let file = get_fixture_path(&format!("{}.json", path));
        let body = std::fs::read_to_string(&file).map_err(|_| EpaperError::MissingResource(path.to_string()))?;
        serde_json::from_str(&body).map_err(|source| EpaperError::Decode { resource: path.to_string(), source })
    }

    async fn get_bytes(&self, path: &str) -> Result<Vec<u8>> {
        Ok(std::fs::read(get_fixture_path(path)).unwrap_or_default())
    }
}

fn block_on<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::runtime::Runtime::new().unwrap().block_on(future)
}

fn imprint() -> String {
    let script = std::fs::read_to_string(get_fixture_path("app.js")).unwrap();
    SiteInfo::from_script(&script).imprint
}

fn converter() -> Converter<FixtureFetcher> {
    let modified = time::OffsetDateTime::from_unix_timestamp(1_598_011_387).unwrap();
    Converter::new(FixtureFetcher, EpaperConfig::default(), imprint()).modified_at(modified)
}

fn build_latest() -> (ConversionReport, MemorySink) {
    let converter = converter();
    let mut sink = MemorySink::new();
    let report = block_on(async {
        let issue = converter.fetch_issue("latest").await?;
        converter.build(&issue, &mut sink).await
    })
    .expect("conversion should succeed");
    (report, sink)
}

#[test]
fn test_site_info_from_script() {
    let script = std::fs::read_to_string(get_fixture_path("app.js")).unwrap();
    let info = SiteInfo::from_script(&script);

    assert_eq!(info.catalog.len(), 3);
    assert_eq!(info.catalog.resolve("Dürener Zeitung").unwrap().code, "az-d");
    assert!(info.imprint.starts_with("<p>Zeitungsverlag Aachen GmbH<br />"));
    assert!(info.imprint.contains("</p>\n<p>"));
}

#[test]
fn test_conversion_report() {
    let (report, _) = build_latest();

    assert_eq!(
        report,
        ConversionReport {
            pages: 2,
            articles_rendered: 5,
            articles_linked: 4,
            unresolved_pages: 0,
            missing_pictures: 1,
            has_cover_image: true,
        }
    );
}

#[test]
fn test_archive_entries() {
    let (_, sink) = build_latest();

    for path in [
        "META-INF/container.xml",
        "OEBPS/title.xhtml",
        "OEBPS/index.xhtml",
        "OEBPS/impressum.xhtml",
        "OEBPS/zva.epub.css",
        "OEBPS/images/title.jpg",
        "OEBPS/seite_0.xhtml",
        "OEBPS/seite_1.xhtml",
        "OEBPS/article_1001.xhtml",
        "OEBPS/article_1002.xhtml",
        "OEBPS/article_1003.xhtml",
        "OEBPS/article_2001.xhtml",
        "OEBPS/article_2002.xhtml",
        "OEBPS/images/pic-rathaus.jpg",
        "OEBPS/images/pic-wetter.jpg",
        "OEBPS/toc.ncx",
        "OEBPS/content.opf",
        "OEBPS/navigation.xhtml",
    ] {
        assert!(sink.contains(path), "missing {}", path);
    }
    assert!(!sink.contains("OEBPS/images/pic-fehlt.jpg"));
    assert_eq!(sink.len(), 18);
}

#[test]
fn test_reading_order_across_pages() {
    let (_, sink) = build_latest();
    let opf = sink.text("OEBPS/content.opf").unwrap();

    let spine: Vec<&str> = opf
        .lines()
        .filter_map(|line| line.trim().strip_prefix("<itemref idref=\""))
        .filter_map(|rest| rest.split('"').next())
        .collect();
    assert_eq!(
        spine,
        vec!["title", "index", "seite_0", "article_0_1001", "article_0_1002", "seite_1", "article_1_2001", "article_1_2002", "imprint"]
    );
}

#[test]
fn test_unreached_article_is_not_linked() {
    let (_, sink) = build_latest();
    let opf = sink.text("OEBPS/content.opf").unwrap();
    let ncx = sink.text("OEBPS/toc.ncx").unwrap();
    let page = sink.text("OEBPS/seite_0.xhtml").unwrap();

    assert!(!opf.contains("article_1003.xhtml"));
    assert!(!ncx.contains("article_1003.xhtml"));
    assert!(!page.contains("article_1003.xhtml"));
    assert!(sink.text("OEBPS/article_1003.xhtml").unwrap().contains("Kurz notiert"));
}

#[test]
fn test_missing_picture_is_degraded() {
    let (_, sink) = build_latest();
    let opf = sink.text("OEBPS/content.opf").unwrap();
    let article = sink.text("OEBPS/article_1002.xhtml").unwrap();

    assert!(opf.contains(r#"id="image_pic-rathaus""#));
    assert!(opf.contains(r#"id="image_pic-wetter""#));
    assert!(!opf.contains("pic-fehlt"));
    assert!(article.contains("Dieses Bild konnte nicht geladen werden"));
}

#[test]
fn test_derived_titles() {
    let (_, sink) = build_latest();
    let ncx = sink.text("OEBPS/toc.ncx").unwrap();

    assert!(ncx.contains("<text>Stadtrat beschließt Haushalt</text>"));
    assert!(ncx.contains("<text>Die Feuerwehr übt am Samstag an der…</text>"));
    assert!(ncx.contains("<text>Wetter</text>"));
}

#[test]
fn test_article_body_is_sanitized() {
    let (_, sink) = build_latest();
    let article = sink.text("OEBPS/article_1001.xhtml").unwrap();

    assert!(article.contains(
        r#"<p>Der Stadtrat hat am Donnerstag den Haushalt beschlossen.<br /> <b class="ortsmarke">(Düren)</b></p>"#
    ));
    assert!(!article.contains("target="));
    assert!(article.contains("<p>Mehrheit für den Etat 2021</p>"));
    assert!(article.contains("Von Anna Beispiel"));
}

#[test]
fn test_navigation_positions_are_contiguous() {
    let (_, sink) = build_latest();
    let ncx = sink.text("OEBPS/toc.ncx").unwrap();

    let orders: Vec<u32> = ncx
        .split("playOrder=\"")
        .skip(1)
        .filter_map(|rest| rest.split('"').next())
        .map(|n| n.parse().unwrap())
        .collect();
    assert_eq!(orders, (1..=9).collect::<Vec<u32>>());
}

#[test]
fn test_package_documents_use_issue_metadata() {
    let (_, sink) = build_latest();
    let opf = sink.text("OEBPS/content.opf").unwrap();
    let nav = sink.text("OEBPS/navigation.xhtml").unwrap();
    let imprint = sink.text("OEBPS/impressum.xhtml").unwrap();

    assert!(opf.contains("<dc:title>Dürener Zeitung - 21. Aug. 2020</dc:title>"));
    assert!(opf.contains("2020-08-21T12:03:07Z"));
    assert!(opf.contains(r#"<meta name="cover" content="titleImage"/>"#));
    assert!(nav.contains(r#"<a href="seite_1.xhtml">LOKALES</a>"#));
    assert!(imprint.contains("Dresdener Straße 3"));
}

#[test]
fn test_inconsistent_issue_is_fatal() {
    let result = block_on(converter().fetch_issue("20200821"));
    assert!(matches!(result, Err(EpaperError::InconsistentIssue { .. })));
}

#[test]
fn test_missing_issue_is_fatal() {
    let result = block_on(converter().fetch_issue("19990101"));
    assert!(matches!(result, Err(EpaperError::MissingResource(_))));
}

#[test]
fn test_convert_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let (path, report) = block_on(converter().convert_to_file("latest", dir.path())).unwrap();

    assert_eq!(path.file_name().unwrap(), "az-d-2020-08-21.epub");
    assert_eq!(report.articles_rendered, 5);

    let bytes = std::fs::read(&path).unwrap();
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    assert_eq!(archive.len(), 19);

    let mut mimetype = archive.by_index(0).unwrap();
    assert_eq!(mimetype.name(), "mimetype");
    let mut content = String::new();
    mimetype.read_to_string(&mut content).unwrap();
    assert_eq!(content, "application/epub+zip");
}

#[test]
fn test_failed_conversion_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = block_on(converter().convert_to_file("20200821", dir.path()));

    assert!(result.is_err());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_article_records_built_outside_the_crate() {
    let mut article = Article {
        id: "a1".to_string(),
        text: "<p><b class=\"ortsmarke\">Jülich</b> Der Kreistag hat entschieden.</p>".to_string(),
        ..Default::default()
    };
    article.prepare();
    assert_eq!(article.display_title(), "Der Kreistag hat entschieden.");

    let titled = Article { id: "a2".to_string(), display_title: "Wetter".to_string(), ..Default::default() };
    assert_eq!(titled.display_title, "Wetter");
}
