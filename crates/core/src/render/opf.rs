use super::{IssueContext, escape_xml};
use crate::package::{INDEX_PAGE, Package, TITLE_PAGE};

const CREATOR: &str = "ZVA Digital GmbH";
const PUBLISHER: &str = "Zeitungsverlag Aachen GmbH";

/// Package document (`content.opf`) for EPUB 3.
///
/// `modified` is the RFC 3339 timestamp for `dcterms:modified`.
pub fn content_opf(context: &IssueContext<'_>, package: &Package, modified: &str) -> String {
    let book_title = escape_xml(&context.book_title());
    let mut opf = String::new();

    opf.push_str(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="BookId">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:opf="http://www.idpf.org/2007/opf">
"#,
    );
    opf.push_str(&format!("    <dc:identifier id=\"BookId\">{}</dc:identifier>\n", book_title));
    opf.push_str(&format!("    <dc:title>{}</dc:title>\n", book_title));
    opf.push_str(&format!("    <dc:creator id=\"author\">{}</dc:creator>\n", CREATOR));
    opf.push_str(&format!("    <dc:publisher>{}</dc:publisher>\n", PUBLISHER));
    opf.push_str(&format!("    <dc:date>{}</dc:date>\n", context.date.iso()));
    opf.push_str("    <dc:language>de</dc:language>\n");
    if package.has_cover_image {
        opf.push_str("    <meta name=\"cover\" content=\"titleImage\"/>\n");
    }
    opf.push_str(&format!("    <meta property=\"dcterms:modified\">{}</meta>\n", escape_xml(modified)));
    opf.push_str("  </metadata>\n");

    opf.push_str("  <manifest>\n");
    for item in &package.manifest {
        opf.push_str(&format!(
            "    <item id=\"{}\" href=\"{}\" media-type=\"{}\"",
            escape_xml(&item.id),
            escape_xml(&item.href),
            item.media_type
        ));
        if let Some(properties) = item.properties {
            opf.push_str(&format!(" properties=\"{}\"", properties));
        }
        opf.push_str("/>\n");
    }
    opf.push_str("  </manifest>\n");

    opf.push_str("  <spine toc=\"ncx\">\n");
    for idref in &package.spine {
        opf.push_str(&format!("    <itemref idref=\"{}\"/>\n", escape_xml(idref)));
    }
    opf.push_str("  </spine>\n");

    opf.push_str("  <guide>\n");
    opf.push_str(&format!("    <reference type=\"cover\" title=\"Cover\" href=\"{}\"/>\n", TITLE_PAGE));
    opf.push_str(&format!("    <reference type=\"toc\" title=\"Inhaltsverzeichnis\" href=\"{}\"/>\n", INDEX_PAGE));
    opf.push_str("  </guide>\n");
    opf.push_str("</package>\n");
    opf
}
