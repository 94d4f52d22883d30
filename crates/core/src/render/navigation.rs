//! Navigation documents: the EPUB 2 `toc.ncx` and the EPUB 3 nav document.
//!
//! Both are rendered from the same [`NavPoint`] tree, so labels, targets and
//! nesting always agree. Position markers are taken from the tree as-is.

use super::{IssueContext, XHTML_PROLOG, escape_xml};
use crate::package::{NavPoint, Package};

/// `toc.ncx`
pub fn ncx_document(context: &IssueContext<'_>, package: &Package) -> String {
    let book_title = escape_xml(&context.book_title());
    let depth = if package.navigation.iter().any(|point| !point.children.is_empty()) { 2 } else { 1 };
    let mut ncx = String::new();

    ncx.push_str(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head>
"#,
    );
    ncx.push_str(&format!("    <meta name=\"dtb:uid\" content=\"{}\"/>\n", book_title));
    ncx.push_str(&format!("    <meta name=\"dtb:depth\" content=\"{}\"/>\n", depth));
    ncx.push_str("    <meta name=\"dtb:totalPageCount\" content=\"0\"/>\n");
    ncx.push_str("    <meta name=\"dtb:maxPageNumber\" content=\"0\"/>\n");
    ncx.push_str("  </head>\n");
    ncx.push_str(&format!("  <docTitle>\n    <text>{}</text>\n  </docTitle>\n", book_title));
    ncx.push_str("  <navMap>\n");
    write_nav_points(&mut ncx, &package.navigation, 2);
    ncx.push_str("  </navMap>\n</ncx>\n");
    ncx
}

fn write_nav_points(ncx: &mut String, points: &[NavPoint], indent: usize) {
    let pad = "  ".repeat(indent);
    for point in points {
        ncx.push_str(&format!(
            "{}<navPoint id=\"{}\" playOrder=\"{}\">\n",
            pad,
            escape_xml(&point.id),
            point.play_order
        ));
        ncx.push_str(&format!("{}  <navLabel><text>{}</text></navLabel>\n", pad, escape_xml(&point.label)));
        ncx.push_str(&format!("{}  <content src=\"{}\"/>\n", pad, escape_xml(&point.src)));
        write_nav_points(ncx, &point.children, indent + 1);
        ncx.push_str(&format!("{}</navPoint>\n", pad));
    }
}

/// `navigation.xhtml`
pub fn nav_document(context: &IssueContext<'_>, package: &Package) -> String {
    let book_title = escape_xml(&context.book_title());
    let mut nav = String::new();

    nav.push_str(XHTML_PROLOG);
    nav.push_str(
        r#"<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops" xml:lang="de" lang="de">
<head>
"#,
    );
    nav.push_str(&format!("  <title>{}</title>\n", book_title));
    nav.push_str("</head>\n<body>\n<nav epub:type=\"toc\" id=\"toc\">\n");
    nav.push_str(&format!("  <h1>{}</h1>\n", book_title));
    write_list(&mut nav, &package.navigation, 1);
    nav.push_str("</nav>\n</body>\n</html>\n");
    nav
}

fn write_list(nav: &mut String, points: &[NavPoint], indent: usize) {
    let pad = "  ".repeat(indent);
    nav.push_str(&format!("{}<ol>\n", pad));
    for point in points {
        let link = format!("<a href=\"{}\">{}</a>", escape_xml(&point.src), escape_xml(&point.label));
        if point.children.is_empty() {
            nav.push_str(&format!("{}  <li>{}</li>\n", pad, link));
        } else {
            nav.push_str(&format!("{}  <li>{}\n", pad, link));
            write_list(nav, &point.children, indent + 2);
            nav.push_str(&format!("{}  </li>\n", pad));
        }
    }
    nav.push_str(&format!("{}</ol>\n", pad));
}
