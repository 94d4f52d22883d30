//! Files that are the same in every package.

/// `META-INF/container.xml`, pointing at the package document.
pub const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#;

/// Stylesheet shared by all content documents.
pub const STYLESHEET_CSS: &str = include_str!("../../assets/zva.epub.css");
