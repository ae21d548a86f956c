//! DOCX text extraction
//!
//! A .docx is a ZIP archive whose visible text lives in
//! `word/document.xml` as WordprocessingML. Extraction reads that entry and
//! reduces it to plain text: `<w:t>` runs carry text, paragraph ends become
//! newlines, `<w:tab/>` and `<w:br/>` become tab and newline. Legacy binary
//! .doc files are not ZIP archives and fail here with `ParseFailed`.

use std::io::{Cursor, Read};

use super::IngestError;

/// Extract plain text from DOCX bytes
pub fn extract(bytes: &[u8]) -> Result<String, IngestError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| IngestError::ParseFailed(format!("not a valid .docx archive: {}", e)))?;

    let mut entry = archive
        .by_name("word/document.xml")
        .map_err(|e| IngestError::ParseFailed(format!("missing word/document.xml: {}", e)))?;

    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|e| IngestError::ParseFailed(format!("unreadable document.xml: {}", e)))?;

    Ok(document_xml_to_text(&xml))
}

/// Reduce WordprocessingML to plain text.
///
/// Only character data inside `<w:t>` runs is visible document text; all
/// other element content (properties, instructions) is skipped.
fn document_xml_to_text(xml: &str) -> String {
    let mut out = String::new();
    let mut chars = xml.chars().peekable();
    let mut in_text_run = false;

    while let Some(c) = chars.next() {
        match c {
            '<' => {
                let mut tag = String::new();
                for t in chars.by_ref() {
                    if t == '>' {
                        break;
                    }
                    tag.push(t);
                }

                let closing = tag.starts_with('/');
                let self_closing = tag.ends_with('/');
                let name = tag
                    .trim_start_matches('/')
                    .split(|ch: char| ch.is_whitespace() || ch == '/')
                    .next()
                    .unwrap_or("");

                match (closing, name) {
                    (true, "w:t") => in_text_run = false,
                    (true, "w:p") => out.push('\n'),
                    (false, "w:t") if !self_closing => in_text_run = true,
                    (false, "w:tab") => out.push('\t'),
                    (false, "w:br") | (false, "w:cr") => out.push('\n'),
                    _ => {}
                }
            }
            '&' if in_text_run => {
                let mut entity = String::new();
                let mut terminated = false;
                while let Some(&next) = chars.peek() {
                    chars.next();
                    if next == ';' {
                        terminated = true;
                        break;
                    }
                    entity.push(next);
                    // entities are short; bail on runaway input
                    if entity.len() > 10 {
                        break;
                    }
                }
                match decode_entity(&entity) {
                    Some(decoded) if terminated => out.push_str(&decoded),
                    // not an entity: keep the consumed bytes exactly as read
                    _ => {
                        out.push('&');
                        out.push_str(&entity);
                        if terminated {
                            out.push(';');
                        }
                    }
                }
            }
            _ if in_text_run => out.push(c),
            _ => {}
        }
    }

    out
}

/// Decode an XML character entity (without the `&`/`;` delimiters).
/// None means the name is not a recognized entity.
fn decode_entity(entity: &str) -> Option<String> {
    match entity {
        "amp" => Some("&".to_string()),
        "lt" => Some("<".to_string()),
        "gt" => Some(">".to_string()),
        "quot" => Some("\"".to_string()),
        "apos" => Some("'".to_string()),
        _ => {
            if let Some(num) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
                if let Ok(code) = u32::from_str_radix(num, 16) {
                    if let Some(ch) = char::from_u32(code) {
                        return Some(ch.to_string());
                    }
                }
            } else if let Some(num) = entity.strip_prefix('#') {
                if let Ok(code) = num.parse::<u32>() {
                    if let Some(ch) = char::from_u32(code) {
                        return Some(ch.to_string());
                    }
                }
            }
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Build an in-memory .docx containing the given document.xml body
    pub(crate) fn build_docx(document_xml: &str) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buf);
            let options = zip::write::SimpleFileOptions::default();

            writer.start_file("word/document.xml", options).unwrap();
            writer.write_all(document_xml.as_bytes()).unwrap();
            writer.finish().unwrap();
        }
        buf.into_inner()
    }

    const SAMPLE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>第一段：项目简介</w:t></w:r></w:p>
    <w:p><w:r><w:t xml:space="preserve">带空格的 </w:t></w:r><w:r><w:t>第二段</w:t></w:r></w:p>
    <w:p><w:r><w:t>A &amp; B &lt;对比&gt;</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

    #[test]
    fn test_extract_paragraphs_and_runs() {
        let bytes = build_docx(SAMPLE_XML);
        let text = extract(&bytes).unwrap();

        assert!(text.contains("第一段：项目简介"));
        assert!(text.contains("带空格的 第二段"));
        // paragraphs separated by newlines
        let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_entities_decoded() {
        let bytes = build_docx(SAMPLE_XML);
        let text = extract(&bytes).unwrap();
        assert!(text.contains("A & B <对比>"));
    }

    #[test]
    fn test_bare_ampersand_kept_as_read() {
        // '&' followed by ordinary text is not an entity; the consumed
        // characters come back exactly as they appeared, with no terminator
        // invented for them
        let xml = r#"<w:document><w:body><w:p><w:r><w:t>M&M 巧克力豆真不错</w:t></w:r></w:p></w:body></w:document>"#;
        let text = document_xml_to_text(xml);
        assert_eq!(text, "M&M 巧克力豆真不错\n");
    }

    #[test]
    fn test_unknown_entity_kept_verbatim() {
        let xml = r#"<w:document><w:body><w:p><w:r><w:t>A &copy; B</w:t></w:r></w:p></w:body></w:document>"#;
        let text = document_xml_to_text(xml);
        assert_eq!(text, "A &copy; B\n");
    }

    #[test]
    fn test_numeric_entities_decoded() {
        let xml = r#"<w:document><w:body><w:p><w:r><w:t>&#20013;&#x6587;</w:t></w:r></w:p></w:body></w:document>"#;
        let text = document_xml_to_text(xml);
        assert_eq!(text, "中文\n");
    }

    #[test]
    fn test_tab_and_break_elements() {
        let xml = r#"<w:document><w:body><w:p><w:r><w:t>列1</w:t><w:tab/><w:t>列2</w:t><w:br/><w:t>下一行</w:t></w:r></w:p></w:body></w:document>"#;
        let text = document_xml_to_text(xml);
        assert_eq!(text, "列1\t列2\n下一行\n");
    }

    #[test]
    fn test_non_text_element_content_skipped() {
        let xml = r#"<w:document><w:body><w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>标题</w:t></w:r></w:p></w:body></w:document>"#;
        let text = document_xml_to_text(xml);
        assert_eq!(text.trim(), "标题");
    }

    #[test]
    fn test_whitespace_only_document_extracts_empty() {
        let xml = r#"<w:document><w:body><w:p><w:r><w:t>   </w:t></w:r></w:p></w:body></w:document>"#;
        let bytes = build_docx(xml);
        let text = extract(&bytes).unwrap();
        assert!(text.trim().is_empty());
    }

    #[test]
    fn test_not_a_zip_is_parse_failed() {
        let err = extract(b"definitely not a zip").unwrap_err();
        assert!(matches!(err, IngestError::ParseFailed(_)));
    }

    #[test]
    fn test_zip_without_document_xml_is_parse_failed() {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buf);
            let options = zip::write::SimpleFileOptions::default();
            writer.start_file("unrelated.txt", options).unwrap();
            writer.write_all(b"hi").unwrap();
            writer.finish().unwrap();
        }
        let err = extract(&buf.into_inner()).unwrap_err();
        assert!(matches!(err, IngestError::ParseFailed(_)));
    }
}
