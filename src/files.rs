//! Plain-text extraction from uploaded documents (.txt, .docx, .pdf).

use crate::error::{RecapError, Result};
use regex::Regex;
use std::io::{Cursor, Read};
use std::path::Path;
use std::process::Stdio;
use std::sync::OnceLock;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, instrument, warn};

/// Document kinds we can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Text,
    Docx,
    Pdf,
}

impl DocumentKind {
    /// Detect the kind from a file name's extension.
    pub fn from_file_name(file_name: &str) -> Result<Self> {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "txt" => Ok(DocumentKind::Text),
            "docx" => Ok(DocumentKind::Docx),
            "pdf" => Ok(DocumentKind::Pdf),
            _ => Err(RecapError::UnsupportedFileFormat(if ext.is_empty() {
                file_name.to_string()
            } else {
                format!(".{}", ext)
            })),
        }
    }

    /// MIME types accepted for upload.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "text/plain" => Some(DocumentKind::Text),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                Some(DocumentKind::Docx)
            }
            "application/pdf" => Some(DocumentKind::Pdf),
            _ => None,
        }
    }
}

/// Extract the text of an uploaded file, dispatching on its extension.
#[instrument(skip(bytes), fields(size = bytes.len()))]
pub async fn extract_text_from_file(file_name: &str, bytes: &[u8]) -> Result<String> {
    let text = match DocumentKind::from_file_name(file_name)? {
        DocumentKind::Text => String::from_utf8_lossy(bytes).into_owned(),
        DocumentKind::Docx => extract_docx(bytes)?,
        DocumentKind::Pdf => extract_pdf(bytes).await?,
    };

    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(RecapError::InvalidInput(
            "Could not extract text from the file.".into(),
        ));
    }
    debug!(chars = text.len(), "Extracted text");
    Ok(text)
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("valid regex"))
}

/// Line breaks (`<w:br/>`, `<w:br w:type="page"/>`) and carriage returns (`<w:cr/>`).
fn break_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<w:(?:br|cr)\b[^>]*/>").expect("valid regex"))
}

fn entity_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|lt|gt|quot|apos|amp);").expect("valid regex")
    })
}

/// Read `word/document.xml` out of the archive and flatten it to text.
fn extract_docx(bytes: &[u8]) -> Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(docx_error)?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(docx_error)?
        .read_to_string(&mut xml)
        .map_err(docx_error)?;

    Ok(docx_xml_to_text(&xml))
}

fn docx_error(e: impl std::fmt::Display) -> RecapError {
    warn!("Failed to read docx: {}", e);
    RecapError::InvalidInput("Failed to extract text from DOCX.".into())
}

fn docx_xml_to_text(xml: &str) -> String {
    let marked = xml.replace("</w:p>", "\n").replace("<w:tab/>", "\t");
    let marked = break_regex().replace_all(&marked, "\n");
    let stripped = tag_regex().replace_all(&marked, "");

    entity_regex()
        .replace_all(&stripped, |caps: &regex::Captures| decode_entity(&caps[0], &caps[1]))
        .into_owned()
}

/// Decode one XML entity; malformed or out-of-range references are kept verbatim.
fn decode_entity(raw: &str, name: &str) -> String {
    let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(dec) = name.strip_prefix('#') {
        dec.parse().ok()
    } else {
        return match name {
            "lt" => "<",
            "gt" => ">",
            "quot" => "\"",
            "apos" => "'",
            _ => "&",
        }
        .to_string();
    };

    code.and_then(char::from_u32)
        .map(String::from)
        .unwrap_or_else(|| raw.to_string())
}

/// Run `pdftotext` over the document, feeding it through stdin.
async fn extract_pdf(bytes: &[u8]) -> Result<String> {
    let spawned = Command::new("pdftotext")
        .arg("-layout")
        .arg("-")
        .arg("-")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn();

    let mut child = match spawned {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(RecapError::ToolNotFound("pdftotext".into()));
        }
        Err(e) => return Err(RecapError::ToolFailed(format!("pdftotext: {e}"))),
    };

    if let Some(mut stdin) = child.stdin.take() {
        let input = bytes.to_vec();
        tokio::spawn(async move {
            if let Err(e) = stdin.write_all(&input).await {
                debug!("pdftotext closed stdin early: {}", e);
            }
        });
    }

    let output = child.wait_with_output().await?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!("pdftotext failed: {}", stderr.trim());
        return Err(RecapError::InvalidInput(
            "Failed to extract text from PDF.".into(),
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn docx_bytes(document_xml: &str) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buf);
            let options = zip::write::SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Deflated);
            writer.start_file("word/document.xml", options).unwrap();
            writer.write_all(document_xml.as_bytes()).unwrap();
            writer.finish().unwrap();
        }
        buf.into_inner()
    }

    #[test]
    fn test_kind_detection() {
        assert_eq!(DocumentKind::from_file_name("notes.TXT").unwrap(), DocumentKind::Text);
        assert_eq!(DocumentKind::from_file_name("a.b.docx").unwrap(), DocumentKind::Docx);
        assert_eq!(DocumentKind::from_file_name("paper.pdf").unwrap(), DocumentKind::Pdf);
        assert!(matches!(
            DocumentKind::from_file_name("slides.pptx"),
            Err(RecapError::UnsupportedFileFormat(ext)) if ext == ".pptx"
        ));
        assert!(DocumentKind::from_file_name("README").is_err());
        assert_eq!(DocumentKind::from_mime("application/pdf"), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_mime("image/png"), None);
    }

    #[tokio::test]
    async fn test_txt_extraction() {
        let text = extract_text_from_file("a.txt", b"  hello world \n").await.unwrap();
        assert_eq!(text, "hello world");

        let err = extract_text_from_file("a.txt", b"   \n").await.unwrap_err();
        assert_eq!(err.to_string(), "Could not extract text from the file.");
    }

    #[tokio::test]
    async fn test_docx_extraction() {
        let xml = r#"<?xml version="1.0"?><w:document><w:body><w:p><w:r><w:t>Fish &amp; chips</w:t></w:r></w:p><w:p><w:r><w:t>Second</w:t><w:tab/><w:t>para</w:t></w:r></w:p></w:body></w:document>"#;
        let text = extract_text_from_file("doc.docx", &docx_bytes(xml)).await.unwrap();
        assert_eq!(text, "Fish & chips\nSecond\tpara");
    }

    #[tokio::test]
    async fn test_docx_breaks_and_character_references() {
        let xml = r#"<w:document><w:body><w:p><w:r><w:t>It&#8217;s&#xA0;here</w:t><w:br w:type="page"/><w:t>Next</w:t><w:cr/><w:t>&amp;lt; &#99999999;</w:t></w:r></w:p></w:body></w:document>"#;
        let text = extract_text_from_file("doc.docx", &docx_bytes(xml)).await.unwrap();
        assert_eq!(text, "It\u{2019}s\u{a0}here\nNext\n&lt; &#99999999;");
    }

    #[tokio::test]
    async fn test_corrupt_docx() {
        let err = extract_text_from_file("doc.docx", b"not a zip").await.unwrap_err();
        assert!(matches!(err, RecapError::InvalidInput(_)));
    }
}
