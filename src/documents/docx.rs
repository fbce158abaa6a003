use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;

use super::ExtractError;

const DOCUMENT_PART: &str = "word/document.xml";
/// Ceiling on the inflated body part; the upload limit only bounds compressed bytes.
pub(super) const MAX_DOCUMENT_XML_BYTES: u64 = 16 * 1024 * 1024;

/// Raw text of a DOCX body with formatting stripped.
///
/// Runs of `w:t` are concatenated; `w:tab` becomes a tab, `w:br`/`w:cr` a line
/// break, and every closed paragraph ends with a newline.
pub(super) fn extract_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractError::Docx(format!("not a zip container: {e}")))?;

    let part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| ExtractError::Docx(format!("missing {DOCUMENT_PART}: {e}")))?;
    if part.size() > MAX_DOCUMENT_XML_BYTES {
        return Err(too_large());
    }

    // declared sizes can lie, so the read itself is capped too
    let mut xml = String::new();
    part.take(MAX_DOCUMENT_XML_BYTES + 1)
        .read_to_string(&mut xml)
        .map_err(|e| ExtractError::Docx(format!("read {DOCUMENT_PART}: {e}")))?;
    if xml.len() as u64 > MAX_DOCUMENT_XML_BYTES {
        return Err(too_large());
    }

    body_text(&xml)
}

fn too_large() -> ExtractError {
    ExtractError::Docx(format!(
        "document too large (over {} MiB uncompressed)",
        MAX_DOCUMENT_XML_BYTES / 1024 / 1024
    ))
}

fn body_text(xml: &str) -> Result<String, ExtractError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut out = String::new();
    let mut in_text = false;
    let mut run_depth: u32 = 0;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"t" => in_text = true,
                b"r" => run_depth += 1,
                b"tab" if run_depth > 0 => out.push('\t'),
                b"br" | b"cr" if run_depth > 0 => out.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"tab" if run_depth > 0 => out.push('\t'),
                b"br" | b"cr" if run_depth > 0 => out.push('\n'),
                _ => {}
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"r" => run_depth = run_depth.saturating_sub(1),
                b"p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Text(e)) if in_text => {
                let text = e
                    .unescape()
                    .map_err(|err| ExtractError::Docx(format!("bad text node: {err}")))?;
                out.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(ExtractError::Docx(format!(
                    "xml error at position {}: {e}",
                    reader.buffer_position()
                )))
            }
        }
    }

    Ok(out)
}
