//! Content-based format detection and text decoding

use std::borrow::Cow;
use std::fmt;

use encoding_rs::{Encoding, WINDOWS_1252};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CampaignError, Result};

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const CFB_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
const ODS_MIMETYPE: &[u8] = b"application/vnd.oasis.opendocument.spreadsheet";

/// Bytes inspected when deciding whether decoded text is binary
const TEXT_SAMPLE_CHARS: usize = 4096;

/// Container formats the analyzer understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileFormat {
    /// Comma, semicolon or tab separated text
    DelimitedText,
    /// Office Open XML workbook
    Xlsx,
    /// Legacy binary Excel workbook
    Xls,
    /// OpenDocument spreadsheet
    Ods,
}

impl FileFormat {
    /// Guess from a file extension, for callers that want to declare one
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "csv" | "tsv" | "txt" => Some(FileFormat::DelimitedText),
            "xlsx" | "xlsm" => Some(FileFormat::Xlsx),
            "xls" => Some(FileFormat::Xls),
            "ods" => Some(FileFormat::Ods),
            _ => None,
        }
    }

    pub fn is_spreadsheet(&self) -> bool {
        !matches!(self, FileFormat::DelimitedText)
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileFormat::DelimitedText => "delimited text",
            FileFormat::Xlsx => "xlsx",
            FileFormat::Xls => "xls",
            FileFormat::Ods => "ods",
        };
        f.write_str(name)
    }
}

/// Detect the container format from the leading bytes
///
/// Content wins over the declared format; the declaration only settles
/// which zip-based workbook flavour to open.
pub fn sniff_format(bytes: &[u8], declared: Option<FileFormat>) -> Result<FileFormat> {
    let sniffed = if bytes.starts_with(ZIP_MAGIC) {
        if contains(&bytes[..bytes.len().min(256)], ODS_MIMETYPE) {
            FileFormat::Ods
        } else if declared == Some(FileFormat::Ods) {
            FileFormat::Ods
        } else {
            FileFormat::Xlsx
        }
    } else if bytes.starts_with(CFB_MAGIC) {
        FileFormat::Xls
    } else {
        decode_text(bytes)?;
        FileFormat::DelimitedText
    };

    if let Some(declared) = declared {
        if declared != sniffed {
            debug!("Declared format {} but content looks like {}", declared, sniffed);
        }
    }
    Ok(sniffed)
}

/// Decode delimited text, falling back to Windows-1252 for non UTF-8 input
///
/// # Errors
///
/// [`CampaignError::UnsupportedFormat`] when the decoded content looks binary.
pub fn decode_text(bytes: &[u8]) -> Result<Cow<'_, str>> {
    let text = if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        text
    } else {
        match std::str::from_utf8(bytes) {
            Ok(text) => Cow::Borrowed(text),
            Err(_) => {
                debug!("Upload is not valid UTF-8, decoding as Windows-1252");
                let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
                text
            }
        }
    };

    if looks_binary(&text) {
        return Err(CampaignError::unsupported_format(
            "content is neither delimited text nor a known spreadsheet",
        ));
    }
    Ok(text)
}

fn looks_binary(text: &str) -> bool {
    let mut total = 0usize;
    let mut control = 0usize;
    for ch in text.chars().take(TEXT_SAMPLE_CHARS) {
        total += 1;
        if ch == '\0' {
            return true;
        }
        if ch.is_control() && !matches!(ch, '\t' | '\n' | '\r' | '\u{0c}') {
            control += 1;
        }
    }
    total > 0 && control * 100 > total
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}
