use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use qrcode::QrCode;
use qrcode::render::svg;

use crate::error::{LabelError, Result};

pub const DEFAULT_URL_PREFIX: &str = "https://wiki.thu-skyworks.org/";

// Unreserved characters plus '/', which stays literal so wiki paths survive.
const PATH_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

/// How a record's payload field becomes the string inside the QR code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QrPayload {
    /// Prepended after escaping; `None` encodes the payload as-is.
    pub prefix: Option<String>,
    pub escape: bool,
}

impl Default for QrPayload {
    fn default() -> Self {
        QrPayload {
            prefix: Some(DEFAULT_URL_PREFIX.to_string()),
            escape: true,
        }
    }
}

impl QrPayload {
    pub fn encode(&self, content: &str) -> String {
        let body = if self.escape {
            utf8_percent_encode(content, PATH_SAFE).to_string()
        } else {
            content.to_string()
        };
        match &self.prefix {
            Some(prefix) => format!("{prefix}{body}"),
            None => body,
        }
    }
}

/// Encode `data` as a standalone SVG document made of dark modules on white.
pub fn qr_svg(data: &str) -> Result<String> {
    let code = QrCode::new(data.as_bytes()).map_err(|e| LabelError::Qr {
        payload: data.to_string(),
        reason: e.to_string(),
    })?;
    Ok(code
        .render::<svg::Color<'_>>()
        .quiet_zone(true)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .build())
}
