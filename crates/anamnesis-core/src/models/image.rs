use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// An image attached to a session, kept as an opaque base64 blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EncodedImage {
    pub encoding: ImageEncoding,
    /// Standard base64, no `data:` URL prefix.
    pub data: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ImageEncoding {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageEncoding {
    pub fn media_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
        }
    }
}
