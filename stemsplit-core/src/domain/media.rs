//! Recognized upload media kinds

use serde::{Deserialize, Serialize};

/// Audio and video containers accepted as separation input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MediaKind {
    Mpeg,
    Wav,
    Flac,
    Aac,
    Ogg,
    M4a,
    Mp4,
    Matroska,
    Avi,
    QuickTime,
}

impl MediaKind {
    pub const ALL: [MediaKind; 10] = [
        MediaKind::Mpeg,
        MediaKind::Wav,
        MediaKind::Flac,
        MediaKind::Aac,
        MediaKind::Ogg,
        MediaKind::M4a,
        MediaKind::Mp4,
        MediaKind::Matroska,
        MediaKind::Avi,
        MediaKind::QuickTime,
    ];

    /// Resolve a MIME type such as `audio/mpeg` or `audio/wav; codecs=1`
    ///
    /// Matching is case-insensitive and ignores parameters. Returns `None` for
    /// anything outside the recognized set.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        let kind = match essence.as_str() {
            "audio/mpeg" | "audio/mp3" => MediaKind::Mpeg,
            "audio/wav" | "audio/x-wav" | "audio/wave" => MediaKind::Wav,
            "audio/flac" | "audio/x-flac" => MediaKind::Flac,
            "audio/aac" => MediaKind::Aac,
            "audio/ogg" => MediaKind::Ogg,
            "audio/x-m4a" | "audio/mp4" => MediaKind::M4a,
            "video/mp4" => MediaKind::Mp4,
            "video/x-matroska" => MediaKind::Matroska,
            "video/avi" | "video/x-msvideo" => MediaKind::Avi,
            "video/quicktime" => MediaKind::QuickTime,
            _ => return None,
        };

        Some(kind)
    }

    /// Canonical MIME type for this kind
    pub fn mime(self) -> &'static str {
        match self {
            MediaKind::Mpeg => "audio/mpeg",
            MediaKind::Wav => "audio/wav",
            MediaKind::Flac => "audio/flac",
            MediaKind::Aac => "audio/aac",
            MediaKind::Ogg => "audio/ogg",
            MediaKind::M4a => "audio/x-m4a",
            MediaKind::Mp4 => "video/mp4",
            MediaKind::Matroska => "video/x-matroska",
            MediaKind::Avi => "video/avi",
            MediaKind::QuickTime => "video/quicktime",
        }
    }

    /// Usual file extension, without the dot
    pub fn extension(self) -> &'static str {
        match self {
            MediaKind::Mpeg => "mp3",
            MediaKind::Wav => "wav",
            MediaKind::Flac => "flac",
            MediaKind::Aac => "aac",
            MediaKind::Ogg => "ogg",
            MediaKind::M4a => "m4a",
            MediaKind::Mp4 => "mp4",
            MediaKind::Matroska => "mkv",
            MediaKind::Avi => "avi",
            MediaKind::QuickTime => "mov",
        }
    }

    /// Look up a kind by file extension (case-insensitive, no dot)
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        Self::ALL.into_iter().find(|kind| kind.extension() == ext)
    }
}
