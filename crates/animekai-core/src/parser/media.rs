//! Media URL extraction from player frame bodies
//!
//! Frame pages are scripts rather than structured markup, so the default
//! extractor scans the raw body for quoted `.m3u8` and `.vtt` URLs. The scan
//! sits behind [`SourceExtractor`] so a structured parser can replace it.
//!
//! Matches keep their order of appearance and are not deduplicated. Quality is
//! always `auto` and subtitle language always `English`, since neither can be
//! recovered from a bare URL.

use regex_lite::Regex;

use crate::types::{StreamSource, SubtitleTrack};

const M3U8_PATTERN: &str = r#"["'](https?://[^"']+\.m3u8[^"']*)["']"#;

const VTT_PATTERN: &str = r#"["'](https?://[^"']+\.vtt[^"']*)["']"#;

/// Media found in a frame body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedMedia {
    pub sources: Vec<StreamSource>,
    pub subtitles: Vec<SubtitleTrack>,
}

/// Strategy turning a player frame body into playable media.
pub trait SourceExtractor: Send + Sync {
    fn extract(&self, body: &str) -> ExtractedMedia;
}

/// Quoted-URL scan over the raw body
#[derive(Debug, Clone)]
pub struct RegexSourceExtractor {
    m3u8: Regex,
    vtt: Regex,
}

impl RegexSourceExtractor {
    pub fn new() -> Self {
        Self {
            m3u8: Regex::new(M3U8_PATTERN).expect("m3u8 pattern is valid"),
            vtt: Regex::new(VTT_PATTERN).expect("vtt pattern is valid"),
        }
    }

    /// Every quoted HLS manifest URL, in order of appearance.
    pub fn streaming_sources(&self, body: &str) -> Vec<StreamSource> {
        quoted_urls(&self.m3u8, body).map(StreamSource::hls).collect()
    }

    /// Every quoted WebVTT URL, in order of appearance.
    pub fn subtitles(&self, body: &str) -> Vec<SubtitleTrack> {
        quoted_urls(&self.vtt, body)
            .map(|url| SubtitleTrack {
                lang: SubtitleTrack::DEFAULT_LANG.to_string(),
                url,
            })
            .collect()
    }
}

impl Default for RegexSourceExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceExtractor for RegexSourceExtractor {
    fn extract(&self, body: &str) -> ExtractedMedia {
        ExtractedMedia {
            sources: self.streaming_sources(body),
            subtitles: self.subtitles(body),
        }
    }
}

fn quoted_urls<'a>(re: &'a Regex, body: &'a str) -> impl Iterator<Item = String> + 'a {
    re.captures_iter(body)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
