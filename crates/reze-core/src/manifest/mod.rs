//! Quality ladder probing for HLS multivariant playlists
//!
//! Fetches a master playlist the same way the streaming engine would (with
//! the source's request headers) and reports the ladder it would expose.

use crate::{
    error::Error,
    quality::rank_levels,
    types::{Level, LoadableSource, SourceQuality},
    Result,
};
use m3u8_rs::{AlternativeMedia, AlternativeMediaType, MasterPlaylist, Playlist};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, instrument};
use url::Url;

/// An alternative rendition (audio or subtitles) of a master playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rendition {
    pub group_id: String,
    pub name: String,
    pub language: Option<String>,
    pub uri: Option<Url>,
    pub default: bool,
}

/// Ladder exposed by a master playlist
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LadderManifest {
    /// Playable variants in playlist order (i-frame variants excluded)
    pub levels: Vec<Level>,
    pub audio: Vec<Rendition>,
    pub subtitles: Vec<Rendition>,
    /// The document was a media playlist with no ladder
    pub single_variant: bool,
}

impl LadderManifest {
    /// Quality labels in level order
    pub fn qualities(&self) -> Vec<SourceQuality> {
        rank_levels(&self.levels)
    }
}

/// Parse a playlist document into its ladder
///
/// Relative rendition URIs are resolved against `base`.
pub fn parse_ladder(content: &[u8], base: &Url) -> Result<LadderManifest> {
    let playlist = m3u8_rs::parse_playlist_res(content)
        .map_err(|e| Error::ManifestParse(format!("Failed to parse HLS playlist: {:?}", e)))?;

    match playlist {
        Playlist::MasterPlaylist(master) => Ok(extract_ladder(&master, base)),
        Playlist::MediaPlaylist(_) => {
            debug!(url = %base, "Media playlist has no ladder");
            Ok(LadderManifest {
                single_variant: true,
                ..Default::default()
            })
        }
    }
}

fn extract_ladder(master: &MasterPlaylist, base: &Url) -> LadderManifest {
    let levels = master
        .variants
        .iter()
        .filter(|variant| !variant.is_i_frame)
        .map(|variant| {
            let (width, height) = variant
                .resolution
                .map(|r| (r.width as u32, r.height as u32))
                .unwrap_or((0, 0));
            Level::new(width, height, variant.bandwidth)
        })
        .collect();

    let renditions = |kind: AlternativeMediaType| -> Vec<Rendition> {
        master
            .alternatives
            .iter()
            .filter(|media| media.media_type == kind)
            .map(|media| to_rendition(media, base))
            .collect()
    };

    LadderManifest {
        levels,
        audio: renditions(AlternativeMediaType::Audio),
        subtitles: renditions(AlternativeMediaType::Subtitles),
        single_variant: false,
    }
}

fn to_rendition(media: &AlternativeMedia, base: &Url) -> Rendition {
    Rendition {
        group_id: media.group_id.clone(),
        name: media.name.clone(),
        language: media.language.clone(),
        uri: media.uri.as_deref().and_then(|uri| base.join(uri).ok()),
        default: media.default,
    }
}

/// Fetch and parse the ladder of an adaptive source
#[instrument(skip(client, source), fields(url = %source.url))]
pub async fn fetch_ladder(client: &Client, source: &LoadableSource) -> Result<LadderManifest> {
    if !source.is_adaptive() {
        return Err(Error::InvalidConfig(format!(
            "{} is not an adaptive source",
            source.url
        )));
    }

    let mut request = client.get(source.url.clone());
    for (name, value) in source.request_headers() {
        request = request.header(name, value);
    }

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::ManifestFetch(format!(
            "{} returned {}",
            source.url, status
        )));
    }

    // redirects change the base for relative URIs
    let base = response.url().clone();
    let body = response.bytes().await?;
    debug!(bytes = body.len(), "Fetched master playlist");

    parse_ladder(&body, &base)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MASTER: &str = "#EXTM3U
#EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID=\"aud\",NAME=\"English\",LANGUAGE=\"en\",DEFAULT=YES,URI=\"audio/en.m3u8\"
#EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID=\"aud\",NAME=\"Deutsch\",LANGUAGE=\"de\",URI=\"audio/de.m3u8\"
#EXT-X-MEDIA:TYPE=SUBTITLES,GROUP-ID=\"subs\",NAME=\"Français\",LANGUAGE=\"fr\",URI=\"subs/fr.m3u8\"
#EXT-X-STREAM-INF:BANDWIDTH=800000,RESOLUTION=640x360,AUDIO=\"aud\",SUBTITLES=\"subs\"
low/index.m3u8
#EXT-X-STREAM-INF:BANDWIDTH=2800000,RESOLUTION=1280x720,AUDIO=\"aud\",SUBTITLES=\"subs\"
mid/index.m3u8
#EXT-X-STREAM-INF:BANDWIDTH=5000000,RESOLUTION=1920x1080,AUDIO=\"aud\",SUBTITLES=\"subs\"
high/index.m3u8
#EXT-X-I-FRAME-STREAM-INF:BANDWIDTH=90000,RESOLUTION=640x360,URI=\"low/iframes.m3u8\"
";

    fn base() -> Url {
        Url::parse("https://cdn.example.com/show/master.m3u8").unwrap()
    }

    #[test]
    fn test_parse_master_ladder() {
        let ladder = parse_ladder(MASTER.as_bytes(), &base()).unwrap();

        assert!(!ladder.single_variant);
        assert_eq!(ladder.levels.len(), 3);
        assert_eq!(ladder.levels[1], Level::new(1280, 720, 2_800_000));
        assert_eq!(
            ladder.qualities(),
            vec![SourceQuality::Q360, SourceQuality::Q720, SourceQuality::Q1080]
        );
    }

    #[test]
    fn test_alternative_renditions() {
        let ladder = parse_ladder(MASTER.as_bytes(), &base()).unwrap();

        assert_eq!(ladder.audio.len(), 2);
        assert!(ladder.audio[0].default);
        assert_eq!(ladder.audio[1].language.as_deref(), Some("de"));
        assert_eq!(
            ladder.audio[0].uri.as_ref().map(Url::as_str),
            Some("https://cdn.example.com/show/audio/en.m3u8")
        );

        assert_eq!(ladder.subtitles.len(), 1);
        assert_eq!(ladder.subtitles[0].language.as_deref(), Some("fr"));
    }

    #[test]
    fn test_media_playlist_has_no_ladder() {
        let media = "#EXTM3U
#EXT-X-TARGETDURATION:6
#EXT-X-VERSION:3
#EXTINF:6.0,
seg0.ts
#EXT-X-ENDLIST
";
        let ladder = parse_ladder(media.as_bytes(), &base()).unwrap();
        assert!(ladder.single_variant);
        assert!(ladder.levels.is_empty());
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let err = parse_ladder(b"not a playlist", &base()).unwrap_err();
        assert_eq!(err.error_code(), "MANIFEST_PARSE");
    }

    #[tokio::test]
    async fn test_fetch_rejects_progressive_source() {
        let source = LoadableSource::mp4(Url::parse("https://cdn.example.com/a.mp4").unwrap());
        let err = fetch_ladder(&Client::new(), &source).await.unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}
