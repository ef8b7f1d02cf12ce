//! Stream playlist parsing (M3U and PLS)
//!
//! Many directory entries point at a playlist file rather than at the audio
//! stream itself. These helpers extract the stream URLs so the player gets
//! something it can open.

/// Playlist formats that are resolved before playback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistFormat {
    M3u,
    Pls,
}

impl PlaylistFormat {
    /// Detect a playlist from the URL path extension
    ///
    /// `.m3u8` is treated as M3U; HLS bodies are recognized with [`is_hls`].
    pub fn from_url(url: &str) -> Option<Self> {
        let path = url.split(['?', '#']).next().unwrap_or(url).to_lowercase();
        if path.ends_with(".m3u") || path.ends_with(".m3u8") {
            Some(Self::M3u)
        } else if path.ends_with(".pls") {
            Some(Self::Pls)
        } else {
            None
        }
    }

    /// Detect a playlist from a response content type
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        match mime.as_str() {
            "audio/x-mpegurl" | "audio/mpegurl" => Some(Self::M3u),
            "audio/x-scpls" | "application/pls+xml" => Some(Self::Pls),
            _ => None,
        }
    }

    /// Extract the stream URLs in playlist order
    pub fn parse(&self, content: &str) -> Vec<String> {
        match self {
            Self::M3u => parse_m3u(content),
            Self::Pls => parse_pls(content),
        }
    }
}

/// An HLS media or master playlist, which the player opens directly
pub fn is_hls(content: &str) -> bool {
    content
        .lines()
        .any(|line| line.trim_start().starts_with("#EXT-X-"))
}

fn is_stream_url(candidate: &str) -> bool {
    let lower = candidate.to_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Extract the entries of an M3U / extended M3U playlist
pub fn parse_m3u(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.trim_start_matches('\u{feff}').trim())
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter(|line| is_stream_url(line))
        .map(str::to_string)
        .collect()
}

/// Extract the `FileN=` entries of a PLS playlist, ordered by N
pub fn parse_pls(content: &str) -> Vec<String> {
    let mut entries: Vec<(u32, String)> = content
        .lines()
        .filter_map(|line| {
            let (key, value) = line.trim().split_once('=')?;
            let key = key.trim().to_lowercase();
            let index = key.strip_prefix("file")?.parse::<u32>().ok()?;
            let value = value.trim();
            is_stream_url(value).then(|| (index, value.to_string()))
        })
        .collect();
    entries.sort_by_key(|(index, _)| *index);
    entries.into_iter().map(|(_, url)| url).collect()
}
