//! Constants module for the TuklasVerse embed proxy
//!
//! Contains default settings and endpoint URL builders.

/// Defaults used when the environment does not override them
pub mod defaults {
    /// The one embed prefix the proxy accepts out of the box
    pub const ALLOWED_PREFIX: &str = "https://vidsrc.to/embed/";

    /// Desktop browser User-Agent sent to the upstream
    pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

    /// Player base used for iframe sources
    pub const EMBED_BASE_URL: &str = "https://vidsrc.xyz/embed/";
}

/// Fixed messages written to logs and responses
pub mod messages {
    pub const PROXY_FAILED: &str = "Proxy failed";
    pub const SEASON_FETCHED: &str = "Data fetched successfully";
}

/// Header values written by the proxy
pub mod headers {
    pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";
    pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";
    pub const NO_STORE: &str = "no-store";
}

/// URL builder functions for all endpoints
pub mod endpoints {
    /// Path of the sanitizing proxy on this service
    pub const PROXY_PATH: &str = "/api/proxy/vidsrc";

    /// Proxy URL wrapping an upstream embed URL
    pub fn proxied(target: &str) -> String {
        format!("{}?url={}", PROXY_PATH, urlencoding::encode(target))
    }

    /// Movie player URL
    pub fn movie(base_url: &str, id: &str) -> String {
        format!("{}movie/{}", with_trailing_slash(base_url), id)
    }

    /// TV episode player URL
    pub fn tv_episode(base_url: &str, id: &str, season: u32, episode: u32) -> String {
        format!(
            "{}tv/{}/{}-{}",
            with_trailing_slash(base_url),
            id,
            season,
            episode
        )
    }

    fn with_trailing_slash(base_url: &str) -> String {
        if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        }
    }
}
