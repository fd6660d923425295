//! Embed module for building player iframe sources
//!
//! A request with a season and an episode resolves to a TV episode player,
//! anything else with an id resolves to a movie player. IMDb ids win over
//! TMDB ids when both are given.
//!
//! The proxied source is only offered when the proxy's allow-list accepts
//! the player URL; otherwise the caller has to embed `src` directly.

use serde::{Deserialize, Serialize};
use url::form_urlencoded;
use utoipa::{IntoParams, ToSchema};

use crate::constants::endpoints;
use crate::error::{AppError, AppResult};
use crate::proxy::AllowList;

/// Query parameters accepted by the embed builder
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct EmbedRequest {
    /// IMDb id (e.g. "tt0111161")
    pub imdb_id: Option<String>,
    /// TMDB id (e.g. "1399")
    pub tmdb_id: Option<String>,
    /// Season number for TV content
    pub season: Option<u32>,
    /// Episode number for TV content
    pub episode: Option<u32>,
    /// Default subtitle language
    pub ds_lang: Option<String>,
    /// External subtitle URL
    pub sub_url: Option<String>,
}

/// Kind of player an embed points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EmbedKind {
    Movie,
    Tv,
}

/// A built iframe source and its proxied counterpart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmbedSource {
    pub kind: EmbedKind,
    /// Direct player URL
    pub src: String,
    /// Same player routed through the sanitizing proxy, when it is allowed
    pub proxied_src: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Build the player source for a request
///
/// Query values are form-encoded, so spaces become `+`.
pub fn build_embed(
    base_url: &str,
    allow_list: &AllowList,
    request: &EmbedRequest,
) -> AppResult<EmbedSource> {
    let id = non_empty(&request.imdb_id)
        .or_else(|| non_empty(&request.tmdb_id))
        .ok_or_else(|| AppError::validation("Invalid ID"))?;

    let (kind, path) = match (request.season, request.episode) {
        (Some(season), Some(episode)) if season > 0 && episode > 0 => (
            EmbedKind::Tv,
            endpoints::tv_episode(base_url, id, season, episode),
        ),
        _ => (EmbedKind::Movie, endpoints::movie(base_url, id)),
    };

    let mut query = form_urlencoded::Serializer::new(String::new());
    if let Some(lang) = non_empty(&request.ds_lang) {
        query.append_pair("ds_lang", lang);
    }
    if let Some(sub_url) = non_empty(&request.sub_url) {
        query.append_pair("sub_url", sub_url);
    }

    let src = format!("{}?{}", path, query.finish());
    let proxied_src = allow_list.matches(&src).then(|| endpoints::proxied(&src));

    Ok(EmbedSource {
        kind,
        src,
        proxied_src,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    const BASE: &str = "https://vidsrc.xyz/embed/";

    #[test]
    fn test_movie_embed() {
        let request = EmbedRequest {
            imdb_id: Some("tt0111161".to_string()),
            ..Default::default()
        };
        let embed = build_embed(BASE, &AllowList::default(), &request).unwrap();
        assert_eq!(embed.kind, EmbedKind::Movie);
        assert_eq!(embed.src, "https://vidsrc.xyz/embed/movie/tt0111161?");
        assert_eq!(embed.proxied_src, None);
    }

    #[test]
    fn test_proxied_src_only_for_allowed_player() {
        let request = EmbedRequest {
            imdb_id: Some("tt0111161".to_string()),
            ..Default::default()
        };
        let allow_list = AllowList::parse("https://vidsrc.to/embed/,https://vidsrc.xyz/embed/").unwrap();

        let embed = build_embed(BASE, &allow_list, &request).unwrap();
        assert_eq!(
            embed.proxied_src.as_deref(),
            Some("/api/proxy/vidsrc?url=https%3A%2F%2Fvidsrc.xyz%2Fembed%2Fmovie%2Ftt0111161%3F")
        );

        let embed = build_embed("https://vidsrc.to/embed/", &AllowList::default(), &request).unwrap();
        assert!(embed.proxied_src.is_some());
    }

    #[test]
    fn test_tv_embed_with_subtitles() {
        let request = EmbedRequest {
            tmdb_id: Some("1399".to_string()),
            season: Some(1),
            episode: Some(3),
            ds_lang: Some("en".to_string()),
            sub_url: Some("https://subs.example.com/a b.vtt".to_string()),
            ..Default::default()
        };
        let embed = build_embed(BASE, &AllowList::default(), &request).unwrap();
        assert_eq!(embed.kind, EmbedKind::Tv);
        assert_eq!(
            embed.src,
            "https://vidsrc.xyz/embed/tv/1399/1-3?ds_lang=en&sub_url=https%3A%2F%2Fsubs.example.com%2Fa+b.vtt"
        );
    }

    #[test]
    fn test_imdb_id_preferred() {
        let request = EmbedRequest {
            imdb_id: Some("tt0944947".to_string()),
            tmdb_id: Some("1399".to_string()),
            ..Default::default()
        };
        let embed = build_embed(BASE, &AllowList::default(), &request).unwrap();
        assert!(embed.src.contains("tt0944947"));
        assert!(!embed.src.contains("1399"));
    }

    #[test]
    fn test_partial_episode_falls_back_to_movie() {
        let request = EmbedRequest {
            tmdb_id: Some("550".to_string()),
            season: Some(2),
            episode: None,
            ..Default::default()
        };
        assert_eq!(build_embed(BASE, &AllowList::default(), &request).unwrap().kind, EmbedKind::Movie);

        let request = EmbedRequest {
            tmdb_id: Some("550".to_string()),
            season: Some(0),
            episode: Some(4),
            ..Default::default()
        };
        assert_eq!(build_embed(BASE, &AllowList::default(), &request).unwrap().kind, EmbedKind::Movie);
    }

    #[test]
    fn test_missing_id_is_validation_error() {
        let request = EmbedRequest {
            imdb_id: Some("  ".to_string()),
            season: Some(1),
            episode: Some(1),
            ..Default::default()
        };
        let err = build_embed(BASE, &AllowList::default(), &request).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.user_message(), "Invalid ID");
    }
}
