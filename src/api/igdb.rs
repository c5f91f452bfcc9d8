//! IGDB game metadata lookup
//!
//! Authenticates once with the Twitch client-credentials flow and then
//! searches IGDB for a game's display name and cover image.

use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::config::{AppConfig, IgdbEndpoints};

/// Timeout applied to every IGDB/Twitch/cover request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Default cover size variant
pub const DEFAULT_COVER_SIZE: &str = "cover_big";

/// Errors from the token exchange; fatal at startup
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Failed to get IGDB token: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Failed to get IGDB token: {status} {body}")]
    TokenRejected {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Failed to get IGDB token: malformed response ({0})")]
    MalformedToken(#[source] reqwest::Error),
}

/// Result of a successful game search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameMetadata {
    /// Display name of the best match
    pub name: String,
    /// Cover image URL, if IGDB has a cover for the game
    pub cover_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct IgdbGame {
    name: Option<String>,
    cover: Option<IgdbCover>,
}

#[derive(Debug, Deserialize)]
struct IgdbCover {
    image_id: Option<String>,
}

/// Authenticated IGDB client
///
/// The access token is fetched once and reused for the lifetime of the
/// client; there is no refresh, so lookups start failing (and return `None`)
/// once the token expires.
#[derive(Debug, Clone)]
pub struct IgdbClient {
    http: Client,
    client_id: String,
    token: String,
    endpoints: IgdbEndpoints,
}

pub(crate) fn build_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("Game-Disc-Burner/", env!("CARGO_PKG_VERSION")))
        .build()
}

impl IgdbClient {
    /// Exchange the configured client credentials for an access token
    pub fn connect(config: &AppConfig) -> Result<Self, MetadataError> {
        let http = build_client().map_err(MetadataError::Client)?;

        log::info!("Requesting IGDB access token");
        let response = http
            .post(&config.igdb.token_url)
            .query(&[
                ("client_id", config.client_id.as_str()),
                ("client_secret", config.client_secret.as_str()),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .map_err(MetadataError::Request)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(MetadataError::TokenRejected { status, body });
        }

        let token: TokenResponse = response.json().map_err(MetadataError::MalformedToken)?;
        log::info!("IGDB access token acquired");

        Ok(Self {
            http,
            client_id: config.client_id.clone(),
            token: token.access_token,
            endpoints: config.igdb.clone(),
        })
    }

    /// Search for a game by title and return the first match
    ///
    /// Never fails: transport errors, error statuses, unreadable bodies and
    /// empty result sets all give `None`.
    pub fn search_game(&self, title: &str) -> Option<GameMetadata> {
        log::info!("IGDB search: {:?}", title);

        let response = match self
            .http
            .post(&self.endpoints.games_url)
            .header("Client-ID", &self.client_id)
            .bearer_auth(&self.token)
            .body(search_query(title))
            .send()
        {
            Ok(response) => response,
            Err(e) => {
                log::warn!("IGDB search failed: {}", e);
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            log::warn!("IGDB search failed with status: {}", status);
            return None;
        }

        let games: Vec<IgdbGame> = match response.json() {
            Ok(games) => games,
            Err(e) => {
                log::warn!("Failed to parse IGDB response: {}", e);
                return None;
            }
        };

        let Some(game) = games.into_iter().next() else {
            log::info!("IGDB has no match for {:?}", title);
            return None;
        };

        let cover_url = game
            .cover
            .and_then(|cover| cover.image_id)
            .filter(|id| !id.is_empty())
            .map(|id| cover_url(&self.endpoints.image_base_url, &id, DEFAULT_COVER_SIZE));

        let name = game.name.unwrap_or_default();
        log::info!("IGDB match: {:?} (cover: {})", name, cover_url.is_some());
        Some(GameMetadata {
            name,
            cover_url,
        })
    }
}

/// Apicalypse request body for a single-result title search
pub fn search_query(title: &str) -> String {
    let escaped = title.replace('\\', "\\\\").replace('"', "\\\"");
    format!("search \"{}\"; fields name,cover.image_id; limit 1;", escaped)
}

/// Cover image URL for an image id and size variant (e.g. `cover_big`)
pub fn cover_url(image_base_url: &str, image_id: &str, size: &str) -> String {
    format!("{}/t_{}/{}.jpg", image_base_url.trim_end_matches('/'), size, image_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;
    use tiny_http::{Response, Server};

    /// A recorded request: method, URL, body and header pairs
    type Seen = (String, String, String, Vec<(String, String)>);

    /// Serve `responses` in order on a local port, recording what was asked
    fn serve(responses: Vec<(u16, &'static str)>) -> (String, mpsc::Receiver<Seen>) {
        let server = Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            for (status, body) in responses {
                let Ok(mut request) = server.recv() else { return };
                let mut content = String::new();
                let _ = request.as_reader().read_to_string(&mut content);
                let headers = request
                    .headers()
                    .iter()
                    .map(|h| (h.field.to_string(), h.value.to_string()))
                    .collect();
                let _ = tx.send((
                    request.method().to_string(),
                    request.url().to_string(),
                    content,
                    headers,
                ));
                let _ = request.respond(Response::from_string(body).with_status_code(status));
            }
        });

        (format!("http://127.0.0.1:{}", port), rx)
    }

    fn config(base: &str) -> AppConfig {
        AppConfig {
            client_id: "my-client".to_string(),
            client_secret: "s3cret".to_string(),
            imgburn_path: "ImgBurn.exe".into(),
            payload_dir: "payload".into(),
            igdb: IgdbEndpoints {
                token_url: format!("{}/oauth2/token", base),
                games_url: format!("{}/v4/games", base),
                image_base_url: "https://images.igdb.com/igdb/image/upload".to_string(),
            },
        }
    }

    fn header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
        headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_cover_url() {
        assert_eq!(
            cover_url("https://images.igdb.com/igdb/image/upload", "co1wyy", "cover_big"),
            "https://images.igdb.com/igdb/image/upload/t_cover_big/co1wyy.jpg"
        );
        assert_eq!(
            cover_url("https://example.com/upload/", "abc", "thumb"),
            "https://example.com/upload/t_thumb/abc.jpg"
        );
    }

    #[test]
    fn test_search_query_escapes_quotes() {
        assert_eq!(
            search_query("Okami"),
            "search \"Okami\"; fields name,cover.image_id; limit 1;"
        );
        assert_eq!(
            search_query(r#"Say "Hi" \o/"#),
            r#"search "Say \"Hi\" \\o/"; fields name,cover.image_id; limit 1;"#
        );
    }

    #[test]
    fn test_connect_and_search() {
        let (base, seen) = serve(vec![
            (200, r#"{"access_token": "tok123", "expires_in": 5000000, "token_type": "bearer"}"#),
            (200, r#"[{"id": 1, "name": "Okami", "cover": {"id": 9, "image_id": "co1wyy"}}]"#),
        ]);

        let client = IgdbClient::connect(&config(&base)).unwrap();
        let (method, url, _, _) = seen.recv().unwrap();
        assert_eq!(method, "POST");
        assert!(url.starts_with("/oauth2/token?"));
        assert!(url.contains("client_id=my-client"));
        assert!(url.contains("client_secret=s3cret"));
        assert!(url.contains("grant_type=client_credentials"));

        let result = client.search_game("Okami").unwrap();
        assert_eq!(result.name, "Okami");
        assert_eq!(
            result.cover_url.as_deref(),
            Some("https://images.igdb.com/igdb/image/upload/t_cover_big/co1wyy.jpg")
        );

        let (method, url, body, headers) = seen.recv().unwrap();
        assert_eq!(method, "POST");
        assert_eq!(url, "/v4/games");
        assert_eq!(body, "search \"Okami\"; fields name,cover.image_id; limit 1;");
        assert_eq!(header(&headers, "Client-ID"), Some("my-client"));
        assert_eq!(header(&headers, "Authorization"), Some("Bearer tok123"));
    }

    #[test]
    fn test_token_rejected() {
        let (base, _seen) = serve(vec![(400, r#"{"status":400,"message":"invalid client secret"}"#)]);

        let err = IgdbClient::connect(&config(&base)).unwrap_err();
        match err {
            MetadataError::TokenRejected { status, body } => {
                assert_eq!(status.as_u16(), 400);
                assert!(body.contains("invalid client secret"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_token_unreachable() {
        let err = IgdbClient::connect(&config("http://127.0.0.1:1")).unwrap_err();
        assert!(matches!(err, MetadataError::Request(_)));
    }

    #[test]
    fn test_search_empty_result_is_none() {
        let (base, _seen) = serve(vec![(200, r#"{"access_token": "tok"}"#), (200, "[]")]);
        let client = IgdbClient::connect(&config(&base)).unwrap();
        assert_eq!(client.search_game("Nothing Matches"), None);
    }

    #[test]
    fn test_search_error_status_is_none() {
        let (base, _seen) = serve(vec![(200, r#"{"access_token": "tok"}"#), (401, "unauthorized")]);
        let client = IgdbClient::connect(&config(&base)).unwrap();
        assert_eq!(client.search_game("Okami"), None);
    }

    #[test]
    fn test_search_network_error_is_none() {
        let (base, _seen) = serve(vec![(200, r#"{"access_token": "tok"}"#)]);
        let mut client = IgdbClient::connect(&config(&base)).unwrap();
        client.endpoints.games_url = "http://127.0.0.1:1/v4/games".to_string();
        assert_eq!(client.search_game("Okami"), None);
    }

    #[test]
    fn test_search_without_cover() {
        let (base, _seen) = serve(vec![
            (200, r#"{"access_token": "tok"}"#),
            (200, r#"[{"id": 5, "name": "Obscure Game"}]"#),
        ]);
        let client = IgdbClient::connect(&config(&base)).unwrap();
        assert_eq!(
            client.search_game("Obscure Game"),
            Some(GameMetadata {
                name: "Obscure Game".to_string(),
                cover_url: None,
            })
        );
    }

    #[test]
    fn test_search_null_fields_keep_match() {
        let (base, _seen) = serve(vec![
            (200, r#"{"access_token": "tok"}"#),
            (200, r#"[{"id": 7, "name": null, "cover": {"id": 1, "image_id": null}}]"#),
        ]);
        let client = IgdbClient::connect(&config(&base)).unwrap();
        assert_eq!(
            client.search_game("Unnamed"),
            Some(GameMetadata {
                name: String::new(),
                cover_url: None,
            })
        );
    }

    #[test]
    #[ignore] // Requires network access and Twitch credentials in config.json
    fn test_live_search() {
        let config = AppConfig::load().unwrap();
        let client = IgdbClient::connect(&config).unwrap();
        let result = client.search_game("Okami").unwrap();
        assert!(result.name.contains("Okami"));
        assert!(result.cover_url.is_some());
    }
}
