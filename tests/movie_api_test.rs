//! Movie metadata client and navigation flow against a local stub API.
//!
//! An axum server on an ephemeral port stands in for the metadata API;
//! no external network access is needed.

use axum::{extract::Query, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use moviebot::{
    BotError, MediaKind, MovieCatalog, MovieClient, NavigationAction, Navigator, Reply,
    GENERIC_ERROR_MESSAGE, NOT_FOUND_MESSAGE,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

const API_KEY: &str = "test-key";

type Params = Query<HashMap<String, String>>;

fn unauthorized(params: &HashMap<String, String>) -> Option<(StatusCode, Json<Value>)> {
    if params.get("apikey").map(String::as_str) != Some(API_KEY) {
        Some((StatusCode::UNAUTHORIZED, Json(json!({"error": "bad key"}))))
    } else {
        None
    }
}

async fn search(Query(params): Params) -> impl IntoResponse {
    if let Some(denied) = unauthorized(&params) {
        return denied;
    }
    let text = params.get("text").cloned().unwrap_or_default();
    let body = match text.as_str() {
        "inception" => json!({"status": true, "result": {"data": [
            {"title": "Inception (2010) Sinhala Subtitles | සිංහල උපසිරැසි සමඟ", "type": "Movie",
             "link": "https://s.lk/movies/inception_2010/"},
            {"title": "Inception: The Cobol Job", "type": "Movie",
             "link": "https://s.lk/movies/cobol-job/"},
            {"title": "Dreams", "type": "TV",
             "link": "https://s.lk/tvshows/dreams/"}
        ]}}),
        "empty" => json!({"status": true, "result": {"data": []}}),
        "missing" => json!({"status": false, "result": {}}),
        _ => json!({"status": false}),
    };
    (StatusCode::OK, Json(body))
}

async fn movie(Query(params): Params) -> impl IntoResponse {
    if let Some(denied) = unauthorized(&params) {
        return denied;
    }
    let url = params.get("url").cloned().unwrap_or_default();
    let body = if url == "https://s.lk/movies/inception_2010/" {
        json!({"result": {"data": {
            "title": "Inception (2010) Sinhala Subtitles | සිංහල උපසිරැසි සමඟ",
            "date": "2010-07-16",
            "runtime": "148 min",
            "country": "USA",
            "imdbRate": "8.8",
            "cast": [{"name": "Leonardo DiCaprio"}, {"name": "Elliot Page"}],
            "description": "A thief who steals corporate secrets through dream-sharing.",
            "image": "https://img.test/inception.jpg"
        }}})
    } else if url == "https://s.lk/movies/broken/" {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "db down at 10.1.2.3"})));
    } else {
        json!({"result": {"data": null}})
    };
    (StatusCode::OK, Json(body))
}

async fn tvshow(Query(params): Params) -> impl IntoResponse {
    if let Some(denied) = unauthorized(&params) {
        return denied;
    }
    let body = json!({"result": {"data": {
        "title": "Dreams",
        "date": "2019",
        "category": "Drama",
        "image": "https://img.test/dreams.jpg",
        "episodes": [
            {"number": 1, "name": "Pilot", "link": "https://s.lk/episodes/dreams-1x1/"},
            {"number": 2, "name": "Awake", "link": "https://s.lk/episodes/dreams-1x2/"}
        ]
    }}});
    (StatusCode::OK, Json(body))
}

async fn garbage() -> &'static str {
    "<html>not json</html>"
}

async fn spawn_stub() -> String {
    let app = Router::new()
        .route("/search", get(search))
        .route("/movie", get(movie))
        .route("/tvshow", get(tvshow))
        .route("/garbage/search", get(garbage));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Base URL on which nothing is listening
async fn dead_endpoint() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

mod client {
    use super::*;

    #[tokio::test]
    async fn test_search_returns_items_in_api_order() {
        let client = MovieClient::new(&spawn_stub().await, API_KEY);
        let items = client.search("inception").await.unwrap();

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].link, "https://s.lk/movies/inception_2010/");
        assert_eq!(items[1].title, "Inception: The Cobol Job");
        assert_eq!(items[2].kind, MediaKind::Series);
    }

    #[tokio::test]
    async fn test_empty_and_missing_data_are_not_found() {
        let client = MovieClient::new(&spawn_stub().await, API_KEY);

        for query in ["empty", "missing", "anything-else"] {
            let result = client.search(query).await;
            assert!(matches!(result, Err(BotError::NotFound)), "query {}", query);
        }
        assert!(matches!(
            client.fetch_movie_detail("https://s.lk/movies/none/").await,
            Err(BotError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_wrong_key_is_transport_error() {
        let client = MovieClient::new(&spawn_stub().await, "wrong");
        assert!(matches!(client.search("inception").await, Err(BotError::Transport(_))));
    }

    #[tokio::test]
    async fn test_movie_detail_fields() {
        let client = MovieClient::new(&spawn_stub().await, API_KEY);
        let detail = client
            .fetch_movie_detail("https://s.lk/movies/inception_2010/")
            .await
            .unwrap();

        assert_eq!(detail.runtime, "148 min");
        assert_eq!(detail.rating, "8.8");
        assert_eq!(detail.cast, vec!["Leonardo DiCaprio", "Elliot Page"]);
        assert_eq!(detail.image, "https://img.test/inception.jpg");
    }

    #[tokio::test]
    async fn test_series_detail_episodes() {
        let client = MovieClient::new(&spawn_stub().await, API_KEY);
        let detail = client
            .fetch_series_detail("https://s.lk/tvshows/dreams/")
            .await
            .unwrap();

        assert_eq!(detail.episodes.len(), 2);
        assert_eq!(detail.episodes[0].number, "1");
        assert_eq!(detail.episodes[1].link, "https://s.lk/episodes/dreams-1x2/");
    }

    #[tokio::test]
    async fn test_server_error_and_bad_json_are_transport() {
        let base = spawn_stub().await;
        let client = MovieClient::new(&base, API_KEY);
        assert!(matches!(
            client.fetch_movie_detail("https://s.lk/movies/broken/").await,
            Err(BotError::Transport(_))
        ));

        let garbage = MovieClient::new(&format!("{}/garbage", base), API_KEY);
        assert!(matches!(garbage.search("x").await, Err(BotError::Transport(_))));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport() {
        let client = MovieClient::new(&dead_endpoint().await, API_KEY);
        assert!(matches!(client.search("inception").await, Err(BotError::Transport(_))));
    }
}

mod flow {
    use super::*;

    fn navigator(base: &str) -> Navigator {
        Navigator::new(Arc::new(MovieClient::new(base, API_KEY)))
    }

    #[tokio::test]
    async fn test_search_select_details_walk() {
        let nav = navigator(&spawn_stub().await);

        let results = nav.search("inception").await;
        assert!(results.text().contains("1. 🎬 Inception (2010)"));
        assert!(!results.text().contains("සිංහල"));

        let payloads = results.callback_payloads();
        assert_eq!(payloads[0], "movie_https://s.lk/movies/inception_2010/");
        assert_eq!(payloads[2], "tv_https://s.lk/tvshows/dreams/");

        let detail = nav.handle_callback(payloads[0]).await;
        match &detail {
            Reply::Photo { url, caption, .. } => {
                assert_eq!(url, "https://img.test/inception.jpg");
                assert!(caption.contains("148 min"));
                assert!(!caption.contains("සිංහල"));
            }
            other => panic!("expected photo, got {:?}", other),
        }

        let details_payload = detail.callback_payloads()[1].to_string();
        assert_eq!(
            NavigationAction::decode(&details_payload).unwrap(),
            NavigationAction::Details("https://s.lk/movies/inception_2010/".into())
        );
        let details = nav.handle_callback(&details_payload).await;
        assert!(details.text().contains("dream-sharing"));
    }

    #[tokio::test]
    async fn test_series_walk() {
        let nav = navigator(&spawn_stub().await);

        let results = nav.search("inception").await;
        let series = nav.handle_callback(results.callback_payloads()[2]).await;

        assert_eq!(
            series.callback_payloads(),
            vec![
                "ep_https://s.lk/episodes/dreams-1x1/",
                "ep_https://s.lk/episodes/dreams-1x2/"
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_search_renders_not_found() {
        let nav = navigator(&spawn_stub().await);
        for query in ["empty", ""] {
            let reply = nav.search(query).await;
            assert_eq!(reply.text(), NOT_FOUND_MESSAGE);
            assert_eq!(reply.button_count(), 0);
        }
    }

    #[tokio::test]
    async fn test_detail_transport_failure_renders_generic_error() {
        let nav = navigator(&dead_endpoint().await);
        let reply = nav.handle_callback("movie_https://s.lk/movies/inception_2010/").await;

        assert_eq!(reply.text(), GENERIC_ERROR_MESSAGE);
        assert!(!reply.text().to_lowercase().contains("connect"));
        assert_eq!(reply.button_count(), 0);
    }

    #[tokio::test]
    async fn test_detail_server_error_hides_body() {
        let nav = navigator(&spawn_stub().await);
        let reply = nav.handle_callback("movie_https://s.lk/movies/broken/").await;

        assert_eq!(reply.text(), GENERIC_ERROR_MESSAGE);
        assert!(!reply.text().contains("10.1.2.3"));
    }
}
