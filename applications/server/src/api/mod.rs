/// API route modules
pub mod albums;
pub mod container_songs;
pub mod health;
pub mod playlists;
pub mod songs;
pub mod users;

use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

/// Build the application router with every route under `/api`
pub fn router(app_state: AppState) -> Router {
    let routes = Router::new()
        .route("/health", get(health::health))
        // Users
        .route("/users", post(users::create_user))
        // Songs
        .route("/songs", post(songs::create_song))
        .route("/songs/liked", get(songs::liked_songs))
        .route("/songs/:id", get(songs::get_song).delete(songs::delete_song))
        .route(
            "/songs/:id/like",
            post(songs::like_song).delete(songs::unlike_song),
        )
        // Albums
        .route(
            "/albums",
            get(albums::list_albums).post(albums::create_album),
        )
        .route(
            "/albums/:id",
            get(albums::get_album).delete(albums::delete_album),
        )
        .route(
            "/albums/:id/songs",
            get(albums::list_songs)
                .post(albums::add_songs)
                .put(albums::set_songs)
                .delete(albums::delete_songs),
        )
        // Playlists
        .route(
            "/playlists",
            get(playlists::list_playlists).post(playlists::create_playlist),
        )
        .route(
            "/playlists/:id",
            get(playlists::get_playlist).delete(playlists::delete_playlist),
        )
        .route(
            "/playlists/:id/songs",
            get(playlists::list_songs)
                .post(playlists::add_songs)
                .put(playlists::set_songs)
                .delete(playlists::delete_songs),
        );

    Router::new()
        .nest("/api", routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
