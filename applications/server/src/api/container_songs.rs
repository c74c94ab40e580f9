/// Ordered song endpoints shared by albums and playlists
///
/// Every mutation answers with the container's songs in their new order.
use crate::{error::Result, middleware::AuthenticatedUser, state::AppState};
use axum::Json;
use cadence_core::{ContainerRef, OrderedSong, SongId};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SongIdsRequest {
    pub song_ids: Vec<SongId>,
}

/// Body of POST .../songs: one song at an optional index, or a bulk append
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AddSongsRequest {
    One {
        song_id: SongId,
        #[serde(default)]
        index: Option<usize>,
    },
    Many {
        song_ids: Vec<SongId>,
    },
}

pub(crate) async fn list(
    app_state: &AppState,
    container: &ContainerRef,
) -> Result<Json<Vec<OrderedSong>>> {
    let songs = app_state.ordering.list_songs(container).await?;
    Ok(Json(songs))
}

pub(crate) async fn add(
    app_state: &AppState,
    container: &ContainerRef,
    auth: &AuthenticatedUser,
    req: AddSongsRequest,
) -> Result<Json<Vec<OrderedSong>>> {
    match req {
        AddSongsRequest::One { song_id, index } => {
            app_state
                .ordering
                .add_song(container, &song_id, auth.user_id(), index)
                .await?;
        }
        AddSongsRequest::Many { song_ids } => {
            app_state
                .ordering
                .add_songs(container, &song_ids, auth.user_id())
                .await?;
        }
    }

    list(app_state, container).await
}

pub(crate) async fn replace(
    app_state: &AppState,
    container: &ContainerRef,
    auth: &AuthenticatedUser,
    req: SongIdsRequest,
) -> Result<Json<Vec<OrderedSong>>> {
    app_state
        .ordering
        .set_songs(container, &req.song_ids, auth.user_id())
        .await?;

    list(app_state, container).await
}

pub(crate) async fn remove(
    app_state: &AppState,
    container: &ContainerRef,
    auth: &AuthenticatedUser,
    req: SongIdsRequest,
) -> Result<Json<Vec<OrderedSong>>> {
    app_state
        .ordering
        .delete_songs(container, &req.song_ids, auth.user_id())
        .await?;

    list(app_state, container).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_request_accepts_single_and_bulk_bodies() {
        let single: AddSongsRequest =
            serde_json::from_str(r#"{ "song_id": "s1", "index": 2 }"#).unwrap();
        assert!(matches!(
            single,
            AddSongsRequest::One { ref song_id, index: Some(2) } if song_id.as_str() == "s1"
        ));

        let append: AddSongsRequest = serde_json::from_str(r#"{ "song_id": "s1" }"#).unwrap();
        assert!(matches!(append, AddSongsRequest::One { index: None, .. }));

        let bulk: AddSongsRequest =
            serde_json::from_str(r#"{ "song_ids": ["s1", "s2"] }"#).unwrap();
        assert!(matches!(bulk, AddSongsRequest::Many { ref song_ids } if song_ids.len() == 2));
    }
}
