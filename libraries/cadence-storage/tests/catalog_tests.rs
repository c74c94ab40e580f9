//! Integration tests for the catalog slices
//!
//! Tests users, songs, albums, playlists and likes:
//! - CRUD with user ownership
//! - Album deletion releases its songs
//! - Song deletion leaves containers ordered
//! - Likes are idempotent and listed most recent first


use cadence_core::ordering::is_strictly_ordered;
use cadence_core::*;
use std::time::Duration;
use test_helpers::*;

// ===== Users =====

#[tokio::test]
async fn test_create_and_get_user() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let user = cadence_storage::users::create(
        pool,
        CreateUser {
            username: "alice".to_string(),
        },
    )
    .await
    .unwrap();

    let fetched = cadence_storage::users::get_by_id(pool, &user.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched, user);

    let missing = cadence_storage::users::get_by_id(pool, &UserId::new("nobody"))
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_duplicate_username_conflicts() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    create_test_user(pool, "alice").await;
    let err = cadence_storage::users::create(
        pool,
        CreateUser {
            username: "alice".to_string(),
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CadenceError::Conflict(_)), "{err:?}");
}

#[tokio::test]
async fn test_list_users_by_name() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    create_test_user(pool, "carol").await;
    create_test_user(pool, "alice").await;
    create_test_user(pool, "bob").await;

    let names: Vec<String> = cadence_storage::users::get_all(pool)
        .await
        .unwrap()
        .into_iter()
        .map(|user| user.username)
        .collect();
    assert_eq!(names, vec!["alice", "bob", "carol"]);
}

// ===== Songs =====

#[tokio::test]
async fn test_create_song_without_album() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let owner = create_test_user(pool, "owner").await;
    let song = cadence_storage::songs::create(
        pool,
        CreateSong {
            owner_id: owner.clone(),
            title: "Intro".to_string(),
            duration_seconds: Some(61.5),
        },
    )
    .await
    .unwrap();

    assert_eq!(song.owner_id, owner);
    assert_eq!(song.title, "Intro");
    assert_eq!(song.duration_seconds, Some(61.5));
    assert!(song.album_id.is_none());
}

#[tokio::test]
async fn test_delete_song_checks_owner_and_leaves_order_intact() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();
    let ordering = test_db.ordering();

    let owner = create_test_user(pool, "owner").await;
    let other = create_test_user(pool, "other").await;
    let album = create_test_album(pool, &owner, "Album").await;
    let playlist = create_test_playlist(pool, &owner, "Playlist").await;
    let songs = create_test_songs(pool, &owner, &["A", "B", "C"]).await;
    ordering.add_songs(&album, &songs, &owner).await.unwrap();
    ordering.add_songs(&playlist, &songs, &owner).await.unwrap();

    let err = cadence_storage::songs::delete(pool, &songs[1], &other)
        .await
        .unwrap_err();
    assert!(matches!(err, CadenceError::PermissionDenied));

    cadence_storage::songs::delete(pool, &songs[1], &owner)
        .await
        .unwrap();

    for container in [&album, &playlist] {
        assert_eq!(title_order(&ordering, container).await, vec!["A", "C"]);
        assert!(is_strictly_ordered(&key_order(&ordering, container).await));
    }

    // Gaps left by the deleted song do not block appends
    let song = create_test_song(pool, &owner, "D").await;
    ordering.add_song(&album, &song, &owner, Some(1)).await.unwrap();
    assert_eq!(title_order(&ordering, &album).await, vec!["A", "D", "C"]);

    let err = cadence_storage::songs::delete(pool, &songs[1], &owner)
        .await
        .unwrap_err();
    assert!(matches!(err, CadenceError::NotFound { .. }));
}

// ===== Albums =====

#[tokio::test]
async fn test_album_with_songs() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();
    let ordering = test_db.ordering();

    let owner = create_test_user(pool, "owner").await;
    let album = create_test_album(pool, &owner, "Full").await;
    let songs = create_test_songs(pool, &owner, &["A", "B"]).await;
    ordering.add_songs(&album, &songs, &owner).await.unwrap();

    let ContainerRef::Album(album_id) = &album else {
        unreachable!()
    };
    let fetched = cadence_storage::albums::get_with_songs(pool, album_id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(fetched.title, "Full");
    let listed = fetched.songs.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].song_id, songs[0]);
    assert_eq!(listed[1].index, 1);

    let song = cadence_storage::songs::get_by_id(pool, &songs[0])
        .await
        .unwrap()
        .unwrap();
    assert_eq!(song.album_id.as_ref(), Some(album_id));
}

#[tokio::test]
async fn test_list_albums_by_owner() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let alice = create_test_user(pool, "alice").await;
    let bob = create_test_user(pool, "bob").await;
    create_test_album(pool, &alice, "A1").await;
    create_test_album(pool, &alice, "A2").await;
    create_test_album(pool, &bob, "B1").await;

    let albums = cadence_storage::albums::list_by_owner(pool, &alice)
        .await
        .unwrap();
    assert_eq!(albums.len(), 2);
    assert!(albums.iter().all(|album| album.owner_id == alice));
}

#[tokio::test]
async fn test_delete_album_releases_songs() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();
    let ordering = test_db.ordering();

    let owner = create_test_user(pool, "owner").await;
    let other = create_test_user(pool, "other").await;
    let album = create_test_album(pool, &owner, "Doomed").await;
    let songs = create_test_songs(pool, &owner, &["A", "B"]).await;
    ordering.add_songs(&album, &songs, &owner).await.unwrap();

    let ContainerRef::Album(album_id) = &album else {
        unreachable!()
    };

    let err = cadence_storage::albums::delete(pool, album_id, &other)
        .await
        .unwrap_err();
    assert!(matches!(err, CadenceError::PermissionDenied));

    cadence_storage::albums::delete(pool, album_id, &owner)
        .await
        .unwrap();
    assert!(cadence_storage::albums::get_by_id(pool, album_id)
        .await
        .unwrap()
        .is_none());

    // Songs survive and can join a new album
    let next = create_test_album(pool, &owner, "Next").await;
    ordering.add_songs(&next, &songs, &owner).await.unwrap();
    assert_eq!(song_order(&ordering, &next).await, songs);
}

// ===== Playlists =====

#[tokio::test]
async fn test_create_and_get_playlist() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let owner = create_test_user(pool, "owner").await;
    let playlist = cadence_storage::playlists::create(
        pool,
        CreatePlaylist {
            owner_id: owner.clone(),
            name: "Road Trip".to_string(),
            description: Some("Long drives".to_string()),
            is_public: true,
        },
    )
    .await
    .unwrap();

    assert_eq!(playlist.name, "Road Trip");
    assert_eq!(playlist.description.as_deref(), Some("Long drives"));
    assert!(playlist.is_public);
    assert!(playlist.songs.is_none());

    let fetched = cadence_storage::playlists::get_with_songs(pool, &playlist.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched.owner_id, owner);
    assert_eq!(fetched.songs, Some(Vec::new()));
}

#[tokio::test]
async fn test_delete_playlist_cascades_memberships() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();
    let ordering = test_db.ordering();

    let owner = create_test_user(pool, "owner").await;
    let playlist = create_test_playlist(pool, &owner, "Temp").await;
    let songs = create_test_songs(pool, &owner, &["A", "B"]).await;
    ordering.add_songs(&playlist, &songs, &owner).await.unwrap();

    let ContainerRef::Playlist(playlist_id) = &playlist else {
        unreachable!()
    };
    cadence_storage::playlists::delete(pool, playlist_id, &owner)
        .await
        .unwrap();

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM playlist_songs")
        .fetch_one(pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);

    let err = ordering.list_songs(&playlist).await.unwrap_err();
    assert!(matches!(err, CadenceError::NotFound { .. }));
}

// ===== Likes =====

#[tokio::test]
async fn test_like_is_idempotent() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let user = create_test_user(pool, "fan").await;
    let song = create_test_song(pool, &user, "Hit").await;

    cadence_storage::likes::like_song(pool, &user, &song).await.unwrap();
    cadence_storage::likes::like_song(pool, &user, &song).await.unwrap();
    assert_eq!(cadence_storage::likes::like_count(pool, &song).await.unwrap(), 1);

    assert!(cadence_storage::likes::unlike_song(pool, &user, &song).await.unwrap());
    assert!(!cadence_storage::likes::unlike_song(pool, &user, &song).await.unwrap());
    assert_eq!(cadence_storage::likes::like_count(pool, &song).await.unwrap(), 0);
}

#[tokio::test]
async fn test_like_missing_song_is_not_found() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let user = create_test_user(pool, "fan").await;
    let err = cadence_storage::likes::like_song(pool, &user, &SongId::new("ghost"))
        .await
        .unwrap_err();
    assert!(matches!(err, CadenceError::NotFound { .. }));
}

#[tokio::test]
async fn test_liked_songs_most_recent_first() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let user = create_test_user(pool, "fan").await;
    let songs = create_test_songs(pool, &user, &["first", "second", "third"]).await;

    for song in &songs {
        cadence_storage::likes::like_song(pool, &user, song).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let titles: Vec<String> = cadence_storage::likes::liked_songs(pool, &user)
        .await
        .unwrap()
        .into_iter()
        .map(|song| song.title)
        .collect();
    assert_eq!(titles, vec!["third", "second", "first"]);
}
