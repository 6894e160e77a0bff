//! Store integration tests
//!
//! Exercise the SQLite store end to end: file creation, the one-row-per-pair
//! upsert, live aggregation, the like counter and concurrent writers on a
//! file-backed pool.

use mboard_common::db::{self, boards, lists, ratings, reviews};
use mboard_common::models::{
    BoardType, NewBoard, NewBoardItem, NewList, NewListItem, RatingContext, TargetType,
};
use mboard_common::{Error, ValidationError};

#[tokio::test]
async fn test_database_file_created_and_reopened() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("musicboard.db");

    let pool = db::init_database(&db_path).await.unwrap();
    assert!(db_path.exists(), "Database file was not created");

    ratings::upsert_rating(&pool, "u1", "alb", TargetType::Album, 4.0, &RatingContext::default())
        .await
        .unwrap();
    pool.close().await;

    // Second open must keep existing rows
    let pool = db::init_database(&db_path).await.unwrap();
    let rows = ratings::ratings_for_target(&pool, "alb", TargetType::Album).await.unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn test_three_users_rate_an_album() {
    let pool = db::init_memory_database().await.unwrap();
    let ctx = RatingContext {
        album_name: Some("In Rainbows".into()),
        artist_name: Some("Radiohead".into()),
        image_url: None,
    };

    for (user, value) in [("a", 4.0), ("b", 5.0), ("c", 3.0)] {
        ratings::upsert_rating(&pool, user, "album-1", TargetType::Album, value, &ctx)
            .await
            .unwrap();
    }

    let summary = ratings::target_summary(&pool, "album-1", TargetType::Album, Some("b"))
        .await
        .unwrap();

    assert_eq!(summary.count, 3);
    assert_eq!(summary.average, 4.0);
    assert_eq!(summary.average_display(), "4.0");
    assert_eq!(summary.user_rating, 5.0);
    assert_eq!(summary.distribution, [0, 0, 0, 0, 0, 1, 0, 1, 0, 1]);
}

#[tokio::test]
async fn test_rerating_is_idempotent() {
    let pool = db::init_memory_database().await.unwrap();
    let ctx = RatingContext::default();

    ratings::upsert_rating(&pool, "u1", "t1", TargetType::Track, 2.5, &ctx).await.unwrap();
    ratings::upsert_rating(&pool, "u1", "t1", TargetType::Track, 2.5, &ctx).await.unwrap();

    let summary = ratings::target_summary(&pool, "t1", TargetType::Track, None).await.unwrap();
    assert_eq!(summary.count, 1);
    assert_eq!(summary.average, 2.5);

    assert_eq!(ratings::user_rating(&pool, "u1", "t1").await.unwrap(), Some(2.5));
    assert_eq!(ratings::user_rating(&pool, "u2", "t1").await.unwrap(), None);
}

#[tokio::test]
async fn test_unrated_target_summary_is_empty() {
    let pool = db::init_memory_database().await.unwrap();

    let summary =
        ratings::target_summary(&pool, "nobody-rated-this", TargetType::Album, Some("u1"))
            .await
            .unwrap();
    assert_eq!(summary.count, 0);
    assert_eq!(summary.average, 0.0);
    assert_eq!(summary.user_rating, 0.0);
}

#[tokio::test]
async fn test_recent_ratings_newest_first() {
    let pool = db::init_memory_database().await.unwrap();
    let ctx = RatingContext::default();

    for target in ["first", "second", "third"] {
        ratings::upsert_rating(&pool, "u1", target, TargetType::Album, 3.0, &ctx)
            .await
            .unwrap();
    }

    let recent = ratings::recent_ratings(&pool, "u1", 2).await.unwrap();
    let ids: Vec<&str> = recent.iter().map(|r| r.target_id.as_str()).collect();
    assert_eq!(ids, vec!["third", "second"]);
}

#[tokio::test]
async fn test_nine_char_review_never_stored() {
    let pool = db::init_memory_database().await.unwrap();

    let err = reviews::upsert_review(&pool, "u1", "alb", Some(4.0), "123456789")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(ValidationError::ReviewTooShort(9))));
    assert!(reviews::reviews_for_target(&pool, "alb").await.unwrap().is_empty());

    reviews::upsert_review(&pool, "u1", "alb", Some(4.0), "1234567890")
        .await
        .unwrap();
    assert_eq!(reviews::reviews_for_target(&pool, "alb").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_like_toggle_across_users() {
    let pool = db::init_memory_database().await.unwrap();
    let board = boards::create_board(
        &pool,
        "owner",
        &NewBoard {
            title: "Late night jazz".into(),
            board_type: BoardType::Mixed,
            description: Some("For 2am".into()),
            is_public: true,
        },
    )
    .await
    .unwrap();

    for user in ["a", "b", "c"] {
        boards::like_board(&pool, &board.id, user).await.unwrap();
    }
    let count = boards::unlike_board(&pool, &board.id, "b").await.unwrap();
    assert_eq!(count, 2);

    let stored = boards::get_board(&pool, &board.id).await.unwrap();
    assert_eq!(stored.likes_count, 2);
}

fn public_board(title: &str) -> NewBoard {
    NewBoard {
        title: title.into(),
        board_type: BoardType::Album,
        description: None,
        is_public: true,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_likes_all_succeed() {
    let dir = tempfile::tempdir().unwrap();
    let pool = db::init_database(&dir.path().join("musicboard.db")).await.unwrap();
    let board = boards::create_board(&pool, "owner", &public_board("Popular"))
        .await
        .unwrap();

    let handles: Vec<_> = (0..40)
        .map(|i| {
            let pool = pool.clone();
            let board_id = board.id.clone();
            tokio::spawn(async move {
                boards::like_board(&pool, &board_id, &format!("user-{}", i)).await
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let stored = boards::get_board(&pool, &board.id).await.unwrap();
    assert_eq!(stored.likes_count, 40);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_item_appends_get_distinct_positions() {
    let dir = tempfile::tempdir().unwrap();
    let pool = db::init_database(&dir.path().join("musicboard.db")).await.unwrap();
    let board = boards::create_board(&pool, "owner", &public_board("Crate digging"))
        .await
        .unwrap();
    let list = lists::create_list(
        &pool,
        "owner",
        &NewList {
            title: "Desert island".into(),
            description: None,
            story: None,
            genre: None,
            is_public: true,
        },
    )
    .await
    .unwrap();

    let mut handles = Vec::new();
    for i in 0..20 {
        let pool = pool.clone();
        let board_id = board.id.clone();
        let list_id = list.id.clone();
        handles.push(tokio::spawn(async move {
            let board_item = NewBoardItem {
                title: format!("Album {}", i),
                artist: None,
                image_url: None,
                external_id: format!("alb-{}", i),
            };
            let list_item = NewListItem {
                album_title: format!("Album {}", i),
                artist: "Various".into(),
                genre: None,
                emoji: None,
            };
            boards::add_board_item(&pool, "owner", &board_id, &board_item).await?;
            lists::add_list_item(&pool, "owner", &list_id, &list_item).await
        }));
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let mut board_positions: Vec<i64> = boards::board_items(&pool, &board.id)
        .await
        .unwrap()
        .iter()
        .map(|item| item.position)
        .collect();
    board_positions.sort_unstable();
    assert_eq!(board_positions, (0..20).collect::<Vec<i64>>());

    let list_positions: Vec<i64> = lists::list_items(&pool, &list.id)
        .await
        .unwrap()
        .iter()
        .map(|item| item.position)
        .collect();
    assert_eq!(list_positions, (0..20).collect::<Vec<i64>>());
}
