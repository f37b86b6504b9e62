//! Concurrent access through a shared store

use std::sync::Arc;
use std::thread;

use moviepoll_core::{DataConnector, Movie, MovieId, Store, User, UserId};
use tempfile::TempDir;

#[test]
fn concurrent_votes_are_all_recorded() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("data.json");
    let store = Arc::new(Store::open_path(&path).unwrap());

    // Each user votes for a movie of their own
    let ballots: Vec<(UserId, MovieId)> = (0..8)
        .map(|i| {
            let user = store.add_user(&User::new(format!("user{i}"), "hash")).unwrap();
            let movie = store.add_movie(&Movie::new(format!("Movie {i}"))).unwrap();
            (user, movie)
        })
        .collect();

    let handles: Vec<_> = ballots
        .iter()
        .map(|&(user, movie)| {
            let store = Arc::clone(&store);
            thread::spawn(move || store.add_vote(user, movie).unwrap())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for &(user, movie) in &ballots {
        let voted: Vec<_> = store.get_user_votes(user).iter().map(|m| m.id).collect();
        assert_eq!(voted, vec![movie]);
    }
    assert_eq!(store.stats().votes, ballots.len());

    drop(store);
    let reopened = Store::open_path(&path).unwrap();
    for &(user, movie) in &ballots {
        assert!(reopened.user_voted_for_movie(user, movie));
    }
}

#[test]
fn concurrent_inserts_get_distinct_ids() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(Store::open_path(temp_dir.path().join("data.json")).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                (0..5)
                    .map(|i| store.add_movie(&Movie::new(format!("Movie {t}-{i}"))).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut ids: Vec<_> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    ids.sort_unstable();
    ids.dedup();

    assert_eq!(ids.len(), 20);
    assert_eq!(store.get_active_movies().len(), 20);
}

#[test]
fn readers_run_alongside_writers() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(Store::open_path(temp_dir.path().join("data.json")).unwrap());

    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for i in 0..10 {
                store.add_user(&User::new(format!("user{i}"), "hash")).unwrap();
            }
        })
    };

    let reader = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            let mut last = 0;
            for _ in 0..50 {
                let count = store.get_user_count();
                assert!(count >= last);
                assert_eq!(store.get_users(0, usize::MAX).len(), count);
                last = count;
            }
        })
    };

    writer.join().unwrap();
    reader.join().unwrap();
    assert_eq!(store.get_user_count(), 10);
}
