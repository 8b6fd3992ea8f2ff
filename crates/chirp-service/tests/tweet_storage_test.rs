//! Tweet storage behaviour over the in-memory cache and a fake store.

mod common;

use chirp_core::{ChirpError, TweetId, UserId};
use chirp_service::{cache_keys, CacheAccessor, CacheAccessorExt, TweetStorage};
use common::{storages, FakeStore, Harness, UnreachableCache};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

fn sorted_ids(tweets: &[chirp_core::Tweet]) -> Vec<TweetId> {
    let mut ids: Vec<_> = tweets.iter().map(|t| t.id).collect();
    ids.sort();
    ids
}

#[tokio::test]
async fn test_insert_returns_hydrated_tweet() {
    let h = Harness::new();
    let alice = h.store.seed_user("alice");

    let tweet = h.tweets.insert_tweet(alice, "hello world").await.unwrap();
    assert_eq!(tweet.content, "hello world");
    assert_eq!(tweet.author.id, alice);
    assert_eq!(tweet.author.username, "alice");
    assert_eq!(tweet.like_count, 0);
    assert!(!tweet.liked);

    let count = h
        .cache
        .get_single::<i64>(&cache_keys::tweet_like_count(tweet.id))
        .await
        .unwrap();
    assert_eq!(count, Some(0));
}

#[tokio::test]
async fn test_insert_for_unknown_author_is_not_found() {
    let h = Harness::new();

    let err = h.tweets.insert_tweet(UserId(42), "orphan").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(h.store.calls("insert_tweet"), 0);
}

#[tokio::test]
async fn test_get_unknown_tweet_is_not_found() {
    let h = Harness::new();
    let err = h.tweets.get_tweet(TweetId(7), None).await.unwrap_err();
    assert!(matches!(err, ChirpError::NotFound { resource_type: "Tweet", .. }));
}

#[tokio::test]
async fn test_warm_tweet_survives_store_outage() {
    let h = Harness::new();
    let alice = h.store.seed_user("alice");
    let bob = h.store.seed_user("bob");
    let tweet = h.store.seed_tweet(alice, "hello");
    h.store.seed_like(tweet, bob);

    let first = h.tweets.get_tweet(tweet, Some(bob)).await.unwrap();
    assert_eq!(first.like_count, 1);
    assert!(first.liked);

    h.store.set_failing(true);
    let calls = h.store.total_calls();
    let second = h.tweets.get_tweet(tweet, Some(bob)).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(h.store.total_calls(), calls);
}

#[tokio::test]
async fn test_cold_read_during_store_outage_is_unexpected() {
    let h = Harness::new();
    let alice = h.store.seed_user("alice");
    let tweet = h.store.seed_tweet(alice, "hello");

    h.store.set_failing(true);
    let err = h.tweets.get_tweet(tweet, None).await.unwrap_err();
    assert!(matches!(err, ChirpError::Unexpected));
}

#[tokio::test]
async fn test_tweet_with_missing_author_is_unexpected() {
    let h = Harness::new();
    let alice = h.store.seed_user("alice");
    let tweet = h.store.seed_tweet(alice, "hello");
    h.store.remove_user(alice);

    let err = h.tweets.get_tweet(tweet, None).await.unwrap_err();
    assert!(matches!(err, ChirpError::Unexpected));
}

#[tokio::test]
async fn test_like_is_idempotent() {
    let h = Harness::new();
    let alice = h.store.seed_user("alice");
    let bob = h.store.seed_user("bob");
    let tweet = h.store.seed_tweet(alice, "hello");

    // Warm the counter so likes update it in place.
    assert_eq!(h.tweets.get_tweet(tweet, None).await.unwrap().like_count, 0);

    h.tweets.like_tweet(tweet, bob).await.unwrap();
    h.tweets.like_tweet(tweet, bob).await.unwrap();

    let seen = h.tweets.get_tweet(tweet, Some(bob)).await.unwrap();
    assert_eq!(seen.like_count, 1);
    assert!(seen.liked);
    assert_eq!(h.store.calls("get_like_count"), 1);
}

#[tokio::test]
async fn test_unlike_never_goes_negative() {
    let h = Harness::new();
    let alice = h.store.seed_user("alice");
    let bob = h.store.seed_user("bob");
    let tweet = h.store.seed_tweet(alice, "hello");

    h.tweets.get_tweet(tweet, None).await.unwrap();
    h.tweets.like_tweet(tweet, bob).await.unwrap();
    h.tweets.unlike_tweet(tweet, bob).await.unwrap();
    h.tweets.unlike_tweet(tweet, bob).await.unwrap();

    let seen = h.tweets.get_tweet(tweet, Some(bob)).await.unwrap();
    assert_eq!(seen.like_count, 0);
    assert!(!seen.liked);
}

#[tokio::test]
async fn test_like_leaves_cold_counter_for_next_read() {
    let h = Harness::new();
    let alice = h.store.seed_user("alice");
    let bob = h.store.seed_user("bob");
    let tweet = h.store.seed_tweet(alice, "hello");

    h.tweets.like_tweet(tweet, bob).await.unwrap();
    assert!(!h
        .cache
        .exists(&cache_keys::tweet_like_count(tweet))
        .await
        .unwrap());

    let seen = h.tweets.get_tweet(tweet, None).await.unwrap();
    assert_eq!(seen.like_count, 1);
}

#[tokio::test]
async fn test_drifted_counter_is_dropped_instead_of_going_negative() {
    let h = Harness::new();
    let alice = h.store.seed_user("alice");
    let bob = h.store.seed_user("bob");
    let tweet = h.store.seed_tweet(alice, "hello");

    h.tweets.get_tweet(tweet, None).await.unwrap();
    // A like the cache never heard about.
    h.store.seed_like(tweet, bob);

    h.tweets.unlike_tweet(tweet, bob).await.unwrap();
    assert!(!h
        .cache
        .exists(&cache_keys::tweet_like_count(tweet))
        .await
        .unwrap());
    assert_eq!(h.tweets.get_tweet(tweet, None).await.unwrap().like_count, 0);
}

#[tokio::test]
async fn test_liked_flag_is_per_viewer() {
    let h = Harness::new();
    let alice = h.store.seed_user("alice");
    let bob = h.store.seed_user("bob");
    let carol = h.store.seed_user("carol");
    let tweet = h.store.seed_tweet(alice, "hello");

    h.tweets.like_tweet(tweet, bob).await.unwrap();

    assert!(h.tweets.get_tweet(tweet, Some(bob)).await.unwrap().liked);
    assert!(!h.tweets.get_tweet(tweet, Some(carol)).await.unwrap().liked);
    assert!(!h.tweets.get_tweet(tweet, None).await.unwrap().liked);

    // Carol's miss must not have touched Bob's flag.
    assert!(h.tweets.get_tweet(tweet, Some(bob)).await.unwrap().liked);
}

#[tokio::test]
async fn test_like_unknown_tweet_is_not_found() {
    let h = Harness::new();
    let bob = h.store.seed_user("bob");

    let err = h.tweets.like_tweet(TweetId(9), bob).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(h.store.calls("like_tweet"), 0);
}

#[tokio::test]
async fn test_batch_skips_unknown_and_repeated_ids() {
    let h = Harness::new();
    let alice = h.store.seed_user("alice");
    let t1 = h.store.seed_tweet(alice, "one");
    let t2 = h.store.seed_tweet(alice, "two");
    let t3 = h.store.seed_tweet(alice, "three");

    h.tweets.get_tweet(t1, None).await.unwrap();

    let tweets = h
        .tweets
        .get_tweets_by_ids(&[t3, t1, t3, TweetId(999), t2], None)
        .await
        .unwrap();
    assert_eq!(sorted_ids(&tweets), vec![t1, t2, t3]);

    // Only the misses reach the store, in a single query.
    assert_eq!(h.store.tweet_batches(), vec![vec![t3, TweetId(999), t2]]);
}

#[tokio::test]
async fn test_empty_batch_touches_nothing() {
    let h = Harness::new();
    let tweets = h.tweets.get_tweets_by_ids(&[], None).await.unwrap();
    assert!(tweets.is_empty());
    assert_eq!(h.store.total_calls(), 0);
}

#[tokio::test]
async fn test_large_batch_is_fully_hydrated() {
    let h = Harness::new();
    let authors: Vec<UserId> = (0..5)
        .map(|i| h.store.seed_user(&format!("author{}", i)))
        .collect();
    let ids: Vec<TweetId> = (0..40)
        .map(|i| {
            let author = authors[i % authors.len()];
            h.store.seed_tweet(author, &format!("tweet {}", i))
        })
        .collect();

    let tweets = h.tweets.get_tweets_by_ids(&ids, Some(authors[0])).await.unwrap();
    assert_eq!(tweets.len(), ids.len());
    for tweet in &tweets {
        let index = (tweet.id.0 - 1) as usize;
        assert_eq!(tweet.author.id, authors[index % authors.len()]);
        assert_eq!(tweet.content, format!("tweet {}", index));
    }
}

#[tokio::test]
async fn test_author_set_tracks_inserts_and_deletes_once_cached() {
    let h = Harness::new();
    let alice = h.store.seed_user("alice");
    let t1 = h.store.seed_tweet(alice, "one");
    let t2 = h.store.seed_tweet(alice, "two");

    let tweets = h.tweets.get_tweets_by_author(alice, None).await.unwrap();
    assert_eq!(sorted_ids(&tweets), vec![t1, t2]);

    let t3 = h.tweets.insert_tweet(alice, "three").await.unwrap().id;
    h.tweets.delete_tweet(t1).await.unwrap();

    let tweets = h.tweets.get_tweets_by_author(alice, None).await.unwrap();
    assert_eq!(sorted_ids(&tweets), vec![t2, t3]);
    assert_eq!(h.store.calls("get_tweet_ids_by_author_id"), 1);
}

#[tokio::test]
async fn test_insert_does_not_seed_cold_author_set() {
    let h = Harness::new();
    let alice = h.store.seed_user("alice");
    let t1 = h.store.seed_tweet(alice, "one");

    let t2 = h.tweets.insert_tweet(alice, "two").await.unwrap().id;
    assert!(!h
        .cache
        .exists(&cache_keys::user_tweet_ids(alice))
        .await
        .unwrap());

    let tweets = h.tweets.get_tweets_by_author(alice, None).await.unwrap();
    assert_eq!(sorted_ids(&tweets), vec![t1, t2]);
}

#[tokio::test]
async fn test_delete_clears_tweet() {
    let h = Harness::new();
    let alice = h.store.seed_user("alice");
    let tweet = h.tweets.insert_tweet(alice, "bye").await.unwrap().id;

    h.tweets.delete_tweet(tweet).await.unwrap();

    assert!(!h.cache.exists(&cache_keys::tweet(tweet)).await.unwrap());
    assert!(!h
        .cache
        .exists(&cache_keys::tweet_like_count(tweet))
        .await
        .unwrap());
    assert!(h.tweets.get_tweet(tweet, None).await.unwrap_err().is_not_found());
    assert!(h.tweets.delete_tweet(tweet).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_search_results_are_cached_with_short_ttl() {
    let h = Harness::new();
    let alice = h.store.seed_user("alice");
    let t1 = h.store.seed_tweet(alice, "Rust is great");
    h.store.seed_tweet(alice, "coffee time");
    let t3 = h.store.seed_tweet(alice, "more rust");

    let found = h.tweets.search_tweets("rust", None).await.unwrap();
    assert_eq!(sorted_ids(&found), vec![t1, t3]);

    let ttl = h.cache.ttl(&cache_keys::search("tweet", "rust")).unwrap();
    assert!(ttl <= Duration::from_secs(60));

    h.store.set_failing(true);
    let again = h.tweets.search_tweets("rust", None).await.unwrap();
    assert_eq!(sorted_ids(&again), vec![t1, t3]);
    assert_eq!(h.store.calls("get_tweets_ids"), 1);
}

#[tokio::test]
async fn test_identity_entries_expire_but_counters_do_not() {
    let h = Harness::new();
    let alice = h.store.seed_user("alice");
    let bob = h.store.seed_user("bob");
    let tweet = h.store.seed_tweet(alice, "hello");

    h.tweets.get_tweet(tweet, Some(bob)).await.unwrap();

    let ttl = h.cache.ttl(&cache_keys::tweet(tweet)).unwrap();
    assert!(ttl <= Duration::from_secs(300) && ttl > Duration::from_secs(60));
    assert!(h.cache.ttl(&cache_keys::user(alice)).is_some());

    for key in [
        cache_keys::tweet_like_count(tweet),
        cache_keys::tweet_liked(tweet, bob),
        cache_keys::user_follower_count(alice),
    ] {
        assert!(h.cache.exists(&key).await.unwrap(), "{} should be cached", key);
        assert!(h.cache.ttl(&key).is_none(), "{} should not expire", key);
    }
}

#[tokio::test]
async fn test_concurrent_likes_are_all_counted() {
    let h = Harness::new();
    let alice = h.store.seed_user("alice");
    let tweet = h.store.seed_tweet(alice, "popular");
    let fans: Vec<UserId> = (0..20)
        .map(|i| h.store.seed_user(&format!("fan{}", i)))
        .collect();

    h.tweets.get_tweet(tweet, None).await.unwrap();

    let tasks = fans.iter().map(|fan| {
        let tweets = h.tweets.clone();
        let fan = *fan;
        tokio::spawn(async move { tweets.like_tweet(tweet, fan).await })
    });
    for result in join_all(tasks).await {
        result.unwrap().unwrap();
    }

    let seen = h.tweets.get_tweet(tweet, None).await.unwrap();
    assert_eq!(seen.like_count, fans.len() as i64);
}

#[tokio::test]
async fn test_unreachable_cache_falls_back_to_store() {
    let store = FakeStore::new();
    let (_users, tweets) = storages(&store, Arc::new(UnreachableCache));
    let alice = store.seed_user("alice");
    let bob = store.seed_user("bob");

    let tweet = tweets.insert_tweet(alice, "still works").await.unwrap();
    tweets.like_tweet(tweet.id, bob).await.unwrap();

    let seen = tweets.get_tweet(tweet.id, Some(bob)).await.unwrap();
    assert_eq!(seen.like_count, 1);
    assert!(seen.liked);

    let listed = tweets.get_tweets_by_author(alice, None).await.unwrap();
    assert_eq!(listed.len(), 1);
    tweets.delete_tweet(tweet.id).await.unwrap();
}
