//! # Stream Grouping Test Suite
//!
//! Covers grouping by streams of keys: one-to-many and one-to-none records,
//! duplicate emissions, spawned producers, failures, the one-producer-at-a-time
//! discipline, and the blocking entry points.

use crate::error::GroupByError;
use crate::grouper::Grouper;
use crate::producer::{spawn_keys, KeySender};
use crate::stream::{
  group_by_stream, group_by_stream_blocking, try_group_by_stream, try_group_by_stream_blocking,
};
use futures::stream;
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
struct Row {
  a: &'static str,
  d: Vec<i32>,
}

fn rows() -> Vec<Row> {
  vec![
    Row { a: "a", d: vec![0, 4] },
    Row { a: "a", d: vec![0, 1] },
    Row { a: "b", d: vec![0, 1, 2] },
    Row { a: "b", d: vec![1, 2, 3] },
    Row { a: "c", d: vec![1, 2, 3, 4] },
    Row { a: "z", d: vec![] },
  ]
}

#[tokio::test]
async fn test_group_by_stream_values() {
  let a = rows();
  let grouped = group_by_stream(a.clone(), |r: &Row| stream::iter(r.d.clone())).await;

  assert_eq!(grouped.len(), 5);
  assert_eq!(grouped.get(&0), Some(&[a[0].clone(), a[1].clone(), a[2].clone()][..]));
  assert_eq!(
    grouped.get(&1),
    Some(&[a[1].clone(), a[2].clone(), a[3].clone(), a[4].clone()][..])
  );
  assert_eq!(grouped.get(&2), Some(&[a[2].clone(), a[3].clone(), a[4].clone()][..]));
  assert_eq!(grouped.get(&3), Some(&[a[3].clone(), a[4].clone()][..]));
  assert_eq!(grouped.get(&4), Some(&[a[0].clone(), a[4].clone()][..]));
}

#[tokio::test]
async fn test_group_by_stream_references_with_spawned_producers() {
  let a = rows();
  let grouped = try_group_by_stream(&a, |r: &Row| {
    let keys = r.d.clone();
    spawn_keys(move |tx: KeySender<i32>| async move {
      for key in keys {
        tx.send(key).await?;
      }
      Ok::<_, GroupByError>(())
    })
  })
  .await
  .unwrap();

  assert_eq!(grouped.len(), 5);
  let zero = grouped.get(&0).unwrap();
  assert_eq!(zero.len(), 3);
  for (record, original) in zero.iter().zip(&a[0..3]) {
    assert!(std::ptr::eq(*record, original));
  }
  let four = grouped.get(&4).unwrap();
  assert!(std::ptr::eq(four[0], &a[0]));
  assert!(std::ptr::eq(four[1], &a[4]));
}

#[tokio::test]
async fn test_group_by_stream_two_record_example() {
  let a = vec![Row { a: "r0", d: vec![0, 4] }, Row { a: "r1", d: vec![0, 1] }];
  let grouped = group_by_stream(&a, |r: &Row| stream::iter(r.d.clone())).await;

  let names = |key: i32| {
    grouped
      .get(&key)
      .map(|g| g.iter().map(|r| r.a).collect::<Vec<_>>())
  };
  assert_eq!(names(0), Some(vec!["r0", "r1"]));
  assert_eq!(names(4), Some(vec!["r0"]));
  assert_eq!(names(1), Some(vec!["r1"]));
  assert_eq!(grouped.total_records(), 4);
}

#[tokio::test]
async fn test_group_by_stream_no_keys_means_no_groups() {
  let a = rows();
  let grouped = group_by_stream(&a, |r: &Row| stream::iter(r.d.clone())).await;

  for (_, group) in grouped.iter() {
    assert!(group.iter().all(|r| r.a != "z"));
  }

  let none = group_by_stream(&a, |_: &Row| stream::empty::<i32>()).await;
  assert!(none.is_empty());
}

#[tokio::test]
async fn test_group_by_stream_duplicate_keys() {
  let a = vec![Row { a: "dup", d: vec![7, 7] }, Row { a: "once", d: vec![7] }];
  let grouped = group_by_stream(&a, |r: &Row| stream::iter(r.d.clone())).await;

  let seven = grouped.get(&7).unwrap();
  assert_eq!(
    seven.iter().map(|r| r.a).collect::<Vec<_>>(),
    vec!["dup", "dup", "once"]
  );
}

#[tokio::test]
async fn test_group_by_stream_emission_order_within_record() {
  let a = vec![Row { a: "x", d: vec![2, 1, 2] }, Row { a: "y", d: vec![1, 2] }];
  let indexed = a.iter().enumerate().collect::<Vec<_>>();
  let grouped = group_by_stream(indexed, |(_, r): &(usize, &Row)| stream::iter(r.d.clone())).await;

  let two = grouped
    .get(&2)
    .unwrap()
    .iter()
    .map(|(i, _)| *i)
    .collect::<Vec<_>>();
  assert_eq!(two, vec![0, 0, 1]);
}

#[tokio::test]
async fn test_try_group_by_stream_stream_error() {
  let a = rows();
  let mut calls = 0;
  let result = try_group_by_stream(&a, |r: &Row| {
    calls += 1;
    let keys = r
      .d
      .iter()
      .map(|k| {
        if *k == 3 {
          Err(format!("key {} rejected", k))
        } else {
          Ok(*k)
        }
      })
      .collect::<Vec<_>>();
    stream::iter(keys)
  })
  .await;

  assert_eq!(calls, 4);
  match result {
    Err(GroupByError::KeyFunction(source)) => assert_eq!(source.to_string(), "key 3 rejected"),
    other => panic!("expected KeyFunction, got {:?}", other.map(|g| g.len())),
  }
}

#[tokio::test]
async fn test_try_group_by_stream_producer_error() {
  let a = rows();
  let result = try_group_by_stream(&a, |r: &Row| {
    let fail = r.a == "b";
    spawn_keys(move |tx: KeySender<i32>| async move {
      tx.send(1).await?;
      if fail {
        return Err(GroupByError::key_function("producer gave up"));
      }
      Ok::<_, GroupByError>(())
    })
  })
  .await;

  match result {
    Err(error) => {
      assert!(error.is_key_function());
      assert_eq!(error.to_string(), "key function failed: producer gave up");
    }
    Ok(_) => panic!("expected an error"),
  }
}

#[tokio::test]
async fn test_try_group_by_stream_producer_panic() {
  let a = rows();
  let result = try_group_by_stream(&a[..1], |_: &Row| {
    spawn_keys(|tx: KeySender<i32>| async move {
      if tx.is_closed() {
        return Ok::<_, GroupByError>(());
      }
      panic!("producer crashed")
    })
  })
  .await;

  assert!(matches!(result, Err(GroupByError::KeyFunction(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_group_by_stream_one_producer_at_a_time() {
  let active = Arc::new(AtomicUsize::new(0));
  let peak = Arc::new(AtomicUsize::new(0));
  let a = rows();

  let grouped = try_group_by_stream(&a, |r: &Row| {
    let keys = r.d.clone();
    let active = active.clone();
    let peak = peak.clone();
    spawn_keys(move |tx: KeySender<i32>| async move {
      let now = active.fetch_add(1, Ordering::SeqCst) + 1;
      peak.fetch_max(now, Ordering::SeqCst);
      for key in keys {
        tx.send(key).await?;
        tokio::task::yield_now().await;
      }
      active.fetch_sub(1, Ordering::SeqCst);
      Ok::<_, GroupByError>(())
    })
  })
  .await
  .unwrap();

  assert_eq!(grouped.total_records(), 14);
  assert_eq!(peak.load(Ordering::SeqCst), 1);
  assert_eq!(active.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_grouper_spawn_keys_small_channel() {
  let grouper = Grouper::default()
    .with_name("tiny".to_string())
    .with_key_channel_capacity(0);
  let values = vec![10u32, 25, 7];

  let grouped = grouper
    .try_by_stream(&values, |v: &u32| {
      let v = *v;
      grouper.spawn_keys(move |tx: KeySender<u32>| async move {
        for divisor in 1..=v {
          if v % divisor == 0 {
            tx.send(divisor).await?;
          }
        }
        Ok::<_, GroupByError>(())
      })
    })
    .await
    .unwrap();

  assert_eq!(grouped.get(&1).map(<[_]>::len), Some(3));
  assert_eq!(grouped.get(&5), Some(&[&10, &25][..]));
  assert_eq!(grouped.get(&7), Some(&[&7][..]));
}

#[test]
fn test_group_by_stream_blocking() {
  let a = rows();
  let grouped = group_by_stream_blocking(&a, |r: &Row| stream::iter(r.d.clone())).unwrap();

  assert_eq!(grouped.total_records(), 14);
}

#[test]
fn test_try_group_by_stream_blocking_with_spawned_producers() {
  let a = rows();
  let grouped = try_group_by_stream_blocking(&a, |r: &Row| {
    let first = r.d.first().copied();
    spawn_keys(move |tx: KeySender<i32>| async move {
      if let Some(key) = first {
        tx.send(key).await?;
      }
      Ok::<_, GroupByError>(())
    })
  })
  .unwrap();

  assert_eq!(grouped.get(&0).map(<[_]>::len), Some(3));
  assert_eq!(grouped.get(&1).map(<[_]>::len), Some(2));
  assert_eq!(grouped.total_records(), 5);
}

#[test]
fn test_try_group_by_stream_blocking_error() {
  let a = rows();
  let result = try_group_by_stream_blocking(&a, |_: &Row| {
    stream::iter(vec![Err::<i32, _>("nope")])
  });

  assert!(matches!(result, Err(GroupByError::KeyFunction(_))));
}

proptest! {
  #[test]
  fn test_group_by_stream_completeness(
    emissions in prop::collection::vec(prop::collection::vec(0u8..6, 0..5), 0..16)
  ) {
    let grouped = tokio_test::block_on(group_by_stream(
      &emissions,
      |keys: &Vec<u8>| stream::iter(keys.clone()),
    ));
    let expected = emissions.iter().map(Vec::len).sum::<usize>();

    prop_assert_eq!(grouped.total_records(), expected);
  }

  #[test]
  fn test_group_by_stream_stable_merge(
    emissions in prop::collection::vec(prop::collection::vec(0u8..4, 0..5), 0..16)
  ) {
    let indexed = emissions.iter().enumerate().collect::<Vec<_>>();
    let grouped = tokio_test::block_on(group_by_stream(
      indexed,
      |(_, keys): &(usize, &Vec<u8>)| stream::iter((*keys).clone()),
    ));

    for (key, group) in grouped.iter() {
      prop_assert!(group.windows(2).all(|w| w[0].0 <= w[1].0));
      let expected = emissions
        .iter()
        .map(|keys| keys.iter().filter(|k| *k == key).count())
        .sum::<usize>();
      prop_assert_eq!(group.len(), expected);
    }
  }
}
