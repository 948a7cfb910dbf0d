use futures::stream;
use groupweave::{
  group_by_field, group_by_func, group_by_stream, spawn_keys, try_group_by_stream, FieldKey,
  GroupByError, GroupMap, Grouper, KeySender,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
struct T {
  a: String,
  b: String,
  c: i32,
  d: Vec<i32>,
}

fn t(a: &str, b: &str, c: i32, d: &[i32]) -> T {
  T {
    a: a.to_string(),
    b: b.to_string(),
    c,
    d: d.to_vec(),
  }
}

fn flat() -> Vec<T> {
  vec![
    t("a", "b", 0, &[]),
    t("a", "c", 1, &[]),
    t("b", "b", 1, &[]),
    t("b", "d", 3, &[]),
    t("c", "x", 3, &[]),
  ]
}

fn tagged() -> Vec<T> {
  vec![
    t("a", "b", 0, &[0, 4]),
    t("a", "c", 1, &[0, 1]),
    t("b", "b", 1, &[0, 1, 2]),
    t("b", "d", 3, &[1, 2, 3]),
    t("c", "x", 3, &[1, 2, 3, 4]),
    t("z", "z", 0, &[]),
  ]
}

/// Maps each group to the input positions of its records.
fn positions<K, E>(groups: GroupMap<K, E>, input: &[T], pick: impl Fn(&E) -> &T) -> HashMap<K, Vec<usize>>
where
  K: std::hash::Hash + Eq,
{
  groups
    .into_iter()
    .map(|(key, records)| {
      let idx = records
        .iter()
        .map(|r| {
          input
            .iter()
            .position(|candidate| std::ptr::eq(candidate, pick(r)))
            .unwrap()
        })
        .collect();
      (key, idx)
    })
    .collect()
}

#[test]
fn field_grouping_by_value_and_by_reference() {
  let a = flat();

  let by_value = group_by_field(a.clone(), "B").unwrap();
  assert_eq!(by_value.len(), 4);
  assert_eq!(
    by_value.get(&FieldKey::from("b")),
    Some(&[a[0].clone(), a[2].clone()][..])
  );
  assert_eq!(by_value.get(&FieldKey::from("x")), Some(&[a[4].clone()][..]));

  let by_ref = group_by_field(&a, "B").unwrap();
  let idx = positions(by_ref, &a, |r| *r);
  assert_eq!(idx[&FieldKey::from("b")], vec![0, 2]);
  assert_eq!(idx[&FieldKey::from("c")], vec![1]);
  assert_eq!(idx[&FieldKey::from("d")], vec![3]);
  assert_eq!(idx[&FieldKey::from("x")], vec![4]);
}

#[test]
fn field_grouping_missing_field_returns_no_map() {
  let a = flat();

  assert!(matches!(
    group_by_field(&a, "Missing"),
    Err(GroupByError::InvalidField { .. })
  ));
}

#[test]
fn func_grouping_by_value_and_by_reference() {
  let a = flat();

  let by_value = group_by_func(a.clone(), |r: &T| r.c * 2);
  assert_eq!(by_value.len(), 3);
  assert_eq!(by_value.get(&6), Some(&[a[3].clone(), a[4].clone()][..]));

  let by_ref = group_by_func(&a, |r: &T| r.c * 2);
  let idx = positions(by_ref, &a, |r| *r);
  assert_eq!(idx[&0], vec![0]);
  assert_eq!(idx[&2], vec![1, 2]);
  assert_eq!(idx[&6], vec![3, 4]);
}

#[tokio::test]
async fn stream_grouping_by_value_and_by_reference() {
  let a = tagged();

  let by_value = group_by_stream(a.clone(), |r: &T| stream::iter(r.d.clone())).await;
  assert_eq!(by_value.len(), 5);
  assert_eq!(by_value.get(&3), Some(&[a[3].clone(), a[4].clone()][..]));

  let by_ref = try_group_by_stream(&a, |r: &T| {
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

  let idx = positions(by_ref, &a, |r| *r);
  assert_eq!(idx[&0], vec![0, 1, 2]);
  assert_eq!(idx[&1], vec![1, 2, 3, 4]);
  assert_eq!(idx[&2], vec![2, 3, 4]);
  assert_eq!(idx[&3], vec![3, 4]);
  assert_eq!(idx[&4], vec![0, 4]);
}

#[test]
fn shared_records_land_in_many_groups_without_copies() {
  let a = tagged().into_iter().map(Arc::new).collect::<Vec<_>>();
  let grouper = Grouper::default().with_name("tags".to_string());

  let grouped = grouper
    .by_stream_blocking(a.clone(), |r: &T| stream::iter(r.d.clone()))
    .unwrap();

  let ones = grouped.get(&1).unwrap();
  assert!(Arc::ptr_eq(&ones[0], &a[1]));
  assert!(Arc::ptr_eq(&ones[3], &a[4]));
  // four groups plus the caller's own handle
  assert_eq!(Arc::strong_count(&a[4]), 5);
}
