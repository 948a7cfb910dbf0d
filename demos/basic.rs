//! Groups a handful of records three ways and prints the groups.
//!
//! ```text
//! cargo run --example basic
//! ```

use groupweave::{
  group_by_field, group_by_func, try_group_by_stream, GroupByError, Grouper, KeySender,
};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
struct Typ {
  a: &'static str,
  b: &'static str,
  c: i32,
}

#[tokio::main]
async fn main() -> Result<(), GroupByError> {
  tracing_subscriber::fmt()
    .with_max_level(tracing::Level::DEBUG)
    .init();

  let records = vec![
    Typ { a: "a", b: "b", c: 0 },
    Typ { a: "a", b: "c", c: 1 },
    Typ { a: "b", b: "b", c: 1 },
    Typ { a: "b", b: "d", c: 3 },
    Typ { a: "c", b: "x", c: 3 },
  ];

  let by_field = group_by_field(&records, "c")?;
  println!("by field: {:?}", by_field.into_sorted());

  let by_func = group_by_func(&records, |r: &Typ| r.c);
  println!("by func: {:?}", by_func.into_sorted());

  let grouper = Grouper::default().with_name("offsets".to_string());
  let by_stream = try_group_by_stream(&records, |r: &Typ| {
    let c = r.c;
    grouper.spawn_keys(move |tx: KeySender<i32>| async move {
      tx.send(c).await?;
      tx.send(c + 10).await?;
      Ok::<_, GroupByError>(())
    })
  })
  .await?;
  println!("by stream: {:?}", by_stream.into_sorted());

  Ok(())
}
