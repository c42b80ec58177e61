use std::thread;

use futures::task::{FutureObj, Spawn, SpawnError};

/// A `Spawn` implementation that starts a fresh thread for every future.
///
/// It never runs out of capacity, which makes it the fallback when a pool
/// cannot be built.
#[derive(Clone, Debug, Default)]
pub struct NewThreadSpawner {
  name: Option<String>,
}

impl NewThreadSpawner {
  pub fn named(name: impl Into<String>) -> Self { NewThreadSpawner { name: Some(name.into()) } }
}

impl Spawn for NewThreadSpawner {
  fn spawn_obj(&self, future: FutureObj<'static, ()>) -> Result<(), SpawnError> {
    let mut builder = thread::Builder::new();
    if let Some(name) = &self.name {
      builder = builder.name(name.clone());
    }
    builder
      .spawn(move || futures::executor::block_on(future))
      .map(drop)
      .map_err(|err| {
        tracing::error!(%err, "failed to start thread");
        SpawnError::shutdown()
      })
  }
}

#[cfg(test)]
mod tests {
  use futures::task::SpawnExt;

  use super::*;

  #[rxcore_macro::test]
  fn spawns_on_named_thread() {
    let (tx, rx) = std::sync::mpsc::channel();
    NewThreadSpawner::named("rx-test")
      .spawn(async move {
        tx.send(thread::current().name().map(str::to_owned)).unwrap();
      })
      .unwrap();
    assert_eq!(rx.recv().unwrap().as_deref(), Some("rx-test"));
  }
}
