//! Single-writer actor for SQLite.
//!
//! SQLite allows one writer at a time; instead of letting pooled
//! connections contend for the write lock, all repositories send their
//! write jobs to one background task that owns a dedicated connection and
//! executes them serially, each inside an immediate transaction. This is
//! what makes the mapping store's upsert contract hold: writes to the same
//! security code are serialized by construction, and `bulk_upsert` keeps
//! per-row semantics because it is just one job on the same queue.

use std::any::Any;
use std::sync::Arc;

use diesel::SqliteConnection;
use tokio::sync::{mpsc, oneshot};

use super::DbPool;
use crate::errors::StorageError;
use sectorscope_core::errors::Result;

/// A write job: runs against the actor's connection, returns a type-erased
/// value so one channel can carry jobs with different result types.
type Job = Box<dyn FnOnce(&mut SqliteConnection) -> Result<Box<dyn Any + Send + 'static>> + Send + 'static>;

type JobEnvelope = (Job, oneshot::Sender<Result<Box<dyn Any + Send + 'static>>>);

/// Handle for submitting write jobs to the actor.
#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::Sender<JobEnvelope>,
}

impl WriteHandle {
    /// Run `job` on the writer's dedicated connection, inside an immediate
    /// transaction, and return its result.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + Any + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.tx
            .send((
                Box::new(move |conn| job(conn).map(|value| Box::new(value) as Box<dyn Any + Send>)),
                reply_tx,
            ))
            .await
            .expect("writer actor stopped; its receiving channel is closed");

        reply_rx
            .await
            .expect("writer actor dropped the reply sender without answering")
            .map(|boxed| {
                *boxed
                    .downcast::<T>()
                    .unwrap_or_else(|_| panic!("writer actor returned an unexpected result type"))
            })
    }
}

/// Spawn the writer actor and return a handle to it.
///
/// The actor takes one connection from the pool and holds it for its whole
/// life; it terminates when the last `WriteHandle` is dropped.
pub fn spawn_writer(pool: Arc<DbPool>) -> WriteHandle {
    let (tx, mut rx) = mpsc::channel::<JobEnvelope>(1024);

    tokio::spawn(async move {
        let mut conn = pool
            .get()
            .expect("failed to take a dedicated connection for the writer actor");

        while let Some((job, reply_tx)) = rx.recv().await {
            let result = conn
                .immediate_transaction::<_, StorageError, _>(|conn| {
                    job(conn).map_err(StorageError::from)
                })
                .map_err(|e: StorageError| e.into());

            // The requester may have given up (timeout, cancellation);
            // a closed reply channel is not the actor's problem.
            let _ = reply_tx.send(result);
        }
    });

    WriteHandle { tx }
}
