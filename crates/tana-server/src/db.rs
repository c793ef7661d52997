//! Single-threaded SQLite actor. `rusqlite::Connection` is not `Sync`,
//! so one dedicated thread owns the connection and handlers talk to it
//! over a channel.

use std::path::Path;

use tokio::sync::{mpsc, oneshot};

use tana_core::error::TanaError;
use tana_core::models::{ShowDetail, ShowPatch, ShowRecord, SoundtrackRecord};
use tana_core::storage::Storage;

#[derive(Clone)]
pub struct DbHandle {
    tx: mpsc::UnboundedSender<DbCommand>,
}

enum DbCommand {
    AllShows {
        reply: oneshot::Sender<Result<Vec<ShowRecord>, TanaError>>,
    },
    GetShowDetail {
        id: i64,
        reply: oneshot::Sender<Result<Option<ShowDetail>, TanaError>>,
    },
    SearchShows {
        query: String,
        reply: oneshot::Sender<Result<Vec<ShowRecord>, TanaError>>,
    },
    UpdateShow {
        id: i64,
        patch: ShowPatch,
        reply: oneshot::Sender<Result<ShowRecord, TanaError>>,
    },
    AllSoundtracks {
        reply: oneshot::Sender<Result<Vec<SoundtrackRecord>, TanaError>>,
    },
}

impl DbHandle {
    pub fn open(path: &Path) -> Option<Self> {
        let storage = Storage::open(path)
            .map_err(|e| tracing::error!("Failed to open database: {e}"))
            .ok()?;
        Self::spawn(storage)
    }

    #[cfg(test)]
    pub fn from_storage(storage: Storage) -> Self {
        Self::spawn(storage).expect("spawn db actor")
    }

    fn spawn(storage: Storage) -> Option<Self> {
        let (tx, rx) = mpsc::unbounded_channel();

        std::thread::Builder::new()
            .name("db-actor".into())
            .spawn(move || actor_loop(storage, rx))
            .map_err(|e| tracing::error!("Failed to spawn DB thread: {e}"))
            .ok()?;

        Some(Self { tx })
    }

    pub async fn all_shows(&self) -> Result<Vec<ShowRecord>, TanaError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(DbCommand::AllShows { reply });
        rx.await
            .unwrap_or_else(|_| Err(TanaError::Config("DB actor closed".into())))
    }

    pub async fn get_show_detail(&self, id: i64) -> Result<Option<ShowDetail>, TanaError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(DbCommand::GetShowDetail { id, reply });
        rx.await
            .unwrap_or_else(|_| Err(TanaError::Config("DB actor closed".into())))
    }

    pub async fn search_shows(&self, query: impl Into<String>) -> Result<Vec<ShowRecord>, TanaError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(DbCommand::SearchShows {
            query: query.into(),
            reply,
        });
        rx.await
            .unwrap_or_else(|_| Err(TanaError::Config("DB actor closed".into())))
    }

    pub async fn update_show(&self, id: i64, patch: ShowPatch) -> Result<ShowRecord, TanaError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(DbCommand::UpdateShow { id, patch, reply });
        rx.await
            .unwrap_or_else(|_| Err(TanaError::Config("DB actor closed".into())))
    }

    pub async fn all_soundtracks(&self) -> Result<Vec<SoundtrackRecord>, TanaError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(DbCommand::AllSoundtracks { reply });
        rx.await
            .unwrap_or_else(|_| Err(TanaError::Config("DB actor closed".into())))
    }
}

fn actor_loop(storage: Storage, mut rx: mpsc::UnboundedReceiver<DbCommand>) {
    while let Some(cmd) = rx.blocking_recv() {
        match cmd {
            DbCommand::AllShows { reply } => {
                let _ = reply.send(storage.all_shows());
            }
            DbCommand::GetShowDetail { id, reply } => {
                let _ = reply.send(storage.get_show_detail(id));
            }
            DbCommand::SearchShows { query, reply } => {
                let _ = reply.send(storage.search_shows(&query));
            }
            DbCommand::UpdateShow { id, patch, reply } => {
                let _ = reply.send(storage.update_show(id, &patch));
            }
            DbCommand::AllSoundtracks { reply } => {
                let _ = reply.send(storage.all_soundtracks());
            }
        }
    }
}
