use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Session-authenticated HTTP front for the bank user API",
    long_about = "Session-authenticated HTTP front for the bank user API.\n\n\
        Callers identify themselves with the `x-session-id` header. Sessions are \
        issued by an external authentication service; this server only reads them. \
        Without --session-file the session store starts empty and every gated \
        route answers 401."
)]
pub struct ServerConfig {
    /// Address the HTTP server listens on
    #[arg(long, env = "BANKGATE_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "BANKGATE_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// JSON file seeding the session store: `{"<session id>": {"Username": "..."}}`
    #[arg(long, env = "BANKGATE_SESSION_FILE")]
    pub session_file: Option<PathBuf>,

    /// Tracing filter directive, e.g. `info` or `bankgate=debug`
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_filter: String,

    /// Require a session for POST /user
    #[arg(long)]
    pub create_requires_session: bool,

    /// Accept PUT /user without a session
    #[arg(long)]
    pub open_updates: bool,

    /// Reject writes whose username differs from the session's principal
    #[arg(long)]
    pub bind_writes_to_principal: bool,
}

impl ServerConfig {
    pub fn access_policy(&self) -> AccessPolicy {
        AccessPolicy {
            create_requires_session: self.create_requires_session,
            update_requires_session: !self.open_updates,
            bind_writes_to_principal: self.bind_writes_to_principal,
        }
    }

    /// Resolves the storage backend, falling back to memory when RocksDB
    /// support was not compiled in.
    pub fn storage_backend(&self) -> StorageBackend {
        match &self.db_path {
            None => StorageBackend::InMemory,
            #[cfg(feature = "storage-rocksdb")]
            Some(path) => StorageBackend::RocksDb(path.clone()),
            #[cfg(not(feature = "storage-rocksdb"))]
            Some(path) => {
                tracing::warn!(
                    db_path = %path.display(),
                    "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
                );
                StorageBackend::InMemory
            }
        }
    }
}

/// Which write routes need a session, and whether writes are tied to it.
///
/// Defaults: create is open, update is gated, writes are not tied to the principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessPolicy {
    pub create_requires_session: bool,
    pub update_requires_session: bool,
    pub bind_writes_to_principal: bool,
}

impl AccessPolicy {
    /// Whether POST /user is gated. Bound writes always need a session.
    pub fn create_gated(&self) -> bool {
        self.create_requires_session || self.bind_writes_to_principal
    }

    /// Whether PUT /user is gated. Bound writes always need a session.
    pub fn update_gated(&self) -> bool {
        self.update_requires_session || self.bind_writes_to_principal
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            create_requires_session: false,
            update_requires_session: true,
            bind_writes_to_principal: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    InMemory,
    #[cfg(feature = "storage-rocksdb")]
    RocksDb(PathBuf),
}
