use crate::domain::merchant::Merchant;
use crate::domain::payment::Payment;
use crate::domain::ports::{MerchantRepository, PaymentRepository, UserRepository};
use crate::domain::user::User;
use crate::error::{BankError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Column Family for user records, keyed by username.
pub const CF_USERS: &str = "users";
/// Column Family for merchant records, keyed by merchant id.
pub const CF_MERCHANTS: &str = "merchants";
/// Column Family for payment records, keyed by payment id.
pub const CF_PAYMENTS: &str = "payments";

/// A persistent repository backed by RocksDB.
///
/// Entities are stored as JSON, one Column Family per entity kind. The
/// resource manager opens a separate database directory for each repository
/// it builds, since RocksDB holds an exclusive lock on an open path, and each
/// of those databases carries only the Column Family it serves.
///
/// User writes run under `write_guard` so conditional writes see no
/// interleaved put or delete. `Clone` shares the `Arc<DB>` and the guard.
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    write_guard: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at `path` with the given Column Families.
    pub fn open<P: AsRef<Path>>(path: P, column_families: &[&str]) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = column_families
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()));

        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        Ok(Self {
            db: Arc::new(db),
            write_guard: Arc::new(Mutex::new(())),
        })
    }

    fn lock_writes(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_guard
            .lock()
            .map_err(|_| BankError::storage("RocksDB write guard poisoned"))
    }

    fn put_json<T: Serialize>(&self, cf_name: &str, key: &str, value: &T) -> Result<()> {
        let cf = self.column_family(cf_name)?;
        let bytes = serde_json::to_vec(value)?;
        self.db.put_cf(&cf, key.as_bytes(), bytes)?;
        Ok(())
    }

    fn get_json<T: DeserializeOwned>(&self, cf_name: &str, key: &str) -> Result<Option<T>> {
        let cf = self.column_family(cf_name)?;
        match self.db.get_pinned_cf(&cf, key.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn scan_json<T: DeserializeOwned>(&self, cf_name: &str) -> Result<Vec<T>> {
        let cf = self.column_family(cf_name)?;
        let mut values = Vec::new();
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (_key, bytes) = item?;
            values.push(serde_json::from_slice(&bytes)?);
        }
        Ok(values)
    }

    fn column_family(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| BankError::storage(format!("Column family '{name}' not found")))
    }
}

#[async_trait]
impl UserRepository for RocksDBStore {
    async fn save(&self, user: User) -> Result<()> {
        let _guard = self.lock_writes()?;
        self.put_json(CF_USERS, &user.username, &user)
    }

    async fn create(&self, user: User) -> Result<bool> {
        let _guard = self.lock_writes()?;
        if self.get_json::<User>(CF_USERS, &user.username)?.is_some() {
            return Ok(false);
        }
        self.put_json(CF_USERS, &user.username, &user)?;
        Ok(true)
    }

    async fn replace(&self, expected: &User, user: User) -> Result<bool> {
        let _guard = self.lock_writes()?;
        if user.username != expected.username {
            return Ok(false);
        }
        match self.get_json::<User>(CF_USERS, &expected.username)? {
            Some(current) if current == *expected => {
                self.put_json(CF_USERS, &user.username, &user)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        self.get_json(CF_USERS, username)
    }

    async fn delete(&self, username: &str) -> Result<bool> {
        let _guard = self.lock_writes()?;
        let cf = self.column_family(CF_USERS)?;
        if self.db.get_pinned_cf(&cf, username.as_bytes())?.is_none() {
            return Ok(false);
        }
        self.db.delete_cf(&cf, username.as_bytes())?;
        Ok(true)
    }
}

#[async_trait]
impl MerchantRepository for RocksDBStore {
    async fn save(&self, merchant: Merchant) -> Result<()> {
        self.put_json(CF_MERCHANTS, &merchant.id, &merchant)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Merchant>> {
        self.get_json(CF_MERCHANTS, id)
    }

    async fn all(&self) -> Result<Vec<Merchant>> {
        self.scan_json(CF_MERCHANTS)
    }
}

#[async_trait]
impl PaymentRepository for RocksDBStore {
    async fn save(&self, payment: Payment) -> Result<()> {
        self.put_json(CF_PAYMENTS, &payment.id, &payment)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Payment>> {
        self.get_json(CF_PAYMENTS, id)
    }

    async fn find_by_username(&self, username: &str) -> Result<Vec<Payment>> {
        let payments: Vec<Payment> = self.scan_json(CF_PAYMENTS)?;
        Ok(payments
            .into_iter()
            .filter(|payment| payment.username == username)
            .collect())
    }
}
