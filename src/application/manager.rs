use crate::config::StorageBackend;
use crate::domain::ports::{
    MerchantRepository, PaymentRepository, RepositoryFactory, RepositoryProvider, UserRepository,
};
use crate::error::{BankError, Result};
use crate::infrastructure::in_memory::{
    InMemoryMerchantRepository, InMemoryPaymentRepository, InMemoryUserRepository,
};
use std::sync::{Arc, OnceLock};

/// The closed set of resources a [`ResourceManager`] provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    User,
    Merchant,
    Payment,
}

impl ResourceKind {
    pub const ALL: [Self; 3] = [Self::User, Self::Merchant, Self::Payment];

    pub fn name(self) -> &'static str {
        match self {
            Self::User => "users",
            Self::Merchant => "merchants",
            Self::Payment => "payments",
        }
    }
}

/// Observable state of a [`OnceGate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Uninitialized,
    Ready,
    Failed,
}

/// A one-shot construction gate for a single shared handle.
///
/// The constructor passed to [`OnceGate::get_or_init`] runs at most once for
/// the lifetime of the gate. Callers racing the first construction block
/// until it finishes and then all receive the same `Arc`. A failed
/// construction is remembered and never retried.
pub struct OnceGate<T: ?Sized> {
    resource: &'static str,
    slot: OnceLock<std::result::Result<Arc<T>, String>>,
}

impl<T: ?Sized> OnceGate<T> {
    pub const fn new(resource: &'static str) -> Self {
        Self {
            resource,
            slot: OnceLock::new(),
        }
    }

    pub fn get_or_init<F>(&self, init: F) -> Result<Arc<T>>
    where
        F: FnOnce() -> Result<Arc<T>>,
    {
        let slot = self.slot.get_or_init(|| {
            tracing::info!(resource = self.resource, "Initializing resource");
            init().map_err(|err| {
                tracing::error!(
                    resource = self.resource,
                    error = %err,
                    "Resource initialization failed"
                );
                err.to_string()
            })
        });

        match slot {
            Ok(handle) => Ok(Arc::clone(handle)),
            Err(detail) => Err(BankError::ResourceUnavailable {
                resource: self.resource,
                detail: detail.clone(),
            }),
        }
    }

    pub fn state(&self) -> GateState {
        match self.slot.get() {
            None => GateState::Uninitialized,
            Some(Ok(_)) => GateState::Ready,
            Some(Err(_)) => GateState::Failed,
        }
    }
}

/// Owns the shared repositories and builds each one lazily on first access.
///
/// Every resource kind has its own gate, so building the user repository
/// never holds up a caller waiting on the merchant repository.
pub struct ResourceManager {
    user_factory: RepositoryFactory<dyn UserRepository>,
    merchant_factory: RepositoryFactory<dyn MerchantRepository>,
    payment_factory: RepositoryFactory<dyn PaymentRepository>,
    users: OnceGate<dyn UserRepository>,
    merchants: OnceGate<dyn MerchantRepository>,
    payments: OnceGate<dyn PaymentRepository>,
}

impl ResourceManager {
    pub fn new(
        user_factory: RepositoryFactory<dyn UserRepository>,
        merchant_factory: RepositoryFactory<dyn MerchantRepository>,
        payment_factory: RepositoryFactory<dyn PaymentRepository>,
    ) -> Self {
        Self {
            user_factory,
            merchant_factory,
            payment_factory,
            users: OnceGate::new(ResourceKind::User.name()),
            merchants: OnceGate::new(ResourceKind::Merchant.name()),
            payments: OnceGate::new(ResourceKind::Payment.name()),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(
            Box::new(|| -> Result<Arc<dyn UserRepository>> {
                Ok(Arc::new(InMemoryUserRepository::new()))
            }),
            Box::new(|| -> Result<Arc<dyn MerchantRepository>> {
                Ok(Arc::new(InMemoryMerchantRepository::new()))
            }),
            Box::new(|| -> Result<Arc<dyn PaymentRepository>> {
                Ok(Arc::new(InMemoryPaymentRepository::new()))
            }),
        )
    }

    /// Persistent repositories, one RocksDB directory per resource under `root`.
    #[cfg(feature = "storage-rocksdb")]
    pub fn rocksdb(root: impl Into<std::path::PathBuf>) -> Self {
        use crate::infrastructure::rocksdb::{CF_MERCHANTS, CF_PAYMENTS, CF_USERS, RocksDBStore};

        let root = root.into();
        let users_path = root.join(ResourceKind::User.name());
        let merchants_path = root.join(ResourceKind::Merchant.name());
        let payments_path = root.join(ResourceKind::Payment.name());

        Self::new(
            Box::new(move || -> Result<Arc<dyn UserRepository>> {
                Ok(Arc::new(RocksDBStore::open(&users_path, &[CF_USERS])?))
            }),
            Box::new(move || -> Result<Arc<dyn MerchantRepository>> {
                Ok(Arc::new(RocksDBStore::open(&merchants_path, &[CF_MERCHANTS])?))
            }),
            Box::new(move || -> Result<Arc<dyn PaymentRepository>> {
                Ok(Arc::new(RocksDBStore::open(&payments_path, &[CF_PAYMENTS])?))
            }),
        )
    }

    pub fn from_backend(backend: &StorageBackend) -> Self {
        match backend {
            StorageBackend::InMemory => Self::in_memory(),
            #[cfg(feature = "storage-rocksdb")]
            StorageBackend::RocksDb(path) => Self::rocksdb(path.clone()),
        }
    }

    /// Passes every gate once so construction failures surface at startup.
    pub fn initialize_all(&self) -> Result<()> {
        self.user_repo()?;
        self.merchant_repo()?;
        self.payment_repo()?;
        Ok(())
    }

    pub fn state(&self, kind: ResourceKind) -> GateState {
        match kind {
            ResourceKind::User => self.users.state(),
            ResourceKind::Merchant => self.merchants.state(),
            ResourceKind::Payment => self.payments.state(),
        }
    }
}

impl RepositoryProvider for ResourceManager {
    fn user_repo(&self) -> Result<Arc<dyn UserRepository>> {
        self.users.get_or_init(|| (self.user_factory)())
    }

    fn merchant_repo(&self) -> Result<Arc<dyn MerchantRepository>> {
        self.merchants.get_or_init(|| (self.merchant_factory)())
    }

    fn payment_repo(&self) -> Result<Arc<dyn PaymentRepository>> {
        self.payments.get_or_init(|| (self.payment_factory)())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::User;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_gate_runs_constructor_once() {
        let gate: OnceGate<String> = OnceGate::new("greeting");
        let calls = AtomicUsize::new(0);

        assert_eq!(gate.state(), GateState::Uninitialized);
        let first = gate
            .get_or_init(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(Arc::new("hello".to_string()))
            })
            .unwrap();
        let second = gate
            .get_or_init(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(Arc::new("other".to_string()))
            })
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(gate.state(), GateState::Ready);
    }

    #[test]
    fn test_gate_failure_is_permanent() {
        let gate: OnceGate<String> = OnceGate::new("flaky");
        let calls = AtomicUsize::new(0);

        let first = gate.get_or_init(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(BankError::storage("connection refused"))
        });
        assert!(matches!(
            first,
            Err(BankError::ResourceUnavailable { resource: "flaky", .. })
        ));

        let second = gate.get_or_init(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new("recovered".to_string()))
        });
        assert!(second.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(gate.state(), GateState::Failed);
    }

    #[tokio::test]
    async fn test_in_memory_manager_shares_repositories() {
        let manager = ResourceManager::in_memory();
        assert_eq!(manager.state(ResourceKind::User), GateState::Uninitialized);

        let repo = manager.user_repo().unwrap();
        repo.save(User::new("alice", "Alice A", "a@bank.test"))
            .await
            .unwrap();

        let again = manager.user_repo().unwrap();
        assert!(Arc::ptr_eq(&repo, &again));
        assert!(again.find_by_username("alice").await.unwrap().is_some());
        assert_eq!(manager.state(ResourceKind::User), GateState::Ready);
        assert_eq!(
            manager.state(ResourceKind::Merchant),
            GateState::Uninitialized
        );
    }

    #[test]
    fn test_initialize_all_reports_failure() {
        let manager = ResourceManager::new(
            Box::new(|| -> Result<Arc<dyn UserRepository>> {
                Ok(Arc::new(InMemoryUserRepository::new()))
            }),
            Box::new(|| -> Result<Arc<dyn MerchantRepository>> {
                Err(BankError::storage("merchant database offline"))
            }),
            Box::new(|| -> Result<Arc<dyn PaymentRepository>> {
                Ok(Arc::new(InMemoryPaymentRepository::new()))
            }),
        );

        let err = manager.initialize_all().unwrap_err();
        assert!(err.to_string().contains("merchant database offline"));
        assert_eq!(manager.state(ResourceKind::User), GateState::Ready);
        assert_eq!(manager.state(ResourceKind::Merchant), GateState::Failed);
        assert_eq!(
            manager.state(ResourceKind::Payment),
            GateState::Uninitialized
        );
    }

    #[cfg(feature = "storage-rocksdb")]
    #[test]
    fn test_rocksdb_manager_opens_directory_per_resource() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ResourceManager::rocksdb(dir.path());

        manager.initialize_all().unwrap();
        for kind in ResourceKind::ALL {
            assert!(dir.path().join(kind.name()).exists());
            assert_eq!(manager.state(kind), GateState::Ready);
        }
        drop(manager);

        for kind in ResourceKind::ALL {
            let mut families =
                rocksdb::DB::list_cf(&rocksdb::Options::default(), dir.path().join(kind.name()))
                    .unwrap();
            families.sort();
            assert_eq!(families, vec!["default".to_string(), kind.name().to_string()]);
        }
    }
}
