use bankgate::application::manager::{GateState, ResourceKind, ResourceManager};
use bankgate::domain::merchant::Merchant;
use bankgate::domain::ports::{
    MerchantRepository, PaymentRepository, RepositoryProvider, UserRepository,
};
use bankgate::error::Result;
use bankgate::infrastructure::in_memory::{
    InMemoryMerchantRepository, InMemoryPaymentRepository, InMemoryUserRepository,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

#[test]
fn test_concurrent_first_access_constructs_once() {
    const CALLERS: usize = 32;
    let constructions = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&constructions);
    let manager = ResourceManager::new(
        Box::new(move || -> Result<Arc<dyn UserRepository>> {
            counter.fetch_add(1, Ordering::SeqCst);
            // Widen the window in which other callers arrive mid-construction.
            thread::sleep(Duration::from_millis(50));
            Ok(Arc::new(InMemoryUserRepository::new()))
        }),
        Box::new(|| -> Result<Arc<dyn MerchantRepository>> {
            Ok(Arc::new(InMemoryMerchantRepository::new()))
        }),
        Box::new(|| -> Result<Arc<dyn PaymentRepository>> {
            Ok(Arc::new(InMemoryPaymentRepository::new()))
        }),
    );

    let barrier = Barrier::new(CALLERS);
    let handles: Vec<Arc<dyn UserRepository>> = thread::scope(|scope| {
        let workers: Vec<_> = (0..CALLERS)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    manager.user_repo().unwrap()
                })
            })
            .collect();
        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });

    assert_eq!(constructions.load(Ordering::SeqCst), 1);
    assert_eq!(handles.len(), CALLERS);
    for handle in &handles {
        assert!(Arc::ptr_eq(handle, &handles[0]));
    }
    assert_eq!(manager.state(ResourceKind::User), GateState::Ready);
}

#[test]
fn test_gates_are_independent() {
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let (started_tx, started_rx) = mpsc::channel::<()>();
    let release_rx = std::sync::Mutex::new(release_rx);

    let manager = ResourceManager::new(
        Box::new(move || -> Result<Arc<dyn UserRepository>> {
            started_tx.send(()).ok();
            // Stay inside the user constructor until the merchant gate has been passed.
            release_rx
                .lock()
                .unwrap()
                .recv_timeout(Duration::from_secs(5))
                .ok();
            Ok(Arc::new(InMemoryUserRepository::new()))
        }),
        Box::new(|| -> Result<Arc<dyn MerchantRepository>> {
            Ok(Arc::new(InMemoryMerchantRepository::new()))
        }),
        Box::new(|| -> Result<Arc<dyn PaymentRepository>> {
            Ok(Arc::new(InMemoryPaymentRepository::new()))
        }),
    );

    thread::scope(|scope| {
        let user_caller = scope.spawn(|| manager.user_repo().unwrap());

        started_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("user construction never started");
        assert_eq!(manager.state(ResourceKind::User), GateState::Uninitialized);

        let (done_tx, done_rx) = mpsc::channel();
        let manager_ref = &manager;
        scope.spawn(move || {
            let merchants = manager_ref.merchant_repo().unwrap();
            done_tx.send(merchants).unwrap();
        });
        let merchants = done_rx
            .recv_timeout(Duration::from_secs(2))
            .expect("merchant access blocked behind user construction");
        assert_eq!(manager.state(ResourceKind::Merchant), GateState::Ready);
        drop(merchants);

        release_tx.send(()).unwrap();
        user_caller.join().unwrap();
    });

    assert_eq!(manager.state(ResourceKind::User), GateState::Ready);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_handles_are_shared_across_tasks() {
    let manager = Arc::new(ResourceManager::in_memory());

    let mut tasks = Vec::new();
    for i in 0..8 {
        let manager = Arc::clone(&manager);
        tasks.push(tokio::spawn(async move {
            let repo = manager.merchant_repo().unwrap();
            repo.save(Merchant::new(format!("m{i}"), format!("Merchant {i}")))
                .await
                .unwrap();
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let merchants = manager.merchant_repo().unwrap().all().await.unwrap();
    assert_eq!(merchants.len(), 8);
}
