//! Pollers never observe a step decrease or a status regression

use bookforge_task::{TaskStatus, TaskStore};
use std::collections::BTreeMap;
use std::time::Duration;

fn rank(status: TaskStatus) -> u8 {
    match status {
        TaskStatus::Pending => 0,
        TaskStatus::Running => 1,
        TaskStatus::Completed | TaskStatus::Error => 2,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_polling_is_monotonic() {
    let store = TaskStore::new();
    let writer = store.create(20, "대기 중");
    let id = writer.id();

    let pollers: Vec<_> = (0..4)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move {
                let mut last_step = 0;
                let mut last_rank = 0;
                let total = store.get(&id).unwrap().total_steps;
                loop {
                    let task = store.get(&id).unwrap();
                    assert!(task.step >= last_step, "step went backwards");
                    assert!(rank(task.status) >= last_rank, "status regressed");
                    assert_eq!(task.total_steps, total);
                    last_step = task.step;
                    last_rank = rank(task.status);
                    if task.is_terminal() {
                        break;
                    }
                    tokio::task::yield_now().await;
                }
            })
        })
        .collect();

    let pipeline = tokio::spawn(async move {
        writer.start("시작").unwrap();
        for step in 2..20 {
            writer.advance(step, format!("단계 {}", step)).unwrap();
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        writer.complete(BTreeMap::new(), vec![], "완료").unwrap();
    });

    pipeline.await.unwrap();
    for poller in pollers {
        poller.await.unwrap();
    }
    assert_eq!(store.get(&id).unwrap().status, TaskStatus::Completed);
}

#[tokio::test]
async fn test_independent_tasks() {
    let store = TaskStore::new();
    let a = store.create(3, "");
    let b = store.create(3, "");

    a.start("").unwrap();
    b.start("").unwrap();
    a.fail("AI 서비스 호출에 실패했습니다.").unwrap();
    b.advance(2, "").unwrap();

    assert_eq!(store.get(&a.id()).unwrap().status, TaskStatus::Error);
    assert_eq!(store.get(&b.id()).unwrap().status, TaskStatus::Running);
    assert_eq!(store.len(), 2);
}
