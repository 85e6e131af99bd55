use chrono::{Duration, TimeZone, Utc};
use std::sync::Arc;
use taskboard_core::{AppConfig, BoardError};
use taskboard_domain::{Board, FilterState, Task};
use taskboard_store::{BoardFile, JsonTaskFile, MemoryTaskStore};
use taskboard_sync::{BoardController, BoardEvent, BoardNotice};
use tempfile::tempdir;

fn seeded_file() -> BoardFile {
    let board = Board::new("b1", "Delivery")
        .with_status("todo", "Todo")
        .with_status("doing", "Doing")
        .with_status("done", "Done");
    let start = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
    let tasks = (0..9)
        .map(|n| {
            let status = ["todo", "todo", "doing"][n % 3];
            Task::new(format!("t{}", n), status, format!("Task {}", n))
                .with_priority(if n % 2 == 0 { "high" } else { "low" })
                .with_created_at(start + Duration::hours(n as i64))
        })
        .collect();
    BoardFile::new(board, tasks)
}

fn config(page_size: usize) -> AppConfig {
    AppConfig {
        page_size: Some(page_size),
        ..Default::default()
    }
}

#[tokio::test]
async fn board_file_drives_a_controller() {
    let dir = tempdir().unwrap();
    let file = JsonTaskFile::new(dir.path().join("board.json"));
    file.save(&seeded_file()).await.unwrap();

    let (board, store) = file.load().await.unwrap().into_store();
    let store = Arc::new(store);
    let controller = BoardController::new(board, store.clone(), &config(4));
    controller.mount_visible();
    controller.load_all().await;

    let todo = controller.column("todo").unwrap();
    assert_eq!(todo.total, 6);
    assert_eq!(todo.items.len(), 4);
    assert_eq!(todo.items[0].id, "t7");
    assert_eq!(todo.remaining, 2);

    controller.load_more("todo").await.unwrap();
    let todo = controller.column("todo").unwrap();
    assert_eq!(todo.items.len(), 6);
    assert!(!todo.has_more);
    assert_eq!(todo.remaining, 0);
}

#[tokio::test]
async fn committed_move_is_persisted() {
    let dir = tempdir().unwrap();
    let file = JsonTaskFile::new(dir.path().join("board.json"));
    file.save(&seeded_file()).await.unwrap();

    let (board, store) = file.load().await.unwrap().into_store();
    let store = Arc::new(store);
    let controller = BoardController::new(board.clone(), store.clone(), &config(10));
    controller.mount_visible();
    controller.load_all().await;

    let moved = controller
        .on_drop_accepted("t0", "todo", "done")
        .await
        .unwrap();
    assert_eq!(moved.status_id, "done");

    file.save(&BoardFile::new(board, store.tasks()))
        .await
        .unwrap();
    let reloaded = file.load().await.unwrap();
    let t0 = reloaded.tasks.iter().find(|t| t.id == "t0").unwrap();
    assert_eq!(t0.status_id, "done");
}

#[tokio::test]
async fn rejected_move_leaves_store_and_columns_consistent() {
    let file = seeded_file();
    let (board, store) = file.into_store();
    let store = Arc::new(store);
    let controller = BoardController::new(board, store.clone(), &config(10));
    controller.mount_visible();
    controller.load_all().await;
    let mut notices = controller.subscribe();

    store.fail_next_update();
    controller
        .handle(BoardEvent::DropAccepted {
            task_id: "t3".to_string(),
            from_status_id: "todo".to_string(),
            to_status_id: "doing".to_string(),
        })
        .await
        .unwrap();

    assert!(matches!(
        notices.try_recv().unwrap(),
        BoardNotice::MoveRejected { ref task_id, .. } if task_id == "t3"
    ));
    assert_eq!(store.task("t3").unwrap().status_id, "todo");
    assert!(controller.partition("todo").unwrap().contains("t3"));
    assert!(!controller.partition("doing").unwrap().contains("t3"));
}

#[tokio::test]
async fn filter_and_latency_fan_out() {
    let (board, store) = seeded_file().into_store();
    let store = Arc::new(store.with_latency(std::time::Duration::from_millis(5)));
    let controller = BoardController::new(board, store.clone(), &config(10));
    controller.mount_visible();
    controller.load_all().await;

    let outcomes = controller
        .set_filter(FilterState::new().with_priority_ids(["high"]))
        .await;
    assert_eq!(outcomes.len(), 3);

    for column in controller.columns() {
        assert!(column
            .items
            .iter()
            .all(|t| t.priority_id.as_deref() == Some("high")));
    }
    assert_eq!(controller.column("todo").unwrap().total, 3);
}

#[tokio::test]
async fn list_outage_is_reported_per_column() {
    let (board, store) = seeded_file().into_store();
    let store = Arc::new(store);
    let controller = BoardController::new(board, store.clone(), &config(10));
    controller.mount_visible();
    controller.load_all().await;
    let mut notices = controller.subscribe();

    store.set_fail_lists(true);
    let outcomes = controller.refresh_all().await;
    assert!(outcomes
        .iter()
        .all(|(_, r)| matches!(r, Err(BoardError::Fetch { .. }))));

    let mut failed = Vec::new();
    while let Ok(BoardNotice::FetchFailed { status_id, .. }) = notices.try_recv() {
        failed.push(status_id);
    }
    assert_eq!(failed, vec!["todo", "doing", "done"]);

    store.set_fail_lists(false);
    controller.refresh_all().await;
    assert!(controller.columns().iter().all(|c| c.error.is_none()));
}
