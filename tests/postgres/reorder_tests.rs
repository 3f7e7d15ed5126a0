//! Transactional column reorders against `PostgreSQL`.

use super::helpers::{repository, task};
use chrono::Utc;
use rstest::rstest;
use std::sync::Arc;
use taskboard::task::{
    domain::{ColumnOrder, OwnerId, TaskDraft, TaskId, TaskStatus, UnresolvedIdPolicy},
    ports::{TaskRepository, TaskRepositoryError},
};

async fn column(
    repo: &impl TaskRepository,
    owner: OwnerId,
) -> Result<Vec<(TaskId, u32)>, eyre::Report> {
    Ok(repo
        .list_owned(owner)
        .await?
        .iter()
        .filter(|item| item.status() == TaskStatus::Todo)
        .map(|item| (item.id(), item.position().value()))
        .collect())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn apply_column_order_writes_compacted_positions() -> Result<(), eyre::Report> {
    let Some(repo) = repository().await? else {
        return Ok(());
    };
    let owner = OwnerId::new();
    let stranger = OwnerId::new();
    let mut ids = Vec::new();
    for (index, title) in ["A", "B", "C"].into_iter().enumerate() {
        let item = task(owner, TaskDraft::new(title), u32::try_from(index)? + 1)?;
        repo.store(&item).await?;
        ids.push(item.id());
    }
    let foreign = task(stranger, TaskDraft::new("foreign"), 1)?;
    repo.store(&foreign).await?;
    let &[a, b, c] = ids.as_slice() else {
        eyre::bail!("expected three tasks");
    };

    let order = ColumnOrder::new(TaskStatus::Todo, vec![foreign.id(), c, a, b])?;
    let written = repo
        .apply_column_order(owner, &order, UnresolvedIdPolicy::Skip, Utc::now())
        .await?;

    eyre::ensure!(written.len() == 3, "foreign id should be skipped");
    let result = column(&repo, owner).await?;
    eyre::ensure!(result == vec![(c, 1), (a, 2), (b, 3)], "got {result:?}");
    let untouched = column(&repo, stranger).await?;
    eyre::ensure!(untouched == vec![(foreign.id(), 1)], "foreign task moved");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rejected_order_rolls_back() -> Result<(), eyre::Report> {
    let Some(repo) = repository().await? else {
        return Ok(());
    };
    let owner = OwnerId::new();
    let first = task(owner, TaskDraft::new("first"), 1)?;
    let second = task(owner, TaskDraft::new("second"), 2)?;
    repo.store(&first).await?;
    repo.store(&second).await?;
    let before = column(&repo, owner).await?;

    let order = ColumnOrder::new(
        TaskStatus::Todo,
        vec![second.id(), TaskId::new(), first.id()],
    )?;
    let result = repo
        .apply_column_order(owner, &order, UnresolvedIdPolicy::Reject, Utc::now())
        .await;

    eyre::ensure!(
        matches!(result, Err(TaskRepositoryError::InvalidOrder(_))),
        "expected rejection, got {result:?}"
    );
    eyre::ensure!(column(&repo, owner).await? == before, "positions changed");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_reorders_apply_one_complete_order() -> Result<(), eyre::Report> {
    let Some(repo) = repository().await? else {
        return Ok(());
    };
    let shared = Arc::new(repo);
    let owner = OwnerId::new();
    let mut ids = Vec::new();
    for index in 1..=4 {
        let item = task(owner, TaskDraft::new(format!("task {index}")), index)?;
        shared.store(&item).await?;
        ids.push(item.id());
    }
    let forward = ids.clone();
    let backward: Vec<TaskId> = ids.iter().rev().copied().collect();

    let mut handles = Vec::new();
    for order in [forward.clone(), backward.clone(), forward.clone(), backward.clone()] {
        let worker = Arc::clone(&shared);
        handles.push(tokio::spawn(async move {
            let column_order = ColumnOrder::new(TaskStatus::Todo, order)?;
            worker
                .apply_column_order(owner, &column_order, UnresolvedIdPolicy::Skip, Utc::now())
                .await?;
            Ok::<_, eyre::Report>(())
        }));
    }
    for handle in handles {
        handle.await??;
    }

    let result = column(shared.as_ref(), owner).await?;
    let final_order: Vec<TaskId> = result.iter().map(|(id, _)| *id).collect();
    let positions: Vec<u32> = result.iter().map(|(_, position)| *position).collect();
    eyre::ensure!(positions == vec![1, 2, 3, 4], "positions interleaved: {positions:?}");
    eyre::ensure!(
        final_order == forward || final_order == backward,
        "final order matches no request: {final_order:?}"
    );
    Ok(())
}
