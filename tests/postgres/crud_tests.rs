//! Storage, owner scoping and delete behaviour against `PostgreSQL`.

use super::helpers::{repository, task};
use chrono::{TimeZone, Utc};
use mockable::DefaultClock;
use rstest::rstest;
use taskboard::task::{
    domain::{
        ColumnOrder, Comment, OwnerId, Position, TaskDraft, TaskPatch, TaskPriority, TaskStatus,
        UnresolvedIdPolicy,
    },
    ports::{CommentRepository, TaskRepository, TaskRepositoryError},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stored_task_round_trips_through_owner_scoped_lookup() -> Result<(), eyre::Report> {
    let Some(repo) = repository().await? else {
        return Ok(());
    };
    let owner = OwnerId::new();
    let due = Utc
        .with_ymd_and_hms(2026, 11, 30, 12, 0, 0)
        .single()
        .ok_or_else(|| eyre::eyre!("invalid due date"))?;
    let stored = task(
        owner,
        TaskDraft::new("Persist me")
            .with_description("with every field")
            .with_priority(TaskPriority::High)
            .with_due_date(due)
            .with_tags(vec!["db".to_owned(), "integration".to_owned()]),
        1,
    )?;
    repo.store(&stored).await?;

    let found = repo
        .find_owned(owner, stored.id())
        .await?
        .ok_or_else(|| eyre::eyre!("stored task not found"))?;
    eyre::ensure!(found.title() == "Persist me", "title: {}", found.title());
    eyre::ensure!(found.priority() == TaskPriority::High, "priority mismatch");
    eyre::ensure!(found.due_date() == Some(due), "due date mismatch");
    eyre::ensure!(found.tags() == stored.tags(), "tags mismatch");
    eyre::ensure!(found.position() == Position::FIRST, "position mismatch");

    let foreign = repo.find_owned(OwnerId::new(), stored.id()).await?;
    eyre::ensure!(foreign.is_none(), "other owners must not see the task");

    let duplicate = repo.store(&stored).await;
    eyre::ensure!(
        matches!(duplicate, Err(TaskRepositoryError::DuplicateTask(id)) if id == stored.id()),
        "expected duplicate error, got {duplicate:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn list_orders_by_column_position_and_creation() -> Result<(), eyre::Report> {
    let Some(repo) = repository().await? else {
        return Ok(());
    };
    let owner = OwnerId::new();
    let done = task(owner, TaskDraft::new("done").with_status(TaskStatus::Done), 1)?;
    let todo_second = task(owner, TaskDraft::new("todo 2"), 2)?;
    let progress = task(
        owner,
        TaskDraft::new("doing").with_status(TaskStatus::Progress),
        1,
    )?;
    let todo_first = task(owner, TaskDraft::new("todo 1"), 1)?;
    for item in [&done, &todo_second, &progress, &todo_first] {
        repo.store(item).await?;
    }

    let ids: Vec<_> = repo.list_owned(owner).await?.iter().map(|t| t.id()).collect();
    eyre::ensure!(
        ids == vec![todo_first.id(), todo_second.id(), progress.id(), done.id()],
        "unexpected board order"
    );

    let max = repo.max_position(owner, TaskStatus::Todo).await?;
    eyre::ensure!(max == Some(Position::new(2)), "max todo position: {max:?}");
    let empty = repo.max_position(OwnerId::new(), TaskStatus::Todo).await?;
    eyre::ensure!(empty.is_none(), "empty column has no maximum");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_is_scoped_to_owner_and_clears_due_date() -> Result<(), eyre::Report> {
    let Some(repo) = repository().await? else {
        return Ok(());
    };
    let owner = OwnerId::new();
    let mut stored = task(
        owner,
        TaskDraft::new("Dated").with_due_date(Utc::now()),
        1,
    )?;
    repo.store(&stored).await?;

    stored.apply_patch(
        TaskPatch {
            due_date: Some(None),
            ..TaskPatch::default()
        },
        None,
        &DefaultClock,
    )?;
    repo.update(&stored, None).await?;
    let found = repo
        .find_owned(owner, stored.id())
        .await?
        .ok_or_else(|| eyre::eyre!("task vanished"))?;
    eyre::ensure!(found.due_date().is_none(), "due date should be cleared");

    let impostor = task(OwnerId::new(), TaskDraft::new("Impostor"), 1)?;
    let result = repo.update(&impostor, None).await;
    eyre::ensure!(
        matches!(result, Err(TaskRepositoryError::NotFound(_))),
        "expected not found, got {result:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stale_edit_keeps_position_written_by_reorder() -> Result<(), eyre::Report> {
    let Some(repo) = repository().await? else {
        return Ok(());
    };
    let owner = OwnerId::new();
    let first = task(owner, TaskDraft::new("first"), 1)?;
    let second = task(owner, TaskDraft::new("second"), 2)?;
    repo.store(&first).await?;
    repo.store(&second).await?;

    let mut stale = first.clone();
    repo.apply_column_order(
        owner,
        &ColumnOrder::new(TaskStatus::Todo, vec![second.id(), first.id()])?,
        UnresolvedIdPolicy::Skip,
        Utc::now(),
    )
    .await?;
    stale.apply_patch(
        TaskPatch {
            title: Some("first renamed".to_owned()),
            ..TaskPatch::default()
        },
        None,
        &DefaultClock,
    )?;
    let updated = repo.update(&stale, None).await?;

    eyre::ensure!(updated.title() == "first renamed", "title: {}", updated.title());
    eyre::ensure!(
        updated.position() == Position::new(2),
        "reorder position lost: {:?}",
        updated.position()
    );
    let moved = repo.update(&updated, Some(Position::new(7))).await?;
    eyre::ensure!(
        moved.position() == Position::new(7),
        "explicit move not written: {:?}",
        moved.position()
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deletes_cascade_to_comments() -> Result<(), eyre::Report> {
    let Some(repo) = repository().await? else {
        return Ok(());
    };
    let owner = OwnerId::new();
    let first = task(owner, TaskDraft::new("first"), 1)?;
    let second = task(owner, TaskDraft::new("second"), 2)?;
    repo.store(&first).await?;
    repo.store(&second).await?;
    for content in ["one", "two"] {
        repo.append(&Comment::new(first.id(), owner, content, &DefaultClock)?)
            .await?;
    }
    let listed: Vec<String> = repo
        .list_for_task(first.id())
        .await?
        .iter()
        .map(|comment| comment.content().to_owned())
        .collect();
    eyre::ensure!(listed == ["one", "two"], "comment order: {listed:?}");

    eyre::ensure!(
        !repo.delete_owned(OwnerId::new(), first.id()).await?,
        "foreign delete must not succeed"
    );
    eyre::ensure!(repo.delete_owned(owner, first.id()).await?, "delete failed");
    eyre::ensure!(
        repo.list_for_task(first.id()).await?.is_empty(),
        "comments should be gone"
    );

    let orphan = Comment::new(first.id(), owner, "late", &DefaultClock)?;
    let appended = repo.append(&orphan).await;
    eyre::ensure!(
        matches!(appended, Err(TaskRepositoryError::NotFound(_))),
        "comment on deleted task: {appended:?}"
    );

    let removed = repo.delete_all_owned(owner).await?;
    eyre::ensure!(removed == 1, "expected one remaining task, removed {removed}");
    Ok(())
}
