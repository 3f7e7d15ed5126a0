//! Column ordering through the public services.

use super::helpers::{Board, board};
use rstest::rstest;
use taskboard::config::ServiceConfig;
use taskboard::task::{
    domain::{TaskId, TaskPatch, TaskStatus, UnresolvedIdPolicy},
    services::{ReorderRequest, TaskServiceError},
};

fn ids(column: &[(TaskId, u32)]) -> Vec<TaskId> {
    column.iter().map(|(id, _)| *id).collect()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn drag_and_drop_round_trip(board: Board) -> Result<(), eyre::Report> {
    let todo = board.seed(TaskStatus::Todo, &["A", "B", "C"]).await?;
    let &[a, b, c] = todo.as_slice() else {
        eyre::bail!("expected three seeded tasks");
    };

    board
        .reorder
        .reorder(board.caller, ReorderRequest::new([c, a, b]).with_status("todo"))
        .await?;

    let column = board.column(TaskStatus::Todo).await?;
    eyre::ensure!(
        column == vec![(c, 1), (a, 2), (b, 3)],
        "unexpected column after reorder: {column:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn moving_a_card_then_reordering_its_new_column(board: Board) -> Result<(), eyre::Report> {
    let todo = board.seed(TaskStatus::Todo, &["A", "B"]).await?;
    let progress = board.seed(TaskStatus::Progress, &["P"]).await?;
    let (&[moving, staying], &[existing]) = (todo.as_slice(), progress.as_slice()) else {
        eyre::bail!("unexpected seed result");
    };

    board
        .store
        .update(
            board.caller,
            moving,
            TaskPatch {
                status: Some(TaskStatus::Progress),
                ..TaskPatch::default()
            },
        )
        .await?;
    let column = board.column(TaskStatus::Progress).await?;
    eyre::ensure!(
        ids(&column) == vec![existing, moving],
        "moved card should land at the end of its new column"
    );

    board
        .reorder
        .reorder(
            board.caller,
            ReorderRequest::new([moving, existing]).with_status("progress"),
        )
        .await?;
    let column = board.column(TaskStatus::Progress).await?;
    eyre::ensure!(column == vec![(moving, 1), (existing, 2)], "got {column:?}");

    let todo_column = board.column(TaskStatus::Todo).await?;
    eyre::ensure!(todo_column == vec![(staying, 2)], "todo column keeps its gap");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reject_policy_is_selected_through_config() -> Result<(), eyre::Report> {
    let board = Board::with_config(
        ServiceConfig::default().with_unresolved_ids(UnresolvedIdPolicy::Reject),
    );
    let todo = board.seed(TaskStatus::Todo, &["A", "B"]).await?;
    let &[a, b] = todo.as_slice() else {
        eyre::bail!("expected two seeded tasks");
    };
    let before = board.column(TaskStatus::Todo).await?;

    let result = board
        .reorder
        .reorder(
            board.caller,
            ReorderRequest::new([b, TaskId::new(), a]).with_status("todo"),
        )
        .await;

    eyre::ensure!(
        matches!(result, Err(TaskServiceError::Domain(_))),
        "reject policy should fail the reorder"
    );
    eyre::ensure!(board.column(TaskStatus::Todo).await? == before, "column changed");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn partial_reorder_leaves_unlisted_tasks_alone(board: Board) -> Result<(), eyre::Report> {
    let todo = board.seed(TaskStatus::Todo, &["A", "B", "C", "D"]).await?;
    let &[_, _, c, d] = todo.as_slice() else {
        eyre::bail!("expected four seeded tasks");
    };

    board
        .reorder
        .reorder(
            board.caller,
            ReorderRequest::new([d, c]).with_status("todo"),
        )
        .await?;

    let column = board.column(TaskStatus::Todo).await?;
    // Unlisted A and B keep 1 and 2 and tie with the rewritten pair.
    let positions: Vec<u32> = column.iter().map(|(_, position)| *position).collect();
    eyre::ensure!(positions == vec![1, 1, 2, 2], "got {column:?}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn purge_also_removes_comments(board: Board) -> Result<(), eyre::Report> {
    let todo = board.seed(TaskStatus::Todo, &["A"]).await?;
    let &[task] = todo.as_slice() else {
        eyre::bail!("expected one seeded task");
    };
    board.comments.add(board.caller, task, "note").await?;

    let removed = board.store.purge(board.caller).await?;

    eyre::ensure!(removed == 1, "expected one task removed, got {removed}");
    let comments = board.comments.list(board.caller, task).await;
    eyre::ensure!(
        matches!(comments, Err(TaskServiceError::NotFound(_))),
        "comments should be gone with their task"
    );
    Ok(())
}
