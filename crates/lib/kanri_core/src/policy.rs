//! Authorization policy: resource-scoped role gates.
//!
//! Each gate is a pure predicate over (principal id, resource snapshot),
//! evaluated fresh per request — no persistent state. Resource existence is
//! checked before any role logic, so a missing resource always reads as
//! `NotFound` rather than `Forbidden`.
//!
//! Authority tiers: board admin > task admin ≈ assignee. A board admin holds
//! implicit override authority over every task on their board; a task's
//! creator keeps authority over their own task without board-admin rights;
//! plain assignees get member-level access only.

use thiserror::Error;

use crate::models::board::Board;
use crate::models::task::Task;

/// Gate rejection. `NotFound` is surfaced distinctly from `Forbidden` so
/// clients can tell "doesn't exist" from "exists but not yours".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Forbidden(&'static str),
}

/// Pass when the principal appears in the board's member list.
pub fn require_board_member(board: Option<&Board>, user_id: &str) -> Result<(), PolicyError> {
    let board = board.ok_or(PolicyError::NotFound("Board"))?;
    if board.members.iter().any(|m| m.user_id == user_id) {
        Ok(())
    } else {
        Err(PolicyError::Forbidden("You are not a member of this board"))
    }
}

/// Pass when the principal is the board's designated admin.
pub fn require_board_admin(board: Option<&Board>, user_id: &str) -> Result<(), PolicyError> {
    let board = board.ok_or(PolicyError::NotFound("Board"))?;
    if board.admin_id == user_id {
        Ok(())
    } else {
        Err(PolicyError::Forbidden("You are not an admin of this board"))
    }
}

/// Pass when the principal is assigned to the task, is the task admin, or is
/// the admin of the task's board.
pub fn require_task_member(
    task: Option<&Task>,
    board: Option<&Board>,
    user_id: &str,
) -> Result<(), PolicyError> {
    let task = task.ok_or(PolicyError::NotFound("Task"))?;
    let is_board_admin = board.is_some_and(|b| b.admin_id == user_id);
    if task.assigned_to.iter().any(|id| id == user_id)
        || task.task_admin == user_id
        || is_board_admin
    {
        Ok(())
    } else {
        Err(PolicyError::Forbidden("You are not a member of this task"))
    }
}

/// Pass only for the task admin or the admin of the task's board. Plain
/// assignees never pass this gate.
pub fn require_task_or_board_admin(
    task: Option<&Task>,
    board: Option<&Board>,
    user_id: &str,
) -> Result<(), PolicyError> {
    let task = task.ok_or(PolicyError::NotFound("Task"))?;
    let is_board_admin = board.is_some_and(|b| b.admin_id == user_id);
    if task.task_admin == user_id || is_board_admin {
        Ok(())
    } else {
        Err(PolicyError::Forbidden(
            "Only the task admin or board admin can do this",
        ))
    }
}

/// Mutation guard for member removal: the designated admin can never be
/// removed from their own board's member list, which would orphan the board.
/// Evaluated against the removal *target*, on top of the caller's
/// board-admin gate.
pub fn require_member_removable(board: &Board, target_id: &str) -> Result<(), PolicyError> {
    if board.admin_id == target_id {
        Err(PolicyError::Forbidden(
            "The board admin cannot be removed from the board",
        ))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::board::{BoardMember, BoardRole};
    use crate::models::task::{TaskPriority, TaskStatus};
    use chrono::Utc;

    const ALICE: &str = "user-alice";
    const BOB: &str = "user-bob";
    const CAROL: &str = "user-carol";
    const DAVE: &str = "user-dave";

    /// Board admined by Alice, with Bob and Carol as plain members.
    fn board() -> Board {
        Board {
            id: "board-1".to_string(),
            name: "Sprint1".to_string(),
            color: "#3b82f6".to_string(),
            admin_id: ALICE.to_string(),
            members: vec![
                BoardMember {
                    user_id: ALICE.to_string(),
                    role: BoardRole::Admin,
                },
                BoardMember {
                    user_id: BOB.to_string(),
                    role: BoardRole::Member,
                },
                BoardMember {
                    user_id: CAROL.to_string(),
                    role: BoardRole::Member,
                },
            ],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Task on the board above, created by Bob, with Carol assigned.
    fn task() -> Task {
        Task {
            id: "task-1".to_string(),
            board_id: "board-1".to_string(),
            title: "Write release notes".to_string(),
            description: None,
            due_date: None,
            status: TaskStatus::Todo,
            priority: TaskPriority::Low,
            tags: vec![],
            task_admin: BOB.to_string(),
            assigned_to: vec![BOB.to_string(), CAROL.to_string()],
            subtasks: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn board_member_gate() {
        let b = board();
        assert_eq!(require_board_member(Some(&b), ALICE), Ok(()));
        assert_eq!(require_board_member(Some(&b), BOB), Ok(()));
        assert!(matches!(
            require_board_member(Some(&b), DAVE),
            Err(PolicyError::Forbidden(_))
        ));
    }

    #[test]
    fn board_admin_gate_uses_strict_equality() {
        let b = board();
        assert_eq!(require_board_admin(Some(&b), ALICE), Ok(()));
        // A plain member is never an admin, even though they pass the
        // member gate.
        assert!(matches!(
            require_board_admin(Some(&b), BOB),
            Err(PolicyError::Forbidden(_))
        ));
        assert!(matches!(
            require_board_admin(Some(&b), DAVE),
            Err(PolicyError::Forbidden(_))
        ));
    }

    #[test]
    fn missing_board_is_not_found_not_forbidden() {
        assert_eq!(
            require_board_member(None, ALICE),
            Err(PolicyError::NotFound("Board"))
        );
        assert_eq!(
            require_board_admin(None, ALICE),
            Err(PolicyError::NotFound("Board"))
        );
    }

    #[test]
    fn task_member_gate_covers_all_three_tiers() {
        let b = board();
        let t = task();
        // Assignee, task admin, and board admin all pass.
        assert_eq!(require_task_member(Some(&t), Some(&b), CAROL), Ok(()));
        assert_eq!(require_task_member(Some(&t), Some(&b), BOB), Ok(()));
        assert_eq!(require_task_member(Some(&t), Some(&b), ALICE), Ok(()));
        // A board member who is none of those does not.
        let mut b2 = b;
        b2.members.push(BoardMember {
            user_id: DAVE.to_string(),
            role: BoardRole::Member,
        });
        assert!(matches!(
            require_task_member(Some(&t), Some(&b2), DAVE),
            Err(PolicyError::Forbidden(_))
        ));
    }

    #[test]
    fn role_hierarchy_on_admin_gate() {
        let b = board();
        let t = task();
        // Task admin (Bob) and board admin (Alice) pass.
        assert_eq!(require_task_or_board_admin(Some(&t), Some(&b), BOB), Ok(()));
        assert_eq!(
            require_task_or_board_admin(Some(&t), Some(&b), ALICE),
            Ok(())
        );
        // A plain assignee (Carol) must never pass the admin gate, while
        // still passing the member gate.
        assert!(matches!(
            require_task_or_board_admin(Some(&t), Some(&b), CAROL),
            Err(PolicyError::Forbidden(_))
        ));
        assert_eq!(require_task_member(Some(&t), Some(&b), CAROL), Ok(()));
    }

    #[test]
    fn missing_task_is_not_found() {
        let b = board();
        assert_eq!(
            require_task_member(None, Some(&b), ALICE),
            Err(PolicyError::NotFound("Task"))
        );
        assert_eq!(
            require_task_or_board_admin(None, Some(&b), ALICE),
            Err(PolicyError::NotFound("Task"))
        );
    }

    #[test]
    fn admin_cannot_be_removed_from_own_board() {
        let b = board();
        assert!(matches!(
            require_member_removable(&b, ALICE),
            Err(PolicyError::Forbidden(_))
        ));
        assert_eq!(require_member_removable(&b, BOB), Ok(()));
    }
}
