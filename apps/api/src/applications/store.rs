use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::info;

use crate::applications::PendingApplication;
use crate::errors::AppError;
use crate::models::candidate::CandidateRow;
use crate::screening::provenance::Sourced;

/// Everything the quiz submission adds to a pending application.
pub struct QuizOutcome {
    pub quiz_score: i64,
    pub decision: Sourced<i64>,
}

/// Persists a completed application.
///
/// Check-then-insert runs in one transaction and `application_id` is UNIQUE,
/// so a replayed submission is rejected with `Conflict` instead of creating a
/// second row.
pub async fn insert_candidate(
    pool: &SqlitePool,
    user_id: i64,
    pending: &PendingApplication,
    outcome: &QuizOutcome,
) -> Result<CandidateRow, AppError> {
    let application_id = pending.application_id.to_string();
    let mut tx = pool.begin().await?;

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM candidates WHERE application_id = ?")
        .bind(&application_id)
        .fetch_one(&mut *tx)
        .await?;
    if existing > 0 {
        return Err(AppError::Conflict(format!(
            "Application {application_id} was already submitted"
        )));
    }

    let inserted = sqlx::query_as::<_, CandidateRow>(
        r#"
        INSERT INTO candidates
            (application_id, user_id, name, experience, skills, quiz, selected,
             resume_score, summary, skills_list, resume_match,
             evaluation_source, quiz_source, decision_source)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&application_id)
    .bind(user_id)
    .bind(&pending.name)
    .bind(pending.experience)
    .bind(pending.skills.count)
    .bind(outcome.quiz_score)
    .bind(outcome.decision.value)
    .bind(pending.evaluation.value.score)
    .bind(&pending.evaluation.value.summary)
    .bind(&pending.skills.skills)
    .bind(pending.resume_match)
    .bind(pending.evaluation.source.as_str())
    .bind(pending.quiz.source.as_str())
    .bind(outcome.decision.source.as_str())
    .fetch_one(&mut *tx)
    .await;

    let row = match inserted {
        Ok(row) => row,
        Err(e) if AppError::is_unique_violation(&e) => {
            return Err(AppError::Conflict(format!(
                "Application {application_id} was already submitted"
            )))
        }
        Err(e) => return Err(AppError::Database(e)),
    };

    tx.commit().await?;
    info!(
        "Stored candidate {} for user {user_id}: quiz={}, selected={} ({})",
        row.id, row.quiz, row.selected, row.decision_source
    );
    Ok(row)
}

/// All attempts by one user, newest first.
pub async fn history_for_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<CandidateRow>, sqlx::Error> {
    sqlx::query_as::<_, CandidateRow>("SELECT * FROM candidates WHERE user_id = ? ORDER BY id DESC")
        .bind(user_id)
        .fetch_all(pool)
        .await
}

pub async fn list_candidates(pool: &SqlitePool) -> Result<Vec<CandidateRow>, sqlx::Error> {
    sqlx::query_as::<_, CandidateRow>("SELECT * FROM candidates ORDER BY id DESC")
        .fetch_all(pool)
        .await
}

pub async fn find_candidates_by_ids(pool: &SqlitePool, ids: &[i64]) -> Result<Vec<CandidateRow>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM candidates WHERE id IN (");
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(") ORDER BY id");
    builder.build_query_as::<CandidateRow>().fetch_all(pool).await
}
