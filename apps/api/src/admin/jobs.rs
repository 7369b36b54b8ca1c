use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::info;

use crate::models::job::JobRow;

fn default_min_quiz_score() -> f64 {
    10.0
}

fn default_min_resume_score() -> f64 {
    75.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewJob {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub skills_required: String,
    #[serde(default = "default_min_quiz_score")]
    pub min_quiz_score: f64,
    #[serde(default = "default_min_resume_score")]
    pub min_resume_score: f64,
}

pub async fn insert_job(pool: &SqlitePool, job: &NewJob) -> Result<JobRow, sqlx::Error> {
    let row = sqlx::query_as::<_, JobRow>(
        r#"
        INSERT INTO jobs (title, description, skills_required, min_quiz_score, min_resume_score)
        VALUES (?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&job.title)
    .bind(&job.description)
    .bind(&job.skills_required)
    .bind(job.min_quiz_score)
    .bind(job.min_resume_score)
    .fetch_one(pool)
    .await?;

    info!("Posted job {} '{}'", row.id, row.title);
    Ok(row)
}

/// Newest first.
pub async fn list_jobs(pool: &SqlitePool) -> Result<Vec<JobRow>, sqlx::Error> {
    sqlx::query_as::<_, JobRow>("SELECT * FROM jobs ORDER BY id DESC")
        .fetch_all(pool)
        .await
}

pub async fn find_job(pool: &SqlitePool, id: i64) -> Result<Option<JobRow>, sqlx::Error> {
    sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[test]
    fn test_new_job_defaults_thresholds() {
        let job: NewJob = serde_json::from_str(
            r#"{"title": "Backend", "description": "APIs in Rust"}"#,
        )
        .unwrap();
        assert_eq!(job.min_quiz_score, 10.0);
        assert_eq!(job.min_resume_score, 75.0);
        assert!(job.skills_required.is_empty());
    }

    #[tokio::test]
    async fn test_insert_and_list_newest_first() {
        let pool = test_pool().await;
        let first = NewJob {
            title: "Data Engineer".into(),
            description: "Pipelines".into(),
            skills_required: "python, sql".into(),
            min_quiz_score: 50.0,
            min_resume_score: 70.0,
        };
        let second = NewJob {
            title: "Frontend".into(),
            ..first.clone()
        };
        let a = insert_job(&pool, &first).await.unwrap();
        let b = insert_job(&pool, &second).await.unwrap();

        let jobs = list_jobs(&pool).await.unwrap();
        assert_eq!(jobs.iter().map(|j| j.id).collect::<Vec<_>>(), vec![b.id, a.id]);
        assert_eq!(find_job(&pool, a.id).await.unwrap().unwrap().skills_required, "python, sql");
        assert!(find_job(&pool, 9999).await.unwrap().is_none());
    }
}
