//! Students repository for database operations

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::student::{CreateStudent, Student, StudentQuery, UpdateStudent},
};

#[derive(Clone)]
pub struct StudentsRepository {
    pool: Pool<Postgres>,
}

impl StudentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get student by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Student> {
        sqlx::query_as::<_, Student>("SELECT * FROM students WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Student with id {} not found", id)))
    }

    /// List students with optional search and active filter
    pub async fn list(&self, query: &StudentQuery) -> AppResult<Vec<Student>> {
        let search = query
            .search
            .as_ref()
            .map(|s| format!("%{}%", s))
            .unwrap_or_else(|| "%".to_string());
        let active_only = query.active_only.unwrap_or(false);
        let limit = query.limit.unwrap_or(50).clamp(1, 200);
        let offset = query.offset.unwrap_or(0).max(0);

        let students = sqlx::query_as::<_, Student>(
            r#"
            SELECT * FROM students
            WHERE (name ILIKE $1 OR student_code ILIKE $1)
              AND (NOT $2 OR is_active)
            ORDER BY name
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(search)
        .bind(active_only)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(students)
    }

    /// Create a new student record
    pub async fn create(&self, student: &CreateStudent) -> AppResult<Student> {
        let result = sqlx::query_as::<_, Student>(
            r#"
            INSERT INTO students (student_code, name, email, phone, class_grade)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&student.student_code)
        .bind(&student.name)
        .bind(&student.email)
        .bind(&student.phone)
        .bind(&student.class_grade)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(created) => Ok(created),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(AppError::Conflict(format!(
                    "Student code {} already exists",
                    student.student_code
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Update a student record
    pub async fn update(&self, id: Uuid, update: &UpdateStudent) -> AppResult<Student> {
        sqlx::query_as::<_, Student>(
            r#"
            UPDATE students SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                class_grade = COALESCE($5, class_grade),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.email)
        .bind(&update.phone)
        .bind(&update.class_grade)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Student with id {} not found", id)))
    }

    /// Deactivate a student (students are never deleted)
    pub async fn deactivate(&self, id: Uuid) -> AppResult<Student> {
        sqlx::query_as::<_, Student>(
            "UPDATE students SET is_active = FALSE, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Student with id {} not found", id)))
    }

    /// Count active students
    pub async fn count_active(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students WHERE is_active")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
