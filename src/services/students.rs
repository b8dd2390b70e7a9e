//! Student management service

use uuid::Uuid;

use crate::{
    error::AppResult,
    models::student::{CreateStudent, Student, StudentQuery, UpdateStudent},
    repository::Repository,
};

#[derive(Clone)]
pub struct StudentsService {
    repository: Repository,
}

impl StudentsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &StudentQuery) -> AppResult<Vec<Student>> {
        self.repository.students.list(query).await
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Student> {
        self.repository.students.get_by_id(id).await
    }

    pub async fn create(&self, student: CreateStudent) -> AppResult<Student> {
        self.repository.students.create(&student).await
    }

    pub async fn update(&self, id: Uuid, update: UpdateStudent) -> AppResult<Student> {
        self.repository.students.update(id, &update).await
    }

    /// Deactivate instead of delete; history stays intact
    pub async fn deactivate(&self, id: Uuid) -> AppResult<Student> {
        let student = self.repository.students.deactivate(id).await?;
        tracing::info!(student_id = %id, "Student deactivated");
        Ok(student)
    }
}
