//! Catalog service

use uuid::Uuid;

use crate::{
    error::AppResult,
    models::book::{Book, BookQuery, CreateBook, UpdateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Browse the catalog
    pub async fn list_books(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        self.repository.books.list(query).await
    }

    /// Get a single book
    pub async fn get_book(&self, id: Uuid) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Add a book to the catalog
    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        self.repository.books.create(&book).await
    }

    /// Update catalog fields or stock quantity
    pub async fn update_book(&self, id: Uuid, update: UpdateBook) -> AppResult<Book> {
        self.repository.books.update(id, &update).await
    }

    /// Remove a book from the catalog
    pub async fn delete_book(&self, id: Uuid) -> AppResult<()> {
        self.repository.books.delete(id).await
    }

    /// Most-borrowed books
    pub async fn popular_books(&self, limit: i64) -> AppResult<Vec<Book>> {
        self.repository.books.popular(limit).await
    }
}
