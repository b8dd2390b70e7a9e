//! Books repository for database operations

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery, CreateBook, UpdateBook},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// List books with optional search and availability filter
    pub async fn list(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        let search = query
            .search
            .as_ref()
            .map(|s| format!("%{}%", s))
            .unwrap_or_else(|| "%".to_string());
        let available_only = query.available_only.unwrap_or(false);
        let limit = query.limit.unwrap_or(50).clamp(1, 200);
        let offset = query.offset.unwrap_or(0).max(0);

        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT * FROM books
            WHERE (title ILIKE $1 OR author ILIKE $1)
              AND (NOT $2 OR available_quantity > 0)
            ORDER BY title
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(search)
        .bind(available_only)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    /// Create a new book; all copies start available
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, isbn, description, shelf_location, quantity, available_quantity)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(&book.description)
        .bind(&book.shelf_location)
        .bind(book.quantity)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Update a book
    ///
    /// A quantity change shifts `available_quantity` by the same delta in a
    /// single conditional update, so lent-out copies are never dropped from
    /// the count and the update fails cleanly if it would strand more
    /// copies on loan than the new quantity allows.
    pub async fn update(&self, id: Uuid, update: &UpdateBook) -> AppResult<Book> {
        let updated = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books SET
                title = COALESCE($2, title),
                author = COALESCE($3, author),
                isbn = COALESCE($4, isbn),
                description = COALESCE($5, description),
                shelf_location = COALESCE($6, shelf_location),
                available_quantity = available_quantity + (COALESCE($7, quantity) - quantity),
                quantity = COALESCE($7, quantity),
                updated_at = now()
            WHERE id = $1
              AND available_quantity + (COALESCE($7, quantity) - quantity) >= 0
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.title)
        .bind(&update.author)
        .bind(&update.isbn)
        .bind(&update.description)
        .bind(&update.shelf_location)
        .bind(update.quantity)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(book) => Ok(book),
            None => {
                // Distinguish a missing book from a quantity reduction that
                // would cut below the number of copies currently lent out.
                self.get_by_id(id).await?;
                Err(AppError::Validation(format!(
                    "Cannot reduce quantity of book {} below the number of copies currently lent out",
                    id
                )))
            }
        }
    }

    /// Delete a book, refused while it has active borrowings or pending requests
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let has_activity: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM borrowings WHERE book_id = $1 AND returned_at IS NULL
            ) OR EXISTS(
                SELECT 1 FROM borrow_requests WHERE book_id = $1 AND status = 'pending'
            )
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if has_activity {
            return Err(AppError::Conflict(format!(
                "Book {} has active borrowings or pending requests",
                id
            )));
        }

        let rows = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        Ok(())
    }

    /// Most-borrowed books, by lifetime issuance count
    pub async fn popular(&self, limit: i64) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT * FROM books ORDER BY times_borrowed DESC, title LIMIT $1",
        )
        .bind(limit.clamp(1, 50))
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    /// Count all books
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
