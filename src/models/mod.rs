//! Data models for Libroteca

pub mod book;
pub mod borrowing;
pub mod claims;
pub mod request;
pub mod setting;
pub mod student;

// Re-export commonly used types
pub use book::{Book, BookSummary};
pub use borrowing::{Borrowing, BorrowingDetails};
pub use claims::{Role, UserClaims};
pub use request::{BorrowRequest, RequestDetails, RequestStatus, ReviewDecision};
pub use setting::{LibrarySetting, LoanPolicy};
pub use student::{Student, StudentSummary};
