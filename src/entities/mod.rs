//! Entity module - Contains all SeaORM entity definitions for the database.
//! Each table is named after its entity in the singular. Every entity has a
//! Model struct for data and an Entity struct for operations.

pub mod administrator;
pub mod author;
pub mod book;
pub mod book_copy;
pub mod format;
pub mod genre;
pub mod member;
pub mod publisher;
pub mod transaction;
pub mod transaction_detail;

// Re-export specific types to avoid conflicts
pub use administrator::{
    Column as AdministratorColumn, Entity as Administrator, Model as AdministratorModel,
};
pub use author::{Column as AuthorColumn, Entity as Author, Model as AuthorModel};
pub use book::{Column as BookColumn, Entity as Book, Model as BookModel};
pub use book_copy::{Column as BookCopyColumn, Entity as BookCopy, Model as BookCopyModel};
pub use format::{Column as FormatColumn, Entity as Format, Model as FormatModel};
pub use genre::{Column as GenreColumn, Entity as Genre, Model as GenreModel};
pub use member::{Column as MemberColumn, Entity as Member, Model as MemberModel};
pub use publisher::{Column as PublisherColumn, Entity as Publisher, Model as PublisherModel};
pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, Model as TransactionModel,
};
pub use transaction_detail::{
    Column as TransactionDetailColumn, Entity as TransactionDetail,
    Model as TransactionDetailModel,
};
