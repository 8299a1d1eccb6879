pub mod author;
pub mod book;
pub mod book_authors;
pub mod branch;
pub mod copy;
pub mod loan;
pub mod person;
