//! Repository implementations using SeaORM

pub mod author_repository;
pub mod book_repository;
pub mod branch_repository;
pub mod copy_repository;
pub mod person_repository;

pub use author_repository::SeaOrmAuthorRepository;
pub use book_repository::SeaOrmBookRepository;
pub use branch_repository::SeaOrmBranchRepository;
pub use copy_repository::SeaOrmCopyRepository;
pub use person_repository::SeaOrmPersonRepository;

pub(crate) use author_repository::insert_author;
pub(crate) use book_repository::insert_book;
pub(crate) use branch_repository::insert_branch;
pub(crate) use copy_repository::insert_copy;
pub(crate) use person_repository::insert_person;
