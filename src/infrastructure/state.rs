//! Store handle containing repositories and the database connection
//!
//! A `Library` is opened once, passed to (or owned by) whatever drives
//! it, and closed explicitly. There is no process-wide session.

use chrono::NaiveDate;
use sea_orm::{ConnectOptions, DatabaseConnection, EntityTrait};
use std::sync::Arc;

use super::config::Config;
use super::db::{init_db, init_db_with};
use super::{
    SeaOrmAuthorRepository, SeaOrmBookRepository, SeaOrmBranchRepository, SeaOrmCopyRepository,
    SeaOrmPersonRepository,
};
use crate::domain::{
    AuthorRepository, BookRepository, BranchRepository, CopyRepository, DomainResult, NewBook,
    NewBranch, NewCopy, NewPerson, PersonRepository,
};
use crate::models::{author, book, branch, copy, loan, person};
use crate::services::{BookWithAuthors, author_service, loan_service, report_service};

pub struct Library {
    db: DatabaseConnection,
    /// Author repository
    pub authors: Arc<dyn AuthorRepository>,
    /// Book repository
    pub books: Arc<dyn BookRepository>,
    /// Branch repository
    pub branches: Arc<dyn BranchRepository>,
    /// Person repository
    pub people: Arc<dyn PersonRepository>,
    /// Copy repository
    pub copies: Arc<dyn CopyRepository>,
}

impl Library {
    /// Wrap an already initialised connection
    pub fn new(db: DatabaseConnection) -> Self {
        let authors = Arc::new(SeaOrmAuthorRepository::new(db.clone()));
        let books = Arc::new(SeaOrmBookRepository::new(db.clone()));
        let branches = Arc::new(SeaOrmBranchRepository::new(db.clone()));
        let people = Arc::new(SeaOrmPersonRepository::new(db.clone()));
        let copies = Arc::new(SeaOrmCopyRepository::new(db.clone()));

        Self {
            db,
            authors,
            books,
            branches,
            people,
            copies,
        }
    }

    pub async fn open(config: &Config) -> DomainResult<Self> {
        Self::connect(&config.database_url).await
    }

    /// Connect to `database_url` and make sure the schema exists
    pub async fn connect(database_url: &str) -> DomainResult<Self> {
        let db = init_db(database_url).await?;
        tracing::info!("Library store opened at {}", database_url);
        Ok(Self::new(db))
    }

    /// Connect with explicit pool settings, e.g. several connections to a
    /// file-backed store
    pub async fn connect_with(options: ConnectOptions) -> DomainResult<Self> {
        let url = options.get_url().to_string();
        let db = init_db_with(options).await?;
        tracing::info!("Library store opened at {}", url);
        Ok(Self::new(db))
    }

    /// Release the connection pool. Consumes the handle.
    pub async fn close(self) -> DomainResult<()> {
        self.db.close().await?;
        tracing::info!("Library store closed");
        Ok(())
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn add_author(&self, name: impl Into<String>) -> DomainResult<author::Model> {
        self.authors.create(name.into()).await
    }

    pub async fn add_book(
        &self,
        isbn: impl Into<String>,
        title: impl Into<String>,
        publisher: impl Into<String>,
        publication_year: i32,
    ) -> DomainResult<book::Model> {
        self.books
            .create(NewBook {
                isbn: isbn.into(),
                title: title.into(),
                publisher: publisher.into(),
                publication_year,
            })
            .await
    }

    pub async fn add_branch(
        &self,
        name: impl Into<String>,
        city: impl Into<String>,
        address: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
    ) -> DomainResult<branch::Model> {
        self.branches
            .create(NewBranch {
                name: name.into(),
                city: city.into(),
                address: address.into(),
                phone: phone.into(),
                email: email.into(),
            })
            .await
    }

    pub async fn add_person(
        &self,
        national_id: impl Into<String>,
        name: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
    ) -> DomainResult<person::Model> {
        self.people
            .create(NewPerson {
                national_id: national_id.into(),
                name: name.into(),
                phone: phone.into(),
                email: email.into(),
            })
            .await
    }

    /// New copies are always available
    pub async fn add_copy(
        &self,
        barcode: impl Into<String>,
        book_id: i32,
        branch_id: i32,
    ) -> DomainResult<copy::Model> {
        self.copies
            .create(NewCopy {
                barcode: barcode.into(),
                book_id,
                branch_id,
            })
            .await
    }

    pub async fn update_author<I>(
        &self,
        author_id: i32,
        name: impl Into<String>,
        book_ids: I,
    ) -> DomainResult<author::Model>
    where
        I: IntoIterator<Item = i32>,
    {
        author_service::update_author(&self.db, author_id, name.into(), book_ids).await
    }

    /// Every stored row of entity `E`, in no particular order
    ///
    /// ```ignore
    /// let copies = library.list_collection::<copy::Entity>().await?;
    /// ```
    pub async fn list_collection<E>(&self) -> DomainResult<Vec<E::Model>>
    where
        E: EntityTrait,
    {
        Ok(E::find().all(&self.db).await?)
    }

    pub async fn add_loan(
        &self,
        copy_id: i32,
        person_id: i32,
        loan_date: NaiveDate,
        due_date: NaiveDate,
    ) -> DomainResult<loan::Model> {
        loan_service::add_loan(&self.db, copy_id, person_id, loan_date, due_date).await
    }

    pub async fn register_return(
        &self,
        loan_id: i32,
        return_date: NaiveDate,
    ) -> DomainResult<loan::Model> {
        loan_service::register_return(&self.db, loan_id, return_date).await
    }

    pub async fn find_books_with_authors(&self) -> DomainResult<Vec<BookWithAuthors>> {
        report_service::find_books_with_authors(&self.db).await
    }

    pub async fn find_books_with_branches(&self) -> DomainResult<Vec<(String, String)>> {
        report_service::find_books_with_branches(&self.db).await
    }

    pub async fn find_books_on_loan(&self) -> DomainResult<Vec<(String, String)>> {
        report_service::find_books_on_loan(&self.db).await
    }
}
