//! Report Service - read-only cross-entity queries
//!
//! Computed by joins on every call; nothing here is cached.

use sea_orm::sea_query::Query;
use sea_orm::*;
use serde::Serialize;

use crate::domain::DomainResult;
use crate::models::author::{self, Entity as Author};
use crate::models::book::{self, Entity as Book};
use crate::models::book_authors;
use crate::models::branch;
use crate::models::copy::{self, Entity as Copy};
use crate::models::loan::{self, Entity as Loan};
use crate::models::person;

/// A book together with its authors
#[derive(Debug, Clone, Serialize)]
pub struct BookWithAuthors {
    pub book: book::Model,
    pub authors: Vec<author::Model>,
}

/// Every book that has at least one author, authors loaded
pub async fn find_books_with_authors(db: &DatabaseConnection) -> DomainResult<Vec<BookWithAuthors>> {
    let linked = Query::select()
        .column(book_authors::Column::BookId)
        .from(book_authors::Entity)
        .to_owned();

    let books: Vec<BookWithAuthors> = Book::find()
        .filter(book::Column::Id.in_subquery(linked))
        .find_with_related(Author)
        .all(db)
        .await?
        .into_iter()
        .map(|(book, authors)| BookWithAuthors { book, authors })
        .collect();

    tracing::debug!("{} book(s) with authors", books.len());
    Ok(books)
}

/// `(book title, branch name)` for each book/branch pair holding a copy
///
/// Several copies of one book at the same branch give a single row; the
/// same title at two branches gives two.
pub async fn find_books_with_branches(
    db: &DatabaseConnection,
) -> DomainResult<Vec<(String, String)>> {
    let rows = Copy::find()
        .select_only()
        .column(book::Column::Title)
        .column(branch::Column::Name)
        .join(JoinType::InnerJoin, copy::Relation::Book.def())
        .join(JoinType::InnerJoin, copy::Relation::Branch.def())
        .group_by(book::Column::Id)
        .group_by(book::Column::Title)
        .group_by(branch::Column::Id)
        .group_by(branch::Column::Name)
        .order_by_asc(book::Column::Title)
        .into_tuple::<(String, String)>()
        .all(db)
        .await?;

    tracing::debug!("{} book/branch row(s)", rows.len());
    Ok(rows)
}

/// `(book title, borrower name)` for every active loan
pub async fn find_books_on_loan(db: &DatabaseConnection) -> DomainResult<Vec<(String, String)>> {
    let rows = Loan::find()
        .select_only()
        .column(book::Column::Title)
        .column(person::Column::Name)
        .join(JoinType::InnerJoin, loan::Relation::Copy.def())
        .join(JoinType::InnerJoin, copy::Relation::Book.def())
        .join(JoinType::InnerJoin, loan::Relation::Person.def())
        .filter(loan::Column::Active.eq(true))
        .order_by_asc(loan::Column::LoanDate)
        .into_tuple::<(String, String)>()
        .all(db)
        .await?;

    tracing::debug!("{} book(s) on loan", rows.len());
    Ok(rows)
}
