//! Author Service - the author/book association
//!
//! The relation lives only in the `book_authors` link table. Both
//! directions are answered by looking pairs up there.

use sea_orm::*;
use std::collections::BTreeSet;

use crate::domain::{DomainError, DomainResult};
use crate::models::author::{self, Entity as Author};
use crate::models::book::{self, Entity as Book};
use crate::models::book_authors::{self, Entity as BookAuthors};

/// Rename an author and make its book set exactly `book_ids`
///
/// Links missing from `book_ids` are removed, new ones are added and the
/// rest are left alone. Unknown author or book ids fail with `NotFound`
/// before anything is written.
pub async fn update_author<I>(
    db: &DatabaseConnection,
    author_id: i32,
    name: String,
    book_ids: I,
) -> DomainResult<author::Model>
where
    I: IntoIterator<Item = i32>,
{
    let txn = db.begin().await?;
    let updated = relink_author(&txn, author_id, name, book_ids).await?;
    txn.commit().await?;

    tracing::info!("Author {} updated", author_id);
    Ok(updated)
}

/// Same as [`update_author`], on `conn` and without committing
pub(crate) async fn relink_author<C, I>(
    conn: &C,
    author_id: i32,
    name: String,
    book_ids: I,
) -> DomainResult<author::Model>
where
    C: ConnectionTrait,
    I: IntoIterator<Item = i32>,
{
    if name.trim().is_empty() {
        return Err(DomainError::validation("author name must not be empty"));
    }
    let target: BTreeSet<i32> = book_ids.into_iter().collect();

    let existing = Author::find_by_id(author_id)
        .one(conn)
        .await?
        .ok_or(DomainError::not_found("author", author_id))?;

    if !target.is_empty() {
        let known: BTreeSet<i32> = Book::find()
            .select_only()
            .column(book::Column::Id)
            .filter(book::Column::Id.is_in(target.iter().copied()))
            .into_tuple::<i32>()
            .all(conn)
            .await?
            .into_iter()
            .collect();

        if let Some(missing) = target.difference(&known).next() {
            return Err(DomainError::not_found("book", *missing));
        }
    }

    let current: BTreeSet<i32> = BookAuthors::find()
        .filter(book_authors::Column::AuthorId.eq(author_id))
        .all(conn)
        .await?
        .into_iter()
        .map(|link| link.book_id)
        .collect();

    let stale: Vec<i32> = current.difference(&target).copied().collect();
    let fresh: Vec<book_authors::ActiveModel> = target
        .difference(&current)
        .map(|&book_id| book_authors::link(book_id, author_id))
        .collect();
    let (removed, added) = (stale.len(), fresh.len());

    if !stale.is_empty() {
        BookAuthors::delete_many()
            .filter(book_authors::Column::AuthorId.eq(author_id))
            .filter(book_authors::Column::BookId.is_in(stale))
            .exec(conn)
            .await?;
    }
    if !fresh.is_empty() {
        BookAuthors::insert_many(fresh)
            .exec_without_returning(conn)
            .await?;
    }

    let mut active: author::ActiveModel = existing.into();
    active.name = Set(name);
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());
    let updated = active.update(conn).await?;

    tracing::debug!(
        "Author {} relinked: {} book(s) added, {} removed",
        author_id,
        added,
        removed
    );
    Ok(updated)
}

/// Books linked to an author
pub async fn books_of_author(
    db: &DatabaseConnection,
    author_id: i32,
) -> DomainResult<Vec<book::Model>> {
    let author = Author::find_by_id(author_id)
        .one(db)
        .await?
        .ok_or(DomainError::not_found("author", author_id))?;

    Ok(author.find_related(Book).all(db).await?)
}

/// Authors linked to a book
pub async fn authors_of_book(
    db: &DatabaseConnection,
    book_id: i32,
) -> DomainResult<Vec<author::Model>> {
    let book = Book::find_by_id(book_id)
        .one(db)
        .await?
        .ok_or(DomainError::not_found("book", book_id))?;

    Ok(book.find_related(Author).all(db).await?)
}
