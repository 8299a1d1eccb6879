//! SeaORM implementation of BookRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set,
};

use crate::domain::{BookRepository, DomainResult, NewBook};
use crate::models::book::{ActiveModel, Column, Entity as BookEntity, Model};

/// SeaORM-based implementation of BookRepository
pub struct SeaOrmBookRepository {
    db: DatabaseConnection,
}

impl SeaOrmBookRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BookRepository for SeaOrmBookRepository {
    async fn find_all(&self) -> DomainResult<Vec<Model>> {
        Ok(BookEntity::find().all(&self.db).await?)
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Model>> {
        Ok(BookEntity::find_by_id(id).one(&self.db).await?)
    }

    async fn find_by_isbn(&self, isbn: &str) -> DomainResult<Option<Model>> {
        Ok(BookEntity::find()
            .filter(Column::Isbn.eq(isbn))
            .one(&self.db)
            .await?)
    }

    async fn create(&self, input: NewBook) -> DomainResult<Model> {
        insert_book(&self.db, input).await
    }
}

pub(crate) async fn insert_book<C>(conn: &C, input: NewBook) -> DomainResult<Model>
where
    C: ConnectionTrait,
{
    let now = chrono::Utc::now().to_rfc3339();

    let new_book = ActiveModel {
        isbn: Set(input.isbn),
        title: Set(input.title),
        publisher: Set(input.publisher),
        publication_year: Set(input.publication_year),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    // A reused ISBN surfaces as ConstraintViolation through From<DbErr>
    Ok(new_book.insert(conn).await?)
}
