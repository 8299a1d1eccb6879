//! SeaORM implementation of CopyRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};

use crate::domain::{CopyRepository, DomainError, DomainResult, NewCopy};
use crate::models::book::Entity as BookEntity;
use crate::models::branch::Entity as BranchEntity;
use crate::models::copy::{ActiveModel, Column, Entity as CopyEntity, Model};

/// SeaORM-based implementation of CopyRepository
pub struct SeaOrmCopyRepository {
    db: DatabaseConnection,
}

impl SeaOrmCopyRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CopyRepository for SeaOrmCopyRepository {
    async fn find_all(&self) -> DomainResult<Vec<Model>> {
        Ok(CopyEntity::find().all(&self.db).await?)
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Model>> {
        Ok(CopyEntity::find_by_id(id).one(&self.db).await?)
    }

    async fn find_by_barcode(&self, barcode: &str) -> DomainResult<Option<Model>> {
        Ok(CopyEntity::find()
            .filter(Column::Barcode.eq(barcode))
            .one(&self.db)
            .await?)
    }

    async fn find_by_book_id(&self, book_id: i32) -> DomainResult<Vec<Model>> {
        Ok(CopyEntity::find()
            .filter(Column::BookId.eq(book_id))
            .all(&self.db)
            .await?)
    }

    async fn create(&self, input: NewCopy) -> DomainResult<Model> {
        let txn = self.db.begin().await?;
        let result = insert_copy(&txn, input).await?;
        txn.commit().await?;

        Ok(result)
    }
}

/// Insert an available copy after checking its book and branch exist
pub(crate) async fn insert_copy<C>(conn: &C, input: NewCopy) -> DomainResult<Model>
where
    C: ConnectionTrait,
{
    BookEntity::find_by_id(input.book_id)
        .one(conn)
        .await?
        .ok_or(DomainError::not_found("book", input.book_id))?;
    BranchEntity::find_by_id(input.branch_id)
        .one(conn)
        .await?
        .ok_or(DomainError::not_found("branch", input.branch_id))?;

    let now = chrono::Utc::now().to_rfc3339();

    let new_copy = ActiveModel {
        barcode: Set(input.barcode),
        book_id: Set(input.book_id),
        branch_id: Set(input.branch_id),
        available: Set(true),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    Ok(new_copy.insert(conn).await?)
}
