//! SeaORM implementation of AuthorRepository

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, Set};

use crate::domain::{AuthorRepository, DomainError, DomainResult};
use crate::models::author::{ActiveModel, Entity as AuthorEntity, Model};

/// SeaORM-based implementation of AuthorRepository
pub struct SeaOrmAuthorRepository {
    db: DatabaseConnection,
}

impl SeaOrmAuthorRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuthorRepository for SeaOrmAuthorRepository {
    async fn find_all(&self) -> DomainResult<Vec<Model>> {
        Ok(AuthorEntity::find().all(&self.db).await?)
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Model>> {
        Ok(AuthorEntity::find_by_id(id).one(&self.db).await?)
    }

    async fn create(&self, name: String) -> DomainResult<Model> {
        insert_author(&self.db, name).await
    }
}

/// Insert an author on `conn`, which may be an open transaction
pub(crate) async fn insert_author<C>(conn: &C, name: String) -> DomainResult<Model>
where
    C: ConnectionTrait,
{
    if name.trim().is_empty() {
        return Err(DomainError::validation("author name must not be empty"));
    }

    let now = chrono::Utc::now().to_rfc3339();

    let author = ActiveModel {
        name: Set(name),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    Ok(author.insert(conn).await?)
}
