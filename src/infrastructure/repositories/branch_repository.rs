//! SeaORM implementation of BranchRepository

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, Set};

use crate::domain::{BranchRepository, DomainResult, NewBranch};
use crate::models::branch::{ActiveModel, Entity as BranchEntity, Model};

pub struct SeaOrmBranchRepository {
    db: DatabaseConnection,
}

impl SeaOrmBranchRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BranchRepository for SeaOrmBranchRepository {
    async fn find_all(&self) -> DomainResult<Vec<Model>> {
        Ok(BranchEntity::find().all(&self.db).await?)
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Model>> {
        Ok(BranchEntity::find_by_id(id).one(&self.db).await?)
    }

    async fn create(&self, input: NewBranch) -> DomainResult<Model> {
        insert_branch(&self.db, input).await
    }
}

pub(crate) async fn insert_branch<C>(conn: &C, input: NewBranch) -> DomainResult<Model>
where
    C: ConnectionTrait,
{
    let now = chrono::Utc::now().to_rfc3339();

    let branch = ActiveModel {
        name: Set(input.name),
        city: Set(input.city),
        address: Set(input.address),
        phone: Set(input.phone),
        email: Set(input.email),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    Ok(branch.insert(conn).await?)
}
