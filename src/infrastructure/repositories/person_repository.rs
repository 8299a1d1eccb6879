//! SeaORM implementation of PersonRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set,
};

use crate::domain::{DomainResult, NewPerson, PersonRepository};
use crate::models::person::{ActiveModel, Column, Entity as PersonEntity, Model};

pub struct SeaOrmPersonRepository {
    db: DatabaseConnection,
}

impl SeaOrmPersonRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PersonRepository for SeaOrmPersonRepository {
    async fn find_all(&self) -> DomainResult<Vec<Model>> {
        Ok(PersonEntity::find().all(&self.db).await?)
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Model>> {
        Ok(PersonEntity::find_by_id(id).one(&self.db).await?)
    }

    async fn find_by_national_id(&self, national_id: &str) -> DomainResult<Option<Model>> {
        Ok(PersonEntity::find()
            .filter(Column::NationalId.eq(national_id))
            .one(&self.db)
            .await?)
    }

    async fn create(&self, input: NewPerson) -> DomainResult<Model> {
        insert_person(&self.db, input).await
    }
}

pub(crate) async fn insert_person<C>(conn: &C, input: NewPerson) -> DomainResult<Model>
where
    C: ConnectionTrait,
{
    let now = chrono::Utc::now().to_rfc3339();

    let person = ActiveModel {
        national_id: Set(input.national_id),
        name: Set(input.name),
        phone: Set(input.phone),
        email: Set(input.email),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    Ok(person.insert(conn).await?)
}
