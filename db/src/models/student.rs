use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, QueryOrder, Set};

/// One roster entry. `student_id` is the external identifier students type at check-in.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, serde::Serialize)]
#[sea_orm(table_name = "students")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub class_id: i64,
    pub student_id: String,
    pub name: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::class::Entity",
        from = "Column::ClassId",
        to = "super::class::Column::Id",
        on_delete = "Cascade"
    )]
    Class,
}

impl Related<super::class::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Class.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Input row for bulk roster inserts.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct NewStudent {
    pub student_id: String,
    pub name: String,
    pub email: Option<String>,
}

impl Model {
    pub async fn create<C: ConnectionTrait>(
        db: &C,
        class_id: i64,
        student_id: &str,
        name: &str,
        email: Option<String>,
    ) -> Result<Self, DbErr> {
        ActiveModel {
            class_id: Set(class_id),
            student_id: Set(student_id.trim().to_owned()),
            name: Set(name.trim().to_owned()),
            email: Set(email.map(|e| e.trim().to_owned()).filter(|e| !e.is_empty())),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    /// Inserts every row with a non-empty id and name; returns how many were added.
    pub async fn create_many<C: ConnectionTrait>(
        db: &C,
        class_id: i64,
        rows: &[NewStudent],
    ) -> Result<u64, DbErr> {
        let mut added = 0;
        for row in rows {
            if row.student_id.trim().is_empty() || row.name.trim().is_empty() {
                continue;
            }
            Self::create(db, class_id, &row.student_id, &row.name, row.email.clone()).await?;
            added += 1;
        }
        Ok(added)
    }

    /// Roster in insertion order.
    pub async fn roster<C: ConnectionTrait>(db: &C, class_id: i64) -> Result<Vec<Self>, DbErr> {
        Entity::find()
            .filter(Column::ClassId.eq(class_id))
            .order_by_asc(Column::Id)
            .all(db)
            .await
    }

    pub async fn find_in_roster<C: ConnectionTrait>(
        db: &C,
        class_id: i64,
        student_id: &str,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find()
            .filter(Column::ClassId.eq(class_id))
            .filter(Column::StudentId.eq(student_id.trim()))
            .one(db)
            .await
    }

    /// Removes a roster row by its row id. Returns `false` if it was not in the class.
    pub async fn remove<C: ConnectionTrait>(db: &C, class_id: i64, row_id: i64) -> Result<bool, DbErr> {
        let res = Entity::delete_many()
            .filter(Column::Id.eq(row_id))
            .filter(Column::ClassId.eq(class_id))
            .exec(db)
            .await?;
        Ok(res.rows_affected > 0)
    }
}
