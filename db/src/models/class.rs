use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, QueryOrder, QuerySelect, Set, TransactionTrait};
use std::collections::HashMap;

/// A named class owned by a teacher. Its roster lives in `students`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, serde::Serialize)]
#[sea_orm(table_name = "classes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub teacher_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::teacher::Entity",
        from = "Column::TeacherId",
        to = "super::teacher::Column::Id",
        on_delete = "Cascade"
    )]
    Teacher,
    #[sea_orm(has_many = "super::student::Entity")]
    Students,
    #[sea_orm(has_many = "super::attendance_session::Entity")]
    Sessions,
}

impl Related<super::teacher::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Teacher.def()
    }
}

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Students.def()
    }
}

impl Related<super::attendance_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create<C: ConnectionTrait>(
        db: &C,
        teacher_id: i64,
        name: &str,
        description: Option<String>,
    ) -> Result<Self, DbErr> {
        let now = Utc::now();
        ActiveModel {
            teacher_id: Set(teacher_id),
            name: Set(name.trim().to_owned()),
            description: Set(description),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    /// Fetches a class only if it belongs to `teacher_id`.
    pub async fn find_owned<C: ConnectionTrait>(
        db: &C,
        teacher_id: i64,
        class_id: i64,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find_by_id(class_id)
            .filter(Column::TeacherId.eq(teacher_id))
            .one(db)
            .await
    }

    /// Newest first.
    pub async fn list_for_teacher<C: ConnectionTrait>(
        db: &C,
        teacher_id: i64,
    ) -> Result<Vec<Self>, DbErr> {
        Entity::find()
            .filter(Column::TeacherId.eq(teacher_id))
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(db)
            .await
    }

    /// Applies the provided fields; `None` leaves a field unchanged.
    pub async fn update<C: ConnectionTrait>(
        self,
        db: &C,
        name: Option<&str>,
        description: Option<Option<String>>,
    ) -> Result<Self, DbErr> {
        let mut am: ActiveModel = self.into();
        if let Some(name) = name {
            am.name = Set(name.trim().to_owned());
        }
        if let Some(description) = description {
            am.description = Set(description);
        }
        am.updated_at = Set(Utc::now());
        am.update(db).await
    }

    /// Deletes the class and its roster, unlinking any sessions that referenced it.
    pub async fn delete_with_roster(
        self,
        db: &DatabaseConnection,
    ) -> Result<(), DbErr> {
        let txn = db.begin().await?;

        super::attendance_session::Entity::update_many()
            .col_expr(
                super::attendance_session::Column::ClassId,
                Expr::value(Option::<i64>::None),
            )
            .filter(super::attendance_session::Column::ClassId.eq(self.id))
            .exec(&txn)
            .await?;

        super::student::Entity::delete_many()
            .filter(super::student::Column::ClassId.eq(self.id))
            .exec(&txn)
            .await?;

        Entity::delete_by_id(self.id).exec(&txn).await?;

        txn.commit().await
    }

    /// Roster sizes keyed by class id. Classes with no students are absent.
    pub async fn student_counts<C: ConnectionTrait>(
        db: &C,
        class_ids: &[i64],
    ) -> Result<HashMap<i64, i64>, DbErr> {
        if class_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(i64, i64)> = super::student::Entity::find()
            .select_only()
            .column(super::student::Column::ClassId)
            .column_as(Expr::col(super::student::Column::Id).count(), "count")
            .filter(super::student::Column::ClassId.is_in(class_ids.to_vec()))
            .group_by(super::student::Column::ClassId)
            .into_tuple()
            .all(db)
            .await?;

        Ok(rows.into_iter().collect())
    }
}
