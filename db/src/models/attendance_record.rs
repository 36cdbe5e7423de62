use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, PaginatorTrait, QueryOrder, QuerySelect, Set};
use std::collections::HashMap;

/// One accepted check-in. At most one per `(session_id, student_id)`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, serde::Serialize)]
#[sea_orm(table_name = "attendance_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub session_id: i64,
    pub student_name: String,
    pub student_id: String,
    pub student_email: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub ip_address: Option<String>,
    pub checked_in_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::attendance_session::Entity",
        from = "Column::SessionId",
        to = "super::attendance_session::Column::Id",
        on_delete = "Cascade"
    )]
    Session,
}

impl Related<super::attendance_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Default)]
pub struct NewRecord {
    pub session_id: i64,
    pub student_name: String,
    pub student_id: String,
    pub student_email: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub ip_address: Option<String>,
}

impl Model {
    pub async fn insert<C: ConnectionTrait>(db: &C, new: NewRecord) -> Result<Self, DbErr> {
        ActiveModel {
            session_id: Set(new.session_id),
            student_name: Set(new.student_name),
            student_id: Set(new.student_id),
            student_email: Set(new.student_email),
            latitude: Set(new.latitude),
            longitude: Set(new.longitude),
            ip_address: Set(new.ip_address),
            checked_in_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    /// Most recent check-in first.
    pub async fn for_session<C: ConnectionTrait>(db: &C, session_id: i64) -> Result<Vec<Self>, DbErr> {
        Entity::find()
            .filter(Column::SessionId.eq(session_id))
            .order_by_desc(Column::CheckedInAt)
            .order_by_desc(Column::Id)
            .all(db)
            .await
    }

    pub async fn for_sessions<C: ConnectionTrait>(
        db: &C,
        session_ids: &[i64],
    ) -> Result<Vec<Self>, DbErr> {
        if session_ids.is_empty() {
            return Ok(Vec::new());
        }
        Entity::find()
            .filter(Column::SessionId.is_in(session_ids.to_vec()))
            .all(db)
            .await
    }

    pub async fn find_for_student<C: ConnectionTrait>(
        db: &C,
        session_id: i64,
        student_id: &str,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find()
            .filter(Column::SessionId.eq(session_id))
            .filter(Column::StudentId.eq(student_id))
            .one(db)
            .await
    }

    pub async fn count_for_session<C: ConnectionTrait>(db: &C, session_id: i64) -> Result<u64, DbErr> {
        Entity::find()
            .filter(Column::SessionId.eq(session_id))
            .count(db)
            .await
    }

    /// Record counts keyed by session id. Sessions with no records are absent.
    pub async fn count_by_sessions<C: ConnectionTrait>(
        db: &C,
        session_ids: &[i64],
    ) -> Result<HashMap<i64, i64>, DbErr> {
        if session_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<(i64, i64)> = Entity::find()
            .select_only()
            .column(Column::SessionId)
            .column_as(Expr::col(Column::Id).count(), "count")
            .filter(Column::SessionId.is_in(session_ids.to_vec()))
            .group_by(Column::SessionId)
            .into_tuple()
            .all(db)
            .await?;
        Ok(rows.into_iter().collect())
    }

    /// Returns `true` if a record was removed.
    pub async fn delete_for_student<C: ConnectionTrait>(
        db: &C,
        session_id: i64,
        student_id: &str,
    ) -> Result<bool, DbErr> {
        let res = Entity::delete_many()
            .filter(Column::SessionId.eq(session_id))
            .filter(Column::StudentId.eq(student_id))
            .exec(db)
            .await?;
        Ok(res.rows_affected > 0)
    }
}
