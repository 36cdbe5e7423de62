use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveModelTrait, QueryOrder, Set};

/// Manual whitelist entry for a session that is not linked to a class.
///
/// An empty whitelist admits everyone.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, serde::Serialize)]
#[sea_orm(table_name = "allowed_students")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub session_id: i64,
    pub student_id: String,
    pub student_name: Option<String>,
    pub created_at: DateTime<Utc>,
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

impl Model {
    pub async fn list<C: ConnectionTrait>(db: &C, session_id: i64) -> Result<Vec<Self>, DbErr> {
        Entity::find()
            .filter(Column::SessionId.eq(session_id))
            .order_by_asc(Column::Id)
            .all(db)
            .await
    }

    pub async fn any_for_session<C: ConnectionTrait>(db: &C, session_id: i64) -> Result<bool, DbErr> {
        Ok(Entity::find()
            .filter(Column::SessionId.eq(session_id))
            .one(db)
            .await?
            .is_some())
    }

    pub async fn is_allowed<C: ConnectionTrait>(
        db: &C,
        session_id: i64,
        student_id: &str,
    ) -> Result<bool, DbErr> {
        Ok(Entity::find()
            .filter(Column::SessionId.eq(session_id))
            .filter(Column::StudentId.eq(student_id))
            .one(db)
            .await?
            .is_some())
    }

    /// Adds one entry. Fails with a unique violation if the id is already listed.
    pub async fn add<C: ConnectionTrait>(
        db: &C,
        session_id: i64,
        student_id: &str,
        student_name: Option<String>,
    ) -> Result<Self, DbErr> {
        ActiveModel {
            session_id: Set(session_id),
            student_id: Set(student_id.trim().to_owned()),
            student_name: Set(student_name.map(|n| n.trim().to_owned()).filter(|n| !n.is_empty())),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    /// Adds every non-blank id, silently skipping ones already on the list.
    pub async fn add_many<C: ConnectionTrait>(
        db: &C,
        session_id: i64,
        entries: &[(String, Option<String>)],
    ) -> Result<(), DbErr> {
        let now = Utc::now();
        let models: Vec<ActiveModel> = entries
            .iter()
            .filter(|(sid, _)| !sid.trim().is_empty())
            .map(|(sid, name)| ActiveModel {
                session_id: Set(session_id),
                student_id: Set(sid.trim().to_owned()),
                student_name: Set(name.as_ref().map(|n| n.trim().to_owned()).filter(|n| !n.is_empty())),
                created_at: Set(now),
                ..Default::default()
            })
            .collect();
        if models.is_empty() {
            return Ok(());
        }

        Entity::insert_many(models)
            .on_conflict(
                OnConflict::columns([Column::SessionId, Column::StudentId])
                    .do_nothing()
                    .to_owned(),
            )
            .do_nothing()
            .exec(db)
            .await?;
        Ok(())
    }

    /// Returns `true` if an entry was removed.
    pub async fn remove<C: ConnectionTrait>(
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
