use chrono::{DateTime, Utc};
use rand::{Rng, RngCore};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, QueryOrder, Set, TransactionTrait};

/// How many random PINs to try before giving up on finding a free one.
const PIN_ATTEMPTS: usize = 20;

/// A check-in window opened by a teacher.
///
/// Students reach it by `session_code` (the QR payload) or the 6-digit `pin`.
/// When `latitude` and `longitude` are both set the session is geofenced.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, serde::Serialize)]
#[sea_orm(table_name = "attendance_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub teacher_id: i64,
    pub title: String,
    pub description: Option<String>,
    #[sea_orm(unique)]
    pub session_code: String,
    #[sea_orm(unique)]
    pub pin: String,
    pub active: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Geofence radius in meters. Non-positive means "use the configured default".
    pub radius_m: i32,
    pub class_id: Option<i64>,
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
    #[sea_orm(
        belongs_to = "super::class::Entity",
        from = "Column::ClassId",
        to = "super::class::Column::Id",
        on_delete = "SetNull"
    )]
    Class,
    #[sea_orm(has_many = "super::attendance_record::Entity")]
    Records,
    #[sea_orm(has_many = "super::allowed_student::Entity")]
    AllowedStudents,
}

impl Related<super::teacher::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Teacher.def()
    }
}

impl Related<super::class::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Class.def()
    }
}

impl Related<super::attendance_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Records.def()
    }
}

impl Related<super::allowed_student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AllowedStudents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Fields a teacher supplies when opening a session.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub teacher_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_m: i32,
    pub class_id: Option<i64>,
    pub active: bool,
}

impl Default for NewSession {
    fn default() -> Self {
        Self {
            teacher_id: 0,
            title: String::new(),
            description: None,
            latitude: None,
            longitude: None,
            radius_m: 0,
            class_id: None,
            active: true,
        }
    }
}

/// 16 random bytes as 32 lowercase hex characters.
pub fn generate_session_code() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Uniform over `100000..=999999`, so never has a leading zero.
pub fn generate_pin() -> String {
    rand::thread_rng().gen_range(100_000..=999_999u32).to_string()
}

impl Model {
    /// Inserts a session with a fresh code and a PIN unused by any other session.
    pub async fn create(db: &DatabaseConnection, new: NewSession) -> Result<Self, DbErr> {
        let txn = db.begin().await?;

        let mut pin = None;
        for _ in 0..PIN_ATTEMPTS {
            let candidate = generate_pin();
            if Self::find_by_pin(&txn, &candidate).await?.is_none() {
                pin = Some(candidate);
                break;
            }
            tracing::debug!(pin = %candidate, "PIN collision, retrying");
        }
        let pin = pin.ok_or_else(|| DbErr::Custom("could not allocate a unique PIN".into()))?;

        let now = Utc::now();
        let model = ActiveModel {
            teacher_id: Set(new.teacher_id),
            title: Set(new.title.trim().to_owned()),
            description: Set(new.description),
            session_code: Set(generate_session_code()),
            pin: Set(pin),
            active: Set(new.active),
            latitude: Set(new.latitude),
            longitude: Set(new.longitude),
            radius_m: Set(new.radius_m),
            class_id: Set(new.class_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(model)
    }

    pub async fn find_by_code<C: ConnectionTrait>(db: &C, code: &str) -> Result<Option<Self>, DbErr> {
        Entity::find()
            .filter(Column::SessionCode.eq(code.trim()))
            .one(db)
            .await
    }

    pub async fn find_by_pin<C: ConnectionTrait>(db: &C, pin: &str) -> Result<Option<Self>, DbErr> {
        Entity::find().filter(Column::Pin.eq(pin)).one(db).await
    }

    /// Fetches a session only if it belongs to `teacher_id`.
    pub async fn find_owned<C: ConnectionTrait>(
        db: &C,
        teacher_id: i64,
        session_id: i64,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find_by_id(session_id)
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

    /// Oldest first, which is the column order of a class report.
    pub async fn list_for_class<C: ConnectionTrait>(db: &C, class_id: i64) -> Result<Vec<Self>, DbErr> {
        Entity::find()
            .filter(Column::ClassId.eq(class_id))
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .all(db)
            .await
    }

    pub async fn set_active<C: ConnectionTrait>(self, db: &C, active: bool) -> Result<Self, DbErr> {
        let mut am: ActiveModel = self.into();
        am.active = Set(active);
        am.updated_at = Set(Utc::now());
        am.update(db).await
    }

    /// Sets the geofence center, and the radius when one is given.
    pub async fn set_location<C: ConnectionTrait>(
        self,
        db: &C,
        latitude: f64,
        longitude: f64,
        radius_m: Option<i32>,
    ) -> Result<Self, DbErr> {
        let mut am: ActiveModel = self.into();
        am.latitude = Set(Some(latitude));
        am.longitude = Set(Some(longitude));
        if let Some(r) = radius_m {
            am.radius_m = Set(r);
        }
        am.updated_at = Set(Utc::now());
        am.update(db).await
    }

    /// Removes the geofence. Subsequent check-ins need no location.
    pub async fn clear_location<C: ConnectionTrait>(self, db: &C) -> Result<Self, DbErr> {
        let mut am: ActiveModel = self.into();
        am.latitude = Set(None);
        am.longitude = Set(None);
        am.updated_at = Set(Utc::now());
        am.update(db).await
    }

    /// Deletes the session together with its records and whitelist.
    pub async fn delete_cascade(self, db: &DatabaseConnection) -> Result<(), DbErr> {
        let txn = db.begin().await?;
        super::attendance_record::Entity::delete_many()
            .filter(super::attendance_record::Column::SessionId.eq(self.id))
            .exec(&txn)
            .await?;
        super::allowed_student::Entity::delete_many()
            .filter(super::allowed_student::Column::SessionId.eq(self.id))
            .exec(&txn)
            .await?;
        Entity::delete_by_id(self.id).exec(&txn).await?;
        txn.commit().await
    }

    /// Geofence center, if both coordinates are set.
    pub fn center(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }

    pub fn effective_radius(&self, default_radius_m: i32) -> i32 {
        if self.radius_m > 0 {
            self.radius_m
        } else {
            default_radius_m
        }
    }
}
