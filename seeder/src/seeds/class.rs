use crate::seed::{SeedFuture, Seeder};
use crate::seeds::{DEMO_CLASS, DEMO_USERNAME};
use db::models::{class, student, teacher};
use sea_orm::{DatabaseConnection, DbErr};

pub struct ClassSeeder;

impl Seeder for ClassSeeder {
    fn seed<'a>(&'a self, db: &'a DatabaseConnection) -> SeedFuture<'a> {
        Box::pin(async move {
            let owner = teacher::Model::find_by_username(db, DEMO_USERNAME)
                .await?
                .ok_or_else(|| DbErr::RecordNotFound(DEMO_USERNAME.into()))?;

            let existing = class::Model::list_for_teacher(db, owner.id).await?;
            if existing.iter().any(|c| c.name == DEMO_CLASS) {
                return Ok(());
            }

            let c = class::Model::create(
                db,
                owner.id,
                DEMO_CLASS,
                Some("Monday and Wednesday lectures".into()),
            )
            .await?;

            let roster = [
                ("A1001", "Alice Adams", Some("alice@example.com")),
                ("B1002", "Bilal Bakr", Some("bilal@example.com")),
                ("C1003", "Chen Cao", None),
            ];
            let rows: Vec<student::NewStudent> = roster
                .iter()
                .map(|(id, name, email)| student::NewStudent {
                    student_id: (*id).into(),
                    name: (*name).into(),
                    email: email.map(String::from),
                })
                .collect();
            student::Model::create_many(db, c.id, &rows).await?;
            Ok(())
        })
    }
}
