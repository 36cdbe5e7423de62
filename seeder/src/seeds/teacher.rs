use crate::seed::{SeedFuture, Seeder};
use crate::seeds::{DEMO_PASSWORD, DEMO_USERNAME};
use db::models::teacher::Model;
use fake::{Fake, faker::name::en::Name};
use sea_orm::DatabaseConnection;

pub struct TeacherSeeder;

impl Seeder for TeacherSeeder {
    fn seed<'a>(&'a self, db: &'a DatabaseConnection) -> SeedFuture<'a> {
        Box::pin(async move {
            if Model::find_by_username(db, DEMO_USERNAME).await?.is_none() {
                Model::create(db, DEMO_USERNAME, "Demo Teacher", DEMO_PASSWORD).await?;
            }

            // A few colleagues so ownership checks have something to hide.
            for _ in 0..3 {
                let username = format!("t{:06}", fastrand::u32(..1_000_000));
                let name: String = Name().fake();
                if Model::find_by_username(db, &username).await?.is_none() {
                    Model::create(db, &username, &name, "password123").await?;
                }
            }
            Ok(())
        })
    }
}
