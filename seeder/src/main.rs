use crate::seed::{Seeder, run_seeder};
use crate::seeds::{class::ClassSeeder, session::SessionSeeder, teacher::TeacherSeeder};
use migration::runner::run_pending_migrations;

mod seed;
mod seeds;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let db = match db::connect().await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("DB connection failed: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = run_pending_migrations(&db).await {
        eprintln!("Migration failed: {e}");
        std::process::exit(1);
    }

    for (seeder, name) in [
        (Box::new(TeacherSeeder) as Box<dyn Seeder + Send + Sync>, "Teacher"),
        (Box::new(ClassSeeder), "Class"),
        (Box::new(SessionSeeder), "Session"),
    ] {
        run_seeder(&*seeder, name, &db).await;
    }
}
