use migration::runner;
use std::{fs, path::Path, process};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let db_path = util::config::database_path();
    let url = format!("sqlite://{}?mode=rwc", db_path);
    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("clean") => {
            remove_db_file(&db_path);
            return;
        }
        Some("fresh") => {
            remove_db_file(&db_path);
        }
        _ => {}
    }

    create_db_dir(&db_path);
    let db = match sea_orm::Database::connect(&url).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("DB connection failed: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = runner::run_pending_migrations(&db).await {
        eprintln!("Migration failed: {e}");
        process::exit(1);
    }
}

fn remove_db_file(path: &str) {
    let db_path = Path::new(path);
    if db_path.exists() {
        match fs::remove_file(db_path) {
            Ok(()) => println!("Deleted DB: {}", db_path.display()),
            Err(e) => {
                eprintln!("Failed to delete {}: {e}", db_path.display());
                process::exit(1);
            }
        }
    } else {
        println!("DB file does not exist: {}", db_path.display());
    }
}

fn create_db_dir(path: &str) {
    if let Some(parent) = Path::new(path).parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            eprintln!("Failed to create DB directory: {e}");
            process::exit(1);
        }
    }
}
