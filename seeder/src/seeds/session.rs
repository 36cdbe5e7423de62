use crate::seed::{SeedFuture, Seeder};
use crate::seeds::{DEMO_CLASS, DEMO_USERNAME};
use db::models::{
    allowed_student,
    attendance_record::{self, NewRecord},
    attendance_session::{self, NewSession},
    class, student, teacher,
};
use fake::{Fake, faker::name::en::Name};
use sea_orm::{DatabaseConnection, DbErr};
use util::config;

pub struct SessionSeeder;

/// Two closed lectures: Alice attends both, Bilal the first, Chen neither.
const LECTURES: [(&str, &[&str]); 2] = [
    ("Lecture 1: Variables", &["A1001", "B1002"]),
    ("Lecture 2: Control flow", &["A1001"]),
];

impl Seeder for SessionSeeder {
    fn seed<'a>(&'a self, db: &'a DatabaseConnection) -> SeedFuture<'a> {
        Box::pin(async move {
            let owner = teacher::Model::find_by_username(db, DEMO_USERNAME)
                .await?
                .ok_or_else(|| DbErr::RecordNotFound(DEMO_USERNAME.into()))?;
            let class = class::Model::list_for_teacher(db, owner.id)
                .await?
                .into_iter()
                .find(|c| c.name == DEMO_CLASS)
                .ok_or_else(|| DbErr::RecordNotFound(DEMO_CLASS.into()))?;

            if !attendance_session::Model::list_for_class(db, class.id).await?.is_empty() {
                return Ok(());
            }

            let roster = student::Model::roster(db, class.id).await?;
            for (title, present) in LECTURES {
                let session = attendance_session::Model::create(
                    db,
                    NewSession {
                        teacher_id: owner.id,
                        title: title.into(),
                        class_id: Some(class.id),
                        radius_m: config::default_radius_meters(),
                        active: false,
                        ..Default::default()
                    },
                )
                .await?;

                for s in roster.iter().filter(|s| present.contains(&s.student_id.as_str())) {
                    attendance_record::Model::insert(
                        db,
                        NewRecord {
                            session_id: session.id,
                            student_name: s.name.clone(),
                            student_id: s.student_id.clone(),
                            student_email: s.email.clone(),
                            ..Default::default()
                        },
                    )
                    .await?;
                }
            }

            let open = attendance_session::Model::create(
                db,
                NewSession {
                    teacher_id: owner.id,
                    title: "Office hours".into(),
                    description: Some("Drop in, no roster".into()),
                    radius_m: config::default_radius_meters(),
                    active: true,
                    ..Default::default()
                },
            )
            .await?;

            let mut walk_ins = Vec::new();
            for _ in 0..2 {
                let name: String = Name().fake();
                let id = format!("W{:05}", fastrand::u32(..100_000));
                walk_ins.push((id, Some(name)));
            }
            allowed_student::Model::add_many(db, open.id, &walk_ins).await?;

            if let Some((id, Some(name))) = walk_ins.first() {
                attendance_record::Model::insert(
                    db,
                    NewRecord {
                        session_id: open.id,
                        student_name: name.clone(),
                        student_id: id.clone(),
                        ip_address: Some("127.0.0.1".into()),
                        ..Default::default()
                    },
                )
                .await?;
            }

            println!(
                "\n  join code {} / PIN {} for \"{}\"",
                open.session_code, open.pin, open.title
            );
            Ok(())
        })
    }
}
