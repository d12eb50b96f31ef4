use super::{Basics, Education, Extra, Location, Profile, Project, Resume, Skill, Work};

fn strings(items: &[&str]) -> Option<Vec<String>> {
    Some(items.iter().map(|s| s.to_string()).collect())
}

/// Seed document for newly created rows.
pub fn default_resume() -> Resume {
    Resume {
        basics: Basics {
            name: "Jordan Rivera".into(),
            label: Some("Backend Software Engineer".into()),
            email: Some("jordan.rivera@example.com".into()),
            phone: Some("555-0142".into()),
            summary: Some(
                "Engineer with eight years of experience building reliable services \
                 and developer tooling. Comfortable across the stack, happiest close to the data."
                    .into(),
            ),
            location: Some(Location {
                city: Some("Portland".into()),
                region: Some("Oregon".into()),
                country_code: Some("US".into()),
                ..Default::default()
            }),
            profiles: Some(vec![
                Profile {
                    network: "GitHub".into(),
                    username: "jrivera".into(),
                    url: "https://github.com/jrivera".into(),
                    extra: Extra::new(),
                },
                Profile {
                    network: "LinkedIn".into(),
                    username: "jordanrivera".into(),
                    url: "https://www.linkedin.com/in/jordanrivera".into(),
                    extra: Extra::new(),
                },
            ]),
            ..Default::default()
        },
        work: Some(vec![
            Work {
                company: "Northwind Logistics".into(),
                position: "Senior Software Engineer".into(),
                website: Some("https://northwind.example.com".into()),
                start_date: "2021-03".into(),
                end_date: None,
                summary: Some("Owns the shipment tracking platform.".into()),
                highlights: strings(&[
                    "Cut p99 ingest latency from 900ms to 120ms",
                    "Led migration of event pipeline to Postgres logical replication",
                ]),
                extra: Extra::new(),
            },
            Work {
                company: "Contoso Health".into(),
                position: "Software Engineer".into(),
                website: None,
                start_date: "2017-06".into(),
                end_date: Some("2021-02".into()),
                summary: Some("Built patient scheduling APIs.".into()),
                highlights: strings(&["Designed the appointment booking API used by 40 clinics"]),
                extra: Extra::new(),
            },
        ]),
        education: Some(vec![Education {
            institution: "Oregon State University".into(),
            url: None,
            area: Some("Computer Science".into()),
            study_type: Some("Bachelor".into()),
            start_date: "2013-09".into(),
            end_date: Some("2017-06".into()),
            score: None,
            courses: None,
            extra: Extra::new(),
        }]),
        skills: Some(vec![
            Skill {
                name: "Backend".into(),
                level: Some("Senior".into()),
                keywords: strings(&["Rust", "Go", "PostgreSQL", "Kafka"]),
                extra: Extra::new(),
            },
            Skill {
                name: "Frontend".into(),
                level: Some("Intermediate".into()),
                keywords: strings(&["TypeScript", "React"]),
                extra: Extra::new(),
            },
        ]),
        projects: Some(vec![Project {
            name: "tidewatch".into(),
            start_date: "2022-01".into(),
            end_date: None,
            description: Some("Open-source tide table CLI.".into()),
            highlights: None,
            url: Some("https://github.com/jrivera/tidewatch".into()),
            extra: Extra::new(),
        }]),
        ..Resume::minimal("")
    }
}
