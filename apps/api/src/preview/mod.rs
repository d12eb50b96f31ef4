//! Read-only projection of a résumé into display sections. No two-way
//! binding: the preview is rebuilt from the canonical document each time.

use serde::Serialize;

use crate::document::Resume;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileLink {
    pub network: String,
    pub username: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Header {
    pub name: String,
    pub label: Option<String>,
    /// Email, phone and "city, region", whichever are present.
    pub contacts: Vec<String>,
    /// The website with its scheme stripped.
    pub website: Option<String>,
    pub profiles: Vec<ProfileLink>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Entry {
    pub heading: String,
    pub subheading: Option<String>,
    pub period: Option<String>,
    pub summary: Option<String>,
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub title: &'static str,
    pub entries: Vec<Entry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preview {
    pub header: Header,
    pub sections: Vec<Section>,
}

fn non_empty(s: &Option<String>) -> Option<String> {
    s.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn period(start: &str, end: Option<&str>) -> Option<String> {
    if start.is_empty() && end.is_none() {
        return None;
    }
    Some(format!("{start} - {}", end.filter(|e| !e.is_empty()).unwrap_or("Present")))
}

fn strip_scheme(url: &str) -> String {
    url.strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url)
        .to_string()
}

fn section<T>(title: &'static str, items: &Option<Vec<T>>, entry: impl Fn(&T) -> Entry) -> Option<Section> {
    let entries: Vec<Entry> = items.iter().flatten().map(entry).collect();
    (!entries.is_empty()).then_some(Section { title, entries })
}

impl Preview {
    pub fn from_document(doc: &Resume) -> Self {
        let basics = &doc.basics;

        let mut contacts = Vec::new();
        contacts.extend(non_empty(&basics.email));
        contacts.extend(non_empty(&basics.phone));
        if let Some(location) = &basics.location {
            let place: Vec<String> = [non_empty(&location.city), non_empty(&location.region)]
                .into_iter()
                .flatten()
                .collect();
            if !place.is_empty() {
                contacts.push(place.join(", "));
            }
        }

        let header = Header {
            name: basics.name.clone(),
            label: non_empty(&basics.label),
            contacts,
            website: non_empty(&basics.url).map(|u| strip_scheme(&u)),
            profiles: basics
                .profiles
                .iter()
                .flatten()
                .map(|p| ProfileLink {
                    network: p.network.clone(),
                    username: p.username.clone(),
                    url: p.url.clone(),
                })
                .collect(),
        };

        let summary = non_empty(&basics.summary).map(|text| Section {
            title: "Summary",
            entries: vec![Entry {
                summary: Some(text),
                ..Default::default()
            }],
        });

        let sections = [
            summary,
            section("Work Experience", &doc.work, |w| Entry {
                heading: w.position.clone(),
                subheading: Some(w.company.clone()),
                period: period(&w.start_date, w.end_date.as_deref()),
                summary: non_empty(&w.summary),
                bullets: w.highlights.clone().unwrap_or_default(),
            }),
            section("Projects", &doc.projects, |p| Entry {
                heading: p.name.clone(),
                subheading: None,
                period: period(&p.start_date, p.end_date.as_deref()),
                summary: non_empty(&p.description),
                bullets: p.highlights.clone().unwrap_or_default(),
            }),
            section("Volunteer", &doc.volunteer, |v| Entry {
                heading: v.position.clone(),
                subheading: Some(v.organization.clone()),
                period: period(&v.start_date, v.end_date.as_deref()),
                summary: non_empty(&v.summary),
                bullets: v.highlights.clone().unwrap_or_default(),
            }),
            section("Skills", &doc.skills, |s| Entry {
                heading: s.name.clone(),
                subheading: non_empty(&s.level),
                bullets: s.keywords.clone().unwrap_or_default(),
                ..Default::default()
            }),
            section("Education", &doc.education, |e| {
                let mut degree = non_empty(&e.study_type).unwrap_or_default();
                if let Some(area) = non_empty(&e.area) {
                    if !degree.is_empty() {
                        degree.push(' ');
                    }
                    degree.push_str(&format!("in {area}"));
                }
                if let Some(score) = non_empty(&e.score) {
                    degree.push_str(&format!(", GPA: {score}"));
                }
                Entry {
                    heading: e.institution.clone(),
                    subheading: (!degree.is_empty()).then_some(degree),
                    period: period(&e.start_date, e.end_date.as_deref()),
                    bullets: e.courses.clone().unwrap_or_default(),
                    ..Default::default()
                }
            }),
            section("Languages", &doc.languages, |l| Entry {
                heading: l.language.clone(),
                subheading: non_empty(&l.fluency),
                ..Default::default()
            }),
            section("Certifications", &doc.certificates, |c| Entry {
                heading: c.name.clone(),
                subheading: Some(c.issuer.clone()),
                period: Some(c.date.clone()).filter(|d| !d.is_empty()),
                ..Default::default()
            }),
            section("Awards", &doc.awards, |a| Entry {
                heading: a.title.clone(),
                subheading: Some(a.awarder.clone()),
                period: Some(a.date.clone()).filter(|d| !d.is_empty()),
                summary: non_empty(&a.summary),
                ..Default::default()
            }),
            section("Publications", &doc.publications, |p| Entry {
                heading: p.name.clone(),
                subheading: Some(p.publisher.clone()),
                period: Some(p.release_date.clone()).filter(|d| !d.is_empty()),
                summary: non_empty(&p.summary),
                ..Default::default()
            }),
            section("Interests", &doc.interests, |i| Entry {
                heading: i.name.clone(),
                bullets: i.keywords.clone().unwrap_or_default(),
                ..Default::default()
            }),
            section("References", &doc.references, |r| Entry {
                heading: r.name.clone(),
                summary: Some(r.reference.clone()),
                ..Default::default()
            }),
        ]
        .into_iter()
        .flatten()
        .collect();

        Preview { header, sections }
    }

    pub fn to_markdown(&self) -> String {
        let mut out = format!("# {}\n", self.header.name);
        if let Some(label) = &self.header.label {
            out.push_str(&format!("## {label}\n"));
        }
        if !self.header.contacts.is_empty() {
            out.push_str(&format!("\n{}\n", self.header.contacts.join(" | ")));
        }
        let mut links: Vec<String> = self.header.website.iter().cloned().collect();
        links.extend(
            self.header
                .profiles
                .iter()
                .map(|p| format!("[{}: {}]({})", p.network, p.username, p.url)),
        );
        if !links.is_empty() {
            out.push_str(&format!("{}\n", links.join(" | ")));
        }

        for section in &self.sections {
            out.push_str(&format!("\n### {}\n", section.title));
            for entry in &section.entries {
                if !entry.heading.is_empty() {
                    out.push_str(&format!("\n#### {}\n", entry.heading));
                }
                let meta: Vec<&str> = [entry.subheading.as_deref(), entry.period.as_deref()]
                    .into_iter()
                    .flatten()
                    .collect();
                if !meta.is_empty() {
                    out.push_str(&format!("*{}*\n", meta.join(" | ")));
                }
                if let Some(summary) = &entry.summary {
                    out.push_str(&format!("\n{summary}\n"));
                }
                if !entry.bullets.is_empty() {
                    out.push('\n');
                    for bullet in &entry.bullets {
                        out.push_str(&format!("- {bullet}\n"));
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::candidate_to_document;
    use serde_json::json;

    fn doc() -> Resume {
        candidate_to_document(json!({
            "basics": {
                "name": "Ada Lovelace",
                "label": "Analyst",
                "email": "ada@example.com",
                "url": "https://ada.example.com",
                "location": {"city": "London", "region": "England"},
                "summary": "First programmer."
            },
            "work": [
                {"company": "Engines", "position": "Analyst", "startDate": "1842", "highlights": ["Note G"]},
                {"company": "Society", "position": "Fellow", "startDate": "1835", "endDate": "1840"}
            ],
            "education": [{"institution": "Home", "studyType": "Private", "area": "Mathematics", "startDate": "1828"}],
            "skills": []
        }))
        .unwrap()
    }

    #[test]
    fn test_header() {
        let preview = Preview::from_document(&doc());
        assert_eq!(preview.header.contacts, vec!["ada@example.com", "London, England"]);
        assert_eq!(preview.header.website.as_deref(), Some("ada.example.com"));
    }

    #[test]
    fn test_sections_in_order_and_empty_omitted() {
        let preview = Preview::from_document(&doc());
        let titles: Vec<_> = preview.sections.iter().map(|s| s.title).collect();
        assert_eq!(titles, vec!["Summary", "Work Experience", "Education"]);

        let work = &preview.sections[1].entries;
        assert_eq!(work[0].period.as_deref(), Some("1842 - Present"));
        assert_eq!(work[1].period.as_deref(), Some("1835 - 1840"));
        assert_eq!(
            preview.sections[2].entries[0].subheading.as_deref(),
            Some("Private in Mathematics")
        );
    }

    #[test]
    fn test_markdown() {
        let md = Preview::from_document(&doc()).to_markdown();
        assert!(md.starts_with("# Ada Lovelace\n## Analyst\n"));
        assert!(md.contains("\n### Work Experience\n\n#### Analyst\n*Engines | 1842 - Present*\n"));
        assert!(md.contains("- Note G\n"));
        assert!(!md.contains("### Skills"));
    }
}
