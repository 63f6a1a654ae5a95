//! The dashboard's sections and their editor schemas.

use super::descriptor::Section;
use super::schema::{FieldKind, FieldSpec, FormSchema};

pub const PROJECT_CATEGORIES: &[&str] = &[
    "MERN",
    "Data Engineer",
    "Data Analytics",
    "React",
    "Python",
    "Java",
    "Artificial Intelligence",
    "Machine Learning",
    "AWS",
    "SQL",
    "IT Support Projects",
];

pub const SKILL_CATEGORIES: &[&str] = &[
    "programming",
    "webdev",
    "database",
    "frameworks",
    "libraries",
    "tools",
    "others",
];

pub const CERTIFICATION_CATEGORIES: &[&str] = &[
    "Cloud",
    "Data",
    "Development",
    "Security",
    "Networking",
    "Other",
];

const PRIORITY: FieldSpec = FieldSpec::new("priority", "Priority", FieldKind::Number(0));

const PROJECT_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("title", "Title").required(),
    FieldSpec::text("thumbnail", "Thumbnail URL"),
    FieldSpec::new("startDate", "Start Date", FieldKind::Date),
    FieldSpec::new("endDate", "End Date", FieldKind::Date),
    FieldSpec::text("description", "Description").required(),
    FieldSpec::new("techStack", "Tech Stack", FieldKind::List),
    FieldSpec::new(
        "category",
        "Category",
        FieldKind::Choice {
            options: PROJECT_CATEGORIES,
            default: "MERN",
        },
    ),
    FieldSpec::text("liveUrl", "Live URL"),
    FieldSpec::text("githubUrl", "GitHub URL"),
    FieldSpec::text("caseStudyUrl", "Case Study URL"),
    FieldSpec::new("images", "Images", FieldKind::List),
    FieldSpec::new("highlights", "Highlights", FieldKind::List),
    PRIORITY,
];

pub const PROJECT_FORM: FormSchema = FormSchema::new("project", PROJECT_FIELDS);

const SKILL_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("name", "Skill Name").required(),
    FieldSpec::new(
        "category",
        "Category",
        FieldKind::Choice {
            options: SKILL_CATEGORIES,
            default: "",
        },
    )
    .required(),
    FieldSpec::new("proficiency", "Proficiency", FieldKind::Number(70)),
    FieldSpec::new("yearsExp", "Years of Experience", FieldKind::Number(0)),
    FieldSpec::new("tags", "Tags", FieldKind::List),
    FieldSpec::text("logo", "Logo URL"),
    PRIORITY,
];

pub const SKILL_FORM: FormSchema = FormSchema::new("skill", SKILL_FIELDS);

const EDUCATION_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("institution", "Institution").required(),
    FieldSpec::text("degree", "Degree").required(),
    FieldSpec::text("fieldOfStudy", "Field of Study"),
    FieldSpec::text("location", "Location"),
    FieldSpec::new("startDate", "Start Date", FieldKind::Date),
    FieldSpec::new("endDate", "End Date", FieldKind::Date),
    FieldSpec::text("grade", "Grade"),
    FieldSpec::text("description", "Description"),
    FieldSpec::text("logo", "Logo URL"),
    PRIORITY,
];

pub const EDUCATION_FORM: FormSchema = FormSchema::new("education", EDUCATION_FIELDS);

const EXPERIENCE_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("logo", "Logo URL"),
    FieldSpec::text("company", "Company").required(),
    FieldSpec::text("role", "Role").required(),
    FieldSpec::text("location", "Location"),
    FieldSpec::new("startDate", "Start Date", FieldKind::Date).required(),
    FieldSpec::new("endDate", "End Date", FieldKind::Date),
    FieldSpec::new("responsibilities", "Responsibilities", FieldKind::List),
    FieldSpec::new("skills", "Skills", FieldKind::List),
    FieldSpec::text("description", "Description"),
    FieldSpec::text("certificateUrl", "Certificate URL"),
    PRIORITY,
];

pub const EXPERIENCE_FORM: FormSchema = FormSchema::new("experience", EXPERIENCE_FIELDS);

const CERTIFICATION_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("provider", "Provider").required(),
    FieldSpec::text("title", "Title").required(),
    FieldSpec::new("issueDate", "Issue Date", FieldKind::Date).required(),
    FieldSpec::new("expiryDate", "Expiry Date", FieldKind::Date),
    FieldSpec::text("credentialId", "Credential ID"),
    FieldSpec::text("verifyUrl", "Verification URL"),
    FieldSpec::text("image", "Badge Image URL"),
    FieldSpec::new("tags", "Tags", FieldKind::List),
    FieldSpec::new(
        "category",
        "Category",
        FieldKind::Choice {
            options: CERTIFICATION_CATEGORIES,
            default: "Other",
        },
    ),
    PRIORITY,
];

pub const CERTIFICATION_FORM: FormSchema = FormSchema::new("certification", CERTIFICATION_FIELDS);

const HERO: &[FieldSpec] = &[
    FieldSpec::text("name", "Name"),
    FieldSpec::text("caption", "Caption"),
    FieldSpec::text("description", "Description"),
    FieldSpec::text("profileImage", "Profile Image URL"),
];

const ABOUT: &[FieldSpec] = &[
    FieldSpec::text("headline", "Headline"),
    FieldSpec::text("bio", "Bio"),
    FieldSpec::text("location", "Location"),
    FieldSpec::text("email", "Email"),
    FieldSpec::text("phone", "Phone"),
    FieldSpec::text("resumeUrl", "Resume URL"),
    FieldSpec::new("availability", "Availability", FieldKind::Text("Open to opportunities")),
];

const SOCIAL: &[FieldSpec] = &[
    FieldSpec::text("github", "GitHub"),
    FieldSpec::text("linkedin", "LinkedIn"),
    FieldSpec::text("twitter", "Twitter"),
    FieldSpec::text("telegram", "Telegram"),
    FieldSpec::text("facebook", "Facebook"),
    FieldSpec::text("gmail", "Gmail"),
];

const PROFILE_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("hero", "Hero", FieldKind::Group(HERO)),
    FieldSpec::new("about", "About", FieldKind::Group(ABOUT)),
    FieldSpec::new("social", "Social", FieldKind::Group(SOCIAL)),
];

pub const PROFILE_FORM: FormSchema = FormSchema::new("profile", PROFILE_FIELDS);

/// Every section of the admin dashboard, in tab order.
pub fn sections() -> Vec<Section> {
    vec![
        Section::collection("projects", "Projects", "/api/projects", PROJECT_FORM),
        Section::collection("skills", "Skills", "/api/skills", SKILL_FORM),
        Section::collection("education", "Education", "/api/education", EDUCATION_FORM),
        Section::collection("experience", "Experience", "/api/experience", EXPERIENCE_FORM),
        Section::collection(
            "certifications",
            "Certifications",
            "/api/certifications",
            CERTIFICATION_FORM,
        ),
        Section::singleton("profile", "Profile", "/api/profile", PROFILE_FORM),
    ]
}

/// Looks a section up by key.
pub fn find(key: &str) -> Option<Section> {
    sections().into_iter().find(|s| s.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Item;
    use crate::section::{Editor, SectionShape};
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn keys_are_unique_and_only_profile_is_singleton() {
        let all = sections();
        let keys: HashSet<_> = all.iter().map(|s| s.key.clone()).collect();
        assert_eq!(keys.len(), all.len());

        for section in &all {
            let expected = if section.key == "profile" {
                SectionShape::Singleton
            } else {
                SectionShape::Collection
            };
            assert_eq!(section.shape, expected, "{}", section.key);
            assert_eq!(section.endpoint, format!("/api/{}", section.key));
        }
    }

    #[test]
    fn profile_deep_merges_groups() {
        let draft = PROFILE_FORM.bind(&Item::from_value(json!({"about": {"bio": "Hi"}})).unwrap());
        assert_eq!(draft.get("about").unwrap()["bio"], "Hi");
        assert_eq!(draft.get("about").unwrap()["availability"], "Open to opportunities");
        assert_eq!(draft.get("social").unwrap()["github"], "");
    }

    #[test]
    fn skill_requires_name_and_category() {
        let blank = SKILL_FORM.defaults();
        assert_eq!(blank.get("proficiency"), Some(&json!(70)));
        assert!(SKILL_FORM.prepare(blank.clone()).is_err());

        let filled = blank.with("name", "Rust").with("category", "programming");
        assert!(SKILL_FORM.prepare(filled).is_ok());
    }

    #[test]
    fn find_by_key() {
        assert!(find("profile").unwrap().is_singleton());
        assert!(find("blog").is_none());
    }
}
