use sqlx::{Postgres, QueryBuilder};

use crate::dto::search_dto::SearchCriteria;
use crate::models::candidate::CandidateProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Name,
    Email,
    Phone,
    Industry,
    Experience,
    Education,
    ExperienceLevel,
}

/// Fields a free-text search term is matched against.
pub const QUERY_FIELDS: &[TextField] = &[
    TextField::Name,
    TextField::Email,
    TextField::Phone,
    TextField::Industry,
    TextField::Experience,
    TextField::Education,
];

impl TextField {
    fn column(self) -> &'static str {
        match self {
            TextField::Name => "name",
            TextField::Email => "email",
            TextField::Phone => "phone",
            TextField::Industry => "industry",
            TextField::Experience => "experience",
            TextField::Education => "education",
            TextField::ExperienceLevel => "experience_level",
        }
    }

    fn value(self, candidate: &CandidateProfile) -> Option<&str> {
        match self {
            TextField::Name => Some(candidate.name.as_str()),
            TextField::Email => candidate.email.as_deref(),
            TextField::Phone => candidate.phone.as_deref(),
            TextField::Industry => candidate.industry.as_deref(),
            TextField::Experience => candidate.experience.as_deref(),
            TextField::Education => candidate.education.as_deref(),
            TextField::ExperienceLevel => candidate.experience_level.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListField {
    Skills,
    Certifications,
}

impl ListField {
    fn column(self) -> &'static str {
        match self {
            ListField::Skills => "skills",
            ListField::Certifications => "certifications",
        }
    }

    /// The list joined with `,`, the form substring filters run against.
    fn joined(self, candidate: &CandidateProfile) -> String {
        match self {
            ListField::Skills => candidate.skills.join(","),
            ListField::Certifications => candidate.certifications.join(","),
        }
    }
}

/// One condition of a search. Needles are stored lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// The needle occurs in at least one of the fields.
    AnyContains {
        fields: &'static [TextField],
        needle: String,
    },
    Contains {
        field: TextField,
        needle: String,
    },
    ListContains {
        field: ListField,
        needle: String,
    },
    AgeAtLeast(i32),
    AgeAtMost(i32),
}

impl Predicate {
    pub fn matches(&self, candidate: &CandidateProfile) -> bool {
        match self {
            Predicate::AnyContains { fields, needle } => fields
                .iter()
                .any(|f| contains_ci(f.value(candidate), needle)),
            Predicate::Contains { field, needle } => contains_ci(field.value(candidate), needle),
            Predicate::ListContains { field, needle } => {
                contains_ci(Some(field.joined(candidate).as_str()), needle)
            }
            Predicate::AgeAtLeast(min) => candidate.age.is_some_and(|age| age >= *min),
            Predicate::AgeAtMost(max) => candidate.age.is_some_and(|age| age <= *max),
        }
    }

    fn push_sql(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        match self {
            Predicate::AnyContains { fields, needle } => {
                qb.push("(");
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        qb.push(" OR ");
                    }
                    push_ilike(qb, field.column(), needle);
                }
                qb.push(")");
            }
            Predicate::Contains { field, needle } => push_ilike(qb, field.column(), needle),
            Predicate::ListContains { field, needle } => {
                let expr = format!("array_to_string({}, ',')", field.column());
                push_ilike(qb, &expr, needle);
            }
            Predicate::AgeAtLeast(min) => {
                qb.push("age >= ").push_bind(*min);
            }
            Predicate::AgeAtMost(max) => {
                qb.push("age <= ").push_bind(*max);
            }
        }
    }
}

/// Conjunction of predicates built from [`SearchCriteria`]. Evaluates in
/// memory and renders to a parameterised `WHERE` clause, so both candidate
/// stores share one definition of a match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateFilter {
    predicates: Vec<Predicate>,
}

impl CandidateFilter {
    pub fn from_criteria(criteria: &SearchCriteria) -> Self {
        let mut predicates = Vec::new();

        if let Some(query) = criteria.query.as_deref() {
            for term in query.split_whitespace() {
                predicates.push(Predicate::AnyContains {
                    fields: QUERY_FIELDS,
                    needle: term.to_lowercase(),
                });
            }
        }

        for skill in non_blank_entries(criteria.skills.as_deref()) {
            predicates.push(Predicate::ListContains {
                field: ListField::Skills,
                needle: skill,
            });
        }

        if let Some(level) = non_blank(criteria.experience_level.as_deref()) {
            predicates.push(Predicate::Contains {
                field: TextField::ExperienceLevel,
                needle: level,
            });
        }

        if let Some(industry) = non_blank(criteria.industry.as_deref()) {
            predicates.push(Predicate::Contains {
                field: TextField::Industry,
                needle: industry,
            });
        }

        for cert in non_blank_entries(criteria.certifications.as_deref()) {
            predicates.push(Predicate::ListContains {
                field: ListField::Certifications,
                needle: cert,
            });
        }

        if let Some(min) = criteria.min_age {
            predicates.push(Predicate::AgeAtLeast(min));
        }
        if let Some(max) = criteria.max_age {
            predicates.push(Predicate::AgeAtMost(max));
        }

        Self { predicates }
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn matches(&self, candidate: &CandidateProfile) -> bool {
        self.predicates.iter().all(|p| p.matches(candidate))
    }

    /// Appends ` WHERE ...` to the builder; appends nothing for an empty
    /// filter.
    pub fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        for (i, predicate) in self.predicates.iter().enumerate() {
            qb.push(if i == 0 { " WHERE " } else { " AND " });
            predicate.push_sql(qb);
        }
    }
}

fn push_ilike(qb: &mut QueryBuilder<'_, Postgres>, expr: &str, needle: &str) {
    qb.push(expr)
        .push(" ILIKE ")
        .push_bind(format!("%{}%", escape_like(needle)))
        .push(r" ESCAPE '\'");
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn contains_ci(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(needle))
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_lowercase)
}

fn non_blank_entries(values: Option<&[String]>) -> Vec<String> {
    values
        .unwrap_or_default()
        .iter()
        .filter_map(|v| non_blank(Some(v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn candidate(id: i64, name: &str) -> CandidateProfile {
        CandidateProfile {
            id,
            name: name.to_string(),
            email: None,
            phone: None,
            age: None,
            education: None,
            experience: None,
            experience_level: None,
            industry: None,
            skills: vec![],
            certifications: vec![],
            resume_path: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn skills(list: &[&str]) -> Option<Vec<String>> {
        Some(list.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn every_requested_skill_must_be_present() {
        let filter = CandidateFilter::from_criteria(&SearchCriteria {
            skills: skills(&["python", "sql"]),
            ..Default::default()
        });

        let mut both = candidate(1, "Both");
        both.skills = vec!["Python".into(), "PostgreSQL".into()];
        let mut python_only = candidate(2, "Python only");
        python_only.skills = vec!["Python".into(), "Django".into()];

        assert!(filter.matches(&both));
        assert!(!filter.matches(&python_only));
    }

    #[test]
    fn every_query_term_must_hit_some_field() {
        let filter = CandidateFilter::from_criteria(&SearchCriteria {
            query: Some("  jane   FINANCE ".into()),
            ..Default::default()
        });

        let mut hit = candidate(1, "Jane Doe");
        hit.industry = Some("Finance".into());
        let mut partial = candidate(2, "Jane Roe");
        partial.industry = Some("Retail".into());
        // skills are not part of the free-text fields
        let mut skill_only = candidate(3, "Jane Poe");
        skill_only.skills = vec!["finance".into()];

        assert_eq!(filter.predicates().len(), 2);
        assert!(filter.matches(&hit));
        assert!(!filter.matches(&partial));
        assert!(!filter.matches(&skill_only));
    }

    #[test]
    fn level_and_industry_are_substring_filters() {
        let filter = CandidateFilter::from_criteria(&SearchCriteria {
            experience_level: Some("senior".into()),
            industry: Some("bank".into()),
            ..Default::default()
        });

        let mut c = candidate(1, "A");
        c.experience_level = Some("Senior".into());
        c.industry = Some("Investment Banking".into());
        assert!(filter.matches(&c));

        c.experience_level = Some("Mid".into());
        assert!(!filter.matches(&c));
    }

    #[test]
    fn null_age_never_matches_an_age_bound() {
        let no_age = candidate(1, "Ageless");
        let mut aged = candidate(2, "Aged");
        aged.age = Some(30);

        let min_only = CandidateFilter::from_criteria(&SearchCriteria {
            min_age: Some(0),
            ..Default::default()
        });
        let max_only = CandidateFilter::from_criteria(&SearchCriteria {
            max_age: Some(99),
            ..Default::default()
        });
        let range = CandidateFilter::from_criteria(&SearchCriteria {
            min_age: Some(30),
            max_age: Some(30),
            ..Default::default()
        });

        assert!(!min_only.matches(&no_age));
        assert!(!max_only.matches(&no_age));
        assert!(min_only.matches(&aged));
        assert!(range.matches(&aged));
    }

    #[test]
    fn blank_criteria_do_not_filter() {
        let filter = CandidateFilter::from_criteria(&SearchCriteria {
            query: Some("   ".into()),
            skills: skills(&["", "  "]),
            industry: Some(" ".into()),
            ..Default::default()
        });
        assert!(filter.is_empty());
        assert!(filter.matches(&candidate(1, "Anyone")));
    }

    #[test]
    fn like_wildcards_in_input_are_literal() {
        let filter = CandidateFilter::from_criteria(&SearchCriteria {
            query: Some("100%".into()),
            ..Default::default()
        });
        let mut c = candidate(1, "Pat");
        c.experience = Some("Hit 100% of targets".into());
        assert!(filter.matches(&c));
        c.experience = Some("Hit 1000 targets".into());
        assert!(!filter.matches(&c));
        assert_eq!(escape_like(r"50%_a\b"), r"50\%\_a\\b");
    }

    #[test]
    fn renders_parameterised_sql() {
        let filter = CandidateFilter::from_criteria(&SearchCriteria {
            query: Some("jane".into()),
            skills: skills(&["python", "sql"]),
            min_age: Some(25),
            ..Default::default()
        });

        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM candidates");
        filter.push_where(&mut qb);

        assert_eq!(
            qb.sql(),
            "SELECT * FROM candidates WHERE \
             (name ILIKE $1 ESCAPE '\\' OR email ILIKE $2 ESCAPE '\\' OR phone ILIKE $3 ESCAPE '\\' \
             OR industry ILIKE $4 ESCAPE '\\' OR experience ILIKE $5 ESCAPE '\\' OR education ILIKE $6 ESCAPE '\\') \
             AND array_to_string(skills, ',') ILIKE $7 ESCAPE '\\' \
             AND array_to_string(skills, ',') ILIKE $8 ESCAPE '\\' \
             AND age >= $9"
        );
    }

    #[test]
    fn empty_filter_renders_no_where_clause() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM candidates");
        CandidateFilter::default().push_where(&mut qb);
        assert_eq!(qb.sql(), "SELECT * FROM candidates");
    }
}
