//! Baseline reference data shipped with the application. Deterministic ids so
//! created subjects can intentionally override baseline entries by id, and so
//! tests can address the same records across runs.

use crate::model::{AcademicYear, ClassRef, Subject, Term, Topic, TopicStatus, Unit};

pub fn academic_years() -> Vec<AcademicYear> {
    vec![
        AcademicYear {
            id: "year-2025".to_string(),
            name: "2025/2026".to_string(),
        },
        AcademicYear {
            id: "year-2026".to_string(),
            name: "2026/2027".to_string(),
        },
    ]
}

pub fn terms() -> Vec<Term> {
    let mut out = Vec::new();
    for year in academic_years() {
        for (i, name) in ["Term 1", "Term 2", "Term 3"].iter().enumerate() {
            out.push(Term {
                id: format!("{}-term-{}", year.id, i + 1),
                academic_year_id: year.id.clone(),
                name: (*name).to_string(),
                ended: false,
            });
        }
    }
    out
}

pub fn classes() -> Vec<ClassRef> {
    vec![
        ClassRef {
            id: "class-7a".to_string(),
            name: "Grade 7A".to_string(),
        },
        ClassRef {
            id: "class-7b".to_string(),
            name: "Grade 7B".to_string(),
        },
        ClassRef {
            id: "class-8a".to_string(),
            name: "Grade 8A".to_string(),
        },
    ]
}

fn topic(id: &str, title: &str, periods: i64, hint: Option<TopicStatus>) -> Topic {
    Topic {
        id: id.to_string(),
        title: title.to_string(),
        teaching_periods: periods,
        sub_topics: vec![],
        learning_objectives: vec![],
        key_concepts: vec![],
        teaching_materials: vec![],
        reference_materials: vec![],
        status_hint: hint,
    }
}

pub fn subjects() -> Vec<Subject> {
    vec![
        Subject {
            id: "subj-math-7a".to_string(),
            academic_year_id: "year-2025".to_string(),
            term_id: "year-2025-term-1".to_string(),
            class_id: "class-7a".to_string(),
            name: "Mathematics".to_string(),
            units: vec![
                Unit {
                    id: "subj-math-7a-u1".to_string(),
                    title: "Number Systems".to_string(),
                    topics: vec![
                        topic(
                            "subj-math-7a-u1-t1",
                            "Integers and Operations",
                            4,
                            Some(TopicStatus::Completed),
                        ),
                        topic(
                            "subj-math-7a-u1-t2",
                            "Fractions and Decimals",
                            5,
                            Some(TopicStatus::InProgress),
                        ),
                    ],
                },
                Unit {
                    id: "subj-math-7a-u2".to_string(),
                    title: "Algebraic Expressions".to_string(),
                    topics: vec![
                        topic("subj-math-7a-u2-t1", "Variables and Constants", 3, None),
                        topic("subj-math-7a-u2-t2", "Simple Equations", 6, None),
                    ],
                },
            ],
        },
        Subject {
            id: "subj-sci-7a".to_string(),
            academic_year_id: "year-2025".to_string(),
            term_id: "year-2025-term-1".to_string(),
            class_id: "class-7a".to_string(),
            name: "Science".to_string(),
            units: vec![Unit {
                id: "subj-sci-7a-u1".to_string(),
                title: "Matter and Materials".to_string(),
                topics: vec![
                    topic("subj-sci-7a-u1-t1", "States of Matter", 3, None),
                    topic("subj-sci-7a-u1-t2", "Mixtures and Solutions", 4, None),
                    topic("subj-sci-7a-u1-t3", "Separation Techniques", 3, None),
                ],
            }],
        },
    ]
}
