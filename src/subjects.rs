/// One entry of the fixed subject catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubjectOption {
    pub id: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    /// Presentation hint for front ends that color-code subjects.
    pub color: &'static str,
}

pub const SUBJECTS: &[SubjectOption] = &[
    SubjectOption {
        id: "physics",
        label: "Physics",
        icon: "⚡",
        color: "violet",
    },
    SubjectOption {
        id: "chemistry",
        label: "Chemistry",
        icon: "🧪",
        color: "emerald",
    },
    SubjectOption {
        id: "math",
        label: "Mathematics",
        icon: "📐",
        color: "blue",
    },
    SubjectOption {
        id: "biology",
        label: "Biology",
        icon: "🧬",
        color: "rose",
    },
    SubjectOption {
        id: "computer_science",
        label: "Computer Science",
        icon: "💻",
        color: "slate",
    },
    SubjectOption {
        id: "economics",
        label: "Economics",
        icon: "📈",
        color: "amber",
    },
    SubjectOption {
        id: "english",
        label: "English Core",
        icon: "📚",
        color: "pink",
    },
];

pub fn find_by_id(id: &str) -> Option<&'static SubjectOption> {
    let id = id.trim();
    SUBJECTS
        .iter()
        .find(|subject| subject.id.eq_ignore_ascii_case(id))
}

/// Accepts either an id or a display label.
pub fn lookup(raw: &str) -> Option<&'static SubjectOption> {
    let raw = raw.trim();
    find_by_id(raw).or_else(|| {
        SUBJECTS
            .iter()
            .find(|subject| subject.label.eq_ignore_ascii_case(raw))
    })
}

pub fn known_ids() -> String {
    SUBJECTS
        .iter()
        .map(|subject| subject.id)
        .collect::<Vec<_>>()
        .join(", ")
}
