//! Normalization of free-text grade and subject input.
//!
//! Teachers type grades as "JSS 1", "pri 5", "Primary Four" and subjects as
//! "Maths" or "Basic Science"; the curriculum document is keyed by a small
//! set of canonical names. Both normalizers are pure and fall back to the
//! unchanged input so the subsequent lookup reports a not-found error
//! instead of failing here.

use serde::{Deserialize, Serialize};

/// Canonical grade bands of the Nigerian basic education curriculum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeBand {
    /// Primary 1 to 3 (Lower Basic).
    LowerPrimary,
    /// Primary 4 to 6 (Middle Basic).
    UpperPrimary,
    /// JSS 1 to 3 (Upper Basic).
    JuniorSecondary,
}

impl GradeBand {
    /// Returns all grade bands in curriculum order.
    pub fn all() -> [GradeBand; 3] {
        [
            GradeBand::LowerPrimary,
            GradeBand::UpperPrimary,
            GradeBand::JuniorSecondary,
        ]
    }

    /// Returns the key used for this band at the curriculum document root.
    pub fn canonical_key(&self) -> &'static str {
        match self {
            GradeBand::LowerPrimary => "Primary 1–3",
            GradeBand::UpperPrimary => "Primary 4–6",
            GradeBand::JuniorSecondary => "Junior Secondary 1–3",
        }
    }

    /// Detects the band named by free-text input, if any.
    ///
    /// Junior secondary markers are checked before primary markers, so
    /// "JSS 1" never reaches the primary digit scan.
    pub fn detect(input: &str) -> Option<GradeBand> {
        let lowered = input.to_lowercase();

        if ["jss", "junior secondary", "js"]
            .iter()
            .any(|marker| lowered.contains(marker))
        {
            return Some(GradeBand::JuniorSecondary);
        }

        if lowered.contains("primary") || lowered.contains("pri") {
            let band = match lowered.chars().find(|c| c.is_ascii_digit()) {
                Some('4'..='6') => GradeBand::UpperPrimary,
                // 1-3, no digit at all, or a digit outside 1-6
                _ => GradeBand::LowerPrimary,
            };
            return Some(band);
        }

        let trimmed = lowered.trim();
        GRADE_ALIASES
            .iter()
            .find(|(alias, _)| *alias == trimmed)
            .map(|(_, band)| *band)
    }
}

impl std::fmt::Display for GradeBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.canonical_key())
    }
}

/// Exact-match names for inputs without a jss/primary marker. Compared
/// against the trimmed, lowercased input.
const GRADE_ALIASES: &[(&str, GradeBand)] = &[
    ("primary 1–3", GradeBand::LowerPrimary),
    ("primary 4–6", GradeBand::UpperPrimary),
    ("junior secondary 1–3", GradeBand::JuniorSecondary),
    ("lower basic", GradeBand::LowerPrimary),
    ("middle basic", GradeBand::UpperPrimary),
    ("upper basic", GradeBand::JuniorSecondary),
];

/// Subject synonyms mapped to canonical subject keys. Compared against the
/// trimmed, lowercased input.
const SUBJECT_SYNONYMS: &[(&str, &str)] = &[
    ("math", "mathematics"),
    ("maths", "mathematics"),
    ("mathematics", "mathematics"),
    ("english", "english_studies"),
    ("english language", "english_studies"),
    ("english studies", "english_studies"),
    ("english_studies", "english_studies"),
    ("science", "basic_science_and_technology"),
    ("basic science", "basic_science_and_technology"),
    ("technology", "basic_science_and_technology"),
    ("basic technology", "basic_science_and_technology"),
    ("basic science and technology", "basic_science_and_technology"),
    ("basic_science_and_technology", "basic_science_and_technology"),
    ("social studies", "social_and_citizenship_studies"),
    ("civic education", "social_and_citizenship_studies"),
    ("social and citizenship studies", "social_and_citizenship_studies"),
    ("social_and_citizenship_studies", "social_and_citizenship_studies"),
    ("cca", "cultural_and_creative_arts"),
    ("creative arts", "cultural_and_creative_arts"),
    ("cultural and creative arts", "cultural_and_creative_arts"),
    ("cultural_and_creative_arts", "cultural_and_creative_arts"),
    ("crs", "christian_religious_studies"),
    ("christian religious studies", "christian_religious_studies"),
    ("christian_religious_studies", "christian_religious_studies"),
    ("irs", "islamic_studies"),
    ("islamic studies", "islamic_studies"),
    ("islamic_studies", "islamic_studies"),
    ("phe", "physical_and_health_education"),
    ("physical education", "physical_and_health_education"),
    ("physical and health education", "physical_and_health_education"),
    ("physical_and_health_education", "physical_and_health_education"),
    ("history", "nigerian_history"),
    ("nigerian history", "nigerian_history"),
    ("nigerian_history", "nigerian_history"),
    ("computer", "basic_digital_literacy"),
    ("computer studies", "basic_digital_literacy"),
    ("ict", "basic_digital_literacy"),
    ("digital literacy", "basic_digital_literacy"),
    ("basic digital literacy", "basic_digital_literacy"),
    ("basic_digital_literacy", "basic_digital_literacy"),
    ("french", "french"),
    ("arabic", "arabic"),
    ("hausa", "nigerian_languages"),
    ("igbo", "nigerian_languages"),
    ("yoruba", "nigerian_languages"),
    ("nigerian languages", "nigerian_languages"),
    ("nigerian_languages", "nigerian_languages"),
    ("pvs", "pre_vocational_studies"),
    ("pre-vocational studies", "pre_vocational_studies"),
    ("pre vocational studies", "pre_vocational_studies"),
    ("pre_vocational_studies", "pre_vocational_studies"),
    ("business studies", "business_studies"),
    ("business_studies", "business_studies"),
];

/// Maps free-text grade input to a canonical grade key.
///
/// Unrecognized input is returned unchanged.
///
/// ```
/// use klassiq::curriculum::normalize_grade;
///
/// assert_eq!(normalize_grade("JSS 2"), "Junior Secondary 1–3");
/// assert_eq!(normalize_grade("Primary 5"), "Primary 4–6");
/// assert_eq!(normalize_grade("Nursery"), "Nursery");
/// ```
pub fn normalize_grade(input: &str) -> String {
    match GradeBand::detect(input) {
        Some(band) => band.canonical_key().to_string(),
        None => input.to_string(),
    }
}

/// Maps free-text subject input to a canonical subject key.
///
/// Unmapped input is returned unchanged.
pub fn normalize_subject(input: &str) -> String {
    let lowered = input.trim().to_lowercase();
    SUBJECT_SYNONYMS
        .iter()
        .find(|(synonym, _)| *synonym == lowered)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| input.to_string())
}
