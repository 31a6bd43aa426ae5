//! # Naming Module
//!
//! Builds every file name the pipeline writes for one source image.
//!
//! For a source `holiday.jpg` with 3 people:
//! - backup: `holiday.jpg`
//! - primary output: `holiday_(3 personnes).jpg`
//! - duplicates: `holiday_(3 personnes)_copy1.jpg`, `holiday_(3 personnes)_copy2.jpg`
//!
//! One physical copy ends up in the output folder per detected person. An
//! image with nobody in it still gets its single `(0 personnes)` copy.
//! Names are used verbatim; nothing is sanitized.

use serde::{Deserialize, Serialize};

/// All names derived from one source file and its person count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingResult {
    /// Name of the untouched copy in the backup folder, same as
    /// [`NamingPolicy::backup_name`]
    pub backup_name: String,
    /// Name of the renamed copy in the output folder
    pub primary_name: String,
    /// Extra copies of the primary, in creation order
    pub duplicate_names: Vec<String>,
}

impl NamingResult {
    /// Number of files that end up in the output folder
    pub fn total_copies(&self) -> usize {
        1 + self.duplicate_names.len()
    }

    /// Primary name followed by the duplicates
    pub fn output_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary_name.as_str())
            .chain(self.duplicate_names.iter().map(String::as_str))
    }
}

/// The fixed naming template
#[derive(Debug, Clone, Copy, Default)]
pub struct NamingPolicy;

impl NamingPolicy {
    pub fn new() -> Self {
        Self
    }

    /// Name of the backup copy; it does not depend on the count, so the
    /// backup can be written before counting
    pub fn backup_name(&self, base: &str, extension: &str) -> String {
        format!("{}{}", base, extension)
    }

    /// Compute names for `base` + `extension` (extension includes its dot)
    pub fn compute_names(&self, base: &str, extension: &str, count: usize) -> NamingResult {
        let tagged = format!("{}_({} personnes)", base, count);

        let duplicate_names = (1..count)
            .map(|i| format!("{}_copy{}{}", tagged, i, extension))
            .collect();

        NamingResult {
            backup_name: self.backup_name(base, extension),
            primary_name: format!("{}{}", tagged, extension),
            duplicate_names,
        }
    }

}

/// Split `name` into base and extension at the last dot.
///
/// The extension keeps its dot and its case. A name whose only dot is the
/// leading one (`.jpg`) has no extension.
pub fn split_file_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(index) if index > 0 => (&name[..index], &name[index..]),
        _ => (name, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_name_embeds_the_count() {
        let names = NamingPolicy::new().compute_names("a", ".jpg", 2);
        assert_eq!(names.primary_name, "a_(2 personnes).jpg");
        assert_eq!(names.backup_name, "a.jpg");
    }

    #[test]
    fn count_minus_one_duplicates_are_produced() {
        let policy = NamingPolicy::new();
        for count in 1..=12 {
            let names = policy.compute_names("photo", ".png", count);
            assert_eq!(names.duplicate_names.len(), count - 1);
            assert_eq!(names.total_copies(), count);
        }
    }

    #[test]
    fn duplicates_are_one_based_and_ordered() {
        let names = NamingPolicy::new().compute_names("holiday", ".jpg", 3);
        assert_eq!(
            names.duplicate_names,
            vec![
                "holiday_(3 personnes)_copy1.jpg".to_string(),
                "holiday_(3 personnes)_copy2.jpg".to_string(),
            ]
        );
    }

    #[test]
    fn zero_people_still_yields_one_primary() {
        let names = NamingPolicy::new().compute_names("empty", ".jpeg", 0);
        assert_eq!(names.primary_name, "empty_(0 personnes).jpeg");
        assert!(names.duplicate_names.is_empty());
        assert_eq!(names.total_copies(), 1);
    }

    #[test]
    fn single_person_has_no_duplicates() {
        let names = NamingPolicy::new().compute_names("solo", ".jpg", 1);
        assert_eq!(names.primary_name, "solo_(1 personnes).jpg");
        assert!(names.duplicate_names.is_empty());
    }

    #[test]
    fn extension_case_is_preserved() {
        let (base, extension) = split_file_name("IMG_0042.JPG");
        let names = NamingPolicy::new().compute_names(base, extension, 2);
        assert_eq!(names.primary_name, "IMG_0042_(2 personnes).JPG");
        assert_eq!(names.duplicate_names[0], "IMG_0042_(2 personnes)_copy1.JPG");
        assert_eq!(names.backup_name, "IMG_0042.JPG");
    }

    #[test]
    fn backup_name_matches_the_source_for_any_count() {
        let policy = NamingPolicy::new();
        assert_eq!(policy.backup_name("party.2024", ".PNG"), "party.2024.PNG");
        for count in [0, 1, 5] {
            assert_eq!(
                policy.compute_names("party.2024", ".PNG", count).backup_name,
                policy.backup_name("party.2024", ".PNG")
            );
        }
    }

    #[test]
    fn names_are_deterministic() {
        let policy = NamingPolicy::new();
        assert_eq!(
            policy.compute_names("a", ".png", 4),
            policy.compute_names("a", ".png", 4)
        );
    }

    #[test]
    fn output_names_lists_primary_first() {
        let names = NamingPolicy::new().compute_names("a", ".jpg", 2);
        let all: Vec<&str> = names.output_names().collect();
        assert_eq!(all, vec!["a_(2 personnes).jpg", "a_(2 personnes)_copy1.jpg"]);
    }

    #[test]
    fn split_uses_the_last_dot() {
        assert_eq!(split_file_name("a.jpg"), ("a", ".jpg"));
        assert_eq!(split_file_name("party.2024.png"), ("party.2024", ".png"));
        assert_eq!(split_file_name(".jpg"), (".jpg", ""));
        assert_eq!(split_file_name("README"), ("README", ""));
    }
}
