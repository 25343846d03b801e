//! Feature column classification and selection

use std::fmt;

use crate::data::Dataset;
use crate::error::PipelineError;

/// Cardinality rule applied to a feature selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionMode {
    /// Exactly two features
    StrictPair,
    /// At least one feature
    FlexMinOne,
    /// At least two features, needed when both plot axes come from features
    FlexMinTwo,
}

impl SelectionMode {
    /// Smallest valid selection size
    pub fn min_features(self) -> usize {
        match self {
            SelectionMode::StrictPair | SelectionMode::FlexMinTwo => 2,
            SelectionMode::FlexMinOne => 1,
        }
    }

    /// Largest valid selection size, if bounded
    pub fn max_features(self) -> Option<usize> {
        match self {
            SelectionMode::StrictPair => Some(2),
            SelectionMode::FlexMinOne | SelectionMode::FlexMinTwo => None,
        }
    }

    pub fn accepts(self, count: usize) -> bool {
        count >= self.min_features() && self.max_features().map_or(true, |max| count <= max)
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionMode::StrictPair => write!(f, "exactly 2 features"),
            SelectionMode::FlexMinOne => write!(f, "at least 1 feature"),
            SelectionMode::FlexMinTwo => write!(f, "at least 2 features"),
        }
    }
}

/// Numeric columns eligible as features, in schema order
///
/// Columns named in `excluded` (coordinates, identifiers) are skipped.
pub fn numeric_candidates<S: AsRef<str>>(dataset: &Dataset, excluded: &[S]) -> Vec<String> {
    dataset
        .columns()
        .iter()
        .filter(|c| c.is_numeric())
        .filter(|c| !excluded.iter().any(|e| e.as_ref() == c.name))
        .map(|c| c.name.clone())
        .collect()
}

/// Selection used before the user has chosen anything
///
/// Takes the first `mode.min_features()` candidates. When there are fewer
/// candidates than that, the short list is returned unchanged and will be
/// rejected by [`validate_selection`].
pub fn default_selection(mode: SelectionMode, candidates: &[String]) -> Vec<String> {
    candidates
        .iter()
        .take(mode.min_features())
        .cloned()
        .collect()
}

/// Check a user selection against the candidates and the mode's cardinality
pub fn validate_selection(
    mode: SelectionMode,
    candidates: &[String],
    selected: &[String],
) -> Result<(), PipelineError> {
    for (i, name) in selected.iter().enumerate() {
        if selected[..i].contains(name) {
            return Err(PipelineError::Selection(format!(
                "feature '{}' selected more than once",
                name
            )));
        }
        if !candidates.contains(name) {
            return Err(PipelineError::Selection(format!(
                "'{}' is not a numeric feature column (candidates: {})",
                name,
                candidates.join(", ")
            )));
        }
    }

    if !mode.accepts(selected.len()) {
        return Err(PipelineError::Selection(format!(
            "{} required, {} selected",
            mode,
            selected.len()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Column;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn test_dataset() -> Dataset {
        Dataset::new(vec![
            Column::numeric("ID", vec![Some(1.0), Some(2.0)]),
            Column::numeric("Latitude", vec![Some(37.5), Some(37.6)]),
            Column::text("Region", vec![Some("a".into()), Some("b".into())]),
            Column::numeric("Weight", vec![Some(1.0), Some(2.0)]),
            Column::numeric("Longitude", vec![Some(127.0), Some(127.1)]),
            Column::numeric("Distance", vec![Some(5.0), None]),
        ])
        .unwrap()
    }

    #[test]
    fn test_candidates_exclude_coordinates_and_ids() {
        let dataset = test_dataset();
        let candidates = numeric_candidates(&dataset, &["Latitude", "Longitude", "ID"]);
        assert_eq!(candidates, names(&["Weight", "Distance"]));
    }

    #[test]
    fn test_candidates_may_be_empty() {
        let dataset = test_dataset();
        let candidates = numeric_candidates(
            &dataset,
            &["Latitude", "Longitude", "ID", "Weight", "Distance"],
        );
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_default_selection_is_schema_prefix() {
        let candidates = names(&["Weight", "Distance", "Volume"]);
        assert_eq!(
            default_selection(SelectionMode::StrictPair, &candidates),
            names(&["Weight", "Distance"])
        );
        assert_eq!(
            default_selection(SelectionMode::FlexMinOne, &candidates),
            names(&["Weight"])
        );
    }

    #[test]
    fn test_strict_pair_cardinality() {
        let candidates = names(&["Weight", "Distance", "Volume"]);
        let mode = SelectionMode::StrictPair;

        assert!(validate_selection(mode, &candidates, &names(&["Weight", "Distance"])).is_ok());
        assert!(matches!(
            validate_selection(mode, &candidates, &names(&["Weight"])),
            Err(PipelineError::Selection(_))
        ));
        assert!(matches!(
            validate_selection(mode, &candidates, &names(&["Weight", "Distance", "Volume"])),
            Err(PipelineError::Selection(_))
        ));
    }

    #[test]
    fn test_flexible_cardinality() {
        let candidates = names(&["Weight", "Distance", "Volume"]);

        let volume = names(&["Volume"]);

        assert!(validate_selection(SelectionMode::FlexMinOne, &candidates, &volume).is_ok());
        assert!(validate_selection(SelectionMode::FlexMinOne, &candidates, &[]).is_err());
        assert!(validate_selection(SelectionMode::FlexMinTwo, &candidates, &volume).is_err());
        assert!(validate_selection(SelectionMode::FlexMinTwo, &candidates, &candidates).is_ok());
    }

    #[test]
    fn test_unknown_and_duplicate_features_rejected() {
        let candidates = names(&["Weight", "Distance"]);
        let mode = SelectionMode::FlexMinOne;

        assert!(validate_selection(mode, &candidates, &names(&["Latitude"])).is_err());
        assert!(validate_selection(mode, &candidates, &names(&["Weight", "Weight"])).is_err());
    }

    #[test]
    fn test_single_candidate_default_does_not_truncate() {
        let candidates = names(&["Weight"]);
        let selection = default_selection(SelectionMode::StrictPair, &candidates);
        assert_eq!(selection, names(&["Weight"]));
        assert!(validate_selection(SelectionMode::StrictPair, &candidates, &selection).is_err());
    }
}
