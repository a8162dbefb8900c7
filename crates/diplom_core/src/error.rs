use crate::TitleField;

/// Input problems reported next to the offending control. Never sent anywhere.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter a thesis topic.")]
    BlankTopic,
    #[error("Select at least one goal and one task for the document.")]
    NothingSelected,
    #[error("Please fill in all title page fields (missing: {}).", join_labels(.0))]
    MissingTitleFields(Vec<TitleField>),
}

fn join_labels(fields: &[TitleField]) -> String {
    fields
        .iter()
        .map(|field| field.label())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::ValidationError;
    use crate::TitleField;

    #[test]
    fn missing_fields_are_listed() {
        let err = ValidationError::MissingTitleFields(vec![TitleField::City, TitleField::Year]);
        assert_eq!(
            err.to_string(),
            "Please fill in all title page fields (missing: city, year)."
        );
    }
}
