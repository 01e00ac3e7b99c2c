//! Selects the text shown for one view of a compile result.

use kedi_types::{CompileResult, RepresentationKind};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    #[error("successful compile result has no '{0}' representation")]
    MissingRepresentation(RepresentationKind),
}

/// The text for `kind`, or an error if a successful result lacks it.
///
/// No selection is the empty string; an error result shows its message
/// whatever the selection.
pub fn try_project(
    result: &CompileResult,
    kind: Option<RepresentationKind>,
) -> Result<String, ProjectionError> {
    let Some(kind) = kind else {
        return Ok(String::new());
    };
    match result {
        CompileResult::Error { message } => Ok(message.clone()),
        CompileResult::Success {
            representations, ..
        } => representations
            .get(&kind)
            .cloned()
            .ok_or(ProjectionError::MissingRepresentation(kind)),
    }
}

/// Like [`try_project`], but a missing representation panics in debug
/// builds and is logged and shown as empty in release builds.
pub fn project(result: &CompileResult, kind: Option<RepresentationKind>) -> String {
    match try_project(result, kind) {
        Ok(text) => text,
        Err(error) => {
            tracing::error!(%error, "compile service broke the projection contract");
            if cfg!(debug_assertions) {
                panic!("{error}");
            }
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kedi_types::Artifact;
    use std::collections::BTreeMap;

    fn success() -> CompileResult {
        CompileResult::Success {
            representations: RepresentationKind::ALL
                .into_iter()
                .map(|k| (k, format!("{k} text")))
                .collect(),
            artifact: Some(Artifact::from(vec![0, 97, 115, 109])),
        }
    }

    #[test]
    fn test_no_selection_is_empty() {
        assert_eq!(project(&success(), None), "");
        assert_eq!(project(&CompileResult::error("bad"), None), "");
    }

    #[test]
    fn test_success_projects_each_kind() {
        let result = success();
        for kind in RepresentationKind::ALL {
            assert_eq!(project(&result, Some(kind)), format!("{kind} text"));
        }
    }

    #[test]
    fn test_error_message_for_every_kind() {
        let result = CompileResult::error("1:5: E100 [syntax] expected expression, got '}'");
        for kind in RepresentationKind::ALL {
            assert_eq!(
                project(&result, Some(kind)),
                "1:5: E100 [syntax] expected expression, got '}'"
            );
        }
    }

    #[test]
    fn test_missing_representation_is_reported() {
        let result = CompileResult::Success {
            representations: BTreeMap::new(),
            artifact: None,
        };
        assert_eq!(
            try_project(&result, Some(RepresentationKind::Plain)),
            Err(ProjectionError::MissingRepresentation(RepresentationKind::Plain))
        );
        assert_eq!(try_project(&result, None), Ok(String::new()));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "no 'simple' representation")]
    fn test_missing_representation_panics_in_debug() {
        let result = CompileResult::Success {
            representations: BTreeMap::new(),
            artifact: None,
        };
        project(&result, Some(RepresentationKind::Simple));
    }
}
