//! URN identifiers for datasets and concepts.

use crate::errors::Error;

const URN_PREFIX: &str = "urn:";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConceptId {
    pub project: String,
    pub type_: String,
    pub key: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetId {
    pub project: String,
    pub key: String,
}

pub fn is_urn(id: &str) -> bool {
    id.starts_with(URN_PREFIX)
}

/// Parses `urn:{project}:{type}:{key}`; colons inside the key are kept.
pub fn parse_concept_id(id: &str) -> Result<ConceptId, Error> {
    let invalid =
        || Error::InvalidUrn(format!("Id should be in the form \"urn:{{project}}:{{type}}:{{key}}\", got '{id}'"));
    let rest = id.strip_prefix(URN_PREFIX).ok_or_else(invalid)?;
    let mut parts = rest.splitn(3, ':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(project), Some(type_), Some(key))
            if !project.is_empty() && !type_.is_empty() && !key.is_empty() =>
        {
            Ok(ConceptId {
                project: project.to_string(),
                type_: type_.to_string(),
                key: key.to_string(),
            })
        }
        _ => Err(invalid()),
    }
}

/// Parses `urn:{project}:{dataset}`.
pub fn parse_dataset_id(id: &str) -> Result<DatasetId, Error> {
    let invalid =
        || Error::InvalidUrn(format!("Id should be in the form \"urn:{{project}}:{{dataset}}\", got '{id}'"));
    let rest = id.strip_prefix(URN_PREFIX).ok_or_else(invalid)?;
    match rest.split_once(':') {
        Some((project, key)) if !project.is_empty() && !key.is_empty() => Ok(DatasetId {
            project: project.to_string(),
            key: key.to_string(),
        }),
        _ => Err(invalid()),
    }
}

/// Path segment for a dataset given either its URN or its bare key.
pub fn dataset_path(id: &str) -> Result<String, Error> {
    if is_urn(id) {
        Ok(parse_dataset_id(id)?.key)
    } else {
        Ok(id.to_string())
    }
}

impl ConceptId {
    /// `{type}/{key}` path used to address the concept.
    pub fn path(&self) -> String {
        format!("{}/{}", self.type_, self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concept_id_keeps_colons_in_key() {
        let id = parse_concept_id("urn:project1:type1:prefix:concept1").unwrap();
        assert_eq!(
            id,
            ConceptId {
                project: "project1".into(),
                type_: "type1".into(),
                key: "prefix:concept1".into(),
            }
        );
        assert_eq!(id.path(), "type1/prefix:concept1");
    }

    #[test]
    fn concept_id_rejects_short_or_foreign_ids() {
        assert!(matches!(parse_concept_id("invalid"), Err(Error::InvalidUrn(_))));
        assert!(matches!(parse_concept_id("urn:p:t"), Err(Error::InvalidUrn(_))));
        assert!(matches!(parse_concept_id("urn::t:k"), Err(Error::InvalidUrn(_))));
    }

    #[test]
    fn dataset_id_parses_project_and_key() {
        let id = parse_dataset_id("urn:project1:dataset1").unwrap();
        assert_eq!(id.project, "project1");
        assert_eq!(id.key, "dataset1");
        assert!(matches!(parse_dataset_id("urn:project1"), Err(Error::InvalidUrn(_))));
    }

    #[test]
    fn dataset_path_accepts_urn_or_key() {
        assert_eq!(dataset_path("urn:p:people").unwrap(), "people");
        assert_eq!(dataset_path("people").unwrap(), "people");
        assert!(is_urn("urn:x"));
        assert!(!is_urn("x:urn"));
    }
}
