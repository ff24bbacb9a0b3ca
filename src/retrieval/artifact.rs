//! Debug artifact holding the most recent CandidateSet. Written on every
//! successful retrieval; the pipeline never reads it back.

use anyhow::{Context, Result};
use std::path::Path;

use crate::models::{CandidateSet, CatalogRecord};

pub fn write_artifact<R: CatalogRecord>(path: &Path, candidates: &CandidateSet<R>) -> Result<()> {
    let data = serde_json::to_string_pretty(candidates)?;
    std::fs::write(path, data)
        .with_context(|| format!("Failed to write artifact {}", path.display()))?;
    Ok(())
}

pub fn read_artifact<R: CatalogRecord>(path: &Path) -> Result<CandidateSet<R>> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read artifact {}", path.display()))?;
    serde_json::from_str(&data).context("Artifact is not a CandidateSet")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DishRecord;

    fn sample() -> CandidateSet<DishRecord> {
        let mut set = CandidateSet::new();
        set.insert(
            "Paneer Butter Masala".to_string(),
            DishRecord {
                cuisine: "Indian".into(),
                category: "Veg".into(),
                description: "Paneer in a mildly spiced tomato gravy".into(),
                allergy: "Dairy".into(),
            },
        );
        set.insert(
            "Dal Makhani".to_string(),
            DishRecord {
                cuisine: "Indian".into(),
                ..Default::default()
            },
        );
        set
    }

    #[test]
    fn test_artifact_round_trip_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resp.json");
        let set = sample();

        write_artifact(&path, &set).unwrap();
        let back: CandidateSet<DishRecord> = read_artifact(&path).unwrap();

        assert_eq!(back, set);
        assert_eq!(back.get_index(0).unwrap().0, "Paneer Butter Masala");
    }

    #[test]
    fn test_artifact_is_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resp.json");

        write_artifact(&path, &sample()).unwrap();
        write_artifact(&path, &CandidateSet::<DishRecord>::new()).unwrap();

        let back: CandidateSet<DishRecord> = read_artifact(&path).unwrap();
        assert!(back.is_empty());
    }

    #[test]
    fn test_write_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("resp.json");
        assert!(write_artifact(&path, &sample()).is_err());
    }
}
