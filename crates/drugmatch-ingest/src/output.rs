//! Artifact persistence: match reports and the ingredient vocabulary.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{info, warn};

use drugmatch_model::MatchResult;
use drugmatch_split::Vocabulary;

use crate::error::{IngestError, Result};

/// Writes `path` through a temporary file in the same directory and renames
/// it into place, so readers never observe a partial file.
pub fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    let io_err = |source| IngestError::FileWrite {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(io_err)?;

    let mut temp = NamedTempFile::new_in(dir).map_err(io_err)?;
    write(temp.as_file_mut())?;
    temp.as_file_mut().flush().map_err(io_err)?;
    temp.persist(path).map_err(|err| io_err(err.error))?;
    Ok(())
}

/// Writes match results as CSV with report headers. The header row is
/// written even when there are no results.
pub fn write_matches(path: &Path, results: &[MatchResult]) -> Result<()> {
    let csv_err = |source| IngestError::CsvWrite {
        path: path.to_path_buf(),
        source,
    };
    write_atomically(path, |writer| {
        let mut csv = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        csv.write_record(MatchResult::HEADERS).map_err(csv_err)?;
        for result in results {
            csv.serialize(result).map_err(csv_err)?;
        }
        csv.flush().map_err(|source| IngestError::FileWrite {
            path: path.to_path_buf(),
            source,
        })
    })?;
    info!(path = %path.display(), rows = results.len(), "wrote match report");
    Ok(())
}

/// Persists the vocabulary as a JSON array of terms.
pub fn save_vocabulary(path: &Path, vocabulary: &Vocabulary) -> Result<()> {
    let json = serde_json::to_string_pretty(vocabulary).map_err(|source| {
        IngestError::VocabularyParse {
            path: path.to_path_buf(),
            source,
        }
    })?;
    write_atomically(path, |writer| {
        writer
            .write_all(json.as_bytes())
            .map_err(|source| IngestError::FileWrite {
                path: path.to_path_buf(),
                source,
            })
    })?;
    info!(path = %path.display(), terms = vocabulary.len(), "saved vocabulary");
    Ok(())
}

/// Loads a persisted vocabulary.
///
/// Returns `Ok(None)` with a warning when the file does not exist; callers
/// decide whether to rebuild it or fail.
pub fn load_vocabulary(path: &Path) -> Result<Option<Vocabulary>> {
    if !path.exists() {
        warn!(path = %path.display(), "vocabulary file not found");
        return Ok(None);
    }
    let text = fs::read_to_string(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let terms: Vec<String> =
        serde_json::from_str(&text).map_err(|source| IngestError::VocabularyParse {
            path: path.to_path_buf(),
            source,
        })?;
    let vocabulary = Vocabulary::from_names(terms);
    info!(path = %path.display(), terms = vocabulary.len(), "loaded vocabulary");
    Ok(Some(vocabulary))
}

#[cfg(test)]
mod tests {
    use drugmatch_model::DrugRecord;

    use super::*;

    #[test]
    fn test_vocabulary_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("vocab").join("terms.json");
        let vocabulary = Vocabulary::from_names(["Aspirin", "Calcium Folinate"]);
        save_vocabulary(&path, &vocabulary).expect("save");
        assert_eq!(load_vocabulary(&path).expect("load"), Some(vocabulary));
    }

    #[test]
    fn test_missing_vocabulary_is_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert_eq!(load_vocabulary(&dir.path().join("none.json")).expect("load"), None);
    }

    #[test]
    fn test_malformed_vocabulary() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("terms.json");
        fs::write(&path, "{\"a\": 1}").expect("write");
        assert!(matches!(
            load_vocabulary(&path),
            Err(IngestError::VocabularyParse { .. })
        ));
    }

    #[test]
    fn test_match_report_headers() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("matches.csv");
        let source = DrugRecord::new("Aspirin");
        let target = DrugRecord::new("Aspirin").approval_date(Some("01/01/1990".to_string()));
        write_matches(&path, &[MatchResult::exact_identifier(&source, &target)]).expect("write");

        let text = fs::read_to_string(&path).expect("read");
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some(
                "Source Drug Name,Target Drug Name,Similarity Score,Token Score,Ratio Score,\
                 Match Type,Source Approval Date,Target Approval Date,Source Indication,\
                 Target Indication,Original Source Drug,Is Combination"
            )
        );
        assert_eq!(
            lines.next(),
            Some("Aspirin,Aspirin,1.0,,,exact-identifier,,01/01/1990,,,,false")
        );
    }

    #[test]
    fn test_empty_match_report_has_header() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("matches.csv");
        write_matches(&path, &[]).expect("write");

        let text = fs::read_to_string(&path).expect("read");
        assert_eq!(text.lines().count(), 1);
        assert_eq!(text.lines().next(), Some(MatchResult::HEADERS.join(",").as_str()));
    }

    #[test]
    fn test_match_report_reads_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("matches.csv");
        let source = DrugRecord::new("Amoxycillin");
        let target = DrugRecord::new("Amoxicillin");
        let written = vec![MatchResult::fuzzy(&source, &target, 0.95, 90.0, 91.0)];
        write_matches(&path, &written).expect("write");

        let mut reader = csv::Reader::from_path(&path).expect("open");
        let read: Vec<MatchResult> = reader
            .deserialize()
            .collect::<std::result::Result<_, _>>()
            .expect("deserialize");
        assert_eq!(read, written);
    }

    #[test]
    fn test_failed_write_leaves_no_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.csv");
        let result = write_atomically(&path, |_| Err(IngestError::EmptyVocabulary));
        assert!(result.is_err());
        assert!(!path.exists());
    }
}
