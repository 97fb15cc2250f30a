//! Reading drug datasets into records and writing them back out.

use std::fs::File;
use std::path::Path;

use polars::prelude::*;
use tracing::{debug, info};

use drugmatch_model::{ColumnMapping, DrugRecord};

use crate::clean::parse_orphan_flag;
use crate::error::{IngestError, Result};
use crate::output::write_atomically;

/// Column written for the pre-split name of exploded records.
pub const ORIGINAL_NAME_COLUMN: &str = "Original Drug Name";
/// Column written for the combination flag of exploded records.
pub const COMBINATION_COLUMN: &str = "Is Combination";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    Csv,
    Parquet,
}

impl DatasetFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "csv" => Ok(Self::Csv),
            "parquet" | "pq" => Ok(Self::Parquet),
            _ => Err(IngestError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            }),
        }
    }
}

/// Reads a CSV or Parquet file into a DataFrame.
pub fn read_frame(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let parse_err = |e: PolarsError| IngestError::DatasetParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let df = match DatasetFormat::from_path(path)? {
        DatasetFormat::Csv => CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .map_err(parse_err)?
            .finish()
            .map_err(parse_err)?,
        DatasetFormat::Parquet => {
            let file = File::open(path).map_err(|source| IngestError::FileRead {
                path: path.to_path_buf(),
                source,
            })?;
            ParquetReader::new(file).finish().map_err(parse_err)?
        }
    };
    debug!(path = %path.display(), rows = df.height(), columns = df.width(), "read dataset");
    Ok(df)
}

/// Converts frame rows to records using the configured column names.
///
/// The name column is required. Date, indication, identifier and orphan
/// columns are optional; when absent the fields stay empty. Null or blank cells become
/// missing values.
pub fn records_from_frame(
    df: &DataFrame,
    mapping: &ColumnMapping,
    path: &Path,
) -> Result<Vec<DrugRecord>> {
    let names = df
        .column(&mapping.name)
        .map_err(|_| IngestError::MissingColumn {
            column: mapping.name.clone(),
            path: path.to_path_buf(),
        })?;
    let optional = |column: &str| {
        let found = df.column(column).ok();
        if found.is_none() {
            debug!(column, path = %path.display(), "optional column absent");
        }
        found
    };
    let dates = optional(&mapping.approval_date);
    let indications = optional(&mapping.indication);
    let identifiers = optional(&mapping.identifier);
    let orphans = optional(&mapping.orphan);
    let originals = df.column(ORIGINAL_NAME_COLUMN).ok();
    let combinations = df.column(COMBINATION_COLUMN).ok();

    let mut records = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let name = cell(Some(names), idx).unwrap_or_default();
        let mut record = DrugRecord::new(name)
            .approval_date(cell(dates, idx))
            .indication(cell(indications, idx))
            .orphan(cell(orphans, idx).map(|flag| parse_orphan_flag(&flag)))
            .with_identifier(cell(identifiers, idx));
        record.original_name = cell(originals, idx);
        record.is_combination = cell(combinations, idx)
            .is_some_and(|flag| matches!(flag.to_ascii_lowercase().as_str(), "true" | "1" | "yes"));
        records.push(record);
    }
    Ok(records)
}

/// Loads a dataset file as records.
pub fn load_dataset(path: &Path, mapping: &ColumnMapping) -> Result<Vec<DrugRecord>> {
    let df = read_frame(path)?;
    let records = records_from_frame(&df, mapping, path)?;
    info!(path = %path.display(), records = records.len(), "loaded dataset");
    Ok(records)
}

/// Writes records as CSV with the mapping's column names, so the file can be
/// loaded again with the same mapping.
pub fn write_records(path: &Path, records: &[DrugRecord], mapping: &ColumnMapping) -> Result<()> {
    let csv_err = |source| IngestError::CsvWrite {
        path: path.to_path_buf(),
        source,
    };
    write_atomically(path, |writer| {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record([
            mapping.name.as_str(),
            mapping.approval_date.as_str(),
            mapping.indication.as_str(),
            mapping.identifier.as_str(),
            mapping.orphan.as_str(),
            ORIGINAL_NAME_COLUMN,
            COMBINATION_COLUMN,
        ])
        .map_err(csv_err)?;
        for record in records {
            let combination = if record.is_combination { "true" } else { "false" };
            let orphan = match record.orphan {
                Some(true) => "true",
                Some(false) => "false",
                None => "",
            };
            csv.write_record([
                record.name.as_str(),
                record.approval_date.as_deref().unwrap_or_default(),
                record.indication.as_deref().unwrap_or_default(),
                record.identifier.as_deref().unwrap_or_default(),
                orphan,
                record.original_name.as_deref().unwrap_or_default(),
                combination,
            ])
            .map_err(csv_err)?;
        }
        csv.flush().map_err(|source| IngestError::FileWrite {
            path: path.to_path_buf(),
            source,
        })
    })?;
    info!(path = %path.display(), records = records.len(), "wrote records");
    Ok(())
}

fn cell(column: Option<&Column>, idx: usize) -> Option<String> {
    let value = column?.get(idx).unwrap_or(AnyValue::Null);
    let text = any_to_string(value);
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn any_to_string(value: AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .expect("temp file");
        write!(file, "{content}").expect("write csv");
        file
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            DatasetFormat::from_path(Path::new("a/b.CSV")).expect("csv"),
            DatasetFormat::Csv
        );
        assert_eq!(
            DatasetFormat::from_path(Path::new("b.parquet")).expect("parquet"),
            DatasetFormat::Parquet
        );
        assert!(matches!(
            DatasetFormat::from_path(Path::new("b.xlsx")),
            Err(IngestError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_missing_dataset() {
        let result = load_dataset(Path::new("/no/such/file.csv"), &ColumnMapping::default());
        assert!(matches!(result, Err(IngestError::FileNotFound { .. })));
    }

    #[test]
    fn test_load_with_default_mapping() {
        let file = create_temp_csv(
            "Drug Name,Date of Approval,Indication,RxCUI\nAspirin,01/02/2020,Pain,1191\nIbuprofen,,,\n",
        );
        let records = load_dataset(file.path(), &ColumnMapping::default()).expect("load");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].normalized_name, "aspirin");
        assert_eq!(records[0].identifier.as_deref(), Some("1191"));
        assert_eq!(records[1].approval_date, None);
        assert_eq!(records[1].indication, None);
    }

    #[test]
    fn test_orphan_designation_column() {
        let file = create_temp_csv(
            "Generic Name,Orphan Designation\nMiglustat,Designated\nAspirin,No\nIbuprofen,\n",
        );
        let records = load_dataset(file.path(), &ColumnMapping::reference()).expect("load");
        let flags: Vec<Option<bool>> = records.iter().map(|r| r.orphan).collect();
        assert_eq!(flags, [Some(true), Some(false), None]);
    }

    #[test]
    fn test_optional_columns_may_be_absent() {
        let file = create_temp_csv("Generic Name\nMetformin\n");
        let records = load_dataset(file.path(), &ColumnMapping::reference()).expect("load");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].identifier, None);
    }

    #[test]
    fn test_name_column_is_required() {
        let file = create_temp_csv("Product\nMetformin\n");
        let result = load_dataset(file.path(), &ColumnMapping::default());
        assert!(matches!(result, Err(IngestError::MissingColumn { .. })));
    }

    #[test]
    fn test_written_records_load_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("records.csv");
        let parent = DrugRecord::new("Abacavir/Lamivudine").indication(Some("HIV".to_string()));
        let records = vec![
            parent.as_component("Abacavir"),
            DrugRecord::new("Aspirin").orphan(Some(false)),
            DrugRecord::new("Miglustat").orphan(Some(true)),
        ];
        let mapping = ColumnMapping::default();
        write_records(&path, &records, &mapping).expect("write");

        let loaded = load_dataset(&path, &mapping).expect("load");
        assert_eq!(loaded, records);
    }
}
