//! Combination explosion: one record per validated ingredient.

use tracing::{debug, info};

use drugmatch_model::DrugRecord;
use drugmatch_split::{CombinationSplitter, Vocabulary};

use crate::error::{IngestError, Result};

/// Splits every record's name against the vocabulary.
///
/// Records that yield two or more components become one record per
/// component, carrying the raw name in `original_name`. Single-component
/// records pass through renamed to their canonical component. Records whose
/// name yields nothing are kept unchanged.
pub fn explode_combinations(
    records: &[DrugRecord],
    vocabulary: &Vocabulary,
) -> Result<Vec<DrugRecord>> {
    if vocabulary.is_empty() {
        return Err(IngestError::EmptyVocabulary);
    }
    let splitter = CombinationSplitter::new(vocabulary);
    let mut exploded = Vec::with_capacity(records.len());
    let mut combinations = 0usize;

    for record in records {
        let components = splitter.split(&record.name);
        match components.as_slice() {
            [] => exploded.push(record.clone()),
            [single] => {
                let mut next = DrugRecord::new(single.as_str())
                    .approval_date(record.approval_date.clone())
                    .indication(record.indication.clone())
                    .orphan(record.orphan)
                    .with_identifier(record.identifier.clone());
                next.original_name = record.original_name.clone();
                next.is_combination = record.is_combination;
                exploded.push(next);
            }
            many => {
                debug!(name = %record.name, components = many.len(), "exploded combination");
                combinations += 1;
                exploded.extend(many.iter().map(|c| record.as_component(c)));
            }
        }
    }

    info!(
        input = records.len(),
        output = exploded.len(),
        combinations,
        "exploded combination records"
    );
    Ok(exploded)
}
