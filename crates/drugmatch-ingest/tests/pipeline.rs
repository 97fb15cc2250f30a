//! Clean, explode and persist a small source dataset end to end.

use std::fs;

use drugmatch_ingest::{
    clean_records, explode_combinations, load_dataset, load_vocabulary, save_vocabulary,
    write_records,
};
use drugmatch_model::ColumnMapping;
use drugmatch_split::Vocabulary;

const SOURCE_CSV: &str = "\
Drug Name,Date of Approval,Indication,RxCUI
Abacavir/Lamivudine 600mg Tablet,12/3/2015,HIV infection,
Aspirin 100mg,2001,,1191
ASPIRIN,,Pain,
Folinic Acid and Calcium Injection,31/02/2020,Rescue therapy,
";

const REFERENCE_CSV: &str = "\
Generic Name,Marketing Approval Date,Approved Labeled Indication
abacavir,01/01/1998,HIV
lamivudine,01/01/1995,HIV
aspirin,,
calcium folinate,,
";

#[test]
fn clean_then_explode_then_reload() {
    let dir = tempfile::tempdir().expect("tempdir");
    let source_path = dir.path().join("source.csv");
    let reference_path = dir.path().join("reference.csv");
    fs::write(&source_path, SOURCE_CSV).expect("write source");
    fs::write(&reference_path, REFERENCE_CSV).expect("write reference");

    let source_mapping = ColumnMapping::default();
    let reference = load_dataset(&reference_path, &ColumnMapping::reference()).expect("reference");
    let vocabulary = Vocabulary::from_records(&reference);
    assert_eq!(vocabulary.len(), 4);

    let vocab_path = dir.path().join("artifacts").join("vocabulary.json");
    save_vocabulary(&vocab_path, &vocabulary).expect("save vocabulary");
    let vocabulary = load_vocabulary(&vocab_path)
        .expect("load vocabulary")
        .expect("vocabulary present");

    let raw = load_dataset(&source_path, &source_mapping).expect("source");
    let (cleaned, report) = clean_records(raw);
    assert_eq!(report.duplicates, 1);
    assert_eq!(report.output, 3);

    let exploded = explode_combinations(&cleaned, &vocabulary).expect("explode");
    let names: Vec<&str> = exploded.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["Abacavir", "Lamivudine", "Aspirin", "Calcium Folinate"]);
    assert_eq!(exploded[0].approval_date.as_deref(), Some("03/12/2015"));
    assert_eq!(exploded[2].approval_date.as_deref(), Some("01/01/2001"));
    assert_eq!(exploded[2].identifier.as_deref(), Some("1191"));
    assert_eq!(exploded[3].approval_date, None);

    let out_path = dir.path().join("exploded.csv");
    write_records(&out_path, &exploded, &source_mapping).expect("write exploded");
    let reloaded = load_dataset(&out_path, &source_mapping).expect("reload");
    assert_eq!(reloaded, exploded);
    assert_eq!(
        reloaded[1].original_name.as_deref(),
        Some("Abacavir/Lamivudine")
    );
}
