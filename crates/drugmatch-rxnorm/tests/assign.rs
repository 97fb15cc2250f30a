use std::collections::HashMap;
use std::time::Duration;

use drugmatch_model::DrugRecord;
use drugmatch_rxnorm::{CachedLookup, IdentifierLookup, Result, assign_identifiers};

struct StaticLookup(HashMap<&'static str, &'static str>);

impl IdentifierLookup for StaticLookup {
    fn lookup(&self, name: &str) -> Result<Option<String>> {
        Ok(self.0.get(name).map(|id| id.to_string()))
    }

    fn is_remote(&self) -> bool {
        true
    }
}

fn lookup() -> StaticLookup {
    StaticLookup(HashMap::from([("aspirin", "1191"), ("metformin", "6809")]))
}

#[test]
fn assigns_and_persists_identifiers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rxnorm_cache.json");
    let records = vec![
        DrugRecord::new("Aspirin"),
        DrugRecord::new("Metformin").with_identifier(Some("kept".to_string())),
        DrugRecord::new("Unknownium"),
    ];

    let mut cache = CachedLookup::open(lookup(), &path).with_delay(Duration::ZERO);
    let assigned = assign_identifiers(&records, &mut cache);
    cache.save().unwrap();

    let ids: Vec<Option<&str>> = assigned.iter().map(|r| r.identifier.as_deref()).collect();
    assert_eq!(ids, [Some("1191"), Some("kept"), None]);

    // A fresh cache over an empty lookup answers from the file alone.
    let mut reopened = CachedLookup::open(StaticLookup(HashMap::new()), &path);
    assert_eq!(reopened.len(), 2);
    assert_eq!(reopened.lookup("aspirin").as_deref(), Some("1191"));
    assert_eq!(reopened.lookup("unknownium"), None);
}
