use serde::{Deserialize, Serialize};

use drugmatch_text::normalize;

/// One drug row from a source or reference dataset.
///
/// The normalized name is derived once at construction. Records are not
/// mutated afterwards; [`DrugRecord::with_identifier`] returns a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrugRecord {
    pub name: String,
    pub normalized_name: String,
    pub approval_date: Option<String>,
    pub indication: Option<String>,
    pub identifier: Option<String>,
    /// Orphan designation flag; `None` when the dataset does not say.
    pub orphan: Option<bool>,
    /// Name before combination explosion, when this record is one component.
    pub original_name: Option<String>,
    pub is_combination: bool,
}

impl DrugRecord {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let normalized_name = normalize(&name);
        Self {
            name,
            normalized_name,
            approval_date: None,
            indication: None,
            identifier: None,
            orphan: None,
            original_name: None,
            is_combination: false,
        }
    }

    pub fn approval_date(mut self, date: Option<String>) -> Self {
        self.approval_date = non_blank(date);
        self
    }

    pub fn indication(mut self, indication: Option<String>) -> Self {
        self.indication = non_blank(indication);
        self
    }

    pub fn with_identifier(mut self, identifier: Option<String>) -> Self {
        self.identifier = non_blank(identifier);
        self
    }

    pub fn orphan(mut self, orphan: Option<bool>) -> Self {
        self.orphan = orphan;
        self
    }

    /// Rebuilds this record as one component of a combination product.
    pub fn as_component(&self, component: &str) -> Self {
        Self {
            name: component.to_string(),
            normalized_name: normalize(component),
            approval_date: self.approval_date.clone(),
            indication: self.indication.clone(),
            identifier: None,
            orphan: self.orphan,
            original_name: Some(self.name.clone()),
            is_combination: true,
        }
    }

    pub fn has_name(&self) -> bool {
        !self.normalized_name.is_empty()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
