//! Structured `trust.txt` record.

use serde::{Deserialize, Serialize};

/// The list-valued categories a manifest can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Member,
    BelongTo,
    Control,
    ControlledBy,
    Social,
    Vendor,
    Customer,
    Disclosure,
    Contact,
}

impl Category {
    /// All categories in canonical serialization order.
    pub const ALL: [Category; 9] = [
        Category::Member,
        Category::BelongTo,
        Category::Control,
        Category::ControlledBy,
        Category::Social,
        Category::Vendor,
        Category::Customer,
        Category::Disclosure,
        Category::Contact,
    ];

    /// Lower-case variable name as written in `trust.txt`.
    pub fn variable(&self) -> &'static str {
        match self {
            Category::Member => "member",
            Category::BelongTo => "belongto",
            Category::Control => "control",
            Category::ControlledBy => "controlledby",
            Category::Social => "social",
            Category::Vendor => "vendor",
            Category::Customer => "customer",
            Category::Disclosure => "disclosure",
            Category::Contact => "contact",
        }
    }

    /// Look up a category by its (already lower-cased) variable name.
    pub fn from_variable(variable: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.variable() == variable)
    }
}

/// Variable name of the boolean training-consent field.
pub const DATA_TRAINING_VARIABLE: &str = "datatrainingallowed";

/// A parsed `trust.txt` manifest.
///
/// Every list preserves manifest encounter order. A manifest is produced
/// fresh by each fetch and is not mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustManifest {
    pub member: Vec<String>,
    pub belong_to: Vec<String>,
    pub control: Vec<String>,
    pub controlled_by: Vec<String>,
    pub social: Vec<String>,
    pub vendor: Vec<String>,
    pub customer: Vec<String>,
    pub disclosure: Vec<String>,
    pub contact: Vec<String>,
    pub data_training_allowed: bool,
}

impl TrustManifest {
    /// Entries declared for one category.
    pub fn entries(&self, category: Category) -> &[String] {
        match category {
            Category::Member => &self.member,
            Category::BelongTo => &self.belong_to,
            Category::Control => &self.control,
            Category::ControlledBy => &self.controlled_by,
            Category::Social => &self.social,
            Category::Vendor => &self.vendor,
            Category::Customer => &self.customer,
            Category::Disclosure => &self.disclosure,
            Category::Contact => &self.contact,
        }
    }

    pub(crate) fn entries_mut(&mut self, category: Category) -> &mut Vec<String> {
        match category {
            Category::Member => &mut self.member,
            Category::BelongTo => &mut self.belong_to,
            Category::Control => &mut self.control,
            Category::ControlledBy => &mut self.controlled_by,
            Category::Social => &mut self.social,
            Category::Vendor => &mut self.vendor,
            Category::Customer => &mut self.customer,
            Category::Disclosure => &mut self.disclosure,
            Category::Contact => &mut self.contact,
        }
    }

    /// True when no category has entries and training is not allowed.
    pub fn is_empty(&self) -> bool {
        !self.data_training_allowed && Category::ALL.iter().all(|c| self.entries(*c).is_empty())
    }

    /// Total number of list entries across all categories.
    pub fn entry_count(&self) -> usize {
        Category::ALL.iter().map(|c| self.entries(*c).len()).sum()
    }

    /// Serialize back to `trust.txt` line format.
    ///
    /// Categories are written in [`Category::ALL`] order, each keeping its
    /// entry order. `datatrainingallowed=yes` is only written when set.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for category in Category::ALL {
            for entry in self.entries(category) {
                out.push_str(category.variable());
                out.push('=');
                out.push_str(entry);
                out.push('\n');
            }
        }
        if self.data_training_allowed {
            out.push_str(DATA_TRAINING_VARIABLE);
            out.push_str("=yes\n");
        }
        out
    }
}
