//! Category sets and merchant keyword matching.
//!
//! A deployment picks one category set plus an ordered keyword table. Both are
//! validated once and then shared read-only by the categorizer.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Category assigned when no keyword matches
pub const DEFAULT_CATEGORY: &str = "Other";

const BASIC_CATEGORIES: &[&str] = &["Food", "Transport", "Shopping", "Bills", "Other"];

const BASIC_RULES: &[(&str, &str)] = &[
    ("walmart", "Food"),
    ("target", "Food"),
    ("kroger", "Food"),
    ("carrefour", "Food"),
    ("safeway", "Food"),
    ("whole foods", "Food"),
    ("trader joe", "Food"),
    ("costco", "Food"),
    ("aldi", "Food"),
    ("publix", "Food"),
    ("mcdonald", "Food"),
    ("burger king", "Food"),
    ("subway", "Food"),
    ("starbucks", "Food"),
    ("pizza", "Food"),
    ("restaurant", "Food"),
    ("cafe", "Food"),
    ("coffee", "Food"),
    ("uber", "Transport"),
    ("lyft", "Transport"),
    ("gas", "Transport"),
    ("shell", "Transport"),
    ("chevron", "Transport"),
    ("exxon", "Transport"),
    ("bp", "Transport"),
    ("parking", "Transport"),
    ("amazon", "Shopping"),
    ("ebay", "Shopping"),
    ("best buy", "Shopping"),
    ("macy", "Shopping"),
    ("nordstrom", "Shopping"),
    ("mall", "Shopping"),
    ("ikea", "Shopping"),
    ("electric", "Bills"),
    ("water", "Bills"),
    ("utility", "Bills"),
    ("internet", "Bills"),
    ("phone", "Bills"),
];

const EXTENDED_CATEGORIES: &[&str] = &[
    "Groceries",
    "Transport",
    "Dining",
    "Shopping",
    "Healthcare",
    "Entertainment",
    "Utilities",
    "Other",
];

const EXTENDED_RULES: &[(&str, &str)] = &[
    ("walmart", "Groceries"),
    ("target", "Groceries"),
    ("kroger", "Groceries"),
    ("carrefour", "Groceries"),
    ("safeway", "Groceries"),
    ("whole foods", "Groceries"),
    ("trader joe", "Groceries"),
    ("costco", "Groceries"),
    ("aldi", "Groceries"),
    ("publix", "Groceries"),
    ("grocery", "Groceries"),
    ("mcdonald", "Dining"),
    ("burger king", "Dining"),
    ("subway", "Dining"),
    ("starbucks", "Dining"),
    ("pizza", "Dining"),
    ("restaurant", "Dining"),
    ("cafe", "Dining"),
    ("coffee", "Dining"),
    ("diner", "Dining"),
    ("uber", "Transport"),
    ("lyft", "Transport"),
    ("gas", "Transport"),
    ("shell", "Transport"),
    ("chevron", "Transport"),
    ("exxon", "Transport"),
    ("bp", "Transport"),
    ("parking", "Transport"),
    ("pharmacy", "Healthcare"),
    ("cvs", "Healthcare"),
    ("walgreens", "Healthcare"),
    ("clinic", "Healthcare"),
    ("dental", "Healthcare"),
    ("cinema", "Entertainment"),
    ("theater", "Entertainment"),
    ("theatre", "Entertainment"),
    ("netflix", "Entertainment"),
    ("spotify", "Entertainment"),
    ("amazon", "Shopping"),
    ("ebay", "Shopping"),
    ("best buy", "Shopping"),
    ("macy", "Shopping"),
    ("nordstrom", "Shopping"),
    ("mall", "Shopping"),
    ("ikea", "Shopping"),
    ("electric", "Utilities"),
    ("water", "Utilities"),
    ("utility", "Utilities"),
    ("internet", "Utilities"),
    ("phone", "Utilities"),
];

/// One entry of the keyword table: lowercase substring → category label
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeywordRule {
    pub keyword: String,
    pub category: String,
}

impl KeywordRule {
    pub fn new(keyword: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            category: category.into(),
        }
    }
}

/// A validated category set with its ordered keyword table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryConfig {
    categories: Vec<String>,
    rules: Vec<KeywordRule>,
}

impl CategoryConfig {
    /// Validate a custom category set.
    ///
    /// The set must be non-empty, free of duplicates and contain
    /// [`DEFAULT_CATEGORY`]; every rule must name a category in the set.
    /// Keywords are lowercased; rule order is preserved.
    pub fn new(categories: Vec<String>, rules: Vec<KeywordRule>) -> Result<Self> {
        if categories.is_empty() {
            return Err(Error::InvalidConfig("category set is empty".into()));
        }
        for (i, c) in categories.iter().enumerate() {
            if c.trim().is_empty() {
                return Err(Error::InvalidConfig("blank category label".into()));
            }
            if categories[..i].contains(c) {
                return Err(Error::InvalidConfig(format!("duplicate category: {c}")));
            }
        }
        if !categories.iter().any(|c| c == DEFAULT_CATEGORY) {
            return Err(Error::InvalidConfig(format!(
                "category set must include {DEFAULT_CATEGORY:?}"
            )));
        }

        let mut normalized = Vec::with_capacity(rules.len());
        for rule in rules {
            let keyword = rule.keyword.trim().to_lowercase();
            if keyword.is_empty() {
                return Err(Error::InvalidConfig(format!(
                    "empty keyword for category {}",
                    rule.category
                )));
            }
            if !categories.contains(&rule.category) {
                return Err(Error::InvalidConfig(format!(
                    "keyword {:?} maps to unknown category {:?}",
                    keyword, rule.category
                )));
            }
            normalized.push(KeywordRule::new(keyword, rule.category));
        }

        Ok(Self {
            categories,
            rules: normalized,
        })
    }

    /// Food / Transport / Shopping / Bills / Other
    pub fn basic() -> Self {
        Self::from_static(BASIC_CATEGORIES, BASIC_RULES)
    }

    /// Groceries / Transport / Dining / Shopping / Healthcare / Entertainment / Utilities / Other
    pub fn extended() -> Self {
        Self::from_static(EXTENDED_CATEGORIES, EXTENDED_RULES)
    }

    /// Look up a built-in preset by name ("basic" or "extended").
    pub fn preset(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "basic" => Ok(Self::basic()),
            "extended" => Ok(Self::extended()),
            other => Err(Error::InvalidConfig(format!("unknown category preset: {other}"))),
        }
    }

    fn from_static(categories: &[&str], rules: &[(&str, &str)]) -> Self {
        Self {
            categories: categories.iter().map(|c| c.to_string()).collect(),
            rules: rules
                .iter()
                .map(|(k, c)| KeywordRule::new(*k, *c))
                .collect(),
        }
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    pub fn contains(&self, label: &str) -> bool {
        self.categories.iter().any(|c| c == label)
    }
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self::basic()
    }
}

/// Maps merchant names to categories by first keyword hit
#[derive(Debug, Clone, Default)]
pub struct MerchantCategorizer {
    config: CategoryConfig,
}

impl MerchantCategorizer {
    pub fn new(config: CategoryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CategoryConfig {
        &self.config
    }

    /// Lowercase the merchant and return the category of the first keyword
    /// (in table order) it contains, or [`DEFAULT_CATEGORY`].
    pub fn categorize(&self, merchant: &str) -> &str {
        let merchant = merchant.to_lowercase();
        self.config
            .rules
            .iter()
            .find(|rule| merchant.contains(&rule.keyword))
            .map(|rule| rule.category.as_str())
            .unwrap_or(DEFAULT_CATEGORY)
    }

    /// Resolve a caller-supplied label against the set (case-insensitive),
    /// falling back to [`DEFAULT_CATEGORY`] for anything unrecognized.
    pub fn resolve(&self, label: &str) -> &str {
        let label = label.trim();
        self.config
            .categories
            .iter()
            .find(|c| c.eq_ignore_ascii_case(label))
            .map(|c| c.as_str())
            .unwrap_or(DEFAULT_CATEGORY)
    }
}
