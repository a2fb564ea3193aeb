use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const RUBRIC_TOTAL: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Contact,
    Summary,
    Skills,
    Experience,
    Education,
    Projects,
}

impl Category {
    /// Fixed evaluation order.
    pub const ALL: [Category; 6] = [
        Category::Contact,
        Category::Summary,
        Category::Skills,
        Category::Experience,
        Category::Education,
        Category::Projects,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RubricItem {
    pub category: Category,
    pub max_points: u32,
    pub description: &'static str,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RubricError {
    #[error("Rubric must total 100 points, got {0}")]
    BadTotal(u32),

    #[error("Rubric lists {0:?} more than once")]
    Duplicate(Category),

    #[error("Rubric is missing {0:?}")]
    Missing(Category),

    #[error("Unknown rubric version '{0}'")]
    UnknownVersion(String),
}

/// A validated, versioned set of weighted categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rubric {
    version: &'static str,
    items: Vec<RubricItem>,
}

impl Rubric {
    pub fn new(version: &'static str, items: Vec<RubricItem>) -> Result<Self, RubricError> {
        for category in Category::ALL {
            match items.iter().filter(|i| i.category == category).count() {
                0 => return Err(RubricError::Missing(category)),
                1 => {}
                _ => return Err(RubricError::Duplicate(category)),
            }
        }
        let total: u32 = items.iter().map(|i| i.max_points).sum();
        if total != RUBRIC_TOTAL {
            return Err(RubricError::BadTotal(total));
        }
        Ok(Self { version, items })
    }

    pub fn v1_uk() -> Result<Self, RubricError> {
        Self::new(
            "v1_uk",
            vec![
                item(Category::Contact, 15, "Name, email, phone present and professional"),
                item(Category::Summary, 10, "Clear 2–3 line summary tailored to target role"),
                item(Category::Skills, 20, "Role-relevant skills depth and clarity"),
                item(Category::Experience, 30, "Experience entries with impact and metrics"),
                item(Category::Education, 15, "Education present with key details"),
                item(Category::Projects, 10, "Projects with stack + outcomes + links where possible"),
            ],
        )
    }

    /// Resolves a configured scoring version. `v1` is the deployed alias of `v1_uk`.
    pub fn for_version(version: &str) -> Result<Self, RubricError> {
        match version {
            "v1" | "v1_uk" => Self::v1_uk(),
            other => Err(RubricError::UnknownVersion(other.to_string())),
        }
    }

    pub fn version(&self) -> &'static str {
        self.version
    }

    #[cfg(test)]
    pub fn items(&self) -> &[RubricItem] {
        &self.items
    }

    pub fn max_for(&self, category: Category) -> u32 {
        self.items
            .iter()
            .find(|i| i.category == category)
            .map_or(0, |i| i.max_points)
    }

    #[cfg(test)]
    pub fn total(&self) -> u32 {
        self.items.iter().map(|i| i.max_points).sum()
    }
}

fn item(category: Category, max_points: u32, description: &'static str) -> RubricItem {
    RubricItem {
        category,
        max_points,
        description,
    }
}
