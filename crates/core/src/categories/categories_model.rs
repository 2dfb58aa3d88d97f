use std::str::FromStr;

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

pub const CATEGORY_TYPE_INCOME: &str = "INCOME";
pub const CATEGORY_TYPE_EXPENSE: &str = "EXPENSE";

/// Whether a category classifies money coming in or going out.
/// Budgets only ever reference expense categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CategoryType {
    Income,
    Expense,
}

impl CategoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryType::Income => CATEGORY_TYPE_INCOME,
            CategoryType::Expense => CATEGORY_TYPE_EXPENSE,
        }
    }
}

impl FromStr for CategoryType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            CATEGORY_TYPE_INCOME => Ok(CategoryType::Income),
            CATEGORY_TYPE_EXPENSE => Ok(CategoryType::Expense),
            _ => Err(format!("Unknown category type: {}", s)),
        }
    }
}

/// Domain model for categories
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub category_type: CategoryType,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub parent_id: Option<String>,
    pub is_default: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Category {
    pub fn is_expense(&self) -> bool {
        self.category_type == CategoryType::Expense
    }

    pub fn is_income(&self) -> bool {
        self.category_type == CategoryType::Income
    }
}

/// Database model for categories
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::categories)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CategoryDB {
    pub id: String,
    pub name: String,
    pub category_type: String,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub parent_id: Option<String>,
    pub is_default: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Model for creating a new category
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub id: Option<String>,
    pub name: String,
    pub category_type: CategoryType,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub parent_id: Option<String>,
}

/// Model for updating a category; `None` fields are left untouched
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub category_type: Option<CategoryType>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

/// Changeset applied to the categories table
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::categories)]
pub struct CategoryChangeset {
    pub name: Option<String>,
    pub category_type: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub updated_at: String,
}

impl From<CategoryDB> for Category {
    fn from(db: CategoryDB) -> Self {
        Self {
            id: db.id,
            name: db.name,
            category_type: CategoryType::from_str(&db.category_type)
                .unwrap_or(CategoryType::Expense),
            color: db.color,
            icon: db.icon,
            parent_id: db.parent_id,
            is_default: db.is_default,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<NewCategory> for CategoryDB {
    fn from(domain: NewCategory) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: domain.id.unwrap_or_default(),
            name: domain.name,
            category_type: domain.category_type.as_str().to_string(),
            color: domain.color,
            icon: domain.icon,
            parent_id: domain.parent_id,
            is_default: false,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}
