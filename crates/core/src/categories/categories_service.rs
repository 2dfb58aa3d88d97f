use async_trait::async_trait;
use std::sync::Arc;

use crate::categories::categories_errors::CategoryError;
use crate::categories::categories_model::{Category, CategoryType, CategoryUpdate, NewCategory};
use crate::categories::categories_traits::{CategoryRepositoryTrait, CategoryServiceTrait};
use crate::errors::Result;

pub struct CategoryService<T: CategoryRepositoryTrait> {
    category_repo: Arc<T>,
}

impl<T: CategoryRepositoryTrait> CategoryService<T> {
    pub fn new(category_repo: Arc<T>) -> Self {
        CategoryService { category_repo }
    }
}

#[async_trait]
impl<T: CategoryRepositoryTrait + Send + Sync> CategoryServiceTrait for CategoryService<T> {
    fn get_all_categories(&self) -> Result<Vec<Category>> {
        self.category_repo.get_all_categories()
    }

    fn get_category(&self, id: &str) -> Result<Option<Category>> {
        self.category_repo.get_category_by_id(id)
    }

    fn get_expense_categories(&self) -> Result<Vec<Category>> {
        self.category_repo.get_categories_by_type(CategoryType::Expense)
    }

    fn get_income_categories(&self) -> Result<Vec<Category>> {
        self.category_repo.get_categories_by_type(CategoryType::Income)
    }

    async fn create_category(&self, new_category: NewCategory) -> Result<Category> {
        if new_category.name.trim().is_empty() {
            return Err(
                CategoryError::InvalidData("Category name cannot be empty".to_string()).into(),
            );
        }
        self.category_repo.create_category(new_category).await
    }

    async fn update_category(&self, id: &str, update: CategoryUpdate) -> Result<Category> {
        if let Some(ref new_name) = update.name {
            if new_name.trim().is_empty() {
                return Err(
                    CategoryError::InvalidData("Category name cannot be empty".to_string()).into(),
                );
            }
        }
        self.category_repo.update_category(id, update).await
    }

    async fn delete_category(&self, id: &str) -> Result<usize> {
        if let Some(existing) = self.category_repo.get_category_by_id(id)? {
            if existing.is_default {
                return Err(CategoryError::InvalidData(
                    "Default categories cannot be deleted".to_string(),
                )
                .into());
            }
        }
        self.category_repo.delete_category(id).await
    }
}
