use crate::categories::categories_model::{Category, CategoryType, CategoryUpdate, NewCategory};
use crate::errors::Result;
use async_trait::async_trait;

/// Trait for category repository operations
#[async_trait]
pub trait CategoryRepositoryTrait: Send + Sync {
    fn get_all_categories(&self) -> Result<Vec<Category>>;
    fn get_category_by_id(&self, id: &str) -> Result<Option<Category>>;
    fn get_categories_by_type(&self, category_type: CategoryType) -> Result<Vec<Category>>;
    async fn create_category(&self, new_category: NewCategory) -> Result<Category>;
    async fn update_category(&self, id: &str, update: CategoryUpdate) -> Result<Category>;
    async fn delete_category(&self, id: &str) -> Result<usize>;
}

/// Trait for category service operations
#[async_trait]
pub trait CategoryServiceTrait: Send + Sync {
    fn get_all_categories(&self) -> Result<Vec<Category>>;
    fn get_category(&self, id: &str) -> Result<Option<Category>>;
    fn get_expense_categories(&self) -> Result<Vec<Category>>;
    fn get_income_categories(&self) -> Result<Vec<Category>>;
    async fn create_category(&self, new_category: NewCategory) -> Result<Category>;
    async fn update_category(&self, id: &str, update: CategoryUpdate) -> Result<Category>;
    async fn delete_category(&self, id: &str) -> Result<usize>;
}
