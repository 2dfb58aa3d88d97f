use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::SqliteConnection;
use std::sync::Arc;

use crate::categories::categories_errors::CategoryError;
use crate::categories::categories_model::{
    Category, CategoryChangeset, CategoryDB, CategoryType, CategoryUpdate, NewCategory,
};
use crate::categories::categories_traits::CategoryRepositoryTrait;
use crate::db::get_connection;
use crate::errors::Result;
use crate::schema::categories;
use crate::schema::categories::dsl::*;

use uuid::Uuid;

pub struct CategoryRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl CategoryRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        CategoryRepository { pool }
    }
}

#[async_trait]
impl CategoryRepositoryTrait for CategoryRepository {
    fn get_all_categories(&self) -> Result<Vec<Category>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = categories
            .order((category_type.asc(), name.asc()))
            .load::<CategoryDB>(&mut conn)?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    fn get_category_by_id(&self, category_id: &str) -> Result<Option<Category>> {
        let mut conn = get_connection(&self.pool)?;
        let row = categories
            .find(category_id)
            .first::<CategoryDB>(&mut conn)
            .optional()?;
        Ok(row.map(Category::from))
    }

    fn get_categories_by_type(&self, requested: CategoryType) -> Result<Vec<Category>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = categories
            .filter(category_type.eq(requested.as_str()))
            .order(name.asc())
            .load::<CategoryDB>(&mut conn)?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn create_category(&self, new_category: NewCategory) -> Result<Category> {
        let mut conn = get_connection(&self.pool)?;

        let mut category_db: CategoryDB = new_category.into();
        category_db.id = Uuid::new_v4().to_string();

        diesel::insert_into(categories::table)
            .values(&category_db)
            .execute(&mut conn)?;

        Ok(category_db.into())
    }

    async fn update_category(&self, category_id: &str, update: CategoryUpdate) -> Result<Category> {
        let mut conn = get_connection(&self.pool)?;

        let changeset = CategoryChangeset {
            name: update.name,
            category_type: update.category_type.map(|t| t.as_str().to_string()),
            color: update.color,
            icon: update.icon,
            updated_at: chrono::Utc::now().to_rfc3339(),
        };

        let affected = diesel::update(categories.find(category_id))
            .set(&changeset)
            .execute(&mut conn)?;

        if affected == 0 {
            return Err(CategoryError::NotFound(format!(
                "Category with id {} not found",
                category_id
            ))
            .into());
        }

        let row = categories.find(category_id).first::<CategoryDB>(&mut conn)?;
        Ok(row.into())
    }

    async fn delete_category(&self, category_id: &str) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;
        let affected = diesel::delete(categories.find(category_id)).execute(&mut conn)?;

        if affected == 0 {
            return Err(CategoryError::NotFound(format!(
                "Category with id {} not found",
                category_id
            ))
            .into());
        }

        Ok(affected)
    }
}
