//! In-memory repositories for published content.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::ports::{
    BlogRepository, BlogRepositoryError, CategoryRepository, CategoryRepositoryError,
    CoffeeRepository, CoffeeRepositoryError, ProductRepository, ProductRepositoryError,
    ProjectRepository, ProjectRepositoryError, RecipeRepository, RecipeRepositoryError,
};
use crate::domain::{Blog, Category, Coffee, Product, Project, Recipe, UserId};

use super::table::Table;

/// Categories kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryCategoryRepository {
    categories: Table<Category>,
}

impl InMemoryCategoryRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn list_all(&self) -> Result<Vec<Category>, CategoryRepositoryError> {
        Ok(self.categories.read(<[Category]>::to_vec))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, CategoryRepositoryError> {
        Ok(self.categories.find(|category| category.id == id))
    }

    async fn find_by_title(
        &self,
        title: &str,
    ) -> Result<Option<Category>, CategoryRepositoryError> {
        Ok(self.categories.find(|category| category.title == title))
    }

    async fn insert(&self, category: &Category) -> Result<(), CategoryRepositoryError> {
        self.categories.write(|rows| {
            if rows.iter().any(|other| other.title == category.title) {
                return Err(CategoryRepositoryError::duplicate(category.title.as_str()));
            }
            rows.push(category.clone());
            Ok(())
        })
    }

    async fn update_title(&self, id: Uuid, title: &str) -> Result<bool, CategoryRepositoryError> {
        self.categories.write(|rows| {
            if rows.iter().any(|other| other.title == title && other.id != id) {
                return Err(CategoryRepositoryError::duplicate(title));
            }
            Ok(match rows.iter_mut().find(|category| category.id == id) {
                Some(category) => {
                    category.title = title.to_owned();
                    true
                }
                None => false,
            })
        })
    }

    async fn delete_many(&self, ids: Vec<Uuid>) -> Result<usize, CategoryRepositoryError> {
        Ok(self.categories.remove(|category| ids.contains(&category.id)))
    }
}

/// Blog posts kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryBlogRepository {
    blogs: Table<Blog>,
}

impl InMemoryBlogRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlogRepository for InMemoryBlogRepository {
    async fn list(&self) -> Result<Vec<Blog>, BlogRepositoryError> {
        let mut blogs = self.blogs.read(<[Blog]>::to_vec);
        blogs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(blogs)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Blog>, BlogRepositoryError> {
        Ok(self.blogs.find(|blog| blog.id == id))
    }

    async fn insert(&self, blog: &Blog) -> Result<(), BlogRepositoryError> {
        self.blogs.write(|rows| rows.push(blog.clone()));
        Ok(())
    }

    async fn update(&self, blog: &Blog) -> Result<bool, BlogRepositoryError> {
        Ok(self.blogs.replace(blog.clone(), |other| other.id == blog.id))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, BlogRepositoryError> {
        Ok(self.blogs.remove(|blog| blog.id == id) > 0)
    }
}

/// Products kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryProductRepository {
    products: Table<Product>,
}

impl InMemoryProductRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn list(&self, search: Option<String>) -> Result<Vec<Product>, ProductRepositoryError> {
        let mut products = self.products.read(|rows| match search.as_deref() {
            Some(needle) => rows
                .iter()
                .filter(|product| product.matches_search(needle))
                .cloned()
                .collect::<Vec<_>>(),
            None => rows.to_vec(),
        });
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, ProductRepositoryError> {
        Ok(self.products.find(|product| product.id == id))
    }

    async fn insert(&self, product: &Product) -> Result<(), ProductRepositoryError> {
        self.products.write(|rows| rows.push(product.clone()));
        Ok(())
    }

    async fn update(&self, product: &Product) -> Result<bool, ProductRepositoryError> {
        Ok(self
            .products
            .replace(product.clone(), |other| other.id == product.id))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ProductRepositoryError> {
        Ok(self.products.remove(|product| product.id == id) > 0)
    }
}

/// Recipes kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryRecipeRepository {
    recipes: Table<Recipe>,
}

impl InMemoryRecipeRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecipeRepository for InMemoryRecipeRepository {
    async fn list(&self, keyword: Option<String>) -> Result<Vec<Recipe>, RecipeRepositoryError> {
        let mut recipes = self.recipes.read(|rows| {
            rows.iter()
                .filter(|recipe| {
                    keyword
                        .as_deref()
                        .is_none_or(|needle| recipe.matches_keyword(needle))
                })
                .cloned()
                .collect::<Vec<_>>()
        });
        recipes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(recipes)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Recipe>, RecipeRepositoryError> {
        Ok(self.recipes.find(|recipe| recipe.id == id))
    }

    async fn count_by_chef(&self, chef: &UserId) -> Result<usize, RecipeRepositoryError> {
        Ok(self
            .recipes
            .read(|rows| rows.iter().filter(|recipe| recipe.chef == *chef).count()))
    }

    async fn insert(&self, recipe: &Recipe) -> Result<(), RecipeRepositoryError> {
        self.recipes.write(|rows| rows.push(recipe.clone()));
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RecipeRepositoryError> {
        Ok(self.recipes.remove(|recipe| recipe.id == id) > 0)
    }
}

/// Projects kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryProjectRepository {
    projects: Table<Project>,
}

impl InMemoryProjectRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepository {
    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Project>, ProjectRepositoryError> {
        let mut projects = self.projects.read(|rows| {
            rows.iter()
                .filter(|project| project.owner == *owner)
                .cloned()
                .collect::<Vec<_>>()
        });
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    async fn find_owned(
        &self,
        owner: &UserId,
        id: Uuid,
    ) -> Result<Option<Project>, ProjectRepositoryError> {
        Ok(self
            .projects
            .find(|project| project.id == id && project.owner == *owner))
    }

    async fn insert(&self, project: &Project) -> Result<(), ProjectRepositoryError> {
        self.projects.write(|rows| rows.push(project.clone()));
        Ok(())
    }

    async fn update(&self, project: &Project) -> Result<bool, ProjectRepositoryError> {
        Ok(self.projects.replace(project.clone(), |other| {
            other.id == project.id && other.owner == project.owner
        }))
    }

    async fn delete_owned(&self, owner: &UserId, id: Uuid) -> Result<bool, ProjectRepositoryError> {
        Ok(self
            .projects
            .remove(|project| project.id == id && project.owner == *owner)
            > 0)
    }
}

/// Coffees kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryCoffeeRepository {
    coffees: Table<Coffee>,
}

impl InMemoryCoffeeRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CoffeeRepository for InMemoryCoffeeRepository {
    async fn list(&self) -> Result<Vec<Coffee>, CoffeeRepositoryError> {
        let mut coffees = self.coffees.read(<[Coffee]>::to_vec);
        coffees.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(coffees)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Coffee>, CoffeeRepositoryError> {
        Ok(self.coffees.find(|coffee| coffee.id == id))
    }

    async fn insert(&self, coffee: &Coffee) -> Result<(), CoffeeRepositoryError> {
        self.coffees.write(|rows| rows.push(coffee.clone()));
        Ok(())
    }

    async fn update(&self, coffee: &Coffee) -> Result<bool, CoffeeRepositoryError> {
        Ok(self.coffees.replace(coffee.clone(), |other| other.id == coffee.id))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, CoffeeRepositoryError> {
        Ok(self.coffees.remove(|coffee| coffee.id == id) > 0)
    }
}
