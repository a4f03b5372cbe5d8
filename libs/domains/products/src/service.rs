//! Product catalogue rules: listing, search and owner-only mutation

use std::sync::Arc;

use database::bson::doc;
use database::{
    BaseService, Operation, PaginatedResult, PaginationParams, Repository, RepositoryExt,
    record::parse_object_id,
};
use tracing::instrument;

use crate::error::{PRODUCT_NOT_FOUND, ProductError, ProductResult};
use crate::models::{CreateProduct, Product, ProductCategory, ProductResponse, UpdateProduct};

/// Service layer for product business logic
pub struct ProductService<R> {
    base: BaseService<Product, ProductResponse, R>,
}

impl<R> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
        }
    }
}

impl<R: Repository<Product>> ProductService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            base: BaseService::new(repository).with_not_found_message(PRODUCT_NOT_FOUND),
        }
    }

    /// Create a product owned by `owner`
    #[instrument(skip(self, input), fields(product_name = %input.name))]
    pub async fn create_product(
        &self,
        owner: &str,
        input: CreateProduct,
    ) -> ProductResult<ProductResponse> {
        let owner = parse_object_id(owner, Operation::Create)?;
        Ok(self.base.create(Product::new(owner, input)).await?)
    }

    /// Active products, one page at a time
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        params: PaginationParams,
    ) -> ProductResult<PaginatedResult<ProductResponse>> {
        Ok(self.base.get_all(params, doc! { "isActive": true }).await?)
    }

    #[instrument(skip(self))]
    pub async fn get_by_category(
        &self,
        category: ProductCategory,
        params: PaginationParams,
    ) -> ProductResult<PaginatedResult<ProductResponse>> {
        let filter = doc! { "category": category.to_string(), "isActive": true };
        Ok(self.base.get_all(params, filter).await?)
    }

    /// Full-text search over name and description of active products
    #[instrument(skip(self))]
    pub async fn search_products(&self, term: &str) -> ProductResult<Vec<ProductResponse>> {
        let term = term.trim();
        if term.is_empty() {
            return Err(ProductError::SearchTermRequired);
        }

        let repository: &R = self.base.repository();
        let products = repository
            .query()
            .where_eq("isActive", true)
            .search(term)
            .execute()
            .await?;

        Ok(products.into_iter().map(ProductResponse::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: &str) -> ProductResult<ProductResponse> {
        Ok(self.base.get_by_id(id).await?)
    }

    /// Apply a partial update; only the owner may change a product
    #[instrument(skip(self, input))]
    pub async fn update_product(
        &self,
        id: &str,
        caller: &str,
        input: UpdateProduct,
    ) -> ProductResult<ProductResponse> {
        let product = self.base.get_record(id).await?;
        if !self.owns(&product, caller) {
            return Err(ProductError::NotOwnerUpdate);
        }

        Ok(self.base.update(id, input.into_changes()).await?)
    }

    /// Hard delete; only the owner may remove a product
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: &str, caller: &str) -> ProductResult<()> {
        let product = self.base.get_record(id).await?;
        if !self.owns(&product, caller) {
            return Err(ProductError::NotOwnerDelete);
        }

        if !self.base.repository().delete(id).await? {
            return Err(ProductError::DeleteFailed);
        }

        tracing::info!(product_id = %id, "Product deleted");
        Ok(())
    }

    fn owns(&self, product: &Product, caller: &str) -> bool {
        parse_object_id(caller, Operation::FindById)
            .map(|caller| product.is_owned_by(&caller))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::bson::oid::ObjectId;
    use database::{InMemoryRepository, MemoryDatabase, ServiceError};

    fn setup() -> (ProductService<InMemoryRepository<Product>>, Arc<InMemoryRepository<Product>>) {
        let repo = Arc::new(InMemoryRepository::new(&MemoryDatabase::new()));
        (ProductService::new(repo.clone()), repo)
    }

    fn input(name: &str, description: &str, category: ProductCategory) -> CreateProduct {
        CreateProduct {
            name: name.into(),
            description: description.into(),
            price: 10.0,
            category,
            stock: 5,
            images: vec![],
        }
    }

    #[tokio::test]
    async fn test_create_sets_owner() {
        let (service, _) = setup();
        let owner = ObjectId::new().to_hex();

        let product = service
            .create_product(&owner, input("Lamp", "Desk lamp", ProductCategory::Other))
            .await
            .unwrap();
        assert_eq!(product.created_by, owner);
        assert!(product.is_active);

        let fetched = service.get_product(&product.id).await.unwrap();
        assert_eq!(fetched, product);
    }

    #[tokio::test]
    async fn test_list_and_category_only_active() {
        let (service, _) = setup();
        let owner = ObjectId::new().to_hex();
        let book = service
            .create_product(&owner, input("Dune", "Novel", ProductCategory::Books))
            .await
            .unwrap();
        service
            .create_product(&owner, input("Shirt", "Cotton", ProductCategory::Clothing))
            .await
            .unwrap();
        let hidden = service
            .create_product(&owner, input("Atlas", "Maps", ProductCategory::Books))
            .await
            .unwrap();
        service
            .update_product(
                &hidden.id,
                &owner,
                UpdateProduct {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let all = service.list_products(PaginationParams::default()).await.unwrap();
        assert_eq!(all.pagination.total, 2);

        let books = service
            .get_by_category(ProductCategory::Books, PaginationParams::default())
            .await
            .unwrap();
        assert_eq!(books.pagination.total, 1);
        assert_eq!(books.data[0].id, book.id);
    }

    #[tokio::test]
    async fn test_search_requires_term_and_skips_inactive() {
        let (service, _) = setup();
        let owner = ObjectId::new().to_hex();
        service
            .create_product(&owner, input("Reading lamp", "Warm light", ProductCategory::Other))
            .await
            .unwrap();
        let off = service
            .create_product(&owner, input("Floor lamp", "Tall", ProductCategory::Other))
            .await
            .unwrap();
        service
            .update_product(
                &off.id,
                &owner,
                UpdateProduct {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let err = service.search_products("   ").await.unwrap_err();
        assert!(matches!(err, ProductError::SearchTermRequired));

        let found = service.search_products("lamp").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Reading lamp");
    }

    #[tokio::test]
    async fn test_update_requires_owner() {
        let (service, _) = setup();
        let owner = ObjectId::new().to_hex();
        let product = service
            .create_product(&owner, input("Lamp", "Desk lamp", ProductCategory::Other))
            .await
            .unwrap();
        let change = UpdateProduct {
            price: Some(12.5),
            ..Default::default()
        };

        let err = service
            .update_product(&product.id, &ObjectId::new().to_hex(), change.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, ProductError::NotOwnerUpdate));

        let updated = service
            .update_product(&product.id, &owner, change)
            .await
            .unwrap();
        assert_eq!(updated.price, 12.5);
        assert_eq!(updated.name, "Lamp");
    }

    #[tokio::test]
    async fn test_update_rejects_invalid_merge() {
        let (service, _) = setup();
        let owner = ObjectId::new().to_hex();
        let product = service
            .create_product(&owner, input("Lamp", "Desk lamp", ProductCategory::Other))
            .await
            .unwrap();

        let err = service
            .update_product(
                &product.id,
                &owner,
                UpdateProduct {
                    stock: Some(-1),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ProductError::Service(ServiceError::Repository(_))));
    }

    #[tokio::test]
    async fn test_delete_requires_owner() {
        let (service, repo) = setup();
        let owner = ObjectId::new().to_hex();
        let product = service
            .create_product(&owner, input("Lamp", "Desk lamp", ProductCategory::Other))
            .await
            .unwrap();

        let err = service
            .delete_product(&product.id, &ObjectId::new().to_hex())
            .await
            .unwrap_err();
        assert!(matches!(err, ProductError::NotOwnerDelete));

        service.delete_product(&product.id, &owner).await.unwrap();
        assert!(repo.find_by_id(&product.id).await.unwrap().is_none());

        let err = service.delete_product(&product.id, &owner).await.unwrap_err();
        assert!(matches!(err, ProductError::Service(ServiceError::NotFound(ref m)) if m == PRODUCT_NOT_FOUND));
    }
}
