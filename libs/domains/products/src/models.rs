use chrono::{DateTime, Utc};
use database::Record;
use database::bson::{self, Document, oid::ObjectId};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Product category
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProductCategory {
    Electronics,
    Clothing,
    Food,
    Books,
    #[default]
    Other,
}

/// Product document stored in the `products` collection
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
    pub category: ProductCategory,
    #[validate(range(min = 0))]
    pub stock: i32,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default = "active")]
    pub is_active: bool,
    /// Owning user; only the owner may update or delete
    pub created_by: ObjectId,
    pub created_at: bson::DateTime,
    pub updated_at: bson::DateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<bson::DateTime>,
    #[serde(default)]
    pub is_deleted: bool,
}

fn active() -> bool {
    true
}

impl Record for Product {
    const COLLECTION: &'static str = "products";
    const SOFT_DELETE: bool = true;
    const TEXT_FIELDS: &'static [&'static str] = &["name", "description"];
    const REFERENCES: &'static [(&'static str, &'static str)] = &[("createdBy", "users")];

    fn id(&self) -> ObjectId {
        self.id
    }
}

impl Product {
    /// New active product owned by `owner`
    pub fn new(owner: ObjectId, input: CreateProduct) -> Self {
        let now = bson::DateTime::now();
        Self {
            id: ObjectId::new(),
            name: input.name.trim().to_string(),
            description: input.description.trim().to_string(),
            price: input.price,
            category: input.category,
            stock: input.stock,
            images: input.images,
            is_active: true,
            created_by: owner,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            is_deleted: false,
        }
    }

    pub fn is_owned_by(&self, user: &ObjectId) -> bool {
        self.created_by == *user
    }
}

/// DTO for creating a new product
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    #[schema(example = "Mechanical keyboard")]
    pub name: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(range(min = 0.0, message = "Price must be a positive number"))]
    #[schema(example = 89.9)]
    pub price: f64,
    #[serde(default)]
    pub category: ProductCategory,
    #[validate(range(min = 0, message = "Stock must be a non-negative integer"))]
    pub stock: i32,
    #[serde(default)]
    pub images: Vec<String>,
}

/// DTO for a partial product update
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProduct {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ProductCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0))]
    pub stock: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl UpdateProduct {
    /// Fields to `$set`, keyed by their stored names
    pub fn into_changes(self) -> Document {
        let mut changes = Document::new();
        if let Some(name) = self.name {
            changes.insert("name", name.trim());
        }
        if let Some(description) = self.description {
            changes.insert("description", description.trim());
        }
        if let Some(price) = self.price {
            changes.insert("price", price);
        }
        if let Some(category) = self.category {
            changes.insert("category", category.to_string());
        }
        if let Some(stock) = self.stock {
            changes.insert("stock", stock);
        }
        if let Some(images) = self.images {
            changes.insert("images", images);
        }
        if let Some(is_active) = self.is_active {
            changes.insert("isActive", is_active);
        }
        changes
    }
}

/// Query parameters for full-text search
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Words matched against name and description
    #[serde(default)]
    pub q: String,
}

/// Product response DTO
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    #[schema(example = "665f1c2e8b3e4a0012345678")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: ProductCategory,
    pub stock: i32,
    pub images: Vec<String>,
    pub is_active: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.to_hex(),
            name: product.name,
            description: product.description,
            price: product.price,
            category: product.category,
            stock: product.stock,
            images: product.images,
            is_active: product.is_active,
            created_by: product.created_by.to_hex(),
            created_at: product.created_at.to_chrono(),
            updated_at: product.updated_at.to_chrono(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn create_input() -> CreateProduct {
        CreateProduct {
            name: "  Lamp ".into(),
            description: "Desk lamp".into(),
            price: 19.5,
            category: ProductCategory::Electronics,
            stock: 3,
            images: vec![],
        }
    }

    #[test]
    fn test_category_wire_format() {
        assert_eq!(ProductCategory::Books.to_string(), "books");
        assert_eq!(
            ProductCategory::from_str("clothing").unwrap(),
            ProductCategory::Clothing
        );
        assert!(ProductCategory::from_str("toys").is_err());
        assert_eq!(
            serde_json::to_value(ProductCategory::Food).unwrap(),
            serde_json::json!("food")
        );
    }

    #[test]
    fn test_create_validation() {
        assert!(create_input().validate().is_ok());

        let mut input = create_input();
        input.price = -1.0;
        input.stock = -2;
        input.name = String::new();
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("price"));
        assert!(fields.contains_key("stock"));
        assert!(fields.contains_key("name"));
    }

    #[test]
    fn test_new_product_is_active_and_owned() {
        let owner = ObjectId::new();
        let product = Product::new(owner, create_input());

        assert_eq!(product.name, "Lamp");
        assert!(product.is_active);
        assert!(!product.is_deleted);
        assert!(product.is_owned_by(&owner));
        assert!(!product.is_owned_by(&ObjectId::new()));
    }

    #[test]
    fn test_update_changes_only_present_fields() {
        let update = UpdateProduct {
            price: Some(5.0),
            category: Some(ProductCategory::Books),
            is_active: Some(false),
            ..Default::default()
        };

        let changes = update.into_changes();
        assert_eq!(
            changes,
            bson::doc! { "price": 5.0, "category": "books", "isActive": false }
        );
    }

    #[test]
    fn test_response_hides_soft_delete_markers() {
        let product = Product::new(ObjectId::new(), create_input());
        let json = serde_json::to_value(ProductResponse::from(product.clone())).unwrap();

        assert_eq!(json["id"], product.id.to_hex());
        assert_eq!(json["createdBy"], product.created_by.to_hex());
        assert_eq!(json["category"], "electronics");
        assert!(json.get("isDeleted").is_none());
    }
}
