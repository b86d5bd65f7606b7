use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Product record in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub stock: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Validated fields for a new product.
#[derive(Debug)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub stock: i32,
}

/// Partial update; only supplied fields change.
#[derive(Debug, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub stock: Option<i32>,
}

impl Product {
    pub async fn list(db: &PgPool, limit: i64, offset: i64) -> sqlx::Result<Vec<Product>> {
        sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price, category, stock, created_at, updated_at
            FROM products
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
    }

    pub async fn count(db: &PgPool) -> sqlx::Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products")
            .fetch_one(db)
            .await
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<Product>> {
        sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price, category, stock, created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn create(db: &PgPool, new: &NewProduct) -> sqlx::Result<Product> {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, description, price, category, stock)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, description, price, category, stock, created_at, updated_at
            "#,
        )
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.price)
        .bind(&new.category)
        .bind(new.stock)
        .fetch_one(db)
        .await
    }

    /// Applies only the supplied fields; always bumps updated_at.
    pub async fn update(
        db: &PgPool,
        id: Uuid,
        patch: &ProductPatch,
    ) -> sqlx::Result<Option<Product>> {
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name        = COALESCE($2, name),
                description = COALESCE($3, description),
                price       = COALESCE($4, price),
                category    = COALESCE($5, category),
                stock       = COALESCE($6, stock),
                updated_at  = now()
            WHERE id = $1
            RETURNING id, name, description, price, category, stock, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&patch.name)
        .bind(&patch.description)
        .bind(patch.price)
        .bind(&patch.category)
        .bind(patch.stock)
        .fetch_optional(db)
        .await
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<Option<Product>> {
        sqlx::query_as::<_, Product>(
            r#"
            DELETE FROM products
            WHERE id = $1
            RETURNING id, name, description, price, category, stock, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> NewProduct {
        NewProduct {
            name: "Widget".into(),
            description: "A standard widget".into(),
            price: 9.99,
            category: "tools".into(),
            stock: 5,
        }
    }

    #[sqlx::test]
    async fn create_then_find_returns_submitted_fields(pool: PgPool) {
        let created = Product::create(&pool, &widget()).await.unwrap();
        let found = Product::find_by_id(&pool, created.id)
            .await
            .unwrap()
            .expect("created product should be found");
        assert_eq!(found.name, "Widget");
        assert_eq!(found.description, "A standard widget");
        assert_eq!(found.price, 9.99);
        assert_eq!(found.category, "tools");
        assert_eq!(found.stock, 5);
    }

    #[sqlx::test]
    async fn delete_then_find_returns_none(pool: PgPool) {
        let created = Product::create(&pool, &widget()).await.unwrap();
        let deleted = Product::delete(&pool, created.id)
            .await
            .unwrap()
            .expect("delete should return the final record");
        assert_eq!(deleted.id, created.id);
        assert_eq!(deleted.name, created.name);

        assert!(Product::find_by_id(&pool, created.id)
            .await
            .unwrap()
            .is_none());
        assert!(Product::delete(&pool, created.id).await.unwrap().is_none());
    }

    #[sqlx::test]
    async fn empty_patch_changes_only_updated_at(pool: PgPool) {
        let created = Product::create(&pool, &widget()).await.unwrap();
        let updated = Product::update(&pool, created.id, &ProductPatch::default())
            .await
            .unwrap()
            .expect("product should still exist");
        assert_eq!(updated.name, created.name);
        assert_eq!(updated.description, created.description);
        assert_eq!(updated.price, created.price);
        assert_eq!(updated.category, created.category);
        assert_eq!(updated.stock, created.stock);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[sqlx::test]
    async fn patch_applies_only_supplied_fields(pool: PgPool) {
        let created = Product::create(&pool, &widget()).await.unwrap();
        let patch = ProductPatch {
            price: Some(19.99),
            stock: Some(0),
            ..ProductPatch::default()
        };
        let updated = Product::update(&pool, created.id, &patch)
            .await
            .unwrap()
            .expect("product should still exist");
        assert_eq!(updated.price, 19.99);
        assert_eq!(updated.stock, 0);
        assert_eq!(updated.name, created.name);
        assert_eq!(updated.description, created.description);
        assert_eq!(updated.category, created.category);
    }

    #[sqlx::test]
    async fn update_on_missing_product_returns_none(pool: PgPool) {
        let patch = ProductPatch {
            price: Some(1.0),
            ..ProductPatch::default()
        };
        assert!(Product::update(&pool, Uuid::new_v4(), &patch)
            .await
            .unwrap()
            .is_none());
    }

    #[sqlx::test]
    async fn list_pages_most_recent_first(pool: PgPool) {
        for i in 0..25 {
            let mut new = widget();
            new.name = format!("Widget {i}");
            Product::create(&pool, &new).await.unwrap();
        }

        assert_eq!(Product::count(&pool).await.unwrap(), 25);

        let third_page = Product::list(&pool, 10, 20).await.unwrap();
        assert_eq!(third_page.len(), 5);

        let first_page = Product::list(&pool, 10, 0).await.unwrap();
        assert_eq!(first_page.len(), 10);
        for pair in first_page.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
    }
}
