//! Product catalog store.

use std::{collections::HashMap, str::FromStr};

use anyhow::Context;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::{ProductId, ProductImageId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub description: String,
    pub category: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductImage {
    pub image_id: ProductImageId,
    pub product_id: ProductId,
    pub image: String,
}

/// Catalog query string. All fields are optional; blank values are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub max_price: Option<String>,
}

impl ProductFilter {
    pub fn search_pattern(&self) -> Option<String> {
        contains_pattern(self.search.as_deref())
    }

    pub fn category_pattern(&self) -> Option<String> {
        contains_pattern(self.category.as_deref())
    }

    /// Unparsable prices are treated as "no limit".
    pub fn max_price(&self) -> Option<Decimal> {
        self.max_price
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .and_then(|raw| Decimal::from_str(raw).ok())
    }
}

fn contains_pattern(raw: Option<&str>) -> Option<String> {
    let term = raw.map(str::trim).filter(|term| !term.is_empty())?;
    Some(format!("%{}%", escape_like(term)))
}

/// Escapes LIKE wildcards so user input only ever matches literally.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

//--------------------------- SQL -------------------------------

const PRODUCT_COLUMNS: &str = "product_id, name, price, description, category, image";

pub async fn filter_products(
    pool: &PgPool,
    filter: &ProductFilter,
) -> Result<Vec<Product>, anyhow::Error> {
    sqlx::query_as::<_, Product>(&format!(
        r#"SELECT {PRODUCT_COLUMNS}
           FROM products
           WHERE ($1::text IS NULL OR name ILIKE $1 ESCAPE '\')
             AND ($2::text IS NULL OR category ILIKE $2 ESCAPE '\')
             AND ($3::numeric IS NULL OR price <= $3)
           ORDER BY name, product_id"#
    ))
    .bind(filter.search_pattern())
    .bind(filter.category_pattern())
    .bind(filter.max_price())
    .fetch_all(pool)
    .await
    .with_context(|| format!("Problem in filter_products({filter:?})."))
}

pub async fn list_products(pool: &PgPool) -> Result<Vec<Product>, anyhow::Error> {
    filter_products(pool, &ProductFilter::default()).await
}

pub async fn find_product(
    pool: &PgPool,
    product_id: &ProductId,
) -> Result<Option<Product>, anyhow::Error> {
    sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE product_id = $1"
    ))
    .bind(product_id)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("Problem in find_product({product_id})."))
}

/// Loads the given products in the order of `ids`. Ids of deleted products are skipped.
pub async fn find_products_by_ids(
    pool: &PgPool,
    ids: &[ProductId],
) -> Result<Vec<Product>, anyhow::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let uuids: Vec<Uuid> = ids.iter().copied().map(Uuid::from).collect();

    let mut found: HashMap<ProductId, Product> = sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE product_id = ANY($1)"
    ))
    .bind(&uuids)
    .fetch_all(pool)
    .await
    .context("Problem in find_products_by_ids.")?
    .into_iter()
    .map(|product| (product.product_id, product))
    .collect();

    Ok(ids.iter().filter_map(|id| found.remove(id)).collect())
}

pub async fn count_products(pool: &PgPool) -> Result<i64, anyhow::Error> {
    sqlx::query_scalar::<_, i64>("SELECT count(*) FROM products")
        .fetch_one(pool)
        .await
        .context("Problem in count_products.")
}

pub async fn product_gallery(
    pool: &PgPool,
    product_id: &ProductId,
) -> Result<Vec<ProductImage>, anyhow::Error> {
    sqlx::query_as::<_, ProductImage>(
        r#"SELECT image_id, product_id, image
           FROM product_images
           WHERE product_id = $1
           ORDER BY image_id"#,
    )
    .bind(product_id)
    .fetch_all(pool)
    .await
    .with_context(|| format!("Problem in product_gallery({product_id})."))
}

pub async fn insert_product(
    tx: &mut Transaction<'_, Postgres>,
    product: &Product,
) -> Result<(), anyhow::Error> {
    sqlx::query(
        r#"INSERT INTO products (product_id, name, price, description, category, image)
           VALUES ($1, $2, $3, $4, $5, $6)"#,
    )
    .bind(product.product_id)
    .bind(&product.name)
    .bind(product.price)
    .bind(&product.description)
    .bind(&product.category)
    .bind(&product.image)
    .execute(&mut **tx)
    .await
    .with_context(|| format!("Problem in insert_product({}).", product.product_id))?;
    Ok(())
}

/// Returns `false` when the product no longer exists.
pub async fn update_product(
    tx: &mut Transaction<'_, Postgres>,
    product: &Product,
) -> Result<bool, anyhow::Error> {
    let result = sqlx::query(
        r#"UPDATE products
           SET name = $2, price = $3, description = $4, category = $5, image = $6
           WHERE product_id = $1"#,
    )
    .bind(product.product_id)
    .bind(&product.name)
    .bind(product.price)
    .bind(&product.description)
    .bind(&product.category)
    .bind(&product.image)
    .execute(&mut **tx)
    .await
    .with_context(|| format!("Problem in update_product({}).", product.product_id))?;
    Ok(result.rows_affected() == 1)
}

pub async fn insert_gallery_image(
    tx: &mut Transaction<'_, Postgres>,
    image: &ProductImage,
) -> Result<(), anyhow::Error> {
    sqlx::query("INSERT INTO product_images (image_id, product_id, image) VALUES ($1, $2, $3)")
        .bind(image.image_id)
        .bind(image.product_id)
        .bind(&image.image)
        .execute(&mut **tx)
        .await
        .with_context(|| format!("Problem in insert_gallery_image({}).", image.product_id))?;
    Ok(())
}

/// Deletes the product and, through the foreign keys, its gallery, cart lines and order
/// items. Returns the image paths that were attached to it, or `None` if it did not exist.
pub async fn delete_product(
    pool: &PgPool,
    product_id: &ProductId,
) -> Result<Option<Vec<String>>, anyhow::Error> {
    let mut tx = pool.begin().await?;

    let gallery: Vec<String> =
        sqlx::query_scalar::<_, String>("SELECT image FROM product_images WHERE product_id = $1")
            .bind(product_id)
            .fetch_all(&mut *tx)
            .await
            .with_context(|| format!("Problem loading gallery of {product_id}."))?;

    let primary = sqlx::query_scalar::<_, Option<String>>(
        "DELETE FROM products WHERE product_id = $1 RETURNING image",
    )
    .bind(product_id)
    .fetch_optional(&mut *tx)
    .await
    .with_context(|| format!("Problem in delete_product({product_id})."))?;

    let Some(primary) = primary else {
        return Ok(None);
    };
    tx.commit().await?;

    Ok(Some(primary.into_iter().chain(gallery).collect()))
}

//-------------------------- Tests -------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use fake::{Fake, Faker};

    use super::*;
    use crate::domain::fake::Price;

    pub(crate) async fn create_product(pool: &PgPool, name: &str, price: Decimal) -> Product {
        let product = Product {
            product_id: ProductId::new(),
            name: name.to_owned(),
            price,
            description: Faker.fake(),
            category: "General".to_owned(),
            image: None,
        };
        let mut tx = pool.begin().await.expect("Transaction should start.");
        insert_product(&mut tx, &product)
            .await
            .expect("Insert should succeed.");
        tx.commit().await.expect("Commit should succeed.");
        product
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }

    #[test]
    fn blank_and_unparsable_filters_are_ignored() {
        let filter = ProductFilter {
            search: Some("  ".to_owned()),
            category: None,
            max_price: Some("cheap".to_owned()),
        };

        assert_eq!(filter.search_pattern(), None);
        assert_eq!(filter.max_price(), None);
    }

    #[test]
    fn max_price_accepts_decimals() {
        let filter = ProductFilter {
            max_price: Some(" 12.50 ".to_owned()),
            ..Default::default()
        };

        assert_eq!(filter.max_price(), Some(Decimal::new(1250, 2)));
    }

    #[sqlx::test]
    async fn filters_combine(pool: PgPool) {
        create_product(&pool, "Blue Mug", Decimal::new(800, 2)).await;
        create_product(&pool, "Blue Poster", Decimal::new(2500, 2)).await;
        create_product(&pool, "Red Mug", Decimal::new(700, 2)).await;

        let filter = ProductFilter {
            search: Some("mug".to_owned()),
            max_price: Some("7.50".to_owned()),
            ..Default::default()
        };
        let names: Vec<String> = filter_products(&pool, &filter)
            .await
            .unwrap()
            .into_iter()
            .map(|product| product.name)
            .collect();

        assert_eq!(names, vec!["Red Mug".to_owned()]);
    }

    #[sqlx::test]
    async fn search_treats_percent_literally(pool: PgPool) {
        create_product(&pool, "100% Cotton Tee", Price.fake()).await;
        create_product(&pool, "Linen Shirt", Price.fake()).await;

        let filter = ProductFilter {
            search: Some("%".to_owned()),
            ..Default::default()
        };
        let found = filter_products(&pool, &filter).await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "100% Cotton Tee");
    }

    #[sqlx::test]
    async fn products_by_ids_keep_the_requested_order(pool: PgPool) {
        let first = create_product(&pool, "A", Price.fake()).await;
        let second = create_product(&pool, "B", Price.fake()).await;

        let found = find_products_by_ids(
            &pool,
            &[second.product_id, ProductId::new(), first.product_id],
        )
        .await
        .unwrap();

        assert_eq!(found, vec![second, first]);
    }

    #[sqlx::test]
    async fn deleting_an_unknown_product_reports_none(pool: PgPool) {
        assert_eq!(
            delete_product(&pool, &ProductId::new()).await.unwrap(),
            None
        );
    }
}
