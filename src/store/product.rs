use serde::{Deserialize, Serialize};

use super::Store;
use crate::error::AppError;
use crate::filter::{build_safe_filter_expression, parse_filter_expression, LISTING_SEARCH_FIELDS};
use crate::listing::{Listing, ListingCriteria, ListingPage, PriceRange};

/// Moderation state of a vendor submission. Only approved products are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Pending,
    Approved,
    Rejected,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Pending => "pending",
            ProductStatus::Approved => "approved",
            ProductStatus::Rejected => "rejected",
        }
    }

    fn parse(s: &str) -> Result<Self, AppError> {
        match s {
            "pending" => Ok(ProductStatus::Pending),
            "approved" => Ok(ProductStatus::Approved),
            "rejected" => Ok(ProductStatus::Rejected),
            other => Err(AppError::Other(format!("unknown product status '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRow {
    pub id: String,
    pub vendor_id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub location: String,
    pub price: Option<PriceRange>,
    pub status: ProductStatus,
    pub created_at: i64,
}

const PRODUCT_COLUMNS: &str = "id, vendor_id, name, description, category, location,
    price_from, price_to, price_unit, status, created_at";

impl Store {
    /// Also writes the lowercased `*_folded` copies that text search runs on,
    /// since SQLite's LIKE only folds ASCII.
    pub fn insert_product(&self, product: &ProductRow) -> Result<(), sqlite::Error> {
        let mut stmt = self.conn.prepare(
            "INSERT INTO products (id, vendor_id, name, description, category, location,
                                   price_from, price_to, price_unit, status, created_at,
                                   name_folded, description_folded, category_folded,
                                   location_folded)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )?;
        stmt.bind((1, product.id.as_str()))?;
        stmt.bind((2, product.vendor_id.as_str()))?;
        stmt.bind((3, product.name.as_str()))?;
        stmt.bind((4, text_or_null(product.description.as_deref())))?;
        stmt.bind((5, product.category.as_str()))?;
        stmt.bind((6, product.location.as_str()))?;
        let price = product.price.as_ref();
        stmt.bind((7, int_or_null(price.and_then(|p| p.from))))?;
        stmt.bind((8, int_or_null(price.and_then(|p| p.to))))?;
        stmt.bind((9, text_or_null(price.and_then(|p| p.unit.as_deref()))))?;
        stmt.bind((10, product.status.as_str()))?;
        stmt.bind((11, product.created_at))?;
        stmt.bind((12, product.name.to_lowercase().as_str()))?;
        let description = product.description.as_deref().map(str::to_lowercase);
        stmt.bind((13, text_or_null(description.as_deref())))?;
        stmt.bind((14, product.category.to_lowercase().as_str()))?;
        stmt.bind((15, product.location.to_lowercase().as_str()))?;
        stmt.next()?;
        Ok(())
    }

    pub fn get_product(&self, id: &str) -> Result<Option<ProductRow>, AppError> {
        let sql = format!("SELECT {} FROM products WHERE id = ?", PRODUCT_COLUMNS);
        let mut stmt = self.conn.prepare(sql)?;
        stmt.bind((1, id))?;
        match stmt.next()? {
            sqlite::State::Row => Ok(Some(read_product_row(&stmt)?)),
            sqlite::State::Done => Ok(None),
        }
    }

    /// Moderation decision. Returns false when no product has this id.
    pub fn set_product_status(
        &self,
        id: &str,
        status: ProductStatus,
    ) -> Result<bool, sqlite::Error> {
        let mut stmt = self
            .conn
            .prepare("UPDATE products SET status = ? WHERE id = ?")?;
        stmt.bind((1, status.as_str()))?;
        stmt.bind((2, id))?;
        stmt.next()?;
        let changed = self.conn.change_count() > 0;
        if changed {
            log::info!("product {} marked {}", id, status.as_str());
        }
        Ok(changed)
    }

    /// Admin moderation queue, oldest submission first.
    pub fn pending_products(&self) -> Result<Vec<ProductRow>, AppError> {
        let sql = format!(
            "SELECT {} FROM products WHERE status = 'pending' ORDER BY created_at ASC, id ASC",
            PRODUCT_COLUMNS
        );
        let mut stmt = self.conn.prepare(sql)?;
        let mut results = Vec::new();
        while let sqlite::State::Row = stmt.next()? {
            results.push(read_product_row(&stmt)?);
        }
        Ok(results)
    }

    /// Everything a vendor has submitted, whatever its status, newest first.
    pub fn vendor_products(&self, vendor_id: &str) -> Result<Vec<ProductRow>, AppError> {
        let sql = format!(
            "SELECT {} FROM products WHERE vendor_id = ? ORDER BY created_at DESC, id ASC",
            PRODUCT_COLUMNS
        );
        let mut stmt = self.conn.prepare(sql)?;
        stmt.bind((1, vendor_id))?;
        let mut results = Vec::new();
        while let sqlite::State::Row = stmt.next()? {
            results.push(read_product_row(&stmt)?);
        }
        Ok(results)
    }

    pub fn add_product_image(
        &self,
        product_id: &str,
        url: &str,
        position: i64,
    ) -> Result<(), sqlite::Error> {
        let mut stmt = self.conn.prepare(
            "INSERT INTO product_images (product_id, url, position) VALUES (?, ?, ?)",
        )?;
        stmt.bind((1, product_id))?;
        stmt.bind((2, url))?;
        stmt.bind((3, position))?;
        stmt.next()?;
        Ok(())
    }

    /// Page `page` (1-indexed) of approved listings matching `criteria`,
    /// newest first. Page N covers rows `[(N-1)*page_size, N*page_size)`.
    pub fn list_listings(
        &self,
        criteria: &ListingCriteria,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<Listing>, AppError> {
        let offset = page.saturating_sub(1) * page_size;
        self.list_listings_range(criteria, offset, page_size)
    }

    /// Server-side first load: a page plus whether anything follows it.
    pub fn listing_page(
        &self,
        criteria: &ListingCriteria,
        page: usize,
        page_size: usize,
    ) -> Result<ListingPage, AppError> {
        let offset = page.saturating_sub(1) * page_size;
        // Fetch one extra row to detect whether there's a next page
        let mut items = self.list_listings_range(criteria, offset, page_size + 1)?;
        let is_last_page = items.len() <= page_size;
        items.truncate(page_size);
        Ok(ListingPage {
            items,
            page: page.max(1),
            is_last_page,
        })
    }

    pub fn list_listings_range(
        &self,
        criteria: &ListingCriteria,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Listing>, AppError> {
        let (where_clause, params) = listing_filter(criteria)?;
        let sql = format!(
            "SELECT p.id, p.vendor_id, p.name, p.description, p.category, p.location,
                    p.price_from, p.price_to, p.price_unit, p.created_at,
                    (SELECT i.url FROM product_images i
                     WHERE i.product_id = p.id
                     ORDER BY i.position ASC, i.image_id ASC
                     LIMIT 1) AS thumbnail
             FROM products p
             WHERE {}
             ORDER BY p.created_at DESC, p.id ASC
             LIMIT ? OFFSET ?",
            where_clause
        );

        let mut stmt = self.conn.prepare(sql)?;
        let mut bind_idx: usize = 1;
        for value in params {
            stmt.bind((bind_idx, value))?;
            bind_idx += 1;
        }
        stmt.bind((bind_idx, limit as i64))?;
        stmt.bind((bind_idx + 1, offset as i64))?;

        let mut results = Vec::new();
        while let sqlite::State::Row = stmt.next()? {
            results.push(Listing {
                id: stmt.read::<String, _>(0)?,
                vendor_id: stmt.read::<String, _>(1)?,
                name: stmt.read::<String, _>(2)?,
                description: stmt.read::<Option<String>, _>(3)?,
                category: stmt.read::<String, _>(4)?,
                location: stmt.read::<String, _>(5)?,
                price: price_range(
                    stmt.read::<Option<i64>, _>(6)?,
                    stmt.read::<Option<i64>, _>(7)?,
                    stmt.read::<Option<String>, _>(8)?,
                ),
                created_at: stmt.read::<i64, _>(9)?,
                thumbnail: stmt.read::<Option<String>, _>(10)?,
            });
        }

        Ok(results)
    }

    pub fn count_listings(&self, criteria: &ListingCriteria) -> Result<i64, AppError> {
        let (where_clause, params) = listing_filter(criteria)?;
        let sql = format!("SELECT COUNT(*) FROM products p WHERE {}", where_clause);
        let mut stmt = self.conn.prepare(sql)?;
        for (i, value) in params.into_iter().enumerate() {
            stmt.bind((i + 1, value))?;
        }
        stmt.next()?;
        Ok(stmt.read::<i64, _>(0)?)
    }
}

// WHERE clause and its bound parameters. The search term only ever reaches SQL
// as a LIKE operand: it is lowercased, turned into a filter expression, parsed
// back into terms, and each term becomes a `? ESCAPE '\'` parameter matched
// against the field's folded column.
fn listing_filter(criteria: &ListingCriteria) -> Result<(String, Vec<sqlite::Value>), AppError> {
    let mut clauses = vec!["p.status = 'approved'".to_string()];
    let mut params = Vec::new();

    if let Some(category) = criteria.normalized_category() {
        clauses.push("p.category = ?".to_string());
        params.push(sqlite::Value::String(category.to_string()));
    }

    if let Some(term) = criteria.normalized_search_term() {
        let expr = build_safe_filter_expression(&term.to_lowercase(), &LISTING_SEARCH_FIELDS);
        let terms = parse_filter_expression(&expr)?;
        if !terms.is_empty() {
            let ors: Vec<String> = terms
                .iter()
                .map(|t| format!("p.{}_folded LIKE ? ESCAPE '\\'", t.field.as_str()))
                .collect();
            clauses.push(format!("({})", ors.join(" OR ")));
            params.extend(terms.iter().map(|t| sqlite::Value::String(t.like_pattern())));
        }
    }

    Ok((clauses.join(" AND "), params))
}

fn read_product_row(stmt: &sqlite::Statement) -> Result<ProductRow, AppError> {
    let status = stmt.read::<String, _>("status")?;
    Ok(ProductRow {
        id: stmt.read::<String, _>("id")?,
        vendor_id: stmt.read::<String, _>("vendor_id")?,
        name: stmt.read::<String, _>("name")?,
        description: stmt.read::<Option<String>, _>("description")?,
        category: stmt.read::<String, _>("category")?,
        location: stmt.read::<String, _>("location")?,
        price: price_range(
            stmt.read::<Option<i64>, _>("price_from")?,
            stmt.read::<Option<i64>, _>("price_to")?,
            stmt.read::<Option<String>, _>("price_unit")?,
        ),
        status: ProductStatus::parse(&status)?,
        created_at: stmt.read::<i64, _>("created_at")?,
    })
}

fn price_range(from: Option<i64>, to: Option<i64>, unit: Option<String>) -> Option<PriceRange> {
    if from.is_none() && to.is_none() && unit.is_none() {
        None
    } else {
        Some(PriceRange { from, to, unit })
    }
}

fn text_or_null(value: Option<&str>) -> sqlite::Value {
    match value {
        Some(s) => sqlite::Value::String(s.to_string()),
        None => sqlite::Value::Null,
    }
}

fn int_or_null(value: Option<i64>) -> sqlite::Value {
    match value {
        Some(n) => sqlite::Value::Integer(n),
        None => sqlite::Value::Null,
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::store::profile::{ProfileRow, Role};

    pub fn vendor(store: &Store, id: &str) {
        store
            .upsert_profile(&ProfileRow {
                id: id.to_string(),
                display_name: format!("Vendor {}", id),
                role: Role::Vendor,
                whatsapp: Some("6281200000000".to_string()),
                created_at: 1_600_000_000,
            })
            .unwrap();
    }

    pub fn product(id: &str, vendor_id: &str, name: &str, category: &str, ts: i64) -> ProductRow {
        ProductRow {
            id: id.to_string(),
            vendor_id: vendor_id.to_string(),
            name: name.to_string(),
            description: None,
            category: category.to_string(),
            location: "Jakarta".to_string(),
            price: None,
            status: ProductStatus::Approved,
            created_at: ts,
        }
    }

    /// Vendor `v-1` with `count` approved products `p-000`.. in `category`,
    /// created one second apart.
    pub fn seed_approved(store: &Store, category: &str, count: usize) {
        vendor(store, "v-1");
        for i in 0..count {
            let row = product(
                &format!("p-{:03}", i),
                "v-1",
                &format!("Paket {} {}", category, i),
                category,
                1_700_000_000 + i as i64,
            );
            store.insert_product(&row).unwrap();
        }
    }
}
