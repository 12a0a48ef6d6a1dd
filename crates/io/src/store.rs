// Product catalog persisted in SQLite

use std::path::Path;

use rusqlite::types::{Value, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use profitgrid_recon::{CellValue, Product};

use crate::error::IoError;

/// Bump when the schema changes in a way older builds can't read.
pub const SCHEMA_VERSION: u32 = 1;

// Price columns carry no type affinity so text stays text and numbers stay
// numbers, exactly as entered.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    sku TEXT,
    skc TEXT,
    spu TEXT,
    name TEXT,
    category TEXT,
    image TEXT,
    purchase_link TEXT,
    cost_price,
    declare_price,
    ad_bid_ratio,
    update_time TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_products_sku ON products (sku);
CREATE INDEX IF NOT EXISTS idx_products_skc ON products (skc);
CREATE INDEX IF NOT EXISTS idx_products_spu ON products (spu);
CREATE INDEX IF NOT EXISTS idx_products_name ON products (name);
CREATE INDEX IF NOT EXISTS idx_products_category ON products (category);
CREATE INDEX IF NOT EXISTS idx_products_update_time ON products (update_time);

CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    create_time TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

const PRODUCT_COLUMNS: &str = "id, sku, skc, spu, name, category, image, purchase_link, \
                               cost_price, declare_price, ad_bid_ratio, update_time";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub create_time: Option<String>,
}

/// Full catalog snapshot used for JSON backup/restore.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Backup {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

pub struct ProductStore {
    conn: Connection,
}

impl ProductStore {
    pub fn open(path: &Path) -> Result<Self, IoError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| IoError::Open {
                    path: parent.display().to_string(),
                    message: e.to_string(),
                })?;
            }
        }
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, IoError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, IoError> {
        conn.execute_batch(SCHEMA)?;

        let stored: Option<String> = conn
            .query_row("SELECT value FROM meta WHERE key = 'schema_version'", [], |row| row.get(0))
            .optional()?;
        match stored.and_then(|v| v.parse::<u32>().ok()) {
            Some(v) if v > SCHEMA_VERSION => {
                return Err(IoError::Store(format!(
                    "store schema version {v} is newer than supported ({SCHEMA_VERSION})"
                )));
            }
            Some(v) if v == SCHEMA_VERSION => {}
            previous => {
                log::info!("initialising product store schema v{SCHEMA_VERSION} (was {previous:?})");
                conn.execute(
                    "INSERT OR REPLACE INTO meta (key, value) VALUES ('schema_version', ?1)",
                    params![SCHEMA_VERSION.to_string()],
                )?;
            }
        }

        Ok(Self { conn })
    }

    // -----------------------------------------------------------------------
    // Products
    // -----------------------------------------------------------------------

    /// Insert or replace a product, stamping `update_time`. Returns its id and
    /// writes a freshly assigned id back into `product`.
    pub fn save(&self, product: &mut Product) -> Result<i64, IoError> {
        product.update_time = Some(now());
        let id = save_with(&self.conn, product)?;
        product.id = Some(id);
        Ok(id)
    }

    /// All products in creation order.
    pub fn get_all(&self) -> Result<Vec<Product>, IoError> {
        self.query(&format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id"), [])
    }

    pub fn get(&self, id: i64) -> Result<Option<Product>, IoError> {
        let product = self
            .conn
            .query_row(
                &format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"),
                params![id],
                product_from_row,
            )
            .optional()?;
        Ok(product)
    }

    /// Like [`get`](Self::get) but a missing id is an error.
    pub fn require(&self, id: i64) -> Result<Product, IoError> {
        self.get(id)?.ok_or(IoError::NotFound { id })
    }

    /// Returns whether a row was removed.
    pub fn delete(&self, id: i64) -> Result<bool, IoError> {
        let n = self.conn.execute("DELETE FROM products WHERE id = ?1", params![id])?;
        Ok(n > 0)
    }

    /// Delete several products in one transaction. Returns the number removed.
    pub fn delete_many(&mut self, ids: &[i64]) -> Result<usize, IoError> {
        let tx = self.conn.transaction()?;
        let mut removed = 0;
        {
            let mut stmt = tx.prepare("DELETE FROM products WHERE id = ?1")?;
            for id in ids {
                removed += stmt.execute(params![id])?;
            }
        }
        tx.commit()?;
        Ok(removed)
    }

    /// Exact SKU match.
    pub fn find_by_sku(&self, sku: &str) -> Result<Vec<Product>, IoError> {
        self.query(
            &format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE sku = ?1 ORDER BY id"),
            params![sku],
        )
    }

    /// Case-sensitive substring match over name, SKU, SKC and SPU.
    pub fn search(&self, keyword: &str) -> Result<Vec<Product>, IoError> {
        self.query(
            &format!(
                "SELECT {PRODUCT_COLUMNS} FROM products \
                 WHERE instr(name, ?1) > 0 OR instr(sku, ?1) > 0 \
                    OR instr(skc, ?1) > 0 OR instr(spu, ?1) > 0 \
                 ORDER BY id"
            ),
            params![keyword],
        )
    }

    pub fn sorted_by_update_time(&self, ascending: bool) -> Result<Vec<Product>, IoError> {
        let order = if ascending { "ASC" } else { "DESC" };
        self.query(
            &format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY update_time {order}, id {order}"),
            [],
        )
    }

    pub fn by_category(&self, category: &str) -> Result<Vec<Product>, IoError> {
        self.query(
            &format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE category = ?1 ORDER BY id"),
            params![category],
        )
    }

    /// Save a copy of product `id` under `new_sku`. The SKU must be non-empty
    /// and differ from the original.
    pub fn copy_product(&self, id: i64, new_sku: &str) -> Result<Product, IoError> {
        let original = self.require(id)?;
        if new_sku.is_empty() || original.sku.as_deref() == Some(new_sku) {
            return Err(IoError::UnchangedSku(new_sku.to_string()));
        }

        let mut copy = Product {
            id: None,
            sku: Some(new_sku.to_string()),
            ..original
        };
        self.save(&mut copy)?;
        Ok(copy)
    }

    fn query<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<Product>, IoError> {
        let mut stmt = self.conn.prepare(sql)?;
        let products = stmt
            .query_map(params, product_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(products)
    }

    // -----------------------------------------------------------------------
    // Categories
    // -----------------------------------------------------------------------

    /// Add a category. Names are unique.
    pub fn add_category(&self, name: &str) -> Result<i64, IoError> {
        self.conn
            .execute(
                "INSERT INTO categories (name, create_time) VALUES (?1, ?2)",
                params![name, now()],
            )
            .map_err(|e| IoError::Store(format!("cannot add category '{name}': {e}")))?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn categories(&self) -> Result<Vec<Category>, IoError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, create_time FROM categories ORDER BY id")?;
        let categories = stmt
            .query_map([], |row| {
                Ok(Category {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    create_time: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(categories)
    }

    // -----------------------------------------------------------------------
    // Backup
    // -----------------------------------------------------------------------

    pub fn export_backup(&self) -> Result<Backup, IoError> {
        Ok(Backup {
            products: self.get_all()?,
            categories: self.categories()?,
        })
    }

    /// Upsert a backup in one transaction. Products keep their ids and
    /// timestamps; categories whose name already exists are skipped.
    pub fn import_backup(&mut self, backup: &Backup) -> Result<(), IoError> {
        let tx = self.conn.transaction()?;

        for category in &backup.categories {
            let changed = tx.execute(
                "INSERT OR IGNORE INTO categories (id, name, create_time) VALUES (?1, ?2, ?3)",
                params![
                    category.id,
                    category.name,
                    category.create_time.clone().unwrap_or_else(now)
                ],
            )?;
            if changed == 0 {
                log::warn!("backup: category '{}' already exists, skipped", category.name);
            }
        }

        for product in &backup.products {
            let mut product = product.clone();
            if product.update_time.is_none() {
                product.update_time = Some(now());
            }
            save_with(&tx, &product)?;
        }

        tx.commit()?;
        log::info!(
            "backup imported: {} product(s), {} category(ies)",
            backup.products.len(),
            backup.categories.len()
        );
        Ok(())
    }
}

fn save_with(conn: &Connection, product: &Product) -> Result<i64, IoError> {
    conn.execute(
        "INSERT OR REPLACE INTO products (id, sku, skc, spu, name, category, image, purchase_link, \
         cost_price, declare_price, ad_bid_ratio, update_time) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            product.id,
            product.sku,
            product.skc,
            product.spu,
            product.name,
            product.category,
            product.image,
            product.purchase_link,
            cell_to_sql(&product.cost_price),
            cell_to_sql(&product.declare_price),
            cell_to_sql(&product.ad_bid_ratio),
            product.update_time.clone().unwrap_or_else(now),
        ],
    )?;
    Ok(product.id.unwrap_or_else(|| conn.last_insert_rowid()))
}

fn product_from_row(row: &Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get(0)?,
        sku: row.get(1)?,
        skc: row.get(2)?,
        spu: row.get(3)?,
        name: row.get(4)?,
        category: row.get(5)?,
        image: row.get(6)?,
        purchase_link: row.get(7)?,
        cost_price: cell_from_sql(row.get_ref(8)?),
        declare_price: cell_from_sql(row.get_ref(9)?),
        ad_bid_ratio: cell_from_sql(row.get_ref(10)?),
        update_time: row.get(11)?,
    })
}

fn cell_to_sql(cell: &CellValue) -> Value {
    match cell {
        CellValue::Empty => Value::Null,
        CellValue::Number(n) => Value::Real(*n),
        CellValue::Text(s) => Value::Text(s.clone()),
    }
}

fn cell_from_sql(value: ValueRef<'_>) -> CellValue {
    match value {
        ValueRef::Null => CellValue::Empty,
        ValueRef::Integer(n) => CellValue::Number(n as f64),
        ValueRef::Real(n) => CellValue::Number(n),
        ValueRef::Text(t) | ValueRef::Blob(t) => CellValue::Text(String::from_utf8_lossy(t).into_owned()),
    }
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
