//! Catalog workbooks: one sheet per product category.
//!
//! Export writes every stored product with its computed metrics; import reads
//! the identifier, category and price columns back. Sheet names are only a
//! grouping: Excel sanitises and de-duplicates them, so the category travels
//! in its own column.

use std::collections::HashSet;
use std::path::Path;

use indexmap::IndexMap;

use profitgrid_recon::metrics::{compute_metrics, MetricsOptions};
use profitgrid_recon::{CellValue, ExternalRow, Product};

use crate::error::IoError;
use crate::sheet::{read_workbook, write_workbook, Sheet};
use crate::store::ProductStore;

/// Sheet name for products without a category.
pub const UNCATEGORIZED: &str = "未分类";

pub const COL_IMAGE: &str = "产品图片";
pub const COL_SPU: &str = "SPU";
pub const COL_SKC: &str = "SKC";
pub const COL_SKU: &str = "SKU";
pub const COL_NAME: &str = "产品名称";
pub const COL_CATEGORY: &str = "分类";
pub const COL_COST: &str = "进货价格";
pub const COL_DECLARE: &str = "申报价";
pub const COL_AD_BID_RATIO: &str = "广告出价比例";
pub const COL_SELL_PRICE: &str = "95折卖价";
pub const COL_ACTIVITY_PROFIT: &str = "95折利润";
pub const COL_PROFIT_RATE: &str = "利润率";
pub const COL_AD_FEE: &str = "广告扣费";
pub const COL_PROMOTION_PROFIT: &str = "推广后利润";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogLayout {
    /// Identifiers, prices and promotion metrics.
    #[default]
    Products,
    /// Adds the ad bid ratio and the activity-price metrics.
    Promotion,
}

impl CatalogLayout {
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Products => &[
                COL_IMAGE,
                COL_SPU,
                COL_SKC,
                COL_SKU,
                COL_NAME,
                COL_CATEGORY,
                COL_COST,
                COL_DECLARE,
                COL_AD_FEE,
                COL_PROMOTION_PROFIT,
            ],
            Self::Promotion => &[
                COL_IMAGE,
                COL_SPU,
                COL_SKC,
                COL_SKU,
                COL_NAME,
                COL_CATEGORY,
                COL_COST,
                COL_DECLARE,
                COL_AD_BID_RATIO,
                COL_SELL_PRICE,
                COL_ACTIVITY_PROFIT,
                COL_PROFIT_RATE,
                COL_AD_FEE,
                COL_PROMOTION_PROFIT,
            ],
        }
    }
}

impl std::str::FromStr for CatalogLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "products" | "product" => Ok(Self::Products),
            "promotion" | "promo" => Ok(Self::Promotion),
            other => Err(format!("unknown layout '{other}' (expected products or promotion)")),
        }
    }
}

/// Outcome of a catalog import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Group products by category (first-seen order) and lay each group out as a
/// sheet.
pub fn catalog_sheets(products: &[Product], layout: CatalogLayout, options: &MetricsOptions) -> Vec<Sheet> {
    let mut groups: IndexMap<&str, Vec<ExternalRow>> = IndexMap::new();
    for product in products {
        let category = product
            .category
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(UNCATEGORIZED);
        groups
            .entry(category)
            .or_default()
            .push(catalog_row(product, layout, options));
    }

    groups
        .into_iter()
        .map(|(name, rows)| Sheet::new(name, rows))
        .collect()
}

fn catalog_row(product: &Product, layout: CatalogLayout, options: &MetricsOptions) -> ExternalRow {
    let metrics = compute_metrics(product, options);
    let text = |v: &Option<String>| CellValue::Text(v.clone().unwrap_or_default());
    let price = |v: &CellValue| if v.is_empty() { CellValue::Number(0.0) } else { v.clone() };

    layout
        .columns()
        .iter()
        .map(|&col| {
            let value = match col {
                COL_IMAGE => text(&product.image),
                COL_SPU => text(&product.spu),
                COL_SKC => text(&product.skc),
                COL_SKU => text(&product.sku),
                COL_NAME => text(&product.name),
                COL_CATEGORY => text(&product.category),
                COL_COST => price(&product.cost_price),
                COL_DECLARE => price(&product.declare_price),
                // Left blank when unset so a re-import keeps the default ratio
                COL_AD_BID_RATIO => product.ad_bid_ratio.clone(),
                COL_SELL_PRICE => CellValue::Number(metrics.activity.sell_price),
                COL_ACTIVITY_PROFIT => CellValue::Number(metrics.activity.profit),
                COL_PROFIT_RATE => CellValue::Text(format!("{}%", CellValue::Number(metrics.activity.profit_rate))),
                COL_AD_FEE => CellValue::Number(metrics.promotion.ad_fee),
                COL_PROMOTION_PROFIT => CellValue::Number(metrics.promotion.promotion_profit),
                _ => CellValue::Empty,
            };
            (col.to_string(), value)
        })
        .collect()
}

/// Write the whole catalog to `path`. Returns the number of sheets written.
pub fn export_catalog(
    path: &Path,
    products: &[Product],
    layout: CatalogLayout,
    options: &MetricsOptions,
) -> Result<usize, IoError> {
    let sheets = catalog_sheets(products, layout, options);
    if sheets.is_empty() {
        return Err(IoError::Write("no products to export".to_string()));
    }
    write_workbook(path, &sheets)?;
    log::info!("exported {} product(s) in {} sheet(s) to {}", products.len(), sheets.len(), path.display());
    Ok(sheets.len())
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

/// Map catalog rows back to products. The category comes from the category
/// column; workbooks without one fall back to the sheet name.
pub fn products_from_sheet(sheet_name: &str, rows: &[ExternalRow]) -> Vec<Product> {
    let text = |row: &ExternalRow, col: &str| {
        row.get(col)
            .filter(|v| !v.is_empty())
            .map(CellValue::to_text)
    };
    let cell = |row: &ExternalRow, col: &str| row.get(col).cloned().unwrap_or_default();

    rows.iter()
        .map(|row| Product {
            image: text(row, COL_IMAGE),
            spu: text(row, COL_SPU),
            skc: text(row, COL_SKC),
            sku: text(row, COL_SKU),
            name: text(row, COL_NAME),
            cost_price: cell(row, COL_COST),
            declare_price: cell(row, COL_DECLARE),
            ad_bid_ratio: cell(row, COL_AD_BID_RATIO),
            category: match row.get(COL_CATEGORY) {
                Some(value) => category_from(&value.to_text()),
                None => category_from(sheet_name),
            },
            ..Product::default()
        })
        .collect()
}

fn category_from(name: &str) -> Option<String> {
    (!name.is_empty() && name != UNCATEGORIZED).then(|| name.to_string())
}

/// Import every sheet of a catalog workbook. Rows without a SKU, or whose SKU
/// is already stored (or appeared earlier in this file), are skipped.
pub fn import_catalog(store: &ProductStore, path: &Path) -> Result<ImportSummary, IoError> {
    let sheets = read_workbook(path)?;
    let mut seen: HashSet<String> = store
        .get_all()?
        .into_iter()
        .filter_map(|p| p.sku().map(str::to_string))
        .collect();
    let mut summary = ImportSummary::default();

    for sheet in &sheets {
        for mut product in products_from_sheet(&sheet.name, &sheet.rows) {
            let Some(sku) = product.sku().map(str::to_string) else {
                log::warn!("import: row without SKU in sheet '{}' skipped", sheet.name);
                summary.skipped += 1;
                continue;
            };
            if !seen.insert(sku.clone()) {
                log::debug!("import: SKU '{sku}' already exists, skipped");
                summary.skipped += 1;
                continue;
            }
            store.save(&mut product)?;
            summary.imported += 1;
        }
    }

    log::info!(
        "imported {} product(s), skipped {} from {}",
        summary.imported,
        summary.skipped,
        path.display()
    );
    Ok(summary)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
