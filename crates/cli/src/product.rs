//! `pgrid product`, `pgrid category` and `pgrid metrics`.

use clap::{Args, Subcommand, ValueEnum};
use serde::Serialize;

use profitgrid_io::ProductStore;
use profitgrid_recon::catalog::{sort_by_metric, SortKey};
use profitgrid_recon::metrics::{compute_metrics, MetricsOptions, ProductMetrics};
use profitgrid_recon::{CellValue, Product};

use crate::util::{money, render_table};
use crate::{print_json, App, CliError};

const MAX_COLUMN_WIDTH: usize = 32;

#[derive(Subcommand)]
pub enum ProductCommands {
    /// Add a product
    #[command(after_help = "\
Examples:
  pgrid product add --sku TS-01 --name 'T-shirt' --cost 12.5 --declare 39.9 --ratio 4
  pgrid product add --sku MUG-9 --category 家居 --cost 8 --declare 25")]
    Add {
        #[command(flatten)]
        fields: ProductFields,

        /// Output the saved product as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change fields of an existing product (pass "" to clear a field)
    #[command(after_help = "\
Examples:
  pgrid product edit 3 --declare 42
  pgrid product edit 3 --category '' --ratio 3.5")]
    Edit {
        /// Product id
        id: i64,

        #[command(flatten)]
        fields: ProductFields,

        /// Output the saved product as JSON
        #[arg(long)]
        json: bool,
    },

    /// Duplicate a product under a new SKU
    Copy {
        /// Product id to copy
        id: i64,

        /// SKU for the copy (must differ from the original)
        #[arg(long)]
        sku: String,
    },

    /// Delete one or more products
    Delete {
        /// Product ids
        #[arg(required = true)]
        ids: Vec<i64>,
    },

    /// List products with their promotion metrics
    List {
        /// Only products in this category
        #[arg(long)]
        category: Option<String>,

        /// Most recently updated first
        #[arg(long)]
        recent: bool,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Find products by keyword in name, SKU, SKC or SPU
    Search {
        /// Keyword (case-sensitive substring)
        keyword: String,

        /// Match the SKU exactly instead
        #[arg(long)]
        exact_sku: bool,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Show one product with all metrics
    Show {
        /// Product id
        id: i64,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// List products ordered by a profit metric
    Sort {
        /// Metric to order by
        #[arg(long, value_enum, default_value = "activity")]
        by: SortBy,

        /// Lowest first (default: highest first)
        #[arg(long)]
        asc: bool,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum CategoryCommands {
    /// Add a category
    Add {
        /// Category name (unique)
        name: String,
    },

    /// List categories
    List {
        /// Output JSON to stdout
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SortBy {
    /// Profit at the activity (discounted) price
    Activity,
    /// Profit after the ad fee
    Promotion,
}

impl From<SortBy> for SortKey {
    fn from(by: SortBy) -> Self {
        match by {
            SortBy::Activity => SortKey::ActivityProfit,
            SortBy::Promotion => SortKey::PromotionProfit,
        }
    }
}

/// Editable product fields. Prices keep what was typed: numbers are stored as
/// numbers, anything else as text.
#[derive(Args, Default)]
pub struct ProductFields {
    #[arg(long)]
    sku: Option<String>,
    #[arg(long)]
    skc: Option<String>,
    #[arg(long)]
    spu: Option<String>,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    category: Option<String>,
    /// Image URL or path
    #[arg(long)]
    image: Option<String>,
    /// Purchase link
    #[arg(long)]
    link: Option<String>,
    /// Cost (purchase) price
    #[arg(long)]
    cost: Option<String>,
    /// Declared price
    #[arg(long)]
    declare: Option<String>,
    /// Ad bid ratio
    #[arg(long)]
    ratio: Option<String>,
}

impl ProductFields {
    fn apply(self, product: &mut Product) {
        let text = |v: String| Some(v).filter(|s| !s.is_empty());
        if let Some(v) = self.sku {
            product.sku = text(v);
        }
        if let Some(v) = self.skc {
            product.skc = text(v);
        }
        if let Some(v) = self.spu {
            product.spu = text(v);
        }
        if let Some(v) = self.name {
            product.name = text(v);
        }
        if let Some(v) = self.category {
            product.category = text(v);
        }
        if let Some(v) = self.image {
            product.image = text(v);
        }
        if let Some(v) = self.link {
            product.purchase_link = text(v);
        }
        if let Some(v) = self.cost {
            product.cost_price = price_cell(&v);
        }
        if let Some(v) = self.declare {
            product.declare_price = price_cell(&v);
        }
        if let Some(v) = self.ratio {
            product.ad_bid_ratio = price_cell(&v);
        }
    }
}

pub(crate) fn price_cell(input: &str) -> CellValue {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return CellValue::Empty;
    }
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => CellValue::Number(n),
        _ => CellValue::Text(input.to_string()),
    }
}

/// A product with its computed metrics, as emitted by `--json`.
#[derive(Serialize)]
struct ProductView<'a> {
    #[serde(flatten)]
    product: &'a Product,
    metrics: ProductMetrics,
}

// ============================================================================
// product
// ============================================================================

pub fn cmd_product(app: &App, cmd: ProductCommands) -> Result<(), CliError> {
    let mut store = app.open_store()?;
    let options = app.metrics_options();

    match cmd {
        ProductCommands::Add { fields, json } => {
            if fields.sku.as_deref().map_or(true, |s| s.trim().is_empty()) {
                return Err(CliError::args("product add requires --sku"));
            }
            let mut product = Product::default();
            fields.apply(&mut product);
            let id = store.save(&mut product)?;
            report_saved(&product, id, "added", json, &options)
        }
        ProductCommands::Edit { id, fields, json } => {
            let mut product = require(&store, id)?;
            fields.apply(&mut product);
            store.save(&mut product)?;
            report_saved(&product, id, "updated", json, &options)
        }
        ProductCommands::Copy { id, sku } => {
            let copy = store.copy_product(id, &sku).map_err(|e| match e {
                profitgrid_io::IoError::NotFound { id } => product_not_found(id),
                other => CliError::from(other),
            })?;
            eprintln!("copied product {} to {} (SKU {})", id, copy.id.unwrap_or_default(), sku);
            Ok(())
        }
        ProductCommands::Delete { ids } => {
            let removed = store.delete_many(&ids)?;
            eprintln!("deleted {} of {} product(s)", removed, ids.len());
            if removed < ids.len() {
                return Err(CliError::not_found(format!(
                    "{} id(s) did not exist",
                    ids.len() - removed
                )));
            }
            Ok(())
        }
        ProductCommands::List { category, recent, json } => {
            let products = match (category, recent) {
                (Some(c), _) => store.by_category(&c)?,
                (None, true) => store.sorted_by_update_time(false)?,
                (None, false) => store.get_all()?,
            };
            print_products(&products, json, &options)
        }
        ProductCommands::Search { keyword, exact_sku, json } => {
            let products = if exact_sku {
                store.find_by_sku(&keyword)?
            } else {
                store.search(&keyword)?
            };
            if products.is_empty() && !json {
                eprintln!("no products match '{}'", keyword);
                return Ok(());
            }
            print_products(&products, json, &options)
        }
        ProductCommands::Show { id, json } => {
            let product = require(&store, id)?;
            let metrics = compute_metrics(&product, &options);
            if json {
                return print_json(&ProductView { product: &product, metrics });
            }
            print_details(&product, &metrics);
            Ok(())
        }
        ProductCommands::Sort { by, asc, json } => {
            let scored = sort_by_metric(store.get_all()?, by.into(), asc, &options);
            if json {
                let views: Vec<ProductView<'_>> = scored
                    .iter()
                    .map(|(product, metrics)| ProductView { product, metrics: *metrics })
                    .collect();
                return print_json(&views);
            }
            print!("{}", metrics_table(&scored));
            Ok(())
        }
    }
}

fn require(store: &ProductStore, id: i64) -> Result<Product, CliError> {
    store.get(id)?.ok_or_else(|| product_not_found(id))
}

fn product_not_found(id: i64) -> CliError {
    CliError::not_found(format!("no product with id {id}"))
        .with_hint("list ids with: pgrid product list")
}

fn report_saved(
    product: &Product,
    id: i64,
    verb: &str,
    json: bool,
    options: &MetricsOptions,
) -> Result<(), CliError> {
    if json {
        let metrics = compute_metrics(product, options);
        return print_json(&ProductView { product, metrics });
    }
    eprintln!("{} product {} (SKU {})", verb, id, product.sku.as_deref().unwrap_or("-"));
    Ok(())
}

fn print_products(products: &[Product], json: bool, options: &MetricsOptions) -> Result<(), CliError> {
    if json {
        let views: Vec<ProductView<'_>> = products
            .iter()
            .map(|product| ProductView { product, metrics: compute_metrics(product, options) })
            .collect();
        return print_json(&views);
    }

    let headers: Vec<String> = ["ID", "SKU", "NAME", "CATEGORY", "COST", "DECLARE", "AD FEE", "PROMO PROFIT"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    let rows: Vec<Vec<String>> = products
        .iter()
        .map(|p| {
            let m = compute_metrics(p, options);
            vec![
                p.id.map(|id| id.to_string()).unwrap_or_default(),
                p.sku.clone().unwrap_or_default(),
                p.name.clone().unwrap_or_default(),
                p.category.clone().unwrap_or_default(),
                p.cost_price.to_text(),
                p.declare_price.to_text(),
                money(m.promotion.ad_fee),
                money(m.promotion.promotion_profit),
            ]
        })
        .collect();
    print!("{}", render_table(&headers, &rows, MAX_COLUMN_WIDTH));
    eprintln!("{} product(s)", products.len());
    Ok(())
}

fn print_details(product: &Product, metrics: &ProductMetrics) {
    let field = |label: &str, value: &str| println!("{:<14}{}", label, value);
    let opt = |v: &Option<String>| v.clone().unwrap_or_default();

    field("id", &product.id.map(|id| id.to_string()).unwrap_or_default());
    field("sku", &opt(&product.sku));
    field("skc", &opt(&product.skc));
    field("spu", &opt(&product.spu));
    field("name", &opt(&product.name));
    field("category", &opt(&product.category));
    field("image", &opt(&product.image));
    field("link", &opt(&product.purchase_link));
    field("cost", &product.cost_price.to_text());
    field("declare", &product.declare_price.to_text());
    field("ad bid ratio", &product.ad_bid_ratio.to_text());
    field("updated", &opt(&product.update_time));
    println!();
    field("sell price", &money(metrics.activity.sell_price));
    field("profit", &money(metrics.activity.profit));
    field("profit rate", &format!("{}%", CellValue::Number(metrics.activity.profit_rate)));
    field("ad fee", &money(metrics.promotion.ad_fee));
    field("promo profit", &money(metrics.promotion.promotion_profit));
}

fn metrics_table(scored: &[(Product, ProductMetrics)]) -> String {
    let headers: Vec<String> = ["ID", "SKU", "NAME", "SELL", "PROFIT", "RATE", "AD FEE", "PROMO PROFIT"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    let rows: Vec<Vec<String>> = scored
        .iter()
        .map(|(p, m)| {
            vec![
                p.id.map(|id| id.to_string()).unwrap_or_default(),
                p.sku.clone().unwrap_or_default(),
                p.name.clone().unwrap_or_default(),
                money(m.activity.sell_price),
                money(m.activity.profit),
                format!("{}%", CellValue::Number(m.activity.profit_rate)),
                money(m.promotion.ad_fee),
                money(m.promotion.promotion_profit),
            ]
        })
        .collect();
    render_table(&headers, &rows, MAX_COLUMN_WIDTH)
}

// ============================================================================
// category
// ============================================================================

pub fn cmd_category(app: &App, cmd: CategoryCommands) -> Result<(), CliError> {
    let store = app.open_store()?;
    match cmd {
        CategoryCommands::Add { name } => {
            let name = name.trim();
            if name.is_empty() {
                return Err(CliError::args("category name must not be empty"));
            }
            if store.categories()?.iter().any(|c| c.name == name) {
                return Err(CliError::conflict(format!("category '{name}' already exists")));
            }
            let id = store.add_category(name)?;
            eprintln!("added category {} ({})", id, name);
            Ok(())
        }
        CategoryCommands::List { json } => {
            let categories = store.categories()?;
            if json {
                return print_json(&categories);
            }
            for category in &categories {
                println!("{}", category.name);
            }
            Ok(())
        }
    }
}

// ============================================================================
// metrics
// ============================================================================

pub fn cmd_metrics(app: &App, id: Option<i64>, json: bool) -> Result<(), CliError> {
    let store = app.open_store()?;
    let options = app.metrics_options();

    let products = match id {
        Some(id) => vec![require(&store, id)?],
        None => store.get_all()?,
    };
    let scored: Vec<(Product, ProductMetrics)> = products
        .into_iter()
        .map(|p| {
            let m = compute_metrics(&p, &options);
            (p, m)
        })
        .collect();

    if json {
        let views: Vec<ProductView<'_>> = scored
            .iter()
            .map(|(product, metrics)| ProductView { product, metrics: *metrics })
            .collect();
        return print_json(&views);
    }
    print!("{}", metrics_table(&scored));
    Ok(())
}
