use serde::Deserialize;

use crate::columns::ColumnRules;
use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Per-run reconciliation settings, usually read from a `rules.toml`.
///
/// ```toml
/// [columns]
/// sku = ["sku", "货号"]
/// revenue = ["收入", "revenue", "金额"]
///
/// [output]
/// cost_column = "成本"
/// profit_column = "利润"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReconConfig {
    #[serde(default)]
    pub columns: ColumnConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// Column discovery
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnConfig {
    #[serde(default = "default_sku_patterns")]
    pub sku: Vec<String>,
    #[serde(default = "default_revenue_patterns")]
    pub revenue: Vec<String>,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            sku: default_sku_patterns(),
            revenue: default_revenue_patterns(),
        }
    }
}

fn default_sku_patterns() -> Vec<String> {
    ColumnRules::default().sku
}

fn default_revenue_patterns() -> Vec<String> {
    ColumnRules::default().revenue
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_cost_column")]
    pub cost_column: String,
    #[serde(default = "default_profit_column")]
    pub profit_column: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            cost_column: default_cost_column(),
            profit_column: default_profit_column(),
        }
    }
}

fn default_cost_column() -> String {
    "cost".into()
}

fn default_profit_column() -> String {
    "profit".into()
}

/// A rules file as written, before defaults are filled in.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigLayer {
    #[serde(default)]
    columns: ColumnLayer,
    #[serde(default)]
    output: OutputLayer,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ColumnLayer {
    sku: Option<Vec<String>>,
    revenue: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct OutputLayer {
    cost_column: Option<String>,
    profit_column: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        Self::from_toml_over(input, &Self::default())
    }

    /// Parse `input` layered over `base`: every key the file leaves out keeps
    /// the value from `base`.
    pub fn from_toml_over(input: &str, base: &ReconConfig) -> Result<Self, ReconError> {
        let layer: ConfigLayer =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;

        let config = ReconConfig {
            columns: ColumnConfig {
                sku: layer.columns.sku.unwrap_or_else(|| base.columns.sku.clone()),
                revenue: layer.columns.revenue.unwrap_or_else(|| base.columns.revenue.clone()),
            },
            output: OutputConfig {
                cost_column: layer
                    .output
                    .cost_column
                    .unwrap_or_else(|| base.output.cost_column.clone()),
                profit_column: layer
                    .output
                    .profit_column
                    .unwrap_or_else(|| base.output.profit_column.clone()),
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        for (class, patterns) in [("sku", &self.columns.sku), ("revenue", &self.columns.revenue)] {
            if !patterns.iter().any(|p| !p.trim().is_empty()) {
                return Err(ReconError::ConfigValidation(format!(
                    "columns.{class} needs at least one non-blank pattern"
                )));
            }
        }

        let out = &self.output;
        if out.cost_column.is_empty() || out.profit_column.is_empty() {
            return Err(ReconError::ConfigValidation(
                "output column labels must not be empty".into(),
            ));
        }
        if out.cost_column == out.profit_column {
            return Err(ReconError::ConfigValidation(format!(
                "cost and profit columns are both '{}'",
                out.cost_column
            )));
        }

        Ok(())
    }

    /// Discovery rules with blank patterns dropped.
    pub fn rules(&self) -> ColumnRules {
        let keep = |v: &[String]| -> Vec<String> {
            v.iter().filter(|p| !p.trim().is_empty()).cloned().collect()
        };
        ColumnRules {
            sku: keep(&self.columns.sku),
            revenue: keep(&self.columns.revenue),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
