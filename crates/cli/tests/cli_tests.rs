// End-to-end tests for the `pgrid` binary.
// Run with: cargo test -p profitgrid-cli --test cli_tests -- --nocapture
//
// Every test gets its own database and settings file through PROFITGRID_DB
// and PROFITGRID_CONFIG, so nothing touches the user's config directory.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

struct Sandbox {
    dir: tempfile::TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self { dir: tempfile::tempdir().unwrap() }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn pgrid(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_pgrid"));
        cmd.current_dir(env!("CARGO_MANIFEST_DIR"))
            .env("PROFITGRID_DB", self.path("products.db"))
            .env("PROFITGRID_CONFIG", self.path("settings.json"))
            .env_remove("RUST_LOG");
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.pgrid().args(args).output().expect("run pgrid")
    }

    fn ok(&self, args: &[&str]) -> Output {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "pgrid {:?} failed: {:?}\nstderr: {}",
            args,
            output.status,
            String::from_utf8_lossy(&output.stderr)
        );
        output
    }

    fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self.ok(args);
        serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
            panic!("invalid JSON ({e}):\n{}", String::from_utf8_lossy(&output.stdout))
        })
    }

    /// TS-01 (cost 60) and MUG-9 (cost 20.5).
    fn seed(&self) {
        self.ok(&["product", "add", "--sku", "TS-01", "--name", "T恤", "--category", "服装",
                  "--cost", "60", "--declare", "100", "--ratio", "4"]);
        self.ok(&["product", "add", "--sku", "MUG-9", "--name", "Mug", "--cost", "20.5", "--declare", "40"]);
    }
}

fn fixture(name: &str) -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
        .to_string_lossy()
        .into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ---------------------------------------------------------------------------
// profit
// ---------------------------------------------------------------------------

#[test]
fn profit_json_reports_rows_and_totals() {
    let sb = Sandbox::new();
    sb.seed();

    let report = sb.json(&["profit", &fixture("orders.csv"), "--json"]);
    assert_eq!(report["columns"]["sku"], "SKU");
    assert_eq!(report["columns"]["revenue"], "收入");
    assert_eq!(report["matched"], 3);

    let rows = report["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0]["订单号"], "1001");
    assert_eq!(rows[0]["cost"], 60.0);
    assert_eq!(rows[0]["profit"], 40.0);
    assert_eq!(rows[1]["profit"], 29.5);
    // Unmatched row keeps its full revenue as profit
    assert_eq!(rows[2]["cost"], 0.0);
    assert_eq!(rows[2]["profit"], 30.0);
    // Unparseable revenue counts as zero
    assert_eq!(rows[3]["profit"], -60.0);

    assert_eq!(report["summary"]["totalCost"], 140.5);
    assert_eq!(report["summary"]["totalRevenue"], 180.0);
    assert_eq!(report["summary"]["totalProfit"], 39.5);
}

#[test]
fn profit_preview_and_csv_output() {
    let sb = Sandbox::new();
    sb.seed();
    let out = sb.path("result.csv");

    let output = sb.ok(&["profit", &fixture("orders.csv"), "--out", out.to_str().unwrap()]);
    let preview = String::from_utf8_lossy(&output.stdout);
    assert!(preview.lines().next().unwrap().starts_with("订单号"));
    assert!(stderr(&output).contains("4 row(s), 3 matched"));

    let written = std::fs::read_to_string(&out).unwrap();
    let mut lines = written.lines();
    assert_eq!(lines.next(), Some("订单号,SKU,收入,cost,profit"));
    assert_eq!(lines.next(), Some("1001,ts-01,100,60,40"));
}

#[test]
fn profit_into_directory_uses_dated_name() {
    let sb = Sandbox::new();
    sb.seed();
    let out_dir = sb.path("results");
    std::fs::create_dir(&out_dir).unwrap();

    sb.ok(&["profit", &fixture("orders.csv"), "--out", out_dir.to_str().unwrap()]);
    let names: Vec<String> = std::fs::read_dir(&out_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 1);
    assert!(names[0].starts_with("利润计算结果_") && names[0].ends_with(".xlsx"));
}

#[test]
fn profit_with_rules_file() {
    let sb = Sandbox::new();
    sb.seed();

    let report = sb.json(&[
        "profit",
        &fixture("custom_headers.csv"),
        "--rules",
        &fixture("rules.toml"),
        "--json",
    ]);
    assert_eq!(report["rows"][0]["成本"], 60.0);
    assert_eq!(report["rows"][0]["利润"], 20.0);
}

#[test]
fn profit_missing_sku_column_exits_5() {
    let sb = Sandbox::new();
    let output = sb.run(&["profit", &fixture("no_sku.csv")]);
    assert_eq!(output.status.code(), Some(5));
    assert!(stderr(&output).contains("no sku column"));
}

#[test]
fn profit_empty_sheet_is_reported() {
    let sb = Sandbox::new();
    let output = sb.ok(&["profit", &fixture("header_only.csv"), "--json"]);
    assert!(output.stdout.is_empty());
    assert!(stderr(&output).contains("sheet is empty"));
}

#[test]
fn profit_unknown_sheet_exits_6() {
    let sb = Sandbox::new();
    let output = sb.run(&["profit", &fixture("orders.csv"), "--sheet", "nope"]);
    assert_eq!(output.status.code(), Some(6));
}

#[test]
fn profit_settings_labels() {
    let sb = Sandbox::new();
    sb.seed();
    std::fs::write(
        sb.path("settings.json"),
        "{\n  // labels\n  \"export.costColumn\": \"成本\",\n  \"export.profitColumn\": \"利润\"\n}",
    )
    .unwrap();

    let report = sb.json(&["profit", &fixture("orders.csv"), "--json"]);
    assert_eq!(report["rows"][0]["利润"], 40.0);

    let report = sb.json(&["profit", &fixture("orders.csv"), "--profit-column", "net", "--json"]);
    assert_eq!(report["rows"][0]["net"], 40.0);
    assert_eq!(report["rows"][0]["成本"], 60.0);
}

#[test]
fn profit_json_totals_are_rounded_to_cents() {
    let sb = Sandbox::new();
    sb.ok(&["product", "add", "--sku", "C1", "--cost", "0.1"]);
    sb.ok(&["product", "add", "--sku", "C2", "--cost", "0.2"]);

    let report = sb.json(&["profit", &fixture("cents.csv"), "--json"]);
    assert_eq!(report["summary"]["totalCost"], 0.3);
    assert_eq!(report["summary"]["totalRevenue"], 0.3);
    assert_eq!(report["summary"]["totalProfit"], 0.0);
}

// ---------------------------------------------------------------------------
// product / metrics
// ---------------------------------------------------------------------------

#[test]
fn product_lifecycle() {
    let sb = Sandbox::new();
    sb.seed();

    let list = sb.json(&["product", "list", "--json"]);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["sku"], "TS-01");
    assert_eq!(list[0]["metrics"]["promotion"]["adFee"], 25.0);
    assert_eq!(list[0]["metrics"]["promotion"]["promotionProfit"], 15.0);
    let id = list[0]["id"].as_i64().unwrap().to_string();

    let edited = sb.json(&["product", "edit", &id, "--declare", "120", "--json"]);
    assert_eq!(edited["declarePrice"], 120.0);

    sb.ok(&["product", "copy", &id, "--sku", "TS-02"]);
    let found = sb.json(&["product", "search", "TS-0", "--json"]);
    assert_eq!(found.as_array().unwrap().len(), 2);

    let output = sb.run(&["product", "copy", &id, "--sku", "TS-01"]);
    assert_eq!(output.status.code(), Some(7));

    sb.ok(&["product", "delete", &id]);
    let output = sb.run(&["product", "show", &id]);
    assert_eq!(output.status.code(), Some(6));
}

#[test]
fn sort_by_activity_profit() {
    let sb = Sandbox::new();
    sb.seed();

    // TS-01: 95 - 60 = 35; MUG-9: 38 - 20.5 = 17.5
    let sorted = sb.json(&["product", "sort", "--by", "activity", "--asc", "--json"]);
    let skus: Vec<&str> = sorted
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["sku"].as_str().unwrap())
        .collect();
    assert_eq!(skus, vec!["MUG-9", "TS-01"]);
    assert_eq!(sorted[1]["metrics"]["activity"]["profit"], 35.0);
    assert_eq!(sorted[1]["metrics"]["activity"]["profitRate"], 36.8);
}

#[test]
fn metrics_respect_settings_default_ratio() {
    let sb = Sandbox::new();
    sb.seed();
    std::fs::write(sb.path("settings.json"), "{\"metrics.defaultAdBidRatio\": 0}").unwrap();

    let metrics = sb.json(&["metrics", "--json"]);
    // MUG-9 has no ratio of its own
    assert_eq!(metrics[1]["metrics"]["promotion"]["adFee"], 0.0);
    assert_eq!(metrics[1]["metrics"]["promotion"]["promotionProfit"], 19.5);
}

#[test]
fn add_requires_sku() {
    let sb = Sandbox::new();
    let output = sb.run(&["product", "add", "--name", "nameless"]);
    assert_eq!(output.status.code(), Some(2));
}

// ---------------------------------------------------------------------------
// category / catalog / backup
// ---------------------------------------------------------------------------

#[test]
fn duplicate_category_conflicts() {
    let sb = Sandbox::new();
    sb.ok(&["category", "add", "服装"]);
    let output = sb.run(&["category", "add", "服装"]);
    assert_eq!(output.status.code(), Some(7));

    let categories = sb.json(&["category", "list", "--json"]);
    assert_eq!(categories[0]["name"], "服装");
}

#[test]
fn catalog_export_then_import_elsewhere() {
    let sb = Sandbox::new();
    sb.seed();
    let book = sb.path("catalog.xlsx");
    sb.ok(&["catalog", "export", book.to_str().unwrap(), "--layout", "promotion"]);

    let other = Sandbox::new();
    other.ok(&["product", "add", "--sku", "MUG-9", "--name", "existing"]);
    let summary = other.json(&["catalog", "import", book.to_str().unwrap(), "--json"]);
    assert_eq!(summary["imported"], 1);
    assert_eq!(summary["skipped"], 1);

    let ts = other.json(&["product", "search", "TS-01", "--exact-sku", "--json"]);
    assert_eq!(ts[0]["category"], "服装");
    assert_eq!(ts[0]["costPrice"], 60.0);
    assert_eq!(ts[0]["adBidRatio"], 4.0);
}

#[test]
fn backup_round_trip() {
    let sb = Sandbox::new();
    sb.seed();
    sb.ok(&["category", "add", "服装"]);
    let file = sb.path("backup.json");
    sb.ok(&["backup", "export", file.to_str().unwrap()]);

    let other = Sandbox::new();
    other.ok(&["backup", "import", file.to_str().unwrap()]);
    let restored = other.json(&["product", "list", "--json"]);
    assert_eq!(restored.as_array().unwrap().len(), 2);
    let categories = other.json(&["category", "list", "--json"]);
    assert_eq!(categories.as_array().unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

#[test]
fn config_set_is_saved_and_used() {
    let sb = Sandbox::new();
    sb.seed();

    let path = sb.ok(&["config", "path"]);
    assert_eq!(
        String::from_utf8_lossy(&path.stdout).trim(),
        sb.path("settings.json").to_string_lossy()
    );

    sb.ok(&["config", "set", "export.profitColumn", "利润"]);
    let settings = sb.json(&["config", "show"]);
    assert_eq!(settings["export.profitColumn"], "利润");
    assert_eq!(settings["export.costColumn"], "cost");

    let report = sb.json(&["profit", &fixture("orders.csv"), "--json"]);
    assert_eq!(report["rows"][0]["利润"], 40.0);
}

#[test]
fn config_set_unknown_key_exits_2() {
    let sb = Sandbox::new();
    let output = sb.run(&["config", "set", "metrics.discount", "0.9"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("unknown setting"));
}
