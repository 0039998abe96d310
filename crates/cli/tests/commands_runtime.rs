use std::env;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use rust_decimal::Decimal;
use serde_json::Value;
use tempfile::TempDir;
use vitrine_cli::commands::{check, shop, stats};
use vitrine_core::config::{ConfigOverrides, LoadOptions};
use vitrine_core::{Catalog, ImportPolicy, Product};

const CATALOG: &str = r#"[
  {
    "name": "Smartphones",
    "description": "Phones for work and play",
    "products": [
      {"name": "Samsung Galaxy C23 Ultra", "description": "256GB, grey", "price": 180000, "quantity": 5},
      {"name": "Iphone 15", "description": "512GB, gray space", "price": 210000, "quantity": 8},
      {"name": "Samsung Galaxy C23 Ultra", "description": "duplicate", "price": 175000, "quantity": 2}
    ]
  },
  {
    "name": "TV",
    "description": "Screens",
    "products": [
      {"name": "55\" QLED 4K", "description": "Ambient light", "price": 123000, "quantity": 7},
      {"name": "Sold out", "description": "none left", "price": 1000, "quantity": 0}
    ]
  }
]"#;

#[test]
fn stats_json_reports_merged_catalog() {
    with_catalog(CATALOG, |options| {
        let result = stats::run(options, true);
        assert_eq!(result.exit_code, 0, "expected stats success");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "stats");
        assert_eq!(payload["skipped_products"], 1);
        assert_eq!(payload["statistics"]["categories_created"], 2);
        assert_eq!(payload["statistics"]["unique_products"], 3);
        assert_eq!(payload["statistics"]["total_units"], 22);
    });
}

#[test]
fn stats_human_output_lists_products() {
    with_catalog(CATALOG, |options| {
        let result = stats::run(options, false);
        assert_eq!(result.exit_code, 0);
        assert!(result.output.starts_with("Categories: 2 | Unique products: 3 | Units in stock: 22"));
        assert!(result.output.contains("Samsung Galaxy C23 Ultra, 180000 RUB. Remaining: 7 pcs."));
    });
}

#[test]
fn stats_fails_with_import_class_for_missing_file() {
    with_env(|| {
        let dir = TempDir::new().expect("temp dir");
        let result = stats::run(options_for(&dir.path().join("absent.json"), &dir), true);

        assert_eq!(result.exit_code, 3);
        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "import");
    });
}

#[test]
fn strict_import_turns_rejected_product_into_failure() {
    with_catalog(CATALOG, |mut options| {
        options.overrides.import_policy = Some(ImportPolicy::Strict);
        let result = stats::run(options, true);

        assert_eq!(result.exit_code, 3);
        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "import");
        assert!(payload["message"].as_str().unwrap_or_default().contains("Sold out"));
    });
}

#[test]
fn check_reports_rejected_products() {
    with_catalog(CATALOG, |options| {
        let result = check::run(options, true);
        assert_eq!(result.exit_code, 1, "a rejected product fails the check");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["overall_status"], "fail");
        assert_eq!(payload["checks"][0]["name"], "config_validation");
        assert_eq!(payload["checks"][1]["status"], "pass");
        assert_eq!(payload["checks"][2]["status"], "fail");
        assert_eq!(payload["issues"][0]["product"], "Sold out");
        assert_eq!(payload["issues"][0]["error_class"], "zero_quantity");
    });
}

#[test]
fn check_passes_for_clean_catalog() {
    let clean = r#"[{"name": "Fruit", "products": [{"name": "Apple", "price": 50, "quantity": 3}]}]"#;
    with_catalog(clean, |options| {
        let result = check::run(options, false);
        assert_eq!(result.exit_code, 0);
        assert!(result.output.starts_with("check: catalog is ready"));
        assert!(result.output.contains("- [ok] catalog_import: 1 products imported, 0 rejected"));
    });
}

#[test]
fn check_skips_import_when_file_is_malformed() {
    with_catalog("{\"name\": \"Product1\", \"price\": 100", |options| {
        let result = check::run(options, true);
        assert_eq!(result.exit_code, 1);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["checks"][1]["status"], "fail");
        assert_eq!(payload["checks"][2]["status"], "skipped");
    });
}

#[test]
fn session_changes_price_after_confirmation() {
    let mut catalog = sample_catalog();
    let transcript = run_script(&mut catalog, "1\nApple\n40\ny\n0\n");

    assert!(transcript.contains("New price 40 is lower than the current 50. Confirm [y/N]: "));
    assert!(transcript.contains("Price of `Apple` changed from 50 to 40"));
    assert_eq!(catalog.find_product("Apple").map(Product::price), Some(Decimal::new(40, 0)));
}

#[test]
fn session_keeps_price_when_drop_is_declined() {
    let mut catalog = sample_catalog();
    let transcript = run_script(&mut catalog, "1\nApple\n40\nn\n0\n");

    assert!(transcript.contains("Price of `Apple` left at 50"));
    assert_eq!(catalog.find_product("Apple").map(Product::price), Some(Decimal::new(50, 0)));
}

#[test]
fn session_rejects_non_positive_and_unparsable_prices() {
    let mut catalog = sample_catalog();
    let transcript = run_script(&mut catalog, "1\nApple\n0\n1\nApple\ncheap\n0\n");

    assert!(transcript.contains("invalid price 0: price must be greater than zero"));
    assert!(transcript.contains("`cheap` is not a valid price"));
    assert_eq!(catalog.find_product("Apple").map(Product::price), Some(Decimal::new(50, 0)));
}

#[test]
fn session_survives_prices_at_the_decimal_limit() {
    let mut catalog = Catalog::new();
    let fruit = catalog.add_category("Fruit", "Fresh fruit");
    fruit
        .add_product(Product::new("Apple", "Green", Decimal::new(50, 0), 1).expect("valid"))
        .expect("add apple");
    fruit
        .add_product(Product::new("Pear", "Yellow", Decimal::new(70, 0), 20).expect("valid"))
        .expect("add pear");
    let max = Decimal::MAX.to_string();

    let script = format!("1\nApple\n{max}\n1\nPear\n{max}\n0\n");
    let transcript = run_script(&mut catalog, &script);

    assert!(transcript.contains(&format!("Price of `Apple` changed from 50 to {max}")));
    assert!(transcript.contains("stock value of `Pear`"));
    assert_eq!(transcript.matches("Choose an operation: ").count(), 3);
    assert_eq!(catalog.find_product("Apple").map(Product::price), Some(Decimal::MAX));
    assert_eq!(catalog.find_product("Pear").map(Product::price), Some(Decimal::new(70, 0)));
}

#[test]
fn session_places_order_and_reduces_stock() {
    let mut catalog = sample_catalog();
    let transcript = run_script(&mut catalog, "2\nApple\n4\n0\n");

    assert!(transcript.contains("Quantity: 4\nTotal: 200"));
    assert!(transcript.contains("Remaining stock: 6"));
    assert_eq!(catalog.find_product("Apple").map(Product::stock_quantity), Some(6));
}

#[test]
fn session_reports_unfulfillable_and_zero_quantity_orders() {
    let mut catalog = sample_catalog();
    let transcript = run_script(&mut catalog, "2\nApple\n10\n2\nApple\n0\n0\n");

    assert!(transcript.contains("Not enough stock to fulfil this order"));
    assert!(transcript.contains("Quantity must be greater than zero."));
    assert_eq!(catalog.find_product("Apple").map(Product::stock_quantity), Some(10));
}

#[test]
fn session_reports_unknown_product_and_exits_on_empty_name() {
    let mut catalog = sample_catalog();
    let transcript = run_script(&mut catalog, "2\nNokia\n1\n\n");

    assert!(transcript.contains("Product `Nokia` was not found"));
    let menus = transcript.matches("Choose an operation: ").count();
    assert_eq!(menus, 2, "empty product name ends the session");
}

#[test]
fn session_ends_when_input_runs_out() {
    let mut catalog = sample_catalog();
    let transcript = run_script(&mut catalog, "");

    assert!(transcript.starts_with("Categories: 1 | Unique products: 1 | Units in stock: 10"));
}

fn sample_catalog() -> Catalog {
    let mut catalog = Catalog::new();
    catalog
        .add_category("Fruit", "Fresh fruit")
        .add_product(Product::new("Apple", "Green", Decimal::new(50, 0), 10).expect("valid"))
        .expect("add apple");
    catalog
}

fn run_script(catalog: &mut Catalog, script: &str) -> String {
    let mut input = Cursor::new(script.as_bytes().to_vec());
    let mut output = Vec::new();
    shop::run_session(catalog, &mut input, &mut output).expect("session should finish");
    String::from_utf8(output).expect("console output is utf-8")
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn options_for(data_path: &Path, dir: &TempDir) -> LoadOptions {
    LoadOptions {
        config_path: Some(dir.path().join("vitrine.toml")),
        require_file: false,
        overrides: ConfigOverrides { data_path: Some(data_path.to_path_buf()), ..ConfigOverrides::default() },
    }
}

fn with_catalog(contents: &str, test_fn: impl FnOnce(LoadOptions)) {
    with_env(|| {
        let dir = TempDir::new().expect("temp dir");
        let path: PathBuf = dir.path().join("products.json");
        fs::write(&path, contents).expect("write catalog file");
        test_fn(options_for(&path, &dir));
    });
}

fn with_env(test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "VITRINE_CATALOG_DATA_PATH",
        "VITRINE_CATALOG_IMPORT_POLICY",
        "VITRINE_LOGGING_LEVEL",
        "VITRINE_LOGGING_FORMAT",
        "VITRINE_LOG_LEVEL",
        "VITRINE_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();
    for key in keys {
        env::remove_var(key);
    }

    test_fn();

    for (key, value) in previous_values {
        match value {
            Some(value) => env::set_var(key, value),
            None => env::remove_var(key),
        }
    }
}
