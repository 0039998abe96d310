use serde::Serialize;
use vitrine_core::config::LoadOptions;
use vitrine_core::{Catalog, CatalogStatistics};

use crate::commands::{load_catalog, CommandResult};

#[derive(Debug, Serialize)]
struct StatsReport {
    command: &'static str,
    status: &'static str,
    skipped_products: usize,
    statistics: CatalogStatistics,
}

pub fn run(options: LoadOptions, json_output: bool) -> CommandResult {
    let (_, outcome) = match load_catalog("stats", options) {
        Ok(loaded) => loaded,
        Err(failure) => return failure,
    };

    if !json_output {
        return CommandResult { exit_code: 0, output: render_catalog(&outcome.catalog) };
    }

    let report = StatsReport {
        command: "stats",
        status: "ok",
        skipped_products: outcome.issues.len(),
        statistics: outcome.catalog.statistics(),
    };
    match serde_json::to_string_pretty(&report) {
        Ok(output) => CommandResult { exit_code: 0, output },
        Err(error) => CommandResult::failure("stats", "serialization", error.to_string(), 1),
    }
}

/// Human-readable overview: totals first, then each category with its products.
pub fn render_catalog(catalog: &Catalog) -> String {
    let stats = catalog.statistics();
    let mut lines = vec![format!(
        "Categories: {} | Unique products: {} | Units in stock: {}",
        stats.categories_created, stats.unique_products, stats.total_units
    )];

    for category in catalog.categories() {
        lines.push(format!("- {category} Average price: {:.2}", category.average_price()));
        for product in category {
            lines.push(format!("    {product}"));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use vitrine_core::{Catalog, Product};

    use super::render_catalog;

    #[test]
    fn renders_totals_and_products() {
        let mut catalog = Catalog::new();
        let fruit = catalog.add_category("Fruit", "Fresh fruit");
        fruit
            .add_product(Product::new("Apple", "Green", Decimal::new(50, 0), 100).expect("valid"))
            .expect("add apple");
        fruit
            .add_product(Product::new("Pear", "Yellow", Decimal::new(75, 0), 20).expect("valid"))
            .expect("add pear");
        catalog.add_category("Empty", "");

        assert_eq!(
            render_catalog(&catalog),
            "Categories: 2 | Unique products: 2 | Units in stock: 120\n\
             - Fruit, product count: 120 pcs. Average price: 62.50\n    \
             Apple, 50 RUB. Remaining: 100 pcs.\n    \
             Pear, 75 RUB. Remaining: 20 pcs.\n\
             - Empty, product count: 0 pcs. Average price: 0.00"
        );
    }
}
