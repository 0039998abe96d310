use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use tracing::warn;
use vitrine_core::config::LoadOptions;
use vitrine_core::{ApplicationError, Catalog, DomainError, PriceChange, PriceDropApproval, Product};

use crate::commands::stats::render_catalog;
use crate::commands::{load_catalog, CommandResult};

const MENU: &str = "Operations:\n  1 - change the price of a product\n  2 - place an order\n  \
                    any other key - exit";

pub fn run(options: LoadOptions) -> CommandResult {
    let (_, outcome) = match load_catalog("shop", options) {
        Ok(loaded) => loaded,
        Err(failure) => return failure,
    };

    if !outcome.issues.is_empty() {
        warn!(
            skipped = outcome.issues.len(),
            "some products were skipped during import; run `vitrine check` for details"
        );
    }

    let mut catalog = outcome.catalog;
    let stdin = io::stdin();
    let stdout = io::stdout();
    match run_session(&mut catalog, &mut stdin.lock(), &mut stdout.lock()) {
        Ok(()) => CommandResult { exit_code: 0, output: "Goodbye.".to_string() },
        Err(error) => CommandResult::failure("shop", "console_io", format!("{error:#}"), 4),
    }
}

/// Runs the console loop until the user picks exit, leaves a product name
/// empty, or input ends.
pub fn run_session<R, W>(catalog: &mut Catalog, input: &mut R, output: &mut W) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    loop {
        writeln!(output, "{}\n\n{MENU}", render_catalog(catalog))?;

        match prompt(input, output, "Choose an operation: ")?.as_str() {
            "1" => {
                let name = prompt(input, output, "Product to reprice (leave empty to quit): ")?;
                if name.is_empty() {
                    break;
                }
                change_price(catalog, &name, input, output)?;
            }
            "2" => {
                let name = prompt(input, output, "Product to buy (leave empty to quit): ")?;
                if name.is_empty() {
                    break;
                }
                place_order(catalog, &name, input, output)?;
            }
            _ => break,
        }
    }

    Ok(())
}

fn change_price<R, W>(
    catalog: &mut Catalog,
    name: &str,
    input: &mut R,
    output: &mut W,
) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    if catalog.find_product(name).is_none() {
        return report_not_found(output, name);
    }

    let raw = prompt(input, output, "New price: ")?;
    let Ok(price) = raw.parse::<Decimal>() else {
        writeln!(output, "`{raw}` is not a valid price")?;
        return Ok(());
    };

    let mut approval = ConsoleApproval { input: &mut *input, output: &mut *output, error: None };
    let result = catalog.change_price(name, price, &mut approval);
    if let Some(error) = approval.error {
        return Err(error).context("failed to read price confirmation");
    }

    match result {
        None => report_not_found(output, name)?,
        Some(Ok(PriceChange::Updated { previous, current })) => {
            writeln!(output, "Price of `{name}` changed from {previous} to {current}")?
        }
        Some(Ok(PriceChange::Declined { current, .. })) => {
            writeln!(output, "Price of `{name}` left at {current}")?
        }
        Some(Err(error)) => report_error(output, error)?,
    }

    Ok(())
}

fn place_order<R, W>(
    catalog: &mut Catalog,
    name: &str,
    input: &mut R,
    output: &mut W,
) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    if catalog.find_product(name).is_none() {
        return report_not_found(output, name);
    }

    let raw = prompt(input, output, "Quantity: ")?;
    let Ok(quantity) = raw.parse::<u32>() else {
        writeln!(output, "`{raw}` is not a valid quantity")?;
        return Ok(());
    };

    match catalog.place_order(name, quantity) {
        None => report_not_found(output, name)?,
        Some(Ok(receipt)) => {
            writeln!(output, "{}", receipt.summary)?;
            if receipt.fulfilled {
                writeln!(output, "Remaining stock: {}", receipt.remaining_stock)?;
            }
        }
        Some(Err(error)) => report_error(output, error)?,
    }

    Ok(())
}

/// Asks on the console before a price goes down. Read failures count as a
/// refusal and are surfaced once the price change returns.
struct ConsoleApproval<'a, R, W> {
    input: &'a mut R,
    output: &'a mut W,
    error: Option<io::Error>,
}

impl<R: BufRead, W: Write> PriceDropApproval for ConsoleApproval<'_, R, W> {
    fn approve(&mut self, product: &Product, proposed: Decimal) -> bool {
        let message = format!(
            "New price {proposed} is lower than the current {}. Confirm [y/N]: ",
            product.price()
        );
        match prompt(&mut *self.input, &mut *self.output, &message) {
            Ok(answer) => answer.eq_ignore_ascii_case("y"),
            Err(error) => {
                self.error = Some(error);
                false
            }
        }
    }
}

fn prompt<R, W>(input: &mut R, output: &mut W, message: &str) -> io::Result<String>
where
    R: BufRead,
    W: Write,
{
    write!(output, "{message}")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn report_not_found<W: Write>(output: &mut W, name: &str) -> Result<()> {
    writeln!(output, "Product `{name}` was not found")?;
    Ok(())
}

fn report_error<W: Write>(output: &mut W, error: DomainError) -> Result<()> {
    let error = ApplicationError::from(error);
    writeln!(output, "{} ({error})", error.user_message())?;
    Ok(())
}
