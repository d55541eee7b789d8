//! Interactive form wizard.
//!
//! Asks for each field in form order:
//! 1. Product code (pick from the list, or 'other' and type one)
//! 2. Currency, unit price, and an exchange rate for non-GBP prices
//! 3. Country, sale date, hour
//! 4. Customer type

use chrono::NaiveDate;
use demandcast_core::config::FormDefaults;
use demandcast_core::features::BASE_CURRENCY;
use demandcast_core::form::{COUNTRIES, OTHER_CHOICE, PRODUCT_CODES};
use demandcast_core::{Currency, CustomerType, SaleInput};
use dialoguer::{Input, Select};

/// Product choices as shown: the catalog plus 'other'.
pub fn product_choices() -> Vec<&'static str> {
    PRODUCT_CODES
        .iter()
        .copied()
        .chain(std::iter::once(OTHER_CHOICE))
        .collect()
}

/// Index of `wanted` in `items`, case-insensitive; falls back to the 'other'
/// entry if there is one, else the first item.
pub fn default_index(items: &[&str], wanted: &str) -> usize {
    let wanted = wanted.trim();
    items
        .iter()
        .position(|item| item.eq_ignore_ascii_case(wanted))
        .or_else(|| items.iter().position(|item| *item == OTHER_CHOICE))
        .unwrap_or(0)
}

/// Prompt for every field, starting from `defaults`.
pub fn prompt_sale_input(defaults: &FormDefaults) -> anyhow::Result<SaleInput> {
    println!("\n  1️⃣  Product Information\n");

    let products = product_choices();
    let product_idx = Select::new()
        .with_prompt("Product Code")
        .items(&products)
        .default(default_index(&products, &defaults.product_code))
        .interact()?;
    let product_code = if products[product_idx] == OTHER_CHOICE {
        let preset = if PRODUCT_CODES.contains(&defaults.product_code.as_str()) {
            String::new()
        } else {
            defaults.product_code.clone()
        };
        Input::<String>::new()
            .with_prompt("Enter Product Code")
            .with_initial_text(preset)
            .validate_with(|code: &String| -> Result<(), &str> {
                if code.trim().is_empty() {
                    Err("Product code cannot be empty")
                } else {
                    Ok(())
                }
            })
            .interact_text()?
            .trim()
            .to_string()
    } else {
        products[product_idx].to_string()
    };

    let currency_labels: Vec<&str> = Currency::ALL.iter().map(|c| c.label()).collect();
    let currency_idx = Select::new()
        .with_prompt("Select the currency you are entering the price in")
        .items(&currency_labels)
        .default(default_index(&currency_labels, defaults.currency.label()))
        .interact()?;
    let currency = Currency::ALL[currency_idx];

    let unit_price: f64 = Input::new()
        .with_prompt(format!("Unit Price (per unit, in {})", currency.code()))
        .default(defaults.unit_price)
        .validate_with(|price: &f64| -> Result<(), &str> {
            if price.is_finite() && *price >= 0.01 {
                Ok(())
            } else {
                Err("Unit price must be at least 0.01")
            }
        })
        .interact_text()?;

    let exchange_rate = if currency == BASE_CURRENCY {
        None
    } else {
        let raw: String = Input::new()
            .with_prompt(format!(
                "Current exchange rate: 1 {} = ? {} (e.g. 350 for PKR; blank to skip)",
                BASE_CURRENCY.code(),
                currency.code()
            ))
            .allow_empty(true)
            .interact_text()?;
        Some(raw).filter(|r| !r.trim().is_empty())
    };

    println!("\n  2️⃣  Transaction Details\n");

    let country_idx = Select::new()
        .with_prompt("Country of Sale")
        .items(&COUNTRIES)
        .default(default_index(&COUNTRIES, &defaults.country))
        .interact()?;

    let sale_date: NaiveDate = Input::new()
        .with_prompt("Sale Date (YYYY-MM-DD)")
        .default(defaults.sale_date)
        .interact_text()?;

    let hour: u32 = Input::new()
        .with_prompt("Hour of Sale (0-23)")
        .default(defaults.hour)
        .validate_with(|hour: &u32| -> Result<(), &str> {
            if *hour <= 23 {
                Ok(())
            } else {
                Err("Hour must be between 0 and 23")
            }
        })
        .interact_text()?;

    println!("\n  3️⃣  Customer Information\n");

    let customer_labels: Vec<&str> = CustomerType::ALL.iter().map(|c| c.label()).collect();
    let customer_idx = Select::new()
        .with_prompt("Customer Type")
        .items(&customer_labels)
        .default(default_index(&customer_labels, defaults.customer_type.label()))
        .interact()?;

    Ok(SaleInput {
        product_code,
        unit_price,
        currency,
        exchange_rate,
        country: COUNTRIES[country_idx].to_string(),
        sale_date,
        hour,
        customer_type: CustomerType::ALL[customer_idx],
    })
}
