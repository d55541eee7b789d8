//! Server-rendered form and result pages.
//!
//! The page is a single Handlebars template compiled once when the gateway
//! starts. View structs below are the only data the template sees.

use crate::config::FormDefaults;
use crate::error::{ForecastError, Result};
use crate::features::{NoticeLevel, PriceNotice, normalize_price};
use crate::forecast::Forecast;
use crate::form::{
    COUNTRIES, Currency, CustomerType, OTHER_CHOICE, PRODUCT_CODES, SaleInput,
    resolve_product_code,
};
use crate::presentation::{self, DemandLevel};
use chrono::NaiveDate;
use handlebars::Handlebars;
use serde::{Deserialize, Serialize};

const PAGE_TEMPLATE_NAME: &str = "page";

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{{title}}</title>
<style>
body { font-family: system-ui, sans-serif; max-width: 760px; margin: 2rem auto; padding: 0 1rem; color: #262730; }
label { display: block; margin-top: 0.8rem; font-weight: 600; }
input, select { width: 100%; padding: 0.4rem; margin-top: 0.2rem; box-sizing: border-box; }
.radio label { display: inline; font-weight: normal; margin-right: 1rem; }
.radio input { width: auto; }
.hint { color: #6b6f76; font-size: 0.85em; }
button { margin-top: 1.2rem; padding: 0.6rem 1.2rem; font-size: 1rem; cursor: pointer; }
.box { padding: 12px 15px; border-radius: 5px; margin: 1rem 0; }
.success { background: #d4edda; border-left: 5px solid #28a745; }
.warning { background: #fff3cd; border-left: 5px solid #ffc107; }
.info { background: #d1ecf1; border-left: 5px solid #17a2b8; }
.error { background: #f8d7da; border-left: 5px solid #dc3545; }
.metric { font-size: 2.2rem; font-weight: 700; }
.bar { background: #e9ecef; border-radius: 4px; height: 12px; }
.bar > div { background: #ff4b4b; height: 12px; border-radius: 4px; }
.badge-low { color: #c0392b; } .badge-medium { color: #b7950b; } .badge-high { color: #1e8449; }
table { border-collapse: collapse; width: 100%; font-size: 0.9em; }
td, th { border: 1px solid #ddd; padding: 4px 8px; text-align: left; }
footer { margin-top: 2rem; font-size: 0.85em; color: #6b6f76; }
</style>
</head>
<body>
<h1>{{title}}</h1>
<p>{{intro}}</p>

{{#if error}}<div class="box error">{{error}}</div>{{/if}}

<form method="post" action="/predict">
<h2>1️⃣ Product Information</h2>
<label for="product">Product Code</label>
<select id="product" name="product">
{{#each products}}<option value="{{value}}"{{#if selected}} selected{{/if}}>{{label}}</option>
{{/each}}</select>
<span class="hint">Select the product code (SKU). If not listed, choose 'other' and enter it below.</span>
<label for="custom_product">Enter Product Code (when 'other')</label>
<input id="custom_product" name="custom_product" value="{{values.custom_product}}">

<label for="currency">Select the currency you are entering the price in:</label>
<select id="currency" name="currency">
{{#each currencies}}<option value="{{value}}"{{#if selected}} selected{{/if}}>{{label}}</option>
{{/each}}</select>
<label for="unit_price">Unit Price (per unit)</label>
<input id="unit_price" name="unit_price" type="number" min="0.01" step="0.01" value="{{values.unit_price}}">
<label for="exchange_rate">Current exchange rate: 1 GBP = ? (only for non-GBP prices)</label>
<input id="exchange_rate" name="exchange_rate" value="{{values.exchange_rate}}">
<span class="hint">For example, if 1 GBP = 350 PKR, enter 350.</span>

<h2>2️⃣ Transaction Details</h2>
<label for="country">Country of Sale</label>
<select id="country" name="country">
{{#each countries}}<option value="{{value}}"{{#if selected}} selected{{/if}}>{{label}}</option>
{{/each}}</select>
<label for="sale_date">Sale Date</label>
<input id="sale_date" name="sale_date" type="date" value="{{values.sale_date}}">
<label for="hour">Hour of Sale (0-23)</label>
<input id="hour" name="hour" type="number" min="0" max="23" value="{{values.hour}}">

<h2>3️⃣ Customer Information</h2>
<div class="radio">
{{#each customers}}<label><input type="radio" name="customer_type" value="{{value}}"{{#if selected}} checked{{/if}}> {{label}}</label>
{{/each}}</div>

<button type="submit">🔮 Predict Sales Quantity</button>
</form>

{{#if notice}}<div class="box {{notice.level}}">{{notice.message}}</div>{{/if}}

{{#if result}}
<h2>Predicted Sales Quantity</h2>
<div class="metric">{{result.quantity}}</div>
<div class="bar"><div style="width: {{result.percent}}%"></div></div>
<p><strong>Demand Level:</strong> <span class="badge-{{result.level}}">{{result.badge}}</span></p>
<div class="box success"><small>{{result.explanation}}</small></div>
<div class="box info">{{result.note}}</div>
<h3>Inputs Used for Prediction:</h3>
<table>
<tr>{{#each result.record}}<th>{{name}}</th>{{/each}}</tr>
<tr>{{#each result.record}}<td>{{value}}</td>{{/each}}</tr>
</table>
{{/if}}

<hr>
<h3>Tips for Best Results:</h3>
<ul>{{#each tips}}<li>{{this}}</li>{{/each}}</ul>
<details>
<summary>⚠️ Model Limitations &amp; Important Notes</summary>
<ul>{{#each limitations}}<li>{{this}}</li>{{/each}}</ul>
</details>
<footer>{{disclaimer}}</footer>
</body>
</html>
"#;

/// Raw form fields, exactly as submitted. Echoed back into the form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormSubmission {
    pub product: String,
    pub custom_product: String,
    pub currency: String,
    pub unit_price: String,
    pub exchange_rate: String,
    pub country: String,
    pub sale_date: String,
    pub hour: String,
    pub customer_type: String,
}

impl FormSubmission {
    /// The form as first shown.
    pub fn from_defaults(defaults: &FormDefaults) -> Self {
        let (product, custom_product) = if PRODUCT_CODES.contains(&defaults.product_code.as_str()) {
            (defaults.product_code.clone(), String::new())
        } else {
            (OTHER_CHOICE.to_string(), defaults.product_code.clone())
        };
        Self {
            product,
            custom_product,
            currency: defaults.currency.code().to_string(),
            unit_price: defaults.unit_price.to_string(),
            exchange_rate: String::new(),
            country: defaults.country.clone(),
            sale_date: defaults.sale_date.format("%Y-%m-%d").to_string(),
            hour: defaults.hour.to_string(),
            customer_type: defaults.customer_type.to_string().to_lowercase(),
        }
    }

    /// Parse the text fields into a [`SaleInput`].
    pub fn to_sale_input(&self) -> Result<SaleInput> {
        let unit_price = self.unit_price.trim().parse::<f64>().map_err(|_| {
            ForecastError::invalid_input(format!(
                "unit price must be a number, got '{}'",
                self.unit_price.trim()
            ))
        })?;
        let currency = self
            .currency
            .parse::<Currency>()
            .map_err(ForecastError::invalid_input)?;
        let sale_date = NaiveDate::parse_from_str(self.sale_date.trim(), "%Y-%m-%d").map_err(|_| {
            ForecastError::invalid_input(format!(
                "sale date must look like YYYY-MM-DD, got '{}'",
                self.sale_date.trim()
            ))
        })?;
        let hour = self.hour.trim().parse::<u32>().map_err(|_| {
            ForecastError::invalid_input(format!(
                "hour must be a whole number between 0 and 23, got '{}'",
                self.hour.trim()
            ))
        })?;
        let customer_type = self
            .customer_type
            .parse::<CustomerType>()
            .map_err(ForecastError::invalid_input)?;
        let exchange_rate = Some(self.exchange_rate.trim())
            .filter(|r| !r.is_empty())
            .map(str::to_string);

        let input = SaleInput {
            product_code: resolve_product_code(&self.product, &self.custom_product),
            unit_price,
            currency,
            exchange_rate,
            country: self.country.clone(),
            sale_date,
            hour,
            customer_type,
        };
        input.validate()?;
        Ok(input)
    }

    /// The exchange-rate notice for the echoed price and currency, if both
    /// parse. Lets a page that failed on another field still show it.
    pub fn price_notice(&self) -> Option<PriceNotice> {
        let price = self
            .unit_price
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite())?;
        let currency = self.currency.parse::<Currency>().ok()?;
        normalize_price(price, currency, Some(self.exchange_rate.as_str())).notice
    }
}

#[derive(Debug, Serialize)]
struct Choice {
    value: String,
    label: String,
    selected: bool,
}

impl Choice {
    fn new(value: &str, label: &str, current: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
            selected: value.eq_ignore_ascii_case(current.trim()),
        }
    }
}

#[derive(Debug, Serialize)]
struct NoticeView {
    level: &'static str,
    message: String,
}

impl From<&PriceNotice> for NoticeView {
    fn from(notice: &PriceNotice) -> Self {
        let level = match notice.level() {
            NoticeLevel::Success => "success",
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
        };
        Self {
            level,
            message: notice.message(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Cell {
    name: &'static str,
    value: String,
}

#[derive(Debug, Serialize)]
struct ResultView {
    quantity: String,
    percent: String,
    level: &'static str,
    badge: &'static str,
    explanation: String,
    note: &'static str,
    record: Vec<Cell>,
}

impl From<&Forecast> for ResultView {
    fn from(forecast: &Forecast) -> Self {
        let demand: DemandLevel = forecast.demand;
        Self {
            quantity: presentation::format_quantity(forecast.quantity),
            percent: format!("{:.0}", forecast.progress * 100.0),
            level: demand.as_str(),
            badge: demand.badge(),
            explanation: presentation::explanation(forecast.quantity),
            note: presentation::DEFAULTS_NOTE,
            record: forecast
                .record
                .columns()
                .into_iter()
                .map(|(name, value)| Cell {
                    name,
                    value: value.to_string(),
                })
                .collect(),
        }
    }
}

/// Everything the page template renders.
#[derive(Debug, Serialize)]
pub struct PageContext {
    title: &'static str,
    intro: &'static str,
    values: FormSubmission,
    products: Vec<Choice>,
    currencies: Vec<Choice>,
    countries: Vec<Choice>,
    customers: Vec<Choice>,
    error: Option<String>,
    notice: Option<NoticeView>,
    result: Option<ResultView>,
    tips: &'static [&'static str],
    limitations: &'static [&'static str],
    disclaimer: &'static str,
}

impl PageContext {
    /// The form filled with `values`, nothing predicted yet.
    pub fn form(values: FormSubmission) -> Self {
        let products = PRODUCT_CODES
            .iter()
            .chain(std::iter::once(&OTHER_CHOICE))
            .map(|code| Choice::new(code, code, &values.product))
            .collect();
        let currencies = Currency::ALL
            .iter()
            .map(|c| Choice::new(c.code(), c.label(), &values.currency))
            .collect();
        let countries = COUNTRIES
            .iter()
            .map(|c| Choice::new(c, c, &values.country))
            .collect();
        let customers = CustomerType::ALL
            .iter()
            .map(|c| Choice::new(&c.label().to_lowercase(), c.label(), &values.customer_type))
            .collect();
        Self {
            title: presentation::APP_TITLE,
            intro: presentation::INTRO,
            values,
            products,
            currencies,
            countries,
            customers,
            error: None,
            notice: None,
            result: None,
            tips: &presentation::TIPS,
            limitations: &presentation::LIMITATIONS,
            disclaimer: presentation::DISCLAIMER,
        }
    }

    /// The form plus a prediction.
    pub fn with_forecast(values: FormSubmission, forecast: &Forecast) -> Self {
        let mut page = Self::form(values);
        page.notice = forecast.notice.as_ref().map(NoticeView::from);
        page.result = Some(ResultView::from(forecast));
        page
    }

    /// The form plus an error message.
    pub fn with_error(values: FormSubmission, error: impl Into<String>) -> Self {
        let notice = values.price_notice();
        let mut page = Self::form(values);
        page.notice = notice.as_ref().map(NoticeView::from);
        page.error = Some(error.into());
        page
    }
}

/// Compiled page templates.
pub struct PageRenderer {
    registry: Handlebars<'static>,
}

impl std::fmt::Debug for PageRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageRenderer").finish_non_exhaustive()
    }
}

impl PageRenderer {
    pub fn new() -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(false);
        registry
            .register_template_string(PAGE_TEMPLATE_NAME, PAGE_TEMPLATE)
            .map_err(|e| ForecastError::render(format!("Template compile error: {}", e)))?;
        Ok(Self { registry })
    }

    pub fn render(&self, page: &PageContext) -> Result<String> {
        self.registry
            .render(PAGE_TEMPLATE_NAME, page)
            .map_err(|e| ForecastError::render(format!("Template render error: {}", e)))
    }
}
