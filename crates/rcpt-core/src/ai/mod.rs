//! AI-backed item extraction.
//!
//! A language model is asked for a JSON array of `{name, price}` objects.
//! The transport lives behind [`ItemModel`]; this module owns the prompt and
//! the response handling so both can be tested without a network.

#[cfg(feature = "ai")]
mod openai;

#[cfg(feature = "ai")]
pub use openai::OpenAiItemModel;

use std::future::Future;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::error::AiError;
use crate::models::receipt::LineItem;
use crate::receipt::rules::{accept_price, clean_item_name, parse_price, to_money};

/// A model that answers a prompt with raw text.
pub trait ItemModel {
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String, AiError>> + Send;
}

/// Build the extraction prompt for a receipt's text.
pub fn build_prompt(receipt_text: &str) -> String {
    format!(
        "Extract the purchased line items from the following receipt text.\n\
         Ignore subtotal, tax, tip, discount and total lines.\n\n\
         {receipt_text}\n\n\
         Return only a JSON array in this format:\n\
         [{{\"name\": \"\", \"price\": 0.00}}]"
    )
}

/// Remove a surrounding Markdown code fence (```` ``` ```` or ```` ```json ````).
pub fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string (`json`) on the opening fence line.
    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };

    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

#[derive(Debug, Deserialize)]
struct ModelItem {
    name: String,
    price: ModelPrice,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ModelPrice {
    Number(serde_json::Number),
    Text(String),
}

impl ModelPrice {
    fn to_amount(&self) -> Decimal {
        match self {
            ModelPrice::Number(n) => Decimal::from_str(&n.to_string())
                .or_else(|_| Decimal::from_scientific(&n.to_string()))
                .map(to_money)
                .unwrap_or(Decimal::ZERO),
            // Plain numbers are taken at face value; anything else goes
            // through the OCR price heuristics.
            ModelPrice::Text(s) => Decimal::from_str(s.trim())
                .map(to_money)
                .unwrap_or_else(|_| parse_price(s)),
        }
    }
}

/// Parse a model response into line items.
///
/// The response must be a JSON array of `{name, price}` objects, optionally
/// wrapped in a code fence. Names are cleaned and items outside the price
/// sanity range are dropped, as for rule-based extraction.
pub fn parse_model_items(response: &str) -> Result<Vec<LineItem>, AiError> {
    let body = strip_code_fence(response);

    let raw: Vec<ModelItem> =
        serde_json::from_str(body).map_err(|e| AiError::InvalidResponse(e.to_string()))?;

    let total = raw.len();
    let items: Vec<LineItem> = raw
        .into_iter()
        .filter_map(|item| {
            let name = clean_item_name(&item.name);
            let price = item.price.to_amount();
            (!name.is_empty() && accept_price(price)).then(|| LineItem::new(name, price))
        })
        .collect();

    debug!("Model returned {} items, kept {}", total, items.len());
    Ok(items)
}

/// Ask `model` for the items in `receipt_text`.
pub async fn extract_items_via_model<M: ItemModel>(
    model: &M,
    receipt_text: &str,
) -> Result<Vec<LineItem>, AiError> {
    let response = model.complete(&build_prompt(receipt_text)).await?;
    parse_model_items(&response)
}
