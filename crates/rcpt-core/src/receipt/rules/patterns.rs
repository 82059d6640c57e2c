//! Common regex patterns for receipt extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Store
    pub static ref STORE_NAME: Regex = Regex::new(
        r"(?im)\b(?:shop|store)[ \t]*name[ \t]*:[ \t]*(.*)$"
    ).unwrap();

    // Dates, tried in this order
    pub static ref DATE_MDY: Regex = Regex::new(
        r"\b(\d{1,2}/\d{1,2}/\d{4})\b"
    ).unwrap();

    pub static ref DATE_ISO: Regex = Regex::new(
        r"\b(\d{4}-\d{1,2}-\d{1,2})\b"
    ).unwrap();

    // Line items: name, a gap of two or more spaces, trailing price
    pub static ref ITEM_GAP_LINE: Regex = Regex::new(
        r"^(.+?)\s{2,}(-?[$€£¥₹]?\s?-?\d[\d,.]*)\s*$"
    ).unwrap();

    // Line items: name, any whitespace, trailing price
    pub static ref ITEM_SPACE_LINE: Regex = Regex::new(
        r"^(.+?)\s+(-?[$€£¥₹]?\s?-?\d[\d,.]*)\s*$"
    ).unwrap();

    // Line items across line boundaries: text then an optionally
    // currency-prefixed decimal
    pub static ref ITEM_SCAN: Regex = Regex::new(
        r"([A-Za-z][^\n\d$€£¥₹]*?)[ \t]*[$€£¥₹]?(\d[\d,]*\.\d{2})"
    ).unwrap();

    // Words removed from item names
    pub static ref NAME_NOISE: Regex = Regex::new(
        r"(?i)\b(?:price|total|tax)\b"
    ).unwrap();

    // Lines that belong to summary fields or payment and staff details,
    // never to items
    pub static ref SUMMARY_LINE: Regex = Regex::new(
        r"(?i)\b(?:sub[ \t]*total|total|tax(?:es)?|fees?|discounts?|credits?|coupons?|promo(?:tion)?s?|rebates?|offers?|tips?|gratuity|change|cash|balance|amount[ \t]+due|cashier|clerk|server|register|terminal|lane|trans(?:action)?|auth(?:orization)?|visa|mastercard|amex|debit)\b"
    ).unwrap();

    // Amount tokens. The trailing group flags percentages.
    pub static ref DECIMAL_AMOUNT: Regex = Regex::new(
        r"(\d[\d,]*\.\d{2})\d*([ \t]?%)?"
    ).unwrap();

    pub static ref LOOSE_AMOUNT: Regex = Regex::new(
        r"(\d[\d,.]*)([ \t]?%)?"
    ).unwrap();

    // Field labels
    pub static ref TOTAL_LABEL: Regex = Regex::new(
        r"(?i)\btotal\b"
    ).unwrap();

    pub static ref TAX_LABEL: Regex = Regex::new(
        r"(?i)\b(?:tax(?:es)?|fees?)\b"
    ).unwrap();

    pub static ref DISCOUNT_LABEL: Regex = Regex::new(
        r"(?i)\b(?:discounts?|credits?|coupons?|promotions?|rebates?|offers?)\b"
    ).unwrap();

    pub static ref CREDIT_CARD: Regex = Regex::new(
        r"(?i)\bcredit[ \t]+card\b"
    ).unwrap();

    pub static ref TIP_LABEL: Regex = Regex::new(
        r"(?i)\b(?:tips?|gratuity)\b"
    ).unwrap();
}
