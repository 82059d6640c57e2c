//! Store name extraction.

use tracing::debug;

use crate::models::receipt::UNKNOWN_STORE;

use super::patterns::STORE_NAME;

/// Extract the text after `Store Name:` or `Shop Name:`, or
/// [`UNKNOWN_STORE`].
pub fn extract_store(text: &str) -> String {
    STORE_NAME
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| {
            debug!("No store name label found");
            UNKNOWN_STORE.to_string()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_label() {
        assert_eq!(extract_store("Store Name: Corner Market\nMilk 3.99"), "Corner Market");
        assert_eq!(extract_store("SHOP NAME:   Joe's Deli  "), "Joe's Deli");
        assert_eq!(extract_store("store name:Fresh Co"), "Fresh Co");
    }

    #[test]
    fn test_unknown_store() {
        assert_eq!(extract_store("WALMART\nMilk 3.99"), "Unknown Store");
        assert_eq!(extract_store("Store Name:   \nMilk"), "Unknown Store");
        assert_eq!(extract_store(""), "Unknown Store");
    }
}
