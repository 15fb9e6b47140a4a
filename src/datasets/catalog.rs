//! Tracked market-data products

/// Preprocessed spot/swap dataset, always listed first
pub const PINNED_PRODUCT: &str = "coin-binance-spot-swap-preprocess-pkl-1h";

/// Products the backend downloads directly
pub const PRODUCTS: [&str; 3] = [
    "coin-binance-swap-candle-csv-1h",
    "coin-binance-candle-csv-1h",
    "coin-cap",
];

/// Placeholder shown when a value is missing
pub const UNAVAILABLE: &str = "unavailable";

/// Known display name for a product
pub fn display_name(product_name: &str) -> Option<&'static str> {
    match product_name {
        "coin-binance-swap-candle-csv-1h" => Some("Perpetual swap 1h candles (by pair)"),
        "coin-binance-candle-csv-1h" => Some("Spot 1h candles (by pair)"),
        "coin-binance-spot-swap-preprocess-pkl-1h" => Some("Preprocessed spot/swap data"),
        "coin-cap" => Some("Market cap (Binance pairs)"),
        _ => None,
    }
}

/// Whether the product is one the backend tracks
pub fn is_known(product_name: &str) -> bool {
    product_name == PINNED_PRODUCT || PRODUCTS.contains(&product_name)
}
