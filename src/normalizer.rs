use crate::config::ProductConfig;
use crate::model::Product;

/// Canonical lookup key for a product name: trimmed and lowercased.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

pub fn normalize_all(products: &[ProductConfig]) -> Vec<Product> {
    products
        .iter()
        .map(|p| {
            let url = p
                .url
                .as_deref()
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(str::to_string);
            Product::new(p.name.clone(), url)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_urls_are_dropped() {
        let configs = vec![
            ProductConfig {
                name: "Kettle".into(),
                url: Some("   ".into()),
            },
            ProductConfig {
                name: "Toaster ".into(),
                url: Some(" https://www.amazon.in/dp/B0 ".into()),
            },
        ];
        let products = normalize_all(&configs);
        assert_eq!(products[0].url, None);
        assert_eq!(products[1].url.as_deref(), Some("https://www.amazon.in/dp/B0"));
        assert_eq!(products[1].normalized_key, "toaster");
    }
}
