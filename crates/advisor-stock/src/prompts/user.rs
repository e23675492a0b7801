//! User message builders

/// Question asked when resolving a company name
pub fn ticker_question(company_name: &str) -> String {
    format!("What is the stock ticker symbol for {company_name}?")
}

/// Price summary handed to the recommendation model
///
/// Prices keep a fractional part even when integral ("130.0", not "130").
pub fn recommendation_request(ticker: &str, current_price: f64, target_price: f64) -> String {
    format!("Ticker: {ticker}, Current price: {current_price:?}, Target price: {target_price:?}.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommendation_request() {
        assert_eq!(
            recommendation_request("NVDA", 100.5, 130.0),
            "Ticker: NVDA, Current price: 100.5, Target price: 130.0."
        );
        assert_eq!(
            recommendation_request("AAPL", 200.0, 190.0),
            "Ticker: AAPL, Current price: 200.0, Target price: 190.0."
        );
    }
}
