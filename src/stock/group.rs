use crate::{
    declare::{Stock, StockData},
    stock::envelope::TradingData,
};

/// Partitions `records` by the requested exchange codes.
///
/// One group is produced per code, in request order, holding every record
/// whose `stock_exchange_short` equals the code ignoring case. Codes without
/// any match produce no group.
pub fn group_by_exchange(records: &[TradingData], stock_exchanges: &[String]) -> Vec<StockData> {
    stock_exchanges
        .iter()
        .filter_map(|exchange| {
            let exchange = exchange.to_uppercase();
            let stocks: Vec<Stock> = records
                .iter()
                .filter(|d| d.stock_exchange_short.to_uppercase() == exchange)
                .map(Stock::from)
                .collect();

            if stocks.is_empty() {
                return None;
            }

            Some(StockData {
                stock_exchange: exchange,
                stocks,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(symbol: &str, exchange: &str) -> TradingData {
        TradingData {
            symbol: symbol.to_string(),
            name: format!("{} Inc.", symbol),
            price: "10.00".to_string(),
            day_high: "11.00".to_string(),
            stock_exchange_short: exchange.to_string(),
            ..Default::default()
        }
    }

    fn codes(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_group_in_request_order() {
        let records = vec![
            record("AAPL", "NASDAQ"),
            record("NOG", "AMEX"),
            record("MSFT", "NASDAQ"),
        ];

        let groups = group_by_exchange(&records, &codes(&["AMEX", "NASDAQ"]));
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].stock_exchange, "AMEX");
        assert_eq!(groups[0].stocks.len(), 1);
        assert_eq!(groups[0].stocks[0].symbol, "NOG");
        assert_eq!(groups[1].stock_exchange, "NASDAQ");
        assert_eq!(
            groups[1]
                .stocks
                .iter()
                .map(|s| s.symbol.as_str())
                .collect::<Vec<_>>(),
            vec!["AAPL", "MSFT"]
        );
    }

    #[test]
    fn test_case_insensitive() {
        let records = vec![record("NOG", "Amex")];

        let lower = group_by_exchange(&records, &codes(&["amex"]));
        let upper = group_by_exchange(&records, &codes(&["AMEX"]));
        assert_eq!(lower, upper);
        assert_eq!(lower[0].stock_exchange, "AMEX");
    }

    #[test]
    fn test_empty_groups_are_dropped() {
        let records = vec![record("AAPL", "NASDAQ")];

        let groups = group_by_exchange(&records, &codes(&["NYSE", "NASDAQ", "AMEX"]));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].stock_exchange, "NASDAQ");

        assert!(group_by_exchange(&records, &codes(&["NYSE"])).is_empty());
        assert!(group_by_exchange(&[], &codes(&["NASDAQ"])).is_empty());
    }

    #[test]
    fn test_projection() {
        let records = vec![record("AAPL", "NASDAQ")];

        let groups = group_by_exchange(&records, &codes(&["NASDAQ"]));
        assert_eq!(
            groups[0].stocks[0],
            Stock {
                symbol: "AAPL".to_string(),
                name: "AAPL Inc.".to_string(),
                price: "10.00".to_string(),
                ..Default::default()
            }
        );
    }
}
