use crate::{config::Upstream, util::text};

/// 要求報價來源以遞減順序排列，遞增使用 "asc"
pub const SORT_ORDER: &str = "desc";
/// 排序欄位，可用 symbol、name 或 list_order
pub const SORT_BY: &str = "symbol";
/// 輸出格式，可用 json 或 csv
pub const OUTPUT: &str = "json";

/// Returns the upstream URL for `symbol`.
///
/// Any non-empty `sort_order` selects `url_with_sorting`, filled with the
/// symbol, the API token and the fixed [`SORT_ORDER`]. The caller's
/// `sort_order`, `sort_by` and `output` values are never substituted, so
/// `url_with_sorting_and_output` is not reachable. Without a sort order only
/// the symbol is put into `url`.
pub fn trading_url(
    upstream: &Upstream,
    symbol: &str,
    sort_order: &str,
    sort_by: &str,
    output: &str,
) -> String {
    match (sort_order.is_empty(), sort_by.is_empty(), output.is_empty()) {
        (false, _, _) => text::fill_template(
            &upstream.url_with_sorting,
            &[symbol, &upstream.api_token, SORT_ORDER],
        ),
        _ => text::fill_template(&upstream.url, &[symbol]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upstream() -> Upstream {
        Upstream {
            url: "https://host/stock?symbol=%s".to_string(),
            url_with_sorting: "https://host/stock?symbol=%s&api_token=%s&sort_order=%s"
                .to_string(),
            url_with_sorting_and_output:
                "https://host/stock?symbol=%s&api_token=%s&sort_by=%s&output=%s".to_string(),
            api_token: "demo".to_string(),
        }
    }

    #[test]
    fn test_sorting_template() {
        assert_eq!(
            trading_url(&upstream(), "AAPL", SORT_ORDER, SORT_BY, OUTPUT),
            "https://host/stock?symbol=AAPL&api_token=demo&sort_order=desc"
        );
    }

    #[test]
    fn test_caller_sort_order_is_not_substituted() {
        assert_eq!(
            trading_url(&upstream(), "AAPL", "asc", "", ""),
            "https://host/stock?symbol=AAPL&api_token=demo&sort_order=desc"
        );
    }

    #[test]
    fn test_output_template_is_unreachable() {
        let url = trading_url(&upstream(), "NOG,AAPL", "desc", "name", "csv");
        assert!(!url.contains("output="));
        assert!(!url.contains("sort_by="));
    }

    #[test]
    fn test_base_template_without_sort_order() {
        assert_eq!(
            trading_url(&upstream(), "AAPL", "", SORT_BY, OUTPUT),
            "https://host/stock?symbol=AAPL"
        );
        assert_eq!(
            trading_url(&upstream(), "AAPL", "", "", ""),
            "https://host/stock?symbol=AAPL"
        );
    }
}
