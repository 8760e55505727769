use concat_string::concat_string;

const TEMPLATE_PLACEHOLDER: &str = "%s";

/// 依序以 `args` 取代模板中的 `%s`
///
/// 多出的 `%s` 會原樣保留，多出的參數則被忽略。
///
/// # Example
///
/// ```ignore
/// let url = fill_template("https://host/stock?symbol=%s&token=%s", &["AAPL", "demo"]);
/// assert_eq!(url, "https://host/stock?symbol=AAPL&token=demo");
/// ```
pub fn fill_template(template: &str, args: &[&str]) -> String {
    let mut result = String::with_capacity(template.len() + args.iter().map(|a| a.len()).sum::<usize>());
    let mut rest = template;
    let mut args = args.iter();

    while let Some(pos) = rest.find(TEMPLATE_PLACEHOLDER) {
        let Some(arg) = args.next() else {
            break;
        };
        result.push_str(&rest[..pos]);
        result.push_str(arg);
        rest = &rest[pos + TEMPLATE_PLACEHOLDER.len()..];
    }

    result.push_str(rest);
    result
}

/// 將逗號分隔的代碼轉成大寫清單，去除空白、空項目與重複項目，保留原本順序
pub fn split_codes(s: &str) -> Vec<String> {
    let mut codes: Vec<String> = Vec::new();

    for code in s.split(',') {
        let code = code.trim().to_uppercase();
        if code.is_empty() || codes.contains(&code) {
            continue;
        }
        codes.push(code);
    }

    codes
}

/// 遮蔽字串中出現的 secret，避免寫入日誌
pub fn mask_secret(s: &str, secret: &str) -> String {
    if secret.is_empty() {
        return s.to_string();
    }

    let visible: String = secret.chars().take(2).collect();
    let mask = concat_string!(visible, "***");
    s.replace(secret, &mask)
}
