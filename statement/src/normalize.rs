//! Приведение дат и сумм к виду, в котором они печатаются в выписке.
//!
//! Все функции тотальные: если значение не удалось разобрать, оно уходит в документ как есть.

use chrono::{Datelike, NaiveDate};
use lazy_regex::regex_find;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::FieldValue;

static SLASH_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    // DD/MM/YYYY
    Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").unwrap()
});

static MONTH_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    // DD-Mon-YY
    Regex::new(r"^(\d{1,2})-([A-Za-z]{3})-(\d{2})$").unwrap()
});

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Результат нормализации вместе с признаком того, что значение действительно разобрано.
///
/// `applied == false` означает, что `value` - исходная строка без изменений.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub value: String,
    pub applied: bool,
}

impl Normalized {
    fn parsed(value: String) -> Self {
        Normalized { value, applied: true }
    }

    fn passthrough(raw: &str) -> Self {
        Normalized {
            value: raw.to_string(),
            applied: false,
        }
    }
}

/// Дата в виде `1 Apr 2025`; нераспознанный ввод возвращается без изменений
pub fn normalize_date(input: &str) -> String {
    try_normalize_date(input).value
}

/// Как [`normalize_date`], но с признаком того, распознана ли дата
pub fn try_normalize_date(input: &str) -> Normalized {
    match parse_statement_date(input.trim()) {
        Some(date) => Normalized::parsed(format_display_date(date)),
        None => Normalized::passthrough(input),
    }
}

/// Печатный вид даты: день без ведущего нуля, английское сокращение месяца, год
pub fn format_display_date(date: NaiveDate) -> String {
    let month = MONTHS[date.month0() as usize];
    format!("{} {month} {}", date.day(), date.year())
}

fn parse_statement_date(s: &str) -> Option<NaiveDate> {
    if let Some(caps) = SLASH_DATE_RE.captures(s) {
        let day: u32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let year: i32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(caps) = MONTH_DATE_RE.captures(s) {
        let day: u32 = caps[1].parse().ok()?;
        let month = month_from_abbrev(&caps[2])?;
        // двузначный год всегда 20YY
        let year: i32 = format!("20{}", &caps[3]).parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    None
}

fn month_from_abbrev(raw: &str) -> Option<u32> {
    MONTHS
        .iter()
        .position(|m| m.eq_ignore_ascii_case(raw))
        .map(|idx| idx as u32 + 1)
}

/// Сумма с двумя знаками после точки и индийской группировкой разрядов (`12,34,567.89`).
///
/// Числа возвращаются как есть, строки с запятой считаются уже отформатированными,
/// строки без числа в начале не меняются.
pub fn normalize_currency(input: &FieldValue) -> String {
    try_normalize_currency(input).value
}

/// Как [`normalize_currency`], но с признаком того, распознана ли сумма
pub fn try_normalize_currency(input: &FieldValue) -> Normalized {
    match input {
        FieldValue::Empty => Normalized::passthrough(""),
        FieldValue::Number(v) => Normalized::passthrough(&v.to_string()),
        FieldValue::Text(s) => try_normalize_text_currency(s),
    }
}

/// Текстовая ветка [`normalize_currency`] с признаком, распознана ли сумма
pub fn try_normalize_text_currency(input: &str) -> Normalized {
    if input.contains(',') {
        return Normalized::passthrough(input);
    }

    // как parseFloat: берём числовой префикс, хвост игнорируем
    let Some(prefix) = regex_find!(r"^\s*[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?", input) else {
        return Normalized::passthrough(input);
    };

    match prefix.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Normalized::parsed(format_grouped_amount(value)),
        _ => Normalized::passthrough(input),
    }
}

/// Форматирует число с двумя знаками и группировкой 3-2-2
pub fn format_grouped_amount(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let grouped = group_south_asian(int_part);
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };

    format!("{sign}{grouped}.{frac_part}")
}

/// Расставляет запятые: последние три цифры, дальше пары
fn group_south_asian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{tail}", groups.join(","))
}

/// Признак номинации: `true`/`yes` -> `Yes`, `false`/`no` -> `No`, остальное как есть
pub fn normalize_flag(input: &str) -> String {
    match input.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => "Yes".to_string(),
        "false" | "no" | "n" | "0" => "No".to_string(),
        _ => input.to_string(),
    }
}

/// Ставка: к голому числу дописывается `%`
pub fn normalize_rate(input: &str) -> String {
    let trimmed = input.trim();
    if !trimmed.is_empty() && trimmed.parse::<f64>().is_ok() {
        format!("{trimmed}%")
    } else {
        input.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_slash_dates() {
        assert_eq!(normalize_date("25/06/2023"), "25 Jun 2023");
        assert_eq!(normalize_date("01/04/2025"), "1 Apr 2025");
        assert_eq!(normalize_date("1/4/2025"), "1 Apr 2025");
    }

    #[test]
    fn formats_month_abbrev_dates_with_two_digit_year() {
        assert_eq!(normalize_date("25-Jun-23"), "25 Jun 2023");
        assert_eq!(normalize_date("05-DEC-99"), "5 Dec 2099");
        assert_eq!(normalize_date("01-jan-00"), "1 Jan 2000");
    }

    #[test]
    fn unknown_date_shapes_pass_through() {
        assert_eq!(normalize_date("not-a-date"), "not-a-date");
        assert_eq!(normalize_date("25 Jun 2023"), "25 Jun 2023");
        assert_eq!(normalize_date("2023-06-25"), "2023-06-25");
        assert_eq!(normalize_date(""), "");

        let result = try_normalize_date("not-a-date");
        assert!(!result.applied);
    }

    #[test]
    fn invalid_calendar_dates_pass_through() {
        let result = try_normalize_date("31/02/2023");
        assert!(!result.applied);
        assert_eq!(result.value, "31/02/2023");

        assert_eq!(normalize_date("30-Feb-24"), "30-Feb-24");
        assert_eq!(normalize_date("12-Foo-24"), "12-Foo-24");
    }

    #[test]
    fn formats_plain_amounts() {
        assert_eq!(normalize_currency(&"46".into()), "46.00");
        assert_eq!(normalize_currency(&"1234567.5".into()), "12,34,567.50");
        assert_eq!(normalize_currency(&"6685.21".into()), "6,685.21");
        assert_eq!(normalize_currency(&"0".into()), "0.00");
        assert_eq!(normalize_currency(&"123456789.129".into()), "12,34,56,789.13");
    }

    #[test]
    fn pre_grouped_amounts_pass_through() {
        let result = try_normalize_text_currency("6,685.21");
        assert!(!result.applied);
        assert_eq!(result.value, "6,685.21");
    }

    #[test]
    fn non_numeric_amounts_pass_through() {
        assert_eq!(normalize_currency(&"abc".into()), "abc");
        assert_eq!(normalize_currency(&"".into()), "");
        assert!(!try_normalize_text_currency("Rs. 10").applied);
    }

    #[test]
    fn numeric_prefix_is_used_like_parse_float() {
        assert_eq!(normalize_currency(&"46 Cr".into()), "46.00");
        assert_eq!(normalize_currency(&" 12.5".into()), "12.50");
        assert_eq!(normalize_currency(&".5".into()), "0.50");
    }

    #[test]
    fn negative_amounts_keep_sign() {
        assert_eq!(normalize_currency(&"-1234567".into()), "-12,34,567.00");
        assert_eq!(format_grouped_amount(-0.001), "0.00");
    }

    #[test]
    fn numbers_are_returned_unchanged() {
        assert_eq!(normalize_currency(&FieldValue::Number(46.0)), "46");
        assert_eq!(normalize_currency(&FieldValue::Number(6685.21)), "6685.21");
        assert_eq!(normalize_currency(&FieldValue::Empty), "");
    }

    #[test]
    fn currency_entry_point_reports_fallback() {
        let parsed = try_normalize_currency(&FieldValue::from("46"));
        assert_eq!(parsed, Normalized { value: "46.00".into(), applied: true });

        let kept = try_normalize_currency(&FieldValue::Number(6685.21));
        assert_eq!(kept, Normalized { value: "6685.21".into(), applied: false });

        let text = try_normalize_currency(&FieldValue::from("N/A"));
        assert!(!text.applied);
        assert_eq!(text.value, normalize_currency(&FieldValue::from("N/A")));

        assert_eq!(try_normalize_currency(&FieldValue::Empty).value, "");
    }

    #[test]
    fn groups_digits_three_then_two() {
        assert_eq!(group_south_asian("1"), "1");
        assert_eq!(group_south_asian("999"), "999");
        assert_eq!(group_south_asian("1000"), "1,000");
        assert_eq!(group_south_asian("100000"), "1,00,000");
        assert_eq!(group_south_asian("10000000"), "1,00,00,000");
    }

    #[test]
    fn flags_and_rates() {
        assert_eq!(normalize_flag("true"), "Yes");
        assert_eq!(normalize_flag("N"), "No");
        assert_eq!(normalize_flag("Registered"), "Registered");
        assert_eq!(normalize_rate("2.7"), "2.7%");
        assert_eq!(normalize_rate("2.70 %"), "2.70 %");
        assert_eq!(normalize_rate(""), "");
    }
}
