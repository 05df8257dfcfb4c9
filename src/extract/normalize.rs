use std::sync::LazyLock;

use regex::Regex;

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d(?:[\d.,\u{a0} ]*\d)?").unwrap());
static PRICE_AFTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d(?:[\d.,\u{a0} ]*\d)?)\s*(?:€|eur\b|euros?\b)").unwrap()
});
static PRICE_BEFORE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:€|eur\b)\s*(\d(?:[\d.,\u{a0} ]*\d)?)").unwrap());
static AREA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d(?:[\d.,]*\d)?)\s*m(?:²|2\b)").unwrap());
static BARE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d(?:[\d.,\u{a0} ]*\d)?$").unwrap());
static TYPOLOGY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[TtVv](\d{1,2})\b").unwrap());
static COUNT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

const ROOM_WORDS: &[&str] = &["quarto", "room", "bedroom", "dormitório", "assoalhada"];
const BATH_WORDS: &[&str] = &["casa de banho", "casas de banho", "wc", "bath", "banheiro"];

/// Turn a locale-formatted number ("250.000", "1.250.000,50", "85,5") into f64.
pub fn parse_decimal(text: &str) -> Option<f64> {
    let m = NUMBER_RE.find(text)?;
    normalize_number(m.as_str()).parse().ok()
}

fn normalize_number(raw: &str) -> String {
    let s: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
        .collect();
    let s = s.trim_end_matches(['.', ',']);

    match (s.rfind('.'), s.rfind(',')) {
        (Some(dot), Some(comma)) if dot > comma => s.replace(',', ""),
        (Some(_), Some(_)) => s.replace('.', "").replace(',', "."),
        (Some(_), None) => single_separator(s, '.'),
        (None, Some(_)) => single_separator(s, ','),
        (None, None) => s.to_string(),
    }
}

// One kind of separator: thousands if it splits off groups of three digits.
fn single_separator(s: &str, sep: char) -> String {
    let parts: Vec<&str> = s.split(sep).collect();
    let grouped = parts.len() > 2
        || (parts[0].len() <= 3 && !parts[0].is_empty() && parts[1].len() == 3);
    if grouped {
        s.replace(sep, "")
    } else {
        s.replace(sep, ".")
    }
}

/// Price from text, preferring a currency-adjacent number.
pub fn parse_price(text: &str) -> Option<f64> {
    let m = PRICE_AFTER_RE
        .captures(text)
        .or_else(|| PRICE_BEFORE_RE.captures(text))
        .map(|c| c[1].to_string());
    match m {
        Some(n) => parse_decimal(&n),
        None => parse_decimal(text),
    }
    .filter(|p| *p > 0.0)
}

/// Price only when the text carries a currency marker.
pub fn find_price(text: &str) -> Option<f64> {
    let caps = PRICE_AFTER_RE
        .captures(text)
        .or_else(|| PRICE_BEFORE_RE.captures(text))?;
    parse_decimal(&caps[1]).filter(|p| *p > 0.0)
}

/// Area in m² from "85 m²" style text, or from a bare number.
pub fn parse_area(text: &str) -> Option<f64> {
    let text = text.trim();
    if let Some(caps) = AREA_RE.captures(text) {
        return parse_decimal(&caps[1]).filter(|a| *a > 0.0);
    }
    if BARE_NUMBER_RE.is_match(text) {
        return parse_decimal(text).filter(|a| *a > 0.0);
    }
    None
}

/// Area only when the text carries an m² unit.
pub fn find_area(text: &str) -> Option<f64> {
    let caps = AREA_RE.captures(text)?;
    parse_decimal(&caps[1]).filter(|a| *a > 0.0)
}

/// Room count from "T2", "3 quartos" or a bare number.
pub fn parse_rooms(text: &str) -> Option<u32> {
    if let Some(caps) = TYPOLOGY_RE.captures(text) {
        return caps[1].parse().ok();
    }
    counted(text, ROOM_WORDS)
}

/// Portuguese typology ("T2", "V3") only.
pub fn find_typology(text: &str) -> Option<u32> {
    TYPOLOGY_RE.captures(text)?[1].parse().ok()
}

pub fn parse_bathrooms(text: &str) -> Option<u32> {
    counted(text, BATH_WORDS)
}

fn counted(text: &str, words: &[&str]) -> Option<u32> {
    let text = text.trim();
    let lower = text.to_lowercase();
    if BARE_NUMBER_RE.is_match(text) || words.iter().any(|w| lower.contains(w)) {
        return COUNT_RE.find(text)?.as_str().parse().ok();
    }
    None
}

/// Collapse runs of whitespace into single spaces.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimals() {
        assert_eq!(parse_decimal("250.000 €"), Some(250_000.0));
        assert_eq!(parse_decimal("1.250.000,50 €"), Some(1_250_000.5));
        assert_eq!(parse_decimal("€ 1,250,000.50"), Some(1_250_000.5));
        assert_eq!(parse_decimal("85,5"), Some(85.5));
        assert_eq!(parse_decimal("120.5"), Some(120.5));
        assert_eq!(parse_decimal("250 000"), Some(250_000.0));
        assert_eq!(parse_decimal("250\u{a0}000€"), Some(250_000.0));
        assert_eq!(parse_decimal("sem preço"), None);
    }

    #[test]
    fn prices() {
        assert_eq!(parse_price("Preço: 350.000 €"), Some(350_000.0));
        assert_eq!(parse_price("EUR 99.500"), Some(99_500.0));
        assert_eq!(parse_price("Ref 12 - 180.000€"), Some(180_000.0));
        assert_eq!(parse_price("0 €"), None);
        assert_eq!(find_price("Apartamento T2 com 3 varandas"), None);
    }

    #[test]
    fn areas() {
        assert_eq!(parse_area("85 m² área bruta"), Some(85.0));
        assert_eq!(parse_area("120,5m2"), Some(120.5));
        assert_eq!(parse_area("100"), Some(100.0));
        assert_eq!(parse_area("3 quartos"), None);
        assert_eq!(find_area("T2 com 90 m² em Lisboa"), Some(90.0));
    }

    #[test]
    fn counts() {
        assert_eq!(parse_rooms("T2"), Some(2));
        assert_eq!(parse_rooms("Moradia V4"), Some(4));
        assert_eq!(parse_rooms("3 quartos"), Some(3));
        assert_eq!(parse_rooms("2"), Some(2));
        assert_eq!(parse_rooms("100 m²"), None);
        assert_eq!(parse_bathrooms("2 casas de banho"), Some(2));
        assert_eq!(parse_bathrooms("1 WC"), Some(1));
        assert_eq!(parse_bathrooms("3 quartos"), None);
        assert_eq!(find_typology("Apartamento T3 em Faro"), Some(3));
        assert_eq!(find_typology("Tipo 3"), None);
    }

    #[test]
    fn whitespace() {
        assert_eq!(clean_text("  Vista\n   mar \t"), "Vista mar");
    }
}
