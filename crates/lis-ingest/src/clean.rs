use std::collections::BTreeMap;

/// Trims, strips a byte-order mark and collapses inner whitespace.
pub fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

pub fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Cleans a raw header row and makes every name unique.
///
/// Blank names become `Unnamed: <index>`; repeats get `.1`, `.2`, ... in
/// order of appearance.
pub fn unique_headers<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();
    let mut headers = Vec::with_capacity(raw.len());
    for (index, name) in raw.iter().enumerate() {
        let mut name = normalize_header(name.as_ref());
        if name.is_empty() {
            name = format!("Unnamed: {index}");
        }
        let base = name.clone();
        while seen.contains_key(&name) {
            let count = seen.entry(base.clone()).or_insert(0);
            *count += 1;
            name = format!("{base}.{count}");
        }
        seen.insert(name.clone(), 0);
        headers.push(name);
    }
    headers
}
