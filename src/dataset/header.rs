use std::collections::HashMap;
use std::collections::HashSet;

/// Prefix of the name given to a blank header cell.
const UNNAMED_PREFIX: &str = "Unnamed_";
/// Prefix of generated headers when the first row is not used as header.
const COLUMN_PREFIX: &str = "Column_";

/// Derives unique, non-empty column names from raw header texts.
///
/// Each header is trimmed; a blank one becomes `Unnamed_<position>` (1-based).
/// The first occurrence of a name is kept as is, the n-th occurrence becomes
/// `<name>_<n>`. Collisions are decided on the name alone, so a generated
/// `Unnamed_2` and a literal `Unnamed_2` count against each other.
///
/// A suffixed name that is already taken (`["A", "A_2", "A"]`) keeps bumping the
/// counter of its base name until it is free, so the result never holds duplicates.
pub fn normalize_headers<S: AsRef<str>>(raw_headers: &[S]) -> Vec<String> {
    let mut counts = HashMap::<String, usize>::new();
    let mut taken = HashSet::<String>::with_capacity(raw_headers.len());
    raw_headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            let trimmed = header.as_ref().trim();
            let candidate = if trimmed.is_empty() {
                format!("{UNNAMED_PREFIX}{}", index + 1)
            } else {
                trimmed.to_owned()
            };

            let count = counts.entry(candidate.clone()).or_insert(0);
            *count += 1;
            let mut name = if *count == 1 {
                candidate.clone()
            } else {
                format!("{candidate}_{count}")
            };
            while taken.contains(&name) {
                *count += 1;
                name = format!("{candidate}_{count}");
            }
            taken.insert(name.clone());
            name
        })
        .collect()
}

/// Generates `Column_1 .. Column_<count>`.
pub fn default_headers(count: usize) -> Vec<String> {
    (1..=count).map(|index| format!("{COLUMN_PREFIX}{index}")).collect()
}
