//! Text normalization helpers shared by validators and classifiers.

/// Lowercases and strips Latin diacritics (`"Sí"` becomes `"si"`).
pub fn fold(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' | 'ã' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

/// Folds the text and collapses everything that is not alphanumeric into
/// single spaces.
pub fn normalize(text: &str) -> String {
    let folded: String = fold(text)
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits normalized text into tokens of at least `min_len` characters.
pub fn tokens(text: &str, min_len: usize) -> Vec<String> {
    normalize(text)
        .split(' ')
        .filter(|t| t.chars().count() >= min_len)
        .map(str::to_string)
        .collect()
}

/// Counts characters after trimming surrounding whitespace.
pub fn trimmed_len(text: &str) -> usize {
    text.trim().chars().count()
}
