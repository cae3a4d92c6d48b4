use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Lowercases and strips diacritics so "Açúcar" and "acucar" compare equal.
pub fn fold_search_text(input: &str) -> String {
    input
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

#[inline]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_portuguese_accents() {
        assert_eq!(fold_search_text("Açúcar Cristal"), "acucar cristal");
        assert_eq!(fold_search_text("PÃO de Queijo"), "pao de queijo");
    }

    #[test]
    fn normalizes_email() {
        assert_eq!(normalize_email("  Admin@Loja.COM "), "admin@loja.com");
    }
}
