use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Canonicalizes text for keyword matching: NFD decomposition, combining
/// marks dropped, lowercased, surrounding whitespace trimmed. Total and
/// idempotent; never shown to the user.
pub fn normalize(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
        .trim()
        .to_string()
}

/// Uppercases the first character, leaving the rest untouched.
pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_diacritics_and_lowercases() {
        assert_eq!(normalize("Salário"), "salario");
        assert_eq!(normalize("DESCRIÇÃO"), "descricao");
        assert_eq!(normalize("  Bônus  "), "bonus");
    }

    #[test]
    fn empty_input_is_empty() {
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn idempotent() {
        for s in ["Condomínio", "ônibus 05/03", "já normalizado", ""] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn capitalize_first_letter() {
        assert_eq!(capitalize_first("despesa"), "Despesa");
        assert_eq!(capitalize_first("água"), "Água");
        assert_eq!(capitalize_first(""), "");
    }
}
