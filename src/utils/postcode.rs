/// Outward code of a UK postcode, used for coarse area matching between a
/// job's location and a tradesperson's search.
///
/// "SW1A 1AA" -> "SW1A". Inputs without the separating space fall back to
/// stripping the three-character inward code. Counts characters, not bytes,
/// so arbitrary query-string input cannot split a multi-byte character.
pub fn outward_code(postcode: &str) -> String {
    let trimmed = postcode.trim();
    if let Some((outward, _)) = trimmed.split_once(' ') {
        return outward.to_uppercase();
    }
    let char_count = trimmed.chars().count();
    if char_count > 3 {
        return trimmed
            .chars()
            .take(char_count - 3)
            .collect::<String>()
            .to_uppercase();
    }
    trimmed.to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outward_code_with_space() {
        assert_eq!(outward_code("SW1A 1AA"), "SW1A");
        assert_eq!(outward_code("m1 1ae"), "M1");
    }

    #[test]
    fn test_outward_code_without_space() {
        assert_eq!(outward_code("SW1A1AA"), "SW1A");
        assert_eq!(outward_code("M11AE"), "M1");
    }

    #[test]
    fn test_outward_code_short_input() {
        assert_eq!(outward_code("M1"), "M1");
    }

    #[test]
    fn test_outward_code_multibyte_input() {
        // Query strings are unvalidated beyond length; multi-byte characters
        // must not split mid-character.
        assert_eq!(outward_code("ÀÀÀÀÀ"), "ÀÀ");
        assert_eq!(outward_code("ÀÀÀ"), "ÀÀÀ");
        assert_eq!(outward_code("日本語の郵便"), "日本語");
    }
}
