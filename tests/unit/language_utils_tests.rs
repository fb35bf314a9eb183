/*!
 * Tests for language utilities
 */

use twbtrans::language_utils::{display_name, file_code, get_language_name, normalize_to_part2t, resolve_language};

#[test]
fn test_normalize_to_part2t_withVariousCodes_shouldReturnTerminologyCode() {
    assert_eq!(normalize_to_part2t("en").unwrap(), "eng");
    assert_eq!(normalize_to_part2t("FR").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("fre").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("ger").unwrap(), "deu");
    assert_eq!(normalize_to_part2t("est").unwrap(), "est");
    assert!(normalize_to_part2t("xx").is_err());
    assert!(normalize_to_part2t("english").is_err());
}

#[test]
fn test_get_language_name_withCode_shouldReturnEnglishName() {
    assert_eq!(get_language_name("et").unwrap(), "Estonian");
    assert_eq!(get_language_name("deu").unwrap(), "German");
}

#[test]
fn test_resolve_language_withNameInAnyCase_shouldResolve() {
    assert_eq!(resolve_language("French").unwrap().to_639_1(), Some("fr"));
    assert_eq!(resolve_language("  estonian ").unwrap().to_639_1(), Some("et"));
    assert!(resolve_language("").is_err());
    assert!(resolve_language("Klingonish").is_err());
}

#[test]
fn test_display_name_withCodeOrUnknownName_shouldPreferIsoName() {
    assert_eq!(display_name("fr"), "French");
    assert_eq!(display_name("English"), "English");
    assert_eq!(display_name(" Klingonish "), "Klingonish");
}

#[test]
fn test_file_code_shouldUseUpperCaseIsoCode() {
    assert_eq!(file_code("English"), "EN");
    assert_eq!(file_code("fra"), "FR");
    assert_eq!(file_code("de"), "DE");
}

#[test]
fn test_file_code_withCountryStyleLanguages_shouldUseLegacySuffixes() {
    assert_eq!(file_code("Japanese"), "JP");
    assert_eq!(file_code("ko"), "KR");
    assert_eq!(file_code("Swedish"), "SE");
    assert_eq!(file_code("dan"), "DK");
    assert_eq!(file_code("Finnish"), "FI");
}

#[test]
fn test_file_code_withUnknownLanguage_shouldFallBackToFirstTwoLetters() {
    assert_eq!(file_code("Klingonish"), "KL");
}
