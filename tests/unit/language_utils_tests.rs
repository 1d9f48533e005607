/*!
 * Tests for language code utilities
 */

use subtrans::language_utils::{
    get_language_name, is_auto, primary_subtag, validate_language_code, validate_source_language,
};

#[test]
fn test_get_language_name_should_resolve_two_and_three_letter_codes() {
    assert_eq!(get_language_name("fr").unwrap(), "French");
    assert_eq!(get_language_name("zh-CN").unwrap(), "Chinese");
    assert_eq!(get_language_name("deu").unwrap(), "German");
    assert!(get_language_name("q").is_err());
}

#[test]
fn test_primary_subtag_should_lowercase_and_strip_region() {
    assert_eq!(primary_subtag("PT_br"), "pt");
    assert_eq!(primary_subtag(" zh-Hant "), "zh");
}

#[test]
fn test_source_language_should_accept_auto_detection() {
    assert!(validate_source_language("").is_ok());
    assert!(validate_source_language("auto").is_ok());
    assert!(validate_source_language("ja").is_ok());
    assert!(validate_source_language("klingon").is_err());
    assert!(is_auto("Auto"));
    assert!(!is_auto("en"));
}

#[test]
fn test_target_language_should_not_accept_auto() {
    assert!(validate_language_code("auto").is_err());
}
