/*!
 * Tests for record-type prompt selection
 */

use modlocai::app_config::TranslationCommonConfig;
use modlocai::errors::TranslationError;
use modlocai::translation::PromptResolver;

use crate::common;

#[test]
fn test_resolve_withConfiguredType_shouldComposeBaseAndFragment() {
    let prompts = common::test_prompts();

    let prompt = prompts.resolve("INFO NAM1");

    assert_eq!(prompt.instruction, "Base. Spoken line.");
    assert_eq!(prompt.system, "Translate from English to Japanese.");
}

#[test]
fn test_resolve_withUnderscoreKeyInConfig_shouldMatchSpacedType() {
    let prompts = common::test_prompts();

    assert!(prompts.has_specific("DIAL FULL"));
    assert_eq!(prompts.resolve("DIAL FULL").instruction, "Base. Dialogue topic.");
}

#[test]
fn test_resolve_withUnknownType_shouldFallBackToGeneric() {
    let prompts = common::test_prompts();

    assert_eq!(prompts.resolve("WEAP FULL").instruction, "Base. Generic text.");
    assert_eq!(prompts.resolve("").instruction, "Base. Generic text.");
    assert_eq!(prompts.len(), 2);
}

#[test]
fn test_from_config_withoutGeneric_shouldFail() {
    let mut config = common::test_prompt_config();
    config.prompts.remove("others");

    let result = PromptResolver::from_config(&config, "English", "Japanese");

    assert!(matches!(result, Err(TranslationError::PromptConfig(_))));
}

#[test]
fn test_from_config_withBlankFragment_shouldFail() {
    let mut config = common::test_prompt_config();
    config.prompts.insert("BOOK DESC".to_string(), "   ".to_string());

    assert!(PromptResolver::from_config(&config, "English", "Japanese").is_err());
}

#[test]
fn test_from_config_withSameTypeTwice_shouldFail() {
    let mut config = common::test_prompt_config();
    config.prompts.insert("DIAL FULL".to_string(), "Another.".to_string());

    assert!(PromptResolver::from_config(&config, "English", "Japanese").is_err());
}

#[test]
fn test_from_config_withDefaults_shouldBuild() {
    let config = TranslationCommonConfig::default();

    let prompts = PromptResolver::from_config(&config, "English", "Japanese").unwrap();

    assert!(prompts.has_specific("DIAL FULL"));
    assert!(!prompts.has_specific("MISC FULL"));
    assert!(prompts.resolve("MISC FULL").system.contains("from English to Japanese"));
}
