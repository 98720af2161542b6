/*!
 * Tests for error types and conversions
 */

use std::path::PathBuf;

use modlocai::errors::{AppError, PluginError, ProviderError, TranslationError};

#[test]
fn test_providerError_fromStatus_shouldPickMatchingVariant() {
    assert!(matches!(
        ProviderError::from_status(401, "bad key".to_string()),
        ProviderError::AuthenticationError(_)
    ));
    assert!(matches!(
        ProviderError::from_status(403, "forbidden".to_string()),
        ProviderError::AuthenticationError(_)
    ));
    assert!(matches!(
        ProviderError::from_status(429, "slow down".to_string()),
        ProviderError::RateLimitExceeded(_)
    ));
    match ProviderError::from_status(500, "boom".to_string()) {
        ProviderError::ApiError { status_code, message } => {
            assert_eq!(status_code, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("unexpected variant: {:?}", other),
    }
}

#[test]
fn test_providerError_apiError_shouldDisplayStatusAndMessage() {
    let error = ProviderError::ApiError {
        status_code: 503,
        message: "Model is loading".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("503"));
    assert!(display.contains("Model is loading"));
}

#[test]
fn test_translationError_promptConfig_shouldDisplayCorrectly() {
    let error = TranslationError::PromptConfig("missing generic 'others' prompt".to_string());
    let display = format!("{}", error);
    assert!(display.contains("Invalid prompt configuration"));
    assert!(display.contains("others"));
}

#[test]
fn test_pluginError_extraction_shouldNamePlugin() {
    let error = PluginError::Extraction {
        path: PathBuf::from("Quest.esp"),
        message: "extractor exited with status 2".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("Quest.esp"));
    assert!(display.contains("status 2"));
}

#[test]
fn test_pluginError_fromIoError_shouldWrapAsIo() {
    let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Access is denied");
    let plugin_error: PluginError = io_error.into();
    assert!(matches!(plugin_error, PluginError::Io(_)));
    assert!(format!("{}", plugin_error).contains("Access is denied"));
}

#[test]
fn test_appError_fromPluginError_shouldWrapCorrectly() {
    let plugin_error = PluginError::Conversion {
        path: PathBuf::from("out.json"),
        message: "invalid".to_string(),
    };
    let app_error: AppError = plugin_error.into();
    assert!(format!("{}", app_error).contains("Plugin error"));
}

#[test]
fn test_appError_fromProviderError_shouldWrapCorrectly() {
    let provider_error = ProviderError::ConnectionError("Network down".to_string());
    let app_error: AppError = provider_error.into();
    assert!(format!("{}", app_error).contains("Provider error"));
}

#[test]
fn test_appError_fromIoError_shouldWrapAsFileError() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
    let app_error: AppError = io_error.into();
    let display = format!("{}", app_error);
    assert!(display.contains("File error"));
    assert!(display.contains("File not found"));
}

#[test]
fn test_appError_fromAnyhowError_shouldWrapAsUnknown() {
    let app_error: AppError = anyhow::anyhow!("Something went wrong").into();
    let display = format!("{}", app_error);
    assert!(display.contains("Unknown error"));
    assert!(display.contains("Something went wrong"));
}
