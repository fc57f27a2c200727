use super::*;

// ============================================================================
// ResourceConfig
// ============================================================================

#[test]
fn test_resource_config_defaults() {
    let config = ResourceConfig::default();
    assert_eq!(config.vertex_pool_size, 33_554_432);
    assert_eq!(config.index_pool_size, 33_554_432);
    assert_eq!(config.material_pool_size, 33_554_432);
    assert_eq!(config.transform_pool_size, 33_554_432);
    assert_eq!(config.max_textures, 128);
    assert_eq!(config.frames_in_flight, 2);
    assert!(config.validate().is_ok());
}

#[test]
fn test_resource_config_rejects_zero_frames() {
    let config = ResourceConfig { frames_in_flight: 0, ..Default::default() };
    assert!(matches!(config.validate(), Err(Error::InitializationFailed(_))));
}

#[test]
fn test_resource_config_rejects_empty_pool() {
    let config = ResourceConfig { index_pool_size: 0, ..Default::default() };
    let err = config.validate().unwrap_err();
    assert!(format!("{}", err).contains("index"));
}

#[test]
fn test_resource_config_rejects_pool_beyond_u32() {
    let config = ResourceConfig {
        vertex_pool_size: u32::MAX as u64 + 1,
        ..Default::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_resource_config_accepts_zero_textures() {
    let config = ResourceConfig { max_textures: 0, ..Default::default() };
    assert!(config.validate().is_ok());
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn test_config_defaults() {
    let config = Config::default();
    assert_eq!(config.msaa_samples, 8);
    assert!(config.vsync);
    assert_eq!(config.app_version, (1, 0, 0));
    assert_eq!(config.debug_severity, DebugSeverity::ErrorsAndWarnings);
    assert!(!config.break_on_validation_error);
}
