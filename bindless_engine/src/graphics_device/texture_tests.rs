use super::*;

// ============================================================================
// Mip chain
// ============================================================================

#[test]
fn test_mip_level_count_square() {
    assert_eq!(mip_level_count(1, 1), 1);
    assert_eq!(mip_level_count(2, 2), 2);
    assert_eq!(mip_level_count(256, 256), 9);
    assert_eq!(mip_level_count(1024, 1024), 11);
}

#[test]
fn test_mip_level_count_uses_smaller_side() {
    assert_eq!(mip_level_count(1024, 16), 5);
    assert_eq!(mip_level_count(3, 1000), 2);
    assert_eq!(mip_level_count(255, 512), 8);
}

#[test]
fn test_mip_level_count_empty() {
    assert_eq!(mip_level_count(0, 64), 0);
}

#[test]
fn test_mip_extent_clamps_to_one() {
    assert_eq!(mip_extent(256, 64, 0), (256, 64));
    assert_eq!(mip_extent(256, 64, 3), (32, 8));
    assert_eq!(mip_extent(256, 64, 7), (2, 1));
    assert_eq!(mip_extent(256, 64, 40), (1, 1));
}

#[test]
fn test_mip_chain_non_power_of_two() {
    let chain = mip_chain(100, 60);
    assert_eq!(chain.len(), 6);
    assert_eq!(chain[0], MipLevel { level: 0, width: 100, height: 60 });
    assert_eq!(chain[1], MipLevel { level: 1, width: 50, height: 30 });
    assert_eq!(chain[5], MipLevel { level: 5, width: 3, height: 1 });
}

// ============================================================================
// TextureSource
// ============================================================================

#[test]
fn test_texture_source_accepts_rgba8() {
    let source = TextureSource::new(vec![0; 2 * 3 * 4], 2, 3).unwrap();
    assert_eq!(source.width, 2);
    assert_eq!(source.height, 3);
}

#[test]
fn test_texture_source_rejects_wrong_size() {
    let result = TextureSource::new(vec![0; 23], 2, 3);
    assert!(matches!(result, Err(Error::InvalidResource(_))));
}

#[test]
fn test_texture_source_rejects_empty_extent() {
    assert!(TextureSource::new(Vec::new(), 0, 4).is_err());
}

#[test]
fn test_rgba8_format_selection() {
    assert_eq!(TextureFormat::rgba8(true), TextureFormat::R8G8B8A8_UNORM);
    assert_eq!(TextureFormat::rgba8(false), TextureFormat::R8G8B8A8_SRGB);
    assert!(TextureFormat::D32_SFLOAT_S8_UINT.is_depth());
    assert_eq!(TextureFormat::B8G8R8A8_SRGB.bytes_per_pixel(), 4);
}
