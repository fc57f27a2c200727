//! Unit tests for device selection helpers (no GPU required)

use super::*;

fn all_supported() -> FeatureSupport {
    FeatureSupport {
        sampler_anisotropy: true,
        scalar_block_layout: true,
        descriptor_indexing: true,
        descriptor_binding_partially_bound: true,
        descriptor_binding_variable_descriptor_count: true,
        descriptor_binding_sampled_image_update_after_bind: true,
        runtime_descriptor_array: true,
        dynamic_rendering: true,
        synchronization2: true,
        swapchain_extension: true,
    }
}

// ============================================================================
// FEATURE CHECK TESTS
// ============================================================================

#[test]
fn test_full_support_has_nothing_missing() {
    assert!(all_supported().missing_features().is_empty());
}

#[test]
fn test_missing_features_are_named() {
    let support = FeatureSupport {
        dynamic_rendering: false,
        swapchain_extension: false,
        ..all_supported()
    };
    assert_eq!(support.missing_features(), vec!["dynamicRendering", "VK_KHR_swapchain"]);
}

#[test]
fn test_nothing_supported_lists_every_requirement() {
    let missing = FeatureSupport::default().missing_features();
    assert_eq!(missing.len(), 10);
    assert!(missing.contains(&"synchronization2"));
    assert!(missing.contains(&"descriptorBindingSampledImageUpdateAfterBind"));
}

// ============================================================================
// DEVICE RANKING TESTS
// ============================================================================

#[test]
fn test_discrete_gpu_preferred() {
    let discrete = device_type_rank(vk::PhysicalDeviceType::DISCRETE_GPU);
    let integrated = device_type_rank(vk::PhysicalDeviceType::INTEGRATED_GPU);
    let cpu = device_type_rank(vk::PhysicalDeviceType::CPU);
    assert!(discrete < integrated);
    assert!(integrated < cpu);
    assert!(cpu < device_type_rank(vk::PhysicalDeviceType::OTHER));
}
