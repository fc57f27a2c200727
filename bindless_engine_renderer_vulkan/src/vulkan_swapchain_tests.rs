//! Unit tests for swapchain parameter selection

use super::*;

fn caps(current: (u32, u32), min_count: u32, max_count: u32) -> vk::SurfaceCapabilitiesKHR {
    vk::SurfaceCapabilitiesKHR {
        min_image_count: min_count,
        max_image_count: max_count,
        current_extent: vk::Extent2D { width: current.0, height: current.1 },
        min_image_extent: vk::Extent2D { width: 1, height: 1 },
        max_image_extent: vk::Extent2D { width: 4096, height: 2048 },
        ..Default::default()
    }
}

#[test]
fn test_surface_format_prefers_bgra_srgb() {
    let formats = [
        vk::SurfaceFormatKHR { format: vk::Format::R8G8B8A8_UNORM, color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR },
        vk::SurfaceFormatKHR { format: vk::Format::B8G8R8A8_SRGB, color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR },
    ];
    assert_eq!(choose_surface_format(&formats).unwrap().format, vk::Format::B8G8R8A8_SRGB);
}

#[test]
fn test_surface_format_falls_back_to_first() {
    let formats = [vk::SurfaceFormatKHR {
        format: vk::Format::R8G8B8A8_UNORM,
        color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
    }];
    assert_eq!(choose_surface_format(&formats).unwrap().format, vk::Format::R8G8B8A8_UNORM);
    assert!(choose_surface_format(&[]).is_none());
}

#[test]
fn test_present_mode_selection() {
    let all = [vk::PresentModeKHR::FIFO, vk::PresentModeKHR::MAILBOX, vk::PresentModeKHR::IMMEDIATE];
    assert_eq!(choose_present_mode(true, &all), vk::PresentModeKHR::FIFO);
    assert_eq!(choose_present_mode(false, &all), vk::PresentModeKHR::MAILBOX);
    assert_eq!(
        choose_present_mode(false, &[vk::PresentModeKHR::FIFO, vk::PresentModeKHR::IMMEDIATE]),
        vk::PresentModeKHR::IMMEDIATE
    );
    assert_eq!(choose_present_mode(false, &[vk::PresentModeKHR::FIFO]), vk::PresentModeKHR::FIFO);
}

#[test]
fn test_extent_uses_current_when_fixed() {
    let extent = choose_extent(&caps((800, 600), 2, 8), 1024, 768);
    assert_eq!((extent.width, extent.height), (800, 600));
}

#[test]
fn test_extent_clamps_window_size() {
    let extent = choose_extent(&caps((u32::MAX, u32::MAX), 2, 8), 8000, 480);
    assert_eq!((extent.width, extent.height), (4096, 480));
}

#[test]
fn test_image_count() {
    assert_eq!(choose_image_count(&caps((640, 480), 2, 8)), 3);
    assert_eq!(choose_image_count(&caps((640, 480), 3, 3)), 3);
    // 0 means unbounded
    assert_eq!(choose_image_count(&caps((640, 480), 2, 0)), 3);
}
