//! Vulkan surface management
//!
//! Owns a window surface for presentation and destroys it on drop through the
//! `VK_KHR_surface` loader.

use crate::window::{Window, WindowError, WindowResult};
use ash::{extensions::khr, vk};

/// Vulkan surface wrapper for presentation
///
/// Must be dropped before the instance it was created from and before the
/// window it presents to.
pub struct VulkanSurface {
    surface_loader: khr::Surface,
    surface: vk::SurfaceKHR,
}

impl VulkanSurface {
    /// Create a surface for `window`
    ///
    /// # Errors
    /// `InvalidInstance` for a null instance, `SurfaceCreationFailed` when the
    /// native call fails.
    pub fn new(entry: &ash::Entry, instance: &ash::Instance, window: &Window) -> WindowResult<Self> {
        let surface = window.create_vulkan_surface(instance.handle())?;
        log::debug!("Created Vulkan surface for window {:?}", window.id());

        Ok(Self {
            surface_loader: khr::Surface::new(entry, instance),
            surface,
        })
    }

    /// Get the underlying surface handle
    pub const fn handle(&self) -> vk::SurfaceKHR {
        self.surface
    }

    /// Get the surface loader
    pub const fn loader(&self) -> &khr::Surface {
        &self.surface_loader
    }

    /// Check if a queue family supports presentation to this surface
    ///
    /// # Errors
    /// `SurfaceCreationFailed` carrying the query's error code.
    pub fn supports_present(
        &self,
        physical_device: vk::PhysicalDevice,
        queue_family_index: u32,
    ) -> WindowResult<bool> {
        // SAFETY: the surface and the loader's instance are alive while `self` is.
        unsafe {
            self.surface_loader
                .get_physical_device_surface_support(physical_device, queue_family_index, self.surface)
                .map_err(WindowError::SurfaceCreationFailed)
        }
    }

    /// Get surface capabilities for a physical device
    ///
    /// # Errors
    /// `SurfaceCreationFailed` carrying the query's error code.
    pub fn capabilities(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> WindowResult<vk::SurfaceCapabilitiesKHR> {
        // SAFETY: see `supports_present`.
        unsafe {
            self.surface_loader
                .get_physical_device_surface_capabilities(physical_device, self.surface)
                .map_err(WindowError::SurfaceCreationFailed)
        }
    }
}

impl Drop for VulkanSurface {
    fn drop(&mut self) {
        // SAFETY: the surface was created from this loader's instance and is no longer in use.
        unsafe {
            self.surface_loader.destroy_surface(self.surface, None);
        }
        log::debug!("Destroyed Vulkan surface");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::foundation::math::Extent2D;
    use crate::window::WindowBuilder;
    use std::ffi::CString;

    #[test]
    #[ignore = "requires a display server and a Vulkan driver"]
    fn test_surface_lifecycle() {
        let mut context = Context::init().unwrap();
        let extensions: Vec<CString> = context
            .required_vulkan_extensions()
            .unwrap()
            .into_iter()
            .map(|name| CString::new(name).unwrap())
            .collect();
        let extension_ptrs: Vec<_> = extensions.iter().map(|name| name.as_ptr()).collect();

        let entry = unsafe { ash::Entry::load() }.unwrap();
        let create_info = vk::InstanceCreateInfo::builder().enabled_extension_names(&extension_ptrs);
        let instance = unsafe { entry.create_instance(&create_info, None) }.unwrap();

        let window = WindowBuilder::new()
            .title("vulkan")
            .size(Extent2D::new(320, 240))
            .visible(false)
            .build(&mut context)
            .unwrap();
        let surface = VulkanSurface::new(&entry, &instance, &window).unwrap();
        assert_ne!(surface.handle(), vk::SurfaceKHR::null());

        drop(surface);
        unsafe { instance.destroy_instance(None) };
    }
}
