use crate::runtime::XrRuntime;
use crate::types::{Cube, ProjectionView, SwapchainCreateInfo, SystemId, ViewConfigurationView};
use crate::XrResult;

/// Supplies the OS-specific pieces of instance creation.
pub trait PlatformPlugin {
    fn name(&self) -> &str;

    /// Instance extensions the platform needs enabled.
    fn instance_extensions(&self) -> Vec<String>;
}

/// The rendering backend: owns the GPU device and draws into swapchain images.
pub trait GraphicsPlugin<R: XrRuntime> {
    /// Backend-side image record built from one runtime swapchain image.
    type Image;

    fn name(&self) -> &str;

    fn instance_extensions(&self) -> Vec<String>;

    /// Create the graphics device for `system`. Called exactly once, before
    /// any session exists.
    fn initialize_device(
        &mut self,
        runtime: &R,
        instance: &R::Instance,
        system: SystemId,
    ) -> XrResult<()>;

    /// Binding used to create the session. Valid only for that call.
    fn graphics_binding(&self) -> XrResult<R::GraphicsBinding>;

    fn select_color_swapchain_format(&self, formats: &[R::Format]) -> XrResult<R::Format>;

    fn supported_swapchain_sample_count(&self, view: &ViewConfigurationView) -> u32;

    /// Wrap the runtime's images for one swapchain. The result must keep the
    /// runtime's enumeration order and length.
    fn allocate_swapchain_image_structs(
        &mut self,
        images: Vec<R::SwapchainImage>,
        create_info: &SwapchainCreateInfo<R::Format>,
    ) -> XrResult<Vec<Self::Image>>;

    /// Draw `cubes` into `image` as seen from `view`. Work must be complete or
    /// safely queued on return, since the image is released right after.
    fn render_view(
        &mut self,
        view: &ProjectionView,
        image: &Self::Image,
        color_format: R::Format,
        cubes: &[Cube],
    ) -> XrResult<()>;
}
