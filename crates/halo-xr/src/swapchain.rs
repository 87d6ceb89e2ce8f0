use tracing::{debug, info};

use crate::capabilities;
use crate::plugin::GraphicsPlugin;
use crate::runtime::XrRuntime;
use crate::types::{
    SwapchainCreateInfo, SwapchainUsageFlags, SystemId, ViewConfigurationType,
    ViewConfigurationView,
};
use crate::{XrError, XrResult};

/// One per-view swapchain and the backend records for its images.
pub struct SwapchainEntry<R: XrRuntime, G: GraphicsPlugin<R>> {
    // Backend image records go before the swapchain that owns the images.
    pub images: Vec<G::Image>,
    pub handle: R::Swapchain,
    pub width: u32,
    pub height: u32,
}

pub struct SwapchainSet<R: XrRuntime, G: GraphicsPlugin<R>> {
    entries: Vec<SwapchainEntry<R, G>>,
    config_views: Vec<ViewConfigurationView>,
    color_format: Option<R::Format>,
}

impl<R: XrRuntime, G: GraphicsPlugin<R>> Default for SwapchainSet<R, G> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            config_views: Vec::new(),
            color_format: None,
        }
    }
}

impl<R: XrRuntime, G: GraphicsPlugin<R>> SwapchainSet<R, G> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[SwapchainEntry<R, G>] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [SwapchainEntry<R, G>] {
        &mut self.entries
    }

    pub fn config_views(&self) -> &[ViewConfigurationView] {
        &self.config_views
    }

    pub fn color_format(&self) -> Option<R::Format> {
        self.color_format
    }

    /// Create one swapchain per view of `view_configuration`, sized to the
    /// runtime's recommended extents. Only valid on an empty set.
    pub fn create(
        &mut self,
        runtime: &R,
        graphics: &mut G,
        instance: &R::Instance,
        system: SystemId,
        session: &R::Session,
        view_configuration: ViewConfigurationType,
    ) -> XrResult<()> {
        if !self.entries.is_empty() || !self.config_views.is_empty() {
            return Err(XrError::protocol("swapchains have already been created"));
        }
        let expected_views = view_configuration.view_count().ok_or_else(|| {
            XrError::config(format!(
                "unsupported view configuration type {view_configuration}"
            ))
        })?;

        capabilities::log_system_properties(runtime, instance, system)?;

        let config_views =
            runtime.enumerate_view_configuration_views(instance, system, view_configuration)?;
        if config_views.len() != expected_views {
            return Err(XrError::runtime(
                "xrEnumerateViewConfigurationViews",
                format!(
                    "{view_configuration} reported {} views, expected {expected_views}",
                    config_views.len()
                ),
            ));
        }

        let formats = runtime.enumerate_swapchain_formats(session)?;
        let color_format = graphics.select_color_swapchain_format(&formats)?;
        debug!(
            "Swapchain Formats:{}",
            capabilities::describe_formats(&formats, color_format)
        );

        let mut entries = Vec::with_capacity(config_views.len());
        for (i, view) in config_views.iter().enumerate() {
            info!(
                "Creating swapchain for view {} with dimensions Width={} Height={} SampleCount={}",
                i,
                view.recommended_image_rect_width,
                view.recommended_image_rect_height,
                view.recommended_swapchain_sample_count
            );
            let create_info = SwapchainCreateInfo {
                usage_flags: SwapchainUsageFlags::SAMPLED | SwapchainUsageFlags::COLOR_ATTACHMENT,
                format: color_format,
                sample_count: graphics.supported_swapchain_sample_count(view),
                width: view.recommended_image_rect_width,
                height: view.recommended_image_rect_height,
                face_count: 1,
                array_size: 1,
                mip_count: 1,
            };
            let handle = runtime.create_swapchain(session, &create_info)?;
            let runtime_images = runtime.enumerate_swapchain_images(&handle)?;
            let image_count = runtime_images.len();
            let images = graphics.allocate_swapchain_image_structs(runtime_images, &create_info)?;
            if images.len() != image_count {
                return Err(XrError::graphics(format!(
                    "{} allocated {} image structs for {} swapchain images",
                    graphics.name(),
                    images.len(),
                    image_count
                )));
            }
            entries.push(SwapchainEntry {
                images,
                handle,
                width: create_info.width,
                height: create_info.height,
            });
        }

        self.entries = entries;
        self.config_views = config_views;
        self.color_format = Some(color_format);
        Ok(())
    }
}
