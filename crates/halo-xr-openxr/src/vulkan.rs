//! Vulkan rendering backend.
//!
//! Cubes are drawn without a pipeline: each one is projected to its screen
//! bounding rectangle and filled with `vkCmdClearAttachments`, back to front.

use std::ffi::{c_char, CString};

use ash::vk::Handle;
use ash::{vk, Entry as VkEntry};
use glam::{Mat4, Vec3, Vec4};
use openxr as xr;
use tracing::{debug, info};

use halo_xr::{
    Cube, Fov, GraphicsPlugin, ProjectionView, SwapchainCreateInfo, SystemId,
    ViewConfigurationView, XrError, XrResult,
};

use crate::convert;
use crate::runtime::OpenXrRuntime;

const CLEAR_COLOR: [f32; 4] = [0.184_313_73, 0.309_803_93, 0.309_803_93, 1.0];
const NEAR_Z: f32 = 0.05;
const FAR_Z: f32 = 100.0;

const CUBE_COLORS: [[f32; 4]; 4] = [
    [0.85, 0.35, 0.25, 1.0],
    [0.30, 0.70, 0.40, 1.0],
    [0.30, 0.45, 0.85, 1.0],
    [0.90, 0.80, 0.30, 1.0],
];

pub const PREFERRED_FORMATS: [vk::Format; 4] = [
    vk::Format::R8G8B8A8_UNORM,
    vk::Format::B8G8R8A8_UNORM,
    vk::Format::R8G8B8A8_SRGB,
    vk::Format::B8G8R8A8_SRGB,
];

pub fn describe_format(format: u32) -> &'static str {
    match vk::Format::from_raw(format as i32) {
        vk::Format::R8G8B8A8_UNORM => "VK_FORMAT_R8G8B8A8_UNORM",
        vk::Format::B8G8R8A8_UNORM => "VK_FORMAT_B8G8R8A8_UNORM",
        vk::Format::R8G8B8A8_SRGB => "VK_FORMAT_R8G8B8A8_SRGB",
        vk::Format::B8G8R8A8_SRGB => "VK_FORMAT_B8G8R8A8_SRGB",
        _ => "UNKNOWN_VK_FORMAT",
    }
}

/// First runtime format that appears in [`PREFERRED_FORMATS`].
pub fn choose_format(formats: &[u32]) -> Option<u32> {
    PREFERRED_FORMATS
        .iter()
        .map(|fmt| fmt.as_raw() as u32)
        .find(|fmt| formats.contains(fmt))
}

/// Projection for an asymmetric field of view in Vulkan clip space (Y down, depth 0..1).
pub fn projection_from_fov(fov: Fov, near: f32, far: f32) -> Mat4 {
    let tan_left = fov.angle_left.tan();
    let tan_right = fov.angle_right.tan();
    let tan_up = fov.angle_up.tan();
    let tan_down = fov.angle_down.tan();
    let tan_width = tan_right - tan_left;
    let tan_height = tan_down - tan_up;

    Mat4::from_cols(
        Vec4::new(2.0 / tan_width, 0.0, 0.0, 0.0),
        Vec4::new(0.0, 2.0 / tan_height, 0.0, 0.0),
        Vec4::new(
            (tan_right + tan_left) / tan_width,
            (tan_up + tan_down) / tan_height,
            -far / (far - near),
            -1.0,
        ),
        Vec4::new(0.0, 0.0, -(far * near) / (far - near), 0.0),
    )
}

pub fn view_projection(view: &ProjectionView) -> Mat4 {
    let eye = Mat4::from_rotation_translation(view.pose.orientation, view.pose.position);
    projection_from_fov(view.fov, NEAR_Z, FAR_Z) * eye.inverse()
}

/// Screen-space bounds of `cube` plus its clip-space depth, or `None` when the
/// cube crosses the near plane or falls outside `extent`.
pub fn cube_screen_rect(
    view_projection: Mat4,
    cube: &Cube,
    extent: vk::Extent2D,
) -> Option<(vk::Rect2D, f32)> {
    let model = Mat4::from_scale_rotation_translation(
        cube.scale,
        cube.pose.orientation,
        cube.pose.position,
    );
    let mvp = view_projection * model;

    let mut min = Vec3::splat(f32::INFINITY);
    let mut max = Vec3::splat(f32::NEG_INFINITY);
    for i in 0..8 {
        let corner = Vec3::new(
            if i & 1 == 0 { -0.5 } else { 0.5 },
            if i & 2 == 0 { -0.5 } else { 0.5 },
            if i & 4 == 0 { -0.5 } else { 0.5 },
        );
        let clip = mvp * corner.extend(1.0);
        if clip.w < NEAR_Z {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        min = min.min(ndc);
        max = max.max(ndc);
    }

    let width = extent.width as f32;
    let height = extent.height as f32;
    let x0 = ((min.x + 1.0) * 0.5 * width).floor().clamp(0.0, width);
    let x1 = ((max.x + 1.0) * 0.5 * width).ceil().clamp(0.0, width);
    let y0 = ((min.y + 1.0) * 0.5 * height).floor().clamp(0.0, height);
    let y1 = ((max.y + 1.0) * 0.5 * height).ceil().clamp(0.0, height);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }

    let rect = vk::Rect2D {
        offset: vk::Offset2D {
            x: x0 as i32,
            y: y0 as i32,
        },
        extent: vk::Extent2D {
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        },
    };
    Some((rect, max.z))
}

fn vk_err(what: &str) -> impl FnOnce(vk::Result) -> XrError + '_ {
    move |e| XrError::graphics(format!("Vulkan {what} failed: {e}"))
}

fn parse_extension_list(list: &str) -> Vec<CString> {
    list.split_whitespace()
        .filter_map(|s| CString::new(s).ok())
        .collect()
}

fn find_graphics_queue_family(
    instance: &ash::Instance,
    physical_device: vk::PhysicalDevice,
) -> XrResult<u32> {
    let families = unsafe { instance.get_physical_device_queue_family_properties(physical_device) };
    families
        .iter()
        .enumerate()
        .find(|(_, family)| family.queue_flags.contains(vk::QueueFlags::GRAPHICS))
        .map(|(idx, _)| idx as u32)
        .ok_or_else(|| XrError::graphics("no Vulkan graphics queue family"))
}

fn xr_vulkan_extensions(list: xr::Result<String>, call: &'static str) -> XrResult<Vec<CString>> {
    list.map(|names| parse_extension_list(&names))
        .map_err(|e| XrError::runtime(call, e))
}

fn create_vk_instance(
    entry: &VkEntry,
    xr_instance: &xr::Instance,
    system: xr::SystemId,
) -> XrResult<ash::Instance> {
    let reqs = xr_instance
        .graphics_requirements::<xr::Vulkan>(system)
        .map_err(|e| XrError::runtime("xrGetVulkanGraphicsRequirementsKHR", e))?;
    let min = reqs.min_api_version_supported;
    let api_version = vk::make_api_version(0, min.major() as u32, min.minor() as u32, min.patch());

    let extensions = xr_vulkan_extensions(
        xr_instance.vulkan_legacy_instance_extensions(system),
        "xrGetVulkanInstanceExtensionsKHR",
    )?;
    let extension_ptrs: Vec<*const c_char> = extensions.iter().map(|s| s.as_ptr()).collect();

    let app_info = vk::ApplicationInfo::builder()
        .application_name(c"halo")
        .engine_name(c"halo")
        .api_version(api_version);
    let create_info = vk::InstanceCreateInfo::builder()
        .application_info(&app_info)
        .enabled_extension_names(&extension_ptrs);
    unsafe { entry.create_instance(&create_info, None) }.map_err(vk_err("instance create"))
}

/// The physical device the runtime composites on.
fn xr_physical_device(
    xr_instance: &xr::Instance,
    system: xr::SystemId,
    instance: &ash::Instance,
) -> XrResult<vk::PhysicalDevice> {
    let raw = unsafe {
        xr_instance.vulkan_graphics_device(system, instance.handle().as_raw() as *const _)
    }
    .map_err(|e| XrError::runtime("xrGetVulkanGraphicsDeviceKHR", e))?;
    Ok(vk::PhysicalDevice::from_raw(raw as u64))
}

fn create_logical_device(
    xr_instance: &xr::Instance,
    system: xr::SystemId,
    instance: &ash::Instance,
    physical_device: vk::PhysicalDevice,
    queue_family_index: u32,
) -> XrResult<ash::Device> {
    let extensions = xr_vulkan_extensions(
        xr_instance.vulkan_legacy_device_extensions(system),
        "xrGetVulkanDeviceExtensionsKHR",
    )?;
    let extension_ptrs: Vec<*const c_char> = extensions.iter().map(|s| s.as_ptr()).collect();

    let priorities = [1.0f32];
    let queue_info = vk::DeviceQueueCreateInfo::builder()
        .queue_family_index(queue_family_index)
        .queue_priorities(&priorities);
    let create_info = vk::DeviceCreateInfo::builder()
        .queue_create_infos(std::slice::from_ref(&queue_info))
        .enabled_extension_names(&extension_ptrs);
    unsafe { instance.create_device(physical_device, &create_info, None) }
        .map_err(vk_err("device create"))
}

/// Graphics queue with the single command buffer and fence every view is drawn through.
struct Submitter {
    queue: vk::Queue,
    command_pool: vk::CommandPool,
    command_buffer: vk::CommandBuffer,
    fence: vk::Fence,
}

impl Submitter {
    fn new(device: &ash::Device, queue_family_index: u32) -> XrResult<Self> {
        let queue = unsafe { device.get_device_queue(queue_family_index, 0) };

        let pool_info = vk::CommandPoolCreateInfo::builder()
            .queue_family_index(queue_family_index)
            .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);
        let command_pool = unsafe { device.create_command_pool(&pool_info, None) }
            .map_err(vk_err("command pool create"))?;

        let buffer_info = vk::CommandBufferAllocateInfo::builder()
            .command_pool(command_pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(1);
        let fence_info = vk::FenceCreateInfo::builder().flags(vk::FenceCreateFlags::SIGNALED);
        let objects = unsafe { device.allocate_command_buffers(&buffer_info) }
            .map_err(vk_err("command buffer alloc"))
            .and_then(|buffers| {
                buffers
                    .first()
                    .copied()
                    .ok_or_else(|| XrError::graphics("Vulkan allocated no command buffer"))
            })
            .and_then(|buffer| {
                let fence = unsafe { device.create_fence(&fence_info, None) }
                    .map_err(vk_err("fence create"))?;
                Ok((buffer, fence))
            });

        match objects {
            Ok((command_buffer, fence)) => Ok(Self {
                queue,
                command_pool,
                command_buffer,
                fence,
            }),
            Err(err) => {
                unsafe { device.destroy_command_pool(command_pool, None) };
                Err(err)
            }
        }
    }

    /// # Safety
    /// `device` must be the one these objects were created on, and idle.
    unsafe fn destroy(&self, device: &ash::Device) {
        device.destroy_fence(self.fence, None);
        device.destroy_command_pool(self.command_pool, None);
    }
}

struct VulkanContext {
    // Keeps the loader library mapped for the lifetime of the instance.
    _entry: VkEntry,
    instance: ash::Instance,
    device: ash::Device,
    physical_device: vk::PhysicalDevice,
    queue_family_index: u32,
    submit: Submitter,
    render_pass: Option<(u32, vk::RenderPass)>,
}

impl VulkanContext {
    fn new(xr_instance: &xr::Instance, system: xr::SystemId) -> XrResult<Self> {
        let entry = unsafe { VkEntry::load() }
            .map_err(|e| XrError::Unavailable(format!("Vulkan entry load failed: {e}")))?;
        let instance = create_vk_instance(&entry, xr_instance, system)?;

        // Anything created on top of `instance` is torn down here if a later step fails.
        let built = xr_physical_device(xr_instance, system, &instance).and_then(|physical_device| {
            let queue_family_index = find_graphics_queue_family(&instance, physical_device)?;
            let device = create_logical_device(
                xr_instance,
                system,
                &instance,
                physical_device,
                queue_family_index,
            )?;
            match Submitter::new(&device, queue_family_index) {
                Ok(submit) => Ok((physical_device, queue_family_index, device, submit)),
                Err(err) => {
                    unsafe { device.destroy_device(None) };
                    Err(err)
                }
            }
        });
        let (physical_device, queue_family_index, device, submit) = match built {
            Ok(parts) => parts,
            Err(err) => {
                unsafe { instance.destroy_instance(None) };
                return Err(err);
            }
        };

        Ok(Self {
            _entry: entry,
            instance,
            device,
            physical_device,
            queue_family_index,
            submit,
            render_pass: None,
        })
    }

    fn render_pass(&mut self, format: u32) -> XrResult<vk::RenderPass> {
        if let Some((cached, pass)) = self.render_pass {
            if cached == format {
                return Ok(pass);
            }
            return Err(XrError::graphics(format!(
                "render pass already built for {}, got {}",
                describe_format(cached),
                describe_format(format)
            )));
        }

        let attachments = [vk::AttachmentDescription::builder()
            .format(vk::Format::from_raw(format as i32))
            .samples(vk::SampleCountFlags::TYPE_1)
            .load_op(vk::AttachmentLoadOp::CLEAR)
            .store_op(vk::AttachmentStoreOp::STORE)
            .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
            .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .final_layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL)
            .build()];
        let color_refs = [vk::AttachmentReference {
            attachment: 0,
            layout: vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
        }];
        let subpasses = [vk::SubpassDescription::builder()
            .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
            .color_attachments(&color_refs)
            .build()];
        let info = vk::RenderPassCreateInfo::builder()
            .attachments(&attachments)
            .subpasses(&subpasses);
        let pass = unsafe {
            self.device
                .create_render_pass(&info, None)
                .map_err(vk_err("render pass create"))?
        };
        self.render_pass = Some((format, pass));
        Ok(pass)
    }

    fn wrap_image(
        &self,
        image: vk::Image,
        format: vk::Format,
        extent: vk::Extent2D,
        render_pass: vk::RenderPass,
    ) -> XrResult<VulkanImage> {
        let view_info = vk::ImageViewCreateInfo::builder()
            .image(image)
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(format)
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask: vk::ImageAspectFlags::COLOR,
                base_mip_level: 0,
                level_count: 1,
                base_array_layer: 0,
                layer_count: 1,
            });
        let view = unsafe {
            self.device
                .create_image_view(&view_info, None)
                .map_err(vk_err("image view create"))?
        };

        let attachments = [view];
        let framebuffer_info = vk::FramebufferCreateInfo::builder()
            .render_pass(render_pass)
            .attachments(&attachments)
            .width(extent.width)
            .height(extent.height)
            .layers(1);
        let framebuffer = match unsafe { self.device.create_framebuffer(&framebuffer_info, None) } {
            Ok(framebuffer) => framebuffer,
            Err(e) => {
                unsafe { self.device.destroy_image_view(view, None) };
                return Err(vk_err("framebuffer create")(e));
            }
        };

        Ok(VulkanImage {
            image,
            view,
            framebuffer,
            extent,
            device: self.device.clone(),
        })
    }

    fn draw(
        &self,
        render_pass: vk::RenderPass,
        image: &VulkanImage,
        rects: &[(vk::Rect2D, [f32; 4])],
    ) -> XrResult<()> {
        let submit = &self.submit;
        unsafe {
            self.device
                .wait_for_fences(&[submit.fence], true, u64::MAX)
                .map_err(vk_err("fence wait"))?;
            self.device
                .reset_fences(&[submit.fence])
                .map_err(vk_err("fence reset"))?;
            self.device
                .reset_command_buffer(submit.command_buffer, vk::CommandBufferResetFlags::empty())
                .map_err(vk_err("command buffer reset"))?;

            let begin = vk::CommandBufferBeginInfo::builder()
                .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
            self.device
                .begin_command_buffer(submit.command_buffer, &begin)
                .map_err(vk_err("begin command buffer"))?;

            let clear_values = [vk::ClearValue {
                color: vk::ClearColorValue {
                    float32: CLEAR_COLOR,
                },
            }];
            let pass_begin = vk::RenderPassBeginInfo::builder()
                .render_pass(render_pass)
                .framebuffer(image.framebuffer)
                .render_area(vk::Rect2D {
                    offset: vk::Offset2D { x: 0, y: 0 },
                    extent: image.extent,
                })
                .clear_values(&clear_values);
            self.device.cmd_begin_render_pass(
                submit.command_buffer,
                &pass_begin,
                vk::SubpassContents::INLINE,
            );

            for (rect, color) in rects {
                let attachment = vk::ClearAttachment {
                    aspect_mask: vk::ImageAspectFlags::COLOR,
                    color_attachment: 0,
                    clear_value: vk::ClearValue {
                        color: vk::ClearColorValue { float32: *color },
                    },
                };
                let clear_rect = vk::ClearRect {
                    rect: *rect,
                    base_array_layer: 0,
                    layer_count: 1,
                };
                self.device.cmd_clear_attachments(
                    submit.command_buffer,
                    std::slice::from_ref(&attachment),
                    std::slice::from_ref(&clear_rect),
                );
            }

            self.device.cmd_end_render_pass(submit.command_buffer);
            self.device
                .end_command_buffer(submit.command_buffer)
                .map_err(vk_err("end command buffer"))?;

            let submit_info = vk::SubmitInfo::builder()
                .command_buffers(std::slice::from_ref(&submit.command_buffer));
            self.device
                .queue_submit(submit.queue, std::slice::from_ref(&submit_info), submit.fence)
                .map_err(vk_err("queue submit"))?;

            // The runtime reads the image as soon as it is released.
            self.device
                .wait_for_fences(&[submit.fence], true, u64::MAX)
                .map_err(vk_err("fence wait"))?;
        }
        Ok(())
    }
}

impl Drop for VulkanContext {
    fn drop(&mut self) {
        unsafe {
            let _ = self.device.device_wait_idle();
            if let Some((_, pass)) = self.render_pass.take() {
                self.device.destroy_render_pass(pass, None);
            }
            self.submit.destroy(&self.device);
            self.device.destroy_device(None);
            self.instance.destroy_instance(None);
        }
    }
}

/// A runtime-owned swapchain image with the view and framebuffer drawn through.
pub struct VulkanImage {
    image: vk::Image,
    view: vk::ImageView,
    framebuffer: vk::Framebuffer,
    extent: vk::Extent2D,
    device: ash::Device,
}

impl VulkanImage {
    pub fn image(&self) -> vk::Image {
        self.image
    }

    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }
}

impl Drop for VulkanImage {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_framebuffer(self.framebuffer, None);
            self.device.destroy_image_view(self.view, None);
        }
    }
}

/// Vulkan through `XR_KHR_vulkan_enable`.
#[derive(Default)]
pub struct VulkanPlugin {
    context: Option<VulkanContext>,
}

impl VulkanPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    fn context(&self) -> XrResult<&VulkanContext> {
        self.context
            .as_ref()
            .ok_or_else(|| XrError::protocol("Vulkan device not initialized"))
    }

    fn context_mut(&mut self) -> XrResult<&mut VulkanContext> {
        self.context
            .as_mut()
            .ok_or_else(|| XrError::protocol("Vulkan device not initialized"))
    }
}

impl GraphicsPlugin<OpenXrRuntime<xr::Vulkan>> for VulkanPlugin {
    type Image = VulkanImage;

    fn name(&self) -> &str {
        "vulkan"
    }

    fn instance_extensions(&self) -> Vec<String> {
        vec!["XR_KHR_vulkan_enable".to_string()]
    }

    fn initialize_device(
        &mut self,
        _runtime: &OpenXrRuntime<xr::Vulkan>,
        instance: &xr::Instance,
        system: SystemId,
    ) -> XrResult<()> {
        if self.context.is_some() {
            return Err(XrError::protocol("Vulkan device already initialized"));
        }
        let context = VulkanContext::new(instance, convert::system_to_xr(system))?;
        info!(
            "Vulkan device ready (queue family {})",
            context.queue_family_index
        );
        self.context = Some(context);
        Ok(())
    }

    fn graphics_binding(&self) -> XrResult<xr::vulkan::SessionCreateInfo> {
        let context = self.context()?;
        Ok(xr::vulkan::SessionCreateInfo {
            instance: context.instance.handle().as_raw() as *const _,
            physical_device: context.physical_device.as_raw() as *const _,
            device: context.device.handle().as_raw() as *const _,
            queue_family_index: context.queue_family_index,
            queue_index: 0,
        })
    }

    fn select_color_swapchain_format(&self, formats: &[u32]) -> XrResult<u32> {
        let format = choose_format(formats).ok_or_else(|| {
            XrError::graphics(format!("no supported color swapchain format in {formats:?}"))
        })?;
        debug!("Vulkan color format {}", describe_format(format));
        Ok(format)
    }

    fn supported_swapchain_sample_count(&self, _view: &ViewConfigurationView) -> u32 {
        1
    }

    fn allocate_swapchain_image_structs(
        &mut self,
        images: Vec<u64>,
        create_info: &SwapchainCreateInfo<u32>,
    ) -> XrResult<Vec<VulkanImage>> {
        let format = create_info.format;
        let extent = vk::Extent2D {
            width: create_info.width,
            height: create_info.height,
        };
        let context = self.context_mut()?;
        let render_pass = context.render_pass(format)?;
        images
            .into_iter()
            .map(|raw| {
                context.wrap_image(
                    vk::Image::from_raw(raw),
                    vk::Format::from_raw(format as i32),
                    extent,
                    render_pass,
                )
            })
            .collect()
    }

    fn render_view(
        &mut self,
        view: &ProjectionView,
        image: &VulkanImage,
        color_format: u32,
        cubes: &[Cube],
    ) -> XrResult<()> {
        let context = self.context_mut()?;
        let render_pass = context.render_pass(color_format)?;

        let view_projection = view_projection(view);
        let mut rects: Vec<(vk::Rect2D, f32, [f32; 4])> = cubes
            .iter()
            .enumerate()
            .filter_map(|(i, cube)| {
                cube_screen_rect(view_projection, cube, image.extent)
                    .map(|(rect, depth)| (rect, depth, CUBE_COLORS[i % CUBE_COLORS.len()]))
            })
            .collect();
        // Farthest first so nearer cubes paint over them.
        rects.sort_by(|a, b| b.1.total_cmp(&a.1));
        let rects: Vec<(vk::Rect2D, [f32; 4])> =
            rects.into_iter().map(|(rect, _, color)| (rect, color)).collect();

        context.draw(render_pass, image, &rects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use halo_xr::Pose;
    use std::f32::consts::FRAC_PI_4;

    fn symmetric_view() -> ProjectionView {
        ProjectionView {
            pose: Pose::default(),
            fov: Fov {
                angle_left: -FRAC_PI_4,
                angle_right: FRAC_PI_4,
                angle_up: FRAC_PI_4,
                angle_down: -FRAC_PI_4,
            },
            image_rect: halo_xr::Extent2Di {
                width: 100,
                height: 100,
            },
        }
    }

    const EXTENT: vk::Extent2D = vk::Extent2D {
        width: 100,
        height: 100,
    };

    #[test]
    fn test_projection_maps_near_and_far_to_unit_depth() {
        let proj = projection_from_fov(symmetric_view().fov, NEAR_Z, FAR_Z);
        let near = proj * Vec4::new(0.0, 0.0, -NEAR_Z, 1.0);
        let far = proj * Vec4::new(0.0, 0.0, -FAR_Z, 1.0);
        assert!((near.z / near.w).abs() < 1e-5);
        assert!((far.z / far.w - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_projection_points_y_down() {
        let proj = projection_from_fov(symmetric_view().fov, NEAR_Z, FAR_Z);
        let up = proj * Vec4::new(0.0, 1.0, -1.0, 1.0);
        assert!((up.y / up.w + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_cube_ahead_is_centered() {
        let cube = Cube::uniform(Pose::translation(Vec3::new(0.0, 0.0, -2.0)), 0.5);
        let (rect, depth) =
            cube_screen_rect(view_projection(&symmetric_view()), &cube, EXTENT).unwrap();
        assert_eq!(rect.offset.x, 42);
        assert_eq!(rect.offset.y, 42);
        assert_eq!(rect.extent.width, 16);
        assert_eq!(rect.extent.height, 16);
        assert!(depth > 0.0 && depth < 1.0);
    }

    #[test]
    fn test_cube_behind_or_outside_is_skipped() {
        let vp = view_projection(&symmetric_view());
        let behind = Cube::uniform(Pose::translation(Vec3::new(0.0, 0.0, 2.0)), 0.5);
        assert!(cube_screen_rect(vp, &behind, EXTENT).is_none());
        let aside = Cube::uniform(Pose::translation(Vec3::new(10.0, 0.0, -1.0)), 0.5);
        assert!(cube_screen_rect(vp, &aside, EXTENT).is_none());
    }

    #[test]
    fn test_format_preference_order() {
        let formats = [
            vk::Format::B8G8R8A8_SRGB.as_raw() as u32,
            vk::Format::B8G8R8A8_UNORM.as_raw() as u32,
        ];
        assert_eq!(
            choose_format(&formats),
            Some(vk::Format::B8G8R8A8_UNORM.as_raw() as u32)
        );
        assert_eq!(choose_format(&[1, 2, 3]), None);
        assert_eq!(describe_format(formats[0]), "VK_FORMAT_B8G8R8A8_SRGB");
    }

    #[test]
    fn test_runtime_extension_list_is_split_on_whitespace() {
        let names = xr_vulkan_extensions(
            Ok("VK_KHR_external_memory  VK_KHR_dedicated_allocation\n".to_string()),
            "xrGetVulkanDeviceExtensionsKHR",
        )
        .unwrap();
        assert_eq!(
            names,
            vec![
                CString::new("VK_KHR_external_memory").unwrap(),
                CString::new("VK_KHR_dedicated_allocation").unwrap(),
            ]
        );

        let err = xr_vulkan_extensions(
            Err(xr::sys::Result::ERROR_RUNTIME_FAILURE),
            "xrGetVulkanInstanceExtensionsKHR",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            XrError::Runtime {
                call: "xrGetVulkanInstanceExtensionsKHR",
                ..
            }
        ));
    }
}
