//! Per-frame spatial queries and the per-view render pass.

use tracing::{debug, trace, warn};

use crate::input::InputState;
use crate::options::ReferenceSpaceKind;
use crate::plugin::GraphicsPlugin;
use crate::runtime::XrRuntime;
use crate::swapchain::SwapchainSet;
use crate::types::{Cube, Extent2Di, Hand, ProjectionView, Time, View};
use crate::{XrError, XrResult};

pub const VISUALIZED_SPACE_CUBE_SIZE: f32 = 0.25;
pub const HAND_CUBE_SIZE: f32 = 0.1;

/// What happened during one `render_frame` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameReport {
    pub should_render: bool,
    pub views_located: usize,
    pub cubes: usize,
    pub views_rendered: usize,
    pub layer_count: usize,
}

/// Cubes for every located visualized space, then one per located hand.
pub fn collect_cubes<R: XrRuntime>(
    runtime: &R,
    app_space: &R::Space,
    visualized_spaces: &[(ReferenceSpaceKind, R::Space)],
    input: Option<&InputState<R>>,
    time: Time,
) -> Vec<Cube> {
    let mut cubes = Vec::with_capacity(visualized_spaces.len() + 2);

    for (kind, space) in visualized_spaces {
        match runtime.locate_space(space, app_space, time) {
            Ok(location) if location.is_pose_valid() => {
                cubes.push(Cube::uniform(location.pose, VISUALIZED_SPACE_CUBE_SIZE));
            }
            Ok(_) => {}
            Err(err) => trace!("Unable to locate a visualized reference space {kind} in app space: {err}"),
        }
    }

    if let Some(input) = input {
        for hand in Hand::ALL {
            match runtime.locate_space(input.hand_space(hand), app_space, time) {
                Ok(location) if location.is_pose_valid() => {
                    let size = HAND_CUBE_SIZE * input.hand_scale(hand);
                    cubes.push(Cube::uniform(location.pose, size));
                }
                Ok(_) => {}
                Err(err) => {
                    if input.hand_active(hand) {
                        debug!("Unable to locate {hand} hand action space in app space: {err}");
                    }
                }
            }
        }
    }

    cubes
}

/// Result of drawing every view of one frame.
pub(crate) struct ViewPass {
    /// Per-view projection data, present only when every view was rendered.
    pub projection_views: Option<Vec<ProjectionView>>,
    pub views_rendered: usize,
    /// First hard failure, reported once the frame has been ended.
    pub error: Option<XrError>,
}

/// Acquire, wait, render and release one image per view.
///
/// Every image that was acquired and waited on is released. A view whose
/// acquire fails is dropped; a view whose wait fails keeps its image (it may
/// not be released unwaited) and fails the pass. Either way the frame loses
/// its projection layer.
pub(crate) fn render_views<R, G>(
    runtime: &R,
    graphics: &mut G,
    swapchains: &mut SwapchainSet<R, G>,
    views: &[View],
    cubes: &[Cube],
) -> ViewPass
where
    R: XrRuntime,
    G: GraphicsPlugin<R>,
{
    let mut pass = ViewPass {
        projection_views: None,
        views_rendered: 0,
        error: None,
    };
    let Some(color_format) = swapchains.color_format() else {
        pass.error = Some(XrError::protocol("rendering before swapchains were created"));
        return pass;
    };

    let mut projection_views = Vec::with_capacity(views.len());
    let mut complete = true;
    for (i, (view, entry)) in views.iter().zip(swapchains.entries_mut()).enumerate() {
        let image_index = match runtime.acquire_swapchain_image(&mut entry.handle) {
            Ok(index) => index as usize,
            Err(err) => {
                warn!("view {i}: swapchain acquire failed: {err}");
                complete = false;
                continue;
            }
        };

        let drawn = match runtime.wait_swapchain_image(&mut entry.handle) {
            Ok(()) => {
                let projection = ProjectionView {
                    pose: view.pose,
                    fov: view.fov,
                    image_rect: Extent2Di {
                        width: entry.width as i32,
                        height: entry.height as i32,
                    },
                };
                match entry.images.get(image_index) {
                    Some(image) => graphics
                        .render_view(&projection, image, color_format, cubes)
                        .map(|()| projection),
                    None => Err(XrError::protocol(format!(
                        "view {i}: acquired image index {image_index} out of {} images",
                        entry.images.len()
                    ))),
                }
            }
            Err(err) => {
                warn!("view {i}: swapchain wait failed: {err}");
                complete = false;
                pass.error.get_or_insert(err);
                continue;
            }
        };

        let released = runtime.release_swapchain_image(&mut entry.handle);

        match drawn {
            Ok(projection) => {
                pass.views_rendered += 1;
                projection_views.push(projection);
            }
            Err(err) => {
                complete = false;
                pass.error.get_or_insert(err);
            }
        }
        if let Err(err) = released {
            complete = false;
            pass.error.get_or_insert(err);
        }
    }

    if complete && projection_views.len() == views.len() {
        pass.projection_views = Some(projection_views);
    }
    pass
}

/// Pick the error to surface once the frame is closed: a failed `end_frame`
/// wins over anything recorded while the frame was open.
pub(crate) fn finish_frame(
    report: FrameReport,
    pending: Option<XrError>,
    end: XrResult<()>,
) -> XrResult<FrameReport> {
    end?;
    match pending {
        Some(err) => Err(err),
        None => Ok(report),
    }
}
