//! Read-only queries describing what the runtime offers.
//!
//! Apart from blend-mode validation these are informational: callers log the
//! results and a failing query only costs diagnostics.

use std::fmt::{Debug, Write};

use tracing::{debug, error, info, warn};

use crate::runtime::XrRuntime;
use crate::types::{
    ApiLayerProperties, EnvironmentBlendMode, SystemId, ViewConfigurationType,
    ViewConfigurationView,
};
use crate::{XrError, XrResult};

/// One view configuration as reported by the runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewConfigurationInfo {
    pub view_configuration: ViewConfigurationType,
    pub fov_mutable: bool,
    pub views: Vec<ViewConfigurationView>,
    pub blend_modes: Vec<EnvironmentBlendMode>,
}

pub fn api_layers<R: XrRuntime>(runtime: &R) -> XrResult<Vec<ApiLayerProperties>> {
    runtime.enumerate_api_layers()
}

pub fn instance_extensions<R: XrRuntime>(runtime: &R) -> XrResult<Vec<String>> {
    runtime.enumerate_instance_extensions()
}

pub fn view_configurations<R: XrRuntime>(
    runtime: &R,
    instance: &R::Instance,
    system: SystemId,
) -> XrResult<Vec<ViewConfigurationInfo>> {
    let types = runtime.enumerate_view_configurations(instance, system)?;
    let mut out = Vec::with_capacity(types.len());
    for view_configuration in types {
        let properties =
            runtime.view_configuration_properties(instance, system, view_configuration)?;
        let views =
            runtime.enumerate_view_configuration_views(instance, system, view_configuration)?;
        let blend_modes =
            runtime.enumerate_environment_blend_modes(instance, system, view_configuration)?;
        out.push(ViewConfigurationInfo {
            view_configuration,
            fov_mutable: properties.fov_mutable,
            views,
            blend_modes,
        });
    }
    Ok(out)
}

pub fn log_layers_and_extensions<R: XrRuntime>(runtime: &R) {
    match instance_extensions(runtime) {
        Ok(extensions) => {
            debug!("Available Extensions: ({})", extensions.len());
            for name in &extensions {
                debug!("  Name={}", name);
            }
        }
        Err(err) => warn!("unable to enumerate instance extensions: {err}"),
    }

    match api_layers(runtime) {
        Ok(layers) => {
            info!("Available Layers: ({})", layers.len());
            for layer in &layers {
                debug!(
                    "  Name={} SpecVersion={} LayerVersion={} Description={}",
                    layer.layer_name, layer.spec_version, layer.layer_version, layer.description
                );
            }
        }
        Err(err) => warn!("unable to enumerate API layers: {err}"),
    }
}

pub fn log_instance_info<R: XrRuntime>(runtime: &R, instance: &R::Instance) -> XrResult<()> {
    let properties = runtime.instance_properties(instance)?;
    info!(
        "Instance RuntimeName={} RuntimeVersion={}",
        properties.runtime_name, properties.runtime_version
    );
    Ok(())
}

pub fn log_view_configurations(
    configurations: &[ViewConfigurationInfo],
    selected: ViewConfigurationType,
) {
    info!(
        "Available View Configuration Types: ({})",
        configurations.len()
    );
    for config in configurations {
        let marker = if config.view_configuration == selected {
            "(Selected)"
        } else {
            ""
        };
        debug!("  View Configuration Type: {} {}", config.view_configuration, marker);
        debug!(
            "  View configuration FovMutable={}",
            if config.fov_mutable { "True" } else { "False" }
        );
        for (i, view) in config.views.iter().enumerate() {
            debug!(
                "    View [{}]: Recommended Width={} Height={} SampleCount={}",
                i,
                view.recommended_image_rect_width,
                view.recommended_image_rect_height,
                view.recommended_swapchain_sample_count
            );
            debug!(
                "    View [{}]:     Maximum Width={} Height={} SampleCount={}",
                i,
                view.max_image_rect_width,
                view.max_image_rect_height,
                view.max_swapchain_sample_count
            );
        }
        if config.views.is_empty() {
            error!("Empty view configuration type {}", config.view_configuration);
        }
    }
}

/// Fail unless the runtime offers `blend_mode` for `view_configuration`.
///
/// A configured blend mode the runtime does not offer cannot be recovered
/// from, so this is a configuration error rather than a warning.
pub fn validate_blend_mode(
    configurations: &[ViewConfigurationInfo],
    view_configuration: ViewConfigurationType,
    blend_mode: EnvironmentBlendMode,
) -> XrResult<()> {
    let config = configurations
        .iter()
        .find(|c| c.view_configuration == view_configuration)
        .ok_or_else(|| {
            XrError::config(format!(
                "view configuration {view_configuration} is not offered by the runtime"
            ))
        })?;

    info!(
        "Available Environment Blend Mode count : ({})",
        config.blend_modes.len()
    );
    for mode in &config.blend_modes {
        let marker = if *mode == blend_mode { "(Selected)" } else { "" };
        info!("Environment Blend Mode ({}) : {}", mode, marker);
    }

    if config.blend_modes.contains(&blend_mode) {
        Ok(())
    } else {
        Err(XrError::config(format!(
            "environment blend mode {blend_mode} is not offered for {view_configuration}"
        )))
    }
}

pub fn log_reference_spaces<R: XrRuntime>(runtime: &R, session: &R::Session) {
    match runtime.enumerate_reference_spaces(session) {
        Ok(spaces) => {
            info!("Available reference spaces: {}", spaces.len());
            for space in spaces {
                debug!("  Name: {}", space);
            }
        }
        Err(err) => warn!("unable to enumerate reference spaces: {err}"),
    }
}

pub fn log_system_properties<R: XrRuntime>(
    runtime: &R,
    instance: &R::Instance,
    system: SystemId,
) -> XrResult<()> {
    let props = runtime.system_properties(instance, system)?;
    info!(
        "System Properties: Name={} VendorId={}",
        props.system_name, props.vendor_id
    );
    info!(
        "System Graphics Properties: MaxWidth={} MaxHeight={} MaxLayers={}",
        props.max_swapchain_image_width, props.max_swapchain_image_height, props.max_layer_count
    );
    info!(
        "System Tracking Properties: OrientationTracking={} PositionTracking={}",
        if props.orientation_tracking { "True" } else { "False" },
        if props.position_tracking { "True" } else { "False" }
    );
    Ok(())
}

/// Render a format list with the selected entry bracketed, e.g. ` 1 [2] 3`.
pub fn describe_formats<F: Copy + PartialEq + Debug>(formats: &[F], selected: F) -> String {
    let mut out = String::new();
    for format in formats {
        if *format == selected {
            let _ = write!(out, " [{format:?}]");
        } else {
            let _ = write!(out, " {format:?}");
        }
    }
    out
}
