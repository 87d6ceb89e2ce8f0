use std::fmt::Debug;

use openxr as xr;
use tracing::debug;

use halo_xr::{
    ActionState, ActionType, ApiLayerProperties, ApplicationInfo, EnvironmentBlendMode, FormFactor,
    FrameState, HapticPulse, InstanceProperties, Pose, ProjectionLayer, RawHandle,
    ReferenceSpaceType, RuntimeEvent, SpaceLocation, SwapchainCreateInfo, SystemId,
    SystemProperties, Time, View, ViewConfigurationProperties, ViewConfigurationType,
    ViewConfigurationView, ViewStateFlags, XrError, XrResult, XrRuntime,
};

use crate::convert;

/// Session plus the frame-loop halves `openxr` splits off at creation.
pub struct OxrSession<G: xr::Graphics> {
    frame_stream: xr::FrameStream<G>,
    frame_waiter: xr::FrameWaiter,
    session: xr::Session<G>,
}

impl<G: xr::Graphics> OxrSession<G> {
    pub fn session(&self) -> &xr::Session<G> {
        &self.session
    }
}

/// `openxr` actions are typed by their state; the session core sees one handle type.
pub enum OxrAction {
    Float(xr::Action<f32>),
    Boolean(xr::Action<bool>),
    Pose(xr::Action<xr::Posef>),
    Vibration(xr::Action<xr::Haptic>),
}

impl OxrAction {
    fn binding(&self, path: xr::Path) -> xr::Binding<'_> {
        match self {
            OxrAction::Float(a) => xr::Binding::new(a, path),
            OxrAction::Boolean(a) => xr::Binding::new(a, path),
            OxrAction::Pose(a) => xr::Binding::new(a, path),
            OxrAction::Vibration(a) => xr::Binding::new(a, path),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            OxrAction::Float(_) => "float",
            OxrAction::Boolean(_) => "boolean",
            OxrAction::Pose(_) => "pose",
            OxrAction::Vibration(_) => "vibration",
        }
    }
}

fn wrong_action(call: &'static str, action: &OxrAction) -> XrError {
    XrError::protocol(format!("{call} called on a {} action", action.kind()))
}

/// The production runtime: the system OpenXR loader, over graphics API `G`.
pub struct OpenXrRuntime<G: xr::Graphics> {
    entry: xr::Entry,
    event_buffer: xr::EventDataBuffer,
    _graphics: std::marker::PhantomData<G>,
}

impl<G: xr::Graphics> OpenXrRuntime<G> {
    /// Load the OpenXR loader library.
    pub fn load() -> XrResult<Self> {
        let entry = unsafe { xr::Entry::load() }
            .map_err(|e| XrError::Unavailable(format!("OpenXR load failed: {e:?}")))?;
        Ok(Self {
            entry,
            event_buffer: xr::EventDataBuffer::new(),
            _graphics: std::marker::PhantomData,
        })
    }

    pub fn entry(&self) -> &xr::Entry {
        &self.entry
    }
}

/// Names of the enabled members of `set`.
pub fn extension_names(set: &xr::ExtensionSet) -> Vec<String> {
    #[allow(unused_mut)]
    let mut known = vec![
        (set.khr_vulkan_enable, "XR_KHR_vulkan_enable"),
        (set.khr_vulkan_enable2, "XR_KHR_vulkan_enable2"),
        (set.khr_opengl_enable, "XR_KHR_opengl_enable"),
        (set.khr_composition_layer_depth, "XR_KHR_composition_layer_depth"),
        (set.ext_debug_utils, "XR_EXT_debug_utils"),
        (set.ext_hand_tracking, "XR_EXT_hand_tracking"),
    ];
    #[cfg(target_os = "android")]
    known.push((set.khr_android_create_instance, "XR_KHR_android_create_instance"));
    known
        .into_iter()
        .filter(|(enabled, _)| *enabled)
        .map(|(_, name)| name.to_string())
        .chain(set.other.iter().map(|raw| String::from_utf8_lossy(raw).into_owned()))
        .collect()
}

/// The inverse of [`extension_names`]; unrecognised names go to `other`.
pub fn extension_set(names: &[String]) -> xr::ExtensionSet {
    let mut set = xr::ExtensionSet::default();
    for name in names {
        match name.as_str() {
            "XR_KHR_vulkan_enable" => set.khr_vulkan_enable = true,
            "XR_KHR_vulkan_enable2" => set.khr_vulkan_enable2 = true,
            "XR_KHR_opengl_enable" => set.khr_opengl_enable = true,
            "XR_KHR_composition_layer_depth" => set.khr_composition_layer_depth = true,
            #[cfg(target_os = "android")]
            "XR_KHR_android_create_instance" => set.khr_android_create_instance = true,
            "XR_EXT_debug_utils" => set.ext_debug_utils = true,
            "XR_EXT_hand_tracking" => set.ext_hand_tracking = true,
            other => set.other.push(other.as_bytes().to_vec()),
        }
    }
    set
}

impl<G> XrRuntime for OpenXrRuntime<G>
where
    G: xr::Graphics,
    G::Format: PartialEq + Debug,
{
    type Instance = xr::Instance;
    type Session = OxrSession<G>;
    type Space = xr::Space;
    type Swapchain = xr::Swapchain<G>;
    type ActionSet = xr::ActionSet;
    type Action = OxrAction;
    type Path = xr::Path;
    type Format = G::Format;
    type SwapchainImage = G::SwapchainImage;
    type GraphicsBinding = G::SessionCreateInfo;

    fn enumerate_api_layers(&self) -> XrResult<Vec<ApiLayerProperties>> {
        let layers = self
            .entry
            .enumerate_layers()
            .map_err(|e| XrError::runtime("xrEnumerateApiLayerProperties", e))?;
        Ok(layers
            .into_iter()
            .map(|layer| ApiLayerProperties {
                layer_name: layer.layer_name,
                spec_version: convert::version_from_xr(layer.spec_version),
                layer_version: layer.layer_version,
                description: layer.description,
            })
            .collect())
    }

    fn enumerate_instance_extensions(&self) -> XrResult<Vec<String>> {
        let set = self
            .entry
            .enumerate_extensions()
            .map_err(|e| XrError::runtime("xrEnumerateInstanceExtensionProperties", e))?;
        Ok(extension_names(&set))
    }

    fn create_instance(
        &self,
        app_info: &ApplicationInfo,
        extensions: &[String],
    ) -> XrResult<xr::Instance> {
        let available = self
            .entry
            .enumerate_extensions()
            .map_err(|e| XrError::runtime("xrEnumerateInstanceExtensionProperties", e))?;
        let available = extension_names(&available);
        if let Some(missing) = extensions.iter().find(|ext| !available.contains(ext)) {
            return Err(XrError::Unavailable(format!(
                "OpenXR extension {missing} not available"
            )));
        }

        let info = xr::ApplicationInfo {
            application_name: &app_info.application_name,
            application_version: app_info.application_version,
            engine_name: &app_info.engine_name,
            engine_version: app_info.engine_version,
            api_version: xr::Version::new(1, 0, 0),
        };
        self.entry
            .create_instance(&info, &extension_set(extensions), &[])
            .map_err(|e| XrError::runtime("xrCreateInstance", e))
    }

    fn instance_properties(&self, instance: &xr::Instance) -> XrResult<InstanceProperties> {
        let props = instance
            .properties()
            .map_err(|e| XrError::runtime("xrGetInstanceProperties", e))?;
        Ok(InstanceProperties {
            runtime_name: props.runtime_name,
            runtime_version: convert::version_from_xr(props.runtime_version),
        })
    }

    fn system(&self, instance: &xr::Instance, form_factor: FormFactor) -> XrResult<SystemId> {
        instance
            .system(convert::form_factor_to_xr(form_factor))
            .map(convert::system_from_xr)
            .map_err(|e| XrError::runtime("xrGetSystem", e))
    }

    fn system_properties(
        &self,
        instance: &xr::Instance,
        system: SystemId,
    ) -> XrResult<SystemProperties> {
        let props = instance
            .system_properties(convert::system_to_xr(system))
            .map_err(|e| XrError::runtime("xrGetSystemProperties", e))?;
        Ok(SystemProperties {
            system_name: props.system_name,
            vendor_id: props.vendor_id,
            max_swapchain_image_width: props.graphics_properties.max_swapchain_image_width,
            max_swapchain_image_height: props.graphics_properties.max_swapchain_image_height,
            max_layer_count: props.graphics_properties.max_layer_count,
            orientation_tracking: props.tracking_properties.orientation_tracking,
            position_tracking: props.tracking_properties.position_tracking,
        })
    }

    fn enumerate_view_configurations(
        &self,
        instance: &xr::Instance,
        system: SystemId,
    ) -> XrResult<Vec<ViewConfigurationType>> {
        let types = instance
            .enumerate_view_configurations(convert::system_to_xr(system))
            .map_err(|e| XrError::runtime("xrEnumerateViewConfigurations", e))?;
        Ok(types
            .into_iter()
            .map(convert::view_configuration_from_xr)
            .collect())
    }

    fn view_configuration_properties(
        &self,
        instance: &xr::Instance,
        system: SystemId,
        view_configuration: ViewConfigurationType,
    ) -> XrResult<ViewConfigurationProperties> {
        let props = instance
            .view_configuration_properties(
                convert::system_to_xr(system),
                convert::view_configuration_to_xr(view_configuration),
            )
            .map_err(|e| XrError::runtime("xrGetViewConfigurationProperties", e))?;
        Ok(ViewConfigurationProperties {
            view_configuration_type: convert::view_configuration_from_xr(
                props.view_configuration_type,
            ),
            fov_mutable: props.fov_mutable,
        })
    }

    fn enumerate_view_configuration_views(
        &self,
        instance: &xr::Instance,
        system: SystemId,
        view_configuration: ViewConfigurationType,
    ) -> XrResult<Vec<ViewConfigurationView>> {
        let views = instance
            .enumerate_view_configuration_views(
                convert::system_to_xr(system),
                convert::view_configuration_to_xr(view_configuration),
            )
            .map_err(|e| XrError::runtime("xrEnumerateViewConfigurationViews", e))?;
        Ok(views
            .iter()
            .map(convert::view_configuration_view_from_xr)
            .collect())
    }

    fn enumerate_environment_blend_modes(
        &self,
        instance: &xr::Instance,
        system: SystemId,
        view_configuration: ViewConfigurationType,
    ) -> XrResult<Vec<EnvironmentBlendMode>> {
        let modes = instance
            .enumerate_environment_blend_modes(
                convert::system_to_xr(system),
                convert::view_configuration_to_xr(view_configuration),
            )
            .map_err(|e| XrError::runtime("xrEnumerateEnvironmentBlendModes", e))?;
        Ok(modes.into_iter().map(convert::blend_mode_from_xr).collect())
    }

    fn create_session(
        &self,
        instance: &xr::Instance,
        system: SystemId,
        binding: &G::SessionCreateInfo,
    ) -> XrResult<OxrSession<G>> {
        // The binding comes from the graphics plugin's live device.
        let (session, frame_waiter, frame_stream) = unsafe {
            instance
                .create_session::<G>(convert::system_to_xr(system), binding)
                .map_err(|e| XrError::runtime("xrCreateSession", e))?
        };
        Ok(OxrSession {
            frame_stream,
            frame_waiter,
            session,
        })
    }

    fn session_handle(&self, session: &OxrSession<G>) -> RawHandle {
        convert::session_handle(session.session.as_raw())
    }

    fn begin_session(
        &self,
        session: &OxrSession<G>,
        view_configuration: ViewConfigurationType,
    ) -> XrResult<()> {
        session
            .session
            .begin(convert::view_configuration_to_xr(view_configuration))
            .map(|_| ())
            .map_err(|e| XrError::runtime("xrBeginSession", e))
    }

    fn end_session(&self, session: &OxrSession<G>) -> XrResult<()> {
        session
            .session
            .end()
            .map(|_| ())
            .map_err(|e| XrError::runtime("xrEndSession", e))
    }

    fn request_exit_session(&self, session: &OxrSession<G>) -> XrResult<()> {
        session
            .session
            .request_exit()
            .map_err(|e| XrError::runtime("xrRequestExitSession", e))
    }

    fn poll_event(&mut self, instance: &xr::Instance) -> XrResult<Option<RuntimeEvent>> {
        let event = instance
            .poll_event(&mut self.event_buffer)
            .map_err(|e| XrError::runtime("xrPollEvent", e))?;
        Ok(event.map(convert::event_from_xr))
    }

    fn enumerate_reference_spaces(
        &self,
        session: &OxrSession<G>,
    ) -> XrResult<Vec<ReferenceSpaceType>> {
        let spaces = session
            .session
            .enumerate_reference_spaces()
            .map_err(|e| XrError::runtime("xrEnumerateReferenceSpaces", e))?;
        Ok(spaces
            .into_iter()
            .map(convert::reference_space_from_xr)
            .collect())
    }

    fn create_reference_space(
        &self,
        session: &OxrSession<G>,
        space_type: ReferenceSpaceType,
        pose_in_reference_space: Pose,
    ) -> XrResult<xr::Space> {
        session
            .session
            .create_reference_space(
                convert::reference_space_to_xr(space_type),
                convert::pose_to_xr(pose_in_reference_space),
            )
            .map_err(|e| XrError::runtime("xrCreateReferenceSpace", e))
    }

    fn locate_space(
        &self,
        space: &xr::Space,
        base: &xr::Space,
        time: Time,
    ) -> XrResult<SpaceLocation> {
        let location = space
            .locate(base, convert::time_to_xr(time))
            .map_err(|e| XrError::runtime("xrLocateSpace", e))?;
        Ok(SpaceLocation {
            flags: convert::space_location_flags_from_xr(location.location_flags),
            pose: convert::pose_from_xr(location.pose),
        })
    }

    fn string_to_path(&self, instance: &xr::Instance, path: &str) -> XrResult<xr::Path> {
        instance
            .string_to_path(path)
            .map_err(|e| XrError::runtime("xrStringToPath", e))
    }

    fn create_action_set(
        &self,
        instance: &xr::Instance,
        name: &str,
        localized_name: &str,
        priority: u32,
    ) -> XrResult<xr::ActionSet> {
        instance
            .create_action_set(name, localized_name, priority)
            .map_err(|e| XrError::runtime("xrCreateActionSet", e))
    }

    fn create_action(
        &self,
        action_set: &xr::ActionSet,
        name: &str,
        localized_name: &str,
        action_type: ActionType,
        subaction_paths: &[xr::Path],
    ) -> XrResult<OxrAction> {
        let map = |e| XrError::runtime("xrCreateAction", e);
        Ok(match action_type {
            ActionType::FloatInput => OxrAction::Float(
                action_set
                    .create_action(name, localized_name, subaction_paths)
                    .map_err(map)?,
            ),
            ActionType::BooleanInput => OxrAction::Boolean(
                action_set
                    .create_action(name, localized_name, subaction_paths)
                    .map_err(map)?,
            ),
            ActionType::PoseInput => OxrAction::Pose(
                action_set
                    .create_action(name, localized_name, subaction_paths)
                    .map_err(map)?,
            ),
            ActionType::VibrationOutput => OxrAction::Vibration(
                action_set
                    .create_action(name, localized_name, subaction_paths)
                    .map_err(map)?,
            ),
        })
    }

    fn suggest_interaction_profile_bindings(
        &self,
        instance: &xr::Instance,
        interaction_profile: xr::Path,
        bindings: &[(&OxrAction, xr::Path)],
    ) -> XrResult<()> {
        let bindings: Vec<xr::Binding<'_>> = bindings
            .iter()
            .map(|(action, path)| action.binding(*path))
            .collect();
        instance
            .suggest_interaction_profile_bindings(interaction_profile, &bindings)
            .map_err(|e| XrError::runtime("xrSuggestInteractionProfileBindings", e))
    }

    fn create_action_space(
        &self,
        session: &OxrSession<G>,
        action: &OxrAction,
        subaction_path: xr::Path,
    ) -> XrResult<xr::Space> {
        let OxrAction::Pose(action) = action else {
            return Err(wrong_action("xrCreateActionSpace", action));
        };
        action
            .create_space(&session.session, subaction_path, xr::Posef::IDENTITY)
            .map_err(|e| XrError::runtime("xrCreateActionSpace", e))
    }

    fn attach_action_sets(
        &self,
        session: &OxrSession<G>,
        action_sets: &[&xr::ActionSet],
    ) -> XrResult<()> {
        session
            .session
            .attach_action_sets(action_sets)
            .map_err(|e| XrError::runtime("xrAttachSessionActionSets", e))
    }

    fn sync_actions(&self, session: &OxrSession<G>, action_set: &xr::ActionSet) -> XrResult<()> {
        session
            .session
            .sync_actions(&[xr::ActiveActionSet::new(action_set)])
            .map_err(|e| XrError::runtime("xrSyncActions", e))
    }

    fn action_state_float(
        &self,
        session: &OxrSession<G>,
        action: &OxrAction,
        subaction_path: Option<xr::Path>,
    ) -> XrResult<ActionState<f32>> {
        let OxrAction::Float(action) = action else {
            return Err(wrong_action("xrGetActionStateFloat", action));
        };
        let state = action
            .state(&session.session, subaction_path.unwrap_or(xr::Path::NULL))
            .map_err(|e| XrError::runtime("xrGetActionStateFloat", e))?;
        Ok(convert::action_state_from_xr(&state))
    }

    fn action_state_boolean(
        &self,
        session: &OxrSession<G>,
        action: &OxrAction,
        subaction_path: Option<xr::Path>,
    ) -> XrResult<ActionState<bool>> {
        let OxrAction::Boolean(action) = action else {
            return Err(wrong_action("xrGetActionStateBoolean", action));
        };
        let state = action
            .state(&session.session, subaction_path.unwrap_or(xr::Path::NULL))
            .map_err(|e| XrError::runtime("xrGetActionStateBoolean", e))?;
        Ok(convert::action_state_from_xr(&state))
    }

    fn action_pose_active(
        &self,
        session: &OxrSession<G>,
        action: &OxrAction,
        subaction_path: xr::Path,
    ) -> XrResult<bool> {
        let OxrAction::Pose(action) = action else {
            return Err(wrong_action("xrGetActionStatePose", action));
        };
        action
            .is_active(&session.session, subaction_path)
            .map_err(|e| XrError::runtime("xrGetActionStatePose", e))
    }

    fn apply_haptic_feedback(
        &self,
        session: &OxrSession<G>,
        action: &OxrAction,
        subaction_path: xr::Path,
        pulse: HapticPulse,
    ) -> XrResult<()> {
        let OxrAction::Vibration(action) = action else {
            return Err(wrong_action("xrApplyHapticFeedback", action));
        };
        let vibration = xr::HapticVibration::new()
            .amplitude(pulse.amplitude)
            .duration(xr::Duration::MIN_HAPTIC)
            .frequency(xr::FREQUENCY_UNSPECIFIED);
        action
            .apply_feedback(&session.session, subaction_path, &vibration)
            .map_err(|e| XrError::runtime("xrApplyHapticFeedback", e))
    }

    fn enumerate_bound_sources(
        &self,
        session: &OxrSession<G>,
        action: &OxrAction,
    ) -> XrResult<Vec<xr::Path>> {
        let sources = match action {
            OxrAction::Float(a) => a.bound_sources(&session.session),
            OxrAction::Boolean(a) => a.bound_sources(&session.session),
            OxrAction::Pose(a) => a.bound_sources(&session.session),
            OxrAction::Vibration(a) => a.bound_sources(&session.session),
        };
        sources.map_err(|e| XrError::runtime("xrEnumerateBoundSourcesForAction", e))
    }

    fn input_source_localized_name(
        &self,
        session: &OxrSession<G>,
        source: xr::Path,
    ) -> XrResult<String> {
        // Include the hand, the controller family and the component, e.g.
        // "Left Hand Oculus Touch Controller Trigger".
        let flags = xr::InputSourceLocalizedNameFlags::USER_PATH
            | xr::InputSourceLocalizedNameFlags::INTERACTION_PROFILE
            | xr::InputSourceLocalizedNameFlags::COMPONENT;
        session
            .session
            .input_source_localized_name(source, flags)
            .map_err(|e| XrError::runtime("xrGetInputSourceLocalizedName", e))
    }

    fn enumerate_swapchain_formats(&self, session: &OxrSession<G>) -> XrResult<Vec<G::Format>> {
        session
            .session
            .enumerate_swapchain_formats()
            .map_err(|e| XrError::runtime("xrEnumerateSwapchainFormats", e))
    }

    fn create_swapchain(
        &self,
        session: &OxrSession<G>,
        create_info: &SwapchainCreateInfo<G::Format>,
    ) -> XrResult<xr::Swapchain<G>> {
        let info = xr::SwapchainCreateInfo::<G> {
            create_flags: xr::SwapchainCreateFlags::EMPTY,
            usage_flags: convert::swapchain_usage_to_xr(create_info.usage_flags),
            format: create_info.format,
            sample_count: create_info.sample_count,
            width: create_info.width,
            height: create_info.height,
            face_count: create_info.face_count,
            array_size: create_info.array_size,
            mip_count: create_info.mip_count,
        };
        session
            .session
            .create_swapchain(&info)
            .map_err(|e| XrError::runtime("xrCreateSwapchain", e))
    }

    fn enumerate_swapchain_images(
        &self,
        swapchain: &xr::Swapchain<G>,
    ) -> XrResult<Vec<G::SwapchainImage>> {
        swapchain
            .enumerate_images()
            .map_err(|e| XrError::runtime("xrEnumerateSwapchainImages", e))
    }

    fn acquire_swapchain_image(&self, swapchain: &mut xr::Swapchain<G>) -> XrResult<u32> {
        swapchain
            .acquire_image()
            .map_err(|e| XrError::runtime("xrAcquireSwapchainImage", e))
    }

    fn wait_swapchain_image(&self, swapchain: &mut xr::Swapchain<G>) -> XrResult<()> {
        // XR_TIMEOUT_EXPIRED is a success code here, so only an infinite wait
        // guarantees the image is ready and releasable.
        swapchain
            .wait_image(xr::Duration::INFINITE)
            .map_err(|e| XrError::runtime("xrWaitSwapchainImage", e))
    }

    fn release_swapchain_image(&self, swapchain: &mut xr::Swapchain<G>) -> XrResult<()> {
        swapchain
            .release_image()
            .map_err(|e| XrError::runtime("xrReleaseSwapchainImage", e))
    }

    fn wait_frame(&self, session: &mut OxrSession<G>) -> XrResult<FrameState> {
        let state = session
            .frame_waiter
            .wait()
            .map_err(|e| XrError::runtime("xrWaitFrame", e))?;
        Ok(FrameState {
            predicted_display_time: convert::time_from_xr(state.predicted_display_time),
            predicted_display_period: state.predicted_display_period.as_nanos(),
            should_render: state.should_render,
        })
    }

    fn begin_frame(&self, session: &mut OxrSession<G>) -> XrResult<()> {
        session
            .frame_stream
            .begin()
            .map_err(|e| XrError::runtime("xrBeginFrame", e))
    }

    fn locate_views(
        &self,
        session: &OxrSession<G>,
        view_configuration: ViewConfigurationType,
        display_time: Time,
        space: &xr::Space,
    ) -> XrResult<(ViewStateFlags, Vec<View>)> {
        let (flags, views) = session
            .session
            .locate_views(
                convert::view_configuration_to_xr(view_configuration),
                convert::time_to_xr(display_time),
                space,
            )
            .map_err(|e| XrError::runtime("xrLocateViews", e))?;
        Ok((
            convert::view_state_flags_from_xr(flags),
            views.iter().map(convert::view_from_xr).collect(),
        ))
    }

    fn end_frame(
        &self,
        session: &mut OxrSession<G>,
        display_time: Time,
        blend_mode: EnvironmentBlendMode,
        layer: Option<&ProjectionLayer<'_, Self>>,
    ) -> XrResult<()> {
        let display_time = convert::time_to_xr(display_time);
        let blend_mode = convert::blend_mode_to_xr(blend_mode);
        let result = match layer {
            Some(layer) => {
                let views: Vec<xr::CompositionLayerProjectionView<'_, G>> = layer
                    .views
                    .iter()
                    .map(|view| {
                        xr::CompositionLayerProjectionView::new()
                            .pose(convert::pose_to_xr(view.pose))
                            .fov(convert::fov_to_xr(view.fov))
                            .sub_image(
                                xr::SwapchainSubImage::new()
                                    .swapchain(view.swapchain)
                                    .image_array_index(0)
                                    .image_rect(xr::Rect2Di {
                                        offset: xr::Offset2Di { x: 0, y: 0 },
                                        extent: xr::Extent2Di {
                                            width: view.image_rect.width,
                                            height: view.image_rect.height,
                                        },
                                    }),
                            )
                    })
                    .collect();
                let projection = xr::CompositionLayerProjection::new()
                    .space(layer.space)
                    .views(&views);
                let layers: [&xr::CompositionLayerBase<'_, G>; 1] = [&projection];
                session.frame_stream.end(display_time, blend_mode, &layers)
            }
            None => session.frame_stream.end(display_time, blend_mode, &[]),
        };
        if let Err(err) = &result {
            debug!("xrEndFrame failed with {} layer(s): {err}", usize::from(layer.is_some()));
        }
        result.map_err(|e| XrError::runtime("xrEndFrame", e))
    }
}
