//! Scripted in-memory runtime and recording plugins for driving `XrProgram`.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

use halo_xr::{
    ActionState, ActionType, ApiLayerProperties, ApplicationInfo, Cube, EnvironmentBlendMode,
    FormFactor, FrameState, GraphicsPlugin, Hand, HapticPulse, InstanceProperties, Options,
    PerHand, PlatformPlugin, Pose, ProjectionLayer, ProjectionView, RawHandle,
    ReferenceSpaceType, RuntimeEvent, SessionState, SpaceLocation, SpaceLocationFlags,
    SwapchainCreateInfo, SystemId, SystemProperties, Time, Version, View,
    ViewConfigurationProperties, ViewConfigurationType, ViewConfigurationView, ViewStateFlags,
    XrError, XrProgram, XrResult, XrRuntime,
};

pub const SESSION_HANDLE: RawHandle = RawHandle(0x5e55);
pub const FRAME_PERIOD_NS: i64 = 11_111_111;

#[derive(Debug, Clone, PartialEq)]
pub struct EndFrameRecord {
    pub display_time: Time,
    pub blend_mode: EnvironmentBlendMode,
    /// Number of views in the submitted projection layer, if one was submitted.
    pub layer_views: Option<usize>,
}

/// Everything the scripted runtime records or is told to do.
pub struct MockState {
    pub calls: Vec<&'static str>,
    pub events: VecDeque<RuntimeEvent>,
    pub failing_calls: HashSet<&'static str>,
    /// Zero-based indices of `create_reference_space` calls that fail.
    pub failing_reference_spaces: HashSet<usize>,
    pub reference_space_calls: usize,
    /// Space labels whose location query fails.
    pub failing_locations: HashSet<String>,
    pub failing_acquire_swapchains: HashSet<usize>,
    pub failing_wait_swapchains: HashSet<usize>,
    pub rejected_profiles: HashSet<String>,
    pub suggested_profiles: Vec<String>,
    pub enabled_extensions: Vec<String>,
    pub view_configurations: Vec<ViewConfigurationType>,
    pub blend_modes: Vec<EnvironmentBlendMode>,
    pub view_state: ViewStateFlags,
    pub should_render: bool,
    pub image_count: u32,
    pub grab: PerHand<ActionState<f32>>,
    pub pose_active: PerHand<bool>,
    pub quit: ActionState<bool>,
    pub haptics: Vec<(String, f32)>,
    pub acquires: Vec<usize>,
    pub releases: Vec<usize>,
    pub end_frames: Vec<EndFrameRecord>,
    pub exit_requests: usize,
    pub frame: i64,
    paths: Vec<String>,
    next_swapchain: usize,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            events: VecDeque::new(),
            failing_calls: HashSet::new(),
            failing_reference_spaces: HashSet::new(),
            reference_space_calls: 0,
            failing_locations: HashSet::new(),
            failing_acquire_swapchains: HashSet::new(),
            failing_wait_swapchains: HashSet::new(),
            rejected_profiles: HashSet::new(),
            suggested_profiles: Vec::new(),
            enabled_extensions: Vec::new(),
            view_configurations: vec![
                ViewConfigurationType::PrimaryMono,
                ViewConfigurationType::PrimaryStereo,
            ],
            blend_modes: vec![EnvironmentBlendMode::Opaque],
            view_state: ViewStateFlags::all(),
            should_render: true,
            image_count: 3,
            grab: PerHand::splat(ActionState::default()),
            pose_active: PerHand::splat(true),
            quit: ActionState::default(),
            haptics: Vec::new(),
            acquires: Vec::new(),
            releases: Vec::new(),
            end_frames: Vec::new(),
            exit_requests: 0,
            frame: 0,
            paths: Vec::new(),
            next_swapchain: 0,
        }
    }
}

impl MockState {
    pub fn count(&self, call: &str) -> usize {
        self.calls.iter().filter(|c| **c == call).count()
    }

    pub fn push_state(&mut self, state: SessionState) {
        self.events.push_back(RuntimeEvent::SessionStateChanged {
            session: SESSION_HANDLE,
            state,
            time: Time(0),
        });
    }

    fn path_string(&self, path: MockPath) -> &str {
        self.paths
            .get(path.0 as usize - 1)
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Cloneable handle onto shared scripted state.
#[derive(Clone, Default)]
pub struct MockRuntime {
    pub state: Rc<RefCell<MockState>>,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<T>(&self, f: impl FnOnce(&mut MockState) -> T) -> T {
        f(&mut self.state.borrow_mut())
    }

    fn call(&self, name: &'static str) -> XrResult<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push(name);
        if state.failing_calls.contains(name) {
            Err(XrError::runtime(name, "XR_ERROR_RUNTIME_FAILURE"))
        } else {
            Ok(())
        }
    }
}

pub struct MockInstance;

pub struct MockSession {
    pub handle: RawHandle,
}

#[derive(Debug)]
pub struct MockSpace {
    pub label: String,
}

pub struct MockSwapchain {
    pub id: usize,
    next_image: u32,
    image_count: u32,
    waited: bool,
}

pub struct MockActionSet {
    pub name: String,
}

pub struct MockAction {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockPath(pub u64);

impl XrRuntime for MockRuntime {
    type Instance = MockInstance;
    type Session = MockSession;
    type Space = MockSpace;
    type Swapchain = MockSwapchain;
    type ActionSet = MockActionSet;
    type Action = MockAction;
    type Path = MockPath;
    type Format = i64;
    type SwapchainImage = u32;
    type GraphicsBinding = ();

    fn enumerate_api_layers(&self) -> XrResult<Vec<ApiLayerProperties>> {
        self.call("xrEnumerateApiLayerProperties")?;
        Ok(vec![ApiLayerProperties {
            layer_name: "XR_APILAYER_mock_validation".to_string(),
            spec_version: Version::new(1, 0, 0),
            layer_version: 1,
            description: "mock".to_string(),
        }])
    }

    fn enumerate_instance_extensions(&self) -> XrResult<Vec<String>> {
        self.call("xrEnumerateInstanceExtensionProperties")?;
        Ok(vec!["XR_KHR_vulkan_enable2".to_string()])
    }

    fn create_instance(
        &self,
        _app_info: &ApplicationInfo,
        extensions: &[String],
    ) -> XrResult<MockInstance> {
        self.call("xrCreateInstance")?;
        self.state.borrow_mut().enabled_extensions = extensions.to_vec();
        Ok(MockInstance)
    }

    fn instance_properties(&self, _instance: &MockInstance) -> XrResult<InstanceProperties> {
        self.call("xrGetInstanceProperties")?;
        Ok(InstanceProperties {
            runtime_name: "Mock Runtime".to_string(),
            runtime_version: Version::new(1, 0, 0),
        })
    }

    fn system(&self, _instance: &MockInstance, _form_factor: FormFactor) -> XrResult<SystemId> {
        self.call("xrGetSystem")?;
        Ok(SystemId(7))
    }

    fn system_properties(
        &self,
        _instance: &MockInstance,
        _system: SystemId,
    ) -> XrResult<SystemProperties> {
        self.call("xrGetSystemProperties")?;
        Ok(SystemProperties {
            system_name: "Mock HMD".to_string(),
            vendor_id: 42,
            max_swapchain_image_width: 4096,
            max_swapchain_image_height: 4096,
            max_layer_count: 16,
            orientation_tracking: true,
            position_tracking: true,
        })
    }

    fn enumerate_view_configurations(
        &self,
        _instance: &MockInstance,
        _system: SystemId,
    ) -> XrResult<Vec<ViewConfigurationType>> {
        self.call("xrEnumerateViewConfigurations")?;
        Ok(self.state.borrow().view_configurations.clone())
    }

    fn view_configuration_properties(
        &self,
        _instance: &MockInstance,
        _system: SystemId,
        view_configuration: ViewConfigurationType,
    ) -> XrResult<ViewConfigurationProperties> {
        self.call("xrGetViewConfigurationProperties")?;
        Ok(ViewConfigurationProperties {
            view_configuration_type: view_configuration,
            fov_mutable: true,
        })
    }

    fn enumerate_view_configuration_views(
        &self,
        _instance: &MockInstance,
        _system: SystemId,
        view_configuration: ViewConfigurationType,
    ) -> XrResult<Vec<ViewConfigurationView>> {
        self.call("xrEnumerateViewConfigurationViews")?;
        let view = ViewConfigurationView {
            recommended_image_rect_width: 1440,
            max_image_rect_width: 2880,
            recommended_image_rect_height: 1600,
            max_image_rect_height: 3200,
            recommended_swapchain_sample_count: 1,
            max_swapchain_sample_count: 4,
        };
        Ok(vec![view; view_configuration.view_count().unwrap_or(0)])
    }

    fn enumerate_environment_blend_modes(
        &self,
        _instance: &MockInstance,
        _system: SystemId,
        _view_configuration: ViewConfigurationType,
    ) -> XrResult<Vec<EnvironmentBlendMode>> {
        self.call("xrEnumerateEnvironmentBlendModes")?;
        Ok(self.state.borrow().blend_modes.clone())
    }

    fn create_session(
        &self,
        _instance: &MockInstance,
        _system: SystemId,
        _binding: &(),
    ) -> XrResult<MockSession> {
        self.call("xrCreateSession")?;
        Ok(MockSession {
            handle: SESSION_HANDLE,
        })
    }

    fn session_handle(&self, session: &MockSession) -> RawHandle {
        session.handle
    }

    fn begin_session(
        &self,
        _session: &MockSession,
        _view_configuration: ViewConfigurationType,
    ) -> XrResult<()> {
        self.call("xrBeginSession")
    }

    fn end_session(&self, _session: &MockSession) -> XrResult<()> {
        self.call("xrEndSession")
    }

    fn request_exit_session(&self, _session: &MockSession) -> XrResult<()> {
        self.call("xrRequestExitSession")?;
        self.state.borrow_mut().exit_requests += 1;
        Ok(())
    }

    fn poll_event(&mut self, _instance: &MockInstance) -> XrResult<Option<RuntimeEvent>> {
        self.call("xrPollEvent")?;
        Ok(self.state.borrow_mut().events.pop_front())
    }

    fn enumerate_reference_spaces(
        &self,
        _session: &MockSession,
    ) -> XrResult<Vec<ReferenceSpaceType>> {
        self.call("xrEnumerateReferenceSpaces")?;
        Ok(vec![
            ReferenceSpaceType::View,
            ReferenceSpaceType::Local,
            ReferenceSpaceType::Stage,
        ])
    }

    fn create_reference_space(
        &self,
        _session: &MockSession,
        space_type: ReferenceSpaceType,
        _pose_in_reference_space: Pose,
    ) -> XrResult<MockSpace> {
        self.call("xrCreateReferenceSpace")?;
        let mut state = self.state.borrow_mut();
        let index = state.reference_space_calls;
        state.reference_space_calls += 1;
        if state.failing_reference_spaces.contains(&index) {
            return Err(XrError::runtime(
                "xrCreateReferenceSpace",
                "XR_ERROR_REFERENCE_SPACE_UNSUPPORTED",
            ));
        }
        Ok(MockSpace {
            label: format!("reference:{space_type}:{index}"),
        })
    }

    fn locate_space(
        &self,
        space: &MockSpace,
        _base: &MockSpace,
        _time: Time,
    ) -> XrResult<SpaceLocation> {
        self.call("xrLocateSpace")?;
        if self.state.borrow().failing_locations.contains(&space.label) {
            return Err(XrError::runtime("xrLocateSpace", "XR_ERROR_POSE_INVALID"));
        }
        Ok(SpaceLocation {
            flags: SpaceLocationFlags::POSITION_VALID | SpaceLocationFlags::ORIENTATION_VALID,
            pose: Pose::IDENTITY,
        })
    }

    fn string_to_path(&self, _instance: &MockInstance, path: &str) -> XrResult<MockPath> {
        self.call("xrStringToPath")?;
        let mut state = self.state.borrow_mut();
        if let Some(i) = state.paths.iter().position(|p| p == path) {
            return Ok(MockPath(i as u64 + 1));
        }
        state.paths.push(path.to_string());
        Ok(MockPath(state.paths.len() as u64))
    }

    fn create_action_set(
        &self,
        _instance: &MockInstance,
        name: &str,
        _localized_name: &str,
        _priority: u32,
    ) -> XrResult<MockActionSet> {
        self.call("xrCreateActionSet")?;
        Ok(MockActionSet {
            name: name.to_string(),
        })
    }

    fn create_action(
        &self,
        _action_set: &MockActionSet,
        name: &str,
        _localized_name: &str,
        _action_type: ActionType,
        _subaction_paths: &[MockPath],
    ) -> XrResult<MockAction> {
        self.call("xrCreateAction")?;
        Ok(MockAction {
            name: name.to_string(),
        })
    }

    fn suggest_interaction_profile_bindings(
        &self,
        _instance: &MockInstance,
        interaction_profile: MockPath,
        _bindings: &[(&MockAction, MockPath)],
    ) -> XrResult<()> {
        self.call("xrSuggestInteractionProfileBindings")?;
        let mut state = self.state.borrow_mut();
        let profile = state.path_string(interaction_profile).to_string();
        if state.rejected_profiles.contains(&profile) {
            return Err(XrError::runtime(
                "xrSuggestInteractionProfileBindings",
                "XR_ERROR_PATH_UNSUPPORTED",
            ));
        }
        state.suggested_profiles.push(profile);
        Ok(())
    }

    fn create_action_space(
        &self,
        _session: &MockSession,
        action: &MockAction,
        subaction_path: MockPath,
    ) -> XrResult<MockSpace> {
        self.call("xrCreateActionSpace")?;
        let state = self.state.borrow();
        Ok(MockSpace {
            label: format!("action:{}:{}", action.name, state.path_string(subaction_path)),
        })
    }

    fn attach_action_sets(
        &self,
        _session: &MockSession,
        _action_sets: &[&MockActionSet],
    ) -> XrResult<()> {
        self.call("xrAttachSessionActionSets")
    }

    fn sync_actions(&self, _session: &MockSession, _action_set: &MockActionSet) -> XrResult<()> {
        self.call("xrSyncActions")
    }

    fn action_state_float(
        &self,
        _session: &MockSession,
        _action: &MockAction,
        subaction_path: Option<MockPath>,
    ) -> XrResult<ActionState<f32>> {
        self.call("xrGetActionStateFloat")?;
        let state = self.state.borrow();
        let hand = hand_for(subaction_path.map(|p| state.path_string(p)));
        Ok(hand.map(|h| state.grab[h]).unwrap_or_default())
    }

    fn action_state_boolean(
        &self,
        _session: &MockSession,
        _action: &MockAction,
        _subaction_path: Option<MockPath>,
    ) -> XrResult<ActionState<bool>> {
        self.call("xrGetActionStateBoolean")?;
        Ok(self.state.borrow().quit)
    }

    fn action_pose_active(
        &self,
        _session: &MockSession,
        _action: &MockAction,
        subaction_path: MockPath,
    ) -> XrResult<bool> {
        self.call("xrGetActionStatePose")?;
        let state = self.state.borrow();
        let hand = hand_for(Some(state.path_string(subaction_path)));
        Ok(hand.map(|h| state.pose_active[h]).unwrap_or(false))
    }

    fn apply_haptic_feedback(
        &self,
        _session: &MockSession,
        _action: &MockAction,
        subaction_path: MockPath,
        pulse: HapticPulse,
    ) -> XrResult<()> {
        self.call("xrApplyHapticFeedback")?;
        let mut state = self.state.borrow_mut();
        let path = state.path_string(subaction_path).to_string();
        state.haptics.push((path, pulse.amplitude));
        Ok(())
    }

    fn enumerate_bound_sources(
        &self,
        _session: &MockSession,
        action: &MockAction,
    ) -> XrResult<Vec<MockPath>> {
        self.call("xrEnumerateBoundSourcesForAction")?;
        if action.name == "grab_object" {
            let mut state = self.state.borrow_mut();
            state.paths.push("/user/hand/left/input/select/click".to_string());
            return Ok(vec![MockPath(state.paths.len() as u64)]);
        }
        Ok(Vec::new())
    }

    fn input_source_localized_name(
        &self,
        _session: &MockSession,
        _source: MockPath,
    ) -> XrResult<String> {
        self.call("xrGetInputSourceLocalizedName")?;
        Ok("Left Hand Select".to_string())
    }

    fn enumerate_swapchain_formats(&self, _session: &MockSession) -> XrResult<Vec<i64>> {
        self.call("xrEnumerateSwapchainFormats")?;
        Ok(vec![37, 43, 50])
    }

    fn create_swapchain(
        &self,
        _session: &MockSession,
        _create_info: &SwapchainCreateInfo<i64>,
    ) -> XrResult<MockSwapchain> {
        self.call("xrCreateSwapchain")?;
        let mut state = self.state.borrow_mut();
        let id = state.next_swapchain;
        state.next_swapchain += 1;
        Ok(MockSwapchain {
            id,
            next_image: 0,
            image_count: state.image_count,
            waited: false,
        })
    }

    fn enumerate_swapchain_images(&self, swapchain: &MockSwapchain) -> XrResult<Vec<u32>> {
        self.call("xrEnumerateSwapchainImages")?;
        Ok((0..swapchain.image_count).map(|i| 100 + i).collect())
    }

    fn acquire_swapchain_image(&self, swapchain: &mut MockSwapchain) -> XrResult<u32> {
        self.call("xrAcquireSwapchainImage")?;
        let mut state = self.state.borrow_mut();
        if state.failing_acquire_swapchains.contains(&swapchain.id) {
            return Err(XrError::runtime(
                "xrAcquireSwapchainImage",
                "XR_ERROR_CALL_ORDER_INVALID",
            ));
        }
        state.acquires.push(swapchain.id);
        let index = swapchain.next_image;
        swapchain.next_image = (swapchain.next_image + 1) % swapchain.image_count;
        Ok(index)
    }

    fn wait_swapchain_image(&self, swapchain: &mut MockSwapchain) -> XrResult<()> {
        self.call("xrWaitSwapchainImage")?;
        if self.with(|s| s.failing_wait_swapchains.contains(&swapchain.id)) {
            return Err(XrError::runtime("xrWaitSwapchainImage", "XR_ERROR_RUNTIME_FAILURE"));
        }
        swapchain.waited = true;
        Ok(())
    }

    // Mirrors the binding: an image that was never waited on cannot be released.
    fn release_swapchain_image(&self, swapchain: &mut MockSwapchain) -> XrResult<()> {
        if !swapchain.waited {
            return Err(XrError::protocol(format!(
                "swapchain {} released before its image was waited on",
                swapchain.id
            )));
        }
        self.call("xrReleaseSwapchainImage")?;
        swapchain.waited = false;
        self.state.borrow_mut().releases.push(swapchain.id);
        Ok(())
    }

    fn wait_frame(&self, _session: &mut MockSession) -> XrResult<FrameState> {
        self.call("xrWaitFrame")?;
        let mut state = self.state.borrow_mut();
        state.frame += 1;
        Ok(FrameState {
            predicted_display_time: Time(state.frame * FRAME_PERIOD_NS),
            predicted_display_period: FRAME_PERIOD_NS,
            should_render: state.should_render,
        })
    }

    fn begin_frame(&self, _session: &mut MockSession) -> XrResult<()> {
        self.call("xrBeginFrame")
    }

    fn locate_views(
        &self,
        _session: &MockSession,
        view_configuration: ViewConfigurationType,
        _display_time: Time,
        _space: &MockSpace,
    ) -> XrResult<(ViewStateFlags, Vec<View>)> {
        self.call("xrLocateViews")?;
        let flags = self.state.borrow().view_state;
        Ok((
            flags,
            vec![View::default(); view_configuration.view_count().unwrap_or(0)],
        ))
    }

    fn end_frame(
        &self,
        _session: &mut MockSession,
        display_time: Time,
        blend_mode: EnvironmentBlendMode,
        layer: Option<&ProjectionLayer<'_, Self>>,
    ) -> XrResult<()> {
        self.call("xrEndFrame")?;
        self.state.borrow_mut().end_frames.push(EndFrameRecord {
            display_time,
            blend_mode,
            layer_views: layer.map(|l| l.views.len()),
        });
        Ok(())
    }
}

fn hand_for(path: Option<&str>) -> Option<Hand> {
    Hand::ALL.into_iter().find(|h| Some(h.user_path()) == path)
}

pub struct MockPlatform;

impl PlatformPlugin for MockPlatform {
    fn name(&self) -> &str {
        "mock"
    }

    fn instance_extensions(&self) -> Vec<String> {
        vec!["XR_MOCK_platform".to_string()]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderRecord {
    pub view: ProjectionView,
    pub image: u32,
    pub format: i64,
    pub cubes: Vec<Cube>,
}

/// Graphics backend that records every call instead of drawing.
#[derive(Default)]
pub struct RecordingGraphics {
    pub device_initialized: usize,
    pub renders: Vec<RenderRecord>,
    pub fail_render: bool,
    /// Allocate one image struct fewer than the runtime enumerated.
    pub short_allocation: bool,
}

impl GraphicsPlugin<MockRuntime> for RecordingGraphics {
    type Image = u32;

    fn name(&self) -> &str {
        "recording"
    }

    fn instance_extensions(&self) -> Vec<String> {
        vec!["XR_KHR_vulkan_enable2".to_string()]
    }

    fn initialize_device(
        &mut self,
        _runtime: &MockRuntime,
        _instance: &MockInstance,
        _system: SystemId,
    ) -> XrResult<()> {
        self.device_initialized += 1;
        Ok(())
    }

    fn graphics_binding(&self) -> XrResult<()> {
        Ok(())
    }

    fn select_color_swapchain_format(&self, formats: &[i64]) -> XrResult<i64> {
        formats
            .iter()
            .copied()
            .find(|f| *f == 43)
            .ok_or_else(|| XrError::graphics("no supported format"))
    }

    fn supported_swapchain_sample_count(&self, _view: &ViewConfigurationView) -> u32 {
        1
    }

    fn allocate_swapchain_image_structs(
        &mut self,
        mut images: Vec<u32>,
        _create_info: &SwapchainCreateInfo<i64>,
    ) -> XrResult<Vec<u32>> {
        if self.short_allocation {
            images.pop();
        }
        Ok(images)
    }

    fn render_view(
        &mut self,
        view: &ProjectionView,
        image: &u32,
        color_format: i64,
        cubes: &[Cube],
    ) -> XrResult<()> {
        if self.fail_render {
            return Err(XrError::graphics("draw failed"));
        }
        self.renders.push(RenderRecord {
            view: *view,
            image: *image,
            format: color_format,
            cubes: cubes.to_vec(),
        });
        Ok(())
    }
}

pub type MockProgram = XrProgram<MockRuntime, RecordingGraphics, MockPlatform>;

pub fn program(runtime: &MockRuntime, options: Options) -> MockProgram {
    program_with_graphics(runtime, options, RecordingGraphics::default())
}

pub fn program_with_graphics(
    runtime: &MockRuntime,
    options: Options,
    graphics: RecordingGraphics,
) -> MockProgram {
    XrProgram::new(runtime.clone(), options, MockPlatform, graphics)
}

/// A program with instance, system, session and swapchains created.
pub fn ready_program(runtime: &MockRuntime, options: Options) -> MockProgram {
    initialize(program(runtime, options))
}

pub fn initialize(mut program: MockProgram) -> MockProgram {
    program.create_instance().unwrap();
    program.initialize_system().unwrap();
    program.initialize_session().unwrap();
    program.create_swapchains().unwrap();
    program
}

/// A ready program whose session has been started by a Ready event.
pub fn running_program(runtime: &MockRuntime, options: Options) -> MockProgram {
    let mut program = ready_program(runtime, options);
    runtime.with(|s| s.push_state(SessionState::Ready));
    program.poll_events().unwrap();
    assert!(program.is_session_running());
    program
}
