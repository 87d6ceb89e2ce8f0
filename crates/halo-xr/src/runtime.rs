//! The XR runtime seam.
//!
//! `XrRuntime` is the single point through which the session core talks to the
//! platform runtime. Handle types are associated types owned by the caller and
//! released when dropped; the runtime never hands out shared mutable state.

use std::fmt::Debug;

use crate::events::RuntimeEvent;
use crate::types::{
    ActionState, ActionType, ApiLayerProperties, ApplicationInfo, EnvironmentBlendMode,
    Extent2Di, FormFactor, FrameState, Fov, HapticPulse, InstanceProperties, Pose, RawHandle,
    ReferenceSpaceType, SpaceLocation, SwapchainCreateInfo, SystemId, SystemProperties, Time,
    View, ViewConfigurationProperties, ViewConfigurationType, ViewConfigurationView,
    ViewStateFlags,
};
use crate::XrResult;

/// One view of a projection composition layer.
pub struct ProjectionLayerView<'a, R: XrRuntime + ?Sized> {
    pub pose: Pose,
    pub fov: Fov,
    pub swapchain: &'a R::Swapchain,
    pub image_rect: Extent2Di,
}

/// A projection layer submitted at the end of a frame.
pub struct ProjectionLayer<'a, R: XrRuntime + ?Sized> {
    pub space: &'a R::Space,
    pub views: Vec<ProjectionLayerView<'a, R>>,
}

pub trait XrRuntime {
    type Instance;
    type Session;
    type Space;
    type Swapchain;
    type ActionSet;
    type Action;
    type Path: Copy + PartialEq + Debug;
    type Format: Copy + PartialEq + Debug;
    type SwapchainImage;
    type GraphicsBinding;

    // Loader-level queries.
    fn enumerate_api_layers(&self) -> XrResult<Vec<ApiLayerProperties>>;
    fn enumerate_instance_extensions(&self) -> XrResult<Vec<String>>;

    fn create_instance(
        &self,
        app_info: &ApplicationInfo,
        extensions: &[String],
    ) -> XrResult<Self::Instance>;
    fn instance_properties(&self, instance: &Self::Instance) -> XrResult<InstanceProperties>;

    // System.
    fn system(&self, instance: &Self::Instance, form_factor: FormFactor) -> XrResult<SystemId>;
    fn system_properties(
        &self,
        instance: &Self::Instance,
        system: SystemId,
    ) -> XrResult<SystemProperties>;
    fn enumerate_view_configurations(
        &self,
        instance: &Self::Instance,
        system: SystemId,
    ) -> XrResult<Vec<ViewConfigurationType>>;
    fn view_configuration_properties(
        &self,
        instance: &Self::Instance,
        system: SystemId,
        view_configuration: ViewConfigurationType,
    ) -> XrResult<ViewConfigurationProperties>;
    fn enumerate_view_configuration_views(
        &self,
        instance: &Self::Instance,
        system: SystemId,
        view_configuration: ViewConfigurationType,
    ) -> XrResult<Vec<ViewConfigurationView>>;
    fn enumerate_environment_blend_modes(
        &self,
        instance: &Self::Instance,
        system: SystemId,
        view_configuration: ViewConfigurationType,
    ) -> XrResult<Vec<EnvironmentBlendMode>>;

    // Session.
    fn create_session(
        &self,
        instance: &Self::Instance,
        system: SystemId,
        binding: &Self::GraphicsBinding,
    ) -> XrResult<Self::Session>;
    fn session_handle(&self, session: &Self::Session) -> RawHandle;
    fn begin_session(
        &self,
        session: &Self::Session,
        view_configuration: ViewConfigurationType,
    ) -> XrResult<()>;
    fn end_session(&self, session: &Self::Session) -> XrResult<()>;
    fn request_exit_session(&self, session: &Self::Session) -> XrResult<()>;

    /// Read the next queued event without blocking.
    fn poll_event(&mut self, instance: &Self::Instance) -> XrResult<Option<RuntimeEvent>>;

    // Spaces.
    fn enumerate_reference_spaces(
        &self,
        session: &Self::Session,
    ) -> XrResult<Vec<ReferenceSpaceType>>;
    fn create_reference_space(
        &self,
        session: &Self::Session,
        space_type: ReferenceSpaceType,
        pose_in_reference_space: Pose,
    ) -> XrResult<Self::Space>;
    fn locate_space(
        &self,
        space: &Self::Space,
        base: &Self::Space,
        time: Time,
    ) -> XrResult<SpaceLocation>;

    // Actions.
    fn string_to_path(&self, instance: &Self::Instance, path: &str) -> XrResult<Self::Path>;
    fn create_action_set(
        &self,
        instance: &Self::Instance,
        name: &str,
        localized_name: &str,
        priority: u32,
    ) -> XrResult<Self::ActionSet>;
    fn create_action(
        &self,
        action_set: &Self::ActionSet,
        name: &str,
        localized_name: &str,
        action_type: ActionType,
        subaction_paths: &[Self::Path],
    ) -> XrResult<Self::Action>;
    fn suggest_interaction_profile_bindings(
        &self,
        instance: &Self::Instance,
        interaction_profile: Self::Path,
        bindings: &[(&Self::Action, Self::Path)],
    ) -> XrResult<()>;
    fn create_action_space(
        &self,
        session: &Self::Session,
        action: &Self::Action,
        subaction_path: Self::Path,
    ) -> XrResult<Self::Space>;
    fn attach_action_sets(
        &self,
        session: &Self::Session,
        action_sets: &[&Self::ActionSet],
    ) -> XrResult<()>;
    fn sync_actions(&self, session: &Self::Session, action_set: &Self::ActionSet) -> XrResult<()>;
    fn action_state_float(
        &self,
        session: &Self::Session,
        action: &Self::Action,
        subaction_path: Option<Self::Path>,
    ) -> XrResult<ActionState<f32>>;
    fn action_state_boolean(
        &self,
        session: &Self::Session,
        action: &Self::Action,
        subaction_path: Option<Self::Path>,
    ) -> XrResult<ActionState<bool>>;
    fn action_pose_active(
        &self,
        session: &Self::Session,
        action: &Self::Action,
        subaction_path: Self::Path,
    ) -> XrResult<bool>;
    fn apply_haptic_feedback(
        &self,
        session: &Self::Session,
        action: &Self::Action,
        subaction_path: Self::Path,
        pulse: HapticPulse,
    ) -> XrResult<()>;
    fn enumerate_bound_sources(
        &self,
        session: &Self::Session,
        action: &Self::Action,
    ) -> XrResult<Vec<Self::Path>>;
    fn input_source_localized_name(
        &self,
        session: &Self::Session,
        source: Self::Path,
    ) -> XrResult<String>;

    // Swapchains.
    fn enumerate_swapchain_formats(&self, session: &Self::Session)
        -> XrResult<Vec<Self::Format>>;
    fn create_swapchain(
        &self,
        session: &Self::Session,
        create_info: &SwapchainCreateInfo<Self::Format>,
    ) -> XrResult<Self::Swapchain>;
    fn enumerate_swapchain_images(
        &self,
        swapchain: &Self::Swapchain,
    ) -> XrResult<Vec<Self::SwapchainImage>>;
    fn acquire_swapchain_image(&self, swapchain: &mut Self::Swapchain) -> XrResult<u32>;
    /// Blocks until the acquired image is writable. The wait is unbounded:
    /// an image that was not waited on may not be released.
    fn wait_swapchain_image(&self, swapchain: &mut Self::Swapchain) -> XrResult<()>;
    fn release_swapchain_image(&self, swapchain: &mut Self::Swapchain) -> XrResult<()>;

    // Frame loop.
    fn wait_frame(&self, session: &mut Self::Session) -> XrResult<FrameState>;
    fn begin_frame(&self, session: &mut Self::Session) -> XrResult<()>;
    fn locate_views(
        &self,
        session: &Self::Session,
        view_configuration: ViewConfigurationType,
        display_time: Time,
        space: &Self::Space,
    ) -> XrResult<(ViewStateFlags, Vec<View>)>;
    fn end_frame(
        &self,
        session: &mut Self::Session,
        display_time: Time,
        blend_mode: EnvironmentBlendMode,
        layer: Option<&ProjectionLayer<'_, Self>>,
    ) -> XrResult<()>;
}
