use std::fmt;
use std::ops::{Index, IndexMut};

use bitflags::bitflags;
use glam::{Quat, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub const ALL: [Hand; 2] = [Hand::Left, Hand::Right];

    pub fn index(self) -> usize {
        match self {
            Hand::Left => 0,
            Hand::Right => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Hand::Left => "left",
            Hand::Right => "right",
        }
    }

    /// Top-level user path used as the subaction path for this hand.
    pub fn user_path(self) -> &'static str {
        match self {
            Hand::Left => "/user/hand/left",
            Hand::Right => "/user/hand/right",
        }
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fixed-size pair indexed by [`Hand`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PerHand<T>(pub [T; 2]);

impl<T> PerHand<T> {
    pub fn new(left: T, right: T) -> Self {
        Self([left, right])
    }

    pub fn splat(value: T) -> Self
    where
        T: Clone,
    {
        Self([value.clone(), value])
    }

    pub fn from_fn(mut f: impl FnMut(Hand) -> T) -> Self {
        Self([f(Hand::Left), f(Hand::Right)])
    }

    pub fn try_from_fn<E>(mut f: impl FnMut(Hand) -> Result<T, E>) -> Result<Self, E> {
        let left = f(Hand::Left)?;
        let right = f(Hand::Right)?;
        Ok(Self([left, right]))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Hand, &T)> {
        Hand::ALL.into_iter().zip(self.0.iter())
    }
}

impl<T> Index<Hand> for PerHand<T> {
    type Output = T;

    fn index(&self, hand: Hand) -> &T {
        &self.0[hand.index()]
    }
}

impl<T> IndexMut<Hand> for PerHand<T> {
    fn index_mut(&mut self, hand: Hand) -> &mut T {
        &mut self.0[hand.index()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub orientation: Quat,
    pub position: Vec3,
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        orientation: Quat::IDENTITY,
        position: Vec3::ZERO,
    };

    pub fn translation(position: Vec3) -> Self {
        Self {
            orientation: Quat::IDENTITY,
            position,
        }
    }

    /// Counter-clockwise yaw about +Y followed by a translation.
    pub fn rotate_ccw_about_y(radians: f32, position: Vec3) -> Self {
        Self {
            orientation: Quat::from_rotation_y(radians),
            position,
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Field of view as four half-angles in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Fov {
    pub angle_left: f32,
    pub angle_right: f32,
    pub angle_up: f32,
    pub angle_down: f32,
}

/// Runtime timestamp in nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Time(pub i64);

impl Time {
    pub fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    pub fn as_nanos(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SystemId(pub u64);

/// Raw value of a runtime handle, used to match event payloads against owned handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RawHandle(pub u64);

impl RawHandle {
    pub const NULL: RawHandle = RawHandle(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for RawHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u16,
    pub minor: u16,
    pub patch: u32,
}

impl Version {
    pub const fn new(major: u16, minor: u16, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormFactor {
    HeadMountedDisplay,
    HandheldDisplay,
}

impl fmt::Display for FormFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormFactor::HeadMountedDisplay => f.write_str("HEAD_MOUNTED_DISPLAY"),
            FormFactor::HandheldDisplay => f.write_str("HANDHELD_DISPLAY"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewConfigurationType {
    PrimaryMono,
    PrimaryStereo,
    /// Any configuration type this program does not render to, by raw value.
    Other(i32),
}

impl ViewConfigurationType {
    /// Number of views the configuration presents, when known.
    pub fn view_count(self) -> Option<usize> {
        match self {
            ViewConfigurationType::PrimaryMono => Some(1),
            ViewConfigurationType::PrimaryStereo => Some(2),
            ViewConfigurationType::Other(_) => None,
        }
    }
}

impl fmt::Display for ViewConfigurationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewConfigurationType::PrimaryMono => f.write_str("PRIMARY_MONO"),
            ViewConfigurationType::PrimaryStereo => f.write_str("PRIMARY_STEREO"),
            ViewConfigurationType::Other(raw) => write!(f, "VIEW_CONFIGURATION_TYPE({raw})"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvironmentBlendMode {
    Opaque,
    Additive,
    AlphaBlend,
    Other(i32),
}

impl fmt::Display for EnvironmentBlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvironmentBlendMode::Opaque => f.write_str("OPAQUE"),
            EnvironmentBlendMode::Additive => f.write_str("ADDITIVE"),
            EnvironmentBlendMode::AlphaBlend => f.write_str("ALPHA_BLEND"),
            EnvironmentBlendMode::Other(raw) => write!(f, "ENVIRONMENT_BLEND_MODE({raw})"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceSpaceType {
    View,
    Local,
    Stage,
    Other(i32),
}

impl fmt::Display for ReferenceSpaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceSpaceType::View => f.write_str("VIEW"),
            ReferenceSpaceType::Local => f.write_str("LOCAL"),
            ReferenceSpaceType::Stage => f.write_str("STAGE"),
            ReferenceSpaceType::Other(raw) => write!(f, "REFERENCE_SPACE_TYPE({raw})"),
        }
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SpaceLocationFlags: u32 {
        const ORIENTATION_VALID = 1 << 0;
        const POSITION_VALID = 1 << 1;
        const ORIENTATION_TRACKED = 1 << 2;
        const POSITION_TRACKED = 1 << 3;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ViewStateFlags: u32 {
        const ORIENTATION_VALID = 1 << 0;
        const POSITION_VALID = 1 << 1;
        const ORIENTATION_TRACKED = 1 << 2;
        const POSITION_TRACKED = 1 << 3;
    }
}

impl ViewStateFlags {
    /// Both position and orientation of the located views can be used.
    pub fn is_pose_valid(self) -> bool {
        self.contains(ViewStateFlags::POSITION_VALID | ViewStateFlags::ORIENTATION_VALID)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SwapchainUsageFlags: u32 {
        const COLOR_ATTACHMENT = 1 << 0;
        const DEPTH_STENCIL_ATTACHMENT = 1 << 1;
        const UNORDERED_ACCESS = 1 << 2;
        const TRANSFER_SRC = 1 << 3;
        const TRANSFER_DST = 1 << 4;
        const SAMPLED = 1 << 5;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpaceLocation {
    pub flags: SpaceLocationFlags,
    pub pose: Pose,
}

impl SpaceLocation {
    pub fn is_pose_valid(&self) -> bool {
        self.flags
            .contains(SpaceLocationFlags::POSITION_VALID | SpaceLocationFlags::ORIENTATION_VALID)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct View {
    pub pose: Pose,
    pub fov: Fov,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewConfigurationView {
    pub recommended_image_rect_width: u32,
    pub max_image_rect_width: u32,
    pub recommended_image_rect_height: u32,
    pub max_image_rect_height: u32,
    pub recommended_swapchain_sample_count: u32,
    pub max_swapchain_sample_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewConfigurationProperties {
    pub view_configuration_type: ViewConfigurationType,
    pub fov_mutable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameState {
    pub predicted_display_time: Time,
    /// Nanoseconds between displayed frames.
    pub predicted_display_period: i64,
    pub should_render: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiLayerProperties {
    pub layer_name: String,
    pub spec_version: Version,
    pub layer_version: u32,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceProperties {
    pub runtime_name: String,
    pub runtime_version: Version,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemProperties {
    pub system_name: String,
    pub vendor_id: u32,
    pub max_swapchain_image_width: u32,
    pub max_swapchain_image_height: u32,
    pub max_layer_count: u32,
    pub orientation_tracking: bool,
    pub position_tracking: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationInfo {
    pub application_name: String,
    pub application_version: u32,
    pub engine_name: String,
    pub engine_version: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapchainCreateInfo<F> {
    pub usage_flags: SwapchainUsageFlags,
    pub format: F,
    pub sample_count: u32,
    pub width: u32,
    pub height: u32,
    pub face_count: u32,
    pub array_size: u32,
    pub mip_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Extent2Di {
    pub width: i32,
    pub height: i32,
}

/// What the graphics plugin needs to draw one view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionView {
    pub pose: Pose,
    pub fov: Fov,
    pub image_rect: Extent2Di,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionType {
    FloatInput,
    BooleanInput,
    PoseInput,
    VibrationOutput,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ActionState<T> {
    pub current_state: T,
    pub changed_since_last_sync: bool,
    pub last_change_time: Time,
    pub is_active: bool,
}

/// Haptic vibration of minimum runtime duration and unspecified frequency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HapticPulse {
    pub amplitude: f32,
}

/// Cube primitive handed to the graphics plugin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cube {
    pub pose: Pose,
    pub scale: Vec3,
}

impl Cube {
    pub fn uniform(pose: Pose, size: f32) -> Self {
        Self {
            pose,
            scale: Vec3::splat(size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_hand_indexing() {
        let mut scale = PerHand::splat(1.0f32);
        scale[Hand::Right] = 0.5;
        assert_eq!(scale[Hand::Left], 1.0);
        assert_eq!(scale[Hand::Right], 0.5);
        let names: Vec<_> = scale.iter().map(|(hand, _)| hand.name()).collect();
        assert_eq!(names, vec!["left", "right"]);
    }

    #[test]
    fn test_rotate_ccw_about_y_quarter_turn() {
        let pose = Pose::rotate_ccw_about_y(std::f32::consts::FRAC_PI_2, Vec3::new(1.0, 0.0, 0.0));
        let forward = pose.orientation * Vec3::NEG_Z;
        assert!((forward - Vec3::NEG_X).length() < 1e-5);
        assert_eq!(pose.position, Vec3::X);
    }

    #[test]
    fn test_view_state_validity_requires_both_flags() {
        assert!(!ViewStateFlags::POSITION_VALID.is_pose_valid());
        assert!(!ViewStateFlags::ORIENTATION_VALID.is_pose_valid());
        assert!((ViewStateFlags::POSITION_VALID | ViewStateFlags::ORIENTATION_VALID).is_pose_valid());
    }

    #[test]
    fn test_view_count_for_primary_configurations() {
        assert_eq!(ViewConfigurationType::PrimaryMono.view_count(), Some(1));
        assert_eq!(ViewConfigurationType::PrimaryStereo.view_count(), Some(2));
        assert_eq!(ViewConfigurationType::Other(1000037000).view_count(), None);
    }
}
