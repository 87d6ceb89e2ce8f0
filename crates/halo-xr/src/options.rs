//! Program options and the fixed enumerations their strings resolve to.
//!
//! All string matching is ASCII case-insensitive. Unrecognised strings are
//! configuration errors and are reported before any runtime handle is touched.

use std::f32::consts::FRAC_PI_3;
use std::fmt;
use std::str::FromStr;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::types::{EnvironmentBlendMode, FormFactor, Pose, ReferenceSpaceType, ViewConfigurationType};
use crate::{XrError, XrResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub form_factor: String,
    pub view_configuration: String,
    pub environment_blend_mode: String,
    pub app_space: String,
    pub application_name: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            form_factor: "Hmd".to_string(),
            view_configuration: "Stereo".to_string(),
            environment_blend_mode: "Opaque".to_string(),
            app_space: "Local".to_string(),
            application_name: "Halo".to_string(),
        }
    }
}

/// The system-level choices resolved from [`Options`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemSelection {
    pub form_factor: FormFactor,
    pub view_configuration: ViewConfigurationType,
    pub blend_mode: EnvironmentBlendMode,
}

impl Options {
    pub fn system_selection(&self) -> XrResult<SystemSelection> {
        Ok(SystemSelection {
            form_factor: parse_form_factor(&self.form_factor)?,
            view_configuration: parse_view_configuration(&self.view_configuration)?,
            blend_mode: parse_blend_mode(&self.environment_blend_mode)?,
        })
    }

    pub fn app_space(&self) -> XrResult<ReferenceSpaceKind> {
        self.app_space.parse()
    }
}

pub fn parse_form_factor(value: &str) -> XrResult<FormFactor> {
    if value.eq_ignore_ascii_case("Hmd") {
        Ok(FormFactor::HeadMountedDisplay)
    } else if value.eq_ignore_ascii_case("Handheld") {
        Ok(FormFactor::HandheldDisplay)
    } else {
        Err(XrError::config(format!("Unknown form factor '{value}'")))
    }
}

pub fn parse_view_configuration(value: &str) -> XrResult<ViewConfigurationType> {
    if value.eq_ignore_ascii_case("Mono") {
        Ok(ViewConfigurationType::PrimaryMono)
    } else if value.eq_ignore_ascii_case("Stereo") {
        Ok(ViewConfigurationType::PrimaryStereo)
    } else {
        Err(XrError::config(format!(
            "Unknown view configuration '{value}'"
        )))
    }
}

pub fn parse_blend_mode(value: &str) -> XrResult<EnvironmentBlendMode> {
    if value.eq_ignore_ascii_case("Opaque") {
        Ok(EnvironmentBlendMode::Opaque)
    } else if value.eq_ignore_ascii_case("Additive") {
        Ok(EnvironmentBlendMode::Additive)
    } else if value.eq_ignore_ascii_case("AlphaBlend") {
        Ok(EnvironmentBlendMode::AlphaBlend)
    } else {
        Err(XrError::config(format!(
            "Unknown environment blend mode '{value}'"
        )))
    }
}

/// Named reference spaces, each a runtime space type plus a fixed offset pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceSpaceKind {
    View,
    /// Head-locked, 2m in front of the device.
    ViewFront,
    Local,
    Stage,
    StageLeft,
    StageRight,
    StageLeftRotated,
    StageRightRotated,
}

impl ReferenceSpaceKind {
    pub const ALL: [ReferenceSpaceKind; 8] = [
        ReferenceSpaceKind::View,
        ReferenceSpaceKind::ViewFront,
        ReferenceSpaceKind::Local,
        ReferenceSpaceKind::Stage,
        ReferenceSpaceKind::StageLeft,
        ReferenceSpaceKind::StageRight,
        ReferenceSpaceKind::StageLeftRotated,
        ReferenceSpaceKind::StageRightRotated,
    ];

    /// Spaces drawn as cubes every frame.
    pub const VISUALIZED: [ReferenceSpaceKind; 7] = [
        ReferenceSpaceKind::ViewFront,
        ReferenceSpaceKind::Local,
        ReferenceSpaceKind::Stage,
        ReferenceSpaceKind::StageLeft,
        ReferenceSpaceKind::StageRight,
        ReferenceSpaceKind::StageLeftRotated,
        ReferenceSpaceKind::StageRightRotated,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ReferenceSpaceKind::View => "View",
            ReferenceSpaceKind::ViewFront => "ViewFront",
            ReferenceSpaceKind::Local => "Local",
            ReferenceSpaceKind::Stage => "Stage",
            ReferenceSpaceKind::StageLeft => "StageLeft",
            ReferenceSpaceKind::StageRight => "StageRight",
            ReferenceSpaceKind::StageLeftRotated => "StageLeftRotated",
            ReferenceSpaceKind::StageRightRotated => "StageRightRotated",
        }
    }

    pub fn space_type(self) -> ReferenceSpaceType {
        match self {
            ReferenceSpaceKind::View | ReferenceSpaceKind::ViewFront => ReferenceSpaceType::View,
            ReferenceSpaceKind::Local => ReferenceSpaceType::Local,
            ReferenceSpaceKind::Stage
            | ReferenceSpaceKind::StageLeft
            | ReferenceSpaceKind::StageRight
            | ReferenceSpaceKind::StageLeftRotated
            | ReferenceSpaceKind::StageRightRotated => ReferenceSpaceType::Stage,
        }
    }

    pub fn pose_in_reference_space(self) -> Pose {
        match self {
            ReferenceSpaceKind::View | ReferenceSpaceKind::Local | ReferenceSpaceKind::Stage => {
                Pose::IDENTITY
            }
            ReferenceSpaceKind::ViewFront => Pose::translation(Vec3::new(0.0, 0.0, -2.0)),
            ReferenceSpaceKind::StageLeft => {
                Pose::rotate_ccw_about_y(0.0, Vec3::new(-2.0, 0.0, -2.0))
            }
            ReferenceSpaceKind::StageRight => {
                Pose::rotate_ccw_about_y(0.0, Vec3::new(2.0, 0.0, -2.0))
            }
            ReferenceSpaceKind::StageLeftRotated => {
                Pose::rotate_ccw_about_y(FRAC_PI_3, Vec3::new(-2.0, 0.5, -2.0))
            }
            ReferenceSpaceKind::StageRightRotated => {
                Pose::rotate_ccw_about_y(-FRAC_PI_3, Vec3::new(2.0, 0.5, -2.0))
            }
        }
    }
}

impl fmt::Display for ReferenceSpaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReferenceSpaceKind {
    type Err = XrError;

    fn from_str(value: &str) -> XrResult<Self> {
        ReferenceSpaceKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(value))
            .ok_or_else(|| XrError::config(format!("Unknown reference space type '{value}'")))
    }
}
