use halo_xr::PlatformPlugin;

/// Desktop and Android hosts. Android needs its instance-creation extension;
/// desktop loaders need nothing extra.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostPlatform;

impl PlatformPlugin for HostPlatform {
    fn name(&self) -> &str {
        std::env::consts::OS
    }

    fn instance_extensions(&self) -> Vec<String> {
        if cfg!(target_os = "android") {
            vec!["XR_KHR_android_create_instance".to_string()]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(target_os = "android"))]
    #[test]
    fn test_desktop_needs_no_platform_extensions() {
        assert!(HostPlatform.instance_extensions().is_empty());
    }
}
