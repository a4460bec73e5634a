//! WebGL renderer probe

use crate::error::HostError;
use crate::host::{GlParameter, Host, DEBUG_RENDERER_INFO_EXTENSION};
use crate::types::WebGlInfo;

/// Read the unmasked WebGL vendor and renderer.
///
/// Both fields are `None` without a context, without the debug extension,
/// or when any read fails.
pub fn webgl_info(host: &dyn Host) -> WebGlInfo {
    read_renderer(host).unwrap_or_else(|e| {
        log::debug!("webgl probe fell back to placeholder: {e}");
        WebGlInfo::unavailable()
    })
}

fn read_renderer(host: &dyn Host) -> Result<WebGlInfo, HostError> {
    let Some(gl) = host.create_webgl_context()? else {
        return Ok(WebGlInfo::unavailable());
    };
    if !gl.has_extension(DEBUG_RENDERER_INFO_EXTENSION) {
        return Ok(WebGlInfo::unavailable());
    }
    Ok(WebGlInfo {
        vendor: gl.get_parameter(GlParameter::UnmaskedVendor)?,
        renderer: gl.get_parameter(GlParameter::UnmaskedRenderer)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{BlockedApi, StaticHost, StaticWebGl};
    use pretty_assertions::assert_eq;

    fn host_with(gl: StaticWebGl) -> StaticHost {
        StaticHost {
            webgl: Some(gl),
            ..Default::default()
        }
    }

    #[test]
    fn test_reads_unmasked_strings() {
        let host = host_with(StaticWebGl {
            debug_renderer_info: true,
            vendor: Some("Google Inc. (NVIDIA)".to_string()),
            renderer: Some("ANGLE (NVIDIA GeForce RTX 3060)".to_string()),
        });
        assert_eq!(
            webgl_info(&host),
            WebGlInfo {
                vendor: Some("Google Inc. (NVIDIA)".to_string()),
                renderer: Some("ANGLE (NVIDIA GeForce RTX 3060)".to_string()),
            }
        );
    }

    #[test]
    fn test_missing_extension() {
        let host = host_with(StaticWebGl {
            debug_renderer_info: false,
            vendor: Some("hidden".to_string()),
            renderer: Some("hidden".to_string()),
        });
        assert_eq!(webgl_info(&host), WebGlInfo::unavailable());
    }

    #[test]
    fn test_no_context() {
        assert_eq!(webgl_info(&StaticHost::default()), WebGlInfo::unavailable());
    }

    #[test]
    fn test_context_creation_error() {
        let mut host = host_with(StaticWebGl {
            debug_renderer_info: true,
            vendor: Some("v".to_string()),
            renderer: Some("r".to_string()),
        });
        host.blocked.push(BlockedApi::Webgl);
        assert_eq!(webgl_info(&host), WebGlInfo::unavailable());
    }
}
