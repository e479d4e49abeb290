//! Resize and crop geometry
//!
//! Scaling always preserves the input aspect ratio and fits within the
//! requested bounding box; cropping takes a window of the requested extent
//! out of the decoded frame without proportion adjustment.

use tracing::debug;

use crate::error::CnvtResult;
use crate::model::{CropAnchor, ResizeRequest};
use crate::probe::StreamGeometry;

/// A computed `-vf` entry plus the final output dimensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPlan {
    pub filter: String,
    pub width: u32,
    pub height: u32,
}

/// Round up to the closest multiple of `padding`. Most codecs require
/// dimensions divisible by 2 or 4.
pub fn pad_resolution(res: u32, padding: u32) -> u32 {
    if padding == 0 {
        return res;
    }
    match res % padding {
        0 => res,
        rem => res + padding - rem,
    }
}

/// Compute the scale or crop filter for the requested resolution.
///
/// Returns `None` when the input already matches a requested dimension.
pub fn video_filter(
    resize: ResizeRequest,
    crop: Option<CropAnchor>,
    padding: u32,
    geometry: &StreamGeometry,
) -> CnvtResult<Option<FilterPlan>> {
    let input_ar = geometry.aspect_ratio();
    let mut out_w = resize.width.unwrap_or(0);
    let mut out_h = resize.height.unwrap_or(0);

    if out_w == 0 && out_h == 0 {
        return Ok(None);
    }

    // Already at the requested size, nothing to do
    if (out_w != 0 && geometry.width == out_w) || (out_h != 0 && geometry.height == out_h) {
        debug!(
            "input already {}x{}, not resizing",
            geometry.width, geometry.height
        );
        return Ok(None);
    }

    // Derive a missing dimension from the input aspect ratio
    if out_w == 0 {
        out_w = pad_resolution((out_h as f64 * input_ar) as u32, padding);
    }
    if out_h == 0 {
        out_h = pad_resolution((out_w as f64 / input_ar) as u32, padding);
    }

    let plan = if let Some(anchor) = crop {
        // Crop window cannot extend past the frame
        out_w = out_w.min(geometry.width);
        out_h = out_h.min(geometry.height);
        let (x, y) = anchor.offsets(geometry.width, geometry.height, out_w, out_h);
        FilterPlan {
            filter: format!("crop={}:{}:{}:{}", out_w, out_h, x, y),
            width: out_w,
            height: out_h,
        }
    } else {
        // Shrink one dimension so the output fits the box at the input ratio
        let output_ar = out_w as f64 / out_h as f64;
        if input_ar < output_ar {
            out_w = pad_resolution((out_h as f64 * input_ar) as u32, padding);
        } else if input_ar > output_ar {
            out_h = pad_resolution((out_w as f64 / input_ar) as u32, padding);
        }
        FilterPlan {
            filter: format!("scale={}:{},setsar=1:1", out_w, out_h),
            width: out_w,
            height: out_h,
        }
    };

    debug!("output dimensions: {}x{}", plan.width, plan.height);
    Ok(Some(plan))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(width: u32, height: u32) -> StreamGeometry {
        StreamGeometry {
            width,
            height,
            display_aspect: None,
        }
    }

    fn resize(width: Option<u32>, height: Option<u32>) -> ResizeRequest {
        ResizeRequest { width, height }
    }

    #[test]
    fn pads_up_to_multiple() {
        assert_eq!(pad_resolution(720, 4), 720);
        assert_eq!(pad_resolution(721, 4), 724);
        assert_eq!(pad_resolution(719, 2), 720);
        assert_eq!(pad_resolution(100, 0), 100);
    }

    #[test]
    fn exact_ratio_downscale() {
        // 3840x2160 -> 1280x720: same 16:9 ratio, no adjustment needed
        let plan = video_filter(resize(Some(1280), Some(720)), None, 4, &geometry(3840, 2160))
            .unwrap()
            .unwrap();
        assert_eq!(plan.filter, "scale=1280:720,setsar=1:1");
        assert_eq!((plan.width, plan.height), (1280, 720));
    }

    #[test]
    fn wider_input_shrinks_height() {
        // 2.39:1 scope input into a 16:9 box keeps the width and drops height
        let plan = video_filter(resize(Some(1920), Some(1080)), None, 4, &geometry(4096, 1716))
            .unwrap()
            .unwrap();
        assert_eq!(plan.width, 1920);
        assert!(plan.height < 1080);
        assert_eq!(plan.height % 4, 0);
    }

    #[test]
    fn narrower_input_shrinks_width() {
        // 4:3 input into a 16:9 box keeps the height and drops width
        let plan = video_filter(resize(Some(1920), Some(1080)), None, 4, &geometry(1440, 1080))
            .unwrap();
        // Input height equals the requested height, so no filter at all
        assert!(plan.is_none());

        let plan = video_filter(resize(Some(1280), Some(720)), None, 4, &geometry(1440, 1080))
            .unwrap()
            .unwrap();
        assert_eq!(plan.height, 720);
        assert_eq!(plan.width, 960);
    }

    #[test]
    fn missing_dimension_derived_from_aspect() {
        let plan = video_filter(resize(Some(1280), None), None, 4, &geometry(3840, 2160))
            .unwrap()
            .unwrap();
        assert_eq!(plan.filter, "scale=1280:720,setsar=1:1");
    }

    #[test]
    fn display_aspect_ratio_wins_over_storage() {
        // Anamorphic: stored 1440x1080 but displayed 16:9
        let geom = StreamGeometry {
            width: 1440,
            height: 1080,
            display_aspect: Some(16.0 / 9.0),
        };
        let plan = video_filter(resize(None, Some(720)), None, 4, &geom)
            .unwrap()
            .unwrap();
        assert_eq!(plan.filter, "scale=1280:720,setsar=1:1");
    }

    #[test]
    fn center_crop() {
        let plan = video_filter(
            resize(Some(1280), Some(720)),
            Some(CropAnchor::Center),
            4,
            &geometry(3840, 2160),
        )
        .unwrap()
        .unwrap();
        assert_eq!(plan.filter, "crop=1280:720:1280:720");
    }

    #[test]
    fn crop_clamps_to_frame() {
        let plan = video_filter(
            resize(Some(1920), Some(1080)),
            Some(CropAnchor::TopLeft),
            4,
            &geometry(1600, 900),
        )
        .unwrap()
        .unwrap();
        assert_eq!(plan.filter, "crop=1600:900:0:0");
    }

    #[test]
    fn matching_input_skips_filter() {
        let plan =
            video_filter(resize(Some(1920), Some(1080)), None, 4, &geometry(1920, 800)).unwrap();
        assert!(plan.is_none());
    }
}
