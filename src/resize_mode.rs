//! Resize-handling geometry: which blurred bitmap feeds the final scale and
//! how the target size follows mode switches and blur changes.

use image::RgbaImage;

use crate::bounds::BlurVariants;
use crate::options::ResizeHandling;
use crate::scale::clamp_target_size;

/// Pick the derived bitmap used as the final scaling source.
pub fn select_source(variants: &BlurVariants, mode: ResizeHandling) -> &RgbaImage {
    match mode {
        ResizeHandling::Crop => &variants.cropped,
        ResizeHandling::Fit | ResizeHandling::Expand => &variants.bound,
    }
}

/// Convert a target size when switching resize modes.
///
/// Moving into `expand` scales by `expanded_max / original_max`, moving out of
/// it by the inverse. Switching between `crop` and `fit` keeps the size.
///
/// # Arguments
///
/// * `from` - Mode the size was chosen under
/// * `to` - Mode being switched to
/// * `size` - Current target size
/// * `original_max` - Longer side of the pre-blur frame
/// * `expanded_max` - Longer side of the blurred content bounds
pub fn convert_target_size(
    from: ResizeHandling,
    to: ResizeHandling,
    size: u32,
    original_max: u32,
    expanded_max: u32,
) -> u32 {
    use ResizeHandling::*;

    if original_max == 0 || expanded_max == 0 {
        return size;
    }

    let ratio = match (from, to) {
        (Crop, Expand) | (Fit, Expand) => expanded_max as f64 / original_max as f64,
        (Expand, Crop) | (Expand, Fit) => original_max as f64 / expanded_max as f64,
        _ => return size,
    };

    clamp_target_size((size as f64 * ratio).round() as i64)
}

/// Rescale an `expand`-mode target size after blur changed the bound size.
///
/// Returns `None` when the bound's longer side did not change or either side
/// is unknown.
pub fn rescale_for_expand(size: u32, old_bound_max: u32, new_bound_max: u32) -> Option<u32> {
    if old_bound_max == 0 || new_bound_max == 0 || old_bound_max == new_bound_max {
        return None;
    }
    let ratio = new_bound_max as f64 / old_bound_max as f64;
    let adjusted = clamp_target_size((size as f64 * ratio).round() as i64);
    if adjusted != size {
        log::debug!(
            "expand target {} -> {} (bound {} -> {})",
            size,
            adjusted,
            old_bound_max,
            new_bound_max
        );
    }
    Some(adjusted)
}
