//! Capture region selection.

use crate::browser::{ClipRegion, Viewport};
use crate::config::{MIN_HERO_HEIGHT, MIN_HERO_WIDTH};

use super::CaptureOptions;

/// Region to capture.
///
/// With hero optimization on and a hero found, the hero rectangle is clamped to
/// the viewport and grown to at least 800×500 (or the viewport, if smaller), and
/// shifted left when needed to stay inside the viewport. Otherwise the requested
/// size from the page origin.
pub fn compute_capture_region(
    hero: Option<ClipRegion>,
    viewport: &Viewport,
    options: &CaptureOptions,
) -> ClipRegion {
    let hero = match hero {
        Some(hero) if options.optimize_hero => hero,
        _ => {
            return ClipRegion {
                x: 0.0,
                y: 0.0,
                width: f64::from(options.width),
                height: f64::from(options.height),
            }
        }
    };

    let viewport_width = f64::from(viewport.width);
    let viewport_height = f64::from(viewport.height);
    let min_width = f64::from(MIN_HERO_WIDTH).min(viewport_width);
    let min_height = f64::from(MIN_HERO_HEIGHT).min(viewport_height);

    let width = hero.width.max(min_width).min(viewport_width);
    let height = hero.height.max(min_height).min(viewport_height);
    let x = hero.x.max(0.0).min(viewport_width - width);
    let y = hero.y.max(0.0);

    ClipRegion {
        x,
        y,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user_agent::DeviceProfile;

    fn hero(x: f64, y: f64, width: f64, height: f64) -> Option<ClipRegion> {
        Some(ClipRegion {
            x,
            y,
            width,
            height,
        })
    }

    #[test]
    fn test_no_hero_uses_requested_size() {
        let region = compute_capture_region(
            None,
            &DeviceProfile::Desktop.viewport(),
            &CaptureOptions::default(),
        );
        assert_eq!(
            region,
            ClipRegion {
                x: 0.0,
                y: 0.0,
                width: 1200.0,
                height: 630.0
            }
        );
    }

    #[test]
    fn test_hero_ignored_when_optimization_disabled() {
        let options = CaptureOptions {
            optimize_hero: false,
            ..Default::default()
        };
        let region = compute_capture_region(
            hero(0.0, 100.0, 1920.0, 700.0),
            &DeviceProfile::Desktop.viewport(),
            &options,
        );
        assert_eq!(region.y, 0.0);
        assert_eq!(region.width, 1200.0);
    }

    #[test]
    fn test_small_hero_is_grown_to_minimum() {
        let region = compute_capture_region(
            hero(100.0, 64.0, 300.0, 120.0),
            &DeviceProfile::Desktop.viewport(),
            &CaptureOptions::default(),
        );
        assert_eq!(region.width, 800.0);
        assert_eq!(region.height, 500.0);
        assert_eq!(region.x, 100.0);
        assert_eq!(region.y, 64.0);
    }

    #[test]
    fn test_wide_hero_is_clamped_to_viewport() {
        let region = compute_capture_region(
            hero(-20.0, 0.0, 2400.0, 3000.0),
            &DeviceProfile::Desktop.viewport(),
            &CaptureOptions::default(),
        );
        assert_eq!(region.x, 0.0);
        assert_eq!(region.width, 1920.0);
        assert_eq!(region.height, 1080.0);
    }

    #[test]
    fn test_hero_near_right_edge_shifts_left() {
        let region = compute_capture_region(
            hero(1500.0, 0.0, 400.0, 600.0),
            &DeviceProfile::Desktop.viewport(),
            &CaptureOptions::default(),
        );
        assert_eq!(region.width, 800.0);
        assert_eq!(region.x, 1120.0);
    }

    #[test]
    fn test_mobile_viewport_caps_minimums() {
        let region = compute_capture_region(
            hero(0.0, 0.0, 375.0, 300.0),
            &DeviceProfile::Mobile.viewport(),
            &CaptureOptions::default(),
        );
        assert_eq!(region.width, 375.0);
        assert_eq!(region.height, 500.0);
    }
}
