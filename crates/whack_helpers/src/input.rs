use bevy::prelude::*;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum RayError {
    #[error("Pointer {0} lies outside the camera viewport")]
    OutsideViewport(Vec2),

    #[error("Camera viewport has no area")]
    EmptyViewport,

    #[error("Camera projection could not be inverted")]
    DegenerateProjection,
}

pub fn just_pressed_screen_position(
    button_input: &Res<ButtonInput<MouseButton>>,
    touch_input: &Res<Touches>,
    windows: &Query<&Window>,
) -> Option<Vec2> {
    if button_input.just_pressed(MouseButton::Left) {
        let cursor_position = windows.get_single().ok()?.cursor_position()?;
        Some(cursor_position)
    } else if touch_input.any_just_pressed() {
        let touch = touch_input.iter_just_pressed().next()?;
        Some(touch.position())
    } else {
        None
    }
}

/// Maps a pointer position in logical viewport pixels (origin top left, y down) to
/// normalized device coordinates in `[-1, 1]` with y up.
pub fn normalized_device_coords(position: Vec2, viewport: Rect) -> Result<Vec2, RayError> {
    let size = viewport.size();
    if size.x <= 0.0 || size.y <= 0.0 {
        return Err(RayError::EmptyViewport);
    }
    if !viewport.contains(position) {
        return Err(RayError::OutsideViewport(position));
    }

    let relative = (position - viewport.min) / size;
    Ok(Vec2::new(
        relative.x.mul_add(2.0, -1.0),
        relative.y.mul_add(-2.0, 1.0),
    ))
}

/// Builds the world space ray passing through `ndc`, starting on the near plane.
pub fn ndc_to_ray(
    camera: &Camera,
    camera_transform: &GlobalTransform,
    ndc: Vec2,
) -> Result<Ray3d, RayError> {
    // Reversed depth: the near plane is at z = 1
    let near = camera
        .ndc_to_world(camera_transform, ndc.extend(1.0))
        .ok_or(RayError::DegenerateProjection)?;
    let far = camera
        .ndc_to_world(camera_transform, ndc.extend(f32::EPSILON))
        .ok_or(RayError::DegenerateProjection)?;

    let direction = Dir3::new(far - near)
        .ok()
        .ok_or(RayError::DegenerateProjection)?;

    Ok(Ray3d::new(near, direction))
}

pub fn pointer_ray(
    camera: &Camera,
    camera_transform: &GlobalTransform,
    position: Vec2,
) -> Result<Ray3d, RayError> {
    let viewport = camera
        .logical_viewport_rect()
        .ok_or(RayError::EmptyViewport)?;
    let ndc = normalized_device_coords(position, viewport)?;
    ndc_to_ray(camera, camera_transform, ndc)
}

pub fn just_pressed_pointer_ray(
    button_input: &Res<ButtonInput<MouseButton>>,
    touch_input: &Res<Touches>,
    windows: &Query<&Window>,
    camera: &Query<(&Camera, &GlobalTransform)>,
) -> Option<Result<Ray3d, RayError>> {
    let position = just_pressed_screen_position(button_input, touch_input, windows)?;
    let (camera, camera_transform) = camera.get_single().ok()?;
    Some(pointer_ray(camera, camera_transform, position))
}
