// Surface width and height must stay within the maximum supported texture size,
// wgpu refuses to configure anything larger.
#[cfg(target_arch = "wasm32")]
const MAX_SURFACE_EXTENT: f32 = 2048.0;

/// Keeps the primary window resolution in sync with the client size of the element
/// hosting the canvas, the way a `ResizeObserver` on that element would.
#[cfg(target_arch = "wasm32")]
pub fn fit_window_to_container(
    mut primary_query: bevy::ecs::system::Query<
        &mut bevy::window::Window,
        bevy::ecs::query::With<bevy::window::PrimaryWindow>,
    >,
) {
    let Some(container) = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.get_element_by_id(crate::CONTAINER_ID))
    else {
        return;
    };

    let width = container.client_width() as f32;
    let height = container.client_height() as f32;
    if width <= 0.0 || height <= 0.0 {
        return;
    }

    let width = width.min(MAX_SURFACE_EXTENT);
    let height = height.min(MAX_SURFACE_EXTENT);

    for mut window in &mut primary_query {
        let resolution = &window.resolution;
        if (resolution.width() - width).abs() > f32::EPSILON
            || (resolution.height() - height).abs() > f32::EPSILON
        {
            window.resolution.set(width, height);
        }
    }
}
