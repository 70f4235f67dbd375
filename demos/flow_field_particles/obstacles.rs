use image::{Rgba, RgbaImage};

pub const OBSTACLE: Rgba<u8> = Rgba([0, 0, 0, 255]);
pub const FREE: Rgba<u8> = Rgba([0, 0, 0, 0]);

const BORDER: u32 = 25;
const BAR_WIDTH: f32 = 30.0;

/// Draw the scene obstacles for one frame: a solid border and a cross which
/// rotates about a point in the lower part of the scene.
pub fn draw_obstacles(image: &mut RgbaImage, frame: u32) {
    let (w, h) = image.dimensions();
    let dim = 2.0 * h as f32 / 3.0;
    let center = (w as f32 / 2.0, h as f32 - dim / 2.0);
    let angle = frame as f32 / 60.0;
    let (sin, cos) = angle.sin_cos();

    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let border = x < BORDER
            || y < BORDER
            || x >= w.saturating_sub(BORDER)
            || y >= h.saturating_sub(BORDER);

        // rotate into the frame of the cross
        let dx = x as f32 + 0.5 - center.0;
        let dy = y as f32 + 0.5 - center.1;
        let local_x = dx * cos + dy * sin;
        let local_y = -dx * sin + dy * cos;
        let horizontal_bar =
            local_x.abs() <= dim / 2.0 && local_y.abs() <= BAR_WIDTH / 2.0;
        let vertical_bar =
            local_x.abs() <= BAR_WIDTH / 2.0 && local_y.abs() <= dim / 2.0;

        *pixel = if border || horizontal_bar || vertical_bar {
            OBSTACLE
        } else {
            FREE
        };
    }
}
