use {
    ccthw_flowfield::{
        math::Vec2,
        particles::{DisplayParams, Particle, ParticleRenderer},
    },
    image::{Rgba, RgbaImage},
};

/// Splats particles into an RGBA image on the CPU.
pub struct CanvasRenderer {
    canvas: RgbaImage,
}

impl CanvasRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: RgbaImage::new(width, height),
        }
    }

    /// Fill the canvas with `background` and copy every opaque pixel of
    /// `overlay` on top.
    pub fn clear(&mut self, background: Rgba<u8>, overlay: &RgbaImage) {
        for (x, y, pixel) in self.canvas.enumerate_pixels_mut() {
            *pixel = match overlay.get_pixel_checked(x, y) {
                Some(over) if over[3] > 0 => *over,
                _ => background,
            };
        }
    }

    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }
}

impl ParticleRenderer for CanvasRenderer {
    fn render(
        &mut self,
        particles: &[Particle],
        display: &DisplayParams,
        world_size: Vec2,
    ) {
        if world_size.x <= 0.0 || world_size.y <= 0.0 {
            return;
        }
        let (w, h) = self.canvas.dimensions();
        let scale = Vec2::new(w as f32 / world_size.x, h as f32 / world_size.y);
        let radius = 0.5 * display.size_display * scale.x.min(scale.y);

        for particle in particles {
            let color = display.color_for_speed(particle.velocity.norm());
            let center = particle.position.component_mul(&scale);
            splat(&mut self.canvas, center, radius, color);
        }
    }
}

/// Blend a filled disc into the canvas.
fn splat(canvas: &mut RgbaImage, center: Vec2, radius: f32, color: [f32; 4]) {
    let (w, h) = canvas.dimensions();
    let min_x = (center.x - radius).floor().max(0.0) as u32;
    let min_y = (center.y - radius).floor().max(0.0) as u32;
    let max_x = ((center.x + radius).ceil() as u32).min(w);
    let max_y = ((center.y + radius).ceil() as u32).min(h);
    let alpha = color[3].clamp(0.0, 1.0);

    for y in min_y..max_y {
        for x in min_x..max_x {
            let offset =
                Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - center;
            if offset.norm_squared() > radius * radius {
                continue;
            }
            let pixel = canvas.get_pixel_mut(x, y);
            for channel in 0..3 {
                let src = color[channel].clamp(0.0, 1.0) * 255.0;
                let dst = pixel[channel] as f32;
                pixel[channel] = (src * alpha + dst * (1.0 - alpha)) as u8;
            }
            pixel[3] = 255;
        }
    }
}
