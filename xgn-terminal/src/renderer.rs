/// ASCII rasterizer for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Matrix4, Point3, Vector3};
use std::io::Write;
use xgn_core::{Geometry, SceneGraph, Triangle, ViewCamera};

/// Character luminosity ramp for depth/shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Color used when a geometry carries no material
const UNLIT: Color = Color::Grey;

/// ASCII renderer that converts a scene graph to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            color_buffer: vec![UNLIT; size],
        }
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
        self.color_buffer.fill(UNLIT);
    }

    /// Draw every geometry reachable from the root
    pub fn render_scene(&mut self, scene: &SceneGraph, camera: &ViewCamera) {
        for (world, geometry) in scene.geometries() {
            self.render_geometry(geometry, &world, camera);
        }
    }

    fn render_geometry(&mut self, geometry: &Geometry, world: &Matrix4<f64>, camera: &ViewCamera) {
        for triangle in &geometry.mesh.triangles {
            self.render_triangle(triangle, geometry, world, camera);
        }
    }

    fn render_triangle(
        &mut self,
        triangle: &Triangle,
        geometry: &Geometry,
        world: &Matrix4<f64>,
        camera: &ViewCamera,
    ) {
        let mut screen_coords = [(0.0f32, 0.0f32, 0.0f32); 3];
        for (slot, vertex) in screen_coords.iter_mut().zip(&triangle.vertices) {
            match camera.project_to_screen(
                &vertex.position.cast::<f64>(),
                world,
                self.width as u32,
                self.height as u32,
            ) {
                Some(projected) => *slot = projected,
                None => return, // Triangle is clipped
            }
        }

        // Light travels from the eye, so shade by how squarely the face looks back at it
        let view_world = camera.view_matrix() * world;
        let normal = view_world.transform_vector(&triangle.calculate_normal().cast::<f64>());
        let centroid = triangle
            .vertices
            .iter()
            .map(|v| view_world.transform_point(&v.position.cast::<f64>()).coords)
            .sum::<Vector3<f64>>()
            / 3.0;
        let to_eye = (Point3::origin() - Point3::from(centroid)).normalize();
        let brightness = normal
            .try_normalize(1e-12)
            .map_or(0.0, |n| n.dot(&to_eye).max(0.0)) as f32;

        let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
        let character = LUMINOSITY_RAMP[char_index.min(LUMINOSITY_RAMP.len() - 1)];
        let color = match geometry.state.material {
            Some(material) => {
                let rgb = material.shade(brightness);
                Color::Rgb {
                    r: (rgb.x * 255.0) as u8,
                    g: (rgb.y * 255.0) as u8,
                    b: (rgb.z * 255.0) as u8,
                }
            }
            None => UNLIT,
        };

        self.rasterize_triangle(&screen_coords, character, color);
    }

    fn rasterize_triangle(&mut self, coords: &[(f32, f32, f32); 3], character: char, color: Color) {
        let [v0, v1, v2] = *coords;

        // Bounding box clipped to the screen
        let min_x = (v0.0.min(v1.0).min(v2.0).floor() as i32).max(0);
        let max_x = (v0.0.max(v1.0).max(v2.0).ceil() as i32).min(self.width as i32 - 1);
        let min_y = (v0.1.min(v1.1).min(v2.1).floor() as i32).max(0);
        let max_y = (v0.1.max(v1.1).max(v2.1).ceil() as i32).min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = (x as f32 + 0.5, y as f32 + 0.5);
                let Some((w0, w1, w2)) = barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), p)
                else {
                    continue;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                let idx = y as usize * self.width + x as usize;
                if depth < self.depth_buffer[idx] {
                    self.depth_buffer[idx] = depth;
                    self.char_buffer[idx] = character;
                    self.color_buffer[idx] = color;
                }
            }
        }
    }

    /// Characters of one row, for inspection
    #[cfg(test)]
    fn row(&self, y: usize) -> String {
        self.char_buffer[y * self.width..(y + 1) * self.width].iter().collect()
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = y * self.width + x;
                writer.queue(SetForegroundColor(self.color_buffer[idx]))?;
                writer.queue(Print(self.char_buffer[idx]))?;
            }
            writer.queue(Print('\n'))?;
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
