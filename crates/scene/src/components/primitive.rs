use foundation::math::Vec3;
use serde::{Deserialize, Serialize};

use super::material::Material;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    Line,
    LineLoop,
    Mesh,
    Marker,
}

/// Cone with a polygonal base, centered on its anchor, apex along +Z.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pyramid {
    pub base_radius: f64,
    pub height: f64,
    pub radial_segments: u32,
}

impl Pyramid {
    /// Flat triangle list: one side face and one base face per segment.
    pub fn triangles(&self, center: Vec3) -> Vec<Vec3> {
        let n = self.radial_segments.max(3);
        let half = self.height * 0.5;
        let apex = center + Vec3::new(0.0, 0.0, half);
        let base_center = center - Vec3::new(0.0, 0.0, half);

        let rim: Vec<Vec3> = (0..n)
            .map(|i| {
                let theta = std::f64::consts::TAU * f64::from(i) / f64::from(n);
                base_center + Vec3::new(theta.cos(), theta.sin(), 0.0) * self.base_radius
            })
            .collect();

        let mut out = Vec::with_capacity(n as usize * 6);
        for i in 0..rim.len() {
            let a = rim[i];
            let b = rim[(i + 1) % rim.len()];
            out.extend([a, b, apex]);
            out.extend([b, a, base_center]);
        }
        out
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum MarkerShape {
    Pyramid(Pyramid),
}

/// A renderable description handed to the scene. The renderer owns the
/// GPU-side object; the scene only records what to draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Primitive {
    Line {
        vertices: Vec<Vec3>,
        material: Material,
    },
    LineLoop {
        vertices: Vec<Vec3>,
        material: Material,
    },
    /// Flat triangle list, three vertices per triangle.
    Mesh {
        triangles: Vec<Vec3>,
        material: Material,
    },
    Marker {
        position: Vec3,
        shape: MarkerShape,
        material: Material,
    },
}

impl Primitive {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Primitive::Line { .. } => PrimitiveKind::Line,
            Primitive::LineLoop { .. } => PrimitiveKind::LineLoop,
            Primitive::Mesh { .. } => PrimitiveKind::Mesh,
            Primitive::Marker { .. } => PrimitiveKind::Marker,
        }
    }

    pub fn material(&self) -> &Material {
        match self {
            Primitive::Line { material, .. }
            | Primitive::LineLoop { material, .. }
            | Primitive::Mesh { material, .. }
            | Primitive::Marker { material, .. } => material,
        }
    }

    pub fn vertices(&self) -> &[Vec3] {
        match self {
            Primitive::Line { vertices, .. } | Primitive::LineLoop { vertices, .. } => vertices,
            Primitive::Mesh { triangles, .. } => triangles,
            Primitive::Marker { position, .. } => std::slice::from_ref(position),
        }
    }

    pub fn triangle_count(&self) -> usize {
        match self {
            Primitive::Mesh { triangles, .. } => triangles.len() / 3,
            _ => 0,
        }
    }

    /// Mean of the vertices; the marker position for markers.
    pub fn anchor(&self) -> Option<Vec3> {
        let vertices = self.vertices();
        if vertices.is_empty() {
            return None;
        }
        let sum = vertices.iter().fold(Vec3::ZERO, |acc, v| acc + *v);
        Some(sum * (1.0 / vertices.len() as f64))
    }
}
