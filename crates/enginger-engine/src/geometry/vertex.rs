use std::mem::{offset_of, size_of};

use bytemuck::{Pod, Zeroable};

use crate::device::VertexAttrib;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Default, Pod, Zeroable)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Point on the z = 0 plane.
    pub const fn xy(x: f32, y: f32) -> Self {
        Self::new(x, y, 0.0)
    }
}

/// Linear RGBA color.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Self = Self::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Self = Self::rgb(0.0, 0.0, 1.0);
    pub const YELLOW: Self = Self::rgb(1.0, 1.0, 0.0);
    pub const MAGENTA: Self = Self::rgb(1.0, 0.0, 1.0);
    pub const CYAN: Self = Self::rgb(0.0, 1.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Default, Pod, Zeroable)]
pub struct Uv {
    pub u: f32,
    pub v: f32,
}

impl Uv {
    pub const fn new(u: f32, v: f32) -> Self {
        Self { u, v }
    }
}

/// One interleaved vertex as laid out in the vertex buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex {
    pub position: Position,
    pub color: Color,
    pub uv: Uv,
    pub normal: Position,
}

impl Vertex {
    pub const STRIDE: u64 = size_of::<Vertex>() as u64;

    /// Shader input locations 0..=3: position, color, uv, normal.
    pub const ATTRIBUTES: [VertexAttrib; 4] = [
        attrib(0, 3, offset_of!(Vertex, position)),
        attrib(1, 4, offset_of!(Vertex, color)),
        attrib(2, 2, offset_of!(Vertex, uv)),
        attrib(3, 3, offset_of!(Vertex, normal)),
    ];

    pub const fn new(position: Position, color: Color, uv: Uv, normal: Position) -> Self {
        Self { position, color, uv, normal }
    }

    /// Vertex with only position and color set.
    pub const fn colored(position: Position, color: Color) -> Self {
        Self::new(position, color, Uv::new(0.0, 0.0), Position::ZERO)
    }
}

const fn attrib(location: u32, components: u32, offset: usize) -> VertexAttrib {
    VertexAttrib {
        location,
        components,
        stride: Vertex::STRIDE,
        offset: offset as u64,
    }
}

/// Two triangles sharing the quad's diagonal.
pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 1, 2, 3];

/// Axis-aligned quad centered on the origin, corners at `±extent`.
///
/// Corner order: left-bottom, right-bottom, left-top, right-top.
pub fn quad(extent: f32) -> [Vertex; 4] {
    [
        Vertex::colored(Position::xy(-extent, -extent), Color::MAGENTA),
        Vertex::colored(Position::xy(extent, -extent), Color::CYAN),
        Vertex::colored(Position::xy(-extent, extent), Color::YELLOW),
        Vertex::colored(Position::xy(extent, extent), Color::WHITE),
    ]
}
