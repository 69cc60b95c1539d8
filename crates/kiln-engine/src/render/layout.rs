//! Vertex buffer layout description.
//!
//! A [`BufferLayout`] is an ordered list of named attributes. Offsets and the
//! stride are derived from the element types; the wgpu backend turns the
//! layout into vertex attributes at shader locations `0..`.

use std::fmt;

/// Scalar, vector and matrix types a vertex attribute may have.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderDataType {
    Float,
    Float2,
    Float3,
    Float4,
    Mat3,
    Mat4,
    Int,
    Int2,
    Int3,
    Int4,
    Bool,
}

impl ShaderDataType {
    /// Size in bytes.
    pub const fn size(self) -> u32 {
        match self {
            ShaderDataType::Float => 4,
            ShaderDataType::Float2 => 4 * 2,
            ShaderDataType::Float3 => 4 * 3,
            ShaderDataType::Float4 => 4 * 4,
            ShaderDataType::Mat3 => 4 * 3 * 3,
            ShaderDataType::Mat4 => 4 * 4 * 4,
            ShaderDataType::Int => 4,
            ShaderDataType::Int2 => 4 * 2,
            ShaderDataType::Int3 => 4 * 3,
            ShaderDataType::Int4 => 4 * 4,
            ShaderDataType::Bool => 1,
        }
    }

    /// Scalar count. Matrices report their row count, one per column vector.
    pub const fn component_count(self) -> u32 {
        match self {
            ShaderDataType::Float | ShaderDataType::Int | ShaderDataType::Bool => 1,
            ShaderDataType::Float2 | ShaderDataType::Int2 => 2,
            ShaderDataType::Float3 | ShaderDataType::Int3 | ShaderDataType::Mat3 => 3,
            ShaderDataType::Float4 | ShaderDataType::Int4 | ShaderDataType::Mat4 => 4,
        }
    }

    /// Number of vertex attribute slots consumed. Matrices take one per column.
    pub const fn location_count(self) -> u32 {
        match self {
            ShaderDataType::Mat3 => 3,
            ShaderDataType::Mat4 => 4,
            _ => 1,
        }
    }

    /// The wgpu format of one attribute slot of this type.
    ///
    /// `Bool` is widened to a `u32` slot; wgpu has no single-byte format.
    pub fn vertex_format(self) -> wgpu::VertexFormat {
        match self {
            ShaderDataType::Float => wgpu::VertexFormat::Float32,
            ShaderDataType::Float2 => wgpu::VertexFormat::Float32x2,
            ShaderDataType::Float3 | ShaderDataType::Mat3 => wgpu::VertexFormat::Float32x3,
            ShaderDataType::Float4 | ShaderDataType::Mat4 => wgpu::VertexFormat::Float32x4,
            ShaderDataType::Int => wgpu::VertexFormat::Sint32,
            ShaderDataType::Int2 => wgpu::VertexFormat::Sint32x2,
            ShaderDataType::Int3 => wgpu::VertexFormat::Sint32x3,
            ShaderDataType::Int4 => wgpu::VertexFormat::Sint32x4,
            ShaderDataType::Bool => wgpu::VertexFormat::Uint32,
        }
    }
}

/// One named attribute within a [`BufferLayout`].
#[derive(Debug, Clone, PartialEq)]
pub struct BufferElement {
    pub name: String,
    pub data_type: ShaderDataType,
    pub size: u32,
    /// Filled in by [`BufferLayout::new`].
    pub offset: u32,
    pub normalized: bool,
}

impl BufferElement {
    pub fn new(data_type: ShaderDataType, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type,
            size: data_type.size(),
            offset: 0,
            normalized: false,
        }
    }

    pub fn normalized(mut self) -> Self {
        self.normalized = true;
        self
    }
}

impl fmt::Display for BufferElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:?} @ {}", self.name, self.data_type, self.offset)
    }
}

/// Ordered attributes of one interleaved vertex buffer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BufferLayout {
    elements: Vec<BufferElement>,
    stride: u32,
}

impl BufferLayout {
    /// Assigns each element the running byte offset; the stride is the total.
    pub fn new(elements: impl IntoIterator<Item = BufferElement>) -> Self {
        let mut elements: Vec<BufferElement> = elements.into_iter().collect();
        let mut offset = 0;
        for element in &mut elements {
            element.offset = offset;
            offset += element.size;
        }

        Self {
            elements,
            stride: offset,
        }
    }

    #[inline]
    pub fn stride(&self) -> u32 {
        self.stride
    }

    #[inline]
    pub fn elements(&self) -> &[BufferElement] {
        &self.elements
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BufferElement> {
        self.elements.iter()
    }

    /// Expands the layout into wgpu attributes at consecutive shader
    /// locations starting from zero. Matrix columns get one location each.
    pub fn vertex_attributes(&self) -> Vec<wgpu::VertexAttribute> {
        let mut attributes = Vec::with_capacity(self.elements.len());
        let mut location = 0;

        for element in &self.elements {
            let columns = element.data_type.location_count();
            let column_size = element.data_type.size() / columns;
            for column in 0..columns {
                attributes.push(wgpu::VertexAttribute {
                    format: element.data_type.vertex_format(),
                    offset: u64::from(element.offset + column * column_size),
                    shader_location: location,
                });
                location += 1;
            }
        }

        attributes
    }
}

impl<'a> IntoIterator for &'a BufferLayout {
    type Item = &'a BufferElement;
    type IntoIter = std::slice::Iter<'a, BufferElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_accumulate_and_stride_is_total() {
        let layout = BufferLayout::new([
            BufferElement::new(ShaderDataType::Float3, "a_Position"),
            BufferElement::new(ShaderDataType::Float4, "a_Color"),
            BufferElement::new(ShaderDataType::Float2, "a_TexCoord"),
        ]);

        let offsets: Vec<u32> = layout.iter().map(|e| e.offset).collect();
        assert_eq!(offsets, [0, 12, 28]);
        assert_eq!(layout.stride(), 36);
    }

    #[test]
    fn empty_layout_has_zero_stride() {
        let layout = BufferLayout::new([]);
        assert_eq!(layout.stride(), 0);
        assert!(layout.vertex_attributes().is_empty());
    }

    #[test]
    fn sizes_and_component_counts() {
        assert_eq!(ShaderDataType::Mat3.size(), 36);
        assert_eq!(ShaderDataType::Mat4.size(), 64);
        assert_eq!(ShaderDataType::Bool.size(), 1);
        assert_eq!(ShaderDataType::Int3.component_count(), 3);
        assert_eq!(ShaderDataType::Mat4.component_count(), 4);
    }

    #[test]
    fn matrix_expands_to_one_location_per_column() {
        let layout = BufferLayout::new([
            BufferElement::new(ShaderDataType::Float, "a_Scalar"),
            BufferElement::new(ShaderDataType::Mat4, "a_Transform"),
        ]);

        let attrs = layout.vertex_attributes();
        assert_eq!(attrs.len(), 5);
        assert_eq!(attrs[1].offset, 4);
        assert_eq!(attrs[4].offset, 4 + 48);
        assert_eq!(attrs[4].shader_location, 4);
        assert_eq!(attrs[4].format, wgpu::VertexFormat::Float32x4);
    }
}
