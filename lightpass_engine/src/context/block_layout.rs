/// std140 uniform block layouts
///
/// A [`BlockLayout`] maps field names to byte ranges inside a uniform
/// buffer. It is built once with [`BlockLayoutBuilder`], field by field in
/// declaration order, following the std140 rules:
///
/// - `float`/`int` align to 4 bytes, `vec2` to 8, `vec3`/`vec4`/`mat4` to 16
/// - array elements are padded to a 16-byte stride
/// - structs align to 16 and their size is rounded up to 16
/// - the block size is rounded up to 16
///
/// Array elements are addressed as `name[i]`, struct members as
/// `name[i].member`.

use rustc_hash::FxHashMap;

/// GLSL type of a block field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Float,
    Int,
    Vec2,
    Vec3,
    Vec4,
    Mat4,
}

impl FieldKind {
    /// Base alignment of a standalone field
    pub fn alignment(&self) -> usize {
        match self {
            FieldKind::Float | FieldKind::Int => 4,
            FieldKind::Vec2 => 8,
            FieldKind::Vec3 | FieldKind::Vec4 | FieldKind::Mat4 => 16,
        }
    }

    /// Number of bytes actually written
    pub fn size(&self) -> usize {
        match self {
            FieldKind::Float | FieldKind::Int => 4,
            FieldKind::Vec2 => 8,
            FieldKind::Vec3 => 12,
            FieldKind::Vec4 => 16,
            FieldKind::Mat4 => 64,
        }
    }

    /// Stride of one element inside an array
    pub fn array_stride(&self) -> usize {
        round_up(self.size(), 16)
    }
}

/// Byte range of one field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockField {
    pub kind: FieldKind,
    pub offset: usize,
    /// Element count (1 for non-arrays)
    pub count: usize,
    /// Distance between consecutive elements
    pub stride: usize,
}

impl BlockField {
    /// Bytes covered from the first element to the end of the last one
    pub fn span(&self) -> usize {
        (self.count - 1) * self.stride + self.kind.size()
    }
}

/// Name → byte range table of a uniform block
#[derive(Debug, Clone, Default)]
pub struct BlockLayout {
    fields: FxHashMap<String, BlockField>,
    size: usize,
}

impl BlockLayout {
    pub fn builder() -> BlockLayoutBuilder {
        BlockLayoutBuilder::default()
    }

    /// Total buffer size in bytes
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn field(&self, name: &str) -> Option<&BlockField> {
        self.fields.get(name)
    }

    /// Offset of `name`, panicking on unknown fields
    pub fn offset_of(&self, name: &str) -> usize {
        self.expect_field(name).offset
    }

    pub(crate) fn expect_field(&self, name: &str) -> &BlockField {
        match self.fields.get(name) {
            Some(field) => field,
            None => panic!("uniform block has no field named '{}'", name),
        }
    }
}

/// Incremental std140 layout computation
#[derive(Debug, Clone, Default)]
pub struct BlockLayoutBuilder {
    fields: Vec<(String, BlockField)>,
    cursor: usize,
}

impl BlockLayoutBuilder {
    pub fn float(self, name: &str) -> Self {
        self.field(name, FieldKind::Float)
    }

    pub fn int(self, name: &str) -> Self {
        self.field(name, FieldKind::Int)
    }

    pub fn vec2(self, name: &str) -> Self {
        self.field(name, FieldKind::Vec2)
    }

    pub fn vec3(self, name: &str) -> Self {
        self.field(name, FieldKind::Vec3)
    }

    pub fn vec4(self, name: &str) -> Self {
        self.field(name, FieldKind::Vec4)
    }

    pub fn mat4(self, name: &str) -> Self {
        self.field(name, FieldKind::Mat4)
    }

    /// Single field of `kind`
    pub fn field(mut self, name: &str, kind: FieldKind) -> Self {
        let offset = round_up(self.cursor, kind.alignment());
        self.fields.push((
            name.to_string(),
            BlockField { kind, offset, count: 1, stride: kind.size() },
        ));
        self.cursor = offset + kind.size();
        self
    }

    /// Array of `count` elements of `kind`
    ///
    /// The whole array is registered under `name`, each element under `name[i]`.
    pub fn array(mut self, name: &str, kind: FieldKind, count: usize) -> Self {
        assert!(count > 0, "array '{}' must have at least one element", name);
        let stride = kind.array_stride();
        let offset = round_up(self.cursor, 16);
        self.fields.push((name.to_string(), BlockField { kind, offset, count, stride }));
        for i in 0..count {
            self.fields.push((
                format!("{}[{}]", name, i),
                BlockField { kind, offset: offset + i * stride, count: 1, stride: kind.size() },
            ));
        }
        self.cursor = offset + stride * count;
        self
    }

    /// Array of `count` structs whose members are declared by `members`
    pub fn struct_array(
        mut self,
        name: &str,
        count: usize,
        members: impl FnOnce(BlockLayoutBuilder) -> BlockLayoutBuilder,
    ) -> Self {
        assert!(count > 0, "array '{}' must have at least one element", name);
        let member_layout = members(BlockLayoutBuilder::default());
        let stride = round_up(member_layout.cursor, 16);
        let base = round_up(self.cursor, 16);
        for i in 0..count {
            for (member, field) in &member_layout.fields {
                self.fields.push((
                    format!("{}[{}].{}", name, i, member),
                    BlockField { offset: base + i * stride + field.offset, ..*field },
                ));
            }
        }
        self.cursor = base + stride * count;
        self
    }

    pub fn build(self) -> BlockLayout {
        BlockLayout {
            size: round_up(self.cursor, 16),
            fields: self.fields.into_iter().collect(),
        }
    }
}

fn round_up(value: usize, alignment: usize) -> usize {
    value.div_ceil(alignment) * alignment
}

#[cfg(test)]
#[path = "block_layout_tests.rs"]
mod tests;
