/// Buffer binding targets and usage hints

/// Target a buffer is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Per-vertex attribute data
    Vertex,
    /// 32-bit index data
    Index,
    /// Uniform block storage
    Uniform,
}

/// Expected update frequency of a buffer's contents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    /// Uploaded once, drawn many times
    StaticDraw,
    /// Rewritten every frame
    DynamicDraw,
}
