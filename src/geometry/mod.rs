pub mod extrude;
pub mod mesh;
pub mod outline;
pub mod svg;
pub mod vertex;

#[derive(Debug, thiserror::Error)]
pub enum GeometryError
{
        #[error("failed to parse vector path: {0}")]
        Svg(#[from] usvg::Error),

        #[error("vector path `{0}` produced no fillable shape")]
        EmptyShape(String),

        #[error("tessellation failed: {0}")]
        Tessellation(String),

        #[error("extrusion depth must be finite and positive, got {0}")]
        InvalidDepth(f32),
}
