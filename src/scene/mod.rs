//! Scene state: the root group, its lights and the lifecycle around them.

pub mod director;
pub mod graph;
pub mod lights;
pub mod render_loop;

pub use director::{FontRequest, Phase, SceneDirector, SceneSettings, Viewport};
