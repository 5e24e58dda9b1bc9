// lib.rs — 全景图查看器：姿态融合引擎、场景适配层与桌面外壳

pub mod config;
pub mod engine;
pub mod error;
pub mod gesture;
pub mod i18n;
pub mod loader;
pub mod mesh;
pub mod motion;
pub mod orientation;
pub mod renderer;
pub mod scene;
pub mod view;

pub use engine::{DisplayContext, GesturePhase, OrientationEngine, Viewport};
pub use orientation::ScreenOrientation;
pub use scene::SceneAdapter;
pub use view::{InputMode, PanoramaView};
