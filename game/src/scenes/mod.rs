//====================================================================

pub use default_scene::DefaultScene;

pub mod default_scene;

//====================================================================
