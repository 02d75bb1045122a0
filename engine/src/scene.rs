//====================================================================

use std::any::Any;

use rustc_hash::FxHashMap;

use crate::{
    audio::AudioService, error::EngineError, graphics::GraphicsService, tools::InputService,
};

//====================================================================

/// Whatever a scene hands to the scene it switches to.
pub type SceneData = Box<dyn Any>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    /// Visible cursor moving freely, for menus and other ui.
    #[default]
    Ui,
    /// Hidden cursor grabbed by the window, for camera controls.
    Captured,
}

/// Services handed to every scene call.
pub struct SceneContext<'a> {
    pub audio: &'a mut dyn AudioService,
    pub graphics: &'a mut dyn GraphicsService,
    pub input: &'a mut dyn InputService,
    pub scenes: &'a mut SceneRequests,
}

/// Requests a scene can make of the scene manager. They take effect once the
/// current update returns.
#[derive(Default)]
pub struct SceneRequests {
    exit: bool,
    switch: Option<(String, Option<SceneData>)>,
}

impl SceneRequests {
    /// Ask for the game loop to stop after this update.
    #[inline]
    pub fn exit(&mut self) {
        self.exit = true;
    }

    #[inline]
    pub fn exit_requested(&self) -> bool {
        self.exit
    }

    pub fn switch_to(&mut self, scene: impl Into<String>, data: Option<SceneData>) {
        self.switch = Some((scene.into(), data));
    }

    #[inline]
    pub fn switch_requested(&self) -> Option<&str> {
        self.switch.as_ref().map(|(name, _)| name.as_str())
    }

    #[inline]
    fn take_switch(&mut self) -> Option<(String, Option<SceneData>)> {
        self.switch.take()
    }
}

//====================================================================

/// A self contained piece of game behaviour. Construction happens through the
/// implementor's own constructor, which receives a [`SceneContext`] to load
/// its resources with.
pub trait Scene: 'static {
    fn name(&self) -> &str;

    fn input_mode(&self) -> InputMode {
        InputMode::Ui
    }

    /// Called when this scene becomes the active one. `previous` is empty
    /// when it is the first scene.
    fn switch_from(
        &mut self,
        ctx: &mut SceneContext,
        previous: &str,
        data: Option<SceneData>,
    ) -> anyhow::Result<()> {
        let _ = (ctx, previous, data);
        Ok(())
    }

    fn update(&mut self, ctx: &mut SceneContext, delta_seconds: f32) -> anyhow::Result<()> {
        let _ = (ctx, delta_seconds);
        Ok(())
    }

    fn render(&mut self, ctx: &mut SceneContext) -> anyhow::Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Give back everything acquired in construction. Called once.
    fn destroy(&mut self, ctx: &mut SceneContext) -> anyhow::Result<()> {
        let _ = ctx;
        Ok(())
    }
}

//====================================================================

pub struct SceneManager {
    scenes: Vec<Box<dyn Scene>>,
    lookup: FxHashMap<String, usize>,
    current: usize,
    first: usize,
    started: bool,
    exited: bool,
}

impl SceneManager {
    pub fn new(
        scenes: Vec<Box<dyn Scene>>,
        first_scene: Option<&str>,
    ) -> Result<Self, EngineError> {
        if scenes.is_empty() {
            return Err(EngineError::NoScenes);
        }

        let mut lookup = FxHashMap::default();
        for (index, scene) in scenes.iter().enumerate() {
            if lookup.insert(scene.name().to_string(), index).is_some() {
                return Err(EngineError::DuplicateScene(scene.name().to_string()));
            }
        }

        let first = match first_scene {
            Some(name) => *lookup
                .get(name)
                .ok_or_else(|| EngineError::UnknownScene(name.to_string()))?,
            None => 0,
        };

        Ok(Self {
            scenes,
            lookup,
            current: first,
            first,
            started: false,
            exited: false,
        })
    }

    #[inline]
    pub fn current(&self) -> &str {
        self.scenes[self.current].name()
    }

    #[inline]
    pub fn input_mode(&self) -> InputMode {
        self.scenes[self.current].input_mode()
    }

    #[inline]
    pub fn has_exited(&self) -> bool {
        self.exited
    }

    /// Activate the first scene.
    pub fn start(&mut self, ctx: &mut SceneContext) -> anyhow::Result<()> {
        if self.started {
            log::warn!("Scene manager already started");
            return Ok(());
        }
        self.started = true;

        let first = self.first;
        log::info!("Starting with scene '{}'", self.scenes[first].name());

        self.scenes[first].switch_from(ctx, "", None)?;
        self.current = first;

        Ok(())
    }

    /// Run one frame: update the current scene, follow any switches it asks
    /// for, then render whichever scene ends up current. Returns whether a
    /// scene was rendered.
    pub fn frame(&mut self, ctx: &mut SceneContext, delta_seconds: f32) -> anyhow::Result<bool> {
        if self.exited {
            return Ok(false);
        }

        loop {
            self.scenes[self.current].update(ctx, delta_seconds)?;

            if ctx.scenes.exit_requested() {
                if let Some((ignored, _)) = ctx.scenes.take_switch() {
                    log::debug!("Exit requested, ignoring switch to '{}'", ignored);
                }
                log::info!("Scene '{}' requested exit", self.current());
                self.exited = true;
                return Ok(false);
            }

            let Some((name, data)) = ctx.scenes.take_switch() else {
                break;
            };

            let previous = self.current;
            self.switch_to(ctx, &name, data)?;

            // Re-activating the current scene does not update it again
            if self.current == previous {
                break;
            }
            ctx.input.consume();
        }

        self.scenes[self.current].render(ctx)?;
        Ok(true)
    }

    fn switch_to(
        &mut self,
        ctx: &mut SceneContext,
        name: &str,
        data: Option<SceneData>,
    ) -> anyhow::Result<()> {
        let next = *self
            .lookup
            .get(name)
            .ok_or_else(|| EngineError::UnknownScene(name.to_string()))?;

        let previous = self.current().to_string();
        log::info!("Switching scene '{}' -> '{}'", previous, name);

        self.scenes[next].switch_from(ctx, &previous, data)?;
        self.current = next;

        Ok(())
    }

    /// Destroy every scene, most recently registered first.
    pub fn destroy_all(&mut self, ctx: &mut SceneContext) -> anyhow::Result<()> {
        self.exited = true;

        while let Some(mut scene) = self.scenes.pop() {
            log::debug!("Destroying scene '{}'", scene.name());
            scene.destroy(ctx)?;
        }
        self.lookup.clear();

        Ok(())
    }
}

impl Drop for SceneManager {
    fn drop(&mut self) {
        if !self.scenes.is_empty() {
            log::warn!(
                "{} scene(s) dropped without being destroyed",
                self.scenes.len()
            );
        }
    }
}

//====================================================================

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::testing::MockServices;

    #[derive(Default)]
    struct Script {
        events: Vec<String>,
    }

    type Shared = Rc<RefCell<Script>>;

    /// Records its lifecycle calls and runs a per-update action.
    struct TestScene {
        name: &'static str,
        script: Shared,
        on_update: fn(&mut SceneContext),
    }

    impl TestScene {
        fn boxed(
            name: &'static str,
            script: &Shared,
            on_update: fn(&mut SceneContext),
        ) -> Box<dyn Scene> {
            Box::new(Self {
                name,
                script: script.clone(),
                on_update,
            })
        }

        fn log(&self, event: String) {
            self.script.borrow_mut().events.push(event);
        }
    }

    impl Scene for TestScene {
        fn name(&self) -> &str {
            self.name
        }

        fn switch_from(
            &mut self,
            _ctx: &mut SceneContext,
            previous: &str,
            data: Option<SceneData>,
        ) -> anyhow::Result<()> {
            let data = data
                .and_then(|data| data.downcast::<u32>().ok())
                .map(|value| format!(" data={}", value))
                .unwrap_or_default();
            self.log(format!("{}.switch_from({}){}", self.name, previous, data));
            Ok(())
        }

        fn update(&mut self, ctx: &mut SceneContext, _delta_seconds: f32) -> anyhow::Result<()> {
            self.log(format!("{}.update", self.name));
            (self.on_update)(ctx);
            Ok(())
        }

        fn render(&mut self, _ctx: &mut SceneContext) -> anyhow::Result<()> {
            self.log(format!("{}.render", self.name));
            Ok(())
        }

        fn destroy(&mut self, _ctx: &mut SceneContext) -> anyhow::Result<()> {
            self.log(format!("{}.destroy", self.name));
            Ok(())
        }
    }

    fn idle(_ctx: &mut SceneContext) {}

    fn events(script: &Shared) -> Vec<String> {
        std::mem::take(&mut script.borrow_mut().events)
    }

    #[test]
    fn test_empty_scene_list_is_rejected() {
        assert!(matches!(
            SceneManager::new(Vec::new(), None),
            Err(EngineError::NoScenes)
        ));
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let script = Shared::default();
        let scenes = vec![
            TestScene::boxed("a", &script, idle),
            TestScene::boxed("a", &script, idle),
        ];
        let result = SceneManager::new(scenes, None);
        assert!(matches!(result, Err(EngineError::DuplicateScene(name)) if name == "a"));
    }

    #[test]
    fn test_unknown_first_scene_is_rejected() {
        let script = Shared::default();
        let scenes = vec![TestScene::boxed("a", &script, idle)];
        let result = SceneManager::new(scenes, Some("b"));
        assert!(matches!(result, Err(EngineError::UnknownScene(name)) if name == "b"));
    }

    #[test]
    fn test_start_activates_first_registered_scene() {
        let script = Shared::default();
        let mut services = MockServices::new();
        let mut manager = SceneManager::new(
            vec![
                TestScene::boxed("a", &script, idle),
                TestScene::boxed("b", &script, idle),
            ],
            None,
        )
        .unwrap();

        manager.start(&mut services.context()).unwrap();

        assert_eq!(manager.current(), "a");
        assert_eq!(events(&script), vec!["a.switch_from()"]);
    }

    #[test]
    fn test_start_honours_configured_first_scene() {
        let script = Shared::default();
        let mut services = MockServices::new();
        let mut manager = SceneManager::new(
            vec![
                TestScene::boxed("a", &script, idle),
                TestScene::boxed("b", &script, idle),
            ],
            Some("b"),
        )
        .unwrap();

        manager.start(&mut services.context()).unwrap();
        assert_eq!(manager.current(), "b");
    }

    #[test]
    fn test_frame_updates_then_renders() {
        let script = Shared::default();
        let mut services = MockServices::new();
        let mut manager =
            SceneManager::new(vec![TestScene::boxed("a", &script, idle)], None).unwrap();
        manager.start(&mut services.context()).unwrap();
        events(&script);

        let rendered = manager.frame(&mut services.context(), 0.016).unwrap();

        assert!(rendered);
        assert_eq!(events(&script), vec!["a.update", "a.render"]);
    }

    #[test]
    fn test_switch_activates_and_updates_new_scene_same_frame() {
        fn go_to_b(ctx: &mut SceneContext) {
            ctx.scenes.switch_to("b", Some(Box::new(7_u32)));
        }

        let script = Shared::default();
        let mut services = MockServices::new();
        let mut manager = SceneManager::new(
            vec![
                TestScene::boxed("a", &script, go_to_b),
                TestScene::boxed("b", &script, idle),
            ],
            None,
        )
        .unwrap();
        manager.start(&mut services.context()).unwrap();
        events(&script);

        manager.frame(&mut services.context(), 0.016).unwrap();

        assert_eq!(manager.current(), "b");
        assert_eq!(
            events(&script),
            vec!["a.update", "b.switch_from(a) data=7", "b.update", "b.render"]
        );
    }

    #[test]
    fn test_switch_consumes_input() {
        fn go_to_b(ctx: &mut SceneContext) {
            ctx.scenes.switch_to("b", None);
        }

        let script = Shared::default();
        let mut services = MockServices::new();
        let mut manager = SceneManager::new(
            vec![
                TestScene::boxed("a", &script, go_to_b),
                TestScene::boxed("b", &script, idle),
            ],
            None,
        )
        .unwrap();
        manager.start(&mut services.context()).unwrap();

        services.input.press(winit::keyboard::KeyCode::Enter);
        manager.frame(&mut services.context(), 0.016).unwrap();

        assert!(!services.input.key_just_pressed(winit::keyboard::KeyCode::Enter));
    }

    #[test]
    fn test_switch_to_unknown_scene_fails() {
        fn go_nowhere(ctx: &mut SceneContext) {
            ctx.scenes.switch_to("nowhere", None);
        }

        let script = Shared::default();
        let mut services = MockServices::new();
        let mut manager =
            SceneManager::new(vec![TestScene::boxed("a", &script, go_nowhere)], None).unwrap();
        manager.start(&mut services.context()).unwrap();

        assert!(manager.frame(&mut services.context(), 0.016).is_err());
    }

    #[test]
    fn test_switch_to_self_activates_once_and_renders() {
        fn go_to_a(ctx: &mut SceneContext) {
            ctx.scenes.switch_to("a", None);
        }

        let script = Shared::default();
        let mut services = MockServices::new();
        let mut manager =
            SceneManager::new(vec![TestScene::boxed("a", &script, go_to_a)], None).unwrap();
        manager.start(&mut services.context()).unwrap();
        events(&script);

        let rendered = manager.frame(&mut services.context(), 0.016).unwrap();

        assert!(rendered);
        assert_eq!(manager.current(), "a");
        assert_eq!(
            events(&script),
            vec!["a.update", "a.switch_from(a)", "a.render"]
        );
        assert!(services.requests.switch_requested().is_none());
    }

    #[test]
    fn test_switch_there_and_back_in_one_frame() {
        fn leave_on_enter(ctx: &mut SceneContext) {
            if ctx.input.key_just_pressed(winit::keyboard::KeyCode::Enter) {
                ctx.scenes.switch_to("b", None);
            }
        }
        fn go_to_a(ctx: &mut SceneContext) {
            ctx.scenes.switch_to("a", None);
        }

        let script = Shared::default();
        let mut services = MockServices::new();
        let mut manager = SceneManager::new(
            vec![
                TestScene::boxed("a", &script, leave_on_enter),
                TestScene::boxed("b", &script, go_to_a),
            ],
            None,
        )
        .unwrap();
        manager.start(&mut services.context()).unwrap();
        events(&script);

        services.input.press(winit::keyboard::KeyCode::Enter);
        let rendered = manager.frame(&mut services.context(), 0.016).unwrap();

        assert!(rendered);
        assert_eq!(manager.current(), "a");
        assert_eq!(
            events(&script),
            vec![
                "a.update",
                "b.switch_from(a)",
                "b.update",
                "a.switch_from(b)",
                "a.update",
                "a.render"
            ]
        );
    }

    #[test]
    fn test_exit_skips_render_and_pending_switch() {
        fn exit_and_switch(ctx: &mut SceneContext) {
            ctx.scenes.switch_to("b", None);
            ctx.scenes.exit();
        }

        let script = Shared::default();
        let mut services = MockServices::new();
        let mut manager = SceneManager::new(
            vec![
                TestScene::boxed("a", &script, exit_and_switch),
                TestScene::boxed("b", &script, idle),
            ],
            None,
        )
        .unwrap();
        manager.start(&mut services.context()).unwrap();
        events(&script);

        let rendered = manager.frame(&mut services.context(), 0.016).unwrap();

        assert!(!rendered);
        assert!(manager.has_exited());
        assert_eq!(manager.current(), "a");
        assert_eq!(events(&script), vec!["a.update"]);

        // Nothing runs once exited
        assert!(!manager.frame(&mut services.context(), 0.016).unwrap());
        assert!(events(&script).is_empty());
    }

    #[test]
    fn test_destroy_all_runs_once_in_reverse_order() {
        let script = Shared::default();
        let mut services = MockServices::new();
        let mut manager = SceneManager::new(
            vec![
                TestScene::boxed("a", &script, idle),
                TestScene::boxed("b", &script, idle),
            ],
            None,
        )
        .unwrap();
        manager.start(&mut services.context()).unwrap();
        events(&script);

        manager.destroy_all(&mut services.context()).unwrap();
        manager.destroy_all(&mut services.context()).unwrap();

        assert_eq!(events(&script), vec!["b.destroy", "a.destroy"]);
    }
}

//====================================================================
