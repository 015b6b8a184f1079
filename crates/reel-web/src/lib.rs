pub mod dom;
pub mod host;
pub mod runner;
pub mod timer;
pub mod unity;
pub mod youtube;

pub use runner::WebRunner;

/// Generate the `#[wasm_bindgen]` exports for a page.
///
/// The runner is not generic over the hooks, so the page's hooks type is
/// boxed once in `bridge_init` and everything else is a thin forwarder.
///
/// # Usage
///
/// ```ignore
/// use wasm_bindgen::prelude::*;
///
/// mod hooks;
/// use hooks::MyHooks;
///
/// reel_web::export_bridge!(MyHooks, "my-page");
/// ```
///
/// # Arguments
///
/// - `$hooks_type`: a type implementing `reel_bridge::BridgeHooks` with a
///   `new()` constructor
/// - `$app_name`: a string literal used in log messages
#[macro_export]
macro_rules! export_bridge {
    ($hooks_type:ty, $app_name:literal) => {
        /// Install logging and build the runner. `config_json` overrides the
        /// hooks' config when given.
        #[wasm_bindgen]
        pub fn bridge_init(config_json: Option<String>) {
            let hooks = <$hooks_type>::new();
            $crate::runner::init(Box::new(hooks), config_json.as_deref(), $app_name);
        }

        /// Tear down every mounted view.
        #[wasm_bindgen]
        pub fn bridge_shutdown() {
            $crate::runner::shutdown();
        }

        // ---- Video ----

        #[wasm_bindgen]
        pub fn video_mount(container_id: &str, video_url: &str) -> bool {
            $crate::runner::mount_video(container_id, video_url)
        }

        #[wasm_bindgen]
        pub fn video_start() -> bool {
            $crate::runner::start_video()
        }

        #[wasm_bindgen]
        pub fn video_unmount() {
            $crate::runner::unmount_video();
        }

        #[wasm_bindgen]
        pub fn video_position() -> f64 {
            $crate::runner::video_position()
        }

        #[wasm_bindgen]
        pub fn video_duration() -> f64 {
            $crate::runner::video_duration()
        }

        // ---- Game ----

        #[wasm_bindgen]
        pub fn game_mount(canvas_id: &str) -> bool {
            $crate::runner::mount_game(canvas_id)
        }

        #[wasm_bindgen]
        pub fn game_set_fullscreen(fullscreen: bool) {
            $crate::runner::set_game_fullscreen(fullscreen);
        }

        #[wasm_bindgen]
        pub fn game_unmount() {
            $crate::runner::unmount_game();
        }
    };
}
