pub mod runner;

pub use runner::PageRunner;

/// Generate all `#[wasm_bindgen]` exports for a page.
///
/// Generates:
/// - `thread_local!` storage for the PageRunner
/// - `with_runner()` helper function
/// - the wasm-bindgen exports the host calls (page_init, page_tick,
///   page_action, page_response, page_request_failed, page_drain_commands)
///
/// # Usage
///
/// ```ignore
/// use wasm_bindgen::prelude::*;
///
/// mod page;
/// use page::GameSessionPage;
///
/// quest_web::export_page!(GameSessionPage, "game-session");
/// ```
///
/// # Arguments
///
/// - `$page_type`: The page struct type that implements `quest_engine::Page`
///   and `Default`
/// - `$page_name`: A string literal used in the initialization log message
#[macro_export]
macro_rules! export_page {
    ($page_type:ty, $page_name:literal) => {
        use std::cell::RefCell;

        thread_local! {
            static RUNNER: RefCell<Option<$crate::PageRunner<$page_type>>> = RefCell::new(None);
        }

        fn with_runner<R>(f: impl FnOnce(&mut $crate::PageRunner<$page_type>) -> R) -> R {
            RUNNER.with(|cell| {
                let mut borrow = cell.borrow_mut();
                let runner = borrow.as_mut().expect("Page not initialized. Call page_init() first.");
                f(runner)
            })
        }

        /// Build the page from the manifest JSON the host collected.
        /// A manifest that does not parse falls back to defaults.
        #[wasm_bindgen]
        pub fn page_init(manifest_json: &str) {
            console_error_panic_hook::set_once();
            let _ = console_log::init_with_level(log::Level::Info);

            let manifest = match quest_engine::PageManifest::from_json(manifest_json) {
                Ok(manifest) => manifest,
                Err(e) => {
                    log::error!("{}: {}", $page_name, e);
                    quest_engine::PageManifest::default()
                }
            };
            let seed = (js_sys::Math::random() * u64::MAX as f64) as u64;
            let runner = $crate::PageRunner::new(<$page_type>::default(), manifest, seed);

            RUNNER.with(|cell| {
                *cell.borrow_mut() = Some(runner);
            });

            with_runner(|r| r.init());
            log::info!("{}: initialized", $page_name);
        }

        #[wasm_bindgen]
        pub fn page_tick(dt: f32) {
            with_runner(|r| r.tick(dt));
        }

        #[wasm_bindgen]
        pub fn page_action(json: &str) -> bool {
            with_runner(|r| r.push_action(json))
        }

        #[wasm_bindgen]
        pub fn page_response(id: u32, status: u16, body: String) -> bool {
            with_runner(|r| r.push_reply(id, status, body))
        }

        #[wasm_bindgen]
        pub fn page_request_failed(id: u32, reason: String) -> bool {
            with_runner(|r| r.push_failure(id, reason))
        }

        /// Commands queued since the last call, as `{"version", "commands"}`.
        #[wasm_bindgen]
        pub fn page_drain_commands() -> String {
            with_runner(|r| r.drain_commands_json())
        }
    };
}
