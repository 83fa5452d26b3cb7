use wasm_bindgen::prelude::*;

mod page;
use page::GameSessionPage;

quest_web::export_page!(GameSessionPage, "game-session");
