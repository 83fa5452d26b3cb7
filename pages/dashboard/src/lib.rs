use wasm_bindgen::prelude::*;

mod page;
use page::DashboardPage;

quest_web::export_page!(DashboardPage, "dashboard");
