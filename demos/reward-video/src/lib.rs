use wasm_bindgen::prelude::*;

mod hooks;
use hooks::RewardHooks;

reel_web::export_bridge!(RewardHooks, "reward-video");
