pub mod keypad;
pub mod render;

pub use keypad::{Command, parse_line};
pub use render::{HELP, render, render_keypad};
