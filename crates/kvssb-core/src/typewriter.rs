use serde::{Deserialize, Serialize};

/// Options for the hero tagline typewriter, in the shape the Typed
/// library takes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TypewriterOptions {
    pub strings: Vec<String>,
    /// Milliseconds per typed character
    pub type_speed: u32,
    /// Milliseconds per erased character
    pub back_speed: u32,
    #[serde(rename = "loop")]
    pub looped: bool,
    pub show_cursor: bool,
    pub cursor_char: String,
    pub smart_backspace: bool,
}

impl Default for TypewriterOptions {
    fn default() -> Self {
        Self {
            strings: [
                "Innovative Digital Solutions",
                "Creative Web Development",
                "Professional UI/UX Design",
                "Cutting-edge Technology",
            ]
            .map(String::from)
            .to_vec(),
            type_speed: 50,
            back_speed: 30,
            looped: true,
            show_cursor: true,
            cursor_char: "|".to_string(),
            smart_backspace: true,
        }
    }
}
