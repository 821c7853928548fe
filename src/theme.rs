use eframe::egui::Color32;

// Color Palette
// Primary Colors
pub const PRIMARY_BUTTON_BG: Color32 = Color32::from_rgb(76, 154, 255);  // Vibrant blue for primary actions
pub const SECONDARY_BUTTON_BG: Color32 = Color32::from_rgb(236, 236, 240);  // Light gray for settings and cancel

// Text Colors
pub const BUTTON_MAIN_TEXT: Color32 = Color32::from_rgb(255, 255, 255);  // White text for buttons
pub const BUTTON_SECONDARY_TEXT: Color32 = Color32::from_rgb(36, 36, 36);
pub const SECONDARY_TEXT: Color32 = Color32::from_rgb(138, 138, 143);  // Medium gray for secondary text
pub const TEXT_ERROR: Color32 = Color32::from_rgb(200, 30, 30);
pub const TEXT_SUCCESS: Color32 = Color32::from_rgb(20, 140, 60);
pub const TEXT_WARNING: Color32 = Color32::from_rgb(190, 120, 0);
pub const TEXT_INFO: Color32 = Color32::from_rgb(40, 90, 180);

// Surfaces
pub const CARD_BG: Color32 = Color32::from_rgb(248, 248, 248);
pub const INPUT_BG: Color32 = Color32::from_rgb(250, 250, 250);
pub const INPUT_STROKE: Color32 = Color32::LIGHT_GRAY;
pub const INPUT_INVALID_STROKE: Color32 = TEXT_ERROR;

// UI Elements
pub const BORDER_COLOR: Color32 = Color32::from_rgba_premultiplied(60, 60, 67, 15);  // Subtle border

// Sizing & Spacing
pub const ROUNDING_FRAME: f32 = 4.0;
pub const ROUNDING_CARD: f32 = 8.0;
pub const ROUNDING_BUTTON: f32 = 6.0;
pub const MIN_SIZE_BUTTON: egui::Vec2 = egui::Vec2::new(120.0, 40.0);
pub const THUMBNAIL_MAX_WIDTH: f32 = 240.0;

pub const BUTTON_FONT_SIZE: f32 = 16.0;
