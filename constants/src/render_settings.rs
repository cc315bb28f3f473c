pub const RAY_LINE_WIDTH: f32 = 0.004;
pub const RAY_ENDPOINT_SIZE: f32 = 0.01;

pub const CONTROLLER_MARKER_SIZE: f32 = 0.005;
/// Pointer stub drawn on each controller, from local z = -0.15 to z = 0.05.
pub const CONTROLLER_POINTER_START: f32 = -0.15;
pub const CONTROLLER_POINTER_END: f32 = 0.05;
pub const CONTROLLER_POINTER_WIDTH: f32 = 0.002;

pub const MEASURE_POINT_SIZE: f32 = 0.01;
pub const MEASURE_LINE_WIDTH: f32 = 0.005;
pub const MEASURE_LABEL_SCALE: f32 = 0.002;

pub const DEBUG_LABEL_SCALE: f32 = 0.002;

pub const MENU_BUTTON_SIZE: [f32; 3] = [0.5, 0.12, 0.02];
pub const MENU_BUTTON_SPACING: f32 = 0.16;
pub const MENU_TEXT_SCALE: f32 = 0.004;
/// Panel placement relative to the primary controller.
pub const MENU_OFFSET: [f32; 3] = [-0.2, -0.002, -0.1];
pub const MENU_TILT: f32 = -1.5;
pub const MENU_SCALE: f32 = 0.3;

pub const CONTROLLER_LIGHT_INTENSITY: f32 = 500_000.0;
pub const CONTROLLER_LIGHT_POSITION: [f32; 3] = [0.0, 2.0, 0.0];

/// Segments shorter than this are not drawn.
pub const MIN_DRAWN_SEGMENT: f32 = 1e-4;

/// Speed slider to the left of the menu buttons.
pub const MENU_SLIDER_OFFSET: [f32; 3] = [-0.45, 0.0, 0.0];
/// Handles sit this far above and below the slider center.
pub const MENU_SLIDER_HALF_LENGTH: f32 = 0.25;
pub const MENU_SLIDER_LABEL_HEIGHT: f32 = 0.35;
pub const MENU_SLIDER_HANDLE_SIZE: f32 = 0.02;
pub const MENU_SLIDER_BAR_RADIUS: f32 = 0.005;
/// Move speed shown at the bottom and top handle.
pub const MENU_SLIDER_RANGE: [f32; 2] = [0.0, 1.0];

/// Controller help image to the right of the buttons.
pub const MENU_HELP_OFFSET: [f32; 3] = [0.7, 0.0, 0.0];
pub const MENU_HELP_SIZE: [f32; 2] = [0.8, 0.6];
