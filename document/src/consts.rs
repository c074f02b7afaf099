// Project file
pub const PROJECT_FILE_EXTENSION: &str = "strata";

// Text layout estimates, in ems of the run's pixel size
pub const AVERAGE_ADVANCE_EM: f64 = 0.6;
pub const LINE_HEIGHT_EM: f64 = 1.2;
pub const DEFAULT_FONT_SIZE: f64 = 12.;
pub const DEFAULT_FONT_FAMILY: &str = "sans-serif";

// Shape style
pub const DEFAULT_STROKE_WIDTH: f32 = 1.;
