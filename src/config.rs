/// ID of the built-in perfect electric conductor.
pub const PEC_ID: &str = "pec";
/// ID of the built-in free space material.
pub const FREE_SPACE_ID: &str = "free_space";
/// Numeric ID of the built-in perfect electric conductor.
pub const PEC_NUM_ID: u32 = 0;
/// Numeric ID of free space, which fills a freshly allocated grid.
pub const FREE_SPACE_NUM_ID: u32 = 1;
/// Joins the x, y, z material IDs of an anisotropic request.
pub const ANISOTROPIC_SEPARATOR: &str = "+";
/// Joins the constituents of a material blended at a shared edge.
pub const BLEND_SEPARATOR: &str = "|";
/// Relative distance to an integer below which a scaled coordinate snaps to it.
pub const DISCRETISE_TOLERANCE: f64 = 1e-9;
/// Name of the report written by the scene writeup.
pub const REPORT_FILE: &str = "geometry_report.json";
