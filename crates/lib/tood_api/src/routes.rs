//! Route paths.

pub const GET_HEALTH: &str = "/health";
pub const POST_LOGIN: &str = "/login";
pub const POST_LOGOUT: &str = "/logout";
pub const GET_ME: &str = "/me";
pub const POST_MENU_REGISTER: &str = "/menu/register";
pub const GET_REVIEWS_STATS: &str = "/reviews/stats";
pub const REVIEWS_VENUE_ID: &str = "/reviews/{venue_id}";
pub const POST_UPLOAD_IMAGE: &str = "/upload/image";
pub const GET_SITEMAP: &str = "/sitemap.xml";
