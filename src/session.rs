pub const USER_ID: &str = "user_id";
pub const USER_ROLE: &str = "user_role";
