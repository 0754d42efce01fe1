pub const USER_ID: &str = "user_id";
pub const ROLE: &str = "role";
pub const CSRF_STATE: &str = "csrf_state";
pub const PKCE_VERIFIER: &str = "pkce_verifier";
pub const RETURN_URL: &str = "return_url";
pub const LOGIN_ROLE: &str = "login_role";
