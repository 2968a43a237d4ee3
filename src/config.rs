use std::env;

/// Application configuration, read once at startup and passed into the
/// components that need it. Business code never reads the environment
/// directly.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub server_port: u16,
    pub server_host: String,
    /// Secret used to sign and verify session tokens.
    pub jwt_secret: String,
    /// Session token lifetime in hours. Also drives the cookie max-age.
    pub jwt_ttl_hours: i64,
    /// bcrypt cost factor.
    pub bcrypt_cost: u32,
    /// Credentials for the admin user seeded at startup if absent.
    pub admin_first_name: String,
    pub admin_last_name: String,
    pub admin_username: String,
    pub admin_email: String,
    pub admin_password: String,
}

/// Name of the HTTP-only cookie carrying the session token.
pub const TOKEN_COOKIE: &str = "token";

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .expect("DB_MAX_CONNECTIONS must be a number"),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("SERVER_PORT must be a number"),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            jwt_ttl_hours: env::var("JWT_TTL_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .expect("JWT_TTL_HOURS must be a number"),
            bcrypt_cost: env::var("BCRYPT_COST")
                .unwrap_or_else(|_| "12".to_string())
                .parse()
                .expect("BCRYPT_COST must be a number"),
            admin_first_name: env::var("ADMIN_FIRST_NAME").unwrap_or_else(|_| "Admin".to_string()),
            admin_last_name: env::var("ADMIN_LAST_NAME").unwrap_or_else(|_| "User".to_string()),
            admin_username: env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),
            admin_email: env::var("ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@example.com".to_string()),
            admin_password: env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin".to_string()),
        }
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}
