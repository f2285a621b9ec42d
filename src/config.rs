use std::env;

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,

    pub jwt_secret: String,
    pub seed_demo_data: bool,
}


pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let host = env::var("HOST")
        .unwrap_or_else(|_| "127.0.0.1".to_string());

    let port = env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| "change-me-dev-secret".to_string());

    let seed_demo_data = env::var("SEED_DEMO_DATA")
        .ok()
        .and_then(|s| s.parse::<bool>().ok())
        .unwrap_or(true);

    Settings {
        host,
        port,
        jwt_secret,
        seed_demo_data,
    }
}
