pub struct Config {
    pub host: String,
    pub port: u16,
    pub seed_demo_data: bool,
}

impl Config {
    pub fn new() -> Self {
        dotenvy::dotenv().ok();
        let host = dotenvy::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = dotenvy::var("PORT")
            .ok()
            .and_then(|port| port.parse().ok())
            .unwrap_or(8080);
        let seed_demo_data = dotenvy::var("SEED_DEMO_DATA")
            .map(|value| value == "true")
            .unwrap_or(false);
        Self {
            host,
            port,
            seed_demo_data,
        }
    }
}
