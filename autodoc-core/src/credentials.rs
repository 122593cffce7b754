//! API credential loading

use anyhow::{bail, Result};

/// Environment variable holding the Gemini API key
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Read the API key, loading a local `.env` file first if there is one
pub fn load_api_key() -> Result<String> {
    dotenv::dotenv().ok();
    api_key_from_env(API_KEY_VAR)
}

/// Read a non-empty API key from `var`
pub fn api_key_from_env(var: &str) -> Result<String> {
    match std::env::var(var) {
        Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        Ok(_) => bail!("{} is set but empty", var),
        Err(_) => bail!(
            "{} is not set; export it or add it to a .env file in the current directory",
            var
        ),
    }
}
