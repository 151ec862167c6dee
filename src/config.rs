use std::{env, time::Duration};

/// Environment-backed settings, loaded once at startup from the process
/// environment (a `.env` file is merged in by `main` before this runs).
///
/// `gemini_api_key` stays optional here: its absence only becomes fatal when
/// the answer resolver actually needs it.
#[derive(Clone, Debug)]
pub struct AppConfig {
	/// Chrome profile directory to reuse (carries the portal SSO session)
	pub chrome_user_data_dir: Option<String>,
	/// Profile within the user data dir
	pub chrome_profile_directory: String,
	pub gemini_api_key: Option<String>,
	pub gemini_model: String,
	pub gemini_max_output_tokens: u32,
	pub gemini_temperature: f64,
	/// Bound for every explicit polling wait
	pub wait_timeout: Duration,
	/// Attempts for the post-generation return navigation
	pub nav_retries: u32,
	/// Fixed delay between navigation attempts
	pub nav_retry_delay: Duration,
}

impl AppConfig {
	pub fn from_env() -> Self {
		Self {
			chrome_user_data_dir: env::var("CHROME_USER_DATA_DIR").ok(),
			chrome_profile_directory: env::var("CHROME_PROFILE_DIRECTORY").unwrap_or_else(|_| "Profile 2".to_string()),
			gemini_api_key: env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
			gemini_model: env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-1.5-flash".to_string()),
			gemini_max_output_tokens: env::var("GEMINI_MAX_OUTPUT_TOKENS").ok().and_then(|s| s.parse().ok()).unwrap_or(1000),
			gemini_temperature: env::var("GEMINI_TEMPERATURE").ok().and_then(|s| s.parse().ok()).unwrap_or(0.7),
			wait_timeout: Duration::from_secs(env::var("WAIT_TIMEOUT_SECS").ok().and_then(|s| s.parse().ok()).unwrap_or(30)),
			nav_retries: env::var("NAV_RETRIES").ok().and_then(|s| s.parse().ok()).unwrap_or(3),
			nav_retry_delay: Duration::from_secs(env::var("NAV_RETRY_DELAY_SECS").ok().and_then(|s| s.parse().ok()).unwrap_or(5)),
		}
	}
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			chrome_user_data_dir: None,
			chrome_profile_directory: "Profile 2".to_string(),
			gemini_api_key: None,
			gemini_model: "gemini-1.5-flash".to_string(),
			gemini_max_output_tokens: 1000,
			gemini_temperature: 0.7,
			wait_timeout: Duration::from_secs(30),
			nav_retries: 3,
			nav_retry_delay: Duration::from_secs(5),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_timings() {
		let config = AppConfig::default();
		assert_eq!(config.wait_timeout, Duration::from_secs(30));
		assert_eq!(config.nav_retries, 3);
		assert_eq!(config.nav_retry_delay, Duration::from_secs(5));
		assert_eq!(config.gemini_max_output_tokens, 1000);
	}
}
