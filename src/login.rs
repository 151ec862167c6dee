//! Portal login: trigger the Google SSO flow and wait for the dashboard.
//!
//! The SSO exchange itself happens inside the reused Chrome profile; the
//! program only clicks the sign-in button and confirms the redirect.

use std::time::Duration;

use chromiumoxide::Page;
use color_eyre::{Result, eyre::eyre};

use crate::{config::AppConfig, nav};

pub const LOGIN_URL: &str = "https://app.onlinedegree.iitm.ac.in/auth/login";
const DASHBOARD_URL_FRAGMENT: &str = "student_dashboard";

/// Open the login page, click "Sign in with Google" and wait until the URL
/// confirms the authenticated dashboard. Exhausting either wait is fatal.
pub async fn login(page: &Page, config: &AppConfig) -> Result<()> {
	page.goto(LOGIN_URL).await.map_err(|e| eyre!("Failed to open login page: {e}"))?;
	println!("🌐 Portal loaded successfully");
	tokio::time::sleep(Duration::from_secs(2)).await;

	let click_script = r#"
		(function() {
			const buttons = Array.from(document.querySelectorAll('button, a, div[role="button"]'));
			const signIn = buttons.find(btn => btn.textContent.includes('Sign in with Google'));
			if (signIn) {
				signIn.click();
				return true;
			}
			return false;
		})()
	"#;
	nav::evaluate_until_true(page, click_script, config.wait_timeout, "'Sign in with Google' button").await?;
	println!("✅ Google Sign-In clicked");

	nav::wait_for_url_contains(page, DASHBOARD_URL_FRAGMENT, config.wait_timeout).await?;
	println!("🎉 Successfully logged in!");

	Ok(())
}
