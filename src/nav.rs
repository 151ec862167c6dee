//! Course -> week -> practice-assignment navigation.
//!
//! Every wait here is a bounded poll (500ms period) capped by the configured
//! timeout. The whole sequence is single-shot on the first trip and wrapped in
//! a fixed-delay retry loop for the return trip after answer generation.

use std::time::Duration;

use chromiumoxide::{Browser, Page};
use color_eyre::{
	Result,
	eyre::{bail, eyre},
};

use crate::config::AppConfig;

pub const COURSES_URL: &str = "https://app.onlinedegree.iitm.ac.in/student_dashboard/current_courses";

/// CSS marker for one question block on the assignment page.
pub const QUESTION_ROW_SELECTOR: &str = ".gcb-question-row";

const POLL_PERIOD: Duration = Duration::from_millis(500);

/// Evaluate a boolean-returning JS IIFE.
pub(crate) async fn evaluate_bool(page: &Page, script: &str) -> Result<bool> {
	let result = page.evaluate(script).await.map_err(|e| eyre!("Script evaluation failed: {e}"))?;
	Ok(result.value().and_then(|v| v.as_bool()) == Some(true))
}

/// Poll a boolean-returning JS IIFE until it yields true or the bound expires.
pub(crate) async fn evaluate_until_true(page: &Page, script: &str, timeout: Duration, what: &str) -> Result<()> {
	let deadline = tokio::time::Instant::now() + timeout;
	loop {
		if evaluate_bool(page, script).await.unwrap_or(false) {
			return Ok(());
		}
		if tokio::time::Instant::now() >= deadline {
			bail!("Timed out after {}s waiting for {what}", timeout.as_secs());
		}
		tokio::time::sleep(POLL_PERIOD).await;
	}
}

/// Wait until the page URL contains the given substring.
pub async fn wait_for_url_contains(page: &Page, needle: &str, timeout: Duration) -> Result<()> {
	let deadline = tokio::time::Instant::now() + timeout;
	loop {
		let url = page.url().await.ok().flatten().unwrap_or_default();
		if url.contains(needle) {
			return Ok(());
		}
		if tokio::time::Instant::now() >= deadline {
			bail!("Timed out after {}s waiting for URL to contain '{needle}' (at {url})", timeout.as_secs());
		}
		tokio::time::sleep(POLL_PERIOD).await;
	}
}

/// Click the course link on the current-courses listing.
async fn click_course_link(page: &Page, subject_id: &str, timeout: Duration) -> Result<()> {
	let script = format!(
		r#"
		(function() {{
			const link = document.querySelector('a[href*="{subject_id}"]');
			if (link) {{
				link.scrollIntoView({{block: 'center', inline: 'center'}});
				link.click();
				return true;
			}}
			return false;
		}})()
		"#
	);
	evaluate_until_true(page, &script, timeout, "course link").await
}

/// Confirm the course page loaded, either in place or in a freshly opened tab.
/// Returns the page that now shows the course.
async fn confirm_course_page(browser: &Browser, page: Page, subject_id: &str, timeout: Duration) -> Result<Page> {
	if wait_for_url_contains(&page, subject_id, timeout).await.is_ok() {
		println!("🔄 Course page loaded");
		return Ok(page);
	}

	println!("⚠ Course page not loaded; checking for new tab");
	let pages = browser.pages().await.map_err(|e| eyre!("Failed to list browser tabs: {e}"))?;
	for candidate in pages.into_iter().rev() {
		let url = candidate.url().await.ok().flatten().unwrap_or_default();
		if url.contains(subject_id) {
			println!("🔄 Switched to course tab");
			return Ok(candidate);
		}
	}
	bail!("Failed to load course page or switch to course tab");
}

/// Click the "Week {n}" entry and expand its drop-down.
async fn open_week_dropdown(page: &Page, week: u32, timeout: Duration) -> Result<()> {
	let click_script = format!(
		r#"
		(function() {{
			const items = document.querySelectorAll('div[class*="units__items-title"]');
			for (const item of items) {{
				if (item.textContent.includes('Week {week}')) {{
					item.scrollIntoView({{block: 'center', inline: 'center'}});
					item.click();
					return true;
				}}
			}}
			return false;
		}})()
		"#
	);
	evaluate_until_true(page, &click_script, timeout, &format!("Week {week} entry")).await?;
	println!("🔄 Clicked Week {week} to open dropdown");
	tokio::time::sleep(Duration::from_secs(2)).await;

	// Scroll the drop-down container so all subitems render. Missing container
	// is tolerated; some weeks fit without scrolling.
	let scroll_script = format!(
		r#"
		(function() {{
			const items = document.querySelectorAll('div[class*="units__items-title"]');
			for (const item of items) {{
				if (!item.textContent.includes('Week {week}')) continue;
				const container = item.nextElementSibling;
				if (container && container.className.includes('units__subitems-show')) {{
					container.scrollTop = container.scrollHeight;
					return true;
				}}
			}}
			return false;
		}})()
		"#
	);
	if evaluate_bool(page, &scroll_script).await.unwrap_or(false) {
		println!("🔄 Scrolled Week dropdown to load all subitems");
	} else {
		tracing::warn!("Could not find Week {week} dropdown container to scroll; proceeding without scrolling");
	}
	tokio::time::sleep(Duration::from_secs(2)).await;
	Ok(())
}

/// Try the fixed list of label variants for the week's practice-assignment
/// entry; the first one that becomes clickable within the bound wins.
async fn click_practice_assignment(page: &Page, week: u32, timeout: Duration) -> Result<()> {
	let variants = [
		"Practice Assignment".to_string(),
		format!("Practice Assignment - {week}"),
		format!("Practice Assignment {week}"),
	];

	for label in &variants {
		let script = format!(
			r#"
			(function() {{
				const rows = document.querySelectorAll('div[class*="units__subitems"]');
				for (const row of rows) {{
					const span = row.querySelector('span');
					if (span && span.textContent.includes("{label}")) {{
						row.scrollIntoView({{block: 'center', inline: 'center'}});
						row.click();
						return true;
					}}
				}}
				return false;
			}})()
			"#
		);
		match evaluate_until_true(page, &script, timeout, "practice assignment entry").await {
			Ok(()) => {
				println!("✅ Practice Assignment clicked (label '{label}')");
				return Ok(());
			}
			Err(_) => tracing::warn!("Practice assignment label variant not found: '{label}'"),
		}
	}

	bail!("Practice Assignment link not found in Week {week} dropdown");
}

/// Confirm the assignment page by question-row presence, falling back to a
/// newly opened tab; finding neither is only a warning, since some courses
/// render the assignment in the same tab after a delay.
async fn confirm_assignment_page(browser: &Browser, page: Page, timeout: Duration) -> Result<Page> {
	let script = format!(
		r#"(function() {{ return document.querySelector('{QUESTION_ROW_SELECTOR}') !== null; }})()"#
	);
	if evaluate_until_true(&page, &script, timeout, "question rows").await.is_ok() {
		println!("🔄 Practice Assignment page loaded");
		return Ok(page);
	}

	let pages = browser.pages().await.map_err(|e| eyre!("Failed to list browser tabs: {e}"))?;
	if pages.len() > 1 {
		println!("🔄 Switched to Practice Assignment tab");
		return Ok(pages.into_iter().next_back().expect("len checked above"));
	}

	tracing::warn!("No new tab opened for Practice Assignment; proceeding with current tab");
	println!("⚠ No new tab for Practice Assignment; staying on current tab");
	Ok(page)
}

/// Full course -> week -> assignment sequence. Single attempt; any exhausted
/// wait aborts with the failing step's error.
pub async fn open_practice_assignment(browser: &Browser, page: Page, subject: &str, subject_id: &str, week: u32, config: &AppConfig) -> Result<Page> {
	page.goto(COURSES_URL).await.map_err(|e| eyre!("Failed to open current courses: {e}"))?;
	println!("🔄 Navigating to Current Courses");
	tokio::time::sleep(Duration::from_secs(2)).await;

	click_course_link(&page, subject_id, config.wait_timeout).await?;
	println!("✅ '{subject}' course clicked");

	let page = confirm_course_page(browser, page, subject_id, config.wait_timeout).await?;

	open_week_dropdown(&page, week, config.wait_timeout).await?;
	click_practice_assignment(&page, week, config.wait_timeout).await?;

	confirm_assignment_page(browser, page, config.wait_timeout).await
}

/// Return-trip navigation: the same sequence wrapped in a bounded retry loop
/// with a fixed delay, no backoff growth.
pub async fn open_practice_assignment_with_retries(browser: &Browser, page: Page, subject: &str, subject_id: &str, week: u32, config: &AppConfig) -> Result<Page> {
	let mut last_err = None;
	for attempt in 1..=config.nav_retries {
		match open_practice_assignment(browser, page.clone(), subject, subject_id, week, config).await {
			Ok(page) => return Ok(page),
			Err(e) => {
				tracing::warn!("Navigation attempt {attempt}/{} failed: {e}", config.nav_retries);
				eprintln!("⚠ Navigation attempt {attempt}/{} failed: {e}", config.nav_retries);
				last_err = Some(e);
				if attempt < config.nav_retries {
					println!("Retrying...");
					tokio::time::sleep(config.nav_retry_delay).await;
				}
			}
		}
	}
	Err(last_err.unwrap_or_else(|| eyre!("Navigation failed"))).map_err(|e| e.wrap_err("Max retries reached, navigation failed"))
}
