//! Question extraction: scrape every distinct question block once and persist
//! the flat-text artifacts for the run.

use std::time::Duration;

use chromiumoxide::Page;
use color_eyre::{
	Result,
	eyre::{bail, eyre},
};
use serde::Deserialize;

use crate::{QUESTION_SEPARATOR, Question, config::AppConfig, nav, nav::QUESTION_ROW_SELECTOR};

/// Full-page snapshot before dynamic content is forced to load.
pub const PAGE_INITIAL_FILE: &str = "page_initial.html";
/// Full-page snapshot after scroll-to-bottom and settling.
pub const PAGE_LOADED_FILE: &str = "page_loaded.html";
/// Raw outer markup of every question row, de-duplicated or not.
pub const QUESTION_DOM_FILE: &str = "question_dom.txt";
/// Extracted question texts, separated by the literal `---` line.
pub const QUESTIONS_FILE: &str = "questions.txt";

/// One question row as scraped, before de-duplication.
#[derive(Clone, Debug, Deserialize)]
pub struct RawQuestionRow {
	pub text: String,
	pub html: String,
}

/// Write the page's current HTML to `path`.
pub async fn snapshot_page(page: &Page, path: &str) -> Result<()> {
	let html = page.evaluate("document.documentElement.outerHTML").await.map_err(|e| eyre!("Failed to get page HTML: {e}"))?;
	let html_str = html.value().and_then(|v| v.as_str()).unwrap_or("<html></html>");
	std::fs::write(path, html_str).map_err(|e| eyre!("Failed to write {path}: {e}"))?;
	Ok(())
}

/// Scroll to the bottom and give lazily rendered questions time to appear.
pub async fn force_dynamic_load(page: &Page) -> Result<()> {
	page.evaluate("window.scrollTo(0, document.body.scrollHeight);")
		.await
		.map_err(|e| eyre!("Failed to scroll page: {e}"))?;
	tokio::time::sleep(Duration::from_secs(5)).await;
	Ok(())
}

/// Enumerate all question rows: click each once to expand (failures ignored,
/// some rows are already expanded), then read body text and outer markup.
pub async fn collect_rows(page: &Page, timeout: Duration) -> Result<Vec<RawQuestionRow>> {
	let presence = format!(r#"(function() {{ return document.querySelector('{QUESTION_ROW_SELECTOR}') !== null; }})()"#);
	nav::evaluate_until_true(page, &presence, timeout, "question rows")
		.await
		.map_err(|e| e.wrap_err(format!("No question rows appeared; page source saved to {PAGE_LOADED_FILE}")))?;

	let expand_script = format!(
		r#"
		(function() {{
			const rows = document.querySelectorAll('{QUESTION_ROW_SELECTOR}');
			for (const row of rows) {{
				try {{ row.click(); }} catch (e) {{}}
			}}
			return rows.length;
		}})()
		"#
	);
	page.evaluate(expand_script).await.map_err(|e| eyre!("Failed to expand question rows: {e}"))?;
	tokio::time::sleep(Duration::from_secs(1)).await;

	let read_script = format!(
		r#"
		(function() {{
			const rows = document.querySelectorAll('{QUESTION_ROW_SELECTOR}');
			const out = [];
			for (const row of rows) {{
				const body = row.querySelector('.qt-embedded');
				out.push({{
					text: body ? body.innerText.trim() : '',
					html: row.outerHTML
				}});
			}}
			return JSON.stringify(out);
		}})()
		"#
	);
	let result = page.evaluate(read_script).await.map_err(|e| eyre!("Failed to read question rows: {e}"))?;
	let json_str = result.value().and_then(|v| v.as_str()).unwrap_or("[]");
	let rows: Vec<RawQuestionRow> = serde_json::from_str(json_str).map_err(|e| eyre!("Failed to parse question rows JSON: {e}"))?;
	Ok(rows)
}

/// De-duplicate by exact text equality, dropping empty bodies, and assign
/// ordinals in discovery order.
pub fn dedup(rows: &[RawQuestionRow]) -> Vec<Question> {
	let mut seen: Vec<&str> = Vec::new();
	let mut questions = Vec::new();
	for (i, row) in rows.iter().enumerate() {
		if row.text.is_empty() || seen.contains(&row.text.as_str()) {
			tracing::warn!("Skipping row {}: no text or duplicate", i + 1);
			continue;
		}
		seen.push(&row.text);
		questions.push(Question {
			ordinal: questions.len() + 1,
			text: row.text.clone(),
		});
	}
	questions
}

/// Serialize question texts the way the resolver prompt and the questions
/// file expect them: each entry followed by a blank line and the separator.
pub fn questions_file_contents(questions: &[Question]) -> String {
	let mut out = String::new();
	for q in questions {
		out.push_str(&q.text);
		out.push_str("\n\n");
		out.push_str(QUESTION_SEPARATOR);
		out.push('\n');
	}
	out
}

/// The whole extraction stage: snapshots, row collection, debug dump,
/// de-duplication and the questions file. Empty extraction is fatal.
pub async fn extract(page: &Page, config: &AppConfig) -> Result<Vec<Question>> {
	println!("🧠 Scraping questions from Practice Assignment page...");
	snapshot_page(page, PAGE_INITIAL_FILE).await?;

	force_dynamic_load(page).await?;
	snapshot_page(page, PAGE_LOADED_FILE).await?;

	let rows = collect_rows(page, config.wait_timeout).await?;

	// Every row's markup is dumped regardless of de-duplication outcome.
	let mut dump = String::new();
	for (i, row) in rows.iter().enumerate() {
		dump.push_str(&format!("Q{} DOM:\n{}\n\n", i + 1, row.html));
	}
	std::fs::write(QUESTION_DOM_FILE, dump).map_err(|e| eyre!("Failed to write {QUESTION_DOM_FILE}: {e}"))?;

	let questions = dedup(&rows);
	if questions.is_empty() {
		bail!("No questions extracted from the assignment page");
	}

	std::fs::write(QUESTIONS_FILE, questions_file_contents(&questions)).map_err(|e| eyre!("Failed to write {QUESTIONS_FILE}: {e}"))?;
	tracing::info!("Saved {} questions to {QUESTIONS_FILE}", questions.len());
	println!("✅ {} questions saved to '{QUESTIONS_FILE}'.", questions.len());

	Ok(questions)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn row(text: &str) -> RawQuestionRow {
		RawQuestionRow {
			text: text.to_string(),
			html: format!("<div>{text}</div>"),
		}
	}

	#[test]
	fn dedup_drops_duplicates_and_empties() {
		let rows = vec![row("first"), row(""), row("second"), row("first"), row("third")];
		let questions = dedup(&rows);
		assert_eq!(questions.len(), 3);
		assert_eq!(questions[0].ordinal, 1);
		assert_eq!(questions[0].text, "first");
		assert_eq!(questions[1].text, "second");
		assert_eq!(questions[2].ordinal, 3);
		assert_eq!(questions[2].text, "third");
	}

	#[test]
	fn dedup_keeps_discovery_order() {
		let rows = vec![row("b"), row("a"), row("c")];
		let texts: Vec<_> = dedup(&rows).into_iter().map(|q| q.text).collect();
		assert_eq!(texts, vec!["b", "a", "c"]);
	}

	#[test]
	fn questions_file_uses_literal_separator() {
		let questions = dedup(&[row("one"), row("two")]);
		let contents = questions_file_contents(&questions);
		assert_eq!(contents, "one\n\n---\ntwo\n\n---\n");
		assert_eq!(contents.matches(QUESTION_SEPARATOR).count(), 2);
	}
}
