//! Answer filling: survey each question row's rendered controls, classify the
//! question from what is actually on the page, plan the DOM mutations as data,
//! then execute them with a native-click-first fallback policy.
//!
//! Planning is pure so the per-question decisions are testable without a
//! browser; only execution touches the page.

use std::time::Duration;

use chromiumoxide::Page;
use color_eyre::{
	Result,
	eyre::{bail, eyre},
};
use serde::Deserialize;

use crate::{Answer, AnswerKind, AnswerSheet, config::AppConfig, legacy_kind_for_ordinal, nav};

/// One text input (or textarea) inside a question row.
#[derive(Clone, Debug, Deserialize)]
pub struct TextControl {
	pub id: String,
	#[serde(default)]
	pub value: String,
}

/// One radio button or ARIA radio.
#[derive(Clone, Debug, Deserialize)]
pub struct RadioControl {
	pub id: String,
	#[serde(default)]
	pub label: String,
	#[serde(default)]
	pub group: String,
	#[serde(default)]
	pub checked: bool,
}

/// One checkbox.
#[derive(Clone, Debug, Deserialize)]
pub struct CheckboxControl {
	pub id: String,
	#[serde(default)]
	pub label: String,
	#[serde(default)]
	pub checked: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SelectOptionInfo {
	#[serde(default)]
	pub value: String,
	#[serde(default)]
	pub text: String,
}

/// One native selection list.
#[derive(Clone, Debug, Deserialize)]
pub struct SelectControl {
	pub id: String,
	#[serde(default)]
	pub options: Vec<SelectOptionInfo>,
	#[serde(default)]
	pub selected_value: String,
}

/// Everything the filler knows about one question row, captured in a single
/// evaluated pass over the freshly loaded page.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct QuestionSurvey {
	pub id: String,
	#[serde(default)]
	pub text_inputs: Vec<TextControl>,
	#[serde(default)]
	pub radios: Vec<RadioControl>,
	#[serde(default)]
	pub checkboxes: Vec<CheckboxControl>,
	#[serde(default)]
	pub selects: Vec<SelectControl>,
}

impl QuestionSurvey {
	/// Radio group names in discovery order. Unnamed radios share one group.
	pub fn radio_groups(&self) -> Vec<&str> {
		let mut groups = Vec::new();
		for radio in &self.radios {
			let g = radio.group.as_str();
			if !groups.contains(&g) {
				groups.push(g);
			}
		}
		groups
	}

	fn has_no_controls(&self) -> bool {
		self.text_inputs.is_empty() && self.radios.is_empty() && self.checkboxes.is_empty() && self.selects.is_empty()
	}
}

/// One planned DOM mutation, naming a surveyed control by its generated id.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FillAction {
	SetText { control: String, value: String },
	Click { control: String },
	SelectOption { control: String, value: String },
}

/// Which click path was actually taken for a control.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ClickPath {
	Native,
	Forced,
}

/// Derive the question type from the rendered controls; fall back to the
/// answer's own kind tag, and lastly to the legacy ordinal mapping, only when
/// the row exposes nothing to inspect.
pub fn classify(survey: &QuestionSurvey, answer: &Answer) -> Option<AnswerKind> {
	if !survey.has_no_controls() {
		if !survey.selects.is_empty() {
			return Some(AnswerKind::Matching);
		}
		if !survey.checkboxes.is_empty() {
			return Some(AnswerKind::MultiSelect);
		}
		let groups = survey.radio_groups();
		if groups.len() > 1 {
			return Some(AnswerKind::Matching);
		}
		if groups.len() == 1 {
			return Some(AnswerKind::SingleChoice);
		}
		if !survey.text_inputs.is_empty() {
			return Some(AnswerKind::FreeText);
		}
	}
	answer.kind_hint().or_else(|| legacy_kind_for_ordinal(answer.ordinal, answer))
}

/// Re-running the filler must be a no-op per already-answered question.
pub fn already_filled(survey: &QuestionSurvey, answer: &Answer, kind: AnswerKind) -> bool {
	match kind {
		AnswerKind::FreeText => survey.text_inputs.iter().any(|t| !t.value.trim().is_empty()),
		AnswerKind::SingleChoice => survey.radios.iter().any(|r| r.checked),
		AnswerKind::MultiSelect => {
			let required = answer.parts().len();
			required > 0 && survey.checkboxes.iter().filter(|c| c.checked).count() >= required
		}
		AnswerKind::Matching =>
			if !survey.selects.is_empty() {
				survey.selects.iter().all(|s| !s.selected_value.is_empty() && s.selected_value != "0")
			} else {
				let pairs = answer.match_pairs();
				let resolved_groups = survey.radio_groups().iter().filter(|g| survey.radios.iter().any(|r| r.group == **g && r.checked)).count();
				!pairs.is_empty() && resolved_groups >= pairs.len()
			},
	}
}

fn label_matches_single(label: &str, answer: &str) -> bool {
	let label = label.trim().to_lowercase();
	let answer = answer.trim().to_lowercase();
	label == answer || (answer == "true" && (label == "true" || label == "yes")) || (answer == "false" && (label == "false" || label == "no"))
}

/// Pure planning: which controls to mutate for this question. An empty plan on
/// an unfilled question means no control matched; the caller logs and skips.
pub fn plan(survey: &QuestionSurvey, answer: &Answer, kind: AnswerKind) -> Vec<FillAction> {
	match kind {
		AnswerKind::FreeText => survey
			.text_inputs
			.first()
			.map(|t| {
				vec![FillAction::SetText {
					control: t.id.clone(),
					value: answer.text.clone(),
				}]
			})
			.unwrap_or_default(),
		AnswerKind::SingleChoice => survey
			.radios
			.iter()
			.find(|r| label_matches_single(&r.label, &answer.text))
			.map(|r| vec![FillAction::Click { control: r.id.clone() }])
			.unwrap_or_default(),
		AnswerKind::MultiSelect => {
			let parts: Vec<String> = answer.parts().iter().map(|p| p.to_lowercase()).collect();
			survey
				.checkboxes
				.iter()
				.filter(|c| !c.checked)
				.filter(|c| {
					let label = c.label.to_lowercase();
					parts.iter().any(|p| label.contains(p.as_str()))
				})
				.map(|c| FillAction::Click { control: c.id.clone() })
				.collect()
		}
		AnswerKind::Matching => {
			let pairs = answer.match_pairs();
			if pairs.is_empty() {
				tracing::warn!("Q{}: Invalid matching answer format: '{}'", answer.ordinal, answer.text);
				return Vec::new();
			}
			if !survey.selects.is_empty() {
				// Native selection list per row, 1-indexed in discovery order.
				let mut actions = Vec::new();
				for (row_idx, select) in survey.selects.iter().enumerate() {
					let Some(pair) = pairs.iter().find(|p| p.row == row_idx + 1) else { continue };
					if let Some(option) = select.options.iter().find(|o| o.text.trim().eq_ignore_ascii_case(&pair.choice)) {
						actions.push(FillAction::SelectOption {
							control: select.id.clone(),
							value: option.value.clone(),
						});
					}
				}
				actions
			} else {
				// Fallback: grouped radio buttons, groups 1-indexed in discovery order.
				let mut actions = Vec::new();
				for (row_idx, group) in survey.radio_groups().iter().enumerate() {
					let Some(pair) = pairs.iter().find(|p| p.row == row_idx + 1) else { continue };
					if let Some(radio) = survey.radios.iter().filter(|r| r.group == *group && !r.checked).find(|r| r.label.trim().eq_ignore_ascii_case(&pair.choice)) {
						actions.push(FillAction::Click { control: radio.id.clone() });
					}
				}
				actions
			}
		}
	}
}

/// Tag every question row and its controls with generated ids and report the
/// control inventory as JSON. The tags are what later click/set scripts and
/// native element lookups address.
const SURVEY_JS: &str = r#"
	(function() {
		function labelFor(input) {
			const sib = input.nextElementSibling;
			if (sib && sib.tagName === 'LABEL') return sib.innerText.trim();
			const wrap = input.closest('label');
			if (wrap) return wrap.innerText.trim();
			if (input.id) {
				const forLabel = document.querySelector('label[for="' + input.id + '"]');
				if (forLabel) return forLabel.innerText.trim();
			}
			const parent = input.parentElement;
			if (parent) {
				const lab = parent.querySelector('label');
				if (lab) return lab.innerText.trim();
			}
			return '';
		}

		const rows = document.querySelectorAll('.gcb-question-row');
		const surveys = [];
		let q = 0;
		for (const row of rows) {
			q += 1;
			const id = 'q' + q;
			row.setAttribute('data-sh-id', id);

			const textInputs = [];
			row.querySelectorAll('input:not([type="checkbox"]):not([type="radio"]):not([type="hidden"]), textarea').forEach((el, i) => {
				const cid = id + '-t' + (i + 1);
				el.setAttribute('data-sh-id', cid);
				textInputs.push({ id: cid, value: el.value || '' });
			});

			const radios = [];
			row.querySelectorAll('input[type="radio"], div[role="radio"]').forEach((el, i) => {
				const cid = id + '-r' + (i + 1);
				el.setAttribute('data-sh-id', cid);
				const checked = el.checked === true || el.getAttribute('checked') !== null || el.getAttribute('aria-checked') === 'true';
				const label = labelFor(el) || (el.innerText || '').trim();
				radios.push({ id: cid, label: label, group: el.getAttribute('name') || '', checked: checked });
			});

			const checkboxes = [];
			row.querySelectorAll('input[type="checkbox"]').forEach((el, i) => {
				const cid = id + '-c' + (i + 1);
				el.setAttribute('data-sh-id', cid);
				checkboxes.push({ id: cid, label: labelFor(el), checked: el.checked === true });
			});

			const selects = [];
			row.querySelectorAll('select').forEach((el, i) => {
				const cid = id + '-s' + (i + 1);
				el.setAttribute('data-sh-id', cid);
				const options = [];
				for (const opt of el.options) {
					options.push({ value: opt.value, text: opt.textContent.trim() });
				}
				selects.push({ id: cid, options: options, selected_value: el.value || '' });
			});

			surveys.push({ id: id, text_inputs: textInputs, radios: radios, checkboxes: checkboxes, selects: selects });
		}
		return JSON.stringify(surveys);
	})()
"#;

/// Survey all question rows on the (re-loaded) assignment page.
pub async fn survey_questions(page: &Page, timeout: Duration) -> Result<Vec<QuestionSurvey>> {
	let presence = format!(r#"(function() {{ return document.querySelector('{}') !== null; }})()"#, nav::QUESTION_ROW_SELECTOR);
	nav::evaluate_until_true(page, &presence, timeout, "question rows during filling").await?;

	let result = page.evaluate(SURVEY_JS).await.map_err(|e| eyre!("Failed to survey questions: {e}"))?;
	let json_str = result.value().and_then(|v| v.as_str()).unwrap_or("[]");
	let surveys: Vec<QuestionSurvey> = serde_json::from_str(json_str).map_err(|e| eyre!("Failed to parse survey JSON: {e}"))?;
	Ok(surveys)
}

fn escape_js(s: &str) -> String {
	s.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n").replace('\r', "\\r")
}

/// Click a tagged control: standard interaction first, forced JS dispatch only
/// when the native click is intercepted or fails. The path taken is reported
/// for diagnosis.
pub async fn click_control(page: &Page, control: &str) -> Result<ClickPath> {
	let selector = format!(r#"[data-sh-id="{control}"]"#);
	if let Ok(element) = page.find_element(&selector).await {
		if element.click().await.is_ok() {
			return Ok(ClickPath::Native);
		}
	}

	let script = format!(
		r#"
		(function() {{
			const el = document.querySelector('[data-sh-id="{control}"]');
			if (!el) return false;
			el.click();
			return true;
		}})()
		"#
	);
	if nav::evaluate_bool(page, &script).await? {
		Ok(ClickPath::Forced)
	} else {
		Err(eyre!("Control not found: {control}"))
	}
}

async fn apply_action(page: &Page, action: &FillAction) -> Result<()> {
	match action {
		FillAction::SetText { control, value } => {
			let script = format!(
				r#"
				(function() {{
					const el = document.querySelector('[data-sh-id="{control}"]');
					if (!el) return false;
					el.value = "";
					el.value = "{}";
					el.dispatchEvent(new Event('input', {{ bubbles: true }}));
					el.dispatchEvent(new Event('change', {{ bubbles: true }}));
					return true;
				}})()
				"#,
				escape_js(value)
			);
			if !nav::evaluate_bool(page, &script).await? {
				bail!("Text input not found: {control}");
			}
		}
		FillAction::Click { control } => {
			let path = click_control(page, control).await?;
			tracing::debug!("Clicked {control} via {path:?} path");
		}
		FillAction::SelectOption { control, value } => {
			let script = format!(
				r#"
				(function() {{
					const el = document.querySelector('[data-sh-id="{control}"]');
					if (!el) return false;
					el.value = "{}";
					el.dispatchEvent(new Event('change', {{ bubbles: true }}));
					return true;
				}})()
				"#,
				escape_js(value)
			);
			if !nav::evaluate_bool(page, &script).await? {
				bail!("Select not found: {control}");
			}
		}
	}
	Ok(())
}

/// Scroll a question row into centred view and attempt the expand click
/// (ignored when it fails; some rows are already expanded).
async fn scroll_and_expand(page: &Page, row_id: &str) -> Result<()> {
	let script = format!(
		r#"
		(function() {{
			const row = document.querySelector('[data-sh-id="{row_id}"]');
			if (!row) return false;
			row.scrollIntoView({{block: 'center', inline: 'center'}});
			window.scrollBy(0, -150);
			return true;
		}})()
		"#
	);
	if !nav::evaluate_bool(page, &script).await? {
		bail!("Question row not found: {row_id}");
	}
	tokio::time::sleep(Duration::from_secs(2)).await;

	if click_control(page, row_id).await.is_err() {
		tracing::warn!("{row_id}: could not click question element to expand");
	}
	tokio::time::sleep(Duration::from_secs(1)).await;
	Ok(())
}

async fn fill_one(page: &Page, survey: &QuestionSurvey, answer: &Answer) -> Result<()> {
	scroll_and_expand(page, &survey.id).await?;
	tracing::info!("Processing Q{} with answer: {}", answer.ordinal, answer.text);

	let Some(kind) = classify(survey, answer) else {
		tracing::warn!("Q{}: could not classify question, skipping", answer.ordinal);
		eprintln!("⚠ Q{}: no input type matched, skipping", answer.ordinal);
		return Ok(());
	};

	if already_filled(survey, answer, kind) {
		tracing::info!("Q{}: already answered, skipping", answer.ordinal);
		println!("✅ Q{}: already answered, skipping", answer.ordinal);
		return Ok(());
	}

	let actions = plan(survey, answer, kind);
	if actions.is_empty() {
		tracing::warn!("Q{} [{kind}]: no matching controls for answer '{}'", answer.ordinal, answer.text);
		eprintln!("⚠ Q{}: no matching controls for answer '{}', skipping", answer.ordinal, answer.text);
		return Ok(());
	}

	for action in &actions {
		apply_action(page, action).await?;
	}
	println!("✅ Q{} [{kind}]: filled with '{}'", answer.ordinal, answer.text);
	Ok(())
}

/// Fill every question on the page. Per-question failures are logged and the
/// loop continues; only surveying the page at all can fail the stage.
pub async fn fill_all(page: &Page, sheet: &AnswerSheet, config: &AppConfig) -> Result<()> {
	println!("🧠 Filling answers on Practice Assignment page...");
	let surveys = survey_questions(page, config.wait_timeout).await?;

	if surveys.len() < sheet.len() {
		tracing::warn!("Found only {} question elements, expected {}", surveys.len(), sheet.len());
		eprintln!("⚠ Found only {} question elements, expected {}", surveys.len(), sheet.len());
	}

	for (survey, answer) in surveys.iter().zip(&sheet.answers) {
		if let Err(e) = fill_one(page, survey, answer).await {
			tracing::error!("Error processing Q{}: {e}", answer.ordinal);
			eprintln!("❌ Error processing Q{}: {e}", answer.ordinal);
		}
	}

	println!("🎉 Finished filling answers on Practice Assignment page.");
	Ok(())
}

/// Ordered submission-control patterns, most specific first.
const SUBMIT_TAG_JS: &str = r#"
	(function() {
		function textOf(el) {
			return ((el.textContent || '') + ' ' + (el.value || '')).toLowerCase();
		}
		const patterns = ['check answers', 'check', 'submit'];
		const candidates = Array.from(document.querySelectorAll('button, input[type="submit"]'));
		for (const pattern of patterns) {
			for (const el of candidates) {
				if (textOf(el).includes(pattern)) {
					el.setAttribute('data-sh-id', 'submit-control');
					return true;
				}
			}
		}
		const fallback = document.querySelector('input[type="submit"]');
		if (fallback) {
			fallback.setAttribute('data-sh-id', 'submit-control');
			return true;
		}
		return false;
	})()
"#;

const SUCCESS_INDICATOR_JS: &str = r#"
	(function() {
		if (document.querySelector('div[class*="success-message"]')) return true;
		const text = (document.body.innerText || '').toLowerCase();
		return text.includes('successfully') || text.includes('checked');
	})()
"#;

/// Submit the assignment and try to confirm it went through. A missing
/// submission control is fatal; an unconfirmed submission is only a warning.
pub async fn submit(page: &Page, config: &AppConfig) -> Result<()> {
	println!("📤 Submitting by clicking 'Check Answers'...");

	page.evaluate("window.scrollTo(0, document.body.scrollHeight);")
		.await
		.map_err(|e| eyre!("Failed to scroll to page bottom: {e}"))?;
	tokio::time::sleep(Duration::from_secs(2)).await;

	if !nav::evaluate_bool(page, SUBMIT_TAG_JS).await? {
		bail!("Could not find 'Check Answers' or 'Submit' button");
	}
	let path = click_control(page, "submit-control").await?;
	tracing::info!("Clicked submission control via {path:?} path");
	println!("✅ 'Check Answers' button clicked successfully");

	match nav::evaluate_until_true(page, SUCCESS_INDICATOR_JS, config.wait_timeout, "submission confirmation").await {
		Ok(()) => println!("✅ Answers checked successfully"),
		Err(_) => {
			tracing::warn!("No confirmation message found; checking URL change");
			let url = page.url().await.ok().flatten().unwrap_or_default().to_lowercase();
			if url.contains("submission") || url.contains("completed") || url.contains("checked") {
				println!("✅ Submission likely successful (URL changed)");
			} else {
				tracing::warn!("Could not confirm submission success");
				println!("⚠ Could not confirm submission; please check the page");
			}
		}
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn answer(ordinal: usize, text: &str) -> Answer {
		Answer { ordinal, text: text.to_string() }
	}

	fn text_survey(value: &str) -> QuestionSurvey {
		QuestionSurvey {
			id: "q1".to_string(),
			text_inputs: vec![TextControl { id: "q1-t1".to_string(), value: value.to_string() }],
			..Default::default()
		}
	}

	fn radio(id: &str, label: &str, group: &str, checked: bool) -> RadioControl {
		RadioControl {
			id: id.to_string(),
			label: label.to_string(),
			group: group.to_string(),
			checked,
		}
	}

	fn checkbox(id: &str, label: &str, checked: bool) -> CheckboxControl {
		CheckboxControl {
			id: id.to_string(),
			label: label.to_string(),
			checked,
		}
	}

	fn true_false_survey(checked: Option<usize>) -> QuestionSurvey {
		QuestionSurvey {
			id: "q3".to_string(),
			radios: vec![radio("q3-r1", "True", "g1", checked == Some(0)), radio("q3-r2", "False", "g1", checked == Some(1))],
			..Default::default()
		}
	}

	fn matching_select_survey(selected: &str) -> QuestionSurvey {
		let options = vec![
			SelectOptionInfo { value: "0".to_string(), text: "--".to_string() },
			SelectOptionInfo { value: "1".to_string(), text: "A".to_string() },
			SelectOptionInfo { value: "2".to_string(), text: "B".to_string() },
			SelectOptionInfo { value: "3".to_string(), text: "C".to_string() },
		];
		QuestionSurvey {
			id: "q2".to_string(),
			selects: vec![
				SelectControl {
					id: "q2-s1".to_string(),
					options: options.clone(),
					selected_value: selected.to_string(),
				},
				SelectControl {
					id: "q2-s2".to_string(),
					options,
					selected_value: selected.to_string(),
				},
			],
			..Default::default()
		}
	}

	#[test]
	fn classify_prefers_rendered_controls() {
		let a = answer(4, "hello"); // legacy map says free-text
		let survey = true_false_survey(None);
		// but the page shows a radio group, so single-choice wins
		assert_eq!(classify(&survey, &a), Some(AnswerKind::SingleChoice));
	}

	#[test]
	fn classify_control_precedence() {
		assert_eq!(classify(&matching_select_survey("0"), &answer(1, "x")), Some(AnswerKind::Matching));
		let multi = QuestionSurvey {
			id: "q1".to_string(),
			checkboxes: vec![checkbox("q1-c1", "A", false)],
			..Default::default()
		};
		assert_eq!(classify(&multi, &answer(5, "x")), Some(AnswerKind::MultiSelect));
		assert_eq!(classify(&text_survey(""), &answer(1, "x")), Some(AnswerKind::FreeText));
	}

	#[test]
	fn classify_multiple_radio_groups_is_matching() {
		let survey = QuestionSurvey {
			id: "q6".to_string(),
			radios: vec![radio("q6-r1", "A", "row1", false), radio("q6-r2", "B", "row1", false), radio("q6-r3", "A", "row2", false)],
			..Default::default()
		};
		assert_eq!(classify(&survey, &answer(6, "1-A, 2-B")), Some(AnswerKind::Matching));
	}

	#[test]
	fn classify_falls_back_without_controls() {
		// empty survey: the answer tag decides, then the legacy ordinal map
		let empty = QuestionSurvey { id: "q1".to_string(), ..Default::default() };
		assert_eq!(classify(&empty, &answer(1, "A")), Some(AnswerKind::MultiSelect));
		assert_eq!(classify(&empty, &answer(2, "1-B, 2-C")), Some(AnswerKind::Matching));
		assert_eq!(classify(&empty, &answer(3, "true")), Some(AnswerKind::SingleChoice));
		assert_eq!(classify(&empty, &answer(4, "hello")), Some(AnswerKind::FreeText));
		assert_eq!(classify(&empty, &answer(10, "hello")), None);
	}

	#[test]
	fn nine_question_assignment_scenario() {
		// 9 extracted questions, bare surveys, answers as returned by the service
		let texts = ["A", "1-B, 2-C", "true", "hello", "false", "1-A, 2-D", "true", "42", "false"];
		let expected = [
			AnswerKind::MultiSelect,
			AnswerKind::Matching,
			AnswerKind::SingleChoice,
			AnswerKind::FreeText,
			AnswerKind::SingleChoice,
			AnswerKind::Matching,
			AnswerKind::SingleChoice,
			AnswerKind::FreeText,
			AnswerKind::SingleChoice,
		];
		for (i, (text, want)) in texts.iter().zip(expected).enumerate() {
			let empty = QuestionSurvey { id: format!("q{}", i + 1), ..Default::default() };
			assert_eq!(classify(&empty, &answer(i + 1, text)), Some(want), "ordinal {}", i + 1);
		}
	}

	#[test]
	fn plan_free_text_sets_literal_answer() {
		let actions = plan(&text_survey(""), &answer(4, "hello world"), AnswerKind::FreeText);
		assert_eq!(actions, vec![FillAction::SetText {
			control: "q1-t1".to_string(),
			value: "hello world".to_string()
		}]);
	}

	#[test]
	fn plan_single_choice_matches_label_case_insensitively() {
		let actions = plan(&true_false_survey(None), &answer(3, "TRUE"), AnswerKind::SingleChoice);
		assert_eq!(actions, vec![FillAction::Click { control: "q3-r1".to_string() }]);
	}

	#[test]
	fn plan_single_choice_accepts_yes_no_synonyms() {
		let survey = QuestionSurvey {
			id: "q3".to_string(),
			radios: vec![radio("q3-r1", "Yes", "g1", false), radio("q3-r2", "No", "g1", false)],
			..Default::default()
		};
		assert_eq!(plan(&survey, &answer(3, "true"), AnswerKind::SingleChoice), vec![FillAction::Click {
			control: "q3-r1".to_string()
		}]);
		assert_eq!(plan(&survey, &answer(3, "false"), AnswerKind::SingleChoice), vec![FillAction::Click {
			control: "q3-r2".to_string()
		}]);
	}

	#[test]
	fn plan_single_choice_no_match_is_empty() {
		assert!(plan(&true_false_survey(None), &answer(3, "maybe"), AnswerKind::SingleChoice).is_empty());
	}

	#[test]
	fn plan_multi_select_clicks_substring_matches() {
		let survey = QuestionSurvey {
			id: "q1".to_string(),
			checkboxes: vec![
				checkbox("q1-c1", "A. grep searches files", false),
				checkbox("q1-c2", "B. grep edits files", false),
				checkbox("q1-c3", "C. grep is a filter", false),
			],
			..Default::default()
		};
		let actions = plan(&survey, &answer(1, "A, C"), AnswerKind::MultiSelect);
		assert_eq!(actions, vec![FillAction::Click { control: "q1-c1".to_string() }, FillAction::Click {
			control: "q1-c3".to_string()
		}]);
	}

	#[test]
	fn plan_multi_select_unmatched_parts_silently_skipped() {
		let survey = QuestionSurvey {
			id: "q1".to_string(),
			checkboxes: vec![checkbox("q1-c1", "A. first", false)],
			..Default::default()
		};
		let actions = plan(&survey, &answer(1, "A, Z"), AnswerKind::MultiSelect);
		assert_eq!(actions.len(), 1);
	}

	#[test]
	fn plan_matching_prefers_selects() {
		let actions = plan(&matching_select_survey("0"), &answer(2, "1-B, 2-C"), AnswerKind::Matching);
		assert_eq!(actions, vec![
			FillAction::SelectOption {
				control: "q2-s1".to_string(),
				value: "2".to_string()
			},
			FillAction::SelectOption {
				control: "q2-s2".to_string(),
				value: "3".to_string()
			},
		]);
	}

	#[test]
	fn plan_matching_falls_back_to_radio_groups() {
		let survey = QuestionSurvey {
			id: "q6".to_string(),
			radios: vec![
				radio("q6-r1", "A", "row1", false),
				radio("q6-r2", "B", "row1", false),
				radio("q6-r3", "A", "row2", false),
				radio("q6-r4", "B", "row2", false),
			],
			..Default::default()
		};
		let actions = plan(&survey, &answer(6, "1-B, 2-A"), AnswerKind::Matching);
		assert_eq!(actions, vec![FillAction::Click { control: "q6-r2".to_string() }, FillAction::Click {
			control: "q6-r3".to_string()
		}]);
	}

	#[test]
	fn plan_matching_invalid_format_is_empty() {
		assert!(plan(&matching_select_survey("0"), &answer(2, "not pairs"), AnswerKind::Matching).is_empty());
	}

	#[test]
	fn already_filled_detects_each_kind() {
		assert!(already_filled(&text_survey("42"), &answer(4, "42"), AnswerKind::FreeText));
		assert!(!already_filled(&text_survey(""), &answer(4, "42"), AnswerKind::FreeText));

		assert!(already_filled(&true_false_survey(Some(0)), &answer(3, "true"), AnswerKind::SingleChoice));
		assert!(!already_filled(&true_false_survey(None), &answer(3, "true"), AnswerKind::SingleChoice));

		let multi = QuestionSurvey {
			id: "q1".to_string(),
			checkboxes: vec![checkbox("q1-c1", "A", true), checkbox("q1-c2", "B", true)],
			..Default::default()
		};
		assert!(already_filled(&multi, &answer(1, "A, B"), AnswerKind::MultiSelect));
		assert!(!already_filled(&multi, &answer(1, "A, B, C"), AnswerKind::MultiSelect));

		assert!(already_filled(&matching_select_survey("2"), &answer(2, "1-B, 2-C"), AnswerKind::Matching));
		assert!(!already_filled(&matching_select_survey("0"), &answer(2, "1-B, 2-C"), AnswerKind::Matching));
	}

	#[test]
	fn second_pass_plans_no_actions() {
		// an already-answered page must produce zero DOM mutations
		let survey = QuestionSurvey {
			id: "q1".to_string(),
			checkboxes: vec![checkbox("q1-c1", "A", true), checkbox("q1-c2", "C", true)],
			..Default::default()
		};
		let a = answer(1, "A, C");
		let kind = classify(&survey, &a).unwrap();
		assert!(already_filled(&survey, &a, kind));
		// even planning directly clicks nothing, since matched boxes are checked
		assert!(plan(&survey, &a, kind).is_empty());
	}
}
