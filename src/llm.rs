//! Answer resolution against the Gemini `generateContent` endpoint: one
//! batched prompt in, a strictly formatted numbered list out.

use color_eyre::{
	Result,
	eyre::{bail, eyre},
};
use serde::{Deserialize, Serialize};

use crate::{ANSWER_SENTINEL, AnswerSheet, Question, config::AppConfig, extract::QUESTIONS_FILE};

/// Numbered answers, one `"k) <answer>"` line per question.
pub const ANSWERS_FILE: &str = "answers.txt";

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
	contents: Vec<Content<'a>>,
	generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
	parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
	text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
	max_output_tokens: u32,
	temperature: f64,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
	#[serde(default)]
	candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
	content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
	#[serde(default)]
	parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
	#[serde(default)]
	text: String,
}

/// The single batched prompt: exactly `n` lines, `"k) <answer>"` each,
/// honouring embedded "Accepted Answers" text when present.
pub fn build_prompt(questions_blob: &str, n: usize) -> String {
	format!(
		"Generate exactly {n} answers for the following questions, one for each question (Q1 to Q{n}). \
		Use the 'Accepted Answers' if provided in the question text. If no 'Accepted Answers' are provided, \
		generate the correct answer based on the question and options. \
		Format each answer on a new line as: 1) <option/integer/comma-separated options>\n2) <option/integer/comma-separated options>\n... up to {n}), \
		with no additional text, explanations, or extra lines. Ensure multiselect answers are comma-separated.\n\n\
		{questions_blob}"
	)
}

/// Scan response lines for `"k)"`-prefixed answers, in encounter order,
/// stopping at `n`. Shortfall is sentinel-padded; surplus is discarded. No
/// semantic validation of the answer text itself.
pub fn parse_numbered_answers(text: &str, n: usize) -> Vec<String> {
	let mut answers = Vec::with_capacity(n);
	for line in text.lines() {
		if answers.len() >= n {
			break;
		}
		let line = line.trim();
		let Some((prefix, rest)) = line.split_once(')') else { continue };
		let Ok(k) = prefix.trim().parse::<usize>() else { continue };
		if k >= 1 && k <= n {
			answers.push(rest.trim().to_string());
		}
	}
	for missing in answers.len() + 1..=n {
		tracing::warn!("Missing answer for Q{missing}, using fallback");
		answers.push(ANSWER_SENTINEL.to_string());
	}
	answers
}

/// Serialize answers the way the answers file stores them.
pub fn answers_file_contents(answers: &[String]) -> String {
	let mut out = String::new();
	for (i, answer) in answers.iter().enumerate() {
		out.push_str(&format!("{}) {answer}\n", i + 1));
	}
	out
}

/// One request/response exchange with the text-generation service. Transport
/// errors, non-success statuses and empty candidates are all fatal.
async fn generate_content(prompt: &str, api_key: &str, config: &AppConfig) -> Result<String> {
	let url = format!("{API_BASE}/{}:generateContent?key={api_key}", config.gemini_model);
	let request = GenerateContentRequest {
		contents: vec![Content { parts: vec![Part { text: prompt }] }],
		generation_config: GenerationConfig {
			max_output_tokens: config.gemini_max_output_tokens,
			temperature: config.gemini_temperature,
		},
	};

	let client = reqwest::Client::new();
	let response = client.post(&url).json(&request).send().await.map_err(|e| eyre!("Gemini request failed: {e}"))?;

	let status = response.status();
	if !status.is_success() {
		let body = response.text().await.unwrap_or_default();
		bail!("Gemini API returned {status}: {body}");
	}

	let parsed: GenerateContentResponse = response.json().await.map_err(|e| eyre!("Failed to decode Gemini response: {e}"))?;
	let text = parsed
		.candidates
		.first()
		.and_then(|c| c.content.parts.first())
		.map(|p| p.text.trim().to_string())
		.filter(|t| !t.is_empty())
		.ok_or_else(|| eyre!("Gemini response contained no candidates"))?;

	Ok(text)
}

/// The whole resolver stage: re-read the questions file, ask the service for
/// one numbered list, parse and persist the answers file.
pub async fn resolve_answers(questions: &[Question], config: &AppConfig) -> Result<()> {
	println!("\n🧠 Generating answers using Gemini API...");

	let Some(api_key) = config.gemini_api_key.as_deref() else {
		bail!("GEMINI_API_KEY is not set; cannot resolve answers");
	};

	let questions_blob = std::fs::read_to_string(QUESTIONS_FILE).map_err(|e| eyre!("Failed to read {QUESTIONS_FILE}: {e}"))?;
	let questions_blob = questions_blob.trim();
	if questions_blob.is_empty() {
		bail!("{QUESTIONS_FILE} is empty");
	}

	let n = questions.len();
	let prompt = build_prompt(questions_blob, n);
	let response_text = generate_content(&prompt, api_key, config).await?;
	tracing::info!("Successfully generated answers with Gemini");

	let answers = parse_numbered_answers(&response_text, n);
	std::fs::write(ANSWERS_FILE, answers_file_contents(&answers)).map_err(|e| eyre!("Failed to write {ANSWERS_FILE}: {e}"))?;
	tracing::info!("Saved {} answers to {ANSWERS_FILE}", answers.len());
	println!("🎉 {} answers saved to '{ANSWERS_FILE}'.", answers.len());

	Ok(())
}

/// Read the answers file back for the filling stage and check the ordinal
/// association holds (count mismatch is fatal).
pub fn read_answers_file(expected: usize) -> Result<AnswerSheet> {
	let contents = std::fs::read_to_string(ANSWERS_FILE).map_err(|e| eyre!("Failed to read {ANSWERS_FILE}: {e}"))?;
	let sheet = AnswerSheet::new(parse_answer_lines(&contents, expected));
	sheet.validate_count(expected)?;
	Ok(sheet)
}

/// Parse `"k) <answer>"` lines back out of the answers file, keeping only
/// valid ordinals for this run.
pub fn parse_answer_lines(contents: &str, n: usize) -> Vec<String> {
	let mut answers = Vec::new();
	for line in contents.lines() {
		let line = line.trim();
		let Some((prefix, rest)) = line.split_once(')') else { continue };
		let Ok(k) = prefix.trim().parse::<usize>() else { continue };
		if k >= 1 && k <= n {
			answers.push(rest.trim().to_string());
		}
	}
	answers
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn well_formed_response_parses_verbatim() {
		let response = "1) A\n2) 1-B, 2-C\n3) true\n4) hello";
		let answers = parse_numbered_answers(response, 4);
		assert_eq!(answers, vec!["A", "1-B, 2-C", "true", "hello"]);
	}

	#[test]
	fn short_response_is_sentinel_padded() {
		let answers = parse_numbered_answers("1) A\n2) B", 4);
		assert_eq!(answers.len(), 4);
		assert_eq!(answers[2], ANSWER_SENTINEL);
		assert_eq!(answers[3], ANSWER_SENTINEL);
	}

	#[test]
	fn surplus_lines_are_discarded() {
		let response = "1) A\n2) B\n3) C\nHere are some extra notes\n4) D";
		let answers = parse_numbered_answers(response, 3);
		assert_eq!(answers, vec!["A", "B", "C"]);
	}

	#[test]
	fn non_prefixed_lines_are_skipped() {
		let response = "Sure, here are the answers:\n1) A\nnote\n2) B";
		assert_eq!(parse_numbered_answers(response, 2), vec!["A", "B"]);
	}

	#[test]
	fn out_of_range_ordinals_are_skipped() {
		let response = "7) nope\n1) A\n0) nope\n2) B";
		assert_eq!(parse_numbered_answers(response, 2), vec!["A", "B"]);
	}

	#[test]
	fn malformed_but_prefixed_lines_accepted_verbatim() {
		// No semantic validation: whatever follows the prefix is taken as-is.
		let answers = parse_numbered_answers("1) %%%garbage%%%", 1);
		assert_eq!(answers, vec!["%%%garbage%%%"]);
	}

	#[test]
	fn answers_file_round_trips() {
		let answers = vec!["A".to_string(), "1-B, 2-C".to_string(), "hello world".to_string()];
		let contents = answers_file_contents(&answers);
		assert_eq!(contents, "1) A\n2) 1-B, 2-C\n3) hello world\n");
		assert_eq!(parse_answer_lines(&contents, 3), answers);
	}

	#[test]
	fn prompt_demands_exact_count_and_format() {
		let prompt = build_prompt("What is grep?\n\n---\n", 9);
		assert!(prompt.contains("exactly 9 answers"));
		assert!(prompt.contains("(Q1 to Q9)"));
		assert!(prompt.contains("Accepted Answers"));
		assert!(prompt.contains("comma-separated"));
		assert!(prompt.ends_with("What is grep?\n\n---\n"));
	}
}
