use std::{fmt, sync::LazyLock};

use color_eyre::{Result, eyre::bail};
use regex::Regex;
use serde::{Deserialize, Serialize};

pub mod config;
pub mod extract;
pub mod fill;
pub mod llm;
pub mod login;
pub mod nav;

/// Placeholder written for every ordinal the service response did not cover.
pub const ANSWER_SENTINEL: &str = "Answer: Not found";
/// Literal line separating entries in the questions file.
pub const QUESTION_SEPARATOR: &str = "---";

/// Option tokens whose presence in an answer marks it as a likely multi-select.
const MULTI_SELECT_TOKENS: [&str; 6] = ["True", "False", "A", "B", "C", "D"];

static MATCH_PAIR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)\s*-\s*([A-Za-z])\b").unwrap());

/// Subjects offered at the interactive prompt, mapped to their course URL identifiers.
pub const SUBJECTS: [(&str, &str); 2] = [
	("system commands", "ns_25t1_se2001"),
	("modern application development i", "ns_25t1_cs2003"),
];

/// One scraped question. Created once during extraction, never mutated.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Question {
	/// 1-based position in scrape order; the sole correlation key with answers
	pub ordinal: usize,
	pub text: String,
}

/// How an answer is meant to be entered into the page.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AnswerKind {
	/// Literal string typed into a text input
	FreeText,
	/// One radio/ARIA-radio selection
	SingleChoice,
	/// Comma-separated checkbox selections
	MultiSelect,
	/// `"<row>-<choice>"` pairs driving per-row dropdowns or radio groups
	Matching,
}

impl fmt::Display for AnswerKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			AnswerKind::FreeText => "text",
			AnswerKind::SingleChoice => "single",
			AnswerKind::MultiSelect => "multi",
			AnswerKind::Matching => "match",
		};
		write!(f, "{s}")
	}
}

/// One row->choice assignment parsed from a matching answer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MatchPair {
	/// 1-based row index within the question
	pub row: usize,
	/// Choice label, e.g. "B"
	pub choice: String,
}

/// One resolved answer, keyed to a question by ordinal.
#[derive(Clone, Debug)]
pub struct Answer {
	pub ordinal: usize,
	pub text: String,
}

impl Answer {
	/// Kind inferred from the answer text alone: `"<row>-<choice>"` pairs mean
	/// matching, comma-separated option tokens mean multi-select. `None` when
	/// the text is not self-describing; the filler then consults the page's
	/// actual controls.
	pub fn kind_hint(&self) -> Option<AnswerKind> {
		if !self.match_pairs().is_empty() {
			return Some(AnswerKind::Matching);
		}
		let parts = self.parts();
		if parts.len() > 1 || parts.iter().any(|p| MULTI_SELECT_TOKENS.contains(&p.as_str())) {
			return Some(AnswerKind::MultiSelect);
		}
		None
	}

	/// Parse `"1-B, 2-C"` style pairs. Empty when the text is not a matching answer.
	pub fn match_pairs(&self) -> Vec<MatchPair> {
		MATCH_PAIR_RE
			.captures_iter(&self.text)
			.filter_map(|caps| {
				let row = caps.get(1)?.as_str().parse().ok()?;
				Some(MatchPair {
					row,
					choice: caps.get(2)?.as_str().to_string(),
				})
			})
			.collect()
	}

	/// Comma-separated answer parts, trimmed, empties dropped.
	pub fn parts(&self) -> Vec<String> {
		self.text.split(',').map(|p| p.trim().to_string()).filter(|p| !p.is_empty()).collect()
	}

	/// True when the answer is the literal sentinel substituted for a missing response line.
	pub fn is_sentinel(&self) -> bool {
		self.text == ANSWER_SENTINEL
	}
}

/// The ordered set of answers for one run, read back from the answers file
/// before filling. Ordinal-keyed so the extraction/fill coupling is explicit.
#[derive(Clone, Debug, Default)]
pub struct AnswerSheet {
	pub answers: Vec<Answer>,
}

impl AnswerSheet {
	pub fn new(texts: Vec<String>) -> Self {
		let answers = texts.into_iter().enumerate().map(|(i, text)| Answer { ordinal: i + 1, text }).collect();
		Self { answers }
	}

	pub fn get(&self, ordinal: usize) -> Option<&Answer> {
		self.answers.iter().find(|a| a.ordinal == ordinal)
	}

	pub fn len(&self) -> usize {
		self.answers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.answers.is_empty()
	}

	/// The Nth answer must correspond to the Nth extracted question; a count
	/// mismatch means the positional association broke, which is fatal.
	pub fn validate_count(&self, expected: usize) -> Result<()> {
		if self.answers.len() != expected {
			bail!("Expected {expected} answers, found {}", self.answers.len());
		}
		Ok(())
	}
}

/// Legacy ordinal->kind mapping from the historical assignment layout. Used only
/// when neither the page's controls nor the answer text are conclusive.
pub fn legacy_kind_for_ordinal(ordinal: usize, answer: &Answer) -> Option<AnswerKind> {
	match ordinal {
		4 | 8 => Some(AnswerKind::FreeText),
		3 | 5 | 7 | 9 => Some(AnswerKind::SingleChoice),
		2 | 6 => Some(AnswerKind::Matching),
		1 => Some(AnswerKind::MultiSelect),
		_ => answer.kind_hint(),
	}
}

/// Resolve the subject id for a (lowercased) subject name from the fixed set.
pub fn subject_id(name: &str) -> Option<&'static str> {
	SUBJECTS.iter().find(|(n, _)| *n == name).map(|(_, id)| *id)
}
