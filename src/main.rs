use std::{
	io::{self, Write},
	sync::Mutex,
	time::Duration,
};

use chromiumoxide::browser::{Browser, BrowserConfig};
use clap::Parser;
use color_eyre::{Result, eyre::eyre};
use futures::StreamExt;
use seek_headless::{SUBJECTS, config::AppConfig, extract, fill, llm, login, nav, subject_id};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "seek_headless")]
#[command(about = "Automated practice-assignment solver for the IITM online degree portal", long_about = None)]
struct Args {
	/// Run with visible browser window (non-headless mode)
	#[arg(long)]
	visible: bool,
}

fn prompt_subject() -> Result<(String, &'static str)> {
	let names: Vec<&str> = SUBJECTS.iter().map(|(n, _)| *n).collect();
	loop {
		print!("Enter the subject ({}): ", names.join(" / "));
		io::stdout().flush()?;
		let mut line = String::new();
		io::stdin().read_line(&mut line)?;
		let name = line.trim().to_lowercase();
		if let Some(id) = subject_id(&name) {
			return Ok((name, id));
		}
		eprintln!("Invalid subject. Choose one of: {}", names.join(", "));
	}
}

fn prompt_week() -> Result<u32> {
	loop {
		print!("Enter week number (e.g. 1): ");
		io::stdout().flush()?;
		let mut line = String::new();
		io::stdin().read_line(&mut line)?;
		match line.trim().parse::<u32>() {
			Ok(week) if week >= 1 => return Ok(week),
			_ => eprintln!("Week must be a positive integer."),
		}
	}
}

fn init_logging() -> Result<()> {
	let log_file = std::fs::OpenOptions::new().create(true).append(true).open("scraper.log")?;
	tracing_subscriber::fmt()
		.with_writer(Mutex::new(log_file))
		.with_ansi(false)
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();
	Ok(())
}

fn browser_config(args: &Args, config: &AppConfig) -> Result<BrowserConfig> {
	let mut builder = BrowserConfig::builder()
		.window_size(1920, 1080)
		.args(vec![
			"--start-maximized",
			"--no-sandbox",
			"--disable-dev-shm-usage",
			"--disable-gpu",
			"--disable-extensions",
			"--disable-blink-features=AutomationControlled",
		]);

	// Reusing a logged-in Chrome profile is what makes the SSO step a
	// single click instead of a full credential exchange.
	if let Some(dir) = &config.chrome_user_data_dir {
		builder = builder.user_data_dir(dir).arg(format!("--profile-directory={}", config.chrome_profile_directory));
	}
	if args.visible {
		builder = builder.with_head();
	}
	builder.build().map_err(|e| eyre!("Failed to build browser config: {e}"))
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	let args = Args::parse();
	if dotenvy::dotenv().is_err() {
		eprintln!("No .env file found; relying on the process environment");
	}
	init_logging()?;

	let (subject, subject_id) = prompt_subject()?;
	let week = prompt_week()?;
	let config = AppConfig::from_env();

	println!("Starting practice-assignment automation (visible: {})...", args.visible);
	tracing::info!("Run started for subject '{subject}' week {week}");

	let (mut browser, mut handler) = Browser::launch(browser_config(&args, &config)?).await.map_err(|e| eyre!("Failed to launch browser: {e}"))?;

	// Consume browser events so the CDP connection does not stall.
	let handle = tokio::spawn(async move {
		while let Some(_event) = handler.next().await {}
	});

	let page = browser.new_page("about:blank").await.map_err(|e| eyre!("Failed to create new page: {e}"))?;

	login::login(&page, &config).await?;

	let page = nav::open_practice_assignment(&browser, page, &subject, subject_id, week, &config).await?;
	let questions = extract::extract(&page, &config).await?;

	llm::resolve_answers(&questions, &config).await?;

	// The page state after extraction is stale; reach the assignment afresh
	// before filling.
	println!("\n🔄 Re-navigating to the Practice Assignment page...");
	let page = nav::open_practice_assignment_with_retries(&browser, page, &subject, subject_id, week, &config).await?;

	let sheet = llm::read_answers_file(questions.len())?;
	fill::fill_all(&page, &sheet, &config).await?;
	fill::submit(&page, &config).await?;

	println!("\n🌐 Browser will remain open for inspection. Press Ctrl+C to exit...");
	let mut heartbeat = tokio::time::interval(Duration::from_secs(60));
	heartbeat.tick().await;
	loop {
		tokio::select! {
			_ = tokio::signal::ctrl_c() => break,
			_ = heartbeat.tick() => tracing::info!("Browser session still open"),
		}
	}

	println!("Shutting down...");
	drop(page);
	browser.close().await.map_err(|e| eyre!("Failed to close browser: {e}"))?;
	drop(browser);
	handle.abort();

	Ok(())
}
