// src/banner.rs
use std::path::Path;

use crate::config::{AppConfig, EvalJobConfig};

/// Prints the application startup banner to the console.
pub fn print_banner() {
    // Using a raw string literal for the multi-line banner
    let banner = r#"
                 _
                | |
 _____ _   _ ___| | ____ _   _ ____
| ___ | | | (____ |/ ___) | | |  _ \
| ____|\ V // ___ | |   | |_| | | | |
|_____) \_/ \_____|_|   |____/|_| |_|

    Batch Evaluation Submission Client
"#;
    println!("{}", banner);
}

/// Prints the effective settings and the shape of the job about to run.
pub fn print_run_info(
    config: &AppConfig,
    job: &EvalJobConfig,
    config_path: &Path,
    output_path: &Path,
) {
    println!("🌐 API base URL: {}", config.base_url);
    println!("📍 API root:     {}", config.api_root());
    println!("📄 Job config:   {}", config_path.display());
    println!("🧭 Flow:         {}", job.flow_name());
    println!("🗂️  Records:      {}", job.record_count());
    println!("⚖️  Eval configs: {}", job.eval_config_count());
    println!("📝 Report file:  {}", output_path.display());
    println!();
}
