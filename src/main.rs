use std::io::Read;
use std::process::ExitCode;

use healthvision_lib::agent::AgentResult;
use healthvision_lib::config;
use healthvision_lib::extraction::{
    extract_analysis_text, extract_body_part, extract_patient_info, extract_text,
    extract_transcript,
};
use healthvision_lib::recommendation::normalize_recommendations;

const USAGE: &str =
    "usage: healthvision <extract|recommend|analysis|body-part|transcript|patient-info> < input";

fn main() -> ExitCode {
    healthvision_lib::init_tracing();
    tracing::debug!("{} v{}", config::APP_NAME, config::APP_VERSION);

    let Some(mode) = std::env::args().nth(1) else {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    };

    let mut input = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut input) {
        eprintln!("failed to read stdin: {e}");
        return ExitCode::FAILURE;
    }

    if mode == "patient-info" {
        return print_json(&extract_patient_info(&input));
    }

    // Non-JSON input is treated as a bare text result
    let value = serde_json::from_str(&input).unwrap_or(serde_json::Value::String(input));

    let output = match mode.as_str() {
        "extract" => extract_text(&AgentResult::from_json(value)),
        "analysis" => extract_analysis_text(&AgentResult::from_json(value)),
        "body-part" => extract_body_part(&AgentResult::from_json(value)),
        "transcript" => extract_transcript(&value),
        "recommend" => {
            return print_json(&normalize_recommendations(&AgentResult::from_json(value)));
        }
        other => {
            eprintln!("unknown mode `{other}`\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    println!("{output}");
    ExitCode::SUCCESS
}

fn print_json<T: serde::Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("failed to serialize output: {e}");
            ExitCode::FAILURE
        }
    }
}
