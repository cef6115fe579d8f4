use anyhow::Result;
use std::env;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let binary_name = args
        .first()
        .and_then(|a| std::path::Path::new(a).file_name())
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "droidprefs".to_string());

    droidutils::cli::run(&binary_name, args.get(1..).unwrap_or_default())
}
