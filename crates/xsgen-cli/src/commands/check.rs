use crate::cli::CheckArgs;
use crate::error::{CliError, Result};
use std::str::FromStr;
use tracing::info;
use xsgen::core::io::binary::BinaryLibraryFile;
use xsgen::core::io::traits::LibraryFile;
use xsgen::core::models::ids::{format_xs_ids, parse_xs_id_list};
use xsgen::engine::config::XsGenRequest;
use xsgen::engine::decision::{self, Decision};

pub fn run(args: CheckArgs) -> Result<()> {
    let decision = evaluate(&args)?;
    println!("{}", render(&decision));
    Ok(())
}

fn evaluate(args: &CheckArgs) -> Result<Decision> {
    let required = parse_xs_id_list(&args.xs_ids)
        .map_err(|e| CliError::Argument(format!("--xs-ids: {}", e)))?;
    if required.is_empty() {
        return Err(CliError::Argument(
            "--xs-ids must name at least one XS ID".to_string(),
        ));
    }
    let request =
        XsGenRequest::from_str(&args.gen_xs).map_err(|e| CliError::Argument(e.to_string()))?;

    let library = match &args.library {
        Some(path) => {
            info!("Loading library from {:?}", path);
            Some(
                BinaryLibraryFile::read_from_path(path).map_err(|e| CliError::FileParsing {
                    path: path.clone(),
                    source: e.into(),
                })?,
            )
        }
        None => None,
    };

    Ok(decision::should_regenerate(
        args.cycle,
        &required,
        library.as_ref(),
        request.is_enabled(),
    ))
}

fn render(decision: &Decision) -> String {
    let verdict = if decision.regenerate {
        format!("regenerate {}", format_xs_ids(&decision.targets))
    } else {
        "keep the current library".to_string()
    };
    format!(
        "{}\nDecision: {} ({:?})",
        decision.message, verdict, decision.reason
    )
}
